//! Immutable CSR (Compressed Sparse Row) graph in both orientations.
//!
//! The forward orientation stores out-edges (real activation order); the
//! backward orientation stores in-edges and is what reverse-reachable
//! sampling walks. The backward CSR is the exact transpose of the forward
//! CSR: same multiset of edges, endpoints swapped, weights preserved.
//!
//! Vertices are remapped from arbitrary external `u64` identifiers to dense
//! `u32` indices in `[0, n)`, assigned in ascending external-ID order so the
//! mapping is deterministic across loads of the same input. Results are
//! reported back in external ID space via [`CsrGraph::to_external`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Direction
// ─────────────────────────────────────────────

/// Which orientation of the graph to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Out-edges: `v → w` as given in the input.
    Forward,
    /// In-edges: the transpose; `neighbors(v, Backward)` are the
    /// predecessors of `v`.
    Backward,
}

// ─────────────────────────────────────────────
// Csr
// ─────────────────────────────────────────────

/// One CSR orientation. Row `v` spans `targets[offsets[v]..offsets[v+1]]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Csr {
    /// Row offsets, length = n + 1.
    offsets: Vec<u32>,
    /// Neighbor vertex indices, parallel to `weights`.
    targets: Vec<u32>,
    /// Edge weights in (0, 1].
    weights: Vec<f32>,
}

impl Csr {
    fn from_edge_list(n: usize, edges: &[(u32, u32, f32)], by_destination: bool) -> Self {
        let mut degree = vec![0u32; n];
        for &(s, d, _) in edges {
            let row = if by_destination { d } else { s };
            degree[row as usize] += 1;
        }

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0u32);
        for v in 0..n {
            offsets.push(offsets[v] + degree[v]);
        }

        let mut targets = vec![0u32; edges.len()];
        let mut weights = vec![0.0f32; edges.len()];
        let mut cursor: Vec<u32> = offsets[..n].to_vec();
        for &(s, d, w) in edges {
            let (row, col) = if by_destination { (d, s) } else { (s, d) };
            let at = cursor[row as usize] as usize;
            targets[at] = col;
            weights[at] = w;
            cursor[row as usize] += 1;
        }

        Csr { offsets, targets, weights }
    }

    #[inline]
    fn row(&self, v: u32) -> (usize, usize) {
        (self.offsets[v as usize] as usize, self.offsets[v as usize + 1] as usize)
    }
}

// ─────────────────────────────────────────────
// CsrGraph
// ─────────────────────────────────────────────

/// Immutable directed graph with dense vertex indices and both CSR
/// orientations.
///
/// Read-only after construction and `Send + Sync`; sampling workers share a
/// reference without locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrGraph {
    num_nodes: u32,
    forward: Csr,
    backward: Csr,
    /// `to_external[i]` is the original identifier of internal vertex `i`.
    to_external: Vec<u64>,
    /// External identifier → internal index.
    external_index: HashMap<u64, u32>,
}

impl CsrGraph {
    /// Build from an already-parsed edge list in external ID space.
    ///
    /// Every endpoint is assigned a dense internal index; indices follow
    /// ascending external-ID order. Both orientations are materialised.
    pub fn from_edges(edges: &[(u64, u64, f32)]) -> Self {
        let mut ids: Vec<u64> = edges
            .iter()
            .flat_map(|&(s, d, _)| [s, d])
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let external_index: HashMap<u64, u32> = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i as u32))
            .collect();

        let internal: Vec<(u32, u32, f32)> = edges
            .iter()
            .map(|&(s, d, w)| (external_index[&s], external_index[&d], w))
            .collect();

        let n = ids.len();
        let forward = Csr::from_edge_list(n, &internal, false);
        let backward = Csr::from_edge_list(n, &internal, true);

        CsrGraph {
            num_nodes: n as u32,
            forward,
            backward,
            to_external: ids,
            external_index,
        }
    }

    /// Number of vertices.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes as usize
    }

    /// Number of directed edges (each counted once).
    pub fn num_edges(&self) -> usize {
        self.forward.targets.len()
    }

    /// Out- or in-degree of `v`.
    pub fn degree(&self, v: u32, direction: Direction) -> usize {
        let (start, end) = self.csr(direction).row(v);
        end - start
    }

    /// Lazy, restartable iterator over `(neighbor, weight)` pairs of `v` in
    /// the requested orientation. Borrows the CSR slices; calling it again
    /// restarts from the beginning.
    pub fn neighbors(&self, v: u32, direction: Direction) -> Neighbors<'_> {
        let csr = self.csr(direction);
        let (start, end) = csr.row(v);
        Neighbors {
            targets: &csr.targets[start..end],
            weights: &csr.weights[start..end],
            at: 0,
        }
    }

    /// Batch-convert internal indices to external identifiers.
    pub fn to_external(&self, vertices: &[u32]) -> Vec<u64> {
        vertices.iter().map(|&v| self.to_external[v as usize]).collect()
    }

    /// External identifier of one internal vertex.
    pub fn external_id(&self, v: u32) -> u64 {
        self.to_external[v as usize]
    }

    /// Internal index of an external identifier, if present.
    pub fn internal_id(&self, external: u64) -> Option<u32> {
        self.external_index.get(&external).copied()
    }

    /// Raw CSR arrays `(offsets, targets, weights)` of one orientation,
    /// e.g. for upload to a device-resident copy.
    pub fn csr_parts(&self, direction: Direction) -> (&[u32], &[u32], &[f32]) {
        let csr = self.csr(direction);
        (&csr.offsets, &csr.targets, &csr.weights)
    }

    #[inline]
    fn csr(&self, direction: Direction) -> &Csr {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }
}

/// Borrowing neighbor iterator returned by [`CsrGraph::neighbors`].
#[derive(Debug, Clone)]
pub struct Neighbors<'a> {
    targets: &'a [u32],
    weights: &'a [f32],
    at: usize,
}

impl Iterator for Neighbors<'_> {
    type Item = (u32, f32);

    #[inline]
    fn next(&mut self) -> Option<(u32, f32)> {
        if self.at >= self.targets.len() {
            return None;
        }
        let item = (self.targets[self.at], self.weights[self.at]);
        self.at += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.targets.len() - self.at;
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for Neighbors<'_> {}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 → 20 → 30 with weights 0.5, 0.25.
    fn chain() -> CsrGraph {
        CsrGraph::from_edges(&[(10, 20, 0.5), (20, 30, 0.25)])
    }

    #[test]
    fn remap_is_dense_and_sorted() {
        let g = chain();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.external_id(0), 10);
        assert_eq!(g.external_id(1), 20);
        assert_eq!(g.external_id(2), 30);
        assert_eq!(g.internal_id(20), Some(1));
        assert_eq!(g.internal_id(99), None);
    }

    #[test]
    fn forward_neighbors_follow_input_edges() {
        let g = chain();
        let out: Vec<(u32, f32)> = g.neighbors(0, Direction::Forward).collect();
        assert_eq!(out, vec![(1, 0.5)]);
        assert_eq!(g.neighbors(2, Direction::Forward).count(), 0);
    }

    #[test]
    fn backward_is_exact_transpose() {
        let g = CsrGraph::from_edges(&[
            (1, 2, 0.1),
            (1, 3, 0.2),
            (3, 2, 0.3),
            (2, 1, 0.4),
        ]);

        // Collect both orientations as (source, destination, weight) multisets.
        let mut fwd: Vec<(u32, u32, u32)> = Vec::new();
        let mut bwd: Vec<(u32, u32, u32)> = Vec::new();
        for v in 0..g.num_nodes() as u32 {
            for (w, wt) in g.neighbors(v, Direction::Forward) {
                fwd.push((v, w, wt.to_bits()));
            }
            for (w, wt) in g.neighbors(v, Direction::Backward) {
                bwd.push((w, v, wt.to_bits()));
            }
        }
        fwd.sort_unstable();
        bwd.sort_unstable();
        assert_eq!(fwd, bwd, "backward CSR must be the transpose of forward");
    }

    #[test]
    fn neighbor_iterator_is_restartable() {
        let g = chain();
        let first: Vec<_> = g.neighbors(1, Direction::Forward).collect();
        let second: Vec<_> = g.neighbors(1, Direction::Forward).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn degrees_match_edge_counts() {
        let g = CsrGraph::from_edges(&[(1, 2, 0.5), (3, 2, 0.5), (2, 4, 0.5)]);
        let two = g.internal_id(2).unwrap();
        assert_eq!(g.degree(two, Direction::Backward), 2);
        assert_eq!(g.degree(two, Direction::Forward), 1);
        assert_eq!(g.num_edges(), 3);
    }

    #[test]
    fn parallel_edges_are_preserved() {
        let g = CsrGraph::from_edges(&[(1, 2, 0.5), (1, 2, 0.7)]);
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.neighbors(0, Direction::Forward).count(), 2);
        assert_eq!(g.neighbors(1, Direction::Backward).count(), 2);
    }

    #[test]
    fn graph_is_shareable_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let g = Arc::new(chain());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let g = Arc::clone(&g);
                thread::spawn(move || g.neighbors(1, Direction::Backward).count())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 1);
        }
    }
}
