//! Linear Threshold reverse-reachable sampling.

use std::collections::VecDeque;

use cascade_graph::{CsrGraph, Direction};
use rand::rngs::StdRng;
use rand::Rng;

use crate::rr::RrSet;
use crate::sampler::RrSampler;

/// LT sampler.
///
/// Exploration expands outward from the root over backward edges. The
/// first time a vertex is reached it draws a private threshold in [0, 1);
/// an accumulator sums the weights of backward edges arriving from
/// already-active vertices, and the vertex activates once the accumulator
/// meets its threshold. Each edge contributes to its endpoint's
/// accumulator exactly once, because every vertex activates (and is
/// expanded) at most once.
pub struct LtSampler {
    active: Vec<u32>,
    touched: Vec<u32>,
    threshold: Vec<f32>,
    acc: Vec<f32>,
    epoch: u32,
    queue: VecDeque<u32>,
}

impl LtSampler {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            active: vec![0; num_nodes],
            touched: vec![0; num_nodes],
            threshold: vec![0.0; num_nodes],
            acc: vec![0.0; num_nodes],
            epoch: 0,
            queue: VecDeque::new(),
        }
    }

    #[inline]
    fn next_epoch(&mut self) -> u32 {
        if self.epoch == u32::MAX {
            self.active.fill(0);
            self.touched.fill(0);
            self.epoch = 0;
        }
        self.epoch += 1;
        self.epoch
    }
}

impl RrSampler for LtSampler {
    fn sample(&mut self, graph: &CsrGraph, root: u32, rng: &mut StdRng) -> RrSet {
        let epoch = self.next_epoch();

        let mut out: RrSet = vec![root];
        self.active[root as usize] = epoch;
        self.queue.clear();
        self.queue.push_back(root);

        while let Some(u) = self.queue.pop_front() {
            for (v, w) in graph.neighbors(u, Direction::Backward) {
                let vi = v as usize;
                if self.active[vi] == epoch {
                    continue;
                }
                if self.touched[vi] != epoch {
                    self.touched[vi] = epoch;
                    self.threshold[vi] = rng.gen::<f32>();
                    self.acc[vi] = 0.0;
                }
                self.acc[vi] += w;
                if self.acc[vi] >= self.threshold[vi] {
                    self.active[vi] = epoch;
                    out.push(v);
                    self.queue.push_back(v);
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn unit_weight_chain_always_activates() {
        // Thresholds are < 1.0, so a unit-weight predecessor always joins.
        let g = CsrGraph::from_edges(&[(0, 1, 1.0), (1, 2, 1.0)]);
        let mut sampler = LtSampler::new(g.num_nodes());
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut set = sampler.sample(&g, 2, &mut rng);
            set.sort_unstable();
            assert_eq!(set, vec![0, 1, 2]);
        }
    }

    #[test]
    fn isolated_root_yields_singleton() {
        let g = CsrGraph::from_edges(&[(1, 2, 0.5)]);
        let mut sampler = LtSampler::new(g.num_nodes());
        let mut rng = StdRng::seed_from_u64(0);
        let root = g.internal_id(1).unwrap();
        assert_eq!(sampler.sample(&g, root, &mut rng), vec![root]);
    }

    #[test]
    fn one_threshold_draw_per_vertex() {
        // Diamond into 3: both 0→2 and 1→2 plus 2's own predecessors force
        // repeated accumulation on the same vertex in one sample. The set
        // must stay deterministic for a fixed stream.
        let g = CsrGraph::from_edges(&[
            (0, 2, 0.5),
            (1, 2, 0.5),
            (2, 3, 1.0),
            (0, 3, 0.3),
        ]);
        let mut sampler = LtSampler::new(g.num_nodes());
        let a = sampler.sample(&g, 3, &mut StdRng::seed_from_u64(5));
        let b = sampler.sample(&g, 3, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn accumulator_crosses_threshold_with_enough_active_neighbors() {
        // 0→2 (0.6) and 1→2 (0.6): once both 0 and 1 are active, vertex 2's
        // accumulator reaches 1.2 ≥ any threshold — but from root 2 the
        // exploration runs the other way. Use root 3 with 2→3 (1.0) to pull
        // 2 in, then check 0/1 join only per their drawn thresholds.
        let g = CsrGraph::from_edges(&[
            (0, 2, 0.6),
            (1, 2, 0.6),
            (2, 3, 1.0),
        ]);
        let mut sampler = LtSampler::new(g.num_nodes());
        let mut rng = StdRng::seed_from_u64(11);
        let set = sampler.sample(&g, 3, &mut rng);
        assert!(set.contains(&3));
        assert!(set.contains(&2), "unit-weight edge must pull 2 in");
        assert!(set.len() >= 2 && set.len() <= 4);
    }

    #[test]
    fn scratch_reuse_does_not_leak_between_samples() {
        let g = CsrGraph::from_edges(&[(0, 1, 1.0), (1, 2, 1.0)]);
        let mut sampler = LtSampler::new(g.num_nodes());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sampler.sample(&g, 2, &mut rng).len(), 3);
        assert_eq!(sampler.sample(&g, 0, &mut rng), vec![0]);
    }
}
