//! Greedy max-coverage seed selection.

use std::collections::BinaryHeap;

use crate::collection::RrCollection;

// ─────────────────────────────────────────────
// Result types
// ─────────────────────────────────────────────

/// One selected seed with the number of sets it newly covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub vertex: u32,
    pub marginal_gain: u32,
}

/// Ordered seed list plus the coverage it achieved.
#[derive(Debug, Clone)]
pub struct SeedSelection {
    pub seeds: Vec<Seed>,
    /// Sets covered by the selection.
    pub covered: u32,
    /// Total sets in the collection at selection time.
    pub total: u32,
}

impl SeedSelection {
    /// Fraction of the collection covered, in [0, 1].
    pub fn coverage_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.covered) / f64::from(self.total)
        }
    }

    /// Unbiased spread estimate: coverage fraction scaled by vertex count.
    pub fn spread_estimate(&self, num_nodes: usize) -> f64 {
        self.coverage_fraction() * num_nodes as f64
    }

    /// Seed vertices in selection order.
    pub fn vertices(&self) -> Vec<u32> {
        self.seeds.iter().map(|s| s.vertex).collect()
    }
}

// ─────────────────────────────────────────────
// Lazy-heap greedy selection
// ─────────────────────────────────────────────

/// Heap entry ordered by (count desc, vertex asc) so ties break toward the
/// lowest internal index.
#[derive(Debug, PartialEq, Eq)]
struct Candidate {
    count: u32,
    vertex: u32,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Pick up to `k` seeds maximising covered-set count.
///
/// Lazy max-heap: popped entries whose recorded count is stale against the
/// working tally are reinserted with the current value instead of being
/// acted on, so total work stays near-linear in collection size rather than
/// rescanning all vertices per pick. The collection itself is not mutated —
/// the working tally and covered flags are private to this call, making
/// repeated selection on the same collection deterministic.
pub fn select(collection: &RrCollection, k: usize) -> SeedSelection {
    let total = collection.len() as u32;
    let mut selection = SeedSelection { seeds: Vec::with_capacity(k), covered: 0, total };
    if k == 0 || total == 0 {
        return selection;
    }

    let mut tally: Vec<u32> = collection.tallies().to_vec();
    let mut covered = vec![false; collection.len()];

    let mut heap: BinaryHeap<Candidate> = tally
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(v, &count)| Candidate { count, vertex: v as u32 })
        .collect();

    while selection.seeds.len() < k {
        let Some(top) = heap.pop() else { break };
        let current = tally[top.vertex as usize];
        if current != top.count {
            // Stale entry: revalidate against the working tally.
            if current > 0 {
                heap.push(Candidate { count: current, vertex: top.vertex });
            }
            continue;
        }
        if current == 0 {
            // Every remaining set is covered.
            break;
        }

        selection.seeds.push(Seed { vertex: top.vertex, marginal_gain: current });

        // Cover every set containing the pick; decrement the other members
        // of those sets so no set counts toward a later seed.
        for &s in collection.sets_containing(top.vertex) {
            let si = s as usize;
            if covered[si] {
                continue;
            }
            covered[si] = true;
            selection.covered += 1;
            for &m in collection.set(s) {
                tally[m as usize] -= 1;
            }
        }
        debug_assert_eq!(tally[top.vertex as usize], 0);
    }

    selection
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(sets: &[&[u32]], n: usize) -> RrCollection {
        let mut c = RrCollection::new(n);
        c.extend(sets.iter().map(|s| s.to_vec()));
        c
    }

    #[test]
    fn picks_highest_tally_first() {
        // 1 appears in 3 sets, 0 in 2, 2 in 1.
        let c = collection(&[&[0, 1], &[1], &[1, 2], &[0]], 3);
        let sel = select(&c, 1);
        assert_eq!(sel.seeds.len(), 1);
        assert_eq!(sel.seeds[0].vertex, 1);
        assert_eq!(sel.seeds[0].marginal_gain, 3);
        assert_eq!(sel.covered, 3);
    }

    #[test]
    fn no_set_double_counted() {
        // Vertex 0 and 1 share two sets; the second pick only gains the
        // sets not already covered by the first.
        let c = collection(&[&[0, 1], &[0, 1], &[0], &[1], &[2]], 3);
        let sel = select(&c, 3);

        let gains: u32 = sel.seeds.iter().map(|s| s.marginal_gain).sum();
        assert_eq!(gains, sel.covered, "sum of marginal gains must equal covered count");
        assert_eq!(sel.covered, 5);
    }

    #[test]
    fn ties_break_to_lowest_vertex() {
        let c = collection(&[&[2], &[5], &[9]], 10);
        let sel = select(&c, 3);
        let picked: Vec<u32> = sel.vertices();
        assert_eq!(picked, vec![2, 5, 9]);
    }

    #[test]
    fn selection_is_deterministic_across_runs() {
        let c = collection(&[&[0, 3], &[1, 3], &[2, 3], &[0, 1], &[4]], 5);
        let a = select(&c, 4);
        let b = select(&c, 4);
        assert_eq!(a.seeds, b.seeds);
        assert_eq!(a.covered, b.covered);
    }

    #[test]
    fn stops_when_everything_is_covered() {
        let c = collection(&[&[0], &[0, 1]], 4);
        let sel = select(&c, 4);
        assert_eq!(sel.seeds.len(), 1, "one pick covers every set");
        assert_eq!(sel.covered, 2);
        assert!((sel.coverage_fraction() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn k_zero_selects_nothing() {
        let c = collection(&[&[0], &[1]], 2);
        let sel = select(&c, 0);
        assert!(sel.seeds.is_empty());
        assert_eq!(sel.covered, 0);
        assert_eq!(sel.coverage_fraction(), 0.0);
    }

    #[test]
    fn empty_collection_is_fine() {
        let c = RrCollection::new(3);
        let sel = select(&c, 2);
        assert!(sel.seeds.is_empty());
        assert_eq!(sel.coverage_fraction(), 0.0);
    }

    #[test]
    fn coverage_is_monotone_in_k() {
        let c = collection(
            &[&[0, 1], &[1, 2], &[2, 3], &[3, 4], &[4, 0], &[5]],
            6,
        );
        let mut last = 0.0;
        for k in 0..=6 {
            let frac = select(&c, k).coverage_fraction();
            assert!(frac >= last, "coverage must be non-decreasing in k");
            assert!((0.0..=1.0).contains(&frac));
            last = frac;
        }
    }

    #[test]
    fn spread_estimate_scales_by_vertex_count() {
        let c = collection(&[&[0], &[0]], 10);
        let sel = select(&c, 1);
        assert!((sel.spread_estimate(10) - 10.0).abs() < 1e-12);
    }
}
