//! Independent Cascade reverse-reachable sampling.

use std::collections::VecDeque;

use cascade_graph::{CsrGraph, Direction};
use rand::rngs::StdRng;
use rand::Rng;

use crate::rr::RrSet;
use crate::sampler::RrSampler;

/// IC sampler: breadth-first expansion over backward edges, each edge
/// firing independently with probability equal to its weight.
///
/// Scratch buffers are reused across calls. The visited marker is
/// epoch-stamped so a sample costs no O(n) clear — only the epoch counter
/// advances between calls.
pub struct IcSampler {
    visited: Vec<u32>,
    epoch: u32,
    queue: VecDeque<u32>,
}

impl IcSampler {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            visited: vec![0; num_nodes],
            epoch: 0,
            queue: VecDeque::new(),
        }
    }

    #[inline]
    fn next_epoch(&mut self) -> u32 {
        if self.epoch == u32::MAX {
            self.visited.fill(0);
            self.epoch = 0;
        }
        self.epoch += 1;
        self.epoch
    }
}

impl RrSampler for IcSampler {
    fn sample(&mut self, graph: &CsrGraph, root: u32, rng: &mut StdRng) -> RrSet {
        let epoch = self.next_epoch();

        let mut out: RrSet = vec![root];
        self.visited[root as usize] = epoch;
        self.queue.clear();
        self.queue.push_back(root);

        while let Some(u) = self.queue.pop_front() {
            for (v, w) in graph.neighbors(u, Direction::Backward) {
                // One draw per edge per expansion attempt, before the
                // visited check — the stream advances identically whether
                // or not v was already reached.
                let fires = rng.gen::<f32>() < w;
                if fires && self.visited[v as usize] != epoch {
                    self.visited[v as usize] = epoch;
                    out.push(v);
                    self.queue.push_back(v);
                }
            }
        }

        out
    }
}
