//! Execution strategies driving RR-set generation.
//!
//! A generator owns its RNG sub-streams, so successive `generate` calls
//! (the estimator extends a collection round by round) continue the same
//! streams instead of replaying them. All strategies are blocking and
//! batch-synchronous: a call returns once every requested sample has been
//! merged into the collection.

use std::thread;

use cascade_diffusion::{sampler_for, DiffusionModel, RngFactory, RrSet};
use cascade_graph::CsrGraph;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;

use crate::collection::RrCollection;
use crate::error::EngineError;

// ─────────────────────────────────────────────
// Contract
// ─────────────────────────────────────────────

/// Generate `count` RR sets under `model` and append them to `collection`.
///
/// The graph is shared read-only; the collection is mutated only at the
/// strategy's per-batch merge point.
pub trait RrGenerator {
    fn generate(
        &mut self,
        graph: &CsrGraph,
        model: DiffusionModel,
        collection: &mut RrCollection,
        count: usize,
    ) -> Result<(), EngineError>;

    /// Worker count reported in the execution record.
    fn num_threads(&self) -> usize;
}

/// Split `count` across `workers`: the first `count % workers` workers take
/// one extra sample.
pub(crate) fn partition(count: usize, workers: usize) -> Vec<usize> {
    let base = count / workers;
    let extra = count % workers;
    (0..workers).map(|i| base + usize::from(i < extra)).collect()
}

// ─────────────────────────────────────────────
// Sequential
// ─────────────────────────────────────────────

/// Correctness baseline: one sub-stream, one sample at a time.
///
/// Uses worker stream 0, so its output is bit-identical to a single-worker
/// [`ThreadedGenerator`] run with the same master seed.
pub struct SequentialGenerator {
    rng: StdRng,
}

impl SequentialGenerator {
    pub fn new(factory: &RngFactory) -> Self {
        Self { rng: factory.worker_stream(0) }
    }
}

impl RrGenerator for SequentialGenerator {
    fn generate(
        &mut self,
        graph: &CsrGraph,
        model: DiffusionModel,
        collection: &mut RrCollection,
        count: usize,
    ) -> Result<(), EngineError> {
        let n = graph.num_nodes() as u32;
        let mut sampler = sampler_for(model, graph.num_nodes());
        for _ in 0..count {
            let root = self.rng.gen_range(0..n);
            collection.append(sampler.sample(graph, root, &mut self.rng));
        }
        Ok(())
    }

    fn num_threads(&self) -> usize {
        1
    }
}

// ─────────────────────────────────────────────
// Multi-threaded
// ─────────────────────────────────────────────

/// Data-parallel generation across a fixed worker pool.
///
/// Each worker owns an independently split sub-stream and buffers its
/// samples locally; buffers are merged into the shared collection once per
/// batch, in worker order, so there is no per-sample locking and the merged
/// contents are reproducible.
#[derive(Debug)]
pub struct ThreadedGenerator {
    streams: Vec<StdRng>,
}

impl ThreadedGenerator {
    /// A pool of `workers` threads. `workers` must be at least 1.
    pub fn new(factory: &RngFactory, workers: usize) -> Result<Self, EngineError> {
        if workers == 0 {
            return Err(EngineError::Config("worker count must be at least 1".into()));
        }
        let streams = (0..workers as u64).map(|i| factory.worker_stream(i)).collect();
        Ok(Self { streams })
    }

    /// A pool sized to hardware concurrency.
    pub fn with_hardware_concurrency(factory: &RngFactory) -> Self {
        let workers = thread::available_parallelism().map(|p| p.get()).unwrap_or(1);
        Self::new(factory, workers).expect("hardware concurrency is at least 1")
    }
}

impl RrGenerator for ThreadedGenerator {
    fn generate(
        &mut self,
        graph: &CsrGraph,
        model: DiffusionModel,
        collection: &mut RrCollection,
        count: usize,
    ) -> Result<(), EngineError> {
        if count == 0 {
            return Ok(());
        }

        let workers = self.streams.len();
        let shares = partition(count, workers);
        let n = graph.num_nodes() as u32;

        // One slot per worker; each worker takes the merge lock exactly once.
        let buffers: Mutex<Vec<Vec<RrSet>>> = Mutex::new(vec![Vec::new(); workers]);

        thread::scope(|scope| {
            for (i, rng) in self.streams.iter_mut().enumerate() {
                let share = shares[i];
                if share == 0 {
                    continue;
                }
                let buffers = &buffers;
                scope.spawn(move || {
                    let mut sampler = sampler_for(model, n as usize);
                    let mut local = Vec::with_capacity(share);
                    for _ in 0..share {
                        let root = rng.gen_range(0..n);
                        local.push(sampler.sample(graph, root, rng));
                    }
                    buffers.lock()[i] = local;
                });
            }
        });

        for buffer in buffers.into_inner() {
            collection.extend(buffer);
        }
        Ok(())
    }

    fn num_threads(&self) -> usize {
        self.streams.len()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
