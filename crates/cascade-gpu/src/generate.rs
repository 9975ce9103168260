//! The GPU-offloaded execution strategy.

use std::thread;

use cascade_diffusion::{sampler_for, DiffusionModel, RngFactory, RrSet};
use cascade_engine::{EngineError, RrCollection, RrGenerator};
use cascade_graph::CsrGraph;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::GpuConfig;
use crate::context::DeviceContext;
use crate::error::GpuError;

/// Hybrid generator: a bounded pool of streaming device workers fed in
/// rounds of `batch_size` (root, seed) pairs, optionally overlapped with
/// CPU sampling workers taking their proportional share of each request.
///
/// Worker sub-streams are split exactly as in the CPU strategies: CPU
/// workers take streams `0..cpu`, device workers take streams `cpu..total`.
/// Device failures abort the run; nothing is retried.
pub struct GpuGenerator {
    config: GpuConfig,
    context: DeviceContext,
    cpu_streams: Vec<StdRng>,
    gpu_streams: Vec<StdRng>,
    next_gpu_worker: usize,
}

impl GpuGenerator {
    /// Validate `config` against `model`, initialise the device, and make
    /// the graph resident. Configuration errors surface before any device
    /// work starts.
    pub fn new(
        graph: &CsrGraph,
        model: DiffusionModel,
        config: GpuConfig,
        factory: &RngFactory,
    ) -> Result<Self, GpuError> {
        config.validate(model)?;
        let context = DeviceContext::new(graph, model, config.lt_tuning)?;

        let cpu = config.cpu_workers();
        let cpu_streams = (0..cpu as u64).map(|i| factory.worker_stream(i)).collect();
        let gpu_streams = (0..config.gpu_workers as u64)
            .map(|j| factory.worker_stream(cpu as u64 + j))
            .collect();

        Ok(Self { config, context, cpu_streams, gpu_streams, next_gpu_worker: 0 })
    }

    /// Device share of a request, proportional to the worker split.
    fn device_share(&self, count: usize) -> usize {
        if self.cpu_streams.is_empty() {
            count
        } else {
            count * self.config.gpu_workers / self.config.streaming_workers
        }
    }
}

impl RrGenerator for GpuGenerator {
    fn generate(
        &mut self,
        graph: &CsrGraph,
        model: DiffusionModel,
        collection: &mut RrCollection,
        count: usize,
    ) -> Result<(), EngineError> {
        if model != self.context.model() {
            return Err(EngineError::Config(format!(
                "generator was initialised for {} but asked to sample {}",
                self.context.model(),
                model
            )));
        }
        if graph.num_nodes() != self.context.num_nodes() {
            return Err(EngineError::Config(
                "generator is bound to a different graph than the one supplied".into(),
            ));
        }
        if count == 0 {
            return Ok(());
        }

        let n = graph.num_nodes() as u32;
        let gpu_total = self.device_share(count);
        let cpu_total = count - gpu_total;
        let batch_size = self.config.batch_size;

        let cpu_workers = self.cpu_streams.len();
        let cpu_buffers: Mutex<Vec<Vec<RrSet>>> = Mutex::new(vec![Vec::new(); cpu_workers]);
        let mut gpu_result: Result<Vec<RrSet>, GpuError> = Ok(Vec::new());

        thread::scope(|scope| {
            // CPU workers sample their share while the device loop below
            // streams batches; both sides meet at the end of the scope.
            let shares = if cpu_workers > 0 {
                partition(cpu_total, cpu_workers)
            } else {
                Vec::new()
            };
            for (i, rng) in self.cpu_streams.iter_mut().enumerate() {
                let share = shares[i];
                if share == 0 {
                    continue;
                }
                let cpu_buffers = &cpu_buffers;
                scope.spawn(move || {
                    let mut sampler = sampler_for(model, n as usize);
                    let mut local = Vec::with_capacity(share);
                    for _ in 0..share {
                        let root = rng.gen_range(0..n);
                        local.push(sampler.sample(graph, root, rng));
                    }
                    cpu_buffers.lock()[i] = local;
                });
            }

            let mut produced = Vec::with_capacity(gpu_total);
            let mut remaining = gpu_total;
            while remaining > 0 {
                let batch = remaining.min(batch_size);
                let rng = &mut self.gpu_streams[self.next_gpu_worker];
                self.next_gpu_worker = (self.next_gpu_worker + 1) % self.config.gpu_workers;

                let roots: Vec<u32> = (0..batch).map(|_| rng.gen_range(0..n)).collect();
                let seeds: Vec<u64> = (0..batch).map(|_| rng.gen()).collect();

                match self.context.generate_batch(&roots, &seeds) {
                    Ok(sets) => produced.extend(sets),
                    Err(e) => {
                        gpu_result = Err(e);
                        break;
                    }
                }
                remaining -= batch;
            }
            if gpu_result.is_ok() {
                gpu_result = Ok(produced);
            }
        });

        let gpu_sets = gpu_result.map_err(EngineError::from)?;
        for buffer in cpu_buffers.into_inner() {
            collection.extend(buffer);
        }
        collection.extend(gpu_sets);
        Ok(())
    }

    fn num_threads(&self) -> usize {
        self.config.streaming_workers
    }
}

/// Split `count` across `workers`, remainder to the first workers.
fn partition(count: usize, workers: usize) -> Vec<usize> {
    let base = count / workers;
    let extra = count % workers;
    (0..workers).map(|i| base + usize::from(i < extra)).collect()
}
