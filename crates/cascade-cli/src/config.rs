//! Command-line configuration of the `cascade` tool.

use std::path::PathBuf;
use std::thread;

use clap::Parser;

use cascade_diffusion::DiffusionModel;
use cascade_gpu::{GpuConfig, GpuError, LtTuning};

/// Influence maximization via RR-set sampling (IMM).
#[derive(Debug, Parser)]
#[command(name = "cascade", version, about)]
pub struct Args {
    /// The input file with the edge list.
    #[arg(short = 'i', long = "input-graph", help_heading = "Input Options")]
    pub input_graph: PathBuf,

    /// Reload a graph from binary input.
    #[arg(long = "reload-binary", help_heading = "Input Options")]
    pub reload_binary: bool,

    /// The input graph is undirected.
    #[arg(short = 'u', long, help_heading = "Input Options")]
    pub undirected: bool,

    /// The input graph is weighted.
    #[arg(short = 'w', long, help_heading = "Input Options")]
    pub weighted: bool,

    /// Write the loaded graph as a reloadable binary dump.
    #[arg(long = "dump-binary", value_name = "PATH", help_heading = "Input Options")]
    pub dump_binary: Option<PathBuf>,

    /// The size of the seed set.
    #[arg(short = 'k', long = "seed-set-size", help_heading = "Algorithm Options")]
    pub k: usize,

    /// The diffusion model to use (IC|LT).
    #[arg(short = 'd', long = "diffusion-model", help_heading = "Algorithm Options")]
    pub diffusion_model: DiffusionModel,

    /// The approximation factor epsilon.
    #[arg(short = 'e', long, default_value_t = 0.13, help_heading = "Algorithm Options")]
    pub epsilon: f64,

    /// Trigger the multi-threaded implementation.
    #[arg(short = 'p', long, help_heading = "Algorithm Options")]
    pub parallel: bool,

    /// Worker threads for the parallel implementation
    /// (default: hardware concurrency).
    #[arg(long, help_heading = "Algorithm Options")]
    pub threads: Option<usize>,

    /// Re-run the whole pipeline at every thread count, from the maximum
    /// down to 1.
    #[arg(long = "strong-scaling", help_heading = "Algorithm Options")]
    pub strong_scaling: bool,

    /// Trigger the GPU-offloaded implementation.
    #[arg(long = "cuda-parallel", help_heading = "GPU Options")]
    pub cuda_parallel: bool,

    /// Total streaming workers (CPU + GPU) for the GPU implementation
    /// (default: hardware concurrency).
    #[arg(long = "streaming-workers", help_heading = "GPU Options")]
    pub streaming_workers: Option<usize>,

    /// Streaming workers feeding the device.
    #[arg(long = "streaming-gpu-workers", default_value_t = 1, help_heading = "GPU Options")]
    pub streaming_gpu_workers: usize,

    /// LT kernel: CUDA threads per block.
    #[arg(long = "cuda-num-threads", help_heading = "GPU Options")]
    pub cuda_num_threads: Option<u32>,

    /// LT kernel: samples per block.
    #[arg(long = "cuda-block-density", help_heading = "GPU Options")]
    pub cuda_block_density: Option<u32>,

    /// LT kernel: samples per warp.
    #[arg(long = "cuda-warp-density", help_heading = "GPU Options")]
    pub cuda_warp_density: Option<u32>,

    /// The file name of the experiment log.
    #[arg(short = 'o', long, default_value = "output.json", help_heading = "Output Options")]
    pub output: PathBuf,

    /// Master RNG seed; every worker sub-stream is split from it.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// Hardware concurrency with a floor of 1.
pub fn hardware_threads() -> usize {
    thread::available_parallelism().map(|p| p.get()).unwrap_or(1)
}

impl Args {
    /// Assemble the GPU configuration from the flags.
    ///
    /// Partial LT tuning is rejected here; whether tuning is required or
    /// ignored for the selected model is decided by
    /// [`GpuConfig::validate`].
    pub fn gpu_config(&self) -> Result<GpuConfig, GpuError> {
        let lt_tuning = match (
            self.cuda_num_threads,
            self.cuda_block_density,
            self.cuda_warp_density,
        ) {
            (Some(threads_per_block), Some(block_density), Some(warp_density)) => {
                Some(LtTuning { threads_per_block, block_density, warp_density })
            }
            (None, None, None) => None,
            _ => {
                return Err(GpuError::Config(
                    "device tuning requires all of --cuda-num-threads, \
                     --cuda-block-density, --cuda-warp-density"
                        .into(),
                ))
            }
        };

        let config = GpuConfig {
            streaming_workers: self.streaming_workers.unwrap_or_else(hardware_threads),
            gpu_workers: self.streaming_gpu_workers,
            lt_tuning,
            ..Default::default()
        };
        config.validate(self.diffusion_model)?;
        Ok(config)
    }
}
