//! GPU run configuration and its eager validation.

use cascade_diffusion::DiffusionModel;

use crate::error::GpuError;

/// Device-tuning granularity for the Linear Threshold kernel.
///
/// Required for LT, meaningless for IC (the IC kernel is one thread per
/// sample and tunes nothing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LtTuning {
    /// CUDA threads per block.
    pub threads_per_block: u32,
    /// Samples mapped to one block.
    pub block_density: u32,
    /// Samples mapped to one warp within a block.
    pub warp_density: u32,
}

/// Configuration of the GPU-offloaded execution strategy.
#[derive(Debug, Clone, Copy)]
pub struct GpuConfig {
    /// Total streaming workers (CPU + GPU). Must be ≥ 1.
    pub streaming_workers: usize,
    /// Workers feeding the device. Must satisfy
    /// `1 ≤ gpu_workers ≤ streaming_workers`; the remainder run on CPU.
    pub gpu_workers: usize,
    /// (root, seed) pairs transferred to the device per round.
    pub batch_size: usize,
    /// LT kernel tuning. See [`LtTuning`].
    pub lt_tuning: Option<LtTuning>,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            streaming_workers: 1,
            gpu_workers: 1,
            batch_size: 4_096,
            lt_tuning: None,
        }
    }
}

impl GpuConfig {
    /// Validate against the selected diffusion model.
    ///
    /// Runs before any device work: worker-count violations and missing LT
    /// tuning are configuration errors; tuning supplied for IC is ignored
    /// with a warning rather than rejected.
    pub fn validate(&self, model: DiffusionModel) -> Result<(), GpuError> {
        if self.streaming_workers == 0 {
            return Err(GpuError::Config("streaming worker count must be at least 1".into()));
        }
        if self.gpu_workers == 0 {
            return Err(GpuError::Config("GPU worker count must be at least 1".into()));
        }
        if self.gpu_workers > self.streaming_workers {
            return Err(GpuError::Config(format!(
                "GPU worker count ({}) exceeds total streaming workers ({})",
                self.gpu_workers, self.streaming_workers
            )));
        }
        if self.batch_size == 0 {
            return Err(GpuError::Config("batch size must be at least 1".into()));
        }

        match model {
            DiffusionModel::LinearThreshold => {
                let Some(tuning) = self.lt_tuning else {
                    return Err(GpuError::Config(
                        "LT requires device tuning parameters (threads/block/warp)".into(),
                    ));
                };
                if tuning.threads_per_block == 0
                    || tuning.block_density == 0
                    || tuning.warp_density == 0
                {
                    return Err(GpuError::Config(format!(
                        "LT device tuning parameters must be positive, got {tuning:?}"
                    )));
                }
            }
            DiffusionModel::IndependentCascade => {
                if self.lt_tuning.is_some() {
                    tracing::warn!("IC ignores the supplied device tuning parameters");
                }
            }
        }
        Ok(())
    }

    /// CPU workers left over after the device workers are accounted for.
    pub fn cpu_workers(&self) -> usize {
        self.streaming_workers - self.gpu_workers
    }
}
