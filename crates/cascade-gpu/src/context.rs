//! Resident device state: the backward CSR plus the compiled kernels.

use std::sync::Arc;

use cudarc::driver::{CudaDevice, CudaFunction, CudaSlice, LaunchAsync, LaunchConfig};
use cudarc::nvrtc::compile_ptx;

use cascade_diffusion::{DiffusionModel, RrSet};
use cascade_graph::{CsrGraph, Direction};

use crate::config::LtTuning;
use crate::error::GpuError;
use crate::kernels::{IC_KERNEL, LT_KERNEL};

/// Threads per block for the untuned IC kernel.
const IC_BLOCK: u32 = 256;

/// Device-resident copy of the graph with one compiled kernel per model.
///
/// Built once per run; every sampling round transfers only its (root,
/// seed) batch and downloads the visited slab. Any device failure here is
/// fatal to the run — partial device state is never resumed.
pub struct DeviceContext {
    device: Arc<CudaDevice>,
    kernel: CudaFunction,
    d_offsets: CudaSlice<u32>,
    d_targets: CudaSlice<u32>,
    d_weights: CudaSlice<f32>,
    num_nodes: usize,
    model: DiffusionModel,
    tuning: Option<LtTuning>,
}

impl DeviceContext {
    /// Initialise device 0, compile the kernel for `model`, and upload the
    /// backward CSR.
    pub fn new(
        graph: &CsrGraph,
        model: DiffusionModel,
        tuning: Option<LtTuning>,
    ) -> Result<Self, GpuError> {
        let device = CudaDevice::new(0)
            .map_err(|e| GpuError::Device(format!("CudaDevice::new: {e}")))?;

        let (source, name) = match model {
            DiffusionModel::IndependentCascade => (IC_KERNEL, "ic_rr_sets"),
            DiffusionModel::LinearThreshold => (LT_KERNEL, "lt_rr_sets"),
        };
        let ptx = compile_ptx(source).map_err(|e| GpuError::KernelCompile(format!("{e}")))?;
        device
            .load_ptx(ptx, "cascade_rr", &[name])
            .map_err(|e| GpuError::Device(format!("load_ptx: {e}")))?;
        let kernel = device
            .get_func("cascade_rr", name)
            .ok_or_else(|| GpuError::Device(format!("kernel '{name}' not found after load")))?;

        let (offsets, targets, weights) = graph.csr_parts(Direction::Backward);
        let d_offsets = device
            .htod_sync_copy(offsets)
            .map_err(|e| GpuError::Device(format!("htod offsets: {e}")))?;
        let d_targets = device
            .htod_sync_copy(targets)
            .map_err(|e| GpuError::Device(format!("htod targets: {e}")))?;
        let d_weights = device
            .htod_sync_copy(weights)
            .map_err(|e| GpuError::Device(format!("htod weights: {e}")))?;

        Ok(Self {
            device,
            kernel,
            d_offsets,
            d_targets,
            d_weights,
            num_nodes: graph.num_nodes(),
            model,
            tuning,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn model(&self) -> DiffusionModel {
        self.model
    }

    /// Run one batch of samples and decode the visited slabs into RR sets.
    ///
    /// `roots` and `seeds` are parallel; one sample per entry.
    pub fn generate_batch(&self, roots: &[u32], seeds: &[u64]) -> Result<Vec<RrSet>, GpuError> {
        assert_eq!(roots.len(), seeds.len());
        let batch = roots.len();
        if batch == 0 {
            return Ok(Vec::new());
        }
        let n = self.num_nodes;
        let slab = batch * n;

        let d_roots = self
            .device
            .htod_sync_copy(roots)
            .map_err(|e| GpuError::Device(format!("htod roots: {e}")))?;
        let d_seeds = self
            .device
            .htod_sync_copy(seeds)
            .map_err(|e| GpuError::Device(format!("htod seeds: {e}")))?;
        let mut d_visited = self
            .device
            .alloc_zeros::<u8>(slab)
            .map_err(|e| GpuError::Device(format!("alloc visited slab: {e}")))?;
        let mut d_worklist = self
            .device
            .alloc_zeros::<u32>(slab)
            .map_err(|e| GpuError::Device(format!("alloc worklist slab: {e}")))?;

        match self.model {
            DiffusionModel::IndependentCascade => {
                let cfg = LaunchConfig {
                    grid_dim: ((batch as u32).div_ceil(IC_BLOCK), 1, 1),
                    block_dim: (IC_BLOCK, 1, 1),
                    shared_mem_bytes: 0,
                };
                unsafe {
                    self.kernel
                        .clone()
                        .launch(
                            cfg,
                            (
                                &self.d_offsets,
                                &self.d_targets,
                                &self.d_weights,
                                n as u32,
                                batch as u32,
                                &d_roots,
                                &d_seeds,
                                &mut d_visited,
                                &mut d_worklist,
                            ),
                        )
                        .map_err(|e| GpuError::Device(format!("IC kernel launch: {e}")))?;
                }
            }
            DiffusionModel::LinearThreshold => {
                let tuning = self
                    .tuning
                    .expect("validated LT configuration always carries tuning");
                let mut d_thresholds = self
                    .device
                    .alloc_zeros::<f32>(slab)
                    .map_err(|e| GpuError::Device(format!("alloc threshold slab: {e}")))?;
                let mut d_acc = self
                    .device
                    .alloc_zeros::<f32>(slab)
                    .map_err(|e| GpuError::Device(format!("alloc accumulator slab: {e}")))?;

                // Launch wave geometry from the tuning parameters:
                // `block_density` blocks of `threads_per_block` threads,
                // each covering `warp_density` samples in sequence.
                let wave =
                    (tuning.block_density * tuning.threads_per_block * tuning.warp_density)
                        as usize;
                let mut start = 0usize;
                while start < batch {
                    let end = (start + wave).min(batch);
                    let span = (end - start) as u32;
                    let cfg = LaunchConfig {
                        grid_dim: (span.div_ceil(tuning.threads_per_block), 1, 1),
                        block_dim: (tuning.threads_per_block, 1, 1),
                        shared_mem_bytes: 0,
                    };
                    unsafe {
                        self.kernel
                            .clone()
                            .launch(
                                cfg,
                                (
                                    &self.d_offsets,
                                    &self.d_targets,
                                    &self.d_weights,
                                    n as u32,
                                    start as u32,
                                    end as u32,
                                    &d_roots,
                                    &d_seeds,
                                    &mut d_visited,
                                    &mut d_worklist,
                                    &mut d_thresholds,
                                    &mut d_acc,
                                ),
                            )
                            .map_err(|e| GpuError::Device(format!("LT kernel launch: {e}")))?;
                    }
                    start = end;
                }
            }
        }

        self.device
            .synchronize()
            .map_err(|e| GpuError::Device(format!("synchronize: {e}")))?;

        let visited = self
            .device
            .dtoh_sync_copy(&d_visited)
            .map_err(|e| GpuError::Device(format!("dtoh visited slab: {e}")))?;

        // Decode: sample s owns visited[s*n .. (s+1)*n].
        let mut sets = Vec::with_capacity(batch);
        for s in 0..batch {
            let slab = &visited[s * n..(s + 1) * n];
            let set: RrSet = slab
                .iter()
                .enumerate()
                .filter(|&(_, &flag)| flag != 0)
                .map(|(v, _)| v as u32)
                .collect();
            debug_assert!(!set.is_empty());
            sets.push(set);
        }
        Ok(sets)
    }
}
