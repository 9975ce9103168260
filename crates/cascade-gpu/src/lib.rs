//! # cascade-gpu
//!
//! GPU-offloaded RR-set generation behind the engine's `RrGenerator` seam.
//!
//! ## Features
//! - `cuda` *(default: off)* — enables device execution via `cudarc` +
//!   NVRTC-compiled kernels. Requires the CUDA 12.x driver at runtime.
//!   Without it the crate still provides [`GpuConfig`] and its validation,
//!   so configuration errors are reportable from any build.
//!
//! ## Architecture
//! ```text
//! generate(count)
//!     ├── CPU workers (streaming_workers − gpu_workers)
//!     │       sample their share on host, buffer locally
//!     └── device loop (gpu_workers sub-streams, round-robin)
//!             per round: draw batch of (root, seed) pairs
//!                        → transfer → kernel → download visited slabs
//!     merge: CPU buffers in worker order, then device output
//! ```
//!
//! The estimator and selector never see any of this — they only ask the
//! generator for N samples. Device init or transfer failure is fatal and
//! never retried; invalid worker configuration is rejected before any
//! sampling begins.

pub mod config;
pub mod error;

#[cfg(feature = "cuda")]
pub mod context;
#[cfg(feature = "cuda")]
pub mod generate;
#[cfg(feature = "cuda")]
pub mod kernels;

pub use config::{GpuConfig, LtTuning};
pub use error::GpuError;

#[cfg(feature = "cuda")]
pub use context::DeviceContext;
#[cfg(feature = "cuda")]
pub use generate::GpuGenerator;

/// Whether this build can execute on a device at all.
pub fn cuda_compiled_in() -> bool {
    cfg!(feature = "cuda")
}
