use thiserror::Error;

use cascade_engine::EngineError;

#[derive(Debug, Error)]
pub enum GpuError {
    /// Invalid GPU run configuration. Raised before any sampling starts.
    #[error("invalid GPU configuration: {0}")]
    Config(String),

    /// CUDA device initialisation or transfer failure. Fatal — partial
    /// device state cannot be resumed, so nothing retries this.
    #[error("CUDA device error: {0}")]
    Device(String),

    /// NVRTC kernel compilation failure.
    #[error("NVRTC compilation error: {0}")]
    KernelCompile(String),

    /// Built without the `cuda` feature.
    #[error("GPU support not compiled in (enable the `cuda` feature)")]
    Unavailable,
}

impl From<GpuError> for EngineError {
    fn from(e: GpuError) -> Self {
        match e {
            GpuError::Config(msg) => EngineError::Config(msg),
            other => EngineError::Device(other.to_string()),
        }
    }
}
