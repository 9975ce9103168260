use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid run configuration, detected before any sampling starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Device initialisation or transfer failure. Fatal — partial device
    /// state cannot be safely resumed, so this is never retried.
    #[error("device error: {0}")]
    Device(String),
}
