use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error reading graph input: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed edge at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("weight column mismatch at line {line}: input does not match the weighted flag")]
    WeightMismatch { line: usize },

    #[error("edge weight out of range (0, 1] at line {line}: {weight}")]
    InvalidWeight { line: usize, weight: f32 },

    #[error("binary graph dump is corrupt or from an incompatible version: {0}")]
    BadBinary(String),

    #[error("graph has no edges")]
    Empty,
}

impl From<bincode::Error> for LoadError {
    fn from(e: bincode::Error) -> Self {
        Self::BadBinary(e.to_string())
    }
}
