//! # cascade-engine
//!
//! The sampling-and-optimization core of the cascade influence-maximization
//! toolkit:
//!
//! - [`RrCollection`] — append-only RR-set store with per-vertex coverage
//!   tallies.
//! - [`select`] — greedy max-coverage seed selection over a collection
//!   (lazy heap, deterministic tie-breaking).
//! - [`SequentialGenerator`] / [`ThreadedGenerator`] — blocking,
//!   batch-synchronous execution strategies behind the [`RrGenerator`]
//!   seam; the GPU strategy lives in `cascade-gpu` behind the same trait.
//! - [`estimate_theta`] — adaptive sample-complexity schedule computing
//!   the minimal sample count that meets the (1-1/e-ε) guarantee.
//! - [`imm`] — the whole pipeline in one call.
//!
//! There is no global state: configuration is constructed by the driver
//! and passed in explicitly.

pub mod collection;
pub mod error;
pub mod estimator;
pub mod generate;
pub mod imm;
pub mod record;
pub mod select;

pub use collection::RrCollection;
pub use error::EngineError;
pub use estimator::{estimate_theta, logcnk, EstimatorConfig, ThetaEstimate};
pub use generate::{RrGenerator, SequentialGenerator, ThreadedGenerator};
pub use imm::{imm, ImmOutput};
pub use record::ExecutionRecord;
pub use select::{select, Seed, SeedSelection};
