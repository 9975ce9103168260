//! Execution record: passive telemetry written by the estimator and the
//! generation phases, serialised by the driver into the experiment log.

use serde::Serialize;

use cascade_diffusion::DiffusionModel;

/// One run's worth of counters and phase durations.
///
/// Mutated only by the estimator and the top-level run; everything else
/// treats it as read-only. Per-round vectors are appended in wall-clock
/// order — strong-scaling sweeps rely on that ordering for comparability.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    #[serde(rename = "Algorithm")]
    pub algorithm: &'static str,

    #[serde(rename = "DiffusionModel")]
    pub diffusion_model: String,

    #[serde(rename = "Epsilon")]
    pub epsilon: f64,

    #[serde(rename = "K")]
    pub k: usize,

    /// Constant failure-probability exponent of the tool configuration.
    #[serde(rename = "L")]
    pub l: u32,

    #[serde(rename = "NumThreads")]
    pub num_threads: usize,

    /// Total wall time of the run, in milliseconds. Set by the driver.
    #[serde(rename = "Total")]
    pub total_ms: u64,

    /// Every sample-size value tried during estimation, in order. The
    /// sequence is non-decreasing by construction.
    #[serde(rename = "ThetaPrimes")]
    pub theta_primes: Vec<usize>,

    /// Per-round RR-set generation time during estimation, in ms.
    #[serde(rename = "ThetaEstimationGenerate")]
    pub estimation_generate_ms: Vec<u64>,

    /// Per-round seed-selection time during estimation, in ms.
    #[serde(rename = "ThetaEstimationSelect")]
    pub estimation_select_ms: Vec<u64>,

    /// Final sample count used for the production collection.
    #[serde(rename = "Theta")]
    pub theta: usize,

    /// Full-scale RR-set generation time, in ms.
    #[serde(rename = "GenerateRRRSets")]
    pub generate_ms: u64,

    /// Final seed-selection time, in ms.
    #[serde(rename = "FindMostInfluentialSet")]
    pub select_ms: u64,

    /// Selected seeds in external ID space. Set by the driver after
    /// remapping.
    #[serde(rename = "Seeds")]
    pub seeds: Vec<u64>,
}

impl ExecutionRecord {
    pub fn new(model: DiffusionModel, epsilon: f64, k: usize, num_threads: usize) -> Self {
        Self {
            algorithm: "IMM",
            diffusion_model: model.to_string(),
            epsilon,
            k,
            l: 1,
            num_threads,
            total_ms: 0,
            theta_primes: Vec::new(),
            estimation_generate_ms: Vec::new(),
            estimation_select_ms: Vec::new(),
            theta: 0,
            generate_ms: 0,
            select_ms: 0,
            seeds: Vec::new(),
        }
    }
}
