//! Adaptive sample-size (Theta) estimation.
//!
//! The sample count that satisfies the (1-1/e-ε) guarantee depends on the
//! variance the graph and diffusion model induce, not on a fixed constant.
//! The estimator amortises that uncertainty: starting from a closed-form
//! lower bound it runs generate+select rounds at geometrically increasing
//! sample counts, stopping as soon as the achieved coverage clears the
//! martingale bound for the round's spread target. The accepted lower
//! bound then feeds the closed-form formula for the final Theta.
//!
//! All constants flow from [`EstimatorConfig`]; nothing in the round loop
//! is hard-coded.

use std::f64::consts::{E, LN_2, SQRT_2};
use std::time::Instant;

use cascade_diffusion::DiffusionModel;
use cascade_graph::CsrGraph;

use crate::collection::RrCollection;
use crate::error::EngineError;
use crate::generate::RrGenerator;
use crate::record::ExecutionRecord;
use crate::select::select;

// ─────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────

/// Tuning parameters of the estimation schedule.
#[derive(Debug, Clone, Copy)]
pub struct EstimatorConfig {
    /// Approximation parameter ε of the (1-1/e-ε) guarantee. Must be
    /// positive.
    pub epsilon: f64,
    /// Failure-probability exponent: the guarantee holds with probability
    /// ≥ 1 - n^(-ell). Default: `1.0`.
    pub ell: f64,
    /// Cap on estimation rounds. Default (`None`): `floor(log2 n) - 1`,
    /// never below 1.
    pub max_rounds: Option<u32>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self { epsilon: 0.13, ell: 1.0, max_rounds: None }
    }
}

impl EstimatorConfig {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.epsilon > 0.0) {
            return Err(EngineError::Config(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(self.ell > 0.0) {
            return Err(EngineError::Config(format!("ell must be positive, got {}", self.ell)));
        }
        Ok(())
    }
}

/// Outcome of the estimation phase.
#[derive(Debug, Clone, Copy)]
pub struct ThetaEstimate {
    /// Sample count for the production-scale collection.
    pub theta: usize,
    /// Accepted lower bound on the optimal spread.
    pub lower_bound: f64,
}

// ─────────────────────────────────────────────
// Closed-form pieces
// ─────────────────────────────────────────────

/// `ln C(n, k)` without overflowing intermediate factorials.
pub fn logcnk(n: u64, k: u64) -> f64 {
    let k = k.min(n);
    let mut sum = 0.0;
    for i in (n - k + 1)..=n {
        sum += (i as f64).ln();
    }
    for i in 1..=k {
        sum -= (i as f64).ln();
    }
    sum
}

// ─────────────────────────────────────────────
// Estimation loop
// ─────────────────────────────────────────────

/// Run the adaptive schedule and compute Theta.
///
/// Every sample-size value tried and both per-round phase durations are
/// appended to `record` in wall-clock order. If no round satisfies the
/// stopping condition within the round cap, the last round's estimate is
/// accepted.
pub fn estimate_theta(
    graph: &CsrGraph,
    model: DiffusionModel,
    k: usize,
    config: &EstimatorConfig,
    generator: &mut dyn RrGenerator,
    record: &mut ExecutionRecord,
) -> Result<ThetaEstimate, EngineError> {
    config.validate()?;
    let n = graph.num_nodes();
    if n < 2 {
        return Err(EngineError::Config(format!(
            "graph must have at least 2 vertices, got {n}"
        )));
    }

    let nf = n as f64;
    let ln_n = nf.ln();
    let log2_n = nf.log2();
    let eps = config.epsilon;
    let eps_prime = SQRT_2 * eps;
    // Rescaled so the union bound over all estimation rounds still leaves
    // failure probability n^(-ell) for the whole run.
    let ell = config.ell * (1.0 + LN_2 / ln_n);
    let lcnk = logcnk(n as u64, k as u64);

    let lambda_prime = (2.0 + 2.0 * eps_prime / 3.0)
        * (lcnk + ell * ln_n + log2_n.max(1.0).ln())
        * nf
        / (eps_prime * eps_prime);

    let rounds = config
        .max_rounds
        .unwrap_or_else(|| (log2_n.floor() as u32).saturating_sub(1).max(1));

    let mut collection = RrCollection::new(n);
    let mut lower_bound = 1.0;

    for round in 1..=rounds {
        let x = nf / 2f64.powi(round as i32);
        let theta_round = (lambda_prime / x).ceil() as usize;
        record.theta_primes.push(theta_round);

        let need = theta_round.saturating_sub(collection.len());
        let generate_start = Instant::now();
        generator.generate(graph, model, &mut collection, need)?;
        record
            .estimation_generate_ms
            .push(generate_start.elapsed().as_millis() as u64);

        let select_start = Instant::now();
        let selection = select(&collection, k);
        record
            .estimation_select_ms
            .push(select_start.elapsed().as_millis() as u64);

        let spread = selection.spread_estimate(n);
        let target = (1.0 + eps_prime) * x;
        tracing::debug!(
            round,
            samples = collection.len(),
            spread,
            target,
            "estimation round"
        );

        lower_bound = (spread / (1.0 + eps_prime)).max(1.0);
        if spread >= target {
            break;
        }
    }

    let frac = 1.0 - E.recip();
    let alpha = (ell * ln_n + LN_2).sqrt();
    let beta = (frac * (lcnk + ell * ln_n + LN_2)).sqrt();
    let lambda_star = 2.0 * nf * ((frac * alpha + beta) / eps).powi(2);

    let mut theta = (lambda_star / lower_bound).ceil() as usize;
    if let Some(&last) = record.theta_primes.last() {
        theta = theta.max(last);
    }

    Ok(ThetaEstimate { theta, lower_bound })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
