//! Top-level entry point: estimation, full-scale generation, final
//! selection.

use std::time::Instant;

use cascade_diffusion::DiffusionModel;
use cascade_graph::CsrGraph;

use crate::collection::RrCollection;
use crate::error::EngineError;
use crate::estimator::{estimate_theta, EstimatorConfig};
use crate::generate::RrGenerator;
use crate::record::ExecutionRecord;
use crate::select::{select, SeedSelection};

/// Seeds (internal vertex indices) plus the run's telemetry.
///
/// The driver remaps the selection into external ID space and fills
/// `record.seeds` / `record.total_ms` before serialising.
#[derive(Debug)]
pub struct ImmOutput {
    pub selection: SeedSelection,
    pub record: ExecutionRecord,
}

/// Run the full pipeline: compute Theta, regenerate a fresh collection of
/// that size, and greedily select up to `k` seeds.
///
/// The generator's sub-streams continue across phases, so estimation
/// samples and production samples are independent draws from the same
/// split streams.
pub fn imm(
    graph: &CsrGraph,
    model: DiffusionModel,
    k: usize,
    config: &EstimatorConfig,
    generator: &mut dyn RrGenerator,
) -> Result<ImmOutput, EngineError> {
    let mut record = ExecutionRecord::new(model, config.epsilon, k, generator.num_threads());

    let estimate = estimate_theta(graph, model, k, config, generator, &mut record)?;
    record.theta = estimate.theta;
    tracing::info!(
        theta = estimate.theta,
        lower_bound = estimate.lower_bound,
        rounds = record.theta_primes.len(),
        "theta estimation complete"
    );

    let mut collection = RrCollection::new(graph.num_nodes());
    let generate_start = Instant::now();
    generator.generate(graph, model, &mut collection, estimate.theta)?;
    record.generate_ms = generate_start.elapsed().as_millis() as u64;

    let select_start = Instant::now();
    let selection = select(&collection, k);
    record.select_ms = select_start.elapsed().as_millis() as u64;

    tracing::info!(
        seeds = selection.seeds.len(),
        coverage = selection.coverage_fraction(),
        "seed selection complete"
    );

    Ok(ImmOutput { selection, record })
}
