//! # cascade
//!
//! Command-line driver: load a graph, run the IMM pipeline under the
//! selected execution strategy, and write the experiment log.
//!
//! ```text
//! cascade -i graph.tsv -w -k 50 -d IC -e 0.13 -p -o run.json
//! cascade -i graph.tsv -w -k 50 -d LT --strong-scaling
//! cascade -i graph.tsv -w -k 50 -d IC --cuda-parallel \
//!         --streaming-workers 8 --streaming-gpu-workers 2
//! ```
//!
//! The log is a JSON array with one record per run; a strong-scaling sweep
//! rewrites it after every thread count so partial sweeps stay
//! inspectable.

mod config;

use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use thiserror::Error;

use cascade_diffusion::{DiffusionModel, RngFactory, WEIGHT_STREAM};
use cascade_engine::{
    imm, EngineError, EstimatorConfig, RrGenerator, SequentialGenerator, ThreadedGenerator,
};
use cascade_graph::{CsrGraph, LoadError, LoadOptions};
use cascade_gpu::GpuError;

use crate::config::{hardware_threads, Args};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error("failed to write experiment log: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialise experiment log: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let factory = RngFactory::new(args.seed);
    let model = args.diffusion_model;

    // Reject a bad GPU setup before touching the graph or any sampling.
    let gpu_config = if args.cuda_parallel { Some(args.gpu_config()?) } else { None };

    tracing::info!(input = %args.input_graph.display(), "loading");
    let graph = if args.reload_binary {
        cascade_graph::load_binary(&args.input_graph)?
    } else {
        let mut weight_rng = factory.stream(WEIGHT_STREAM);
        cascade_graph::load_edge_list(
            &args.input_graph,
            LoadOptions { weighted: args.weighted, undirected: args.undirected },
            &mut weight_rng,
        )?
    };
    tracing::info!(nodes = graph.num_nodes(), edges = graph.num_edges(), "loading done");

    if let Some(path) = &args.dump_binary {
        cascade_graph::dump_binary(path, &graph)?;
        tracing::info!(path = %path.display(), "binary dump written");
    }

    let estimator = EstimatorConfig::new(args.epsilon);
    let mut log: Vec<serde_json::Value> = Vec::new();

    if args.strong_scaling {
        // Same master seed at every thread count; per-phase wall-clock
        // ordering in the records is what makes the sweep comparable.
        let max_threads = args.threads.unwrap_or_else(hardware_threads);
        for threads in (1..=max_threads).rev() {
            let mut generator: Box<dyn RrGenerator> = if threads == 1 {
                Box::new(SequentialGenerator::new(&factory))
            } else {
                Box::new(ThreadedGenerator::new(&factory, threads)?)
            };
            run_once(&graph, model, &args, &estimator, generator.as_mut(), &mut log)?;
            write_log(&args, &log)?;
        }
    } else if let Some(gpu_config) = gpu_config {
        let mut generator = build_gpu_generator(&graph, model, gpu_config, &factory)?;
        run_once(&graph, model, &args, &estimator, generator.as_mut(), &mut log)?;
        write_log(&args, &log)?;
    } else if args.parallel {
        let mut generator = match args.threads {
            Some(threads) => ThreadedGenerator::new(&factory, threads)?,
            None => ThreadedGenerator::with_hardware_concurrency(&factory),
        };
        run_once(&graph, model, &args, &estimator, &mut generator, &mut log)?;
        write_log(&args, &log)?;
    } else {
        let mut generator = SequentialGenerator::new(&factory);
        run_once(&graph, model, &args, &estimator, &mut generator, &mut log)?;
        write_log(&args, &log)?;
    }

    Ok(())
}

/// One full pipeline run appended to the log, with seeds remapped to
/// external ID space.
fn run_once(
    graph: &CsrGraph,
    model: DiffusionModel,
    args: &Args,
    estimator: &EstimatorConfig,
    generator: &mut dyn RrGenerator,
    log: &mut Vec<serde_json::Value>,
) -> Result<(), CliError> {
    let start = Instant::now();
    let mut output = imm(graph, model, args.k, estimator, generator)?;
    output.record.total_ms = start.elapsed().as_millis() as u64;
    output.record.seeds = graph.to_external(&output.selection.vertices());

    tracing::info!(
        threads = output.record.num_threads,
        theta = output.record.theta,
        total_ms = output.record.total_ms,
        spread = output.selection.spread_estimate(graph.num_nodes()),
        "run complete"
    );

    log.push(serde_json::to_value(&output.record)?);
    Ok(())
}

/// Rewrite the whole log file. Called after every run so a sweep leaves a
/// valid JSON array behind even if interrupted between iterations.
fn write_log(args: &Args, log: &[serde_json::Value]) -> Result<(), CliError> {
    let file = File::create(&args.output)?;
    serde_json::to_writer_pretty(BufWriter::new(file), log)?;
    Ok(())
}

#[cfg(feature = "cuda")]
fn build_gpu_generator(
    graph: &CsrGraph,
    model: DiffusionModel,
    config: cascade_gpu::GpuConfig,
    factory: &RngFactory,
) -> Result<Box<dyn RrGenerator>, CliError> {
    Ok(Box::new(cascade_gpu::GpuGenerator::new(graph, model, config, factory)?))
}

#[cfg(not(feature = "cuda"))]
fn build_gpu_generator(
    _graph: &CsrGraph,
    _model: DiffusionModel,
    _config: cascade_gpu::GpuConfig,
    _factory: &RngFactory,
) -> Result<Box<dyn RrGenerator>, CliError> {
    Err(CliError::Gpu(GpuError::Unavailable))
}
