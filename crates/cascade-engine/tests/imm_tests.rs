//! End-to-end tests of the sampling → estimation → selection pipeline.

use cascade_diffusion::{DiffusionModel, RngFactory};
use cascade_engine::{imm, EstimatorConfig, ImmOutput, SequentialGenerator, ThreadedGenerator};
use cascade_graph::CsrGraph;

// ── Helpers ─────────────────────────────────────────────────────────────────

/// A → B → C with unit weights; internal index equals external id.
fn three_chain() -> CsrGraph {
    CsrGraph::from_edges(&[(0, 1, 1.0), (1, 2, 1.0)])
}

fn run_sequential(graph: &CsrGraph, model: DiffusionModel, k: usize, seed: u64) -> ImmOutput {
    let config = EstimatorConfig::new(0.5);
    let factory = RngFactory::new(seed);
    let mut generator = SequentialGenerator::new(&factory);
    imm(graph, model, k, &config, &mut generator).unwrap()
}

// ── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn unit_weight_chain_selects_the_source() {
    // Every RR set on a unit-weight chain contains A, so k=1 must pick A
    // with full coverage.
    let g = three_chain();
    let out = run_sequential(&g, DiffusionModel::IndependentCascade, 1, 7);

    assert_eq!(out.selection.seeds.len(), 1);
    assert_eq!(out.selection.seeds[0].vertex, 0);
    assert!((out.selection.coverage_fraction() - 1.0).abs() < 1e-12);
    assert_eq!(g.to_external(&out.selection.vertices()), vec![0]);
}

#[test]
fn unit_weight_chain_under_lt_behaves_the_same() {
    let g = three_chain();
    let out = run_sequential(&g, DiffusionModel::LinearThreshold, 1, 7);
    assert_eq!(out.selection.seeds[0].vertex, 0);
    assert!((out.selection.coverage_fraction() - 1.0).abs() < 1e-12);
}

#[test]
fn k_zero_yields_empty_seed_list_without_error() {
    let g = three_chain();
    let out = run_sequential(&g, DiffusionModel::IndependentCascade, 0, 3);

    assert!(out.selection.seeds.is_empty());
    assert_eq!(out.selection.coverage_fraction(), 0.0);
    assert!(out.record.theta > 0, "theta is still estimated for k=0");
}

// ── Determinism ─────────────────────────────────────────────────────────────

#[test]
fn identical_seed_reproduces_the_whole_run() {
    let g = three_chain();
    let a = run_sequential(&g, DiffusionModel::IndependentCascade, 2, 11);
    let b = run_sequential(&g, DiffusionModel::IndependentCascade, 2, 11);

    assert_eq!(a.selection.seeds, b.selection.seeds);
    assert_eq!(a.record.theta, b.record.theta);
    assert_eq!(a.record.theta_primes, b.record.theta_primes);
}

#[test]
fn sequential_and_single_worker_threaded_agree_end_to_end() {
    let g = three_chain();
    let config = EstimatorConfig::new(0.5);

    let factory = RngFactory::new(21);
    let mut seq = SequentialGenerator::new(&factory);
    let a = imm(&g, DiffusionModel::IndependentCascade, 1, &config, &mut seq).unwrap();

    let mut one = ThreadedGenerator::new(&factory, 1).unwrap();
    let b = imm(&g, DiffusionModel::IndependentCascade, 1, &config, &mut one).unwrap();

    assert_eq!(a.selection.seeds, b.selection.seeds);
    assert_eq!(a.record.theta, b.record.theta);
}

// ── Record invariants ───────────────────────────────────────────────────────

#[test]
fn record_reflects_the_run() {
    let g = three_chain();
    let out = run_sequential(&g, DiffusionModel::LinearThreshold, 2, 5);
    let r = &out.record;

    assert_eq!(r.algorithm, "IMM");
    assert_eq!(r.diffusion_model, "LT");
    assert_eq!(r.k, 2);
    assert_eq!(r.l, 1);
    assert_eq!(r.num_threads, 1);
    assert!(!r.theta_primes.is_empty());
    for w in r.theta_primes.windows(2) {
        assert!(w[1] >= w[0]);
    }
    assert!(r.theta >= *r.theta_primes.last().unwrap());
    assert_eq!(r.theta_primes.len(), r.estimation_generate_ms.len());
    assert_eq!(r.theta_primes.len(), r.estimation_select_ms.len());
}

#[test]
fn marginal_gains_sum_to_covered_count() {
    let g = CsrGraph::from_edges(&[
        (0, 1, 0.6),
        (1, 2, 0.6),
        (2, 3, 0.6),
        (3, 0, 0.6),
        (0, 4, 0.3),
        (4, 5, 0.9),
    ]);
    let out = run_sequential(&g, DiffusionModel::IndependentCascade, 3, 13);

    let gains: u32 = out.selection.seeds.iter().map(|s| s.marginal_gain).sum();
    assert_eq!(gains, out.selection.covered);
}

#[test]
fn multi_threaded_run_completes_on_a_larger_graph() {
    // 64-vertex ring; mostly a smoke test that the pool path drives the
    // full pipeline.
    let edges: Vec<(u64, u64, f32)> = (0..64).map(|i| (i, (i + 1) % 64, 0.4)).collect();
    let g = CsrGraph::from_edges(&edges);

    let config = EstimatorConfig::new(0.5);
    let factory = RngFactory::new(1);
    let mut pool = ThreadedGenerator::new(&factory, 4).unwrap();
    let out = imm(&g, DiffusionModel::IndependentCascade, 4, &config, &mut pool).unwrap();

    assert_eq!(out.record.num_threads, 4);
    assert!(out.selection.seeds.len() <= 4);
    assert!(!out.selection.seeds.is_empty());
    let frac = out.selection.coverage_fraction();
    assert!((0.0..=1.0).contains(&frac));
}
