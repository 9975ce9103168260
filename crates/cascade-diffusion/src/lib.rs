//! # cascade-diffusion
//!
//! Reverse-reachable (RR) set sampling for the cascade engine.
//!
//! An RR set is the set of vertices that can reach a randomly chosen root
//! under one stochastic realization of the diffusion model; sampling walks
//! the *backward* orientation of the graph. Two models are provided:
//!
//! - [`IcSampler`] — Independent Cascade: each backward edge fires
//!   independently with probability equal to its weight.
//! - [`LtSampler`] — Linear Threshold: a vertex joins once the cumulative
//!   weight of its already-active neighbors meets a private threshold.
//!
//! Both are deterministic given the RNG stream, which is what makes
//! strong-scaling runs comparable across thread counts. Sub-streams come
//! from [`RngFactory`], a documented SplitMix64 splitting scheme — never
//! ad-hoc reseeding.

pub mod ic;
pub mod lt;
pub mod rng;
pub mod rr;
pub mod sampler;

pub use ic::IcSampler;
pub use lt::LtSampler;
pub use rng::{RngFactory, WEIGHT_STREAM, WORKER_STREAM_BASE};
pub use rr::RrSet;
pub use sampler::{sampler_for, DiffusionModel, ParseModelError, RrSampler};
