//! The reverse-reachable set type.

/// One reverse-reachable sample: the vertices that can reach a randomly
/// chosen root under a single stochastic realization of the diffusion
/// model. Immutable once produced; membership order carries no meaning.
pub type RrSet = Vec<u32>;
