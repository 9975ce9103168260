//! # cascade-graph
//!
//! Graph store for the cascade influence-maximization engine.
//!
//! - [`CsrGraph`] — immutable CSR adjacency in forward and backward
//!   orientation, with dense internal vertex indices remapped from external
//!   identifiers.
//! - [`loader`] — text edge-list parsing and versioned binary dump/reload.
//!
//! The store is built once by the driver and shared read-only across all
//! sampling workers.

pub mod csr;
pub mod error;
pub mod loader;

pub use csr::{CsrGraph, Direction, Neighbors};
pub use error::LoadError;
pub use loader::{dump_binary, load_binary, load_edge_list, parse_edge_list, LoadOptions};
