#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! This crate analyses feature models: core and dead features, constraint
//! anomalies with explanations, a pairwise dependency graph, and t-wise
//! configuration sampling on top of a SAT oracle.

/// The `analysis` module runs whole-model analyses (void, core/dead, false-optional
/// features and constraint anomalies).
pub mod analysis;

/// The `config` module holds the runtime configuration of the oracle, the
/// explanation engine and the samplers.
pub mod config;

/// The `error` module defines the crate error type.
pub mod error;

/// The `explain` module implements the truth-maintenance explanation engine.
pub mod explain;

/// The `graph` module implements the bit-packed feature dependency graph and its closure.
pub mod graph;

/// The `model` module holds the feature tree and its CNF encoding.
pub mod model;

/// The `monitor` module provides progress reporting and cooperative cancellation.
pub mod monitor;

/// The `sampling` module builds configuration samples, t-wise and otherwise.
pub mod sampling;

/// The `sat` module implements literals, clauses, CNF, the SAT oracle interface
/// and its default DPLL backend.
pub mod sat;

pub use error::{Error, Result};
