#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Whole-model analyses: void check, core/dead and false-optional features, and
//! constraint anomalies, with explanations where the engine can give them.

pub mod analyzer;
pub mod report;

pub use analyzer::{ModelAnalyzer, core_and_dead_variables};
pub use report::{AnalysisReport, ConstraintAnomaly, ConstraintReport};
