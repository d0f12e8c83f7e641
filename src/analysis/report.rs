#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
use crate::explain::Explanation;
use crate::model::{FeatureId, FeatureModel};
use crate::sat::solver::OracleStats;
use std::fmt::Write as _;

/// What is wrong with a cross-tree constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintAnomaly {
    /// The constraint holds under every assignment.
    Tautology,
    /// The constraint is implied by the tree and the other constraints.
    Redundant,
    /// The model is void with the constraint and satisfiable without it.
    Unsatisfiable,
    /// These features are dead only because of the constraint.
    DeadMaking(Vec<FeatureId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintReport {
    pub index: usize,
    pub anomaly: ConstraintAnomaly,
    pub explanation: Option<Explanation>,
}

/// Results of [`ModelAnalyzer::analyze`](crate::analysis::ModelAnalyzer::analyze).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisReport {
    pub void: bool,
    pub core: Vec<FeatureId>,
    pub dead: Vec<FeatureId>,
    pub false_optional: Vec<FeatureId>,
    /// Only constraints with an anomaly.
    pub constraints: Vec<ConstraintReport>,
    /// One per dead or false-optional feature the explanation engine could justify.
    pub explanations: Vec<Explanation>,
    pub stats: OracleStats,
}

impl AnalysisReport {
    /// A readable summary with feature names.
    #[must_use]
    pub fn describe(&self, model: &FeatureModel) -> String {
        let names = |ids: &[FeatureId]| -> String {
            ids.iter().map(|&id| model.name(id)).collect::<Vec<_>>().join(", ")
        };
        let mut out = String::new();
        let _ = writeln!(out, "void: {}", self.void);
        let _ = writeln!(out, "core ({}): {}", self.core.len(), names(&self.core));
        let _ = writeln!(out, "dead ({}): {}", self.dead.len(), names(&self.dead));
        let _ = writeln!(
            out,
            "false-optional ({}): {}",
            self.false_optional.len(),
            names(&self.false_optional)
        );
        for report in &self.constraints {
            let constraint = &model.constraints()[report.index];
            match &report.anomaly {
                ConstraintAnomaly::DeadMaking(dead) => {
                    let _ = writeln!(out, "constraint {constraint}: makes {} dead", names(dead));
                }
                anomaly => {
                    let _ = writeln!(out, "constraint {constraint}: {anomaly:?}");
                }
            }
        }
        let _ = writeln!(out, "oracle: {}", self.stats);
        out
    }
}
