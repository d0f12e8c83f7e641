#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Runtime configuration for the oracle, the explanation engine and the samplers.
//!
//! Every struct has a [`Default`] that is reasonable for models with a few hundred
//! features. The command line maps its options onto these types.

use std::time::Duration;

/// Polarity tried first when the default oracle makes a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Try `false` first. Tends to produce configurations with few selected features.
    #[default]
    Negative,
    /// Try `true` first.
    Positive,
}

impl Phase {
    /// The boolean value to try first.
    #[must_use]
    pub const fn first(self) -> bool {
        matches!(self, Self::Positive)
    }
}

/// Resource budget applied to every single oracle query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OracleBudget {
    /// Wall-clock limit per query. `None` means unbounded.
    pub timeout: Option<Duration>,
    /// Limit on the number of decisions per query. `None` means unbounded.
    pub max_decisions: Option<u64>,
}

impl OracleBudget {
    /// A budget limited only by wall-clock time.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            max_decisions: None,
        }
    }
}

/// Limits for the brute-force minimal unsatisfiable subset fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusConfig {
    /// Largest subset size enumerated by the brute-force search.
    pub max_subset_size: usize,
    /// Above this many clauses only a single deletion-based MUS is computed.
    pub brute_force_clause_limit: usize,
}

impl Default for MusConfig {
    fn default() -> Self {
        Self {
            max_subset_size: 4,
            brute_force_clause_limit: 24,
        }
    }
}

/// Parameters of the t-wise sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Interaction strength.
    pub t: usize,
    /// Number of passes over the candidate space. Extra passes only ever shrink the sample.
    pub iterations: usize,
    /// Maximum number of configurations. `None` means unbounded.
    pub limit: Option<usize>,
    /// Complete every configuration from its witness when the sample is frozen.
    pub complete: bool,
    /// Skip tuples the dependency graph proves infeasible.
    pub use_graph_filter: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            t: 2,
            iterations: 1,
            limit: None,
            complete: true,
            use_graph_filter: true,
        }
    }
}

/// Parameters of the explanation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplanationConfig {
    /// Run the clause-dropping reduction pass on the returned explanation.
    pub reduce: bool,
    /// Constraints with more contradicting assignments than this are not explained.
    pub max_contradicting_assignments: usize,
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            reduce: false,
            max_contradicting_assignments: 1 << 12,
        }
    }
}

/// Everything an analysis run needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisConfig {
    /// Per-query oracle budget.
    pub budget: OracleBudget,
    /// Decision polarity of the default oracle.
    pub phase: Phase,
    /// MUS fallback limits.
    pub mus: MusConfig,
    /// Sampler parameters.
    pub sampling: SamplingConfig,
    /// Explanation parameters.
    pub explanation: ExplanationConfig,
}
