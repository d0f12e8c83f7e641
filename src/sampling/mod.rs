#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Configuration samples and the generators that build them.
//!
//! A [`Sample`] is an ordered list of [`Configuration`]s plus the
//! [`SampleMetadata`] of the run that produced it. Three generators exist:
//!
//! - [`TWiseSampler`]: greedy covering-array construction for t-wise coverage.
//! - [`RandomSampler`]: seeded random valid configurations.
//! - [`AllConfigurations`]: enumerates valid configurations.

pub mod all;
pub mod coverage;
pub mod random;
pub mod twise;

pub use all::AllConfigurations;
pub use random::RandomSampler;
pub use twise::TWiseSampler;

use crate::sat::literal::{Literal, Variable};
use std::fmt;

/// Value of one variable in a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    Selected,
    Unselected,
    #[default]
    Unspecified,
}

impl Selection {
    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Selected => Some(true),
            Self::Unselected => Some(false),
            Self::Unspecified => None,
        }
    }

    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Selected } else { Self::Unselected }
    }
}

/// A (possibly partial) assignment of every variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    /// Indexed by variable; slot 0 is unused.
    selections: Vec<Selection>,
}

impl Configuration {
    /// A configuration over `num_vars` variables with nothing specified.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            selections: vec![Selection::Unspecified; num_vars + 1],
        }
    }

    /// A configuration specifying exactly `literals`.
    #[must_use]
    pub fn from_literals(num_vars: usize, literals: &[Literal]) -> Self {
        let mut config = Self::new(num_vars);
        for &lit in literals {
            config.set(lit);
        }
        config
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.selections.len() - 1
    }

    #[must_use]
    pub fn get(&self, var: Variable) -> Selection {
        self.selections.get(var as usize).copied().unwrap_or_default()
    }

    /// Whether `lit` holds in this configuration.
    #[must_use]
    pub fn holds(&self, lit: Literal) -> bool {
        self.get(lit.variable()).value() == Some(lit.polarity())
    }

    /// Whether `lit` does not contradict this configuration.
    #[must_use]
    pub fn admits(&self, lit: Literal) -> bool {
        self.get(lit.variable())
            .value()
            .is_none_or(|v| v == lit.polarity())
    }

    /// Specifies `lit` unless its variable is already specified. Returns whether
    /// `lit` holds afterwards.
    pub fn set(&mut self, lit: Literal) -> bool {
        match self.selections.get_mut(lit.variable() as usize) {
            Some(slot @ Selection::Unspecified) => {
                *slot = Selection::from_bool(lit.polarity());
                true
            }
            Some(slot) => slot.value() == Some(lit.polarity()),
            None => false,
        }
    }

    /// Whether every literal of `tuple` holds.
    #[must_use]
    pub fn covers(&self, tuple: &[Literal]) -> bool {
        tuple.iter().all(|&l| self.holds(l))
    }

    /// The specified variables as literals, in variable order.
    #[must_use]
    pub fn literals(&self) -> Vec<Literal> {
        self.selections
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(var, s)| {
                s.value()
                    .map(|v| Literal::new(Variable::try_from(var).unwrap_or_default(), v))
            })
            .collect()
    }

    /// Variables set to [`Selection::Selected`].
    pub fn selected(&self) -> impl Iterator<Item = Variable> + '_ {
        self.selections
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == Selection::Selected)
            .filter_map(|(var, _)| Variable::try_from(var).ok())
    }

    #[must_use]
    pub fn specified_count(&self) -> usize {
        self.selections
            .iter()
            .filter(|s| **s != Selection::Unspecified)
            .count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.specified_count() == self.num_vars()
    }
}

impl fmt::Display for Configuration {
    /// DIMACS style: one signed variable per specified variable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, lit) in self.literals().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{lit}")?;
        }
        Ok(())
    }
}

/// How a generator run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleStatus {
    /// Every feasible tuple (or configuration) was produced.
    #[default]
    Complete,
    /// The configuration limit stopped generation first.
    LimitReached,
}

/// Counters of a generator run.
///
/// Tuple counters are only filled by the t-wise sampler. `filtered` tuples were
/// proven infeasible without the oracle (root-level propagation or the
/// dependency graph); `unsatisfiable` ones by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleMetadata {
    pub t: usize,
    pub total_tuples: u64,
    pub covered: u64,
    pub unsatisfiable: u64,
    pub filtered: u64,
    pub timed_out: u64,
    pub oracle_calls: u64,
    pub iterations: usize,
    pub status: SampleStatus,
}

impl SampleMetadata {
    /// Tuples not proven infeasible.
    #[must_use]
    pub const fn feasible_tuples(&self) -> u64 {
        self.total_tuples
            .saturating_sub(self.unsatisfiable)
            .saturating_sub(self.filtered)
    }

    /// Covered share of the tuples not proven infeasible. `1.0` when there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage_ratio(&self) -> f64 {
        match self.feasible_tuples() {
            0 => 1.0,
            feasible => self.covered as f64 / feasible as f64,
        }
    }

    /// Share of all tuples proven infeasible, a rough measure of how constrained the model is.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn infeasible_ratio(&self) -> f64 {
        match self.total_tuples {
            0 => 0.0,
            total => (self.unsatisfiable + self.filtered) as f64 / total as f64,
        }
    }
}

impl fmt::Display for SampleMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} tuples={} covered={} unsat={} filtered={} timeouts={} coverage={:.4} ({:?})",
            self.t,
            self.total_tuples,
            self.covered,
            self.unsatisfiable,
            self.filtered,
            self.timed_out,
            self.coverage_ratio(),
            self.status
        )
    }
}

/// A frozen list of configurations.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    configurations: Vec<Configuration>,
    metadata: SampleMetadata,
}

impl Sample {
    #[must_use]
    pub const fn new(configurations: Vec<Configuration>, metadata: SampleMetadata) -> Self {
        Self {
            configurations,
            metadata,
        }
    }

    #[must_use]
    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    #[must_use]
    pub const fn metadata(&self) -> &SampleMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Configuration> {
        self.configurations.iter()
    }

    /// Whether some configuration makes every literal of `tuple` true.
    #[must_use]
    pub fn covers(&self, tuple: &[Literal]) -> bool {
        self.configurations.iter().any(|c| c.covers(tuple))
    }

    #[must_use]
    pub fn into_configurations(self) -> Vec<Configuration> {
        self.configurations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i32) -> Literal {
        Literal::from_i32(v)
    }

    #[test]
    fn test_set_never_overwrites() {
        let mut config = Configuration::new(3);
        assert!(config.set(lit(1)));
        assert!(!config.set(lit(-1)));
        assert_eq!(config.get(1), Selection::Selected);
        assert!(config.set(lit(1)));
        assert!(!config.set(lit(4)));
    }

    #[test]
    fn test_literals_and_display() {
        let config = Configuration::from_literals(3, &[lit(3), lit(-1)]);
        assert_eq!(config.literals(), vec![lit(-1), lit(3)]);
        assert_eq!(config.to_string(), "-1 3");
        assert_eq!(config.specified_count(), 2);
        assert!(!config.is_complete());
        assert!(config.admits(lit(2)));
        assert!(!config.admits(lit(1)));
        assert_eq!(config.selected().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_sample_covers() {
        let sample = Sample::new(
            vec![
                Configuration::from_literals(2, &[lit(1), lit(-2)]),
                Configuration::from_literals(2, &[lit(-1), lit(2)]),
            ],
            SampleMetadata::default(),
        );
        assert!(sample.covers(&[lit(1), lit(-2)]));
        assert!(sample.covers(&[lit(2)]));
        assert!(!sample.covers(&[lit(1), lit(2)]));
        assert!(sample.covers(&[]));
    }

    #[test]
    fn test_coverage_ratio() {
        let metadata = SampleMetadata {
            total_tuples: 12,
            covered: 6,
            unsatisfiable: 2,
            filtered: 2,
            ..SampleMetadata::default()
        };
        assert_eq!(metadata.feasible_tuples(), 8);
        assert!((metadata.coverage_ratio() - 0.75).abs() < f64::EPSILON);
        assert!((metadata.infeasible_ratio() - 4.0 / 12.0).abs() < f64::EPSILON);
        assert!((SampleMetadata::default().coverage_ratio() - 1.0).abs() < f64::EPSILON);
    }
}
