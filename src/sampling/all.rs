#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Enumeration of valid configurations.
//!
//! Every found model is excluded by a blocking clause and the next query runs on
//! a fresh oracle over the extended CNF.

use crate::error::Result;
use crate::monitor::Monitor;
use crate::sampling::{Configuration, Sample, SampleMetadata, SampleStatus};
use crate::sat::clause::Provenance;
use crate::sat::literal::Literal;
use crate::sat::solver::SatOracle;

pub struct AllConfigurations<O> {
    oracle: O,
    limit: Option<usize>,
}

impl<O: SatOracle> AllConfigurations<O> {
    /// Enumerates at most `limit` configurations (`None` for all of them).
    #[must_use]
    pub const fn new(oracle: O, limit: Option<usize>) -> Self {
        Self { oracle, limit }
    }

    /// Generates the sample in the order the oracle finds the models.
    /// [`SampleStatus::LimitReached`] means more valid configurations exist.
    ///
    /// # Errors
    ///
    /// Propagates oracle errors and [`Error::Cancelled`](crate::error::Error::Cancelled).
    pub fn sample(&mut self, monitor: &dyn Monitor) -> Result<Sample> {
        let mut cnf = self.oracle.cnf().clone();
        let num_vars = cnf.num_vars();
        let mut configurations = Vec::new();
        let mut oracle_calls = 0;
        let mut status = SampleStatus::Complete;

        let mut oracle = self.oracle.fork(cnf.clone());
        loop {
            monitor.checkpoint()?;
            let found = oracle.find_solution(&[])?;
            oracle_calls += 1;
            let Some(model) = found else {
                break;
            };
            if self.limit.is_some_and(|limit| configurations.len() >= limit) {
                status = SampleStatus::LimitReached;
                break;
            }

            configurations.push(Configuration::from_literals(num_vars, &model));
            monitor.worked(1);
            if model.is_empty() {
                break;
            }
            let blocking: Vec<Literal> = model.iter().map(|&l| !l).collect();
            cnf.add_clause(blocking, Provenance::External);
            oracle = oracle.fork(cnf.clone());
        }

        log::info!("{} configurations enumerated ({status:?})", configurations.len());
        let metadata = SampleMetadata {
            oracle_calls,
            iterations: 1,
            status,
            ..SampleMetadata::default()
        };
        Ok(Sample::new(configurations, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::feature::{FeatureModel, FeatureRecord, GroupType};
    use crate::monitor::NullMonitor;
    use crate::sat::cnf::Cnf;
    use crate::sat::dpll::DpllOracle;
    use std::collections::HashSet;

    #[test]
    fn test_alternative_group() {
        let cnf = FeatureModel::from_records(
            vec![
                FeatureRecord::root("R").group(GroupType::Alternative),
                FeatureRecord::child("A", "R"),
                FeatureRecord::child("B", "R"),
                FeatureRecord::child("C", "R"),
            ],
            Vec::new(),
        )
        .unwrap()
        .to_cnf()
        .unwrap();
        let sample = AllConfigurations::new(DpllOracle::new(cnf.clone()), None)
            .sample(&NullMonitor)
            .unwrap();

        assert_eq!(sample.len(), 3);
        assert_eq!(sample.metadata().status, SampleStatus::Complete);
        let distinct: HashSet<&Configuration> = sample.iter().collect();
        assert_eq!(distinct.len(), 3);
        assert!(sample.iter().all(|c| cnf.verify(&c.literals())));
    }

    #[test]
    fn test_limit() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2, 3]]);
        let sample = AllConfigurations::new(DpllOracle::new(cnf), Some(4))
            .sample(&NullMonitor)
            .unwrap();
        assert_eq!(sample.len(), 4);
        assert_eq!(sample.metadata().status, SampleStatus::LimitReached);
    }

    #[test]
    fn test_exact_limit_is_complete() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2]]);
        let sample = AllConfigurations::new(DpllOracle::new(cnf), Some(3))
            .sample(&NullMonitor)
            .unwrap();
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.metadata().status, SampleStatus::Complete);
    }
}
