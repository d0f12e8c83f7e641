#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Seeded random valid configurations.
//!
//! Each configuration is built by visiting the variables in a shuffled order and
//! asking for a random polarity; the oracle keeps the choice if it is still
//! satisfiable together with the earlier ones, otherwise its complement is taken.
//! The current witness answers most choices without an oracle call.

use crate::error::Result;
use crate::monitor::Monitor;
use crate::sampling::{Configuration, Sample, SampleMetadata, SampleStatus};
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::SatOracle;

pub struct RandomSampler<O> {
    oracle: O,
    limit: usize,
    rng: fastrand::Rng,
}

impl<O: SatOracle> RandomSampler<O> {
    /// Produces `limit` configurations. Identical seeds give identical samples.
    #[must_use]
    pub fn new(oracle: O, limit: usize, seed: u64) -> Self {
        Self {
            oracle,
            limit,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Generates the sample. Duplicate configurations are kept. A void model
    /// gives an empty sample.
    ///
    /// # Errors
    ///
    /// Propagates oracle errors and [`Error::Cancelled`](crate::error::Error::Cancelled).
    pub fn sample(&mut self, monitor: &dyn Monitor) -> Result<Sample> {
        let num_vars = self.oracle.cnf().num_vars();
        let before = self.oracle.stats().queries;
        let mut configurations = Vec::with_capacity(self.limit);

        if self.oracle.is_satisfiable(&[])? {
            for _ in 0..self.limit {
                monitor.checkpoint()?;
                let literals = self.next_configuration(monitor)?;
                configurations.push(Configuration::from_literals(num_vars, &literals));
                monitor.worked(1);
            }
        }

        let metadata = SampleMetadata {
            oracle_calls: self.oracle.stats().queries - before,
            iterations: 1,
            status: SampleStatus::Complete,
            ..SampleMetadata::default()
        };
        log::info!("{} random configurations", configurations.len());
        Ok(Sample::new(configurations, metadata))
    }

    fn next_configuration(&mut self, monitor: &dyn Monitor) -> Result<Vec<Literal>> {
        let mut order: Vec<Variable> = self.oracle.cnf().variables().variables().collect();
        self.rng.shuffle(&mut order);

        let mut chosen: Vec<Literal> = Vec::with_capacity(order.len());
        let mut witness = self.oracle.find_solution(&chosen)?.unwrap_or_default();

        for var in order {
            let lit = Literal::new(var, self.rng.bool());
            chosen.push(lit);
            if witness.get(var as usize - 1) == Some(&lit) {
                continue;
            }
            match self.oracle.find_solution(&chosen)? {
                Some(w) => witness = w,
                None => {
                    chosen.pop();
                    chosen.push(!lit);
                }
            }
            monitor.checkpoint()?;
        }
        Ok(witness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::NullMonitor;
    use crate::sat::cnf::Cnf;
    use crate::sat::dpll::DpllOracle;

    fn cnf() -> Cnf {
        Cnf::from_dimacs(vec![vec![1, 2, 3], vec![-1, -2], vec![-3, 4]])
    }

    #[test]
    fn test_configurations_are_valid() {
        let cnf = cnf();
        let sample = RandomSampler::new(DpllOracle::new(cnf.clone()), 20, 7)
            .sample(&NullMonitor)
            .unwrap();
        assert_eq!(sample.len(), 20);
        assert!(sample
            .iter()
            .all(|c| c.is_complete() && cnf.verify(&c.literals())));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = RandomSampler::new(DpllOracle::new(cnf()), 5, 42)
            .sample(&NullMonitor)
            .unwrap();
        let b = RandomSampler::new(DpllOracle::new(cnf()), 5, 42)
            .sample(&NullMonitor)
            .unwrap();
        assert_eq!(a.configurations(), b.configurations());
    }

    #[test]
    fn test_void_model() {
        let cnf = Cnf::from_dimacs(vec![vec![1], vec![-1]]);
        let sample = RandomSampler::new(DpllOracle::new(cnf), 3, 1)
            .sample(&NullMonitor)
            .unwrap();
        assert!(sample.is_empty());
    }
}
