#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The narrow interface through which every analysis talks to a SAT solver.
//!
//! An oracle answers one query at a time. Assumptions are temporary unit literals
//! that hold for a single query only: no assignment, learnt fact or budget state
//! may leak from one query into the next, so callers never observe side effects
//! between independent queries.
//!
//! [`minimal_unsat_subsets`] wraps [`SatOracle::minimal_unsat_subsets`] and falls
//! back to a brute-force search when the backend reports
//! [`Error::Unsupported`].

use crate::config::MusConfig;
use crate::error::{Error, Result};
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

/// Counters accumulated over the lifetime of an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OracleStats {
    pub queries: u64,
    pub decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
}

impl fmt::Display for OracleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} queries, {} decisions, {} conflicts, {} propagations",
            self.queries, self.decisions, self.conflicts, self.propagations
        )
    }
}

/// A satisfiability oracle over a fixed [`Cnf`].
pub trait SatOracle {
    /// Whether the CNF together with `assumptions` has a model.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] when the query exceeds the oracle's budget.
    fn is_satisfiable(&mut self, assumptions: &[Literal]) -> Result<bool> {
        Ok(self.find_solution(assumptions)?.is_some())
    }

    /// A total model of the CNF that satisfies `assumptions`, one literal per
    /// variable in variable order, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] when the query exceeds the oracle's budget.
    fn find_solution(&mut self, assumptions: &[Literal]) -> Result<Option<Vec<Literal>>>;

    /// Every minimal set of clause indices that is unsatisfiable under `assumptions`.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`Error::Unsupported`].
    fn minimal_unsat_subsets(&mut self, assumptions: &[Literal]) -> Result<Vec<BTreeSet<usize>>> {
        let _ = assumptions;
        Err(Error::Unsupported("minimal unsatisfiable subsets"))
    }

    fn cnf(&self) -> &Cnf;

    fn stats(&self) -> OracleStats;

    /// A fresh oracle of the same kind and budget over another CNF.
    #[must_use]
    fn fork(&self, cnf: Cnf) -> Self
    where
        Self: Sized;
}

/// Minimal unsatisfiable subsets of `oracle`'s clauses under `assumptions`.
///
/// Uses the backend when it supports MUS extraction. Otherwise subsets are
/// enumerated by increasing size up to [`MusConfig::max_subset_size`], skipping
/// supersets of subsets already found; this only happens for CNFs of at most
/// [`MusConfig::brute_force_clause_limit`] clauses. When the enumeration is
/// skipped or finds nothing, a single MUS is computed by deletion.
///
/// A satisfiable query yields no subsets.
///
/// # Errors
///
/// Propagates [`Error::Timeout`] from any query.
pub fn minimal_unsat_subsets<O: SatOracle>(
    oracle: &mut O,
    assumptions: &[Literal],
    config: &MusConfig,
) -> Result<Vec<BTreeSet<usize>>> {
    match oracle.minimal_unsat_subsets(assumptions) {
        Err(Error::Unsupported(what)) => {
            log::debug!("oracle lacks {what}, using brute-force search");
        }
        other => return other,
    }

    if oracle.is_satisfiable(assumptions)? {
        return Ok(Vec::new());
    }

    let n = oracle.cnf().clause_count();
    let mut found: Vec<BTreeSet<usize>> = Vec::new();

    if n <= config.brute_force_clause_limit {
        for size in 0..=config.max_subset_size.min(n) {
            for combo in (0..n).combinations(size) {
                let candidate: BTreeSet<usize> = combo.into_iter().collect();
                if found.iter().any(|mus| mus.is_subset(&candidate)) {
                    continue;
                }
                if !subset_is_satisfiable(oracle, &candidate, assumptions)? {
                    found.push(candidate);
                }
            }
        }
    }

    if found.is_empty() {
        found.push(shrink(oracle, assumptions)?);
    }

    Ok(found)
}

fn subset_is_satisfiable<O: SatOracle>(
    oracle: &O,
    indices: &BTreeSet<usize>,
    assumptions: &[Literal],
) -> Result<bool> {
    let mut sub = oracle.fork(oracle.cnf().subset(indices.iter().copied()));
    sub.is_satisfiable(assumptions)
}

/// Deletion-based shrinking: drop every clause whose removal keeps the set unsatisfiable.
fn shrink<O: SatOracle>(oracle: &O, assumptions: &[Literal]) -> Result<BTreeSet<usize>> {
    let mut core: BTreeSet<usize> = (0..oracle.cnf().clause_count()).collect();
    let candidates = core.iter().copied().collect_vec();
    for ci in candidates {
        core.remove(&ci);
        if subset_is_satisfiable(oracle, &core, assumptions)? {
            core.insert(ci);
        }
    }
    Ok(core)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::dpll::DpllOracle;

    fn lits(values: &[i32]) -> Vec<Literal> {
        values.iter().copied().map(Literal::from_i32).collect()
    }

    fn set(values: &[usize]) -> BTreeSet<usize> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_satisfiable_has_no_mus() {
        let mut oracle = DpllOracle::new(Cnf::from_dimacs(vec![vec![1, 2], vec![-1]]));
        let muses = minimal_unsat_subsets(&mut oracle, &[], &MusConfig::default()).unwrap();
        assert!(muses.is_empty());
    }

    #[test]
    fn test_brute_force_finds_every_mus() {
        // {0, 1} and {2, 3} are independent conflicts; clause 4 is irrelevant.
        let cnf = Cnf::from_dimacs(vec![vec![1], vec![-1], vec![2], vec![-2], vec![3, 4]]);
        let mut oracle = DpllOracle::new(cnf);
        let muses = minimal_unsat_subsets(&mut oracle, &[], &MusConfig::default()).unwrap();
        assert_eq!(muses, vec![set(&[0, 1]), set(&[2, 3])]);
    }

    #[test]
    fn test_assumptions_take_part() {
        let cnf = Cnf::from_dimacs(vec![vec![-1, 2], vec![-2, 3], vec![4]]);
        let mut oracle = DpllOracle::new(cnf);
        let muses = minimal_unsat_subsets(&mut oracle, &lits(&[1, -3]), &MusConfig::default()).unwrap();
        assert_eq!(muses, vec![set(&[0, 1])]);
    }

    #[test]
    fn test_deletion_above_clause_limit() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2], vec![-1], vec![5], vec![-2], vec![6]]);
        let mut oracle = DpllOracle::new(cnf);
        let config = MusConfig {
            max_subset_size: 4,
            brute_force_clause_limit: 2,
        };
        let muses = minimal_unsat_subsets(&mut oracle, &[], &config).unwrap();
        assert_eq!(muses, vec![set(&[0, 1, 3])]);
    }
}
