#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The default [`SatOracle`] backend: a DPLL search with assumptions.
//!
//! The core logic involves:
//! 1.  **Unit Propagation:** two watched literals per clause. When a watched
//!     literal becomes false the clause looks for a replacement watch; if there is
//!     none the other watch is forced, or the clause is in conflict.
//! 2.  **Decision:** when propagation reaches a fixpoint the lowest unassigned
//!     variable is chosen and set to the configured [`Phase`].
//! 3.  **Backtracking:** chronological. On a conflict the most recent decision that
//!     has not been flipped yet is undone and retried with the opposite value. When
//!     no such decision is left the query is unsatisfiable.
//!
//! Decision levels are laid out as follows: level 0 holds the unit clauses of the
//! CNF and everything they imply, computed once at construction; level 1 holds
//! the assumptions of the current query; decisions start at level 2. After every
//! query the trail is cut back to level 0, which is what keeps queries independent.
//!
//! The search is iterative, so deep models cannot overflow the stack, and every
//! query checks its [`OracleBudget`] once per decision.

use crate::config::{OracleBudget, Phase};
use crate::error::{Error, Result};
use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::solver::{OracleStats, SatOracle};
use crate::sat::trail::{Reason, Trail};
use smallvec::SmallVec;
use std::mem;
use std::time::Instant;

const ASSUMPTION_LEVEL: usize = 1;

/// Iterative DPLL with two watched literals and a per-query budget.
#[derive(Debug, Clone)]
pub struct DpllOracle {
    cnf: Cnf,
    /// Working copies of the clauses; positions 0 and 1 are the watched literals.
    clauses: Vec<Clause>,
    /// For every literal index, the clauses currently watching it.
    watches: Vec<SmallVec<[usize; 8]>>,
    assignment: Assignment,
    trail: Trail,
    /// The CNF is unsatisfiable without any assumption.
    root_conflict: bool,
    budget: OracleBudget,
    phase: Phase,
    stats: OracleStats,
}

impl DpllOracle {
    /// An oracle with an unbounded budget and the default decision phase.
    #[must_use]
    pub fn new(cnf: Cnf) -> Self {
        Self::with_config(cnf, OracleBudget::default(), Phase::default())
    }

    #[must_use]
    pub fn with_config(cnf: Cnf, budget: OracleBudget, phase: Phase) -> Self {
        let num_vars = cnf.num_vars();
        let clauses = cnf.clauses().to_vec();
        let mut watches = vec![SmallVec::new(); 2 * (num_vars + 1)];
        let mut units = Vec::new();
        let mut root_conflict = false;

        for (ci, clause) in clauses.iter().enumerate() {
            match clause.len() {
                0 => root_conflict = true,
                1 => units.push((ci, clause[0])),
                _ => {
                    watches[clause[0].index()].push(ci);
                    watches[clause[1].index()].push(ci);
                }
            }
        }

        let mut oracle = Self {
            cnf,
            clauses,
            watches,
            assignment: Assignment::new(num_vars),
            trail: Trail::new(num_vars),
            root_conflict,
            budget,
            phase,
            stats: OracleStats::default(),
        };

        for (ci, lit) in units {
            match oracle.assignment.literal_value(lit) {
                Some(false) => oracle.root_conflict = true,
                Some(true) => {}
                None => oracle
                    .trail
                    .push(&mut oracle.assignment, lit, 0, Reason::Clause(ci)),
            }
        }
        if !oracle.root_conflict && oracle.propagate(0).is_some() {
            oracle.root_conflict = true;
        }
        if oracle.root_conflict {
            log::debug!("CNF with {} clauses is unsatisfiable at level 0", oracle.cnf.clause_count());
        }

        oracle
    }

    /// Literals fixed by the CNF alone, before any assumption or decision.
    #[must_use]
    pub fn root_literals(&self) -> Vec<Literal> {
        self.trail.literals()
    }

    #[must_use]
    pub const fn budget(&self) -> OracleBudget {
        self.budget
    }

    /// Propagates the pending trail literals at `level`. Returns the conflicting clause.
    fn propagate(&mut self, level: usize) -> Option<usize> {
        while self.trail.head < self.trail.len() {
            let false_lit = self.trail[self.trail.head].lit.negated();
            self.trail.head += 1;

            let mut watchers = mem::take(&mut self.watches[false_lit.index()]);
            let mut conflict = None;
            let mut i = 0;

            while i < watchers.len() {
                let ci = watchers[i];
                let clause = &mut self.clauses[ci];
                if clause[0] == false_lit {
                    clause.swap(0, 1);
                }

                if self.assignment.literal_value(clause[0]) == Some(true) {
                    i += 1;
                    continue;
                }

                if let Some(k) =
                    (2..clause.len()).find(|&k| self.assignment.literal_value(clause[k]) != Some(false))
                {
                    clause.swap(1, k);
                    self.watches[clause[1].index()].push(ci);
                    watchers.swap_remove(i);
                    continue;
                }

                let other = clause[0];
                if self.assignment.literal_value(other) == Some(false) {
                    conflict = Some(ci);
                    break;
                }
                self.trail
                    .push(&mut self.assignment, other, level, Reason::Clause(ci));
                self.stats.propagations += 1;
                i += 1;
            }

            self.watches[false_lit.index()] = watchers;

            if conflict.is_some() {
                self.stats.conflicts += 1;
                return conflict;
            }
        }
        None
    }

    fn check_budget(&self, start: Instant, decisions: u64) -> Result<()> {
        if let Some(timeout) = self.budget.timeout {
            let elapsed = start.elapsed();
            if elapsed > timeout {
                log::warn!("oracle query exceeded its {timeout:?} budget");
                return Err(Error::Timeout { elapsed });
            }
        }
        if let Some(max) = self.budget.max_decisions {
            if decisions > max {
                log::warn!("oracle query exceeded {max} decisions");
                return Err(Error::Timeout {
                    elapsed: start.elapsed(),
                });
            }
        }
        Ok(())
    }

    fn search(&mut self, assumptions: &[Literal]) -> Result<Option<Vec<Literal>>> {
        let num_vars = self.cnf.num_vars();
        for &lit in assumptions {
            if lit.variable() == 0 || lit.variable() as usize > num_vars {
                return Err(Error::PreconditionViolation(
                    "assumption names a variable outside the CNF",
                ));
            }
            match self.assignment.literal_value(lit) {
                Some(false) => return Ok(None),
                Some(true) => {}
                None => self
                    .trail
                    .push(&mut self.assignment, lit, ASSUMPTION_LEVEL, Reason::Assumption),
            }
        }
        if self.propagate(ASSUMPTION_LEVEL).is_some() {
            return Ok(None);
        }

        let start = Instant::now();
        let mut made = 0_u64;
        // (decision literal, already flipped)
        let mut decisions: Vec<(Literal, bool)> = Vec::new();

        loop {
            self.check_budget(start, made)?;

            let Some(var) = self.assignment.next_unassigned(1) else {
                return Ok(Some(self.assignment.literals()));
            };

            let lit = Literal::new(var, self.phase.first());
            decisions.push((lit, false));
            made += 1;
            self.stats.decisions += 1;
            self.trail
                .push(&mut self.assignment, lit, decisions.len() + ASSUMPTION_LEVEL, Reason::Decision);

            while self.propagate(decisions.len() + ASSUMPTION_LEVEL).is_some() {
                loop {
                    let Some((lit, flipped)) = decisions.pop() else {
                        return Ok(None);
                    };
                    let level = decisions.len() + ASSUMPTION_LEVEL + 1;
                    self.trail.backtrack_to(&mut self.assignment, level - 1);
                    if !flipped {
                        decisions.push((lit.negated(), true));
                        self.trail
                            .push(&mut self.assignment, lit.negated(), level, Reason::Decision);
                        break;
                    }
                }
                self.check_budget(start, made)?;
            }
        }
    }
}

impl SatOracle for DpllOracle {
    fn find_solution(&mut self, assumptions: &[Literal]) -> Result<Option<Vec<Literal>>> {
        self.stats.queries += 1;
        if self.root_conflict {
            return Ok(None);
        }
        let result = self.search(assumptions);
        self.trail.backtrack_to(&mut self.assignment, 0);
        log::trace!("query {assumptions:?}: {}", match &result {
            Ok(Some(_)) => "sat",
            Ok(None) => "unsat",
            Err(_) => "aborted",
        });
        result
    }

    fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    fn stats(&self) -> OracleStats {
        self.stats
    }

    fn fork(&self, cnf: Cnf) -> Self {
        Self::with_config(cnf, self.budget, self.phase)
    }
}
