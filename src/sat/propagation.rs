#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Plain unit propagation without search.
//!
//! [`UnitPropagator`] is the shared engine behind [`Cnf::unit_propagate`], the
//! core/dead pre-pass of the analyser and the truth-maintenance system. It keeps
//! every forced literal on a [`Trail`] together with the clause that forced it, so
//! callers can walk justification chains backwards.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::{Reason, Step, Trail};
use smallvec::SmallVec;
use std::ops::Index;

/// For every literal, the clauses that contain it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccurrenceLists(Vec<SmallVec<[usize; 6]>>);

impl OccurrenceLists {
    #[must_use]
    pub fn new(cnf: &Cnf) -> Self {
        let mut lists = vec![SmallVec::new(); 2 * (cnf.num_vars() + 1)];
        for (i, clause) in cnf.iter().enumerate() {
            for lit in clause.iter() {
                lists[lit.index()].push(i);
            }
        }
        Self(lists)
    }
}

impl Index<Literal> for OccurrenceLists {
    type Output = SmallVec<[usize; 6]>;

    fn index(&self, index: Literal) -> &Self::Output {
        &self.0[index.index()]
    }
}

/// Unit propagation over a borrowed [`Cnf`], recording a reason for every literal.
#[derive(Debug, Clone)]
pub struct UnitPropagator<'a> {
    cnf: &'a Cnf,
    occurrences: OccurrenceLists,
    assignment: Assignment,
    trail: Trail,
    seeded: bool,
}

impl<'a> UnitPropagator<'a> {
    #[must_use]
    pub fn new(cnf: &'a Cnf) -> Self {
        Self {
            cnf,
            occurrences: OccurrenceLists::new(cnf),
            assignment: Assignment::new(cnf.num_vars()),
            trail: Trail::new(cnf.num_vars()),
            seeded: false,
        }
    }

    /// Forgets every assignment so the propagator can be reused with new premises.
    pub fn reset(&mut self) {
        self.trail.backtrack_to(&mut self.assignment, 0);
        self.assignment = Assignment::new(self.cnf.num_vars());
        self.trail = Trail::new(self.cnf.num_vars());
        self.seeded = false;
    }

    /// Makes `lit` true as a premise. Returns `false` if its complement already holds.
    pub fn assume(&mut self, lit: Literal) -> bool {
        match self.assignment.literal_value(lit) {
            Some(value) => value,
            None => {
                self.trail.push(&mut self.assignment, lit, 0, Reason::Assumption);
                true
            }
        }
    }

    /// Propagates to fixpoint. Returns the index of the first clause found with every
    /// literal false, or `None` when no clause is violated.
    pub fn propagate(&mut self) -> Option<usize> {
        if !self.seeded {
            self.seeded = true;
            if let Some(conflict) = self.seed_units() {
                return Some(conflict);
            }
        }

        while self.trail.head < self.trail.len() {
            let lit = self.trail[self.trail.head].lit;
            self.trail.head += 1;

            for &ci in &self.occurrences[lit.negated()] {
                match self.examine(ci) {
                    ClauseStatus::Violated => return Some(ci),
                    ClauseStatus::Unit(forced) => {
                        self.trail
                            .push(&mut self.assignment, forced, 0, Reason::Clause(ci));
                    }
                    ClauseStatus::Satisfied | ClauseStatus::Open => {}
                }
            }
        }

        None
    }

    fn seed_units(&mut self) -> Option<usize> {
        for (ci, clause) in self.cnf.iter().enumerate() {
            match clause.len() {
                0 => return Some(ci),
                1 => match self.assignment.literal_value(clause[0]) {
                    Some(false) => return Some(ci),
                    Some(true) => {}
                    None => self
                        .trail
                        .push(&mut self.assignment, clause[0], 0, Reason::Clause(ci)),
                },
                _ => {}
            }
        }
        None
    }

    fn examine(&self, ci: usize) -> ClauseStatus {
        let mut open = None;
        let mut open_count = 0;
        for &lit in self.cnf[ci].iter() {
            match self.assignment.literal_value(lit) {
                Some(true) => return ClauseStatus::Satisfied,
                Some(false) => {}
                None => {
                    open_count += 1;
                    open = Some(lit);
                }
            }
        }
        match (open_count, open) {
            (0, _) => ClauseStatus::Violated,
            (1, Some(lit)) => ClauseStatus::Unit(lit),
            _ => ClauseStatus::Open,
        }
    }

    #[must_use]
    pub const fn trail(&self) -> &Trail {
        &self.trail
    }

    #[must_use]
    pub const fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.assignment.var_value(var)
    }

    /// The step that assigned `var`.
    #[must_use]
    pub fn step(&self, var: Variable) -> Option<&Step> {
        self.trail.step(var)
    }

    /// Every assigned literal in the order it was forced.
    #[must_use]
    pub fn implied(&self) -> Vec<Literal> {
        self.trail.literals()
    }

    #[must_use]
    pub const fn cnf(&self) -> &'a Cnf {
        self.cnf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClauseStatus {
    Satisfied,
    Violated,
    Unit(Literal),
    Open,
}
