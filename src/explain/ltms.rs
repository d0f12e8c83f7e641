#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! A logical truth maintenance system over a clause set.
//!
//! The LTMS unit-propagates a set of premises and remembers, for every forced
//! literal, the clause that forced it. When propagation runs into a violated
//! clause, following those justifications backwards yields the clauses and
//! premises responsible for the contradiction.

use crate::explain::explanation::{Explanation, Reason};
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use crate::sat::propagation::UnitPropagator;
use crate::sat::trail;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LtmsState {
    /// No premises set yet.
    #[default]
    Unresolved,
    Propagating,
    /// A clause is violated, or two premises are complementary.
    Contradiction,
    /// Propagation reached a fixpoint without violating any clause.
    Satisfied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conflict {
    Clause(usize),
    /// This premise is the complement of an earlier one.
    Premise(Literal),
}

#[derive(Debug, Clone)]
pub struct Ltms<'a> {
    cnf: &'a Cnf,
    propagator: UnitPropagator<'a>,
    state: LtmsState,
    conflict: Option<Conflict>,
}

impl<'a> Ltms<'a> {
    #[must_use]
    pub fn new(cnf: &'a Cnf) -> Self {
        Self {
            cnf,
            propagator: UnitPropagator::new(cnf),
            state: LtmsState::Unresolved,
            conflict: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> LtmsState {
        self.state
    }

    #[must_use]
    pub const fn cnf(&self) -> &'a Cnf {
        self.cnf
    }

    /// Forgets the previous premises, assumes `premises` and propagates.
    pub fn set_premises(&mut self, premises: &[Literal]) -> LtmsState {
        self.propagator.reset();
        self.conflict = None;
        self.state = LtmsState::Propagating;

        for &lit in premises {
            if !self.propagator.assume(lit) {
                self.conflict = Some(Conflict::Premise(lit));
                self.state = LtmsState::Contradiction;
                return self.state;
            }
        }

        self.state = match self.propagator.propagate() {
            Some(ci) => {
                self.conflict = Some(Conflict::Clause(ci));
                LtmsState::Contradiction
            }
            None => LtmsState::Satisfied,
        };
        log::trace!("premises {premises:?}: {:?}", self.state);
        self.state
    }

    /// Value of `var` after the last propagation.
    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.propagator.value(var)
    }

    /// The justification of the current contradiction, or `None` in any other state.
    ///
    /// An empty clause contradicts without any premise and yields an explanation
    /// with neither reasons nor premises.
    #[must_use]
    pub fn explanation(&self) -> Option<Explanation> {
        if self.state != LtmsState::Contradiction {
            return None;
        }
        match self.conflict? {
            Conflict::Premise(lit) => Some(Explanation::new(Vec::new(), vec![lit.negated(), lit])),
            Conflict::Clause(ci) => Some(self.trace_back(ci)),
        }
    }

    fn trace_back(&self, violated: usize) -> Explanation {
        let clause = &self.cnf[violated];
        let mut reasons: Vec<(usize, Reason)> = Vec::new();
        let mut premises: Vec<(usize, Literal)> = Vec::new();
        let mut seen: FxHashSet<Variable> = FxHashSet::default();
        let mut stack: Vec<Variable> = clause.iter().map(|l| l.variable()).collect();

        while let Some(var) = stack.pop() {
            if !seen.insert(var) {
                continue;
            }
            let (Some(step), Some(pos)) =
                (self.propagator.step(var), self.propagator.trail().position(var))
            else {
                continue;
            };
            match step.reason {
                trail::Reason::Clause(ci) => {
                    let antecedent = &self.cnf[ci];
                    stack.extend(
                        antecedent
                            .iter()
                            .map(|l| l.variable())
                            .filter(|&v| v != var),
                    );
                    reasons.push((pos, Reason {
                        clause: ci,
                        provenance: antecedent.provenance,
                        literals: antecedent.literals().to_vec(),
                        forced: step.lit,
                    }));
                }
                trail::Reason::Assumption | trail::Reason::Decision => premises.push((pos, step.lit)),
            }
        }

        reasons.sort_by_key(|(pos, _)| *pos);
        premises.sort_by_key(|(pos, _)| *pos);

        let mut reasons: Vec<Reason> = reasons.into_iter().map(|(_, r)| r).collect();
        // The violated clause would force the literal whose variable was assigned last.
        if let Some(&last) = clause
            .iter()
            .max_by_key(|l| self.propagator.trail().position(l.variable()))
        {
            reasons.push(Reason {
                clause: violated,
                provenance: clause.provenance,
                literals: clause.literals().to_vec(),
                forced: last,
            });
        }

        Explanation::new(reasons, premises.into_iter().map(|(_, l)| l).collect())
    }
}
