#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use crate::sat::assignment::Assignment;
use crate::sat::literal::{Literal, Variable};
use std::ops::Index;

/// Why a literal is on the trail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    #[default]
    Decision,
    /// Pushed from outside for a single query (oracle assumption, LTMS premise).
    Assumption,
    /// Forced by the clause at this index.
    Clause(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step {
    pub lit: Literal,
    pub decision_level: usize,
    pub reason: Reason,
}

/// Chronological record of assignments with per-variable level and position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    t: Vec<Step>,
    /// Index of the next step to propagate.
    pub head: usize,
    var_to_level: Vec<usize>,
    var_to_pos: Vec<Option<usize>>,
}

impl Index<usize> for Trail {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.t[index]
    }
}

impl Trail {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            t: Vec::with_capacity(num_vars),
            head: 0,
            var_to_level: vec![0; num_vars + 1],
            var_to_pos: vec![None; num_vars + 1],
        }
    }

    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.t.last().map_or(0, |s| s.decision_level)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.t.iter()
    }

    #[must_use]
    pub fn position(&self, var: Variable) -> Option<usize> {
        self.var_to_pos[var as usize]
    }

    #[must_use]
    pub fn level(&self, var: Variable) -> usize {
        self.var_to_level[var as usize]
    }

    /// The step that assigned `var`, if any.
    #[must_use]
    pub fn step(&self, var: Variable) -> Option<&Step> {
        self.position(var).map(|p| &self.t[p])
    }

    /// Records `lit` and makes it true in `assignment`. Already assigned variables are ignored.
    pub fn push(&mut self, a: &mut Assignment, lit: Literal, decision_level: usize, reason: Reason) {
        let var = lit.variable() as usize;
        if self.var_to_pos[var].is_some() {
            return;
        }

        a.assign(lit);
        self.t.push(Step {
            lit,
            decision_level,
            reason,
        });
        self.var_to_level[var] = decision_level;
        self.var_to_pos[var] = Some(self.t.len() - 1);
    }

    /// Undoes every step above `level`.
    pub fn backtrack_to(&mut self, a: &mut Assignment, level: usize) {
        while let Some(step) = self.t.last() {
            if step.decision_level <= level {
                break;
            }
            let var = step.lit.variable();
            a.unassign(var);
            self.var_to_level[var as usize] = 0;
            self.var_to_pos[var as usize] = None;
            self.t.pop();
        }
        self.head = self.head.min(self.t.len());
    }

    /// Assigned literals in trail order.
    #[must_use]
    pub fn literals(&self) -> Vec<Literal> {
        self.t.iter().map(|s| s.lit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_backtrack() {
        let mut a = Assignment::new(4);
        let mut trail = Trail::new(4);

        trail.push(&mut a, Literal::positive(1), 0, Reason::Clause(0));
        trail.push(&mut a, Literal::negative(2), 1, Reason::Decision);
        trail.push(&mut a, Literal::positive(3), 1, Reason::Clause(4));
        trail.push(&mut a, Literal::positive(4), 2, Reason::Decision);
        trail.push(&mut a, Literal::negative(4), 2, Reason::Decision);

        assert_eq!(trail.len(), 4);
        assert_eq!(trail.decision_level(), 2);
        assert_eq!(trail.position(3), Some(2));
        assert_eq!(trail.step(3).map(|s| s.reason), Some(Reason::Clause(4)));

        trail.head = 4;
        trail.backtrack_to(&mut a, 0);
        assert_eq!(trail.literals(), vec![Literal::positive(1)]);
        assert_eq!(trail.head, 1);
        assert_eq!(a.var_value(2), None);
        assert_eq!(trail.position(4), None);
    }
}
