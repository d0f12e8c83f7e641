#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
use crate::sat::literal::{Literal, Variable};
use core::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Assigned(b) => Some(b),
            Self::Unassigned => None,
        }
    }
}

/// Partial assignment over variables `1..=N`, indexed by variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    states: Vec<VarState>,
    assigned: usize,
}

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.states[index as usize]
    }
}

impl Assignment {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            states: vec![VarState::Unassigned; num_vars + 1],
            assigned: 0,
        }
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.states.len() - 1
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: Literal) {
        let slot = &mut self.states[lit.variable() as usize];
        if slot.is_unassigned() {
            self.assigned += 1;
        }
        *slot = VarState::Assigned(lit.polarity());
    }

    pub fn unassign(&mut self, var: Variable) {
        let slot = &mut self.states[var as usize];
        if slot.is_assigned() {
            self.assigned -= 1;
        }
        *slot = VarState::Unassigned;
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        self.states.get(var as usize).and_then(|s| s.value())
    }

    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable()).map(|v| lit.eval(v))
    }

    #[must_use]
    pub fn is_assigned(&self, var: Variable) -> bool {
        self.var_value(var).is_some()
    }

    #[must_use]
    pub const fn all_assigned(&self) -> bool {
        self.assigned + 1 == self.states.len()
    }

    /// First unassigned variable at or after `from`.
    #[must_use]
    pub fn next_unassigned(&self, from: Variable) -> Option<Variable> {
        (from.max(1) as usize..self.states.len())
            .find(|&i| self.states[i].is_unassigned())
            .and_then(|i| Variable::try_from(i).ok())
    }

    /// Every assigned variable as a literal, in variable order.
    #[must_use]
    pub fn literals(&self) -> Vec<Literal> {
        self.states
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, s)| {
                let var = Variable::try_from(i).ok()?;
                s.value().map(|b| Literal::new(var, b))
            })
            .collect()
    }
}
