#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use smallvec::SmallVec;
use std::fmt;

/// Where a clause came from.
///
/// Explanations report provenances, and a redundant constraint is removed from a
/// CNF by dropping every clause tagged with its [`Provenance::Constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provenance {
    /// The root feature is always selected.
    Root,
    /// `child => parent`.
    ChildImpliesParent {
        child: Variable,
    },
    /// `parent => child` for a mandatory child of an AND group.
    MandatoryChild {
        child: Variable,
    },
    /// `parent => (c1 | .. | ck)` for an OR or ALTERNATIVE group.
    GroupAtLeastOne {
        parent: Variable,
    },
    /// `!ci | !cj` for a pair of ALTERNATIVE siblings.
    GroupExclusion {
        parent: Variable,
    },
    /// A clause of the cross-tree constraint at this position.
    Constraint {
        index: usize,
    },
    /// A clause not derived from a feature tree (e.g. DIMACS input).
    External,
    /// Derived by resolution while eliminating a variable.
    Resolvent,
}

impl Provenance {
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::Constraint { .. } | Self::External | Self::Resolvent)
    }

    #[must_use]
    pub const fn constraint_index(&self) -> Option<usize> {
        match self {
            Self::Constraint { index } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::ChildImpliesParent { child } => write!(f, "child {child} implies its parent"),
            Self::MandatoryChild { child } => write!(f, "mandatory child {child}"),
            Self::GroupAtLeastOne { parent } => write!(f, "group of {parent} needs a member"),
            Self::GroupExclusion { parent } => write!(f, "alternative group of {parent}"),
            Self::Constraint { index } => write!(f, "constraint #{index}"),
            Self::External => write!(f, "external clause"),
            Self::Resolvent => write!(f, "resolvent"),
        }
    }
}

/// Literal storage of a clause. Most feature-model clauses are binary.
pub type LiteralStorage = SmallVec<[Literal; 4]>;

/// An ordered set of literals tagged with its [`Provenance`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    literals: LiteralStorage,
    pub provenance: Provenance,
}

impl Clause {
    /// Builds a clause, keeping the first occurrence of every literal.
    pub fn new(literals: impl IntoIterator<Item = Literal>, provenance: Provenance) -> Self {
        let mut storage = LiteralStorage::new();
        for lit in literals {
            if !storage.contains(&lit) {
                storage.push(lit);
            }
        }
        Self {
            literals: storage,
            provenance,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    /// A clause containing a literal and its complement is always satisfied.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .any(|lit| self.literals.contains(&lit.negated()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    #[must_use]
    pub fn contains(&self, lit: Literal) -> bool {
        self.literals.contains(&lit)
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.literals.swap(i, j);
    }

    /// Whether some literal is true under `value`.
    pub fn is_satisfied_by(&self, value: impl Fn(Variable) -> Option<bool>) -> bool {
        self.literals
            .iter()
            .any(|lit| value(lit.variable()).is_some_and(|v| lit.eval(v)))
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, lit) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{lit}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(values: &[i32]) -> Vec<Literal> {
        values.iter().copied().map(Literal::from_i32).collect()
    }

    #[test]
    fn test_new_removes_duplicates_keeping_order() {
        let clause = Clause::new(lits(&[3, -1, 3, 2, -1]), Provenance::External);
        assert_eq!(clause.literals(), lits(&[3, -1, 2]).as_slice());
        assert_eq!(clause.len(), 3);
    }

    #[test]
    fn test_tautology() {
        assert!(Clause::new(lits(&[1, 2, -1]), Provenance::External).is_tautology());
        assert!(!Clause::new(lits(&[1, 2]), Provenance::External).is_tautology());
    }

    #[test]
    fn test_satisfied_by() {
        let clause = Clause::new(lits(&[1, -2]), Provenance::Root);
        assert!(clause.is_satisfied_by(|v| if v == 2 { Some(false) } else { None }));
        assert!(!clause.is_satisfied_by(|v| Some(v == 2)));
        assert!(!clause.is_satisfied_by(|_| None));
    }

    #[test]
    fn test_swap() {
        let mut clause = Clause::new(lits(&[1, 2, 3]), Provenance::External);
        clause.swap(0, 2);
        assert_eq!(clause[0], Literal::from_i32(3));
        assert_eq!(clause[2], Literal::from_i32(1));
    }
}
