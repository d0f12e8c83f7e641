#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The canonical propositional representation of a feature model.
//!
//! A [`Cnf`] owns its [`VariableMap`] exclusively. Clauses may be added and removed
//! freely, but variables are only ever appended: a variable index stays valid for
//! the lifetime of the `Cnf` it was interned in. When the feature tree changes the
//! whole `Cnf` is rebuilt.

use crate::sat::clause::{Clause, Provenance};
use crate::sat::literal::{Literal, Variable};
use crate::sat::propagation::UnitPropagator;
use core::ops::Index;
use rustc_hash::FxHashMap;
use std::fmt;

/// Bijection between feature names and variables `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableMap {
    names: Vec<String>,
    index: FxHashMap<String, Variable>,
}

impl VariableMap {
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: vec![String::new()],
            index: FxHashMap::default(),
        }
    }

    /// Variables named after their own index, as DIMACS input without name comments has.
    #[must_use]
    pub fn anonymous(num_vars: usize) -> Self {
        let mut map = Self::new();
        for i in 1..=num_vars {
            map.intern(&i.to_string());
        }
        map
    }

    /// Returns the variable of `name`, allocating the next free index for a new name.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX / 2` variables are interned.
    pub fn intern(&mut self, name: &str) -> Variable {
        if let Some(&var) = self.index.get(name) {
            return var;
        }
        let var = Variable::try_from(self.names.len()).expect("variable index overflowed");
        assert!(var < u32::MAX >> 1, "variable index overflowed");
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), var);
        var
    }

    /// Renames an existing variable. Used by the DIMACS reader for `c <index> <name>` lines.
    pub fn rename(&mut self, var: Variable, name: &str) -> bool {
        let Some(slot) = self.names.get_mut(var as usize) else {
            return false;
        };
        if var == 0 || self.index.contains_key(name) {
            return false;
        }
        self.index.remove(slot.as_str());
        name.clone_into(slot);
        self.index.insert(name.to_owned(), var);
        true
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Variable> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, var: Variable) -> Option<&str> {
        match var {
            0 => None,
            v => self.names.get(v as usize).map(String::as_str),
        }
    }

    /// Number of variables, `N`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Variables `1..=N` in index order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + use<> {
        #[allow(clippy::cast_possible_truncation)]
        let n = self.len() as Variable;
        1..=n
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, &str)> {
        self.names
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, name)| {
                #[allow(clippy::cast_possible_truncation)]
                let var = i as Variable;
                (var, name.as_str())
            })
    }

    /// Human readable form of a literal, e.g. `!Logging`.
    #[must_use]
    pub fn literal_name(&self, lit: Literal) -> String {
        let name = self.name(lit.variable()).unwrap_or("?");
        if lit.polarity() {
            name.to_owned()
        } else {
            format!("!{name}")
        }
    }
}

/// An ordered list of tagged clauses over a [`VariableMap`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    clauses: Vec<Clause>,
    variables: VariableMap,
}

impl Cnf {
    #[must_use]
    pub const fn new(variables: VariableMap) -> Self {
        Self {
            clauses: Vec::new(),
            variables,
        }
    }

    /// Builds a CNF over anonymous variables from DIMACS-style integer clauses.
    pub fn from_dimacs<I, J>(clauses: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = i32>,
    {
        let clauses: Vec<Vec<Literal>> = clauses
            .into_iter()
            .map(|c| c.into_iter().map(Literal::from_i32).collect())
            .collect();
        let num_vars = clauses
            .iter()
            .flatten()
            .map(|lit| lit.variable() as usize)
            .max()
            .unwrap_or(0);
        let mut cnf = Self::new(VariableMap::anonymous(num_vars));
        for clause in clauses {
            cnf.add_clause(clause, Provenance::External);
        }
        cnf
    }

    /// Appends a clause and returns its index.
    pub fn add_clause(
        &mut self,
        literals: impl IntoIterator<Item = Literal>,
        provenance: Provenance,
    ) -> usize {
        let clause = Clause::new(literals, provenance);
        debug_assert!(
            clause
                .iter()
                .all(|l| l.variable() != 0 && l.variable() as usize <= self.num_vars()),
            "clause {clause} uses a variable outside the variable map"
        );
        self.clauses.push(clause);
        self.clauses.len() - 1
    }

    /// Drops every clause tagged with `provenance` and returns how many were removed.
    /// Indices of the remaining clauses shift down.
    pub fn remove_clauses_by_provenance(&mut self, provenance: &Provenance) -> usize {
        let before = self.clauses.len();
        self.clauses.retain(|c| c.provenance != *provenance);
        before - self.clauses.len()
    }

    /// A copy of this CNF without the clauses tagged with `provenance`.
    #[must_use]
    pub fn without_provenance(&self, provenance: &Provenance) -> Self {
        let mut cnf = self.clone();
        cnf.remove_clauses_by_provenance(provenance);
        cnf
    }

    /// A CNF over the same variables holding only the clauses at `indices`.
    #[must_use]
    pub fn subset(&self, indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            clauses: indices
                .into_iter()
                .filter_map(|i| self.clauses.get(i).cloned())
                .collect(),
            variables: self.variables.clone(),
        }
    }

    #[must_use]
    pub const fn variables(&self) -> &VariableMap {
        &self.variables
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Whether the (total or partial) assignment `model` satisfies every clause.
    #[must_use]
    pub fn verify(&self, model: &[Literal]) -> bool {
        let mut values = vec![None; self.num_vars() + 1];
        for lit in model {
            if let Some(slot) = values.get_mut(lit.variable() as usize) {
                *slot = Some(lit.polarity());
            }
        }
        self.clauses
            .iter()
            .all(|c| c.is_satisfied_by(|v| values.get(v as usize).copied().flatten()))
    }

    /// Literals forced by unit propagation from `assumptions`, assumptions included.
    /// `None` when propagation runs into a conflict.
    #[must_use]
    pub fn unit_propagate(&self, assumptions: &[Literal]) -> Option<Vec<Literal>> {
        let mut propagator = UnitPropagator::new(self);
        for &lit in assumptions {
            if !propagator.assume(lit) {
                return None;
            }
        }
        propagator.propagate().is_none().then(|| propagator.implied())
    }
}

impl Index<usize> for Cnf {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(values: &[i32]) -> Vec<Literal> {
        values.iter().copied().map(Literal::from_i32).collect()
    }

    #[test]
    fn test_variable_map_is_stable_and_one_based() {
        let mut vars = VariableMap::new();
        let a = vars.intern("A");
        let b = vars.intern("B");
        assert_eq!((a, b), (1, 2));
        assert_eq!(vars.intern("A"), 1);
        assert_eq!(vars.name(0), None);
        assert_eq!(vars.name(2), Some("B"));
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.literal_name(Literal::negative(a)), "!A");
    }

    #[test]
    fn test_rename() {
        let mut vars = VariableMap::anonymous(2);
        assert!(vars.rename(2, "Logging"));
        assert_eq!(vars.get("Logging"), Some(2));
        assert_eq!(vars.get("2"), None);
        assert!(!vars.rename(1, "Logging"));
        assert!(!vars.rename(9, "Missing"));
    }

    #[test]
    fn test_remove_clauses_by_provenance() {
        let mut cnf = Cnf::new(VariableMap::anonymous(3));
        cnf.add_clause(lits(&[1]), Provenance::Root);
        cnf.add_clause(lits(&[-2, 3]), Provenance::Constraint { index: 0 });
        cnf.add_clause(lits(&[-3, 1]), Provenance::ChildImpliesParent { child: 3 });
        cnf.add_clause(lits(&[-2, -3]), Provenance::Constraint { index: 0 });

        let without = cnf.without_provenance(&Provenance::Constraint { index: 0 });
        assert_eq!(without.clause_count(), 2);
        assert_eq!(cnf.clause_count(), 4);

        assert_eq!(
            cnf.remove_clauses_by_provenance(&Provenance::Constraint { index: 0 }),
            2
        );
        assert_eq!(cnf, without);
    }

    #[test]
    fn test_verify() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2], vec![-1, 3]]);
        assert_eq!(cnf.num_vars(), 3);
        assert!(cnf.verify(&lits(&[1, -2, 3])));
        assert!(!cnf.verify(&lits(&[1, -2, -3])));
    }

    #[test]
    fn test_unit_propagate() {
        let cnf = Cnf::from_dimacs(vec![vec![1], vec![-1, 2], vec![-2, -3], vec![3, 4, 5]]);
        let implied = cnf.unit_propagate(&[]).unwrap();
        assert_eq!(implied, lits(&[1, 2, -3]));

        assert!(cnf.unit_propagate(&lits(&[3])).is_none());
    }
}
