#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Projection of a CNF onto a subset of its variables.
//!
//! Every other variable is eliminated by resolution: the clauses mentioning `x`
//! are replaced by all non-tautological resolvents on `x`. The result is
//! satisfiable under exactly the assignments of the kept variables that extend to
//! a model of the input.
//!
//! Resolution can blow up quadratically per step, so the elimination order
//! matters. Callers with structural knowledge (a feature tree or a dependency
//! graph) pass a preferred order; variables it leaves out are picked greedily by
//! the smallest estimated growth.

use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::sat::clause::Provenance;
use crate::sat::cnf::{Cnf, VariableMap};
use crate::sat::literal::{Literal, Variable};
use rustc_hash::FxHashSet;

/// A clause under elimination: sorted literals and the provenance it started with.
#[derive(Debug, Clone)]
struct Entry {
    literals: Vec<Literal>,
    provenance: Provenance,
}

impl Entry {
    fn new(literals: impl IntoIterator<Item = Literal>, provenance: Provenance) -> Self {
        let mut literals: Vec<Literal> = literals.into_iter().collect();
        literals.sort_unstable();
        literals.dedup();
        Self {
            literals,
            provenance,
        }
    }

    /// Literals are sorted by variable, so complements sit next to each other.
    fn is_tautology(&self) -> bool {
        self.literals
            .windows(2)
            .any(|w| w[0].variable() == w[1].variable())
    }

    fn mentions(&self, var: Variable) -> Option<bool> {
        self.literals
            .iter()
            .find(|lit| lit.variable() == var)
            .map(|lit| lit.polarity())
    }

    fn subsumes(&self, other: &Self) -> bool {
        self.literals.len() <= other.literals.len()
            && self
                .literals
                .iter()
                .all(|lit| other.literals.binary_search(lit).is_ok())
    }
}

/// Projects `cnf` onto `keep`.
///
/// Variables of `order` are eliminated first, in that order; kept variables and
/// repeats in it are ignored. The returned CNF numbers the kept variables `1..=k`
/// in ascending order of their old index and carries their names over. Surviving
/// input clauses keep their provenance (remapped to the new numbering, or
/// [`Provenance::External`] if it names an eliminated variable); derived clauses
/// are tagged [`Provenance::Resolvent`]. Once resolution derives the empty clause
/// the result is that single clause.
///
/// # Errors
///
/// [`Error::PreconditionViolation`] if `keep` or `order` names a variable outside
/// the CNF, [`Error::Cancelled`] if the monitor asks to stop.
pub fn slice(
    cnf: &Cnf,
    keep: &[Variable],
    order: &[Variable],
    monitor: &dyn Monitor,
) -> Result<Cnf> {
    let num_vars = cnf.num_vars();
    let in_range = |v: &Variable| *v != 0 && (*v as usize) <= num_vars;
    if !keep.iter().all(in_range) {
        return Err(Error::PreconditionViolation(
            "sliced variable outside the CNF",
        ));
    }
    if !order.iter().all(in_range) {
        return Err(Error::PreconditionViolation(
            "elimination order names a variable outside the CNF",
        ));
    }

    let mut kept = vec![false; num_vars + 1];
    for &var in keep {
        kept[var as usize] = true;
    }

    let mut entries: Vec<Entry> = cnf
        .iter()
        .map(|clause| Entry::new(clause.iter().copied(), clause.provenance))
        .filter(|entry| !entry.is_tautology())
        .collect();
    let mut seen: FxHashSet<Vec<Literal>> =
        entries.iter().map(|e| e.literals.clone()).collect();

    let mut done = kept.clone();
    let mut eliminated = 0_usize;
    let mut preferred = order.iter().copied();
    loop {
        if entries.iter().any(|e| e.literals.is_empty()) {
            log::debug!("slicing derived the empty clause after {eliminated} eliminations");
            return Ok(unsatisfiable(cnf.variables(), &kept));
        }
        let next = preferred
            .by_ref()
            .find(|&v| !done[v as usize])
            .or_else(|| cheapest(&entries, &done));
        let Some(var) = next else {
            break;
        };
        monitor.checkpoint()?;
        done[var as usize] = true;
        entries = eliminate(entries, var, &mut seen);
        eliminated += 1;
        monitor.worked(1);
    }

    log::debug!(
        "sliced {} variables down to {} with {} clauses left",
        num_vars,
        keep.len(),
        entries.len()
    );
    Ok(renumber(cnf.variables(), &kept, entries))
}

/// Replaces the clauses on `var` by their resolvents. Resolvents that repeat or
/// are subsumed by a clause already present are dropped.
fn eliminate(
    entries: Vec<Entry>,
    var: Variable,
    seen: &mut FxHashSet<Vec<Literal>>,
) -> Vec<Entry> {
    let mut rest = Vec::with_capacity(entries.len());
    let mut positive = Vec::new();
    let mut negative = Vec::new();
    for entry in entries {
        match entry.mentions(var) {
            Some(true) => positive.push(entry),
            Some(false) => negative.push(entry),
            None => rest.push(entry),
        }
    }
    for entry in positive.iter().chain(&negative) {
        seen.remove(&entry.literals);
    }

    let mut added = 0_usize;
    for pos in &positive {
        for neg in &negative {
            let resolvent = Entry::new(
                pos.literals
                    .iter()
                    .chain(&neg.literals)
                    .copied()
                    .filter(|lit| lit.variable() != var),
                Provenance::Resolvent,
            );
            if resolvent.is_tautology()
                || seen.contains(&resolvent.literals)
                || rest.iter().any(|e| e.subsumes(&resolvent))
            {
                continue;
            }
            seen.insert(resolvent.literals.clone());
            rest.push(resolvent);
            added += 1;
        }
    }
    log::trace!(
        "eliminated {var}: -{} clauses +{added} resolvents",
        positive.len() + negative.len()
    );
    rest
}

/// The open variable whose elimination adds the fewest clauses, lowest index first.
fn cheapest(entries: &[Entry], done: &[bool]) -> Option<Variable> {
    let mut positive = vec![0_i64; done.len()];
    let mut negative = vec![0_i64; done.len()];
    for lit in entries.iter().flat_map(|e| &e.literals) {
        let slot = lit.variable() as usize;
        if lit.polarity() {
            positive[slot] += 1;
        } else {
            negative[slot] += 1;
        }
    }
    (1..done.len())
        .filter(|&v| !done[v])
        .min_by_key(|&v| (positive[v] * negative[v] - positive[v] - negative[v], v))
        .and_then(|v| Variable::try_from(v).ok())
}

/// Variable map over the kept variables, plus the old-to-new index table.
fn kept_variables(variables: &VariableMap, kept: &[bool]) -> (VariableMap, Vec<Variable>) {
    let mut map = VariableMap::new();
    let mut renamed = vec![0; kept.len()];
    for (var, name) in variables.iter() {
        if kept[var as usize] {
            renamed[var as usize] = map.intern(name);
        }
    }
    (map, renamed)
}

fn unsatisfiable(variables: &VariableMap, kept: &[bool]) -> Cnf {
    let (map, _) = kept_variables(variables, kept);
    let mut cnf = Cnf::new(map);
    cnf.add_clause([], Provenance::Resolvent);
    cnf
}

fn renumber(variables: &VariableMap, kept: &[bool], entries: Vec<Entry>) -> Cnf {
    let (map, renamed) = kept_variables(variables, kept);
    let remap = |var: Variable| match renamed.get(var as usize) {
        Some(&new) if new != 0 => Some(new),
        _ => None,
    };
    let mut cnf = Cnf::new(map);
    for entry in entries {
        let provenance = match entry.provenance {
            Provenance::ChildImpliesParent { child } => remap(child)
                .map_or(Provenance::External, |child| {
                    Provenance::ChildImpliesParent { child }
                }),
            Provenance::MandatoryChild { child } => remap(child)
                .map_or(Provenance::External, |child| Provenance::MandatoryChild { child }),
            Provenance::GroupAtLeastOne { parent } => remap(parent)
                .map_or(Provenance::External, |parent| {
                    Provenance::GroupAtLeastOne { parent }
                }),
            Provenance::GroupExclusion { parent } => remap(parent)
                .map_or(Provenance::External, |parent| {
                    Provenance::GroupExclusion { parent }
                }),
            other => other,
        };
        let literals = entry
            .literals
            .iter()
            .filter_map(|lit| remap(lit.variable()).map(|v| Literal::new(v, lit.polarity())));
        cnf.add_clause(literals, provenance);
    }
    cnf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{CancellationToken, NullMonitor};
    use std::collections::BTreeSet;
    use test_log::test;

    /// Projections of all models of `cnf` onto the named variables, by name.
    fn projected_models(cnf: &Cnf, names: &[&str]) -> BTreeSet<Vec<bool>> {
        let n = cnf.num_vars();
        let vars: Vec<Variable> = names
            .iter()
            .map(|name| cnf.variables().get(name).unwrap())
            .collect();
        (0_u32..1 << n)
            .map(|bits| {
                (1..=n)
                    .map(|v| Literal::new(v as Variable, (bits >> (v - 1)) & 1 == 1))
                    .collect::<Vec<_>>()
            })
            .filter(|model| cnf.verify(model))
            .map(|model| vars.iter().map(|&v| model[v as usize - 1].polarity()).collect())
            .collect()
    }

    fn assert_projection_preserved(cnf: &Cnf, keep: &[Variable], order: &[Variable]) {
        let sliced = slice(cnf, keep, order, &NullMonitor).unwrap();
        let names: Vec<&str> = keep
            .iter()
            .map(|&v| cnf.variables().name(v).unwrap())
            .collect();
        assert_eq!(sliced.num_vars(), keep.len());
        assert_eq!(
            projected_models(&sliced, &names),
            projected_models(cnf, &names)
        );
    }

    #[test]
    fn test_chain_is_shortcut() {
        let cnf = Cnf::from_dimacs(vec![vec![-1, 2], vec![-2, 3], vec![-3, 4]]);
        let sliced = slice(&cnf, &[1, 4], &[], &NullMonitor).unwrap();
        assert_eq!(sliced.to_string(), "(-1 | 2)");
        assert_eq!(sliced.variables().name(2), Some("4"));
        assert_eq!(sliced[0].provenance, Provenance::Resolvent);
        assert_projection_preserved(&cnf, &[1, 4], &[]);
    }

    #[test]
    fn test_projected_models_are_preserved() {
        let cnf = Cnf::from_dimacs(vec![
            vec![1, 2, 3],
            vec![-1, -2],
            vec![-3, 4, 5],
            vec![-4, -5],
            vec![2, -5],
        ]);
        assert_projection_preserved(&cnf, &[1, 5], &[]);
        assert_projection_preserved(&cnf, &[2, 4], &[5, 1, 3]);
        assert_projection_preserved(&cnf, &[3], &[4, 4, 3, 2]);
    }

    #[test]
    fn test_keeping_everything_only_normalises() {
        let cnf = Cnf::from_dimacs(vec![vec![1, -1], vec![2, -3]]);
        let sliced = slice(&cnf, &[3, 1, 2], &[], &NullMonitor).unwrap();
        assert_eq!(sliced.num_vars(), 3);
        assert_eq!(sliced.clause_count(), 1);
        assert_eq!(sliced[0].provenance, Provenance::External);
    }

    #[test]
    fn test_unsatisfiable_input_gives_empty_clause() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2], vec![1, -2], vec![-1, 3], vec![-1, -3]]);
        let sliced = slice(&cnf, &[3], &[], &NullMonitor).unwrap();
        assert!(!sliced.verify(&[Literal::positive(1)]));
        assert!(!sliced.verify(&[Literal::negative(1)]));

        let sliced = slice(&cnf, &[], &[], &NullMonitor).unwrap();
        assert_eq!(sliced.num_vars(), 0);
        assert_eq!(sliced.clause_count(), 1);
        assert!(sliced[0].is_empty());
    }

    #[test]
    fn test_structural_provenance_is_remapped() {
        let mut vars = VariableMap::new();
        let root = vars.intern("Root");
        let a = vars.intern("A");
        let b = vars.intern("B");
        let mut cnf = Cnf::new(vars);
        cnf.add_clause([Literal::positive(root)], Provenance::Root);
        cnf.add_clause(
            [Literal::negative(b), Literal::positive(root)],
            Provenance::ChildImpliesParent { child: b },
        );
        cnf.add_clause(
            [Literal::negative(a), Literal::negative(b)],
            Provenance::GroupExclusion { parent: root },
        );

        let sliced = slice(&cnf, &[a, b], &[root], &NullMonitor).unwrap();
        let provenances: Vec<Provenance> = sliced.iter().map(|c| c.provenance).collect();
        assert_eq!(provenances, vec![Provenance::External]);
        assert_eq!(sliced.variables().get("B"), Some(2));
    }

    #[test]
    fn test_out_of_range_variables_are_rejected() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2]]);
        assert!(matches!(
            slice(&cnf, &[3], &[], &NullMonitor),
            Err(Error::PreconditionViolation(_))
        ));
        assert!(matches!(
            slice(&cnf, &[1], &[0], &NullMonitor),
            Err(Error::PreconditionViolation(_))
        ));
    }

    #[test]
    fn test_cancellation() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2], vec![-2, 3]]);
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(
            slice(&cnf, &[1], &[], &token),
            Err(Error::Cancelled)
        ));
    }
}
