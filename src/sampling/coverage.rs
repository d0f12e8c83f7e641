#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! T-wise tuple enumeration and coverage checks.

use crate::error::Result;
use crate::sampling::Sample;
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::SatOracle;
use itertools::Itertools;

/// Every t-tuple of literals over `variables`, lazily, in lexicographic literal
/// order: variable combinations in order, and for each combination the polarity
/// patterns with positive literals first.
///
/// `variables` must be sorted for the order to be lexicographic. `t = 0` yields
/// the single empty tuple.
pub fn tuples(variables: &[Variable], t: usize) -> impl Iterator<Item = Vec<Literal>> + '_ {
    variables
        .iter()
        .copied()
        .combinations(t)
        .flat_map(move |combo| {
            (0..1usize << t).map(move |mask| {
                combo
                    .iter()
                    .enumerate()
                    .map(|(i, &var)| Literal::new(var, (mask >> (t - 1 - i)) & 1 == 0))
                    .collect_vec()
            })
        })
}

/// Number of tuples [`tuples`] yields, saturating at `u64::MAX`.
#[must_use]
pub fn tuple_count(n: usize, t: usize) -> u64 {
    u32::try_from(t)
        .ok()
        .and_then(|t| 1u64.checked_shl(t))
        .zip(binomial(n, t))
        .map_or(u64::MAX, |(patterns, combos)| {
            combos.checked_mul(patterns).unwrap_or(u64::MAX)
        })
}

/// `n` choose `k`, `Some(0)` for `k > n` and `None` on overflow.
fn binomial(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k) as u64;
    let n = n as u64;
    let mut value: u64 = 1;
    for i in 0..k {
        value = value.checked_mul(n - i)? / (i + 1);
    }
    Some(value)
}

/// Every combination of `t` expressions taken from one group, lazily, group by
/// group. An expression is a conjunction of literals; a tuple is the sorted union
/// of its expressions' literals and may contain complementary literals.
pub fn expression_tuples(
    groups: &[Vec<Vec<Literal>>],
    t: usize,
) -> impl Iterator<Item = Vec<Literal>> + '_ {
    groups.iter().flat_map(move |group| {
        group.iter().combinations(t).map(|combo| {
            combo
                .into_iter()
                .flatten()
                .copied()
                .sorted()
                .dedup()
                .collect_vec()
        })
    })
}

/// Number of tuples [`expression_tuples`] yields, saturating at `u64::MAX`.
#[must_use]
pub fn expression_tuple_count(groups: &[Vec<Vec<Literal>>], t: usize) -> u64 {
    groups
        .iter()
        .map(|group| binomial(group.len(), t).unwrap_or(u64::MAX))
        .fold(0, u64::saturating_add)
}

/// Tuples over `variables` that some valid configuration contains but `sample`
/// does not cover. An empty result means the sample achieves full t-wise coverage.
///
/// # Errors
///
/// Propagates oracle errors.
pub fn uncovered<O: SatOracle>(
    sample: &Sample,
    oracle: &mut O,
    variables: &[Variable],
    t: usize,
) -> Result<Vec<Vec<Literal>>> {
    let mut missing = Vec::new();
    for tuple in tuples(variables, t) {
        if sample.covers(&tuple) {
            continue;
        }
        if oracle.is_satisfiable(&tuple)? {
            missing.push(tuple);
        }
    }
    Ok(missing)
}
