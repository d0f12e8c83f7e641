#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Propositional expressions over feature names, used for cross-tree constraints.
//!
//! An [`Expr`] is converted to clauses by first pushing negations down to the
//! variables (negation normal form) and then distributing disjunctions over
//! conjunctions. Constraints in feature models are short, so the exponential
//! worst case of distribution does not matter in practice.

use crate::error::{Error, Result};
use crate::sat::cnf::VariableMap;
use crate::sat::literal::Literal;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expr {
    Var(String),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Implies(Box<Expr>, Box<Expr>),
    Iff(Box<Expr>, Box<Expr>),
    Val(bool),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(e: Self) -> Self {
        Self::Not(Box::new(e))
    }

    #[must_use]
    pub const fn and(es: Vec<Self>) -> Self {
        Self::And(es)
    }

    #[must_use]
    pub const fn or(es: Vec<Self>) -> Self {
        Self::Or(es)
    }

    #[must_use]
    pub fn implies(lhs: Self, rhs: Self) -> Self {
        Self::Implies(Box::new(lhs), Box::new(rhs))
    }

    #[must_use]
    pub fn iff(lhs: Self, rhs: Self) -> Self {
        Self::Iff(Box::new(lhs), Box::new(rhs))
    }

    /// Evaluates the expression with `value` giving the truth value of each feature.
    pub fn eval(&self, value: &impl Fn(&str) -> bool) -> bool {
        match self {
            Self::Var(name) => value(name),
            Self::Not(e) => !e.eval(value),
            Self::And(es) => es.iter().all(|e| e.eval(value)),
            Self::Or(es) => es.iter().any(|e| e.eval(value)),
            Self::Implies(a, b) => !a.eval(value) || b.eval(value),
            Self::Iff(a, b) => a.eval(value) == b.eval(value),
            Self::Val(b) => *b,
        }
    }

    /// Every feature named in the expression, in order of first occurrence.
    #[must_use]
    pub fn contained_features(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(e) = stack.pop() {
            match e {
                Self::Var(name) => {
                    if !out.contains(&name.as_str()) {
                        out.push(name.as_str());
                    }
                }
                Self::Not(inner) => stack.push(inner),
                Self::And(es) | Self::Or(es) => stack.extend(es.iter().rev()),
                Self::Implies(a, b) | Self::Iff(a, b) => {
                    stack.push(b);
                    stack.push(a);
                }
                Self::Val(_) => {}
            }
        }
        out
    }

    /// Every assignment of [`contained_features`](Self::contained_features) under
    /// which the expression is false, as `(feature, value)` pairs.
    ///
    /// The result has at most `2^k` entries for `k` contained features.
    #[must_use]
    pub fn contradicting_assignments(&self) -> Vec<Vec<(&str, bool)>> {
        let features = self.contained_features();
        if features.is_empty() {
            return if self.eval(&|_: &str| false) {
                Vec::new()
            } else {
                vec![Vec::new()]
            };
        }
        (0..features.len())
            .map(|_| [false, true])
            .multi_cartesian_product()
            .filter_map(|values| {
                let holds = self.eval(&|name: &str| {
                    features
                        .iter()
                        .position(|&f| f == name)
                        .is_some_and(|i| values[i])
                });
                (!holds).then(|| features.iter().copied().zip(values).collect_vec())
            })
            .collect()
    }

    /// Converts the expression into clauses over `variables`.
    ///
    /// Tautological clauses are dropped, so a tautology yields no clauses and a
    /// contradiction yields a single empty clause.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedModel`] if the expression names a feature missing from `variables`.
    pub fn to_cnf(&self, variables: &VariableMap) -> Result<Vec<Vec<Literal>>> {
        let clauses = distribute(&Nnf::from_expr(self, true));
        let mut out = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let mut lits: Vec<Literal> = Vec::with_capacity(clause.len());
            for (name, polarity) in clause {
                let var = variables.get(name).ok_or_else(|| {
                    Error::MalformedModel(format!("constraint references unknown feature `{name}`"))
                })?;
                let lit = Literal::new(var, polarity);
                if !lits.contains(&lit) {
                    lits.push(lit);
                }
            }
            if lits.iter().any(|l| lits.contains(&l.negated())) {
                continue;
            }
            if !out.contains(&lits) {
                out.push(lits);
            }
        }
        Ok(out)
    }

    /// If the expression is a plain implication between two literals, returns them.
    ///
    /// `A => B`, `!A => B`, `A => !B` and the equivalent two-literal disjunctions
    /// such as `!A | B` are recognised.
    #[must_use]
    pub fn as_literal_implication(&self) -> Option<((&str, bool), (&str, bool))> {
        match self {
            Self::Implies(a, b) => Some((a.as_literal()?, b.as_literal()?)),
            Self::Or(es) if es.len() == 2 => {
                let (name, polarity) = es[0].as_literal()?;
                Some(((name, !polarity), es[1].as_literal()?))
            }
            _ => None,
        }
    }

    fn as_literal(&self) -> Option<(&str, bool)> {
        match self {
            Self::Var(name) => Some((name, true)),
            Self::Not(inner) => match inner.as_ref() {
                Self::Var(name) => Some((name, false)),
                Self::Not(e) => e.as_literal(),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Self::var(name)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, es: &[Expr], op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, e) in es.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{e}")?;
            }
            write!(f, ")")
        }

        match self {
            Self::Var(name) => write!(f, "{name}"),
            Self::Not(e) => write!(f, "!{e}"),
            Self::And(es) => join(f, es, "&"),
            Self::Or(es) => join(f, es, "|"),
            Self::Implies(a, b) => write!(f, "({a} => {b})"),
            Self::Iff(a, b) => write!(f, "({a} <=> {b})"),
            Self::Val(b) => write!(f, "{b}"),
        }
    }
}

/// Negation normal form: negation only on variables, no implications.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Nnf<'a> {
    Lit(&'a str, bool),
    And(Vec<Nnf<'a>>),
    Or(Vec<Nnf<'a>>),
    Const(bool),
}

impl<'a> Nnf<'a> {
    fn from_expr(e: &'a Expr, positive: bool) -> Self {
        match e {
            Expr::Var(name) => Self::Lit(name, positive),
            Expr::Not(inner) => Self::from_expr(inner, !positive),
            Expr::Val(b) => Self::Const(*b == positive),
            Expr::And(es) => {
                let parts = es.iter().map(|e| Self::from_expr(e, positive)).collect();
                if positive { Self::And(parts) } else { Self::Or(parts) }
            }
            Expr::Or(es) => {
                let parts = es.iter().map(|e| Self::from_expr(e, positive)).collect();
                if positive { Self::Or(parts) } else { Self::And(parts) }
            }
            Expr::Implies(a, b) => {
                let parts = vec![Self::from_expr(a, !positive), Self::from_expr(b, positive)];
                if positive { Self::Or(parts) } else { Self::And(parts) }
            }
            Expr::Iff(a, b) => {
                // a <=> b  ==  (!a | b) & (a | !b)
                // !(a <=> b)  ==  (a | b) & (!a | !b)
                let (l1, r1, l2, r2) = if positive {
                    (false, true, true, false)
                } else {
                    (true, true, false, false)
                };
                Self::And(vec![
                    Self::Or(vec![Self::from_expr(a, l1), Self::from_expr(b, r1)]),
                    Self::Or(vec![Self::from_expr(a, l2), Self::from_expr(b, r2)]),
                ])
            }
        }
    }
}

type RawClause<'a> = Vec<(&'a str, bool)>;

fn distribute<'a>(nnf: &Nnf<'a>) -> Vec<RawClause<'a>> {
    match nnf {
        Nnf::Lit(name, polarity) => vec![vec![(*name, *polarity)]],
        Nnf::Const(true) => Vec::new(),
        Nnf::Const(false) => vec![Vec::new()],
        Nnf::And(parts) => parts.iter().flat_map(distribute).collect(),
        Nnf::Or(parts) => parts.iter().fold(vec![Vec::new()], |acc, part| {
            let rhs = distribute(part);
            acc.iter()
                .cartesian_product(rhs.iter())
                .map(|(l, r)| l.iter().chain(r.iter()).copied().collect())
                .collect()
        }),
    }
}
