#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Explanations for defects of a feature model.
//!
//! Every defect kind only decides which premise sets to try and on which clause
//! set; the LTMS does the rest. Among the premise sets that lead to a
//! contradiction the explanation with the fewest reasons is returned. This is the
//! shortest among the candidates, not necessarily the shortest possible one;
//! [`ExplanationConfig::reduce`] enables a clause-dropping pass that shortens it
//! further.

use crate::config::ExplanationConfig;
use crate::error::{Error, Result};
use crate::explain::explanation::Explanation;
use crate::explain::ltms::{Ltms, LtmsState};
use crate::sat::clause::Provenance;
use crate::sat::cnf::Cnf;
use crate::sat::expr::Expr;
use crate::sat::literal::{Literal, Variable};
use std::fmt;

/// A fact about a model that can be explained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Explainable {
    /// The feature can never be selected.
    DeadFeature(Variable),
    /// The feature is declared optional but is selected whenever its parent is.
    FalseOptional { feature: Variable, parent: Variable },
    /// The constraint at this index is implied by the rest of the model.
    RedundantConstraint(usize),
}

impl fmt::Display for Explainable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadFeature(v) => write!(f, "dead feature {v}"),
            Self::FalseOptional { feature, parent } => {
                write!(f, "false-optional feature {feature} (parent {parent})")
            }
            Self::RedundantConstraint(i) => write!(f, "redundant constraint #{i}"),
        }
    }
}

/// Generates explanations for one subject at a time.
#[derive(Debug, Clone)]
pub struct ExplanationCreator<'a> {
    cnf: &'a Cnf,
    constraints: &'a [Expr],
    subject: Option<Explainable>,
    config: ExplanationConfig,
}

impl<'a> ExplanationCreator<'a> {
    /// A creator over `cnf`, whose `Constraint { index }` clauses encode `constraints[index]`.
    #[must_use]
    pub const fn new(cnf: &'a Cnf, constraints: &'a [Expr], config: ExplanationConfig) -> Self {
        Self {
            cnf,
            constraints,
            subject: None,
            config,
        }
    }

    pub fn set_subject(&mut self, subject: Explainable) {
        self.subject = Some(subject);
    }

    #[must_use]
    pub const fn with_subject(mut self, subject: Explainable) -> Self {
        self.subject = Some(subject);
        self
    }

    #[must_use]
    pub const fn subject(&self) -> Option<Explainable> {
        self.subject
    }

    /// The shortest explanation of the subject, or `None` if no premise set
    /// contradicts the model (the subject is not actually a defect).
    ///
    /// # Errors
    ///
    /// - [`Error::PreconditionViolation`] if no subject is set or the subject
    ///   refers to a constraint or variable the model does not have.
    /// - [`Error::MalformedModel`] if a constraint names a feature without a variable.
    /// - [`Error::Unsupported`] if a constraint has more contradicting assignments
    ///   than [`ExplanationConfig::max_contradicting_assignments`].
    pub fn explanation(&self) -> Result<Option<Explanation>> {
        let subject = self
            .subject
            .ok_or(Error::PreconditionViolation("no subject to explain"))?;

        let (kept, premise_sets) = self.premise_sets(subject)?;
        let owned;
        let (cnf, map): (&Cnf, Option<&[usize]>) = match &kept {
            Some(kept) => {
                owned = self.cnf.subset(kept.iter().copied());
                (&owned, Some(kept.as_slice()))
            }
            None => (self.cnf, None),
        };

        let mut ltms = Ltms::new(cnf);
        let mut candidates: Vec<Explanation> = Vec::new();
        for premises in &premise_sets {
            if ltms.set_premises(premises) != LtmsState::Contradiction {
                continue;
            }
            if let Some(explanation) = ltms.explanation() {
                candidates.push(match map {
                    Some(map) => explanation.remap_clauses(map),
                    None => explanation,
                });
            }
        }

        let count = candidates.len();
        let Some((chosen, best)) = candidates
            .into_iter()
            .enumerate()
            .min_by_key(|(i, e)| (e.reason_count(), *i))
        else {
            log::debug!("{subject}: none of {} premise sets contradicts", premise_sets.len());
            return Ok(None);
        };

        let best = if self.config.reduce {
            reduce(self.cnf, best)
        } else {
            best
        };
        log::debug!(
            "{subject}: {} reasons, candidate {} of {count}",
            best.reason_count(),
            chosen + 1
        );
        Ok(Some(best.with_counts(subject, count, chosen)))
    }

    /// Clause indices to keep (`None` for all) and the premise sets to try.
    fn premise_sets(&self, subject: Explainable) -> Result<(Option<Vec<usize>>, Vec<Vec<Literal>>)> {
        let check = |var: Variable| {
            if var == 0 || var as usize > self.cnf.num_vars() {
                Err(Error::PreconditionViolation("subject names an unknown variable"))
            } else {
                Ok(var)
            }
        };

        match subject {
            Explainable::DeadFeature(f) => Ok((None, vec![vec![Literal::positive(check(f)?)]])),
            Explainable::FalseOptional { feature, parent } => Ok((
                None,
                vec![vec![
                    Literal::positive(check(parent)?),
                    Literal::negative(check(feature)?),
                ]],
            )),
            Explainable::RedundantConstraint(index) => {
                let constraint = self
                    .constraints
                    .get(index)
                    .ok_or(Error::PreconditionViolation("subject names an unknown constraint"))?;
                let assignments = constraint.contradicting_assignments();
                if assignments.len() > self.config.max_contradicting_assignments {
                    return Err(Error::Unsupported(
                        "constraint has too many contradicting assignments to explain",
                    ));
                }

                let variables = self.cnf.variables();
                let mut sets = Vec::with_capacity(assignments.len());
                for assignment in assignments {
                    let mut premises = Vec::with_capacity(assignment.len());
                    for (name, value) in assignment {
                        let var = variables.get(name).ok_or_else(|| {
                            Error::MalformedModel(format!("feature `{name}` has no variable"))
                        })?;
                        premises.push(Literal::new(var, value));
                    }
                    sets.push(premises);
                }

                let tag = Provenance::Constraint { index };
                let kept = (0..self.cnf.clause_count())
                    .filter(|&i| self.cnf[i].provenance != tag)
                    .collect();
                Ok((Some(kept), sets))
            }
        }
    }
}

/// Drops reason clauses one at a time while the remaining ones still contradict
/// the premises, until no single clause can be dropped.
fn reduce(cnf: &Cnf, mut best: Explanation) -> Explanation {
    loop {
        let clauses: Vec<usize> = best.clauses().collect();
        let mut improved = false;

        for skip in 0..clauses.len() {
            let keep: Vec<usize> = clauses
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != skip)
                .map(|(_, &c)| c)
                .collect();
            let sub = cnf.subset(keep.iter().copied());
            let mut ltms = Ltms::new(&sub);
            if ltms.set_premises(best.premises()) != LtmsState::Contradiction {
                continue;
            }
            if let Some(shorter) = ltms.explanation() {
                if shorter.reason_count() < best.reason_count() {
                    best = shorter.remap_clauses(&keep);
                    improved = true;
                    break;
                }
            }
        }

        if !improved {
            return best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::feature::{FeatureModel, FeatureRecord, GroupType};
    use test_log::test;

    fn model() -> (FeatureModel, Cnf) {
        // Root -> A (optional), B (optional); A => B, B => !A makes A dead.
        // The extra constraint A => Root is redundant.
        let model = FeatureModel::from_records(
            vec![
                FeatureRecord::root("Root"),
                FeatureRecord::child("A", "Root"),
                FeatureRecord::child("B", "Root"),
            ],
            vec![
                Expr::implies("A".into(), "B".into()),
                Expr::implies("B".into(), Expr::not("A".into())),
                Expr::implies("A".into(), "Root".into()),
            ],
        )
        .unwrap();
        let cnf = model.to_cnf().unwrap();
        (model, cnf)
    }

    #[test]
    fn test_missing_subject() {
        let (model, cnf) = model();
        let creator = ExplanationCreator::new(&cnf, model.constraints(), ExplanationConfig::default());
        assert!(matches!(
            creator.explanation(),
            Err(Error::PreconditionViolation(_))
        ));
    }

    #[test]
    fn test_dead_feature() {
        let (model, cnf) = model();
        let a = cnf.variables().get("A").unwrap();
        let creator = ExplanationCreator::new(&cnf, model.constraints(), ExplanationConfig::default())
            .with_subject(Explainable::DeadFeature(a));
        let explanation = creator.explanation().unwrap().unwrap();

        assert_eq!(explanation.subject(), Some(&Explainable::DeadFeature(a)));
        assert_eq!(explanation.explanation_count(), 1);
        assert_eq!(explanation.chosen(), 0);
        assert!(explanation.replay());
        let provenances: Vec<Provenance> = explanation.reasons().iter().map(|r| r.provenance).collect();
        assert!(provenances.contains(&Provenance::Constraint { index: 0 }));
        assert!(provenances.contains(&Provenance::Constraint { index: 1 }));
    }

    #[test]
    fn test_live_feature_is_not_a_defect() {
        let (model, cnf) = model();
        let b = cnf.variables().get("B").unwrap();
        let creator = ExplanationCreator::new(&cnf, model.constraints(), ExplanationConfig::default())
            .with_subject(Explainable::DeadFeature(b));
        assert!(creator.explanation().unwrap().is_none());
    }

    #[test]
    fn test_redundant_constraint() {
        let (model, cnf) = model();
        let mut creator = ExplanationCreator::new(&cnf, model.constraints(), ExplanationConfig::default());
        creator.set_subject(Explainable::RedundantConstraint(2));
        let explanation = creator.explanation().unwrap().unwrap();

        // A selected with Root deselected violates the root clause.
        assert!(explanation.replay());
        assert_eq!(explanation.reason_count(), 1);
        assert!(explanation.reasons()[0].provenance.is_structural());
        assert!(explanation
            .reasons()
            .iter()
            .all(|r| r.provenance != Provenance::Constraint { index: 2 }));
    }

    #[test]
    fn test_unknown_constraint() {
        let (model, cnf) = model();
        let creator = ExplanationCreator::new(&cnf, model.constraints(), ExplanationConfig::default())
            .with_subject(Explainable::RedundantConstraint(7));
        assert!(matches!(
            creator.explanation(),
            Err(Error::PreconditionViolation(_))
        ));
    }

    #[test]
    fn test_false_optional() {
        let model = FeatureModel::from_records(
            vec![
                FeatureRecord::root("Root").group(GroupType::And),
                FeatureRecord::child("A", "Root"),
                FeatureRecord::child("B", "Root").mandatory(),
            ],
            vec![Expr::implies("B".into(), "A".into())],
        )
        .unwrap();
        let cnf = model.to_cnf().unwrap();
        let vars = cnf.variables();
        let subject = Explainable::FalseOptional {
            feature: vars.get("A").unwrap(),
            parent: vars.get("Root").unwrap(),
        };
        let explanation = ExplanationCreator::new(&cnf, model.constraints(), ExplanationConfig::default())
            .with_subject(subject)
            .explanation()
            .unwrap()
            .unwrap();
        assert!(explanation.replay());
        assert_eq!(explanation.premises().len(), 2);
    }

    #[test]
    fn test_shortest_candidate_is_chosen() {
        // A and B are both core, so A <=> B is redundant. Refuting A & !B takes a
        // detour through C, refuting !A & B does not.
        let model = FeatureModel::from_records(
            vec![
                FeatureRecord::root("R"),
                FeatureRecord::child("A", "R").mandatory(),
                FeatureRecord::child("C", "R").mandatory(),
                FeatureRecord::child("B", "C").mandatory(),
            ],
            vec![Expr::iff("A".into(), "B".into())],
        )
        .unwrap();
        let cnf = model.to_cnf().unwrap();
        let explanation = ExplanationCreator::new(&cnf, model.constraints(), ExplanationConfig::default())
            .with_subject(Explainable::RedundantConstraint(0))
            .explanation()
            .unwrap()
            .unwrap();
        assert_eq!(explanation.explanation_count(), 2);
        assert_eq!(explanation.reason_count(), 2);
        assert!(explanation.replay());
    }

    #[test]
    fn test_partially_implied_constraint() {
        // C is only core when B is selected, so A <=> C is not implied.
        let model = FeatureModel::from_records(
            vec![
                FeatureRecord::root("R"),
                FeatureRecord::child("A", "R").mandatory(),
                FeatureRecord::child("B", "R"),
                FeatureRecord::child("C", "B").mandatory(),
            ],
            vec![Expr::iff("A".into(), "C".into())],
        )
        .unwrap();
        let cnf = model.to_cnf().unwrap();
        let explanation = ExplanationCreator::new(&cnf, model.constraints(), ExplanationConfig::default())
            .with_subject(Explainable::RedundantConstraint(0))
            .explanation()
            .unwrap()
            .unwrap();
        // Only !A & C is refuted by the tree.
        assert_eq!(explanation.explanation_count(), 1);
        assert!(explanation.replay());
    }

    #[test]
    fn test_reduce_keeps_soundness() {
        let (model, cnf) = model();
        let a = cnf.variables().get("A").unwrap();
        let config = ExplanationConfig {
            reduce: true,
            ..ExplanationConfig::default()
        };
        let explanation = ExplanationCreator::new(&cnf, model.constraints(), config)
            .with_subject(Explainable::DeadFeature(a))
            .explanation()
            .unwrap()
            .unwrap();
        assert!(explanation.replay());
        assert!(explanation.reason_count() <= 2);
    }
}
