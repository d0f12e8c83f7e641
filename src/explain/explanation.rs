#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
use crate::explain::creator::Explainable;
use crate::sat::clause::Provenance;
use crate::sat::cnf::VariableMap;
use crate::sat::literal::Literal;
use rustc_hash::FxHashSet;
use std::fmt;
use std::fmt::Write as _;

/// One step of an explanation: `clause` forced `forced` because every other
/// literal of the clause was already false.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reason {
    pub clause: usize,
    pub provenance: Provenance,
    pub literals: Vec<Literal>,
    pub forced: Literal,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clause {} (", self.clause)?;
        for (i, lit) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{lit}")?;
        }
        write!(f, ") [{}] forces {}", self.provenance, self.forced)
    }
}

/// Why a set of premises contradicts a CNF.
///
/// Reasons are ordered as they were derived. The last reason forces a literal
/// whose complement is a premise or was forced by an earlier reason, so replaying
/// the reasons from the premises reproduces the contradiction. Premises that
/// contradict each other directly give an explanation without reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    subject: Option<Explainable>,
    reasons: Vec<Reason>,
    premises: Vec<Literal>,
    explanation_count: usize,
    chosen: usize,
}

impl Explanation {
    pub(crate) const fn new(reasons: Vec<Reason>, premises: Vec<Literal>) -> Self {
        Self {
            subject: None,
            reasons,
            premises,
            explanation_count: 1,
            chosen: 0,
        }
    }

    pub(crate) const fn with_counts(
        mut self,
        subject: Explainable,
        explanation_count: usize,
        chosen: usize,
    ) -> Self {
        self.subject = Some(subject);
        self.explanation_count = explanation_count;
        self.chosen = chosen;
        self
    }

    /// Rewrites clause indices of an explanation computed on a sub-CNF, where
    /// clause `i` of the sub-CNF is clause `map[i]` of the full one.
    pub(crate) fn remap_clauses(mut self, map: &[usize]) -> Self {
        for reason in &mut self.reasons {
            reason.clause = map[reason.clause];
        }
        self
    }

    /// The defect being explained. `None` for a bare LTMS explanation.
    #[must_use]
    pub const fn subject(&self) -> Option<&Explainable> {
        self.subject.as_ref()
    }

    #[must_use]
    pub fn reasons(&self) -> &[Reason] {
        &self.reasons
    }

    #[must_use]
    pub fn reason_count(&self) -> usize {
        self.reasons.len()
    }

    /// The premises the reasons start from.
    #[must_use]
    pub fn premises(&self) -> &[Literal] {
        &self.premises
    }

    /// Number of candidate explanations generated for the subject.
    #[must_use]
    pub const fn explanation_count(&self) -> usize {
        self.explanation_count
    }

    /// Position of this explanation among the generated candidates.
    #[must_use]
    pub const fn chosen(&self) -> usize {
        self.chosen
    }

    /// Clause indices used, in reason order.
    pub fn clauses(&self) -> impl Iterator<Item = usize> + '_ {
        self.reasons.iter().map(|r| r.clause)
    }

    /// Replays the reasons from the premises and checks that every reason fires
    /// and that the last one produces a complementary pair.
    #[must_use]
    pub fn replay(&self) -> bool {
        let mut known: FxHashSet<Literal> = self.premises.iter().copied().collect();
        if self.reasons.is_empty() {
            return self.premises.iter().any(|l| known.contains(&l.negated()));
        }
        let last = self.reasons.len() - 1;
        for (i, reason) in self.reasons.iter().enumerate() {
            let fires = reason
                .literals
                .iter()
                .filter(|&&l| l != reason.forced)
                .all(|l| known.contains(&l.negated()));
            if !fires || !reason.literals.contains(&reason.forced) {
                return false;
            }
            if known.contains(&reason.forced.negated()) {
                return i == last;
            }
            known.insert(reason.forced);
        }
        false
    }

    /// Multi-line description with feature names.
    #[must_use]
    pub fn describe(&self, variables: &VariableMap) -> String {
        let mut out = String::new();
        let premises: Vec<String> = self
            .premises
            .iter()
            .map(|&l| variables.literal_name(l))
            .collect();
        let _ = writeln!(out, "assuming {}:", premises.join(", "));
        for (i, reason) in self.reasons.iter().enumerate() {
            let clause: Vec<String> = reason
                .literals
                .iter()
                .map(|&l| variables.literal_name(l))
                .collect();
            let _ = writeln!(
                out,
                "  {}. {} [{}] forces {}",
                i + 1,
                clause.join(" | "),
                reason.provenance,
                variables.literal_name(reason.forced)
            );
        }
        out
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "explanation {} of {} ({} reasons)",
            self.chosen + 1,
            self.explanation_count,
            self.reasons.len()
        )?;
        for reason in &self.reasons {
            writeln!(f, "  {reason}")?;
        }
        Ok(())
    }
}
