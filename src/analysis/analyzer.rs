#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Feature and constraint anomalies of a feature model.
//!
//! Core and dead features are first read off root-level unit propagation. The
//! remaining variables are decided with the oracle, guided by witnesses: a
//! variable already seen with both values in some model needs no query, and
//! every satisfiable query contributes its model to that record.

use crate::analysis::report::{AnalysisReport, ConstraintAnomaly, ConstraintReport};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::explain::{Explainable, Explanation, ExplanationCreator};
use crate::graph::DependencyGraph;
use crate::model::{FeatureId, FeatureModel};
use crate::monitor::Monitor;
use crate::sat::clause::Provenance;
use crate::sat::cnf::Cnf;
use crate::sat::dpll::DpllOracle;
use crate::sat::literal::{Literal, Variable};
use crate::sat::slice::slice;
use crate::sat::solver::SatOracle;
use bit_vec::BitVec;

pub struct ModelAnalyzer<'m, O> {
    model: &'m FeatureModel,
    cnf: Cnf,
    oracle: O,
    /// Variable of each feature, indexed by `FeatureId`.
    vars: Vec<Variable>,
    config: AnalysisConfig,
}

impl<'m> ModelAnalyzer<'m, DpllOracle> {
    /// An analyser using the built-in oracle.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedModel`](crate::error::Error::MalformedModel) if the model cannot be encoded.
    pub fn new(model: &'m FeatureModel, config: AnalysisConfig) -> Result<Self> {
        let cnf = model.to_cnf()?;
        let oracle = DpllOracle::with_config(cnf, config.budget, config.phase);
        Ok(Self::with_oracle(model, oracle, config))
    }
}

impl<'m, O: SatOracle> ModelAnalyzer<'m, O> {
    /// An analyser over `oracle`, whose CNF must be the encoding of `model`.
    pub fn with_oracle(model: &'m FeatureModel, oracle: O, config: AnalysisConfig) -> Self {
        let cnf = oracle.cnf().clone();
        let vars = (0..model.len())
            .map(|i| {
                cnf.variables()
                    .get(model.name(FeatureId(i)))
                    .unwrap_or_default()
            })
            .collect();
        Self {
            model,
            cnf,
            oracle,
            vars,
            config,
        }
    }

    #[must_use]
    pub const fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    #[must_use]
    pub const fn model(&self) -> &'m FeatureModel {
        self.model
    }

    pub const fn oracle(&mut self) -> &mut O {
        &mut self.oracle
    }

    #[must_use]
    pub fn variable(&self, id: FeatureId) -> Variable {
        self.vars[id.0]
    }

    /// Whether the model has no valid configuration.
    ///
    /// # Errors
    ///
    /// Propagates oracle errors.
    pub fn is_void(&mut self) -> Result<bool> {
        Ok(!self.oracle.is_satisfiable(&[])?)
    }

    /// Core and dead features, each in feature order. In a void model every
    /// feature is dead and none is core.
    ///
    /// # Errors
    ///
    /// Propagates oracle errors and cancellation.
    pub fn core_and_dead(&mut self, monitor: &dyn Monitor) -> Result<(Vec<FeatureId>, Vec<FeatureId>)> {
        let Some(value) = decide_variables(&mut self.oracle, monitor)? else {
            return Ok((Vec::new(), self.all_features()));
        };
        let mut core = Vec::new();
        let mut dead = Vec::new();
        for (i, &var) in self.vars.iter().enumerate() {
            match value[var as usize] {
                Some(true) => core.push(FeatureId(i)),
                Some(false) => dead.push(FeatureId(i)),
                None => {}
            }
        }
        log::info!("{} core, {} dead features", core.len(), dead.len());
        Ok((core, dead))
    }

    /// Optional features that are selected whenever their parent is. Dead
    /// features and features with a dead parent are not reported.
    ///
    /// # Errors
    ///
    /// Propagates oracle errors and cancellation.
    pub fn false_optional(&mut self, dead: &[FeatureId], monitor: &dyn Monitor) -> Result<Vec<FeatureId>> {
        let mut found = Vec::new();
        for (id, _) in self.model.iter() {
            if !self.model.is_optional(id) || dead.contains(&id) {
                continue;
            }
            let Some(parent) = self.model.parent(id) else {
                continue;
            };
            if dead.contains(&parent) {
                continue;
            }
            let premises = [
                Literal::positive(self.variable(parent)),
                Literal::negative(self.variable(id)),
            ];
            let satisfiable = self.oracle.is_satisfiable(&premises)?;
            monitor.checkpoint()?;
            monitor.worked(1);
            if !satisfiable {
                found.push(id);
            }
        }
        Ok(found)
    }

    /// The anomaly of constraint `index`, if it has one. `dead` are the dead
    /// features of the full model and `void` whether it is void.
    ///
    /// # Errors
    ///
    /// Propagates oracle and explanation errors.
    pub fn constraint_anomaly(
        &mut self,
        index: usize,
        dead: &[FeatureId],
        void: bool,
    ) -> Result<Option<ConstraintReport>> {
        let constraint = &self.model.constraints()[index];
        let assignments = constraint.contradicting_assignments();
        if assignments.is_empty() {
            return Ok(Some(ConstraintReport {
                index,
                anomaly: ConstraintAnomaly::Tautology,
                explanation: None,
            }));
        }

        let mut without = self
            .oracle
            .fork(self.cnf.without_provenance(&Provenance::Constraint { index }));

        if void {
            if !without.is_satisfiable(&[])? {
                return Ok(None);
            }
            let root = Explainable::DeadFeature(self.variable(self.model.root()));
            return Ok(Some(ConstraintReport {
                index,
                anomaly: ConstraintAnomaly::Unsatisfiable,
                explanation: self.explain(root)?,
            }));
        }

        let mut caused = Vec::new();
        for &id in dead {
            if without.is_satisfiable(&[Literal::positive(self.variable(id))])? {
                caused.push(id);
            }
        }
        if !caused.is_empty() {
            return Ok(Some(ConstraintReport {
                index,
                anomaly: ConstraintAnomaly::DeadMaking(caused),
                explanation: None,
            }));
        }

        if assignments.len() > self.config.explanation.max_contradicting_assignments {
            log::warn!("constraint #{index} has too many contradicting assignments to check");
            return Ok(None);
        }
        let variables = self.cnf.variables();
        for assignment in &assignments {
            let premises: Vec<Literal> = assignment
                .iter()
                .filter_map(|&(name, value)| variables.get(name).map(|v| Literal::new(v, value)))
                .collect();
            if without.is_satisfiable(&premises)? {
                return Ok(None);
            }
        }
        Ok(Some(ConstraintReport {
            index,
            anomaly: ConstraintAnomaly::Redundant,
            explanation: self.explain(Explainable::RedundantConstraint(index))?,
        }))
    }

    /// An explanation of `subject` over the model's CNF.
    ///
    /// # Errors
    ///
    /// See [`ExplanationCreator::explanation`].
    pub fn explain(&self, subject: Explainable) -> Result<Option<Explanation>> {
        ExplanationCreator::new(&self.cnf, self.model.constraints(), self.config.explanation)
            .with_subject(subject)
            .explanation()
    }

    /// The dependency graph over the non-core features, with its closure computed.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`](crate::error::Error::Cancelled) only.
    pub fn dependency_graph(&self, core: &[FeatureId], monitor: &dyn Monitor) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::from_model(self.model, core);
        graph.propagate_all(monitor)?;
        Ok(graph)
    }

    /// The model's CNF projected onto `keep`.
    ///
    /// Core and dead features go first since they only occur in unit-derived
    /// clauses. The rest follow the dependency graph's
    /// [`elimination_order`](DependencyGraph::elimination_order), so loosely
    /// connected features are resolved away before hubs.
    ///
    /// # Errors
    ///
    /// Propagates oracle errors and cancellation.
    pub fn slice(&mut self, keep: &[FeatureId], monitor: &dyn Monitor) -> Result<Cnf> {
        let (core, dead) = self.core_and_dead(monitor)?;
        let graph = self.dependency_graph(&core, monitor)?;
        let variables = self.cnf.variables();
        let order: Vec<Variable> = core
            .iter()
            .chain(&dead)
            .map(|&id| self.variable(id))
            .chain(
                graph
                    .elimination_order()
                    .into_iter()
                    .filter_map(|node| variables.get(graph.name(node))),
            )
            .collect();
        let keep: Vec<Variable> = keep.iter().map(|&id| self.variable(id)).collect();
        log::info!(
            "slicing {} features down to {}",
            self.model.len(),
            keep.len()
        );
        slice(&self.cnf, &keep, &order, monitor)
    }

    /// Runs every analysis.
    ///
    /// # Errors
    ///
    /// Propagates oracle and explanation errors and cancellation.
    pub fn analyze(&mut self, monitor: &dyn Monitor) -> Result<AnalysisReport> {
        let void = self.is_void()?;
        let (core, dead) = self.core_and_dead(monitor)?;
        let false_optional = if void {
            Vec::new()
        } else {
            self.false_optional(&dead, monitor)?
        };

        let mut constraints = Vec::new();
        for index in 0..self.model.constraints().len() {
            if let Some(report) = self.constraint_anomaly(index, &dead, void)? {
                constraints.push(report);
            }
            monitor.checkpoint()?;
            monitor.worked(1);
        }

        let mut explanations = Vec::new();
        if !void {
            for &id in &dead {
                explanations.extend(self.explain(Explainable::DeadFeature(self.variable(id)))?);
            }
            for &id in &false_optional {
                let Some(parent) = self.model.parent(id) else {
                    continue;
                };
                let subject = Explainable::FalseOptional {
                    feature: self.variable(id),
                    parent: self.variable(parent),
                };
                explanations.extend(self.explain(subject)?);
            }
        }

        log::info!(
            "analysis done: void={void}, {} constraint anomalies, {} explanations",
            constraints.len(),
            explanations.len()
        );
        Ok(AnalysisReport {
            void,
            core,
            dead,
            false_optional,
            constraints,
            explanations,
            stats: self.oracle.stats(),
        })
    }

    fn all_features(&self) -> Vec<FeatureId> {
        (0..self.model.len()).map(FeatureId).collect()
    }
}

/// Core and dead variables of the oracle's CNF, in variable order, or `None` if
/// the CNF is unsatisfiable.
///
/// # Errors
///
/// Propagates oracle errors and cancellation.
pub fn core_and_dead_variables<O: SatOracle>(
    oracle: &mut O,
    monitor: &dyn Monitor,
) -> Result<Option<(Vec<Variable>, Vec<Variable>)>> {
    let Some(value) = decide_variables(oracle, monitor)? else {
        return Ok(None);
    };
    let (mut core, mut dead) = (Vec::new(), Vec::new());
    for (var, v) in value.iter().enumerate().skip(1) {
        let var = Variable::try_from(var).unwrap_or_default();
        match v {
            Some(true) => core.push(var),
            Some(false) => dead.push(var),
            None => {}
        }
    }
    Ok(Some((core, dead)))
}

/// The value every model gives each variable, indexed by variable, or `None`
/// for a void CNF.
fn decide_variables<O: SatOracle>(oracle: &mut O, monitor: &dyn Monitor) -> Result<Option<Vec<Option<bool>>>> {
    let n = oracle.cnf().num_vars();
    let mut value: Vec<Option<bool>> = vec![None; n + 1];

    let Some(root) = oracle.cnf().unit_propagate(&[]) else {
        return Ok(None);
    };
    for lit in root {
        value[lit.variable() as usize] = Some(lit.polarity());
    }
    let decided = value.iter().filter(|v| v.is_some()).count();
    log::debug!("unit propagation decides {decided} of {n} variables");

    let Some(witness) = oracle.find_solution(&[])? else {
        return Ok(None);
    };
    let mut seen_true = BitVec::from_elem(n + 1, false);
    let mut seen_false = BitVec::from_elem(n + 1, false);
    record(&witness, &mut seen_true, &mut seen_false);

    for var in 1..=n {
        if value[var].is_some() || (seen_true[var] && seen_false[var]) {
            continue;
        }
        // Ask for the value not seen yet.
        let query = Literal::new(Variable::try_from(var).unwrap_or_default(), !seen_true[var]);
        let found = oracle.find_solution(&[query])?;
        monitor.checkpoint()?;
        monitor.worked(1);
        match found {
            Some(model) => record(&model, &mut seen_true, &mut seen_false),
            None => value[var] = Some(!query.polarity()),
        }
    }
    Ok(Some(value))
}

fn record(model: &[Literal], seen_true: &mut BitVec, seen_false: &mut BitVec) {
    for lit in model {
        let var = lit.variable() as usize;
        if lit.polarity() {
            seen_true.set(var, true);
        } else {
            seen_false.set(var, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureRecord, GroupType};
    use crate::monitor::NullMonitor;
    use crate::sat::expr::Expr;
    use test_log::test;

    fn ids(model: &FeatureModel, names: &[&str]) -> Vec<FeatureId> {
        names.iter().filter_map(|n| model.get(n)).collect()
    }

    fn analyze(model: &FeatureModel) -> AnalysisReport {
        ModelAnalyzer::new(model, AnalysisConfig::default())
            .unwrap()
            .analyze(&NullMonitor)
            .unwrap()
    }

    #[test]
    fn test_or_group_with_exclusion() {
        let model = FeatureModel::from_records(
            vec![
                FeatureRecord::root("A").group(GroupType::Or),
                FeatureRecord::child("B", "A"),
                FeatureRecord::child("C", "A"),
            ],
            vec![Expr::implies("B".into(), Expr::not("C".into()))],
        )
        .unwrap();
        let report = analyze(&model);
        assert!(!report.void);
        assert_eq!(report.core, ids(&model, &["A"]));
        assert!(report.dead.is_empty());
        assert!(report.false_optional.is_empty());
        assert!(report.constraints.is_empty());
    }

    #[test]
    fn test_dead_and_false_optional() {
        // C requires B, B excludes D, D is mandatory: B and C are dead. E is
        // optional but required by the mandatory D.
        let model = FeatureModel::from_records(
            vec![
                FeatureRecord::root("R"),
                FeatureRecord::child("B", "R"),
                FeatureRecord::child("C", "R"),
                FeatureRecord::child("D", "R").mandatory(),
                FeatureRecord::child("E", "R"),
            ],
            vec![
                Expr::implies("C".into(), "B".into()),
                Expr::implies("B".into(), Expr::not("D".into())),
                Expr::implies("D".into(), "E".into()),
            ],
        )
        .unwrap();
        let report = analyze(&model);
        assert_eq!(report.core, ids(&model, &["R", "D", "E"]));
        assert_eq!(report.dead, ids(&model, &["B", "C"]));
        assert_eq!(report.false_optional, ids(&model, &["E"]));
        assert!(report.explanations.iter().all(Explanation::replay));
        assert!(!report.explanations.is_empty());

        let dead_making: Vec<&ConstraintReport> = report
            .constraints
            .iter()
            .filter(|r| matches!(r.anomaly, ConstraintAnomaly::DeadMaking(_)))
            .collect();
        assert_eq!(dead_making.len(), 2);
        assert_eq!(
            dead_making[1].anomaly,
            ConstraintAnomaly::DeadMaking(ids(&model, &["B", "C"]))
        );
    }

    #[test]
    fn test_redundant_and_tautology() {
        let model = FeatureModel::from_records(
            vec![
                FeatureRecord::root("R"),
                FeatureRecord::child("A", "R"),
                FeatureRecord::child("B", "A"),
            ],
            vec![
                Expr::implies("B".into(), "R".into()),
                Expr::or(vec!["A".into(), Expr::not("A".into())]),
            ],
        )
        .unwrap();
        let report = analyze(&model);
        assert_eq!(report.constraints.len(), 2);
        assert_eq!(report.constraints[0].anomaly, ConstraintAnomaly::Redundant);
        let explanation = report.constraints[0].explanation.as_ref().unwrap();
        assert!(explanation.replay());
        assert_eq!(report.constraints[1].anomaly, ConstraintAnomaly::Tautology);
    }

    #[test]
    fn test_void_model() {
        let model = FeatureModel::from_records(
            vec![FeatureRecord::root("R"), FeatureRecord::child("A", "R").mandatory()],
            vec![Expr::not("A".into())],
        )
        .unwrap();
        let report = analyze(&model);
        assert!(report.void);
        assert!(report.core.is_empty());
        assert_eq!(report.dead.len(), 2);
        assert_eq!(report.constraints.len(), 1);
        assert_eq!(report.constraints[0].anomaly, ConstraintAnomaly::Unsatisfiable);
        assert!(report.constraints[0]
            .explanation
            .as_ref()
            .is_some_and(Explanation::replay));
    }

    #[test]
    fn test_dependency_graph_excludes_core() {
        let model = FeatureModel::from_records(
            vec![
                FeatureRecord::root("R"),
                FeatureRecord::child("A", "R").mandatory(),
                FeatureRecord::child("B", "R"),
            ],
            Vec::new(),
        )
        .unwrap();
        let mut analyzer = ModelAnalyzer::new(&model, AnalysisConfig::default()).unwrap();
        let (core, _) = analyzer.core_and_dead(&NullMonitor).unwrap();
        let graph = analyzer.dependency_graph(&core, &NullMonitor).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.name(0), "B");
    }

    #[test]
    fn test_slice_keeps_group_semantics() {
        let model = FeatureModel::from_records(
            vec![
                FeatureRecord::root("R"),
                FeatureRecord::child("G", "R").mandatory().group(GroupType::Or),
                FeatureRecord::child("B", "G"),
                FeatureRecord::child("C", "G"),
                FeatureRecord::child("D", "R"),
            ],
            vec![Expr::implies("B".into(), Expr::not("C".into()))],
        )
        .unwrap();
        let mut analyzer = ModelAnalyzer::new(&model, AnalysisConfig::default()).unwrap();
        let sliced = analyzer
            .slice(&ids(&model, &["B", "C"]), &NullMonitor)
            .unwrap();
        assert_eq!(sliced.num_vars(), 2);
        let (b, c) = (
            sliced.variables().get("B").unwrap(),
            sliced.variables().get("C").unwrap(),
        );
        let valid = |vb: bool, vc: bool| sliced.verify(&[Literal::new(b, vb), Literal::new(c, vc)]);
        assert!(valid(true, false));
        assert!(valid(false, true));
        assert!(!valid(true, true));
        assert!(!valid(false, false));
    }
}
