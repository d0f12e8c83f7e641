#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Greedy t-wise covering array construction.
//!
//! Candidate tuples are enumerated lazily in lexicographic literal order. Each
//! tuple that is not proven infeasible and not yet covered is first absorbed
//! into an existing configuration if possible, otherwise it seeds a new one:
//!
//! 1. A configuration whose current witness already satisfies the tuple takes it
//!    without an oracle call.
//! 2. Otherwise every compatible configuration is tried in order, asking the
//!    oracle for a model of its fixed literals plus the tuple. A query that times
//!    out only rules out that configuration.
//! 3. Otherwise a new configuration is started from the tuple alone. If this
//!    query times out too, the tuple is counted in
//!    [`SampleMetadata::timed_out`] and stays uncovered.
//!
//! Witness literals are *not* fixed: a configuration only ever fixes the literals
//! of the tuples it absorbed, and a fixed literal is never overwritten. Every
//! variable the oracle decided beyond those stays open for later tuples. Each
//! configuration keeps the last witness the oracle gave for it, a valid
//! completion of its fixed literals, and that witness fills the open variables
//! only when the sample is frozen with [`SamplingConfig::complete`].
//!
//! Tuples are built either from both literals of every sampled variable or from
//! expression groups (see [`TWiseSampler::with_expressions`]).

use crate::config::SamplingConfig;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::monitor::Monitor;
use crate::sampling::coverage::{expression_tuple_count, expression_tuples, tuple_count, tuples};
use crate::sampling::{Configuration, Sample, SampleMetadata, SampleStatus};
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::SatOracle;
use itertools::{Either, Itertools};

/// A configuration under construction.
#[derive(Debug, Clone)]
struct Candidate {
    config: Configuration,
    /// One literal per variable, in variable order.
    witness: Vec<Literal>,
}

impl Candidate {
    fn admits(&self, tuple: &[Literal]) -> bool {
        tuple.iter().all(|&l| self.config.admits(l))
    }

    fn witness_holds(&self, tuple: &[Literal]) -> bool {
        tuple
            .iter()
            .all(|&l| self.witness.get(l.variable() as usize - 1) == Some(&l))
    }

    fn fix(&mut self, tuple: &[Literal]) {
        for &lit in tuple {
            self.config.set(lit);
        }
    }

    fn freeze(mut self, complete: bool) -> Configuration {
        if complete {
            for &lit in &self.witness {
                self.config.set(lit);
            }
        }
        self.config
    }
}

/// Cheap infeasibility checks that need no oracle call.
struct Prefilter<'g> {
    /// Value forced by root-level unit propagation, indexed by variable.
    root: Vec<Option<bool>>,
    graph: Option<&'g DependencyGraph>,
    /// Graph node of each variable, indexed by variable.
    nodes: Vec<Option<usize>>,
}

impl Prefilter<'_> {
    fn rejects(&self, tuple: &[Literal]) -> bool {
        if tuple
            .iter()
            .any(|l| self.root[l.variable() as usize].is_some_and(|v| v != l.polarity()))
        {
            return true;
        }
        // Only expression tuples can contradict themselves.
        if tuple.iter().tuple_combinations().any(|(&a, &b)| a == !b) {
            return true;
        }
        let Some(graph) = self.graph else {
            return false;
        };
        tuple.iter().tuple_combinations().any(|(a, b)| {
            match (self.nodes[a.variable() as usize], self.nodes[b.variable() as usize]) {
                (Some(na), Some(nb)) => {
                    graph.is_pair_infeasible((na, a.polarity()), (nb, b.polarity()))
                }
                _ => false,
            }
        })
    }
}

/// What the tuples are combined from.
#[derive(Debug, Clone)]
enum Elements {
    /// Both literals of each variable.
    Variables(Vec<Variable>),
    /// Conjunctions of literals, combined within their group only.
    Expressions(Vec<Vec<Vec<Literal>>>),
}

impl Elements {
    fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        match self {
            Self::Variables(vars) => Either::Left(vars.iter().copied()),
            Self::Expressions(groups) => Either::Right(
                groups.iter().flatten().flatten().map(|lit| lit.variable()),
            ),
        }
    }

    /// Largest useful `t`.
    fn width(&self) -> usize {
        match self {
            Self::Variables(vars) => vars.len(),
            Self::Expressions(groups) => groups.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    fn tuple_count(&self, t: usize) -> u64 {
        match self {
            Self::Variables(vars) => tuple_count(vars.len(), t),
            Self::Expressions(groups) => expression_tuple_count(groups, t),
        }
    }

    fn tuples(&self, t: usize) -> impl Iterator<Item = Vec<Literal>> + '_ {
        match self {
            Self::Variables(vars) => Either::Left(tuples(vars, t)),
            Self::Expressions(groups) => Either::Right(expression_tuples(groups, t)),
        }
    }

    /// The same elements with every list rotated left by `by`.
    fn rotated(&self, by: usize) -> Self {
        fn rotate<T: Clone>(items: &[T], by: usize) -> Vec<T> {
            let mut items = items.to_vec();
            let len = items.len();
            if len > 0 {
                items.rotate_left(by % len);
            }
            items
        }
        match self {
            Self::Variables(vars) => Self::Variables(rotate(vars, by)),
            Self::Expressions(groups) => {
                Self::Expressions(groups.iter().map(|g| rotate(g, by)).collect())
            }
        }
    }
}

/// Builds samples achieving t-wise coverage over a set of variables.
pub struct TWiseSampler<'g, O> {
    oracle: O,
    config: SamplingConfig,
    graph: Option<&'g DependencyGraph>,
    elements: Option<Elements>,
}

impl<'g, O: SatOracle> TWiseSampler<'g, O> {
    /// A sampler over every variable of the oracle's CNF.
    #[must_use]
    pub const fn new(oracle: O, config: SamplingConfig) -> Self {
        Self {
            oracle,
            config,
            graph: None,
            elements: None,
        }
    }

    /// Uses `graph` to skip tuples its strong edges prove infeasible. Graph nodes
    /// are matched to variables by feature name. Ignored unless
    /// [`SamplingConfig::use_graph_filter`] is set.
    #[must_use]
    pub const fn with_graph(mut self, graph: &'g DependencyGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Restricts the tuples to these variables, e.g. the concrete features.
    #[must_use]
    pub fn with_variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.elements = Some(Elements::Variables(
            variables.into_iter().sorted().dedup().collect(),
        ));
        self
    }

    /// Covers combinations of expressions instead of literals.
    ///
    /// Each expression is a conjunction of literals. A tuple combines `t`
    /// expressions of the same group, and is covered by a configuration that
    /// satisfies all of them. A single variable's literals `[v]` and `[!v]` in
    /// one group reproduce plain t-wise coverage over that group. Replaces any
    /// earlier [`with_variables`](Self::with_variables).
    #[must_use]
    pub fn with_expressions(mut self, groups: impl IntoIterator<Item = Vec<Vec<Literal>>>) -> Self {
        let groups = groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|expr| expr.into_iter().sorted().dedup().collect_vec())
                    .collect_vec()
            })
            .collect();
        self.elements = Some(Elements::Expressions(groups));
        self
    }

    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Generates the sample.
    ///
    /// # Errors
    ///
    /// - [`Error::PreconditionViolation`] if `t` is zero or a requested variable
    ///   is not in the CNF.
    /// - [`Error::Cancelled`] when the monitor requests it.
    /// - Any oracle error. A timeout while placing a tuple is not an error: it is
    ///   counted in the metadata and leaves the tuple uncovered. A timeout of the
    ///   initial satisfiability check is returned.
    pub fn sample(&mut self, monitor: &dyn Monitor) -> Result<Sample> {
        if self.config.t == 0 {
            return Err(Error::PreconditionViolation("t-wise sampling needs t >= 1"));
        }
        let cnf = self.oracle.cnf();
        let num_vars = cnf.num_vars();
        let elements = self
            .elements
            .clone()
            .unwrap_or_else(|| Elements::Variables(cnf.variables().variables().collect()));
        if elements
            .variables()
            .any(|v| v == 0 || v as usize > num_vars)
        {
            return Err(Error::PreconditionViolation(
                "sampling variable outside the CNF",
            ));
        }

        let t = self.config.t.min(elements.width());
        let calls_before = self.oracle.stats().queries;

        if !self.oracle.is_satisfiable(&[])? {
            log::info!("model is void, no configurations to sample");
            let metadata = SampleMetadata {
                t,
                total_tuples: elements.tuple_count(t),
                unsatisfiable: elements.tuple_count(t),
                oracle_calls: self.oracle.stats().queries - calls_before,
                ..SampleMetadata::default()
            };
            return Ok(Sample::new(Vec::new(), metadata));
        }

        let prefilter = self.prefilter();
        let mut best: Option<(Vec<Candidate>, SampleMetadata)> = None;
        let mut oracle_calls = self.oracle.stats().queries - calls_before;

        for iteration in 0..self.config.iterations.max(1) {
            let rotated = elements.rotated(iteration);
            let before = self.oracle.stats().queries;
            let (candidates, metadata) = self.pass(&rotated, t, &prefilter, monitor)?;
            oracle_calls += self.oracle.stats().queries - before;
            log::debug!(
                "pass {}: {} configurations, {metadata}",
                iteration + 1,
                candidates.len()
            );

            let better = best.as_ref().is_none_or(|(kept, kept_meta)| {
                rank(&candidates, &metadata) < rank(kept, kept_meta)
            });
            if better {
                best = Some((candidates, metadata));
            }
        }

        let (candidates, mut metadata) = best.unwrap_or_default();
        metadata.oracle_calls = oracle_calls;
        metadata.iterations = self.config.iterations.max(1);
        log::info!("{} configurations, {metadata}", candidates.len());

        let complete = self.config.complete;
        let configurations = candidates.into_iter().map(|c| c.freeze(complete)).collect();
        Ok(Sample::new(configurations, metadata))
    }

    fn prefilter(&self) -> Prefilter<'g> {
        let cnf = self.oracle.cnf();
        let mut root = vec![None; cnf.num_vars() + 1];
        for lit in cnf.unit_propagate(&[]).unwrap_or_default() {
            root[lit.variable() as usize] = Some(lit.polarity());
        }

        let graph = self.graph.filter(|_| self.config.use_graph_filter);
        let nodes = std::iter::once(None)
            .chain(cnf.variables().variables().map(|var| {
                let graph = graph?;
                graph.node(cnf.variables().name(var)?)
            }))
            .collect();

        Prefilter { root, graph, nodes }
    }

    fn pass(
        &mut self,
        elements: &Elements,
        t: usize,
        prefilter: &Prefilter<'_>,
        monitor: &dyn Monitor,
    ) -> Result<(Vec<Candidate>, SampleMetadata)> {
        let num_vars = self.oracle.cnf().num_vars();
        let mut metadata = SampleMetadata {
            t,
            total_tuples: elements.tuple_count(t),
            ..SampleMetadata::default()
        };
        let mut sample: Vec<Candidate> = Vec::new();

        'tuples: for tuple in elements.tuples(t) {
            monitor.checkpoint()?;
            monitor.worked(1);

            if prefilter.rejects(&tuple) {
                metadata.filtered += 1;
                continue;
            }
            if sample.iter().any(|c| c.config.covers(&tuple)) {
                metadata.covered += 1;
                continue;
            }
            if let Some(candidate) = sample
                .iter_mut()
                .find(|c| c.admits(&tuple) && c.witness_holds(&tuple))
            {
                candidate.fix(&tuple);
                metadata.covered += 1;
                continue;
            }

            for candidate in sample.iter_mut().filter(|c| c.admits(&tuple)) {
                let mut assumptions = candidate.config.literals();
                assumptions.extend_from_slice(&tuple);
                let result = self.oracle.find_solution(&assumptions);
                monitor.checkpoint()?;
                match result {
                    Ok(Some(witness)) => {
                        candidate.witness = witness;
                        candidate.fix(&tuple);
                        metadata.covered += 1;
                        continue 'tuples;
                    }
                    Ok(None) => {}
                    Err(Error::Timeout { .. }) => {
                        log::debug!("extending a configuration with {tuple:?} timed out");
                    }
                    Err(e) => return Err(e),
                }
            }

            let result = self.oracle.find_solution(&tuple);
            monitor.checkpoint()?;
            match result {
                Ok(Some(witness)) => {
                    if self.config.limit.is_some_and(|limit| sample.len() >= limit) {
                        metadata.status = SampleStatus::LimitReached;
                        continue;
                    }
                    sample.push(Candidate {
                        config: Configuration::from_literals(num_vars, &tuple),
                        witness,
                    });
                    metadata.covered += 1;
                }
                Ok(None) => metadata.unsatisfiable += 1,
                Err(Error::Timeout { elapsed }) => {
                    log::warn!("tuple {tuple:?} left uncovered: query timed out after {elapsed:?}");
                    metadata.timed_out += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok((sample, metadata))
    }
}

/// Orders pass results: complete before limited, fewer timeouts, then fewer configurations.
fn rank(candidates: &[Candidate], metadata: &SampleMetadata) -> (bool, u64, usize) {
    (
        metadata.status != SampleStatus::Complete,
        metadata.timed_out,
        candidates.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OracleBudget;
    use crate::model::feature::{FeatureModel, FeatureRecord, GroupType};
    use crate::monitor::{CancellationToken, NullMonitor};
    use crate::sampling::coverage::uncovered;
    use crate::sat::cnf::Cnf;
    use crate::sat::dpll::DpllOracle;
    use crate::sat::expr::Expr;
    use crate::sat::solver::OracleStats;
    use std::time::Duration;
    use test_log::test;

    /// Times out on every query whose assumptions contain all of `stall`.
    struct Stalling {
        inner: DpllOracle,
        stall: Vec<Literal>,
        stalled: usize,
    }

    impl Stalling {
        fn new(cnf: Cnf, stall: &[i32]) -> Self {
            Self {
                inner: DpllOracle::new(cnf),
                stall: lits(stall),
                stalled: 0,
            }
        }
    }

    impl SatOracle for Stalling {
        fn find_solution(&mut self, assumptions: &[Literal]) -> Result<Option<Vec<Literal>>> {
            if self.stall.iter().all(|l| assumptions.contains(l)) {
                self.stalled += 1;
                return Err(Error::Timeout {
                    elapsed: Duration::from_millis(5),
                });
            }
            self.inner.find_solution(assumptions)
        }

        fn cnf(&self) -> &Cnf {
            self.inner.cnf()
        }

        fn stats(&self) -> OracleStats {
            self.inner.stats()
        }

        fn fork(&self, cnf: Cnf) -> Self {
            Self {
                inner: self.inner.fork(cnf),
                stall: self.stall.clone(),
                stalled: 0,
            }
        }
    }

    fn lits(values: &[i32]) -> Vec<Literal> {
        values.iter().copied().map(Literal::from_i32).collect()
    }

    fn or_model() -> Cnf {
        FeatureModel::from_records(
            vec![
                FeatureRecord::root("A").group(GroupType::Or),
                FeatureRecord::child("B", "A"),
                FeatureRecord::child("C", "A"),
            ],
            vec![Expr::implies("B".into(), Expr::not("C".into()))],
        )
        .unwrap()
        .to_cnf()
        .unwrap()
    }

    #[test]
    fn test_or_group_with_exclusion() {
        let cnf = or_model();
        let mut sampler = TWiseSampler::new(DpllOracle::new(cnf.clone()), SamplingConfig::default());
        let sample = sampler.sample(&NullMonitor).unwrap();

        assert_eq!(sample.len(), 2);
        assert!(sample.covers(&lits(&[2])));
        assert!(sample.covers(&lits(&[3])));
        assert!(!sample.covers(&lits(&[2, 3])));
        assert!(sample.iter().all(|c| c.is_complete() && cnf.verify(&c.literals())));

        let metadata = sample.metadata();
        assert_eq!(metadata.total_tuples, 12);
        // Every tuple with !A is refuted by the root unit clause.
        assert_eq!(metadata.filtered, 4);
        // B & C and !B & !C are refuted by the oracle.
        assert_eq!(metadata.unsatisfiable, 2);
        assert_eq!(metadata.covered, 6);
        assert_eq!(metadata.status, SampleStatus::Complete);
        assert!((metadata.coverage_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_pairwise_coverage() {
        let cnf = Cnf::from_dimacs(vec![vec![-1, -2], vec![2, 3, 4], vec![-4, 1]]);
        let mut sampler = TWiseSampler::new(DpllOracle::new(cnf.clone()), SamplingConfig::default());
        let sample = sampler.sample(&NullMonitor).unwrap();
        let mut oracle = DpllOracle::new(cnf);
        assert!(uncovered(&sample, &mut oracle, &[1, 2, 3, 4], 2).unwrap().is_empty());
    }

    #[test]
    fn test_partial_configurations() {
        let config = SamplingConfig {
            t: 1,
            complete: false,
            ..SamplingConfig::default()
        };
        let cnf = Cnf::from_dimacs(vec![vec![1, 2, 3]]);
        let mut sampler = TWiseSampler::new(DpllOracle::new(cnf), config).with_variables([1]);
        let sample = sampler.sample(&NullMonitor).unwrap();
        // Only tuple literals are fixed.
        assert_eq!(sample.len(), 2);
        assert!(sample.iter().all(|c| c.specified_count() == 1));
        assert!(sample.covers(&lits(&[1])));
        assert!(sample.covers(&lits(&[-1])));
    }

    #[test]
    fn test_limit() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2, 3], vec![-1, 2, 3]]);
        let config = SamplingConfig {
            limit: Some(1),
            ..SamplingConfig::default()
        };
        let mut sampler = TWiseSampler::new(DpllOracle::new(cnf), config);
        let sample = sampler.sample(&NullMonitor).unwrap();
        assert_eq!(sample.len(), 1);
        assert_eq!(sample.metadata().status, SampleStatus::LimitReached);
        assert!(sample.metadata().coverage_ratio() < 1.0);
    }

    #[test]
    fn test_restricted_variables() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2, 3]]);
        let mut sampler =
            TWiseSampler::new(DpllOracle::new(cnf), SamplingConfig::default()).with_variables([3, 2]);
        let sample = sampler.sample(&NullMonitor).unwrap();
        assert_eq!(sample.metadata().total_tuples, 4);
        for tuple in [[2, 3], [2, -3], [-2, 3], [-2, -3]] {
            assert!(sample.covers(&lits(&tuple)));
        }
    }

    #[test]
    fn test_void_model() {
        let cnf = Cnf::from_dimacs(vec![vec![1], vec![-1]]);
        let mut sampler = TWiseSampler::new(DpllOracle::new(cnf), SamplingConfig::default());
        let sample = sampler.sample(&NullMonitor).unwrap();
        assert!(sample.is_empty());
        assert!((sample.metadata().coverage_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_t() {
        let config = SamplingConfig {
            t: 0,
            ..SamplingConfig::default()
        };
        let mut sampler = TWiseSampler::new(DpllOracle::new(or_model()), config);
        assert!(matches!(
            sampler.sample(&NullMonitor),
            Err(Error::PreconditionViolation(_))
        ));
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let mut sampler = TWiseSampler::new(DpllOracle::new(or_model()), SamplingConfig::default());
        assert!(matches!(sampler.sample(&token), Err(Error::Cancelled)));
    }

    #[test]
    fn test_iterations_never_grow_the_sample() {
        let cnf = Cnf::from_dimacs(vec![vec![-1, -2], vec![2, 3, 4], vec![-4, 1], vec![-3, 5]]);
        let single = TWiseSampler::new(DpllOracle::new(cnf.clone()), SamplingConfig::default())
            .sample(&NullMonitor)
            .unwrap();
        let config = SamplingConfig {
            iterations: 4,
            ..SamplingConfig::default()
        };
        let multi = TWiseSampler::new(DpllOracle::new(cnf), config)
            .sample(&NullMonitor)
            .unwrap();
        assert!(multi.len() <= single.len());
        assert_eq!(multi.metadata().iterations, 4);
        assert_eq!(multi.metadata().status, SampleStatus::Complete);
    }

    #[test]
    fn test_initial_timeout_is_returned() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2], vec![3, 4]]);
        let oracle = DpllOracle::with_config(
            cnf,
            OracleBudget {
                timeout: None,
                max_decisions: Some(0),
            },
            crate::config::Phase::Negative,
        );
        let mut sampler = TWiseSampler::new(oracle, SamplingConfig::default());
        // The initial satisfiability check already needs a decision.
        assert!(matches!(
            sampler.sample(&NullMonitor),
            Err(Error::Timeout { .. })
        ));
    }

    #[test]
    fn test_timed_out_tuple_stays_uncovered() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2, 3]]);
        let mut sampler = TWiseSampler::new(Stalling::new(cnf.clone(), &[1, 2]), SamplingConfig::default());
        let sample = sampler.sample(&NullMonitor).unwrap();

        let metadata = sample.metadata();
        assert_eq!(metadata.timed_out, 1);
        assert_eq!(metadata.unsatisfiable, 0);
        assert_eq!(metadata.covered, metadata.total_tuples - 1);
        assert!(metadata.coverage_ratio() < 1.0);
        assert!(!sample.covers(&lits(&[1, 2])));
        assert!(sample.iter().all(|c| cnf.verify(&c.literals())));
    }

    #[test]
    fn test_extension_timeout_tries_other_configurations() {
        // Extending the configuration fixed by [1, 2] with [1, 3] stalls; the
        // one fixed by [1, -2] takes the tuple instead.
        let cnf = Cnf::from_dimacs(vec![vec![1, 2, 3]]);
        let mut sampler = TWiseSampler::new(Stalling::new(cnf.clone(), &[1, 2, 3]), SamplingConfig::default());
        let sample = sampler.sample(&NullMonitor).unwrap();

        assert!(sampler.oracle().stalled > 0);
        assert_eq!(sample.metadata().timed_out, 0);
        assert!((sample.metadata().coverage_ratio() - 1.0).abs() < f64::EPSILON);
        let mut oracle = DpllOracle::new(cnf);
        assert!(uncovered(&sample, &mut oracle, &[1, 2, 3], 2).unwrap().is_empty());
    }

    #[test]
    fn test_expression_groups() {
        // 1 and 2 exclude each other.
        let cnf = Cnf::from_dimacs(vec![vec![-1, -2], vec![1, 2, 3]]);
        let groups = vec![
            vec![lits(&[1]), lits(&[2]), lits(&[-3])],
            vec![lits(&[1, 3]), lits(&[-1])],
        ];
        let mut sampler =
            TWiseSampler::new(DpllOracle::new(cnf.clone()), SamplingConfig::default()).with_expressions(groups);
        let sample = sampler.sample(&NullMonitor).unwrap();

        let metadata = sample.metadata();
        assert_eq!(metadata.total_tuples, 4);
        // [1, 2] is refuted by the oracle, [-1, 1, 3] contradicts itself.
        assert_eq!(metadata.unsatisfiable, 1);
        assert_eq!(metadata.filtered, 1);
        assert_eq!(metadata.covered, 2);
        assert!(sample.covers(&lits(&[1, -3])));
        assert!(sample.covers(&lits(&[2, -3])));
        assert!(sample.iter().all(|c| cnf.verify(&c.literals())));
    }

    #[test]
    fn test_literal_expressions_match_plain_sampling() {
        let cnf = Cnf::from_dimacs(vec![vec![-1, -2], vec![2, 3]]);
        let groups = vec![(1..=3).flat_map(|v| [lits(&[v]), lits(&[-v])]).collect_vec()];
        let mut sampler =
            TWiseSampler::new(DpllOracle::new(cnf.clone()), SamplingConfig::default()).with_expressions(groups);
        let sample = sampler.sample(&NullMonitor).unwrap();

        let mut oracle = DpllOracle::new(cnf);
        assert!(uncovered(&sample, &mut oracle, &[1, 2, 3], 2).unwrap().is_empty());
    }
}
