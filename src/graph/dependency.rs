#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! A dense N×N byte matrix of [`Edge`]s between the non-core features of a model.
//!
//! The graph over-approximates the implication closure of the model without
//! calling a SAT solver for every pair. It is built from the tree structure and
//! the cross-tree constraints, then closed by [`DependencyGraph::propagate_all`].
//! The graph never fails: an outcome it cannot decide is reported as
//! [`Reach::Indeterminate`].

use crate::error::Result;
use crate::graph::edge::{Edge, Implication};
use crate::model::feature::{FeatureId, FeatureModel, GroupType};
use crate::monitor::Monitor;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// What a closure query learnt about one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Reach {
    #[default]
    Unreached,
    /// Decided through a chain of strong edges.
    Forced(bool),
    /// Reached only through weak edges, so its value is unknown.
    Indeterminate,
}

/// Result of propagating one node under one assumed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    pub node: usize,
    pub polarity: bool,
    reach: Vec<Reach>,
}

impl Closure {
    #[must_use]
    pub fn reach(&self, node: usize) -> Reach {
        self.reach[node]
    }

    /// Nodes decided by the assumption, the assumed node included.
    pub fn forced(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.reach.iter().enumerate().filter_map(|(i, r)| match r {
            Reach::Forced(v) => Some((i, *v)),
            _ => None,
        })
    }

    pub fn indeterminate(&self) -> impl Iterator<Item = usize> + '_ {
        self.reach
            .iter()
            .positions(|r| *r == Reach::Indeterminate)
    }

    /// Number of nodes reached other than the assumed one.
    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.reach
            .iter()
            .filter(|r| **r != Reach::Unreached)
            .count()
            .saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    /// Reached with unknown value; may be resolved once through a strong edge.
    Tentative,
    Resolved,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    value: Option<bool>,
    next: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyGraph {
    names: Vec<String>,
    index: FxHashMap<String, usize>,
    matrix: Vec<u8>,
}

impl DependencyGraph {
    /// An empty graph over `names`, indexed in the given order.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        let n = names.len();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            index,
            matrix: vec![0; n * n],
        }
    }

    /// Initial edges of `model` over its features that are not in `core`, sorted by name.
    #[must_use]
    pub fn from_model(model: &FeatureModel, core: &[FeatureId]) -> Self {
        let core: FxHashSet<FeatureId> = core.iter().copied().collect();
        let non_core = |id: &FeatureId| !core.contains(id);

        let nodes: Vec<FeatureId> = model
            .iter()
            .map(|(id, _)| id)
            .filter(non_core)
            .sorted_by(|a, b| model.name(*a).cmp(model.name(*b)))
            .collect();
        let mut graph = Self::new(nodes.iter().map(|&id| model.name(id).to_owned()).collect());
        let node = |graph: &Self, id: FeatureId| graph.node(model.name(id));

        for &f in &nodes {
            let Some(parent) = model.parent(f) else {
                continue;
            };
            let group = model.parent_group(f).unwrap_or_default();
            let Some(fi) = node(&graph, f) else { continue };

            if let Some(pi) = node(&graph, parent) {
                graph.implies(fi, pi);
                if model.is_mandatory(f) {
                    graph.implies(pi, fi);
                } else if group == GroupType::And {
                    graph.set_edge(fi, pi, Edge::E0Q);
                } else {
                    graph.set_edge(pi, fi, Edge::E1Q);
                    graph.set_edge(fi, pi, Edge::E0Q);
                }
            }

            match group {
                GroupType::Alternative => {
                    for sibling in model.children(parent).iter().copied().filter(non_core) {
                        if let Some(si) = node(&graph, sibling) {
                            graph.set_edge(fi, si, Edge::E10);
                            graph.set_edge(fi, si, Edge::E0Q);
                        }
                    }
                }
                GroupType::Or if model.children(parent).iter().all(non_core) => {
                    for &sibling in model.children(parent) {
                        if let Some(si) = node(&graph, sibling) {
                            graph.set_edge(fi, si, Edge::E0Q);
                        }
                    }
                }
                _ => {}
            }
        }

        for constraint in model.constraints() {
            if let Some(((a, pa), (b, pb))) = constraint.as_literal_implication() {
                if let (Some(ai), Some(bi)) = (graph.node(a), graph.node(b)) {
                    graph.set_edge(ai, bi, Edge::strong(pa, pb));
                    graph.set_edge(bi, ai, Edge::strong(!pb, !pa));
                }
                continue;
            }
            let contained: Vec<usize> = constraint
                .contained_features()
                .into_iter()
                .filter_map(|name| graph.node(name))
                .collect();
            for (&a, &b) in contained.iter().cartesian_product(contained.iter()) {
                graph.set_edge(a, b, Edge::E0Q);
                graph.set_edge(a, b, Edge::E1Q);
            }
        }

        graph.clear_diagonal();
        log::debug!(
            "dependency graph over {} non-core features ({} core)",
            graph.len(),
            core.len()
        );
        graph
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Dense index of the feature called `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    #[must_use]
    pub fn edge(&self, from: usize, to: usize) -> Edge {
        Edge(self.matrix[from * self.len() + to])
    }

    /// Asserts `edge` on the cell `(from, to)` following [`Edge::merge`].
    ///
    /// Writes to the diagonal are ignored and [`Edge::NONE`] clears the cell.
    pub fn set_edge(&mut self, from: usize, to: usize, edge: Edge) {
        if from == to {
            return;
        }
        let n = self.len();
        let cell = &mut self.matrix[from * n + to];
        *cell = if edge.is_none() {
            0
        } else {
            Edge(*cell).merge(edge).0
        };
    }

    /// `from => to` and its contrapositive `!to => !from`.
    pub fn implies(&mut self, from: usize, to: usize) {
        self.set_edge(from, to, Edge::E11);
        self.set_edge(to, from, Edge::E00);
    }

    pub fn clear_diagonal(&mut self) {
        let n = self.len();
        for i in 0..n {
            self.matrix[i * n + i] = 0;
        }
    }

    /// Closes the graph: propagates every node, first assumed selected, then unselected.
    ///
    /// # Errors
    ///
    /// Only [`Error::Cancelled`](crate::error::Error::Cancelled). Every edge write
    /// already made stays valid.
    pub fn propagate_all(&mut self, monitor: &dyn Monitor) -> Result<()> {
        for polarity in [true, false] {
            for node in 0..self.len() {
                self.propagate(node, polarity);
                monitor.worked(1);
                monitor.checkpoint()?;
            }
        }
        Ok(())
    }

    /// Depth-first walk from `node` assumed to be `polarity`.
    ///
    /// Strong edges decide a neighbour; weak edges only mark it as reached. What the
    /// walk learns is written back onto the row of `node`, so later queries start
    /// from it.
    pub fn propagate(&mut self, node: usize, polarity: bool) -> Closure {
        let n = self.len();
        let mut visit = vec![Visit::Unvisited; n];
        let mut reach = vec![Reach::Unreached; n];
        visit[node] = Visit::Resolved;
        reach[node] = Reach::Forced(polarity);

        for j in 0..n {
            let value = match (visit[j], self.edge(node, j).implication(polarity)) {
                (Visit::Resolved, _) | (_, Implication::None | Implication::Infeasible) => {
                    continue;
                }
                (_, Implication::Forced(v)) => {
                    visit[j] = Visit::Resolved;
                    reach[j] = Reach::Forced(v);
                    Some(v)
                }
                (Visit::Tentative, Implication::Weak) => continue,
                (Visit::Unvisited, Implication::Weak) => {
                    visit[j] = Visit::Tentative;
                    reach[j] = Reach::Indeterminate;
                    None
                }
            };
            self.walk(node, polarity, j, value, &mut visit, &mut reach);
        }

        Closure {
            node,
            polarity,
            reach,
        }
    }

    fn walk(
        &mut self,
        root: usize,
        polarity: bool,
        start: usize,
        value: Option<bool>,
        visit: &mut [Visit],
        reach: &mut [Reach],
    ) {
        let n = self.len();
        let mut stack = vec![Frame {
            node: start,
            value,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next >= n {
                stack.pop();
                continue;
            }
            let j = frame.next;
            frame.next += 1;
            let (current, known) = (frame.node, frame.value);
            let edge = self.edge(current, j);

            let step = match (visit[j], known) {
                (Visit::Resolved, _) => None,
                (Visit::Unvisited, Some(v)) => match edge.implication(v) {
                    Implication::Forced(w) => Some(Some(w)),
                    Implication::Weak => Some(None),
                    Implication::None | Implication::Infeasible => None,
                },
                (Visit::Unvisited, None) => (!edge.is_none()).then_some(None),
                (Visit::Tentative, Some(v)) => match edge.implication(v) {
                    Implication::Forced(w) => Some(Some(w)),
                    _ => None,
                },
                (Visit::Tentative, None) => None,
            };

            let Some(next) = step else { continue };
            match next {
                Some(w) => {
                    visit[j] = Visit::Resolved;
                    reach[j] = Reach::Forced(w);
                    self.set_edge(root, j, Edge::strong(polarity, w));
                }
                None => {
                    visit[j] = Visit::Tentative;
                    reach[j] = Reach::Indeterminate;
                    self.set_edge(root, j, Edge::weak(polarity));
                }
            }
            stack.push(Frame {
                node: j,
                value: next,
                next: 0,
            });
        }
    }

    /// Number of nodes this node has any edge to.
    #[must_use]
    pub fn neighbor_count(&self, node: usize) -> usize {
        (0..self.len())
            .filter(|&j| !self.edge(node, j).is_none())
            .count()
    }

    /// Number of nodes this node has a strong edge to.
    #[must_use]
    pub fn strong_neighbor_count(&self, node: usize) -> usize {
        (0..self.len())
            .filter(|&j| self.edge(node, j).is_strong())
            .count()
    }

    /// [`neighbor_count`](Self::neighbor_count) of every node.
    #[must_use]
    pub fn centrality(&self) -> Vec<usize> {
        (0..self.len()).map(|i| self.neighbor_count(i)).collect()
    }

    /// Nodes by ascending neighbour count, ties broken by index.
    #[must_use]
    pub fn elimination_order(&self) -> Vec<usize> {
        let centrality = self.centrality();
        (0..self.len())
            .sorted_by_key(|&i| (centrality[i], i))
            .collect()
    }

    /// Whether a strong edge proves that `a = pa` and `b = pb` cannot hold together.
    #[must_use]
    pub fn is_pair_infeasible(&self, (a, pa): (usize, bool), (b, pb): (usize, bool)) -> bool {
        if a == b {
            return pa != pb;
        }
        let forbids = |from: usize, value: bool, to: usize, other: bool| match self
            .edge(from, to)
            .implication(value)
        {
            Implication::Forced(w) => w != other,
            Implication::Infeasible => true,
            _ => false,
        };
        forbids(a, pa, b, pb) || forbids(b, pb, a, pa)
    }

    /// Freezes the graph for concurrent readers.
    #[must_use]
    pub fn publish(self) -> Arc<Self> {
        Arc::new(self)
    }
}
