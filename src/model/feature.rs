#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The feature tree, stored as an arena indexed by [`FeatureId`].

use crate::error::{Error, Result};
use crate::sat::cnf::Cnf;
use crate::sat::expr::Expr;
use core::ops::Index;
use rustc_hash::FxHashMap;
use std::fmt;

/// How the children of a feature are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupType {
    /// Each child is mandatory or optional on its own.
    #[default]
    And,
    /// At least one child is selected with the parent.
    Or,
    /// Exactly one child is selected with the parent.
    Alternative,
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Alternative => write!(f, "alt"),
        }
    }
}

/// One feature as supplied by a feature tree provider.
///
/// `group` describes how this feature's own children are grouped. `mandatory`
/// only has an effect when the parent groups its children with [`GroupType::And`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureRecord {
    pub name: String,
    pub parent: Option<String>,
    pub group: GroupType,
    pub mandatory: bool,
    pub is_abstract: bool,
}

impl FeatureRecord {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mandatory: true,
            ..Self::default()
        }
    }

    /// An optional child of `parent`.
    pub fn child(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    #[must_use]
    pub const fn group(mut self, group: GroupType) -> Self {
        self.group = group;
        self
    }

    #[must_use]
    pub const fn abstract_feature(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}

/// Dense index of a feature in its [`FeatureModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub parent: Option<FeatureId>,
    pub children: Vec<FeatureId>,
    pub group: GroupType,
    pub mandatory: bool,
    pub is_abstract: bool,
}

/// A validated feature tree plus its cross-tree constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureModel {
    features: Vec<Feature>,
    root: FeatureId,
    index: FxHashMap<String, FeatureId>,
    constraints: Vec<Expr>,
}

impl FeatureModel {
    /// Resolves parent links and validates the tree.
    ///
    /// Children keep the order in which their records appear.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedModel`] on a duplicate name, no root, more than one
    /// parentless feature, an unknown parent, a cycle in the parent relation, or a
    /// constraint that names an unknown feature.
    pub fn from_records(records: Vec<FeatureRecord>, constraints: Vec<Expr>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.name.clone(), FeatureId(i)).is_some() {
                return Err(Error::MalformedModel(format!(
                    "duplicate feature `{}`",
                    record.name
                )));
            }
        }

        let mut roots = records.iter().filter(|r| r.parent.is_none());
        let root_name = match (roots.next(), roots.next()) {
            (None, _) => return Err(Error::MalformedModel("no root feature".to_owned())),
            (Some(a), Some(b)) => {
                return Err(Error::MalformedModel(format!(
                    "more than one root: `{}` and `{}`",
                    a.name, b.name
                )));
            }
            (Some(root), None) => root.name.clone(),
        };
        let root = index[&root_name];

        let mut features: Vec<Feature> = Vec::with_capacity(records.len());
        for record in records {
            let parent = match &record.parent {
                None => None,
                Some(name) => Some(*index.get(name).ok_or_else(|| {
                    Error::MalformedModel(format!(
                        "feature `{}` has unknown parent `{name}`",
                        record.name
                    ))
                })?),
            };
            features.push(Feature {
                name: record.name,
                parent,
                children: Vec::new(),
                group: record.group,
                mandatory: record.mandatory,
                is_abstract: record.is_abstract,
            });
        }
        for i in 0..features.len() {
            if let Some(FeatureId(p)) = features[i].parent {
                features[p].children.push(FeatureId(i));
            }
        }

        let model = Self {
            features,
            root,
            index,
            constraints,
        };

        // Every feature has exactly one parent link, so anything the root cannot
        // reach sits on a cycle.
        let reached = model.preorder().count();
        if reached != model.features.len() {
            let stuck = model
                .features
                .iter()
                .enumerate()
                .find(|&(i, _)| !model.is_descendant_of_root(FeatureId(i)))
                .map_or("?", |(_, f)| f.name.as_str());
            return Err(Error::MalformedModel(format!(
                "cycle in the parent relation involving `{stuck}`"
            )));
        }

        for (i, constraint) in model.constraints.iter().enumerate() {
            if let Some(name) = constraint
                .contained_features()
                .into_iter()
                .find(|name| !model.index.contains_key(*name))
            {
                return Err(Error::MalformedModel(format!(
                    "constraint #{i} references unknown feature `{name}`"
                )));
            }
        }

        Ok(model)
    }

    fn is_descendant_of_root(&self, id: FeatureId) -> bool {
        let mut current = id;
        for _ in 0..=self.features.len() {
            if current == self.root {
                return true;
            }
            match self.features[current.0].parent {
                Some(p) => current = p,
                None => return false,
            }
        }
        false
    }

    #[must_use]
    pub const fn root(&self) -> FeatureId {
        self.root
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<FeatureId> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, id: FeatureId) -> &str {
        &self.features[id.0].name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.features.iter().enumerate().map(|(i, f)| (FeatureId(i), f))
    }

    #[must_use]
    pub fn constraints(&self) -> &[Expr] {
        &self.constraints
    }

    #[must_use]
    pub fn parent(&self, id: FeatureId) -> Option<FeatureId> {
        self.features[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: FeatureId) -> &[FeatureId] {
        &self.features[id.0].children
    }

    /// The other children of this feature's parent.
    pub fn siblings(&self, id: FeatureId) -> impl Iterator<Item = FeatureId> + '_ {
        self.parent(id)
            .map_or(&[][..], |p| self.children(p))
            .iter()
            .copied()
            .filter(move |&s| s != id)
    }

    /// The group type of the parent, i.e. the group this feature is a member of.
    #[must_use]
    pub fn parent_group(&self, id: FeatureId) -> Option<GroupType> {
        self.parent(id).map(|p| self.features[p.0].group)
    }

    /// Mandatory in an AND group.
    #[must_use]
    pub fn is_mandatory(&self, id: FeatureId) -> bool {
        self.parent_group(id) == Some(GroupType::And) && self.features[id.0].mandatory
    }

    /// Declared optional: a non-mandatory member of an AND group.
    #[must_use]
    pub fn is_optional(&self, id: FeatureId) -> bool {
        self.parent_group(id) == Some(GroupType::And) && !self.features[id.0].mandatory
    }

    /// Lazy preorder walk from the root. Each call starts a new walk.
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            model: self,
            stack: vec![self.root],
        }
    }

    /// Non-abstract features in preorder.
    #[must_use]
    pub fn concrete_features(&self) -> Vec<FeatureId> {
        self.preorder()
            .filter(|&id| !self.features[id.0].is_abstract)
            .collect()
    }

    /// Encodes the tree and its constraints as tagged clauses.
    ///
    /// # Errors
    ///
    /// See [`encode`](crate::model::encode::encode).
    pub fn to_cnf(&self) -> Result<Cnf> {
        crate::model::encode::encode(self)
    }
}

impl Index<FeatureId> for FeatureModel {
    type Output = Feature;

    fn index(&self, index: FeatureId) -> &Self::Output {
        &self.features[index.0]
    }
}

/// Iterative preorder traversal with an explicit stack.
#[derive(Debug, Clone)]
pub struct Preorder<'a> {
    model: &'a FeatureModel,
    stack: Vec<FeatureId>,
}

impl Iterator for Preorder<'_> {
    type Item = FeatureId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.model.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<FeatureRecord> {
        vec![
            FeatureRecord::root("Root").abstract_feature(),
            FeatureRecord::child("Base", "Root").mandatory(),
            FeatureRecord::child("Storage", "Root").group(GroupType::Alternative),
            FeatureRecord::child("Memory", "Storage"),
            FeatureRecord::child("Disk", "Storage"),
            FeatureRecord::child("Logging", "Root"),
        ]
    }

    #[test]
    fn test_preorder_is_restartable() {
        let model = FeatureModel::from_records(records(), vec![]).unwrap();
        let names: Vec<&str> = model.preorder().map(|id| model.name(id)).collect();
        assert_eq!(names, vec!["Root", "Base", "Storage", "Memory", "Disk", "Logging"]);
        assert_eq!(model.preorder().count(), 6);
    }

    #[test]
    fn test_structure_queries() {
        let model = FeatureModel::from_records(records(), vec![]).unwrap();
        let base = model.get("Base").unwrap();
        let disk = model.get("Disk").unwrap();
        let logging = model.get("Logging").unwrap();

        assert!(model.is_mandatory(base));
        assert!(model.is_optional(logging));
        assert!(!model.is_optional(disk));
        assert_eq!(model.parent_group(disk), Some(GroupType::Alternative));
        assert_eq!(
            model.siblings(disk).map(|id| model.name(id)).collect::<Vec<_>>(),
            vec!["Memory"]
        );
        assert_eq!(model.concrete_features().len(), 5);
    }

    #[test]
    fn test_no_root() {
        let err = FeatureModel::from_records(vec![FeatureRecord::child("A", "B")], vec![]);
        assert!(matches!(err, Err(Error::MalformedModel(_))));
        let err = FeatureModel::from_records(vec![], vec![]);
        assert!(matches!(err, Err(Error::MalformedModel(_))));
    }

    #[test]
    fn test_multiple_roots() {
        let err = FeatureModel::from_records(
            vec![FeatureRecord::root("A"), FeatureRecord::root("B")],
            vec![],
        );
        assert!(matches!(err, Err(Error::MalformedModel(m)) if m.contains("more than one root")));
    }

    #[test]
    fn test_unknown_parent_and_duplicates() {
        let err = FeatureModel::from_records(
            vec![FeatureRecord::root("A"), FeatureRecord::child("B", "Z")],
            vec![],
        );
        assert!(matches!(err, Err(Error::MalformedModel(m)) if m.contains("unknown parent")));

        let err = FeatureModel::from_records(
            vec![FeatureRecord::root("A"), FeatureRecord::child("A", "A")],
            vec![],
        );
        assert!(matches!(err, Err(Error::MalformedModel(m)) if m.contains("duplicate")));
    }

    #[test]
    fn test_cycle() {
        let err = FeatureModel::from_records(
            vec![
                FeatureRecord::root("R"),
                FeatureRecord::child("A", "B"),
                FeatureRecord::child("B", "A"),
            ],
            vec![],
        );
        assert!(matches!(err, Err(Error::MalformedModel(m)) if m.contains("cycle")));
    }

    #[test]
    fn test_constraint_with_unknown_feature() {
        let err = FeatureModel::from_records(
            records(),
            vec![Expr::implies("Logging".into(), "Tracing".into())],
        );
        assert!(matches!(err, Err(Error::MalformedModel(m)) if m.contains("Tracing")));
    }
}
