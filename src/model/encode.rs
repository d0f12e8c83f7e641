#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! CNF encoding of a [`FeatureModel`].
//!
//! Variables are interned in feature preorder, so the root is always variable 1.
//! Per feature the encoder emits:
//!
//! | relation | clauses | provenance |
//! |---|---|---|
//! | root | `(root)` | `Root` |
//! | any child | `(!child | parent)` | `ChildImpliesParent` |
//! | mandatory child of an AND group | `(!parent | child)` | `MandatoryChild` |
//! | OR / ALTERNATIVE group | `(!parent | c1 | .. | ck)` | `GroupAtLeastOne` |
//! | ALTERNATIVE group | `(!ci | !cj)` for every pair | `GroupExclusion` |
//! | constraint `i` | its clausal form | `Constraint { index: i }` |

use crate::error::Result;
use crate::model::feature::{FeatureId, FeatureModel, GroupType};
use crate::sat::clause::Provenance;
use crate::sat::cnf::{Cnf, VariableMap};
use crate::sat::literal::{Literal, Variable};
use itertools::Itertools;

/// Builds the CNF of `model`.
///
/// # Errors
///
/// [`Error::MalformedModel`](crate::error::Error::MalformedModel) if a constraint
/// references a feature that is not in the tree.
pub fn encode(model: &FeatureModel) -> Result<Cnf> {
    let mut variables = VariableMap::new();
    for id in model.preorder() {
        variables.intern(model.name(id));
    }
    let var = |id: FeatureId| -> Variable {
        // Interned above for every feature of the tree.
        variables.get(model.name(id)).unwrap_or_default()
    };
    let vars: Vec<Variable> = (0..model.len()).map(|i| var(FeatureId(i))).collect();
    let mut cnf = Cnf::new(variables.clone());

    for id in model.preorder() {
        let v = vars[id.0];
        match model.parent(id) {
            None => {
                cnf.add_clause([Literal::positive(v)], Provenance::Root);
            }
            Some(parent) => {
                let p = vars[parent.0];
                cnf.add_clause(
                    [Literal::negative(v), Literal::positive(p)],
                    Provenance::ChildImpliesParent { child: v },
                );
                if model.is_mandatory(id) {
                    cnf.add_clause(
                        [Literal::negative(p), Literal::positive(v)],
                        Provenance::MandatoryChild { child: v },
                    );
                }
            }
        }

        let children = model.children(id);
        if children.is_empty() {
            continue;
        }
        match model[id].group {
            GroupType::And => {}
            GroupType::Or | GroupType::Alternative => {
                cnf.add_clause(
                    std::iter::once(Literal::negative(v))
                        .chain(children.iter().map(|c| Literal::positive(vars[c.0]))),
                    Provenance::GroupAtLeastOne { parent: v },
                );
            }
        }
        if model[id].group == GroupType::Alternative {
            for (a, b) in children.iter().tuple_combinations() {
                cnf.add_clause(
                    [Literal::negative(vars[a.0]), Literal::negative(vars[b.0])],
                    Provenance::GroupExclusion { parent: v },
                );
            }
        }
    }

    for (index, constraint) in model.constraints().iter().enumerate() {
        for clause in constraint.to_cnf(&variables)? {
            cnf.add_clause(clause, Provenance::Constraint { index });
        }
    }

    log::debug!(
        "encoded {} features and {} constraints into {} clauses",
        model.len(),
        model.constraints().len(),
        cnf.clause_count()
    );
    Ok(cnf)
}
