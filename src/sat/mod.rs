#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Propositional layer: literals, clauses, the CNF model, constraint expressions,
//! unit propagation, slicing and the SAT oracle.

pub mod assignment;
pub mod clause;
pub mod cnf;
pub mod dimacs;
pub mod dpll;
pub mod expr;
pub mod literal;
pub mod propagation;
pub mod slice;
pub mod solver;
pub mod trail;
