#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Bit-packed pairwise feature dependency graph.

pub mod dependency;
pub mod edge;

pub use dependency::{Closure, DependencyGraph, Reach};
pub use edge::{Edge, Implication};
