#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Feature trees and their propositional encoding.

pub mod encode;
pub mod feature;

pub use feature::{Feature, FeatureId, FeatureModel, FeatureRecord, GroupType};
