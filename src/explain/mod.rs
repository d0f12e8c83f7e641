#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Human-checkable explanations of model defects.
//!
//! [`Ltms`] turns a contradiction between premises and a clause set into a chain
//! of reasons; [`ExplanationCreator`] picks the premises for a given defect and
//! returns the shortest chain it finds.

pub mod creator;
pub mod explanation;
pub mod ltms;

pub use creator::{Explainable, ExplanationCreator};
pub use explanation::{Explanation, Reason};
pub use ltms::{Ltms, LtmsState};
