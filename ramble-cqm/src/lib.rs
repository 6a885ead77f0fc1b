//! Constrained quadratic models over binary variables.
//!
//! A [`ConstrainedQuadraticModel`] pairs an objective [`Expression`] with a
//! set of named constraints. Constraints are hard by default; attaching a
//! [`SoftWeight`] turns one soft, meaning a solver may violate it at a
//! penalty scaled linearly or quadratically by the violation amount.
//!
//! Variable labels are caller-supplied: any `Clone + Ord` type works, so
//! callers can use structured keys instead of encoding identity in strings.
//!
//! The crate only represents and evaluates models; searching for low-energy
//! samples is a solver's job. The `test-support` feature adds an exhaustive
//! enumerator for models small enough to brute-force.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod expr;
mod model;
mod sampleset;

#[cfg(feature = "test-support")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod exact;

pub use expr::{Expression, quicksum};
pub use model::{
    Constraint, ConstrainedQuadraticModel, FEASIBILITY_TOLERANCE, ModelError, Penalty, Sense,
    SoftWeight,
};
pub use sampleset::{Sample, SampleRecord, SampleSet};
