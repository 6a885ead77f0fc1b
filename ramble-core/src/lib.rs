//! Core domain types for the ramble tour-planning engine.
//!
//! A tour is a sequence of [`Leg`]s, each covered by exactly one
//! [`Locomotion`] mode. [`build_cqm`] assembles the assignment problem as a
//! [`ramble_cqm::ConstrainedQuadraticModel`]: maximise total exercise
//! subject to cost and time budgets, toll restrictions, and per-leg slope
//! limits. Budget constraints may be hard or weighted-soft via
//! [`WeightSpec`].
//!
//! Solving is delegated to implementations of the [`CqmSampler`] seam;
//! answers decode back into an [`Itinerary`].

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod budget;
mod builder;
mod itinerary;
mod leg;
mod sampler;
mod transport;
mod weights;

#[cfg(feature = "test-support")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use budget::{BudgetBoundaries, BudgetError, Bounds, SuggestedBudgets, budget_boundaries, suggested_budgets};
pub use builder::{BuildError, ModeVar, ParseModeVarError, TourPlan, build_cqm};
pub use itinerary::{Itinerary, ItineraryError};
pub use leg::{Leg, LegError, LegSpec, TOLL_PROBABILITY, generate_legs};
pub use sampler::{CqmSampler, SampleError, SamplerParams};
pub use transport::{Locomotion, ModeProfile, ParseLocomotionError, TransportError, TransportTable};
pub use weights::{ConstraintWeights, WeightSpec};

pub use ramble_cqm::{Penalty, SoftWeight};
