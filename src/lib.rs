//! Facade crate for the ramble tour-planning engine.
//!
//! This crate re-exports the core domain types and the constrained-model
//! representation, and exposes the remote hybrid sampler behind a feature
//! flag.

#![forbid(unsafe_code)]

pub use ramble_core::{
    BudgetBoundaries, BudgetError, BuildError, Bounds, ConstraintWeights, CqmSampler, Itinerary,
    ItineraryError, Leg, LegError, LegSpec, Locomotion, ModeProfile, ModeVar, SampleError,
    SamplerParams, SuggestedBudgets, TourPlan, TransportTable, WeightSpec, budget_boundaries,
    build_cqm, generate_legs, suggested_budgets,
};

pub use ramble_cqm::{
    Constraint, ConstrainedQuadraticModel, Expression, Penalty, Sample, SampleRecord, SampleSet,
    Sense, SoftWeight, quicksum,
};

#[cfg(feature = "solver-hybrid")]
pub use ramble_solver_hybrid::{
    ClientBuildError, HybridClient, HybridClientConfig, HybridError, HybridSampler, JobStatus,
};
