//! Remote hybrid-solver client for ramble tour models.
//!
//! This crate provides [`HybridSampler`], an implementation of the
//! [`CqmSampler`](ramble_core::CqmSampler) trait that delegates solving to a
//! hosted hybrid CQM service over HTTP. A submission uploads the serialized
//! model, starts a sampling job, polls the job's status until a terminal
//! state, then retrieves and deserializes the answer. Cancellation is
//! best-effort: the request is forwarded and the job may still complete.
//!
//! The public API is synchronous; HTTP calls run on a Tokio runtime owned by
//! the client, mirroring the blocking-facade convention of the rest of the
//! workspace.

#![forbid(unsafe_code)]

mod api;
mod client;
mod tracker;

pub use api::JobStatus;
pub use client::{ClientBuildError, HybridClient, HybridClientConfig, HybridError, HybridSampler};
pub use tracker::{JobTracker, TrackerError};
