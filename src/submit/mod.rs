//! Client-side submission layer: payload types, input validation, the
//! backend HTTP client, and the persisted form snapshot.

pub mod client;
pub mod store;
pub mod types;
pub mod validation;

pub use client::{BackendClient, SubmissionError};
pub use store::SnapshotStore;
pub use types::{
    FinalEvaluation, FormSnapshot, OptimizationJob, OptimizationResult, OrganismEntry,
    OrganismSpec, SequenceInput,
};
