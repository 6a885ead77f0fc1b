//! Wire types for the hybrid solver's problems API.
//!
//! The service exposes a small REST surface: upload problem data, start a
//! sampling job, poll its status, fetch the answer, and request
//! cancellation. Status strings follow the vendor's uppercase convention.

use std::fmt;

use ramble_core::ModeVar;
use ramble_cqm::SampleSet;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a submitted problem.
///
/// `Waiting` is the client-side initial state; the service only ever
/// reports the later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Nothing submitted yet.
    Waiting,
    /// The job was accepted by the service.
    Submitted,
    /// The job is queued behind other work.
    Pending,
    /// The solver is working on the job.
    InProgress,
    /// The job finished and an answer is available.
    Completed,
    /// The job was cancelled before completing.
    Cancelled,
    /// The solver gave up on the job.
    Failed,
}

impl JobStatus {
    /// True for statuses the job can never leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "WAITING",
            Self::Submitted => "SUBMITTED",
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Response to a problem-data upload.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    /// Handle for the uploaded model, referenced at submission.
    pub data_id: String,
}

/// Body of a job submission.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SubmitRequest<'a> {
    /// Handle returned by the upload step.
    pub data_id: &'a str,
    /// Human-readable label shown in the service's dashboard.
    pub label: &'a str,
    /// Solver-side time limit, in seconds.
    pub time_limit: f64,
}

/// Response to a job submission or status poll.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProblemResponse {
    /// Service-assigned problem id.
    pub id: String,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Failure detail, present for failed jobs.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response carrying a completed job's answer.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnswerResponse {
    /// The solver's sample set.
    pub answer: SampleSet<ModeVar>,
}
