//! Client-side record of a submission's progress.

use thiserror::Error;

use crate::api::JobStatus;

/// Errors raised when advancing a [`JobTracker`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The requested status change is not a legal lifecycle step.
    #[error("cannot move a {from} job to {to}")]
    InvalidTransition {
        /// Status the job currently holds.
        from: JobStatus,
        /// Status the update tried to apply.
        to: JobStatus,
    },
}

/// Tracks one problem's journey through the hybrid service.
///
/// A tracker starts in [`JobStatus::Waiting`] and records the upload handle,
/// the service-assigned problem id, and every status reported by polling.
/// Terminal statuses absorb further updates: once a job completes, fails, or
/// is cancelled, no transition out is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTracker {
    data_id: Option<String>,
    problem_id: Option<String>,
    label: String,
    status: JobStatus,
}

impl JobTracker {
    /// Create a tracker for a not-yet-submitted job.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            data_id: None,
            problem_id: None,
            label: label.into(),
            status: JobStatus::Waiting,
        }
    }

    /// Handle of the uploaded model data, once the upload succeeds.
    #[must_use]
    pub fn data_id(&self) -> Option<&str> {
        self.data_id.as_deref()
    }

    /// Service-assigned problem id, once submission succeeds.
    #[must_use]
    pub fn problem_id(&self) -> Option<&str> {
        self.problem_id.as_deref()
    }

    /// Label the job was submitted under.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Most recently recorded status.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// True once the job has reached a state it cannot leave.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a successful data upload.
    pub fn record_upload(&mut self, data_id: impl Into<String>) {
        self.data_id = Some(data_id.into());
    }

    /// Record a successful submission.
    ///
    /// # Errors
    /// Returns [`TrackerError::InvalidTransition`] if the job already left
    /// the waiting state.
    pub fn record_submission(&mut self, problem_id: impl Into<String>) -> Result<(), TrackerError> {
        if self.status != JobStatus::Waiting {
            return Err(TrackerError::InvalidTransition {
                from: self.status,
                to: JobStatus::Submitted,
            });
        }
        self.problem_id = Some(problem_id.into());
        self.status = JobStatus::Submitted;
        Ok(())
    }

    /// Apply a status reported by the service.
    ///
    /// Repeating the current status is a no-op, so pollers can feed every
    /// response straight in.
    ///
    /// # Errors
    /// Returns [`TrackerError::InvalidTransition`] when the job is already
    /// terminal, was never submitted, or the update tries to move backwards
    /// to [`JobStatus::Waiting`].
    pub fn update_status(&mut self, status: JobStatus) -> Result<(), TrackerError> {
        if status == self.status {
            return Ok(());
        }
        let legal = match self.status {
            JobStatus::Waiting => false,
            JobStatus::Submitted | JobStatus::Pending | JobStatus::InProgress => {
                !matches!(status, JobStatus::Waiting)
            }
            JobStatus::Completed | JobStatus::Cancelled | JobStatus::Failed => false,
        };
        if !legal {
            return Err(TrackerError::InvalidTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn submitted_tracker() -> JobTracker {
        let mut tracker = JobTracker::new("test job");
        tracker.record_upload("data-1");
        tracker
            .record_submission("problem-1")
            .expect("fresh tracker accepts a submission");
        tracker
    }

    #[rstest]
    fn new_trackers_start_waiting() {
        let tracker = JobTracker::new("test job");
        assert_eq!(tracker.status(), JobStatus::Waiting);
        assert!(tracker.data_id().is_none());
        assert!(tracker.problem_id().is_none());
        assert!(!tracker.is_finished());
    }

    #[rstest]
    fn submission_records_the_problem_id() {
        let tracker = submitted_tracker();
        assert_eq!(tracker.status(), JobStatus::Submitted);
        assert_eq!(tracker.data_id(), Some("data-1"));
        assert_eq!(tracker.problem_id(), Some("problem-1"));
    }

    #[rstest]
    fn resubmission_is_rejected() {
        let mut tracker = submitted_tracker();
        let err = tracker
            .record_submission("problem-2")
            .expect_err("second submission must fail");
        assert_eq!(
            err,
            TrackerError::InvalidTransition {
                from: JobStatus::Submitted,
                to: JobStatus::Submitted,
            }
        );
    }

    #[rstest]
    #[case(JobStatus::Pending)]
    #[case(JobStatus::InProgress)]
    #[case(JobStatus::Completed)]
    #[case(JobStatus::Cancelled)]
    #[case(JobStatus::Failed)]
    fn submitted_jobs_accept_later_statuses(#[case] next: JobStatus) {
        let mut tracker = submitted_tracker();
        tracker.update_status(next).expect("transition is legal");
        assert_eq!(tracker.status(), next);
    }

    #[rstest]
    fn repeated_polls_are_no_ops() {
        let mut tracker = submitted_tracker();
        tracker
            .update_status(JobStatus::Pending)
            .expect("transition is legal");
        tracker
            .update_status(JobStatus::Pending)
            .expect("repeating the current status is fine");
        assert_eq!(tracker.status(), JobStatus::Pending);
    }

    #[rstest]
    #[case(JobStatus::Completed)]
    #[case(JobStatus::Cancelled)]
    #[case(JobStatus::Failed)]
    fn terminal_statuses_absorb_updates(#[case] terminal: JobStatus) {
        let mut tracker = submitted_tracker();
        tracker.update_status(terminal).expect("transition is legal");
        assert!(tracker.is_finished());

        let err = tracker
            .update_status(JobStatus::InProgress)
            .expect_err("terminal jobs do not move");
        assert_eq!(
            err,
            TrackerError::InvalidTransition {
                from: terminal,
                to: JobStatus::InProgress,
            }
        );
    }

    #[rstest]
    fn unsubmitted_jobs_cannot_progress() {
        let mut tracker = JobTracker::new("test job");
        let err = tracker
            .update_status(JobStatus::Pending)
            .expect_err("waiting jobs only move via submission");
        assert!(matches!(err, TrackerError::InvalidTransition { .. }));
    }
}
