//! The solver seam: submit a model, get a sample set back.

use std::time::Duration;

use ramble_cqm::{ConstrainedQuadraticModel, SampleSet};
use thiserror::Error;

use crate::builder::ModeVar;

/// Parameters accompanying a sampling request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerParams {
    /// Human-readable label attached to the submission.
    pub label: String,
    /// Solver-side time limit for the search.
    pub time_limit: Duration,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            label: "tour assignment".to_owned(),
            time_limit: Duration::from_secs(5),
        }
    }
}

/// Errors returned by [`CqmSampler::sample`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The sampler refused the model before solving.
    #[error("sampler rejected the model: {reason}")]
    Rejected {
        /// Why the model was refused.
        reason: String,
    },
    /// The sampler accepted the model but failed to produce an answer.
    #[error("sampler backend failed: {message}")]
    Backend {
        /// Backend-supplied failure detail.
        message: String,
    },
    /// The submission was cancelled before completing.
    #[error("submission was cancelled")]
    Cancelled,
    /// No terminal status was observed within the polling deadline.
    #[error("no answer within the polling deadline")]
    DeadlineExceeded,
}

/// Search for low-energy assignments of a tour model.
///
/// Implementations should return a [`SampleError`] for every failure mode
/// rather than panicking. Samplers must be `Send + Sync` so a session can
/// share one across threads.
pub trait CqmSampler: Send + Sync {
    /// Sample the model, returning answers ordered by energy.
    ///
    /// # Errors
    /// Returns a [`SampleError`] when the model is refused, the backend
    /// fails, or no answer arrives in time.
    fn sample(
        &self,
        model: &ConstrainedQuadraticModel<ModeVar>,
        params: &SamplerParams,
    ) -> Result<SampleSet<ModeVar>, SampleError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct RefusingSampler;

    impl CqmSampler for RefusingSampler {
        fn sample(
            &self,
            _model: &ConstrainedQuadraticModel<ModeVar>,
            params: &SamplerParams,
        ) -> Result<SampleSet<ModeVar>, SampleError> {
            Err(SampleError::Rejected {
                reason: format!("label {:?} not allowed", params.label),
            })
        }
    }

    #[rstest]
    fn errors_surface_through_the_trait_object() {
        let sampler: &dyn CqmSampler = &RefusingSampler;
        let err = sampler
            .sample(&ConstrainedQuadraticModel::new(), &SamplerParams::default())
            .expect_err("sampler always refuses");
        assert!(matches!(err, SampleError::Rejected { .. }));
    }

    #[rstest]
    fn default_params_match_the_demo() {
        let params = SamplerParams::default();
        assert_eq!(params.time_limit, Duration::from_secs(5));
    }
}
