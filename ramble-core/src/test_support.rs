//! Shared fixtures and stub samplers for tests.

use ramble_cqm::{ConstrainedQuadraticModel, Penalty, SampleSet, exact};

use crate::builder::{ModeVar, TourPlan};
use crate::leg::Leg;
use crate::sampler::{CqmSampler, SampleError, SamplerParams};
use crate::transport::TransportTable;
use crate::weights::{ConstraintWeights, WeightSpec};

/// A small two-leg plan with a tolled second leg and a soft time budget.
#[must_use]
pub fn sample_plan() -> TourPlan {
    TourPlan {
        legs: vec![
            Leg {
                length: 10.0,
                uphill: 5.0,
                toll: false,
            },
            Leg {
                length: 20.0,
                uphill: 10.0,
                toll: true,
            },
        ],
        transport: TransportTable::default(),
        max_leg_slope: 10.0,
        max_cost: 10.0,
        max_time: 10.0,
        weights: ConstraintWeights {
            cost: WeightSpec::Hard,
            time: WeightSpec::soft(55.0, Penalty::Linear),
            slope: WeightSpec::Hard,
        },
    }
}

/// In-process sampler that enumerates every assignment of small models.
///
/// Useful for asserting on known optima without a remote solver. Models
/// beyond the enumeration cap are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSampler;

impl CqmSampler for ExhaustiveSampler {
    fn sample(
        &self,
        model: &ConstrainedQuadraticModel<ModeVar>,
        _params: &SamplerParams,
    ) -> Result<SampleSet<ModeVar>, SampleError> {
        exact::enumerate(model).map_err(|err| SampleError::Rejected {
            reason: err.to_string(),
        })
    }
}

/// Sampler returning a canned result, for exercising callers.
#[derive(Debug, Clone)]
pub struct ScriptedSampler {
    result: Result<SampleSet<ModeVar>, SampleError>,
}

impl ScriptedSampler {
    /// A sampler that always succeeds with `samples`.
    #[must_use]
    pub fn answering(samples: SampleSet<ModeVar>) -> Self {
        Self {
            result: Ok(samples),
        }
    }

    /// A sampler that always fails with `error`.
    #[must_use]
    pub fn failing(error: SampleError) -> Self {
        Self { result: Err(error) }
    }
}

impl CqmSampler for ScriptedSampler {
    fn sample(
        &self,
        _model: &ConstrainedQuadraticModel<ModeVar>,
        _params: &SamplerParams,
    ) -> Result<SampleSet<ModeVar>, SampleError> {
        self.result.clone()
    }
}
