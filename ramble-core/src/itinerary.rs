//! Decoding solver answers into per-leg itineraries.

use ramble_cqm::{Sample, SampleSet};
use thiserror::Error;

use crate::builder::{ModeVar, TourPlan};
use crate::transport::Locomotion;

/// Errors from itinerary decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItineraryError {
    /// No enabled mode was chosen for a leg.
    #[error("no mode chosen for leg {leg}")]
    NoChoice {
        /// Zero-based index of the undecided leg.
        leg: usize,
    },
    /// More than one mode was chosen for a leg.
    #[error("multiple modes chosen for leg {leg}")]
    MultipleChoices {
        /// Zero-based index of the over-decided leg.
        leg: usize,
    },
    /// The sample set holds no feasible record.
    #[error("sample set has no feasible answer")]
    NoFeasibleSample,
}

/// A decoded answer: one locomotion mode per leg, plus tour totals.
///
/// # Examples
/// ```
/// use ramble_core::{Itinerary, Leg, Locomotion, ModeVar, TourPlan, TransportTable};
/// use ramble_cqm::Sample;
///
/// let plan = TourPlan::with_suggested_budgets(
///     vec![Leg { length: 4.0, uphill: 2.0, toll: false }],
///     TransportTable::default(),
///     8.0,
/// )?;
/// let chosen = ModeVar { mode: Locomotion::Cycle, leg: 0 };
/// let sample: Sample<ModeVar> = [(chosen, true)].into_iter().collect();
/// let itinerary = Itinerary::from_sample(&plan, &sample).expect("one mode per leg");
/// assert_eq!(itinerary.modes, vec![Locomotion::Cycle]);
/// # Ok::<(), ramble_core::BuildError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Itinerary {
    /// Chosen mode for each leg, in leg order.
    pub modes: Vec<Locomotion>,
    /// Total cost of the tour under the chosen modes.
    pub total_cost: f64,
    /// Total time of the tour under the chosen modes.
    pub total_time: f64,
    /// Total exercise collected over the tour.
    pub total_exercise: f64,
}

impl Itinerary {
    /// Decode a single sample against `plan`.
    ///
    /// # Errors
    /// Returns an [`ItineraryError`] when any leg has no chosen mode or
    /// more than one (a one-hot violation).
    pub fn from_sample(plan: &TourPlan, sample: &Sample<ModeVar>) -> Result<Self, ItineraryError> {
        let mut modes = Vec::with_capacity(plan.legs.len());
        let mut total_cost = 0.0;
        let mut total_time = 0.0;
        let mut total_exercise = 0.0;

        for (index, leg) in plan.legs.iter().enumerate() {
            let mut chosen = None;
            for (mode, profile) in plan.transport.enabled_profiles() {
                let var = ModeVar { mode, leg: index };
                if sample.get(&var) == Some(true) {
                    if chosen.is_some() {
                        return Err(ItineraryError::MultipleChoices { leg: index });
                    }
                    chosen = Some((mode, *profile));
                }
            }
            let Some((mode, profile)) = chosen else {
                return Err(ItineraryError::NoChoice { leg: index });
            };
            modes.push(mode);
            total_cost += profile.cost * leg.length;
            total_time += leg.length / profile.speed;
            total_exercise += profile.exercise * leg.length * leg.uphill;
        }

        Ok(Self {
            modes,
            total_cost,
            total_time,
            total_exercise,
        })
    }

    /// Decode the best feasible record of a sample set against `plan`.
    ///
    /// # Errors
    /// Returns [`ItineraryError::NoFeasibleSample`] when every record is
    /// infeasible, or a decoding error for a malformed answer.
    pub fn from_sampleset(
        plan: &TourPlan,
        samples: &SampleSet<ModeVar>,
    ) -> Result<Self, ItineraryError> {
        let best = samples
            .best_feasible()
            .ok_or(ItineraryError::NoFeasibleSample)?;
        Self::from_sample(plan, &best.sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leg::Leg;
    use crate::transport::TransportTable;
    use ramble_cqm::{SampleRecord, SampleSet};
    use rstest::{fixture, rstest};

    #[fixture]
    fn plan() -> TourPlan {
        TourPlan::with_suggested_budgets(
            vec![
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
            TransportTable::default(),
            10.0,
        )
        .expect("plan inputs are valid")
    }

    fn choice_sample(choices: &[(Locomotion, usize)]) -> Sample<ModeVar> {
        choices
            .iter()
            .map(|&(mode, leg)| (ModeVar { mode, leg }, true))
            .collect()
    }

    #[rstest]
    fn decodes_choices_and_totals(plan: TourPlan) {
        let sample = choice_sample(&[(Locomotion::Walk, 0), (Locomotion::Cycle, 1)]);
        let itinerary = Itinerary::from_sample(&plan, &sample).expect("sample is one-hot");
        assert_eq!(itinerary.modes, vec![Locomotion::Walk, Locomotion::Cycle]);
        // Walk: cost 0, time 10, exercise 1x10x5. Cycle: cost 40, time 20/3, exercise 2x20x10.
        assert_eq!(itinerary.total_cost, 40.0);
        assert!((itinerary.total_time - (10.0 + 20.0 / 3.0)).abs() < 1e-9);
        assert_eq!(itinerary.total_exercise, 450.0);
    }

    #[rstest]
    fn missing_choice_is_reported_with_the_leg(plan: TourPlan) {
        let sample = choice_sample(&[(Locomotion::Walk, 0)]);
        let err = Itinerary::from_sample(&plan, &sample).expect_err("leg 1 is undecided");
        assert_eq!(err, ItineraryError::NoChoice { leg: 1 });
    }

    #[rstest]
    fn double_choice_is_reported_with_the_leg(plan: TourPlan) {
        let sample = choice_sample(&[
            (Locomotion::Walk, 0),
            (Locomotion::Cycle, 0),
            (Locomotion::Bus, 1),
        ]);
        let err = Itinerary::from_sample(&plan, &sample).expect_err("leg 0 is over-decided");
        assert_eq!(err, ItineraryError::MultipleChoices { leg: 0 });
    }

    #[rstest]
    fn sampleset_decoding_skips_infeasible_records(plan: TourPlan) {
        let infeasible = SampleRecord {
            sample: choice_sample(&[(Locomotion::Drive, 0), (Locomotion::Drive, 1)]),
            energy: -1000.0,
            is_feasible: false,
        };
        let feasible = SampleRecord {
            sample: choice_sample(&[(Locomotion::Walk, 0), (Locomotion::Walk, 1)]),
            energy: -250.0,
            is_feasible: true,
        };
        let set = SampleSet::new(vec![infeasible, feasible]);
        let itinerary = Itinerary::from_sampleset(&plan, &set).expect("a feasible record exists");
        assert_eq!(itinerary.modes, vec![Locomotion::Walk, Locomotion::Walk]);
    }

    #[rstest]
    fn empty_sampleset_is_an_error(plan: TourPlan) {
        let set = SampleSet::new(Vec::new());
        assert_eq!(
            Itinerary::from_sampleset(&plan, &set).expect_err("no feasible record"),
            ItineraryError::NoFeasibleSample
        );
    }
}
