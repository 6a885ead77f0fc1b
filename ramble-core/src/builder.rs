//! Assembly of the tour assignment model.
//!
//! [`build_cqm`] turns a [`TourPlan`] into a constrained quadratic model:
//! one binary variable per (leg, enabled mode) pair, an exercise-maximising
//! objective, a one-hot choice per leg, cost and time budgets, toll
//! restrictions, and per-leg slope caps. The builder only assembles
//! expressions; representation and evaluation live in [`ramble_cqm`].

use std::fmt;
use std::str::FromStr;

use log::debug;
use ramble_cqm::{Constraint, ConstrainedQuadraticModel, Expression, ModelError, quicksum};
use thiserror::Error;

use crate::budget::suggested_budgets;
use crate::leg::Leg;
use crate::transport::{Locomotion, ModeProfile, ParseLocomotionError, TransportTable};
use crate::weights::ConstraintWeights;

/// Decision-variable label: `mode` covers leg number `leg`.
///
/// Displays as `{mode}_{leg}` (for example `walk_0`) so wire formats stay
/// readable, but identity is structural rather than string-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModeVar {
    /// The locomotion mode.
    pub mode: Locomotion,
    /// Zero-based leg index.
    pub leg: usize,
}

impl fmt::Display for ModeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.mode, self.leg)
    }
}

/// Error from parsing a malformed variable label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseModeVarError {
    /// The label has no `_` separator.
    #[error("variable label is missing the mode/leg separator: {0}")]
    MissingSeparator(String),
    /// The mode part is not a known mode name.
    #[error(transparent)]
    UnknownMode(#[from] ParseLocomotionError),
    /// The leg part is not a number.
    #[error("variable label has a malformed leg index: {0}")]
    BadLegIndex(String),
}

impl FromStr for ModeVar {
    type Err = ParseModeVarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mode, leg) = s
            .rsplit_once('_')
            .ok_or_else(|| ParseModeVarError::MissingSeparator(s.to_owned()))?;
        Ok(Self {
            mode: mode.parse()?,
            leg: leg
                .parse()
                .map_err(|_| ParseModeVarError::BadLegIndex(s.to_owned()))?,
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ModeVar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ModeVar {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = <String as serde::Deserialize>::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// A fully configured tour, ready for model assembly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TourPlan {
    /// The tour's legs, in order.
    pub legs: Vec<Leg>,
    /// Available locomotion modes.
    pub transport: TransportTable,
    /// Largest climb a slope-limited mode may take on.
    pub max_leg_slope: f64,
    /// Budget for the tour's total cost.
    pub max_cost: f64,
    /// Budget for the tour's total time.
    pub max_time: f64,
    /// Hard/soft specs for the cost, time and slope constraints.
    pub weights: ConstraintWeights,
}

impl TourPlan {
    /// Build a plan with demo-default budgets for the given legs.
    ///
    /// # Errors
    /// Returns a [`BuildError`] when `legs` is empty or no mode is enabled.
    pub fn with_suggested_budgets(
        legs: Vec<Leg>,
        transport: TransportTable,
        max_leg_slope: f64,
    ) -> Result<Self, BuildError> {
        let suggested = suggested_budgets(&legs, &transport)?;
        Ok(Self {
            legs,
            transport,
            max_leg_slope,
            max_cost: suggested.max_cost,
            max_time: suggested.max_time,
            weights: ConstraintWeights::default(),
        })
    }

    /// Replace the constraint weights, returning `self` for chaining.
    #[must_use]
    pub fn with_weights(mut self, weights: ConstraintWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Number of decision variables the assembled model will have.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.legs.len() * self.transport.num_enabled()
    }
}

/// Errors from [`build_cqm`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The plan has no legs.
    #[error("a tour needs at least one leg")]
    NoLegs,
    /// Every locomotion mode is disabled.
    #[error("at least one locomotion mode must be enabled")]
    NoModesEnabled,
    /// The model rejected a constraint.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<crate::budget::BudgetError> for BuildError {
    fn from(err: crate::budget::BudgetError) -> Self {
        match err {
            crate::budget::BudgetError::NoLegs => Self::NoLegs,
            crate::budget::BudgetError::NoModesEnabled => Self::NoModesEnabled,
        }
    }
}

/// Assemble the constrained quadratic model for `plan`.
///
/// The objective minimises the negated total exercise, where a leg's
/// contribution under a mode is `exercise × length × uphill`. Constraints:
///
/// - `One-hot leg{i}`: exactly one mode per leg (hard);
/// - `Total cost`: `Σ cost × length ≤ max_cost`, hard or soft per the plan;
/// - `Total time`: `Σ length / speed ≤ max_time`, hard or soft per the plan;
/// - `Toll on leg {i}`: every toll-barred mode is pinned to zero (hard);
/// - `Slope on leg {i} ({mode})`: `uphill × var ≤ max_leg_slope` for each
///   slope-limited mode, hard or soft per the plan.
///
/// Toll and slope constraints referencing modes that are disabled are
/// skipped rather than failing; disabling every mode is an error.
///
/// # Errors
/// Returns a [`BuildError`] when the plan has no legs or no enabled modes.
pub fn build_cqm(plan: &TourPlan) -> Result<ConstrainedQuadraticModel<ModeVar>, BuildError> {
    if plan.legs.is_empty() {
        return Err(BuildError::NoLegs);
    }
    let active: Vec<(Locomotion, ModeProfile)> = plan
        .transport
        .enabled_profiles()
        .map(|(mode, profile)| (mode, *profile))
        .collect();
    if active.is_empty() {
        return Err(BuildError::NoModesEnabled);
    }

    let mut model = ConstrainedQuadraticModel::new();

    let mut exercise = Expression::zero();
    let mut cost = Expression::zero();
    let mut time = Expression::zero();
    for (index, leg) in plan.legs.iter().enumerate() {
        for (mode, profile) in &active {
            let var = ModeVar {
                mode: *mode,
                leg: index,
            };
            exercise.add_linear(var, profile.exercise * leg.length * leg.uphill);
            cost.add_linear(var, profile.cost * leg.length);
            time.add_linear(var, leg.length / profile.speed);
        }
    }
    model.set_objective(-exercise);

    for index in 0..plan.legs.len() {
        let choices = quicksum(active.iter().map(|(mode, _)| {
            Expression::variable(ModeVar {
                mode: *mode,
                leg: index,
            })
        }));
        model.add_constraint(format!("One-hot leg{index}"), Constraint::equal(choices, 1.0))?;
    }

    model.add_constraint(
        "Total cost",
        Constraint::less_equal(cost, plan.max_cost)
            .with_optional_weight(plan.weights.cost.soft_weight()),
    )?;
    model.add_constraint(
        "Total time",
        Constraint::less_equal(time, plan.max_time)
            .with_optional_weight(plan.weights.time.soft_weight()),
    )?;

    let barred: Vec<Locomotion> = active
        .iter()
        .map(|(mode, _)| *mode)
        .filter(|mode| mode.barred_by_toll())
        .collect();
    for (index, leg) in plan.legs.iter().enumerate() {
        if !leg.toll {
            continue;
        }
        if barred.is_empty() {
            debug!("leg {index} has a toll but no toll-barred mode is enabled; skipping");
            continue;
        }
        // One constraint per leg: a sum of binaries is zero iff each is.
        let pinned = quicksum(barred.iter().map(|mode| {
            Expression::variable(ModeVar {
                mode: *mode,
                leg: index,
            })
        }));
        model.add_constraint(
            format!("Toll on leg {index}"),
            Constraint::equal(pinned, 0.0),
        )?;
    }

    for (index, leg) in plan.legs.iter().enumerate() {
        for (mode, _) in active.iter().filter(|(mode, _)| mode.slope_limited()) {
            let var = ModeVar {
                mode: *mode,
                leg: index,
            };
            model.add_constraint(
                format!("Slope on leg {index} ({mode})"),
                Constraint::less_equal(Expression::term(var, leg.uphill), plan.max_leg_slope)
                    .with_optional_weight(plan.weights.slope.soft_weight()),
            )?;
        }
    }

    debug!(
        "assembled model: {} legs, {} modes, {} variables, {} constraints",
        plan.legs.len(),
        active.len(),
        model.num_variables(),
        model.num_constraints()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::WeightSpec;
    use ramble_cqm::{Penalty, Sense};
    use rstest::{fixture, rstest};

    fn leg(length: f64, uphill: f64, toll: bool) -> Leg {
        Leg {
            length,
            uphill,
            toll,
        }
    }

    /// The worked scenario: two legs, one tolled, all four modes enabled,
    /// hard cost budget and a soft (55, linear) time budget.
    #[fixture]
    fn two_leg_plan() -> TourPlan {
        TourPlan {
            legs: vec![leg(10.0, 5.0, false), leg(20.0, 10.0, true)],
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

    #[rstest]
    fn variable_count_is_modes_times_legs(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        assert_eq!(model.num_variables(), 8);
        assert_eq!(model.num_variables(), two_leg_plan.num_variables());
    }

    #[rstest]
    fn constraint_count_covers_one_hot_and_budgets(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        assert!(model.num_constraints() >= 2 + two_leg_plan.legs.len());
    }

    #[rstest]
    fn one_hot_constraint_mentions_every_enabled_mode(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        let one_hot = model
            .constraint("One-hot leg0")
            .expect("one-hot constraint for leg 0 exists");
        assert_eq!(one_hot.sense(), Sense::Eq);
        assert_eq!(one_hot.rhs(), 1.0);
        for mode in Locomotion::ALL {
            assert!(one_hot.lhs().mentions(&ModeVar { mode, leg: 0 }));
        }
        let rendered = one_hot.lhs().to_string();
        for fragment in ["walk_0", "cycle_0", "bus_0", "drive_0"] {
            assert!(rendered.contains(fragment), "missing {fragment} in {rendered}");
        }
    }

    #[rstest]
    fn budget_bounds_are_taken_verbatim(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        let cost = model.constraint("Total cost").expect("cost constraint exists");
        let time = model.constraint("Total time").expect("time constraint exists");
        assert_eq!(cost.rhs(), 10.0);
        assert_eq!(time.rhs(), 10.0);
        assert_eq!(cost.sense(), Sense::Le);
        assert_eq!(time.sense(), Sense::Le);
    }

    #[rstest]
    fn hard_cost_spec_keeps_cost_out_of_the_soft_set(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        let soft: Vec<&str> = model.soft_constraints().map(|(label, _)| label).collect();
        assert!(!soft.contains(&"Total cost"));
        assert!(soft.contains(&"Total time"));
    }

    #[rstest]
    fn soft_time_spec_carries_weight_and_penalty(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        let weight = model
            .constraint("Total time")
            .and_then(|c| c.weight())
            .expect("time constraint is soft");
        assert_eq!(weight.weight, 55.0);
        assert_eq!(weight.penalty, Penalty::Linear);
    }

    #[rstest]
    fn toll_legs_pin_the_drive_variable(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        assert!(model.constraint("Toll on leg 0").is_none());
        let toll = model
            .constraint("Toll on leg 1")
            .expect("toll constraint for leg 1 exists");
        assert_eq!(toll.sense(), Sense::Eq);
        assert_eq!(toll.rhs(), 0.0);
        assert!(toll.lhs().mentions(&ModeVar {
            mode: Locomotion::Drive,
            leg: 1,
        }));
        assert!(toll.is_hard());
    }

    #[rstest]
    fn a_tolled_leg_gets_one_constraint_covering_every_barred_mode(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        let toll_labels: Vec<&str> = model
            .constraints()
            .map(|(label, _)| label)
            .filter(|label| label.starts_with("Toll on leg"))
            .collect();
        assert_eq!(toll_labels, vec!["Toll on leg 1"]);
        let toll = model
            .constraint("Toll on leg 1")
            .expect("toll constraint for leg 1 exists");
        for mode in Locomotion::ALL.into_iter().filter(|m| m.barred_by_toll()) {
            assert!(toll.lhs().mentions(&ModeVar { mode, leg: 1 }));
        }
    }

    #[rstest]
    fn toll_constraints_are_skipped_when_drive_is_disabled(two_leg_plan: TourPlan) {
        let mut plan = two_leg_plan;
        plan.transport.set_enabled(Locomotion::Drive, false);
        let model = build_cqm(&plan).expect("plan is valid");
        assert!(model.constraint("Toll on leg 1").is_none());
        assert_eq!(model.num_variables(), 6);
    }

    #[rstest]
    fn slope_caps_cover_walk_and_cycle(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        for mode in [Locomotion::Walk, Locomotion::Cycle] {
            let slope = model
                .constraint(&format!("Slope on leg 1 ({mode})"))
                .expect("slope constraint exists");
            assert_eq!(slope.rhs(), 10.0);
            assert_eq!(
                slope.lhs().linear_coefficient(&ModeVar { mode, leg: 1 }),
                10.0
            );
        }
        assert!(model.constraint("Slope on leg 1 (bus)").is_none());
    }

    #[rstest]
    fn objective_negates_total_exercise(two_leg_plan: TourPlan) {
        let model = build_cqm(&two_leg_plan).expect("plan is valid");
        // Cycling leg 1: exercise 2 x length 20 x uphill 10 = 400.
        let coeff = model.objective().linear_coefficient(&ModeVar {
            mode: Locomotion::Cycle,
            leg: 1,
        });
        assert_eq!(coeff, -400.0);
        // Bus contributes no exercise anywhere.
        let bus = model.objective().linear_coefficient(&ModeVar {
            mode: Locomotion::Bus,
            leg: 0,
        });
        assert_eq!(bus, 0.0);
    }

    #[rstest]
    fn empty_plans_are_rejected(two_leg_plan: TourPlan) {
        let mut no_legs = two_leg_plan.clone();
        no_legs.legs.clear();
        assert_eq!(
            build_cqm(&no_legs).expect_err("empty tour should be rejected"),
            BuildError::NoLegs
        );

        let mut no_modes = two_leg_plan;
        for mode in Locomotion::ALL {
            no_modes.transport.set_enabled(mode, false);
        }
        assert_eq!(
            build_cqm(&no_modes).expect_err("empty mode set should be rejected"),
            BuildError::NoModesEnabled
        );
    }

    #[rstest]
    fn mode_var_labels_round_trip() {
        let var = ModeVar {
            mode: Locomotion::Cycle,
            leg: 7,
        };
        assert_eq!(var.to_string(), "cycle_7");
        assert_eq!("cycle_7".parse::<ModeVar>().expect("label should parse"), var);
        assert!("cycle".parse::<ModeVar>().is_err());
        assert!("rocket_1".parse::<ModeVar>().is_err());
        assert!("cycle_x".parse::<ModeVar>().is_err());
    }

    #[rstest]
    fn suggested_budget_constructor_fills_budgets(two_leg_plan: TourPlan) {
        let plan = TourPlan::with_suggested_budgets(
            two_leg_plan.legs.clone(),
            TransportTable::default(),
            8.0,
        )
        .expect("legs and transport are valid");
        // Total length 30, mean cost 2.5, slowest speed 1.
        assert_eq!(plan.max_cost, 75.0);
        assert_eq!(plan.max_time, 15.0);
        assert!(plan.weights.cost.is_hard());
    }
}
