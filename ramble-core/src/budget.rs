//! Budget boundary estimation for a tour.
//!
//! Pure arithmetic over legs and enabled modes, used to pre-populate
//! sensible budget ranges before a model is built. No constraint semantics
//! live here.

use thiserror::Error;

use crate::leg::Leg;
use crate::transport::TransportTable;

/// Errors from the budget estimators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// The tour has no legs.
    #[error("a tour needs at least one leg")]
    NoLegs,
    /// Every mode is disabled.
    #[error("at least one locomotion mode must be enabled")]
    NoModesEnabled,
}

/// Minimum, maximum and average of an achievable total.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    /// Smallest achievable total.
    pub min: f64,
    /// Largest achievable total.
    pub max: f64,
    /// Mean total across enabled modes.
    pub average: f64,
}

/// Achievable cost and time ranges for a tour.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BudgetBoundaries {
    /// Total-cost range across single-mode tours.
    pub cost: Bounds,
    /// Total-time range across single-mode tours.
    pub time: Bounds,
}

/// Default budget values in the style of the original demo.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuggestedBudgets {
    /// Suggested cost budget: total length times the mean mode cost.
    pub max_cost: f64,
    /// Suggested time budget: half the duration of the slowest mode.
    pub max_time: f64,
}

/// Compute the achievable cost and time ranges for `legs`.
///
/// Each enabled mode is priced as if it covered the whole tour; the bounds
/// are taken across those single-mode totals.
///
/// # Errors
/// Returns a [`BudgetError`] when `legs` is empty or no mode is enabled.
///
/// # Examples
/// ```
/// use ramble_core::{budget_boundaries, Leg, TransportTable};
///
/// let legs = vec![Leg { length: 10.0, uphill: 0.0, toll: false }];
/// let bounds = budget_boundaries(&legs, &TransportTable::default())?;
/// assert_eq!(bounds.cost.min, 0.0);  // walking is free
/// assert_eq!(bounds.cost.max, 50.0); // driving costs 5 per unit
/// # Ok::<(), ramble_core::BudgetError>(())
/// ```
pub fn budget_boundaries(
    legs: &[Leg],
    transport: &TransportTable,
) -> Result<BudgetBoundaries, BudgetError> {
    let total_length = total_length(legs)?;

    let mut costs = Vec::new();
    let mut times = Vec::new();
    for (_, profile) in transport.enabled_profiles() {
        costs.push(total_length * profile.cost);
        times.push(total_length / profile.speed);
    }
    if costs.is_empty() {
        return Err(BudgetError::NoModesEnabled);
    }

    Ok(BudgetBoundaries {
        cost: bounds_of(&costs),
        time: bounds_of(&times),
    })
}

/// Compute the original demo's default budgets for `legs`.
///
/// # Errors
/// Returns a [`BudgetError`] when `legs` is empty or no mode is enabled.
pub fn suggested_budgets(
    legs: &[Leg],
    transport: &TransportTable,
) -> Result<SuggestedBudgets, BudgetError> {
    let total_length = total_length(legs)?;

    let mut cost_sum = 0.0;
    let mut count = 0_usize;
    let mut slowest: Option<f64> = None;
    for (_, profile) in transport.enabled_profiles() {
        cost_sum += profile.cost;
        count += 1;
        slowest = Some(slowest.map_or(profile.speed, |speed| speed.min(profile.speed)));
    }
    let Some(slowest) = slowest else {
        return Err(BudgetError::NoModesEnabled);
    };

    #[expect(clippy::cast_precision_loss, reason = "mode counts are tiny")]
    let mean_cost = cost_sum / count as f64;
    Ok(SuggestedBudgets {
        max_cost: total_length * mean_cost,
        max_time: 0.5 * total_length / slowest,
    })
}

fn total_length(legs: &[Leg]) -> Result<f64, BudgetError> {
    if legs.is_empty() {
        return Err(BudgetError::NoLegs);
    }
    Ok(legs.iter().map(|leg| leg.length).sum())
}

fn bounds_of(values: &[f64]) -> Bounds {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &value in values {
        min = min.min(value);
        max = max.max(value);
        sum += value;
    }
    #[expect(clippy::cast_precision_loss, reason = "mode counts are tiny")]
    let average = sum / values.len() as f64;
    Bounds { min, max, average }
}
