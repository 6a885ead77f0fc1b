//! Constrained models: an objective plus named hard and soft constraints.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::expr::Expression;
use crate::sampleset::Sample;

/// Tolerance within which a constraint counts as satisfied.
///
/// Comparisons on accumulated floating-point sums need slack; exact equality
/// would reject arithmetically equivalent assignments.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// How a soft constraint's violation is scaled into a penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Penalty {
    /// Penalty grows linearly with the violation amount.
    Linear,
    /// Penalty grows with the square of the violation amount.
    Quadratic,
}

impl fmt::Display for Penalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Quadratic => write!(f, "quadratic"),
        }
    }
}

/// Weight and penalty shape of a soft constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftWeight {
    /// Multiplier applied to the (scaled) violation.
    pub weight: f64,
    /// Linear or quadratic violation scaling.
    pub penalty: Penalty,
}

impl SoftWeight {
    /// Penalty energy contributed by a violation of `amount`.
    #[must_use]
    pub fn penalty_for(&self, amount: f64) -> f64 {
        match self.penalty {
            Penalty::Linear => self.weight * amount,
            Penalty::Quadratic => self.weight * amount * amount,
        }
    }
}

/// Comparison direction of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Sense {
    /// Left-hand side must not exceed the bound.
    Le,
    /// Left-hand side must reach at least the bound.
    Ge,
    /// Left-hand side must equal the bound.
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Le => write!(f, "<="),
            Self::Ge => write!(f, ">="),
            Self::Eq => write!(f, "=="),
        }
    }
}

/// A single constraint: `lhs sense rhs`, hard unless weighted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "V: serde::Deserialize<'de> + Ord")))]
pub struct Constraint<V: Ord> {
    lhs: Expression<V>,
    sense: Sense,
    rhs: f64,
    weight: Option<SoftWeight>,
}

impl<V: Ord> Constraint<V> {
    /// Build `lhs <= rhs`.
    #[must_use]
    pub fn less_equal(lhs: Expression<V>, rhs: f64) -> Self {
        Self {
            lhs,
            sense: Sense::Le,
            rhs,
            weight: None,
        }
    }

    /// Build `lhs >= rhs`.
    #[must_use]
    pub fn greater_equal(lhs: Expression<V>, rhs: f64) -> Self {
        Self {
            lhs,
            sense: Sense::Ge,
            rhs,
            weight: None,
        }
    }

    /// Build `lhs == rhs`.
    #[must_use]
    pub fn equal(lhs: Expression<V>, rhs: f64) -> Self {
        Self {
            lhs,
            sense: Sense::Eq,
            rhs,
            weight: None,
        }
    }

    /// Mark the constraint soft with the given weight, consuming `self`.
    #[must_use]
    pub fn with_weight(mut self, weight: SoftWeight) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Apply an optional weight: `None` leaves the constraint hard.
    #[must_use]
    pub fn with_optional_weight(mut self, weight: Option<SoftWeight>) -> Self {
        self.weight = weight;
        self
    }

    /// The left-hand-side expression.
    #[must_use]
    pub fn lhs(&self) -> &Expression<V> {
        &self.lhs
    }

    /// The comparison direction.
    #[must_use]
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// The right-hand-side bound.
    #[must_use]
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// The soft weight, `None` for hard constraints.
    #[must_use]
    pub fn weight(&self) -> Option<SoftWeight> {
        self.weight
    }

    /// True when the constraint must hold exactly.
    #[must_use]
    pub fn is_hard(&self) -> bool {
        self.weight.is_none()
    }

    /// Amount by which `sample` violates the constraint; zero when satisfied.
    #[must_use]
    pub fn violation(&self, sample: &Sample<V>) -> f64 {
        let lhs = self.lhs.evaluate(sample);
        match self.sense {
            Sense::Le => (lhs - self.rhs).max(0.0),
            Sense::Ge => (self.rhs - lhs).max(0.0),
            Sense::Eq => (lhs - self.rhs).abs(),
        }
    }

    /// True when the violation is within [`FEASIBILITY_TOLERANCE`].
    #[must_use]
    pub fn is_satisfied(&self, sample: &Sample<V>) -> bool {
        self.violation(sample) <= FEASIBILITY_TOLERANCE
    }
}

/// Errors from assembling a [`ConstrainedQuadraticModel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A constraint label was reused.
    ///
    /// Labels identify constraints to solvers and in diagnostics, so each
    /// must be unique within a model.
    #[error("duplicate constraint label: {0}")]
    DuplicateLabel(String),
}

/// An objective with a set of uniquely named constraints.
///
/// Constraints keep insertion order. Feasibility considers hard constraints
/// only; soft constraints contribute penalty energy instead.
///
/// # Examples
/// ```
/// use ramble_cqm::{Constraint, ConstrainedQuadraticModel, Expression, quicksum};
///
/// # fn main() -> Result<(), ramble_cqm::ModelError> {
/// let mut model = ConstrainedQuadraticModel::new();
/// model.set_objective(-Expression::term("x", 2.0));
/// model.add_constraint(
///     "pick one",
///     Constraint::equal(quicksum([Expression::variable("x"), Expression::variable("y")]), 1.0),
/// )?;
/// assert_eq!(model.num_variables(), 2);
/// assert_eq!(model.num_constraints(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "V: serde::Deserialize<'de> + Ord")))]
pub struct ConstrainedQuadraticModel<V: Ord> {
    objective: Expression<V>,
    constraints: Vec<(String, Constraint<V>)>,
}

impl<V: Ord> ConstrainedQuadraticModel<V> {
    /// An empty model with a zero objective.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objective: Expression::zero(),
            constraints: Vec::new(),
        }
    }

    /// Replace the objective. Solvers minimise this expression.
    pub fn set_objective(&mut self, objective: Expression<V>) {
        self.objective = objective;
    }

    /// The current objective.
    #[must_use]
    pub fn objective(&self) -> &Expression<V> {
        &self.objective
    }

    /// Add a named constraint.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateLabel`] when `label` is already used.
    pub fn add_constraint(
        &mut self,
        label: impl Into<String>,
        constraint: Constraint<V>,
    ) -> Result<(), ModelError> {
        let label = label.into();
        if self.constraints.iter().any(|(existing, _)| *existing == label) {
            return Err(ModelError::DuplicateLabel(label));
        }
        self.constraints.push((label, constraint));
        Ok(())
    }

    /// Look up a constraint by label.
    #[must_use]
    pub fn constraint(&self, label: &str) -> Option<&Constraint<V>> {
        self.constraints
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, constraint)| constraint)
    }

    /// Iterate over `(label, constraint)` pairs in insertion order.
    pub fn constraints(&self) -> impl Iterator<Item = (&str, &Constraint<V>)> {
        self.constraints
            .iter()
            .map(|(label, constraint)| (label.as_str(), constraint))
    }

    /// Iterate over the soft constraints only.
    pub fn soft_constraints(&self) -> impl Iterator<Item = (&str, &Constraint<V>)> {
        self.constraints().filter(|(_, c)| !c.is_hard())
    }

    /// Number of constraints, hard and soft.
    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value of `sample`; soft penalties are not included.
    #[must_use]
    pub fn energy(&self, sample: &Sample<V>) -> f64 {
        self.objective.evaluate(sample)
    }

    /// Total penalty energy from violated soft constraints under `sample`.
    #[must_use]
    pub fn soft_penalty(&self, sample: &Sample<V>) -> f64 {
        self.constraints
            .iter()
            .filter_map(|(_, constraint)| {
                constraint
                    .weight()
                    .map(|weight| weight.penalty_for(constraint.violation(sample)))
            })
            .sum()
    }

    /// Labels and violation amounts of hard constraints `sample` breaks.
    #[must_use]
    pub fn violations(&self, sample: &Sample<V>) -> Vec<(&str, f64)> {
        self.constraints
            .iter()
            .filter(|(_, constraint)| constraint.is_hard())
            .filter_map(|(label, constraint)| {
                let amount = constraint.violation(sample);
                (amount > FEASIBILITY_TOLERANCE).then_some((label.as_str(), amount))
            })
            .collect()
    }

    /// True when every hard constraint holds under `sample`.
    #[must_use]
    pub fn check_feasible(&self, sample: &Sample<V>) -> bool {
        self.constraints
            .iter()
            .filter(|(_, constraint)| constraint.is_hard())
            .all(|(_, constraint)| constraint.is_satisfied(sample))
    }
}

impl<V: Clone + Ord> ConstrainedQuadraticModel<V> {
    /// Every variable mentioned by the objective or any constraint.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<V> {
        let mut out = BTreeSet::new();
        self.objective.collect_variables(&mut out);
        for (_, constraint) in &self.constraints {
            constraint.lhs().collect_variables(&mut out);
        }
        out
    }

    /// Number of distinct variables in the model.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.variables().len()
    }
}
