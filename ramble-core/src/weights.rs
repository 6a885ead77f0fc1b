//! Hard/soft weighting for the tour's budget constraints.

use ramble_cqm::{Penalty, SoftWeight};

/// Whether a constraint must hold exactly or may be violated at a cost.
///
/// The hard case carries no weight by construction, so "hard if and only if
/// unweighted" cannot be violated by callers.
///
/// # Examples
/// ```
/// use ramble_core::{Penalty, WeightSpec};
///
/// assert!(WeightSpec::Hard.soft_weight().is_none());
/// let soft = WeightSpec::soft(55.0, Penalty::Linear);
/// assert_eq!(soft.soft_weight().map(|w| w.weight), Some(55.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WeightSpec {
    /// The constraint must be satisfied exactly.
    #[default]
    Hard,
    /// Violations are allowed, penalised by `weight` with the given shape.
    Soft {
        /// Penalty multiplier.
        weight: f64,
        /// Linear or quadratic violation scaling.
        penalty: Penalty,
    },
}

impl WeightSpec {
    /// A soft spec with the given weight and penalty shape.
    #[must_use]
    pub const fn soft(weight: f64, penalty: Penalty) -> Self {
        Self::Soft { weight, penalty }
    }

    /// True for the hard case.
    #[must_use]
    pub const fn is_hard(self) -> bool {
        matches!(self, Self::Hard)
    }

    /// The model-level weight, `None` for hard constraints.
    #[must_use]
    pub fn soft_weight(self) -> Option<SoftWeight> {
        match self {
            Self::Hard => None,
            Self::Soft { weight, penalty } => Some(SoftWeight { weight, penalty }),
        }
    }
}

/// Weight specs for the three configurable constraint families.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintWeights {
    /// Total-cost budget constraint.
    pub cost: WeightSpec,
    /// Total-time budget constraint.
    pub time: WeightSpec,
    /// Per-leg slope constraints.
    pub slope: WeightSpec,
}
