//! Exhaustive enumeration of small models.
//!
//! Intended for tests: enumerate every assignment of a model's binary
//! variables, score each one, and return the full energy-ordered sample set.
//! The variable count is capped because the search space doubles per
//! variable.

use thiserror::Error;

use crate::model::ConstrainedQuadraticModel;
use crate::sampleset::{Sample, SampleRecord, SampleSet};

/// Upper bound on variables accepted by [`enumerate`].
pub const MAX_EXACT_VARIABLES: usize = 20;

/// Errors from [`enumerate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExactError {
    /// The model mentions more variables than can be enumerated.
    #[error("model has {0} variables, exhaustive enumeration is capped at {MAX_EXACT_VARIABLES}")]
    TooManyVariables(usize),
}

/// Score every assignment of the model's variables.
///
/// # Errors
/// Returns [`ExactError::TooManyVariables`] when the model exceeds
/// [`MAX_EXACT_VARIABLES`] variables.
pub fn enumerate<V: Clone + Ord>(
    model: &ConstrainedQuadraticModel<V>,
) -> Result<SampleSet<V>, ExactError> {
    let variables: Vec<V> = model.variables().into_iter().collect();
    if variables.len() > MAX_EXACT_VARIABLES {
        return Err(ExactError::TooManyVariables(variables.len()));
    }

    let count = 1_u32 << variables.len();
    let mut records = Vec::with_capacity(count as usize);
    for mask in 0..count {
        let sample: Sample<V> = variables
            .iter()
            .enumerate()
            .map(|(bit, label)| (label.clone(), mask & (1 << bit) != 0))
            .collect();
        let energy = model.energy(&sample);
        let is_feasible = model.check_feasible(&sample);
        records.push(SampleRecord {
            sample,
            energy,
            is_feasible,
        });
    }
    Ok(SampleSet::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constraint, Expression, quicksum};
    use rstest::rstest;

    #[rstest]
    fn finds_the_constrained_optimum() {
        // Maximise 3a + 2b subject to picking exactly one of the two.
        let mut model = ConstrainedQuadraticModel::new();
        model.set_objective(-(Expression::term("a", 3.0) + Expression::term("b", 2.0)));
        model
            .add_constraint(
                "pick one",
                Constraint::equal(
                    quicksum([Expression::variable("a"), Expression::variable("b")]),
                    1.0,
                ),
            )
            .expect("label should be accepted");

        let set = enumerate(&model).expect("two variables enumerate fine");
        assert_eq!(set.len(), 4);
        let best = set.best_feasible().expect("a feasible assignment exists");
        assert_eq!(best.energy, -3.0);
        assert_eq!(best.sample.get(&"a"), Some(true));
        assert_eq!(best.sample.get(&"b"), Some(false));
    }

    #[rstest]
    fn unconstrained_minimum_can_be_infeasible() {
        let mut model = ConstrainedQuadraticModel::new();
        model.set_objective(-(Expression::term("a", 3.0) + Expression::term("b", 2.0)));
        model
            .add_constraint(
                "pick one",
                Constraint::equal(
                    quicksum([Expression::variable("a"), Expression::variable("b")]),
                    1.0,
                ),
            )
            .expect("label should be accepted");

        let set = enumerate(&model).expect("two variables enumerate fine");
        let first = set.first().expect("set is non-empty");
        assert_eq!(first.energy, -5.0);
        assert!(!first.is_feasible);
    }

    #[rstest]
    fn oversized_models_are_rejected() {
        let mut model = ConstrainedQuadraticModel::new();
        model.set_objective(quicksum((0..=MAX_EXACT_VARIABLES).map(Expression::variable)));
        let err = enumerate(&model).expect_err("cap should be enforced");
        assert_eq!(err, ExactError::TooManyVariables(MAX_EXACT_VARIABLES + 1));
    }
}
