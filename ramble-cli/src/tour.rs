//! Shared tour-shape arguments for the plan, model and solve commands.

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use ramble_core::{
    ConstraintWeights, Leg, LegSpec, Penalty, TourPlan, TransportTable, WeightSpec, generate_legs,
};

use crate::CliError;

/// Arguments describing the tour to generate and the budgets to apply.
#[derive(Debug, Clone, Parser)]
pub struct TourArgs {
    /// Number of legs in the tour.
    #[arg(long, default_value_t = 10, value_name = "count")]
    pub legs: usize,
    /// Shortest possible leg length.
    #[arg(long, default_value_t = 2.0, value_name = "length")]
    pub min_length: f64,
    /// Longest possible leg length.
    #[arg(long, default_value_t = 10.0, value_name = "length")]
    pub max_length: f64,
    /// Steepest climb a generated leg may have.
    #[arg(long, default_value_t = 8.0, value_name = "slope")]
    pub max_slope: f64,
    /// Generate the tour without toll legs.
    #[arg(long)]
    pub no_tolls: bool,
    /// Seed for reproducible leg generation.
    #[arg(long, value_name = "seed")]
    pub seed: Option<u64>,
    /// Cost budget (defaults to the suggested value for the tour).
    #[arg(long, value_name = "amount")]
    pub max_cost: Option<f64>,
    /// Time budget (defaults to the suggested value for the tour).
    #[arg(long, value_name = "amount")]
    pub max_time: Option<f64>,
    /// Soften the cost budget with a linear penalty of this weight.
    #[arg(long, value_name = "weight")]
    pub soft_cost: Option<f64>,
    /// Soften the time budget with a linear penalty of this weight.
    #[arg(long, value_name = "weight")]
    pub soft_time: Option<f64>,
}

impl TourArgs {
    /// The leg-generation parameters these arguments describe.
    #[must_use]
    pub fn leg_spec(&self) -> LegSpec {
        LegSpec {
            count: self.legs,
            min_length: self.min_length,
            max_length: self.max_length,
            max_slope: self.max_slope,
            tolls_enabled: !self.no_tolls,
        }
    }

    /// Generate the tour's legs, seeding the generator when requested.
    ///
    /// # Errors
    /// Returns [`CliError::LegSpec`] when the shape arguments are invalid.
    pub fn generate(&self) -> Result<Vec<Leg>, CliError> {
        let mut rng = self
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        Ok(generate_legs(&self.leg_spec(), &mut rng)?)
    }

    /// Generate legs and resolve a full plan with budgets and weights.
    ///
    /// # Errors
    /// Returns a [`CliError`] when the shape is invalid or budgets cannot
    /// be derived.
    pub fn resolve_plan(&self) -> Result<TourPlan, CliError> {
        self.plan_for(self.generate()?)
    }

    /// Resolve a plan around already-generated legs.
    ///
    /// # Errors
    /// Returns a [`CliError`] when budgets cannot be derived.
    pub fn plan_for(&self, legs: Vec<Leg>) -> Result<TourPlan, CliError> {
        let mut plan =
            TourPlan::with_suggested_budgets(legs, TransportTable::default(), self.max_slope)?;
        if let Some(max_cost) = self.max_cost {
            plan.max_cost = max_cost;
        }
        if let Some(max_time) = self.max_time {
            plan.max_time = max_time;
        }
        let weights = ConstraintWeights {
            cost: soft_spec(self.soft_cost),
            time: soft_spec(self.soft_time),
            ..ConstraintWeights::default()
        };
        Ok(plan.with_weights(weights))
    }
}

fn soft_spec(weight: Option<f64>) -> WeightSpec {
    weight.map_or(WeightSpec::Hard, |weight| {
        WeightSpec::soft(weight, Penalty::Linear)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(extra: &[&str]) -> TourArgs {
        let mut argv = vec!["tour"];
        argv.extend_from_slice(extra);
        TourArgs::try_parse_from(argv).expect("arguments should parse")
    }

    #[rstest]
    fn defaults_match_the_stock_tour_shape() {
        let spec = args(&[]).leg_spec();
        assert_eq!(spec, LegSpec::default());
    }

    #[rstest]
    fn seeded_generation_is_reproducible() {
        let tour = args(&["--seed", "7", "--legs", "4"]);
        let first = tour.generate().expect("shape is valid");
        let second = tour.generate().expect("shape is valid");
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[rstest]
    fn budget_overrides_replace_the_suggestions() {
        let tour = args(&["--seed", "1", "--max-cost", "12.5", "--max-time", "3.0"]);
        let plan = tour.resolve_plan().expect("shape is valid");
        assert_eq!(plan.max_cost, 12.5);
        assert_eq!(plan.max_time, 3.0);
    }

    #[rstest]
    fn soft_flags_soften_the_budgets() {
        let tour = args(&["--seed", "1", "--soft-time", "55"]);
        let plan = tour.resolve_plan().expect("shape is valid");
        assert!(plan.weights.cost.is_hard());
        assert_eq!(
            plan.weights.time,
            WeightSpec::soft(55.0, Penalty::Linear)
        );
    }

    #[rstest]
    fn no_tolls_suppresses_tollbooths() {
        let tour = args(&["--seed", "3", "--legs", "50", "--no-tolls"]);
        let legs = tour.generate().expect("shape is valid");
        assert!(legs.iter().all(|leg| !leg.toll));
    }

    #[rstest]
    fn invalid_length_range_is_rejected() {
        let tour = args(&["--min-length", "9", "--max-length", "2"]);
        assert!(matches!(
            tour.generate().expect_err("range is inverted"),
            CliError::LegSpec(_)
        ));
    }
}
