//! Implementations of the plan, model and solve commands.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;

use ramble_core::{
    BudgetBoundaries, CqmSampler, Itinerary, Leg, SamplerParams, SuggestedBudgets,
    budget_boundaries, build_cqm, suggested_budgets,
};
use ramble_solver_hybrid::{HybridClientConfig, HybridSampler};

use crate::CliError;
use crate::tour::TourArgs;

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(about = "Generate tour legs and report budget boundaries")]
pub(crate) struct PlanArgs {
    #[command(flatten)]
    pub(crate) tour: TourArgs,
    /// Print the plan as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

/// CLI arguments for the `model` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(about = "Assemble the tour model and print a summary")]
pub(crate) struct ModelArgs {
    #[command(flatten)]
    pub(crate) tour: TourArgs,
    /// Print the full model as JSON instead of a summary.
    #[arg(long)]
    pub(crate) json: bool,
}

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(
    long_about = "Generate a tour, assemble its model, submit the model to a \
                 hybrid solver endpoint, and print the decoded itinerary as \
                 JSON.",
    about = "Submit the tour model to a remote hybrid solver"
)]
pub(crate) struct SolveArgs {
    #[command(flatten)]
    pub(crate) tour: TourArgs,
    /// Base URL of the hybrid solver service.
    #[arg(long, value_name = "url")]
    pub(crate) endpoint: String,
    /// Solver-side time limit, in seconds.
    #[arg(long, default_value_t = 5.0, value_name = "seconds")]
    pub(crate) time_limit: f64,
    /// Label attached to the submission.
    #[arg(long, default_value = "tour assignment", value_name = "text")]
    pub(crate) label: String,
    /// Give up polling after this many seconds.
    #[arg(long, value_name = "seconds")]
    pub(crate) deadline: Option<f64>,
}

/// Printable plan: legs plus the budget ranges they imply.
#[derive(Debug, Clone, Serialize)]
struct PlanReport {
    legs: Vec<Leg>,
    boundaries: BudgetBoundaries,
    suggested: SuggestedBudgets,
}

pub(crate) fn run_plan(args: &PlanArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let legs = args.tour.generate()?;
    let transport = ramble_core::TransportTable::default();
    let report = PlanReport {
        boundaries: budget_boundaries(&legs, &transport)?,
        suggested: suggested_budgets(&legs, &transport)?,
        legs,
    };

    if args.json {
        write_json(writer, &report)?;
        return Ok(());
    }

    for (index, leg) in report.legs.iter().enumerate() {
        let toll = if leg.toll { ", toll" } else { "" };
        writeln!(
            writer,
            "leg {index:>2}: length {:.1}, uphill {:.1}{toll}",
            leg.length, leg.uphill
        )?;
    }
    let total: f64 = report.legs.iter().map(|leg| leg.length).sum();
    writeln!(writer, "total length {total:.1}")?;
    writeln!(
        writer,
        "cost: min {:.1}, max {:.1}, average {:.1}",
        report.boundaries.cost.min, report.boundaries.cost.max, report.boundaries.cost.average
    )?;
    writeln!(
        writer,
        "time: min {:.1}, max {:.1}, average {:.1}",
        report.boundaries.time.min, report.boundaries.time.max, report.boundaries.time.average
    )?;
    writeln!(
        writer,
        "suggested budgets: cost {:.1}, time {:.1}",
        report.suggested.max_cost, report.suggested.max_time
    )?;
    Ok(())
}

pub(crate) fn run_model(args: &ModelArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let plan = args.tour.resolve_plan()?;
    let model = build_cqm(&plan)?;

    if args.json {
        write_json(writer, &model)?;
        return Ok(());
    }

    writeln!(writer, "variables: {}", model.num_variables())?;
    writeln!(writer, "constraints: {}", model.num_constraints())?;
    let soft: Vec<&str> = model.soft_constraints().map(|(label, _)| label).collect();
    if soft.is_empty() {
        writeln!(writer, "soft constraints: none")?;
    } else {
        writeln!(writer, "soft constraints: {}", soft.join(", "))?;
    }
    writeln!(
        writer,
        "budgets: cost {:.1}, time {:.1}",
        plan.max_cost, plan.max_time
    )?;
    Ok(())
}

/// Builds the sampler used by a solve invocation.
pub(crate) trait SamplerBuilder {
    fn build(&self, args: &SolveArgs) -> Result<Box<dyn CqmSampler>, CliError>;
}

pub(crate) struct HybridSamplerBuilder;

impl SamplerBuilder for HybridSamplerBuilder {
    fn build(&self, args: &SolveArgs) -> Result<Box<dyn CqmSampler>, CliError> {
        let mut config = HybridClientConfig::new(args.endpoint.clone());
        if let Some(deadline) = args.deadline {
            config = config.with_poll_deadline(Duration::from_secs_f64(deadline));
        }
        let sampler =
            HybridSampler::with_config(config).map_err(|source| CliError::BuildSampler {
                endpoint: args.endpoint.clone(),
                source,
            })?;
        Ok(Box::new(sampler))
    }
}

pub(crate) fn run_solve(args: &SolveArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    run_solve_with(args, &HybridSamplerBuilder, writer)
}

pub(crate) fn run_solve_with(
    args: &SolveArgs,
    builder: &dyn SamplerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let itinerary = execute_solve(args, builder)?;
    write_json(writer, &itinerary)
}

fn execute_solve(args: &SolveArgs, builder: &dyn SamplerBuilder) -> Result<Itinerary, CliError> {
    let plan = args.tour.resolve_plan()?;
    let model = build_cqm(&plan)?;
    let sampler = builder.build(args)?;
    let params = SamplerParams {
        label: args.label.clone(),
        time_limit: Duration::from_secs_f64(args.time_limit),
    };
    let samples = sampler.sample(&model, &params)?;
    Ok(Itinerary::from_sampleset(&plan, &samples)?)
}

fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value)?;
    writer.write_all(payload.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}
