//! Command-line interface for the ramble tour-planning engine.
#![forbid(unsafe_code)]

mod commands;
mod tour;

use clap::{Parser, Subcommand};
use thiserror::Error;

use ramble_core::{BudgetError, BuildError, ItineraryError, LegError, SampleError};
use ramble_solver_hybrid::ClientBuildError;

pub use tour::TourArgs;

/// Run the ramble CLI with the current process arguments.
///
/// # Errors
/// Returns a [`CliError`] for invalid arguments, model assembly failures,
/// or solver failures.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Plan(args) => commands::run_plan(&args, &mut stdout),
        Command::Model(args) => commands::run_model(&args, &mut stdout),
        Command::Solve(args) => commands::run_solve(&args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "ramble",
    about = "Plan multi-modal tours with a constrained quadratic model",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate tour legs and report budget boundaries.
    Plan(commands::PlanArgs),
    /// Assemble the tour model and print a summary.
    Model(commands::ModelArgs),
    /// Submit the tour model to a remote hybrid solver.
    Solve(commands::SolveArgs),
}

/// Errors emitted by the ramble CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// The requested tour shape is invalid.
    #[error("invalid tour shape: {0}")]
    LegSpec(#[from] LegError),
    /// Budgets could not be derived from the tour.
    #[error("cannot derive budgets: {0}")]
    Budget(#[from] BudgetError),
    /// Model assembly failed.
    #[error("failed to assemble the tour model: {0}")]
    BuildModel(#[from] BuildError),
    /// The hybrid sampler could not be constructed.
    #[error("failed to build hybrid sampler for {endpoint}: {source}")]
    BuildSampler {
        /// Endpoint the sampler was aimed at.
        endpoint: String,
        /// Underlying construction failure.
        source: ClientBuildError,
    },
    /// The solver failed to produce an answer.
    #[error("sampling failed: {0}")]
    Sample(#[from] SampleError),
    /// The solver's answer could not be decoded.
    #[error("answer could not be decoded: {0}")]
    DecodeItinerary(#[from] ItineraryError),
    /// Output serialization failed.
    #[error("failed to serialise output: {0}")]
    Serialise(#[from] serde_json::Error),
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    WriteOutput(#[from] std::io::Error),
}
