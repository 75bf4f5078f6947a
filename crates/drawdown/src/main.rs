use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, bail};
use drawdown::data::save_plan;
use drawdown::report::{
    ProjectionReport, format_comparison, format_projection, format_readiness, format_solve,
    to_json,
};
use drawdown::{PlanData, init_logging, load_plan, to_scenarios, to_simulation_input};
use drawdown_core::analysis::{DEFAULT_WITHDRAWAL_RATE, Readiness, compare};
use drawdown_core::config::SimulationInput;
use drawdown_core::simulate;
use drawdown_core::solver::{FreeVariable, SolveRequest, SolverConfig, Target, solve};
use jiff::civil::Date;

#[derive(Parser, Debug)]
#[command(name = "drawdown")]
#[command(about = "Project how long retirement savings last and solve for what is affordable")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Date ages are computed from (YYYY-MM-DD, default: today)
    #[arg(long, global = true)]
    as_of: Option<Date>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter plan file to edit
    Init {
        /// Where to write the plan
        #[arg(short, long)]
        plan: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Project the balance month by month
    Project {
        /// Path to the plan file
        #[arg(short, long)]
        plan: PathBuf,

        /// Project this many years instead of until the plan-until age
        #[arg(short, long)]
        years: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Solve for a withdrawal, a starting balance or the months until depletion
    Solve {
        /// Path to the plan file
        #[arg(short, long)]
        plan: PathBuf,

        #[command(flatten)]
        solve_for: SolveFor,

        /// Expense stream to vary instead of adding a separate withdrawal
        #[arg(long, requires = "withdrawal")]
        stream: Option<String>,

        /// Money must last this many years
        #[arg(long, conflicts_with = "deplete_at_age")]
        target_years: Option<u32>,

        /// Money should run out by this age
        #[arg(long)]
        deplete_at_age: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Compare the plan's what-if scenarios against the baseline
    Compare {
        /// Path to the plan file
        #[arg(short, long)]
        plan: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct SolveFor {
    /// Monthly withdrawal
    #[arg(long)]
    withdrawal: bool,

    /// Starting balance
    #[arg(long)]
    balance: bool,

    /// Months until the balance runs out
    #[arg(long)]
    horizon: bool,
}

impl SolveFor {
    fn variable(&self, stream: Option<String>) -> FreeVariable {
        if self.balance {
            FreeVariable::StartingBalance
        } else if self.horizon {
            FreeVariable::Horizon
        } else {
            FreeVariable::Withdrawal { stream }
        }
    }
}

fn load_input(path: &Path, as_of: Date) -> color_eyre::Result<(PlanData, SimulationInput)> {
    let plan = load_plan(path)?;
    let input = to_simulation_input(&plan, as_of)
        .wrap_err_with(|| format!("invalid plan {}", path.display()))?;
    Ok((plan, input))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let as_of = args.as_of.unwrap_or_else(|| jiff::Zoned::now().date());
    tracing::debug!(%as_of, "Ages computed as of");

    match args.command {
        Command::Init { plan, force } => {
            if plan.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", plan.display());
            }
            save_plan(&plan, &PlanData::sample())?;
            tracing::info!(path = %plan.display(), "Wrote starter plan");
        }

        Command::Project { plan, years, json } => {
            let (data, mut input) = load_input(&plan, as_of)?;
            let readiness = Readiness::new(
                &input,
                data.personal.retirement_age,
                DEFAULT_WITHDRAWAL_RATE,
            );
            if let Some(years) = years {
                input = input.with_horizon_months(years * 12);
            }
            let result = simulate(&input)?;
            if json {
                let report = ProjectionReport {
                    readiness: &readiness,
                    projection: &result,
                };
                println!("{}", to_json(&report)?);
            } else {
                print!("{}", format_projection(&result, as_of));
                println!();
                print!("{}", format_readiness(&readiness));
            }
        }

        Command::Solve {
            plan,
            solve_for,
            stream,
            target_years,
            deplete_at_age,
            json,
        } => {
            let (_, mut input) = load_input(&plan, as_of)?;
            if let Some(years) = target_years {
                input = input.with_horizon_months(years * 12);
            }
            let target = match deplete_at_age {
                Some(age) => Target::DepletedByAge { age },
                None => Target::Sustained,
            };
            let request = SolveRequest::new(solve_for.variable(stream), target);
            tracing::info!(
                variable = request.variable.name(),
                target = request.target.name(),
                "Solving"
            );

            let solved = solve(&input, &request, &SolverConfig::default())?;
            if json {
                println!("{}", to_json(&solved)?);
            } else {
                print!("{}", format_solve(&solved, as_of));
            }
        }

        Command::Compare { plan, json } => {
            let (data, input) = load_input(&plan, as_of)?;
            let scenarios = to_scenarios(&data, input.current_age);
            let comparison = compare(&input, &scenarios)?;
            if json {
                println!("{}", to_json(&comparison)?);
            } else {
                print!("{}", format_comparison(&comparison, as_of));
            }
        }
    }

    Ok(())
}
