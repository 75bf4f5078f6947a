//! Scenario comparison and readiness metrics
//!
//! ```ignore
//! use drawdown_core::analysis::{Override, Scenario, compare};
//!
//! let comparison = compare(
//!     &baseline,
//!     &[
//!         Scenario::new("Retire later").with(Override::AdjustStartingBalance(60_000.0)),
//!         Scenario::new("Spend less").with(Override::AdjustMonthlyExpenses(-400.0)),
//!     ],
//! )?;
//!
//! for scenario in &comparison.scenarios {
//!     println!("{}: {:+} months", scenario.name, scenario.delta.months_funded);
//! }
//! ```

mod metrics;
mod scenario;

pub use metrics::{
    DEFAULT_WITHDRAWAL_RATE, MAX_YEARS_TO_TARGET, Readiness, RunwaySummary, projected_balance,
    safe_monthly_spend, target_nest_egg, withdrawal_rate, years_until_target,
};
pub use scenario::{
    Comparison, EXPENSE_ADJUSTMENT_STREAM, Override, Scenario, ScenarioDelta, ScenarioResult,
    compare,
};
