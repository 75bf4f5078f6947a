//! Command-line host for the drawdown engine
//!
//! Loads a YAML plan record, converts it into engine input, runs projections,
//! solves and scenario comparisons, and formats the results.

pub mod data;
pub mod logging;
pub mod report;

pub use data::{PlanData, load_plan, to_scenarios, to_simulation_input};
pub use logging::init_logging;
