//! Retirement drawdown projection library
//!
//! This crate projects a savings balance month by month and answers
//! "how long will it last?" and "what can I afford?". It supports:
//! - Staged return and inflation rates
//! - Recurring income and expense streams (salary, CPP/OAS, budgets)
//! - One-time and repeating events, including assets sold at a later age
//! - A reverse solver for sustainable withdrawals, required balances and runway
//! - What-if scenarios compared against a baseline
//!
//! Everything is pure and synchronous: each call returns a result owned by
//! the caller and no state is kept between calls.
//!
//! # Builder DSL
//!
//! ```ignore
//! use drawdown_core::config::{SimulationBuilder, StreamBuilder};
//! use drawdown_core::solver::{SolveRequest, SolverConfig, solve};
//!
//! let input = SimulationBuilder::new()
//!     .current_age(65)
//!     .plan_until_age(95)
//!     .starting_balance(500_000.0)
//!     .return_rate(0.04)
//!     .stream(StreamBuilder::expense("Living").amount(2_000.0))
//!     .build()?;
//!
//! let result = drawdown_core::simulate(&input)?;
//! let solved = solve(&input, &SolveRequest::max_withdrawal(), &SolverConfig::default())?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod error;
pub mod simulation;
pub mod solver;
pub mod timeline;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{EventBuilder, SimulationBuilder, SimulationInput, StreamBuilder};
pub use error::{InputError, ScenarioError, ScheduleError, SolveError};
pub use simulation::{simulate, simulate_all};
