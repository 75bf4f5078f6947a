//! Reverse solver
//!
//! Inverts the drawdown simulation to find the input that produces a wanted
//! outcome: the largest sustainable withdrawal, the balance needed to last a
//! horizon, or how many months a balance lasts. Every evaluation is a full
//! simulation; nothing is carried between evaluations except the bracket.
//!
//! # Example
//!
//! ```ignore
//! use drawdown_core::solver::{SolveRequest, SolverConfig, solve};
//!
//! let solved = solve(&input, &SolveRequest::max_withdrawal(), &SolverConfig::default())?;
//! println!("Sustainable withdrawal: ${:.0}/month", solved.value);
//! ```

mod bisection;
mod config;
mod result;

pub use bisection::solve;
pub use config::{FreeVariable, SolveRequest, SolverConfig, Target};
pub use result::{Phase, SolveIteration, SolveResult, SolverWarning, TerminationReason};
