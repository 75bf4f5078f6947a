//! Solver result types

use serde::{Deserialize, Serialize};

use super::config::SolveRequest;
use crate::model::{Outcome, SimulationResult};

/// Which part of the search produced an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Evaluating the lower bound or an expanding upper bound
    Bracket,
    Bisect,
}

/// One simulation run made while solving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveIteration {
    pub phase: Phase,
    pub value: f64,
    pub target_met: bool,
    pub outcome: Outcome,
    pub final_balance: f64,
}

/// Reason the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Bracket narrowed to within tolerance
    Converged,

    /// The lower bound already met a target that only gets easier as the variable grows
    LowerBound,

    /// Iteration cap reached before the bracket was narrow enough
    MaxIterationsReached,
}

/// Non-fatal conditions attached to a result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SolverWarning {
    NonConvergence { bracket_width: f64 },
}

/// Solved value together with the run it produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub request: SolveRequest,

    /// Value on the side of the final bracket that meets the target
    pub value: f64,

    /// Simulation at `value`
    pub result: SimulationResult,

    /// Bisection steps taken
    pub iterations: usize,

    /// Every evaluation, bracketing included, in the order it was run
    pub history: Vec<SolveIteration>,

    /// Final `(lo, hi)` bracket
    pub bracket: (f64, f64),

    pub termination_reason: TerminationReason,

    pub warnings: Vec<SolverWarning>,
}

impl SolveResult {
    #[must_use]
    pub fn converged(&self) -> bool {
        self.termination_reason != TerminationReason::MaxIterationsReached
    }

    /// Number of simulations run
    #[must_use]
    pub fn num_evaluations(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn bracket_width(&self) -> f64 {
        self.bracket.1 - self.bracket.0
    }
}

/// Record of an evaluation before it becomes part of the history
pub(crate) fn record(phase: Phase, value: f64, target_met: bool, result: &SimulationResult) -> SolveIteration {
    SolveIteration {
        phase,
        value,
        target_met,
        outcome: result.outcome,
        final_balance: result.final_balance(),
    }
}
