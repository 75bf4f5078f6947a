//! Bracket-and-bisect search over one free variable
//!
//! The target is assumed to be monotonic in the free variable: it is either
//! met for small values and missed for large ones (a sustainable withdrawal)
//! or the other way round (a required balance). The search starts at zero,
//! doubles an upper bound until the target flips, then bisects.

use crate::config::{MAX_HORIZON_MONTHS, SimulationInput};
use crate::error::{InputError, SolveError};
use crate::model::SimulationResult;
use crate::simulation::simulate;

use super::config::{FreeVariable, SolveRequest, SolverConfig, Target};
use super::result::{Phase, SolveIteration, SolveResult, SolverWarning, TerminationReason, record};

/// How the target responds as the free variable grows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Missed at low values, met at high values
    Rising,
    /// Met at low values, missed at high values
    Falling,
}

fn direction(variable: &FreeVariable, target: Target) -> Result<Direction, InputError> {
    match (variable, target) {
        (FreeVariable::Withdrawal { .. }, Target::Sustained) => Ok(Direction::Falling),
        (FreeVariable::Withdrawal { .. }, _) => Ok(Direction::Rising),
        (FreeVariable::StartingBalance, Target::Sustained) => Ok(Direction::Rising),
        (FreeVariable::StartingBalance, _) => Ok(Direction::Falling),
        (FreeVariable::Horizon, Target::Sustained) => Ok(Direction::Falling),
        (FreeVariable::Horizon, target) => Err(InputError::UnsupportedSolve {
            variable: variable.name(),
            target: target.name(),
        }),
    }
}

struct Evaluator<'a> {
    input: &'a SimulationInput,
    variable: &'a FreeVariable,
    target: Target,
    history: Vec<SolveIteration>,
}

impl Evaluator<'_> {
    fn run(&mut self, phase: Phase, value: f64) -> Result<(bool, SimulationResult), InputError> {
        let trial_input = self.variable.apply(self.input, value)?;
        let result = simulate(&trial_input)?;
        let met = self.target.is_met(&result);
        tracing::debug!(
            variable = self.variable.name(),
            ?phase,
            value,
            met,
            months_funded = result.months_funded(),
            "solver evaluation"
        );
        self.history.push(record(phase, value, met, &result));
        Ok((met, result))
    }
}

/// Find the value of `request.variable` at which `request.target` flips.
///
/// Returns the value on the side of the final bracket that meets the target.
pub fn solve(
    input: &SimulationInput,
    request: &SolveRequest,
    config: &SolverConfig,
) -> Result<SolveResult, SolveError> {
    input.validate()?;
    config.validate(&request.variable)?;
    let direction = direction(&request.variable, request.target)?;
    let target = request.target.resolve(input)?;

    let integral = request.variable.is_integral();
    let tolerance = config.tolerance_for(&request.variable);
    let ceiling = integral.then_some(f64::from(MAX_HORIZON_MONTHS));

    let mut evaluator = Evaluator {
        input,
        variable: &request.variable,
        target,
        history: Vec::new(),
    };

    // Bracket
    let mut lo = 0.0;
    let (lo_met, mut lo_result) = evaluator.run(Phase::Bracket, lo)?;

    if direction == Direction::Rising && lo_met {
        return Ok(SolveResult {
            request: request.clone(),
            value: lo,
            result: lo_result,
            iterations: 0,
            history: evaluator.history,
            bracket: (lo, lo),
            termination_reason: TerminationReason::LowerBound,
            warnings: Vec::new(),
        });
    }
    if direction == Direction::Falling && !lo_met {
        return Err(SolveError::NoBracketFound {
            lo,
            hi: lo,
            attempts: 0,
        });
    }

    let mut hi = config.initial_upper_for(&request.variable);
    let mut attempts = 0;
    let mut hi_result = loop {
        if let Some(ceiling) = ceiling {
            hi = hi.min(ceiling);
        }
        let (hi_met, hi_result) = evaluator.run(Phase::Bracket, hi)?;
        if hi_met != lo_met {
            break hi_result;
        }
        let at_ceiling = ceiling.is_some_and(|c| hi >= c);
        if attempts >= config.max_expansions || at_ceiling {
            return Err(SolveError::NoBracketFound { lo, hi, attempts });
        }
        lo = hi;
        lo_result = hi_result;
        hi *= 2.0;
        attempts += 1;
    };

    // Bisect
    let mut iterations = 0;
    while hi - lo > tolerance && iterations < config.max_iterations {
        iterations += 1;
        let mid = if integral {
            ((lo + hi) / 2.0).floor()
        } else {
            f64::midpoint(lo, hi)
        };

        let (mid_met, mid_result) = evaluator.run(Phase::Bisect, mid)?;
        if mid_met == lo_met {
            lo = mid;
            lo_result = mid_result;
        } else {
            hi = mid;
            hi_result = mid_result;
        }
    }

    let converged = hi - lo <= tolerance;
    let (termination_reason, warnings) = if converged {
        (TerminationReason::Converged, Vec::new())
    } else {
        tracing::warn!(
            variable = request.variable.name(),
            bracket_width = hi - lo,
            "solver stopped before reaching tolerance"
        );
        (
            TerminationReason::MaxIterationsReached,
            vec![SolverWarning::NonConvergence {
                bracket_width: hi - lo,
            }],
        )
    };

    let (value, result) = match direction {
        Direction::Rising => (hi, hi_result),
        Direction::Falling => (lo, lo_result),
    };

    Ok(SolveResult {
        request: request.clone(),
        value,
        result,
        iterations,
        history: evaluator.history,
        bracket: (lo, hi),
        termination_reason,
        warnings,
    })
}
