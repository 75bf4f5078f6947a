//! Solver configuration types
//!
//! A [`SolveRequest`] names the quantity to solve for and the outcome it must
//! produce; [`SolverConfig`] bounds the search.

use serde::{Deserialize, Serialize};

use crate::config::SimulationInput;
use crate::error::InputError;
use crate::model::SimulationResult;

/// The input quantity the solver varies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FreeVariable {
    /// Monthly amount of the named expense stream, or of an added
    /// `withdrawal` stream in today's dollars when `stream` is `None`
    Withdrawal { stream: Option<String> },

    StartingBalance,

    /// Simulation length in whole months
    Horizon,
}

impl FreeVariable {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FreeVariable::Withdrawal { .. } => "withdrawal",
            FreeVariable::StartingBalance => "starting balance",
            FreeVariable::Horizon => "horizon",
        }
    }

    /// Only horizons are searched over whole numbers
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(self, FreeVariable::Horizon)
    }

    /// Copy of `input` with this variable set to `value`
    pub fn apply(&self, input: &SimulationInput, value: f64) -> Result<SimulationInput, InputError> {
        match self {
            FreeVariable::Withdrawal { stream } => input.with_withdrawal(stream.as_deref(), value),
            FreeVariable::StartingBalance => Ok(input.with_starting_balance(value)),
            // Values are non-negative whole numbers by construction
            FreeVariable::Horizon => Ok(input.with_horizon_months(value as u32)),
        }
    }
}

/// The outcome a solved input must produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Non-negative balance through the whole horizon
    Sustained,

    /// Depleted in or before month `month`
    DepletedBy { month: u32 },

    /// Depleted no later than the first month of age `age`
    DepletedByAge { age: u32 },
}

impl Target {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Target::Sustained => "sustained",
            Target::DepletedBy { .. } => "depleted-by-month",
            Target::DepletedByAge { .. } => "depleted-by-age",
        }
    }

    /// Express age targets as month targets for a given input
    pub(crate) fn resolve(self, input: &SimulationInput) -> Result<Target, InputError> {
        match self {
            Target::DepletedByAge { age } => input
                .month_at_age(age)
                .map(|month| Target::DepletedBy { month })
                .ok_or_else(|| {
                    InputError::SolverConfig(format!(
                        "target age {age} is before current age {}",
                        input.current_age
                    ))
                }),
            target => Ok(target),
        }
    }

    /// Whether a simulation result meets this target. An age target means
    /// depletion in or before the first month of that age; an age already
    /// behind the result's current age is never met.
    #[must_use]
    pub fn is_met(&self, result: &SimulationResult) -> bool {
        match *self {
            Target::Sustained => result.outcome.is_sustained(),
            Target::DepletedBy { month } => result
                .outcome
                .depletion_month()
                .is_some_and(|m| m <= month),
            Target::DepletedByAge { age } => age
                .checked_sub(result.current_age)
                .is_some_and(|years| Target::DepletedBy { month: years * 12 }.is_met(result)),
        }
    }
}

/// What to solve for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub variable: FreeVariable,
    pub target: Target,
}

impl SolveRequest {
    #[must_use]
    pub fn new(variable: FreeVariable, target: Target) -> Self {
        Self { variable, target }
    }

    /// Largest sustainable monthly withdrawal, added as a new stream
    #[must_use]
    pub fn max_withdrawal() -> Self {
        Self::new(FreeVariable::Withdrawal { stream: None }, Target::Sustained)
    }

    /// Smallest starting balance that lasts the horizon
    #[must_use]
    pub fn required_balance() -> Self {
        Self::new(FreeVariable::StartingBalance, Target::Sustained)
    }

    /// Number of months the balance lasts
    #[must_use]
    pub fn months_until_depletion() -> Self {
        Self::new(FreeVariable::Horizon, Target::Sustained)
    }
}

/// Bounds on the bracket-and-bisect search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Bracket width at which the search stops.
    /// Defaults to $1 for currency and 1 month for horizons.
    pub tolerance: Option<f64>,

    /// First upper bound tried. Defaults per variable (see [`SolverConfig::initial_upper_for`]).
    pub initial_upper: Option<f64>,

    /// Bisection steps after the bracket is found
    pub max_iterations: usize,

    /// Times the upper bound may double while looking for a bracket
    pub max_expansions: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: None,
            initial_upper: None,
            max_iterations: 100,
            max_expansions: 40,
        }
    }
}

impl SolverConfig {
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    #[must_use]
    pub fn with_initial_upper(mut self, upper: f64) -> Self {
        self.initial_upper = Some(upper);
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_max_expansions(mut self, max_expansions: u32) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    #[must_use]
    pub fn tolerance_for(&self, variable: &FreeVariable) -> f64 {
        match variable {
            // Integer midpoints cannot narrow a bracket below one month
            FreeVariable::Horizon => self.tolerance.map_or(1.0, |t| t.max(1.0)),
            _ => self.tolerance.unwrap_or(1.0),
        }
    }

    #[must_use]
    pub fn initial_upper_for(&self, variable: &FreeVariable) -> f64 {
        self.initial_upper.unwrap_or(match variable {
            FreeVariable::Withdrawal { .. } => 1_000.0,
            FreeVariable::StartingBalance => 100_000.0,
            FreeVariable::Horizon => 12.0,
        })
    }

    pub(crate) fn validate(&self, variable: &FreeVariable) -> Result<(), InputError> {
        let tolerance = self.tolerance_for(variable);
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(InputError::SolverConfig(format!(
                "tolerance must be positive, got {tolerance}"
            )));
        }
        let upper = self.initial_upper_for(variable);
        if !upper.is_finite() || upper <= 0.0 {
            return Err(InputError::SolverConfig(format!(
                "initial upper bound must be positive, got {upper}"
            )));
        }
        if variable.is_integral() && upper.fract() != 0.0 {
            return Err(InputError::SolverConfig(format!(
                "initial horizon must be a whole number of months, got {upper}"
            )));
        }
        Ok(())
    }
}
