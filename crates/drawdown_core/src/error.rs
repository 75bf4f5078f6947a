use thiserror::Error;

/// Errors raised while constructing a [`RateSchedule`](crate::model::RateSchedule)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("rate schedule has no stages")]
    Empty,

    #[error("first rate stage starts at month {start_month}, expected month 0")]
    FirstStageNotAtZero { start_month: u32 },

    #[error("rate stage {index} starts at month {start_month}, before the previous stage at month {previous}")]
    Unsorted {
        index: usize,
        previous: u32,
        start_month: u32,
    },

    #[error("two rate stages start at month {start_month}")]
    Overlapping { start_month: u32 },

    #[error("rate stage {index} has a non-finite rate")]
    NonFiniteRate { index: usize },
}

/// Structural violations in a profile or simulation input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("retirement age {retirement_age} must be before plan-until age {plan_until_age}")]
    RetirementNotBeforePlanEnd {
        retirement_age: u32,
        plan_until_age: u32,
    },

    #[error("current age {current_age} is past plan-until age {plan_until_age}")]
    CurrentAgePastPlanEnd {
        current_age: u32,
        plan_until_age: u32,
    },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("horizon of {months} months exceeds the {max} month limit")]
    HorizonTooLong { months: u32, max: u32 },

    #[error("stream '{label}': start age {start_age} must be before end age {end_age}")]
    StreamAges {
        label: String,
        start_age: u32,
        end_age: u32,
    },

    #[error("'{label}': amount must be a non-negative finite number, got {amount}")]
    InvalidAmount { label: String, amount: f64 },

    #[error("event '{label}': sell age {sell_age} is before the age it is received ({age})")]
    SellBeforeReceipt {
        label: String,
        age: u32,
        sell_age: u32,
    },

    #[error("event '{label}': repeat interval must be at least one year")]
    ZeroRepeat { label: String },

    #[error("event '{label}': an asset sale cannot repeat")]
    RepeatingAssetSale { label: String },

    #[error("no expense stream labelled '{0}'")]
    UnknownStream(String),

    #[error("cannot solve for {variable} against a {target} target")]
    UnsupportedSolve {
        variable: &'static str,
        target: &'static str,
    },

    #[error("invalid solver configuration: {0}")]
    SolverConfig(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Errors returned by the reverse solver
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    /// The predicate never flipped while the upper bound was being expanded
    #[error("no bracket found after {attempts} expansions (last bracket [{lo}, {hi}])")]
    NoBracketFound { lo: f64, hi: f64, attempts: u32 },
}

impl From<ScheduleError> for SolveError {
    fn from(err: ScheduleError) -> Self {
        SolveError::InvalidInput(InputError::Schedule(err))
    }
}

/// A what-if scenario whose overrides produced an invalid input
#[derive(Debug, Clone, PartialEq, Error)]
#[error("scenario '{scenario}': {source}")]
pub struct ScenarioError {
    pub scenario: String,
    #[source]
    pub source: InputError,
}

pub type Result<T> = std::result::Result<T, InputError>;
