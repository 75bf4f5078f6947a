//! Simulation input
//!
//! [`SimulationInput`] carries everything one projection needs. The host is
//! expected to range-check business values; [`SimulationInput::validate`] only
//! enforces the structural invariants the engine relies on.
//!
//! # Builder DSL
//!
//! ```ignore
//! use drawdown_core::config::{EventBuilder, SimulationBuilder, StreamBuilder};
//!
//! let input = SimulationBuilder::new()
//!     .current_age(60)
//!     .plan_until_age(95)
//!     .starting_balance(500_000.0)
//!     .return_rate(0.05)
//!     .inflation(0.02)
//!     .stream(StreamBuilder::expense("Living").amount(3_500.0))
//!     .pension("CPP", 800.0, 65)
//!     .event(EventBuilder::inflow("Inheritance").at_age(70).amount(100_000.0))
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::model::{Direction, Indexation, OneTimeEvent, RateSchedule, RecurringStream};

pub mod builder;
pub mod stream_builder;

pub use builder::SimulationBuilder;
pub use stream_builder::{EventBuilder, StreamBuilder};

/// Label used for the synthetic stream when solving for a withdrawal
pub const WITHDRAWAL_STREAM: &str = "withdrawal";

/// Longest horizon a run may cover (150 years)
pub const MAX_HORIZON_MONTHS: u32 = 150 * 12;

/// Complete, fully resolved input to one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub starting_balance: f64,
    pub current_age: u32,
    /// Age recurring streams without an explicit end run until
    pub plan_until_age: u32,
    #[serde(default)]
    pub returns: RateSchedule,
    #[serde(default)]
    pub inflation: RateSchedule,
    #[serde(default)]
    pub streams: Vec<RecurringStream>,
    #[serde(default)]
    pub events: Vec<OneTimeEvent>,
    pub horizon_months: u32,
}

impl Default for SimulationInput {
    fn default() -> Self {
        Self {
            starting_balance: 0.0,
            current_age: 65,
            plan_until_age: 95,
            returns: RateSchedule::default(),
            inflation: RateSchedule::default(),
            streams: Vec::new(),
            events: Vec::new(),
            horizon_months: 30 * 12,
        }
    }
}

impl SimulationInput {
    /// Check the invariants the simulator depends on
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.starting_balance.is_finite() {
            return Err(InputError::NonFinite {
                field: "starting_balance",
                value: self.starting_balance,
            });
        }
        if self.current_age > self.plan_until_age {
            return Err(InputError::CurrentAgePastPlanEnd {
                current_age: self.current_age,
                plan_until_age: self.plan_until_age,
            });
        }
        if self.horizon_months > MAX_HORIZON_MONTHS {
            return Err(InputError::HorizonTooLong {
                months: self.horizon_months,
                max: MAX_HORIZON_MONTHS,
            });
        }
        for stream in &self.streams {
            stream.validate(self.plan_until_age)?;
        }
        for event in &self.events {
            event.validate()?;
        }
        Ok(())
    }

    /// Horizon in whole and fractional years
    #[must_use]
    pub fn horizon_years(&self) -> f64 {
        f64::from(self.horizon_months) / 12.0
    }

    /// Month index at which integer age `age` is first reached, if not already past
    #[must_use]
    pub fn month_at_age(&self, age: u32) -> Option<u32> {
        age.checked_sub(self.current_age).map(|years| years * 12)
    }

    /// Sum of monthly recurring expenses active at `age`, before inflation
    #[must_use]
    pub fn monthly_expenses_at(&self, age: u32) -> f64 {
        self.streams
            .iter()
            .filter(|s| s.direction == Direction::Expense && s.is_active(age, self.plan_until_age))
            .map(RecurringStream::monthly_amount)
            .sum()
    }

    /// Sum of monthly recurring income active at `age`, before inflation
    #[must_use]
    pub fn monthly_income_at(&self, age: u32) -> f64 {
        self.streams
            .iter()
            .filter(|s| s.direction == Direction::Income && s.is_active(age, self.plan_until_age))
            .map(RecurringStream::monthly_amount)
            .sum()
    }

    // =========================================================================
    // Helpers for the solver and what-if scenarios
    // =========================================================================

    #[must_use]
    pub fn with_starting_balance(&self, balance: f64) -> Self {
        Self {
            starting_balance: balance,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_horizon_months(&self, months: u32) -> Self {
        Self {
            horizon_months: months,
            ..self.clone()
        }
    }

    /// Set the monthly amount of the expense stream labelled `label`, or
    /// append a `withdrawal` expense stream in today's dollars when `label` is `None`.
    pub fn with_withdrawal(&self, label: Option<&str>, monthly: f64) -> Result<Self, InputError> {
        let mut input = self.clone();
        match label {
            Some(label) => {
                let stream = input
                    .streams
                    .iter_mut()
                    .find(|s| s.label == label && s.direction == Direction::Expense)
                    .ok_or_else(|| InputError::UnknownStream(label.to_string()))?;
                stream.amount = monthly;
                stream.frequency = crate::model::Frequency::Monthly;
            }
            None => input.streams.push(RecurringStream {
                label: WITHDRAWAL_STREAM.to_string(),
                amount: monthly,
                frequency: crate::model::Frequency::Monthly,
                start_age: input.current_age,
                end_age: None,
                direction: Direction::Expense,
                indexation: Indexation::Today,
            }),
        }
        Ok(input)
    }
}
