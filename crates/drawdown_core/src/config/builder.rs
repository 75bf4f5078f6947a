//! Simulation Builder
//!
//! The SimulationBuilder assembles a [`SimulationInput`] from ages, rates and
//! builder-described streams and events. Ages given to streams, events and
//! rate stages are resolved against the current age when `build` runs, so the
//! order of calls does not matter.
//!
//! # Example
//!
//! ```ignore
//! use drawdown_core::config::{EventBuilder, SimulationBuilder, StreamBuilder};
//!
//! let input = SimulationBuilder::new()
//!     .current_age(58)
//!     .retirement_age(63)
//!     .plan_until_age(95)
//!     .starting_balance(420_000.0)
//!
//!     // Market assumptions
//!     .return_rate(0.06)
//!     .return_rate_from_age(70, 0.04)
//!     .inflation(0.025)
//!
//!     // Cash flows
//!     .salary("Salary", 6_500.0)
//!     .stream(StreamBuilder::expense("Living").amount(4_000.0))
//!     .pension("CPP", 800.0, 65)
//!     .pension("OAS", 700.0, 65)
//!     .event(EventBuilder::inflow("Inheritance").at_age(72).amount(80_000.0))
//!
//!     .build()?;
//! ```

use super::SimulationInput;
use super::stream_builder::{EventBuilder, StreamBuilder};
use crate::error::InputError;
use crate::model::{Budget, Profile, RateSchedule, RateStage};

/// Builder for a [`SimulationInput`]
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    starting_balance: f64,
    current_age: u32,
    retirement_age: Option<u32>,
    plan_until_age: u32,
    horizon_months: Option<u32>,

    returns: RateSchedule,
    inflation: RateSchedule,
    // Stages keyed by age, resolved to months during build
    pending_return_stages: Vec<(u32, f64)>,
    pending_inflation_stages: Vec<(u32, f64)>,

    pending_streams: Vec<StreamBuilder>,
    pending_salaries: Vec<(String, f64)>,
    pending_events: Vec<EventBuilder>,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    #[must_use]
    pub fn new() -> Self {
        let defaults = SimulationInput::default();
        Self {
            starting_balance: defaults.starting_balance,
            current_age: defaults.current_age,
            retirement_age: None,
            plan_until_age: defaults.plan_until_age,
            horizon_months: None,
            returns: defaults.returns,
            inflation: defaults.inflation,
            pending_return_stages: Vec::new(),
            pending_inflation_stages: Vec::new(),
            pending_streams: Vec::new(),
            pending_salaries: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Seed ages and balance from a profile
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        Self::new()
            .current_age(profile.current_age)
            .retirement_age(profile.retirement_age)
            .plan_until_age(profile.plan_until_age)
            .starting_balance(profile.current_balance)
    }

    // =========================================================================
    // Ages and horizon
    // =========================================================================

    #[must_use]
    pub fn starting_balance(mut self, balance: f64) -> Self {
        self.starting_balance = balance;
        self
    }

    #[must_use]
    pub fn current_age(mut self, age: u32) -> Self {
        self.current_age = age;
        self
    }

    /// Age at which salaries stop
    #[must_use]
    pub fn retirement_age(mut self, age: u32) -> Self {
        self.retirement_age = Some(age);
        self
    }

    #[must_use]
    pub fn plan_until_age(mut self, age: u32) -> Self {
        self.plan_until_age = age;
        self
    }

    /// Simulate for `years` years instead of until the plan-until age
    #[must_use]
    pub fn years(self, years: u32) -> Self {
        self.months(years * 12)
    }

    #[must_use]
    pub fn months(mut self, months: u32) -> Self {
        self.horizon_months = Some(months);
        self
    }

    // =========================================================================
    // Market assumptions
    // =========================================================================

    /// Constant annual return for the whole horizon
    #[must_use]
    pub fn return_rate(mut self, annual_rate: f64) -> Self {
        self.returns = RateSchedule::constant(annual_rate);
        self
    }

    #[must_use]
    pub fn returns(mut self, schedule: RateSchedule) -> Self {
        self.returns = schedule;
        self
    }

    /// Switch to `annual_rate` from the first month of `age`
    #[must_use]
    pub fn return_rate_from_age(mut self, age: u32, annual_rate: f64) -> Self {
        self.pending_return_stages.push((age, annual_rate));
        self
    }

    /// Constant annual inflation for the whole horizon
    #[must_use]
    pub fn inflation(mut self, annual_rate: f64) -> Self {
        self.inflation = RateSchedule::constant(annual_rate);
        self
    }

    #[must_use]
    pub fn inflation_schedule(mut self, schedule: RateSchedule) -> Self {
        self.inflation = schedule;
        self
    }

    #[must_use]
    pub fn inflation_from_age(mut self, age: u32, annual_rate: f64) -> Self {
        self.pending_inflation_stages.push((age, annual_rate));
        self
    }

    // =========================================================================
    // Cash flows
    // =========================================================================

    #[must_use]
    pub fn stream(mut self, stream: StreamBuilder) -> Self {
        self.pending_streams.push(stream);
        self
    }

    #[must_use]
    pub fn event(mut self, event: EventBuilder) -> Self {
        self.pending_events.push(event);
        self
    }

    /// Monthly income in today's dollars that stops at the retirement age.
    /// Left out entirely when the current age is already at or past it.
    #[must_use]
    pub fn salary(mut self, label: impl Into<String>, monthly: f64) -> Self {
        self.pending_salaries.push((label.into(), monthly));
        self
    }

    /// Government stipend (CPP, OAS) stated in dollars of its first payment
    #[must_use]
    pub fn pension(self, label: impl Into<String>, monthly: f64, start_age: u32) -> Self {
        self.stream(
            StreamBuilder::income(label)
                .amount(monthly)
                .starting_at_age(start_age)
                .indexed_from_start(),
        )
    }

    /// One expense stream per budget category
    #[must_use]
    pub fn budget(mut self, budget: &Budget) -> Self {
        let mut categories: Vec<_> = budget.iter().collect();
        // Hash order is arbitrary; keep stream order reproducible
        categories.sort_by(|a, b| a.0.cmp(b.0));
        for (category, monthly) in categories {
            self = self.stream(StreamBuilder::expense(category).amount(monthly));
        }
        self
    }

    /// Resolve pending streams, events and rate stages into a validated input
    pub fn build(self) -> Result<SimulationInput, InputError> {
        let current_age = self.current_age;
        if let Some(retirement_age) = self
            .retirement_age
            .filter(|&age| age >= self.plan_until_age)
        {
            return Err(InputError::RetirementNotBeforePlanEnd {
                retirement_age,
                plan_until_age: self.plan_until_age,
            });
        }
        let to_month = |age: u32| age.saturating_sub(current_age) * 12;

        let mut returns = self.returns;
        for (age, rate) in self.pending_return_stages {
            returns = returns.with_stage(RateStage::new(to_month(age), rate))?;
        }
        let mut inflation = self.inflation;
        for (age, rate) in self.pending_inflation_stages {
            inflation = inflation.with_stage(RateStage::new(to_month(age), rate))?;
        }

        // Salaries are dropped entirely once retired
        let salary_end = self.retirement_age;
        let working = salary_end.is_none_or(|age| age > current_age);
        let salaries = self
            .pending_salaries
            .into_iter()
            .filter(|_| working)
            .map(|(label, monthly)| {
                let salary = StreamBuilder::income(label).amount(monthly);
                match salary_end {
                    Some(age) => salary.until_age(age),
                    None => salary,
                }
            });

        let streams = self
            .pending_streams
            .into_iter()
            .chain(salaries)
            .map(|s| s.build(current_age))
            .collect();
        let events = self
            .pending_events
            .into_iter()
            .map(|e| e.build(current_age))
            .collect();

        let horizon_months = self
            .horizon_months
            .unwrap_or_else(|| self.plan_until_age.saturating_sub(current_age) * 12);

        let input = SimulationInput {
            starting_balance: self.starting_balance,
            current_age,
            plan_until_age: self.plan_until_age,
            returns,
            inflation,
            streams,
            events,
            horizon_months,
        };
        input.validate()?;
        Ok(input)
    }
}
