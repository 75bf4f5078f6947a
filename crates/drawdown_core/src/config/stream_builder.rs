//! Stream and Event Builder DSL
//!
//! Fluent construction of recurring streams and one-time events.
//!
//! # Examples
//!
//! ```ignore
//! use drawdown_core::config::{EventBuilder, StreamBuilder};
//!
//! // Groceries in today's dollars, for the rest of the plan
//! let groceries = StreamBuilder::expense("Groceries").amount(600.0);
//!
//! // Property tax paid once a year until the house is sold
//! let property_tax = StreamBuilder::expense("Property tax")
//!     .annually(4_800.0)
//!     .until_age(80);
//!
//! // A house inherited at 70 and sold at 75
//! let house = EventBuilder::inflow("Inherited house")
//!     .at_age(70)
//!     .amount(100_000.0)
//!     .sold_at(75, 120_000.0);
//!
//! // A new car every eight years
//! let car = EventBuilder::outflow("Car")
//!     .at_age(66)
//!     .amount(35_000.0)
//!     .every_years(8);
//! ```

use crate::model::{Direction, Flow, Frequency, Indexation, OneTimeEvent, RecurringStream};

/// Builder for a [`RecurringStream`]
///
/// Defaults: monthly, today's dollars, starting at the plan's current age,
/// running until the plan ends.
#[derive(Debug, Clone)]
pub struct StreamBuilder {
    label: String,
    direction: Direction,
    amount: f64,
    frequency: Frequency,
    start_age: Option<u32>,
    end_age: Option<u32>,
    indexation: Indexation,
}

impl StreamBuilder {
    fn new(label: impl Into<String>, direction: Direction) -> Self {
        Self {
            label: label.into(),
            direction,
            amount: 0.0,
            frequency: Frequency::Monthly,
            start_age: None,
            end_age: None,
            indexation: Indexation::Today,
        }
    }

    #[must_use]
    pub fn income(label: impl Into<String>) -> Self {
        Self::new(label, Direction::Income)
    }

    #[must_use]
    pub fn expense(label: impl Into<String>) -> Self {
        Self::new(label, Direction::Expense)
    }

    /// Monthly amount
    #[must_use]
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self.frequency = Frequency::Monthly;
        self
    }

    /// Alias for `amount`
    #[must_use]
    pub fn monthly(self, amount: f64) -> Self {
        self.amount(amount)
    }

    /// Yearly amount, spread evenly over twelve months
    #[must_use]
    pub fn annually(mut self, amount: f64) -> Self {
        self.amount = amount;
        self.frequency = Frequency::Annual;
        self
    }

    #[must_use]
    pub fn starting_at_age(mut self, age: u32) -> Self {
        self.start_age = Some(age);
        self
    }

    /// Last paid in the month before `age` is reached
    #[must_use]
    pub fn until_age(mut self, age: u32) -> Self {
        self.end_age = Some(age);
        self
    }

    /// Amount is in dollars of the first payment month
    #[must_use]
    pub fn indexed_from_start(mut self) -> Self {
        self.indexation = Indexation::StreamStart;
        self
    }

    /// Amount is never inflated
    #[must_use]
    pub fn nominal(mut self) -> Self {
        self.indexation = Indexation::Nominal;
        self
    }

    /// Resolve into a stream, filling in the start age when unset
    pub fn build(self, current_age: u32) -> RecurringStream {
        RecurringStream {
            label: self.label,
            amount: self.amount,
            frequency: self.frequency,
            start_age: self.start_age.unwrap_or(current_age),
            end_age: self.end_age,
            direction: self.direction,
            indexation: self.indexation,
        }
    }
}

/// Builder for a [`OneTimeEvent`]
#[derive(Debug, Clone)]
pub struct EventBuilder {
    label: String,
    direction: Flow,
    age: Option<u32>,
    amount: f64,
    sale: Option<(Option<u32>, Option<f64>)>,
    repeat_every_years: Option<u32>,
}

impl EventBuilder {
    fn new(label: impl Into<String>, direction: Flow) -> Self {
        Self {
            label: label.into(),
            direction,
            age: None,
            amount: 0.0,
            sale: None,
            repeat_every_years: None,
        }
    }

    #[must_use]
    pub fn inflow(label: impl Into<String>) -> Self {
        Self::new(label, Flow::Inflow)
    }

    #[must_use]
    pub fn outflow(label: impl Into<String>) -> Self {
        Self::new(label, Flow::Outflow)
    }

    #[must_use]
    pub fn at_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    /// Received as a non-liquid asset; converted to cash at `sell_age` for `sale_amount`
    #[must_use]
    pub fn sold_at(mut self, sell_age: u32, sale_amount: f64) -> Self {
        self.sale = Some((Some(sell_age), Some(sale_amount)));
        self
    }

    /// Received as a non-liquid asset that is never sold
    #[must_use]
    pub fn kept_as_asset(mut self) -> Self {
        self.sale = Some((None, None));
        self
    }

    #[must_use]
    pub fn every_years(mut self, years: u32) -> Self {
        self.repeat_every_years = Some(years);
        self
    }

    /// Resolve into an event; an unset age means "right now"
    pub fn build(self, current_age: u32) -> OneTimeEvent {
        let (is_asset_sale, sell_age, sale_amount) = match self.sale {
            Some((sell_age, sale_amount)) => (true, sell_age, sale_amount),
            None => (false, None, None),
        };
        OneTimeEvent {
            label: self.label,
            age_at_occurrence: self.age.unwrap_or(current_age),
            amount: self.amount,
            direction: self.direction,
            is_asset_sale,
            sell_age,
            sale_amount,
            repeat_every_years: self.repeat_every_years,
        }
    }
}
