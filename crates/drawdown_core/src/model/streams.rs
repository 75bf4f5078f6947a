//! Recurring cash-flow streams and one-time events
//!
//! Streams are always used as a monthly figure; annual amounts are spread
//! evenly over twelve months. One-time events are nominal amounts that fire at
//! the first month a given age is reached.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Whether a recurring stream adds to or draws from the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Income,
    Expense,
}

/// Direction of a one-time event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    Inflow,
    Outflow,
}

/// How often the stream's stated amount is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    Monthly,
    /// Paid once a year; amortized to `amount / 12` per month
    Annual,
}

/// Which dollars a stream's amount is denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Indexation {
    /// Today's dollars, inflated from month 0
    #[default]
    Today,
    /// Dollars of the month the stream starts; inflated from that month on
    StreamStart,
    /// Never inflated
    Nominal,
}

/// Income or expense paid every month while the person's age is in
/// `[start_age, end_age)`. A missing `end_age` means "until the plan ends".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringStream {
    pub label: String,
    pub amount: f64,
    #[serde(default)]
    pub frequency: Frequency,
    pub start_age: u32,
    #[serde(default)]
    pub end_age: Option<u32>,
    pub direction: Direction,
    #[serde(default)]
    pub indexation: Indexation,
}

impl RecurringStream {
    /// Amount normalized to a monthly figure
    #[must_use]
    pub fn monthly_amount(&self) -> f64 {
        match self.frequency {
            Frequency::Monthly => self.amount,
            Frequency::Annual => self.amount / 12.0,
        }
    }

    /// End age with the plan-until age filled in
    #[must_use]
    pub fn resolved_end_age(&self, plan_until_age: u32) -> u32 {
        self.end_age.unwrap_or(plan_until_age)
    }

    /// True when the stream pays at integer age `age`
    #[must_use]
    pub fn is_active(&self, age: u32, plan_until_age: u32) -> bool {
        self.start_age <= age && age < self.resolved_end_age(plan_until_age)
    }

    pub(crate) fn validate(&self, plan_until_age: u32) -> Result<(), InputError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(InputError::InvalidAmount {
                label: self.label.clone(),
                amount: self.amount,
            });
        }
        let end_age = self.resolved_end_age(plan_until_age);
        if self.start_age >= end_age {
            return Err(InputError::StreamAges {
                label: self.label.clone(),
                start_age: self.start_age,
                end_age,
            });
        }
        Ok(())
    }
}

/// A lump sum at a given age: an inheritance, a large purchase, a property sale.
///
/// When `is_asset_sale` is set, what arrives at `age_at_occurrence` is a
/// non-liquid asset that neither appears in the balance nor compounds. It only
/// turns into cash at `sell_age`, for `sale_amount` (defaulting to `amount`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneTimeEvent {
    pub label: String,
    pub age_at_occurrence: u32,
    pub amount: f64,
    pub direction: Flow,
    #[serde(default)]
    pub is_asset_sale: bool,
    #[serde(default)]
    pub sell_age: Option<u32>,
    #[serde(default)]
    pub sale_amount: Option<f64>,
    /// Fire again every N years after the first occurrence
    #[serde(default)]
    pub repeat_every_years: Option<u32>,
}

impl OneTimeEvent {
    /// Age at which the event actually moves cash, if ever
    #[must_use]
    pub fn liquid_age(&self) -> Option<u32> {
        if self.is_asset_sale {
            self.sell_age
        } else {
            Some(self.age_at_occurrence)
        }
    }

    /// Cash amount moved when the event fires (unsigned)
    #[must_use]
    pub fn liquid_amount(&self) -> f64 {
        if self.is_asset_sale {
            self.sale_amount.unwrap_or(self.amount)
        } else {
            self.amount
        }
    }

    /// Amount with the direction applied: positive for inflows
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            Flow::Inflow => self.liquid_amount(),
            Flow::Outflow => -self.liquid_amount(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), InputError> {
        for amount in [Some(self.amount), self.sale_amount].into_iter().flatten() {
            if !amount.is_finite() || amount < 0.0 {
                return Err(InputError::InvalidAmount {
                    label: self.label.clone(),
                    amount,
                });
            }
        }
        if let Some(sell_age) = self.sell_age
            && self.is_asset_sale
            && sell_age < self.age_at_occurrence
        {
            return Err(InputError::SellBeforeReceipt {
                label: self.label.clone(),
                age: self.age_at_occurrence,
                sell_age,
            });
        }
        match self.repeat_every_years {
            Some(0) => Err(InputError::ZeroRepeat {
                label: self.label.clone(),
            }),
            Some(_) if self.is_asset_sale => Err(InputError::RepeatingAssetSale {
                label: self.label.clone(),
            }),
            _ => Ok(()),
        }
    }
}
