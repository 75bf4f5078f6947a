//! Simulation results
//!
//! A run produces one [`MonthRecord`] per simulated month (the [`Trajectory`])
//! and a terminal [`Outcome`]. Results are owned by the caller and never
//! mutated after the run returns.

use serde::{Deserialize, Serialize};

/// Everything that happened to the balance in one month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    pub month_index: u32,
    /// Integer age during this month
    pub age: u32,
    pub balance_start: f64,
    pub growth: f64,
    pub income: f64,
    pub expenses: f64,
    pub net_cash_flow: f64,
    /// Not clamped: the depleting month records the negative balance
    pub balance_end: f64,
}

/// Ordered month records of a single run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    records: Vec<MonthRecord>,
}

impl Trajectory {
    #[must_use]
    pub(crate) fn from_records(records: Vec<MonthRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[MonthRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MonthRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn get(&self, month: u32) -> Option<&MonthRecord> {
        self.records.get(month as usize)
    }

    #[must_use]
    pub fn last(&self) -> Option<&MonthRecord> {
        self.records.last()
    }

    /// Balance after `months` months have elapsed; `starting_balance` for zero.
    /// `None` when the trajectory stopped before then.
    #[must_use]
    pub fn balance_after(&self, months: u32, starting_balance: f64) -> Option<f64> {
        match months {
            0 => Some(starting_balance),
            m => self.get(m - 1).map(|r| r.balance_end),
        }
    }

    /// Highest end-of-month balance
    #[must_use]
    pub fn peak_balance(&self) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.balance_end)
            .max_by(f64::total_cmp)
    }

    /// End-of-year balances, one per completed year of the trajectory
    #[must_use]
    pub fn yearly_balances(&self) -> Vec<(u32, f64)> {
        self.records
            .iter()
            .filter(|r| r.month_index % 12 == 11)
            .map(|r| (r.age, r.balance_end))
            .collect()
    }

    #[must_use]
    pub fn total_growth(&self) -> f64 {
        self.records.iter().map(|r| r.growth).sum()
    }

    #[must_use]
    pub fn total_income(&self) -> f64 {
        self.records.iter().map(|r| r.income).sum()
    }

    #[must_use]
    pub fn total_expenses(&self) -> f64 {
        self.records.iter().map(|r| r.expenses).sum()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a MonthRecord;
    type IntoIter = std::slice::Iter<'a, MonthRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Reached the horizon with a non-negative balance
    Sustained,
    /// The balance went negative during `depletion_month`
    Depleted {
        depletion_month: u32,
        /// Fractional years
        age_at_depletion: f64,
    },
}

impl Outcome {
    #[must_use]
    pub fn is_sustained(&self) -> bool {
        matches!(self, Outcome::Sustained)
    }

    #[must_use]
    pub fn depletion_month(&self) -> Option<u32> {
        match self {
            Outcome::Sustained => None,
            Outcome::Depleted {
                depletion_month, ..
            } => Some(*depletion_month),
        }
    }

    #[must_use]
    pub fn age_at_depletion(&self) -> Option<f64> {
        match self {
            Outcome::Sustained => None,
            Outcome::Depleted {
                age_at_depletion, ..
            } => Some(*age_at_depletion),
        }
    }
}

/// Complete result of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub starting_balance: f64,
    pub current_age: u32,
    pub horizon_months: u32,
    pub trajectory: Trajectory,
    pub outcome: Outcome,
}

impl SimulationResult {
    /// Months the balance stayed non-negative: the depletion month, or the
    /// whole horizon when sustained.
    #[must_use]
    pub fn months_funded(&self) -> u32 {
        self.outcome
            .depletion_month()
            .unwrap_or(self.horizon_months)
    }

    /// Balance at the end of the run (starting balance for an empty trajectory)
    #[must_use]
    pub fn final_balance(&self) -> f64 {
        self.trajectory
            .last()
            .map_or(self.starting_balance, |r| r.balance_end)
    }
}
