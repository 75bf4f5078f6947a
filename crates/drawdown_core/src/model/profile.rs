//! The person being planned for: ages, accounts and monthly budget

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Ages and current balance that anchor a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub current_age: u32,
    pub retirement_age: u32,
    /// Life expectancy, or the age the plan should last until
    pub plan_until_age: u32,
    /// Current total balance (liquid net worth)
    pub current_balance: f64,
}

impl Profile {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.retirement_age >= self.plan_until_age {
            return Err(InputError::RetirementNotBeforePlanEnd {
                retirement_age: self.retirement_age,
                plan_until_age: self.plan_until_age,
            });
        }
        if self.current_age > self.plan_until_age {
            return Err(InputError::CurrentAgePastPlanEnd {
                current_age: self.current_age,
                plan_until_age: self.plan_until_age,
            });
        }
        if !self.current_balance.is_finite() {
            return Err(InputError::NonFinite {
                field: "current_balance",
                value: self.current_balance,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.current_age >= self.retirement_age
    }

    /// Months left until retirement (zero once retired)
    #[must_use]
    pub fn months_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age) * 12
    }

    /// Months from now until the plan-until age
    #[must_use]
    pub fn months_to_plan_end(&self) -> u32 {
        self.plan_until_age.saturating_sub(self.current_age) * 12
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Bank,
    Investments,
    Property,
    Other,
    Liability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub label: String,
    pub balance: f64,
    pub kind: AccountKind,
}

impl Account {
    /// Liability kinds and negative balances both count as debt
    #[must_use]
    pub fn is_liability(&self) -> bool {
        self.kind == AccountKind::Liability || self.balance < 0.0
    }

    /// Only cash and investments can fund spending
    #[must_use]
    pub fn is_liquid(&self) -> bool {
        matches!(self.kind, AccountKind::Bank | AccountKind::Investments)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetWorth {
    pub total_assets: f64,
    pub total_liabilities: f64,
    /// Cash and investments minus all debt; the balance a drawdown starts from
    pub liquid: f64,
}

impl NetWorth {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.total_assets - self.total_liabilities
    }
}

/// Sum up assets, liabilities and liquid net worth
#[must_use]
pub fn net_worth(accounts: &[Account]) -> NetWorth {
    accounts.iter().fold(NetWorth::default(), |mut nw, acc| {
        if acc.is_liability() {
            let debt = acc.balance.abs();
            nw.total_liabilities += debt;
            nw.liquid -= debt;
        } else {
            nw.total_assets += acc.balance;
            if acc.is_liquid() {
                nw.liquid += acc.balance;
            }
        }
        nw
    })
}

/// Expense categories mapped to monthly amounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Budget {
    categories: FxHashMap<String, f64>,
}

impl Budget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a monthly amount to a category
    pub fn insert_monthly(&mut self, category: impl Into<String>, amount: f64) {
        *self.categories.entry(category.into()).or_insert(0.0) += amount;
    }

    /// Add a yearly amount to a category, normalized to monthly
    pub fn insert_annual(&mut self, category: impl Into<String>, amount: f64) {
        self.insert_monthly(category, amount / 12.0);
    }

    #[must_use]
    pub fn get(&self, category: &str) -> Option<f64> {
        self.categories.get(category).copied()
    }

    /// Monthly total across all categories
    #[must_use]
    pub fn total(&self) -> f64 {
        self.categories.values().sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Budget {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut budget = Budget::new();
        for (category, amount) in iter {
            budget.insert_monthly(category, amount);
        }
        budget
    }
}
