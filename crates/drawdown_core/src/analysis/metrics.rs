//! Retirement readiness metrics
//!
//! Summaries of a projection and the closed-form rules of thumb shown next to
//! it: the nest egg a withdrawal rate implies, the balance savings grow to by
//! retirement, and how long until that nest egg is reached.

use serde::{Deserialize, Serialize};

use crate::config::SimulationInput;
use crate::model::SimulationResult;

/// The 4% rule
pub const DEFAULT_WITHDRAWAL_RATE: f64 = 0.04;

/// Longest search used by [`years_until_target`]
pub const MAX_YEARS_TO_TARGET: u32 = 100;

/// How long a projected balance lasts and where the money went
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunwaySummary {
    pub months_funded: u32,
    pub years: u32,
    /// Remaining months after whole years
    pub months: u32,
    pub depleted: bool,
    pub depletion_age: Option<f64>,
    pub peak_balance: f64,
    pub final_balance: f64,
    pub total_growth: f64,
    pub total_income: f64,
    pub total_expenses: f64,
}

impl RunwaySummary {
    #[must_use]
    pub fn from_result(result: &SimulationResult) -> Self {
        let months_funded = result.months_funded();
        let trajectory = &result.trajectory;
        Self {
            months_funded,
            years: months_funded / 12,
            months: months_funded % 12,
            depleted: !result.outcome.is_sustained(),
            depletion_age: result.outcome.age_at_depletion(),
            peak_balance: trajectory
                .peak_balance()
                .map_or(result.starting_balance, |p| p.max(result.starting_balance)),
            final_balance: result.final_balance(),
            total_growth: trajectory.total_growth(),
            total_income: trajectory.total_income(),
            total_expenses: trajectory.total_expenses(),
        }
    }
}

/// Balance needed to fund `monthly_spend` forever at `withdrawal_rate`.
/// Zero when there is nothing to fund; `None` for a non-positive rate.
#[must_use]
pub fn target_nest_egg(monthly_spend: f64, withdrawal_rate: f64) -> Option<f64> {
    if withdrawal_rate <= 0.0 {
        return None;
    }
    Some(monthly_spend.max(0.0) * 12.0 / withdrawal_rate)
}

/// Monthly spending a balance supports at `withdrawal_rate`
#[must_use]
pub fn safe_monthly_spend(balance: f64, withdrawal_rate: f64) -> f64 {
    balance.max(0.0) * withdrawal_rate / 12.0
}

/// Annualized rate a monthly withdrawal draws from `balance`
#[must_use]
pub fn withdrawal_rate(monthly_withdrawal: f64, balance: f64) -> Option<f64> {
    (balance > 0.0).then(|| monthly_withdrawal * 12.0 / balance)
}

/// Future value of `balance` plus `monthly_savings` after `months`, compounding
/// monthly at `annual_return / 12`
#[must_use]
pub fn projected_balance(balance: f64, monthly_savings: f64, annual_return: f64, months: u32) -> f64 {
    let r = annual_return / 12.0;
    let n = f64::from(months);
    if r == 0.0 {
        return balance + monthly_savings * n;
    }
    let growth = (1.0 + r).powf(n);
    balance * growth + monthly_savings * (growth - 1.0) / r
}

/// Whole years of saving until `balance` reaches `target`, with the target
/// itself growing by `target_growth` a year to keep pace with expenses.
///
/// `Some(0)` when the target is already met; `None` when savings never get
/// there within [`MAX_YEARS_TO_TARGET`] years.
#[must_use]
pub fn years_until_target(
    balance: f64,
    monthly_savings: f64,
    annual_return: f64,
    target: f64,
    target_growth: f64,
) -> Option<u32> {
    let mut balance = balance;
    let mut target = target;
    for year in 0..=MAX_YEARS_TO_TARGET {
        if balance >= target {
            return Some(year);
        }
        balance = projected_balance(balance, monthly_savings, annual_return, 12);
        target *= 1.0 + target_growth;
    }
    None
}

/// Where a plan stands before retirement: what it saves now and the nest egg
/// it is saving towards.
///
/// The spending to fund is the expense streams active at retirement less the
/// income still paid then, so pensions shrink the nest egg and salaries don't.
/// Rates are the first-month return and inflation of the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
    pub current_age: u32,
    pub retirement_age: u32,
    pub withdrawal_rate: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    /// Income less expenses today; negative when spending exceeds income
    pub monthly_savings: f64,
    pub monthly_spend_to_fund: f64,
    /// `None` for a non-positive withdrawal rate
    pub target_nest_egg: Option<f64>,
    pub balance_at_retirement: f64,
    pub safe_monthly_spend: f64,
    /// `Some(0)` when the balance already covers the nest egg. Otherwise only
    /// computed while working and saving.
    pub years_to_target: Option<u32>,
}

impl Readiness {
    #[must_use]
    pub fn new(input: &SimulationInput, retirement_age: u32, withdrawal_rate: f64) -> Self {
        let current_age = input.current_age;
        let annual_return = input.returns.rate_for_month(0);
        let monthly_income = input.monthly_income_at(current_age);
        let monthly_expenses = input.monthly_expenses_at(current_age);
        let monthly_savings = monthly_income - monthly_expenses;

        let retire_at = retirement_age.max(current_age);
        let monthly_spend_to_fund =
            (input.monthly_expenses_at(retire_at) - input.monthly_income_at(retire_at)).max(0.0);
        let target = target_nest_egg(monthly_spend_to_fund, withdrawal_rate);

        let balance_at_retirement = projected_balance(
            input.starting_balance,
            monthly_savings,
            annual_return,
            (retire_at - current_age) * 12,
        );

        let saving = current_age < retirement_age && monthly_savings > 0.0;
        let years_to_target = target.and_then(|target| {
            if input.starting_balance >= target {
                Some(0)
            } else if saving {
                years_until_target(
                    input.starting_balance,
                    monthly_savings,
                    annual_return,
                    target,
                    input.inflation.rate_for_month(0),
                )
            } else {
                None
            }
        });

        Self {
            current_age,
            retirement_age,
            withdrawal_rate,
            monthly_income,
            monthly_expenses,
            monthly_savings,
            monthly_spend_to_fund,
            target_nest_egg: target,
            balance_at_retirement,
            safe_monthly_spend: safe_monthly_spend(balance_at_retirement, withdrawal_rate),
            years_to_target,
        }
    }

    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.current_age >= self.retirement_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimulationBuilder, StreamBuilder};
    use crate::simulation::simulate;

    #[test]
    fn test_runway_summary_split() {
        let input = SimulationBuilder::new()
            .starting_balance(10_000.0)
            .stream(StreamBuilder::expense("Rent").amount(500.0))
            .build()
            .unwrap();
        let summary = RunwaySummary::from_result(&simulate(&input).unwrap());

        // 10,000 / 500 lasts 20 months; the balance goes negative in month 20
        assert_eq!(summary.months_funded, 20);
        assert_eq!(summary.years, 1);
        assert_eq!(summary.months, 8);
        assert!(summary.depleted);
        assert_eq!(summary.peak_balance, 10_000.0);
        assert_eq!(summary.total_expenses, 500.0 * 21.0);
    }

    #[test]
    fn test_nest_egg_and_safe_spend() {
        assert_eq!(target_nest_egg(4_000.0, DEFAULT_WITHDRAWAL_RATE), Some(1_200_000.0));
        assert_eq!(target_nest_egg(-10.0, 0.04), Some(0.0));
        assert_eq!(target_nest_egg(4_000.0, 0.0), None);
        assert!((safe_monthly_spend(1_200_000.0, 0.04) - 4_000.0).abs() < 1e-9);
        assert_eq!(withdrawal_rate(2_000.0, 600_000.0), Some(0.04));
        assert_eq!(withdrawal_rate(2_000.0, 0.0), None);
    }

    #[test]
    fn test_projected_balance() {
        assert_eq!(projected_balance(1_000.0, 100.0, 0.0, 12), 2_200.0);

        let fv = projected_balance(100_000.0, 0.0, 0.06, 12);
        let expected = 100_000.0 * (1.005f64).powi(12);
        assert!((fv - expected).abs() < 1e-6, "Expected ${expected:.2}, got ${fv:.2}");
    }

    #[test]
    fn test_years_until_target() {
        assert_eq!(years_until_target(500.0, 0.0, 0.0, 100.0, 0.03), Some(0));
        // 12,000 a year against a flat 36,000 target
        assert_eq!(years_until_target(0.0, 1_000.0, 0.0, 36_000.0, 0.0), Some(3));
        assert_eq!(years_until_target(0.0, 0.0, 0.05, 1.0, 0.0), None);
    }

    fn working_input(current_age: u32) -> SimulationInput {
        SimulationBuilder::new()
            .current_age(current_age)
            .retirement_age(65)
            .starting_balance(100_000.0)
            .salary("Salary", 5_000.0)
            .stream(StreamBuilder::expense("Living").amount(3_000.0))
            .pension("CPP", 1_000.0, 65)
            .build()
            .unwrap()
    }

    #[test]
    fn test_readiness_while_working() {
        let readiness = Readiness::new(&working_input(55), 65, DEFAULT_WITHDRAWAL_RATE);

        assert!(!readiness.is_retired());
        assert_eq!(readiness.monthly_income, 5_000.0);
        assert_eq!(readiness.monthly_expenses, 3_000.0);
        assert_eq!(readiness.monthly_savings, 2_000.0);
        // Salary stops at 65 while CPP starts, leaving 2,000 a month to fund
        assert_eq!(readiness.monthly_spend_to_fund, 2_000.0);
        assert_eq!(readiness.target_nest_egg, Some(600_000.0));
        assert_eq!(readiness.balance_at_retirement, 100_000.0 + 2_000.0 * 120.0);
        assert!((readiness.safe_monthly_spend - 340_000.0 * 0.04 / 12.0).abs() < 1e-9);
        // 24,000 a year from 100,000 passes 600,000 in the 21st year
        assert_eq!(readiness.years_to_target, Some(21));
    }

    #[test]
    fn test_readiness_once_retired() {
        let readiness = Readiness::new(&working_input(70), 65, DEFAULT_WITHDRAWAL_RATE);

        assert!(readiness.is_retired());
        assert_eq!(readiness.monthly_income, 1_000.0);
        assert_eq!(readiness.balance_at_retirement, 100_000.0);
        assert_eq!(readiness.years_to_target, None);

        let covered = Readiness::new(
            &working_input(70).with_starting_balance(1_000_000.0),
            65,
            DEFAULT_WITHDRAWAL_RATE,
        );
        assert_eq!(covered.years_to_target, Some(0));
    }
}
