//! Drawdown simulator
//!
//! Steps a balance forward one month at a time. Each month applies, in order:
//! growth on the opening balance, the month's cash flows from the
//! [`EventTimeline`], then the closing balance. The run stops at the first
//! month whose closing balance is negative, or at the horizon.

use crate::config::SimulationInput;
use crate::error::InputError;
use crate::model::{CumulativeIndex, MonthRecord, Outcome, SimulationResult, Trajectory};
use crate::timeline::EventTimeline;

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

/// Run one projection. Fails only when `input` violates a structural invariant.
pub fn simulate(input: &SimulationInput) -> Result<SimulationResult, InputError> {
    input.validate()?;
    Ok(run(input))
}

/// Simulate independent inputs, in parallel when the `parallel` feature is on.
/// Results keep the order of `inputs`.
pub fn simulate_all(inputs: &[SimulationInput]) -> Vec<Result<SimulationResult, InputError>> {
    #[cfg(feature = "parallel")]
    {
        inputs.par_iter().map(simulate).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        inputs.iter().map(simulate).collect()
    }
}

/// Simulation loop over an already validated input
pub(crate) fn run(input: &SimulationInput) -> SimulationResult {
    let timeline = EventTimeline::new(input);
    let horizon = input.horizon_months;

    let mut index = CumulativeIndex::with_capacity(horizon as usize);
    let mut records = Vec::with_capacity(horizon as usize);
    let mut balance = input.starting_balance;
    let mut outcome = Outcome::Sustained;

    for month in 0..horizon {
        let balance_start = balance;
        let growth = balance_start * input.returns.monthly_rate(month);

        let flows = timeline.net_flow_for_month(month, &index);
        let income = flows.income();
        let expenses = flows.expenses();
        let net_cash_flow = income - expenses;

        balance = balance_start + growth + net_cash_flow;

        records.push(MonthRecord {
            month_index: month,
            age: timeline.age_at(month),
            balance_start,
            growth,
            income,
            expenses,
            net_cash_flow,
            balance_end: balance,
        });

        if balance < 0.0 {
            let age_at_depletion = f64::from(input.current_age) + f64::from(month) / 12.0;
            tracing::trace!(month, age_at_depletion, balance, "balance depleted");
            outcome = Outcome::Depleted {
                depletion_month: month,
                age_at_depletion,
            };
            break;
        }

        index.advance(input.inflation.monthly_rate(month));
    }

    SimulationResult {
        starting_balance: input.starting_balance,
        current_age: input.current_age,
        horizon_months: horizon,
        trajectory: Trajectory::from_records(records),
        outcome,
    }
}
