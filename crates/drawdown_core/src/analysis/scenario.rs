//! What-if scenarios
//!
//! A [`Scenario`] is a named list of [`Override`]s applied to a copy of the
//! baseline input. [`compare`] simulates the baseline and every scenario
//! independently and reports how each scenario differs from the baseline.

use serde::{Deserialize, Serialize};

use crate::config::SimulationInput;
use crate::error::{InputError, ScenarioError};
use crate::model::{
    Direction, Frequency, Indexation, OneTimeEvent, RateStage, RecurringStream, SimulationResult,
};
use crate::simulation;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Label of the stream added by [`Override::AdjustMonthlyExpenses`]
pub const EXPENSE_ADJUSTMENT_STREAM: &str = "expense adjustment";

/// A single field-level change to a simulation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Override {
    StartingBalance(f64),

    /// Add to (or, when negative, subtract from) the starting balance
    AdjustStartingBalance(f64),

    HorizonMonths(u32),

    AddStream(RecurringStream),

    RemoveStream { label: String },

    /// Multiply every stream labelled `label` by `factor`
    ScaleStream { label: String, factor: f64 },

    /// Change monthly spending by `delta` in today's dollars for the whole plan
    AdjustMonthlyExpenses(f64),

    AddEvent(OneTimeEvent),

    ReturnStage(RateStage),

    InflationStage(RateStage),
}

impl Override {
    pub fn apply(&self, input: &mut SimulationInput) -> Result<(), InputError> {
        match self {
            Override::StartingBalance(balance) => input.starting_balance = *balance,
            Override::AdjustStartingBalance(delta) => input.starting_balance += delta,
            Override::HorizonMonths(months) => input.horizon_months = *months,
            Override::AddStream(stream) => input.streams.push(stream.clone()),
            Override::RemoveStream { label } => {
                let before = input.streams.len();
                input.streams.retain(|s| &s.label != label);
                if input.streams.len() == before {
                    return Err(InputError::UnknownStream(label.clone()));
                }
            }
            Override::ScaleStream { label, factor } => {
                let mut found = false;
                for stream in input.streams.iter_mut().filter(|s| &s.label == label) {
                    stream.amount *= factor;
                    found = true;
                }
                if !found {
                    return Err(InputError::UnknownStream(label.clone()));
                }
            }
            Override::AdjustMonthlyExpenses(delta) => {
                // A spending cut is modelled as an equal income
                let direction = if *delta < 0.0 {
                    Direction::Income
                } else {
                    Direction::Expense
                };
                input.streams.push(RecurringStream {
                    label: EXPENSE_ADJUSTMENT_STREAM.to_string(),
                    amount: delta.abs(),
                    frequency: Frequency::Monthly,
                    start_age: input.current_age,
                    end_age: None,
                    direction,
                    indexation: Indexation::Today,
                });
            }
            Override::AddEvent(event) => input.events.push(event.clone()),
            Override::ReturnStage(stage) => input.returns = input.returns.with_stage(*stage)?,
            Override::InflationStage(stage) => {
                input.inflation = input.inflation.with_stage(*stage)?;
            }
        }
        Ok(())
    }
}

/// A named set of overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub overrides: Vec<Override>,
}

impl Scenario {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, change: Override) -> Self {
        self.overrides.push(change);
        self
    }

    /// Baseline with every override applied in order, validated
    pub fn apply(&self, baseline: &SimulationInput) -> Result<SimulationInput, ScenarioError> {
        let mut input = baseline.clone();
        self.overrides
            .iter()
            .try_for_each(|o| o.apply(&mut input))
            .and_then(|()| input.validate())
            .map_err(|source| ScenarioError {
                scenario: self.name.clone(),
                source,
            })?;
        Ok(input)
    }
}

/// Scenario outcome relative to the baseline (scenario minus baseline)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDelta {
    /// Extra months the balance lasts
    pub months_funded: i64,

    /// Difference in depletion age, when both runs deplete
    pub depletion_age: Option<f64>,

    /// Difference in balance at the end of the shorter horizon, when neither
    /// run has depleted by then
    pub ending_balance: Option<f64>,

    pub common_horizon_months: u32,
}

impl ScenarioDelta {
    #[must_use]
    pub fn between(baseline: &SimulationResult, scenario: &SimulationResult) -> Self {
        let common = baseline.horizon_months.min(scenario.horizon_months);
        let balance_at_common = |r: &SimulationResult| {
            let depleted_early = r.outcome.depletion_month().is_some_and(|m| m < common);
            if depleted_early {
                None
            } else {
                r.trajectory.balance_after(common, r.starting_balance)
            }
        };

        let depletion_age = baseline
            .outcome
            .age_at_depletion()
            .zip(scenario.outcome.age_at_depletion())
            .map(|(b, s)| s - b);
        let ending_balance = balance_at_common(baseline)
            .zip(balance_at_common(scenario))
            .map(|(b, s)| s - b);

        Self {
            months_funded: i64::from(scenario.months_funded()) - i64::from(baseline.months_funded()),
            depletion_age,
            ending_balance,
            common_horizon_months: common,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub result: SimulationResult,
    pub delta: ScenarioDelta,
}

/// Baseline run and every scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub baseline: SimulationResult,
    pub scenarios: Vec<ScenarioResult>,
}

impl Comparison {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScenarioResult> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Scenario whose balance lasts longest, ties broken by ending balance
    #[must_use]
    pub fn longest_lasting(&self) -> Option<&ScenarioResult> {
        self.scenarios.iter().max_by(|a, b| {
            a.result
                .months_funded()
                .cmp(&b.result.months_funded())
                .then(a.result.final_balance().total_cmp(&b.result.final_balance()))
        })
    }
}

/// Simulate `baseline` and each scenario and compute deltas.
///
/// Fails on the first scenario whose overrides produce an invalid input;
/// nothing is simulated in that case.
pub fn compare(baseline: &SimulationInput, scenarios: &[Scenario]) -> Result<Comparison, ScenarioError> {
    baseline.validate().map_err(|source| ScenarioError {
        scenario: "baseline".to_string(),
        source,
    })?;
    let inputs = scenarios
        .iter()
        .map(|s| s.apply(baseline))
        .collect::<Result<Vec<_>, _>>()?;

    let baseline_result = simulation::run(baseline);

    #[cfg(feature = "parallel")]
    let results: Vec<SimulationResult> = inputs.par_iter().map(simulation::run).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<SimulationResult> = inputs.iter().map(simulation::run).collect();

    let scenarios = scenarios
        .iter()
        .zip(results)
        .map(|(scenario, result)| {
            let delta = ScenarioDelta::between(&baseline_result, &result);
            tracing::debug!(
                scenario = %scenario.name,
                months_funded = delta.months_funded,
                "scenario compared"
            );
            ScenarioResult {
                name: scenario.name.clone(),
                result,
                delta,
            }
        })
        .collect();

    Ok(Comparison {
        baseline: baseline_result,
        scenarios,
    })
}
