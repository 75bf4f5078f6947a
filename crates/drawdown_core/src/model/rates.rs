//! Staged rates and the cumulative price index
//!
//! A [`RateSchedule`] is a piecewise-constant annual rate keyed by month index.
//! Both investment returns and inflation are expressed this way. The simulator
//! converts annual rates to monthly ones by simple division (`annual / 12`),
//! not by taking the compounded monthly equivalent.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// One piece of a staged rate: `annual_rate` applies from `start_month` (inclusive)
/// until the next stage starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateStage {
    pub start_month: u32,
    pub annual_rate: f64,
}

impl RateStage {
    #[must_use]
    pub fn new(start_month: u32, annual_rate: f64) -> Self {
        Self {
            start_month,
            annual_rate,
        }
    }
}

/// Validated, ascending list of rate stages covering month 0 onwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RateStage>", into = "Vec<RateStage>")]
pub struct RateSchedule {
    stages: Vec<RateStage>,
}

impl RateSchedule {
    /// Build a schedule, rejecting gaps at the start, unsorted or overlapping stages.
    pub fn new(stages: Vec<RateStage>) -> Result<Self, ScheduleError> {
        let first = stages.first().ok_or(ScheduleError::Empty)?;
        if first.start_month != 0 {
            return Err(ScheduleError::FirstStageNotAtZero {
                start_month: first.start_month,
            });
        }

        for (index, stage) in stages.iter().enumerate() {
            if !stage.annual_rate.is_finite() {
                return Err(ScheduleError::NonFiniteRate { index });
            }
            if index == 0 {
                continue;
            }
            let previous = stages[index - 1].start_month;
            if stage.start_month == previous {
                return Err(ScheduleError::Overlapping {
                    start_month: stage.start_month,
                });
            }
            if stage.start_month < previous {
                return Err(ScheduleError::Unsorted {
                    index,
                    previous,
                    start_month: stage.start_month,
                });
            }
        }

        Ok(Self { stages })
    }

    /// A single stage covering the whole horizon
    #[must_use]
    pub fn constant(annual_rate: f64) -> Self {
        Self {
            stages: vec![RateStage::new(0, annual_rate)],
        }
    }

    /// Annual rate in effect for month `month`
    #[must_use]
    pub fn rate_for_month(&self, month: u32) -> f64 {
        // Stages are sorted and the first starts at 0, so the partition point is >= 1
        let idx = self.stages.partition_point(|s| s.start_month <= month);
        self.stages[idx.saturating_sub(1)].annual_rate
    }

    /// Monthly rate for `month`: the annual rate divided by twelve
    #[must_use]
    #[inline]
    pub fn monthly_rate(&self, month: u32) -> f64 {
        self.rate_for_month(month) / 12.0
    }

    /// Return a copy with `stage` inserted, replacing any stage with the same start month.
    pub fn with_stage(&self, stage: RateStage) -> Result<Self, ScheduleError> {
        let mut stages = self.stages.clone();
        match stages.binary_search_by_key(&stage.start_month, |s| s.start_month) {
            Ok(pos) => stages[pos] = stage,
            Err(pos) => stages.insert(pos, stage),
        }
        Self::new(stages)
    }

    #[must_use]
    pub fn stages(&self) -> &[RateStage] {
        &self.stages
    }

    /// True when every stage carries the same rate
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.stages
            .iter()
            .all(|s| s.annual_rate == self.stages[0].annual_rate)
    }
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self::constant(0.0)
    }
}

impl TryFrom<Vec<RateStage>> for RateSchedule {
    type Error = ScheduleError;

    fn try_from(stages: Vec<RateStage>) -> Result<Self, Self::Error> {
        Self::new(stages)
    }
}

impl From<RateSchedule> for Vec<RateStage> {
    fn from(schedule: RateSchedule) -> Self {
        schedule.stages
    }
}

/// Cumulative price index built one month at a time.
///
/// `factor_at(0)` is 1.0 (today's dollars). After month `m` is simulated the
/// index is advanced by `1 + monthly_inflation(m)`, so staged inflation changes
/// are picked up without recomputing earlier months.
#[derive(Debug, Clone)]
pub struct CumulativeIndex {
    factors: Vec<f64>,
}

impl CumulativeIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[must_use]
    pub fn with_capacity(months: usize) -> Self {
        let mut factors = Vec::with_capacity(months + 1);
        factors.push(1.0);
        Self { factors }
    }

    /// Append the factor for the next month
    pub fn advance(&mut self, monthly_rate: f64) {
        let last = self.current();
        self.factors.push(last * (1.0 + monthly_rate));
    }

    /// Factor for the most recent month
    #[must_use]
    pub fn current(&self) -> f64 {
        // Never empty: constructed with the month-0 factor
        self.factors[self.factors.len() - 1]
    }

    /// Cumulative factor at the start of `month`, if the index has reached it
    #[must_use]
    pub fn factor_at(&self, month: u32) -> Option<f64> {
        self.factors.get(month as usize).copied()
    }

    /// Inflation accumulated between `start_month` and `month`
    #[must_use]
    pub fn growth_since(&self, start_month: u32, month: u32) -> Option<f64> {
        Some(self.factor_at(month)? / self.factor_at(start_month)?)
    }
}

impl Default for CumulativeIndex {
    fn default() -> Self {
        Self::new()
    }
}
