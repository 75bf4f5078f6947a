//! Event timeline
//!
//! Resolves recurring streams and one-time events into the cash effect of a
//! single simulated month. Built once per run and never mutated.

use crate::config::SimulationInput;
use crate::model::{CumulativeIndex, Direction, Flow, Indexation, OneTimeEvent, RecurringStream};

/// Cash moved in one month, split by source
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthFlows {
    pub recurring_income: f64,
    pub recurring_expenses: f64,
    pub one_time_inflows: f64,
    pub one_time_outflows: f64,
}

impl MonthFlows {
    #[must_use]
    pub fn income(&self) -> f64 {
        self.recurring_income + self.one_time_inflows
    }

    #[must_use]
    pub fn expenses(&self) -> f64 {
        self.recurring_expenses + self.one_time_outflows
    }

    /// Net effect of one-time events alone
    #[must_use]
    pub fn one_time_amount(&self) -> f64 {
        self.one_time_inflows - self.one_time_outflows
    }

    #[must_use]
    pub fn net(&self) -> f64 {
        self.income() - self.expenses()
    }
}

/// A one-time event firing in a given month
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<'a> {
    pub label: &'a str,
    /// Positive for inflows
    pub amount: f64,
}

#[derive(Debug, Clone)]
struct ScheduledStream<'a> {
    stream: &'a RecurringStream,
    start_month: u32,
    end_month: u32,
    monthly_amount: f64,
}

#[derive(Debug, Clone)]
struct ScheduledEvent<'a> {
    event: &'a OneTimeEvent,
    first_month: u32,
    repeat_months: Option<u32>,
}

impl ScheduledEvent<'_> {
    fn fires_in(&self, month: u32) -> bool {
        match (month.checked_sub(self.first_month), self.repeat_months) {
            (Some(0), _) => true,
            (Some(elapsed), Some(every)) => elapsed % every == 0,
            _ => false,
        }
    }
}

/// Streams and events of one input, pre-resolved to month indices
#[derive(Debug, Clone)]
pub struct EventTimeline<'a> {
    current_age: u32,
    streams: Vec<ScheduledStream<'a>>,
    events: Vec<ScheduledEvent<'a>>,
}

impl<'a> EventTimeline<'a> {
    pub fn new(input: &'a SimulationInput) -> Self {
        let current_age = input.current_age;
        let month_of = |age: u32| age.saturating_sub(current_age) * 12;

        let streams = input
            .streams
            .iter()
            .map(|stream| ScheduledStream {
                stream,
                start_month: month_of(stream.start_age),
                end_month: month_of(stream.resolved_end_age(input.plan_until_age)),
                monthly_amount: stream.monthly_amount(),
            })
            .collect();

        // Events dated before the current age have already happened
        let events = input
            .events
            .iter()
            .filter_map(|event| {
                let age = event.liquid_age()?;
                let first_month = input.month_at_age(age)?;
                Some(ScheduledEvent {
                    event,
                    first_month,
                    repeat_months: event.repeat_every_years.map(|years| years * 12),
                })
            })
            .collect();

        Self {
            current_age,
            streams,
            events,
        }
    }

    /// Integer age during month `month`
    #[must_use]
    #[inline]
    pub fn age_at(&self, month: u32) -> u32 {
        self.current_age + month / 12
    }

    /// Cash effect of month `month`. `index` must already cover `month`.
    #[must_use]
    pub fn net_flow_for_month(&self, month: u32, index: &CumulativeIndex) -> MonthFlows {
        let mut flows = MonthFlows::default();

        for scheduled in &self.streams {
            if month < scheduled.start_month || month >= scheduled.end_month {
                continue;
            }
            let amount = scheduled.monthly_amount
                * inflation_factor(scheduled.stream.indexation, scheduled.start_month, month, index);
            match scheduled.stream.direction {
                Direction::Income => flows.recurring_income += amount,
                Direction::Expense => flows.recurring_expenses += amount,
            }
        }

        for scheduled in self.events.iter().filter(|e| e.fires_in(month)) {
            let amount = scheduled.event.liquid_amount();
            match scheduled.event.direction {
                Flow::Inflow => flows.one_time_inflows += amount,
                Flow::Outflow => flows.one_time_outflows += amount,
            }
        }

        flows
    }

    /// One-time events firing in `month`, in declaration order
    #[must_use]
    pub fn occurrences(&self, month: u32) -> Vec<Occurrence<'a>> {
        self.events
            .iter()
            .filter(|e| e.fires_in(month))
            .map(|e| Occurrence {
                label: &e.event.label,
                amount: e.event.signed_amount(),
            })
            .collect()
    }

    /// Months in which any one-time event fires, up to `horizon_months`
    #[must_use]
    pub fn event_months(&self, horizon_months: u32) -> Vec<u32> {
        (0..horizon_months)
            .filter(|&m| self.events.iter().any(|e| e.fires_in(m)))
            .collect()
    }
}

fn inflation_factor(
    indexation: Indexation,
    start_month: u32,
    month: u32,
    index: &CumulativeIndex,
) -> f64 {
    match indexation {
        Indexation::Today => index.factor_at(month),
        Indexation::StreamStart => index.growth_since(start_month, month),
        Indexation::Nominal => Some(1.0),
    }
    .unwrap_or_else(|| index.current())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EventBuilder, SimulationBuilder, StreamBuilder};
    use crate::model::RateSchedule;

    fn index_through(months: u32, annual_inflation: f64) -> CumulativeIndex {
        let schedule = RateSchedule::constant(annual_inflation);
        let mut index = CumulativeIndex::with_capacity(months as usize);
        for m in 0..months {
            index.advance(schedule.monthly_rate(m));
        }
        index
    }

    #[test]
    fn test_age_at() {
        let input = SimulationBuilder::new().current_age(60).build().unwrap();
        let timeline = EventTimeline::new(&input);
        assert_eq!(timeline.age_at(0), 60);
        assert_eq!(timeline.age_at(11), 60);
        assert_eq!(timeline.age_at(12), 61);
        assert_eq!(timeline.age_at(60), 65);
    }

    #[test]
    fn test_stream_window_and_direction() {
        let input = SimulationBuilder::new()
            .current_age(60)
            .stream(StreamBuilder::income("Part-time").amount(1_500.0).until_age(62))
            .stream(StreamBuilder::expense("Rent").amount(2_000.0))
            .build()
            .unwrap();
        let timeline = EventTimeline::new(&input);
        let index = CumulativeIndex::new();

        let flows = timeline.net_flow_for_month(0, &index);
        assert_eq!(flows.recurring_income, 1_500.0);
        assert_eq!(flows.recurring_expenses, 2_000.0);
        assert_eq!(flows.net(), -500.0);

        let index = index_through(24, 0.0);
        let flows = timeline.net_flow_for_month(24, &index);
        assert_eq!(flows.recurring_income, 0.0);
        assert_eq!(flows.recurring_expenses, 2_000.0);
    }

    #[test]
    fn test_indexation_modes() {
        let input = SimulationBuilder::new()
            .current_age(60)
            .stream(StreamBuilder::expense("Today").amount(100.0))
            .stream(
                StreamBuilder::income("Pension")
                    .amount(100.0)
                    .starting_at_age(61)
                    .indexed_from_start(),
            )
            .stream(StreamBuilder::expense("Fixed").amount(100.0).nominal())
            .build()
            .unwrap();
        let timeline = EventTimeline::new(&input);
        let index = index_through(13, 0.12);

        let flows = timeline.net_flow_for_month(12, &index);
        let factor_12 = index.factor_at(12).unwrap();
        assert!((flows.recurring_expenses - (100.0 * factor_12 + 100.0)).abs() < 1e-9);
        // First payment of a start-indexed stream is exactly its stated amount
        assert_eq!(flows.recurring_income, 100.0);

        let flows = timeline.net_flow_for_month(13, &index);
        assert!((flows.recurring_income - 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_events_fire_once_at_first_month_of_age() {
        let input = SimulationBuilder::new()
            .current_age(60)
            .event(EventBuilder::inflow("Gift").at_age(62).amount(5_000.0))
            .event(EventBuilder::outflow("Old bill").at_age(55).amount(1_000.0))
            .build()
            .unwrap();
        let timeline = EventTimeline::new(&input);
        let index = index_through(40, 0.0);

        assert_eq!(timeline.net_flow_for_month(23, &index).one_time_amount(), 0.0);
        assert_eq!(timeline.net_flow_for_month(24, &index).one_time_inflows, 5_000.0);
        assert_eq!(timeline.net_flow_for_month(25, &index).one_time_amount(), 0.0);
        assert_eq!(timeline.event_months(40), vec![24]);
        assert_eq!(
            timeline.occurrences(24),
            vec![Occurrence {
                label: "Gift",
                amount: 5_000.0
            }]
        );
    }

    #[test]
    fn test_repeating_event() {
        let input = SimulationBuilder::new()
            .current_age(65)
            .event(
                EventBuilder::outflow("Car")
                    .at_age(66)
                    .amount(30_000.0)
                    .every_years(5),
            )
            .build()
            .unwrap();
        let timeline = EventTimeline::new(&input);
        assert_eq!(timeline.event_months(200), vec![12, 72, 132, 192]);
    }

    #[test]
    fn test_asset_sale_moves_cash_only_when_sold() {
        let input = SimulationBuilder::new()
            .current_age(60)
            .event(
                EventBuilder::inflow("House")
                    .at_age(70)
                    .amount(100_000.0)
                    .sold_at(75, 100_000.0),
            )
            .build()
            .unwrap();
        let timeline = EventTimeline::new(&input);
        assert_eq!(timeline.event_months(420), vec![180]);
        assert!(timeline.occurrences(120).is_empty());
    }
}
