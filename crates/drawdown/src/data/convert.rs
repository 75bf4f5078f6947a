//! Conversion from the YAML plan record to engine input
//!
//! Ages are resolved once, against an "as of" date, and everything else is
//! expressed relative to the resulting current age.

use drawdown_core::analysis::{Override, Scenario};
use drawdown_core::config::{EventBuilder, SimulationBuilder, SimulationInput, StreamBuilder};
use drawdown_core::error::InputError;
use drawdown_core::model::{Account, AccountKind, Budget, NetWorth, Profile, RateStage, net_worth};
use jiff::civil::Date;
use thiserror::Error;

use super::plan_data::{
    AccountType, BudgetType, Cadence, ExpenditureData, InheritanceType, PlanData, ScenarioData,
    ScenarioType,
};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid date format: {0}")]
    InvalidDate(String),

    #[error("birth date {dob} is after {as_of}")]
    BornInFuture { dob: Date, as_of: Date },

    #[error("plan needs either personal.dob or personal.current_age")]
    MissingAge,

    #[error("inherited property is marked for sale but has no sell_age")]
    MissingSellAge,

    #[error(transparent)]
    Input(#[from] InputError),
}

/// Whole years between `dob` and `as_of`
pub fn age_on(dob: Date, as_of: Date) -> Result<u32, ConvertError> {
    if dob > as_of {
        return Err(ConvertError::BornInFuture { dob, as_of });
    }
    let mut years = as_of.year() - dob.year();
    // Birthday not reached yet this year
    if (as_of.month(), as_of.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    Ok(u32::try_from(years).unwrap_or(0))
}

/// Current age from the birth date, or the stated age when there is none
pub fn current_age(data: &PlanData, as_of: Date) -> Result<u32, ConvertError> {
    match (&data.personal.dob, data.personal.current_age) {
        (Some(dob), _) => age_on(parse_date(dob)?, as_of),
        (None, Some(age)) => Ok(age),
        (None, None) => Err(ConvertError::MissingAge),
    }
}

pub fn accounts(data: &PlanData) -> Vec<Account> {
    data.accounts
        .iter()
        .map(|a| Account {
            label: a.name.clone(),
            balance: a.balance,
            kind: match a.account_type {
                AccountType::Bank => AccountKind::Bank,
                AccountType::Investments => AccountKind::Investments,
                AccountType::Property => AccountKind::Property,
                AccountType::Other => AccountKind::Other,
                AccountType::Liability => AccountKind::Liability,
            },
        })
        .collect()
}

pub fn plan_net_worth(data: &PlanData) -> NetWorth {
    net_worth(&accounts(data))
}

/// Ages and liquid balance, validated
pub fn to_profile(data: &PlanData, as_of: Date) -> Result<Profile, ConvertError> {
    let profile = Profile {
        current_age: current_age(data, as_of)?,
        retirement_age: data.personal.retirement_age,
        plan_until_age: data.personal.life_expectancy,
        current_balance: plan_net_worth(data).liquid,
    };
    profile.validate()?;
    Ok(profile)
}

/// Expense lines grouped by category
pub fn budget(data: &PlanData) -> Budget {
    let mut budget = Budget::new();
    for item in data
        .budget
        .iter()
        .filter(|i| i.budget_type == BudgetType::Expense)
    {
        budget.insert_monthly(item.group(), item.monthly_amount());
    }
    budget
}

/// Convert a plan into a validated simulation input
pub fn to_simulation_input(data: &PlanData, as_of: Date) -> Result<SimulationInput, ConvertError> {
    let profile = to_profile(data, as_of)?;
    let market = &data.market;

    let mut builder = SimulationBuilder::from_profile(&profile)
        .return_rate(market.return_rate)
        .inflation(market.inflation_rate)
        .budget(&budget(data));

    for stage in &market.return_stages {
        builder = builder.return_rate_from_age(stage.age, stage.rate);
    }
    for stage in &market.inflation_stages {
        builder = builder.inflation_from_age(stage.age, stage.rate);
    }

    for item in data
        .budget
        .iter()
        .filter(|i| i.budget_type == BudgetType::Income)
    {
        builder = builder.salary(&item.name, item.monthly_amount());
    }

    let gov = &data.government;
    if gov.cpp_amount > 0.0 {
        builder = builder.pension("CPP", gov.cpp_amount, gov.cpp_start_age);
    }
    if gov.oas_amount > 0.0 {
        builder = builder.pension("OAS", gov.oas_amount, gov.oas_start_age);
    }

    if let Some(inheritance) = data.inheritance.as_ref().filter(|i| i.amount > 0.0) {
        let event = EventBuilder::inflow("Inheritance")
            .at_age(inheritance.age)
            .amount(inheritance.amount);
        let event = match inheritance.inheritance_type {
            InheritanceType::Cash => event,
            InheritanceType::Property if inheritance.sell_property => {
                let sell_age = inheritance.sell_age.ok_or(ConvertError::MissingSellAge)?;
                event.sold_at(sell_age, inheritance.sale_amount.unwrap_or(inheritance.amount))
            }
            InheritanceType::Property => event.kept_as_asset(),
        };
        builder = builder.event(event);
    }

    for item in &data.annual_expenditures {
        builder = add_expenditure(builder, item);
    }

    let input = builder.build()?;
    tracing::info!(
        current_age = input.current_age,
        plan_until_age = input.plan_until_age,
        starting_balance = input.starting_balance,
        streams = input.streams.len(),
        events = input.events.len(),
        "Converted plan"
    );
    Ok(input)
}

fn add_expenditure(builder: SimulationBuilder, item: &ExpenditureData) -> SimulationBuilder {
    match cash_flow(&item.name, item.amount, item.frequency, item.start_age, Flow::Out) {
        CashFlow::Stream(stream) => builder.stream(stream),
        CashFlow::Event(event) => builder.event(event),
    }
}

/// Turn each scenario row into engine overrides
pub fn to_scenarios(data: &PlanData, current_age: u32) -> Vec<Scenario> {
    data.scenarios
        .iter()
        .map(|row| to_scenario(row, current_age))
        .collect()
}

fn to_scenario(row: &ScenarioData, current_age: u32) -> Scenario {
    let mut scenario = Scenario::new(&row.name);
    let age = row.age.unwrap_or(current_age);

    if row.impact != 0.0 {
        let flow = match row.scenario_type {
            ScenarioType::Cost => Flow::Out,
            ScenarioType::Gain => Flow::In,
        };
        let change = match cash_flow(&row.name, row.impact.abs(), row.frequency, age, flow) {
            // Scenario amounts are fixed dollar figures
            CashFlow::Stream(stream) => Override::AddStream(stream.nominal().build(current_age)),
            CashFlow::Event(event) => Override::AddEvent(event.build(current_age)),
        };
        scenario = scenario.with(change);
    }

    let start_month = age.saturating_sub(current_age) * 12;
    if let Some(rate) = row.return_rate {
        scenario = scenario.with(Override::ReturnStage(RateStage::new(start_month, rate)));
    }
    if let Some(rate) = row.inflation_rate {
        scenario = scenario.with(Override::InflationStage(RateStage::new(start_month, rate)));
    }

    row.overrides
        .iter()
        .cloned()
        .fold(scenario, |scenario, change| scenario.with(change))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    In,
    Out,
}

enum CashFlow {
    Stream(StreamBuilder),
    Event(EventBuilder),
}

/// Recurring amounts become streams, lump sums become events
fn cash_flow(label: &str, amount: f64, cadence: Cadence, age: u32, flow: Flow) -> CashFlow {
    let stream = || match flow {
        Flow::In => StreamBuilder::income(label),
        Flow::Out => StreamBuilder::expense(label),
    };
    let event = || match flow {
        Flow::In => EventBuilder::inflow(label),
        Flow::Out => EventBuilder::outflow(label),
    };

    match cadence {
        Cadence::Monthly => CashFlow::Stream(stream().amount(amount).starting_at_age(age)),
        Cadence::TwicePerYear => {
            CashFlow::Stream(stream().annually(amount * 2.0).starting_at_age(age))
        }
        Cadence::OneTime => CashFlow::Event(event().at_age(age).amount(amount)),
        Cadence::EveryYears(years) => {
            CashFlow::Event(event().at_age(age).amount(amount).every_years(years))
        }
    }
}

fn parse_date(s: &str) -> Result<Date, ConvertError> {
    s.parse::<Date>()
        .map_err(|_| ConvertError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::plan_data::{
        AccountData, AgeRate, BudgetFrequency, BudgetItem, InheritanceData,
    };
    use drawdown_core::model::{Direction, Indexation};
    use jiff::civil::date;

    fn as_of() -> Date {
        date(2026, 6, 1)
    }

    fn sample_plan() -> PlanData {
        let mut plan = PlanData::default();
        plan.personal.dob = Some("1966-03-15".to_string());
        plan.personal.retirement_age = 62;
        plan.personal.life_expectancy = 90;
        plan.accounts = vec![
            AccountData {
                name: "Savings".into(),
                account_type: AccountType::Bank,
                balance: 50_000.0,
            },
            AccountData {
                name: "RRSP".into(),
                account_type: AccountType::Investments,
                balance: 250_000.0,
            },
            AccountData {
                name: "House".into(),
                account_type: AccountType::Property,
                balance: 600_000.0,
            },
            AccountData {
                name: "Line of credit".into(),
                account_type: AccountType::Liability,
                balance: 20_000.0,
            },
        ];
        plan.budget = vec![
            BudgetItem {
                name: "Salary".into(),
                category: Some("Work".into()),
                amount: 6_000.0,
                budget_type: BudgetType::Income,
                frequency: BudgetFrequency::Monthly,
            },
            BudgetItem {
                name: "Groceries".into(),
                category: Some("Food".into()),
                amount: 700.0,
                budget_type: BudgetType::Expense,
                frequency: BudgetFrequency::Monthly,
            },
            BudgetItem {
                name: "Restaurants".into(),
                category: Some("Food".into()),
                amount: 2_400.0,
                budget_type: BudgetType::Expense,
                frequency: BudgetFrequency::Annually,
            },
        ];
        plan.government.cpp_amount = 900.0;
        plan.government.cpp_start_age = 65;
        plan
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let dob = date(1966, 3, 15);
        assert_eq!(age_on(dob, date(2026, 3, 14)).unwrap(), 59);
        assert_eq!(age_on(dob, date(2026, 3, 15)).unwrap(), 60);
        assert_eq!(age_on(dob, date(2026, 12, 31)).unwrap(), 60);
        assert!(matches!(
            age_on(dob, date(1960, 1, 1)),
            Err(ConvertError::BornInFuture { .. })
        ));
    }

    #[test]
    fn test_current_age_sources() {
        let mut plan = PlanData::default();
        assert!(matches!(current_age(&plan, as_of()), Err(ConvertError::MissingAge)));

        plan.personal.current_age = Some(61);
        assert_eq!(current_age(&plan, as_of()).unwrap(), 61);

        // Birth date wins over a stated age
        plan.personal.dob = Some("1970-01-01".into());
        assert_eq!(current_age(&plan, as_of()).unwrap(), 56);

        plan.personal.dob = Some("01/01/1970".into());
        assert!(matches!(
            current_age(&plan, as_of()),
            Err(ConvertError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_profile_uses_liquid_net_worth() {
        let plan = sample_plan();
        let profile = to_profile(&plan, as_of()).unwrap();
        assert_eq!(profile.current_age, 60);
        assert_eq!(profile.retirement_age, 62);
        assert_eq!(profile.plan_until_age, 90);
        assert_eq!(profile.current_balance, 280_000.0);

        let nw = plan_net_worth(&plan);
        assert_eq!(nw.total(), 880_000.0);
    }

    #[test]
    fn test_simulation_input_streams() {
        let input = to_simulation_input(&sample_plan(), as_of()).unwrap();
        assert_eq!(input.current_age, 60);
        assert_eq!(input.horizon_months, 30 * 12);
        assert_eq!(input.starting_balance, 280_000.0);

        let food = input.streams.iter().find(|s| s.label == "Food").unwrap();
        assert_eq!(food.direction, Direction::Expense);
        assert_eq!(food.monthly_amount(), 900.0);

        let salary = input.streams.iter().find(|s| s.label == "Salary").unwrap();
        assert_eq!(salary.direction, Direction::Income);
        assert_eq!(salary.end_age, Some(62));

        let cpp = input.streams.iter().find(|s| s.label == "CPP").unwrap();
        assert_eq!(cpp.start_age, 65);
        assert_eq!(cpp.indexation, Indexation::StreamStart);

        // No OAS amount, no stream
        assert!(input.streams.iter().all(|s| s.label != "OAS"));
    }

    #[test]
    fn test_market_stages_by_age() {
        let mut plan = sample_plan();
        plan.market.return_rate = 0.06;
        plan.market.return_stages = vec![AgeRate { age: 70, rate: 0.04 }];
        let input = to_simulation_input(&plan, as_of()).unwrap();

        assert_eq!(input.returns.rate_for_month(119), 0.06);
        assert_eq!(input.returns.rate_for_month(120), 0.04);
        assert_eq!(input.inflation.rate_for_month(0), 0.03);
    }

    #[test]
    fn test_inheritance_forms() {
        let mut plan = sample_plan();
        plan.inheritance = Some(InheritanceData {
            age: 70,
            amount: 300_000.0,
            inheritance_type: InheritanceType::Property,
            sell_property: true,
            sell_age: Some(75),
            sale_amount: None,
        });
        let input = to_simulation_input(&plan, as_of()).unwrap();
        let house = &input.events[0];
        assert!(house.is_asset_sale);
        assert_eq!(house.liquid_age(), Some(75));
        assert_eq!(house.liquid_amount(), 300_000.0);

        plan.inheritance = Some(InheritanceData {
            sell_age: None,
            ..plan.inheritance.clone().unwrap()
        });
        assert!(matches!(
            to_simulation_input(&plan, as_of()),
            Err(ConvertError::MissingSellAge)
        ));

        plan.inheritance = Some(InheritanceData {
            inheritance_type: InheritanceType::Cash,
            sell_property: false,
            ..plan.inheritance.clone().unwrap()
        });
        let input = to_simulation_input(&plan, as_of()).unwrap();
        assert!(!input.events[0].is_asset_sale);
        assert_eq!(input.events[0].liquid_age(), Some(70));
    }

    #[test]
    fn test_expenditures() {
        let mut plan = sample_plan();
        plan.annual_expenditures = vec![
            ExpenditureData {
                name: "Trip".into(),
                amount: 5_000.0,
                frequency: Cadence::EveryYears(2),
                start_age: 63,
            },
            ExpenditureData {
                name: "Roof".into(),
                amount: 20_000.0,
                frequency: Cadence::OneTime,
                start_age: 68,
            },
            ExpenditureData {
                name: "Golf".into(),
                amount: 300.0,
                frequency: Cadence::TwicePerYear,
                start_age: 62,
            },
        ];
        let input = to_simulation_input(&plan, as_of()).unwrap();

        let trip = input.events.iter().find(|e| e.label == "Trip").unwrap();
        assert_eq!(trip.repeat_every_years, Some(2));
        let roof = input.events.iter().find(|e| e.label == "Roof").unwrap();
        assert_eq!(roof.repeat_every_years, None);
        assert_eq!(roof.age_at_occurrence, 68);

        let golf = input.streams.iter().find(|s| s.label == "Golf").unwrap();
        assert_eq!(golf.monthly_amount(), 50.0);
        assert_eq!(golf.start_age, 62);
    }

    #[test]
    fn test_sample_plan_converts() {
        let plan = PlanData::sample();
        let input = to_simulation_input(&plan, as_of()).unwrap();
        assert_eq!(input.current_age, 45);
        assert_eq!(input.horizon_months, 50 * 12);
        assert_eq!(input.starting_balance, 280_000.0);
        assert_eq!(to_scenarios(&plan, input.current_age).len(), 1);
    }

    #[test]
    fn test_retiree_income_lines_are_ignored() {
        for age in [62, 70] {
            let mut plan = sample_plan();
            plan.personal.dob = None;
            plan.personal.current_age = Some(age);

            let input = to_simulation_input(&plan, as_of()).unwrap();
            assert_eq!(input.current_age, age);
            assert!(input.streams.iter().all(|s| s.label != "Salary"));
            assert!(input.streams.iter().any(|s| s.label == "CPP"));
        }
    }

    #[test]
    fn test_retirement_after_plan_end_is_rejected() {
        let mut plan = sample_plan();
        plan.personal.retirement_age = 95;
        assert!(matches!(
            to_profile(&plan, as_of()),
            Err(ConvertError::Input(InputError::RetirementNotBeforePlanEnd { .. }))
        ));
    }

    #[test]
    fn test_scenarios_become_overrides() {
        let mut plan = sample_plan();
        plan.scenarios = vec![
            ScenarioData {
                name: "Cottage".into(),
                age: Some(70),
                scenario_type: ScenarioType::Cost,
                impact: 150_000.0,
                frequency: Cadence::OneTime,
                return_rate: None,
                inflation_rate: None,
                overrides: Vec::new(),
            },
            ScenarioData {
                name: "Consulting".into(),
                age: None,
                scenario_type: ScenarioType::Gain,
                impact: 1_500.0,
                frequency: Cadence::Monthly,
                return_rate: Some(0.04),
                inflation_rate: None,
                overrides: vec![Override::AdjustStartingBalance(-10_000.0)],
            },
        ];

        let scenarios = to_scenarios(&plan, 60);
        assert_eq!(scenarios.len(), 2);

        match &scenarios[0].overrides[..] {
            [Override::AddEvent(event)] => {
                assert_eq!(event.age_at_occurrence, 70);
                assert_eq!(event.signed_amount(), -150_000.0);
            }
            other => panic!("unexpected overrides {other:?}"),
        }

        match &scenarios[1].overrides[..] {
            [
                Override::AddStream(stream),
                Override::ReturnStage(stage),
                Override::AdjustStartingBalance(delta),
            ] => {
                assert_eq!(stream.direction, Direction::Income);
                assert_eq!(stream.start_age, 60);
                assert_eq!(stream.indexation, Indexation::Nominal);
                assert_eq!(stage.start_month, 0);
                assert_eq!(stage.annual_rate, 0.04);
                assert_eq!(*delta, -10_000.0);
            }
            other => panic!("unexpected overrides {other:?}"),
        }
    }
}
