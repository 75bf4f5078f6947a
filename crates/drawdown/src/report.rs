//! Plain-text and JSON reports
//!
//! Text reports are meant for a terminal; JSON output is the serialized engine
//! result as-is.

use drawdown_core::analysis::{
    Comparison, MAX_YEARS_TO_TARGET, Readiness, RunwaySummary, withdrawal_rate,
};
use drawdown_core::model::SimulationResult;
use drawdown_core::solver::{FreeVariable, SolveResult, SolverWarning, Target, TerminationReason};
use jiff::ToSpan;
use jiff::civil::Date;
use serde::Serialize;

/// Whole dollars with thousands separators: `$1,234,568`, `-$1,200`
pub fn money(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// `3 years, 2 months`, dropping zero parts
pub fn duration(months: u32) -> String {
    let plural = |n: u32, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };
    match (months / 12, months % 12) {
        (0, m) => plural(m, "month"),
        (y, 0) => plural(y, "year"),
        (y, m) => format!("{}, {}", plural(y, "year"), plural(m, "month")),
    }
}

/// Calendar year `months` after `as_of`
pub fn year_after(as_of: Date, months: u32) -> i16 {
    as_of
        .checked_add(i64::from(months).months())
        .map_or(as_of.year(), |d| d.year())
}

/// One-sentence answer to "how long will it last?"
pub fn runway_line(result: &SimulationResult, as_of: Date) -> String {
    match result.outcome.depletion_month() {
        Some(month) => format!(
            "Money runs out in {} (age {:.1}, in {})",
            duration(month),
            result.outcome.age_at_depletion().unwrap_or_default(),
            year_after(as_of, month),
        ),
        None => format!(
            "Money lasts the full {} with {} left at age {}",
            duration(result.horizon_months),
            money(result.final_balance()),
            result.current_age + result.horizon_months / 12,
        ),
    }
}

/// Join report lines, ending with a newline
fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub fn format_projection(result: &SimulationResult, as_of: Date) -> String {
    let summary = RunwaySummary::from_result(result);
    let mut lines = vec![
        format!(
            "Starting balance {} at age {}, projected over {}",
            money(result.starting_balance),
            result.current_age,
            duration(result.horizon_months),
        ),
        runway_line(result, as_of),
        format!(
            "Growth {}  Income {}  Expenses {}  Peak {}",
            money(summary.total_growth),
            money(summary.total_income),
            money(summary.total_expenses),
            money(summary.peak_balance),
        ),
    ];

    let years = result.trajectory.yearly_balances();
    if !years.is_empty() {
        lines.push(String::new());
        lines.push(format!("{:>4}  {:>14}", "Age", "Balance"));
        lines.extend(
            years
                .into_iter()
                .map(|(age, balance)| format!("{age:>4}  {:>14}", money(balance))),
        );
    }
    join_lines(lines)
}

/// Savings rate, nest egg and the years it takes to get there
pub fn format_readiness(readiness: &Readiness) -> String {
    let rate = percent(readiness.withdrawal_rate);
    let mut lines = vec![format!(
        "Saving {}/mo ({} income, {} expenses)",
        money(readiness.monthly_savings),
        money(readiness.monthly_income),
        money(readiness.monthly_expenses),
    )];

    if let Some(nest_egg) = readiness.target_nest_egg {
        lines.push(format!(
            "Nest egg to fund {}/mo at {rate}: {}",
            money(readiness.monthly_spend_to_fund),
            money(nest_egg),
        ));
    }
    lines.push(format!(
        "Balance at retirement (age {}): {}, supports {}/mo at {rate}",
        readiness.retirement_age.max(readiness.current_age),
        money(readiness.balance_at_retirement),
        money(readiness.safe_monthly_spend),
    ));

    match readiness.years_to_target {
        Some(0) => lines.push("Nest egg already reached".to_string()),
        Some(years) => lines.push(format!(
            "Nest egg reached in {years} years (age {})",
            readiness.current_age + years,
        )),
        None if readiness.is_retired() || readiness.target_nest_egg.is_none() => {}
        None if readiness.monthly_savings <= 0.0 => {
            lines.push("Expenses exceed income; the nest egg is out of reach".to_string());
        }
        None => lines.push(format!(
            "Nest egg not reached within {MAX_YEARS_TO_TARGET} years"
        )),
    }
    join_lines(lines)
}

pub fn format_solve(solved: &SolveResult, as_of: Date) -> String {
    let request = &solved.request;

    let target = match request.target {
        Target::Sustained => "lasting the whole plan".to_string(),
        Target::DepletedBy { month } => format!("running out within {}", duration(month)),
        Target::DepletedByAge { age } => format!("running out by age {age}"),
    };

    let mut lines = match &request.variable {
        FreeVariable::Withdrawal { stream } => {
            let what = stream.as_deref().unwrap_or("withdrawal");
            let mut lines = vec![format!("Monthly {what} {target}: {}", money(solved.value))];
            if let Some(rate) = withdrawal_rate(solved.value, solved.result.starting_balance) {
                lines.push(format!(
                    "That draws {} of the starting balance a year",
                    percent(rate)
                ));
            }
            lines
        }
        FreeVariable::StartingBalance => {
            vec![format!("Starting balance {target}: {}", money(solved.value))]
        }
        FreeVariable::Horizon => {
            // Horizon values are whole months
            let months = solved.value as u32;
            vec![format!(
                "Balance stays funded for {months} months ({}, until {})",
                duration(months),
                year_after(as_of, months),
            )]
        }
    };

    lines.push(runway_line(&solved.result, as_of));

    let how = match solved.termination_reason {
        TerminationReason::Converged => "converged",
        TerminationReason::LowerBound => "already met at zero",
        TerminationReason::MaxIterationsReached => "stopped at the iteration limit",
    };
    lines.push(format!(
        "Solver {how} after {} runs, bracket [{:.2}, {:.2}]",
        solved.num_evaluations(),
        solved.bracket.0,
        solved.bracket.1,
    ));
    for warning in &solved.warnings {
        match warning {
            SolverWarning::NonConvergence { bracket_width } => {
                lines.push(format!(
                    "Warning: result is only accurate to {bracket_width:.2}"
                ));
            }
        }
    }
    join_lines(lines)
}

pub fn format_comparison(comparison: &Comparison, as_of: Date) -> String {
    let mut lines = vec![format!(
        "Baseline: {}",
        runway_line(&comparison.baseline, as_of)
    )];

    if comparison.scenarios.is_empty() {
        lines.push("No scenarios in this plan".to_string());
        return join_lines(lines);
    }

    lines.push(String::new());
    lines.push(format!(
        "{:<24} {:>8} {:>8} {:>10} {:>14}",
        "Scenario", "Months", "Change", "Depleted", "Balance diff"
    ));
    for scenario in &comparison.scenarios {
        let depleted = scenario
            .result
            .outcome
            .age_at_depletion()
            .map_or_else(|| "never".to_string(), |age| format!("{age:.1}"));
        let balance = scenario
            .delta
            .ending_balance
            .map_or_else(|| "-".to_string(), money);
        lines.push(format!(
            "{:<24} {:>8} {:>+8} {:>10} {:>14}",
            scenario.name,
            scenario.result.months_funded(),
            scenario.delta.months_funded,
            depleted,
            balance,
        ));
    }

    if let Some(best) = comparison.longest_lasting() {
        lines.push(String::new());
        lines.push(format!("Longest lasting: {}", best.name));
    }
    join_lines(lines)
}

/// JSON shape of a projection together with its readiness figures
#[derive(Debug, Serialize)]
pub struct ProjectionReport<'a> {
    pub readiness: &'a Readiness,
    pub projection: &'a SimulationResult,
}

/// Pretty-printed JSON of any engine result
pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_core::analysis::{DEFAULT_WITHDRAWAL_RATE, Override, Scenario, compare};
    use drawdown_core::config::SimulationInput;
    use drawdown_core::config::{SimulationBuilder, StreamBuilder};
    use drawdown_core::simulate;
    use drawdown_core::solver::{SolveRequest, SolverConfig, solve};
    use jiff::civil::date;

    fn as_of() -> Date {
        date(2026, 6, 1)
    }

    fn short_runway() -> SimulationResult {
        let input = SimulationBuilder::new()
            .starting_balance(10_000.0)
            .stream(StreamBuilder::expense("Rent").amount(500.0))
            .build()
            .unwrap();
        simulate(&input).unwrap()
    }

    #[test]
    fn test_money() {
        assert_eq!(money(0.0), "$0");
        assert_eq!(money(999.4), "$999");
        assert_eq!(money(1_000.0), "$1,000");
        assert_eq!(money(1_234_567.891), "$1,234,568");
        assert_eq!(money(-1_200.0), "-$1,200");
        assert_eq!(money(-0.2), "$0");
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration(0), "0 months");
        assert_eq!(duration(1), "1 month");
        assert_eq!(duration(12), "1 year");
        assert_eq!(duration(20), "1 year, 8 months");
        assert_eq!(duration(538), "44 years, 10 months");
    }

    #[test]
    fn test_year_after() {
        assert_eq!(year_after(as_of(), 0), 2026);
        assert_eq!(year_after(as_of(), 7), 2027);
        assert_eq!(year_after(as_of(), 538), 2071);
    }

    #[test]
    fn test_runway_line_depleted() {
        let line = runway_line(&short_runway(), as_of());
        assert_eq!(line, "Money runs out in 1 year, 8 months (age 66.7, in 2028)");
    }

    #[test]
    fn test_runway_line_sustained() {
        let input = SimulationBuilder::new()
            .starting_balance(1_000.0)
            .years(10)
            .build()
            .unwrap();
        let line = runway_line(&simulate(&input).unwrap(), as_of());
        assert_eq!(line, "Money lasts the full 10 years with $1,000 left at age 75");
    }

    #[test]
    fn test_projection_table() {
        let report = format_projection(&short_runway(), as_of());
        assert!(report.starts_with("Starting balance $10,000 at age 65"));
        assert!(report.contains("Money runs out in 1 year, 8 months"));
        // One completed year before depletion
        assert!(report.contains("  65          $4,000"));
    }

    #[test]
    fn test_solve_report_for_horizon() {
        let input = SimulationBuilder::new()
            .current_age(50)
            .plan_until_age(100)
            .starting_balance(500_000.0)
            .return_rate(0.04)
            .stream(StreamBuilder::expense("Living").amount(2_000.0))
            .build()
            .unwrap();
        let solved = solve(
            &input,
            &SolveRequest::months_until_depletion(),
            &SolverConfig::default(),
        )
        .unwrap();

        let report = format_solve(&solved, as_of());
        assert!(
            report.contains("Balance stays funded for 538 months (44 years, 10 months, until 2071)"),
            "unexpected report:\n{report}"
        );
        assert!(report.contains("Solver converged"));
    }

    fn working_input() -> SimulationInput {
        SimulationBuilder::new()
            .current_age(55)
            .retirement_age(65)
            .starting_balance(100_000.0)
            .salary("Salary", 5_000.0)
            .stream(StreamBuilder::expense("Living").amount(3_000.0))
            .pension("CPP", 1_000.0, 65)
            .build()
            .unwrap()
    }

    #[test]
    fn test_readiness_report() {
        let readiness = Readiness::new(&working_input(), 65, DEFAULT_WITHDRAWAL_RATE);
        let report = format_readiness(&readiness);
        assert_eq!(
            report,
            "Saving $2,000/mo ($5,000 income, $3,000 expenses)\n\
             Nest egg to fund $2,000/mo at 4.0%: $600,000\n\
             Balance at retirement (age 65): $340,000, supports $1,133/mo at 4.0%\n\
             Nest egg reached in 21 years (age 76)\n"
        );
    }

    #[test]
    fn test_readiness_report_when_overspending() {
        let input = SimulationBuilder::new()
            .current_age(55)
            .retirement_age(65)
            .salary("Salary", 2_000.0)
            .stream(StreamBuilder::expense("Living").amount(3_000.0))
            .build()
            .unwrap();
        let report = format_readiness(&Readiness::new(&input, 65, DEFAULT_WITHDRAWAL_RATE));
        assert!(report.starts_with("Saving -$1,000/mo"));
        assert!(report.ends_with("Expenses exceed income; the nest egg is out of reach\n"));
    }

    #[test]
    fn test_solve_report_shows_withdrawal_rate() {
        let input = SimulationBuilder::new()
            .starting_balance(120_000.0)
            .years(10)
            .build()
            .unwrap();
        let solved = solve(&input, &SolveRequest::max_withdrawal(), &SolverConfig::default())
            .unwrap();

        let report = format_solve(&solved, as_of());
        assert!(report.starts_with("Monthly withdrawal lasting the whole plan: "));
        assert!(
            report.contains("That draws 10.0% of the starting balance a year"),
            "unexpected report:\n{report}"
        );
    }

    #[test]
    fn test_comparison_report() {
        let input = SimulationBuilder::new()
            .starting_balance(10_000.0)
            .stream(StreamBuilder::expense("Rent").amount(500.0))
            .build()
            .unwrap();
        let comparison = compare(
            &input,
            &[Scenario::new("Roommate").with(Override::ScaleStream {
                label: "Rent".into(),
                factor: 0.5,
            })],
        )
        .unwrap();

        let report = format_comparison(&comparison, as_of());
        assert!(report.starts_with("Baseline: Money runs out in 1 year, 8 months"));
        assert!(report.contains("Roommate"));
        assert!(report.contains("+20"));
        assert!(report.contains("Longest lasting: Roommate"));
    }

    #[test]
    fn test_json_output() {
        let json = to_json(&short_runway()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["horizon_months"], 360);
        assert_eq!(value["outcome"]["Depleted"]["depletion_month"], 20);
    }

    #[test]
    fn test_projection_json_includes_readiness() {
        let input = working_input();
        let readiness = Readiness::new(&input, 65, DEFAULT_WITHDRAWAL_RATE);
        let result = simulate(&input).unwrap();
        let json = to_json(&ProjectionReport {
            readiness: &readiness,
            projection: &result,
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["readiness"]["target_nest_egg"], 600_000.0);
        assert_eq!(value["readiness"]["years_to_target"], 21);
        assert_eq!(value["projection"]["current_age"], 55);
    }
}
