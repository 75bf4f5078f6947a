//! Human-readable plan record
//!
//! This is the YAML shape a plan is saved in. Amounts are dollars, ages are
//! whole years and rates are annual fractions (`0.05` for 5%). Nothing here is
//! resolved yet; see [`convert`](super::convert) for the mapping into engine
//! input.
//!
//! ```yaml
//! personal:
//!   name: Alex
//!   dob: 1961-03-15
//!   retirement_age: 65
//!   life_expectancy: 95
//! accounts:
//!   - name: RRSP
//!     type: Investments
//!     balance: 150000
//! budget:
//!   - name: Groceries
//!     category: Food
//!     amount: 600
//!     type: Expense
//!     frequency: Monthly
//! government:
//!   cpp_amount: 900
//!   cpp_start_age: 65
//! scenarios:
//!   - name: Buy a cottage
//!     age: 70
//!     impact: 150000
//!     frequency: One-time
//! ```

use std::fmt;
use std::str::FromStr;

use drawdown_core::analysis::Override;
use serde::{Deserialize, Serialize};

/// A complete saved plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanData {
    pub personal: PersonalData,
    pub accounts: Vec<AccountData>,
    pub budget: Vec<BudgetItem>,
    pub government: GovernmentData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inheritance: Option<InheritanceData>,
    pub annual_expenditures: Vec<ExpenditureData>,
    pub market: MarketData,
    pub scenarios: Vec<ScenarioData>,
}

impl PlanData {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }

    /// Starter plan written by `drawdown init`
    pub fn sample() -> Self {
        let account = |name: &str, account_type, balance| AccountData {
            name: name.to_string(),
            account_type,
            balance,
        };
        let line = |name: &str, budget_type, amount| BudgetItem {
            name: name.to_string(),
            category: None,
            amount,
            budget_type,
            frequency: BudgetFrequency::Monthly,
        };

        Self {
            personal: PersonalData {
                name: Some("Alex".to_string()),
                dob: Some("1981-01-01".to_string()),
                current_age: None,
                retirement_age: 55,
                life_expectancy: 95,
            },
            accounts: vec![
                account("Savings", AccountType::Bank, 50_000.0),
                account("RRSP", AccountType::Investments, 350_000.0),
                account("Home", AccountType::Property, 700_000.0),
                account("Mortgage", AccountType::Liability, 120_000.0),
            ],
            budget: vec![
                line("Salary", BudgetType::Income, 5_000.0),
                line("Living", BudgetType::Expense, 4_000.0),
            ],
            government: GovernmentData {
                cpp_amount: 1_100.0,
                cpp_start_age: 70,
                oas_amount: 713.0,
                oas_start_age: 65,
            },
            inheritance: Some(InheritanceData {
                age: 65,
                amount: 500_000.0,
                inheritance_type: InheritanceType::Cash,
                sell_property: false,
                sell_age: None,
                sale_amount: None,
            }),
            annual_expenditures: vec![ExpenditureData {
                name: "Travel".to_string(),
                amount: 5_000.0,
                frequency: Cadence::EveryYears(1),
                start_age: 56,
            }],
            market: MarketData::default(),
            scenarios: vec![ScenarioData {
                name: "Buy a cottage".to_string(),
                age: Some(60),
                scenario_type: ScenarioType::Cost,
                impact: 150_000.0,
                frequency: Cadence::OneTime,
                return_rate: None,
                inflation_rate: None,
                overrides: Vec::new(),
            }],
        }
    }
}

// ============================================================================
// Personal
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Birth date as `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,

    /// Used when no birth date is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_age: Option<u32>,

    pub retirement_age: u32,

    /// Age the money should last until
    pub life_expectancy: u32,
}

impl Default for PersonalData {
    fn default() -> Self {
        Self {
            name: None,
            dob: None,
            current_age: None,
            retirement_age: 65,
            life_expectancy: 95,
        }
    }
}

// ============================================================================
// Accounts and budget
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Bank,
    Investments,
    #[serde(alias = "Asset", alias = "Real Estate")]
    Property,
    Other,
    #[serde(alias = "Credit Card", alias = "Loan", alias = "Mortgage")]
    Liability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountData {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BudgetFrequency {
    #[default]
    Monthly,
    #[serde(alias = "Annual", alias = "Yearly")]
    Annually,
}

/// One line of the monthly budget. Income lines are treated as salary and stop
/// at the retirement age; expense lines are grouped by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    #[serde(default)]
    pub frequency: BudgetFrequency,
}

impl BudgetItem {
    /// Category the line is grouped under, falling back to its name
    pub fn group(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn monthly_amount(&self) -> f64 {
        match self.frequency {
            BudgetFrequency::Monthly => self.amount,
            BudgetFrequency::Annually => self.amount / 12.0,
        }
    }
}

// ============================================================================
// Government benefits and inheritance
// ============================================================================

/// CPP and OAS, stated in dollars of the first payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernmentData {
    pub cpp_amount: f64,
    pub cpp_start_age: u32,
    pub oas_amount: f64,
    pub oas_start_age: u32,
}

impl Default for GovernmentData {
    fn default() -> Self {
        Self {
            cpp_amount: 0.0,
            cpp_start_age: 65,
            oas_amount: 0.0,
            oas_start_age: 65,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InheritanceType {
    #[default]
    #[serde(rename = "Cash / Investments", alias = "Cash")]
    Cash,
    #[serde(rename = "Property / House", alias = "Property")]
    Property,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InheritanceData {
    pub age: u32,
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub inheritance_type: InheritanceType,
    /// Property only: convert to cash at `sell_age`
    #[serde(default)]
    pub sell_property: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_age: Option<u32>,
    /// Sale price, when different from the inherited value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_amount: Option<f64>,
}

// ============================================================================
// Periodic spending and scenarios
// ============================================================================

/// How often a lump sum or scenario item recurs
///
/// Written the way a person would: `One-time`, `Monthly`, `Twice per year`,
/// `Annually` (or `Every Year`), `Every 5 Years`, `Until End of Plan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cadence {
    #[default]
    OneTime,
    /// Every month from the start age until the plan ends
    Monthly,
    TwicePerYear,
    EveryYears(u32),
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::OneTime => write!(f, "One-time"),
            Cadence::Monthly => write!(f, "Monthly"),
            Cadence::TwicePerYear => write!(f, "Twice per year"),
            Cadence::EveryYears(1) => write!(f, "Every Year"),
            Cadence::EveryYears(n) => write!(f, "Every {n} Years"),
        }
    }
}

impl FromStr for Cadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "one-time" | "one time" | "once" => return Ok(Cadence::OneTime),
            "monthly" | "until end of plan" => return Ok(Cadence::Monthly),
            "twice per year" => return Ok(Cadence::TwicePerYear),
            "annually" | "every year" | "yearly" => return Ok(Cadence::EveryYears(1)),
            _ => {}
        }

        let years = normalized
            .strip_prefix("every ")
            .and_then(|rest| rest.strip_suffix(" years"))
            .and_then(|n| n.trim().parse::<u32>().ok())
            .filter(|n| *n > 0);
        years
            .map(Cadence::EveryYears)
            .ok_or_else(|| format!("unknown frequency '{s}'"))
    }
}

impl Serialize for Cadence {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cadence {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Bucket-list spending: trips, cars, roofs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenditureData {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub frequency: Cadence,
    pub start_age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeRate {
    pub age: u32,
    pub rate: f64,
}

/// Return and inflation assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketData {
    pub return_rate: f64,
    pub inflation_rate: f64,
    /// Return changes from a given age on
    pub return_stages: Vec<AgeRate>,
    pub inflation_stages: Vec<AgeRate>,
}

impl Default for MarketData {
    fn default() -> Self {
        Self {
            return_rate: 0.05,
            inflation_rate: 0.03,
            return_stages: Vec::new(),
            inflation_stages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScenarioType {
    #[default]
    #[serde(alias = "Expense", alias = "Financial Cost")]
    Cost,
    #[serde(alias = "Income", alias = "Financial Gain", alias = "Asset")]
    Gain,
}

/// A what-if: a cost or gain at an age, optional new market rates from that
/// age, and any raw engine overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioData {
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(rename = "type", default)]
    pub scenario_type: ScenarioType,
    #[serde(default)]
    pub impact: f64,
    #[serde(default)]
    pub frequency: Cadence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflation_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<Override>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_parsing() {
        assert_eq!("One-time".parse::<Cadence>(), Ok(Cadence::OneTime));
        assert_eq!("Until End of Plan".parse::<Cadence>(), Ok(Cadence::Monthly));
        assert_eq!("Every Year".parse::<Cadence>(), Ok(Cadence::EveryYears(1)));
        assert_eq!("Annually".parse::<Cadence>(), Ok(Cadence::EveryYears(1)));
        assert_eq!("Every 5 years".parse::<Cadence>(), Ok(Cadence::EveryYears(5)));
        assert_eq!("every 10 Years".parse::<Cadence>(), Ok(Cadence::EveryYears(10)));
        assert!("Every 0 Years".parse::<Cadence>().is_err());
        assert!("Fortnightly".parse::<Cadence>().is_err());

        assert_eq!(Cadence::EveryYears(5).to_string(), "Every 5 Years");
        assert_eq!(Cadence::TwicePerYear.to_string().parse::<Cadence>(), Ok(Cadence::TwicePerYear));
    }

    #[test]
    fn test_minimal_plan_uses_defaults() {
        let plan = PlanData::from_yaml("personal:\n  current_age: 60\n").unwrap();
        assert_eq!(plan.personal.current_age, Some(60));
        assert_eq!(plan.personal.retirement_age, 65);
        assert_eq!(plan.personal.life_expectancy, 95);
        assert_eq!(plan.market.return_rate, 0.05);
        assert!(plan.inheritance.is_none());
        assert!(plan.scenarios.is_empty());
    }

    #[test]
    fn test_market_stages_by_age() {
        let yaml = "market:\n  return_rate: 0.06\n  return_stages:\n    - age: 70\n      rate: 0.04\n  inflation_stages:\n    - age: 65\n      rate: 0.025\n";
        let market = PlanData::from_yaml(yaml).unwrap().market;
        assert_eq!(market.return_rate, 0.06);
        assert_eq!(market.inflation_rate, 0.03);
        assert_eq!(market.return_stages, vec![AgeRate { age: 70, rate: 0.04 }]);
        assert_eq!(market.inflation_stages, vec![AgeRate { age: 65, rate: 0.025 }]);
    }

    #[test]
    fn test_parse_full_plan() {
        let yaml = r#"
personal:
  dob: "1961-03-15"
  retirement_age: 62
  life_expectancy: 92
accounts:
  - name: Savings
    type: Bank
    balance: 50000
  - name: House
    type: Asset
    balance: 700000
  - name: Visa
    type: Credit Card
    balance: 1500
budget:
  - name: Salary
    amount: 5000
    type: Income
  - name: Insurance
    category: Home
    amount: 1200
    type: Expense
    frequency: Annually
inheritance:
  age: 70
  amount: 300000
  type: Property / House
  sell_property: true
  sell_age: 75
annual_expenditures:
  - name: Trip
    amount: 5000
    frequency: Every 2 Years
    start_age: 66
scenarios:
  - name: Buy a cottage
    age: 70
    impact: 150000
  - name: Part-time work
    age: 62
    type: Income
    impact: 1500
    frequency: Monthly
    overrides:
      - AdjustStartingBalance: 10000
"#;
        let plan = PlanData::from_yaml(yaml).unwrap();
        assert_eq!(plan.personal.dob.as_deref(), Some("1961-03-15"));
        assert_eq!(plan.accounts[1].account_type, AccountType::Property);
        assert_eq!(plan.accounts[2].account_type, AccountType::Liability);
        assert_eq!(plan.budget[0].frequency, BudgetFrequency::Monthly);
        assert_eq!(plan.budget[0].group(), "Salary");
        assert_eq!(plan.budget[1].group(), "Home");
        assert_eq!(plan.budget[1].monthly_amount(), 100.0);

        let inheritance = plan.inheritance.as_ref().unwrap();
        assert_eq!(inheritance.inheritance_type, InheritanceType::Property);
        assert_eq!(inheritance.sell_age, Some(75));

        assert_eq!(plan.annual_expenditures[0].frequency, Cadence::EveryYears(2));
        assert_eq!(plan.scenarios[0].scenario_type, ScenarioType::Cost);
        assert_eq!(plan.scenarios[0].frequency, Cadence::OneTime);
        assert_eq!(plan.scenarios[1].scenario_type, ScenarioType::Gain);
        assert_eq!(
            plan.scenarios[1].overrides,
            vec![Override::AdjustStartingBalance(10_000.0)]
        );
    }
}
