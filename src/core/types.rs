use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub apr: f64,
    pub min_payment: f64,
}

impl Debt {
    pub fn new(id: impl Into<String>, balance: f64, apr: f64, min_payment: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            balance,
            apr,
            min_payment,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

pub(crate) fn monthly_rate(apr: f64) -> f64 {
    apr / 100.0 / 12.0
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[serde(alias = "warrior", alias = "snowball", alias = "smallestBalanceFirst")]
    SmallestBalanceFirst,
    #[serde(alias = "rebel", alias = "avalanche", alias = "highestAprFirst")]
    HighestAprFirst,
    #[serde(alias = "wizard", alias = "interestWeightedFirst")]
    InterestWeightedFirst,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::SmallestBalanceFirst,
        Strategy::HighestAprFirst,
        Strategy::InterestWeightedFirst,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::SmallestBalanceFirst => "warrior",
            Strategy::HighestAprFirst => "rebel",
            Strategy::InterestWeightedFirst => "wizard",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Strategy::SmallestBalanceFirst => "smallest balance first",
            Strategy::HighestAprFirst => "highest APR first",
            Strategy::InterestWeightedFirst => "most interest in dollars first",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "warrior" | "snowball" | "smallest-balance-first" => {
                Ok(Strategy::SmallestBalanceFirst)
            }
            "rebel" | "avalanche" | "highest-apr-first" => Ok(Strategy::HighestAprFirst),
            "wizard" | "interest-weighted-first" => Ok(Strategy::InterestWeightedFirst),
            other => Err(format!(
                "unknown strategy '{other}' (expected warrior, rebel or wizard)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanLimits {
    /// Runaway-loop guard on simulated months.
    pub max_months: u32,
    pub epsilon: f64,
    pub budget_tolerance: f64,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            max_months: 1200,
            epsilon: 0.01,
            budget_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtMonth {
    pub id: String,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance_end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub month: u32,
    pub total_balance_end: f64,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub payment: f64,
    pub debts: Vec<DebtMonth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoff {
    pub id: String,
    pub name: String,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlan {
    pub months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub initial_balance: f64,
    pub strategy_used: Strategy,
    pub payoffs: Vec<DebtPayoff>,
    pub schedule: Vec<ScheduleRow>,
}

impl PaymentPlan {
    pub fn final_balance(&self) -> f64 {
        self.schedule
            .last()
            .map(|row| row.total_balance_end)
            .unwrap_or(self.initial_balance)
    }

    pub fn payoff_month(&self, debt_id: &str) -> Option<u32> {
        self.payoffs
            .iter()
            .find(|payoff| payoff.id == debt_id)
            .map(|payoff| payoff.month)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DebtField {
    Balance,
    Apr,
    MinPayment,
}

impl std::fmt::Display for DebtField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DebtField::Balance => "balance",
            DebtField::Apr => "APR",
            DebtField::MinPayment => "minimum payment",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("Monthly budget must be positive. Enter a budget greater than zero.")]
    InvalidBudget { budget: f64 },
    #[error("Debt '{debt_id}' has an invalid {field}. Enter a finite, non-negative number.")]
    InvalidInput { debt_id: String, field: DebtField },
    #[error("Nothing to pay off. Add a debt with a positive balance and minimum payment.")]
    NoPayableDebts,
    #[error(
        "Budget of ${budget:.2} is below the total minimum payments of ${required:.2}. Increase your budget."
    )]
    BudgetBelowMinimums { required: f64, budget: f64 },
    #[error(
        "Payoff would take longer than {max_months} months. Increase your budget to finish sooner."
    )]
    PlanExceedsHorizon { max_months: u32 },
}

impl PlanError {
    pub fn kind(&self) -> &'static str {
        match self {
            PlanError::InvalidBudget { .. } => "invalid-budget",
            PlanError::InvalidInput { .. } => "invalid-input",
            PlanError::NoPayableDebts => "no-payable-debts",
            PlanError::BudgetBelowMinimums { .. } => "budget-below-minimums",
            PlanError::PlanExceedsHorizon { .. } => "plan-exceeds-horizon",
        }
    }
}

pub type PlanResult = Result<PaymentPlan, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_labels_and_colloquial_names() {
        for (text, expected) in [
            ("warrior", Strategy::SmallestBalanceFirst),
            ("Snowball", Strategy::SmallestBalanceFirst),
            ("rebel", Strategy::HighestAprFirst),
            ("avalanche", Strategy::HighestAprFirst),
            ("highest_apr_first", Strategy::HighestAprFirst),
            (" wizard ", Strategy::InterestWeightedFirst),
        ] {
            assert_eq!(text.parse::<Strategy>(), Ok(expected), "{text}");
        }
        assert!("hybrid".parse::<Strategy>().is_err());
    }

    #[test]
    fn strategy_serializes_as_kebab_case_and_accepts_labels() {
        let json = serde_json::to_string(&Strategy::InterestWeightedFirst).expect("serialize");
        assert_eq!(json, "\"interest-weighted-first\"");
        let parsed: Strategy = serde_json::from_str("\"warrior\"").expect("deserialize");
        assert_eq!(parsed, Strategy::SmallestBalanceFirst);
    }

    #[test]
    fn monthly_rate_divides_apr_by_twelve_hundred() {
        assert!((monthly_rate(24.0) - 0.02).abs() < 1e-15);
        assert_eq!(monthly_rate(0.0), 0.0);
    }

    #[test]
    fn errors_read_as_corrective_actions() {
        let err = PlanError::BudgetBelowMinimums {
            required: 125.0,
            budget: 100.5,
        };
        assert_eq!(
            err.to_string(),
            "Budget of $100.50 is below the total minimum payments of $125.00. Increase your budget."
        );
        let err = PlanError::InvalidInput {
            debt_id: "visa".to_string(),
            field: DebtField::MinPayment,
        };
        assert!(err.to_string().contains("invalid minimum payment"));
        assert!(PlanError::NoPayableDebts.to_string().contains("positive balance"));
    }
}
