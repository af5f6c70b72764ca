use serde::Serialize;

use super::engine::{check_debt_fields, payable_debts};
use super::types::{Debt, PlanError, PlanLimits, Strategy};

const APR_SPREAD_THRESHOLD: f64 = 5.0;
const QUICK_WIN_MIN_DEBTS: usize = 3;
const QUICK_WIN_SHARE: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtStats {
    pub count: usize,
    pub total_balance: f64,
    pub smallest_balance: f64,
    pub min_apr: f64,
    pub max_apr: f64,
    pub weighted_apr: f64,
}

impl DebtStats {
    pub fn apr_spread(&self) -> f64 {
        self.max_apr - self.min_apr
    }

    pub fn smallest_share(&self) -> f64 {
        if self.total_balance <= 0.0 {
            return 0.0;
        }
        self.smallest_balance / self.total_balance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub strategy: Strategy,
    pub reason: String,
    pub stats: DebtStats,
}

pub fn debt_stats(debts: &[Debt]) -> Result<DebtStats, PlanError> {
    check_debt_fields(debts)?;
    let epsilon = PlanLimits::default().epsilon;

    let mut stats: Option<DebtStats> = None;
    let mut weighted = 0.0;
    for debt in payable_debts(debts, epsilon) {
        weighted += debt.apr * debt.balance;
        let entry = stats.get_or_insert(DebtStats {
            count: 0,
            total_balance: 0.0,
            smallest_balance: debt.balance,
            min_apr: debt.apr,
            max_apr: debt.apr,
            weighted_apr: 0.0,
        });
        entry.count += 1;
        entry.total_balance += debt.balance;
        entry.smallest_balance = entry.smallest_balance.min(debt.balance);
        entry.min_apr = entry.min_apr.min(debt.apr);
        entry.max_apr = entry.max_apr.max(debt.apr);
    }

    let mut stats = stats.ok_or(PlanError::NoPayableDebts)?;
    stats.weighted_apr = weighted / stats.total_balance;
    Ok(stats)
}

/// Picks a strategy label from aggregate statistics only; no amortization is run.
pub fn recommend_strategy(debts: &[Debt]) -> Result<Recommendation, PlanError> {
    let stats = debt_stats(debts)?;

    let (strategy, reason) = if stats.apr_spread() >= APR_SPREAD_THRESHOLD {
        (
            Strategy::HighestAprFirst,
            format!(
                "Your rates differ by {:.1} points; paying the highest APR first cuts the most interest.",
                stats.apr_spread()
            ),
        )
    } else if stats.count >= QUICK_WIN_MIN_DEBTS && stats.smallest_share() <= QUICK_WIN_SHARE {
        (
            Strategy::SmallestBalanceFirst,
            format!(
                "Your rates are close and your smallest balance is only {:.0}% of the total; clearing it first gives a quick win.",
                stats.smallest_share() * 100.0
            ),
        )
    } else {
        (
            Strategy::InterestWeightedFirst,
            "Your rates and balances are similar; targeting the debt that costs the most each month keeps interest low.".to_string(),
        )
    };

    Ok(Recommendation {
        strategy,
        reason,
        stats,
    })
}
