use super::engine::{build_ledger, simulate};
use super::types::{Debt, PaymentPlan, PlanError, PlanLimits, PlanResult, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub result: PlanResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyComparison {
    pub outcomes: Vec<StrategyOutcome>,
    pub best_index: Option<usize>,
}

impl StrategyComparison {
    pub fn best(&self) -> Option<&PaymentPlan> {
        self.best_index
            .and_then(|index| self.outcomes[index].result.as_ref().ok())
    }

    pub fn plan_for(&self, strategy: Strategy) -> Option<&PaymentPlan> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.strategy == strategy)
            .and_then(|outcome| outcome.result.as_ref().ok())
    }

    /// Interest the best plan saves relative to `strategy`, if both converged.
    pub fn interest_saved_over(&self, strategy: Strategy) -> Option<f64> {
        let best = self.best()?;
        let other = self.plan_for(strategy)?;
        Some((other.total_interest - best.total_interest).max(0.0))
    }
}

/// Runs every strategy over the same inputs. Validation failures are shared by all
/// strategies and returned once; horizon failures are reported per strategy.
pub fn compare_strategies(
    debts: &[Debt],
    monthly_budget: f64,
    limits: &PlanLimits,
) -> Result<StrategyComparison, PlanError> {
    let ledger = build_ledger(debts, monthly_budget, limits)?;
    let outcomes: Vec<StrategyOutcome> = Strategy::ALL
        .iter()
        .map(|&strategy| StrategyOutcome {
            strategy,
            result: simulate(ledger.clone(), strategy, monthly_budget, limits),
        })
        .collect();
    let best_index = best_outcome_index(&outcomes);

    Ok(StrategyComparison {
        outcomes,
        best_index,
    })
}

fn best_outcome_index(outcomes: &[StrategyOutcome]) -> Option<usize> {
    outcomes
        .iter()
        .enumerate()
        .filter_map(|(index, outcome)| outcome.result.as_ref().ok().map(|plan| (index, plan)))
        .min_by(|(ia, a), (ib, b)| {
            a.total_interest
                .total_cmp(&b.total_interest)
                .then_with(|| a.months.cmp(&b.months))
                .then_with(|| ia.cmp(ib))
        })
        .map(|(index, _)| index)
}
