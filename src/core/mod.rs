mod advisor;
mod compare;
mod engine;
mod strategy;
mod types;

pub use advisor::{DebtStats, Recommendation, debt_stats, recommend_strategy};
pub use compare::{StrategyComparison, StrategyOutcome, compare_strategies};
pub use engine::{compute_plan, compute_plan_with_limits};
pub use types::{
    Debt, DebtField, DebtMonth, DebtPayoff, PaymentPlan, PlanError, PlanLimits, PlanResult,
    ScheduleRow, Strategy,
};
