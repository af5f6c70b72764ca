use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Debt, PaymentPlan, Strategy};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub strategy_used: Strategy,
}

impl From<&PaymentPlan> for PlanSummary {
    fn from(plan: &PaymentPlan) -> Self {
        Self {
            months: plan.months,
            total_interest: plan.total_interest,
            total_paid: plan.total_paid,
            strategy_used: plan.strategy_used,
        }
    }
}

/// The inputs of the last computed plan, plus its summary when it succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshot {
    pub debts: Vec<Debt>,
    pub strategy: Strategy,
    pub monthly_budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<PlanSummary>,
}

pub fn save_snapshot(path: &Path, snapshot: &PlanSnapshot) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, format!("{json}\n"))?;
    tracing::debug!(path = %path.display(), "saved plan snapshot");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<PlanSnapshot, SnapshotError> {
    let json = fs::read_to_string(path)?;
    let snapshot = serde_json::from_str(&json)?;
    tracing::debug!(path = %path.display(), "loaded plan snapshot");
    Ok(snapshot)
}
