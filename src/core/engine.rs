use tracing::{debug, warn};

use super::strategy::{RankKey, rank};
use super::types::{
    Debt, DebtField, DebtMonth, DebtPayoff, PaymentPlan, PlanError, PlanLimits, PlanResult,
    ScheduleRow, Strategy, monthly_rate,
};

#[derive(Debug, Clone)]
struct Slot {
    id: String,
    name: String,
    apr: f64,
    min_payment: f64,
    balance: f64,
}

impl From<&Debt> for Slot {
    fn from(debt: &Debt) -> Self {
        Self {
            id: debt.id.clone(),
            name: debt.name.clone(),
            apr: debt.apr,
            min_payment: debt.min_payment,
            balance: debt.balance,
        }
    }
}

/// Working copy of the payable debts. Only this is mutated during simulation.
#[derive(Debug, Clone)]
pub(crate) struct Ledger {
    slots: Vec<Slot>,
    initial_balance: f64,
}

impl Ledger {
    fn total_balance(&self) -> f64 {
        self.slots.iter().map(|slot| slot.balance).sum()
    }

    fn is_retired(&self, epsilon: f64) -> bool {
        self.slots.iter().all(|slot| slot.balance <= epsilon)
    }
}

#[derive(Debug, Clone, Copy)]
struct Accrual {
    interest: f64,
    min_due: f64,
    assigned: f64,
}

pub fn compute_plan(debts: &[Debt], strategy: Strategy, monthly_budget: f64) -> PlanResult {
    compute_plan_with_limits(debts, strategy, monthly_budget, &PlanLimits::default())
}

pub fn compute_plan_with_limits(
    debts: &[Debt],
    strategy: Strategy,
    monthly_budget: f64,
    limits: &PlanLimits,
) -> PlanResult {
    let ledger = build_ledger(debts, monthly_budget, limits)?;
    simulate(ledger, strategy, monthly_budget, limits)
}

pub(crate) fn build_ledger(
    debts: &[Debt],
    monthly_budget: f64,
    limits: &PlanLimits,
) -> Result<Ledger, PlanError> {
    if !monthly_budget.is_finite() || monthly_budget <= 0.0 {
        debug!(monthly_budget, "rejecting non-positive budget");
        return Err(PlanError::InvalidBudget {
            budget: monthly_budget,
        });
    }

    check_debt_fields(debts)?;

    let slots: Vec<Slot> = payable_debts(debts, limits.epsilon)
        .map(Slot::from)
        .collect();
    if slots.is_empty() {
        debug!(debts = debts.len(), "no payable debts after filtering");
        return Err(PlanError::NoPayableDebts);
    }

    let required: f64 = slots.iter().map(|slot| slot.min_payment).sum();
    if required > monthly_budget + limits.budget_tolerance {
        debug!(required, monthly_budget, "budget below total minimums");
        return Err(PlanError::BudgetBelowMinimums {
            required,
            budget: monthly_budget,
        });
    }

    let initial_balance = slots.iter().map(|slot| slot.balance).sum();
    Ok(Ledger {
        slots,
        initial_balance,
    })
}

pub(crate) fn check_debt_fields(debts: &[Debt]) -> Result<(), PlanError> {
    for debt in debts {
        for (field, value) in [
            (DebtField::Balance, debt.balance),
            (DebtField::Apr, debt.apr),
            (DebtField::MinPayment, debt.min_payment),
        ] {
            if !value.is_finite() {
                return Err(PlanError::InvalidInput {
                    debt_id: debt.id.clone(),
                    field,
                });
            }
        }
        if debt.apr < 0.0 {
            return Err(PlanError::InvalidInput {
                debt_id: debt.id.clone(),
                field: DebtField::Apr,
            });
        }
    }
    Ok(())
}

/// Debts that take part in simulation: a balance above `epsilon` and a positive minimum.
pub(crate) fn payable_debts(debts: &[Debt], epsilon: f64) -> impl Iterator<Item = &Debt> {
    debts
        .iter()
        .filter(move |debt| debt.balance > epsilon && debt.min_payment > 0.0)
}

pub(crate) fn simulate(
    mut ledger: Ledger,
    strategy: Strategy,
    monthly_budget: f64,
    limits: &PlanLimits,
) -> PlanResult {
    let epsilon = limits.epsilon;
    let mut schedule = Vec::new();
    let mut payoffs = Vec::new();
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;

    for month in 1..=limits.max_months {
        let mut accruals = accrue_interest(&ledger, epsilon);
        let sum_min_due: f64 = accruals.iter().flatten().map(|acc| acc.min_due).sum();
        if sum_min_due > monthly_budget + limits.budget_tolerance {
            warn!(
                month,
                sum_min_due, monthly_budget, "minimum payments exceed budget mid-plan"
            );
            return Err(PlanError::BudgetBelowMinimums {
                required: sum_min_due,
                budget: monthly_budget,
            });
        }

        allocate_leftover(
            &ledger,
            &mut accruals,
            strategy,
            monthly_budget - sum_min_due,
            epsilon,
        );
        let row = apply_payments(&mut ledger, &accruals, month);

        for (slot, accrual) in ledger.slots.iter().zip(&accruals) {
            if accrual.is_some() && slot.balance <= epsilon {
                payoffs.push(DebtPayoff {
                    id: slot.id.clone(),
                    name: slot.name.clone(),
                    month,
                });
            }
        }

        total_interest += row.interest_paid;
        total_paid += row.payment;
        schedule.push(row);

        if ledger.is_retired(epsilon) {
            debug!(
                %strategy,
                months = month,
                total_interest,
                "payoff plan computed"
            );
            return Ok(PaymentPlan {
                months: month,
                total_interest,
                total_paid,
                initial_balance: ledger.initial_balance,
                strategy_used: strategy,
                payoffs,
                schedule,
            });
        }
    }

    warn!(
        %strategy,
        max_months = limits.max_months,
        remaining = ledger.total_balance(),
        "payoff plan did not converge"
    );
    Err(PlanError::PlanExceedsHorizon {
        max_months: limits.max_months,
    })
}

fn accrue_interest(ledger: &Ledger, epsilon: f64) -> Vec<Option<Accrual>> {
    ledger
        .slots
        .iter()
        .map(|slot| {
            if slot.balance <= epsilon {
                return None;
            }
            let interest = slot.balance * monthly_rate(slot.apr);
            let min_due = slot.min_payment.min(slot.balance + interest);
            Some(Accrual {
                interest,
                min_due,
                assigned: min_due,
            })
        })
        .collect()
}

fn allocate_leftover(
    ledger: &Ledger,
    accruals: &mut [Option<Accrual>],
    strategy: Strategy,
    mut leftover: f64,
    epsilon: f64,
) {
    while leftover > epsilon {
        let keys: Vec<(usize, RankKey)> = ledger
            .slots
            .iter()
            .zip(accruals.iter())
            .enumerate()
            .filter_map(|(index, (slot, accrual))| {
                accrual.as_ref().map(|acc| {
                    (
                        index,
                        RankKey {
                            balance: slot.balance,
                            apr: slot.apr,
                            interest: acc.interest,
                        },
                    )
                })
            })
            .collect();
        if keys.is_empty() {
            break;
        }

        let mut assigned_this_pass = 0.0;
        for index in rank(strategy, &keys) {
            let balance = ledger.slots[index].balance;
            let Some(acc) = accruals[index].as_mut() else {
                continue;
            };
            let room = balance + acc.interest - acc.assigned;
            if room > epsilon {
                let extra = room.min(leftover);
                acc.assigned += extra;
                leftover -= extra;
                assigned_this_pass += extra;
            }
            if leftover <= 0.0 {
                break;
            }
        }

        if assigned_this_pass <= 0.0 {
            break;
        }
    }
}

fn apply_payments(ledger: &mut Ledger, accruals: &[Option<Accrual>], month: u32) -> ScheduleRow {
    let mut debts = Vec::with_capacity(ledger.slots.len());
    let mut interest_paid = 0.0;
    let mut principal_paid = 0.0;
    let mut payment = 0.0;

    for (slot, accrual) in ledger.slots.iter_mut().zip(accruals) {
        let Some(acc) = accrual else {
            debts.push(DebtMonth {
                id: slot.id.clone(),
                payment: 0.0,
                interest: 0.0,
                principal: 0.0,
                balance_end: slot.balance,
            });
            continue;
        };

        let principal = (acc.assigned - acc.interest).max(0.0);
        slot.balance = (slot.balance + acc.interest - acc.assigned).max(0.0);

        interest_paid += acc.interest;
        principal_paid += principal;
        payment += acc.assigned;
        debts.push(DebtMonth {
            id: slot.id.clone(),
            payment: acc.assigned,
            interest: acc.interest,
            principal,
            balance_end: slot.balance,
        });
    }

    ScheduleRow {
        month,
        total_balance_end: ledger.total_balance(),
        interest_paid,
        principal_paid,
        payment,
        debts,
    }
}
