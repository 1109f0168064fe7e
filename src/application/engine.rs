use crate::application::policy::order_by_policy;
use crate::domain::debt::{Debt, PAID_OFF_EPSILON, checked_total};
use crate::domain::schedule::{PaymentPeriod, Strategy, StrategyComparison, StrategyResult};
use crate::error::{PlanError, Result};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::debug;

/// Hard ceiling on simulated months (50 years).
pub const MAX_MONTHS: u32 = 600;

/// Simulates paying down `ordered` debts with a fixed `monthly_budget`.
///
/// Every debt receives its minimum payment each month. Whatever the budget
/// leaves over the sum of all minimums goes to exactly one debt: the first
/// one in `ordered` still owing at the start of the month. When that debt
/// is cleared mid-month the extra moves on in the following month.
///
/// Interest is rounded to cents per debt and month, so totals can differ
/// by a few cents from a schedule computed on unrounded interest. A payment
/// that does not cover interest pays what it can and leaves the balance
/// unchanged.
///
/// # Errors
///
/// Returns [`PlanError::InsufficientPayment`] when the minimum payments add
/// up to more than `monthly_budget`, and [`PlanError::Validation`] when two
/// debts share an id or an amount overflows.
pub fn simulate(
    ordered: &[Debt],
    monthly_budget: Decimal,
    strategy: Strategy,
) -> Result<StrategyResult> {
    let mut ids = HashSet::new();
    if let Some(duplicate) = ordered.iter().find(|&d| !ids.insert(d.id.as_str())) {
        return Err(PlanError::Validation(format!(
            "debt id '{}' is used more than once",
            duplicate.id
        )));
    }

    let required = checked_total(
        ordered.iter().map(|d| d.minimum_payment),
        "minimum payments",
    )?;
    if required > monthly_budget {
        return Err(PlanError::InsufficientPayment {
            required,
            available: monthly_budget,
        });
    }
    let extra = monthly_budget
        .checked_sub(required)
        .ok_or_else(|| PlanError::overflow("extra payment"))?;

    let mut balances: Vec<Decimal> = ordered
        .iter()
        .map(|d| if d.is_paid_off() { Decimal::ZERO } else { d.balance })
        .collect();
    let mut payoff_order: Vec<String> = ordered
        .iter()
        .filter(|d| d.is_paid_off())
        .map(|d| d.id.clone())
        .collect();

    let mut periods = Vec::new();
    let mut total_interest = Decimal::ZERO;

    while periods.len() < MAX_MONTHS as usize && balances.iter().any(|b| *b > PAID_OFF_EPSILON) {
        let focus = balances.iter().position(|b| *b > PAID_OFF_EPSILON);
        let mut principal_paid = Decimal::ZERO;
        let mut interest_paid = Decimal::ZERO;

        for (idx, debt) in ordered.iter().enumerate() {
            let balance = balances[idx];
            if balance <= PAID_OFF_EPSILON {
                continue;
            }

            let interest_due = balance
                .checked_mul(debt.monthly_rate())
                .ok_or_else(|| PlanError::overflow("interest"))?
                .round_dp(2);
            let mut payment = debt.minimum_payment;
            if focus == Some(idx) {
                payment = payment
                    .checked_add(extra)
                    .ok_or_else(|| PlanError::overflow("payment"))?;
            }

            let interest = interest_due.min(payment);
            let principal = payment
                .checked_sub(interest)
                .ok_or_else(|| PlanError::overflow("principal"))?
                .min(balance);
            let mut remaining = balance - principal;
            if remaining <= PAID_OFF_EPSILON {
                remaining = Decimal::ZERO;
                payoff_order.push(debt.id.clone());
            }

            balances[idx] = remaining;
            principal_paid = checked_total([principal_paid, principal], "principal")?;
            interest_paid = checked_total([interest_paid, interest], "interest")?;
        }

        total_interest = checked_total([total_interest, interest_paid], "total interest")?;
        periods.push(PaymentPeriod {
            month: periods.len() as u32 + 1,
            principal: principal_paid,
            interest: interest_paid,
            total_payment: checked_total([principal_paid, interest_paid], "payment")?,
            remaining_balance: checked_total(balances.iter().copied(), "remaining balance")?,
        });
    }

    debug!(
        %strategy,
        months = periods.len(),
        %total_interest,
        paid_off = payoff_order.len(),
        debts = ordered.len(),
        "simulation finished"
    );

    Ok(StrategyResult {
        strategy,
        total_interest,
        months: periods.len() as u32,
        monthly_payment: monthly_budget,
        periods,
        payoff_order,
    })
}

/// Orders `debts` by `strategy` and simulates the result.
pub fn run_strategy(
    debts: &[Debt],
    monthly_budget: Decimal,
    strategy: Strategy,
) -> Result<StrategyResult> {
    let ordered = order_by_policy(debts, strategy);
    simulate(&ordered, monthly_budget, strategy)
}

/// Runs every strategy and recommends the cheapest.
///
/// Cheapest means least total interest, then fewest months. Remaining ties
/// go to the strategy listed first in [`Strategy::ALL`].
pub fn compare_strategies(debts: &[Debt], monthly_budget: Decimal) -> Result<StrategyComparison> {
    let results = Strategy::ALL
        .iter()
        .map(|strategy| run_strategy(debts, monthly_budget, *strategy))
        .collect::<Result<Vec<_>>>()?;

    let best = results
        .iter()
        .min_by_key(|r| (r.total_interest, r.months))
        .ok_or_else(|| PlanError::Validation("no strategies to compare".to_string()))?;
    let worst_interest = results
        .iter()
        .map(|r| r.total_interest)
        .max()
        .unwrap_or(best.total_interest);

    Ok(StrategyComparison {
        recommended: best.strategy,
        interest_saved: worst_interest - best.total_interest,
        results,
    })
}
