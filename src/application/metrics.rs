use crate::domain::debt::{Debt, checked_total};
use crate::error::{PlanError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Share of monthly income suggested as a floor for debt payments.
const RECOMMENDED_INCOME_SHARE: Decimal = dec!(0.2);

/// Aggregate figures describing a debt set against the user's income.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DebtMetrics {
    pub total_debt: Decimal,
    pub total_minimums: Decimal,
    /// Minimum payments as a percentage of income. `None` without income.
    pub debt_to_income_ratio: Option<Decimal>,
    /// Balance-weighted annual rate. `None` when nothing is owed.
    pub average_rate: Option<Decimal>,
    pub recommended_payment: Decimal,
}

/// # Errors
///
/// Returns [`PlanError::Validation`] when an amount overflows.
pub fn compute_metrics(debts: &[Debt], monthly_income: Decimal) -> Result<DebtMetrics> {
    let total_debt = checked_total(debts.iter().map(|d| d.balance), "total debt")?;
    let total_minimums =
        checked_total(debts.iter().map(|d| d.minimum_payment), "minimum payments")?;
    let weighted = debts
        .iter()
        .map(|d| {
            d.interest_rate
                .checked_mul(d.balance)
                .ok_or_else(|| PlanError::overflow("average rate"))
        })
        .collect::<Result<Vec<_>>>()?;
    let weighted_rate = checked_total(weighted, "average rate")?;

    let debt_to_income_ratio = if monthly_income.is_zero() {
        None
    } else {
        let ratio = total_minimums
            .checked_div(monthly_income)
            .and_then(|share| share.checked_mul(dec!(100)))
            .ok_or_else(|| PlanError::overflow("debt-to-income ratio"))?;
        Some(ratio)
    };
    let average_rate = if total_debt.is_zero() {
        None
    } else {
        let rate = weighted_rate
            .checked_div(total_debt)
            .ok_or_else(|| PlanError::overflow("average rate"))?;
        Some(rate)
    };
    let income_share = monthly_income
        .checked_mul(RECOMMENDED_INCOME_SHARE)
        .ok_or_else(|| PlanError::overflow("recommended payment"))?;

    Ok(DebtMetrics {
        total_debt,
        total_minimums,
        debt_to_income_ratio,
        average_rate,
        recommended_payment: total_minimums.max(income_share),
    })
}
