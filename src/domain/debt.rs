use crate::error::{PlanError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Balances at or below this amount count as paid off.
pub const PAID_OFF_EPSILON: Decimal = dec!(0.01);

/// Sums `amounts`, reporting overflow as an error naming `what`.
pub fn checked_total(amounts: impl IntoIterator<Item = Decimal>, what: &str) -> Result<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).ok_or_else(|| PlanError::overflow(what))
    })
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum DebtType {
    CreditCard,
    PersonalLoan,
    StudentLoan,
    AutoLoan,
    Mortgage,
    Medical,
    #[default]
    Other,
}

/// A single debt as entered by the user.
///
/// The engine only ever works on clones of these; the caller's records are
/// never touched by a simulation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Debt {
    /// Unique identifier, echoed back in payoff orders.
    pub id: String,
    pub name: String,
    /// Outstanding balance.
    pub balance: Decimal,
    /// Annual interest rate as a percentage (`18.5` means 18.5%).
    pub interest_rate: Decimal,
    pub minimum_payment: Decimal,
    /// Day of the month the payment is due.
    pub due_date: u8,
    #[serde(default)]
    pub debt_type: DebtType,
}

impl Debt {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        balance: Decimal,
        interest_rate: Decimal,
        minimum_payment: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
            interest_rate,
            minimum_payment,
            due_date: 1,
            debt_type: DebtType::default(),
        }
    }

    pub fn with_type(mut self, debt_type: DebtType) -> Self {
        self.debt_type = debt_type;
        self
    }

    pub fn with_due_date(mut self, due_date: u8) -> Self {
        self.due_date = due_date;
        self
    }

    /// Annual percentage rate converted to a monthly fraction.
    pub fn monthly_rate(&self) -> Decimal {
        self.interest_rate / dec!(12) / dec!(100)
    }

    /// The payment that covers one month of interest and nothing else.
    /// Saturates at `Decimal::MAX`.
    pub fn interest_only_payment(&self) -> Decimal {
        self.balance.saturating_mul(self.monthly_rate())
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= PAID_OFF_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rate() {
        let debt = Debt::new("card", "Visa", dec!(1200), dec!(12), dec!(200));
        assert_eq!(debt.monthly_rate(), dec!(0.01));
        assert_eq!(debt.interest_only_payment(), dec!(12));
    }

    #[test]
    fn test_paid_off_threshold() {
        let mut debt = Debt::new("card", "Visa", dec!(0.01), dec!(12), dec!(200));
        assert!(debt.is_paid_off());
        debt.balance = dec!(0.02);
        assert!(!debt.is_paid_off());
    }

    #[test]
    fn test_checked_total_overflow() {
        assert_eq!(checked_total([dec!(1.5), dec!(2.25)], "sum").unwrap(), dec!(3.75));

        let err = checked_total([Decimal::MAX, dec!(1)], "balances").unwrap_err();
        assert!(matches!(err, PlanError::Validation(ref m) if m.contains("balances")));
    }

    #[test]
    fn test_interest_only_payment_saturates() {
        let debt = Debt::new("big", "Big", Decimal::MAX, dec!(5000), dec!(1));
        assert_eq!(debt.interest_only_payment(), Decimal::MAX);
    }

    #[test]
    fn test_debt_type_serialization() {
        let json = serde_json::to_string(&DebtType::CreditCard).unwrap();
        assert_eq!(json, "\"credit_card\"");

        let parsed: DebtType = serde_json::from_str("\"student_loan\"").unwrap();
        assert_eq!(parsed, DebtType::StudentLoan);
    }
}
