use crate::domain::debt::Debt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::fmt;

const MAX_INTEREST_RATE: Decimal = dec!(50);

/// Largest balance or minimum payment accepted. Sums of amounts this size
/// stay far inside what `Decimal` can represent.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

#[derive(Debug, PartialEq, Clone)]
pub enum IssueKind {
    NonPositiveBalance,
    RateOutOfRange,
    NonPositiveMinimum,
    MinimumBelowInterest { interest_only: Decimal },
    DueDateOutOfRange,
    DuplicateId,
    AmountTooLarge,
}

/// A problem with one debt. Issues never stop processing on their own;
/// the caller decides whether to go on.
#[derive(Debug, PartialEq, Clone)]
pub struct ValidationIssue {
    pub debt_id: String,
    pub debt_name: String,
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): ", self.debt_name, self.debt_id)?;
        match &self.kind {
            IssueKind::NonPositiveBalance => f.write_str("balance must be greater than zero"),
            IssueKind::RateOutOfRange => {
                write!(f, "interest rate must be between 0 and {MAX_INTEREST_RATE}%")
            }
            IssueKind::NonPositiveMinimum => {
                f.write_str("minimum payment must be greater than zero")
            }
            IssueKind::MinimumBelowInterest { interest_only } => write!(
                f,
                "minimum payment too low to cover interest (interest-only payment is {})",
                interest_only.round_dp(2)
            ),
            IssueKind::DueDateOutOfRange => f.write_str("due date must be between 1 and 31"),
            IssueKind::DuplicateId => f.write_str("id is used by more than one debt"),
            IssueKind::AmountTooLarge => {
                write!(f, "balance and minimum payment must not exceed {MAX_AMOUNT}")
            }
        }
    }
}

/// Checks every debt and returns all problems found, in input order.
pub fn validate(debts: &[Debt]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for debt in debts {
        let mut report = |kind| {
            issues.push(ValidationIssue {
                debt_id: debt.id.clone(),
                debt_name: debt.name.clone(),
                kind,
            })
        };

        if !seen.insert(debt.id.as_str()) {
            report(IssueKind::DuplicateId);
        }
        if debt.balance <= Decimal::ZERO {
            report(IssueKind::NonPositiveBalance);
        }
        if debt.balance > MAX_AMOUNT || debt.minimum_payment > MAX_AMOUNT {
            report(IssueKind::AmountTooLarge);
        }
        if debt.interest_rate < Decimal::ZERO || debt.interest_rate > MAX_INTEREST_RATE {
            report(IssueKind::RateOutOfRange);
        }
        if debt.minimum_payment <= Decimal::ZERO {
            report(IssueKind::NonPositiveMinimum);
        } else {
            let interest_only = debt.interest_only_payment();
            if debt.minimum_payment <= interest_only {
                report(IssueKind::MinimumBelowInterest { interest_only });
            }
        }
        if !(1..=31).contains(&debt.due_date) {
            report(IssueKind::DueDateOutOfRange);
        }
    }

    issues
}
