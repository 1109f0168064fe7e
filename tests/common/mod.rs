use debtplan::domain::debt::{Debt, DebtType};
use rand::Rng;
use rust_decimal::Decimal;
use std::io::Error;
use std::path::Path;

const TYPES: [DebtType; 7] = [
    DebtType::CreditCard,
    DebtType::PersonalLoan,
    DebtType::StudentLoan,
    DebtType::AutoLoan,
    DebtType::Mortgage,
    DebtType::Medical,
    DebtType::Other,
];

/// Debts whose minimum payment always exceeds the interest-only payment.
pub fn random_debts<R: Rng>(rng: &mut R, count: usize) -> Vec<Debt> {
    (0..count)
        .map(|i| {
            let balance = Decimal::new(rng.gen_range(10_000..2_000_000), 2);
            let rate = Decimal::new(rng.gen_range(0..=3_000), 2);
            let mut debt = Debt::new(
                format!("debt-{i}"),
                format!("Debt {i}"),
                balance,
                rate,
                Decimal::ZERO,
            )
            .with_type(TYPES[rng.gen_range(0..TYPES.len())])
            .with_due_date(rng.gen_range(1..=28));
            let cushion = Decimal::new(rng.gen_range(1_000..20_000), 2);
            debt.minimum_payment = (debt.interest_only_payment() + cushion).round_dp(2);
            debt
        })
        .collect()
}

pub fn write_debts_csv(path: &Path, debts: &[Debt]) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    for debt in debts {
        wtr.serialize(debt)?;
    }
    wtr.flush()?;
    Ok(())
}
