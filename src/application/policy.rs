use crate::domain::debt::Debt;
use crate::domain::schedule::Strategy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const HYBRID_BALANCE_WEIGHT: Decimal = dec!(0.4);
const HYBRID_RATE_WEIGHT: Decimal = dec!(0.6);
const HYBRID_BALANCE_SCALE: Decimal = dec!(10000);

/// Blended ranking score used by [`Strategy::Hybrid`]; lower goes first.
pub fn hybrid_score(debt: &Debt) -> Decimal {
    HYBRID_BALANCE_WEIGHT * (debt.balance / HYBRID_BALANCE_SCALE)
        + HYBRID_RATE_WEIGHT * debt.interest_rate
}

/// Returns the debts in the order `strategy` pays them down.
///
/// The input is left untouched. All sorts are stable, so ties keep the
/// order the debts were entered in.
pub fn order_by_policy(debts: &[Debt], strategy: Strategy) -> Vec<Debt> {
    let mut ordered = debts.to_vec();
    match strategy {
        Strategy::Snowball => ordered.sort_by(|a, b| a.balance.cmp(&b.balance)),
        Strategy::Avalanche => ordered.sort_by(|a, b| b.interest_rate.cmp(&a.interest_rate)),
        Strategy::Hybrid => ordered.sort_by_cached_key(hybrid_score),
    }
    ordered
}
