use crate::error::PlanError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repayment prioritization policy.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Smallest balance first.
    Snowball,
    /// Highest interest rate first.
    Avalanche,
    /// Blended balance/rate score.
    Hybrid,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Snowball, Strategy::Avalanche, Strategy::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Snowball => "snowball",
            Strategy::Avalanche => "avalanche",
            Strategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowball" => Ok(Strategy::Snowball),
            "avalanche" => Ok(Strategy::Avalanche),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(PlanError::Validation(format!(
                "unknown strategy '{other}' (expected snowball, avalanche or hybrid)"
            ))),
        }
    }
}

/// One simulated month, aggregated across every debt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentPeriod {
    pub month: u32,
    pub principal: Decimal,
    pub interest: Decimal,
    pub total_payment: Decimal,
    pub remaining_balance: Decimal,
}

/// The outcome of simulating one strategy against one debt set and budget.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct StrategyResult {
    pub strategy: Strategy,
    pub total_interest: Decimal,
    pub months: u32,
    pub monthly_payment: Decimal,
    pub periods: Vec<PaymentPeriod>,
    /// Debt ids in the order their balances reached zero.
    pub payoff_order: Vec<String>,
}

impl StrategyResult {
    /// Whether every debt was cleared before the simulation ceiling.
    pub fn is_fully_paid(&self) -> bool {
        self.periods
            .last()
            .is_none_or(|p| p.remaining_balance.is_zero())
    }
}

/// All three strategies side by side, with the cheapest one singled out.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct StrategyComparison {
    pub results: Vec<StrategyResult>,
    pub recommended: Strategy,
    /// Interest saved by the recommended strategy versus the most expensive one.
    pub interest_saved: Decimal,
}

impl StrategyComparison {
    pub fn result(&self, strategy: Strategy) -> Option<&StrategyResult> {
        self.results.iter().find(|r| r.strategy == strategy)
    }

    pub fn recommended_result(&self) -> Option<&StrategyResult> {
        self.result(self.recommended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_round_trips_through_str() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!(" Avalanche ".parse::<Strategy>().unwrap(), Strategy::Avalanche);
    }

    #[test]
    fn test_unknown_strategy() {
        let err = "fastest".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
    }
}
