use miette::Diagnostic;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum PlanError {
    #[error("CSV error: {0}")]
    #[diagnostic(code(debtplan::csv))]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(debtplan::io))]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(debtplan::json))]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    #[diagnostic(code(debtplan::validation))]
    Validation(String),

    #[error("Insufficient payment: minimum payments total {required}, but only {available} is available")]
    #[diagnostic(
        code(debtplan::insufficient_payment),
        help("raise the monthly budget to at least the sum of minimum payments")
    )]
    InsufficientPayment { required: Decimal, available: Decimal },

    #[error("Rate limited: retry in {}s", .retry_after.as_secs())]
    #[diagnostic(code(debtplan::rate_limited))]
    RateLimited { retry_after: Duration },

    #[error("Advisor error: {0}")]
    #[diagnostic(code(debtplan::advisor))]
    Advisor(String),

    #[error("Advisor did not answer within {}s", .0.as_secs())]
    #[diagnostic(code(debtplan::advisor_timeout))]
    AdvisorTimeout(Duration),

    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    #[diagnostic(code(debtplan::storage))]
    Storage(#[from] rocksdb::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(debtplan::internal))]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl PlanError {
    /// An amount grew past what `Decimal` can hold.
    pub fn overflow(what: &str) -> Self {
        Self::Validation(format!("{what} is too large to compute"))
    }

    /// Failures at the advisor boundary. Callers keep the computed plan and
    /// drop the narrative when one of these comes back.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Advisor(_) | Self::AdvisorTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
