//! Debt repayment planning: ordering policies, amortization schedules,
//! metrics and validation, plus a rate-limited boundary to an external
//! text-generation advisor.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
