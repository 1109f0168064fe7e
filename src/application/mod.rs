//! Application layer: the debt strategy engine and the advisor boundary.
//!
//! Everything except [`advisor`] is synchronous and pure. Callers hand in
//! debt slices and get fresh values back; nothing here mutates the input.

pub mod advisor;
pub mod engine;
pub mod metrics;
pub mod policy;
pub mod validation;

pub use advisor::{AdvisorService, parse_advice, render_prompt};
pub use engine::{compare_strategies, run_strategy, simulate};
pub use metrics::{DebtMetrics, compute_metrics};
pub use policy::order_by_policy;
pub use validation::{ValidationIssue, validate};
