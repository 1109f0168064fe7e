use crate::application::metrics::DebtMetrics;
use crate::domain::ports::{AdvisorBox, ProfileStore, ProfileStoreBox};
use crate::domain::profile::{Advice, ConversationEntry, FinancialProfile};
use crate::domain::schedule::StrategyComparison;
use crate::error::{PlanError, Result};
use crate::infrastructure::rate_limiter::RateLimiter;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt::{self, Write};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ADVISOR_TIMEOUT: Duration = Duration::from_secs(30);

/// The only answer shape accepted from the advisor.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AdviceSchema {
    summary: String,
    recommendations: Vec<String>,
    #[serde(default)]
    focus_debt: Option<String>,
}

fn money(value: Decimal) -> Decimal {
    value.round_dp(2).normalize()
}

/// Describes the plan in plain text and asks for a JSON answer.
pub fn render_prompt(
    profile: &FinancialProfile,
    metrics: &DebtMetrics,
    comparison: &StrategyComparison,
) -> String {
    let mut prompt = String::new();
    // Writing into a String cannot fail.
    let _ = write_prompt(&mut prompt, profile, metrics, comparison);
    prompt
}

fn write_prompt(
    out: &mut impl Write,
    profile: &FinancialProfile,
    metrics: &DebtMetrics,
    comparison: &StrategyComparison,
) -> fmt::Result {
    writeln!(
        out,
        "You are a debt repayment advisor. Review this plan and give practical advice."
    )?;
    writeln!(out)?;
    writeln!(out, "Monthly income: {}", money(profile.monthly_income))?;
    if let Some(goal) = &profile.goal {
        writeln!(out, "Goal: {goal}")?;
    }

    writeln!(out)?;
    writeln!(out, "Debts:")?;
    for debt in &profile.debts {
        writeln!(
            out,
            "- {} (id {}, {:?}): balance {}, {}% APR, minimum {} due on day {}",
            debt.name,
            debt.id,
            debt.debt_type,
            money(debt.balance),
            debt.interest_rate.normalize(),
            money(debt.minimum_payment),
            debt.due_date
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Total debt: {}", money(metrics.total_debt))?;
    writeln!(out, "Total minimum payments: {}", money(metrics.total_minimums))?;
    match metrics.debt_to_income_ratio {
        Some(ratio) => writeln!(out, "Debt-to-income ratio: {}%", money(ratio))?,
        None => writeln!(out, "Debt-to-income ratio: unknown (no income given)")?,
    }
    if let Some(rate) = metrics.average_rate {
        writeln!(out, "Average interest rate: {}%", money(rate))?;
    }

    writeln!(out)?;
    writeln!(out, "Strategies:")?;
    for result in &comparison.results {
        writeln!(
            out,
            "- {}: {} months, total interest {}, payoff order {}",
            result.strategy,
            result.months,
            money(result.total_interest),
            result.payoff_order.join(" -> ")
        )?;
    }
    writeln!(
        out,
        "Cheapest strategy: {} (saves {} in interest)",
        comparison.recommended,
        money(comparison.interest_saved)
    )?;

    writeln!(out)?;
    write!(
        out,
        "Answer with only a JSON object of the form \
         {{\"summary\": string, \"recommendations\": [string], \"focus_debt\": debt id or null}}."
    )
}

/// Strips ```json ... ``` or ``` ... ``` fences around a model answer.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(body) => body.trim().strip_suffix("```").unwrap_or(body).trim(),
        None => text,
    }
}

/// Parses an advisor answer against the expected schema.
///
/// Anything that does not fit comes back as [`Advice::Unstructured`] with
/// the reason attached, never as an empty structured answer.
pub fn parse_advice(text: &str) -> Advice {
    let unstructured = |reason: String| {
        warn!(%reason, "advisor answer did not match the expected schema");
        Advice::Unstructured {
            raw: text.to_string(),
            reason,
        }
    };

    let schema: AdviceSchema = match serde_json::from_str(strip_json_fences(text)) {
        Ok(schema) => schema,
        Err(e) => return unstructured(e.to_string()),
    };

    let summary = schema.summary.trim();
    if summary.is_empty() {
        return unstructured("summary is empty".to_string());
    }
    let recommendations: Vec<String> = schema
        .recommendations
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    if recommendations.is_empty() {
        return unstructured("no recommendations given".to_string());
    }

    Advice::Structured {
        summary: summary.to_string(),
        recommendations,
        focus_debt: schema.focus_debt.filter(|id| !id.trim().is_empty()),
    }
}

/// Asks the external advisor about a plan and keeps the conversation.
///
/// Owns the single rate limiter for the advisor. Every failure it returns
/// is soft (see [`PlanError::is_external`]) apart from storage errors.
pub struct AdvisorService {
    advisor: AdvisorBox,
    store: ProfileStoreBox,
    limiter: Mutex<RateLimiter>,
    timeout: Duration,
}

impl AdvisorService {
    pub fn new(advisor: AdvisorBox, store: ProfileStoreBox, limiter: RateLimiter) -> Self {
        Self {
            advisor,
            store,
            limiter: Mutex::new(limiter),
            timeout: DEFAULT_ADVISOR_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &dyn ProfileStore {
        self.store.as_ref()
    }

    pub async fn advise(
        &self,
        profile: &FinancialProfile,
        metrics: &DebtMetrics,
        comparison: &StrategyComparison,
    ) -> Result<Advice> {
        self.ask(render_prompt(profile, metrics, comparison)).await
    }

    /// Sends `prompt` as-is and records the parsed answer.
    pub async fn ask(&self, prompt: String) -> Result<Advice> {
        self.limiter
            .lock()
            .map_err(|e| PlanError::Internal(e.to_string().into()))?
            .try_acquire()?;

        let text = tokio::time::timeout(self.timeout, self.advisor.complete(&prompt))
            .await
            .map_err(|_| PlanError::AdvisorTimeout(self.timeout))??;
        debug!(chars = text.len(), "advisor answered");

        let advice = parse_advice(&text);
        self.store
            .append_conversation(ConversationEntry::new(prompt, advice.clone()))
            .await?;
        Ok(advice)
    }

    pub async fn history(&self) -> Result<Vec<ConversationEntry>> {
        self.store.conversations().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::engine::compare_strategies;
    use crate::application::metrics::compute_metrics;
    use crate::domain::debt::{Debt, DebtType};
    use crate::domain::ports::Advisor;
    use crate::infrastructure::in_memory::InMemoryProfileStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct FixedAdvisor(String);

    #[async_trait]
    impl Advisor for FixedAdvisor {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct SlowAdvisor;

    #[async_trait]
    impl Advisor for SlowAdvisor {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    struct FailingAdvisor;

    #[async_trait]
    impl Advisor for FailingAdvisor {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(PlanError::Advisor("service unavailable".to_string()))
        }
    }

    const GOOD_ANSWER: &str = r#"{"summary": "Clear the Visa first.", "recommendations": ["Pay 150 extra on the Visa", " "], "focus_debt": "card"}"#;

    fn profile() -> FinancialProfile {
        FinancialProfile {
            monthly_income: dec!(4000),
            debts: vec![
                Debt::new("card", "Visa", dec!(2500), dec!(22), dec!(75))
                    .with_type(DebtType::CreditCard),
                Debt::new("car", "Car loan", dec!(8000), dec!(6), dec!(250))
                    .with_type(DebtType::AutoLoan),
            ],
            goal: Some("Debt free in three years".to_string()),
        }
    }

    fn service(advisor: AdvisorBox, limit: usize) -> AdvisorService {
        AdvisorService::new(
            advisor,
            Box::new(InMemoryProfileStore::new()),
            RateLimiter::per_minute(limit),
        )
    }

    #[test]
    fn test_parse_structured_advice() {
        let advice = parse_advice(GOOD_ANSWER);
        assert_eq!(
            advice,
            Advice::Structured {
                summary: "Clear the Visa first.".to_string(),
                recommendations: vec!["Pay 150 extra on the Visa".to_string()],
                focus_debt: Some("card".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_fenced_advice() {
        let fenced = format!("```json\n{GOOD_ANSWER}\n```");
        assert!(parse_advice(&fenced).is_structured());
    }

    #[test]
    fn test_parse_free_text_falls_back() {
        let advice = parse_advice("Pay the card first, then the car.");
        match advice {
            Advice::Unstructured { raw, reason } => {
                assert_eq!(raw, "Pay the card first, then the car.");
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected advice: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let advice = parse_advice(r#"{"summary": "x", "recommendations": ["y"], "mood": "calm"}"#);
        assert!(!advice.is_structured());
    }

    #[test]
    fn test_parse_rejects_empty_recommendations() {
        let advice = parse_advice(r#"{"summary": "All good", "recommendations": []}"#);
        match advice {
            Advice::Unstructured { reason, .. } => {
                assert_eq!(reason, "no recommendations given")
            }
            other => panic!("unexpected advice: {other:?}"),
        }
    }

    #[test]
    fn test_prompt_mentions_plan() {
        let profile = profile();
        let metrics = compute_metrics(&profile.debts, profile.monthly_income).unwrap();
        let comparison = compare_strategies(&profile.debts, dec!(800)).unwrap();
        let prompt = render_prompt(&profile, &metrics, &comparison);

        assert!(prompt.contains("Monthly income: 4000"));
        assert!(prompt.contains("Goal: Debt free in three years"));
        assert!(prompt.contains("Visa (id card, CreditCard): balance 2500, 22% APR"));
        assert!(prompt.contains("Total minimum payments: 325"));
        assert!(prompt.contains("- avalanche:"));
        assert!(prompt.contains("\"recommendations\""));
    }

    #[tokio::test]
    async fn test_ask_records_conversation() {
        let service = service(Box::new(FixedAdvisor(GOOD_ANSWER.to_string())), 5);

        let advice = service.ask("What first?".to_string()).await.unwrap();
        assert!(advice.is_structured());

        let history = service.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].prompt, "What first?");
        assert_eq!(history[0].advice, advice);
    }

    #[tokio::test]
    async fn test_ask_is_rate_limited() {
        let service = service(Box::new(FixedAdvisor(GOOD_ANSWER.to_string())), 2);

        service.ask("one".to_string()).await.unwrap();
        service.ask("two".to_string()).await.unwrap();
        let err = service.ask("three".to_string()).await.unwrap_err();

        assert!(matches!(err, PlanError::RateLimited { .. }));
        assert!(err.is_external());
        assert_eq!(service.history().await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ask_times_out() {
        let service =
            service(Box::new(SlowAdvisor), 5).with_timeout(Duration::from_secs(5));

        let err = service.ask("hello".to_string()).await.unwrap_err();
        assert!(matches!(err, PlanError::AdvisorTimeout(_)));
        assert!(service.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_advisor_failure_is_soft() {
        let service = service(Box::new(FailingAdvisor), 5);
        let err = service.ask("hello".to_string()).await.unwrap_err();
        assert!(err.is_external());
    }
}
