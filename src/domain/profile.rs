use super::debt::Debt;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Conversation entries kept per profile; older ones are evicted first.
pub const MAX_CONVERSATION_HISTORY: usize = 20;

/// The user's financial situation as persisted between runs.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct FinancialProfile {
    pub monthly_income: Decimal,
    pub debts: Vec<Debt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// What came back from the advisor.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advice {
    /// The answer matched the expected schema.
    Structured {
        summary: String,
        recommendations: Vec<String>,
        focus_debt: Option<String>,
    },
    /// The answer could not be parsed; `reason` says why.
    Unstructured { raw: String, reason: String },
}

impl Advice {
    pub fn is_structured(&self) -> bool {
        matches!(self, Advice::Structured { .. })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ConversationEntry {
    pub asked_at: DateTime<Utc>,
    pub prompt: String,
    pub advice: Advice,
}

impl ConversationEntry {
    pub fn new(prompt: String, advice: Advice) -> Self {
        Self {
            asked_at: Utc::now(),
            prompt,
            advice,
        }
    }
}

/// Appends `entry` and drops the oldest entries beyond the history cap.
pub fn push_bounded(history: &mut Vec<ConversationEntry>, entry: ConversationEntry) {
    history.push(entry);
    if history.len() > MAX_CONVERSATION_HISTORY {
        let excess = history.len() - MAX_CONVERSATION_HISTORY;
        history.drain(..excess);
    }
}
