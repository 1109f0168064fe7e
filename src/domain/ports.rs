use super::profile::{ConversationEntry, FinancialProfile};
use crate::error::Result;
use async_trait::async_trait;

/// Key-value persistence for the user's profile and advisor history.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn save_profile(&self, profile: FinancialProfile) -> Result<()>;
    async fn load_profile(&self) -> Result<Option<FinancialProfile>>;
    /// Appends an entry, evicting the oldest beyond the history cap.
    async fn append_conversation(&self, entry: ConversationEntry) -> Result<()>;
    /// Returns the stored history, oldest first.
    async fn conversations(&self) -> Result<Vec<ConversationEntry>>;
}

/// An external text-generation service: prompt in, free text out.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub type ProfileStoreBox = Box<dyn ProfileStore>;
pub type AdvisorBox = Box<dyn Advisor>;
