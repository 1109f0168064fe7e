use crate::domain::ports::ProfileStore;
use crate::domain::profile::{ConversationEntry, FinancialProfile, push_bounded};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct ProfileState {
    profile: Option<FinancialProfile>,
    conversations: Vec<ConversationEntry>,
}

/// A thread-safe in-memory profile store.
///
/// Nothing survives the process. Used when no database path is given and
/// throughout the tests.
#[derive(Default, Clone)]
pub struct InMemoryProfileStore {
    state: Arc<RwLock<ProfileState>>,
}

impl InMemoryProfileStore {
    /// Creates a new, empty in-memory profile store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn save_profile(&self, profile: FinancialProfile) -> Result<()> {
        self.state.write().await.profile = Some(profile);
        Ok(())
    }

    async fn load_profile(&self) -> Result<Option<FinancialProfile>> {
        Ok(self.state.read().await.profile.clone())
    }

    async fn append_conversation(&self, entry: ConversationEntry) -> Result<()> {
        let mut state = self.state.write().await;
        push_bounded(&mut state.conversations, entry);
        Ok(())
    }

    async fn conversations(&self) -> Result<Vec<ConversationEntry>> {
        Ok(self.state.read().await.conversations.clone())
    }
}
