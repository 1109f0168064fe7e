use crate::domain::ports::ProfileStore;
use crate::domain::profile::{ConversationEntry, FinancialProfile, push_bounded};
use crate::error::{PlanError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family holding the financial profile.
pub const CF_PROFILE: &str = "profile";
/// Column Family holding the advisor conversation history.
pub const CF_CONVERSATIONS: &str = "conversations";

const PROFILE_KEY: &[u8] = b"profile";
const HISTORY_KEY: &[u8] = b"history";

/// A persistent profile store backed by RocksDB.
///
/// Both the profile and the conversation history are stored as JSON blobs
/// under fixed keys in their own Column Families. The history blob is
/// rewritten on every append; `history_lock` serializes those
/// read-modify-write cycles.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBProfileStore {
    db: Arc<DB>,
    history_lock: Arc<Mutex<()>>,
}

impl RocksDBProfileStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_profile = ColumnFamilyDescriptor::new(CF_PROFILE, Options::default());
        let cf_conversations = ColumnFamilyDescriptor::new(CF_CONVERSATIONS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_profile, cf_conversations])?;

        Ok(Self {
            db: Arc::new(db),
            history_lock: Arc::new(Mutex::new(())),
        })
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.db.cf_handle(cf_name).ok_or_else(|| missing_cf(cf_name))?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(&cf, key, bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.db.cf_handle(cf_name).ok_or_else(|| missing_cf(cf_name))?;
        match self.db.get_pinned_cf(&cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn missing_cf(name: &str) -> PlanError {
    PlanError::Internal(Box::new(std::io::Error::other(format!(
        "{name} column family not found"
    ))))
}

#[async_trait]
impl ProfileStore for RocksDBProfileStore {
    async fn save_profile(&self, profile: FinancialProfile) -> Result<()> {
        self.put_json(CF_PROFILE, PROFILE_KEY, &profile)
    }

    async fn load_profile(&self) -> Result<Option<FinancialProfile>> {
        self.get_json(CF_PROFILE, PROFILE_KEY)
    }

    async fn append_conversation(&self, entry: ConversationEntry) -> Result<()> {
        let _guard = self.history_lock.lock().await;
        let mut history: Vec<ConversationEntry> = self
            .get_json(CF_CONVERSATIONS, HISTORY_KEY)?
            .unwrap_or_default();
        push_bounded(&mut history, entry);
        self.put_json(CF_CONVERSATIONS, HISTORY_KEY, &history)
    }

    async fn conversations(&self) -> Result<Vec<ConversationEntry>> {
        Ok(self
            .get_json(CF_CONVERSATIONS, HISTORY_KEY)?
            .unwrap_or_default())
    }
}
