use std::collections::HashMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Info,
    Success,
    Danger,
}

/// One-shot message shown on the next rendered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

/// What the session store persists between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub flashes: Vec<Flash>,
}

/// Per-browser state handed to every basket and checkout operation.
///
/// Holds at most one `order_id`. Mutations mark the context dirty so the
/// presentation layer only writes back sessions that changed.
#[derive(Debug, Clone)]
pub struct SessionContext {
    id: String,
    record: SessionRecord,
    is_new: bool,
    dirty: bool,
}

impl SessionContext {
    pub fn fresh() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            record: SessionRecord::default(),
            is_new: true,
            dirty: false,
        }
    }

    pub fn restore(id: impl Into<String>, record: SessionRecord) -> Self {
        Self {
            id: id.into(),
            record,
            is_new: false,
            dirty: false,
        }
    }

    /// Loads the session named by the cookie, or starts a new one when the
    /// cookie is absent or the store no longer knows the id.
    pub async fn open(store: &dyn SessionStore, id: Option<&str>) -> CoreResult<Self> {
        if let Some(id) = id {
            if let Some(record) = store.load(id).await? {
                return Ok(Self::restore(id, record));
            }
        }
        Ok(Self::fresh())
    }

    /// Persists the session if anything changed. Returns whether a write happened.
    pub async fn commit(&mut self, store: &dyn SessionStore) -> CoreResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        store.save(&self.id, &self.record).await?;
        self.dirty = false;
        self.is_new = false;
        Ok(true)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn order_id(&self) -> Option<i64> {
        self.record.order_id
    }

    pub fn set_order_id(&mut self, order_id: i64) {
        self.record.order_id = Some(order_id);
        self.dirty = true;
    }

    pub fn clear_order_id(&mut self) {
        if self.record.order_id.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn flash(&mut self, category: FlashCategory, message: impl Into<String>) {
        self.record.flashes.push(Flash { category, message: message.into() });
        self.dirty = true;
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if self.record.flashes.is_empty() {
            return Vec::new();
        }
        self.dirty = true;
        std::mem::take(&mut self.record.flashes)
    }
}

/// Server-side storage for session records, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> CoreResult<Option<SessionRecord>>;
    async fn save(&self, session_id: &str, record: &SessionRecord) -> CoreResult<()>;
}

/// In-process session store for tests and single-node demos.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> CoreResult<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, record: &SessionRecord) -> CoreResult<()> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_unknown_id_starts_fresh() {
        let store = MemorySessionStore::new();
        let session = SessionContext::open(&store, Some("does-not-exist")).await.unwrap();

        assert!(session.is_new());
        assert_ne!(session.id(), "does-not-exist");
        assert_eq!(session.order_id(), None);
    }

    #[tokio::test]
    async fn test_commit_only_when_dirty() {
        let store = MemorySessionStore::new();
        let mut session = SessionContext::fresh();

        assert!(!session.commit(&store).await.unwrap());
        assert_eq!(store.len().await, 0);

        session.set_order_id(7);
        assert!(session.commit(&store).await.unwrap());

        let reopened = SessionContext::open(&store, Some(session.id())).await.unwrap();
        assert!(!reopened.is_new());
        assert_eq!(reopened.order_id(), Some(7));
    }

    #[tokio::test]
    async fn test_flashes_are_drained_once() {
        let store = MemorySessionStore::new();
        let mut session = SessionContext::fresh();
        session.flash(FlashCategory::Info, "Basket emptied!");
        session.commit(&store).await.unwrap();

        let mut next = SessionContext::open(&store, Some(session.id())).await.unwrap();
        let flashes = next.take_flashes();
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes[0].message, "Basket emptied!");
        next.commit(&store).await.unwrap();

        let mut after = SessionContext::open(&store, Some(session.id())).await.unwrap();
        assert!(after.take_flashes().is_empty());
    }

    #[test]
    fn test_clear_without_order_is_clean() {
        let mut session = SessionContext::restore("abc", SessionRecord::default());
        session.clear_order_id();
        assert!(!session.is_dirty());
    }
}
