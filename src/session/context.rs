//! Per-dispatch session façade.

use std::sync::Arc;

use super::key::SessionKey;
use super::record::{RecordPatch, SessionRecord};
use super::store::SessionStore;
use crate::flow::{is_valid_transition, FlowState};

/// A view of one session, bound to a single session key for the lifetime
/// of one dispatch.
///
/// The first `get_state`/`get_data` call populates a local cache; repeated
/// reads within the same dispatch are served from it instead of making
/// another backend round-trip. Writes go through to the store and update
/// the cache in the same step. A context must not outlive its dispatch:
/// the cache is only coherent for one inbound event.
pub struct SessionContext {
    store: Arc<SessionStore>,
    key: SessionKey,
    cached_state: Option<Option<FlowState>>,
    cached_data: Option<Option<SessionRecord>>,
}

impl SessionContext {
    pub fn new(store: Arc<SessionStore>, key: SessionKey) -> Self {
        Self {
            store,
            key,
            cached_state: None,
            cached_data: None,
        }
    }

    /// The session key this context is bound to.
    pub fn key(&self) -> SessionKey {
        self.key
    }

    /// Current flow state, `None` when idle. Cached after the first read.
    pub async fn get_state(&mut self) -> Option<FlowState> {
        if let Some(state) = self.cached_state {
            return state;
        }
        let state = self.store.get_state(&self.key).await;
        self.cached_state = Some(state);
        state
    }

    /// Transition to `state`, returning `false` if the transition is not
    /// legal from the current state. On success the cache tracks the new
    /// state.
    pub async fn set_state(&mut self, state: FlowState) -> bool {
        let current = self.get_state().await;
        if !is_valid_transition(current, Some(state)) {
            return false;
        }
        let applied = self.store.set_state(&self.key, state).await;
        if applied {
            self.cached_state = Some(Some(state));
        }
        applied
    }

    /// Current session record, `None` when absent. Cached after the first
    /// read.
    pub async fn get_data(&mut self) -> Option<SessionRecord> {
        if let Some(record) = &self.cached_data {
            return record.clone();
        }
        let record = self.store.get_data(&self.key).await;
        self.cached_data = Some(record.clone());
        record
    }

    /// Replace the session record wholesale.
    pub async fn set_data(&mut self, record: SessionRecord) {
        self.store.set_data(&self.key, record.clone()).await;
        self.cached_data = Some(Some(record));
    }

    /// Merge `patch` into the current record (via the cache when populated)
    /// and write the result back. Subject to the store's read-modify-write
    /// race across concurrent dispatches for the same key.
    pub async fn update_data(&mut self, patch: RecordPatch) -> SessionRecord {
        let mut record = self.get_data().await.unwrap_or_default();
        patch.apply_to(&mut record);
        self.store.set_data(&self.key, record.clone()).await;
        self.cached_data = Some(Some(record.clone()));
        record
    }

    /// Delete both the state and record entries and remember the absence.
    pub async fn clear(&mut self) {
        self.store.clear(&self.key).await;
        self.cached_state = Some(None);
        self.cached_data = Some(None);
    }

    /// Alias for [`clear`](Self::clear), used at terminal flow states.
    pub async fn finish(&mut self) {
        self.clear().await;
    }

    /// Refresh the session TTL. Does not affect the cache.
    pub async fn touch(&self) {
        self.store.touch(&self.key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::TradingStep;
    use crate::session::store::StoreConfig;

    const WAITING_TOKEN: FlowState = FlowState::Trading(TradingStep::WaitingForToken);
    const WAITING_AMOUNT: FlowState = FlowState::Trading(TradingStep::WaitingForAmount);
    const EXECUTING: FlowState = FlowState::Trading(TradingStep::ExecutingTrade);

    fn context() -> (Arc<SessionStore>, SessionContext) {
        let store = Arc::new(SessionStore::fallback_only(StoreConfig::default()));
        let ctx = SessionContext::new(Arc::clone(&store), SessionKey::new(111, 1000));
        (store, ctx)
    }

    #[tokio::test]
    async fn test_state_write_through() {
        let (store, mut ctx) = context();

        assert!(ctx.set_state(WAITING_TOKEN).await);
        assert_eq!(ctx.get_state().await, Some(WAITING_TOKEN));
        // Visible through the store as well
        assert_eq!(
            store.get_state(&SessionKey::new(111, 1000)).await,
            Some(WAITING_TOKEN)
        );
    }

    #[tokio::test]
    async fn test_read_is_cached_for_the_dispatch() {
        let (store, mut ctx) = context();
        let key = SessionKey::new(111, 1000);

        store.set_state(&key, WAITING_TOKEN).await;
        assert_eq!(ctx.get_state().await, Some(WAITING_TOKEN));

        // A write that bypasses this context is not observed mid-dispatch
        store.clear(&key).await;
        assert_eq!(ctx.get_state().await, Some(WAITING_TOKEN));

        // A fresh context sees the truth
        let mut fresh = SessionContext::new(store, key);
        assert_eq!(fresh.get_state().await, None);
    }

    #[tokio::test]
    async fn test_invalid_transition_leaves_cache_alone() {
        let (_store, mut ctx) = context();

        assert!(ctx.set_state(WAITING_TOKEN).await);
        assert!(!ctx.set_state(EXECUTING).await);
        assert_eq!(ctx.get_state().await, Some(WAITING_TOKEN));
    }

    #[tokio::test]
    async fn test_update_data_creates_and_caches() {
        let (store, mut ctx) = context();

        let record = ctx.update_data(RecordPatch::new().amount(1.5)).await;
        assert_eq!(record.amount, Some(1.5));

        // Cached copy is returned without another read
        store.clear(&SessionKey::new(111, 1000)).await;
        assert_eq!(ctx.get_data().await.unwrap().amount, Some(1.5));
    }

    #[tokio::test]
    async fn test_update_data_merges_through_cache() {
        let (_store, mut ctx) = context();

        ctx.update_data(RecordPatch::new().token_address("mint")).await;
        let record = ctx.update_data(RecordPatch::new().amount(2.0)).await;

        assert_eq!(record.token_address, Some("mint".into()));
        assert_eq!(record.amount, Some(2.0));
    }

    #[tokio::test]
    async fn test_finish_clears_both_entries() {
        let (store, mut ctx) = context();
        let key = SessionKey::new(111, 1000);

        ctx.set_state(WAITING_TOKEN).await;
        ctx.update_data(RecordPatch::new().amount(1.0)).await;
        ctx.finish().await;

        assert_eq!(ctx.get_state().await, None);
        assert_eq!(ctx.get_data().await, None);
        assert_eq!(store.get_state(&key).await, None);
        assert_eq!(store.get_data(&key).await, None);
    }

    #[tokio::test]
    async fn test_wizard_progression() {
        let (_store, mut ctx) = context();

        assert!(ctx.set_state(WAITING_TOKEN).await);
        ctx.update_data(RecordPatch::new().token_address("mint")).await;
        assert!(ctx.set_state(WAITING_AMOUNT).await);
        ctx.update_data(RecordPatch::new().amount(0.5)).await;

        let record = ctx.get_data().await.unwrap();
        assert_eq!(record.token_address, Some("mint".into()));
        assert_eq!(record.amount, Some(0.5));
    }
}
