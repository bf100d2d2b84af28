//! Durable session storage with transparent in-process fallback.
//!
//! The store is the only component that knows the backend technology.
//! Flow state and session records live in a TTL-based networked key-value
//! backend (Redis); when that backend is unreachable the store serves the
//! same operations from an in-process map with emulated expiry. Callers
//! never see backend errors and cannot tell which side served a call,
//! short of asking [`SessionStore::health_check`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::Utc;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::key::SessionKey;
use super::record::{RecordPatch, SessionRecord, StoredData, StoredState};
use crate::flow::{is_valid_transition, FlowState};

/// Store construction parameters.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend connection string.
    pub url: String,
    /// Namespace prefix for every key.
    pub key_prefix: String,
    /// Record time-to-live; refreshed on every successful write and touch.
    pub ttl: Duration,
    /// Bound on the one-time lazy connection attempt.
    pub connect_timeout: Duration,
    /// Bound on each backend call.
    pub op_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "chatflow:".to_string(),
            ttl: Duration::from_secs(3600),
            connect_timeout: Duration::from_secs(2),
            op_timeout: Duration::from_secs(2),
        }
    }
}

/// Snapshot returned by [`SessionStore::health_check`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthStatus {
    pub backend_reachable: bool,
    pub using_fallback: bool,
    pub fallback_session_count: usize,
    pub ttl_seconds: u64,
}

/// Aggregate session counts, grouped by state.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StoreStats {
    pub active_sessions: usize,
    pub by_state: HashMap<String, usize>,
}

/// Internal failure taxonomy for backend calls. Never escapes the store:
/// every public operation catches these, logs, and degrades.
#[derive(Debug, Error)]
enum StoreError {
    #[error("backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("backend call timed out")]
    Timeout,

    #[error("fallback lock poisoned")]
    LockPoisoned,
}

/// Lifecycle of the durable connection.
///
/// The connection is established lazily on first use. A failed attempt is
/// terminal for this store instance: every later operation is served by
/// the fallback, and a fresh attempt requires constructing a new store.
enum ConnState {
    Untried,
    Connected(redis::aio::MultiplexedConnection),
    Failed,
}

struct FallbackEntry {
    payload: String,
    written_at: Instant,
}

/// Unified durable + fallback store for flow state and session records.
pub struct SessionStore {
    config: StoreConfig,
    conn: Mutex<ConnState>,
    fallback: RwLock<HashMap<String, FallbackEntry>>,
}

impl SessionStore {
    /// Create a store. No I/O happens here; the durable connection is
    /// attempted on first use.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(ConnState::Untried),
            fallback: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store that never contacts the durable backend and serves
    /// everything from the in-process map.
    pub fn fallback_only(config: StoreConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(ConnState::Failed),
            fallback: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Public operations
    // =========================================================================

    /// Read the current flow state, or `None` when the session is idle.
    pub async fn get_state(&self, key: &SessionKey) -> Option<FlowState> {
        let k = key.state_key(&self.config.key_prefix);
        let raw = self.read_raw(&k).await?;
        match serde_json::from_str::<StoredState>(&raw) {
            Ok(stored) => FlowState::parse(&stored.state),
            Err(e) => {
                warn!(key = %k, error = %e, "corrupt state record treated as absent");
                None
            }
        }
    }

    /// Transition the session to `state`, refreshing the TTL.
    ///
    /// Returns `false` without writing when the transition from the current
    /// state is not in the table. The caller must check the return value
    /// before treating the transition as applied.
    pub async fn set_state(&self, key: &SessionKey, state: FlowState) -> bool {
        let current = self.get_state(key).await;
        if !is_valid_transition(current, Some(state)) {
            debug!(
                session = %key,
                from = %current.map(|s| s.to_string()).unwrap_or_else(|| "Idle".into()),
                to = %state,
                "transition rejected"
            );
            return false;
        }

        let stored = StoredState {
            state: state.to_string(),
            updated_at: Utc::now(),
        };
        let payload = match serde_json::to_string(&stored) {
            Ok(p) => p,
            Err(e) => {
                warn!(session = %key, error = %e, "failed to encode state record");
                return false;
            }
        };

        self.write_raw(&key.state_key(&self.config.key_prefix), payload)
            .await;
        debug!(session = %key, state = %state, "state set");
        true
    }

    /// Read the session record, or `None` when no record exists.
    pub async fn get_data(&self, key: &SessionKey) -> Option<SessionRecord> {
        let k = key.data_key(&self.config.key_prefix);
        let raw = self.read_raw(&k).await?;
        match serde_json::from_str::<StoredData>(&raw) {
            Ok(stored) => Some(stored.record),
            Err(e) => {
                warn!(key = %k, error = %e, "corrupt data record treated as absent");
                None
            }
        }
    }

    /// Replace the session record wholesale, refreshing the TTL.
    pub async fn set_data(&self, key: &SessionKey, record: SessionRecord) {
        let stored = StoredData {
            record,
            updated_at: Utc::now(),
        };
        match serde_json::to_string(&stored) {
            Ok(payload) => {
                self.write_raw(&key.data_key(&self.config.key_prefix), payload)
                    .await;
            }
            Err(e) => warn!(session = %key, error = %e, "failed to encode data record"),
        }
    }

    /// Merge `patch` into the current record and write the result back.
    ///
    /// A missing record starts from all-absent fields. This is a
    /// read-modify-write and is NOT atomic: two concurrent `update_data`
    /// calls on the same key can lose fields to last-write-wins. Callers
    /// that care must serialize their own updates per key.
    pub async fn update_data(&self, key: &SessionKey, patch: RecordPatch) -> SessionRecord {
        let mut record = self.get_data(key).await.unwrap_or_default();
        patch.apply_to(&mut record);
        self.set_data(key, record.clone()).await;
        record
    }

    /// Delete both the state and record entries for the session.
    pub async fn clear(&self, key: &SessionKey) {
        let state_key = key.state_key(&self.config.key_prefix);
        let data_key = key.data_key(&self.config.key_prefix);

        if let Some(mut conn) = self.connection().await {
            let result = self
                .bounded(async {
                    let _: () = conn.del(state_key.as_str()).await?;
                    let _: () = conn.del(data_key.as_str()).await?;
                    Ok(())
                })
                .await;
            if let Err(e) = result {
                warn!(session = %key, error = %e, "backend delete failed");
            }
        }

        // The fallback copy goes regardless of which side served the writes.
        if let Err(e) = self
            .fallback_remove(&state_key)
            .and(self.fallback_remove(&data_key))
        {
            warn!(session = %key, error = %e, "fallback delete failed");
        }
        debug!(session = %key, "session cleared");
    }

    /// Refresh the TTL on both entries without changing their values.
    pub async fn touch(&self, key: &SessionKey) {
        let state_key = key.state_key(&self.config.key_prefix);
        let data_key = key.data_key(&self.config.key_prefix);
        let secs = self.config.ttl.as_secs() as i64;

        if let Some(mut conn) = self.connection().await {
            let result = self
                .bounded(async {
                    let _: bool = conn.expire(&state_key, secs).await?;
                    let _: bool = conn.expire(&data_key, secs).await?;
                    Ok(())
                })
                .await;
            if let Err(e) = result {
                warn!(session = %key, error = %e, "backend touch failed");
            }
        }

        if let Err(e) = self
            .fallback_touch(&state_key)
            .and(self.fallback_touch(&data_key))
        {
            warn!(session = %key, error = %e, "fallback touch failed");
        }
    }

    /// Scan the key space for sessions with a stored state entry.
    ///
    /// Keys that fail to parse back into a session key are skipped.
    pub async fn list_active_sessions(&self) -> Vec<SessionKey> {
        let pattern = format!("{}state:*", self.config.key_prefix);

        if let Some(mut conn) = self.connection().await {
            let scanned = self
                .bounded(async {
                    let mut keys = Vec::new();
                    let mut cursor: u64 = 0;
                    loop {
                        let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                            .arg(cursor)
                            .arg("MATCH")
                            .arg(&pattern)
                            .arg("COUNT")
                            .arg(100)
                            .query_async(&mut conn)
                            .await?;
                        keys.extend(batch);
                        if next == 0 {
                            break;
                        }
                        cursor = next;
                    }
                    Ok(keys)
                })
                .await;

            match scanned {
                Ok(keys) => {
                    return keys
                        .iter()
                        .filter_map(|k| SessionKey::parse_state_key(k, &self.config.key_prefix))
                        .collect();
                }
                Err(e) => warn!(error = %e, "backend scan failed, serving from fallback"),
            }
        }

        match self.fallback.read() {
            Ok(map) => map
                .iter()
                .filter(|(_, entry)| entry.written_at.elapsed() <= self.config.ttl)
                .filter_map(|(k, _)| SessionKey::parse_state_key(k, &self.config.key_prefix))
                .collect(),
            Err(_) => {
                warn!("fallback lock poisoned during scan");
                Vec::new()
            }
        }
    }

    /// Evict expired fallback entries.
    ///
    /// The durable backend expires keys natively; only the in-process map
    /// needs reclaiming. Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        match self.fallback.write() {
            Ok(mut map) => {
                let before = map.len();
                map.retain(|_, entry| entry.written_at.elapsed() <= self.config.ttl);
                before - map.len()
            }
            Err(_) => {
                warn!("fallback lock poisoned during cleanup");
                0
            }
        }
    }

    /// Probe the durable backend and report which side is serving.
    pub async fn health_check(&self) -> HealthStatus {
        let backend_reachable = match self.connection().await {
            Some(mut conn) => {
                let pong = self
                    .bounded(async {
                        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
                        Ok(reply)
                    })
                    .await;
                match pong {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(error = %e, "backend ping failed");
                        false
                    }
                }
            }
            None => false,
        };

        HealthStatus {
            backend_reachable,
            using_fallback: !backend_reachable,
            fallback_session_count: self.fallback_session_count(),
            ttl_seconds: self.config.ttl.as_secs(),
        }
    }

    /// Count active sessions per state.
    pub async fn stats(&self) -> StoreStats {
        let sessions = self.list_active_sessions().await;
        let mut stats = StoreStats {
            active_sessions: sessions.len(),
            by_state: HashMap::new(),
        };
        for key in &sessions {
            if let Some(state) = self.get_state(key).await {
                *stats.by_state.entry(state.to_string()).or_default() += 1;
            }
        }
        stats
    }

    // =========================================================================
    // Durable backend plumbing
    // =========================================================================

    /// Get the shared durable connection, attempting the one-time lazy
    /// connect if it has not been tried yet. Returns `None` once the
    /// attempt has failed; the store never retries within its lifetime.
    async fn connection(&self) -> Option<redis::aio::MultiplexedConnection> {
        let mut guard = self.conn.lock().await;
        match &*guard {
            ConnState::Connected(conn) => Some(conn.clone()),
            ConnState::Failed => None,
            ConnState::Untried => {
                let attempt = async {
                    let client = redis::Client::open(self.config.url.as_str())?;
                    client.get_multiplexed_async_connection().await
                };
                match tokio::time::timeout(self.config.connect_timeout, attempt).await {
                    Ok(Ok(conn)) => {
                        debug!(url = %self.config.url, "connected to durable backend");
                        *guard = ConnState::Connected(conn.clone());
                        Some(conn)
                    }
                    Ok(Err(e)) => {
                        warn!(
                            url = %self.config.url,
                            error = %e,
                            "backend connect failed, serving from in-process fallback"
                        );
                        *guard = ConnState::Failed;
                        None
                    }
                    Err(_) => {
                        warn!(
                            url = %self.config.url,
                            "backend connect timed out, serving from in-process fallback"
                        );
                        *guard = ConnState::Failed;
                        None
                    }
                }
            }
        }
    }

    /// Apply the per-call timeout to a backend future. A timeout is treated
    /// the same as a connection failure by callers.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.config.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Backend(e)),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    async fn read_raw(&self, k: &str) -> Option<String> {
        if let Some(mut conn) = self.connection().await {
            let result = self
                .bounded(async {
                    let value: Option<String> = conn.get(k).await?;
                    Ok(value)
                })
                .await;
            match result {
                Ok(value) => return value,
                Err(e) => warn!(key = %k, error = %e, "backend read failed, serving from fallback"),
            }
        }

        self.fallback_read(k).unwrap_or_else(|e| {
            warn!(key = %k, error = %e, "fallback read failed");
            None
        })
    }

    async fn write_raw(&self, k: &str, payload: String) {
        if let Some(mut conn) = self.connection().await {
            let result = self
                .bounded(async {
                    let _: () = conn
                        .set_ex(k, payload.as_str(), self.config.ttl.as_secs())
                        .await?;
                    Ok(())
                })
                .await;
            match result {
                Ok(()) => return,
                Err(e) => warn!(key = %k, error = %e, "backend write failed, writing to fallback"),
            }
        }

        if let Err(e) = self.fallback_write(k, payload) {
            warn!(key = %k, error = %e, "fallback write failed");
        }
    }

    // =========================================================================
    // Fallback map
    // =========================================================================

    /// Read an entry, lazily evicting it when its TTL has elapsed.
    fn fallback_read(&self, k: &str) -> Result<Option<String>, StoreError> {
        let expired = {
            let map = self.fallback.read().map_err(|_| StoreError::LockPoisoned)?;
            match map.get(k) {
                None => return Ok(None),
                Some(entry) if entry.written_at.elapsed() <= self.config.ttl => {
                    return Ok(Some(entry.payload.clone()));
                }
                Some(_) => true,
            }
        };

        if expired {
            let mut map = self
                .fallback
                .write()
                .map_err(|_| StoreError::LockPoisoned)?;
            map.remove(k);
        }
        Ok(None)
    }

    fn fallback_write(&self, k: &str, payload: String) -> Result<(), StoreError> {
        let mut map = self
            .fallback
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        map.insert(
            k.to_string(),
            FallbackEntry {
                payload,
                written_at: Instant::now(),
            },
        );
        Ok(())
    }

    fn fallback_remove(&self, k: &str) -> Result<(), StoreError> {
        let mut map = self
            .fallback
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        map.remove(k);
        Ok(())
    }

    fn fallback_touch(&self, k: &str) -> Result<(), StoreError> {
        let mut map = self
            .fallback
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        if let Some(entry) = map.get_mut(k) {
            entry.written_at = Instant::now();
        }
        Ok(())
    }

    fn fallback_session_count(&self) -> usize {
        let state_prefix = format!("{}state:", self.config.key_prefix);
        match self.fallback.read() {
            Ok(map) => map
                .iter()
                .filter(|(k, entry)| {
                    k.starts_with(&state_prefix) && entry.written_at.elapsed() <= self.config.ttl
                })
                .count(),
            Err(_) => 0,
        }
    }

    /// Rewind an entry's write stamp, as if it had been written `age` ago.
    #[cfg(test)]
    fn backdate(&self, k: &str, age: Duration) {
        let mut map = self.fallback.write().unwrap();
        if let Some(entry) = map.get_mut(k) {
            entry.written_at = Instant::now() - age;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{AlertStep, TradingStep};

    fn store() -> SessionStore {
        SessionStore::fallback_only(StoreConfig::default())
    }

    const WAITING_TOKEN: FlowState = FlowState::Trading(TradingStep::WaitingForToken);
    const WAITING_AMOUNT: FlowState = FlowState::Trading(TradingStep::WaitingForAmount);
    const EXECUTING: FlowState = FlowState::Trading(TradingStep::ExecutingTrade);

    #[tokio::test]
    async fn test_set_get_state() {
        let store = store();
        let key = SessionKey::new(111, 1000);

        assert!(store.set_state(&key, WAITING_TOKEN).await);
        assert_eq!(store.get_state(&key).await, Some(WAITING_TOKEN));
    }

    #[tokio::test]
    async fn test_idle_session_has_no_state() {
        let store = store();
        let key = SessionKey::new(1, 2);
        assert_eq!(store.get_state(&key).await, None);
        assert_eq!(store.get_data(&key).await, None);
    }

    #[tokio::test]
    async fn test_invalid_transition_rejected_and_state_kept() {
        let store = store();
        let key = SessionKey::new(111, 1000);

        assert!(store.set_state(&key, WAITING_TOKEN).await);
        // Skipping straight to execution is not in the table
        assert!(!store.set_state(&key, EXECUTING).await);
        assert_eq!(store.get_state(&key).await, Some(WAITING_TOKEN));
    }

    #[tokio::test]
    async fn test_self_transition_allowed() {
        let store = store();
        let key = SessionKey::new(111, 1000);

        assert!(store.set_state(&key, WAITING_TOKEN).await);
        assert!(store.set_state(&key, WAITING_TOKEN).await);
    }

    #[tokio::test]
    async fn test_update_data_creates_record() {
        let store = store();
        let key = SessionKey::new(111, 1000);

        let record = store.update_data(&key, RecordPatch::new().amount(1.5)).await;

        assert_eq!(record.amount, Some(1.5));
        assert_eq!(record.wallet_address, None);
        assert_eq!(record.token_address, None);

        let read_back = store.get_data(&key).await.unwrap();
        assert_eq!(read_back, record);
    }

    #[tokio::test]
    async fn test_update_data_merges() {
        let store = store();
        let key = SessionKey::new(111, 1000);

        store
            .update_data(&key, RecordPatch::new().token_address("mint"))
            .await;
        let record = store.update_data(&key, RecordPatch::new().amount(2.0)).await;

        assert_eq!(record.token_address, Some("mint".into()));
        assert_eq!(record.amount, Some(2.0));
    }

    #[tokio::test]
    async fn test_clear_removes_state_and_data() {
        let store = store();
        let key = SessionKey::new(111, 1000);

        store.set_state(&key, WAITING_TOKEN).await;
        store.set_data(&key, SessionRecord::default()).await;
        store.clear(&key).await;

        assert_eq!(store.get_state(&key).await, None);
        assert_eq!(store.get_data(&key).await, None);
    }

    #[tokio::test]
    async fn test_session_isolation() {
        let store = store();
        let k1 = SessionKey::new(111, 1000);
        let k2 = SessionKey::new(222, 2000);

        store.set_state(&k1, WAITING_TOKEN).await;
        store.update_data(&k1, RecordPatch::new().amount(1.0)).await;
        store
            .set_state(&k2, FlowState::Alert(AlertStep::WaitingForToken))
            .await;
        store.update_data(&k2, RecordPatch::new().amount(9.0)).await;

        assert_eq!(store.get_state(&k1).await, Some(WAITING_TOKEN));
        assert_eq!(store.get_data(&k1).await.unwrap().amount, Some(1.0));
        assert_eq!(
            store.get_state(&k2).await,
            Some(FlowState::Alert(AlertStep::WaitingForToken))
        );
        assert_eq!(store.get_data(&k2).await.unwrap().amount, Some(9.0));

        store.clear(&k1).await;
        assert!(store.get_state(&k2).await.is_some());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let config = StoreConfig {
            ttl: Duration::from_secs(60),
            ..Default::default()
        };
        let store = SessionStore::fallback_only(config);
        let key = SessionKey::new(111, 1000);

        store.set_state(&key, WAITING_TOKEN).await;
        store.set_data(&key, SessionRecord::default()).await;

        store.backdate(&key.state_key("chatflow:"), Duration::from_secs(61));
        store.backdate(&key.data_key("chatflow:"), Duration::from_secs(61));

        assert_eq!(store.get_state(&key).await, None);
        assert_eq!(store.get_data(&key).await, None);
    }

    #[tokio::test]
    async fn test_write_refreshes_ttl() {
        let config = StoreConfig {
            ttl: Duration::from_secs(60),
            ..Default::default()
        };
        let store = SessionStore::fallback_only(config);
        let key = SessionKey::new(111, 1000);

        store.set_state(&key, WAITING_TOKEN).await;
        store.backdate(&key.state_key("chatflow:"), Duration::from_secs(50));

        // A fresh write resets the clock
        assert!(store.set_state(&key, WAITING_AMOUNT).await);
        store.backdate(&key.state_key("chatflow:"), Duration::from_secs(50));
        assert_eq!(store.get_state(&key).await, Some(WAITING_AMOUNT));
    }

    #[tokio::test]
    async fn test_touch_refreshes_ttl() {
        let config = StoreConfig {
            ttl: Duration::from_secs(60),
            ..Default::default()
        };
        let store = SessionStore::fallback_only(config);
        let key = SessionKey::new(111, 1000);

        store.set_state(&key, WAITING_TOKEN).await;
        store.backdate(&key.state_key("chatflow:"), Duration::from_secs(50));
        store.touch(&key).await;
        store.backdate(&key.state_key("chatflow:"), Duration::from_secs(50));

        assert_eq!(store.get_state(&key).await, Some(WAITING_TOKEN));
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let config = StoreConfig {
            ttl: Duration::from_secs(60),
            ..Default::default()
        };
        let store = SessionStore::fallback_only(config);
        let k1 = SessionKey::new(1, 1);
        let k2 = SessionKey::new(2, 2);

        store.set_state(&k1, WAITING_TOKEN).await;
        store.set_state(&k2, WAITING_TOKEN).await;
        store.backdate(&k1.state_key("chatflow:"), Duration::from_secs(61));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.get_state(&k1).await, None);
        assert_eq!(store.get_state(&k2).await, Some(WAITING_TOKEN));
    }

    #[tokio::test]
    async fn test_list_active_sessions() {
        let store = store();
        let k1 = SessionKey::new(111, 1000);
        let k2 = SessionKey::new(222, 2000);

        store.set_state(&k1, WAITING_TOKEN).await;
        store
            .set_state(&k2, FlowState::Alert(AlertStep::WaitingForToken))
            .await;
        // Data-only sessions are not active
        store
            .update_data(&SessionKey::new(333, 3000), RecordPatch::new().amount(1.0))
            .await;

        let mut sessions = store.list_active_sessions().await;
        sessions.sort_by_key(|k| k.user_id);
        assert_eq!(sessions, vec![k1, k2]);
    }

    #[tokio::test]
    async fn test_corrupt_payload_treated_as_absent() {
        let store = store();
        let key = SessionKey::new(111, 1000);

        store
            .fallback_write(&key.state_key("chatflow:"), "not json".into())
            .unwrap();
        assert_eq!(store.get_state(&key).await, None);

        // Well-formed JSON naming an unknown state also degrades to Idle
        store
            .fallback_write(
                &key.state_key("chatflow:"),
                r#"{"state":"Lending:unknown","updated_at":"2026-01-01T00:00:00Z"}"#.into(),
            )
            .unwrap();
        assert_eq!(store.get_state(&key).await, None);
    }

    #[tokio::test]
    async fn test_health_check_fallback_only() {
        let store = store();
        store.set_state(&SessionKey::new(1, 1), WAITING_TOKEN).await;

        let health = store.health_check().await;
        assert!(!health.backend_reachable);
        assert!(health.using_fallback);
        assert_eq!(health.fallback_session_count, 1);
        assert_eq!(health.ttl_seconds, 3600);
    }

    #[tokio::test]
    async fn test_stats_by_state() {
        let store = store();
        store.set_state(&SessionKey::new(1, 1), WAITING_TOKEN).await;
        store.set_state(&SessionKey::new(2, 2), WAITING_TOKEN).await;
        store
            .set_state(
                &SessionKey::new(3, 3),
                FlowState::Alert(AlertStep::WaitingForToken),
            )
            .await;

        let stats = store.stats().await;
        assert_eq!(stats.active_sessions, 3);
        assert_eq!(stats.by_state["Trading:waiting_for_token"], 2);
        assert_eq!(stats.by_state["Alert:waiting_for_token"], 1);
    }
}
