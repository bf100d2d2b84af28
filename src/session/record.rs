//! Session record payload and its wire envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutable per-session payload accumulated across wizard steps.
///
/// Every field defaults to absent. The record is stored independently from
/// the flow state, under the same session key, and is conventionally
/// populated only while a flow is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRecord {
    /// Source wallet address.
    pub wallet_address: Option<String>,
    /// Token mint the flow operates on.
    pub token_address: Option<String>,
    /// Trade size.
    pub amount: Option<f64>,
    /// Max slippage in basis points.
    pub slippage_bps: Option<u32>,
    /// Stop-loss percentage.
    pub stop_loss_pct: Option<f64>,
    /// Take-profit percentage.
    pub take_profit_pct: Option<f64>,
    /// Trigger threshold for the alert flow.
    pub alert_threshold: Option<f64>,
    /// When the flow was started.
    pub started_at: Option<DateTime<Utc>>,
    /// Wizard prompt message ids, in send order, kept for later cleanup.
    pub prompt_message_ids: Vec<i64>,
}

/// Partial update for a [`SessionRecord`].
///
/// A patch carries only the fields to merge; `apply_to` overwrites exactly
/// the named fields and leaves the rest untouched. A patch cannot reset a
/// field back to absent.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub wallet_address: Option<String>,
    pub token_address: Option<String>,
    pub amount: Option<f64>,
    pub slippage_bps: Option<u32>,
    pub stop_loss_pct: Option<f64>,
    pub take_profit_pct: Option<f64>,
    pub alert_threshold: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub prompt_message_ids: Option<Vec<i64>>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wallet_address(mut self, value: impl Into<String>) -> Self {
        self.wallet_address = Some(value.into());
        self
    }

    pub fn token_address(mut self, value: impl Into<String>) -> Self {
        self.token_address = Some(value.into());
        self
    }

    pub fn amount(mut self, value: f64) -> Self {
        self.amount = Some(value);
        self
    }

    pub fn slippage_bps(mut self, value: u32) -> Self {
        self.slippage_bps = Some(value);
        self
    }

    pub fn stop_loss_pct(mut self, value: f64) -> Self {
        self.stop_loss_pct = Some(value);
        self
    }

    pub fn take_profit_pct(mut self, value: f64) -> Self {
        self.take_profit_pct = Some(value);
        self
    }

    pub fn alert_threshold(mut self, value: f64) -> Self {
        self.alert_threshold = Some(value);
        self
    }

    pub fn started_at(mut self, value: DateTime<Utc>) -> Self {
        self.started_at = Some(value);
        self
    }

    pub fn prompt_message_ids(mut self, value: Vec<i64>) -> Self {
        self.prompt_message_ids = Some(value);
        self
    }

    /// Merge the named fields into `record`.
    pub fn apply_to(&self, record: &mut SessionRecord) {
        if let Some(v) = &self.wallet_address {
            record.wallet_address = Some(v.clone());
        }
        if let Some(v) = &self.token_address {
            record.token_address = Some(v.clone());
        }
        if let Some(v) = self.amount {
            record.amount = Some(v);
        }
        if let Some(v) = self.slippage_bps {
            record.slippage_bps = Some(v);
        }
        if let Some(v) = self.stop_loss_pct {
            record.stop_loss_pct = Some(v);
        }
        if let Some(v) = self.take_profit_pct {
            record.take_profit_pct = Some(v);
        }
        if let Some(v) = self.alert_threshold {
            record.alert_threshold = Some(v);
        }
        if let Some(v) = self.started_at {
            record.started_at = Some(v);
        }
        if let Some(v) = &self.prompt_message_ids {
            record.prompt_message_ids = v.clone();
        }
    }
}

/// Wire envelope for a stored flow state entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredState {
    /// Canonical `"Group:member"` encoding, or `"None"`.
    pub state: String,
    pub updated_at: DateTime<Utc>,
}

/// Wire envelope for a stored session record entry.
///
/// The record fields are flattened so the stored JSON carries the full
/// field set (with `null` for unset fields) next to `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredData {
    #[serde(flatten)]
    pub record: SessionRecord,
    pub updated_at: DateTime<Utc>,
}
