//! Session identity, payload, storage, and the per-dispatch façade.

mod context;
mod key;
mod record;
mod store;

pub use context::SessionContext;
pub use key::SessionKey;
pub use record::{RecordPatch, SessionRecord};
pub use store::{HealthStatus, SessionStore, StoreConfig, StoreStats};
