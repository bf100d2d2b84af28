//! Session resolution middleware.

use std::sync::Arc;

use tracing::trace;

use super::event::{session_key_of, HasConversation, HasUser, RequestBag, SESSION_CONTEXT_KEY};
use crate::session::{SessionContext, SessionStore};

/// Resolves session identity from an inbound event and injects a
/// [`SessionContext`] into the request bag.
///
/// Events that do not carry both a user and a conversation pass through
/// unmodified; downstream dispatch must treat the missing context as "no
/// session". The middleware performs no business logic and never reads or
/// writes state itself.
pub struct SessionMiddleware {
    store: Arc<SessionStore>,
}

impl SessionMiddleware {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Bind a context for the event's session, if it has one.
    ///
    /// Returns whether a context was injected under
    /// [`SESSION_CONTEXT_KEY`].
    pub fn inject<E>(&self, event: &E, bag: &mut RequestBag) -> bool
    where
        E: HasUser + HasConversation,
    {
        match session_key_of(event) {
            Some(key) => {
                trace!(session = %key, "session context bound");
                bag.insert(
                    SESSION_CONTEXT_KEY,
                    SessionContext::new(Arc::clone(&self.store), key),
                );
                true
            }
            None => {
                trace!("event carries no session identity, passing through");
                false
            }
        }
    }
}
