//! Inbound event capabilities and the request-scoped bag.
//!
//! Event adapters declare what identity they carry by implementing the
//! capability traits below, instead of downstream code probing for fields
//! that may or may not exist. Anything a dispatch stage wants to hand to
//! later stages travels in the [`RequestBag`] under a well-known key.

use std::any::Any;
use std::collections::HashMap;

use crate::session::SessionKey;

/// Implemented by events that may carry a sending user.
pub trait HasUser {
    fn user_id(&self) -> Option<i64>;
}

/// Implemented by events that may carry an owning conversation.
pub trait HasConversation {
    fn conversation_id(&self) -> Option<i64>;
}

/// Extract the full session identity from an event.
///
/// Returns `None` unless both halves are present; there are no partial
/// session keys.
pub fn session_key_of<E>(event: &E) -> Option<SessionKey>
where
    E: HasUser + HasConversation + ?Sized,
{
    Some(SessionKey::new(event.user_id()?, event.conversation_id()?))
}

/// Bag key under which the middleware stores the [`SessionContext`].
///
/// [`SessionContext`]: crate::session::SessionContext
pub const SESSION_CONTEXT_KEY: &str = "session_context";

/// Per-event scratch space handed through the dispatch pipeline.
///
/// Values are stored by `&'static str` key and recovered by downcasting,
/// so stages stay decoupled from each other's concrete types.
#[derive(Default)]
pub struct RequestBag {
    entries: HashMap<&'static str, Box<dyn Any + Send>>,
}

impl RequestBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any + Send>(&mut self, key: &'static str, value: T) {
        self.entries.insert(key, Box::new(value));
    }

    pub fn get<T: Any + Send>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref()
    }

    pub fn get_mut<T: Any + Send>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)?.downcast_mut()
    }

    /// Take a value out of the bag. The entry is left in place when it is
    /// present but of a different type.
    pub fn remove<T: Any + Send>(&mut self, key: &str) -> Option<T> {
        if !self.entries.get(key)?.is::<T>() {
            return None;
        }
        self.entries
            .remove(key)
            .and_then(|boxed| boxed.downcast().ok())
            .map(|boxed| *boxed)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Message {
        from: Option<i64>,
        chat: Option<i64>,
    }

    impl HasUser for Message {
        fn user_id(&self) -> Option<i64> {
            self.from
        }
    }

    impl HasConversation for Message {
        fn conversation_id(&self) -> Option<i64> {
            self.chat
        }
    }

    #[test]
    fn test_session_key_needs_both_halves() {
        let full = Message {
            from: Some(111),
            chat: Some(1000),
        };
        assert_eq!(session_key_of(&full), Some(SessionKey::new(111, 1000)));

        let no_user = Message {
            from: None,
            chat: Some(1000),
        };
        assert_eq!(session_key_of(&no_user), None);

        let no_chat = Message {
            from: Some(111),
            chat: None,
        };
        assert_eq!(session_key_of(&no_chat), None);
    }

    #[test]
    fn test_bag_insert_get() {
        let mut bag = RequestBag::new();
        bag.insert("count", 7usize);

        assert!(bag.contains("count"));
        assert_eq!(bag.get::<usize>("count"), Some(&7));
        assert_eq!(bag.get::<String>("count"), None);
        assert_eq!(bag.get::<usize>("missing"), None);
    }

    #[test]
    fn test_bag_get_mut() {
        let mut bag = RequestBag::new();
        bag.insert("count", 1usize);

        *bag.get_mut::<usize>("count").unwrap() += 1;
        assert_eq!(bag.get::<usize>("count"), Some(&2));
    }

    #[test]
    fn test_bag_remove() {
        let mut bag = RequestBag::new();
        bag.insert("name", String::from("wizard"));

        // Wrong type leaves the entry in place
        assert_eq!(bag.remove::<usize>("name"), None);
        assert!(bag.contains("name"));

        assert_eq!(bag.remove::<String>("name"), Some("wizard".to_string()));
        assert!(!bag.contains("name"));
    }

    #[test]
    fn test_bag_insert_replaces() {
        let mut bag = RequestBag::new();
        bag.insert("count", 1usize);
        bag.insert("count", 2usize);
        assert_eq!(bag.get::<usize>("count"), Some(&2));
    }
}
