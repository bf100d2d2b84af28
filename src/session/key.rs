//! Session key type and key-space encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one party's place in a flow: the (user, conversation) pair.
///
/// Both fields are mandatory; there are no partial keys. Sessions under
/// different keys are fully independent and never interleave state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub user_id: i64,
    pub conversation_id: i64,
}

impl SessionKey {
    pub fn new(user_id: i64, conversation_id: i64) -> Self {
        Self {
            user_id,
            conversation_id,
        }
    }

    /// Key under which the flow state entry is stored:
    /// `"<prefix>state:<user_id>:<conversation_id>"`.
    pub fn state_key(&self, prefix: &str) -> String {
        format!("{}state:{}:{}", prefix, self.user_id, self.conversation_id)
    }

    /// Key under which the session record entry is stored:
    /// `"<prefix>data:<user_id>:<conversation_id>"`.
    pub fn data_key(&self, prefix: &str) -> String {
        format!("{}data:{}:{}", prefix, self.user_id, self.conversation_id)
    }

    /// Recover a session key from an encoded state key.
    ///
    /// Returns `None` when the string does not match the encoding; key-space
    /// scans use this to skip foreign or malformed keys.
    pub fn parse_state_key(key: &str, prefix: &str) -> Option<SessionKey> {
        let rest = key.strip_prefix(prefix)?.strip_prefix("state:")?;
        let (user, conversation) = rest.split_once(':')?;
        Some(SessionKey {
            user_id: user.parse().ok()?,
            conversation_id: conversation.parse().ok()?,
        })
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user_id, self.conversation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key_encoding() {
        let key = SessionKey::new(111, 1000);
        assert_eq!(key.state_key("chatflow:"), "chatflow:state:111:1000");
        assert_eq!(key.data_key("chatflow:"), "chatflow:data:111:1000");
    }

    #[test]
    fn test_custom_prefix() {
        let key = SessionKey::new(42, -7);
        assert_eq!(key.state_key("bot:"), "bot:state:42:-7");
    }

    #[test]
    fn test_parse_state_key_roundtrip() {
        let key = SessionKey::new(222, 2000);
        let encoded = key.state_key("chatflow:");
        assert_eq!(SessionKey::parse_state_key(&encoded, "chatflow:"), Some(key));
    }

    #[test]
    fn test_parse_rejects_foreign_keys() {
        // Data key is not a state key
        assert_eq!(
            SessionKey::parse_state_key("chatflow:data:1:2", "chatflow:"),
            None
        );
        // Wrong prefix
        assert_eq!(
            SessionKey::parse_state_key("other:state:1:2", "chatflow:"),
            None
        );
        // Non-numeric components
        assert_eq!(
            SessionKey::parse_state_key("chatflow:state:abc:2", "chatflow:"),
            None
        );
        // Missing conversation id
        assert_eq!(
            SessionKey::parse_state_key("chatflow:state:1", "chatflow:"),
            None
        );
    }

    #[test]
    fn test_display() {
        let key = SessionKey::new(111, 1000);
        assert_eq!(key.to_string(), "111:1000");
    }
}
