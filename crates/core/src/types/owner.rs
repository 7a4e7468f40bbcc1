//! Owner keys: the identity a cart or order belongs to.
//!
//! Every cart line and order is owned by exactly one actor - either an
//! authenticated user or an anonymous guest session, never both. Modeling
//! this as a tagged variant (rather than a nullable foreign-key pair) makes
//! the duality impossible to get wrong: every query branches exhaustively.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::id::UserId;

/// An anonymous session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing session identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random session identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the session identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors parsing a stored owner key.
#[derive(Debug, Error)]
pub enum OwnerKeyError {
    /// The stored value has no recognized `user:` / `guest:` prefix.
    #[error("invalid owner key: {0}")]
    InvalidFormat(String),

    /// The user id portion is not a valid integer.
    #[error("invalid user id in owner key: {0}")]
    InvalidUserId(String),
}

/// The identity a cart or order belongs to.
///
/// Exactly one of an authenticated user or an anonymous guest session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnerKey {
    /// An authenticated user.
    User(UserId),
    /// An anonymous guest session.
    Guest(SessionId),
}

impl OwnerKey {
    /// Owner key for an authenticated user.
    #[must_use]
    pub const fn user(id: UserId) -> Self {
        Self::User(id)
    }

    /// Owner key for an anonymous guest session.
    #[must_use]
    pub const fn guest(session: SessionId) -> Self {
        Self::Guest(session)
    }

    /// Whether this key identifies an authenticated user.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Canonical storage encoding: `user:{id}` or `guest:{session}`.
    ///
    /// This is the single column value cart lines and orders are keyed by.
    #[must_use]
    pub fn as_db_key(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Guest(session) => format!("guest:{session}"),
        }
    }

    /// Parse the canonical storage encoding back into a variant.
    ///
    /// # Errors
    ///
    /// Returns `OwnerKeyError` if the value lacks a recognized prefix or
    /// carries a non-numeric user id.
    pub fn parse(raw: &str) -> Result<Self, OwnerKeyError> {
        if let Some(id) = raw.strip_prefix("user:") {
            let id: i64 = id
                .parse()
                .map_err(|_| OwnerKeyError::InvalidUserId(raw.to_owned()))?;
            Ok(Self::User(UserId::new(id)))
        } else if let Some(session) = raw.strip_prefix("guest:") {
            Ok(Self::Guest(SessionId::new(session)))
        } else {
            Err(OwnerKeyError::InvalidFormat(raw.to_owned()))
        }
    }
}

impl std::fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_key_roundtrip() {
        let user = OwnerKey::user(UserId::new(42));
        assert_eq!(user.as_db_key(), "user:42");
        assert_eq!(OwnerKey::parse("user:42").unwrap(), user);

        let guest = OwnerKey::guest(SessionId::new("abc-123"));
        assert_eq!(guest.as_db_key(), "guest:abc-123");
        assert_eq!(OwnerKey::parse("guest:abc-123").unwrap(), guest);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(OwnerKey::parse("customer:7").is_err());
        assert!(OwnerKey::parse("user:not-a-number").is_err());
        assert!(OwnerKey::parse("").is_err());
    }

    #[test]
    fn test_generated_sessions_are_distinct() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }
}
