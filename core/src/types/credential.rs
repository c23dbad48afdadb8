// ABOUTME: Opaque credential material moved through the handoff
// ABOUTME: Debug output redacts token bodies so secrets never reach the logs

use std::fmt;

/// Bearer token issued by the identity provider after user authentication.
///
/// Opaque: this system asserts (but never verifies) that it carries the
/// caller's nonce as a claim. Non-empty by construction.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityCredential {
    token: String,
}

impl IdentityCredential {
    /// Returns `None` for an empty token; an absent credential is an abort,
    /// never a value.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self { token })
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for IdentityCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityCredential(<{} bytes>)", self.token.len())
    }
}

/// Backend-issued token authorizing subsequent backend calls within this
/// flow. Scoped to the backend that issued it; held only in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.0.len())
    }
}

/// Backend-computed values, deterministic per user. Opaque strings here;
/// all-or-nothing (a response missing either field is a failure upstream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedIdentity {
    pub salt: String,
    pub address: String,
}

/// The terminal aggregate of a completed flow.
///
/// Exists only transiently between hydration completion and deeplink
/// emission; never persisted to durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    pub identity_token: IdentityCredential,
    pub session_token: SessionToken,
    pub salt: String,
    pub address: String,
}
