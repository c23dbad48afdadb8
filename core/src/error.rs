// ABOUTME: Typed error handling for the auth handoff flow
// ABOUTME: Splits diagnostic detail from the user-safe message shown on the page

use thiserror::Error;

/// Reasons a launch query fails validation.
///
/// An invalid launch is not a fault: the page simply has nothing to do and
/// stays idle. Kept separate from [`BridgeError`] so a bad launch can never
/// be routed into the error state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidLaunch {
    #[error("missing source parameter")]
    MissingSource,

    #[error("unrecognized source {0:?}")]
    WrongSource(String),

    #[error("missing or empty nonce parameter")]
    MissingNonce,
}

/// Failure reported by the external provider script. Opaque to this system;
/// the identity adapter maps it into the flow taxonomy.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors that can occur while driving the handoff flow.
///
/// Every variant is caught at the state machine boundary and converted into
/// the terminal error state; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The identity provider's script could not be loaded or operated.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The integration contract was broken (e.g. an empty nonce reached
    /// initialize). A programming bug, not a user error.
    #[error("caller contract violation: {0}")]
    CallerContractViolation(String),

    /// The user cancelled, or the provider delivered no credential.
    #[error("authentication aborted: {0}")]
    AuthenticationAborted(String),

    /// The session exchange endpoint rejected the request, or returned a
    /// success body missing the session token.
    #[error("session exchange failed (status {status}): {detail}")]
    ExchangeFailed { status: u16, detail: String },

    /// The hydration endpoint rejected the request, or returned a success
    /// body missing the derived identity fields.
    #[error("hydration failed (status {status}): {detail}")]
    HydrationFailed { status: u16, detail: String },

    /// Transport-level failure, distinct from a non-2xx response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl BridgeError {
    /// Create a provider unavailable error
    pub fn provider_unavailable(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create a caller contract violation error
    pub fn contract_violation(msg: impl Into<String>) -> Self {
        Self::CallerContractViolation(msg.into())
    }

    /// Create an authentication aborted error
    pub fn aborted(msg: impl Into<String>) -> Self {
        Self::AuthenticationAborted(msg.into())
    }

    /// Create a session exchange failure carrying the response status and body
    pub fn exchange_failed(status: u16, detail: impl Into<String>) -> Self {
        Self::ExchangeFailed {
            status,
            detail: detail.into(),
        }
    }

    /// Create a hydration failure carrying the response status and body
    pub fn hydration_failed(status: u16, detail: impl Into<String>) -> Self {
        Self::HydrationFailed {
            status,
            detail: detail.into(),
        }
    }

    /// Stable, user-safe message for display. The diagnostic detail stays in
    /// `Display` and the logs; it is never shown on the page.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable(_) => {
                "Could not reach the sign-in provider. Check your connection and reload the page."
            }
            Self::CallerContractViolation(_) => {
                "This page was opened incorrectly. Return to the app and start sign-in again."
            }
            Self::AuthenticationAborted(_) => {
                "Sign-in was cancelled or did not complete. Reload the page to try again."
            }
            Self::ExchangeFailed { .. } => {
                "Could not establish a session. Please try again in a moment."
            }
            Self::HydrationFailed { .. } => {
                "Could not finish setting up your account. Please try again in a moment."
            }
            Self::Network(_) => "Network error. Check your connection and try again.",
        }
    }
}

/// Result type for flow operations
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_failed_display_carries_status_and_body() {
        let err = BridgeError::exchange_failed(401, "{\"error\":\"bad token\"}");
        let rendered = err.to_string();
        assert!(rendered.contains("401"));
        assert!(rendered.contains("bad token"));
    }

    #[test]
    fn test_user_message_never_leaks_detail() {
        let err = BridgeError::hydration_failed(500, "secret backend detail");
        assert!(!err.user_message().contains("secret backend detail"));
    }

    #[test]
    fn test_invalid_launch_display() {
        assert_eq!(
            InvalidLaunch::WrongSource("vscode".to_string()).to_string(),
            "unrecognized source \"vscode\""
        );
    }
}
