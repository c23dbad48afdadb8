// ABOUTME: Observable bridge state, the single source of UI truth
// ABOUTME: Phases advance strictly forward; error is the only side exit

use std::fmt;

use crate::types::credential::AuthenticationResult;

/// Phases of the handoff flow, in strict forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    /// No valid launch request has been ingested. The page waits here
    /// forever on a bad launch; there is no other entry point.
    Idle,
    /// Launch accepted; the provider script is loading and being armed.
    Initializing,
    /// The sign-in button is rendered and waiting for the user.
    Ready,
    /// The provider's own UI owns the flow; no timeout applies here.
    Authenticating,
    /// Trading the identity token for a backend session token.
    Exchanging,
    /// Trading both tokens for the user's derived identity.
    Hydrating,
    /// Deeplink navigation issued; waiting out the grace delay.
    Ejecting,
    /// Terminal. The fallback link stays available.
    Success,
    /// Terminal. Recovery is user-driven (reload), never automatic.
    Error,
}

impl BridgePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Whether the machine may move from `self` to `next`. Error is reachable
    /// from every non-terminal phase; everything else only steps forward.
    pub fn can_advance_to(&self, next: BridgePhase) -> bool {
        if next == Self::Error {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Self::Idle, Self::Initializing)
                | (Self::Initializing, Self::Ready)
                | (Self::Ready, Self::Authenticating)
                | (Self::Authenticating, Self::Exchanging)
                | (Self::Exchanging, Self::Hydrating)
                | (Self::Hydrating, Self::Ejecting)
                | (Self::Ejecting, Self::Success)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Authenticating => "authenticating",
            Self::Exchanging => "exchanging",
            Self::Hydrating => "hydrating",
            Self::Ejecting => "ejecting",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for BridgePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fault surfaced to the UI: stable user-safe text plus diagnostic detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeFault {
    /// Shown on the page.
    pub message: String,
    /// For logs and bug reports; never rendered.
    pub detail: String,
}

impl BridgeFault {
    pub fn new(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: detail.into(),
        }
    }
}

/// Snapshot of the flow published to the UI.
///
/// Owned exclusively by the state machine and mutated only through its
/// transitions. `data` is only ever `Some` with a complete result; no
/// partial aggregate is exposed on any failure path.
#[derive(Debug, Clone)]
pub struct BridgeState {
    pub phase: BridgePhase,
    pub message: String,
    pub error: Option<BridgeFault>,
    pub data: Option<AuthenticationResult>,
}

impl BridgeState {
    pub fn idle() -> Self {
        Self {
            phase: BridgePhase::Idle,
            message: "Waiting for a sign-in request from the desktop app.".to_string(),
            error: None,
            data: None,
        }
    }
}

impl Default for BridgeState {
    fn default() -> Self {
        Self::idle()
    }
}
