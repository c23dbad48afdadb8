// ABOUTME: Core types and capability contracts for the Enoki auth bridge
// ABOUTME: Pure parsing, encoding, and state; all IO lives in the enoki-bridge crate

pub mod config;
pub mod correlation;
pub mod deeplink;
pub mod error;
pub mod params;
pub mod traits;
pub mod types;

// Re-export main types for convenience
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult, InvalidLaunch, ProviderError};
pub use types::credential::{
    AuthenticationResult, DerivedIdentity, IdentityCredential, SessionToken,
};
pub use types::launch::LaunchRequest;
pub use types::state::{BridgeFault, BridgePhase, BridgeState};
