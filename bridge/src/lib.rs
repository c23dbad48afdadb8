// ABOUTME: Orchestration and IO for the Enoki auth bridge
// ABOUTME: Exports the state machine, the identity adapter, and the HTTP RPC adapters

pub mod hydration;
pub mod identity;
pub mod machine;
pub mod session;

// Re-export main types for convenience
pub use hydration::HydrationAdapter;
pub use identity::{CredentialTicket, IdentityAdapter};
pub use machine::BridgeStateMachine;
pub use session::SessionExchangeAdapter;
