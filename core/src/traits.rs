// ABOUTME: Capability seams between the bridge core and its collaborators
// ABOUTME: The provider script, the two backend RPCs, and the page environment

use async_trait::async_trait;

use crate::correlation::FlowMarker;
use crate::error::{BridgeResult, ProviderError};
use crate::types::credential::{DerivedIdentity, SessionToken};

/// Credential delivery callback handed to the provider script.
///
/// Invoked with the bearer token once the user completes the provider's
/// flow, or with `None` when the user cancels. A well-behaved script fires
/// it at most once; the identity adapter discards extras regardless.
pub type CredentialCallback = Box<dyn Fn(Option<String>) + Send + Sync>;

/// Rendering hints for the provider's sign-in button. All fields are
/// provider-defined and forwarded untouched, like the launch `prompt`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonOptions {
    pub theme: Option<String>,
    pub text: Option<String>,
    /// Prompt hint from the launch request, forwarded unvalidated.
    pub prompt: Option<String>,
}

/// The identity provider's script-based sign-in capability.
///
/// Treated as opaque: load the script, arm it with a nonce and a callback,
/// render its button, cancel it. Every operation may suspend. Implementations
/// must pass the nonce to the provider unmodified; nothing downstream can
/// repair a substituted nonce.
#[async_trait]
pub trait ProviderScript: Send + Sync {
    /// Fetch and evaluate the provider's sign-in script.
    async fn load(&self) -> Result<(), ProviderError>;

    /// Arm the provider with the caller-supplied nonce and the credential
    /// callback.
    async fn initialize(
        &self,
        nonce: &str,
        on_credential: CredentialCallback,
    ) -> Result<(), ProviderError>;

    /// Render the provider's sign-in button into the named container.
    async fn render_button(&self, anchor: &str, options: &ButtonOptions)
        -> Result<(), ProviderError>;

    /// Tear down provider UI and forget any pending callback. Must be safe
    /// to call even if `initialize` never ran.
    async fn cancel(&self);
}

/// First backend RPC: trade an identity token for a backend session token.
#[async_trait]
pub trait SessionExchange: Send + Sync {
    async fn exchange(&self, identity_token: &str) -> BridgeResult<SessionToken>;
}

/// Second backend RPC: trade (identity token, session token) for the user's
/// derived identity. Only ever called after a successful exchange.
#[async_trait]
pub trait Hydration: Send + Sync {
    async fn hydrate(
        &self,
        identity_token: &str,
        session: &SessionToken,
    ) -> BridgeResult<DerivedIdentity>;
}

/// The hosting page environment, reduced to the narrow capabilities the core
/// consumes. The flow never reaches into ambient browser state beyond these.
pub trait PageContext: Send + Sync {
    /// Raw query string of the launch URL.
    fn read_launch_params(&self) -> String;

    /// Strip the query parameters from the visible URL. Must run after a
    /// successful parse and before any network call leaves the page.
    fn clear_launch_params(&self);

    /// Write the correlation marker to the tab-scoped store.
    fn write_marker(&self, marker: &FlowMarker);

    /// Read back the marker, if any.
    fn read_marker(&self) -> Option<FlowMarker>;

    /// Navigate the page to the given URL (the ejection).
    fn navigate(&self, url: &str);
}
