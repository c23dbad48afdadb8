// ABOUTME: The handoff orchestrator - sequences ingestion, identity exchange,
// ABOUTME: backend exchange, hydration, and ejection, and owns every state mutation

use std::sync::Arc;

use tokio::sync::watch;

use enoki_bridge_core::config::BridgeConfig;
use enoki_bridge_core::correlation::FlowMarker;
use enoki_bridge_core::deeplink;
use enoki_bridge_core::error::{BridgeError, BridgeResult};
use enoki_bridge_core::params;
use enoki_bridge_core::traits::{
    ButtonOptions, Hydration, PageContext, ProviderScript, SessionExchange,
};
use enoki_bridge_core::types::credential::AuthenticationResult;
use enoki_bridge_core::types::launch::LaunchRequest;
use enoki_bridge_core::types::state::{BridgeFault, BridgePhase, BridgeState};

use crate::hydration::HydrationAdapter;
use crate::identity::{CredentialTicket, IdentityAdapter};
use crate::session::SessionExchangeAdapter;

/// Container element the provider button renders into.
const BUTTON_ANCHOR: &str = "signin-button";

/// The authentication handoff state machine.
///
/// Owns the observable [`BridgeState`] exclusively; all mutation happens in
/// its transitions. The flow is single-threaded and strictly sequential: the
/// two backend RPCs encode a data dependency, not an opportunity for
/// concurrency.
pub struct BridgeStateMachine {
    config: BridgeConfig,
    ctx: Arc<dyn PageContext>,
    identity: IdentityAdapter,
    session: Arc<dyn SessionExchange>,
    hydration: Arc<dyn Hydration>,
    state: watch::Sender<BridgeState>,
    launch: Option<LaunchRequest>,
    ticket: Option<CredentialTicket>,
    marker: Option<FlowMarker>,
}

impl BridgeStateMachine {
    pub fn new(
        config: BridgeConfig,
        ctx: Arc<dyn PageContext>,
        identity: IdentityAdapter,
        session: Arc<dyn SessionExchange>,
        hydration: Arc<dyn Hydration>,
    ) -> Self {
        let (state, _) = watch::channel(BridgeState::idle());
        Self {
            config,
            ctx,
            identity,
            session,
            hydration,
            state,
            launch: None,
            ticket: None,
            marker: None,
        }
    }

    /// Production wiring: reqwest-backed adapters built from the config.
    pub fn with_http_adapters(
        config: BridgeConfig,
        ctx: Arc<dyn PageContext>,
        script: Arc<dyn ProviderScript>,
    ) -> Self {
        let client = reqwest::Client::new();
        let session = Arc::new(SessionExchangeAdapter::new(client.clone(), &config));
        let hydration = Arc::new(HydrationAdapter::new(client, &config));
        Self::new(config, ctx, IdentityAdapter::new(script), session, hydration)
    }

    /// Receiver for the current state snapshot; the UI renders from this
    /// while the machine is suspended on network or provider calls.
    pub fn subscribe(&self) -> watch::Receiver<BridgeState> {
        self.state.subscribe()
    }

    pub fn phase(&self) -> BridgePhase {
        self.state.borrow().phase
    }

    /// The launch request this flow is serving, once ingested.
    pub fn launch(&self) -> Option<&LaunchRequest> {
        self.launch.as_ref()
    }

    /// Ingest the launch URL. A valid request arms the provider and renders
    /// the sign-in button; anything else leaves the page idle forever - this
    /// page has no other entry point.
    pub async fn start(&mut self) {
        let query = self.ctx.read_launch_params();
        let launch = match params::parse(&query) {
            Ok(launch) => launch,
            Err(reason) => {
                tracing::info!(%reason, "launch query rejected, staying idle");
                return;
            }
        };

        // Strip the raw parameters from the visible URL before anything else
        // leaves the page (history/referrer leakage, replay).
        self.ctx.clear_launch_params();

        let marker = FlowMarker::issue();
        self.ctx.write_marker(&marker);
        self.marker = Some(marker);

        tracing::info!(redirect = launch.redirect, "launch request accepted");
        self.advance(BridgePhase::Initializing, "Preparing sign-in...");

        if let Err(e) = self.arm_provider(&launch).await {
            return self.fail(e);
        }

        self.launch = Some(launch);
        self.advance(
            BridgePhase::Ready,
            "Sign in with your identity provider to continue.",
        );
    }

    /// Load the provider script and arm it with the caller's nonce, verbatim.
    async fn arm_provider(&mut self, launch: &LaunchRequest) -> BridgeResult<()> {
        self.identity.load_script().await?;

        let ticket = self.identity.initialize(&launch.nonce).await?;

        let options = ButtonOptions {
            prompt: launch.prompt.clone(),
            ..Default::default()
        };
        self.identity.render_button(BUTTON_ANCHOR, &options).await?;

        self.ticket = Some(ticket);
        Ok(())
    }

    /// Drive the flow from the user's button interaction through ejection.
    /// Called by the host when the user engages the rendered button; ignored
    /// in any phase but ready.
    pub async fn authenticate(&mut self) {
        if self.phase() != BridgePhase::Ready {
            tracing::warn!(phase = %self.phase(), "authenticate called outside ready, ignoring");
            return;
        }
        let Some(ticket) = self.ticket.take() else {
            return self.fail(BridgeError::contract_violation(
                "ready phase without an armed credential ticket",
            ));
        };

        self.advance(
            BridgePhase::Authenticating,
            "Waiting for the identity provider...",
        );

        // No timeout: the provider's consent UI owns the user until its
        // callback fires or the user abandons it.
        let credential = match ticket.wait().await {
            Some(credential) => credential,
            None => {
                return self.fail(BridgeError::aborted(
                    "provider delivered no credential (cancelled or failed)",
                ))
            }
        };

        // Sanity-check that the callback belongs to the flow this page
        // started; the marker is a tab-scoped cross-check, not a boundary.
        let resumed = self.ctx.read_marker();
        let ours = self.marker.as_ref();
        if !matches!((ours, &resumed), (Some(a), Some(b)) if a.matches(b)) {
            return self.fail(BridgeError::aborted(
                "credential arrived for a flow this page did not start",
            ));
        }

        self.advance(BridgePhase::Exchanging, "Establishing a session...");
        let session = match self.session.exchange(credential.token()).await {
            Ok(session) => session,
            Err(e) => return self.fail(e),
        };

        self.advance(BridgePhase::Hydrating, "Fetching your account details...");
        let derived = match self.hydration.hydrate(credential.token(), &session).await {
            Ok(derived) => derived,
            Err(e) => return self.fail(e),
        };

        let result = AuthenticationResult {
            identity_token: credential,
            session_token: session,
            salt: derived.salt,
            address: derived.address,
        };
        self.eject(result).await;
    }

    /// Emit the deeplink and hand control back to the desktop app. The fixed
    /// grace delay gives the operating system a chance to switch apps before
    /// the fallback UI appears; the fallback link stays derivable from the
    /// published result either way.
    async fn eject(&mut self, result: AuthenticationResult) {
        let url = deeplink::encode(&result);

        self.state.send_modify(|state| {
            if state.phase.can_advance_to(BridgePhase::Ejecting) {
                state.phase = BridgePhase::Ejecting;
                state.message = "Returning to the app...".to_string();
                state.data = Some(result);
            }
        });
        tracing::info!("ejecting via deeplink");
        self.ctx.navigate(&url);

        tokio::time::sleep(self.config.eject_grace).await;
        self.advance(
            BridgePhase::Success,
            "You're signed in. If the app didn't open, use the link below.",
        );
    }

    /// Page teardown hook (navigation away or unmount): invalidate the
    /// provider callback so a late credential cannot mutate a defunct flow.
    /// In-flight HTTP is left to finish fire-and-forget; the page is leaving.
    pub async fn teardown(&mut self) {
        self.ticket.take();
        self.identity.cancel().await;
    }

    /// Advance to `next` if the transition table allows it. Terminal states
    /// are sticky; an illegal request is logged and ignored.
    fn advance(&self, next: BridgePhase, message: &str) {
        let mut moved = false;
        self.state.send_modify(|state| {
            if state.phase.can_advance_to(next) {
                state.phase = next;
                state.message = message.to_string();
                moved = true;
            }
        });
        if moved {
            tracing::debug!(phase = %next, "bridge transition");
        } else {
            tracing::warn!(requested = %next, "ignoring illegal bridge transition");
        }
    }

    /// Route a flow failure into the terminal error state, carrying the
    /// user-safe message and keeping the diagnostic in the fault detail.
    /// No failure is retried; recovery is a user-driven restart.
    fn fail(&self, error: BridgeError) {
        tracing::error!(%error, "bridge flow failed");
        let fault = BridgeFault::new(error.user_message(), error.to_string());
        self.state.send_modify(|state| {
            if state.phase.can_advance_to(BridgePhase::Error) {
                state.phase = BridgePhase::Error;
                state.message = fault.message.clone();
                state.error = Some(fault);
                state.data = None;
            }
        });
    }
}
