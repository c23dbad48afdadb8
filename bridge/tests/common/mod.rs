// ABOUTME: Shared test doubles for the page environment, the provider script,
// ABOUTME: and the two backend RPCs, with a chronological event log
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use enoki_bridge::identity::IdentityAdapter;
use enoki_bridge::machine::BridgeStateMachine;
use enoki_bridge_core::config::BridgeConfig;
use enoki_bridge_core::correlation::FlowMarker;
use enoki_bridge_core::error::{BridgeError, BridgeResult, ProviderError};
use enoki_bridge_core::traits::{
    ButtonOptions, CredentialCallback, Hydration, PageContext, ProviderScript, SessionExchange,
};
use enoki_bridge_core::types::credential::{DerivedIdentity, SessionToken};

/// Chronological record of observable side effects across all doubles.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events_of(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn position(log: &EventLog, event: &str) -> Option<usize> {
    log.lock().unwrap().iter().position(|e| e == event)
}

// ── Page environment ────────────────────────────────────────────────────────

pub struct MockPage {
    query: String,
    events: EventLog,
    marker: Mutex<Option<FlowMarker>>,
    pub navigations: Mutex<Vec<String>>,
}

impl MockPage {
    pub fn new(query: &str, events: EventLog) -> Arc<Self> {
        Arc::new(Self {
            query: query.to_string(),
            events,
            marker: Mutex::new(None),
            navigations: Mutex::new(Vec::new()),
        })
    }

    /// Overwrite the tab store, e.g. to simulate a marker from another flow.
    pub fn set_marker(&self, marker: Option<FlowMarker>) {
        *self.marker.lock().unwrap() = marker;
    }
}

impl PageContext for MockPage {
    fn read_launch_params(&self) -> String {
        self.query.clone()
    }

    fn clear_launch_params(&self) {
        self.events.lock().unwrap().push("clear_params".to_string());
    }

    fn write_marker(&self, marker: &FlowMarker) {
        self.events.lock().unwrap().push("write_marker".to_string());
        *self.marker.lock().unwrap() = Some(marker.clone());
    }

    fn read_marker(&self) -> Option<FlowMarker> {
        self.events.lock().unwrap().push("read_marker".to_string());
        self.marker.lock().unwrap().clone()
    }

    fn navigate(&self, url: &str) {
        self.events.lock().unwrap().push("navigate".to_string());
        self.navigations.lock().unwrap().push(url.to_string());
    }
}

// ── Provider script ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum ProviderBehavior {
    /// Fire the callback with this token as soon as initialize runs.
    DeliverToken(String),
    /// Fire the callback with an empty token.
    DeliverEmpty,
    /// Fire the callback with no credential (user cancelled).
    DeliverNone,
    /// Keep the callback for the test to fire manually.
    HoldCallback,
    /// Fail the script load.
    FailLoad(String),
}

pub struct ScriptedProvider {
    behavior: ProviderBehavior,
    events: EventLog,
    pub loads: AtomicUsize,
    pub cancels: AtomicUsize,
    pub nonces: Mutex<Vec<String>>,
    pub button_options: Mutex<Option<ButtonOptions>>,
    pub callback: Mutex<Option<CredentialCallback>>,
}

impl ScriptedProvider {
    pub fn new(behavior: ProviderBehavior, events: EventLog) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            events,
            loads: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
            nonces: Mutex::new(Vec::new()),
            button_options: Mutex::new(None),
            callback: Mutex::new(None),
        })
    }

    /// Fire the held callback the way a late provider script would.
    pub fn fire(&self, token: Option<&str>) {
        let callback = self.callback.lock().unwrap();
        let callback = callback.as_ref().expect("no held callback");
        callback(token.map(|t| t.to_string()));
    }
}

#[async_trait]
impl ProviderScript for ScriptedProvider {
    async fn load(&self) -> Result<(), ProviderError> {
        self.events.lock().unwrap().push("load".to_string());
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ProviderBehavior::FailLoad(msg) => Err(ProviderError::new(msg.clone())),
            _ => Ok(()),
        }
    }

    async fn initialize(
        &self,
        nonce: &str,
        on_credential: CredentialCallback,
    ) -> Result<(), ProviderError> {
        self.events.lock().unwrap().push("initialize".to_string());
        self.nonces.lock().unwrap().push(nonce.to_string());
        match &self.behavior {
            ProviderBehavior::DeliverToken(token) => on_credential(Some(token.clone())),
            ProviderBehavior::DeliverEmpty => on_credential(Some(String::new())),
            ProviderBehavior::DeliverNone => on_credential(None),
            ProviderBehavior::HoldCallback => {
                *self.callback.lock().unwrap() = Some(on_credential);
            }
            ProviderBehavior::FailLoad(_) => {}
        }
        Ok(())
    }

    async fn render_button(
        &self,
        _anchor: &str,
        options: &ButtonOptions,
    ) -> Result<(), ProviderError> {
        self.events.lock().unwrap().push("render_button".to_string());
        *self.button_options.lock().unwrap() = Some(options.clone());
        Ok(())
    }

    async fn cancel(&self) {
        self.events.lock().unwrap().push("cancel".to_string());
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Backend RPC doubles ─────────────────────────────────────────────────────

#[derive(Clone)]
pub enum ExchangeBehavior {
    Succeed(String),
    FailStatus(u16, String),
}

pub struct MockSessionExchange {
    behavior: ExchangeBehavior,
    events: EventLog,
    pub calls: Mutex<Vec<String>>,
}

impl MockSessionExchange {
    pub fn new(behavior: ExchangeBehavior, events: EventLog) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            events,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SessionExchange for MockSessionExchange {
    async fn exchange(&self, identity_token: &str) -> BridgeResult<SessionToken> {
        self.events.lock().unwrap().push("exchange".to_string());
        self.calls.lock().unwrap().push(identity_token.to_string());
        match &self.behavior {
            ExchangeBehavior::Succeed(token) => Ok(SessionToken::new(token.clone())),
            ExchangeBehavior::FailStatus(status, body) => {
                Err(BridgeError::exchange_failed(*status, body.clone()))
            }
        }
    }
}

#[derive(Clone)]
pub enum HydrationBehavior {
    Succeed { salt: String, address: String },
    FailStatus(u16, String),
    MissingField,
}

pub struct MockHydration {
    behavior: HydrationBehavior,
    events: EventLog,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl MockHydration {
    pub fn new(behavior: HydrationBehavior, events: EventLog) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            events,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Hydration for MockHydration {
    async fn hydrate(
        &self,
        identity_token: &str,
        session: &SessionToken,
    ) -> BridgeResult<DerivedIdentity> {
        self.events.lock().unwrap().push("hydrate".to_string());
        self.calls
            .lock()
            .unwrap()
            .push((identity_token.to_string(), session.as_str().to_string()));
        match &self.behavior {
            HydrationBehavior::Succeed { salt, address } => Ok(DerivedIdentity {
                salt: salt.clone(),
                address: address.clone(),
            }),
            HydrationBehavior::FailStatus(status, body) => {
                Err(BridgeError::hydration_failed(*status, body.clone()))
            }
            HydrationBehavior::MissingField => Err(BridgeError::hydration_failed(
                200,
                "success response missing salt or address",
            )),
        }
    }
}

// ── Harness ─────────────────────────────────────────────────────────────────

pub struct Harness {
    pub machine: BridgeStateMachine,
    pub page: Arc<MockPage>,
    pub provider: Arc<ScriptedProvider>,
    pub session: Arc<MockSessionExchange>,
    pub hydration: Arc<MockHydration>,
    pub events: EventLog,
}

/// Wire a full machine from doubles, with a short eject grace so tests
/// finish fast.
pub fn harness(
    query: &str,
    provider_behavior: ProviderBehavior,
    exchange_behavior: ExchangeBehavior,
    hydration_behavior: HydrationBehavior,
) -> Harness {
    let events = event_log();
    let page = MockPage::new(query, events.clone());
    let provider = ScriptedProvider::new(provider_behavior, events.clone());
    let session = MockSessionExchange::new(exchange_behavior, events.clone());
    let hydration = MockHydration::new(hydration_behavior, events.clone());

    let config = BridgeConfig::new(
        "https://backend.test/session",
        "https://backend.test/hydrate",
    )
    .unwrap()
    .with_eject_grace(Duration::from_millis(10));

    let machine = BridgeStateMachine::new(
        config,
        page.clone(),
        IdentityAdapter::new(provider.clone()),
        session.clone(),
        hydration.clone(),
    );

    Harness {
        machine,
        page,
        provider,
        session,
        hydration,
        events,
    }
}

/// The standard happy-path harness: valid launch, credential delivered,
/// both RPCs succeed.
pub fn happy_harness() -> Harness {
    harness(
        "source=obsidian&nonce=abc123",
        ProviderBehavior::DeliverToken("tok1".to_string()),
        ExchangeBehavior::Succeed("sess1".to_string()),
        HydrationBehavior::Succeed {
            salt: "42".to_string(),
            address: "0xDEAD".to_string(),
        },
    )
}
