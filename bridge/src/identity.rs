// ABOUTME: Wrapper around the identity provider's script-based sign-in capability
// ABOUTME: Owns script-load memoization and the single-shot credential ticket

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{oneshot, OnceCell};

use enoki_bridge_core::error::{BridgeError, BridgeResult};
use enoki_bridge_core::traits::{ButtonOptions, CredentialCallback, ProviderScript};
use enoki_bridge_core::types::credential::IdentityCredential;

type PendingSender = Arc<Mutex<Option<oneshot::Sender<Option<IdentityCredential>>>>>;

/// Receiver half of one authentication attempt. Awaited exactly once per
/// authenticating phase; yields `None` when the user cancelled, the provider
/// delivered an empty credential, or the adapter was torn down.
#[derive(Debug)]
pub struct CredentialTicket {
    rx: oneshot::Receiver<Option<IdentityCredential>>,
}

impl CredentialTicket {
    /// Wait for the provider callback. There is deliberately no timeout:
    /// the provider's own UI owns cancellation while it has the user.
    pub async fn wait(self) -> Option<IdentityCredential> {
        self.rx.await.ok().flatten()
    }
}

/// Adapter over the provider's sign-in script.
///
/// The nonce handed to [`IdentityAdapter::initialize`] is opaque and reaches
/// the provider byte-for-byte. The adapter holds no randomness and no stored
/// nonce, so there is no code path that could generate, cache, or substitute
/// one - the contract is enforced by construction rather than by a check.
pub struct IdentityAdapter {
    script: Arc<dyn ProviderScript>,
    loaded: OnceCell<()>,
    /// Bumped on every initialize and cancel; a callback carrying an older
    /// generation is discarded instead of resolving a defunct flow.
    generation: Arc<AtomicU64>,
    pending: PendingSender,
}

impl IdentityAdapter {
    pub fn new(script: Arc<dyn ProviderScript>) -> Self {
        Self {
            script,
            loaded: OnceCell::new(),
            generation: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Load the provider script. Idempotent and memoized; concurrent callers
    /// share one in-flight load (a pending-operation guard, not a lock).
    pub async fn load_script(&self) -> BridgeResult<()> {
        self.loaded
            .get_or_try_init(|| async {
                self.script.load().await.map_err(|e| {
                    BridgeError::provider_unavailable(format!("script load failed: {e}"))
                })
            })
            .await?;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Arm the provider with the caller-supplied nonce and return the ticket
    /// the flow awaits.
    ///
    /// Fails if the script is not loaded, or if the nonce is empty - the
    /// latter is an integration bug, never grounds for defaulting one in.
    pub async fn initialize(&self, nonce: &str) -> BridgeResult<CredentialTicket> {
        if !self.is_loaded() {
            return Err(BridgeError::provider_unavailable(
                "initialize called before the provider script was loaded",
            ));
        }
        if nonce.is_empty() {
            return Err(BridgeError::contract_violation(
                "initialize requires the caller's nonce",
            ));
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = oneshot::channel();
        *self.pending.lock() = Some(tx);

        let pending = Arc::clone(&self.pending);
        let current = Arc::clone(&self.generation);
        let callback: CredentialCallback = Box::new(move |token: Option<String>| {
            if current.load(Ordering::SeqCst) != generation {
                tracing::warn!("discarding identity callback from a stale flow generation");
                return;
            }
            if let Some(tx) = pending.lock().take() {
                // An empty token is an abort, never a credential.
                let _ = tx.send(token.and_then(IdentityCredential::new));
            }
        });

        self.script
            .initialize(nonce, callback)
            .await
            .map_err(|e| BridgeError::provider_unavailable(format!("initialize failed: {e}")))?;

        tracing::debug!("provider armed with caller nonce");
        Ok(CredentialTicket { rx })
    }

    /// Render the provider's sign-in button.
    pub async fn render_button(&self, anchor: &str, options: &ButtonOptions) -> BridgeResult<()> {
        self.script
            .render_button(anchor, options)
            .await
            .map_err(|e| BridgeError::provider_unavailable(format!("button render failed: {e}")))
    }

    /// Cancel provider UI and invalidate any pending callback. Safe to call
    /// at any point, including before `initialize` ever ran; used as the
    /// teardown hook so a late callback cannot touch a defunct flow.
    pub async fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().take();
        self.script.cancel().await;
    }
}
