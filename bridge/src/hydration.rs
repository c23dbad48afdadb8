// ABOUTME: Hydration adapter - trades both tokens for the user's derived identity
// ABOUTME: DerivedIdentity is all-or-nothing; a success body missing a field fails

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use enoki_bridge_core::config::BridgeConfig;
use enoki_bridge_core::error::{BridgeError, BridgeResult};
use enoki_bridge_core::traits::Hydration;
use enoki_bridge_core::types::credential::{DerivedIdentity, SessionToken};

/// Fixed provider discriminator the backend expects in the request body.
pub const PROVIDER: &str = "google";

/// Header carrying the optional shared secret.
const API_SECRET_HEADER: &str = "x-api-secret";

#[derive(Debug, Serialize)]
struct HydrationRequest<'a> {
    provider: &'static str,
    #[serde(rename = "idToken")]
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct HydrationResponse {
    #[serde(default)]
    success: bool,
    salt: Option<String>,
    address: Option<String>,
}

/// HTTP adapter for the hydration RPC.
pub struct HydrationAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_secret: Option<String>,
}

impl HydrationAdapter {
    pub fn new(client: reqwest::Client, config: &BridgeConfig) -> Self {
        Self {
            client,
            endpoint: config.hydration_url.clone(),
            api_secret: config.api_secret.clone(),
        }
    }
}

/// Interpret the hydration response. A body flagged `success:true` but
/// missing `salt` or `address` is a failure, not a partial success.
fn interpret_hydration(status: u16, body: &str) -> BridgeResult<DerivedIdentity> {
    if !(200..300).contains(&status) {
        return Err(BridgeError::hydration_failed(status, body));
    }

    let parsed: HydrationResponse = serde_json::from_str(body)
        .map_err(|e| BridgeError::hydration_failed(status, format!("unparseable body: {e}")))?;

    if !parsed.success {
        return Err(BridgeError::hydration_failed(
            status,
            "response not flagged success",
        ));
    }

    match (parsed.salt, parsed.address) {
        (Some(salt), Some(address)) if !salt.is_empty() && !address.is_empty() => {
            Ok(DerivedIdentity { salt, address })
        }
        _ => Err(BridgeError::hydration_failed(
            status,
            "success response missing salt or address",
        )),
    }
}

#[async_trait]
impl Hydration for HydrationAdapter {
    async fn hydrate(
        &self,
        identity_token: &str,
        session: &SessionToken,
    ) -> BridgeResult<DerivedIdentity> {
        tracing::debug!("hydrating derived identity");

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(session.as_str())
            .json(&HydrationRequest {
                provider: PROVIDER,
                id_token: identity_token,
            });
        if let Some(secret) = &self.api_secret {
            request = request.header(API_SECRET_HEADER, secret);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_hydration(status, &body)
    }
}
