// ABOUTME: Session exchange adapter - trades an identity token for a backend session
// ABOUTME: Any non-2xx, and any 2xx missing the token field, is a hard failure

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use enoki_bridge_core::config::BridgeConfig;
use enoki_bridge_core::error::{BridgeError, BridgeResult};
use enoki_bridge_core::traits::SessionExchange;
use enoki_bridge_core::types::credential::SessionToken;

#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    #[serde(rename = "authenticationToken")]
    authentication_token: Option<String>,
}

/// HTTP adapter for the session exchange RPC.
pub struct SessionExchangeAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl SessionExchangeAdapter {
    pub fn new(client: reqwest::Client, config: &BridgeConfig) -> Self {
        Self {
            client,
            endpoint: config.session_url.clone(),
        }
    }
}

/// Interpret the exchange response. The backend contract is not trusted
/// blindly: an HTTP success missing the token field is still an error.
fn interpret_exchange(status: u16, body: &str) -> BridgeResult<SessionToken> {
    if !(200..300).contains(&status) {
        return Err(BridgeError::exchange_failed(status, body));
    }

    let parsed: ExchangeResponse = serde_json::from_str(body)
        .map_err(|e| BridgeError::exchange_failed(status, format!("unparseable body: {e}")))?;

    match parsed.authentication_token {
        Some(token) if !token.is_empty() => Ok(SessionToken::new(token)),
        _ => Err(BridgeError::exchange_failed(
            status,
            "response missing authenticationToken",
        )),
    }
}

#[async_trait]
impl SessionExchange for SessionExchangeAdapter {
    async fn exchange(&self, identity_token: &str) -> BridgeResult<SessionToken> {
        tracing::debug!("exchanging identity token for a session token");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ExchangeRequest {
                id_token: identity_token,
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_exchange(status, &body)
    }
}
