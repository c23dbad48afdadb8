// ABOUTME: Validation and extraction of the caller's launch parameters
// ABOUTME: A bad launch routes to idle, never to the error state

use url::form_urlencoded;

use crate::error::InvalidLaunch;
use crate::types::launch::LaunchRequest;

/// The only `source` value this page serves.
pub const EXPECTED_SOURCE: &str = "obsidian";

/// Parse a raw query string (with or without the leading `?`) into a
/// validated launch request.
///
/// `source` must equal the literal `"obsidian"` and `nonce` must be present
/// and non-empty. `redirect` is true only for the exact value `"true"`.
/// `prompt` is forwarded unvalidated. Duplicate parameters keep the first
/// occurrence.
///
/// Callers that get a valid request back must strip the raw parameters from
/// the visible URL before issuing any network call.
pub fn parse(query: &str) -> Result<LaunchRequest, InvalidLaunch> {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut source: Option<String> = None;
    let mut nonce: Option<String> = None;
    let mut redirect: Option<String> = None;
    let mut prompt: Option<String> = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match key.as_ref() {
            "source" => &mut source,
            "nonce" => &mut nonce,
            "redirect" => &mut redirect,
            "prompt" => &mut prompt,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    let source = source.ok_or(InvalidLaunch::MissingSource)?;
    if source != EXPECTED_SOURCE {
        return Err(InvalidLaunch::WrongSource(source));
    }

    let nonce = nonce
        .filter(|n| !n.is_empty())
        .ok_or(InvalidLaunch::MissingNonce)?;

    let redirect = redirect.as_deref() == Some("true");

    Ok(LaunchRequest {
        source,
        nonce,
        redirect,
        prompt,
    })
}
