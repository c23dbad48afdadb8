// ABOUTME: Encoder for the private-scheme deeplink that hands credentials back
// ABOUTME: Encoding is total - callers only ever hold a complete result

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::types::credential::AuthenticationResult;

/// Private URL scheme registered by the desktop app.
pub const SCHEME: &str = "obsidian";

/// Callback path the app routes to its auth handler.
pub const CALLBACK_HOST: &str = "enoki-auth";

/// Everything outside the RFC 3986 unreserved set is escaped, so any field
/// survives as an opaque string regardless of content. Decoding is plain
/// percent-decoding on the receiving side; no `+`-for-space convention.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Encode a complete authentication result as the handoff deeplink.
///
/// All four fields are always present together and the field order is fixed;
/// the receiving application depends on neither being violated. There is no
/// decoder here: decoding the deeplink is the desktop app's job.
pub fn encode(result: &AuthenticationResult) -> String {
    format!(
        "{SCHEME}://{CALLBACK_HOST}?jwt={}&azure_token={}&salt={}&address={}",
        component(result.identity_token.token()),
        component(result.session_token.as_str()),
        component(&result.salt),
        component(&result.address),
    )
}
