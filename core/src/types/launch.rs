// ABOUTME: The launch contract the desktop app sends through the page query string

/// A validated launch request, created once from the page's query string at
/// page load and never mutated afterwards.
///
/// The `nonce` originated outside this system and is carried through opaque:
/// no code in this workspace generates, caches, or substitutes one. That is
/// the invariant the whole handoff exists to preserve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Identifies the requesting application; always the literal `"obsidian"`.
    pub source: String,
    /// Caller-supplied opaque value the identity token must be bound to.
    pub nonce: String,
    /// Redirect-mode hint. Parsed and carried for launch compatibility; the
    /// callback-based flow implemented here does not branch on it.
    pub redirect: bool,
    /// Provider-defined prompt hint, passed through unvalidated.
    pub prompt: Option<String>,
}
