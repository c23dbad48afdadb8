// ABOUTME: Ephemeral per-tab correlation marker for resumed-flow sanity checks

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Key under which the marker lives in the tab-scoped store.
pub const MARKER_KEY: &str = "enoki-bridge.flow";

/// Correlation marker written once at ingestion time and read once when a
/// credential arrives, to validate that the callback belongs to a flow this
/// page itself started. Never a security boundary on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMarker {
    pub flow_id: String,
    pub issued_at: DateTime<Utc>,
}

impl FlowMarker {
    /// Issue a fresh marker with a random 32-character alphanumeric id.
    pub fn issue() -> Self {
        let flow_id: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        Self {
            flow_id,
            issued_at: Utc::now(),
        }
    }

    /// Whether `other` identifies the same flow. Timestamps are informational
    /// and do not participate.
    pub fn matches(&self, other: &FlowMarker) -> bool {
        self.flow_id == other.flow_id
    }
}
