//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session of port interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the recording was finished.
    pub recorded_at: DateTime<Utc>,
    /// Commit the recording was made from.
    pub commit: String,
    /// Interactions in recording order.
    pub interactions: Vec<Interaction>,
}

/// One call through a port, with its input and `Ok`/`Err` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the recording.
    pub seq: u64,
    /// Port name, e.g. `image_fetcher`.
    pub port: String,
    /// Method name on the port, e.g. `fetch`.
    pub method: String,
    /// Serialized call input.
    pub input: serde_json::Value,
    /// Serialized call result.
    pub output: serde_json::Value,
}
