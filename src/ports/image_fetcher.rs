//! Image fetcher port for remote image sources.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Access mode requested for a remote image.
///
/// Mirrors the browser `crossOrigin` attribute: an image fetched without
/// `Anonymous` access taints any canvas it is drawn onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossOrigin {
    /// No cross-origin access requested.
    None,
    /// Cross-origin access without credentials.
    Anonymous,
}

/// A request for one remote image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Absolute URL of the image.
    pub url: String,
    /// Requested access mode.
    pub cross_origin: CrossOrigin,
}

/// Raw bytes of a fetched image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedImage {
    /// Undecoded image bytes.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type reported by the server (e.g., `"image/png"`).
    pub mime_type: String,
}

/// Boxed future type returned by [`ImageFetcher::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<FetchedImage, LoadError>> + Send + 'a>>;

/// Fetches remote image bytes. One attempt per call, no retries.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the image described by `request`.
    fn fetch(&self, request: &FetchRequest) -> FetchFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
