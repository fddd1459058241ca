//! Live adapter fetching images over HTTP(S).

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use crate::error::LoadError;
use crate::ports::image_fetcher::{FetchFuture, FetchRequest, FetchedImage, ImageFetcher};

/// Live fetcher backed by a shared `reqwest` client.
///
/// Requests never carry credentials, which is what `Anonymous` asks for;
/// the access mode only matters to the canvas the image is drawn on.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, request: &FetchRequest) -> FetchFuture<'_> {
        let url = request.url.clone();
        Box::pin(async move {
            let network =
                |e: reqwest::Error| LoadError::Network { url: url.clone(), message: e.to_string() };

            let response =
                self.client.get(&url).header(ACCEPT, "image/*").send().await.map_err(network)?;

            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status { url: url.clone(), status: status.as_u16() });
            }

            // A missing content type is left to the decoder to judge.
            let mime_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("application/octet-stream")
                .to_string();
            if response.headers().contains_key(CONTENT_TYPE) && !is_image_mime(&mime_type) {
                return Err(LoadError::NotAnImage { url: url.clone(), content_type: mime_type });
            }

            let data = response.bytes().await.map_err(network)?.to_vec();
            debug!(%url, bytes = data.len(), %mime_type, "image fetched");
            Ok(FetchedImage { data, mime_type })
        })
    }
}

/// Whether a `Content-Type` value names an image.
fn is_image_mime(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image/")
}
