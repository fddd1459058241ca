//! Replaying adapter for the `ImageFetcher` port.

use std::sync::{Arc, Mutex, PoisonError};

use crate::cassette::replayer::{into_result, CassetteReplayer};
use crate::error::LoadError;
use crate::ports::image_fetcher::{FetchFuture, FetchRequest, FetchedImage, ImageFetcher};

/// Answers fetches from a cassette without touching the network.
///
/// Recorded failures and missing recordings both surface as
/// [`LoadError::Network`] carrying the recorded message.
pub struct ReplayingImageFetcher {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageFetcher {
    /// Serve fetches from `replayer`.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageFetcher for ReplayingImageFetcher {
    fn fetch(&self, request: &FetchRequest) -> FetchFuture<'_> {
        let url = request.url.clone();
        let output = serde_json::to_value(request).map_err(|e| e.to_string()).and_then(|input| {
            self.replayer.lock().unwrap_or_else(PoisonError::into_inner).take(
                "image_fetcher",
                "fetch",
                &input,
            )
        });
        Box::pin(async move {
            output
                .and_then(into_result::<FetchedImage>)
                .map_err(|message| LoadError::Network { url, message })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::ports::CrossOrigin;
    use chrono::Utc;
    use serde_json::json;

    fn replaying(output: serde_json::Value) -> ReplayingImageFetcher {
        let cassette = Cassette {
            name: "t".into(),
            recorded_at: Utc::now(),
            commit: "c".into(),
            interactions: vec![Interaction {
                seq: 0,
                port: "image_fetcher".into(),
                method: "fetch".into(),
                input: json!({"url": "https://avatar.test/12345", "cross_origin": "anonymous"}),
                output,
            }],
        };
        ReplayingImageFetcher::new(Arc::new(Mutex::new(CassetteReplayer::new(cassette))))
    }

    fn request() -> FetchRequest {
        FetchRequest { url: "https://avatar.test/12345".into(), cross_origin: CrossOrigin::Anonymous }
    }

    #[tokio::test]
    async fn serves_recorded_image() {
        let fetcher = replaying(json!({"Ok": {"data": "AQID", "mime_type": "image/png"}}));
        let image = fetcher.fetch(&request()).await.unwrap();
        assert_eq!(image.data, vec![1, 2, 3]);
        assert_eq!(image.mime_type, "image/png");
    }

    #[tokio::test]
    async fn recorded_error_is_load_error() {
        let fetcher = replaying(json!({"Err": "Failed to load https://avatar.test/12345: HTTP 404"}));
        let err = fetcher.fetch(&request()).await.unwrap_err();
        assert!(matches!(err, LoadError::Network { .. }));
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[tokio::test]
    async fn unrecorded_request_is_load_error() {
        let fetcher = replaying(json!({"Ok": {"data": "", "mime_type": "image/png"}}));
        let other = FetchRequest { url: "https://avatar.test/99999".into(), cross_origin: CrossOrigin::Anonymous };
        assert!(matches!(fetcher.fetch(&other).await, Err(LoadError::Network { .. })));
    }
}
