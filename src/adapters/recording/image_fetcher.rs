//! Recording adapter for the `ImageFetcher` port.

use std::sync::{Arc, Mutex, PoisonError};

use crate::cassette::recorder::CassetteRecorder;
use crate::ports::image_fetcher::{FetchFuture, FetchRequest, ImageFetcher};

/// Delegates to an inner fetcher and records every request with its result.
pub struct RecordingImageFetcher {
    inner: Arc<dyn ImageFetcher>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageFetcher {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(inner: Arc<dyn ImageFetcher>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageFetcher for RecordingImageFetcher {
    fn fetch(&self, request: &FetchRequest) -> FetchFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.fetch(&request).await;
            self.recorder.lock().unwrap_or_else(PoisonError::into_inner).record(
                "image_fetcher",
                "fetch",
                &request,
                &result,
            );
            result
        })
    }
}
