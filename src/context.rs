//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::adapters::live::clipboard::CommandClipboard;
use crate::adapters::live::http::HttpFetcher;
use crate::adapters::recording::image_fetcher::RecordingImageFetcher;
use crate::adapters::replaying::image_fetcher::ReplayingImageFetcher;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::StickerError;
use crate::ports::{ClipboardWriter, ImageFetcher};

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Remote image fetcher port.
    pub fetcher: Arc<dyn ImageFetcher>,
    /// Clipboard port.
    pub clipboard: Arc<dyn ClipboardWriter>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the recorded cassette to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = self.recorder.lock().unwrap_or_else(PoisonError::into_inner);
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Live context: HTTP fetching and the system clipboard.
    #[must_use]
    pub fn live() -> Self {
        Self { fetcher: Arc::new(HttpFetcher::new()), clipboard: Arc::new(CommandClipboard::new()) }
    }

    /// Live context whose fetches are recorded to a cassette under
    /// `.sticker/cassettes/<timestamp>/`.
    #[must_use]
    pub fn recording() -> (Self, RecordingSession) {
        let live = Self::live();

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".sticker/cassettes")
            .join(&timestamp)
            .join("image_fetcher.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-image_fetcher"),
            get_commit_hash(),
        )));

        let fetcher = Arc::new(RecordingImageFetcher::new(live.fetcher, Arc::clone(&recorder)));
        (Self { fetcher, clipboard: live.clipboard }, RecordingSession { recorder })
    }

    /// Context serving fetches from a cassette file. The clipboard stays live.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, StickerError> {
        let replayer = CassetteReplayer::load(path).map_err(StickerError::Config)?;
        let fetcher = Arc::new(ReplayingImageFetcher::new(Arc::new(Mutex::new(replayer))));
        Ok(Self { fetcher, clipboard: Arc::new(CommandClipboard::new()) })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
