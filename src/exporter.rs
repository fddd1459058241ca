//! Exporting the published sticker as a PNG file or clipboard entry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use md5::{Digest, Md5};
use tracing::{info, warn};

use crate::canvas::Surface;
use crate::error::{ExportError, StickerError};
use crate::ports::{ClipboardWriter, PNG_MIME};
use crate::validate::validate_identifier;

/// File name for an exported sticker: the lowercase hex MD5 digest of the
/// identifier plus `.png`, so the raw identifier never appears on disk.
#[must_use]
pub fn export_filename(identifier: &str) -> String {
    let digest = Md5::digest(identifier.as_bytes());
    format!("{digest:x}.png")
}

/// Reads the compositor's surface and turns it into shareable artifacts.
pub struct Exporter {
    surface: Arc<Surface>,
    clipboard: Arc<dyn ClipboardWriter>,
}

impl Exporter {
    /// Create an exporter reading `surface`.
    #[must_use]
    pub fn new(surface: Arc<Surface>, clipboard: Arc<dyn ClipboardWriter>) -> Self {
        Self { surface, clipboard }
    }

    /// Serialize the current surface as PNG, without any identifier check.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is tainted or cannot be encoded.
    pub fn snapshot_png(&self) -> Result<Vec<u8>, ExportError> {
        self.surface.snapshot().to_png()
    }

    /// Save the sticker for `identifier` into `dir`, returning the file path.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed identifier (nothing is
    /// written), or an export error if encoding or writing fails.
    pub fn download(&self, identifier: &str, dir: &Path) -> Result<PathBuf, StickerError> {
        validate_identifier(identifier)?;
        let path = dir.join(export_filename(identifier));
        let result = self.snapshot_png().and_then(|png| {
            std::fs::write(&path, png).map_err(|e| ExportError::Write { path: path.clone(), source: e })
        });
        match result {
            Ok(()) => {
                info!(path = %path.display(), "sticker saved");
                Ok(path)
            }
            Err(e) => {
                warn!(error = %e, "download failed");
                Err(e.into())
            }
        }
    }

    /// Put the sticker for `identifier` on the clipboard as one `image/png` entry.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed identifier (the clipboard
    /// is untouched), or an export error if encoding or the write fails.
    pub async fn copy_to_clipboard(&self, identifier: &str) -> Result<(), StickerError> {
        validate_identifier(identifier)?;
        let png = self.snapshot_png()?;
        self.clipboard
            .write_image(&png, PNG_MIME)
            .await
            .inspect_err(|e| warn!(error = %e, "copy failed"))?;
        info!(bytes = png.len(), "sticker copied to clipboard");
        Ok(())
    }
}
