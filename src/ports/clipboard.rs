//! Clipboard port for writing image entries.

use std::future::Future;
use std::pin::Pin;

use crate::error::ExportError;

/// MIME type of every clipboard entry written by the exporter.
pub const PNG_MIME: &str = "image/png";

/// Boxed future type returned by [`ClipboardWriter::write_image`].
pub type ClipboardFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ExportError>> + Send + 'a>>;

/// Writes a single image entry to the system clipboard.
pub trait ClipboardWriter: Send + Sync {
    /// Replace the clipboard contents with `data`, tagged as `mime_type`.
    fn write_image<'a>(&'a self, data: &'a [u8], mime_type: &'a str) -> ClipboardFuture<'a>;
}
