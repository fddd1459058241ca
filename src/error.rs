//! Error types for the sticker pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// A malformed identifier. Never reaches the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid identifier '{identifier}': expected 5-11 digits, not starting with 0")]
pub struct ValidationError {
    /// The rejected input.
    pub identifier: String,
}

/// An image could not be fetched or decoded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A local asset could not be read.
    #[error("Failed to load {}: {source}", path.display())]
    Io {
        /// Path of the asset.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The request never produced a response.
    #[error("Failed to load {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error message.
        message: String,
    },

    /// The server answered with a non-2xx status.
    #[error("Failed to load {url}: HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response was not an image.
    #[error("Failed to load {url}: unexpected content type '{content_type}'")]
    NotAnImage {
        /// Requested URL.
        url: String,
        /// The content type the server reported.
        content_type: String,
    },

    /// The bytes could not be decoded as an image.
    #[error("Failed to load {url}: {message}")]
    Decode {
        /// Source URL or path.
        url: String,
        /// Decoder error message.
        message: String,
    },
}

/// The canvas could not be turned into a shareable artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A cross-origin image without access was drawn onto the canvas.
    #[error("Export failed: canvas is tainted by a cross-origin image")]
    Tainted,

    /// PNG encoding failed.
    #[error("Export failed: {0}")]
    Encode(String),

    /// The exported file could not be written.
    #[error("Export failed: could not write {}: {source}", path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No supported clipboard tool is installed.
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// The clipboard tool rejected the write.
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),
}

/// Why a composite did not draw.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// The identifier was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The avatar, overlay or fallback failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Top-level error for the CLI.
#[derive(Debug, Error)]
pub enum StickerError {
    /// See [`ValidationError`].
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// See [`LoadError`].
    #[error(transparent)]
    Load(#[from] LoadError),

    /// See [`ExportError`].
    #[error(transparent)]
    Export(#[from] ExportError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<CompositeError> for StickerError {
    fn from(err: CompositeError) -> Self {
        match err {
            CompositeError::Validation(e) => Self::Validation(e),
            CompositeError::Load(e) => Self::Load(e),
        }
    }
}
