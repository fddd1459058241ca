//! Single-attempt image loading from remote URLs or local files.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use tracing::debug;

use crate::error::LoadError;
use crate::ports::{CrossOrigin, FetchRequest, ImageFetcher};

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Fetched over the network through the [`ImageFetcher`] port.
    Remote(String),
    /// Read from disk. Never touches the network.
    Local(PathBuf),
}

impl ImageSource {
    /// Whether loading this source issues a network request.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A decoded image ready to be drawn once.
#[derive(Debug)]
pub struct ImageHandle {
    pixels: RgbaImage,
    source: ImageSource,
    cross_origin: CrossOrigin,
}

impl ImageHandle {
    /// Wrap already-decoded pixels.
    #[must_use]
    pub fn new(pixels: RgbaImage, source: ImageSource, cross_origin: CrossOrigin) -> Self {
        Self { pixels, source, cross_origin }
    }

    /// Decoded RGBA pixels.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Where the image was loaded from.
    #[must_use]
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Access mode the image was loaded with.
    #[must_use]
    pub fn cross_origin(&self) -> CrossOrigin {
        self.cross_origin
    }

    /// Drawing this image taints a canvas: it is remote and was loaded
    /// without cross-origin access.
    #[must_use]
    pub fn taints_canvas(&self) -> bool {
        self.source.is_remote() && self.cross_origin == CrossOrigin::None
    }
}

/// Loads images through a fetcher port (remote) or the filesystem (local).
#[derive(Clone)]
pub struct ImageLoader {
    fetcher: Arc<dyn ImageFetcher>,
}

impl ImageLoader {
    /// Create a loader that fetches remote images through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Load and decode one image. A failed attempt is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or fetched, or the
    /// bytes are not a decodable image.
    pub async fn load(
        &self,
        source: ImageSource,
        cross_origin: CrossOrigin,
    ) -> Result<ImageHandle, LoadError> {
        debug!(%source, ?cross_origin, "loading image");
        let data = match &source {
            ImageSource::Remote(url) => {
                let request = FetchRequest { url: url.clone(), cross_origin };
                self.fetcher.fetch(&request).await?.data
            }
            ImageSource::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| LoadError::Io { path: path.clone(), source: e })?,
        };

        let pixels = image::load_from_memory(&data)
            .map_err(|e| LoadError::Decode { url: source.to_string(), message: e.to_string() })?
            .into_rgba8();
        debug!(%source, width = pixels.width(), height = pixels.height(), "image decoded");

        Ok(ImageHandle::new(pixels, source, cross_origin))
    }
}
