//! Sticker compositing: fallback, or white background + avatar + overlay.

use std::path::PathBuf;
use std::sync::Arc;

use image::Rgba;
use tracing::{debug, info, warn};

use crate::canvas::{Canvas, Rect, Surface};
use crate::error::CompositeError;
use crate::loader::{ImageLoader, ImageSource};
use crate::ports::CrossOrigin;
use crate::validate::validate_identifier;

/// Side length of the avatar square in the bottom-left corner.
pub const AVATAR_SIZE: u32 = 138;

/// Background painted under the avatar so a translucent mask never shows
/// through to transparency.
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Placeholder in an avatar base URL replaced by the identifier.
const ID_PLACEHOLDER: &str = "{id}";

/// Build the avatar URL for `identifier`.
///
/// If `base` contains `{id}` the identifier is substituted there, otherwise
/// it is appended as a final path segment.
#[must_use]
pub fn avatar_url(base: &str, identifier: &str) -> String {
    if base.contains(ID_PLACEHOLDER) {
        base.replace(ID_PLACEHOLDER, identifier)
    } else {
        format!("{}/{identifier}", base.trim_end_matches('/'))
    }
}

/// Where the compositor gets its images from.
#[derive(Debug, Clone)]
pub struct AssetSources {
    /// Avatar base URL, see [`avatar_url`].
    pub avatar_base_url: String,
    /// Overlay/mask drawn last over the full canvas.
    pub overlay: PathBuf,
    /// Image shown when no identifier is entered.
    pub fallback: PathBuf,
}

/// What a finished composite did to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOutcome {
    /// The new image was published.
    Drawn,
    /// A newer composite started meanwhile; this result was discarded.
    Superseded,
}

/// Owns the sticker surface and is its only writer.
pub struct Compositor {
    loader: ImageLoader,
    assets: AssetSources,
    surface: Arc<Surface>,
}

impl Compositor {
    /// Create a compositor with a blank surface.
    #[must_use]
    pub fn new(loader: ImageLoader, assets: AssetSources) -> Self {
        Self { loader, assets, surface: Arc::new(Surface::new(Canvas::sticker())) }
    }

    /// Shared read access to the published surface.
    #[must_use]
    pub fn surface(&self) -> Arc<Surface> {
        Arc::clone(&self.surface)
    }

    /// Discard every composite currently in flight.
    pub fn invalidate(&self) {
        self.surface.invalidate();
    }

    /// Produce the sticker for `identifier` and publish it.
    ///
    /// An empty identifier draws the fallback image. On any error the
    /// surface keeps its previous content.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed identifier (no I/O is
    /// attempted) or a load error if any required image fails.
    pub async fn composite(&self, identifier: &str) -> Result<CompositeOutcome, CompositeError> {
        let ticket = self.reserve(identifier)?;
        self.composite_reserved(identifier, ticket).await
    }

    /// Validate `identifier` and take a ticket for it, superseding every
    /// composite started earlier.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed, non-empty identifier.
    /// No ticket is taken in that case.
    pub(crate) fn reserve(&self, identifier: &str) -> Result<u64, CompositeError> {
        if !identifier.is_empty() {
            validate_identifier(identifier)?;
        }
        Ok(self.surface.issue_ticket())
    }

    /// Draw for a ticket from [`Compositor::reserve`]. A ticket that is
    /// already stale skips loading entirely.
    ///
    /// # Errors
    ///
    /// Returns a load error if any required image fails.
    pub(crate) async fn composite_reserved(
        &self,
        identifier: &str,
        ticket: u64,
    ) -> Result<CompositeOutcome, CompositeError> {
        if !self.surface.is_current(ticket) {
            debug!(identifier, ticket, "composite superseded before loading");
            return Ok(CompositeOutcome::Superseded);
        }

        let canvas = if identifier.is_empty() {
            self.draw_fallback().await
        } else {
            self.draw_sticker(identifier).await
        }
        .inspect_err(|e| warn!(identifier, error = %e, "composite failed"))?;

        if self.surface.commit(ticket, canvas) {
            info!(identifier, "composite drawn");
            Ok(CompositeOutcome::Drawn)
        } else {
            debug!(identifier, ticket, "composite superseded");
            Ok(CompositeOutcome::Superseded)
        }
    }

    async fn draw_fallback(&self) -> Result<Canvas, CompositeError> {
        let fallback = self
            .loader
            .load(ImageSource::Local(self.assets.fallback.clone()), CrossOrigin::Anonymous)
            .await?;

        let mut canvas = Canvas::sticker();
        canvas.clear();
        canvas.draw_image(&fallback, canvas.bounds());
        Ok(canvas)
    }

    async fn draw_sticker(&self, identifier: &str) -> Result<Canvas, CompositeError> {
        let overlay_source = ImageSource::Local(self.assets.overlay.clone());
        let avatar_source =
            ImageSource::Remote(avatar_url(&self.assets.avatar_base_url, identifier));

        let (overlay, avatar) = tokio::try_join!(
            self.loader.load(overlay_source, CrossOrigin::Anonymous),
            self.loader.load(avatar_source, CrossOrigin::Anonymous),
        )?;

        let mut canvas = Canvas::sticker();
        canvas.clear();
        canvas.fill(BACKGROUND);
        let avatar_rect = Rect {
            x: 0,
            y: i64::from(canvas.height()) - i64::from(AVATAR_SIZE),
            width: AVATAR_SIZE,
            height: AVATAR_SIZE,
        };
        canvas.draw_image(&avatar, avatar_rect);
        canvas.draw_image(&overlay, canvas.bounds());
        Ok(canvas)
    }
}
