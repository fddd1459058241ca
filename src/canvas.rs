//! Fixed-size RGBA canvas and the shared surface it is published on.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use image::imageops::{self, FilterType};
use image::{ImageFormat, Pixel, Rgba, RgbaImage};
use tracing::debug;

use crate::error::ExportError;
use crate::loader::ImageHandle;

/// Logical width and height of every sticker canvas.
pub const CANVAS_SIZE: u32 = 512;

/// Fully transparent black, the state of a cleared canvas.
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Destination rectangle for a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// An RGBA raster with 2D-canvas style draw operations.
///
/// Drawing a remote image fetched without cross-origin access marks the
/// canvas tainted; a tainted canvas refuses to serialize. The flag is never
/// cleared, not even by [`Canvas::clear`].
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pixels: RgbaImage,
    tainted: bool,
}

impl Canvas {
    /// A transparent canvas of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { pixels: RgbaImage::from_pixel(width, height, TRANSPARENT), tainted: false }
    }

    /// A transparent [`CANVAS_SIZE`] square canvas.
    #[must_use]
    pub fn sticker() -> Self {
        Self::new(CANVAS_SIZE, CANVAS_SIZE)
    }

    /// Canvas width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Canvas height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// The full canvas bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect { x: 0, y: 0, width: self.width(), height: self.height() }
    }

    /// Current pixel content.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether a cross-origin image without access has been drawn.
    #[must_use]
    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = TRANSPARENT;
        }
    }

    /// Paint `color` over the whole canvas, blending by its alpha.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for p in self.pixels.pixels_mut() {
            p.blend(&color);
        }
    }

    /// Draw `image` scaled into `dest`, alpha-blended over existing pixels.
    /// Parts of `dest` outside the canvas are clipped.
    pub fn draw_image(&mut self, image: &ImageHandle, dest: Rect) {
        if dest.width == 0 || dest.height == 0 {
            return;
        }
        let src = image.pixels();
        if src.dimensions() == (dest.width, dest.height) {
            imageops::overlay(&mut self.pixels, src, dest.x, dest.y);
        } else {
            let scaled = imageops::resize(src, dest.width, dest.height, FilterType::Triangle);
            imageops::overlay(&mut self.pixels, &scaled, dest.x, dest.y);
        }
        if image.taints_canvas() {
            debug!(source = %image.source(), "canvas tainted by cross-origin image");
            self.tainted = true;
        }
    }

    /// Serialize the canvas as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is tainted or encoding fails.
    pub fn to_png(&self) -> Result<Vec<u8>, ExportError> {
        if self.tainted {
            return Err(ExportError::Tainted);
        }
        let mut buf = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        Ok(buf.into_inner())
    }
}

/// The one published canvas of a compositor.
///
/// Writers draw on a private [`Canvas`] and publish it whole with
/// [`Surface::commit`], so readers only ever see completed composites.
/// Every composite holds a ticket; only the newest ticket may commit.
#[derive(Debug)]
pub struct Surface {
    canvas: RwLock<Canvas>,
    issued: AtomicU64,
}

impl Surface {
    /// A surface initially showing `canvas`.
    #[must_use]
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas: RwLock::new(canvas), issued: AtomicU64::new(0) }
    }

    /// Copy of the currently published canvas.
    #[must_use]
    pub fn snapshot(&self) -> Canvas {
        self.canvas.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Take the next ticket, superseding all earlier ones.
    pub(crate) fn issue_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `ticket` is still the newest issued.
    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }

    /// Supersede every outstanding ticket. Once this returns, no composite
    /// started before it can commit.
    pub(crate) fn invalidate(&self) {
        let _guard = self.write();
        self.issued.fetch_add(1, Ordering::SeqCst);
    }

    /// Publish `canvas` if `ticket` is still the newest issued.
    /// Returns whether it was published.
    pub(crate) fn commit(&self, ticket: u64, canvas: Canvas) -> bool {
        let mut guard = self.write();
        if self.issued.load(Ordering::SeqCst) != ticket {
            return false;
        }
        *guard = canvas;
        true
    }

    fn write(&self) -> RwLockWriteGuard<'_, Canvas> {
        self.canvas.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ImageSource;
    use crate::ports::CrossOrigin;

    fn handle(width: u32, height: u32, color: Rgba<u8>) -> ImageHandle {
        ImageHandle::new(
            RgbaImage::from_pixel(width, height, color),
            ImageSource::Local("test.png".into()),
            CrossOrigin::Anonymous,
        )
    }

    #[test]
    fn new_canvas_is_transparent() {
        let canvas = Canvas::sticker();
        assert_eq!(canvas.width(), CANVAS_SIZE);
        assert_eq!(canvas.height(), CANVAS_SIZE);
        assert!(canvas.pixels().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn fill_then_clear() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill(Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.pixels().get_pixel(3, 3), &Rgba([255, 255, 255, 255]));
        canvas.clear();
        assert_eq!(canvas.pixels().get_pixel(3, 3), &TRANSPARENT);
    }

    #[test]
    fn draw_scales_into_rect() {
        let mut canvas = Canvas::new(16, 16);
        canvas.draw_image(
            &handle(2, 2, Rgba([255, 0, 0, 255])),
            Rect { x: 0, y: 12, width: 4, height: 4 },
        );
        assert_eq!(canvas.pixels().get_pixel(0, 15), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.pixels().get_pixel(3, 12), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.pixels().get_pixel(4, 12), &TRANSPARENT);
        assert_eq!(canvas.pixels().get_pixel(0, 11), &TRANSPARENT);
    }

    #[test]
    fn transparent_image_keeps_background() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill(Rgba([0, 0, 255, 255]));
        canvas.draw_image(&handle(4, 4, TRANSPARENT), canvas.bounds());
        assert_eq!(canvas.pixels().get_pixel(1, 1), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn out_of_bounds_draw_is_clipped() {
        let mut canvas = Canvas::new(4, 4);
        canvas.draw_image(
            &handle(4, 4, Rgba([0, 255, 0, 255])),
            Rect { x: 2, y: 2, width: 4, height: 4 },
        );
        assert_eq!(canvas.pixels().get_pixel(3, 3), &Rgba([0, 255, 0, 255]));
        assert_eq!(canvas.pixels().get_pixel(1, 1), &TRANSPARENT);
    }

    #[test]
    fn png_has_magic_bytes() {
        let png = Canvas::new(2, 2).to_png().unwrap();
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn tainted_canvas_refuses_export() {
        let mut canvas = Canvas::new(4, 4);
        let remote = ImageHandle::new(
            RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 255])),
            ImageSource::Remote("https://img.test/1".into()),
            CrossOrigin::None,
        );
        canvas.draw_image(&remote, canvas.bounds());
        canvas.clear();
        assert!(canvas.is_tainted());
        assert!(matches!(canvas.to_png(), Err(ExportError::Tainted)));
    }

    #[test]
    fn only_newest_ticket_commits() {
        let surface = Surface::new(Canvas::new(1, 1));
        let mut red = Canvas::new(1, 1);
        red.fill(Rgba([255, 0, 0, 255]));
        let mut blue = Canvas::new(1, 1);
        blue.fill(Rgba([0, 0, 255, 255]));

        let older = surface.issue_ticket();
        let newer = surface.issue_ticket();
        assert!(surface.commit(newer, blue.clone()));
        assert!(!surface.commit(older, red));
        assert_eq!(surface.snapshot(), blue);
    }

    #[test]
    fn invalidate_blocks_outstanding_commit() {
        let surface = Surface::new(Canvas::new(1, 1));
        let ticket = surface.issue_ticket();
        surface.invalidate();
        let mut red = Canvas::new(1, 1);
        red.fill(Rgba([255, 0, 0, 255]));
        assert!(!surface.commit(ticket, red));
        assert_eq!(surface.snapshot(), Canvas::new(1, 1));
    }
}
