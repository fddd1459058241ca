//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the sticker pipeline and an
//! external system. Implementations live in `src/adapters/`.

pub mod clipboard;
pub mod image_fetcher;

pub use clipboard::{ClipboardWriter, PNG_MIME};
pub use image_fetcher::{CrossOrigin, FetchRequest, FetchedImage, ImageFetcher};
