//! In-process fakes shared by unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::{ExportError, LoadError};
use crate::ports::clipboard::ClipboardFuture;
use crate::ports::image_fetcher::FetchFuture;
use crate::ports::{ClipboardWriter, FetchRequest, FetchedImage, ImageFetcher};

/// Encode a solid-colour PNG.
pub fn png_bytes(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, color))
}

/// Encode an arbitrary RGBA image as PNG.
pub fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Fresh per-test scratch directory.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sticker_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

enum Reply {
    Image(Vec<u8>),
    Status(u16),
}

/// Fetcher serving canned replies keyed by URL and recording every call.
#[derive(Default)]
pub struct StubFetcher {
    replies: Mutex<HashMap<String, Reply>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, data: Vec<u8>) {
        self.replies.lock().unwrap().insert(url.to_string(), Reply::Image(data));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.replies.lock().unwrap().insert(url.to_string(), Reply::Status(status));
    }

    /// Hold the reply for `url` back by `delay` (tokio time).
    pub fn delay(&self, url: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(url.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageFetcher for StubFetcher {
    fn fetch(&self, request: &FetchRequest) -> FetchFuture<'_> {
        let url = request.url.clone();
        self.calls.lock().unwrap().push(url.clone());
        let delay = self.delays.lock().unwrap().get(&url).copied();
        let reply = match self.replies.lock().unwrap().get(&url) {
            Some(Reply::Image(data)) => {
                Ok(FetchedImage { data: data.clone(), mime_type: "image/png".into() })
            }
            Some(Reply::Status(status)) => Err(LoadError::Status { url: url.clone(), status: *status }),
            None => Err(LoadError::Status { url: url.clone(), status: 404 }),
        };
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            reply
        })
    }
}

/// Clipboard recording every write, or failing every write when `unavailable`.
#[derive(Default)]
pub struct StubClipboard {
    pub writes: Mutex<Vec<(Vec<u8>, String)>>,
    pub unavailable: bool,
}

impl ClipboardWriter for StubClipboard {
    fn write_image<'a>(&'a self, data: &'a [u8], mime_type: &'a str) -> ClipboardFuture<'a> {
        Box::pin(async move {
            if self.unavailable {
                return Err(ExportError::ClipboardUnavailable("no clipboard in tests".into()));
            }
            self.writes.lock().unwrap().push((data.to_vec(), mime_type.to_string()));
            Ok(())
        })
    }
}
