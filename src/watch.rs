//! Interactive watch mode: stdin lines drive debounced re-rendering.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::cli::WatchInput;
use crate::compositor::{CompositeOutcome, Compositor};
use crate::error::StickerError;
use crate::exporter::Exporter;
use crate::scheduler::{RenderEvent, RenderScheduler};
use crate::session::LastIdentifier;
use crate::validate::validate_identifier;

/// Everything the watch loop needs.
pub struct Watch<'a> {
    /// Compositor the scheduler drives.
    pub compositor: Arc<Compositor>,
    /// Exporter for `:save` and `:copy`.
    pub exporter: &'a Exporter,
    /// Persisted identifier store.
    pub session: &'a LastIdentifier,
    /// Debounce window.
    pub debounce: Duration,
    /// Preview file rewritten after each drawn render.
    pub preview: PathBuf,
    /// Directory `:save` writes into.
    pub output_dir: PathBuf,
}

impl Watch<'_> {
    /// Run until `input` reaches EOF and the last requested render settled.
    ///
    /// Exports typed while a render is pending wait for it, so they never
    /// read a canvas that is about to be replaced. Failures are reported on
    /// stderr and the loop keeps going.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading `input` fails.
    pub async fn run<R>(self, input: R) -> Result<(), StickerError>
    where
        R: AsyncBufRead + Unpin,
    {
        let (scheduler, mut events) = RenderScheduler::new(Arc::clone(&self.compositor), self.debounce);
        let mut lines = input.lines();
        let mut current = self.session.load().unwrap_or_default();
        let mut queued: Vec<WatchInput> = Vec::new();
        let mut stdin_open = true;
        // Request id of the newest scheduled render, until its event arrives.
        let mut pending = scheduler.schedule(current.clone());

        loop {
            if pending.is_none() {
                for action in queued.drain(..) {
                    self.export(&action, &current).await;
                }
                if !stdin_open {
                    break;
                }
            }

            tokio::select! {
                line = lines.next_line(), if stdin_open => {
                    let Some(line) = line? else {
                        debug!("input closed");
                        stdin_open = false;
                        continue;
                    };
                    match WatchInput::parse(&line) {
                        WatchInput::Identifier(id) => {
                            self.session.remember(&id);
                            let check = if id.is_empty() { Ok(()) } else { validate_identifier(&id) };
                            match check {
                                Ok(()) => pending = scheduler.schedule(id.clone()),
                                Err(e) => eprintln!("Error: {e}"),
                            }
                            current = id;
                        }
                        action => queued.push(action),
                    }
                }
                Some(event) = events.recv() => {
                    if pending == Some(event.request) {
                        pending = None;
                    }
                    self.report(event);
                }
                else => break,
            }
        }

        scheduler.cancel();
        Ok(())
    }

    fn report(&self, event: RenderEvent) {
        let label = if event.identifier.is_empty() { "fallback" } else { event.identifier.as_str() };
        match event.result {
            Ok(CompositeOutcome::Drawn) => {
                match self.exporter.snapshot_png().map_err(StickerError::from).and_then(|png| {
                    std::fs::write(&self.preview, png).map_err(StickerError::from)
                }) {
                    Ok(()) => eprintln!("Rendered {label}: {}", self.preview.display()),
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            Ok(CompositeOutcome::Superseded) => debug!(label, "render superseded"),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    async fn export(&self, action: &WatchInput, identifier: &str) {
        let result = match action {
            WatchInput::Save => save(self.exporter, identifier, &self.output_dir),
            WatchInput::Copy => self.exporter.copy_to_clipboard(identifier).await.map(|()| {
                eprintln!("Copied to clipboard");
            }),
            WatchInput::Identifier(_) => Ok(()),
        };
        if let Err(e) = result {
            eprintln!("Error: {e}");
        }
    }
}

/// Download and announce the saved path.
///
/// # Errors
///
/// Returns whatever [`Exporter::download`] returns.
pub fn save(exporter: &Exporter, identifier: &str, dir: &Path) -> Result<(), StickerError> {
    let path = exporter.download(identifier, dir)?;
    eprintln!("Saved: {}", path.display());
    Ok(())
}
