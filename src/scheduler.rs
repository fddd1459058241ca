//! Debounced re-rendering for rapidly changing input.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::compositor::{CompositeOutcome, Compositor};
use crate::error::CompositeError;

/// Debounce window in milliseconds used when none is configured.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// [`DEFAULT_DEBOUNCE_MS`] as a duration.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(DEFAULT_DEBOUNCE_MS);

/// Result of one executed composite.
#[derive(Debug)]
pub struct RenderEvent {
    /// Id returned by the [`RenderScheduler::schedule`] call that ran.
    pub request: u64,
    /// Identifier the composite ran for.
    pub identifier: String,
    /// What the composite did.
    pub result: Result<CompositeOutcome, CompositeError>,
}

/// State shared between the scheduler and its debounce tasks.
#[derive(Default)]
struct Gate {
    pending: Option<JoinHandle<()>>,
    latest: u64,
    closed: bool,
}

fn lock(gate: &Mutex<Gate>) -> MutexGuard<'_, Gate> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collapses bursts of [`RenderScheduler::schedule`] calls into one composite.
///
/// Only debounce-pending requests are cancelled by a newer call; a composite
/// that already started keeps running and is discarded by the compositor if
/// a newer one has started since.
pub struct RenderScheduler {
    compositor: Arc<Compositor>,
    delay: Duration,
    gate: Arc<Mutex<Gate>>,
    events: mpsc::UnboundedSender<RenderEvent>,
}

impl RenderScheduler {
    /// Create a scheduler and the channel its render events arrive on.
    #[must_use]
    pub fn new(
        compositor: Arc<Compositor>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<RenderEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let scheduler = Self { compositor, delay, gate: Arc::default(), events };
        (scheduler, rx)
    }

    /// Request a composite of `identifier` once input has been quiet for the
    /// debounce window, replacing any pending request.
    ///
    /// Returns the request id carried by the resulting [`RenderEvent`], or
    /// `None` after [`cancel`]. Ids increase with every call. Must be called
    /// from within a tokio runtime.
    ///
    /// [`cancel`]: RenderScheduler::cancel
    pub fn schedule(&self, identifier: impl Into<String>) -> Option<u64> {
        let identifier = identifier.into();
        let mut gate = lock(&self.gate);
        if gate.closed {
            debug!(%identifier, "scheduler closed, request dropped");
            return None;
        }
        if let Some(previous) = gate.pending.take() {
            previous.abort();
        }
        gate.latest += 1;
        let request = gate.latest;

        let shared = Arc::clone(&self.gate);
        let compositor = Arc::clone(&self.compositor);
        let events = self.events.clone();
        let delay = self.delay;
        debug!(%identifier, request, ?delay, "render scheduled");
        gate.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The ticket is taken under the gate lock: either cancel() sees
            // it and invalidates it, or this request sees the gate closed.
            let reserved = {
                let state = lock(&shared);
                if state.closed || state.latest != request {
                    return;
                }
                compositor.reserve(&identifier)
            };
            // Past the gate: the composite runs detached so a later
            // schedule() only aborts the wait, never the work.
            tokio::spawn(async move {
                let result = match reserved {
                    Ok(ticket) => compositor.composite_reserved(&identifier, ticket).await,
                    Err(e) => Err(e),
                };
                let _ = events.send(RenderEvent { request, identifier, result });
            });
        }));
        Some(request)
    }

    /// Drop the pending request and stop accepting new ones. Composites
    /// already in flight can no longer publish. Safe to call repeatedly.
    pub fn cancel(&self) {
        let mut gate = lock(&self.gate);
        let was_open = !std::mem::replace(&mut gate.closed, true);
        if let Some(handle) = gate.pending.take() {
            handle.abort();
        }
        if was_open {
            debug!("render scheduler cancelled");
            self.compositor.invalidate();
        }
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
