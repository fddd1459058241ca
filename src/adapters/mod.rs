//! Adapter implementations for port traits.
//!
//! - `live/` - HTTP fetching and the system clipboard
//! - `recording/` - Record avatar fetches to cassettes
//! - `replaying/` - Replay avatar fetches from cassettes

pub mod live;
pub mod recording;
pub mod replaying;
