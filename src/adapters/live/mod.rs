//! Live adapters talking to the network and the desktop.

pub mod clipboard;
pub mod http;
