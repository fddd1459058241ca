//! Live clipboard adapter that pipes images into a platform clipboard tool.

use std::io::ErrorKind;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::ExportError;
use crate::ports::clipboard::{ClipboardFuture, ClipboardWriter};

/// A clipboard tool invocation: program name and arguments before the MIME type.
struct Tool {
    program: &'static str,
    args: &'static [&'static str],
}

/// Tried in order; the first one installed wins.
const TOOLS: &[Tool] = &[
    Tool { program: "wl-copy", args: &["--type"] },
    Tool { program: "xclip", args: &["-selection", "clipboard", "-i", "-t"] },
];

/// Writes clipboard entries through `wl-copy` (Wayland) or `xclip` (X11).
#[derive(Debug, Default)]
pub struct CommandClipboard;

impl CommandClipboard {
    /// Create the adapter. Tool discovery happens on each write.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardWriter for CommandClipboard {
    fn write_image<'a>(&'a self, data: &'a [u8], mime_type: &'a str) -> ClipboardFuture<'a> {
        Box::pin(async move {
            for tool in TOOLS {
                let spawned = Command::new(tool.program)
                    .args(tool.args)
                    .arg(mime_type)
                    .stdin(Stdio::piped())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn();
                let mut child = match spawned {
                    Ok(child) => child,
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        debug!(program = tool.program, "clipboard tool not installed");
                        continue;
                    }
                    Err(e) => return Err(ExportError::Clipboard(format!("{}: {e}", tool.program))),
                };

                if let Some(mut stdin) = child.stdin.take() {
                    stdin
                        .write_all(data)
                        .await
                        .map_err(|e| ExportError::Clipboard(format!("{}: {e}", tool.program)))?;
                }
                // wl-copy forks to serve the selection; only wait for the parent.
                let status = child
                    .wait()
                    .await
                    .map_err(|e| ExportError::Clipboard(format!("{}: {e}", tool.program)))?;
                if !status.success() {
                    return Err(ExportError::Clipboard(format!(
                        "{} exited with {status}",
                        tool.program
                    )));
                }
                debug!(program = tool.program, bytes = data.len(), "clipboard written");
                return Ok(());
            }

            let names: Vec<&str> = TOOLS.iter().map(|t| t.program).collect();
            Err(ExportError::ClipboardUnavailable(format!(
                "install one of: {}",
                names.join(", ")
            )))
        })
    }
}
