//! Persistence of the last entered identifier between runs.

use std::path::{Path, PathBuf};

use tracing::warn;

/// File name of the stored identifier inside the state directory.
const LAST_ID_FILE: &str = "last_id";

/// Stores the last entered identifier in a small state file.
#[derive(Debug, Clone)]
pub struct LastIdentifier {
    path: PathBuf,
}

impl LastIdentifier {
    /// Store inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self { path: dir.join(LAST_ID_FILE) }
    }

    /// Store in the default state directory: `STICKER_STATE_DIR`, else
    /// `~/.local/state/avatar-sticker`.
    #[must_use]
    pub fn discover() -> Self {
        Self::in_dir(&default_state_dir())
    }

    /// The stored identifier, if any. Unreadable state counts as none.
    #[must_use]
    pub fn load(&self) -> Option<String> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let id = text.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    /// Remember `identifier`; an empty one clears the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written or removed.
    pub fn save(&self, identifier: &str) -> Result<(), std::io::Error> {
        if identifier.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, identifier)
    }

    /// Like [`LastIdentifier::save`], but only logs failures.
    pub fn remember(&self, identifier: &str) {
        if let Err(e) = self.save(identifier) {
            warn!(path = %self.path.display(), error = %e, "could not persist identifier");
        }
    }
}

fn default_state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STICKER_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local/state/avatar-sticker")
    } else {
        PathBuf::from(".sticker")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::temp_dir;

    #[test]
    fn save_load_and_clear() {
        let dir = temp_dir("session");
        let store = LastIdentifier::in_dir(&dir.join("state"));
        assert_eq!(store.load(), None);

        store.save("12345").unwrap();
        assert_eq!(store.load().as_deref(), Some("12345"));

        store.save("67890").unwrap();
        assert_eq!(store.load().as_deref(), Some("67890"));

        store.save("").unwrap();
        assert_eq!(store.load(), None);
        // Clearing twice is fine.
        store.save("").unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn keeps_partial_input_verbatim() {
        let dir = temp_dir("session_partial");
        let store = LastIdentifier::in_dir(&dir);
        store.remember("123");
        assert_eq!(store.load().as_deref(), Some("123"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
