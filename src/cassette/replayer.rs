//! Serves recorded interactions back from a cassette.

use std::path::Path;

use serde_json::Value;

use super::format::{Cassette, Interaction};

/// Hands out each recorded interaction at most once.
///
/// A lookup takes the earliest unused interaction for the port and method
/// whose recorded input equals the given one, so replay does not depend on
/// the order concurrent calls happen to be issued in.
#[derive(Debug)]
pub struct CassetteReplayer {
    interactions: Vec<Interaction>,
    used: Vec<bool>,
}

impl CassetteReplayer {
    /// Create a replayer over a loaded cassette.
    #[must_use]
    pub fn new(cassette: Cassette) -> Self {
        let used = vec![false; cassette.interactions.len()];
        Self { interactions: cassette.interactions, used }
    }

    /// Read and parse a YAML cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette {}: {e}", path.display()))?;
        Ok(Self::new(cassette))
    }

    /// Take the recorded output for a call.
    ///
    /// # Errors
    ///
    /// Returns an error naming the call if no unused interaction matches.
    pub fn take(&mut self, port: &str, method: &str, input: &Value) -> Result<Value, String> {
        let found = self.interactions.iter().enumerate().position(|(i, rec)| {
            !self.used[i] && rec.port == port && rec.method == method && rec.input == *input
        });
        match found {
            Some(i) => {
                self.used[i] = true;
                Ok(self.interactions[i].output.clone())
            }
            None => Err(format!("Cassette has no unused {port}::{method} interaction for {input}")),
        }
    }
}

/// Split a recorded `{"Ok": value}` / `{"Err": message}` output.
///
/// # Errors
///
/// Returns the recorded message for `Err` outputs, or a description of why
/// an `Ok` value could not be deserialized.
pub fn into_result<T: serde::de::DeserializeOwned>(output: Value) -> Result<T, String> {
    if let Some(message) = output.get("Err") {
        return Err(message.as_str().unwrap_or("replayed error").to_string());
    }
    let value = output.get("Ok").cloned().unwrap_or(output);
    serde_json::from_value(value).map_err(|e| format!("Malformed cassette output: {e}"))
}
