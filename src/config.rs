//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::compositor::AssetSources;
use crate::scheduler::DEFAULT_DEBOUNCE_MS;

/// Default avatar source; `{id}` is replaced by the identifier.
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://q1.qlogo.cn/g?b=qq&s=640&nk={id}";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Remote avatar source.
    #[serde(default)]
    pub avatar: AvatarConfig,

    /// Local overlay and fallback images.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Re-render behaviour.
    #[serde(default)]
    pub render: RenderConfig,

    /// Export defaults.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Remote avatar source configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Base URL, with an optional `{id}` placeholder.
    pub base_url: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_AVATAR_BASE_URL.to_string() }
    }
}

/// Paths of the fixed local images.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Overlay/mask drawn over the avatar.
    pub overlay: PathBuf,
    /// Image shown when no identifier is entered.
    pub fallback: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self { overlay: PathBuf::from("assets/mask.png"), fallback: PathBuf::from("assets/fallback.png") }
    }
}

/// Debounce settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Quiet period before a re-render runs, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { debounce_ms: DEFAULT_DEBOUNCE_MS }
    }
}

/// Export defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported stickers are written to.
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { output_dir: PathBuf::from(".") }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Avatar base URL, preferring the `STICKER_AVATAR_BASE_URL` environment variable.
    #[must_use]
    pub fn avatar_base_url(&self) -> String {
        std::env::var("STICKER_AVATAR_BASE_URL").unwrap_or_else(|_| self.avatar.base_url.clone())
    }

    /// Debounce window for watch mode.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.render.debounce_ms)
    }

    /// Image sources for the compositor.
    #[must_use]
    pub fn asset_sources(&self) -> AssetSources {
        AssetSources {
            avatar_base_url: self.avatar_base_url(),
            overlay: self.assets.overlay.clone(),
            fallback: self.assets.fallback.clone(),
        }
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `STICKER_CONFIG` environment variable
/// 3. `~/.config/avatar-sticker/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("STICKER_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/avatar-sticker/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/avatar-sticker/config.toml")
    } else {
        PathBuf::from("sticker.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::temp_dir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.avatar.base_url, DEFAULT_AVATAR_BASE_URL);
        assert_eq!(config.assets.overlay, PathBuf::from("assets/mask.png"));
        assert_eq!(config.assets.fallback, PathBuf::from("assets/fallback.png"));
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.render.debounce_ms, 300);
    }

    #[test]
    fn load_valid_toml() {
        let dir = temp_dir("config_valid");
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[avatar]
base_url = "http://localhost:5000/avatar"

[assets]
overlay = "/srv/sticker/mask.png"
fallback = "/srv/sticker/fallback.png"

[render]
debounce_ms = 150

[export]
output_dir = "/tmp/stickers"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.avatar.base_url, "http://localhost:5000/avatar");
        assert_eq!(config.assets.overlay, PathBuf::from("/srv/sticker/mask.png"));
        assert_eq!(config.assets.fallback, PathBuf::from("/srv/sticker/fallback.png"));
        assert_eq!(config.debounce(), Duration::from_millis(150));
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/stickers"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let dir = temp_dir("config_partial");
        let path = dir.join("config.toml");
        std::fs::write(&path, "[assets]\noverlay = \"frame.png\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.assets.overlay, PathBuf::from("frame.png"));
        assert_eq!(config.assets.fallback, PathBuf::from("assets/fallback.png"));
        assert_eq!(config.avatar.base_url, DEFAULT_AVATAR_BASE_URL);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = temp_dir("config_invalid");
        let path = dir.join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
