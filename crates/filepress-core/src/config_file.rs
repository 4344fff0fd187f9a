use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UNDO_GRACE_SECS: u64 = 5;
pub const DEFAULT_FPS: u32 = 30;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub behavior: Option<BehaviorConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub login_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorConfig {
    pub undo_grace_secs: Option<u64>,
    pub download_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
    pub fps: Option<u32>,
}

/// Platform config directory path: `<config_dir>/filepress/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("filepress").join("config.toml"))
}

/// Load config by cascading CWD `.filepress.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".filepress.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        server: Some(ServerConfig {
            base_url: overlay
                .server
                .as_ref()
                .and_then(|s| s.base_url.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.base_url.clone())),
            login_url: overlay
                .server
                .as_ref()
                .and_then(|s| s.login_url.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.login_url.clone())),
            timeout_secs: overlay
                .server
                .as_ref()
                .and_then(|s| s.timeout_secs)
                .or_else(|| base.server.as_ref().and_then(|s| s.timeout_secs)),
        }),
        behavior: Some(BehaviorConfig {
            undo_grace_secs: overlay
                .behavior
                .as_ref()
                .and_then(|b| b.undo_grace_secs)
                .or_else(|| base.behavior.as_ref().and_then(|b| b.undo_grace_secs)),
            download_dir: overlay
                .behavior
                .as_ref()
                .and_then(|b| b.download_dir.clone())
                .or_else(|| {
                    base.behavior
                        .as_ref()
                        .and_then(|b| b.download_dir.clone())
                }),
        }),
        display: Some(DisplayConfig {
            theme: overlay
                .display
                .as_ref()
                .and_then(|d| d.theme.clone())
                .or_else(|| base.display.as_ref().and_then(|d| d.theme.clone())),
            fps: overlay
                .display
                .as_ref()
                .and_then(|d| d.fps)
                .or_else(|| base.display.as_ref().and_then(|d| d.fps)),
        }),
    }
}

/// Fully resolved settings after applying defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub login_url: String,
    pub timeout: Duration,
    pub undo_grace: Duration,
    pub download_dir: Option<PathBuf>,
    pub theme: Option<String>,
    pub fps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_file(&ConfigFile::default())
    }
}

impl Settings {
    /// Fill every unset field with its default. The login page lives at
    /// `<base_url>/login` unless configured otherwise.
    pub fn from_file(file_cfg: &ConfigFile) -> Self {
        let server = file_cfg.server.clone().unwrap_or_default();
        let behavior = file_cfg.behavior.clone().unwrap_or_default();
        let display = file_cfg.display.clone().unwrap_or_default();

        let base_url = server
            .base_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let login_url = server
            .login_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("{}/login", base_url));

        Self {
            base_url,
            login_url,
            timeout: Duration::from_secs(server.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1)),
            undo_grace: Duration::from_secs(
                behavior.undo_grace_secs.unwrap_or(DEFAULT_UNDO_GRACE_SECS),
            ),
            download_dir: behavior
                .download_dir
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            theme: display.theme.filter(|t| !t.is_empty()),
            fps: display.fps.unwrap_or(DEFAULT_FPS).clamp(1, 120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let s = Settings::default();
        assert_eq!(s.base_url, "http://localhost:5000");
        assert_eq!(s.login_url, "http://localhost:5000/login");
        assert_eq!(s.undo_grace, Duration::from_secs(5));
        assert_eq!(s.timeout, Duration::from_secs(30));
        assert_eq!(s.fps, 30);
        assert!(s.download_dir.is_none());
    }

    #[test]
    fn login_url_follows_base_url() {
        let toml_str = "[server]\nbase_url = \"https://files.example.com/\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let s = Settings::from_file(&parsed);
        assert_eq!(s.base_url, "https://files.example.com");
        assert_eq!(s.login_url, "https://files.example.com/login");
    }

    #[test]
    fn partial_sections_deserialize() {
        let toml_str = "[behavior]\nundo_grace_secs = 10\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert!(parsed.server.is_none());
        assert_eq!(
            Settings::from_file(&parsed).undo_grace,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            server: Some(ServerConfig {
                base_url: Some("http://base".to_string()),
                timeout_secs: Some(9),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            server: Some(ServerConfig {
                base_url: Some("http://overlay".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let server = merged.server.unwrap();
        assert_eq!(server.base_url.unwrap(), "http://overlay");
        assert_eq!(server.timeout_secs, Some(9));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            behavior: Some(BehaviorConfig {
                download_dir: Some("/tmp/dl".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.behavior.unwrap().download_dir.unwrap(), "/tmp/dl");
    }

    #[test]
    fn fps_is_clamped() {
        let cfg = ConfigFile {
            display: Some(DisplayConfig {
                fps: Some(1000),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(Settings::from_file(&cfg).fps, 120);
    }
}
