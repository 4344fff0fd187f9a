//! Client-local persistent key/value state: auth token, theme, dismissed tip.
//!
//! Stored as JSON at `<config_dir>/filepress/prefs.json` and rewritten on
//! every change so values survive restarts.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::capability::{ThemeMode, ThemeStore, TokenStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeMode>,
    #[serde(default)]
    pub dismiss_tip: bool,
}

/// Platform path: `<config_dir>/filepress/prefs.json`.
pub fn prefs_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("filepress").join("prefs.json"))
}

pub struct PrefsStore {
    path: PathBuf,
    prefs: Mutex<Preferences>,
}

impl PrefsStore {
    /// Open the store at `path`. A missing or unreadable file yields defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = load(&path).unwrap_or_default();
        Self {
            path,
            prefs: Mutex::new(prefs),
        }
    }

    pub fn tip_dismissed(&self) -> bool {
        self.lock().dismiss_tip
    }

    pub fn dismiss_tip(&self) -> std::io::Result<()> {
        self.update(|p| p.dismiss_tip = true)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Preferences> {
        // A poisoned lock still holds usable data.
        self.prefs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, f: impl FnOnce(&mut Preferences)) -> std::io::Result<()> {
        let mut prefs = self.lock();
        f(&mut prefs);
        save(&self.path, &prefs)
    }
}

fn load(path: &Path) -> Option<Preferences> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(prefs) => Some(prefs),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable preferences");
            None
        }
    }
}

fn save(path: &Path, prefs: &Preferences) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(prefs).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

impl TokenStore for PrefsStore {
    fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    fn set_token(&self, token: &str) -> std::io::Result<()> {
        let token = token.trim().to_string();
        self.update(|p| p.token = Some(token))
    }

    fn clear_token(&self) -> std::io::Result<()> {
        self.update(|p| p.token = None)
    }
}

impl ThemeStore for PrefsStore {
    fn theme(&self) -> Option<ThemeMode> {
        self.lock().theme
    }

    fn set_theme(&self, mode: ThemeMode) -> std::io::Result<()> {
        self.update(|p| p.theme = Some(mode))
    }
}
