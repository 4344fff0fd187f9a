//! Side-effect seams the file manager calls without knowing the front-end.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Persistent storage for the bearer token.
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str) -> std::io::Result<()>;
    fn clear_token(&self) -> std::io::Result<()>;
}

/// Light or dark colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

/// Persistent storage for the theme preference.
pub trait ThemeStore: Send + Sync {
    fn theme(&self) -> Option<ThemeMode>;
    fn set_theme(&self, mode: ThemeMode) -> std::io::Result<()>;
}

/// User-facing notifications raised by the file manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A file was hidden and will be deleted once `grace` elapses.
    Deleted { filename: String, grace: Duration },
    /// A pending deletion was cancelled.
    Undone { filename: String },
    /// The deferred delete was rejected; the list is being restored.
    DeleteFailed { filename: String, message: String },
    /// A converted file was written to disk.
    Saved { path: PathBuf },
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Destination for downloaded artifacts.
pub trait DownloadSink: Send + Sync {
    /// Store `bytes` under (a variant of) `suggested_name`; returns the path written.
    fn save(&self, suggested_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf>;
}

/// Writes downloads into a directory without overwriting existing files:
/// `a.pdf`, then `a (1).pdf`, `a (2).pdf`, ...
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform download directory, falling back to the working directory.
    pub fn platform_default() -> Self {
        Self::new(dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// `name` itself, then `stem (1).ext`, `stem (2).ext`, ...
    fn candidates(name: &str) -> impl Iterator<Item = String> + '_ {
        let path = Path::new(name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());
        let ext = path.extension().map(|e| e.to_string_lossy().to_string());
        std::iter::once(name.to_string()).chain((1u32..).map(move |n| match &ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        }))
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, suggested_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        // Keep only the final component; the name comes from the server.
        let name = Path::new(suggested_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "download.pdf".to_string());
        std::fs::create_dir_all(&self.dir)?;

        // create_new claims a name atomically.
        for candidate in Self::candidates(&name) {
            let path = self.dir.join(candidate);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(std::io::Error::other(format!("no free file name for {}", name)))
    }
}
