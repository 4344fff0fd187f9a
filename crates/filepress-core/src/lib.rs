//! Client core for the FilePress file service: session and auth gate, the
//! REST client, persisted preferences, and the [`FileManager`] that drives
//! listing, upload, conversion and delete-with-undo.

pub mod api;
pub mod capability;
pub mod config_file;
pub mod error;
pub mod manager;
pub mod mock;
pub mod model;
pub mod prefs;
pub mod scheduler;
pub mod session;

// Re-export for convenience
pub use api::{FileApi, HttpFileApi};
pub use capability::{
    DirectorySink, DownloadSink, Notice, NotificationSink, ThemeMode, ThemeStore, TokenStore,
};
pub use config_file::Settings;
pub use error::{ClientError, Result};
pub use manager::{ClientEvent, DeletePhase, FileManager, TextPreview};
pub use model::{FileRecord, UploadFile, pdf_download_name};
pub use prefs::PrefsStore;
pub use session::{AuthGate, Gate, Session, logout};
