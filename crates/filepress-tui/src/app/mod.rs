mod update;
mod update_file_picker;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use filepress_core::{ClientEvent, FileManager, FileRecord, Notice, PrefsStore};

use crate::notices::NoticeQueue;
use crate::theme::Theme;

/// How long non-deletion toasts stay on screen.
const TOAST_TTL: Duration = Duration::from_secs(4);

/// Which screen is currently displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Files,
    FilePicker,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

/// A transient message shown above the footer.
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub expires_at: Instant,
}

/// State for the file picker screen.
#[derive(Debug, Clone)]
pub struct FilePickerState {
    /// Current directory being browsed.
    pub current_dir: PathBuf,
    /// Entries in the current directory (dirs first, then files).
    pub entries: Vec<FileEntry>,
    pub cursor: usize,
}

/// A single entry in the file picker.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// Image the server can turn into a PDF.
    pub is_image: bool,
    pub is_pdf: bool,
}

impl FilePickerState {
    pub fn new() -> Self {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::at(current_dir)
    }

    pub fn at(dir: PathBuf) -> Self {
        let mut state = Self {
            current_dir: dir,
            entries: Vec::new(),
            cursor: 0,
        };
        state.refresh_entries();
        state
    }

    /// Refresh the entries list from the current directory.
    pub fn refresh_entries(&mut self) {
        let mut entries = Vec::new();

        if let Some(parent) = self.current_dir.parent() {
            entries.push(FileEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
                is_image: false,
                is_pdf: false,
            });
        }

        if let Ok(read_dir) = std::fs::read_dir(&self.current_dir) {
            let mut dirs = Vec::new();
            let mut files = Vec::new();

            for entry in read_dir.flatten() {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().to_string();

                // Skip hidden files/dirs
                if name.starts_with('.') {
                    continue;
                }

                if path.is_dir() {
                    dirs.push(FileEntry {
                        name,
                        path,
                        is_dir: true,
                        is_image: false,
                        is_pdf: false,
                    });
                } else {
                    let ext = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(str::to_ascii_lowercase);
                    let ext = ext.as_deref();
                    files.push(FileEntry {
                        name,
                        path,
                        is_dir: false,
                        is_image: matches!(ext, Some("png" | "jpg" | "jpeg")),
                        is_pdf: ext == Some("pdf"),
                    });
                }
            }

            dirs.sort_by_key(|a| a.name.to_lowercase());
            files.sort_by_key(|a| a.name.to_lowercase());

            entries.extend(dirs);
            entries.extend(files);
        }

        self.entries = entries;
        self.cursor = 0;
    }

    /// Enter the directory at cursor, or return false if not a directory.
    pub fn enter_directory(&mut self) -> bool {
        if let Some(entry) = self.entries.get(self.cursor)
            && entry.is_dir
        {
            self.current_dir = entry.path.clone();
            self.refresh_entries();
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<&FileEntry> {
        self.entries.get(self.cursor)
    }
}

/// Main application state.
pub struct App {
    pub screen: Screen,
    pub manager: FileManager,
    pub prefs: Arc<PrefsStore>,
    pub(crate) notices: Arc<NoticeQueue>,
    pub theme: Theme,
    /// Server shown in the header.
    pub server_label: String,

    pub cursor: usize,
    pub tick: usize,
    pub should_quit: bool,
    pub confirm_quit: bool,
    /// Filename awaiting a y/n answer before it is deleted.
    pub confirm_delete: Option<String>,
    pub show_help: bool,
    /// First-run tip line; hidden for good once dismissed.
    pub show_tip: bool,
    /// Set with `should_quit` when the user asked to log out.
    pub logout_requested: bool,
    pub preview_scroll: u16,
    pub toast: Option<Toast>,
    /// Height of the visible table area (set on resize, used for page up/down).
    pub visible_rows: usize,
    /// First file row drawn in the table.
    pub scroll_offset: usize,
    /// Screen row → file index for the last rendered table (mouse clicks).
    pub row_hits: Vec<(u16, usize)>,
    /// Last table area rendered.
    pub file_picker: FilePickerState,
}

impl App {
    pub fn new(
        manager: FileManager,
        prefs: Arc<PrefsStore>,
        notices: Arc<NoticeQueue>,
        theme: Theme,
        server_label: impl Into<String>,
    ) -> Self {
        let show_tip = !prefs.tip_dismissed();
        Self {
            screen: Screen::Files,
            manager,
            prefs,
            notices,
            theme,
            server_label: server_label.into(),
            cursor: 0,
            tick: 0,
            should_quit: false,
            confirm_quit: false,
            confirm_delete: None,
            show_help: false,
            show_tip,
            logout_requested: false,
            preview_scroll: 0,
            toast: None,
            visible_rows: 20,
            scroll_offset: 0,
            row_hits: Vec::new(),
            file_picker: FilePickerState::new(),
        }
    }

    /// The file under the cursor.
    pub fn selected(&self) -> Option<&FileRecord> {
        self.manager.files().get(self.cursor)
    }

    pub fn selected_name(&self) -> Option<String> {
        self.selected().map(|f| f.filename.clone())
    }

    /// Apply a result from a network task.
    pub fn handle_client_event(&mut self, event: ClientEvent) {
        let opens_preview = matches!(&event, ClientEvent::TextParsed { result: Ok(_), .. });
        self.manager.handle_event(event);
        self.clamp_cursor();
        if opens_preview && self.manager.preview().is_some() {
            self.preview_scroll = 0;
            self.screen = Screen::Preview;
        }
    }

    pub(crate) fn clamp_cursor(&mut self) {
        let len = self.manager.files().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    /// Move queued notices into the toast line and expire old toasts.
    pub(crate) fn drain_notices(&mut self) {
        for notice in self.notices.drain() {
            self.toast = Some(toast_for(&notice));
        }
        if let Some(toast) = &self.toast
            && Instant::now() >= toast.expires_at
        {
            self.toast = None;
        }
    }

    pub fn view(&mut self, f: &mut ratatui::Frame) {
        let area = f.area();

        match self.screen {
            Screen::Files => crate::view::files::render_in(f, self, area),
            Screen::FilePicker => crate::view::file_picker::render_in(f, self, area),
            Screen::Preview => crate::view::preview::render_in(f, self, area),
        }

        if let Some(filename) = &self.confirm_delete {
            crate::view::confirm::render_delete(f, &self.theme, filename);
        }
        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
        if self.confirm_quit {
            let pending = self.manager.pending_deletions().count();
            crate::view::confirm::render_quit(f, &self.theme, pending);
        }
    }
}

fn toast_for(notice: &Notice) -> Toast {
    let now = Instant::now();
    let (text, kind, ttl) = match notice {
        Notice::Deleted { filename, grace } => (
            format!(
                "Deleted {} \u{00b7} press u to undo ({}s)",
                filename,
                grace.as_secs()
            ),
            ToastKind::Info,
            *grace,
        ),
        Notice::Undone { filename } => (format!("Restored {}", filename), ToastKind::Info, TOAST_TTL),
        Notice::DeleteFailed { filename, message } => (
            format!("Could not delete {}: {}", filename, message),
            ToastKind::Error,
            TOAST_TTL,
        ),
        Notice::Saved { path } => (
            format!("Saved {}", path.display()),
            ToastKind::Info,
            TOAST_TTL,
        ),
    };
    Toast {
        text,
        kind,
        expires_at: now + ttl,
    }
}

#[cfg(test)]
mod tests;
