//! The file manager: list, upload, convert and delete-with-undo.
//!
//! [`FileManager`] owns all client-side state and is only touched from the UI
//! task. Network work runs on spawned tokio tasks that report back as
//! [`ClientEvent`]s on an unbounded channel; the UI loop hands each event to
//! [`FileManager::handle_event`], which is the only place results are applied.
//!
//! Deletion is optimistic. The row disappears at once and the real `DELETE`
//! is deferred by a grace period, during which [`FileManager::undo`] can
//! cancel it:
//!
//! ```text
//! request_delete ─► Removed ──undo──────────────► Undone    (row re-fetched)
//!                      │
//!                   timer fires
//!                      ▼
//!                  Committing ──2xx──► Committed
//!                      └──────error──► Failed    (row re-fetched, error shown)
//! ```

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::api::FileApi;
use crate::capability::{DownloadSink, Notice, NotificationSink};
use crate::error::{ClientError, Result};
use crate::model::{FileRecord, UploadFile, UploadResponse, pdf_download_name};
use crate::scheduler::DeferredTask;

/// Results flowing from spawned network tasks back to the UI task.
#[derive(Debug)]
pub enum ClientEvent {
    FilesLoaded(Result<Vec<FileRecord>>),
    UploadFinished(Result<UploadResponse>),
    ConversionFinished {
        filename: String,
        /// Last step attempted; picks the fallback error message.
        stage: ConvertStage,
        result: Result<PathBuf>,
    },
    /// The grace period elapsed and the `DELETE` request is being sent.
    DeleteStarted { filename: String },
    DeleteCommitted {
        filename: String,
        result: Result<()>,
    },
    TextParsed {
        filename: String,
        result: Result<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertStage {
    Convert,
    Download,
    Save,
}

impl ConvertStage {
    fn fallback_message(self) -> &'static str {
        match self {
            ConvertStage::Convert => "Conversion failed",
            ConvertStage::Download | ConvertStage::Save => "Download failed",
        }
    }
}

/// Lifecycle of one optimistic deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    /// Hidden locally; the deferred delete can still be cancelled.
    Removed,
    /// Timer fired; the `DELETE` is in flight and can no longer be undone.
    Committing,
    Undone,
    Committed,
    /// The server rejected the delete; the row is restored from the server.
    Failed,
}

/// Inputs that move a deletion between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteInput {
    UndoRequested,
    TimerFired,
    ServerAccepted,
    ServerRejected,
}

impl DeletePhase {
    /// Next phase for `input`, or `None` if the transition is not allowed.
    pub fn on(self, input: DeleteInput) -> Option<DeletePhase> {
        match (self, input) {
            (DeletePhase::Removed, DeleteInput::UndoRequested) => Some(DeletePhase::Undone),
            (DeletePhase::Removed, DeleteInput::TimerFired) => Some(DeletePhase::Committing),
            // The started event can arrive after the result on a fast server.
            (DeletePhase::Removed, DeleteInput::ServerAccepted)
            | (DeletePhase::Committing, DeleteInput::ServerAccepted) => {
                Some(DeletePhase::Committed)
            }
            (DeletePhase::Removed, DeleteInput::ServerRejected)
            | (DeletePhase::Committing, DeleteInput::ServerRejected) => Some(DeletePhase::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DeletePhase::Undone | DeletePhase::Committed | DeletePhase::Failed
        )
    }
}

/// A deletion waiting out its grace period or its server reply.
#[derive(Debug)]
pub struct PendingDeletion {
    pub phase: DeletePhase,
    task: DeferredTask,
}

/// Extracted PDF text for the preview screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPreview {
    pub filename: String,
    pub text: String,
}

pub struct FileManager {
    api: Arc<dyn FileApi>,
    downloads: Arc<dyn DownloadSink>,
    notifier: Arc<dyn NotificationSink>,
    events: mpsc::UnboundedSender<ClientEvent>,
    grace: Duration,

    files: Vec<FileRecord>,
    expanded: HashSet<String>,
    pending: HashMap<String, PendingDeletion>,
    /// Filenames in deletion order; `undo` walks it from the back.
    delete_order: Vec<String>,
    busy: Option<String>,
    status: Option<String>,
    preview: Option<TextPreview>,
    /// Events still owed by spawned or scheduled tasks.
    inflight: usize,
    loaded: bool,
}

impl FileManager {
    /// Create a manager and the receiver its tasks report to.
    pub fn new(
        api: Arc<dyn FileApi>,
        downloads: Arc<dyn DownloadSink>,
        notifier: Arc<dyn NotificationSink>,
        grace: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let manager = Self {
            api,
            downloads,
            notifier,
            events,
            grace,
            files: Vec::new(),
            expanded: HashSet::new(),
            pending: HashMap::new(),
            delete_order: Vec::new(),
            busy: None,
            status: None,
            preview: None,
            inflight: 0,
            loaded: false,
        };
        (manager, rx)
    }

    // ── State accessors ──────────────────────────────────────────────

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn file(&self, filename: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.filename == filename)
    }

    /// True once the first successful fetch has arrived.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn busy(&self) -> Option<&str> {
        self.busy.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn preview(&self) -> Option<&TextPreview> {
        self.preview.as_ref()
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn inflight(&self) -> usize {
        self.inflight
    }

    pub fn delete_phase(&self, filename: &str) -> Option<DeletePhase> {
        self.pending.get(filename).map(|p| p.phase)
    }

    pub fn pending_deletions(&self) -> impl Iterator<Item = &PendingDeletion> {
        self.pending.values()
    }

    /// The deletion an undo would revert right now.
    pub fn last_deleted(&self) -> Option<&str> {
        self.delete_order
            .iter()
            .rev()
            .find(|f| self.delete_phase(f) == Some(DeletePhase::Removed))
            .map(String::as_str)
    }

    // ── Row expansion ────────────────────────────────────────────────

    pub fn is_expanded(&self, filename: &str) -> bool {
        self.expanded.contains(filename)
    }

    /// Flip the detail row for `filename`; returns the new state.
    pub fn toggle_expanded(&mut self, filename: &str) -> bool {
        if self.expanded.remove(filename) {
            false
        } else {
            self.expanded.insert(filename.to_string());
            true
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ClientEvent> + Send + 'static,
    {
        self.inflight += 1;
        let tx = self.events.clone();
        tokio::spawn(async move {
            let _ = tx.send(task.await);
        });
    }

    /// Reload the list from the server.
    pub fn fetch_files(&mut self) {
        let api = self.api.clone();
        self.spawn(async move { ClientEvent::FilesLoaded(api.list_files().await) });
    }

    /// Upload one file. The list is re-fetched only if the upload succeeds.
    pub fn upload(&mut self, file: UploadFile) {
        tracing::info!(name = %file.name, bytes = file.bytes.len(), "uploading");
        self.status = Some(format!("Uploading {} \u{2026}", file.name));
        let api = self.api.clone();
        self.spawn(async move { ClientEvent::UploadFinished(api.upload(&file).await) });
    }

    /// Upload the first of `paths`; any others are ignored.
    /// Returns the path that was taken, if any.
    pub fn upload_paths(&mut self, paths: &[PathBuf]) -> Option<PathBuf> {
        let path = paths.first()?.clone();
        if paths.len() > 1 {
            tracing::debug!(ignored = paths.len() - 1, "multiple files dropped, using the first");
        }
        let name = display_name(&path);
        self.status = Some(format!("Uploading {} \u{2026}", name));
        let api = self.api.clone();
        let read_path = path.clone();
        self.spawn(async move {
            let result = async {
                let bytes = tokio::fs::read(&read_path).await?;
                let file = UploadFile::new(name, bytes);
                tracing::info!(name = %file.name, bytes = file.bytes.len(), "uploading");
                api.upload(&file).await
            }
            .await;
            ClientEvent::UploadFinished(result)
        });
        Some(path)
    }

    /// Convert an image to PDF and save the result through the download sink.
    ///
    /// Refused for PDFs and while another conversion is running.
    pub fn convert(&mut self, filename: &str) -> Result<()> {
        if self.file(filename).is_some_and(FileRecord::is_pdf) {
            return Err(ClientError::NotConvertible(filename.to_string()));
        }
        if let Some(busy) = &self.busy {
            self.status = Some(format!("Still converting {}", busy));
            return Ok(());
        }

        self.busy = Some(filename.to_string());
        self.status = Some(format!("Converting {} \u{2026}", filename));

        let api = self.api.clone();
        let downloads = self.downloads.clone();
        let filename = filename.to_string();
        self.spawn(async move {
            let mut stage = ConvertStage::Convert;
            let result = async {
                let reply = api.convert(&filename).await?;
                if let Some(msg) = &reply.message {
                    tracing::debug!(filename = %filename, message = %msg, "convert reply");
                }
                let url = reply.download_url.ok_or(ClientError::MissingDownloadUrl)?;

                stage = ConvertStage::Download;
                let bytes = api.download(&url).await?;

                stage = ConvertStage::Save;
                let name = pdf_download_name(&filename);
                let path = tokio::task::spawn_blocking(move || downloads.save(&name, &bytes))
                    .await
                    .map_err(std::io::Error::other)??;
                Ok::<_, ClientError>(path)
            }
            .await;
            ClientEvent::ConversionFinished {
                filename,
                stage,
                result,
            }
        });
        Ok(())
    }

    /// Hide `filename` and schedule its deletion after the grace period.
    /// Call only after the user confirmed. Returns `false` if the file is not
    /// listed or already being deleted.
    pub fn request_delete(&mut self, filename: &str) -> bool {
        if self.pending.contains_key(filename) {
            self.status = Some(format!("{} is already being deleted", filename));
            return false;
        }
        let Some(pos) = self.files.iter().position(|f| f.filename == filename) else {
            return false;
        };
        self.files.remove(pos);

        let api = self.api.clone();
        let tx = self.events.clone();
        let name = filename.to_string();
        let task = DeferredTask::spawn(self.grace, move || async move {
            let _ = tx.send(ClientEvent::DeleteStarted {
                filename: name.clone(),
            });
            let result = api.delete(&name).await;
            let _ = tx.send(ClientEvent::DeleteCommitted {
                filename: name,
                result,
            });
        });

        tracing::info!(filename, grace_ms = self.grace.as_millis() as u64, "delete scheduled");
        self.pending.insert(
            filename.to_string(),
            PendingDeletion {
                phase: DeletePhase::Removed,
                task,
            },
        );
        self.delete_order.push(filename.to_string());
        self.inflight += 1;
        self.notifier.notify(Notice::Deleted {
            filename: filename.to_string(),
            grace: self.grace,
        });
        true
    }

    /// Cancel the most recent deletion that is still in its grace period and
    /// restore the list from the server. Returns the restored filename.
    pub fn undo(&mut self) -> Option<String> {
        loop {
            let filename = self.last_deleted()?.to_string();
            let entry = self.pending.get_mut(&filename)?;
            if entry.task.cancel() {
                self.advance(&filename, DeleteInput::UndoRequested);
                self.inflight = self.inflight.saturating_sub(1);
                tracing::info!(filename = %filename, "delete undone");
                self.notifier.notify(Notice::Undone {
                    filename: filename.clone(),
                });
                self.fetch_files();
                return Some(filename);
            }
            // Fired between the last event and now; try an older one.
            self.advance(&filename, DeleteInput::TimerFired);
        }
    }

    /// Send every deletion still in its grace period right away. Used before
    /// quitting so confirmed deletions are not lost. Returns how many were sent.
    pub fn flush_deletions(&mut self) -> usize {
        let names: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, p)| p.phase == DeletePhase::Removed)
            .map(|(f, _)| f.clone())
            .collect();
        let mut sent = 0;
        for filename in names {
            let cancelled = self
                .pending
                .get(&filename)
                .is_some_and(|p| p.task.cancel());
            self.advance(&filename, DeleteInput::TimerFired);
            if !cancelled {
                continue;
            }
            let api = self.api.clone();
            let tx = self.events.clone();
            tokio::spawn(async move {
                let result = api.delete(&filename).await;
                let _ = tx.send(ClientEvent::DeleteCommitted { filename, result });
            });
            sent += 1;
        }
        sent
    }

    /// Fetch the extracted text of a PDF for preview.
    pub fn preview_text(&mut self, filename: &str) {
        self.status = Some(format!("Reading {} \u{2026}", filename));
        let api = self.api.clone();
        let filename = filename.to_string();
        self.spawn(async move {
            let result = api.parse_text(&filename).await;
            ClientEvent::TextParsed { filename, result }
        });
    }

    // ── Event application ────────────────────────────────────────────

    fn advance(&mut self, filename: &str, input: DeleteInput) -> Option<DeletePhase> {
        let entry = self.pending.get_mut(filename)?;
        let next = entry.phase.on(input)?;
        tracing::debug!(filename, from = ?entry.phase, to = ?next, "delete phase");
        entry.phase = next;
        if next.is_terminal() {
            self.pending.remove(filename);
            self.delete_order.retain(|f| f != filename);
        }
        Some(next)
    }

    /// Apply the result of a finished task.
    pub fn handle_event(&mut self, event: ClientEvent) {
        if !matches!(event, ClientEvent::DeleteStarted { .. }) {
            self.inflight = self.inflight.saturating_sub(1);
        }

        match event {
            ClientEvent::FilesLoaded(Ok(files)) => {
                tracing::debug!(count = files.len(), "file list loaded");
                self.files = files;
                self.loaded = true;
            }
            ClientEvent::FilesLoaded(Err(e)) => {
                tracing::warn!(error = %e, "file list fetch failed");
                self.status = Some(e.user_message("Fetch failed"));
            }
            ClientEvent::UploadFinished(Ok(reply)) => {
                tracing::info!(filename = %reply.filename, "upload complete");
                self.status = Some(format!("Uploaded {}", reply.filename));
                self.fetch_files();
            }
            ClientEvent::UploadFinished(Err(e)) => {
                tracing::warn!(error = %e, "upload failed");
                self.status = Some(e.user_message("Upload failed"));
            }
            ClientEvent::ConversionFinished {
                filename,
                stage,
                result,
            } => {
                if self.busy.as_deref() == Some(filename.as_str()) {
                    self.busy = None;
                }
                match result {
                    Ok(path) => {
                        tracing::info!(filename = %filename, path = %path.display(), "conversion saved");
                        self.status = Some("Conversion complete".to_string());
                        self.notifier.notify(Notice::Saved { path });
                    }
                    Err(e) => {
                        tracing::warn!(filename = %filename, ?stage, error = %e, "conversion failed");
                        self.status = Some(e.user_message(stage.fallback_message()));
                    }
                }
            }
            ClientEvent::DeleteStarted { filename } => {
                self.advance(&filename, DeleteInput::TimerFired);
            }
            ClientEvent::DeleteCommitted {
                filename,
                result: Ok(()),
            } => {
                self.advance(&filename, DeleteInput::ServerAccepted);
                // A re-fetch during the grace period may have brought it back.
                self.files.retain(|f| f.filename != filename);
                self.expanded.remove(&filename);
                tracing::info!(filename = %filename, "delete committed");
            }
            ClientEvent::DeleteCommitted {
                filename,
                result: Err(e),
            } => {
                self.advance(&filename, DeleteInput::ServerRejected);
                let message = e.user_message("Delete failed");
                tracing::warn!(filename = %filename, error = %e, "delete rejected, restoring list");
                self.status = Some(message.clone());
                self.notifier
                    .notify(Notice::DeleteFailed { filename, message });
                self.fetch_files();
            }
            ClientEvent::TextParsed {
                filename,
                result: Ok(text),
            } => {
                self.status = None;
                self.preview = Some(TextPreview { filename, text });
            }
            ClientEvent::TextParsed {
                filename,
                result: Err(e),
            } => {
                tracing::warn!(filename = %filename, error = %e, "parse failed");
                self.status = Some(e.user_message("Parse failed"));
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_transitions() {
        use DeleteInput::*;
        use DeletePhase::*;
        assert_eq!(Removed.on(UndoRequested), Some(Undone));
        assert_eq!(Removed.on(TimerFired), Some(Committing));
        assert_eq!(Committing.on(ServerAccepted), Some(Committed));
        assert_eq!(Committing.on(ServerRejected), Some(Failed));
        assert_eq!(Committing.on(UndoRequested), None);
        assert_eq!(Undone.on(TimerFired), None);
        assert_eq!(Committed.on(ServerRejected), None);
    }

    #[test]
    fn terminal_phases() {
        assert!(!DeletePhase::Removed.is_terminal());
        assert!(!DeletePhase::Committing.is_terminal());
        assert!(DeletePhase::Undone.is_terminal());
        assert!(DeletePhase::Committed.is_terminal());
        assert!(DeletePhase::Failed.is_terminal());
    }

    #[test]
    fn display_name_uses_final_component() {
        assert_eq!(display_name(Path::new("/tmp/dir/a b.png")), "a b.png");
    }
}
