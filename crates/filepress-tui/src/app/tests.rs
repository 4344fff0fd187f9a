use std::sync::Arc;
use std::time::Duration;

use filepress_core::mock::{ApiCall, MockApi, Op, record};
use filepress_core::{ClientEvent, DeletePhase, DirectorySink, FileManager, ThemeMode, ThemeStore};
use tokio::sync::mpsc::UnboundedReceiver;

use super::*;
use crate::action::Action;

struct Fixture {
    app: App,
    rx: UnboundedReceiver<ClientEvent>,
    api: Arc<MockApi>,
    dir: tempfile::TempDir,
}

/// An App backed by an in-memory server holding `files`, with preferences
/// and downloads in a temp directory.
fn fixture(files: &[(&str, &str)]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::new(
        files
            .iter()
            .map(|(name, mime)| record(name, 4096, mime))
            .collect(),
    ));
    let notices = Arc::new(NoticeQueue::default());
    let (manager, rx) = FileManager::new(
        api.clone(),
        Arc::new(DirectorySink::new(dir.path().join("downloads"))),
        notices.clone(),
        Duration::from_secs(5),
    );
    let prefs = Arc::new(PrefsStore::open(dir.path().join("prefs.json")));
    let app = App::new(manager, prefs, notices, Theme::light(), "http://test");
    Fixture { app, rx, api, dir }
}

impl Fixture {
    async fn settle(&mut self) {
        while self.app.manager.inflight() > 0 {
            let event = self.rx.recv().await.unwrap();
            self.app.handle_client_event(event);
        }
    }

    async fn loaded(files: &[(&str, &str)]) -> Self {
        let mut fx = fixture(files);
        fx.app.manager.fetch_files();
        fx.settle().await;
        fx
    }

    fn names(&self) -> Vec<String> {
        self.app
            .manager
            .files()
            .iter()
            .map(|f| f.filename.clone())
            .collect()
    }
}

const THREE: &[(&str, &str)] = &[
    ("a.png", "image/png"),
    ("b.jpg", "image/jpeg"),
    ("c.pdf", "application/pdf"),
];

// ── Startup state ────────────────────────────────────────────────

#[test]
fn starts_on_files_screen_with_tip() {
    let fx = fixture(&[]);
    assert_eq!(fx.app.screen, Screen::Files);
    assert!(fx.app.show_tip);
    assert!(!fx.app.should_quit);
}

#[test]
fn dismissed_tip_stays_dismissed() {
    let mut fx = fixture(&[]);
    fx.app.update(Action::DismissTip);
    assert!(!fx.app.show_tip);

    let reopened = PrefsStore::open(fx.dir.path().join("prefs.json"));
    assert!(reopened.tip_dismissed());
}

#[test]
fn theme_toggle_is_saved() {
    let mut fx = fixture(&[]);
    assert_eq!(fx.app.theme.mode, ThemeMode::Light);
    fx.app.update(Action::ToggleTheme);
    assert_eq!(fx.app.theme.mode, ThemeMode::Dark);
    assert_eq!(fx.app.prefs.theme(), Some(ThemeMode::Dark));

    fx.app.update(Action::ToggleTheme);
    assert_eq!(fx.app.prefs.theme(), Some(ThemeMode::Light));
}

// ── Overlays ─────────────────────────────────────────────────────

#[test]
fn quit_requires_confirmation() {
    let mut fx = fixture(&[]);
    assert!(!fx.app.update(Action::Quit));
    assert!(fx.app.confirm_quit);

    fx.app.update(Action::NavigateBack);
    assert!(!fx.app.confirm_quit);
    assert!(!fx.app.should_quit);

    fx.app.update(Action::Quit);
    assert!(fx.app.update(Action::Quit));
}

#[test]
fn help_swallows_other_keys() {
    let mut fx = fixture(&[]);
    fx.app.update(Action::ToggleHelp);
    assert!(fx.app.show_help);

    fx.app.update(Action::ToggleTheme);
    assert_eq!(fx.app.theme.mode, ThemeMode::Light);

    fx.app.update(Action::NavigateBack);
    assert!(!fx.app.show_help);
}

#[test]
fn logout_quits_and_flags() {
    let mut fx = fixture(&[]);
    assert!(fx.app.update(Action::Logout));
    assert!(fx.app.logout_requested);
}

#[test]
fn file_picker_opens_and_closes() {
    let mut fx = fixture(&[]);
    fx.app.update(Action::AddFiles);
    assert_eq!(fx.app.screen, Screen::FilePicker);
    fx.app.update(Action::NavigateBack);
    assert_eq!(fx.app.screen, Screen::Files);
}

// ── Navigation and expansion ─────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn cursor_stays_in_bounds() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::MoveUp);
    assert_eq!(fx.app.cursor, 0);
    for _ in 0..10 {
        fx.app.update(Action::MoveDown);
    }
    assert_eq!(fx.app.cursor, 2);
    fx.app.update(Action::GoTop);
    assert_eq!(fx.app.cursor, 0);
    fx.app.update(Action::GoBottom);
    assert_eq!(fx.app.cursor, 2);
}

#[tokio::test(start_paused = true)]
async fn enter_toggles_row_details() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::MoveDown);
    fx.app.update(Action::DrillIn);
    assert!(fx.app.manager.is_expanded("b.jpg"));
    assert!(!fx.app.manager.is_expanded("a.png"));
    fx.app.update(Action::DrillIn);
    assert!(!fx.app.manager.is_expanded("b.jpg"));
}

// ── Delete with undo ─────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn delete_asks_before_removing() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::GoBottom);
    fx.app.update(Action::Delete);
    assert_eq!(fx.app.confirm_delete.as_deref(), Some("c.pdf"));
    assert_eq!(fx.names().len(), 3);

    fx.app.update(Action::Confirm);
    assert_eq!(fx.app.confirm_delete, None);
    assert_eq!(fx.names(), vec!["a.png", "b.jpg"]);
    assert_eq!(fx.app.cursor, 1);
    assert_eq!(
        fx.app.manager.delete_phase("c.pdf"),
        Some(DeletePhase::Removed)
    );

    fx.settle().await;
    assert_eq!(fx.api.call_count(Op::Delete), 1);
}

#[tokio::test(start_paused = true)]
async fn declining_delete_keeps_row() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::Delete);
    fx.app.update(Action::NavigateBack);
    assert_eq!(fx.app.confirm_delete, None);
    assert_eq!(fx.names().len(), 3);
    assert_eq!(fx.app.manager.inflight(), 0);
}

#[tokio::test(start_paused = true)]
async fn undo_brings_row_back() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::Delete);
    fx.app.update(Action::Confirm);
    assert_eq!(fx.names(), vec!["b.jpg", "c.pdf"]);

    fx.app.update(Action::Undo);
    fx.settle().await;
    assert_eq!(fx.names(), vec!["a.png", "b.jpg", "c.pdf"]);
    assert_eq!(fx.api.call_count(Op::Delete), 0);
}

#[tokio::test(start_paused = true)]
async fn undo_without_pending_delete_says_so() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::Undo);
    assert_eq!(fx.app.manager.status(), Some("Nothing to undo"));
}

#[tokio::test(start_paused = true)]
async fn delete_notice_becomes_toast() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::Delete);
    fx.app.update(Action::Confirm);
    fx.app.update(Action::Tick);

    let toast = fx.app.toast.as_ref().unwrap();
    assert_eq!(toast.kind, ToastKind::Info);
    assert!(toast.text.contains("a.png"));
    assert!(toast.text.contains("undo"));
}

#[tokio::test(start_paused = true)]
async fn failed_delete_shows_error_toast() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.api.fail_next(Op::Delete, 500, Some("Disk is read-only"));
    fx.app.update(Action::Delete);
    fx.app.update(Action::Confirm);
    fx.settle().await;
    fx.app.update(Action::Tick);

    assert_eq!(fx.names().len(), 3);
    assert_eq!(fx.app.manager.status(), Some("Disk is read-only"));
    assert_eq!(fx.app.toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
}

// ── Convert and preview ──────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn convert_marks_row_busy() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::Convert);
    assert_eq!(fx.app.manager.busy(), Some("a.png"));
    fx.settle().await;
    assert_eq!(fx.app.manager.busy(), None);
    assert_eq!(fx.app.manager.status(), Some("Conversion complete"));
    assert!(fx.dir.path().join("downloads").join("a.pdf").exists());
}

#[tokio::test(start_paused = true)]
async fn convert_on_pdf_is_refused() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::GoBottom);
    fx.app.update(Action::Convert);
    assert_eq!(fx.app.manager.busy(), None);
    assert_eq!(fx.app.manager.status(), Some("c.pdf is already a PDF"));
}

#[tokio::test(start_paused = true)]
async fn preview_opens_and_closes() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::GoBottom);
    fx.app.update(Action::Preview);
    fx.settle().await;
    assert_eq!(fx.app.screen, Screen::Preview);
    assert_eq!(
        fx.app.manager.preview().map(|p| p.text.as_str()),
        Some("text of c.pdf")
    );

    fx.app.update(Action::MoveDown);
    assert_eq!(fx.app.preview_scroll, 1);
    fx.app.update(Action::NavigateBack);
    assert_eq!(fx.app.screen, Screen::Files);
    assert!(fx.app.manager.preview().is_none());
}

#[tokio::test(start_paused = true)]
async fn preview_of_image_is_refused() {
    let mut fx = Fixture::loaded(THREE).await;
    fx.app.update(Action::Preview);
    assert_eq!(fx.app.manager.inflight(), 0);
    assert!(fx.app.manager.status().is_some());
}

// ── Drag and drop ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn pasted_path_is_uploaded() {
    let mut fx = Fixture::loaded(&[]).await;
    let first = fx.dir.path().join("dropped.png");
    let second = fx.dir.path().join("ignored.png");
    std::fs::write(&first, b"png").unwrap();
    std::fs::write(&second, b"png").unwrap();

    let text = format!("'{}' '{}'", first.display(), second.display());
    fx.app.update(Action::Paste(text));
    fx.settle().await;

    assert!(
        fx.api
            .calls()
            .contains(&ApiCall::Upload("dropped.png".into()))
    );
    assert_eq!(fx.api.call_count(Op::Upload), 1);
    assert_eq!(fx.names(), vec!["dropped.png"]);
}

#[tokio::test(start_paused = true)]
async fn pasted_text_that_is_not_a_file() {
    let mut fx = Fixture::loaded(&[]).await;
    fx.app.update(Action::Paste("/no/such/file.png".into()));
    assert_eq!(fx.app.manager.inflight(), 0);
    assert!(
        fx.app
            .manager
            .status()
            .is_some_and(|s| s.starts_with("Not a file"))
    );
}

#[tokio::test(start_paused = true)]
async fn drop_is_ignored_while_delete_prompt_is_open() {
    let mut fx = Fixture::loaded(THREE).await;
    let dropped = fx.dir.path().join("dropped.png");
    std::fs::write(&dropped, b"png").unwrap();

    fx.app.update(Action::Delete);
    fx.app
        .update(Action::Paste(dropped.display().to_string()));
    fx.settle().await;

    assert_eq!(fx.app.confirm_delete.as_deref(), Some("a.png"));
    assert_eq!(fx.api.call_count(Op::Upload), 0);
    assert_eq!(fx.app.manager.inflight(), 0);

    fx.app.update(Action::NavigateBack);
    fx.app
        .update(Action::Paste(dropped.display().to_string()));
    fx.settle().await;
    assert_eq!(fx.api.call_count(Op::Upload), 1);
}

#[tokio::test(start_paused = true)]
async fn drop_is_ignored_while_quit_prompt_is_open() {
    let mut fx = Fixture::loaded(&[]).await;
    let dropped = fx.dir.path().join("dropped.png");
    std::fs::write(&dropped, b"png").unwrap();

    fx.app.update(Action::Quit);
    fx.app
        .update(Action::Paste(dropped.display().to_string()));
    assert!(fx.app.confirm_quit);
    assert_eq!(fx.app.manager.inflight(), 0);
    assert_eq!(fx.api.call_count(Op::Upload), 0);
}
