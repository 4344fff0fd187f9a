use filepress_core::ThemeStore;

use super::{App, Screen};
use crate::action::Action;
use crate::dropped::parse_dropped_paths;
use crate::theme::Theme;

impl App {
    /// Process an action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                self.drain_notices();
                return self.should_quit;
            }
            Action::Resize(_w, h) => {
                // header, tip, table header, toast, footer
                self.visible_rows = (h as usize).saturating_sub(6).max(1);
                return self.should_quit;
            }
            _ => {}
        }

        if self.confirm_quit {
            match action {
                Action::Quit | Action::Confirm => self.should_quit = true,
                Action::NavigateBack => self.confirm_quit = false,
                _ => {}
            }
            return self.should_quit;
        }

        if let Some(filename) = self.confirm_delete.clone() {
            match action {
                Action::Confirm => {
                    self.confirm_delete = None;
                    if self.manager.request_delete(&filename) {
                        self.clamp_cursor();
                    }
                }
                Action::NavigateBack | Action::Quit => self.confirm_delete = None,
                _ => {}
            }
            return self.should_quit;
        }

        if self.show_help {
            if matches!(
                action,
                Action::ToggleHelp | Action::NavigateBack | Action::Quit
            ) {
                self.show_help = false;
            }
            return self.should_quit;
        }

        // Modals above swallow drops; otherwise a drop uploads from any screen.
        if let Action::Paste(text) = action {
            self.handle_paste(&text);
            return self.should_quit;
        }

        match self.screen {
            Screen::Files => self.handle_files_action(action),
            Screen::FilePicker => self.handle_file_picker_action(action),
            Screen::Preview => self.handle_preview_action(action),
        }
        self.should_quit
    }

    fn handle_files_action(&mut self, action: Action) {
        let len = self.manager.files().len();
        match action {
            Action::Quit => self.confirm_quit = true,
            Action::MoveDown => {
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
            }
            Action::MoveUp => self.cursor = self.cursor.saturating_sub(1),
            Action::PageDown => {
                let page = self.visible_rows.max(1);
                self.cursor = (self.cursor + page).min(len.saturating_sub(1));
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1);
                self.cursor = self.cursor.saturating_sub(page);
            }
            Action::GoTop => self.cursor = 0,
            Action::GoBottom => self.cursor = len.saturating_sub(1),
            Action::ClickAt(_col, row) => {
                if let Some(&(_, idx)) = self.row_hits.iter().find(|(y, _)| *y == row) {
                    if idx == self.cursor {
                        self.toggle_selected_row();
                    }
                    self.cursor = idx;
                }
            }
            Action::DrillIn => self.toggle_selected_row(),
            Action::AddFiles => {
                self.file_picker.refresh_entries();
                self.screen = Screen::FilePicker;
            }
            Action::Convert => {
                if let Some(filename) = self.selected_name()
                    && let Err(e) = self.manager.convert(&filename)
                {
                    self.manager
                        .set_status(e.user_message("Conversion failed"));
                }
            }
            Action::Delete => {
                self.confirm_delete = self.selected_name();
            }
            Action::Undo => {
                if self.manager.undo().is_none() {
                    self.manager.set_status("Nothing to undo");
                }
            }
            Action::Preview => match self.selected() {
                Some(file) if file.is_pdf() => {
                    let filename = file.filename.clone();
                    self.manager.preview_text(&filename);
                }
                Some(_) => self.manager.set_status("Text preview is only available for PDFs"),
                None => {}
            },
            Action::Refresh => self.manager.fetch_files(),
            Action::ToggleTheme => self.toggle_theme(),
            Action::DismissTip => self.dismiss_tip(),
            Action::Logout => {
                self.logout_requested = true;
                self.should_quit = true;
            }
            Action::ToggleHelp => self.show_help = true,
            Action::NavigateBack => self.manager.clear_status(),
            _ => {}
        }
    }

    fn handle_preview_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.confirm_quit = true,
            Action::NavigateBack | Action::Preview => {
                self.manager.close_preview();
                self.screen = Screen::Files;
            }
            Action::MoveDown => self.preview_scroll = self.preview_scroll.saturating_add(1),
            Action::MoveUp => self.preview_scroll = self.preview_scroll.saturating_sub(1),
            Action::PageDown => {
                let page = self.visible_rows.max(1) as u16;
                self.preview_scroll = self.preview_scroll.saturating_add(page);
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1) as u16;
                self.preview_scroll = self.preview_scroll.saturating_sub(page);
            }
            Action::GoTop => self.preview_scroll = 0,
            Action::ToggleHelp => self.show_help = true,
            Action::ToggleTheme => self.toggle_theme(),
            _ => {}
        }
    }

    fn toggle_selected_row(&mut self) {
        if let Some(filename) = self.selected_name() {
            self.manager.toggle_expanded(&filename);
        }
    }

    fn toggle_theme(&mut self) {
        let mode = self.theme.mode.toggled();
        self.theme = Theme::for_mode(mode);
        if let Err(e) = self.prefs.set_theme(mode) {
            tracing::warn!(error = %e, "could not save theme");
        }
    }

    fn dismiss_tip(&mut self) {
        if !self.show_tip {
            return;
        }
        self.show_tip = false;
        if let Err(e) = self.prefs.dismiss_tip() {
            tracing::warn!(error = %e, "could not save tip dismissal");
        }
    }

    /// A paste is treated as a file drop: the first path is uploaded.
    fn handle_paste(&mut self, text: &str) {
        let paths = parse_dropped_paths(text);
        let Some(first) = paths.first() else {
            self.manager.set_status("Nothing to upload in pasted text");
            return;
        };
        if !first.is_file() {
            self.manager
                .set_status(format!("Not a file: {}", first.display()));
            return;
        }
        if paths.len() > 1 {
            tracing::info!(count = paths.len(), "several files dropped, uploading the first");
        }
        self.manager.upload_paths(&paths);
        if self.screen == Screen::FilePicker {
            self.screen = Screen::Files;
        }
    }
}
