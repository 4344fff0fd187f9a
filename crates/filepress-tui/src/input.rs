use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::action::Action;

/// Map a crossterm terminal event to a TUI action.
pub fn map_event(event: &Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Quit;
            }
            map_key(key)
        }
        Event::Paste(text) => Action::Paste(text.clone()),
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_mouse(mouse: &MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::MoveDown,
        MouseEventKind::ScrollUp => Action::MoveUp,
        MouseEventKind::Down(MouseButton::Left) => Action::ClickAt(mouse.column, mouse.row),
        _ => Action::None,
    }
}

fn map_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Enter | KeyCode::Char(' ') => Action::DrillIn,
        KeyCode::Esc | KeyCode::Char('n') => Action::NavigateBack,
        KeyCode::Char('g') | KeyCode::Home => Action::GoTop,
        KeyCode::Char('G') | KeyCode::End => Action::GoBottom,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageDown,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Char('o') | KeyCode::Char('a') => Action::AddFiles,
        KeyCode::Char('c') => Action::Convert,
        KeyCode::Char('d') | KeyCode::Delete => Action::Delete,
        KeyCode::Char('y') => Action::Confirm,
        KeyCode::Char('u') => Action::Undo,
        KeyCode::Char('p') => Action::Preview,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('t') => Action::ToggleTheme,
        KeyCode::Char('x') => Action::DismissTip,
        KeyCode::Char('L') => Action::Logout,
        KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            map_event(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn plain_c_converts() {
        assert_eq!(
            map_event(&press(KeyCode::Char('c'), KeyModifiers::NONE)),
            Action::Convert
        );
    }

    #[test]
    fn ctrl_d_pages_plain_d_deletes() {
        assert_eq!(
            map_event(&press(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Action::PageDown
        );
        assert_eq!(
            map_event(&press(KeyCode::Char('d'), KeyModifiers::NONE)),
            Action::Delete
        );
    }

    #[test]
    fn paste_carries_text() {
        assert_eq!(
            map_event(&Event::Paste("/tmp/a.png".into())),
            Action::Paste("/tmp/a.png".into())
        );
    }
}
