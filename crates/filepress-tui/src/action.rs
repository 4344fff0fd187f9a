/// Everything the user (or the clock) can ask the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    MoveDown,
    MoveUp,
    PageDown,
    PageUp,
    GoTop,
    GoBottom,
    /// Enter / Space: expand a row, or open an entry in the file picker.
    DrillIn,
    NavigateBack,
    /// Open the file picker.
    AddFiles,
    Convert,
    Delete,
    /// `y` in a confirmation dialog.
    Confirm,
    Undo,
    Preview,
    Refresh,
    ToggleTheme,
    DismissTip,
    Logout,
    ToggleHelp,
    /// Bracketed paste; a file dragged onto the terminal arrives this way.
    Paste(String),
    ClickAt(u16, u16),
    Tick,
    Resize(u16, u16),
}
