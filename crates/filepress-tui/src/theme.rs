use ratatui::style::{Color, Modifier, Style};

use filepress_core::ThemeMode;

/// Color theme for the TUI.
pub struct Theme {
    pub mode: ThemeMode,

    pub ok: Color,
    pub error: Color,
    pub warn: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    /// Dark text on the terminal's background, blue accents.
    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,

            ok: Color::Rgb(0, 130, 60),
            error: Color::Rgb(200, 30, 30),
            warn: Color::Rgb(170, 110, 0),

            header_fg: Color::White,
            header_bg: Color::Rgb(40, 90, 180),
            border: Color::Rgb(150, 150, 160),
            text: Color::Rgb(20, 20, 30),
            dim: Color::Rgb(110, 110, 120),
            highlight_bg: Color::Rgb(215, 225, 245),
            active: Color::Rgb(40, 90, 180),
            spinner: Color::Rgb(40, 90, 180),
            footer_fg: Color::Rgb(110, 110, 120),
            footer_bg: Color::Reset,
        }
    }

    /// Light text on a dark background.
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,

            ok: Color::Rgb(0, 200, 80),
            error: Color::Rgb(255, 80, 80),
            warn: Color::Rgb(255, 200, 0),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 80),
            active: Color::Rgb(60, 140, 255),
            spinner: Color::Rgb(60, 140, 255),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }

    pub fn key_style(&self) -> Style {
        Style::default()
            .fg(self.active)
            .add_modifier(Modifier::BOLD)
    }
}
