use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::App;

/// Extracted PDF text, scrollable.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(area);

    let Some(preview) = app.manager.preview() else {
        f.render_widget(
            Paragraph::new(Span::styled(" Nothing to preview", Style::default().fg(theme.dim))),
            chunks[1],
        );
        return;
    };

    let header = Line::from(vec![
        Span::styled(" Preview ", theme.header_style()),
        Span::styled(format!(" {}", preview.filename), Style::default().fg(theme.text)),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let body = if preview.text.trim().is_empty() {
        "(no text found in this PDF)"
    } else {
        preview.text.as_str()
    };
    let paragraph = Paragraph::new(body)
        .style(Style::default().fg(theme.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style()),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));
    f.render_widget(paragraph, chunks[1]);

    let footer = Line::from(vec![
        Span::styled(" j/k", theme.key_style()),
        Span::styled(" scroll  ", theme.footer_style()),
        Span::styled("Esc", theme.key_style()),
        Span::styled(" back", theme.footer_style()),
    ]);
    f.render_widget(Paragraph::new(footer), chunks[2]);
}
