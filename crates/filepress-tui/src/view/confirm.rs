use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::theme::Theme;
use crate::view::{centered_rect, truncate};

/// Ask before deleting `filename`.
pub fn render_delete(f: &mut Frame, theme: &Theme, filename: &str) {
    let popup = centered_rect(52, 6, f.area());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  Delete {}?", truncate(filename, 38)),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "  You can undo for a few seconds afterwards.",
            Style::default().fg(theme.dim),
        )),
        answer_line("y", ": delete   ", "n / Esc", ": cancel", theme),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.error))
            .title(" Confirm Delete "),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

/// Ask before quitting. `pending` deletions are sent right away on exit.
pub fn render_quit(f: &mut Frame, theme: &Theme, pending: usize) {
    let height = if pending > 0 { 6 } else { 5 };
    let popup = centered_rect(48, height, f.area());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Quit FilePress?",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
    ];
    if pending > 0 {
        lines.push(Line::from(Span::styled(
            format!("  {} pending deletion(s) will be sent now.", pending),
            Style::default().fg(theme.warn),
        )));
    }
    lines.push(answer_line("q", ": quit   ", "Esc", ": cancel", theme));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.error))
            .title(" Confirm Quit "),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn answer_line<'a>(
    yes: &'a str,
    yes_label: &'a str,
    no: &'a str,
    no_label: &'a str,
    theme: &Theme,
) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("  {yes}"),
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        ),
        Span::styled(yes_label, Style::default().fg(theme.dim)),
        Span::styled(no, theme.key_style()),
        Span::styled(no_label, Style::default().fg(theme.dim)),
    ])
}
