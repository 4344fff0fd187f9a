use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use filepress_core::FileRecord;

use crate::app::{App, ToastKind};
use crate::theme::Theme;
use crate::view::{spinner_char, truncate};

const SIZE_WIDTH: usize = 12;
const TYPE_WIDTH: usize = 18;
const ACTION_WIDTH: usize = 16;

/// Render the file list screen.
pub fn render_in(f: &mut Frame, app: &mut App, area: Rect) {
    let mut constraints = vec![Constraint::Length(1)]; // header
    if app.show_tip {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(3)); // table
    constraints.push(Constraint::Length(1)); // toast
    constraints.push(Constraint::Length(1)); // footer

    let chunks = Layout::vertical(constraints).split(area);
    let mut idx = 0;

    render_header(f, chunks[idx], app);
    idx += 1;

    if app.show_tip {
        render_tip(f, chunks[idx], &app.theme);
        idx += 1;
    }

    render_table(f, chunks[idx], app);
    idx += 1;

    render_toast(f, chunks[idx], app);
    idx += 1;

    render_footer(f, chunks[idx], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let count = app.manager.files().len();
    let mut spans = vec![
        Span::styled(" FilePress ", theme.header_style()),
        Span::styled(
            format!(" {} ", app.server_label),
            Style::default().fg(theme.dim),
        ),
        Span::styled(
            format!("{} file{}", count, if count == 1 { "" } else { "s" }),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ];
    if app.manager.inflight() > 0 {
        spans.push(Span::styled(
            format!(" {}", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tip(f: &mut Frame, area: Rect, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(" Tip: ", theme.key_style()),
        Span::styled(
            "drag a file onto this window to upload it, or press o to browse. ",
            Style::default().fg(theme.text),
        ),
        Span::styled("x", theme.key_style()),
        Span::styled(" dismiss", Style::default().fg(theme.dim)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Name, size and type cells; the action cell is appended by the caller.
fn columns_line(name: &str, size: &str, kind: &str, name_width: usize) -> String {
    format!(
        " {:<nw$} {:>sw$} {:<tw$} ",
        truncate(name, name_width),
        size,
        truncate(kind, TYPE_WIDTH),
        nw = name_width,
        sw = SIZE_WIDTH,
        tw = TYPE_WIDTH,
    )
}

fn action_label(app: &App, file: &FileRecord) -> (String, Style) {
    let theme = &app.theme;
    if app.manager.busy() == Some(file.filename.as_str()) {
        return (
            format!("{} converting", spinner_char(app.tick)),
            Style::default()
                .fg(theme.spinner)
                .add_modifier(Modifier::BOLD),
        );
    }
    if file.is_pdf() {
        ("p preview".to_string(), Style::default().fg(theme.dim))
    } else {
        ("c convert".to_string(), Style::default().fg(theme.dim))
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style())
        .title(" Files ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    app.row_hits.clear();

    let theme = &app.theme;
    let files = app.manager.files();

    if files.is_empty() {
        let msg = if app.manager.is_loaded() {
            "No files yet. Press o to upload, or drag a file here."
        } else {
            "Loading\u{2026}"
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", msg),
                Style::default().fg(theme.dim),
            ))),
            inner,
        );
        return;
    }

    let fixed = SIZE_WIDTH + TYPE_WIDTH + ACTION_WIDTH + 4;
    let name_width = (inner.width as usize).saturating_sub(fixed).max(8);

    let mut lines = vec![Line::from(Span::styled(
        columns_line("Name", "Size", "Type", name_width) + "Action",
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    ))];

    // Keep the cursor row (and its detail line) on screen.
    let body_rows = (inner.height as usize).saturating_sub(1);
    let height_of = |i: usize| {
        if app.manager.is_expanded(&files[i].filename) {
            2
        } else {
            1
        }
    };
    let mut offset = app.scroll_offset.min(app.cursor);
    loop {
        let used: usize = (offset..=app.cursor.min(files.len() - 1)).map(height_of).sum();
        if used <= body_rows || offset >= app.cursor {
            break;
        }
        offset += 1;
    }

    let mut hits = Vec::new();
    let mut y = inner.y + 1;
    let bottom = inner.y + inner.height;
    for (i, file) in files.iter().enumerate().skip(offset) {
        if y >= bottom {
            break;
        }
        let selected = i == app.cursor;
        let (action, action_style) = action_label(app, file);
        let text = columns_line(
            &file.filename,
            &format!("{} KB", file.size_kb()),
            &file.mimetype,
            name_width,
        );
        let base = if selected {
            theme.highlight_style().fg(theme.text)
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(vec![
            Span::styled(text, base),
            Span::styled(action, action_style),
        ]));
        hits.push((y, i));
        y += 1;

        if app.manager.is_expanded(&file.filename) && y < bottom {
            lines.push(Line::from(Span::styled(
                format!("   {}", file.detail_line()),
                Style::default().fg(theme.dim),
            )));
            hits.push((y, i));
            y += 1;
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
    app.scroll_offset = offset;
    app.row_hits = hits;
}

fn render_toast(f: &mut Frame, area: Rect, app: &App) {
    let Some(toast) = &app.toast else {
        return;
    };
    let color = match toast.kind {
        ToastKind::Info => app.theme.ok,
        ToastKind::Error => app.theme.error,
    };
    let line = Line::from(Span::styled(
        format!(" {}", toast.text),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(Paragraph::new(line), area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let line = match app.manager.status() {
        Some(status) => Line::from(Span::styled(
            format!(" {}", status),
            Style::default().fg(theme.warn),
        )),
        None => Line::from(vec![
            Span::styled(" o", theme.key_style()),
            Span::styled(" upload  ", theme.footer_style()),
            Span::styled("c", theme.key_style()),
            Span::styled(" convert  ", theme.footer_style()),
            Span::styled("d", theme.key_style()),
            Span::styled(" delete  ", theme.footer_style()),
            Span::styled("u", theme.key_style()),
            Span::styled(" undo  ", theme.footer_style()),
            Span::styled("?", theme.key_style()),
            Span::styled(" help  ", theme.footer_style()),
            Span::styled("q", theme.key_style()),
            Span::styled(" quit", theme.footer_style()),
        ]),
    };
    f.render_widget(Paragraph::new(line), area);
}
