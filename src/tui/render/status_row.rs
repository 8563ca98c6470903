use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode, NoticeKind};
use crate::util::unicode::display_width;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let (mut spans, hint) = match app.mode {
        Mode::Import => (
            vec![
                Span::styled("import: ", Style::default().fg(app.theme.highlight).bg(bg)),
                Span::styled(
                    app.import_input.clone(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
            ],
            "Enter import  Esc cancel",
        ),
        Mode::Navigate => match &app.notice {
            Some(notice) => {
                let color = match notice.kind {
                    NoticeKind::Info => app.theme.text_bright,
                    NoticeKind::Error => app.theme.red,
                };
                (
                    vec![Span::styled(notice.text.clone(), Style::default().fg(color).bg(bg))],
                    "",
                )
            }
            None => {
                let stats = app.stats();
                (
                    vec![Span::styled(
                        format!(
                            "{} in plan \u{00B7} {} selected \u{00B7} {}h",
                            stats.plan_events, stats.selected_events, stats.plan_hours
                        ),
                        dim,
                    )],
                    "? help",
                )
            }
        },
    };

    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if !hint.is_empty() && content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, dim));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
