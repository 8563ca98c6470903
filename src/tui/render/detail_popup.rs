use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::cli::output::format_event_detail;
use crate::tui::app::App;

use super::help_overlay::centered_rect;

/// Render the detail popup for the event chosen with Enter.
pub fn render_detail_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(event) = app.detail.as_deref().and_then(|id| app.project.schedule.find(id)) else {
        return;
    };
    let status = app.status_of(event);
    let bg = app.theme.background;

    let mut detail = format_event_detail(event, status).into_iter();
    let mut lines: Vec<Line> = Vec::new();
    if let Some(title) = detail.next() {
        lines.push(Line::from(Span::styled(
            title,
            Style::default()
                .fg(app.theme.class_color(status))
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }
    for line in detail {
        let style = if line.starts_with("ID: ") {
            Style::default().fg(app.theme.dim).bg(bg)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        lines.push(Line::from(Span::styled(line, style)));
    }

    let popup = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Event ")
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn shows_event_under_cursor() {
        let mut app = app_with_events(sample_events());
        app.toggle_detail();
        assert!(app.detail.is_some());
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_detail_popup(frame, &app, area);
        });
        assert!(output.contains("Event"));
        assert!(output.contains("Film A"));
        assert!(output.contains("Venue: Hall 1"));
        assert!(output.contains("Status: unmarked"));
    }

    #[test]
    fn nothing_without_detail() {
        let app = app_with_events(sample_events());
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_detail_popup(frame, &app, area);
        });
        assert_eq!(output, "");
    }
}
