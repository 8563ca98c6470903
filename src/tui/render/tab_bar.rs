use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::english_day_name;
use crate::model::schedule::DayKey;
use crate::ops::filter::ViewFilter;
use crate::tui::app::App;
use crate::util::unicode::display_width;

/// Render the tab bar: festival name + one tab per day, with separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// `Mon 12`
pub(super) fn day_tab_label(key: &DayKey) -> String {
    let name: String = english_day_name(&key.day).chars().take(3).collect();
    format!("{} {}", name, key.date)
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    let mut spans: Vec<Span> = vec![
        Span::styled(" ", bg_style),
        Span::styled("\u{25B6}", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(
            format!(" {} ", app.project.config.festival.name),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
    ];
    let mut sep_cols: Vec<usize> = vec![spans_width(&spans)];
    spans.push(sep.clone());

    for (i, key) in app.days.iter().enumerate() {
        spans.push(Span::styled(format!(" {} ", day_tab_label(key)), tab_style(app, i == app.day)));
        sep_cols.push(spans_width(&spans));
        spans.push(sep.clone());
    }

    let tabs = Paragraph::new(Line::from(spans)).style(bg_style);
    frame.render_widget(tabs, area);
    sep_cols
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let bg = app.theme.background;
    let dim = app.theme.dim;

    let mut indicator: Vec<Span> = Vec::new();
    if app.filter != ViewFilter::Default {
        indicator.push(Span::styled("filter: ", Style::default().fg(app.theme.highlight).bg(bg)));
        indicator.push(Span::styled(
            app.filter.label(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));
    }

    // +2: one space before the indicator, one after
    let indicator_width = spans_width(&indicator);
    let separator_end = if indicator.is_empty() {
        width
    } else {
        width.saturating_sub(indicator_width + 2)
    };

    let sep_text: String = (0..separator_end)
        .map(|col| if sep_cols.contains(&col) { '\u{2534}' } else { '\u{2500}' })
        .collect();
    let mut spans = vec![Span::styled(sep_text, Style::default().fg(dim).bg(bg))];
    if !indicator.is_empty() {
        spans.push(Span::styled(" ", Style::default().bg(bg)));
        spans.extend(indicator);
    }

    let line = Line::from(spans);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}

fn spans_width(spans: &[Span]) -> usize {
    spans.iter().map(|s| display_width(&s.content)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use insta::assert_snapshot;

    #[test]
    fn shows_festival_and_day_tabs() {
        let app = app_with_events(sample_events());
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], " \u{25B6} Sitges \u{2502} Mon 12 \u{2502} Tue 13 \u{2502}");
        // separator joins under each tab divider
        assert_eq!(lines[1].chars().nth(10), Some('\u{2534}'));
        assert!(!lines[1].contains("filter"));
    }

    #[test]
    fn narrow_tab_bar() {
        let app = app_with_events(sample_events());
        let output = render_to_string(30, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        assert_snapshot!(output, @r"
 ▶ Sitges │ Mon 12 │ Tue 13 │
──────────┴────────┴────────┴─
");
    }

    #[test]
    fn filter_indicator_on_separator() {
        let mut app = app_with_events(sample_events());
        app.filter = ViewFilter::Selected;
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        assert!(output.lines().nth(1).unwrap().ends_with("filter: selected"));
    }
}
