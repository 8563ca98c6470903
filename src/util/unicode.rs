use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.split('\t')
        .enumerate()
        .map(|(i, part)| {
            let w = UnicodeWidthStr::width(part);
            if i > 0 { w + 4 } else { w }
        })
        .sum()
}

/// Display width of a grapheme cluster.
fn grapheme_display_width(g: &str) -> usize {
    if g == "\t" {
        return 4;
    }
    UnicodeWidthStr::width(g)
}

/// Leading graphemes of `s` that fit in `max_cells`.
fn take_width(s: &str, max_cells: usize) -> String {
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = grapheme_display_width(grapheme);
        if width + gw > max_cells {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells <= 1 {
        return "\u{2026}".to_string();
    }
    let mut result = take_width(s, max_cells - 1);
    result.push('\u{2026}');
    result
}

/// Keep the first `limit` cells of a label and mark the cut with `...`.
///
/// Unlike [`truncate_to_width`] the marker is added after the limit, so a
/// clipped label is `limit + 3` cells wide. Used for the fixed label limits of
/// grid cells.
pub fn clip_label(s: &str, limit: usize) -> String {
    if display_width(s) <= limit {
        return s.to_string();
    }
    let mut result = take_width(s, limit);
    result.push_str("...");
    result
}

/// Pad with spaces on the right to exactly `cells` wide, truncating first
/// if needed.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let mut out = truncate_to_width(s, cells);
    let w = display_width(&out);
    out.extend(std::iter::repeat_n(' ', cells.saturating_sub(w)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_ascii() {
        assert_eq!(display_width("hello"), 5);
    }

    #[test]
    fn display_width_cjk() {
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn display_width_combining() {
        assert_eq!(display_width("cafe\u{0301}"), 4);
    }

    #[test]
    fn truncate_fits() {
        assert_eq!(truncate_to_width("Hall 1", 10), "Hall 1");
    }

    #[test]
    fn truncate_cuts_with_ellipsis() {
        assert_eq!(truncate_to_width("Auditori Meliá", 8), "Auditor\u{2026}");
        assert_eq!(truncate_to_width("abc", 1), "\u{2026}");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn truncate_never_splits_wide_chars() {
        // 你 is 2 cells; only one fits before the ellipsis
        assert_eq!(truncate_to_width("你好世界", 4), "你\u{2026}");
    }

    #[test]
    fn clip_label_appends_dots_past_limit() {
        assert_eq!(clip_label("Noves Visions", 12), "Noves Vision...");
        assert_eq!(clip_label("Oficial", 12), "Oficial");
        assert_eq!(clip_label("Òrbita", 6), "Òrbita");
    }

    #[test]
    fn pad_fills_and_cuts() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("abcdef", 4), "abc\u{2026}");
        assert_eq!(display_width(&pad_to_width("你好", 5)), 5);
    }
}
