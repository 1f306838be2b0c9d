//! Line rendering for document elements, shared by the page and panels.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::theme;
use crate::document::{Element, ElementKind};

/// Lines for one element; always `element.height()` of them.
pub fn element_lines(element: &Element, focused: bool) -> Vec<Line<'static>> {
    let theme = theme();
    let marker = Span::styled(
        if focused { "› " } else { "  " },
        Style::default().fg(theme.accent),
    );
    let control = if focused {
        Style::default()
            .fg(theme.text)
            .bg(theme.focus_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.accent)
    };
    let text = Style::default().fg(theme.text);
    let dim = Style::default().fg(theme.text_dim);

    match element.kind() {
        ElementKind::Text(body) => {
            let mut lines: Vec<Line<'static>> = body
                .lines()
                .map(|line| Line::from(Span::styled(format!("  {line}"), text)))
                .collect();
            if lines.is_empty() {
                lines.push(Line::default());
            }
            lines
        }
        ElementKind::Button(label) => {
            vec![Line::from(vec![
                marker,
                Span::styled(format!("[ {label} ]"), control),
            ])]
        }
        ElementKind::Link { label, href } => vec![Line::from(vec![
            marker,
            Span::styled(label.clone(), control.add_modifier(Modifier::UNDERLINED)),
            Span::styled(format!(" ({href})"), dim),
        ])],
        ElementKind::Input { label, value } => vec![Line::from(vec![
            marker,
            Span::styled(format!("{label}: "), text),
            Span::styled(format!("[{value:<16}]"), control),
        ])],
        ElementKind::Select {
            label,
            options,
            selected,
        } => {
            let option = options.get(*selected).map(String::as_str).unwrap_or("");
            vec![Line::from(vec![
                marker,
                Span::styled(format!("{label}: "), text),
                Span::styled(format!("‹ {option} ›"), control),
            ])]
        }
        ElementKind::TextArea { label, value } => {
            let mut lines = vec![Line::from(vec![
                marker,
                Span::styled(format!("{label}:"), text),
            ])];
            let mut rows: Vec<&str> = value.lines().collect();
            if rows.is_empty() {
                rows.push("");
            }
            lines.extend(rows.into_iter().map(|row| {
                Line::from(vec![
                    Span::styled("  │ ", dim),
                    Span::styled(row.to_string(), control),
                ])
            }));
            lines
        }
        ElementKind::Custom { label, .. } => {
            let style = if element.is_focusable() { control } else { text };
            vec![Line::from(vec![marker, Span::styled(label.clone(), style)])]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_line_count_matches_height() {
        let elements = [
            Element::text(""),
            Element::text("a\nb\nc"),
            Element::button("ok"),
            Element::link("docs", "https://example.org"),
            Element::input("Name", "Ada"),
            Element::select("Plan", vec!["free".into(), "pro".into()], 1),
            Element::textarea("Notes", ""),
            Element::textarea("Notes", "one\ntwo"),
            Element::custom("card", Some(0)),
        ];
        for element in &elements {
            assert_eq!(
                element_lines(element, false).len(),
                usize::from(element.height()),
                "{element:?}"
            );
        }
    }

    #[test]
    fn test_focus_marker() {
        let button = Element::button("Save");
        assert_eq!(plain(&element_lines(&button, true)), vec!["› [ Save ]"]);
        assert_eq!(plain(&element_lines(&button, false)), vec!["  [ Save ]"]);
    }

    #[test]
    fn test_select_shows_current_option() {
        let select = Element::select("Plan", vec!["free".into(), "pro".into()], 1);
        assert_eq!(plain(&element_lines(&select, false)), vec!["  Plan: ‹ pro ›"]);
    }
}
