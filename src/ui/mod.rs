pub mod components;

use std::sync::OnceLock;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
    Frame,
};

use crate::app::App;
use crate::document::Document;
use crate::theme::Theme;

// Set once at startup from the config; defaults if never set
static THEME: OnceLock<Theme> = OnceLock::new();

pub fn init_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::debug!("theme already initialized");
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let document = app.document();
    document.resize(area);

    draw_page(f.buffer_mut(), document, area);
    draw_layers(f.buffer_mut(), document, area);
}

/// The page: its elements, scrolled, with a scrollbar while overflow is
/// visible. Padding takes the scrollbar's place while the page is locked.
fn draw_page(buf: &mut Buffer, document: &Document, area: Rect) {
    let theme = theme();
    buf.set_style(area, Style::default().fg(theme.text).bg(theme.page));

    let gutter = document.scrollbar_width();
    let content = Rect {
        width: document.client_width(),
        ..area
    };
    let active = document.active_element();
    let lines: Vec<Line> = document
        .body()
        .iter()
        .flat_map(|e| components::element_lines(e, active == Some(e.id())))
        .collect();
    let total = usize::from(document.body_height());
    let offset = document.scroll_offset();

    Paragraph::new(lines)
        .scroll((offset, 0))
        .render(content, buf);

    if gutter > 0 {
        let mut state = ScrollbarState::new(total)
            .viewport_content_length(usize::from(area.height))
            .position(usize::from(offset));
        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .thumb_style(Style::default().fg(theme.accent))
            .render(area, buf, &mut state);
    }
}

/// Layers bottom to top; only the last one gets the full backdrop.
fn draw_layers(buf: &mut Buffer, document: &Document, area: Rect) {
    let layers = document.layers();
    let active = document.active_element();
    let count = layers.len();
    for (i, layer) in layers.iter().enumerate() {
        layer.render(area, buf, active, i + 1 == count);
    }
}

/// Rows of a buffer as plain text, trailing blanks trimmed.
pub fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let width = usize::from(buf.area.width).max(1);
    buf.content
        .chunks(width)
        .map(|row| {
            row.iter()
                .map(|cell| cell.symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}
