use std::rc::Rc;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget,
    },
};

use super::layout::{self, OverlayLayout, OverlaySize};
use super::OverlayProps;
use crate::document::{
    element_at_row, row_span, stacked_height, Callback, Element, ElementId, Hit, LayerSnapshot,
    Portal,
};
use crate::ui::{components, theme};

/// What an open overlay mounts into the document.
pub(super) struct OverlayView {
    title: Option<String>,
    size: OverlaySize,
    close_on_backdrop_click: bool,
    on_close: Callback,
    breakpoint: u16,
    /// The close control, then the caller's content.
    elements: Vec<Element>,
}

impl OverlayView {
    pub fn new(props: &OverlayProps, close_id: ElementId, breakpoint: u16) -> Self {
        let close = Element::button("Close")
            .with_id(close_id)
            .on_activate(Rc::clone(&props.on_close));
        let mut elements = Vec::with_capacity(props.content.len() + 1);
        elements.push(close);
        elements.extend(props.content.iter().cloned());

        Self {
            title: props.title.clone(),
            size: props.size,
            close_on_backdrop_click: props.close_on_backdrop_click,
            on_close: Rc::clone(&props.on_close),
            breakpoint,
            elements,
        }
    }

    pub fn on_close(&self) -> Callback {
        Rc::clone(&self.on_close)
    }

    fn close_id(&self) -> ElementId {
        self.elements[0].id()
    }

    fn content(&self) -> &[Element] {
        &self.elements[1..]
    }

    /// First focusable content element, or the close control.
    pub fn initial_focus(&self) -> ElementId {
        self.content()
            .iter()
            .find(|e| e.is_focusable())
            .map_or_else(|| self.close_id(), Element::id)
    }

    pub fn layout(&self, viewport: Rect) -> OverlayLayout {
        layout::compute(
            viewport,
            self.size,
            self.title.is_some(),
            stacked_height(self.content()),
            self.breakpoint,
        )
    }

    /// Content scroll that keeps the focused element in view.
    fn content_offset(&self, layout: &OverlayLayout, focused: Option<ElementId>) -> u16 {
        let visible = layout.content.height;
        let max = stacked_height(self.content()).saturating_sub(visible);
        let Some((row, height)) = focused.and_then(|id| row_span(self.content(), id)) else {
            return 0;
        };
        row.saturating_add(height).saturating_sub(visible).min(max)
    }
}

impl Portal for OverlayView {
    fn elements(&self) -> &[Element] {
        &self.elements
    }

    fn hit_test(&self, viewport: Rect, column: u16, row: u16, focused: Option<ElementId>) -> Hit {
        let layout = self.layout(viewport);
        if layout.on_close(column, row) {
            return Hit::Element(self.close_id());
        }
        if !layout.in_panel(column, row) {
            return Hit::Backdrop;
        }
        if layout.content.contains(Position::new(column, row)) {
            let line = row - layout.content.y + self.content_offset(&layout, focused);
            if let Some(element) = element_at_row(self.content(), line) {
                if element.is_focusable() {
                    return Hit::Element(element.id());
                }
            }
        }
        Hit::Panel
    }

    fn backdrop_click(&self) {
        if self.close_on_backdrop_click {
            tracing::debug!(title = ?self.title, "backdrop click closes overlay");
            (self.on_close)();
        }
    }

    fn render(&self, viewport: Rect, buf: &mut Buffer, focused: Option<ElementId>, is_top: bool) {
        let theme = theme();
        let layout = self.layout(viewport);

        let mut backdrop = Style::default()
            .fg(theme.text_dim)
            .add_modifier(Modifier::DIM);
        if is_top {
            backdrop = backdrop.bg(theme.backdrop);
        }
        buf.set_style(layout.backdrop, backdrop);

        let border = if is_top { theme.accent } else { theme.inactive };
        Clear.render(layout.panel, buf);
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(Style::default().fg(theme.text).bg(theme.panel))
            .render(layout.panel, buf);

        if let Some(handle) = layout.handle {
            Paragraph::new(Span::styled("━━━━━━", Style::default().fg(theme.inactive)))
                .alignment(Alignment::Center)
                .render(handle, buf);
        }

        let close_style = if focused == Some(self.close_id()) {
            Style::default()
                .fg(theme.panel)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_dim)
        };
        Paragraph::new(Span::styled(" ✕ ", close_style)).render(layout.close, buf);

        if let (Some(area), Some(title)) = (layout.title, self.title.as_deref()) {
            Paragraph::new(Span::styled(
                title.to_string(),
                Style::default()
                    .fg(theme.header)
                    .add_modifier(Modifier::BOLD),
            ))
            .render(area, buf);
        }

        let offset = self.content_offset(&layout, focused);
        let lines: Vec<Line> = self
            .content()
            .iter()
            .flat_map(|e| components::element_lines(e, focused == Some(e.id())))
            .collect();
        let total = lines.len();
        Paragraph::new(lines)
            .scroll((offset, 0))
            .render(layout.content, buf);

        let visible = usize::from(layout.content.height);
        if total > visible {
            let mut state = ScrollbarState::new(total)
                .viewport_content_length(visible)
                .position(usize::from(offset));
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .thumb_style(Style::default().fg(border))
                .render(layout.scrollbar, buf, &mut state);
        }
    }

    fn describe(&self, viewport: Rect) -> LayerSnapshot {
        let panel = self.layout(viewport).panel;
        LayerSnapshot {
            title: self.title.clone(),
            size: self.size.as_str().to_string(),
            x: panel.x,
            y: panel.y,
            width: panel.width,
            height: panel.height,
            focusables: self.elements.iter().filter(|e| e.is_focusable()).count(),
            top: false,
        }
    }
}
