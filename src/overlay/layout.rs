use ratatui::layout::{Position, Rect};
use serde::{Deserialize, Serialize};

/// Default viewport width, in columns, below which panels become bottom sheets.
pub const DEFAULT_NARROW_BREAKPOINT: u16 = 64;

/// Width of the close control, `" ✕ "`.
const CLOSE_WIDTH: u16 = 3;

/// Border plus horizontal padding on each side of the panel.
const SIDE_CHROME: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum OverlaySize {
    #[serde(rename = "sm")]
    #[value(name = "sm")]
    Small,
    #[default]
    #[serde(rename = "md")]
    #[value(name = "md")]
    Medium,
    #[serde(rename = "lg")]
    #[value(name = "lg")]
    Large,
}

impl OverlaySize {
    /// Largest panel width in columns.
    pub const fn max_width(self) -> u16 {
        match self {
            OverlaySize::Small => 40,
            OverlaySize::Medium => 56,
            OverlaySize::Large => 76,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            OverlaySize::Small => "sm",
            OverlaySize::Medium => "md",
            OverlaySize::Large => "lg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    Bottom,
}

/// Geometry of one open overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub anchor: Anchor,
    pub backdrop: Rect,
    pub panel: Rect,
    /// Drag handle, bottom sheets only.
    pub handle: Option<Rect>,
    pub close: Rect,
    pub title: Option<Rect>,
    /// Visible window onto the content.
    pub content: Rect,
    /// Column for the content scrollbar.
    pub scrollbar: Rect,
}

impl OverlayLayout {
    pub fn in_panel(&self, column: u16, row: u16) -> bool {
        self.panel.contains(Position::new(column, row))
    }

    pub fn on_close(&self, column: u16, row: u16) -> bool {
        self.close.contains(Position::new(column, row))
    }
}

/// Lay out a panel of `size` holding `content_height` rows.
///
/// Viewports narrower than `breakpoint` get a full-width panel anchored
/// to the bottom edge. Wider ones get a centered panel. Either way the
/// panel never exceeds the viewport, and content beyond the panel's
/// height scrolls.
pub fn compute(
    viewport: Rect,
    size: OverlaySize,
    has_title: bool,
    content_height: u16,
    breakpoint: u16,
) -> OverlayLayout {
    let anchor = if viewport.width < breakpoint {
        Anchor::Bottom
    } else {
        Anchor::Center
    };

    // border + header row (close control, drag handle) ... + padding + border
    let title_rows: u16 = if has_title { 2 } else { 0 };
    let chrome = 1 + 1 + title_rows + 1 + 1;
    let max_height = match anchor {
        Anchor::Center => viewport.height.saturating_sub(2),
        Anchor::Bottom => viewport.height.saturating_sub(1),
    };

    let width = size.max_width().min(viewport.width);
    let height = chrome.saturating_add(content_height).min(max_height);

    let x = viewport.x + (viewport.width - width) / 2;
    let y = match anchor {
        Anchor::Center => viewport.y + (viewport.height - height) / 2,
        Anchor::Bottom => viewport.y + viewport.height - height,
    };
    let panel = Rect::new(x, y, width, height);

    let inner_x = panel.x.saturating_add(SIDE_CHROME).min(panel.right());
    let inner_width = panel.width.saturating_sub(SIDE_CHROME * 2);
    let header_y = panel.y.saturating_add(1);
    // bottom padding row and border
    let content_end = panel.bottom().saturating_sub(2);

    let clip = |r: Rect| r.intersection(panel);

    let close = clip(Rect::new(
        panel
            .right()
            .saturating_sub(2 + CLOSE_WIDTH)
            .max(panel.x),
        header_y,
        CLOSE_WIDTH.min(panel.width),
        1,
    ));

    let handle = match anchor {
        Anchor::Bottom => Some(clip(Rect::new(inner_x, header_y, inner_width, 1))),
        Anchor::Center => None,
    };

    let title = has_title.then(|| clip(Rect::new(inner_x, header_y.saturating_add(1), inner_width, 1)));

    let content_y = header_y.saturating_add(1 + title_rows);
    let content_height = content_end.saturating_sub(content_y);
    let content = clip(Rect::new(inner_x, content_y, inner_width, content_height));

    let scrollbar = clip(Rect::new(
        panel.right().saturating_sub(2),
        content.y,
        1,
        content.height,
    ));

    OverlayLayout {
        anchor,
        backdrop: viewport,
        panel,
        handle,
        close,
        title,
        content,
        scrollbar,
    }
}
