//! Modal overlay controller.
//!
//! An `Overlay` is driven entirely by the `OverlayProps` it is handed on
//! each `sync`. The caller owns `is_open`; the overlay only asks for it to
//! change through `on_close`. While open, the overlay holds a session on
//! the document:
//!
//! - a layer mounted above the page (backdrop, panel, close control)
//! - an Escape listener, when `close_on_escape` is set
//! - a Tab listener keeping focus inside the panel
//! - a hold on the page's scroll lock
//!
//! All of it is released when `is_open` goes false, when the mount point
//! goes away, or when the overlay is dropped.
//!
//! Overlays stack. Only the top-most one answers Escape, Tab and clicks;
//! the scroll lock lasts until the last one closes.

mod focus_trap;
mod layout;
mod session;
mod view;

pub use layout::{Anchor, OverlayLayout, OverlaySize, DEFAULT_NARROW_BREAKPOINT};

use std::fmt;
use std::rc::Rc;

use ratatui::layout::Rect;

use crate::document::{Callback, Document, Element, ElementId};
use session::OverlaySession;
use view::OverlayView;

/// Inputs for one render of an overlay.
#[derive(Clone)]
pub struct OverlayProps {
    pub is_open: bool,
    pub on_close: Callback,
    pub title: Option<String>,
    pub size: OverlaySize,
    pub close_on_escape: bool,
    pub close_on_backdrop_click: bool,
    pub content: Vec<Element>,
}

impl OverlayProps {
    pub fn new(is_open: bool, on_close: Callback) -> Self {
        Self {
            is_open,
            on_close,
            title: None,
            size: OverlaySize::default(),
            close_on_escape: true,
            close_on_backdrop_click: true,
            content: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn size(mut self, size: OverlaySize) -> Self {
        self.size = size;
        self
    }

    pub fn close_on_escape(mut self, enabled: bool) -> Self {
        self.close_on_escape = enabled;
        self
    }

    pub fn close_on_backdrop_click(mut self, enabled: bool) -> Self {
        self.close_on_backdrop_click = enabled;
        self
    }

    pub fn content(mut self, content: Vec<Element>) -> Self {
        self.content = content;
        self
    }
}

impl fmt::Debug for OverlayProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayProps")
            .field("is_open", &self.is_open)
            .field("title", &self.title)
            .field("size", &self.size)
            .field("close_on_escape", &self.close_on_escape)
            .field("close_on_backdrop_click", &self.close_on_backdrop_click)
            .field("content", &self.content.len())
            .finish()
    }
}

pub struct Overlay {
    close_id: ElementId,
    breakpoint: u16,
    session: Option<OverlaySession>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Overlay {
    pub fn new() -> Self {
        Self::with_breakpoint(DEFAULT_NARROW_BREAKPOINT)
    }

    /// Viewports narrower than `breakpoint` columns get a bottom sheet.
    pub fn with_breakpoint(breakpoint: u16) -> Self {
        Self {
            close_id: ElementId::new(),
            breakpoint,
            session: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// The always-present close control.
    pub fn close_control(&self) -> ElementId {
        self.close_id
    }

    pub fn layout(&self, props: &OverlayProps, viewport: Rect) -> OverlayLayout {
        self.view(props).layout(viewport)
    }

    fn view(&self, props: &OverlayProps) -> OverlayView {
        OverlayView::new(props, self.close_id, self.breakpoint)
    }

    /// Reconcile with `props`. `host` is the document to mount into; with
    /// no host nothing is rendered and any open session is released.
    pub fn sync(&mut self, props: &OverlayProps, host: Option<&Document>) {
        let Some(document) = host else {
            if self.session.take().is_some() {
                tracing::debug!(title = ?props.title, "mount point gone, overlay released");
            }
            return;
        };

        if !props.is_open {
            if self.session.take().is_some() {
                tracing::debug!(title = ?props.title, "overlay closed");
            }
            return;
        }

        let view = self.view(props);
        if let Some(session) = self.session.as_mut() {
            session.update(view, props.close_on_escape);
            return;
        }

        self.session = Some(OverlaySession::open(document, view, props.close_on_escape));
        tracing::debug!(title = ?props.title, size = props.size.as_str(), "overlay opened");
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("close_id", &self.close_id)
            .field("breakpoint", &self.breakpoint)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Wrap a closure as a `Callback`.
pub fn callback(f: impl Fn() + 'static) -> Callback {
    Rc::new(f)
}
