//! The host document: page content, focus, key listeners and layers
//! mounted above the page.
//!
//! `Document` is a handle; clones share one document. Listeners and
//! callbacks always run with no internal borrow held, so they may call
//! back into the document freely.

mod element;
mod event;
mod handle;

pub use element::{element_at_row, row_span, stacked_height, Element, ElementId, ElementKind};
pub use event::KeyPress;
pub use handle::{ListenerHandle, PortalHandle, ScrollLock};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crossterm::event::KeyCode;
use ratatui::{buffer::Buffer, layout::Rect};
use serde::Serialize;

/// Caller-supplied action with no arguments.
pub type Callback = Rc<dyn Fn()>;

/// Document-level key listener. May call `prevent_default` on the press.
pub type KeyListener = Rc<dyn Fn(&Document, &mut KeyPress)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Auto,
    Hidden,
}

/// Style of the page itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BodyStyle {
    pub overflow: Overflow,
    pub padding_right: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortalId(u64);

/// What a pointer landed on inside a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Backdrop,
    Panel,
    Element(ElementId),
}

/// Content mounted as a layer above the page.
pub trait Portal {
    /// Elements in document order.
    fn elements(&self) -> &[Element];

    fn hit_test(&self, viewport: Rect, column: u16, row: u16, focused: Option<ElementId>) -> Hit;

    fn backdrop_click(&self);

    fn render(&self, viewport: Rect, buf: &mut Buffer, focused: Option<ElementId>, is_top: bool);

    fn describe(&self, viewport: Rect) -> LayerSnapshot;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSnapshot {
    pub title: Option<String>,
    pub size: String,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub focusables: usize,
    pub top: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSnapshot {
    pub width: u16,
    pub height: u16,
    pub style: BodyStyle,
    pub scrollbar_width: u16,
    pub scroll_locked: bool,
    pub scroll_offset: u16,
    pub listeners: usize,
    pub layers: Vec<LayerSnapshot>,
    pub active_element: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct LockState {
    holders: usize,
    saved: BodyStyle,
}

/// A mounted layer and the element that had focus when it was mounted.
struct Layer {
    id: PortalId,
    portal: Rc<dyn Portal>,
    restore_focus: Option<ElementId>,
}

struct DocumentState {
    viewport: Rect,
    body: Vec<Element>,
    scroll: u16,
    style: BodyStyle,
    listeners: Vec<(ListenerId, KeyListener)>,
    layers: Vec<Layer>,
    active: Option<ElementId>,
    scroll_lock: Option<LockState>,
    next_id: u64,
}

impl DocumentState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn body_height(&self) -> u16 {
        stacked_height(&self.body)
    }

    fn max_scroll(&self) -> u16 {
        self.body_height().saturating_sub(self.viewport.height)
    }

    fn scrollbar_width(&self) -> u16 {
        if self.style.overflow == Overflow::Auto && self.body_height() > self.viewport.height {
            1
        } else {
            0
        }
    }
}

#[derive(Clone)]
pub struct Document {
    state: Rc<RefCell<DocumentState>>,
}

impl Document {
    pub fn new(viewport: Rect) -> Self {
        Self {
            state: Rc::new(RefCell::new(DocumentState {
                viewport,
                body: Vec::new(),
                scroll: 0,
                style: BodyStyle::default(),
                listeners: Vec::new(),
                layers: Vec::new(),
                active: None,
                scroll_lock: None,
                next_id: 0,
            })),
        }
    }

    // --- Page ---

    pub fn viewport(&self) -> Rect {
        self.state.borrow().viewport
    }

    pub fn resize(&self, viewport: Rect) {
        let mut state = self.state.borrow_mut();
        state.viewport = viewport;
        state.scroll = state.scroll.min(state.max_scroll());
    }

    pub fn set_body(&self, elements: Vec<Element>) {
        {
            let mut state = self.state.borrow_mut();
            state.body = elements;
            state.scroll = state.scroll.min(state.max_scroll());
        }
        self.drop_stale_focus();
    }

    pub fn body(&self) -> Vec<Element> {
        self.state.borrow().body.clone()
    }

    pub fn body_height(&self) -> u16 {
        self.state.borrow().body_height()
    }

    pub fn scroll_offset(&self) -> u16 {
        self.state.borrow().scroll
    }

    /// Scroll the page by `delta` rows. Returns whether the offset moved.
    /// A page with hidden overflow never scrolls.
    pub fn scroll_page(&self, delta: i32) -> bool {
        let mut state = self.state.borrow_mut();
        if state.style.overflow == Overflow::Hidden {
            return false;
        }
        let max = i32::from(state.max_scroll());
        let next = (i32::from(state.scroll) + delta).clamp(0, max);
        let next = u16::try_from(next).unwrap_or(0);
        let moved = next != state.scroll;
        state.scroll = next;
        moved
    }

    pub fn style(&self) -> BodyStyle {
        self.state.borrow().style
    }

    pub fn set_style(&self, style: BodyStyle) {
        self.state.borrow_mut().style = style;
    }

    /// Columns taken by the page scrollbar right now.
    pub fn scrollbar_width(&self) -> u16 {
        self.state.borrow().scrollbar_width()
    }

    /// Width left for page content after the scrollbar and padding.
    pub fn client_width(&self) -> u16 {
        let state = self.state.borrow();
        state
            .viewport
            .width
            .saturating_sub(state.scrollbar_width())
            .saturating_sub(state.style.padding_right)
    }

    // --- Scroll lock ---

    /// Take a hold on the scroll lock. The first hold hides overflow and
    /// pads the page by the scrollbar's width. The last release puts the
    /// style back exactly as it was.
    pub fn lock_scroll(&self) -> ScrollLock {
        {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            if let Some(lock) = state.scroll_lock.as_mut() {
                lock.holders += 1;
            } else {
                let gutter = state.scrollbar_width();
                let saved = state.style;
                state.scroll_lock = Some(LockState { holders: 1, saved });
                state.style = BodyStyle {
                    overflow: Overflow::Hidden,
                    padding_right: saved.padding_right.saturating_add(gutter),
                };
                tracing::debug!(gutter, "page scroll locked");
            }
        }
        ScrollLock::new(self.clone())
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.state.borrow().scroll_lock.is_some()
    }

    pub(crate) fn release_scroll_lock(&self) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(lock) = state.scroll_lock.as_mut() else {
            return;
        };
        lock.holders = lock.holders.saturating_sub(1);
        if lock.holders == 0 {
            state.style = lock.saved;
            state.scroll_lock = None;
            tracing::debug!("page scroll unlocked");
        }
    }

    // --- Listeners ---

    pub fn add_key_listener(&self, listener: KeyListener) -> ListenerHandle {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = ListenerId(state.next_id());
            state.listeners.push((id, listener));
            id
        };
        ListenerHandle::new(self.clone(), id)
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub(crate) fn remove_listener(&self, id: ListenerId) {
        self.state
            .borrow_mut()
            .listeners
            .retain(|(listener, _)| *listener != id);
    }

    // --- Layers ---

    /// Mount a layer on top. Whatever has focus now gets it back when the
    /// layer goes away.
    pub fn mount(&self, portal: Rc<dyn Portal>) -> PortalHandle {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = PortalId(state.next_id());
            let restore_focus = state.active;
            state.layers.push(Layer {
                id,
                portal,
                restore_focus,
            });
            id
        };
        PortalHandle::new(self.clone(), id)
    }

    pub(crate) fn replace_portal(&self, id: PortalId, portal: Rc<dyn Portal>) {
        {
            let mut state = self.state.borrow_mut();
            if let Some(layer) = state.layers.iter_mut().find(|layer| layer.id == id) {
                layer.portal = portal;
            }
        }
        self.drop_stale_focus();
    }

    /// Remove a layer. The top layer gives focus back to what had it at
    /// mount time. A layer below the top hands that element to the layer
    /// right above it, so focus never leaves the top panel.
    pub(crate) fn unmount(&self, id: PortalId) {
        let (removed, covered) = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            let Some(index) = state.layers.iter().position(|layer| layer.id == id) else {
                return;
            };
            let removed = state.layers.remove(index);
            let owned = |e: ElementId| removed.portal.elements().iter().any(|el| el.id() == e);

            let covered = if let Some(above) = state.layers.get_mut(index) {
                if above.restore_focus.map_or(true, |e| owned(e)) {
                    above.restore_focus = removed.restore_focus;
                }
                true
            } else {
                false
            };
            if state.active.is_some_and(|e| owned(e)) {
                state.active = None;
            }
            (removed, covered)
        };

        if covered {
            tracing::debug!("covered layer removed, focus stays on top");
            return;
        }
        if self.active_element().is_none() {
            if let Some(previous) = removed.restore_focus {
                self.focus(previous);
            }
        }
    }

    pub fn layer_count(&self) -> usize {
        self.state.borrow().layers.len()
    }

    /// Mounted layers, bottom first.
    pub fn layers(&self) -> Vec<Rc<dyn Portal>> {
        self.state
            .borrow()
            .layers
            .iter()
            .map(|layer| Rc::clone(&layer.portal))
            .collect()
    }

    pub fn is_topmost(&self, id: PortalId) -> bool {
        self.state
            .borrow()
            .layers
            .last()
            .is_some_and(|layer| layer.id == id)
    }

    /// Focusable elements of one layer, in document order.
    pub fn focusables_in(&self, id: PortalId) -> Vec<ElementId> {
        let portal = self
            .state
            .borrow()
            .layers
            .iter()
            .find(|layer| layer.id == id)
            .map(|layer| Rc::clone(&layer.portal));
        portal
            .map(|portal| focusable_ids(portal.elements()))
            .unwrap_or_default()
    }

    // --- Focus ---

    pub fn active_element(&self) -> Option<ElementId> {
        self.state.borrow().active
    }

    /// Focus `id` if it is in the document. Returns whether focus moved there.
    pub fn focus(&self, id: ElementId) -> bool {
        if self.find_element(id).is_none() {
            return false;
        }
        self.state.borrow_mut().active = Some(id);
        true
    }

    pub fn blur(&self) {
        self.state.borrow_mut().active = None;
    }

    pub fn find_element(&self, id: ElementId) -> Option<Element> {
        let layers = {
            let state = self.state.borrow();
            if let Some(element) = state.body.iter().find(|e| e.id() == id) {
                return Some(element.clone());
            }
            state
                .layers
                .iter()
                .map(|layer| Rc::clone(&layer.portal))
                .collect::<Vec<_>>()
        };
        layers
            .iter()
            .find_map(|portal| portal.elements().iter().find(|e| e.id() == id).cloned())
    }

    /// Focusable elements of the page, then of each layer bottom to top.
    pub fn tab_order(&self) -> Vec<ElementId> {
        let (mut order, layers) = {
            let state = self.state.borrow();
            let layers: Vec<_> = state
                .layers
                .iter()
                .map(|layer| Rc::clone(&layer.portal))
                .collect();
            (focusable_ids(&state.body), layers)
        };
        for portal in layers {
            order.extend(focusable_ids(portal.elements()));
        }
        order
    }

    fn drop_stale_focus(&self) {
        if let Some(active) = self.active_element() {
            if self.find_element(active).is_none() {
                self.blur();
            }
        }
    }

    fn activate(&self, id: ElementId) {
        if let Some(callback) = self.find_element(id).and_then(|e| e.activation()) {
            callback();
        }
    }

    fn move_focus(&self, backwards: bool) {
        let order = self.tab_order();
        if order.is_empty() {
            return;
        }
        let len = order.len();
        let position = self
            .active_element()
            .and_then(|active| order.iter().position(|id| *id == active));
        let next = match (position, backwards) {
            (Some(i), false) => (i + 1) % len,
            (Some(i), true) => (i + len - 1) % len,
            (None, false) => 0,
            (None, true) => len - 1,
        };
        self.focus(order[next]);
        self.scroll_into_view(order[next]);
    }

    /// Scroll the page so a page element is fully visible.
    fn scroll_into_view(&self, id: ElementId) {
        let mut state = self.state.borrow_mut();
        if state.style.overflow == Overflow::Hidden {
            return;
        }
        let Some((row, height)) = row_span(&state.body, id) else {
            return;
        };
        let visible = state.viewport.height;
        if row < state.scroll {
            state.scroll = row;
        } else if row.saturating_add(height) > state.scroll.saturating_add(visible) {
            state.scroll = row.saturating_add(height).saturating_sub(visible);
        }
        state.scroll = state.scroll.min(state.max_scroll());
    }

    // --- Dispatch ---

    /// Run every key listener in registration order, then the default
    /// action unless a listener prevented it.
    pub fn dispatch_key(&self, press: impl Into<KeyPress>) -> KeyPress {
        let mut press = press.into();
        let listeners: Vec<(ListenerId, KeyListener)> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();
        for (id, listener) in listeners {
            // an earlier listener may have removed this one
            let registered = self.state.borrow().listeners.iter().any(|(l, _)| *l == id);
            if registered {
                listener(self, &mut press);
            }
        }
        if !press.default_prevented() {
            self.default_key_action(&press);
        }
        press
    }

    fn default_key_action(&self, press: &KeyPress) {
        let page = i32::from(self.viewport().height.saturating_sub(1).max(1));
        match press.code() {
            KeyCode::Tab | KeyCode::BackTab => self.move_focus(press.shift()),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(active) = self.active_element() {
                    self.activate(active);
                }
            }
            KeyCode::Up => {
                self.scroll_page(-1);
            }
            KeyCode::Down => {
                self.scroll_page(1);
            }
            KeyCode::PageUp => {
                self.scroll_page(-page);
            }
            KeyCode::PageDown => {
                self.scroll_page(page);
            }
            KeyCode::Home => {
                self.scroll_page(i32::MIN / 2);
            }
            KeyCode::End => {
                self.scroll_page(i32::MAX / 2);
            }
            _ => {}
        }
    }

    /// Route a primary click to the top-most layer.
    pub fn dispatch_click(&self, column: u16, row: u16) {
        let (top, viewport) = {
            let state = self.state.borrow();
            (
                state.layers.last().map(|layer| Rc::clone(&layer.portal)),
                state.viewport,
            )
        };
        let Some(portal) = top else {
            return;
        };
        match portal.hit_test(viewport, column, row, self.active_element()) {
            Hit::Element(id) => {
                if self.focus(id) {
                    self.activate(id);
                }
            }
            Hit::Backdrop => portal.backdrop_click(),
            Hit::Panel => {}
        }
    }

    /// Mouse wheel. Layers swallow it; the page scrolls unless locked.
    pub fn dispatch_wheel(&self, delta: i32) {
        if self.layer_count() > 0 {
            return;
        }
        self.scroll_page(delta);
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        let layers = self.layers();
        let viewport = self.viewport();
        let count = layers.len();
        let layers = layers
            .iter()
            .enumerate()
            .map(|(i, portal)| LayerSnapshot {
                top: i + 1 == count,
                ..portal.describe(viewport)
            })
            .collect();
        let active_element = self
            .active_element()
            .and_then(|id| self.find_element(id))
            .map(|e| e.kind().label().to_string());
        let state = self.state.borrow();
        DocumentSnapshot {
            width: viewport.width,
            height: viewport.height,
            style: state.style,
            scrollbar_width: state.scrollbar_width(),
            scroll_locked: state.scroll_lock.is_some(),
            scroll_offset: state.scroll,
            listeners: state.listeners.len(),
            layers,
            active_element,
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Document")
            .field("viewport", &state.viewport)
            .field("style", &state.style)
            .field("listeners", &state.listeners.len())
            .field("layers", &state.layers.len())
            .field("active", &state.active)
            .finish()
    }
}

fn focusable_ids(elements: &[Element]) -> Vec<ElementId> {
    elements
        .iter()
        .filter(|e| e.is_focusable())
        .map(Element::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn long_page(rows: usize) -> Vec<Element> {
        (0..rows).map(|i| Element::text(format!("line {i}"))).collect()
    }

    /// A layer covering everything with one button; clicks off the
    /// button hit the backdrop.
    struct TestLayer {
        elements: Vec<Element>,
        backdrop_clicks: Rc<Cell<usize>>,
    }

    impl Portal for TestLayer {
        fn elements(&self) -> &[Element] {
            &self.elements
        }

        fn hit_test(&self, _: Rect, column: u16, row: u16, _: Option<ElementId>) -> Hit {
            match (column, row) {
                (0, 0) => Hit::Element(self.elements[0].id()),
                (1, 0) => Hit::Panel,
                _ => Hit::Backdrop,
            }
        }

        fn backdrop_click(&self) {
            self.backdrop_clicks.set(self.backdrop_clicks.get() + 1);
        }

        fn render(&self, _: Rect, _: &mut Buffer, _: Option<ElementId>, _: bool) {}

        fn describe(&self, _: Rect) -> LayerSnapshot {
            LayerSnapshot {
                title: None,
                size: "test".into(),
                x: 0,
                y: 0,
                width: 0,
                height: 0,
                focusables: self.elements.len(),
                top: false,
            }
        }
    }

    fn test_layer(button: Element) -> (Rc<TestLayer>, Rc<Cell<usize>>) {
        let clicks = Rc::new(Cell::new(0));
        let layer = Rc::new(TestLayer {
            elements: vec![button],
            backdrop_clicks: Rc::clone(&clicks),
        });
        (layer, clicks)
    }

    #[test]
    fn test_scrollbar_width_follows_overflow() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        doc.set_body(long_page(5));
        assert_eq!(doc.scrollbar_width(), 0);
        assert_eq!(doc.client_width(), 40);

        doc.set_body(long_page(30));
        assert_eq!(doc.scrollbar_width(), 1);
        assert_eq!(doc.client_width(), 39);
    }

    #[test]
    fn test_scroll_lock_is_counted_and_restores_style() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        doc.set_body(long_page(30));
        let before = BodyStyle {
            overflow: Overflow::Auto,
            padding_right: 2,
        };
        doc.set_style(before);

        let first = doc.lock_scroll();
        assert_eq!(doc.style().overflow, Overflow::Hidden);
        assert_eq!(doc.style().padding_right, 3);
        // content width does not change when the scrollbar goes away
        assert_eq!(doc.client_width(), 40 - 1 - 2);

        let second = doc.lock_scroll();
        drop(first);
        assert!(doc.is_scroll_locked());
        assert_eq!(doc.style().overflow, Overflow::Hidden);

        drop(second);
        assert!(!doc.is_scroll_locked());
        assert_eq!(doc.style(), before);
    }

    #[test]
    fn test_locked_page_does_not_scroll() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        doc.set_body(long_page(30));
        assert!(doc.scroll_page(3));
        assert_eq!(doc.scroll_offset(), 3);

        let lock = doc.lock_scroll();
        assert!(!doc.scroll_page(3));
        doc.dispatch_key(KeyCode::PageDown);
        assert_eq!(doc.scroll_offset(), 3);
        drop(lock);

        doc.dispatch_key(KeyCode::End);
        assert_eq!(doc.scroll_offset(), 20);
    }

    #[test]
    fn test_listener_handle_removes_on_drop() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let handle = doc.add_key_listener(Rc::new(move |_: &Document, press: &mut KeyPress| {
            if press.is_escape() {
                counter.set(counter.get() + 1);
                press.prevent_default();
            }
        }));
        assert_eq!(doc.listener_count(), 1);

        let press = doc.dispatch_key(KeyCode::Esc);
        assert!(press.default_prevented());
        assert_eq!(seen.get(), 1);

        drop(handle);
        assert_eq!(doc.listener_count(), 0);
        doc.dispatch_key(KeyCode::Esc);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_default_tab_wraps_through_page() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        let a = Element::button("a");
        let b = Element::button("b");
        let (a_id, b_id) = (a.id(), b.id());
        doc.set_body(vec![a, Element::text("gap"), b]);

        doc.dispatch_key(KeyCode::Tab);
        assert_eq!(doc.active_element(), Some(a_id));
        doc.dispatch_key(KeyCode::Tab);
        assert_eq!(doc.active_element(), Some(b_id));
        doc.dispatch_key(KeyCode::Tab);
        assert_eq!(doc.active_element(), Some(a_id));
        doc.dispatch_key(KeyCode::BackTab);
        assert_eq!(doc.active_element(), Some(b_id));
    }

    #[test]
    fn test_enter_activates_focused_element() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let button =
            Element::button("go").on_activate(Rc::new(move || counter.set(counter.get() + 1)));
        let id = button.id();
        doc.set_body(vec![button]);

        doc.dispatch_key(KeyCode::Enter);
        assert_eq!(hits.get(), 0);
        assert!(doc.focus(id));
        doc.dispatch_key(KeyCode::Enter);
        doc.dispatch_key(KeyCode::Char(' '));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_focus_rejects_unknown_element() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        assert!(!doc.focus(ElementId::new()));
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_unmount_clears_focus_inside_layer() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        let button = Element::button("inside");
        let id = button.id();
        let (layer, _) = test_layer(button);
        let handle = doc.mount(layer);

        assert_eq!(doc.layer_count(), 1);
        assert!(doc.is_topmost(handle.id()));
        assert_eq!(doc.focusables_in(handle.id()), vec![id]);
        assert!(doc.focus(id));

        drop(handle);
        assert_eq!(doc.layer_count(), 0);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_top_layer_restores_focus_on_unmount() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        let opener = Element::button("open");
        let opener_id = opener.id();
        doc.set_body(vec![opener]);
        doc.focus(opener_id);

        let button = Element::button("inside");
        let inside = button.id();
        let (layer, _) = test_layer(button);
        let handle = doc.mount(layer);
        doc.focus(inside);

        drop(handle);
        assert_eq!(doc.active_element(), Some(opener_id));
    }

    #[test]
    fn test_covered_layer_hands_restore_focus_up() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        let opener = Element::button("open");
        let opener_id = opener.id();
        doc.set_body(vec![opener]);
        doc.focus(opener_id);

        let lower_button = Element::button("lower");
        let lower_id = lower_button.id();
        let (lower, _) = test_layer(lower_button);
        let lower_handle = doc.mount(lower);
        doc.focus(lower_id);

        let upper_button = Element::button("upper");
        let upper_id = upper_button.id();
        let (upper, _) = test_layer(upper_button);
        let upper_handle = doc.mount(upper);
        doc.focus(upper_id);

        // focus stays in the top layer
        drop(lower_handle);
        assert_eq!(doc.active_element(), Some(upper_id));

        // and the top layer now returns it to the page
        drop(upper_handle);
        assert_eq!(doc.active_element(), Some(opener_id));
    }

    #[test]
    fn test_listener_removed_during_dispatch_does_not_run() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        let seen = Rc::new(Cell::new(0));
        let second: Rc<RefCell<Option<ListenerHandle>>> = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&second);
        let _first = doc.add_key_listener(Rc::new(move |_: &Document, _: &mut KeyPress| {
            slot.borrow_mut().take();
        }));
        let counter = Rc::clone(&seen);
        *second.borrow_mut() = Some(doc.add_key_listener(Rc::new(
            move |_: &Document, _: &mut KeyPress| counter.set(counter.get() + 1),
        )));

        doc.dispatch_key(KeyCode::Esc);
        assert_eq!(seen.get(), 0);
        assert_eq!(doc.listener_count(), 1);
    }

    #[test]
    fn test_click_routes_to_top_layer() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        let pressed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&pressed);
        let lower_button = Element::button("lower");
        let upper_button =
            Element::button("upper").on_activate(Rc::new(move || counter.set(counter.get() + 1)));
        let upper_id = upper_button.id();
        let (lower, lower_clicks) = test_layer(lower_button);
        let (upper, upper_clicks) = test_layer(upper_button);
        let _lower = doc.mount(lower);
        let upper_handle = doc.mount(upper);
        assert!(doc.is_topmost(upper_handle.id()));

        doc.dispatch_click(5, 5);
        assert_eq!(upper_clicks.get(), 1);
        assert_eq!(lower_clicks.get(), 0);

        doc.dispatch_click(1, 0);
        assert_eq!(upper_clicks.get(), 1);
        assert_eq!(pressed.get(), 0);

        doc.dispatch_click(0, 0);
        assert_eq!(pressed.get(), 1);
        assert_eq!(doc.active_element(), Some(upper_id));
    }

    #[test]
    fn test_wheel_is_swallowed_by_layers() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        doc.set_body(long_page(30));
        let (layer, _) = test_layer(Element::button("x"));
        let handle = doc.mount(layer);
        doc.dispatch_wheel(2);
        assert_eq!(doc.scroll_offset(), 0);
        drop(handle);
        doc.dispatch_wheel(2);
        assert_eq!(doc.scroll_offset(), 2);
    }

    #[test]
    fn test_snapshot_reports_state() {
        let doc = Document::new(Rect::new(0, 0, 40, 10));
        doc.set_body(long_page(30));
        let (layer, _) = test_layer(Element::button("x"));
        let _handle = doc.mount(layer);
        let _lock = doc.lock_scroll();

        let snapshot = doc.snapshot();
        assert!(snapshot.scroll_locked);
        assert_eq!(snapshot.style.overflow, Overflow::Hidden);
        assert_eq!(snapshot.layers.len(), 1);
        assert!(snapshot.layers[0].top);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["style"]["overflow"], "hidden");
    }
}
