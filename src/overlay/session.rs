use std::cell::RefCell;
use std::rc::Rc;

use super::focus_trap;
use super::view::OverlayView;
use crate::document::{
    Callback, Document, KeyListener, KeyPress, ListenerHandle, PortalHandle, PortalId,
    ScrollLock,
};

/// Everything an open overlay holds on the document. Dropping the
/// session gives all of it back; the document returns focus when the
/// layer is unmounted.
pub(super) struct OverlaySession {
    document: Document,
    on_close: Rc<RefCell<Callback>>,
    escape: Option<ListenerHandle>,
    _trap: ListenerHandle,
    _scroll: ScrollLock,
    portal: PortalHandle,
}

impl OverlaySession {
    pub fn open(document: &Document, view: OverlayView, close_on_escape: bool) -> Self {
        let initial_focus = view.initial_focus();
        let on_close = Rc::new(RefCell::new(view.on_close()));

        let portal = document.mount(Rc::new(view));
        let escape = close_on_escape
            .then(|| document.add_key_listener(escape_listener(portal.id(), Rc::clone(&on_close))));
        let trap = document.add_key_listener(trap_listener(portal.id()));
        let scroll = document.lock_scroll();
        document.focus(initial_focus);

        Self {
            document: document.clone(),
            on_close,
            escape,
            _trap: trap,
            _scroll: scroll,
            portal,
        }
    }

    /// Take in new props while staying open.
    pub fn update(&mut self, view: OverlayView, close_on_escape: bool) {
        *self.on_close.borrow_mut() = view.on_close();

        match (close_on_escape, self.escape.is_some()) {
            (true, false) => {
                let listener = escape_listener(self.portal.id(), Rc::clone(&self.on_close));
                self.escape = Some(self.document.add_key_listener(listener));
            }
            (false, true) => self.escape = None,
            _ => {}
        }

        self.portal.replace(Rc::new(view));
    }
}

fn escape_listener(portal: PortalId, on_close: Rc<RefCell<Callback>>) -> KeyListener {
    Rc::new(move |document: &Document, press: &mut KeyPress| {
        // a press is handled once, even if layers change under it
        if !press.is_escape() || press.default_prevented() || !document.is_topmost(portal) {
            return;
        }
        press.prevent_default();
        tracing::debug!("escape closes overlay");
        let on_close = Rc::clone(&on_close.borrow());
        on_close();
    })
}

fn trap_listener(portal: PortalId) -> KeyListener {
    Rc::new(move |document: &Document, press: &mut KeyPress| {
        if !press.is_tab() || press.default_prevented() || !document.is_topmost(portal) {
            return;
        }
        let focusables = document.focusables_in(portal);
        if let Some(target) =
            focus_trap::wrap_target(&focusables, document.active_element(), press.shift())
        {
            press.prevent_default();
            document.focus(target);
            tracing::debug!("focus wrapped inside overlay");
        }
    })
}
