//! Guards for document resources. Each one is released when dropped.

use std::rc::Rc;

use super::{Document, ListenerId, Portal, PortalId};

/// A registered key listener.
#[must_use = "the listener is removed when the handle is dropped"]
pub struct ListenerHandle {
    document: Document,
    id: ListenerId,
}

impl ListenerHandle {
    pub(super) fn new(document: Document, id: ListenerId) -> Self {
        Self { document, id }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.document.remove_listener(self.id);
    }
}

/// A layer mounted above the page.
#[must_use = "the layer is unmounted when the handle is dropped"]
pub struct PortalHandle {
    document: Document,
    id: PortalId,
}

impl PortalHandle {
    pub(super) fn new(document: Document, id: PortalId) -> Self {
        Self { document, id }
    }

    pub fn id(&self) -> PortalId {
        self.id
    }

    /// Swap the mounted content, keeping the layer's position in the stack.
    pub fn replace(&self, portal: Rc<dyn Portal>) {
        self.document.replace_portal(self.id, portal);
    }
}

impl Drop for PortalHandle {
    fn drop(&mut self) {
        self.document.unmount(self.id);
    }
}

/// One hold on the page's scroll lock.
#[must_use = "the lock is released when the guard is dropped"]
pub struct ScrollLock {
    document: Document,
}

impl ScrollLock {
    pub(super) fn new(document: Document) -> Self {
        Self { document }
    }
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.document.release_scroll_lock();
    }
}
