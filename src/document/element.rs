use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::Callback;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an element, stable for as long as the caller keeps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ElementId(u64);

impl ElementId {
    pub fn new() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Text(String),
    Button(String),
    Link { label: String, href: String },
    Input { label: String, value: String },
    Select { label: String, options: Vec<String>, selected: usize },
    TextArea { label: String, value: String },
    /// Anything else; focusable when it carries a tab index other than -1.
    Custom { label: String, tab_index: Option<i32> },
}

impl ElementKind {
    /// Mirrors `button, [href], input, select, textarea, [tabindex]:not([tabindex='-1'])`.
    pub fn is_focusable(&self) -> bool {
        match self {
            ElementKind::Text(_) => false,
            ElementKind::Button(_)
            | ElementKind::Link { .. }
            | ElementKind::Input { .. }
            | ElementKind::Select { .. }
            | ElementKind::TextArea { .. } => true,
            ElementKind::Custom { tab_index, .. } => matches!(tab_index, Some(i) if *i != -1),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ElementKind::Text(text) | ElementKind::Button(text) => text,
            ElementKind::Link { label, .. }
            | ElementKind::Input { label, .. }
            | ElementKind::Select { label, .. }
            | ElementKind::TextArea { label, .. }
            | ElementKind::Custom { label, .. } => label,
        }
    }
}

/// A node of page or panel content.
#[derive(Clone)]
pub struct Element {
    id: ElementId,
    kind: ElementKind,
    on_activate: Option<Callback>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            on_activate: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Text(text.into()))
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::new(ElementKind::Button(label.into()))
    }

    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(ElementKind::Link {
            label: label.into(),
            href: href.into(),
        })
    }

    pub fn input(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ElementKind::Input {
            label: label.into(),
            value: value.into(),
        })
    }

    pub fn select(label: impl Into<String>, options: Vec<String>, selected: usize) -> Self {
        Self::new(ElementKind::Select {
            label: label.into(),
            options,
            selected,
        })
    }

    pub fn textarea(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ElementKind::TextArea {
            label: label.into(),
            value: value.into(),
        })
    }

    pub fn custom(label: impl Into<String>, tab_index: Option<i32>) -> Self {
        Self::new(ElementKind::Custom {
            label: label.into(),
            tab_index,
        })
    }

    /// Keep an existing identity, e.g. when rebuilding a status line.
    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    pub fn on_activate(mut self, callback: Callback) -> Self {
        self.on_activate = Some(callback);
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn is_focusable(&self) -> bool {
        self.kind.is_focusable()
    }

    pub fn activation(&self) -> Option<Callback> {
        self.on_activate.clone()
    }

    /// Rows this element occupies when rendered.
    pub fn height(&self) -> u16 {
        let rows = match &self.kind {
            ElementKind::Text(text) => text.lines().count().max(1),
            ElementKind::TextArea { value, .. } => 1 + value.lines().count().max(1),
            _ => 1,
        };
        u16::try_from(rows).unwrap_or(u16::MAX)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("activatable", &self.on_activate.is_some())
            .finish()
    }
}

/// Total rows of a run of elements.
pub fn stacked_height(elements: &[Element]) -> u16 {
    elements
        .iter()
        .fold(0u16, |acc, element| acc.saturating_add(element.height()))
}

/// Row offset and height of `id` inside a run of elements.
pub fn row_span(elements: &[Element], id: ElementId) -> Option<(u16, u16)> {
    let mut row = 0u16;
    for element in elements {
        let height = element.height();
        if element.id() == id {
            return Some((row, height));
        }
        row = row.saturating_add(height);
    }
    None
}

/// Element rendered at `row` of a run of elements.
pub fn element_at_row(elements: &[Element], row: u16) -> Option<&Element> {
    let mut top = 0u16;
    for element in elements {
        let bottom = top.saturating_add(element.height());
        if row >= top && row < bottom {
            return Some(element);
        }
        top = bottom;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focusable_selector() {
        assert!(!Element::text("hello").is_focusable());
        assert!(Element::button("ok").is_focusable());
        assert!(Element::link("docs", "https://example.org").is_focusable());
        assert!(Element::input("Name", "").is_focusable());
        assert!(Element::select("Plan", vec!["free".into()], 0).is_focusable());
        assert!(Element::textarea("Notes", "").is_focusable());
        assert!(Element::custom("card", Some(0)).is_focusable());
        assert!(Element::custom("card", Some(3)).is_focusable());
        assert!(!Element::custom("card", Some(-1)).is_focusable());
        assert!(!Element::custom("card", None).is_focusable());
    }

    #[test]
    fn test_heights_and_rows() {
        let a = Element::text("one\ntwo\nthree");
        let b = Element::button("ok");
        let c = Element::textarea("Notes", "x\ny");
        let elements = vec![a.clone(), b.clone(), c.clone()];

        assert_eq!(a.height(), 3);
        assert_eq!(c.height(), 3);
        assert_eq!(stacked_height(&elements), 7);
        assert_eq!(row_span(&elements, b.id()), Some((3, 1)));
        assert_eq!(element_at_row(&elements, 3).map(Element::id), Some(b.id()));
        assert_eq!(element_at_row(&elements, 6).map(Element::id), Some(c.id()));
        assert!(element_at_row(&elements, 7).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Element::button("a").id(), Element::button("a").id());
    }
}
