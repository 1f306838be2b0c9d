use crate::document::ElementId;

/// Where Tab (or Shift-Tab when `backwards`) must send focus to stay
/// inside a panel whose focusable elements are `focusables`.
///
/// `None` means the document's own focus move already stays inside, or
/// that there is nothing to trap focus on.
pub fn wrap_target(
    focusables: &[ElementId],
    active: Option<ElementId>,
    backwards: bool,
) -> Option<ElementId> {
    let (first, last) = (*focusables.first()?, *focusables.last()?);
    let inside = active.is_some_and(|id| focusables.contains(&id));

    if !inside {
        return Some(if backwards { last } else { first });
    }
    match (backwards, active) {
        (true, Some(id)) if id == first => Some(last),
        (false, Some(id)) if id == last => Some(first),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> [ElementId; 3] {
        [ElementId::new(), ElementId::new(), ElementId::new()]
    }

    #[test]
    fn test_tab_on_last_wraps_to_first() {
        let [a, b, c] = ids();
        assert_eq!(wrap_target(&[a, b, c], Some(c), false), Some(a));
    }

    #[test]
    fn test_shift_tab_on_first_wraps_to_last() {
        let [a, b, c] = ids();
        assert_eq!(wrap_target(&[a, b, c], Some(a), true), Some(c));
    }

    #[test]
    fn test_middle_moves_are_left_alone() {
        let [a, b, c] = ids();
        assert_eq!(wrap_target(&[a, b, c], Some(a), false), None);
        assert_eq!(wrap_target(&[a, b, c], Some(b), false), None);
        assert_eq!(wrap_target(&[a, b, c], Some(b), true), None);
        assert_eq!(wrap_target(&[a, b, c], Some(c), true), None);
    }

    #[test]
    fn test_no_focusables_means_no_wrap() {
        assert_eq!(wrap_target(&[], None, false), None);
        assert_eq!(wrap_target(&[], Some(ElementId::new()), true), None);
    }

    #[test]
    fn test_focus_outside_is_pulled_in() {
        let [a, b, c] = ids();
        let outside = ElementId::new();
        assert_eq!(wrap_target(&[a, b, c], Some(outside), false), Some(a));
        assert_eq!(wrap_target(&[a, b, c], None, true), Some(c));
    }

    #[test]
    fn test_single_focusable_stays_put() {
        let [a, ..] = ids();
        assert_eq!(wrap_target(&[a], Some(a), false), Some(a));
        assert_eq!(wrap_target(&[a], Some(a), true), Some(a));
    }
}
