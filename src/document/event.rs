use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key press travelling through the document's listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    code: KeyCode,
    modifiers: KeyModifiers,
    default_prevented: bool,
}

impl KeyPress {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers,
            default_prevented: false,
        }
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn is_escape(&self) -> bool {
        self.code == KeyCode::Esc
    }

    /// Tab or Shift-Tab. Terminals report the latter as `BackTab`.
    pub fn is_tab(&self) -> bool {
        matches!(self.code, KeyCode::Tab | KeyCode::BackTab)
    }

    pub fn shift(&self) -> bool {
        self.code == KeyCode::BackTab || self.modifiers.contains(KeyModifiers::SHIFT)
    }

    /// Skip the document's default action for this key.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl From<KeyEvent> for KeyPress {
    fn from(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_tab_variants() {
        assert!(KeyPress::from(KeyCode::BackTab).shift());
        assert!(KeyPress::new(KeyCode::Tab, KeyModifiers::SHIFT).shift());
        assert!(!KeyPress::from(KeyCode::Tab).shift());
        assert!(KeyPress::from(KeyCode::BackTab).is_tab());
    }

    #[test]
    fn test_prevent_default() {
        let mut press = KeyPress::from(KeyCode::Esc);
        assert!(press.is_escape());
        assert!(!press.default_prevented());
        press.prevent_default();
        assert!(press.default_prevented());
    }
}
