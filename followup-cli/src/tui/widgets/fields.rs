use crossterm::event::KeyCode;

/// Single-line text input with a character cursor
#[derive(Clone, Default)]
pub struct TextInputField {
    pub value: String,
    cursor: usize,
    masked: bool,
}

impl TextInputField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input whose value is shown as `*`
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    /// Apply an editing key, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        let len = self.value.chars().count();
        match key {
            KeyCode::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let at = self.byte_offset(self.cursor - 1);
                    self.value.remove(at);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    let at = self.byte_offset(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => return false,
        }
        true
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set value, cursor is positioned at the end
    pub fn set_value(&mut self, value: String) {
        self.cursor = value.chars().count();
        self.value = value;
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// What the screen shows
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Pick one of a fixed list of options with Left/Right
#[derive(Clone, Default)]
pub struct ChoiceField {
    options: Vec<String>,
    selected: usize,
}

impl ChoiceField {
    pub fn new(options: Vec<String>) -> Self {
        Self { options, selected: 0 }
    }

    pub fn value(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }

    /// Select an option by value, returns false when it isn't offered
    pub fn select_value(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o == value) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    /// Left/Right cycle through the options, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        if self.options.is_empty() {
            return false;
        }
        match key {
            KeyCode::Left => {
                self.selected = self.selected.checked_sub(1).unwrap_or(self.options.len() - 1);
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                self.selected = (self.selected + 1) % self.options.len();
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_editing() {
        let mut field = TextInputField::new();
        for c in "Leticia".chars() {
            field.handle_key(KeyCode::Char(c));
        }
        field.handle_key(KeyCode::Home);
        field.handle_key(KeyCode::Delete);
        field.handle_key(KeyCode::Char('L'));
        assert_eq!(field.value(), "Leticia");

        field.handle_key(KeyCode::End);
        field.handle_key(KeyCode::Backspace);
        assert_eq!(field.value(), "Letici");
        assert_eq!(field.cursor(), 6);
    }

    #[test]
    fn test_multibyte_input() {
        let mut field = TextInputField::new();
        field.set_value("Cobrança".into());
        field.handle_key(KeyCode::Left);
        field.handle_key(KeyCode::Backspace);
        assert_eq!(field.value(), "Cobrana");
    }

    #[test]
    fn test_masked_display() {
        let mut field = TextInputField::masked();
        field.set_value("secret".into());
        assert_eq!(field.display(), "******");
        assert_eq!(field.value(), "secret");
    }

    #[test]
    fn test_choice_cycles() {
        let mut choice = ChoiceField::new(vec!["a".into(), "b".into(), "c".into()]);
        choice.handle_key(KeyCode::Left);
        assert_eq!(choice.value(), Some("c"));
        choice.handle_key(KeyCode::Right);
        assert_eq!(choice.value(), Some("a"));
    }

    #[test]
    fn test_select_value() {
        let mut choice = ChoiceField::new(vec!["a".into(), "b".into()]);
        assert!(choice.select_value("b"));
        assert_eq!(choice.value(), Some("b"));
        assert!(!choice.select_value("zzz"));
        assert_eq!(choice.value(), Some("b"));
    }
}
