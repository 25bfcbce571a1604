use crossterm::event::KeyCode;

/// Manages list selection and scrolling state
#[derive(Debug, Clone)]
pub struct ListState {
    selected: Option<usize>,
    scroll_offset: usize,
    scroll_off: usize, // Rows from edge before scrolling (like vim scrolloff)
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListState {
    pub fn new() -> Self {
        Self {
            selected: None,
            scroll_offset: 0,
            scroll_off: 3,
        }
    }

    pub fn with_selection() -> Self {
        Self {
            selected: Some(0),
            ..Self::new()
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Set selected index and reset scrolling
    pub fn reset(&mut self, item_count: usize) {
        self.selected = if item_count > 0 { Some(0) } else { None };
        self.scroll_offset = 0;
    }

    /// Handle navigation key, returns true if handled
    pub fn handle_key(&mut self, key: KeyCode, item_count: usize, visible_height: usize) -> bool {
        if item_count == 0 {
            return false;
        }

        let current = self.selected.unwrap_or(0);
        let next = match key {
            KeyCode::Up => {
                if current == 0 {
                    item_count - 1
                } else {
                    current - 1
                }
            }
            KeyCode::Down => {
                if current + 1 >= item_count {
                    0
                } else {
                    current + 1
                }
            }
            KeyCode::PageUp => current.saturating_sub(visible_height),
            KeyCode::PageDown => (current + visible_height).min(item_count - 1),
            KeyCode::Home => 0,
            KeyCode::End => item_count - 1,
            _ => return false,
        };

        self.selected = Some(next);
        self.update_scroll(visible_height, item_count);
        true
    }

    /// Keep the selection visible with `scroll_off` rows of margin
    pub fn update_scroll(&mut self, visible_height: usize, item_count: usize) {
        if let Some(sel) = self.selected {
            let min_scroll = sel.saturating_sub(visible_height.saturating_sub(self.scroll_off + 1));
            let max_scroll = sel.saturating_sub(self.scroll_off);

            if self.scroll_offset < min_scroll {
                self.scroll_offset = min_scroll;
            } else if self.scroll_offset > max_scroll {
                self.scroll_offset = max_scroll;
            }

            let max_offset = item_count.saturating_sub(visible_height);
            self.scroll_offset = self.scroll_offset.min(max_offset);
        }
    }
}
