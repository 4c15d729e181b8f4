//! Input surface state: the prompt field, its lock, and the selections.
//!
//! The surface is either idle (enabled, accepts edits) or locked while a
//! request is in flight. A locked field ignores every edit.

/// Whether the input surface accepts submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceState {
    /// Enabled; edits and submits are accepted.
    #[default]
    Idle,
    /// Disabled while a request is in flight.
    Locked,
}

/// The prompt field plus the submit control.
///
/// Content is edited at a character cursor. Submitted prompts are kept in
/// a history for up/down recall.
#[derive(Debug, Clone)]
pub struct InputSurface {
    content: String,
    /// Cursor position as a character index.
    cursor: usize,
    state: SurfaceState,
    focused: bool,
    history: Vec<String>,
    /// Current history index (-1 = current input).
    history_index: isize,
    /// Saved current input when navigating history.
    saved_input: String,
}

impl InputSurface {
    /// Create an empty, enabled, focused surface.
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            state: SurfaceState::Idle,
            focused: true,
            history: Vec::new(),
            history_index: -1,
            saved_input: String::new(),
        }
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position as a character index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Current lock state.
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// Whether the field and submit control are enabled.
    pub fn is_enabled(&self) -> bool {
        self.state == SurfaceState::Idle
    }

    /// Whether the field holds input focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Give or take input focus.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Disable the field and submit control.
    pub fn lock(&mut self) {
        self.state = SurfaceState::Locked;
    }

    /// Re-enable the field and submit control and focus the field.
    pub fn unlock(&mut self) {
        self.state = SurfaceState::Idle;
        self.focused = true;
    }

    /// Replace the content, placing the cursor at the end.
    pub fn set_content(&mut self, content: impl Into<String>) {
        if !self.is_enabled() {
            return;
        }
        self.content = content.into();
        self.cursor = self.char_len();
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Take the content for submission, recording it in history.
    ///
    /// Returns the trimmed prompt. Whitespace-only content yields an empty
    /// string and leaves the field untouched.
    pub fn take_prompt(&mut self) -> String {
        let prompt = self.content.trim().to_string();
        if prompt.is_empty() {
            return prompt;
        }
        self.clear();
        self.history.push(prompt.clone());
        self.history_index = -1;
        self.saved_input.clear();
        prompt
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        if !self.is_enabled() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        if !self.is_enabled() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if !self.is_enabled() || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if !self.is_enabled() || self.cursor >= self.char_len() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Navigate to previous history entry.
    pub fn history_prev(&mut self) {
        if !self.is_enabled() || self.history.is_empty() {
            return;
        }

        if self.history_index == -1 {
            self.saved_input = self.content.clone();
        }

        let new_index = self.history_index + 1;
        #[allow(clippy::cast_sign_loss)]
        if (new_index as usize) < self.history.len() {
            self.history_index = new_index;
            #[allow(clippy::cast_sign_loss)]
            {
                self.content = self.history[self.history.len() - 1 - new_index as usize].clone();
            }
            self.cursor = self.char_len();
        }
    }

    /// Navigate to next history entry.
    pub fn history_next(&mut self) {
        if !self.is_enabled() {
            return;
        }
        if self.history_index <= 0 {
            if self.history_index == 0 {
                self.content = std::mem::take(&mut self.saved_input);
                self.cursor = self.char_len();
            }
            self.history_index = -1;
            return;
        }

        self.history_index -= 1;
        #[allow(clippy::cast_sign_loss)]
        {
            self.content =
                self.history[self.history.len() - 1 - self.history_index as usize].clone();
        }
        self.cursor = self.char_len();
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map_or(self.content.len(), |(i, _)| i)
    }
}

impl Default for InputSurface {
    fn default() -> Self {
        Self::new()
    }
}

/// A labelled selection control (persona, language).
///
/// Always holds a value: an empty option list is replaced with a single
/// empty option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    label: String,
    options: Vec<String>,
    selected: usize,
}

impl Selection {
    /// Create a selection with the first option selected.
    pub fn new(label: impl Into<String>, options: Vec<String>) -> Self {
        let options = if options.is_empty() {
            vec![String::new()]
        } else {
            options
        };
        Self {
            label: label.into(),
            options,
            selected: 0,
        }
    }

    /// Create a selection and select `value` when it is one of the options.
    pub fn with_value(label: impl Into<String>, options: Vec<String>, value: &str) -> Self {
        let mut selection = Self::new(label, options);
        selection.select(value);
        selection
    }

    /// Label shown next to the control.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// All options.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index of the selected option.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected value.
    pub fn value(&self) -> &str {
        &self.options[self.selected]
    }

    /// Select an option by value. Returns false if it is not an option.
    pub fn select(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o == value) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    /// Select the next option, wrapping around.
    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.options.len();
    }

    /// Select the previous option, wrapping around.
    pub fn prev(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.options.len() - 1);
    }
}
