//! Typing-mode text pad.
//!
//! While active, key presses edit a single-line buffer. Submitting commits
//! the text by discarding it; nothing typed survives the session.

#[derive(Debug, Clone, Default)]
pub struct TypingPad {
    active: bool,
    buffer: String,
    submitted: usize,
}

impl TypingPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Flip typing mode. The buffer is kept either way.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn push_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    /// Remove the last character. No-op on an empty buffer.
    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Commit and reset. Returns the committed text.
    pub fn submit(&mut self) -> String {
        self.submitted += 1;
        std::mem::take(&mut self.buffer)
    }

    /// Number of submits this session.
    pub fn submitted(&self) -> usize {
        self.submitted
    }
}
