/// Messages cycled on the celebration screen.
pub fn default_messages() -> Vec<String> {
    [
        "Best of Luck!",
        "Your Journey Begins!",
        "Ready to Soar!",
        "A New Chapter Starts!",
        "Time to Shine!",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Content reveal and message rotation for the celebration screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelebrationSequence {
    messages: Vec<String>,
    index: usize,
    content_visible: bool,
}

impl CelebrationSequence {
    /// An empty message list falls back to the defaults.
    pub fn new(messages: Vec<String>) -> Self {
        let messages = if messages.is_empty() {
            default_messages()
        } else {
            messages
        };
        Self {
            messages,
            index: 0,
            content_visible: false,
        }
    }

    pub fn restart(&mut self) {
        self.index = 0;
        self.content_visible = false;
    }

    pub fn reveal(&mut self) {
        self.content_visible = true;
    }

    /// Advance to the next message, wrapping. Returns the new index.
    pub fn rotate(&mut self) -> usize {
        self.index = (self.index + 1) % self.messages.len();
        self.index
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn content_visible(&self) -> bool {
        self.content_visible
    }

    pub fn current_message(&self) -> &str {
        &self.messages[self.index]
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Default for CelebrationSequence {
    fn default() -> Self {
        Self::new(default_messages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps() {
        let mut seq = CelebrationSequence::new(vec!["a".into(), "b".into()]);
        assert_eq!(seq.current_message(), "a");
        assert_eq!(seq.rotate(), 1);
        assert_eq!(seq.rotate(), 0);
        assert_eq!(seq.current_message(), "a");
    }

    #[test]
    fn empty_list_uses_defaults() {
        let seq = CelebrationSequence::new(Vec::new());
        assert_eq!(seq.messages().len(), 5);
    }

    #[test]
    fn restart_hides_content() {
        let mut seq = CelebrationSequence::default();
        seq.reveal();
        seq.rotate();
        seq.restart();
        assert!(!seq.content_visible());
        assert_eq!(seq.index(), 0);
    }
}
