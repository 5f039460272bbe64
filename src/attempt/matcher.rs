//! Strict-prefix phrase matcher

/// Visible ASCII, the only characters that reach the typed buffer
pub fn is_printable(ch: char) -> bool {
    (' '..='~').contains(&ch)
}

/// Matcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Nothing typed yet
    Idle,
    /// Typed buffer is a strict, non-empty prefix of the target
    Matching,
    /// Typed buffer equals the target
    Complete,
}

/// Result of feeding one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Still a prefix of the target
    InProgress,
    /// Typed buffer equals the target
    Complete,
    /// Typed buffer diverged from the target; the matcher is back to idle
    Mismatch,
}

/// Validates a growing typed buffer against a fixed target phrase
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    target: String,
    typed: String,
}

impl PhraseMatcher {
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        let typed = String::with_capacity(target.len());
        Self { target, typed }
    }

    /// Feed one character.
    ///
    /// Non-printable characters leave the buffer untouched. A character that
    /// makes the buffer stop being a prefix of the target resets the matcher
    /// and reports [`MatchStatus::Mismatch`].
    pub fn feed(&mut self, ch: char) -> MatchStatus {
        if is_printable(ch) {
            self.typed.push(ch);
            if !self.target.starts_with(self.typed.as_str()) {
                self.reset();
                return MatchStatus::Mismatch;
            }
        }

        match self.state() {
            MatchState::Complete => MatchStatus::Complete,
            _ => MatchStatus::InProgress,
        }
    }

    pub fn state(&self) -> MatchState {
        if self.typed.is_empty() {
            MatchState::Idle
        } else if self.typed == self.target {
            MatchState::Complete
        } else {
            MatchState::Matching
        }
    }

    /// Typed buffer has reached the target's length, the point at which a
    /// key-up triggers the commit check
    pub fn at_target_length(&self) -> bool {
        self.typed.len() == self.target.len()
    }

    pub fn is_complete(&self) -> bool {
        self.state() == MatchState::Complete
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Clear the typed buffer
    pub fn reset(&mut self) {
        self.typed.clear();
    }

    #[cfg(test)]
    pub(crate) fn set_typed(&mut self, typed: &str) {
        self.typed = typed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_phrase_completes_on_last_char() {
        let mut matcher = PhraseMatcher::new("cat");
        assert_eq!(matcher.state(), MatchState::Idle);
        assert_eq!(matcher.feed('c'), MatchStatus::InProgress);
        assert_eq!(matcher.state(), MatchState::Matching);
        assert_eq!(matcher.feed('a'), MatchStatus::InProgress);
        assert_eq!(matcher.feed('t'), MatchStatus::Complete);
        assert_eq!(matcher.state(), MatchState::Complete);
        assert!(matcher.at_target_length());
    }

    #[test]
    fn wrong_next_char_always_mismatches() {
        let target = "Football123$";
        for prefix_len in 0..target.len() {
            let expected = target.as_bytes()[prefix_len] as char;
            for wrong in [' ', 'x', 'Z', '0', '~'] {
                if wrong == expected {
                    continue;
                }
                let mut matcher = PhraseMatcher::new(target);
                for ch in target[..prefix_len].chars() {
                    assert_ne!(matcher.feed(ch), MatchStatus::Mismatch);
                }
                assert_eq!(matcher.feed(wrong), MatchStatus::Mismatch);
                assert_eq!(matcher.state(), MatchState::Idle);
                assert!(matcher.typed().is_empty());
            }
        }
    }

    #[test]
    fn char_after_complete_mismatches() {
        let mut matcher = PhraseMatcher::new("ab");
        matcher.feed('a');
        matcher.feed('b');
        assert_eq!(matcher.feed('b'), MatchStatus::Mismatch);
    }

    #[test]
    fn non_printable_is_invisible() {
        let mut matcher = PhraseMatcher::new("ab");
        matcher.feed('a');
        assert_eq!(matcher.feed('\n'), MatchStatus::InProgress);
        assert_eq!(matcher.feed('\u{7f}'), MatchStatus::InProgress);
        assert_eq!(matcher.typed(), "a");
        assert_eq!(matcher.feed('b'), MatchStatus::Complete);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut matcher = PhraseMatcher::new("cat");
        matcher.feed('c');
        matcher.reset();
        assert_eq!(matcher.state(), MatchState::Idle);
        assert_eq!(matcher.feed('c'), MatchStatus::InProgress);
    }

    #[test]
    fn printable_range_is_visible_ascii() {
        assert!(is_printable(' '));
        assert!(is_printable('~'));
        assert!(is_printable('$'));
        assert!(!is_printable('\t'));
        assert!(!is_printable('\u{e9}'));
    }
}
