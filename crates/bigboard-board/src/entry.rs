//! Board entries

use bigboard_core::{RunnerId, Sequence, Timestamp};

use crate::DecodedMessage;

/// A decoded message waiting on (or already shown on) the board
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardEntry {
    pub runner: RunnerId,
    /// Producer sequence marker; exclusion only, never ordering
    pub sequence: Sequence,
    /// Producer's claimed send time
    pub origin: Timestamp,
    pub text: String,
    posted: bool,
}

impl BoardEntry {
    pub fn new(runner: RunnerId, sequence: Sequence, origin: Timestamp, text: impl Into<String>) -> Self {
        BoardEntry {
            runner,
            sequence,
            origin,
            text: text.into(),
            posted: false,
        }
    }

    pub fn from_decoded(runner: RunnerId, sequence: Sequence, message: DecodedMessage) -> Self {
        Self::new(runner, sequence, message.origin, message.text)
    }

    /// Whether this entry has been flushed to output
    pub fn is_posted(&self) -> bool {
        self.posted
    }

    pub(crate) fn mark_posted(&mut self) {
        self.posted = true;
    }

    /// `<runner> (<ISO-8601 origin>): <text>`
    pub fn display_line(&self) -> String {
        let when = self
            .origin
            .to_iso8601()
            .unwrap_or_else(|_| self.origin.to_string());
        format!("{} ({}): {}", self.runner, when, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_line() {
        let entry = BoardEntry::new(
            RunnerId::new("alice").unwrap(),
            Sequence::new("1").unwrap(),
            Timestamp::from_millis(1_700_000_000_000),
            "hello",
        );
        assert!(!entry.is_posted());
        assert_eq!(entry.display_line(), "alice (2023-11-14T22:13:20.000Z): hello");
    }
}
