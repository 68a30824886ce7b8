//! Word-boundary service.
//!
//! Word motions ask an oracle for "the offset after one word-unit move from
//! here". Browsers answer that with a platform selection primitive; here it is
//! an injected `WordBoundary` so movement logic can be exercised without any
//! platform widget. `UnicodeWords` is the deterministic implementation built
//! on UAX #29 word segmentation.
//!
//! Semantics of one step (mirrors platform word movement):
//! * Forward: the end of the first word ending after `offset`, else text end.
//! * Backward: the start of the last word starting before `offset`, else 0.
//!
//! Whitespace and punctuation are skipped over; only segments containing an
//! alphanumeric character count as words.

use std::fmt;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordDirection {
    Forward,
    Backward,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WordBoundaryError {
    #[error("word boundary oracle used before initialization")]
    Uninitialized,
    #[error("offset {offset} outside text of {len} chars")]
    OffsetOutOfRange { offset: usize, len: usize },
}

pub trait WordBoundary: fmt::Debug {
    /// Char offset reached after one word-unit move from `offset` in `direction`.
    fn step(
        &self,
        text: &str,
        offset: usize,
        direction: WordDirection,
    ) -> Result<usize, WordBoundaryError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWords;

impl WordBoundary for UnicodeWords {
    fn step(
        &self,
        text: &str,
        offset: usize,
        direction: WordDirection,
    ) -> Result<usize, WordBoundaryError> {
        let len = text.chars().count();
        if offset > len {
            return Err(WordBoundaryError::OffsetOutOfRange { offset, len });
        }
        // (start, end) char spans of each word.
        let mut spans = Vec::new();
        let mut chars_seen = 0usize;
        let mut bytes_seen = 0usize;
        for (byte, word) in text.unicode_word_indices() {
            chars_seen += text[bytes_seen..byte].chars().count();
            let start = chars_seen;
            let end = start + word.chars().count();
            spans.push((start, end));
            chars_seen = end;
            bytes_seen = byte + word.len();
        }
        let target = match direction {
            WordDirection::Forward => spans
                .iter()
                .find(|(_, end)| *end > offset)
                .map(|(_, end)| *end)
                .unwrap_or(len),
            WordDirection::Backward => spans
                .iter()
                .rev()
                .find(|(start, _)| *start < offset)
                .map(|(start, _)| *start)
                .unwrap_or(0),
        };
        Ok(target)
    }
}

/// Slot holding the installed oracle. Stepping an empty slot is a wiring bug and errors.
#[derive(Debug, Default)]
pub struct WordOracle {
    inner: Option<Box<dyn WordBoundary>>,
}

impl WordOracle {
    pub fn uninitialized() -> Self {
        Self { inner: None }
    }

    pub fn new(oracle: impl WordBoundary + 'static) -> Self {
        Self {
            inner: Some(Box::new(oracle)),
        }
    }

    pub fn install(&mut self, oracle: impl WordBoundary + 'static) {
        self.inner = Some(Box::new(oracle));
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }
}

impl WordBoundary for WordOracle {
    fn step(
        &self,
        text: &str,
        offset: usize,
        direction: WordDirection,
    ) -> Result<usize, WordBoundaryError> {
        match &self.inner {
            Some(oracle) => oracle.step(text, offset, direction),
            None => Err(WordBoundaryError::Uninitialized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WordDirection::{Backward, Forward};

    #[test]
    fn forward_lands_on_word_ends() {
        let w = UnicodeWords;
        let text = "foo, bar  baz";
        assert_eq!(w.step(text, 0, Forward), Ok(3));
        assert_eq!(w.step(text, 3, Forward), Ok(8));
        assert_eq!(w.step(text, 5, Forward), Ok(8));
        assert_eq!(w.step(text, 8, Forward), Ok(13));
        assert_eq!(w.step(text, 13, Forward), Ok(13));
    }

    #[test]
    fn backward_lands_on_word_starts() {
        let w = UnicodeWords;
        let text = "foo, bar  baz";
        assert_eq!(w.step(text, 13, Backward), Ok(10));
        assert_eq!(w.step(text, 10, Backward), Ok(5));
        assert_eq!(w.step(text, 7, Backward), Ok(5));
        assert_eq!(w.step(text, 2, Backward), Ok(0));
        assert_eq!(w.step(text, 0, Backward), Ok(0));
    }

    #[test]
    fn offsets_are_chars_not_bytes() {
        let w = UnicodeWords;
        let text = "héllo wörld";
        assert_eq!(w.step(text, 0, Forward), Ok(5));
        assert_eq!(w.step(text, 11, Backward), Ok(6));
    }

    #[test]
    fn newline_separates_words() {
        let w = UnicodeWords;
        assert_eq!(w.step("alpha\nbeta", 5, Forward), Ok(10));
        assert_eq!(w.step("alpha\nbeta", 6, Backward), Ok(0));
    }

    #[test]
    fn out_of_range_offset_errors() {
        let err = UnicodeWords.step("ab", 3, Forward).unwrap_err();
        assert_eq!(err, WordBoundaryError::OffsetOutOfRange { offset: 3, len: 2 });
    }

    #[test]
    fn empty_slot_is_uninitialized() {
        let slot = WordOracle::uninitialized();
        assert!(!slot.is_initialized());
        assert_eq!(
            slot.step("abc", 0, Forward),
            Err(WordBoundaryError::Uninitialized)
        );
        let mut slot = slot;
        slot.install(UnicodeWords);
        assert_eq!(slot.step("abc", 0, Forward), Ok(3));
    }
}
