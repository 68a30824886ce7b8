//! Greedy word-wrap.
//!
//! A line is split into alternating word / whitespace tokens. Tokens are laid
//! out left to right; when the next token would push the accumulated width
//! past the available width (and something is already on the screen line), a
//! break is recorded at that token's char offset and accumulation restarts
//! with the token's own width. Breaks therefore only ever land on token
//! boundaries. A single word wider than the available width gets a screen
//! line of its own and overflows it rather than being split.

use crate::measure::{FontSpec, MeasureError, TextMeasurer};
use tracing::trace;

/// Horizontal space reserved at the right edge of the editor, in pixels.
pub const WRAP_MARGIN: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct LineBreaker {
    measurer: TextMeasurer,
    editor_width: f64,
}

impl LineBreaker {
    pub fn new(measurer: TextMeasurer, editor_width: f64) -> Self {
        Self {
            measurer,
            editor_width,
        }
    }

    pub fn measurer(&self) -> &TextMeasurer {
        &self.measurer
    }

    pub fn measure(&self, text: &str) -> f64 {
        self.measurer.measure(text)
    }

    pub fn editor_width(&self) -> f64 {
        self.editor_width
    }

    pub fn set_editor_width(&mut self, width: f64) {
        self.editor_width = width;
    }

    pub fn set_font(&mut self, font: FontSpec) -> Result<(), MeasureError> {
        self.measurer.set_font(font)
    }

    /// Width a screen line may occupy before wrapping.
    pub fn available_width(&self) -> f64 {
        self.editor_width - WRAP_MARGIN
    }

    /// Char offsets at which `text` wraps onto a new screen line. Empty when no wrap is needed.
    pub fn get_line_break(&self, text: &str) -> Vec<usize> {
        if text.is_empty() {
            return Vec::new();
        }
        let available = self.available_width();
        if self.measurer.measure(text) < available {
            return Vec::new();
        }
        let mut breaks = Vec::new();
        let mut width = 0.0;
        for (offset, token) in tokens(text) {
            let token_width = self.measurer.measure(token);
            if width + token_width > available && width > 0.0 {
                breaks.push(offset);
                width = token_width;
            } else {
                width += token_width;
            }
        }
        trace!(target: "text.wrap", breaks = breaks.len(), available, "line_broken");
        breaks
    }
}

/// Split `text` into maximal runs of whitespace / non-whitespace, yielding each run with its char offset.
fn tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut rest = text;
    let mut offset = 0usize;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let ws = first.is_whitespace();
        let split = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != ws)
            .map(|(byte, _)| byte)
            .unwrap_or(rest.len());
        let (token, tail) = rest.split_at(split);
        let at = offset;
        offset += token.chars().count();
        rest = tail;
        Some((at, token))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{CellSurface, TableSurface};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::rc::Rc;

    /// 10px per char, 100px editor => 80px (8 chars) available.
    fn breaker() -> LineBreaker {
        let m = TextMeasurer::new(Rc::new(TableSurface::new(10.0)), FontSpec::default()).unwrap();
        LineBreaker::new(m, 100.0)
    }

    #[test]
    fn tokens_alternate_runs() {
        let got: Vec<_> = tokens("ab  cd e").collect();
        assert_eq!(got, vec![(0, "ab"), (2, "  "), (4, "cd"), (6, " "), (7, "e")]);
        assert_eq!(tokens("").count(), 0);
    }

    #[test]
    fn short_or_empty_lines_do_not_wrap() {
        let b = breaker();
        assert_eq!(b.available_width(), 80.0);
        assert!(b.get_line_break("").is_empty());
        assert!(b.get_line_break("hello").is_empty());
        assert!(b.get_line_break("1234567").is_empty());
    }

    #[test]
    fn breaks_on_word_boundaries() {
        let b = breaker();
        // "hello world foo" -> hello(50) + ' '(10) = 60, world(50) overflows -> break at 6.
        // world(50) + ' '(10) = 60, foo(30) overflows -> break at 12.
        assert_eq!(b.get_line_break("hello world foo"), vec![6, 12]);
    }

    #[test]
    fn overlong_word_is_never_split() {
        let b = breaker();
        assert_eq!(b.get_line_break("abcdefghijklmnop"), Vec::<usize>::new());
        assert_eq!(b.get_line_break("ab abcdefghijklmnop cd"), vec![3, 19]);
    }

    #[test]
    fn exact_fit_still_runs_greedy_pass() {
        let b = breaker();
        // 8 chars == available width: pre-check fails (not strictly below) but nothing overflows.
        assert!(b.get_line_break("abcd efg").is_empty());
    }

    #[test]
    fn width_change_affects_breaks() {
        let mut b = breaker();
        b.set_editor_width(1000.0);
        assert!(b.get_line_break("hello world foo").is_empty());
        b.set_editor_width(WRAP_MARGIN);
        // Zero available width: every token after the first starts a new line.
        assert_eq!(b.get_line_break("a b"), vec![1, 2]);
    }

    #[test]
    fn monospace_cells_wrap_identically() {
        let m = TextMeasurer::new(Rc::new(CellSurface), FontSpec::new("mono", 10.0)).unwrap();
        // 6px per char, 68px editor => 48px => 8 chars.
        let b = LineBreaker::new(m, 68.0);
        assert_eq!(b.get_line_break("hello world foo"), vec![6, 12]);
    }

    proptest! {
        #[test]
        fn breaks_fall_on_token_boundaries(words in proptest::collection::vec("[a-z]{1,12}", 1..20), width in 30.0f64..300.0) {
            let text = words.join(" ");
            let mut b = breaker();
            b.set_editor_width(width);
            let chars: Vec<char> = text.chars().collect();
            let breaks = b.get_line_break(&text);
            if b.measure(&text) < b.available_width() {
                prop_assert!(breaks.is_empty());
            }
            let mut prev = 0;
            for at in breaks {
                prop_assert!(at > prev && at < chars.len());
                let inside_word = !chars[at - 1].is_whitespace() && !chars[at].is_whitespace();
                prop_assert!(!inside_word, "break {} inside a word of {:?}", at, text);
                prev = at;
            }
        }
    }
}
