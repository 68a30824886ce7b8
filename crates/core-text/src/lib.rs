//! Text-side primitives for the caret engine.
//!
//! This crate is the leaf of the workspace. It owns everything that can be
//! reasoned about without an editor context:
//!
//! * `point` / `selection`: value types for buffer and screen coordinates and
//!   the anchor/focus selection model derived from them.
//! * `measure`: glyph-width measurement with a per-glyph cache and a
//!   monospace fast path.
//! * `wrap`: greedy word-wrap producing character break offsets.
//! * `word`: the word-boundary service used by word motions.
//! * `buffer`: the narrow `Buffer` capability consumed by cursor movement,
//!   plus a rope-backed reference implementation (`TextBuffer`).
//!
//! Column convention: every column / offset in this crate counts Unicode
//! scalar values (`char`s) inside a single logical line. Byte offsets never
//! cross the crate boundary.

pub mod buffer;
pub mod measure;
pub mod point;
pub mod selection;
pub mod word;
pub mod wrap;

pub use buffer::{Buffer, TextBuffer};
pub use measure::{CellSurface, FontSpec, GlyphSurface, MeasureError, TableSurface, TextMeasurer};
pub use point::{Point, Range, ScreenPoint};
pub use selection::{Direction, Selection};
pub use word::{UnicodeWords, WordBoundary, WordBoundaryError, WordDirection, WordOracle};
pub use wrap::{LineBreaker, WRAP_MARGIN};

/// Number of `char`s in `s`. Columns are char based throughout the engine.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Return the prefix of `s` holding its first `chars` characters (clamped).
pub fn char_prefix(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}

/// Return the char range `[start, end)` of `s` (clamped to the string).
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let head = char_prefix(s, end);
    let skip = head
        .char_indices()
        .nth(start)
        .map(|(byte, _)| byte)
        .unwrap_or(head.len());
    &head[skip..]
}
