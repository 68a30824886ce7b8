//! The `Buffer` capability and a rope-backed reference implementation.
//!
//! Cursor movement never touches text storage directly. It consumes the
//! narrow `Buffer` trait: buffer <-> screen coordinate translation, line
//! content queries and a handful of structural mutators. Callers guarantee
//! arguments are in range (the contract fails fast); `TextBuffer` clamps
//! defensively and debug-asserts instead of panicking in release builds.
//!
//! `TextBuffer` stores text in a `ropey::Rope` and keeps, per logical line,
//! the char offsets at which the line wraps (produced by a `LineBreaker`).
//! A prefix table maps every logical line to its first screen line so both
//! translation directions are a binary search.

use crate::point::{Point, ScreenPoint};
use crate::wrap::LineBreaker;
use crate::{char_len, char_slice};
use ropey::Rope;
use tracing::trace;

pub trait Buffer {
    fn buffer_to_screen(&self, line: usize, column: usize) -> ScreenPoint;
    fn screen_to_buffer(&self, screen_line: usize, screen_column: usize) -> Point;

    fn line_content(&self, line: usize) -> String;
    fn screen_line_content(&self, screen_line: usize) -> String;

    /// Number of logical lines (always at least 1 for an empty document).
    fn len(&self) -> usize;
    /// Number of wrapped screen lines.
    fn screen_len(&self) -> usize;

    fn insert(&mut self, line: usize, column: usize, text: &str);
    fn delete(&mut self, line: usize, column: usize, count: usize);
    /// Split `line` at `column`; the tail becomes line `line + 1`.
    fn split_down(&mut self, line: usize, column: usize);
    /// Join `line` onto the end of `line - 1`.
    fn split_up(&mut self, line: usize);
    fn remove_line(&mut self, line: usize);
    fn swap_line(&mut self, line: usize, delta: isize);
    /// Move the block `start..=end` by `delta` lines.
    fn swap_lines(&mut self, start: usize, end: usize, delta: isize);
    /// Recompute wrap points for one line after an edit.
    fn wrap_line(&mut self, line: usize);

    /// Adopt new wrapping metrics (editor width or font changed) and re-wrap everything.
    fn rewrap(&mut self, _breaker: &LineBreaker) {}

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn line_len(&self, line: usize) -> usize {
        char_len(&self.line_content(line))
    }

    fn screen_line_len(&self, screen_line: usize) -> usize {
        char_len(&self.screen_line_content(screen_line))
    }

    /// Position just past the last character of the document.
    fn end_point(&self) -> Point {
        let last = self.len().saturating_sub(1);
        Point::new(last, self.line_len(last))
    }
}

/// A text buffer backed by a `ropey::Rope` with soft-wrap bookkeeping.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    pub name: String,
    breaker: Option<LineBreaker>,
    /// Wrap offsets per logical line.
    wraps: Vec<Vec<usize>>,
    /// `screen_starts[i]` is the first screen line of logical line `i`; one extra trailing total.
    screen_starts: Vec<usize>,
}

impl TextBuffer {
    /// Construct an unwrapped buffer (one screen line per logical line).
    pub fn from_str(name: impl Into<String>, content: &str) -> Self {
        let mut buffer = Self {
            rope: Rope::from_str(&normalize_newlines(content)),
            name: name.into(),
            breaker: None,
            wraps: Vec::new(),
            screen_starts: Vec::new(),
        };
        buffer.rewrap_all();
        buffer
    }

    /// Construct a buffer soft-wrapped with `breaker`.
    pub fn with_wrapping(name: impl Into<String>, content: &str, breaker: LineBreaker) -> Self {
        let mut buffer = Self::from_str(name, content);
        buffer.breaker = Some(breaker);
        buffer.rewrap_all();
        buffer
    }

    /// Whole document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Wrap offsets currently recorded for `line`.
    pub fn line_breaks(&self, line: usize) -> &[usize] {
        self.wraps.get(line).map(Vec::as_slice).unwrap_or(&[])
    }

    fn last_line(&self) -> usize {
        self.rope.len_lines().saturating_sub(1)
    }

    fn char_index(&self, line: usize, column: usize) -> usize {
        let line = line.min(self.last_line());
        self.rope.line_to_char(line) + column.min(self.line_len(line))
    }

    fn breaks_for(&self, line: usize) -> Vec<usize> {
        match &self.breaker {
            Some(b) => b.get_line_break(&self.line_content(line)),
            None => Vec::new(),
        }
    }

    fn rewrap_all(&mut self) {
        self.wraps = (0..self.rope.len_lines())
            .map(|l| self.breaks_for(l))
            .collect();
        self.reindex();
    }

    /// Replace the wrap entries of `removed` lines at `line` with fresh ones for `added` lines.
    fn splice_wraps(&mut self, line: usize, removed: usize, added: usize) {
        let end = (line + removed).min(self.wraps.len());
        let fresh: Vec<Vec<usize>> = (line..line + added).map(|l| self.breaks_for(l)).collect();
        self.wraps.splice(line..end, fresh);
        debug_assert_eq!(self.wraps.len(), self.rope.len_lines());
        self.reindex();
    }

    fn reindex(&mut self) {
        self.screen_starts.clear();
        let mut total = 0usize;
        for breaks in &self.wraps {
            self.screen_starts.push(total);
            total += breaks.len() + 1;
        }
        self.screen_starts.push(total);
    }

    /// Logical line owning `screen_line`, plus the segment index inside it.
    fn locate_screen_line(&self, screen_line: usize) -> (usize, usize) {
        let screen_line = screen_line.min(self.screen_len().saturating_sub(1));
        let line = self
            .screen_starts
            .partition_point(|&s| s <= screen_line)
            .saturating_sub(1)
            .min(self.last_line());
        (line, screen_line - self.screen_starts[line])
    }

    /// Char span `[start, end)` of segment `index` of `line`.
    fn segment_span(&self, line: usize, index: usize) -> (usize, usize) {
        let breaks = self.line_breaks(line);
        let start = if index == 0 { 0 } else { breaks[index - 1] };
        let end = breaks
            .get(index)
            .copied()
            .unwrap_or_else(|| self.line_len(line));
        (start, end)
    }

    fn lines(&self) -> Vec<String> {
        (0..self.rope.len_lines())
            .map(|l| self.line_content(l))
            .collect()
    }

    fn replace_lines(&mut self, lines: &[String]) {
        self.rope = Rope::from_str(&lines.join("\n"));
        self.rewrap_all();
    }
}

fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

impl Buffer for TextBuffer {
    fn buffer_to_screen(&self, line: usize, column: usize) -> ScreenPoint {
        let line = line.min(self.last_line());
        let breaks = self.line_breaks(line);
        let index = breaks.partition_point(|&b| b <= column);
        let segment_start = if index == 0 { 0 } else { breaks[index - 1] };
        ScreenPoint::new(
            self.screen_starts[line] + index,
            column.saturating_sub(segment_start),
        )
    }

    fn screen_to_buffer(&self, screen_line: usize, screen_column: usize) -> Point {
        let (line, index) = self.locate_screen_line(screen_line);
        let (start, _) = self.segment_span(line, index);
        Point::new(line, (start + screen_column).min(self.line_len(line)))
    }

    fn line_content(&self, line: usize) -> String {
        if line >= self.rope.len_lines() {
            return String::new();
        }
        let mut s = self.rope.line(line).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    fn screen_line_content(&self, screen_line: usize) -> String {
        let (line, index) = self.locate_screen_line(screen_line);
        let (start, end) = self.segment_span(line, index);
        char_slice(&self.line_content(line), start, end).to_string()
    }

    fn len(&self) -> usize {
        self.rope.len_lines()
    }

    fn screen_len(&self) -> usize {
        self.screen_starts.last().copied().unwrap_or(0)
    }

    fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let n = slice.len_chars();
        if n > 0 && slice.char(n - 1) == '\n' {
            n - 1
        } else {
            n
        }
    }

    fn insert(&mut self, line: usize, column: usize, text: &str) {
        debug_assert!(line < self.len(), "insert line out of range");
        let text = normalize_newlines(text);
        let idx = self.char_index(line, column);
        self.rope.insert(idx, &text);
        let added = text.matches('\n').count();
        self.splice_wraps(line, 1, added + 1);
    }

    fn delete(&mut self, line: usize, column: usize, count: usize) {
        debug_assert!(line < self.len(), "delete line out of range");
        let len = self.line_len(line);
        let start = column.min(len);
        let end = (column + count).min(len);
        if start == end {
            return;
        }
        let base = self.rope.line_to_char(line);
        self.rope.remove(base + start..base + end);
        self.splice_wraps(line, 1, 1);
    }

    fn split_down(&mut self, line: usize, column: usize) {
        let idx = self.char_index(line, column);
        self.rope.insert_char(idx, '\n');
        self.splice_wraps(line, 1, 2);
    }

    fn split_up(&mut self, line: usize) {
        if line == 0 || line >= self.len() {
            return;
        }
        let newline = self.rope.line_to_char(line) - 1;
        self.rope.remove(newline..newline + 1);
        self.splice_wraps(line - 1, 2, 1);
    }

    fn remove_line(&mut self, line: usize) {
        if line >= self.len() {
            return;
        }
        let start = self.rope.line_to_char(line);
        let end = start + self.rope.line(line).len_chars();
        if line == self.last_line() && line > 0 {
            // Last line has no trailing newline; eat the one before it instead.
            self.rope.remove(start - 1..end);
            self.splice_wraps(line, 1, 0);
        } else if line == self.last_line() {
            self.rope.remove(start..end);
            self.splice_wraps(line, 1, 1);
        } else {
            self.rope.remove(start..end);
            self.splice_wraps(line, 1, 0);
        }
    }

    fn swap_line(&mut self, line: usize, delta: isize) {
        let Some(target) = line.checked_add_signed(delta) else {
            return;
        };
        if line >= self.len() || target >= self.len() || target == line {
            return;
        }
        let mut lines = self.lines();
        lines.swap(line, target);
        self.replace_lines(&lines);
    }

    fn swap_lines(&mut self, start: usize, end: usize, delta: isize) {
        if start > end || end >= self.len() || delta == 0 {
            return;
        }
        let Some(new_start) = start.checked_add_signed(delta) else {
            return;
        };
        let Some(new_end) = end.checked_add_signed(delta) else {
            return;
        };
        if new_end >= self.len() {
            return;
        }
        let mut lines = self.lines();
        let block: Vec<String> = lines.drain(start..=end).collect();
        lines.splice(new_start..new_start, block);
        self.replace_lines(&lines);
    }

    fn wrap_line(&mut self, line: usize) {
        if line >= self.wraps.len() {
            return;
        }
        self.wraps[line] = self.breaks_for(line);
        self.reindex();
        trace!(target: "text.wrap", line, segments = self.wraps[line].len() + 1, "line_rewrapped");
    }

    fn rewrap(&mut self, breaker: &LineBreaker) {
        self.breaker = Some(breaker.clone());
        self.rewrap_all();
        trace!(target: "text.wrap", lines = self.wraps.len(), screen_lines = self.screen_len(), "buffer_rewrapped");
    }
}
