//! Position and range primitives.
//!
//! `Point` addresses logical buffer text, `ScreenPoint` addresses a visually
//! wrapped screen line. They share a shape but are distinct types so a screen
//! coordinate can never be fed where a buffer coordinate is expected.

use std::cmp::Ordering;

/// A position inside a buffer expressed as (line index, char column within that line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub line: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn origin() -> Self {
        Self { line: 0, column: 0 }
    }

    /// True when `self` sorts strictly before `other` (line first, then column).
    pub fn before(&self, other: &Point) -> bool {
        self.cmp(other) == Ordering::Less
    }

    /// True when `self` sorts strictly after `other`.
    pub fn after(&self, other: &Point) -> bool {
        self.cmp(other) == Ordering::Greater
    }

    pub fn equals(&self, other: &Point) -> bool {
        self == other
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A position on a wrapped screen line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScreenPoint {
    pub line: usize,
    pub column: usize,
}

impl ScreenPoint {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Pair of points. No ordering is imposed; callers establish it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}
