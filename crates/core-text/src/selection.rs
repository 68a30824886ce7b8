//! Anchor/focus selection model.
//!
//! The anchor is where a selection started, the focus is where the caret is.
//! `start`, `end`, `direction` and the collapsed flag are derived and are
//! recomputed after every write so readers never observe stale values.
//!
//! Invariants (hold after every public call):
//! * `start <= end` under `Point` order.
//! * `is_collapsed() == (anchor == focus)`.
//! * `direction() == Backward` iff `focus.before(anchor)`.

use crate::point::{Point, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    anchor: Point,
    focus: Point,
    direction: Direction,
    collapsed: bool,
    start: Point,
    end: Point,
}

impl Default for Selection {
    fn default() -> Self {
        Self::collapsed_at(Point::origin())
    }
}

impl Selection {
    /// Collapsed selection (plain caret) at `point`.
    pub fn collapsed_at(point: Point) -> Self {
        Self::new(point, point)
    }

    pub fn new(anchor: Point, focus: Point) -> Self {
        let mut s = Self {
            anchor,
            focus,
            direction: Direction::Forward,
            collapsed: true,
            start: anchor,
            end: anchor,
        };
        s.derive();
        s
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn focus(&self) -> Point {
        self.focus
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_anchor(&mut self, anchor: Point) {
        self.anchor = anchor;
        self.derive();
    }

    pub fn set_focus(&mut self, focus: Point) {
        self.focus = focus;
        self.derive();
    }

    /// Ordered range covered by the selection.
    pub fn range(&self) -> Range {
        Range::new(self.start, self.end)
    }

    fn derive(&mut self) {
        self.collapsed = self.focus.equals(&self.anchor);
        if self.focus.before(&self.anchor) {
            self.direction = Direction::Backward;
            self.start = self.focus;
            self.end = self.anchor;
        } else {
            self.direction = Direction::Forward;
            self.start = self.anchor;
            self.end = self.focus;
        }
    }
}
