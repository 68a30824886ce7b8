//! Point-level screen coordinate queries.
//!
//! A `Projector` borrows everything needed to translate between buffer
//! positions and client pixels: the (optional) buffer for buffer <-> screen
//! translation, the line breaker's measurer for horizontal extents, the
//! viewport for vertical placement and the editor box for the client origin.
//!
//! Without a buffer the projector still answers, approximating every line as
//! unwrapped and every glyph as `char_width()` wide, so a caret can render
//! before a document is loaded.

use crate::layout::EditorBox;
use crate::viewport::Viewport;
use core_text::{Buffer, LineBreaker, Point, ScreenPoint, char_prefix};

/// Client-pixel coordinates of a caret's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Xy {
    pub x: f64,
    pub y: f64,
}

impl Xy {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy)]
pub struct Projector<'a> {
    buffer: Option<&'a dyn Buffer>,
    breaker: &'a LineBreaker,
    viewport: &'a Viewport,
    bounds: EditorBox,
}

impl<'a> Projector<'a> {
    pub fn new(
        buffer: Option<&'a dyn Buffer>,
        breaker: &'a LineBreaker,
        viewport: &'a Viewport,
        bounds: EditorBox,
    ) -> Self {
        Self {
            buffer,
            breaker,
            viewport,
            bounds,
        }
    }

    pub fn to_screen(&self, point: Point) -> ScreenPoint {
        match self.buffer {
            Some(buffer) => buffer.buffer_to_screen(point.line, point.column),
            None => ScreenPoint::new(point.line, point.column),
        }
    }

    pub fn point_to_xy(&self, point: Point) -> Xy {
        let screen = self.to_screen(point);
        let x = match self.buffer {
            Some(buffer) => {
                let text = buffer.screen_line_content(screen.line);
                self.breaker.measure(char_prefix(&text, screen.column))
            }
            None => screen.column as f64 * self.breaker.measurer().char_width(),
        };
        Xy::new(
            self.bounds.left + x,
            self.bounds.top + self.viewport.screen_y(screen.line),
        )
    }

    /// Column on `screen_line` hit by client x. A glyph is hit once x passes its midpoint.
    pub fn x_to_column(&self, x: f64, screen_line: usize) -> usize {
        let x = x - self.bounds.left;
        match self.buffer {
            Some(buffer) => self.column_in(&buffer.screen_line_content(screen_line), x),
            None => {
                let cw = self.breaker.measurer().char_width();
                if cw > 0.0 {
                    (x / cw).round().max(0.0) as usize
                } else {
                    0
                }
            }
        }
    }

    // TODO: binary search over prefix widths once lines get long enough for the scan to show up in profiles.
    fn column_in(&self, text: &str, x: f64) -> usize {
        let measurer = self.breaker.measurer();
        let mut width = 0.0;
        let mut count = 0;
        for (i, c) in text.chars().enumerate() {
            let char_width = measurer.advance(c);
            width += char_width;
            if width - char_width / 2.0 > x {
                return i;
            }
            count = i + 1;
        }
        count
    }

    /// Screen line under client y, clamped to the document.
    pub fn y_to_line(&self, y: f64) -> usize {
        let offset = y - self.bounds.top + self.viewport.scroll();
        let line = (offset / self.viewport.line_height()).floor().max(0.0) as usize;
        match self.buffer {
            Some(buffer) => line.min(buffer.screen_len().saturating_sub(1)),
            None => line,
        }
    }

    /// Buffer position under a client point.
    pub fn xy_to_point(&self, x: f64, y: f64) -> Point {
        let screen_line = self.y_to_line(y);
        let column = self.x_to_column(x, screen_line);
        match self.buffer {
            Some(buffer) => buffer.screen_to_buffer(screen_line, column),
            None => Point::new(screen_line, column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{CellSurface, FontSpec, TableSurface, TextBuffer, TextMeasurer};
    use std::rc::Rc;

    fn breaker() -> LineBreaker {
        // 10px glyphs except a narrow 'i'; 100px editor.
        let surface = TableSurface::new(10.0).with('i', 4.0);
        let m = TextMeasurer::new(Rc::new(surface), FontSpec::default()).unwrap();
        LineBreaker::new(m, 100.0)
    }

    fn bounds() -> EditorBox {
        EditorBox::new(50.0, 100.0, 100.0, 200.0)
    }

    #[test]
    fn point_to_xy_measures_prefix() {
        let b = breaker();
        let buf = TextBuffer::with_wrapping("t", "hi there\nline", b.clone());
        let vp = Viewport::new(20.0, 200.0);
        let p = Projector::new(Some(&buf), &b, &vp, bounds());
        assert_eq!(p.point_to_xy(Point::new(0, 2)), Xy::new(50.0 + 14.0, 100.0));
        assert_eq!(p.point_to_xy(Point::new(1, 1)), Xy::new(60.0, 120.0));
    }

    #[test]
    fn point_to_xy_follows_wraps_and_scroll() {
        let b = breaker();
        let buf = TextBuffer::with_wrapping("t", "hello world foo", b.clone());
        let mut vp = Viewport::new(20.0, 200.0);
        vp.set_scroll(20.0, buf.screen_len());
        let p = Projector::new(Some(&buf), &b, &vp, bounds());
        // Column 8 is on the second screen line ("world "), 2 chars in.
        assert_eq!(p.point_to_xy(Point::new(0, 8)), Xy::new(70.0, 100.0));
    }

    #[test]
    fn hit_testing_agrees_with_monospace_measure() {
        // Cell metrics: 'i' and 'W' match, so every char advances 8.4px
        // even where the glyph itself spans two cells.
        let m = TextMeasurer::new(Rc::new(CellSurface), FontSpec::default()).unwrap();
        let b = LineBreaker::new(m, 100.0);
        let buf = TextBuffer::with_wrapping("t", "漢字abc", b.clone());
        let vp = Viewport::new(20.0, 200.0);
        let p = Projector::new(Some(&buf), &b, &vp, bounds());
        let xy = p.point_to_xy(Point::new(0, 2));
        assert!((xy.x - (50.0 + 16.8)).abs() < 1e-9);
        assert_eq!(p.xy_to_point(xy.x + 1.0, xy.y), Point::new(0, 2));
        assert_eq!(p.xy_to_point(xy.x - 1.0, xy.y), Point::new(0, 2));
    }

    #[test]
    fn x_to_column_uses_midpoint_rule() {
        let b = breaker();
        let buf = TextBuffer::from_str("t", "abc");
        let vp = Viewport::new(20.0, 200.0);
        let p = Projector::new(Some(&buf), &b, &vp, bounds());
        assert_eq!(p.x_to_column(50.0, 0), 0);
        assert_eq!(p.x_to_column(54.9, 0), 0);
        // Exactly on the midpoint is not past it.
        assert_eq!(p.x_to_column(55.0, 0), 1);
        assert_eq!(p.x_to_column(64.0, 0), 1);
        assert_eq!(p.x_to_column(66.0, 0), 2);
        assert_eq!(p.x_to_column(500.0, 0), 3);
        assert_eq!(p.x_to_column(0.0, 0), 0);
    }

    #[test]
    fn y_to_line_clamps() {
        let b = breaker();
        let buf = TextBuffer::from_str("t", "a\nb\nc");
        let mut vp = Viewport::new(20.0, 200.0);
        let p = Projector::new(Some(&buf), &b, &vp, bounds());
        assert_eq!(p.y_to_line(0.0), 0);
        assert_eq!(p.y_to_line(125.0), 1);
        assert_eq!(p.y_to_line(10_000.0), 2);
        vp.set_scroll(20.0, buf.screen_len());
        let p = Projector::new(Some(&buf), &b, &vp, bounds());
        assert_eq!(p.y_to_line(105.0), 1);
    }

    #[test]
    fn xy_round_trips_through_buffer() {
        let b = breaker();
        let buf = TextBuffer::with_wrapping("t", "hello world foo\nbar", b.clone());
        let vp = Viewport::new(20.0, 200.0);
        let p = Projector::new(Some(&buf), &b, &vp, bounds());
        let target = Point::new(0, 9);
        let xy = p.point_to_xy(target);
        assert_eq!(p.xy_to_point(xy.x + 1.0, xy.y + 1.0), target);
        assert_eq!(p.xy_to_point(1_000.0, 165.0), Point::new(1, 3));
    }

    #[test]
    fn degraded_without_buffer() {
        let b = breaker();
        let vp = Viewport::new(20.0, 200.0);
        let p = Projector::new(None, &b, &vp, bounds());
        assert_eq!(p.point_to_xy(Point::new(2, 3)), Xy::new(80.0, 140.0));
        assert_eq!(p.xy_to_point(80.0, 141.0), Point::new(2, 3));
    }
}
