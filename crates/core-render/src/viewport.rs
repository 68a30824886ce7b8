//! Vertical scroll model for arbitrarily long documents.
//!
//! `scroll` is the logical, unreduced pixel offset of the viewport top from
//! the document top. All clamping and scroll-into-view decisions use it.
//!
//! Rendering never uses it directly. Absolute offsets in a million-line
//! document would push transforms past the range where float positions stay
//! exact, so the renderer works in a rollover window of `ROLLOVER` pixels:
//!
//! * `rollover_scroll() = scroll mod ROLLOVER` is the content-layer offset.
//! * `line_top(i)` is the line's absolute top (`i * line_height`) reduced mod
//!   `ROLLOVER`, corrected by the whole windows separating the line from the
//!   scroll window. Lines in the scroll window therefore land in
//!   `[0, ROLLOVER)` and `line_top(i) - rollover_scroll()` is the on-screen y.
//!
//! Invariants (hold after every public call):
//! * `0 <= scroll <= max_scroll(screen_len)` for the `screen_len` last passed.
//! * `rollover_scroll() < ROLLOVER`.

use std::ops::RangeInclusive;
use tracing::trace;

/// Pixel period at which rendered offsets re-base.
pub const ROLLOVER: f64 = 500_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scroll: f64,
    line_height: f64,
    height: f64,
}

/// Track width and minimum thumb height. A width of zero hides the scrollbar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarStyle {
    pub width: f64,
    pub min_thumb: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarGeometry {
    pub track_width: f64,
    pub track_height: f64,
    pub thumb_top: f64,
    pub thumb_height: f64,
}

impl Viewport {
    pub fn new(line_height: f64, height: f64) -> Self {
        Self {
            scroll: 0.0,
            line_height,
            height,
        }
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height.max(0.0);
    }

    pub fn set_line_height(&mut self, line_height: f64) {
        self.line_height = line_height;
    }

    pub fn content_height(&self, screen_len: usize) -> f64 {
        screen_len as f64 * self.line_height
    }

    /// Largest permitted scroll. Short documents still allow scrolling their last line to the top.
    pub fn max_scroll(&self, screen_len: usize) -> f64 {
        let total = self.content_height(screen_len);
        if total > self.height {
            total - self.height
        } else {
            (total.min(self.height) - self.line_height).max(0.0)
        }
    }

    /// Clamp and store `value`. Returns whether the stored scroll changed.
    pub fn set_scroll(&mut self, value: f64, screen_len: usize) -> bool {
        let max = self.max_scroll(screen_len);
        let clamped = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, max)
        };
        let changed = clamped != self.scroll;
        if changed {
            trace!(target: "render.viewport", requested = value, scroll = clamped, max, "scroll_set");
        }
        self.scroll = clamped;
        changed
    }

    /// Re-clamp after the document or viewport changed size.
    pub fn reclamp(&mut self, screen_len: usize) -> bool {
        self.set_scroll(self.scroll, screen_len)
    }

    /// Scroll the minimum needed so a line whose top is at `target` is fully visible.
    pub fn scroll_into_view_if_needed(&mut self, target: f64, screen_len: usize) -> bool {
        if target < self.scroll {
            return self.set_scroll(target, screen_len);
        }
        let bottom = self.scroll + self.height;
        let overflow = target + self.line_height - bottom;
        if overflow > 0.0 {
            return self.set_scroll(self.scroll + overflow, screen_len);
        }
        false
    }

    pub fn rollover_scroll(&self) -> f64 {
        self.scroll.rem_euclid(ROLLOVER)
    }

    /// Transform applied to the content layer.
    pub fn content_offset(&self) -> f64 {
        -self.rollover_scroll()
    }

    /// Top of screen line `index` in the current rollover window.
    pub fn line_top(&self, index: usize) -> f64 {
        let absolute = index as f64 * self.line_height;
        let reduced = absolute.rem_euclid(ROLLOVER);
        let line_window = absolute - reduced;
        let scroll_window = self.scroll - self.rollover_scroll();
        reduced + (line_window - scroll_window)
    }

    /// On-screen y of screen line `index`, relative to the viewport top.
    pub fn screen_y(&self, index: usize) -> f64 {
        self.line_top(index) + self.content_offset()
    }

    pub fn top_screen_line(&self, screen_len: usize) -> usize {
        let last = screen_len.saturating_sub(1);
        ((self.scroll / self.line_height).floor() as usize).min(last)
    }

    /// Last screen line that is at least partially visible.
    pub fn bottom_screen_line(&self, screen_len: usize) -> usize {
        let last = screen_len.saturating_sub(1);
        let edge = ((self.scroll + self.height) / self.line_height).ceil() as usize;
        edge.saturating_sub(1).min(last)
    }

    pub fn visible_lines(&self, screen_len: usize) -> RangeInclusive<usize> {
        self.top_screen_line(screen_len)..=self.bottom_screen_line(screen_len)
    }

    /// Scrollbar thumb placement, or `None` when the whole document fits or
    /// the style hides the track.
    pub fn scrollbar(&self, screen_len: usize, style: ScrollbarStyle) -> Option<ScrollbarGeometry> {
        let total = self.content_height(screen_len);
        if style.width <= 0.0 || total <= self.height || self.height <= 0.0 {
            return None;
        }
        let thumb_height = (self.height * self.height / total)
            .max(style.min_thumb)
            .min(self.height);
        let max = self.max_scroll(screen_len);
        let travel = self.height - thumb_height;
        let thumb_top = if max > 0.0 {
            self.scroll / max * travel
        } else {
            0.0
        };
        Some(ScrollbarGeometry {
            track_width: style.width,
            track_height: self.height,
            thumb_top,
            thumb_height,
        })
    }

    /// Inverse of `scrollbar`: scroll position for a dragged thumb top.
    pub fn scroll_for_thumb(&self, thumb_top: f64, screen_len: usize, style: ScrollbarStyle) -> f64 {
        match self.scrollbar(screen_len, style) {
            Some(g) if g.track_height > g.thumb_height => {
                let travel = g.track_height - g.thumb_height;
                thumb_top.clamp(0.0, travel) / travel * self.max_scroll(screen_len)
            }
            _ => 0.0,
        }
    }
}
