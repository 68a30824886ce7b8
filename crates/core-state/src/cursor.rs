//! One caret: its selection, its last projected screen position, and every
//! movement operation.
//!
//! Every movement has the same shape: compute a target `Point` from the
//! current focus and the intent, then hand it to `move_to(target, select)`.
//! `select == false` collapses the anchor onto the new focus; `select == true`
//! keeps the anchor so the selection extends.
//!
//! Movement runs against a `CursorEnv`, which carries the optional buffer
//! capability, the word-boundary service and the geometry needed to refresh
//! `drawing`. When the env has no buffer every operation is a no-op; a caret
//! can still be drawn from its approximate coordinates.
//!
//! Tie-break policy for horizontal moves:
//! * `move_right(n)` overshooting a line lands on the next line at column
//!   `n - 1`: crossing the virtual newline costs one step and the columns
//!   already consumed on the current line are not carried over.
//! * `move_left(n)` overshooting lands on the previous line at
//!   `len - (n - 1)`.
//! * Overshooting the first or last line clamps to the document edge.

use core_render::{EditorBox, Projector, Viewport, Xy};
use core_text::{
    Buffer, LineBreaker, Point, Selection, WordBoundary, WordBoundaryError, WordDirection,
    char_len,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_CURSOR_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, never reused cursor identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CursorId(String);

impl CursorId {
    fn fresh() -> Self {
        Self(format!(
            "cursor-{}",
            NEXT_CURSOR_ID.fetch_add(1, Ordering::Relaxed)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CursorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Borrowed context a cursor moves in.
pub struct CursorEnv<'a> {
    buffer: Option<&'a mut (dyn Buffer + 'static)>,
    words: &'a dyn WordBoundary,
    breaker: &'a LineBreaker,
    viewport: &'a Viewport,
    bounds: EditorBox,
}

impl<'a> CursorEnv<'a> {
    pub fn new(
        buffer: Option<&'a mut (dyn Buffer + 'static)>,
        words: &'a dyn WordBoundary,
        breaker: &'a LineBreaker,
        viewport: &'a Viewport,
        bounds: EditorBox,
    ) -> Self {
        Self {
            buffer,
            words,
            breaker,
            viewport,
            bounds,
        }
    }

    pub fn buffer(&self) -> Option<&dyn Buffer> {
        self.buffer.as_deref().map(|b| b as &dyn Buffer)
    }

    pub fn projector(&self) -> Projector<'_> {
        Projector::new(self.buffer(), self.breaker, self.viewport, self.bounds)
    }
}

#[derive(Debug, Clone)]
pub struct Cursor {
    id: CursorId,
    selection: Selection,
    drawing: Xy,
}

impl Cursor {
    /// New collapsed cursor at `at` with a fresh id. `drawing` is unset until the first move.
    pub fn new(at: Point) -> Self {
        Self {
            id: CursorId::fresh(),
            selection: Selection::collapsed_at(at),
            drawing: Xy::default(),
        }
    }

    pub fn id(&self) -> &CursorId {
        &self.id
    }

    /// The caret position (the selection focus).
    pub fn position(&self) -> Point {
        self.selection.focus()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Last projected screen position; may be stale after scrolling.
    pub fn drawing(&self) -> Xy {
        self.drawing
    }

    pub fn refresh_drawing(&mut self, projector: &Projector<'_>) {
        self.drawing = projector.point_to_xy(self.position());
    }

    /// Collapse onto `point` without reprojecting; the caller refreshes `drawing`.
    pub(crate) fn collapse_to(&mut self, point: Point) {
        self.selection = Selection::collapsed_at(point);
    }

    /// Move the focus to `point`. Like every movement, a no-op without a buffer.
    pub fn move_to(&mut self, point: Point, select: bool, env: &CursorEnv<'_>) {
        if env.buffer().is_none() {
            trace!(target: "state.cursor", cursor = %self.id, "move_skipped_no_buffer");
            return;
        }
        self.selection.set_focus(point);
        if !select {
            self.selection.set_anchor(point);
        }
        self.refresh_drawing(&env.projector());
    }

    /// Rewrite anchor and focus through `map`, keeping the anchor/focus roles.
    pub(crate) fn remap<F>(&mut self, map: F, env: &CursorEnv<'_>)
    where
        F: Fn(Point) -> Point,
    {
        let anchor = map(self.selection.anchor());
        let focus = map(self.selection.focus());
        if anchor != self.selection.anchor() || focus != self.selection.focus() {
            self.selection = Selection::new(anchor, focus);
            self.refresh_drawing(&env.projector());
        }
    }

    /// Compute a target from the buffer and move there. No buffer, no move.
    fn move_with<F>(&mut self, select: bool, env: &CursorEnv<'_>, target: F)
    where
        F: FnOnce(&dyn Buffer, Point) -> Point,
    {
        let Some(buffer) = env.buffer() else {
            return;
        };
        let point = target(buffer, self.position());
        self.move_to(point, select, env);
    }

    /// Collapse a live selection onto one of its edges instead of moving.
    fn collapse_instead(&mut self, select: bool, to_end: bool, env: &CursorEnv<'_>) -> bool {
        if select || self.selection.is_collapsed() || env.buffer().is_none() {
            return false;
        }
        let edge = if to_end {
            self.selection.end()
        } else {
            self.selection.start()
        };
        self.move_to(edge, false, env);
        true
    }

    pub fn move_right(&mut self, n: usize, select: bool, env: &CursorEnv<'_>) {
        if self.collapse_instead(select, true, env) {
            return;
        }
        self.move_with(select, env, |buffer, pos| step_right(buffer, pos, n));
    }

    pub fn move_left(&mut self, n: usize, select: bool, env: &CursorEnv<'_>) {
        if self.collapse_instead(select, false, env) {
            return;
        }
        self.move_with(select, env, |buffer, pos| step_left(buffer, pos, n));
    }

    pub fn move_up(&mut self, n: usize, select: bool, env: &CursorEnv<'_>) {
        self.move_with(select, env, |buffer, pos| step_vertical(buffer, pos, n, false));
    }

    pub fn move_down(&mut self, n: usize, select: bool, env: &CursorEnv<'_>) {
        self.move_with(select, env, |buffer, pos| step_vertical(buffer, pos, n, true));
    }

    pub fn move_to_start_of_line(&mut self, select: bool, env: &CursorEnv<'_>) {
        self.move_with(select, env, |buffer, pos| {
            let screen = buffer.buffer_to_screen(pos.line, pos.column);
            buffer.screen_to_buffer(screen.line, 0)
        });
    }

    pub fn move_to_end_of_line(&mut self, select: bool, env: &CursorEnv<'_>) {
        self.move_with(select, env, |buffer, pos| {
            let screen = buffer.buffer_to_screen(pos.line, pos.column);
            buffer.screen_to_buffer(screen.line, buffer.screen_line_len(screen.line))
        });
    }

    pub fn move_to_start_of_word(
        &mut self,
        select: bool,
        env: &CursorEnv<'_>,
    ) -> Result<(), WordBoundaryError> {
        let Some(buffer) = env.buffer() else {
            return Ok(());
        };
        let target = word_start(buffer, env.words, self.position())?;
        self.move_to(target, select, env);
        Ok(())
    }

    pub fn move_to_end_of_word(
        &mut self,
        select: bool,
        env: &CursorEnv<'_>,
    ) -> Result<(), WordBoundaryError> {
        let Some(buffer) = env.buffer() else {
            return Ok(());
        };
        let target = word_end(buffer, env.words, self.position())?;
        self.move_to(target, select, env);
        Ok(())
    }

    pub fn move_to_top(&mut self, select: bool, env: &CursorEnv<'_>) {
        self.move_with(select, env, |_, _| Point::origin());
    }

    pub fn move_to_bottom(&mut self, select: bool, env: &CursorEnv<'_>) {
        self.move_with(select, env, |buffer, _| buffer.end_point());
    }

    pub fn select_word(&mut self, env: &CursorEnv<'_>) -> Result<(), WordBoundaryError> {
        self.move_to_start_of_word(false, env)?;
        self.move_to_end_of_word(true, env)
    }

    /// Select the whole logical line the caret is on.
    pub fn select_paragraph(&mut self, env: &CursorEnv<'_>) {
        self.move_with(false, env, |_, pos| Point::new(pos.line, 0));
        self.move_with(true, env, |buffer, pos| {
            Point::new(pos.line, buffer.line_len(pos.line))
        });
    }

    /// Remove the selected text and collapse onto where it started.
    pub fn delete_selection(&mut self, env: &mut CursorEnv<'_>) {
        if self.selection.is_collapsed() {
            return;
        }
        let Some(buffer) = env.buffer.as_deref_mut() else {
            return;
        };
        let start = self.selection.start();
        let end = self.selection.end();
        if start.line == end.line {
            buffer.delete(start.line, start.column, end.column - start.column);
        } else {
            let first_len = buffer.line_len(start.line);
            buffer.delete(
                start.line,
                start.column,
                first_len.saturating_sub(start.column),
            );
            for _ in start.line + 1..end.line {
                buffer.remove_line(start.line + 1);
            }
            buffer.delete(start.line + 1, 0, end.column);
            buffer.split_up(start.line + 1);
        }
        buffer.wrap_line(start.line);
        trace!(target: "state.cursor", cursor = %self.id, ?start, ?end, "selection_deleted");
        self.move_to(start, false, env);
    }
}

fn step_right(buffer: &dyn Buffer, pos: Point, n: usize) -> Point {
    let len = buffer.line_len(pos.line);
    if pos.column + n <= len {
        return Point::new(pos.line, pos.column + n);
    }
    if pos.line + 1 >= buffer.len() {
        return Point::new(pos.line, len);
    }
    let next = pos.line + 1;
    Point::new(next, n.saturating_sub(1).min(buffer.line_len(next)))
}

fn step_left(buffer: &dyn Buffer, pos: Point, n: usize) -> Point {
    if pos.column >= n {
        return Point::new(pos.line, pos.column - n);
    }
    if pos.line == 0 {
        return Point::origin();
    }
    let prev = pos.line - 1;
    Point::new(
        prev,
        buffer.line_len(prev).saturating_sub(n.saturating_sub(1)),
    )
}

/// Move `n` screen lines, keeping the screen column where the target line is long enough.
///
/// The document edges are decided on buffer lines: anywhere on the first
/// buffer line `up` goes to the document start, anywhere on the last one
/// `down` goes to the document end, even when that line wraps.
fn step_vertical(buffer: &dyn Buffer, pos: Point, n: usize, down: bool) -> Point {
    if !down && pos.line == 0 {
        return Point::origin();
    }
    if down && pos.line + 1 >= buffer.len() {
        return buffer.end_point();
    }
    let screen = buffer.buffer_to_screen(pos.line, pos.column);
    let last = buffer.screen_len().saturating_sub(1);
    let target = if down {
        (screen.line + n).min(last)
    } else {
        screen.line.saturating_sub(n)
    };
    let column = screen.column.min(buffer.screen_line_len(target));
    buffer.screen_to_buffer(target, column)
}

/// Word start, looking back across the previous line when needed.
fn word_start(
    buffer: &dyn Buffer,
    words: &dyn WordBoundary,
    pos: Point,
) -> Result<Point, WordBoundaryError> {
    let current = buffer.line_content(pos.line);
    let column = pos.column.min(char_len(&current));
    if pos.line == 0 {
        let offset = words.step(&current, column, WordDirection::Backward)?;
        return Ok(Point::new(0, offset));
    }
    let previous = buffer.line_content(pos.line - 1);
    let previous_len = char_len(&previous);
    let joined = format!("{previous}\n{current}");
    let offset = words.step(&joined, previous_len + 1 + column, WordDirection::Backward)?;
    Ok(if offset <= previous_len {
        Point::new(pos.line - 1, offset)
    } else {
        Point::new(pos.line, offset - previous_len - 1)
    })
}

/// Word end, looking ahead across the next line when needed.
fn word_end(
    buffer: &dyn Buffer,
    words: &dyn WordBoundary,
    pos: Point,
) -> Result<Point, WordBoundaryError> {
    let current = buffer.line_content(pos.line);
    let current_len = char_len(&current);
    let column = pos.column.min(current_len);
    if pos.line + 1 >= buffer.len() {
        let offset = words.step(&current, column, WordDirection::Forward)?;
        return Ok(Point::new(pos.line, offset));
    }
    let next = buffer.line_content(pos.line + 1);
    let joined = format!("{current}\n{next}");
    let offset = words.step(&joined, column, WordDirection::Forward)?;
    Ok(if offset <= current_len {
        Point::new(pos.line, offset)
    } else {
        Point::new(pos.line + 1, offset - current_len - 1)
    })
}
