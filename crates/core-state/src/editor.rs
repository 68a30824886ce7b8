//! The editor context: cursors, viewport, buffer attachment and the shared
//! services every cursor operation consults.
//!
//! `EditorState` is passed by `&mut` to whoever drives the editor. It owns:
//! * the cursor list (never empty; index 0 is the primary cursor),
//! * the optional `Buffer` capability,
//! * the `LineBreaker` (and through it the glyph measurer),
//! * the word-boundary slot,
//! * the `Viewport` and the `LayoutCache` for the editor box,
//! * the resolved `Settings`.
//!
//! Batch operations run the same movement over every cursor and then merge
//! cursors that landed on the same position, keeping the first in list order.

use crate::cursor::{Cursor, CursorEnv, CursorId};
use ahash::AHashSet;
use core_config::Settings;
use core_render::{
    BoxSource, EditorBox, LayoutCache, Projector, ScrollbarGeometry, ScrollbarStyle, Viewport,
    Xy,
};
use core_text::{
    Buffer, FontSpec, GlyphSurface, LineBreaker, MeasureError, Point, TextMeasurer,
    UnicodeWords, WordBoundary, WordBoundaryError, WordOracle,
};
use std::convert::Infallible;
use std::ops::RangeInclusive;
use std::rc::Rc;
use tracing::{debug, info, trace};

pub struct EditorState {
    cursors: Vec<Cursor>,
    buffer: Option<Box<dyn Buffer>>,
    breaker: LineBreaker,
    words: WordOracle,
    viewport: Viewport,
    layout: LayoutCache,
    settings: Settings,
}

impl EditorState {
    /// Build a context with one cursor at the origin and no buffer attached.
    pub fn new(
        settings: Settings,
        surface: Rc<dyn GlyphSurface>,
        source: impl BoxSource + 'static,
    ) -> Result<Self, MeasureError> {
        let font = FontSpec::new(settings.font_family.clone(), settings.font_size);
        let measurer = TextMeasurer::new(surface, font)?;
        let layout = LayoutCache::new(source);
        let bounds = layout.get();
        let mut state = Self {
            cursors: vec![Cursor::new(Point::origin())],
            buffer: None,
            breaker: LineBreaker::new(measurer, bounds.width),
            words: WordOracle::new(UnicodeWords),
            viewport: Viewport::new(settings.line_height, bounds.height),
            layout,
            settings,
        };
        state.refresh_drawings();
        info!(
            target: "state.cursor",
            width = bounds.width,
            height = bounds.height,
            monospace = state.breaker.measurer().is_monospace(),
            "editor_created"
        );
        Ok(state)
    }

    /// Replace the word-boundary service (`WordOracle::uninitialized()` clears it).
    pub fn set_word_boundary(&mut self, words: WordOracle) {
        self.words = words;
    }

    pub fn word_boundary(&self) -> &dyn WordBoundary {
        &self.words
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn breaker(&self) -> &LineBreaker {
        &self.breaker
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn editor_box(&self) -> EditorBox {
        self.layout.get()
    }

    pub fn layout(&self) -> &LayoutCache {
        &self.layout
    }

    // --- buffer attachment -------------------------------------------------

    /// Attach a buffer, wrap it to the current width and clamp cursors into it.
    pub fn attach_buffer(&mut self, buffer: impl Buffer + 'static) {
        let mut buffer: Box<dyn Buffer> = Box::new(buffer);
        buffer.rewrap(&self.breaker);
        let lines = buffer.len();
        for cursor in &mut self.cursors {
            let clamped = clamp_point(&*buffer, cursor.position());
            if clamped != cursor.position() {
                cursor.collapse_to(clamped);
            }
        }
        self.buffer = Some(buffer);
        self.merge_cursors();
        self.viewport.reclamp(self.screen_len());
        self.refresh_drawings();
        info!(target: "state.cursor", lines, screen_lines = self.screen_len(), "buffer_attached");
    }

    pub fn detach_buffer(&mut self) -> Option<Box<dyn Buffer>> {
        let buffer = self.buffer.take();
        if buffer.is_some() {
            info!(target: "state.cursor", "buffer_detached");
            self.refresh_drawings();
        }
        buffer
    }

    pub fn buffer(&self) -> Option<&dyn Buffer> {
        self.buffer.as_deref().map(|b| b as &dyn Buffer)
    }

    /// Screen lines in the attached buffer, 0 without one.
    pub fn screen_len(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.screen_len())
    }

    // --- cursor list -------------------------------------------------------

    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    pub fn primary(&self) -> &Cursor {
        &self.cursors[0]
    }

    /// Add a collapsed cursor at `at`. Returns its id, or `None` when it merged into an existing one.
    pub fn add_cursor(&mut self, at: Point) -> Option<CursorId> {
        let at = match self.buffer.as_deref() {
            Some(buffer) => clamp_point(buffer, at),
            None => at,
        };
        let mut cursor = Cursor::new(at);
        cursor.refresh_drawing(&self.projector());
        let id = cursor.id().clone();
        self.cursors.push(cursor);
        self.merge_cursors();
        let kept = self.cursors.iter().any(|c| *c.id() == id);
        debug!(target: "state.cursor", cursor = %id, ?at, kept, "cursor_added");
        kept.then_some(id)
    }

    /// Remove a cursor by id. The last remaining cursor cannot be removed.
    pub fn remove_cursor(&mut self, id: &CursorId) -> bool {
        if self.cursors.len() == 1 {
            return false;
        }
        let before = self.cursors.len();
        self.cursors.retain(|c| c.id() != id);
        before != self.cursors.len()
    }

    /// Drop cursors sharing a position with an earlier cursor.
    pub fn merge_cursors(&mut self) {
        let before = self.cursors.len();
        let mut seen = AHashSet::with_capacity(before);
        self.cursors.retain(|c| seen.insert(c.position()));
        let dropped = before - self.cursors.len();
        if dropped > 0 {
            debug!(target: "state.cursor", dropped, remaining = self.cursors.len(), "cursors_merged");
        }
    }

    /// Keep only the primary cursor.
    pub fn flatten_to_one_cursor(&mut self) {
        if self.cursors.len() > 1 {
            debug!(target: "state.cursor", dropped = self.cursors.len() - 1, "cursors_flattened");
            self.cursors.truncate(1);
        }
    }

    fn try_each_cursor<E, F>(&mut self, mut step: F) -> Result<(), E>
    where
        F: FnMut(&mut Cursor, &mut CursorEnv<'_>) -> Result<(), E>,
    {
        let bounds = self.layout.get();
        let Self {
            cursors,
            buffer,
            breaker,
            words,
            viewport,
            ..
        } = self;
        let mut env = CursorEnv::new(buffer.as_deref_mut(), &*words, breaker, viewport, bounds);
        let result = cursors.iter_mut().try_for_each(|c| step(c, &mut env));
        self.merge_cursors();
        result
    }

    fn each_cursor<F>(&mut self, mut step: F)
    where
        F: FnMut(&mut Cursor, &mut CursorEnv<'_>),
    {
        let Ok(()) = self.try_each_cursor(|c, env| {
            step(c, env);
            Ok::<(), Infallible>(())
        });
    }

    // --- batch movement ----------------------------------------------------

    pub fn move_right(&mut self, n: usize, select: bool) {
        self.each_cursor(|c, env| c.move_right(n, select, env));
    }

    pub fn move_left(&mut self, n: usize, select: bool) {
        self.each_cursor(|c, env| c.move_left(n, select, env));
    }

    pub fn move_up(&mut self, n: usize, select: bool) {
        self.each_cursor(|c, env| c.move_up(n, select, env));
    }

    pub fn move_down(&mut self, n: usize, select: bool) {
        self.each_cursor(|c, env| c.move_down(n, select, env));
    }

    pub fn move_to_start_of_line(&mut self, select: bool) {
        self.each_cursor(|c, env| c.move_to_start_of_line(select, env));
    }

    pub fn move_to_end_of_line(&mut self, select: bool) {
        self.each_cursor(|c, env| c.move_to_end_of_line(select, env));
    }

    pub fn move_to_start_of_word(&mut self, select: bool) -> Result<(), WordBoundaryError> {
        self.try_each_cursor(|c, env| c.move_to_start_of_word(select, env))
    }

    pub fn move_to_end_of_word(&mut self, select: bool) -> Result<(), WordBoundaryError> {
        self.try_each_cursor(|c, env| c.move_to_end_of_word(select, env))
    }

    pub fn select_word(&mut self) -> Result<(), WordBoundaryError> {
        self.try_each_cursor(|c, env| c.select_word(env))
    }

    pub fn select_paragraph(&mut self) {
        self.each_cursor(|c, env| c.select_paragraph(env));
    }

    /// Collapse to the primary cursor and move it to the document start.
    pub fn move_to_top(&mut self, select: bool) {
        self.flatten_to_one_cursor();
        self.each_cursor(|c, env| c.move_to_top(select, env));
    }

    /// Collapse to the primary cursor and move it to the document end.
    pub fn move_to_bottom(&mut self, select: bool) {
        self.flatten_to_one_cursor();
        self.each_cursor(|c, env| c.move_to_bottom(select, env));
    }

    pub fn select_all(&mut self) {
        self.move_to_top(false);
        self.move_to_bottom(true);
    }

    /// Place the primary cursor at `point`, dropping the others.
    pub fn move_primary_to(&mut self, point: Point, select: bool) {
        let Some(buffer) = self.buffer.as_deref() else {
            trace!(target: "state.cursor", "move_skipped_no_buffer");
            return;
        };
        let point = clamp_point(buffer, point);
        self.flatten_to_one_cursor();
        self.each_cursor(|c, env| c.move_to(point, select, env));
    }

    /// Place the primary cursor under a client pixel (a click).
    pub fn click(&mut self, x: f64, y: f64, select: bool) {
        let point = self.xy_to_point(x, y);
        trace!(target: "state.cursor", x, y, ?point, "click");
        self.move_primary_to(point, select);
    }

    /// Delete every cursor's selection, later selections first so earlier positions stay valid.
    ///
    /// After each deletion every other cursor is remapped onto the shortened
    /// text: positions inside the removed range collapse onto its start and
    /// positions after it shift back, so overlapping selections only delete
    /// what is still there.
    pub fn delete_selection(&mut self) {
        let bounds = self.layout.get();
        let mut order: Vec<usize> = (0..self.cursors.len()).collect();
        order.sort_by(|&a, &b| {
            self.cursors[b]
                .selection()
                .start()
                .cmp(&self.cursors[a].selection().start())
        });
        let Self {
            cursors,
            buffer,
            breaker,
            words,
            viewport,
            ..
        } = self;
        let mut env = CursorEnv::new(buffer.as_deref_mut(), &*words, breaker, viewport, bounds);
        for i in order {
            let selection = *cursors[i].selection();
            if selection.is_collapsed() || env.buffer().is_none() {
                continue;
            }
            let (start, end) = (selection.start(), selection.end());
            cursors[i].delete_selection(&mut env);
            for (j, other) in cursors.iter_mut().enumerate() {
                if j != i {
                    other.remap(|p| shift_after_delete(p, start, end), &env);
                }
            }
        }
        self.merge_cursors();
        self.viewport.reclamp(self.screen_len());
    }

    pub fn refresh_drawings(&mut self) {
        let projector = Projector::new(
            self.buffer.as_deref().map(|b| b as &dyn Buffer),
            &self.breaker,
            &self.viewport,
            self.layout.get(),
        );
        for cursor in &mut self.cursors {
            cursor.refresh_drawing(&projector);
        }
    }

    // --- scrolling ---------------------------------------------------------

    pub fn scroll(&self) -> f64 {
        self.viewport.scroll()
    }

    /// Set the logical scroll (clamped). Returns whether it changed.
    pub fn set_scroll(&mut self, value: f64) -> bool {
        let changed = self.viewport.set_scroll(value, self.screen_len());
        if changed {
            trace!(target: "render.viewport", scroll = self.viewport.scroll(), "scrolled");
            self.refresh_drawings();
        }
        changed
    }

    pub fn scroll_by(&mut self, delta: f64) -> bool {
        self.set_scroll(self.viewport.scroll() + delta)
    }

    pub fn scroll_into_view_if_needed(&mut self, target: f64) -> bool {
        let changed = self
            .viewport
            .scroll_into_view_if_needed(target, self.screen_len());
        if changed {
            self.refresh_drawings();
        }
        changed
    }

    /// Bring the primary cursor's screen line fully into view.
    pub fn scroll_cursor_into_view(&mut self) -> bool {
        let line = self.projector().to_screen(self.primary().position()).line;
        let target = line as f64 * self.viewport.line_height();
        self.scroll_into_view_if_needed(target)
    }

    pub fn rollover_scroll(&self) -> f64 {
        self.viewport.rollover_scroll()
    }

    pub fn line_top(&self, screen_line: usize) -> f64 {
        self.viewport.line_top(screen_line)
    }

    pub fn top_screen_line(&self) -> usize {
        self.viewport.top_screen_line(self.screen_len())
    }

    pub fn bottom_screen_line(&self) -> usize {
        self.viewport.bottom_screen_line(self.screen_len())
    }

    pub fn visible_lines(&self) -> RangeInclusive<usize> {
        self.viewport.visible_lines(self.screen_len())
    }

    fn scrollbar_style(&self) -> ScrollbarStyle {
        ScrollbarStyle {
            width: self.settings.scrollbar_width,
            min_thumb: self.settings.scrollbar_min_thumb,
        }
    }

    pub fn scrollbar(&self) -> Option<ScrollbarGeometry> {
        self.viewport
            .scrollbar(self.screen_len(), self.scrollbar_style())
    }

    /// Drag the scrollbar thumb to `thumb_top`.
    pub fn drag_thumb(&mut self, thumb_top: f64) -> bool {
        let target = self.viewport.scroll_for_thumb(
            thumb_top,
            self.screen_len(),
            self.scrollbar_style(),
        );
        self.set_scroll(target)
    }

    // --- coordinates -------------------------------------------------------

    pub fn projector(&self) -> Projector<'_> {
        Projector::new(
            self.buffer(),
            &self.breaker,
            &self.viewport,
            self.layout.get(),
        )
    }

    pub fn point_to_xy(&self, point: Point) -> Xy {
        self.projector().point_to_xy(point)
    }

    pub fn xy_to_point(&self, x: f64, y: f64) -> Point {
        self.projector().xy_to_point(x, y)
    }

    pub fn x_to_column(&self, x: f64, screen_line: usize) -> usize {
        self.projector().x_to_column(x, screen_line)
    }

    pub fn y_to_line(&self, y: f64) -> usize {
        self.projector().y_to_line(y)
    }

    // --- geometry changes --------------------------------------------------

    /// Host resize hook: drop the cached box, re-wrap to the new width, re-clamp scroll.
    pub fn resize(&mut self) {
        self.layout.invalidate();
        let bounds = self.layout.get();
        self.breaker.set_editor_width(bounds.width);
        self.viewport.set_height(bounds.height);
        self.rewrap();
        info!(
            target: "render.viewport",
            width = bounds.width,
            height = bounds.height,
            screen_lines = self.screen_len(),
            "resized"
        );
    }

    /// Switch font. On failure the previous font stays active.
    pub fn set_font(&mut self, family: impl Into<String>, size: f64) -> Result<(), MeasureError> {
        self.breaker.set_font(FontSpec::new(family, size))?;
        self.rewrap();
        Ok(())
    }

    fn rewrap(&mut self) {
        if let Some(buffer) = self.buffer.as_deref_mut() {
            buffer.rewrap(&self.breaker);
        }
        self.viewport.reclamp(self.screen_len());
        self.refresh_drawings();
    }
}

/// Where `point` ends up once the text between `start` and `end` is removed.
fn shift_after_delete(point: Point, start: Point, end: Point) -> Point {
    if point < start {
        return point;
    }
    if point < end {
        return start;
    }
    if point.line == end.line {
        Point::new(start.line, start.column + (point.column - end.column))
    } else {
        Point::new(point.line - (end.line - start.line), point.column)
    }
}

/// Clamp `point` to a valid position in `buffer`.
fn clamp_point(buffer: &dyn Buffer, point: Point) -> Point {
    let last = buffer.len().saturating_sub(1);
    if point.line > last {
        return buffer.end_point();
    }
    Point::new(point.line, point.column.min(buffer.line_len(point.line)))
}
