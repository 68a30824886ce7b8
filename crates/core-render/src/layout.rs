//! Editor box geometry with an explicit invalidate-on-resize cache.
//!
//! Reading the editor's on-screen bounds can be expensive for a host (a DOM
//! layout query, a window-system round trip), while every coordinate query
//! needs them. `LayoutCache` memoizes the box from a `BoxSource` until
//! `invalidate()` is called, which the host binds to its resize signal.
//! Between invalidation and the next read the cache is simply empty; the next
//! `get()` recomputes.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Editor bounds in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditorBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl EditorBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Box anchored at the client origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// Provider of the current editor bounds.
pub trait BoxSource: fmt::Debug {
    fn editor_box(&self) -> EditorBox;
}

/// Bounds that only change when the host explicitly sets them.
#[derive(Debug, Clone, Default)]
pub struct SharedBox(Rc<Cell<EditorBox>>);

impl SharedBox {
    pub fn new(initial: EditorBox) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    pub fn set(&self, editor_box: EditorBox) {
        self.0.set(editor_box);
    }
}

impl BoxSource for SharedBox {
    fn editor_box(&self) -> EditorBox {
        self.0.get()
    }
}

#[derive(Debug)]
pub struct LayoutCache {
    source: Box<dyn BoxSource>,
    cached: Cell<Option<EditorBox>>,
    computes: Cell<u64>,
}

impl LayoutCache {
    pub fn new(source: impl BoxSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cached: Cell::new(None),
            computes: Cell::new(0),
        }
    }

    pub fn get(&self) -> EditorBox {
        if let Some(b) = self.cached.get() {
            return b;
        }
        let b = self.source.editor_box();
        self.cached.set(Some(b));
        self.computes.set(self.computes.get() + 1);
        b
    }

    pub fn invalidate(&self) {
        self.cached.set(None);
    }

    pub fn is_cached(&self) -> bool {
        self.cached.get().is_some()
    }

    /// How many times the source has been queried.
    pub fn computes(&self) -> u64 {
        self.computes.get()
    }
}
