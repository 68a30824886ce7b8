//! Glyph measurement with a per-glyph width cache.
//!
//! A `GlyphSurface` is whatever can report the advance width of one glyph for
//! a given font (a canvas context, a font rasterizer, terminal cells). The
//! `TextMeasurer` wraps a surface with:
//!
//! * a cache keyed by the rendered glyph, cleared and re-seeded whenever the
//!   font changes;
//! * a monospace fast path: when `"i"` and `"W"` measure the same at setup,
//!   `measure` returns `char_count * char_width` without touching the cache.
//!   This trades accuracy for fonts that only *look* monospaced at those two
//!   glyphs; it is re-evaluated on every font change.
//!
//! Surface construction failures are fatal. There is no fallback metric:
//! layout cannot proceed without glyph widths, so `MeasureError` propagates to
//! whoever is wiring the editor together.

use ahash::AHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, error};
use unicode_width::UnicodeWidthChar;

/// Ratio of a terminal cell's width to the font size.
pub const CELL_ASPECT: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("monospace", 14.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasureError {
    #[error("measurement surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("font `{family}` at {size}px cannot be measured")]
    FontRejected { family: String, size: f64 },
}

/// Source of glyph metrics.
pub trait GlyphSurface: fmt::Debug {
    /// Prepare the surface for `font`. Called on construction and on every font change.
    fn load_font(&self, font: &FontSpec) -> Result<(), MeasureError>;

    /// Advance width of `glyph` rendered in `font`, in pixels.
    fn glyph_width(&self, font: &FontSpec, glyph: char) -> f64;
}

/// Terminal-cell metrics: every glyph is `unicode-width` cells of `size * CELL_ASPECT` pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellSurface;

impl GlyphSurface for CellSurface {
    fn load_font(&self, font: &FontSpec) -> Result<(), MeasureError> {
        if !font.size.is_finite() || font.size <= 0.0 {
            return Err(MeasureError::FontRejected {
                family: font.family.clone(),
                size: font.size,
            });
        }
        Ok(())
    }

    fn glyph_width(&self, font: &FontSpec, glyph: char) -> f64 {
        let cells = glyph.width().unwrap_or(0);
        cells as f64 * font.size * CELL_ASPECT
    }
}

/// Explicit per-glyph widths with a default for anything not listed.
///
/// Widths are absolute pixels and do not scale with the font size.
#[derive(Debug, Clone, Default)]
pub struct TableSurface {
    widths: AHashMap<char, f64>,
    default_width: f64,
}

impl TableSurface {
    pub fn new(default_width: f64) -> Self {
        Self {
            widths: AHashMap::new(),
            default_width,
        }
    }

    pub fn with(mut self, glyph: char, width: f64) -> Self {
        self.widths.insert(glyph, width);
        self
    }
}

impl GlyphSurface for TableSurface {
    fn load_font(&self, _font: &FontSpec) -> Result<(), MeasureError> {
        Ok(())
    }

    fn glyph_width(&self, _font: &FontSpec, glyph: char) -> f64 {
        self.widths
            .get(&glyph)
            .copied()
            .unwrap_or(self.default_width)
    }
}

#[derive(Debug, Clone)]
pub struct TextMeasurer {
    surface: Rc<dyn GlyphSurface>,
    font: FontSpec,
    cache: RefCell<AHashMap<char, f64>>,
    monospace: Option<f64>,
}

impl TextMeasurer {
    /// Bind a surface to an initial font. Fails if the surface cannot measure it.
    pub fn new(surface: Rc<dyn GlyphSurface>, font: FontSpec) -> Result<Self, MeasureError> {
        let mut measurer = Self {
            surface,
            font: font.clone(),
            cache: RefCell::new(AHashMap::new()),
            monospace: None,
        };
        measurer.set_font(font)?;
        Ok(measurer)
    }

    /// Switch fonts: invalidates the glyph cache and re-detects the monospace fast path.
    pub fn set_font(&mut self, font: FontSpec) -> Result<(), MeasureError> {
        if let Err(e) = self.surface.load_font(&font) {
            error!(target: "text.measure", family = font.family.as_str(), size = font.size, %e, "surface_load_failed");
            return Err(e);
        }
        self.font = font;
        self.cache.borrow_mut().clear();
        let narrow = self.glyph_width('i');
        let wide = self.glyph_width('W');
        self.monospace = ((narrow - wide).abs() < f64::EPSILON).then_some(narrow);
        debug!(
            target: "text.measure",
            family = self.font.family.as_str(),
            size = self.font.size,
            monospace = self.monospace.is_some(),
            "font_set"
        );
        Ok(())
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn is_monospace(&self) -> bool {
        self.monospace.is_some()
    }

    /// Width of a single glyph, served from the cache when possible.
    pub fn glyph_width(&self, glyph: char) -> f64 {
        if let Some(w) = self.cache.borrow().get(&glyph) {
            return *w;
        }
        let w = self.surface.glyph_width(&self.font, glyph);
        self.cache.borrow_mut().insert(glyph, w);
        w
    }

    /// Representative glyph width used when no text is available to measure.
    pub fn char_width(&self) -> f64 {
        self.monospace.unwrap_or_else(|| self.glyph_width('W'))
    }

    /// Horizontal advance of `glyph` as `measure` counts it: the fixed
    /// char width on the monospace fast path, its own width otherwise.
    pub fn advance(&self, glyph: char) -> f64 {
        self.monospace.unwrap_or_else(|| self.glyph_width(glyph))
    }

    /// Rendered width of `text`.
    pub fn measure(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        if let Some(cw) = self.monospace {
            return text.chars().count() as f64 * cw;
        }
        text.chars().map(|c| self.glyph_width(c)).sum()
    }

    /// Number of glyphs currently cached.
    pub fn cached_glyphs(&self) -> usize {
        self.cache.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proportional() -> TextMeasurer {
        let surface = TableSurface::new(8.0).with('i', 3.0).with('W', 12.0);
        TextMeasurer::new(Rc::new(surface), FontSpec::new("serif", 16.0)).unwrap()
    }

    #[derive(Debug)]
    struct BrokenSurface;

    impl GlyphSurface for BrokenSurface {
        fn load_font(&self, _font: &FontSpec) -> Result<(), MeasureError> {
            Err(MeasureError::SurfaceUnavailable("no 2d context".into()))
        }
        fn glyph_width(&self, _font: &FontSpec, _glyph: char) -> f64 {
            0.0
        }
    }

    #[test]
    fn empty_text_measures_zero() {
        let m = proportional();
        assert_eq!(m.measure(""), 0.0);
        let mono = TextMeasurer::new(Rc::new(CellSurface), FontSpec::default()).unwrap();
        assert_eq!(mono.measure(""), 0.0);
    }

    #[test]
    fn monospace_detected_and_linear() {
        let m = TextMeasurer::new(Rc::new(CellSurface), FontSpec::new("mono", 10.0)).unwrap();
        assert!(m.is_monospace());
        assert_eq!(m.measure("abc"), 3.0 * m.measure("a"));
        assert_eq!(m.char_width(), 6.0);
    }

    #[test]
    fn monospace_fast_path_counts_chars_not_cells() {
        // A wide CJK glyph is two cells on the surface but the fast path counts one char.
        let m = TextMeasurer::new(Rc::new(CellSurface), FontSpec::new("mono", 10.0)).unwrap();
        assert_eq!(m.measure("漢"), 6.0);
        assert_eq!(m.glyph_width('漢'), 12.0);
        assert_eq!(m.advance('漢'), 6.0);
        let p = proportional();
        assert_eq!(p.advance('i'), p.glyph_width('i'));
    }

    #[test]
    fn proportional_sums_cached_glyphs() {
        let m = proportional();
        assert!(!m.is_monospace());
        assert_eq!(m.measure("iW"), 15.0);
        assert_eq!(m.measure("ab"), 16.0);
        // 'i', 'W' seeded at setup plus 'a', 'b'.
        assert_eq!(m.cached_glyphs(), 4);
    }

    #[test]
    fn font_change_reseeds_cache_and_fast_path() {
        let mut m = TextMeasurer::new(Rc::new(CellSurface), FontSpec::new("mono", 10.0)).unwrap();
        m.measure("hello");
        m.glyph_width('z');
        m.set_font(FontSpec::new("mono", 20.0)).unwrap();
        assert_eq!(m.cached_glyphs(), 2);
        assert_eq!(m.measure("ab"), 24.0);
    }

    #[test]
    fn rejected_font_keeps_previous_state() {
        let mut m = TextMeasurer::new(Rc::new(CellSurface), FontSpec::new("mono", 10.0)).unwrap();
        let err = m.set_font(FontSpec::new("mono", 0.0)).unwrap_err();
        assert!(matches!(err, MeasureError::FontRejected { .. }));
        assert_eq!(m.font().size, 10.0);
        assert_eq!(m.measure("ab"), 12.0);
    }

    #[test]
    fn broken_surface_is_fatal() {
        let err = TextMeasurer::new(Rc::new(BrokenSurface), FontSpec::default()).unwrap_err();
        assert_eq!(
            err,
            MeasureError::SurfaceUnavailable("no 2d context".into())
        );
    }
}
