//! Accumulating glyph metrics from the action stream.

use kurbo::{Point, Rect};

use crate::{charstring::Opcode, sink::Sink};

/// Sink that accumulates a glyph's bounding box and advance width.
///
/// The box is the hull of every point the program emits, control points
/// included, which is how the historical bounds checkers measured glyphs;
/// it can therefore be slightly larger than the tight curve extents.
#[derive(Clone, Debug, Default)]
pub struct CharstringBounds {
    bounds: Option<Rect>,
    left_sidebearing: Option<Point>,
    advance: Option<Point>,
}

impl CharstringBounds {
    pub fn new() -> Self {
        Self::default()
    }

    fn mark(&mut self, p: Point) {
        self.bounds = Some(match self.bounds {
            Some(r) => r.union_pt(p),
            None => Rect::from_points(p, p),
        });
    }

    /// The accumulated control-point hull, or `None` for an empty glyph.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Whether the glyph drew nothing.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    pub fn left_sidebearing(&self) -> Option<Point> {
        self.left_sidebearing
    }

    /// The advance width vector, when the glyph stated or inherited one.
    pub fn advance_width(&self) -> Option<Point> {
        self.advance
    }
}

impl Sink for CharstringBounds {
    fn sidebearing(&mut self, _op: Opcode, p: Point) {
        self.left_sidebearing = Some(p);
    }

    fn width(&mut self, _op: Opcode, p: Point) {
        self.advance = Some(p);
    }

    fn curve(&mut self, _op: Opcode, p0: Point, p1: Point, p2: Point, p3: Point) {
        self.mark(p0);
        self.mark(p1);
        self.mark(p2);
        self.mark(p3);
    }
}
