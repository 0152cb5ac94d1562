//! The action sink: callbacks observing charstring interpretation.

use kurbo::Point;

use crate::charstring::Opcode;

/// Receiver for the geometric and metric events produced by interpretation.
///
/// Every method has a default. The defaults either do nothing or reduce an
/// event to a more primitive one (a line is a curve with coincident control
/// points, a flex is two curves, the three-stem forms are three stems), so
/// a sink implements only the vocabulary it cares about.
///
/// Each callback receives the opcode that produced the event, for
/// diagnostic context. Points are absolute. The sink must not assume
/// anything about the interpreter's internal state between calls, and is
/// never called after the interpreter has latched an error.
pub trait Sink {
    /// The glyph's left sidebearing. Emitted at most once per outer glyph,
    /// never during seac recursion.
    fn sidebearing(&mut self, _op: Opcode, _p: Point) {}

    /// The glyph's advance width, when the program states one.
    fn width(&mut self, _op: Opcode, _p: Point) {}

    /// A Type 2 glyph elected the font's default width. `width` is the
    /// environment's default advance, when known.
    fn default_width(&mut self, op: Opcode, width: Option<f64>) {
        if let Some(w) = width {
            self.width(op, Point::new(w, 0.0));
        }
    }

    /// A Type 2 glyph stated its width as a delta against the nominal
    /// width. `nominal` is the environment's nominal advance, when known.
    fn nominal_width_delta(&mut self, op: Opcode, nominal: Option<f64>, delta: f64) {
        if let Some(w) = nominal {
            self.width(op, Point::new(w + delta, 0.0));
        }
    }

    /// A straight segment from `p0` to `p1`.
    fn line(&mut self, op: Opcode, p0: Point, p1: Point) {
        self.curve(op, p0, p0, p1, p1);
    }

    /// A cubic segment from `p0` to `p3` with control points `p1`, `p2`.
    fn curve(&mut self, _op: Opcode, _p0: Point, _p1: Point, _p2: Point, _p3: Point) {}

    /// The current subpath closed.
    fn closepath(&mut self, _op: Opcode) {}

    /// A horizontal stem zone from `y` to `y + dy`.
    fn hstem(&mut self, _op: Opcode, _y: f64, _dy: f64) {}

    /// A vertical stem zone from `x` to `x + dx`.
    fn vstem(&mut self, _op: Opcode, _x: f64, _dx: f64) {}

    fn hstem3(&mut self, op: Opcode, y0: f64, dy0: f64, y1: f64, dy1: f64, y2: f64, dy2: f64) {
        self.hstem(op, y0, dy0);
        self.hstem(op, y1, dy1);
        self.hstem(op, y2, dy2);
    }

    fn vstem3(&mut self, op: Opcode, x0: f64, dx0: f64, x1: f64, dx1: f64, x2: f64, dx2: f64) {
        self.vstem(op, x0, dx0);
        self.vstem(op, x1, dx1);
        self.vstem(op, x2, dx2);
    }

    /// A hint-selection bitmap, one bit per declared stem. `mask` holds
    /// exactly `(nhints + 7) / 8` bytes.
    fn hintmask(&mut self, _op: Opcode, _mask: &[u8], _nhints: usize) {}

    /// A seac composition. Return `true` (the default) to let the
    /// interpreter run the standard two-glyph recursion, or `false` to
    /// handle the composition in the sink alone.
    fn seac(&mut self, _op: Opcode, _asb: f64, _adx: f64, _ady: f64, _bchar: i32, _achar: i32) -> bool {
        true
    }

    /// A flex section: two cubics joined at `p3`, plus the flex depth hint.
    #[allow(clippy::too_many_arguments)]
    fn flex(
        &mut self,
        op: Opcode,
        p0: Point,
        p1: Point,
        p2: Point,
        p3: Point,
        p4: Point,
        p5: Point,
        p6: Point,
        depth: f64,
    ) {
        let _ = depth;
        self.curve(op, p0, p1, p2, p3);
        self.curve(op, p3, p4, p5, p6);
    }
}

/// Discards every event.
impl Sink for () {}
