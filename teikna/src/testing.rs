//! Shared helpers for unit tests: an event-recording sink, a configurable
//! program environment, and byte builders for both charstring dialects.

use std::{cell::RefCell, collections::HashMap};

use font_types::Fixed;
use kurbo::Point;

use crate::{
    charstring::{Charstring, Opcode, Type1Charstring, Type2Charstring},
    program::Program,
    sink::Sink,
};

/// Pins the program type parameter for environment-free interpreters.
pub const NO_PROGRAM: Option<&()> = None;

/// One observed sink callback.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Sidebearing(Point),
    Width(Point),
    DefaultWidth(Option<f64>),
    NominalWidthDelta(Option<f64>, f64),
    Line(Point, Point),
    Curve(Point, Point, Point, Point),
    ClosePath,
    HStem(f64, f64),
    VStem(f64, f64),
    HintMask(Vec<u8>, usize),
    Seac(f64, f64, f64, i32, i32),
    Flex([Point; 7], f64),
}

/// Sink that records every callback verbatim.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<Event>,
    /// When set, `seac` events are recorded but the standard recursion is
    /// suppressed.
    pub suppress_seac: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for Recorder {
    fn sidebearing(&mut self, _op: Opcode, p: Point) {
        self.events.push(Event::Sidebearing(p));
    }

    fn width(&mut self, _op: Opcode, p: Point) {
        self.events.push(Event::Width(p));
    }

    fn default_width(&mut self, _op: Opcode, width: Option<f64>) {
        self.events.push(Event::DefaultWidth(width));
    }

    fn nominal_width_delta(&mut self, _op: Opcode, nominal: Option<f64>, delta: f64) {
        self.events.push(Event::NominalWidthDelta(nominal, delta));
    }

    fn line(&mut self, _op: Opcode, p0: Point, p1: Point) {
        self.events.push(Event::Line(p0, p1));
    }

    fn curve(&mut self, _op: Opcode, p0: Point, p1: Point, p2: Point, p3: Point) {
        self.events.push(Event::Curve(p0, p1, p2, p3));
    }

    fn closepath(&mut self, _op: Opcode) {
        self.events.push(Event::ClosePath);
    }

    fn hstem(&mut self, _op: Opcode, y: f64, dy: f64) {
        self.events.push(Event::HStem(y, dy));
    }

    fn vstem(&mut self, _op: Opcode, x: f64, dx: f64) {
        self.events.push(Event::VStem(x, dx));
    }

    fn hintmask(&mut self, _op: Opcode, mask: &[u8], nhints: usize) {
        self.events.push(Event::HintMask(mask.to_vec(), nhints));
    }

    fn seac(&mut self, _op: Opcode, asb: f64, adx: f64, ady: f64, bchar: i32, achar: i32) -> bool {
        self.events.push(Event::Seac(asb, adx, ady, bchar, achar));
        !self.suppress_seac
    }

    #[allow(clippy::too_many_arguments)]
    fn flex(
        &mut self,
        _op: Opcode,
        p0: Point,
        p1: Point,
        p2: Point,
        p3: Point,
        p4: Point,
        p5: Point,
        p6: Point,
        depth: f64,
    ) {
        self.events
            .push(Event::Flex([p0, p1, p2, p3, p4, p5, p6], depth));
    }
}

/// Program environment backed by hash maps and plain vectors.
#[derive(Default)]
pub struct TestProgram {
    pub subrs: HashMap<i32, Charstring>,
    pub gsubrs: HashMap<i32, Charstring>,
    pub glyphs: HashMap<String, Charstring>,
    pub norm_design: Option<RefCell<Vec<f64>>>,
    pub design: Option<Vec<f64>>,
    pub writable: bool,
    pub default_width: Option<f64>,
    pub nominal_width: Option<f64>,
}

impl Program for TestProgram {
    fn subr(&self, n: i32) -> Option<&Charstring> {
        self.subrs.get(&n)
    }

    fn gsubr(&self, n: i32) -> Option<&Charstring> {
        self.gsubrs.get(&n)
    }

    fn glyph_by_name(&self, name: &str) -> Option<&Charstring> {
        self.glyphs.get(name)
    }

    fn norm_design_vector(&self) -> Option<Vec<f64>> {
        self.norm_design.as_ref().map(|v| v.borrow().clone())
    }

    fn design_vector(&self) -> Option<Vec<f64>> {
        self.design.clone()
    }

    fn writable_vectors(&self) -> bool {
        self.writable
    }

    fn write_norm_design_vector(&self, offset: usize, cells: &[f64]) {
        if let Some(vector) = &self.norm_design {
            let mut vector = vector.borrow_mut();
            if offset + cells.len() > vector.len() {
                vector.resize(offset + cells.len(), 0.0);
            }
            vector[offset..offset + cells.len()].copy_from_slice(cells);
        }
    }

    fn global_width_x(&self, nominal: bool) -> Option<f64> {
        if nominal {
            self.nominal_width
        } else {
            self.default_width
        }
    }
}

fn push_two_byte_int(data: &mut Vec<u8>, i: i32) {
    if i >= 0 {
        let d = i - 108;
        data.push((d / 256 + 247) as u8);
        data.push((d % 256) as u8);
    } else {
        let d = -i - 108;
        data.push((d / 256 + 251) as u8);
        data.push((d % 256) as u8);
    }
}

fn push_op(data: &mut Vec<u8>, op: Opcode) {
    let raw = op.raw();
    if raw < 32 {
        data.push(raw as u8);
    } else {
        data.push(12);
        data.push((raw - 32) as u8);
    }
}

/// Byte builder for Type 1 programs.
#[derive(Default)]
pub struct Type1Builder {
    data: Vec<u8>,
}

impl Type1Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(mut self, v: f64) -> Self {
        assert_eq!(v.fract(), 0.0, "Type 1 charstrings build fractions with div");
        let i = v as i32;
        match i {
            -107..=107 => self.data.push((i + 139) as u8),
            108..=1131 | -1131..=-108 => push_two_byte_int(&mut self.data, i),
            _ => {
                self.data.push(255);
                self.data.extend_from_slice(&i.to_be_bytes());
            }
        }
        self
    }

    pub fn op(mut self, op: Opcode) -> Self {
        push_op(&mut self.data, op);
        self
    }

    pub fn build(self) -> Charstring {
        Charstring::Type1(Type1Charstring::new(self.data))
    }
}

/// Byte builder for Type 2 programs.
#[derive(Default)]
pub struct Type2Builder {
    data: Vec<u8>,
}

impl Type2Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(mut self, v: f64) -> Self {
        if v.fract() == 0.0 && (f64::from(i16::MIN)..=f64::from(i16::MAX)).contains(&v) {
            let i = v as i32;
            match i {
                -107..=107 => self.data.push((i + 139) as u8),
                108..=1131 | -1131..=-108 => push_two_byte_int(&mut self.data, i),
                _ => {
                    self.data.push(28);
                    self.data.extend_from_slice(&(i as i16).to_be_bytes());
                }
            }
        } else {
            self.data.push(255);
            self.data
                .extend_from_slice(&Fixed::from_f64(v).to_bits().to_be_bytes());
        }
        self
    }

    pub fn op(mut self, op: Opcode) -> Self {
        push_op(&mut self.data, op);
        self
    }

    /// Appends raw mask bytes, as consumed by `hintmask`/`cntrmask`.
    pub fn mask(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Charstring {
        Charstring::Type2(Type2Charstring::new(self.data))
    }
}
