//! The charstring interpreter.

use kurbo::{Point, Vec2};

use crate::{
    charstring::{Charstring, Cursor, Opcode},
    encoding,
    error::Error,
    program::Program,
    sink::Sink,
    stack::{vec_get, vec_put, ScratchVector, Stack, PS_STACK_SIZE, STACK_SIZE},
};

/// Maximum subroutine nesting depth, per the CFF specification.
pub const MAX_SUBR_DEPTH: usize = 10;

/// Flex depth implied by the abbreviated Type 2 flex operators, in
/// hundredths of a pixel.
const DEFAULT_FLEX_DEPTH: f64 = 50.0;

/// Othersubr numbers serviced by `callothersubr`.
mod othersubr {
    pub const FLEX_END: i32 = 0;
    pub const FLEX_BEGIN: i32 = 1;
    pub const FLEX_MIDDLE: i32 = 2;
    pub const REPLACE_HINTS: i32 = 3;
    pub const MM1: i32 = 14;
    pub const MM2: i32 = 15;
    pub const MM3: i32 = 16;
    pub const MM4: i32 = 17;
    pub const MM6: i32 = 18;
    pub const ITC_LOAD: i32 = 19;
    pub const ITC_ADD: i32 = 20;
    pub const ITC_SUB: i32 = 21;
    pub const ITC_MUL: i32 = 22;
    pub const ITC_DIV: i32 = 23;
    pub const ITC_PUT: i32 = 24;
    pub const ITC_GET: i32 = 25;
    pub const ITC_IFELSE: i32 = 27;
    pub const ITC_RANDOM: i32 = 28;
}

/// Ordering phases of a glyph program.
///
/// The phase only moves forward within one invocation; seac recursion
/// re-initializes the interpreter and pins the inner run to `Seac` so the
/// component's own sidebearing command does not re-emit metrics.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum State {
    Initial,
    Seac,
    Sbw,
    Hstem,
    Vstem,
    Hintmask,
    IPath,
    Path,
}

/// Outcome of a single command: keep consuming the current charstring, or
/// stop because `return`, `endchar`, or seac took over.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// The charstring virtual machine.
///
/// One instance interprets one glyph at a time, feeding geometric and
/// metric events to a [`Sink`]. The program environment and the
/// multiple-master weight vector are borrowed for the interpreter's
/// lifetime; subroutine and seac calls re-enter the same instance.
///
/// [`run`](Self::run) resets all per-glyph state, so an instance can be
/// reused across glyphs. The scratch vector deliberately survives between
/// runs. Instances are not meant to be shared across threads; give each
/// thread its own.
pub struct CharstringInterp<'a, P: Program> {
    program: Option<&'a P>,
    weight_vector: Option<&'a mut Vec<f64>>,
    stack: Stack<STACK_SIZE>,
    ps_stack: Stack<PS_STACK_SIZE>,
    scratch: ScratchVector,
    error: Option<Error>,
    done: bool,
    flex: bool,
    t2nhints: usize,
    subr_depth: usize,
    state: State,
    lsb: Point,
    cp: Point,
    seac_origin: Point,
}

impl<'a, P: Program> CharstringInterp<'a, P> {
    pub fn new(program: Option<&'a P>, weight_vector: Option<&'a mut Vec<f64>>) -> Self {
        Self {
            program,
            weight_vector,
            stack: Stack::new(),
            ps_stack: Stack::new(),
            scratch: ScratchVector::new(),
            error: None,
            done: false,
            flex: false,
            t2nhints: 0,
            subr_depth: 0,
            state: State::Initial,
            lsb: Point::ZERO,
            cp: Point::ZERO,
            seac_origin: Point::ZERO,
        }
    }

    /// Resets all per-glyph state. The scratch vector is preserved.
    pub fn init(&mut self) {
        self.stack.clear();
        self.ps_stack.clear();
        self.error = None;
        self.done = false;
        self.flex = false;
        self.t2nhints = 0;
        self.subr_depth = 0;
        self.state = State::Initial;
        self.lsb = Point::ZERO;
        self.cp = Point::ZERO;
        self.seac_origin = Point::ZERO;
    }

    /// Interprets a glyph program from its beginning.
    ///
    /// On failure the first error is returned and also latched for
    /// [`error`](Self::error); no further commands were executed and the
    /// sink saw nothing after the failure point.
    pub fn run<S: Sink>(&mut self, cs: &Charstring, sink: &mut S) -> Result<(), Error> {
        self.init();
        match cs.execute(self, sink) {
            Ok(()) => {
                self.done = true;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err);
                Err(err)
            }
        }
    }

    /// The latched error from the most recent run, if any.
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Whether a terminating opcode has been executed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn current_point(&self) -> Point {
        self.cp
    }

    pub fn left_sidebearing(&self) -> Point {
        self.lsb
    }

    /// Number of stem hints declared so far in a Type 2 program.
    pub fn hint_count(&self) -> usize {
        self.t2nhints
    }

    /// Current subroutine nesting depth.
    pub fn subr_depth(&self) -> usize {
        self.subr_depth
    }

    pub(crate) fn number(&mut self, value: f64) -> Result<(), Error> {
        self.stack.push(value)
    }

    fn at(&self, i: usize) -> f64 {
        self.stack.at(i)
    }

    fn check_stack(&self, n: usize, op: Opcode) -> Result<(), Error> {
        if self.stack.len() < n {
            Err(Error::Underflow(op))
        } else {
            Ok(())
        }
    }

    /// Type 2 drawing commands require an open path and leave it open.
    fn check_state(&mut self, op: Opcode) -> Result<(), Error> {
        if self.state < State::IPath {
            return Err(Error::Ordering(op));
        }
        self.state = State::Path;
        Ok(())
    }

    fn rmoveto(&mut self, dx: f64, dy: f64) {
        self.cp += Vec2::new(dx, dy);
    }

    fn rlineto<S: Sink>(&mut self, sink: &mut S, op: Opcode, dx: f64, dy: f64) {
        let p0 = self.cp;
        self.cp += Vec2::new(dx, dy);
        sink.line(op, p0, self.cp);
    }

    #[allow(clippy::too_many_arguments)]
    fn rrcurveto<S: Sink>(
        &mut self,
        sink: &mut S,
        op: Opcode,
        dx1: f64,
        dy1: f64,
        dx2: f64,
        dy2: f64,
        dx3: f64,
        dy3: f64,
    ) {
        let p0 = self.cp;
        let p1 = p0 + Vec2::new(dx1, dy1);
        let p2 = p1 + Vec2::new(dx2, dy2);
        self.cp = p2 + Vec2::new(dx3, dy3);
        sink.curve(op, p0, p1, p2, self.cp);
    }

    #[allow(clippy::too_many_arguments)]
    fn rrflex<S: Sink>(
        &mut self,
        sink: &mut S,
        op: Opcode,
        dx1: f64,
        dy1: f64,
        dx2: f64,
        dy2: f64,
        dx3: f64,
        dy3: f64,
        dx4: f64,
        dy4: f64,
        dx5: f64,
        dy5: f64,
        dx6: f64,
        dy6: f64,
        depth: f64,
    ) {
        let p0 = self.cp;
        let p1 = p0 + Vec2::new(dx1, dy1);
        let p2 = p1 + Vec2::new(dx2, dy2);
        let p3 = p2 + Vec2::new(dx3, dy3);
        let p4 = p3 + Vec2::new(dx4, dy4);
        let p5 = p4 + Vec2::new(dx5, dy5);
        self.cp = p5 + Vec2::new(dx6, dy6);
        sink.flex(op, p0, p1, p2, p3, p4, p5, self.cp, depth);
    }

    /// Arithmetic and stack manipulation shared by both dialects. These
    /// commands leave the rest of the operand stack in place.
    fn arith_command(&mut self, op: Opcode) -> Result<(), Error> {
        match op {
            Opcode::BLEND => return self.blend_command(),
            Opcode::ABS => {
                self.check_stack(1, op)?;
                if self.stack.top(0) < 0.0 {
                    let v = -self.stack.top(0);
                    self.stack.set_top(0, v);
                }
            }
            Opcode::ADD => {
                self.check_stack(2, op)?;
                let d = self.stack.pop();
                let v = self.stack.top(0) + d;
                self.stack.set_top(0, v);
            }
            Opcode::SUB => {
                self.check_stack(2, op)?;
                let d = self.stack.pop();
                let v = self.stack.top(0) - d;
                self.stack.set_top(0, v);
            }
            Opcode::DIV => {
                self.check_stack(2, op)?;
                let d = self.stack.pop();
                let v = self.stack.top(0) / d;
                self.stack.set_top(0, v);
            }
            Opcode::NEG => {
                self.check_stack(1, op)?;
                let v = -self.stack.top(0);
                self.stack.set_top(0, v);
            }
            Opcode::RANDOM => {
                // The result must be strictly positive; retry on zero.
                let value = loop {
                    let d: f64 = rand::random();
                    if d != 0.0 {
                        break d;
                    }
                };
                self.stack.push(value)?;
            }
            Opcode::MUL => {
                self.check_stack(2, op)?;
                let d = self.stack.pop();
                let v = self.stack.top(0) * d;
                self.stack.set_top(0, v);
            }
            Opcode::SQRT => {
                self.check_stack(1, op)?;
                if self.stack.top(0) < 0.0 {
                    return Err(Error::Value(op));
                }
                let v = self.stack.top(0).sqrt();
                self.stack.set_top(0, v);
            }
            Opcode::DROP => {
                self.check_stack(1, op)?;
                self.stack.pop();
            }
            Opcode::EXCH => {
                self.check_stack(2, op)?;
                let (a, b) = (self.stack.top(0), self.stack.top(1));
                self.stack.set_top(0, b);
                self.stack.set_top(1, a);
            }
            Opcode::INDEX => {
                self.check_stack(1, op)?;
                if self.stack.top(0) < 0.0 {
                    return Err(Error::Value(op));
                }
                let i = self.stack.top(0) as usize;
                self.check_stack(i + 2, op)?;
                let v = self.stack.top(i + 1);
                self.stack.set_top(0, v);
            }
            Opcode::ROLL => return self.roll_command(),
            Opcode::DUP => {
                self.check_stack(1, op)?;
                let v = self.stack.top(0);
                self.stack.push(v)?;
            }
            Opcode::AND => {
                self.check_stack(2, op)?;
                let d = self.stack.pop();
                let v = self.stack.top(0) != 0.0 && d != 0.0;
                self.stack.set_top(0, if v { 1.0 } else { 0.0 });
            }
            Opcode::OR => {
                self.check_stack(2, op)?;
                let d = self.stack.pop();
                let v = self.stack.top(0) != 0.0 || d != 0.0;
                self.stack.set_top(0, if v { 1.0 } else { 0.0 });
            }
            Opcode::NOT => {
                self.check_stack(1, op)?;
                let v = self.stack.top(0) == 0.0;
                self.stack.set_top(0, if v { 1.0 } else { 0.0 });
            }
            Opcode::EQ => {
                self.check_stack(2, op)?;
                let d = self.stack.pop();
                let v = self.stack.top(0) == d;
                self.stack.set_top(0, if v { 1.0 } else { 0.0 });
            }
            Opcode::IFELSE => {
                self.check_stack(4, op)?;
                if self.stack.top(1) > self.stack.top(0) {
                    let v = self.stack.top(2);
                    self.stack.set_top(3, v);
                }
                self.stack.pop_n(3);
            }
            Opcode::POP => {
                if self.ps_stack.is_empty() {
                    return Err(Error::Underflow(op));
                }
                let v = self.ps_stack.pop();
                self.stack.push(v)?;
            }
            // Found with no explanation in JansonText-Roman.
            Opcode::RESERVED_15 => {
                self.check_stack(2, op)?;
                self.stack.pop_n(2);
            }
            _ => return Err(Error::Unimplemented(op)),
        }
        Ok(())
    }

    fn blend_command(&mut self) -> Result<(), Error> {
        let op = Opcode::BLEND;
        self.check_stack(1, op)?;
        let nargs = self.stack.pop() as i32;
        let Some(weight) = self.weight_vector.as_deref() else {
            return Err(Error::Vector(op));
        };
        if weight.is_empty() {
            return Err(Error::Vector(op));
        }
        if nargs < 0 {
            return Err(Error::Value(op));
        }
        let nargs = nargs as usize;
        let nmasters = weight.len();
        if self.stack.len() < nargs * nmasters {
            return Err(Error::Underflow(op));
        }
        let base = self.stack.len() - nargs * nmasters;
        let mut off = base + nargs;
        for j in 0..nargs {
            let mut val = self.stack.at(base + j);
            for w in &weight[1..] {
                val += w * self.stack.at(off);
                off += 1;
            }
            self.stack.set_at(base + j, val);
        }
        self.stack.pop_n(nargs * (nmasters - 1));
        Ok(())
    }

    fn roll_command(&mut self) -> Result<(), Error> {
        let op = Opcode::ROLL;
        self.check_stack(2, op)?;
        let amount = self.stack.pop() as i32;
        let n = self.stack.pop() as i32;
        if n <= 0 {
            return Err(Error::Value(op));
        }
        let n = n as usize;
        self.check_stack(n, op)?;
        let amount = amount.rem_euclid(n as i32) as usize;
        self.stack.window_mut(n).rotate_left(amount);
        Ok(())
    }

    /// `put`/`get`/`store`/`load`: the scratch vector and its exchanges
    /// with the weight and design vectors.
    fn vector_command(&mut self, op: Opcode) -> Result<(), Error> {
        match op {
            Opcode::PUT => {
                self.check_stack(2, op)?;
                let offset = self.stack.top(0) as i32;
                let value = self.stack.top(1);
                self.scratch.set(offset, value);
                self.stack.pop_n(2);
            }
            Opcode::GET => {
                self.check_stack(1, op)?;
                let offset = self.stack.top(0) as i32;
                let value = self.scratch.get(offset);
                self.stack.set_top(0, value);
            }
            Opcode::STORE => {
                self.check_stack(4, op)?;
                let which = self.stack.top(3) as i32;
                let vector_offset = self.stack.top(2) as i32;
                let offset = self.stack.top(1) as i32;
                let num = self.stack.top(0) as i32;
                self.stack.pop_n(4);
                let Some(program) = self.program else {
                    return Err(Error::Vector(op));
                };
                if !program.writable_vectors() {
                    return Err(Error::Vector(op));
                }
                let cells: Vec<f64> = (0..num.max(0))
                    .map(|i| self.scratch.get(offset + i))
                    .collect();
                match which {
                    0 => {
                        let Some(weight) = self.weight_vector.as_deref_mut() else {
                            return Err(Error::Vector(op));
                        };
                        for (i, cell) in cells.iter().enumerate() {
                            vec_put(weight, vector_offset + i as i32, *cell);
                        }
                    }
                    1 => {
                        if program.norm_design_vector().is_none() {
                            return Err(Error::Vector(op));
                        }
                        if let Ok(voff) = usize::try_from(vector_offset) {
                            program.write_norm_design_vector(voff, &cells);
                        }
                    }
                    _ => return Err(Error::Vector(op)),
                }
            }
            Opcode::LOAD => {
                self.check_stack(3, op)?;
                let which = self.stack.top(2) as i32;
                let offset = self.stack.top(1) as i32;
                let num = self.stack.top(0) as i32;
                self.stack.pop_n(3);
                let Some(program) = self.program else {
                    return Err(Error::Vector(op));
                };
                let source = match which {
                    0 => self.weight_vector.as_deref().cloned(),
                    1 => program.norm_design_vector(),
                    2 => program.design_vector(),
                    _ => None,
                };
                let Some(source) = source else {
                    return Err(Error::Vector(op));
                };
                for i in 0..num.max(0) {
                    self.scratch.set(offset + i, vec_get(&source, i));
                }
            }
            _ => return Err(Error::Unimplemented(op)),
        }
        Ok(())
    }

    fn callsubr_command<S: Sink>(&mut self, sink: &mut S) -> Result<Flow, Error> {
        let op = Opcode::CALLSUBR;
        self.check_stack(1, op)?;
        let which = self.stack.pop() as i32;
        let Some(cs) = self.program.and_then(|p| p.subr(which)) else {
            return Err(Error::Subr(which));
        };
        if self.subr_depth >= MAX_SUBR_DEPTH {
            return Err(Error::SubrDepth(which));
        }
        self.subr_depth += 1;
        let result = cs.execute(self, sink);
        self.subr_depth -= 1;
        result?;
        Ok(if self.done { Flow::Stop } else { Flow::Continue })
    }

    fn callgsubr_command<S: Sink>(&mut self, sink: &mut S) -> Result<Flow, Error> {
        let op = Opcode::CALLGSUBR;
        self.check_stack(1, op)?;
        let which = self.stack.pop() as i32;
        let Some(cs) = self.program.and_then(|p| p.gsubr(which)) else {
            return Err(Error::Subr(which));
        };
        if self.subr_depth >= MAX_SUBR_DEPTH {
            return Err(Error::SubrDepth(which));
        }
        self.subr_depth += 1;
        let result = cs.execute(self, sink);
        self.subr_depth -= 1;
        result?;
        Ok(if self.done { Flow::Stop } else { Flow::Continue })
    }

    /// Multiple-master othersubrs: blend `nargs` argument groups through
    /// the weight vector and leave the results on the PostScript stack in
    /// reverse, so subsequent `pop`s retrieve them in program order.
    fn mm_command(&mut self, command: i32, on_stack: usize) -> Result<(), Error> {
        let op = Opcode::CALLOTHERSUBR;
        let Some(weight) = self.weight_vector.as_deref() else {
            return Err(Error::Vector(op));
        };
        let nargs = match command {
            othersubr::MM1 => 1,
            othersubr::MM2 => 2,
            othersubr::MM3 => 3,
            othersubr::MM4 => 4,
            othersubr::MM6 => 6,
            _ => return Err(Error::Internal(op)),
        };
        let nmasters = weight.len();
        if self.stack.len() < nargs * nmasters || on_stack != nargs * nmasters {
            return Err(Error::MultipleMaster(op));
        }
        let base = self.stack.len() - on_stack;
        let mut off = base + nargs;
        for j in 0..nargs {
            let mut val = self.stack.at(base + j);
            for w in &weight[1..] {
                val += w * self.stack.at(off);
                off += 1;
            }
            self.stack.set_at(base + j, val);
        }
        for i in (0..nargs).rev() {
            let _ = self.ps_stack.push(self.stack.at(base + i));
        }
        self.stack.pop_n(on_stack);
        Ok(())
    }

    /// The Apple "ITC" othersubr extensions: scratch-vector access and
    /// arithmetic whose results travel through the PostScript stack.
    fn itc_command(&mut self, command: i32, on_stack: usize) -> Result<(), Error> {
        let op = Opcode::CALLOTHERSUBR;
        let Some(weight) = self.weight_vector.as_deref() else {
            return Err(Error::Vector(op));
        };
        let base = self.stack.len() - on_stack;
        match command {
            othersubr::ITC_LOAD => {
                if on_stack != 1 {
                    return Err(Error::Othersubr(command));
                }
                let offset = self.stack.at(base) as i32;
                for (i, w) in weight.iter().enumerate() {
                    self.scratch.set(offset + i as i32, *w);
                }
            }
            othersubr::ITC_PUT => {
                if on_stack != 2 {
                    return Err(Error::Othersubr(command));
                }
                let offset = self.stack.at(base + 1) as i32;
                let value = self.stack.at(base);
                self.scratch.set(offset, value);
            }
            othersubr::ITC_GET => {
                if on_stack != 1 {
                    return Err(Error::Othersubr(command));
                }
                let offset = self.stack.at(base) as i32;
                let value = self.scratch.get(offset);
                let _ = self.ps_stack.push(value);
            }
            othersubr::ITC_ADD => {
                if on_stack != 2 {
                    return Err(Error::Othersubr(command));
                }
                let _ = self.ps_stack.push(self.stack.at(base) + self.stack.at(base + 1));
            }
            othersubr::ITC_SUB => {
                if on_stack != 2 {
                    return Err(Error::Othersubr(command));
                }
                let _ = self.ps_stack.push(self.stack.at(base) - self.stack.at(base + 1));
            }
            othersubr::ITC_MUL => {
                if on_stack != 2 {
                    return Err(Error::Othersubr(command));
                }
                let _ = self.ps_stack.push(self.stack.at(base) * self.stack.at(base + 1));
            }
            othersubr::ITC_DIV => {
                if on_stack != 2 {
                    return Err(Error::Othersubr(command));
                }
                let _ = self.ps_stack.push(self.stack.at(base) / self.stack.at(base + 1));
            }
            othersubr::ITC_IFELSE => {
                if on_stack != 4 {
                    return Err(Error::Othersubr(command));
                }
                let v = if self.stack.at(base + 2) <= self.stack.at(base + 3) {
                    self.stack.at(base)
                } else {
                    self.stack.at(base + 1)
                };
                let _ = self.ps_stack.push(v);
            }
            _ => return Err(Error::Othersubr(command)),
        }
        self.stack.pop_n(on_stack);
        Ok(())
    }

    fn callothersubr_command<S: Sink>(
        &mut self,
        sink: &mut S,
        number: i32,
        n: usize,
    ) -> Result<(), Error> {
        match number {
            othersubr::FLEX_END if n == 3 => {
                if !self.flex || self.ps_stack.len() != 16 {
                    return Err(Error::Flex);
                }
                // The seven flex points sit on the PostScript stack; slots
                // 2..4 hold the reference point, which the flex event skips.
                let p = |i: usize| Point::new(self.ps_stack.at(i), self.ps_stack.at(i + 1));
                sink.flex(
                    Opcode::CALLOTHERSUBR,
                    p(0),
                    p(4),
                    p(6),
                    p(8),
                    p(10),
                    p(12),
                    p(14),
                    self.stack.top(2),
                );
                let (final_y, final_x) = (self.stack.top(0), self.stack.top(1));
                self.ps_stack.clear();
                let _ = self.ps_stack.push(final_y);
                let _ = self.ps_stack.push(final_x);
                self.flex = false;
                self.state = State::Path;
            }
            othersubr::FLEX_BEGIN if n == 0 => {
                if self.flex {
                    return Err(Error::Flex);
                }
                self.ps_stack.clear();
                let _ = self.ps_stack.push(self.cp.x);
                let _ = self.ps_stack.push(self.cp.y);
                self.flex = true;
                self.state = State::IPath;
            }
            othersubr::FLEX_MIDDLE if n == 0 => {
                if !self.flex {
                    return Err(Error::Flex);
                }
                let _ = self.ps_stack.push(self.cp.x);
                let _ = self.ps_stack.push(self.cp.y);
            }
            othersubr::REPLACE_HINTS if n == 1 => {
                let v = self.stack.top(0);
                self.ps_stack.clear();
                let _ = self.ps_stack.push(v);
            }
            othersubr::MM1 | othersubr::MM2 | othersubr::MM3 | othersubr::MM4 | othersubr::MM6 => {
                return self.mm_command(number, n);
            }
            othersubr::ITC_LOAD..=othersubr::ITC_RANDOM => {
                return self.itc_command(number, n);
            }
            // Unknown othersubrs (counter control included) pass their
            // arguments through to the PostScript stack unchanged.
            _ => {
                self.ps_stack.clear();
                for i in 0..n {
                    let _ = self.ps_stack.push(self.stack.top(i));
                }
            }
        }
        self.stack.pop_n(n);
        Ok(())
    }

    /// Seac composition: resolve both components through the Adobe
    /// Standard Encoding and run the accent (at its translated origin)
    /// followed by the base, re-initializing in between. The left
    /// sidebearing survives the recursion; everything else is per-glyph.
    fn seac_command<S: Sink>(
        &mut self,
        sink: &mut S,
        op: Opcode,
        asb: f64,
        adx: f64,
        ady: f64,
        bchar: i32,
        achar: i32,
    ) -> Result<(), Error> {
        if !sink.seac(op, asb, adx, ady, bchar, achar) {
            return Ok(());
        }
        let Some(program) = self.program else {
            return Err(Error::Glyph(bchar));
        };
        let acs = encoding::standard_encoding(achar)
            .and_then(|name| program.glyph_by_name(name))
            .ok_or(Error::Glyph(achar))?;
        let bcs = encoding::standard_encoding(bchar)
            .and_then(|name| program.glyph_by_name(name))
            .ok_or(Error::Glyph(bchar))?;
        let accent_origin = Point::new(adx + self.lsb.x - asb, ady + self.lsb.y);
        let save_lsb = self.lsb;
        let save_origin = self.seac_origin;
        self.init();
        self.seac_origin = accent_origin;
        // Type 1 components apply the origin through hsbw/sbw; Type 2
        // components have no sidebearing command, so seed the current point.
        self.cp = self.seac_origin;
        self.state = State::Seac;
        let result = acs.execute(self, sink).and_then(|()| {
            self.init();
            self.seac_origin = save_origin;
            self.cp = self.seac_origin;
            self.state = State::Seac;
            bcs.execute(self, sink)
        });
        self.lsb = save_lsb;
        result
    }

    /// Consumes the optional leading width of a Type 2 program and emits
    /// the corresponding metric event. Returns the index of the first real
    /// operand.
    fn type2_handle_width<S: Sink>(&mut self, op: Opcode, sink: &mut S, have_width: bool) -> usize {
        if have_width {
            let nominal = self.program.and_then(|p| p.global_width_x(true));
            sink.nominal_width_delta(op, nominal, self.at(0));
            1
        } else {
            let width = self.program.and_then(|p| p.global_width_x(false));
            sink.default_width(op, width);
            0
        }
    }

    /// Executes one Type 1 command.
    pub(crate) fn type1_command<S: Sink>(
        &mut self,
        op: Opcode,
        sink: &mut S,
    ) -> Result<Flow, Error> {
        match op {
            Opcode::RETURN => return Ok(Flow::Stop),
            Opcode::HSBW => {
                self.check_stack(2, op)?;
                if self.state > State::Seac {
                    return Err(Error::Ordering(op));
                }
                self.lsb = self.seac_origin + Vec2::new(self.at(0), 0.0);
                self.cp = self.lsb;
                if self.state == State::Initial {
                    sink.sidebearing(op, self.lsb);
                    sink.width(op, Point::new(self.at(1), 0.0));
                }
                self.state = State::Sbw;
            }
            Opcode::SBW => {
                self.check_stack(4, op)?;
                if self.state > State::Seac {
                    return Err(Error::Ordering(op));
                }
                self.lsb = self.seac_origin + Vec2::new(self.at(0), self.at(1));
                self.cp = self.lsb;
                if self.state == State::Initial {
                    sink.sidebearing(op, self.lsb);
                    sink.width(op, Point::new(self.at(2), self.at(3)));
                }
                self.state = State::Sbw;
            }
            Opcode::SEAC => {
                self.check_stack(5, op)?;
                if self.state > State::Sbw {
                    return Err(Error::Ordering(op));
                }
                let (asb, adx, ady) = (self.at(0), self.at(1), self.at(2));
                let (bchar, achar) = (self.at(3) as i32, self.at(4) as i32);
                let result = self.seac_command(sink, op, asb, adx, ady, bchar, achar);
                self.done = true;
                self.stack.clear();
                result?;
                return Ok(Flow::Stop);
            }
            Opcode::CALLSUBR => return self.callsubr_command(sink),
            Opcode::CALLOTHERSUBR => {
                self.check_stack(2, op)?;
                let number = self.stack.top(0) as i32;
                let n = self.stack.top(1) as i32;
                self.stack.pop_n(2);
                if number < 0 || (self.stack.len() as i32) < n {
                    return Err(Error::Othersubr(number));
                }
                self.callothersubr_command(sink, number, n as usize)?;
                return Ok(Flow::Continue);
            }
            Opcode::PUT | Opcode::GET | Opcode::STORE | Opcode::LOAD => {
                self.vector_command(op)?;
                return Ok(Flow::Continue);
            }
            Opcode::BLEND
            | Opcode::ABS
            | Opcode::ADD
            | Opcode::SUB
            | Opcode::DIV
            | Opcode::NEG
            | Opcode::RANDOM
            | Opcode::MUL
            | Opcode::SQRT
            | Opcode::DROP
            | Opcode::EXCH
            | Opcode::INDEX
            | Opcode::ROLL
            | Opcode::DUP
            | Opcode::AND
            | Opcode::OR
            | Opcode::NOT
            | Opcode::EQ
            | Opcode::IFELSE
            | Opcode::POP
            | Opcode::RESERVED_15 => {
                self.arith_command(op)?;
                return Ok(Flow::Continue);
            }
            Opcode::HLINETO => {
                self.check_stack(1, op)?;
                self.state = State::Path;
                self.rlineto(sink, op, self.at(0), 0.0);
            }
            Opcode::HMOVETO => {
                self.check_stack(1, op)?;
                if self.state == State::Path {
                    sink.closepath(op);
                }
                self.state = State::IPath;
                self.rmoveto(self.at(0), 0.0);
            }
            Opcode::HVCURVETO => {
                self.check_stack(4, op)?;
                self.state = State::Path;
                self.rrcurveto(sink, op, self.at(0), 0.0, self.at(1), self.at(2), 0.0, self.at(3));
            }
            Opcode::RLINETO => {
                self.check_stack(2, op)?;
                self.state = State::Path;
                self.rlineto(sink, op, self.at(0), self.at(1));
            }
            Opcode::RMOVETO => {
                self.check_stack(2, op)?;
                if self.state == State::Path {
                    sink.closepath(op);
                }
                self.state = State::IPath;
                self.rmoveto(self.at(0), self.at(1));
            }
            Opcode::RRCURVETO => {
                self.check_stack(6, op)?;
                self.state = State::Path;
                self.rrcurveto(
                    sink,
                    op,
                    self.at(0),
                    self.at(1),
                    self.at(2),
                    self.at(3),
                    self.at(4),
                    self.at(5),
                );
            }
            Opcode::VHCURVETO => {
                self.check_stack(4, op)?;
                self.state = State::Path;
                self.rrcurveto(sink, op, 0.0, self.at(0), self.at(1), self.at(2), self.at(3), 0.0);
            }
            Opcode::VLINETO => {
                self.check_stack(1, op)?;
                self.state = State::Path;
                self.rlineto(sink, op, 0.0, self.at(0));
            }
            Opcode::VMOVETO => {
                self.check_stack(1, op)?;
                if self.state == State::Path {
                    sink.closepath(op);
                }
                self.state = State::IPath;
                self.rmoveto(0.0, self.at(0));
            }
            Opcode::DOTSECTION => {}
            Opcode::HSTEM => {
                self.check_stack(2, op)?;
                sink.hstem(op, self.lsb.y + self.at(0), self.at(1));
            }
            Opcode::HSTEM3 => {
                self.check_stack(6, op)?;
                sink.hstem3(
                    op,
                    self.lsb.y + self.at(0),
                    self.at(1),
                    self.lsb.y + self.at(2),
                    self.at(3),
                    self.lsb.y + self.at(4),
                    self.at(5),
                );
            }
            Opcode::VSTEM => {
                self.check_stack(2, op)?;
                sink.vstem(op, self.lsb.x + self.at(0), self.at(1));
            }
            Opcode::VSTEM3 => {
                self.check_stack(6, op)?;
                sink.vstem3(
                    op,
                    self.lsb.x + self.at(0),
                    self.at(1),
                    self.lsb.x + self.at(2),
                    self.at(3),
                    self.lsb.x + self.at(4),
                    self.at(5),
                );
            }
            Opcode::SETCURRENTPOINT => {
                self.check_stack(2, op)?;
                self.cp = Point::new(self.at(0), self.at(1));
            }
            Opcode::CLOSEPATH => {
                if self.state == State::Path {
                    sink.closepath(op);
                }
                self.state = State::IPath;
            }
            Opcode::ENDCHAR => {
                if self.state == State::Path {
                    sink.closepath(op);
                }
                self.done = true;
                return Ok(Flow::Stop);
            }
            _ => return Err(Error::Unimplemented(op)),
        }
        self.stack.clear();
        Ok(Flow::Continue)
    }

    /// Executes one Type 2 command. The cursor allows `hintmask` and
    /// `cntrmask` to consume their trailing bitmap from the instruction
    /// stream.
    pub(crate) fn type2_command<S: Sink>(
        &mut self,
        op: Opcode,
        cursor: &mut Cursor<'_>,
        sink: &mut S,
    ) -> Result<Flow, Error> {
        let mut bottom = 0;
        match op {
            Opcode::HSTEM | Opcode::HSTEMHM => {
                self.check_stack(2, op)?;
                if self.state == State::Initial {
                    let have_width = self.stack.len() % 2 == 1;
                    bottom = self.type2_handle_width(op, sink, have_width);
                }
                if self.state > State::Hstem {
                    return Err(Error::Ordering(op));
                }
                self.state = State::Hstem;
                let mut pos = 0.0;
                while bottom + 1 < self.stack.len() {
                    self.t2nhints += 1;
                    sink.hstem(op, pos + self.at(bottom), self.at(bottom + 1));
                    pos += self.at(bottom) + self.at(bottom + 1);
                    bottom += 2;
                }
            }
            Opcode::VSTEM | Opcode::VSTEMHM => {
                self.check_stack(2, op)?;
                if self.state == State::Initial {
                    let have_width = self.stack.len() % 2 == 1;
                    bottom = self.type2_handle_width(op, sink, have_width);
                }
                if self.state > State::Vstem {
                    return Err(Error::Ordering(op));
                }
                self.state = State::Vstem;
                let mut pos = 0.0;
                while bottom + 1 < self.stack.len() {
                    self.t2nhints += 1;
                    sink.vstem(op, pos + self.at(bottom), self.at(bottom + 1));
                    pos += self.at(bottom) + self.at(bottom + 1);
                    bottom += 2;
                }
            }
            Opcode::HINTMASK | Opcode::CNTRMASK => {
                // A leftover operand stash is shorthand for pending
                // vertical stems.
                if self.state == State::Hstem && self.stack.len() >= 2 {
                    let mut pos = 0.0;
                    while bottom + 1 < self.stack.len() {
                        self.t2nhints += 1;
                        sink.vstem(op, pos + self.at(bottom), self.at(bottom + 1));
                        pos += self.at(bottom) + self.at(bottom + 1);
                        bottom += 2;
                    }
                }
                if self.state < State::Hintmask {
                    self.state = State::Hintmask;
                }
                if self.t2nhints == 0 {
                    return Err(Error::Hintmask(op));
                }
                let nbytes = (self.t2nhints - 1) / 8 + 1;
                if nbytes > cursor.remaining() {
                    return Err(Error::Runoff);
                }
                let mask = cursor.take(nbytes)?;
                sink.hintmask(op, mask, self.t2nhints);
            }
            Opcode::RMOVETO => {
                self.check_stack(2, op)?;
                if self.state == State::Initial {
                    let have_width = self.stack.len() > 2;
                    bottom = self.type2_handle_width(op, sink, have_width);
                } else if self.state == State::Path {
                    sink.closepath(op);
                }
                self.state = State::IPath;
                self.rmoveto(self.at(bottom), self.at(bottom + 1));
            }
            Opcode::HMOVETO => {
                self.check_stack(1, op)?;
                if self.state == State::Initial {
                    let have_width = self.stack.len() > 1;
                    bottom = self.type2_handle_width(op, sink, have_width);
                } else if self.state == State::Path {
                    sink.closepath(op);
                }
                self.state = State::IPath;
                self.rmoveto(self.at(bottom), 0.0);
            }
            Opcode::VMOVETO => {
                self.check_stack(1, op)?;
                if self.state == State::Initial {
                    let have_width = self.stack.len() > 1;
                    bottom = self.type2_handle_width(op, sink, have_width);
                } else if self.state == State::Path {
                    sink.closepath(op);
                }
                self.state = State::IPath;
                self.rmoveto(0.0, self.at(bottom));
            }
            Opcode::RLINETO => {
                self.check_stack(2, op)?;
                self.check_state(op)?;
                while bottom + 1 < self.stack.len() {
                    self.rlineto(sink, op, self.at(bottom), self.at(bottom + 1));
                    bottom += 2;
                }
            }
            Opcode::HLINETO => {
                self.check_stack(1, op)?;
                self.check_state(op)?;
                while bottom < self.stack.len() {
                    self.rlineto(sink, op, self.at(bottom), 0.0);
                    bottom += 1;
                    if bottom < self.stack.len() {
                        self.rlineto(sink, op, 0.0, self.at(bottom));
                        bottom += 1;
                    }
                }
            }
            Opcode::VLINETO => {
                self.check_stack(1, op)?;
                self.check_state(op)?;
                while bottom < self.stack.len() {
                    self.rlineto(sink, op, 0.0, self.at(bottom));
                    bottom += 1;
                    if bottom < self.stack.len() {
                        self.rlineto(sink, op, self.at(bottom), 0.0);
                        bottom += 1;
                    }
                }
            }
            Opcode::RRCURVETO => {
                self.check_stack(6, op)?;
                self.check_state(op)?;
                while bottom + 5 < self.stack.len() {
                    self.rrcurveto(
                        sink,
                        op,
                        self.at(bottom),
                        self.at(bottom + 1),
                        self.at(bottom + 2),
                        self.at(bottom + 3),
                        self.at(bottom + 4),
                        self.at(bottom + 5),
                    );
                    bottom += 6;
                }
            }
            Opcode::HHCURVETO => {
                self.check_stack(4, op)?;
                self.check_state(op)?;
                if self.stack.len() % 2 == 1 {
                    self.rrcurveto(
                        sink,
                        op,
                        self.at(bottom + 1),
                        self.at(bottom),
                        self.at(bottom + 2),
                        self.at(bottom + 3),
                        self.at(bottom + 4),
                        0.0,
                    );
                    bottom += 5;
                }
                while bottom + 3 < self.stack.len() {
                    self.rrcurveto(
                        sink,
                        op,
                        self.at(bottom),
                        0.0,
                        self.at(bottom + 1),
                        self.at(bottom + 2),
                        self.at(bottom + 3),
                        0.0,
                    );
                    bottom += 4;
                }
            }
            Opcode::HVCURVETO => {
                self.check_stack(4, op)?;
                self.check_state(op)?;
                while bottom + 3 < self.stack.len() {
                    let dx3 = if bottom + 5 == self.stack.len() {
                        self.at(bottom + 4)
                    } else {
                        0.0
                    };
                    self.rrcurveto(
                        sink,
                        op,
                        self.at(bottom),
                        0.0,
                        self.at(bottom + 1),
                        self.at(bottom + 2),
                        dx3,
                        self.at(bottom + 3),
                    );
                    bottom += 4;
                    if bottom + 3 < self.stack.len() {
                        let dy3 = if bottom + 5 == self.stack.len() {
                            self.at(bottom + 4)
                        } else {
                            0.0
                        };
                        self.rrcurveto(
                            sink,
                            op,
                            0.0,
                            self.at(bottom),
                            self.at(bottom + 1),
                            self.at(bottom + 2),
                            self.at(bottom + 3),
                            dy3,
                        );
                        bottom += 4;
                    }
                }
            }
            Opcode::VHCURVETO => {
                self.check_stack(4, op)?;
                self.check_state(op)?;
                while bottom + 3 < self.stack.len() {
                    let dy3 = if bottom + 5 == self.stack.len() {
                        self.at(bottom + 4)
                    } else {
                        0.0
                    };
                    self.rrcurveto(
                        sink,
                        op,
                        0.0,
                        self.at(bottom),
                        self.at(bottom + 1),
                        self.at(bottom + 2),
                        self.at(bottom + 3),
                        dy3,
                    );
                    bottom += 4;
                    if bottom + 3 < self.stack.len() {
                        let dx3 = if bottom + 5 == self.stack.len() {
                            self.at(bottom + 4)
                        } else {
                            0.0
                        };
                        self.rrcurveto(
                            sink,
                            op,
                            self.at(bottom),
                            0.0,
                            self.at(bottom + 1),
                            self.at(bottom + 2),
                            dx3,
                            self.at(bottom + 3),
                        );
                        bottom += 4;
                    }
                }
            }
            Opcode::RCURVELINE => {
                self.check_stack(8, op)?;
                self.check_state(op)?;
                while bottom + 7 < self.stack.len() {
                    self.rrcurveto(
                        sink,
                        op,
                        self.at(bottom),
                        self.at(bottom + 1),
                        self.at(bottom + 2),
                        self.at(bottom + 3),
                        self.at(bottom + 4),
                        self.at(bottom + 5),
                    );
                    bottom += 6;
                }
                self.rlineto(sink, op, self.at(bottom), self.at(bottom + 1));
            }
            Opcode::RLINECURVE => {
                self.check_stack(8, op)?;
                self.check_state(op)?;
                while bottom + 7 < self.stack.len() {
                    self.rlineto(sink, op, self.at(bottom), self.at(bottom + 1));
                    bottom += 2;
                }
                self.rrcurveto(
                    sink,
                    op,
                    self.at(bottom),
                    self.at(bottom + 1),
                    self.at(bottom + 2),
                    self.at(bottom + 3),
                    self.at(bottom + 4),
                    self.at(bottom + 5),
                );
            }
            Opcode::VVCURVETO => {
                self.check_stack(4, op)?;
                self.check_state(op)?;
                if self.stack.len() % 2 == 1 {
                    self.rrcurveto(
                        sink,
                        op,
                        self.at(bottom),
                        self.at(bottom + 1),
                        self.at(bottom + 2),
                        self.at(bottom + 3),
                        0.0,
                        self.at(bottom + 4),
                    );
                    bottom += 5;
                }
                while bottom + 3 < self.stack.len() {
                    self.rrcurveto(
                        sink,
                        op,
                        0.0,
                        self.at(bottom),
                        self.at(bottom + 1),
                        self.at(bottom + 2),
                        0.0,
                        self.at(bottom + 3),
                    );
                    bottom += 4;
                }
            }
            Opcode::FLEX => {
                self.check_stack(13, op)?;
                self.check_state(op)?;
                self.rrflex(
                    sink,
                    op,
                    self.at(0),
                    self.at(1),
                    self.at(2),
                    self.at(3),
                    self.at(4),
                    self.at(5),
                    self.at(6),
                    self.at(7),
                    self.at(8),
                    self.at(9),
                    self.at(10),
                    self.at(11),
                    self.at(12),
                );
            }
            Opcode::HFLEX => {
                self.check_stack(7, op)?;
                self.check_state(op)?;
                self.rrflex(
                    sink,
                    op,
                    self.at(0),
                    0.0,
                    self.at(1),
                    self.at(2),
                    self.at(3),
                    0.0,
                    self.at(4),
                    0.0,
                    self.at(5),
                    -self.at(2),
                    self.at(6),
                    0.0,
                    DEFAULT_FLEX_DEPTH,
                );
            }
            Opcode::HFLEX1 => {
                self.check_stack(9, op)?;
                self.check_state(op)?;
                self.rrflex(
                    sink,
                    op,
                    self.at(0),
                    self.at(1),
                    self.at(2),
                    self.at(3),
                    self.at(4),
                    0.0,
                    self.at(5),
                    0.0,
                    self.at(6),
                    self.at(7),
                    self.at(8),
                    -(self.at(1) + self.at(3) + self.at(7)),
                    DEFAULT_FLEX_DEPTH,
                );
            }
            Opcode::FLEX1 => {
                self.check_stack(11, op)?;
                self.check_state(op)?;
                // The final coordinate closes on whichever axis moved less
                // in total.
                let dx = self.at(0) + self.at(2) + self.at(4) + self.at(6) + self.at(8);
                let dy = self.at(1) + self.at(3) + self.at(5) + self.at(7) + self.at(9);
                if dx.abs() > dy.abs() {
                    self.rrflex(
                        sink,
                        op,
                        self.at(0),
                        self.at(1),
                        self.at(2),
                        self.at(3),
                        self.at(4),
                        self.at(5),
                        self.at(6),
                        self.at(7),
                        self.at(8),
                        self.at(9),
                        self.at(10),
                        -dy,
                        DEFAULT_FLEX_DEPTH,
                    );
                } else {
                    self.rrflex(
                        sink,
                        op,
                        self.at(0),
                        self.at(1),
                        self.at(2),
                        self.at(3),
                        self.at(4),
                        self.at(5),
                        self.at(6),
                        self.at(7),
                        self.at(8),
                        self.at(9),
                        -dx,
                        self.at(10),
                        DEFAULT_FLEX_DEPTH,
                    );
                }
            }
            Opcode::ENDCHAR => {
                if self.state == State::Initial {
                    let have_width = !self.stack.is_empty() && self.stack.len() != 4;
                    bottom = self.type2_handle_width(op, sink, have_width);
                }
                let result = if bottom + 3 < self.stack.len() && self.state == State::Initial {
                    let (adx, ady) = (self.at(bottom), self.at(bottom + 1));
                    let (bchar, achar) =
                        (self.at(bottom + 2) as i32, self.at(bottom + 3) as i32);
                    self.seac_command(sink, op, 0.0, adx, ady, bchar, achar)
                } else {
                    if self.state == State::Path {
                        sink.closepath(op);
                    }
                    Ok(())
                };
                self.done = true;
                self.stack.clear();
                result?;
                return Ok(Flow::Stop);
            }
            Opcode::RETURN => return Ok(Flow::Stop),
            Opcode::CALLSUBR => return self.callsubr_command(sink),
            Opcode::CALLGSUBR => return self.callgsubr_command(sink),
            Opcode::PUT | Opcode::GET | Opcode::STORE | Opcode::LOAD => {
                self.vector_command(op)?;
                return Ok(Flow::Continue);
            }
            Opcode::BLEND
            | Opcode::ABS
            | Opcode::ADD
            | Opcode::SUB
            | Opcode::DIV
            | Opcode::NEG
            | Opcode::RANDOM
            | Opcode::MUL
            | Opcode::SQRT
            | Opcode::DROP
            | Opcode::EXCH
            | Opcode::INDEX
            | Opcode::ROLL
            | Opcode::DUP
            | Opcode::AND
            | Opcode::OR
            | Opcode::NOT
            | Opcode::EQ
            | Opcode::IFELSE
            | Opcode::POP
            | Opcode::RESERVED_15 => {
                self.arith_command(op)?;
                return Ok(Flow::Continue);
            }
            Opcode::DOTSECTION => {}
            _ => return Err(Error::Unimplemented(op)),
        }
        self.stack.clear();
        Ok(Flow::Continue)
    }
}
