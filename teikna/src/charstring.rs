//! Charstring containers, the operator space, and byte decoding.

use std::fmt;

use font_types::Fixed;

use crate::{
    error::Error,
    interp::{CharstringInterp, Flow},
    program::Program,
    sink::Sink,
};

/// Escape byte introducing a two-byte operator.
const ESCAPE: u8 = 12;

/// A charstring operator in the shared Type 1 / Type 2 numeric space.
///
/// Single-byte operators keep their byte value; two-byte operators (escape
/// byte 12) are stored offset by 32, following the historical convention,
/// so the whole space fits one integer and one name table. The same number
/// can mean different things per dialect (escaped 16 is `callothersubr` in
/// Type 1 while plain 16 is `blend`); the dispatcher, not this type,
/// decides what a number does.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opcode(u16);

impl Opcode {
    pub const HSTEM: Opcode = Opcode(1);
    pub const VSTEM: Opcode = Opcode(3);
    pub const VMOVETO: Opcode = Opcode(4);
    pub const RLINETO: Opcode = Opcode(5);
    pub const HLINETO: Opcode = Opcode(6);
    pub const VLINETO: Opcode = Opcode(7);
    pub const RRCURVETO: Opcode = Opcode(8);
    pub const CLOSEPATH: Opcode = Opcode(9);
    pub const CALLSUBR: Opcode = Opcode(10);
    pub const RETURN: Opcode = Opcode(11);
    pub const HSBW: Opcode = Opcode(13);
    pub const ENDCHAR: Opcode = Opcode(14);
    /// Undocumented operator observed in shipped fonts; drops two operands.
    pub const RESERVED_15: Opcode = Opcode(15);
    pub const BLEND: Opcode = Opcode(16);
    pub const HSTEMHM: Opcode = Opcode(18);
    pub const HINTMASK: Opcode = Opcode(19);
    pub const CNTRMASK: Opcode = Opcode(20);
    pub const RMOVETO: Opcode = Opcode(21);
    pub const HMOVETO: Opcode = Opcode(22);
    pub const VSTEMHM: Opcode = Opcode(23);
    pub const RCURVELINE: Opcode = Opcode(24);
    pub const RLINECURVE: Opcode = Opcode(25);
    pub const VVCURVETO: Opcode = Opcode(26);
    pub const HHCURVETO: Opcode = Opcode(27);
    pub const CALLGSUBR: Opcode = Opcode(29);
    pub const VHCURVETO: Opcode = Opcode(30);
    pub const HVCURVETO: Opcode = Opcode(31);

    pub const DOTSECTION: Opcode = Opcode::escaped(0);
    pub const VSTEM3: Opcode = Opcode::escaped(1);
    pub const HSTEM3: Opcode = Opcode::escaped(2);
    pub const AND: Opcode = Opcode::escaped(3);
    pub const OR: Opcode = Opcode::escaped(4);
    pub const NOT: Opcode = Opcode::escaped(5);
    pub const SEAC: Opcode = Opcode::escaped(6);
    pub const SBW: Opcode = Opcode::escaped(7);
    pub const STORE: Opcode = Opcode::escaped(8);
    pub const ABS: Opcode = Opcode::escaped(9);
    pub const ADD: Opcode = Opcode::escaped(10);
    pub const SUB: Opcode = Opcode::escaped(11);
    pub const DIV: Opcode = Opcode::escaped(12);
    pub const LOAD: Opcode = Opcode::escaped(13);
    pub const NEG: Opcode = Opcode::escaped(14);
    pub const EQ: Opcode = Opcode::escaped(15);
    pub const CALLOTHERSUBR: Opcode = Opcode::escaped(16);
    pub const POP: Opcode = Opcode::escaped(17);
    pub const DROP: Opcode = Opcode::escaped(18);
    pub const PUT: Opcode = Opcode::escaped(20);
    pub const GET: Opcode = Opcode::escaped(21);
    pub const IFELSE: Opcode = Opcode::escaped(22);
    pub const RANDOM: Opcode = Opcode::escaped(23);
    pub const MUL: Opcode = Opcode::escaped(24);
    pub const SQRT: Opcode = Opcode::escaped(26);
    pub const DUP: Opcode = Opcode::escaped(27);
    pub const EXCH: Opcode = Opcode::escaped(28);
    pub const INDEX: Opcode = Opcode::escaped(29);
    pub const ROLL: Opcode = Opcode::escaped(30);
    pub const SETCURRENTPOINT: Opcode = Opcode::escaped(33);
    pub const HFLEX: Opcode = Opcode::escaped(34);
    pub const FLEX: Opcode = Opcode::escaped(35);
    pub const HFLEX1: Opcode = Opcode::escaped(36);
    pub const FLEX1: Opcode = Opcode::escaped(37);

    /// Creates an operator from a single-byte opcode.
    pub(crate) const fn plain(byte: u8) -> Self {
        Self(byte as u16)
    }

    /// Creates an operator from the second byte of an escaped opcode.
    pub(crate) const fn escaped(byte: u8) -> Self {
        Self(byte as u16 + 32)
    }

    pub(crate) const fn raw(self) -> u16 {
        self.0
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::HSTEM => "hstem",
            Self::VSTEM => "vstem",
            Self::VMOVETO => "vmoveto",
            Self::RLINETO => "rlineto",
            Self::HLINETO => "hlineto",
            Self::VLINETO => "vlineto",
            Self::RRCURVETO => "rrcurveto",
            Self::CLOSEPATH => "closepath",
            Self::CALLSUBR => "callsubr",
            Self::RETURN => "return",
            Self::HSBW => "hsbw",
            Self::ENDCHAR => "endchar",
            Self::BLEND => "blend",
            Self::HSTEMHM => "hstemhm",
            Self::HINTMASK => "hintmask",
            Self::CNTRMASK => "cntrmask",
            Self::RMOVETO => "rmoveto",
            Self::HMOVETO => "hmoveto",
            Self::VSTEMHM => "vstemhm",
            Self::RCURVELINE => "rcurveline",
            Self::RLINECURVE => "rlinecurve",
            Self::VVCURVETO => "vvcurveto",
            Self::HHCURVETO => "hhcurveto",
            Self::CALLGSUBR => "callgsubr",
            Self::VHCURVETO => "vhcurveto",
            Self::HVCURVETO => "hvcurveto",
            Self::DOTSECTION => "dotsection",
            Self::VSTEM3 => "vstem3",
            Self::HSTEM3 => "hstem3",
            Self::AND => "and",
            Self::OR => "or",
            Self::NOT => "not",
            Self::SEAC => "seac",
            Self::SBW => "sbw",
            Self::STORE => "store",
            Self::ABS => "abs",
            Self::ADD => "add",
            Self::SUB => "sub",
            Self::DIV => "div",
            Self::LOAD => "load",
            Self::NEG => "neg",
            Self::EQ => "eq",
            Self::CALLOTHERSUBR => "callothersubr",
            Self::POP => "pop",
            Self::DROP => "drop",
            Self::PUT => "put",
            Self::GET => "get",
            Self::IFELSE => "ifelse",
            Self::RANDOM => "random",
            Self::MUL => "mul",
            Self::SQRT => "sqrt",
            Self::DUP => "dup",
            Self::EXCH => "exch",
            Self::INDEX => "index",
            Self::ROLL => "roll",
            Self::SETCURRENTPOINT => "setcurrentpoint",
            Self::HFLEX => "hflex",
            Self::FLEX => "flex",
            Self::HFLEX1 => "hflex1",
            Self::FLEX1 => "flex1",
            _ => return None,
        })
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.0 < 32 => write!(f, "COMMAND<{}>", self.0),
            None => write!(f, "COMMAND<12 {}>", self.0 - 32),
        }
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Forward-only reader over charstring bytes.
///
/// The interpreter receives the cursor alongside Type 2 commands so that
/// `hintmask`/`cntrmask` can consume their trailing bitmap directly from
/// the instruction stream.
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        let byte = *self.data.get(self.pos).ok_or(Error::Runoff)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_i16(&mut self) -> Result<i16, Error> {
        let bytes = self.take(2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_i32(&mut self) -> Result<i32, Error> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let end = self.pos.checked_add(n).ok_or(Error::Runoff)?;
        let bytes = self.data.get(self.pos..end).ok_or(Error::Runoff)?;
        self.pos = end;
        Ok(bytes)
    }
}

/// A byte-coded program describing one glyph outline.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Charstring {
    Type1(Type1Charstring),
    Type2(Type2Charstring),
}

impl Charstring {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Type1(cs) => cs.bytes(),
            Self::Type2(cs) => cs.bytes(),
        }
    }

    pub(crate) fn execute<P: Program, S: Sink>(
        &self,
        interp: &mut CharstringInterp<'_, P>,
        sink: &mut S,
    ) -> Result<(), Error> {
        match self {
            Self::Type1(cs) => cs.execute(interp, sink),
            Self::Type2(cs) => cs.execute(interp, sink),
        }
    }
}

impl From<Type1Charstring> for Charstring {
    fn from(cs: Type1Charstring) -> Self {
        Self::Type1(cs)
    }
}

impl From<Type2Charstring> for Charstring {
    fn from(cs: Type2Charstring) -> Self {
        Self::Type2(cs)
    }
}

/// A Type 1 glyph program.
///
/// Numeric literals are the Type 1 encoding: bytes 32..=246 map to
/// `v - 139`, 247..=254 introduce the two-byte forms, and 255 introduces a
/// 32-bit big-endian integer. Fractional values are produced in-program via
/// `div`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Type1Charstring {
    data: Vec<u8>,
}

impl Type1Charstring {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decodes the program, feeding operands and operators to `interp`.
    fn execute<P: Program, S: Sink>(
        &self,
        interp: &mut CharstringInterp<'_, P>,
        sink: &mut S,
    ) -> Result<(), Error> {
        let mut cursor = Cursor::new(&self.data);
        while !cursor.is_empty() {
            let b0 = cursor.read_u8()?;
            let flow = match b0 {
                32..=246 => {
                    interp.number(f64::from(i32::from(b0) - 139))?;
                    Flow::Continue
                }
                247..=250 => {
                    let b1 = i32::from(cursor.read_u8()?);
                    interp.number(f64::from((i32::from(b0) - 247) * 256 + b1 + 108))?;
                    Flow::Continue
                }
                251..=254 => {
                    let b1 = i32::from(cursor.read_u8()?);
                    interp.number(f64::from(-(i32::from(b0) - 251) * 256 - b1 - 108))?;
                    Flow::Continue
                }
                255 => {
                    interp.number(f64::from(cursor.read_i32()?))?;
                    Flow::Continue
                }
                ESCAPE => {
                    let b1 = cursor.read_u8()?;
                    interp.type1_command(Opcode::escaped(b1), sink)?
                }
                _ => interp.type1_command(Opcode::plain(b0), sink)?,
            };
            if flow == Flow::Stop {
                break;
            }
        }
        Ok(())
    }
}

/// A Type 2 (CFF) glyph program.
///
/// Relative to Type 1, literals add the 28 (16-bit integer) form and turn
/// 255 into a 16.16 fixed-point value, and `hintmask`/`cntrmask` consume a
/// trailing bitmap straight from the byte stream.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Type2Charstring {
    data: Vec<u8>,
}

impl Type2Charstring {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn execute<P: Program, S: Sink>(
        &self,
        interp: &mut CharstringInterp<'_, P>,
        sink: &mut S,
    ) -> Result<(), Error> {
        let mut cursor = Cursor::new(&self.data);
        while !cursor.is_empty() {
            let b0 = cursor.read_u8()?;
            let flow = match b0 {
                28 => {
                    interp.number(f64::from(cursor.read_i16()?))?;
                    Flow::Continue
                }
                32..=246 => {
                    interp.number(f64::from(i32::from(b0) - 139))?;
                    Flow::Continue
                }
                247..=250 => {
                    let b1 = i32::from(cursor.read_u8()?);
                    interp.number(f64::from((i32::from(b0) - 247) * 256 + b1 + 108))?;
                    Flow::Continue
                }
                251..=254 => {
                    let b1 = i32::from(cursor.read_u8()?);
                    interp.number(f64::from(-(i32::from(b0) - 251) * 256 - b1 - 108))?;
                    Flow::Continue
                }
                255 => {
                    interp.number(Fixed::from_bits(cursor.read_i32()?).to_f64())?;
                    Flow::Continue
                }
                ESCAPE => {
                    let b1 = cursor.read_u8()?;
                    interp.type2_command(Opcode::escaped(b1), &mut cursor, sink)?
                }
                _ => interp.type2_command(Opcode::plain(b0), &mut cursor, sink)?,
            };
            if flow == Flow::Stop {
                break;
            }
        }
        Ok(())
    }
}
