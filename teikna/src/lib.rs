//! Interpretation of PostScript Type 1 and Type 2 (CFF) charstrings.
//!
//! A charstring is a compact stack-based program that draws one glyph:
//! moves, lines, curves, hinting declarations, and, in the Type 2 and
//! multiple-master dialects, arithmetic, subroutine and blending
//! operators. [`CharstringInterp`] executes such a program and reports
//! everything it draws to a [`Sink`] — the bytecode never leaks past the
//! interpreter.
//!
//! The interpreter borrows its surroundings from a [`Program`]: local and
//! global subroutines, glyphs by name (for seac composition), the
//! multiple-master design vectors, and the font-wide advance widths. Both
//! dialects run on the same machine; [`Charstring`] tags the bytes with
//! their dialect.
//!
//! ```
//! use teikna::{Charstring, CharstringBounds, CharstringInterp, Type2Charstring};
//!
//! // 100 0 rmoveto 30 40 rlineto endchar
//! let glyph = Charstring::Type2(Type2Charstring::new(vec![239, 139, 21, 169, 179, 5, 14]));
//! let mut interp = CharstringInterp::<()>::new(None, None);
//! let mut bounds = CharstringBounds::new();
//! interp.run(&glyph, &mut bounds).unwrap();
//! let rect = bounds.bounds().unwrap();
//! assert_eq!((rect.x1, rect.y1), (130.0, 40.0));
//! ```

#![forbid(unsafe_code)]

mod charstring;
mod encoding;
mod error;
mod interp;
mod metrics;
mod program;
mod sink;
mod stack;
#[cfg(test)]
pub(crate) mod testing;

pub use charstring::{Charstring, Opcode, Type1Charstring, Type2Charstring};
pub use encoding::{standard_encoding, STANDARD_ENCODING};
pub use error::Error;
pub use interp::{CharstringInterp, MAX_SUBR_DEPTH};
pub use kurbo::Point;
pub use metrics::CharstringBounds;
pub use program::Program;
pub use sink::Sink;
pub use stack::{PS_STACK_SIZE, SCRATCH_SIZE, STACK_SIZE};
