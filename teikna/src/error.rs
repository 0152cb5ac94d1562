//! Charstring interpretation errors.

use std::fmt;

use crate::charstring::Opcode;

/// An error raised while interpreting a charstring.
///
/// The interpreter latches the first error it encounters, stops executing
/// commands, and surfaces it as the `Err` arm of
/// [`CharstringInterp::run`](crate::CharstringInterp::run). Variants carry
/// the opcode or integer needed to render the historical diagnostic
/// messages; `Display` performs that substitution.
///
/// `CurrentPoint`, `OpenStroke` and `LateSidebearing` complete the
/// vocabulary for checker-style consumers; the core dispatcher raises the
/// rest.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// The interpreter reached a state that a well-formed dispatch table
    /// cannot reach.
    Internal(Opcode),
    /// The byte stream ended in the middle of an operand, operator, or
    /// hintmask bitmap.
    Runoff,
    /// The operator is not part of the dialect being interpreted.
    Unimplemented(Opcode),
    /// A push exceeded the operand stack capacity.
    Overflow,
    /// An operator required more operands than the stack holds.
    Underflow(Opcode),
    /// A vector operation addressed a vector that is absent or not writable.
    Vector(Opcode),
    /// An operand was out of the operator's domain.
    Value(Opcode),
    /// No subroutine exists with this number.
    Subr(i32),
    /// Seac referenced a character code with no resolvable glyph.
    Glyph(i32),
    /// A drawing operator ran with no current point established.
    CurrentPoint(Opcode),
    /// The flex protocol was violated.
    Flex,
    /// A multiple-master operation did not match the weight vector.
    MultipleMaster(Opcode),
    /// A stroke was left open at the end of the glyph.
    OpenStroke,
    /// A sidebearing command appeared after drawing began.
    LateSidebearing(Opcode),
    /// An othersubr number is unknown or was called with the wrong arity.
    Othersubr(i32),
    /// A command appeared out of the legal glyph-program order.
    Ordering(Opcode),
    /// A hintmask appeared before any stem hints were declared.
    Hintmask(Opcode),
    /// Subroutine calls nested deeper than
    /// [`MAX_SUBR_DEPTH`](crate::MAX_SUBR_DEPTH).
    SubrDepth(i32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(op) => write!(f, "charstring internal error in '{op}'"),
            Self::Runoff => write!(f, "charstring commands past end"),
            Self::Unimplemented(op) => write!(f, "charstring command '{op}' unimplemented"),
            Self::Overflow => write!(f, "charstring stack overflow"),
            Self::Underflow(op) => write!(f, "charstring stack underflow in '{op}'"),
            Self::Vector(op) => write!(f, "charstring bad vector operation in '{op}'"),
            Self::Value(op) => write!(f, "charstring bad value in '{op}'"),
            Self::Subr(n) => write!(f, "charstring bad subroutine number {n}"),
            Self::Glyph(n) => write!(f, "charstring bad glyph number '{n}'"),
            Self::CurrentPoint(op) => write!(f, "charstring no current point in '{op}'"),
            Self::Flex => write!(f, "charstring flex error"),
            Self::MultipleMaster(op) => write!(f, "charstring multiple master error in '{op}'"),
            Self::OpenStroke => write!(f, "charstring open stroke"),
            Self::LateSidebearing(op) => write!(f, "charstring late sidebearing command '{op}'"),
            Self::Othersubr(n) => write!(f, "charstring bad othersubr number {n}"),
            Self::Ordering(op) => write!(f, "charstring ordering constraints violated at '{op}'"),
            Self::Hintmask(_) => write!(f, "charstring inappropriate hintmask"),
            Self::SubrDepth(n) => write!(f, "charstring subrs nested too deep at '{n}'"),
        }
    }
}

impl std::error::Error for Error {}
