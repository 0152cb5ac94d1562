//! Read-only view of the font a charstring runs inside.

use crate::charstring::Charstring;

/// The font-level context consulted during interpretation.
///
/// Every method is defaulted so a trivial environment (a standalone
/// charstring, a test) needs no boilerplate; a full font implements the
/// lot. Interpretation borrows the environment immutably. The single
/// mutation path, [`write_norm_design_vector`], is reached only when
/// [`writable_vectors`] answers `true`; implementors that support it use
/// interior mutability and serialize access themselves.
///
/// [`write_norm_design_vector`]: Program::write_norm_design_vector
/// [`writable_vectors`]: Program::writable_vectors
pub trait Program {
    /// Local subroutine `n`, as referenced by `callsubr`.
    fn subr(&self, n: i32) -> Option<&Charstring> {
        let _ = n;
        None
    }

    /// Global subroutine `n`, as referenced by the Type 2 `callgsubr`.
    fn gsubr(&self, n: i32) -> Option<&Charstring> {
        let _ = n;
        None
    }

    /// Glyph lookup by name, used to resolve seac components through the
    /// Adobe Standard Encoding.
    fn glyph_by_name(&self, name: &str) -> Option<&Charstring> {
        let _ = name;
        None
    }

    /// The normalized design vector of a multiple-master font.
    fn norm_design_vector(&self) -> Option<Vec<f64>> {
        None
    }

    /// The user-space design vector of a multiple-master font.
    fn design_vector(&self) -> Option<Vec<f64>> {
        None
    }

    /// Whether `store` may write into the weight and normalized design
    /// vectors.
    fn writable_vectors(&self) -> bool {
        false
    }

    /// Overwrites `cells.len()` entries of the normalized design vector
    /// starting at `offset`, growing it as needed.
    fn write_norm_design_vector(&self, offset: usize, cells: &[f64]) {
        let _ = (offset, cells);
    }

    /// The font-wide default (`nominal == false`) or nominal
    /// (`nominal == true`) horizontal advance consulted by Type 2 width
    /// handling. `None` means the font does not state one.
    fn global_width_x(&self, nominal: bool) -> Option<f64> {
        let _ = nominal;
        None
    }
}

/// The empty environment: no subroutines, no glyphs, no vectors.
impl Program for () {}
