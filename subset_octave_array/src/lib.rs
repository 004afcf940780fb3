//! SubsetOctaveVM typed array storage
//!
//! Reference-counted, copy-on-write containers generic over the element
//! type:
//!
//! - `Array` for dense N-dimensional data
//! - `DiagArray2` for diagonal matrices
//! - `SparseArray` for compressed sparse column matrices
//!
//! plus the Octave arithmetic rules for each element type (`Arith`).

pub mod array;
pub mod broadcast;
pub mod diag;
pub mod dims;
pub mod element;
pub mod error;
pub mod marray;
pub mod sparse;

pub use nalgebra::Complex;

/// Double precision complex
pub type Complex64 = Complex<f64>;
/// Single precision complex
pub type Complex32 = Complex<f32>;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use subset_octave_array::prelude::*;
///
/// let a = Array::construct(&[2, 2], 1.0f64).unwrap();
/// assert_eq!(a.numel(), 4);
/// ```
pub mod prelude {
    pub use super::array::Array;
    pub use super::diag::{DiagArray2, DiagonalView};
    pub use super::dims::Dims;
    pub use super::element::{Arith, Element, IntegerElement, RealElement};
    pub use super::error::{ArrayError, ArrayResult};
    pub use super::sparse::SparseArray;
    pub use super::{Complex32, Complex64};
}

pub use prelude::*;
