//! Storage error types
//!
//! Errors raised by the typed array containers. The interpreter core maps
//! these onto its own error type; messages follow Octave's wording.

use thiserror::Error;

use crate::dims::Dims;

/// Storage-level error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArrayError {
    /// A requested dimension was negative or otherwise unusable
    #[error("{0}")]
    InvalidDimension(String),

    /// A subscript exceeded its dimension
    #[error("index ({index}): out of bound; value {value} out of bound {bound} (dimensions are {dims})")]
    IndexOutOfBounds {
        /// 1-based subscripts as a user would write them
        index: String,
        /// Offending 1-based value
        value: usize,
        /// Extent it was checked against
        bound: usize,
        /// Shape of the indexed array
        dims: Dims,
    },

    /// Elementwise or matrix operands with incompatible shapes
    #[error("{op}: nonconformant arguments (op1 is {left}, op2 is {right})")]
    NonconformantArguments {
        /// Operator or function name, e.g. `operator +`
        op: String,
        left: Dims,
        right: Dims,
    },

    /// Concatenation operands disagree outside the concatenation dimension
    #[error("{kind} concatenation operator not implemented for '{left}' by '{right}' dimensions")]
    ConcatDimensionMismatch {
        /// `vertical` or `horizontal` (or `dimension N`)
        kind: String,
        left: Dims,
        right: Dims,
    },

    /// Operation restricted to 2-D arrays
    #[error("{0}: not defined for N-D objects")]
    NotTwoDimensional(String),

    /// Data length does not match the requested shape
    #[error("reshape: can't reshape {actual} elements into {dims} array")]
    ElementCountMismatch { actual: usize, dims: Dims },
}

impl ArrayError {
    /// Create an invalid dimension error
    pub fn invalid_dimension<S: Into<String>>(msg: S) -> Self {
        ArrayError::InvalidDimension(msg.into())
    }

    /// Create an out of bound error from 0-based subscripts
    pub fn out_of_bounds(subscripts: &[usize], position: usize, bound: usize, dims: &Dims) -> Self {
        let index = subscripts
            .iter()
            .map(|i| (i + 1).to_string())
            .collect::<Vec<_>>()
            .join(",");
        ArrayError::IndexOutOfBounds {
            index,
            value: subscripts.get(position).map_or(0, |i| i + 1),
            bound,
            dims: dims.clone(),
        }
    }

    /// Create a nonconformant arguments error
    pub fn nonconformant<S: Into<String>>(op: S, left: &Dims, right: &Dims) -> Self {
        ArrayError::NonconformantArguments {
            op: op.into(),
            left: left.clone(),
            right: right.clone(),
        }
    }
}

/// Result type alias for storage operations
pub type ArrayResult<T> = Result<T, ArrayError>;
