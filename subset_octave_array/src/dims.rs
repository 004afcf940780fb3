//! Dimension vectors
//!
//! Octave arrays always carry at least two dimensions. A single extent is a
//! column vector and trailing singleton dimensions past the second are
//! dropped, so `[2, 3, 1, 1]` and `[2, 3]` describe the same shape.

use std::fmt;

use crate::error::{ArrayError, ArrayResult};

/// Column-major shape of an array
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dims(Vec<usize>);

impl Dims {
    /// Normalize an extent list into a shape
    pub fn new(extents: Vec<usize>) -> Self {
        let mut extents = extents;
        match extents.len() {
            0 => return Dims::empty(),
            1 => extents.push(1),
            _ => {}
        }
        while extents.len() > 2 && extents.last() == Some(&1) {
            extents.pop();
        }
        Dims(extents)
    }

    /// Shape from a slice of extents
    pub fn from_slice(extents: &[usize]) -> Self {
        Self::new(extents.to_vec())
    }

    /// Validate signed extents, as received from user code
    pub fn from_signed(extents: &[i64]) -> ArrayResult<Self> {
        let mut out = Vec::with_capacity(extents.len());
        for &e in extents {
            let e = usize::try_from(e).map_err(|_| {
                ArrayError::invalid_dimension(format!(
                    "invalid dimension {}: dimensions must be non-negative",
                    e
                ))
            })?;
            out.push(e);
        }
        let total = out
            .iter()
            .try_fold(1usize, |acc, &e| acc.checked_mul(e))
            .filter(|&n| n <= isize::MAX as usize);
        if total.is_none() {
            return Err(ArrayError::invalid_dimension(
                "out of memory or dimension too large for Octave's index type",
            ));
        }
        Ok(Self::new(out))
    }

    /// `rows x cols` shape
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Dims(vec![rows, cols])
    }

    /// The 1x1 shape
    pub fn scalar() -> Self {
        Self::matrix(1, 1)
    }

    /// The 0x0 shape
    pub fn empty() -> Self {
        Self::matrix(0, 0)
    }

    pub fn ndims(&self) -> usize {
        self.0.len()
    }

    /// Extent of dimension `i`; dimensions past the end are 1
    pub fn get(&self, i: usize) -> usize {
        self.0.get(i).copied().unwrap_or(1)
    }

    pub fn rows(&self) -> usize {
        self.0[0]
    }

    pub fn cols(&self) -> usize {
        self.0[1]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of elements
    pub fn numel(&self) -> usize {
        // saturates; `from_signed` rejects shapes this large
        self.0.iter().fold(1usize, |acc, &e| acc.saturating_mul(e))
    }

    /// True when any extent is zero
    pub fn any_zero(&self) -> bool {
        self.0.iter().any(|&d| d == 0)
    }

    /// True for the 0x0 shape that concatenation skips
    pub fn is_zero_by_zero(&self) -> bool {
        self.0.len() == 2 && self.0[0] == 0 && self.0[1] == 0
    }

    pub fn is_scalar(&self) -> bool {
        self.0.len() == 2 && self.0[0] == 1 && self.0[1] == 1
    }

    /// Row or column vector (including 1x1)
    pub fn is_vector(&self) -> bool {
        self.0.len() == 2 && (self.0[0] == 1 || self.0[1] == 1)
    }

    pub fn is_two_dimensional(&self) -> bool {
        self.0.len() == 2
    }

    /// Column-major strides
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = Vec::with_capacity(self.0.len());
        let mut stride = 1;
        for &dim in &self.0 {
            strides.push(stride);
            stride *= dim;
        }
        strides
    }

    /// Decompose a linear index into 0-based subscripts
    pub fn subscripts(&self, linear: usize) -> Vec<usize> {
        let mut rest = linear;
        self.0
            .iter()
            .map(|&d| {
                if d == 0 {
                    return 0;
                }
                let s = rest % d;
                rest /= d;
                s
            })
            .collect()
    }

    /// Swap the first two extents
    pub fn transposed(&self) -> Self {
        let mut out = self.0.clone();
        out.swap(0, 1);
        Dims(out)
    }

    /// Replace the extent of dimension `dim`, growing the rank if needed
    pub fn with_extent(&self, dim: usize, extent: usize) -> Self {
        let mut out = self.0.clone();
        if out.len() <= dim {
            out.resize(dim + 1, 1);
        }
        out[dim] = extent;
        Self::new(out)
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", parts.join("x"))
    }
}

impl From<(usize, usize)> for Dims {
    fn from((rows, cols): (usize, usize)) -> Self {
        Dims::matrix(rows, cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(Dims::new(vec![3]), Dims::matrix(3, 1));
        assert_eq!(Dims::new(vec![2, 3, 1, 1]), Dims::matrix(2, 3));
        assert_eq!(Dims::new(vec![2, 3, 4]).ndims(), 3);
        assert_eq!(Dims::new(vec![]), Dims::empty());
    }

    #[test]
    fn test_negative_extent_rejected() {
        let err = Dims::from_signed(&[2, -1]).unwrap_err();
        assert!(matches!(err, ArrayError::InvalidDimension(_)));
    }

    #[test]
    fn test_oversized_extents_rejected() {
        let err = Dims::from_signed(&[1 << 40, 1 << 40]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "out of memory or dimension too large for Octave's index type"
        );
        assert_eq!(Dims::new(vec![1 << 40, 1 << 40]).numel(), usize::MAX);
        assert!(Dims::from_signed(&[0, 1 << 40, 1 << 40]).is_ok());
    }

    #[test]
    fn test_subscripts_column_major() {
        let d = Dims::new(vec![2, 3, 4]);
        assert_eq!(d.subscripts(0), vec![0, 0, 0]);
        assert_eq!(d.subscripts(1), vec![1, 0, 0]);
        assert_eq!(d.subscripts(2), vec![0, 1, 0]);
        assert_eq!(d.subscripts(7), vec![1, 0, 1]);
        assert_eq!(d.strides(), vec![1, 2, 6]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Dims::new(vec![2, 3, 4]).to_string(), "2x3x4");
    }
}
