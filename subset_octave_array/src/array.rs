//! Copy-on-write N-dimensional array
//!
//! `Array<T>` holds a shared buffer, an offset into it and a shape. Cloning
//! an array is shallow. Every mutating method goes through `make_unique`,
//! which detaches the buffer before the first write, so a mutation is never
//! visible through another handle.

use std::ops::Range;
use std::sync::Arc;

use crate::dims::Dims;
use crate::element::Element;
use crate::error::{ArrayError, ArrayResult};

/// Dense, column-major array of `T`
#[derive(Debug, Clone)]
pub struct Array<T> {
    rep: Arc<Vec<T>>,
    offset: usize,
    dims: Dims,
}

impl<T: Element> Array<T> {
    /// Array of the given shape with every element set to `fill`
    pub fn new(dims: Dims, fill: T) -> Self {
        let n = dims.numel();
        Array {
            rep: Arc::new(vec![fill; n]),
            offset: 0,
            dims,
        }
    }

    /// Construct from user-supplied extents; negative extents are rejected
    pub fn construct(dims: &[i64], fill: T) -> ArrayResult<Self> {
        Ok(Self::new(Dims::from_signed(dims)?, fill))
    }

    /// Array of zeros (the element type's fill value)
    pub fn zeros(dims: Dims) -> Self {
        Self::new(dims, T::zero())
    }

    /// Wrap column-major data
    pub fn from_vec(dims: Dims, data: Vec<T>) -> ArrayResult<Self> {
        if data.len() != dims.numel() {
            return Err(ArrayError::ElementCountMismatch {
                actual: data.len(),
                dims,
            });
        }
        Ok(Array {
            rep: Arc::new(data),
            offset: 0,
            dims,
        })
    }

    /// 1x1 array
    pub fn scalar(value: T) -> Self {
        Array {
            rep: Arc::new(vec![value]),
            offset: 0,
            dims: Dims::scalar(),
        }
    }

    /// 1xN array
    pub fn row_vector(data: Vec<T>) -> Self {
        let dims = Dims::matrix(1, data.len());
        Array {
            rep: Arc::new(data),
            offset: 0,
            dims,
        }
    }

    /// Nx1 array
    pub fn column_vector(data: Vec<T>) -> Self {
        let dims = Dims::matrix(data.len(), 1);
        Array {
            rep: Arc::new(data),
            offset: 0,
            dims,
        }
    }

    /// 0x0 array
    pub fn empty() -> Self {
        Array {
            rep: Arc::new(Vec::new()),
            offset: 0,
            dims: Dims::empty(),
        }
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    pub fn numel(&self) -> usize {
        self.dims.numel()
    }

    pub fn ndims(&self) -> usize {
        self.dims.ndims()
    }

    pub fn rows(&self) -> usize {
        self.dims.rows()
    }

    pub fn cols(&self) -> usize {
        self.dims.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Read-only view of the elements in column-major order
    pub fn as_slice(&self) -> &[T] {
        &self.rep[self.offset..self.offset + self.numel()]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Copy the elements out
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    /// True when another handle references the same buffer
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.rep) > 1
    }

    /// Number of handles referencing the buffer
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.rep)
    }

    /// True when both handles read the same buffer
    pub fn shares_buffer_with(&self, other: &Array<T>) -> bool {
        Arc::ptr_eq(&self.rep, &other.rep)
    }

    /// Detach from any other handle so the buffer can be written
    pub fn make_unique(&mut self) {
        let exact = self.offset == 0 && self.rep.len() == self.numel();
        if !exact {
            self.rep = Arc::new(self.as_slice().to_vec());
            self.offset = 0;
        } else if self.is_shared() {
            self.rep = Arc::new(self.rep.as_ref().clone());
        }
    }

    /// Mutable view of the elements; detaches first
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.make_unique();
        Arc::make_mut(&mut self.rep).as_mut_slice()
    }

    /// Linear offset of a 0-based multi-index
    ///
    /// Fewer subscripts than dimensions fold the trailing dimensions into the
    /// last subscript; extra subscripts must be zero.
    pub fn linear_index(&self, index: &[usize]) -> ArrayResult<usize> {
        let extents = self.dims.as_slice();
        match index.len() {
            0 => Err(ArrayError::invalid_dimension("index: at least one subscript required")),
            1 => {
                let n = self.numel();
                if index[0] >= n {
                    return Err(ArrayError::out_of_bounds(index, 0, n, &self.dims));
                }
                Ok(index[0])
            }
            k => {
                let mut linear = 0;
                let mut stride = 1;
                for (pos, &sub) in index.iter().enumerate() {
                    let extent = if pos + 1 == k && k < extents.len() {
                        extents[pos..].iter().product()
                    } else {
                        self.dims.get(pos)
                    };
                    if sub >= extent {
                        return Err(ArrayError::out_of_bounds(index, pos, extent, &self.dims));
                    }
                    linear += sub * stride;
                    stride *= extent;
                }
                Ok(linear)
            }
        }
    }

    /// Element at a 0-based multi-index
    pub fn element(&self, index: &[usize]) -> ArrayResult<&T> {
        let i = self.linear_index(index)?;
        Ok(&self.as_slice()[i])
    }

    /// Element at a 0-based linear index
    pub fn linear(&self, i: usize) -> ArrayResult<&T> {
        self.element(&[i])
    }

    /// Overwrite one element
    pub fn set_element(&mut self, index: &[usize], value: T) -> ArrayResult<()> {
        let i = self.linear_index(index)?;
        self.as_mut_slice()[i] = value;
        Ok(())
    }

    pub fn set_linear(&mut self, i: usize, value: T) -> ArrayResult<()> {
        self.set_element(&[i], value)
    }

    /// New array of shape `new_dims`; the overlap is copied and the rest is `fill`
    pub fn resize(&self, new_dims: &[usize], fill: T) -> Self {
        let target = Dims::from_slice(new_dims);
        let mut data = vec![fill; target.numel()];
        let strides = target.strides();
        for (i, value) in self.iter().enumerate() {
            let subs = self.dims.subscripts(i);
            let mut dest = 0;
            let mut inside = true;
            for (pos, &s) in subs.iter().enumerate() {
                if s >= target.get(pos) {
                    inside = false;
                    break;
                }
                dest += s * strides.get(pos).copied().unwrap_or(0);
            }
            if inside {
                data[dest] = value.clone();
            }
        }
        Array {
            rep: Arc::new(data),
            offset: 0,
            dims: target,
        }
    }

    /// Same elements, different shape; shares the buffer
    pub fn reshape(&self, dims: Dims) -> ArrayResult<Self> {
        if dims.numel() != self.numel() {
            return Err(ArrayError::ElementCountMismatch {
                actual: self.numel(),
                dims,
            });
        }
        Ok(Array {
            rep: Arc::clone(&self.rep),
            offset: self.offset,
            dims,
        })
    }

    /// Swap rows and columns of a 2-D array
    pub fn transpose(&self) -> ArrayResult<Self> {
        if !self.dims.is_two_dimensional() {
            return Err(ArrayError::NotTwoDimensional("transpose".to_string()));
        }
        let (rows, cols) = (self.rows(), self.cols());
        let src = self.as_slice();
        let mut data = Vec::with_capacity(src.len());
        for i in 0..rows {
            for j in 0..cols {
                data.push(src[i + j * rows].clone());
            }
        }
        Ok(Array {
            rep: Arc::new(data),
            offset: 0,
            dims: Dims::matrix(cols, rows),
        })
    }

    /// Contiguous column range of a 2-D array, without copying
    pub fn slice_columns(&self, cols: Range<usize>) -> ArrayResult<Self> {
        if !self.dims.is_two_dimensional() {
            return Err(ArrayError::NotTwoDimensional("slice".to_string()));
        }
        if cols.start > cols.end || cols.end > self.cols() {
            return Err(ArrayError::out_of_bounds(
                &[0, cols.end.saturating_sub(1)],
                1,
                self.cols(),
                &self.dims,
            ));
        }
        let rows = self.rows();
        Ok(Array {
            rep: Arc::clone(&self.rep),
            offset: self.offset + cols.start * rows,
            dims: Dims::matrix(rows, cols.end - cols.start),
        })
    }

    /// Gather elements by 0-based linear index
    ///
    /// A row vector source yields a row vector, anything else a column.
    pub fn index_linear(&self, indices: &[usize]) -> ArrayResult<Self> {
        let n = self.numel();
        let src = self.as_slice();
        let mut data = Vec::with_capacity(indices.len());
        for &i in indices {
            if i >= n {
                return Err(ArrayError::out_of_bounds(&[i], 0, n, &self.dims));
            }
            data.push(src[i].clone());
        }
        Ok(if self.ndims() == 2 && self.rows() == 1 {
            Self::row_vector(data)
        } else {
            Self::column_vector(data)
        })
    }

    /// Concatenate along 0-based dimension `dim`; 0x0 operands are skipped
    pub fn concat(&self, other: &Array<T>, dim: usize) -> ArrayResult<Self> {
        if other.dims.is_zero_by_zero() {
            return Ok(self.clone());
        }
        if self.dims.is_zero_by_zero() {
            return Ok(other.clone());
        }
        let rank = self.ndims().max(other.ndims()).max(dim + 1);
        for d in 0..rank {
            if d != dim && self.dims.get(d) != other.dims.get(d) {
                let kind = match dim {
                    0 => "vertical".to_string(),
                    1 => "horizontal".to_string(),
                    n => format!("dimension {}", n + 1),
                };
                return Err(ArrayError::ConcatDimensionMismatch {
                    kind,
                    left: self.dims.clone(),
                    right: other.dims.clone(),
                });
            }
        }
        let chunk = |a: &Array<T>| -> usize { (0..=dim).map(|d| a.dims.get(d)).product() };
        let (chunk_a, chunk_b) = (chunk(self), chunk(other));
        let outer: usize = (dim + 1..rank).map(|d| self.dims.get(d)).product();
        let (a, b) = (self.as_slice(), other.as_slice());
        let mut data = Vec::with_capacity(a.len() + b.len());
        for k in 0..outer {
            data.extend_from_slice(&a[k * chunk_a..(k + 1) * chunk_a]);
            data.extend_from_slice(&b[k * chunk_b..(k + 1) * chunk_b]);
        }
        let dims = self
            .dims
            .with_extent(dim, self.dims.get(dim) + other.dims.get(dim));
        Self::from_vec(dims, data)
    }

    /// Elementwise map into a new array of the same shape
    pub fn map<U: Element, F: FnMut(&T) -> U>(&self, f: F) -> Array<U> {
        Array {
            rep: Arc::new(self.iter().map(f).collect()),
            offset: 0,
            dims: self.dims.clone(),
        }
    }

    /// Elementwise fallible map
    pub fn try_map<U: Element, E, F: FnMut(&T) -> Result<U, E>>(&self, f: F) -> Result<Array<U>, E> {
        let data = self.iter().map(f).collect::<Result<Vec<U>, E>>()?;
        Ok(Array {
            rep: Arc::new(data),
            offset: 0,
            dims: self.dims.clone(),
        })
    }
}

impl<T: Element + PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && self.as_slice() == other.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Array<f64> {
        // [1 3; 2 4]
        Array::from_vec(Dims::matrix(2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap()
    }

    #[test]
    fn test_construct_and_fill() {
        let a = Array::construct(&[2, 3], 7i32).unwrap();
        assert_eq!(a.dims(), &Dims::matrix(2, 3));
        assert!(a.iter().all(|&x| x == 7));
    }

    #[test]
    fn test_construct_negative_dimension() {
        let err = Array::construct(&[2, -3], 0.0f64).unwrap_err();
        assert!(matches!(err, ArrayError::InvalidDimension(_)));
    }

    #[test]
    fn test_element_access() {
        let a = sample();
        assert_eq!(*a.element(&[1, 0]).unwrap(), 2.0);
        assert_eq!(*a.element(&[0, 1]).unwrap(), 3.0);
        assert_eq!(*a.linear(3).unwrap(), 4.0);
        assert!(matches!(
            a.element(&[2, 0]),
            Err(ArrayError::IndexOutOfBounds { .. })
        ));
        assert!(a.element(&[0, 1, 1]).is_err());
        assert_eq!(*a.element(&[1, 1, 0]).unwrap(), 4.0);
    }

    #[test]
    fn test_folded_trailing_subscript() {
        let a = Array::from_vec(Dims::new(vec![2, 2, 2]), (0..8).collect::<Vec<i32>>()).unwrap();
        // a(2, 3) with a 2x2x2 array addresses column 3 of the folded 2x4 view
        assert_eq!(*a.element(&[1, 2]).unwrap(), 5);
        assert_eq!(*a.element(&[1, 1, 1]).unwrap(), 7);
    }

    #[test]
    fn test_copy_on_write() {
        let a = sample();
        let mut b = a.clone();
        assert!(a.is_shared());
        assert_eq!(a.ref_count(), 2);
        b.set_element(&[0, 0], 100.0).unwrap();
        assert_eq!(*a.element(&[0, 0]).unwrap(), 1.0);
        assert_eq!(*b.element(&[0, 0]).unwrap(), 100.0);
        assert!(!a.is_shared());
    }

    #[test]
    fn test_resize_preserves_top_left() {
        let a = sample();
        let r = a.resize(&[3, 3], 0.0);
        assert_eq!(r.dims(), &Dims::matrix(3, 3));
        assert_eq!(
            r.to_vec(),
            vec![1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);

        let shrunk = a.resize(&[1, 2], 0.0);
        assert_eq!(shrunk.to_vec(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_slice_columns_shares_buffer() {
        let a = Array::from_vec(Dims::matrix(2, 3), vec![1, 2, 3, 4, 5, 6]).unwrap();
        let mut s = a.slice_columns(1..3).unwrap();
        assert!(s.shares_buffer_with(&a));
        assert_eq!(s.to_vec(), vec![3, 4, 5, 6]);
        s.set_element(&[0, 0], 30).unwrap();
        assert_eq!(a.to_vec(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(s.to_vec(), vec![30, 4, 5, 6]);
    }

    #[test]
    fn test_transpose_and_reshape() {
        let a = Array::from_vec(Dims::matrix(2, 3), vec![1, 2, 3, 4, 5, 6]).unwrap();
        let t = a.transpose().unwrap();
        assert_eq!(t.dims(), &Dims::matrix(3, 2));
        assert_eq!(t.to_vec(), vec![1, 3, 5, 2, 4, 6]);
        let r = a.reshape(Dims::matrix(3, 2)).unwrap();
        assert!(r.shares_buffer_with(&a));
        assert!(a.reshape(Dims::matrix(4, 2)).is_err());
    }

    #[test]
    fn test_concat() {
        let a = Array::row_vector(vec![1, 2]);
        let b = Array::row_vector(vec![3]);
        let h = a.concat(&b, 1).unwrap();
        assert_eq!(h.dims(), &Dims::matrix(1, 3));
        assert_eq!(h.to_vec(), vec![1, 2, 3]);

        let top = Array::from_vec(Dims::matrix(1, 2), vec![1, 3]).unwrap();
        let bottom = Array::from_vec(Dims::matrix(1, 2), vec![2, 4]).unwrap();
        let v = top.concat(&bottom, 0).unwrap();
        assert_eq!(v.dims(), &Dims::matrix(2, 2));
        assert_eq!(v.to_vec(), vec![1, 2, 3, 4]);

        assert!(matches!(
            a.concat(&v, 1),
            Err(ArrayError::ConcatDimensionMismatch { .. })
        ));
        assert_eq!(a.concat(&Array::empty(), 0).unwrap(), a);
    }

    #[test]
    fn test_index_linear_shape() {
        let row = Array::row_vector(vec![10, 20, 30]);
        assert_eq!(row.index_linear(&[2, 0]).unwrap().dims(), &Dims::matrix(1, 2));
        let col = Array::column_vector(vec![10, 20, 30]);
        assert_eq!(col.index_linear(&[1]).unwrap().to_vec(), vec![20]);
        assert!(col.index_linear(&[3]).is_err());
    }
}
