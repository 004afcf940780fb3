//! Diagonal matrices
//!
//! `DiagArray2` stores only the `min(rows, cols)` diagonal. Every
//! off-diagonal read is synthesized as the element type's zero.

use crate::array::Array;
use crate::dims::Dims;
use crate::element::{Arith, Element};
use crate::error::{ArrayError, ArrayResult};

/// Rectangular diagonal matrix
#[derive(Debug, Clone)]
pub struct DiagArray2<T> {
    rows: usize,
    cols: usize,
    diag: Array<T>,
}

impl<T: Element> DiagArray2<T> {
    /// `rows x cols` matrix with the given diagonal
    pub fn new(rows: usize, cols: usize, diag: Vec<T>) -> ArrayResult<Self> {
        let len = rows.min(cols);
        if diag.len() != len {
            return Err(ArrayError::invalid_dimension(format!(
                "diag: expected {} diagonal elements for a {}x{} matrix, got {}",
                len,
                rows,
                cols,
                diag.len()
            )));
        }
        Ok(DiagArray2 {
            rows,
            cols,
            diag: Array::column_vector(diag),
        })
    }

    /// Square matrix with the given diagonal
    pub fn from_diagonal(diag: Vec<T>) -> Self {
        let n = diag.len();
        DiagArray2 {
            rows: n,
            cols: n,
            diag: Array::column_vector(diag),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> Dims {
        Dims::matrix(self.rows, self.cols)
    }

    pub fn numel(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of stored diagonal elements
    pub fn length(&self) -> usize {
        self.rows.min(self.cols)
    }

    pub fn diagonal(&self) -> &[T] {
        self.diag.as_slice()
    }

    /// Element at row `r`, column `c` (0-based)
    pub fn element(&self, r: usize, c: usize) -> ArrayResult<T> {
        if r >= self.rows {
            return Err(ArrayError::out_of_bounds(&[r, c], 0, self.rows, &self.dims()));
        }
        if c >= self.cols {
            return Err(ArrayError::out_of_bounds(&[r, c], 1, self.cols, &self.dims()));
        }
        Ok(if r == c {
            self.diagonal()[r].clone()
        } else {
            T::zero()
        })
    }

    /// Column-major walk over every element, zeros included
    pub fn diagonal_view(&self) -> DiagonalView<'_, T> {
        DiagonalView {
            source: self,
            pos: 0,
        }
    }

    /// Dense copy
    pub fn to_full(&self) -> Array<T> {
        let mut full = Array::zeros(self.dims());
        let data = full.as_mut_slice();
        for (i, v) in self.diagonal().iter().enumerate() {
            data[i + i * self.rows] = v.clone();
        }
        full
    }

    /// Resized copy; the diagonal is truncated or zero-extended
    pub fn resize(&self, rows: usize, cols: usize) -> Self {
        let len = rows.min(cols);
        let diag = (0..len)
            .map(|i| self.diagonal().get(i).cloned().unwrap_or_else(T::zero))
            .collect();
        DiagArray2 {
            rows,
            cols,
            diag: Array::column_vector(diag),
        }
    }

    pub fn transpose(&self) -> Self {
        DiagArray2 {
            rows: self.cols,
            cols: self.rows,
            diag: self.diag.clone(),
        }
    }

    /// Map the stored diagonal; `f` must send zero to zero for the result to
    /// describe the mapped dense matrix
    pub fn map<U: Element, F: FnMut(&T) -> U>(&self, f: F) -> DiagArray2<U> {
        DiagArray2 {
            rows: self.rows,
            cols: self.cols,
            diag: self.diag.map(f),
        }
    }
}

impl<T: Element + PartialEq> DiagArray2<T> {
    /// Diagonal form of a dense 2-D array, if every off-diagonal element is zero
    pub fn from_full(full: &Array<T>) -> Option<Self> {
        if !full.dims().is_two_dimensional() {
            return None;
        }
        let (rows, cols) = (full.rows(), full.cols());
        let zero = T::zero();
        let data = full.as_slice();
        let mut diag = Vec::with_capacity(rows.min(cols));
        for c in 0..cols {
            for r in 0..rows {
                let v = &data[r + c * rows];
                if r == c {
                    diag.push(v.clone());
                } else if *v != zero {
                    return None;
                }
            }
        }
        DiagArray2::new(rows, cols, diag).ok()
    }
}

impl<T: Element + PartialEq> PartialEq for DiagArray2<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.diag == other.diag
    }
}

/// Lazy, restartable view over a diagonal matrix in column-major order
#[derive(Debug, Clone)]
pub struct DiagonalView<'a, T> {
    source: &'a DiagArray2<T>,
    pos: usize,
}

impl<T: Element> DiagonalView<'_, T> {
    /// Rewind to the first element
    pub fn restart(&mut self) {
        self.pos = 0;
    }
}

impl<T: Element> Iterator for DiagonalView<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.pos >= self.source.numel() {
            return None;
        }
        let (r, c) = (self.pos % self.source.rows, self.pos / self.source.rows);
        self.pos += 1;
        Some(if r == c {
            self.source.diagonal()[r].clone()
        } else {
            T::zero()
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.source.numel() - self.pos;
        (left, Some(left))
    }
}

impl<T: Element> ExactSizeIterator for DiagonalView<'_, T> {}

impl<T: Arith> DiagArray2<T> {
    fn check_same_dims(&self, other: &Self, op: &str) -> ArrayResult<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(ArrayError::nonconformant(op, &self.dims(), &other.dims()));
        }
        Ok(())
    }

    fn zip_diag(&self, other: &Self, f: impl Fn(T, T) -> T) -> Self {
        let diag = self
            .diagonal()
            .iter()
            .zip(other.diagonal())
            .map(|(a, b)| f(*a, *b))
            .collect();
        DiagArray2 {
            rows: self.rows,
            cols: self.cols,
            diag: Array::column_vector(diag),
        }
    }

    pub fn add(&self, other: &Self) -> ArrayResult<Self> {
        self.check_same_dims(other, "operator +")?;
        Ok(self.zip_diag(other, T::plus))
    }

    pub fn sub(&self, other: &Self) -> ArrayResult<Self> {
        self.check_same_dims(other, "operator -")?;
        Ok(self.zip_diag(other, T::minus))
    }

    /// Product of two diagonal matrices, itself diagonal
    pub fn mul(&self, other: &Self) -> ArrayResult<Self> {
        if self.cols != other.rows {
            return Err(ArrayError::nonconformant("operator *", &self.dims(), &other.dims()));
        }
        let len = self.rows.min(other.cols);
        let diag = (0..len)
            .map(|i| match (self.diagonal().get(i), other.diagonal().get(i)) {
                (Some(a), Some(b)) => a.times(*b),
                _ => T::zero(),
            })
            .collect();
        Ok(DiagArray2 {
            rows: self.rows,
            cols: other.cols,
            diag: Array::column_vector(diag),
        })
    }

    pub fn scale(&self, s: T) -> Self {
        self.map(|x| x.times(s))
    }

    pub fn negate(&self) -> Self {
        self.map(|x| x.negate())
    }

    pub fn conjugate(&self) -> Self {
        self.map(|x| x.conjugate())
    }

    /// `D + A` with dense `A`
    pub fn add_full(&self, full: &Array<T>) -> ArrayResult<Array<T>> {
        if self.dims() != *full.dims() {
            return Err(ArrayError::nonconformant("operator +", &self.dims(), full.dims()));
        }
        let mut out = full.clone();
        let data = out.as_mut_slice();
        for (i, v) in self.diagonal().iter().enumerate() {
            let k = i + i * self.rows;
            data[k] = v.plus(data[k]);
        }
        Ok(out)
    }

    /// `D * A`: scales the rows of `A`
    pub fn mul_full(&self, full: &Array<T>) -> ArrayResult<Array<T>> {
        if !full.dims().is_two_dimensional() || self.cols != full.rows() {
            return Err(ArrayError::nonconformant("operator *", &self.dims(), full.dims()));
        }
        let n = full.cols();
        let src = full.as_slice();
        let mut data = vec![T::zero(); self.rows * n];
        for j in 0..n {
            for (i, d) in self.diagonal().iter().enumerate() {
                data[i + j * self.rows] = d.times(src[i + j * full.rows()]);
            }
        }
        Array::from_vec(Dims::matrix(self.rows, n), data)
    }

    /// `A * D`: scales the columns of `A`
    pub fn full_mul(full: &Array<T>, diag: &Self) -> ArrayResult<Array<T>> {
        if !full.dims().is_two_dimensional() || full.cols() != diag.rows {
            return Err(ArrayError::nonconformant("operator *", full.dims(), &diag.dims()));
        }
        let m = full.rows();
        let src = full.as_slice();
        let mut data = vec![T::zero(); m * diag.cols];
        for (j, d) in diag.diagonal().iter().enumerate() {
            for i in 0..m {
                data[i + j * m] = src[i + j * m].times(*d);
            }
        }
        Array::from_vec(Dims::matrix(m, diag.cols), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_element_synthesizes_zeros() {
        let d = DiagArray2::new(2, 3, vec![5.0f64, 7.0]).unwrap();
        assert_eq!(d.element(0, 0).unwrap(), 5.0);
        assert_eq!(d.element(1, 1).unwrap(), 7.0);
        assert_eq!(d.element(0, 2).unwrap(), 0.0);
        assert!(d.element(2, 0).is_err());
    }

    #[test]
    fn test_diagonal_view_is_lazy_and_restartable() {
        let d = DiagArray2::from_diagonal(vec![1, 2]);
        let mut view = d.diagonal_view();
        assert_eq!(view.len(), 4);
        assert_eq!(view.next(), Some(1));
        let rest: Vec<i32> = view.clone().collect();
        assert_eq!(rest, vec![0, 0, 2]);
        view.restart();
        assert_eq!(view.collect::<Vec<_>>(), vec![1, 0, 0, 2]);
        assert_eq!(d.diagonal_view().collect::<Vec<_>>(), d.to_full().to_vec());
    }

    #[test]
    fn test_resize_and_transpose() {
        let d = DiagArray2::from_diagonal(vec![1.0f64, 2.0]);
        let r = d.resize(3, 3);
        assert_eq!(r.diagonal(), &[1.0, 2.0, 0.0]);
        let t = DiagArray2::new(2, 3, vec![1.0f64, 2.0]).unwrap().transpose();
        assert_eq!((t.rows(), t.cols()), (3, 2));
    }

    #[test]
    fn test_from_full() {
        let full = DiagArray2::from_diagonal(vec![3, 4]).to_full();
        assert_eq!(DiagArray2::from_full(&full), Some(DiagArray2::from_diagonal(vec![3, 4])));
        let dense = Array::new(Dims::matrix(2, 2), 1);
        assert_eq!(DiagArray2::from_full(&dense), None);
    }

    #[test]
    fn test_arithmetic() {
        let a = DiagArray2::from_diagonal(vec![1.0f64, 2.0]);
        let b = DiagArray2::from_diagonal(vec![3.0f64, 4.0]);
        assert_eq!(a.add(&b).unwrap().diagonal(), &[4.0, 6.0]);
        assert_eq!(a.mul(&b).unwrap().diagonal(), &[3.0, 8.0]);
        let full = Array::new(Dims::matrix(2, 2), 1.0f64);
        assert_eq!(a.mul_full(&full).unwrap().to_vec(), vec![1.0, 2.0, 1.0, 2.0]);
        assert_eq!(
            DiagArray2::full_mul(&full, &a).unwrap().to_vec(),
            vec![1.0, 1.0, 2.0, 2.0]
        );
        assert_eq!(a.add_full(&full).unwrap().to_vec(), vec![2.0, 1.0, 1.0, 3.0]);
        let c = DiagArray2::from_diagonal(vec![1.0f64, 2.0, 3.0]);
        assert!(a.add(&c).is_err());
    }
}
