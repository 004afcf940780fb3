//! Compressed sparse column storage
//!
//! Row indices are strictly increasing within each column and no explicit
//! zeros are stored. The index arrays live behind an `Arc`, so cloning is
//! shallow and `set_element` copies on write.

use std::sync::Arc;

use crate::array::Array;
use crate::dims::Dims;
use crate::element::{Arith, Element};
use crate::error::{ArrayError, ArrayResult};

#[derive(Debug, Clone, PartialEq)]
struct SparseRep<T> {
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
}

/// 2-D sparse matrix in CSC form
#[derive(Debug, Clone, PartialEq)]
pub struct SparseArray<T> {
    rows: usize,
    cols: usize,
    rep: Arc<SparseRep<T>>,
}

impl<T: Element + PartialEq> SparseArray<T> {
    /// All-zero `rows x cols` matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        SparseArray {
            rows,
            cols,
            rep: Arc::new(SparseRep {
                col_ptr: vec![0; cols + 1],
                row_idx: Vec::new(),
                values: Vec::new(),
            }),
        }
    }

    /// Build from `(row, col, value)` triplets, merging duplicates with `combine`
    pub fn from_triplets_with<I, F>(rows: usize, cols: usize, triplets: I, combine: F) -> ArrayResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, T)>,
        F: Fn(T, T) -> T,
    {
        let dims = Dims::matrix(rows, cols);
        let mut entries: Vec<(usize, usize, T)> = Vec::new();
        for (r, c, v) in triplets {
            if r >= rows {
                return Err(ArrayError::out_of_bounds(&[r, c], 0, rows, &dims));
            }
            if c >= cols {
                return Err(ArrayError::out_of_bounds(&[r, c], 1, cols, &dims));
            }
            entries.push((r, c, v));
        }
        entries.sort_by_key(|&(r, c, _)| (c, r));

        let mut merged: Vec<(usize, usize, T)> = Vec::with_capacity(entries.len());
        for (r, c, v) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == r && last.1 == c => {
                    let prev = std::mem::replace(&mut last.2, T::zero());
                    last.2 = combine(prev, v);
                }
                _ => merged.push((r, c, v)),
            }
        }
        let zero = T::zero();
        merged.retain(|(_, _, v)| *v != zero);
        Ok(Self::from_sorted(rows, cols, merged))
    }

    /// Entries must be sorted by column, then row, with no duplicates or zeros
    fn from_sorted(rows: usize, cols: usize, entries: Vec<(usize, usize, T)>) -> Self {
        let mut col_ptr = vec![0; cols + 1];
        let mut row_idx = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        for (r, c, v) in entries {
            col_ptr[c + 1] += 1;
            row_idx.push(r);
            values.push(v);
        }
        for c in 0..cols {
            col_ptr[c + 1] += col_ptr[c];
        }
        SparseArray {
            rows,
            cols,
            rep: Arc::new(SparseRep {
                col_ptr,
                row_idx,
                values,
            }),
        }
    }

    /// Sparse copy of a dense 2-D array
    pub fn from_dense(full: &Array<T>) -> ArrayResult<Self> {
        if !full.dims().is_two_dimensional() {
            return Err(ArrayError::NotTwoDimensional("sparse".to_string()));
        }
        let (rows, cols) = (full.rows(), full.cols());
        let zero = T::zero();
        let data = full.as_slice();
        let mut entries = Vec::new();
        for c in 0..cols {
            for r in 0..rows {
                let v = &data[r + c * rows];
                if *v != zero {
                    entries.push((r, c, v.clone()));
                }
            }
        }
        Ok(Self::from_sorted(rows, cols, entries))
    }

    /// Dense copy
    pub fn to_dense(&self) -> Array<T> {
        let mut full = Array::zeros(self.dims());
        let data = full.as_mut_slice();
        for (r, c, v) in self.iter() {
            data[r + c * self.rows] = v.clone();
        }
        full
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

    /// Number of stored non-zeros
    pub fn nnz(&self) -> usize {
        self.rep.values.len()
    }

    fn column(&self, c: usize) -> (&[usize], &[T]) {
        let (start, end) = (self.rep.col_ptr[c], self.rep.col_ptr[c + 1]);
        (&self.rep.row_idx[start..end], &self.rep.values[start..end])
    }

    /// Stored entries in column-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        (0..self.cols).flat_map(move |c| {
            let (rows, vals) = self.column(c);
            rows.iter().zip(vals).map(move |(&r, v)| (r, c, v))
        })
    }

    fn check_bounds(&self, r: usize, c: usize) -> ArrayResult<()> {
        if r >= self.rows {
            return Err(ArrayError::out_of_bounds(&[r, c], 0, self.rows, &self.dims()));
        }
        if c >= self.cols {
            return Err(ArrayError::out_of_bounds(&[r, c], 1, self.cols, &self.dims()));
        }
        Ok(())
    }

    /// Element at row `r`, column `c` (0-based)
    pub fn element(&self, r: usize, c: usize) -> ArrayResult<T> {
        self.check_bounds(r, c)?;
        let (rows, vals) = self.column(c);
        Ok(match rows.binary_search(&r) {
            Ok(k) => vals[k].clone(),
            Err(_) => T::zero(),
        })
    }

    /// Store one element; storing zero removes the entry
    pub fn set_element(&mut self, r: usize, c: usize, value: T) -> ArrayResult<()> {
        self.check_bounds(r, c)?;
        let is_zero = value == T::zero();
        let rep = Arc::make_mut(&mut self.rep);
        let (start, end) = (rep.col_ptr[c], rep.col_ptr[c + 1]);
        match rep.row_idx[start..end].binary_search(&r) {
            Ok(k) if is_zero => {
                rep.row_idx.remove(start + k);
                rep.values.remove(start + k);
                rep.col_ptr[c + 1..].iter_mut().for_each(|p| *p -= 1);
            }
            Ok(k) => rep.values[start + k] = value,
            Err(_) if is_zero => {}
            Err(k) => {
                rep.row_idx.insert(start + k, r);
                rep.values.insert(start + k, value);
                rep.col_ptr[c + 1..].iter_mut().for_each(|p| *p += 1);
            }
        }
        Ok(())
    }

    /// Resized copy; entries outside the new bounds are dropped
    pub fn resize(&self, rows: usize, cols: usize) -> Self {
        let entries = self
            .iter()
            .filter(|&(r, c, _)| r < rows && c < cols)
            .map(|(r, c, v)| (r, c, v.clone()))
            .collect();
        Self::from_sorted(rows, cols, entries)
    }

    pub fn transpose(&self) -> Self {
        let mut entries: Vec<(usize, usize, T)> =
            self.iter().map(|(r, c, v)| (c, r, v.clone())).collect();
        entries.sort_by_key(|&(r, c, _)| (c, r));
        Self::from_sorted(self.cols, self.rows, entries)
    }

    /// Map stored values; results equal to zero are dropped
    pub fn map_nonzero<U, F>(&self, mut f: F) -> SparseArray<U>
    where
        U: Element + PartialEq,
        F: FnMut(&T) -> U,
    {
        let zero = U::zero();
        let entries = self
            .iter()
            .map(|(r, c, v)| (r, c, f(v)))
            .filter(|(_, _, v)| *v != zero)
            .collect();
        SparseArray::from_sorted(self.rows, self.cols, entries)
    }
}

impl<T: Arith> SparseArray<T> {
    /// Build from triplets; duplicates are summed
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> ArrayResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, T)>,
    {
        Self::from_triplets_with(rows, cols, triplets, T::plus)
    }

    /// Column-wise merge; `union` keeps entries present on either side
    fn merge(&self, other: &Self, op: &str, union: bool, f: impl Fn(T, T) -> T) -> ArrayResult<Self> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(ArrayError::nonconformant(op, &self.dims(), &other.dims()));
        }
        let zero = T::zero();
        let mut entries = Vec::with_capacity(self.nnz() + other.nnz());
        for c in 0..self.cols {
            let (ra, va) = self.column(c);
            let (rb, vb) = other.column(c);
            let (mut i, mut j) = (0, 0);
            while i < ra.len() || j < rb.len() {
                let (r, v) = match (ra.get(i), rb.get(j)) {
                    (Some(&x), Some(&y)) if x == y => {
                        i += 1;
                        j += 1;
                        (x, Some(f(va[i - 1], vb[j - 1])))
                    }
                    (Some(&x), Some(&y)) if x < y => {
                        i += 1;
                        (x, union.then(|| f(va[i - 1], zero)))
                    }
                    (Some(&x), None) => {
                        i += 1;
                        (x, union.then(|| f(va[i - 1], zero)))
                    }
                    (_, Some(&y)) => {
                        j += 1;
                        (y, union.then(|| f(zero, vb[j - 1])))
                    }
                    (None, None) => break,
                };
                if let Some(v) = v.filter(|v| !v.is_zero()) {
                    entries.push((r, c, v));
                }
            }
        }
        Ok(Self::from_sorted(self.rows, self.cols, entries))
    }

    pub fn add(&self, other: &Self) -> ArrayResult<Self> {
        self.merge(other, "operator +", true, T::plus)
    }

    pub fn sub(&self, other: &Self) -> ArrayResult<Self> {
        self.merge(other, "operator -", true, T::minus)
    }

    /// Elementwise product; only the common pattern survives
    pub fn el_mul(&self, other: &Self) -> ArrayResult<Self> {
        self.merge(other, "product", false, T::times)
    }

    pub fn scale(&self, s: T) -> Self {
        self.map_nonzero(|v| v.times(s))
    }

    pub fn negate(&self) -> Self {
        self.map_nonzero(|v| v.negate())
    }

    pub fn conjugate(&self) -> Self {
        self.map_nonzero(|v| v.conjugate())
    }
}
