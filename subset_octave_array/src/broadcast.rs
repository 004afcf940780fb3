//! Broadcasting for elementwise operations
//!
//! Two shapes are compatible when every dimension pair is equal or one of
//! them is 1. The result takes the larger extent in each dimension.

use crate::array::Array;
use crate::dims::Dims;
use crate::element::Element;
use crate::error::{ArrayError, ArrayResult};

/// Result shape of broadcasting `a` against `b`, if compatible
pub fn broadcast_dims(a: &Dims, b: &Dims) -> Option<Dims> {
    let rank = a.ndims().max(b.ndims());
    let mut out = Vec::with_capacity(rank);
    for d in 0..rank {
        let (x, y) = (a.get(d), b.get(d));
        if x != y && x != 1 && y != 1 {
            return None;
        }
        out.push(if x == 1 { y } else { x });
    }
    Some(Dims::new(out))
}

/// Source offset for result element `linear` when reading an operand of
/// shape `orig`; singleton dimensions always read index 0
fn broadcast_index(linear: usize, result: &Dims, orig: &Dims, orig_strides: &[usize]) -> usize {
    let subs = result.subscripts(linear);
    subs.iter()
        .enumerate()
        .map(|(d, &s)| {
            if orig.get(d) == 1 {
                0
            } else {
                s * orig_strides.get(d).copied().unwrap_or(0)
            }
        })
        .sum()
}

/// Combine two arrays elementwise with broadcasting
///
/// `op` names the operator in the nonconformant error message.
pub fn zip_with<A, B, R, F>(a: &Array<A>, b: &Array<B>, op: &str, mut f: F) -> ArrayResult<Array<R>>
where
    A: Element,
    B: Element,
    R: Element,
    F: FnMut(&A, &B) -> R,
{
    let (xs, ys) = (a.as_slice(), b.as_slice());
    if a.dims() == b.dims() {
        let data = xs.iter().zip(ys).map(|(x, y)| f(x, y)).collect();
        return Array::from_vec(a.dims().clone(), data);
    }
    let dims = broadcast_dims(a.dims(), b.dims())
        .ok_or_else(|| ArrayError::nonconformant(op, a.dims(), b.dims()))?;
    let (sa, sb) = (a.dims().strides(), b.dims().strides());
    let data = (0..dims.numel())
        .map(|i| {
            let x = &xs[broadcast_index(i, &dims, a.dims(), &sa)];
            let y = &ys[broadcast_index(i, &dims, b.dims(), &sb)];
            f(x, y)
        })
        .collect();
    Array::from_vec(dims, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_dims() {
        let col = Dims::matrix(3, 1);
        let row = Dims::matrix(1, 4);
        assert_eq!(broadcast_dims(&col, &row), Some(Dims::matrix(3, 4)));
        assert_eq!(broadcast_dims(&Dims::matrix(2, 2), &Dims::matrix(3, 3)), None);
        assert_eq!(
            broadcast_dims(&Dims::matrix(2, 3), &Dims::new(vec![1, 3, 2])),
            Some(Dims::new(vec![2, 3, 2]))
        );
    }

    #[test]
    fn test_zip_with_outer() {
        let col = Array::column_vector(vec![1, 2]);
        let row = Array::row_vector(vec![10, 20, 30]);
        let sum = zip_with(&col, &row, "operator +", |a, b| a + b).unwrap();
        assert_eq!(sum.dims(), &Dims::matrix(2, 3));
        assert_eq!(sum.to_vec(), vec![11, 12, 21, 22, 31, 32]);
    }

    #[test]
    fn test_zip_with_nonconformant() {
        let a = Array::new(Dims::matrix(2, 2), 1.0f64);
        let b = Array::new(Dims::matrix(3, 3), 1.0f64);
        let err = zip_with(&a, &b, "operator -", |x, y| x - y).unwrap_err();
        assert_eq!(
            err.to_string(),
            "operator -: nonconformant arguments (op1 is 2x2, op2 is 3x3)"
        );
    }
}
