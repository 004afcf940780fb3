//! Arithmetic over dense arrays
//!
//! Elementwise operators broadcast; `matmul` follows the usual 2-D rules.
//! Operator names in errors match what Octave prints.

use crate::array::Array;
use crate::broadcast::zip_with;
use crate::dims::Dims;
use crate::element::Arith;
use crate::error::{ArrayError, ArrayResult};

pub fn add<T: Arith>(a: &Array<T>, b: &Array<T>) -> ArrayResult<Array<T>> {
    zip_with(a, b, "operator +", |x, y| x.plus(*y))
}

pub fn sub<T: Arith>(a: &Array<T>, b: &Array<T>) -> ArrayResult<Array<T>> {
    zip_with(a, b, "operator -", |x, y| x.minus(*y))
}

pub fn el_mul<T: Arith>(a: &Array<T>, b: &Array<T>) -> ArrayResult<Array<T>> {
    zip_with(a, b, "product", |x, y| x.times(*y))
}

pub fn el_div<T: Arith>(a: &Array<T>, b: &Array<T>) -> ArrayResult<Array<T>> {
    zip_with(a, b, "quotient", |x, y| x.divide(*y))
}

pub fn el_pow<T: Arith>(a: &Array<T>, b: &Array<T>) -> ArrayResult<Array<T>> {
    zip_with(a, b, "operator .^", |x, y| x.power(*y))
}

pub fn negate<T: Arith>(a: &Array<T>) -> Array<T> {
    a.map(|x| x.negate())
}

pub fn conjugate<T: Arith>(a: &Array<T>) -> Array<T> {
    a.map(|x| x.conjugate())
}

/// Conjugate transpose
pub fn hermitian<T: Arith>(a: &Array<T>) -> ArrayResult<Array<T>> {
    Ok(conjugate(&a.transpose()?))
}

/// n x n identity
pub fn identity<T: Arith>(n: usize) -> Array<T> {
    let mut out = Array::zeros(Dims::matrix(n, n));
    let data = out.as_mut_slice();
    for i in 0..n {
        data[i * n + i] = T::one();
    }
    out
}

/// Matrix product of two 2-D arrays
pub fn matmul<T: Arith>(a: &Array<T>, b: &Array<T>) -> ArrayResult<Array<T>> {
    if !a.dims().is_two_dimensional() || !b.dims().is_two_dimensional() {
        return Err(ArrayError::NotTwoDimensional("operator *".to_string()));
    }
    let (m, k, n) = (a.rows(), a.cols(), b.cols());
    if k != b.rows() {
        return Err(ArrayError::nonconformant("operator *", a.dims(), b.dims()));
    }
    let (xs, ys) = (a.as_slice(), b.as_slice());
    let mut out = vec![T::zero(); m * n];
    for j in 0..n {
        for p in 0..k {
            let y = ys[p + j * k];
            for i in 0..m {
                out[i + j * m] = out[i + j * m].plus(xs[i + p * m].times(y));
            }
        }
    }
    Array::from_vec(Dims::matrix(m, n), out)
}

/// Square matrix raised to a non-negative integer power
pub fn matrix_power<T: Arith>(a: &Array<T>, exponent: u32) -> ArrayResult<Array<T>> {
    if !a.dims().is_two_dimensional() || a.rows() != a.cols() {
        return Err(ArrayError::invalid_dimension(
            "for x^y, only square matrix arguments are permitted and one argument must be scalar.  Use .^ for elementwise power.",
        ));
    }
    let mut result = identity(a.rows());
    let mut base = a.clone();
    let mut n = exponent;
    while n > 0 {
        if n & 1 == 1 {
            result = matmul(&result, &base)?;
        }
        n >>= 1;
        if n > 0 {
            base = matmul(&base, &base)?;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Complex;
    use pretty_assertions::assert_eq;

    fn m(rows: usize, cols: usize, data: Vec<f64>) -> Array<f64> {
        Array::from_vec(Dims::matrix(rows, cols), data).unwrap()
    }

    #[test]
    fn test_elementwise() {
        let a = m(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let b = m(2, 2, vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(add(&a, &b).unwrap().to_vec(), vec![5.0; 4]);
        assert_eq!(el_mul(&a, &b).unwrap().to_vec(), vec![4.0, 6.0, 6.0, 4.0]);
        assert_eq!(negate(&a).to_vec(), vec![-1.0, -2.0, -3.0, -4.0]);
    }

    #[test]
    fn test_integer_elementwise_saturates() {
        let a = Array::row_vector(vec![100i8, -100]);
        let b = Array::row_vector(vec![100i8, 100]);
        assert_eq!(add(&a, &b).unwrap().to_vec(), vec![127, 0]);
        assert_eq!(sub(&a, &b).unwrap().to_vec(), vec![0, -128]);
    }

    #[test]
    fn test_matmul() {
        let a = m(2, 3, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        let b = m(3, 1, vec![1.0, 1.0, 1.0]);
        let c = matmul(&a, &b).unwrap();
        assert_eq!(c.dims(), &Dims::matrix(2, 1));
        assert_eq!(c.to_vec(), vec![6.0, 15.0]);
        let err = matmul(&b, &b).unwrap_err();
        assert_eq!(
            err.to_string(),
            "operator *: nonconformant arguments (op1 is 3x1, op2 is 3x1)"
        );
    }

    #[test]
    fn test_matmul_propagates_nan() {
        let inf = matmul(&m(1, 2, vec![f64::INFINITY, 1.0]), &m(2, 1, vec![0.0, 1.0])).unwrap();
        assert!(inf.to_vec()[0].is_nan());

        let a = m(2, 2, vec![f64::NAN, 1.0, 1.0, 1.0]);
        let b = m(2, 2, vec![0.0, 1.0, 0.0, 1.0]);
        let c = matmul(&a, &b).unwrap().to_vec();
        assert!(c[0].is_nan());
        assert_eq!(c[1], 1.0);
        assert!(c[2].is_nan());
        assert_eq!(c[3], 1.0);
    }

    #[test]
    fn test_matrix_power() {
        let a = m(2, 2, vec![1.0, 1.0, 1.0, 0.0]);
        let p = matrix_power(&a, 5).unwrap();
        assert_eq!(p.to_vec(), vec![8.0, 5.0, 5.0, 3.0]);
        assert_eq!(matrix_power(&a, 0).unwrap(), identity(2));
    }

    #[test]
    fn test_hermitian() {
        let a = Array::row_vector(vec![Complex::new(1.0f64, 2.0), Complex::new(3.0, -1.0)]);
        let h = hermitian(&a).unwrap();
        assert_eq!(h.dims(), &Dims::matrix(2, 1));
        assert_eq!(h.to_vec(), vec![Complex::new(1.0, -2.0), Complex::new(3.0, 1.0)]);
    }
}
