//! Matrix division and matrix power for floating-point types.
//!
//! Square systems are solved by LU decomposition. Singular or non-square
//! systems fall back to an SVD least-squares solution; the singular case also
//! emits `Octave:singular-matrix`.

use nalgebra::{ComplexField, DMatrix};
use subset_octave_array::{marray, Array, ArrayError, Complex32, Complex64, Dims};

use super::{arith, mismatch, operands};
use crate::error::{VmError, VmResult};
use crate::ops::registry::RegistryBuilder;
use crate::ops::BinaryOp;
use crate::value::{KernelElement, Operand, Value};
use crate::warning::{self, WarningId};

const SQUARE_ONLY: &str = "for x^y, only square matrix arguments are permitted and one argument must be scalar.  Use .^ for elementwise power.";

/// Element types nalgebra can factorize
pub trait LinalgElement: KernelElement + ComplexField {
    /// The value as an exact integer, if it is one
    fn integral(self) -> Option<i64>;
}

fn real_integral(x: f64) -> Option<i64> {
    if x.fract() == 0.0 && x.abs() < 9.007_199_254_740_992e15 {
        Some(x as i64)
    } else {
        None
    }
}

impl LinalgElement for f64 {
    fn integral(self) -> Option<i64> {
        real_integral(self)
    }
}

impl LinalgElement for f32 {
    fn integral(self) -> Option<i64> {
        real_integral(self as f64)
    }
}

impl LinalgElement for Complex64 {
    fn integral(self) -> Option<i64> {
        if self.im == 0.0 {
            real_integral(self.re)
        } else {
            None
        }
    }
}

impl LinalgElement for Complex32 {
    fn integral(self) -> Option<i64> {
        if self.im == 0.0 {
            real_integral(self.re as f64)
        } else {
            None
        }
    }
}

fn to_dmatrix<T: LinalgElement>(a: &Array<T>) -> VmResult<DMatrix<T>> {
    if !a.dims().is_two_dimensional() {
        return Err(ArrayError::NotTwoDimensional(a.dims().to_string()).into());
    }
    Ok(DMatrix::from_column_slice(a.rows(), a.cols(), a.as_slice()))
}

fn from_dmatrix<T: LinalgElement>(m: &DMatrix<T>) -> VmResult<Array<T>> {
    Ok(Array::from_vec(
        Dims::matrix(m.nrows(), m.ncols()),
        m.as_slice().to_vec(),
    )?)
}

fn warn_singular() {
    warning::warn(
        WarningId::SingularMatrix,
        "matrix singular to machine precision",
    );
}

/// Solve `a * x = b`
fn solve<T: LinalgElement>(a: DMatrix<T>, b: DMatrix<T>) -> VmResult<DMatrix<T>> {
    if a.is_square() {
        if let Some(x) = a.clone().lu().solve(&b) {
            return Ok(x);
        }
        warn_singular();
    }
    let eps: T::RealField = nalgebra::convert(1e-12);
    a.svd(true, true)
        .solve(&b, eps)
        .map_err(VmError::domain_error)
}

fn inverse<T: LinalgElement>(a: &Array<T>) -> VmResult<Array<T>> {
    let m = to_dmatrix(a)?;
    if !m.is_square() {
        return Err(VmError::InvalidDimension(SQUARE_ONLY.to_string()));
    }
    match m.clone().try_inverse() {
        Some(inv) => from_dmatrix(&inv),
        None => {
            warn_singular();
            let inf = T::from_real(nalgebra::convert(f64::INFINITY));
            Ok(Array::new(a.dims().clone(), inf))
        }
    }
}

/// `a / b`
fn mrdivide<T: LinalgElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    if b.single().is_some() {
        return arith::el_div::<T>(l, r);
    }
    let (a, b) = (a.to_array(), b.to_array());
    if a.cols() != b.cols() {
        return Err(ArrayError::nonconformant("operator /", a.dims(), b.dims()).into());
    }
    let x = solve(to_dmatrix(&b)?.transpose(), to_dmatrix(&a)?.transpose())?;
    Ok(T::matrix_value(from_dmatrix(&x.transpose())?))
}

/// `a \ b`
fn mldivide<T: LinalgElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    if a.single().is_some() {
        return arith::el_ldiv::<T>(l, r);
    }
    let (a, b) = (a.to_array(), b.to_array());
    if a.rows() != b.rows() {
        return Err(ArrayError::nonconformant("operator \\", a.dims(), b.dims()).into());
    }
    let x = solve(to_dmatrix(&a)?, to_dmatrix(&b)?)?;
    Ok(T::matrix_value(from_dmatrix(&x)?))
}

/// `a ^ n` for a square matrix and an integer scalar
fn mpower<T: LinalgElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (a, e) = operands::<T>(l, r)?;
    let e = e.single().ok_or_else(|| mismatch("matrix power", &[l, r]))?;
    let base = match a {
        Operand::Matrix(a) if a.numel() != 1 => a,
        _ => return arith::el_pow::<T>(l, r),
    };
    let n = e.integral().ok_or_else(|| {
        VmError::domain_error("mpower: non-integer exponents are not supported for matrix bases")
    })?;
    let exponent = u32::try_from(n.unsigned_abs())
        .map_err(|_| VmError::domain_error("mpower: exponent out of range"))?;
    let result = if n < 0 {
        marray::matrix_power(&inverse(base)?, exponent)?
    } else {
        marray::matrix_power(base, exponent)?
    };
    Ok(T::matrix_value(result))
}

pub fn install<T: LinalgElement>(b: &mut RegistryBuilder) -> VmResult<()> {
    let (s, m) = (T::scalar_tag(), T::matrix_tag());
    for t in [s, m] {
        b.register_binary(BinaryOp::Div, t, m, mrdivide::<T>)?;
        b.register_binary(BinaryOp::LDiv, m, t, mldivide::<T>)?;
    }
    b.register_binary(BinaryOp::Pow, m, s, mpower::<T>)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warning::WarningCollector;

    fn approx(v: &Value, expected: &[f64]) {
        match v {
            Value::Matrix(a) => {
                assert_eq!(a.numel(), expected.len());
                for (x, y) in a.iter().zip(expected) {
                    assert!((x - y).abs() < 1e-9, "{} != {}", x, y);
                }
            }
            other => panic!("expected matrix, got {:?}", other),
        }
    }

    #[test]
    fn test_left_division_solves() {
        // [2 0; 0 4] \ [2; 8] = [1; 2]
        let a = Value::matrix(2, 2, vec![2.0, 0.0, 0.0, 4.0]).unwrap();
        let b = Value::matrix(2, 1, vec![2.0, 8.0]).unwrap();
        approx(&mldivide::<f64>(&a, &b).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_right_division_solves() {
        // [1 2] / [1 0; 0 2] = [1 1]
        let a = Value::matrix(1, 2, vec![1.0, 2.0]).unwrap();
        let b = Value::matrix(2, 2, vec![1.0, 0.0, 0.0, 2.0]).unwrap();
        approx(&mrdivide::<f64>(&a, &b).unwrap(), &[1.0, 1.0]);
    }

    #[test]
    fn test_singular_system_warns() {
        WarningCollector::clear();
        let a = Value::matrix(2, 2, vec![1.0, 1.0, 1.0, 1.0]).unwrap();
        let b = Value::matrix(2, 1, vec![2.0, 2.0]).unwrap();
        approx(&mldivide::<f64>(&a, &b).unwrap(), &[1.0, 1.0]);
        assert!(WarningCollector::contains(WarningId::SingularMatrix));
    }

    #[test]
    fn test_nonconformant_division() {
        let a = Value::matrix(2, 2, vec![1.0; 4]).unwrap();
        let b = Value::matrix(3, 1, vec![1.0; 3]).unwrap();
        let err = mldivide::<f64>(&a, &b).unwrap_err();
        assert!(matches!(err, VmError::Nonconformant(_)));
    }

    #[test]
    fn test_matrix_power() {
        let a = Value::matrix(2, 2, vec![2.0, 0.0, 0.0, 4.0]).unwrap();
        approx(&mpower::<f64>(&a, &Value::Scalar(2.0)).unwrap(), &[4.0, 0.0, 0.0, 16.0]);
        approx(&mpower::<f64>(&a, &Value::Scalar(-1.0)).unwrap(), &[0.5, 0.0, 0.0, 0.25]);
        assert!(mpower::<f64>(&a, &Value::Scalar(0.5)).is_err());
        let rect = Value::matrix(1, 2, vec![1.0, 2.0]).unwrap();
        assert!(mpower::<f64>(&rect, &Value::Scalar(2.0)).is_err());
    }
}
