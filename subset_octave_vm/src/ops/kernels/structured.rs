//! Diagonal and sparse matrix kernels.
//!
//! Only the operators whose result keeps (or cheaply exploits) the
//! structure are registered. Everything else reaches the dense kernels
//! through the dispatcher's densify step.

use subset_octave_array::{marray, Arith, Complex32, Complex64, DiagArray2, SparseArray};

use super::{arith, mismatch, operand};
use crate::error::VmResult;
use crate::ops::registry::RegistryBuilder;
use crate::ops::{BinaryOp, UnaryOp};
use crate::types::TypeTag;
use crate::value::{KernelElement, Operand, Value};
use crate::warning;

/// Element type with a diagonal matrix variant
pub trait DiagElement: KernelElement {
    const DIAG_TAG: TypeTag;
    fn diag(v: &Value) -> Option<&DiagArray2<Self>>;
    fn diag_value(d: DiagArray2<Self>) -> Value;
}

macro_rules! diag_element {
    ($t:ty, $variant:ident) => {
        impl DiagElement for $t {
            const DIAG_TAG: TypeTag = TypeTag::$variant;

            fn diag(v: &Value) -> Option<&DiagArray2<Self>> {
                match v {
                    Value::$variant(d) => Some(d),
                    _ => None,
                }
            }

            fn diag_value(d: DiagArray2<Self>) -> Value {
                Value::$variant(d)
            }
        }
    };
}

diag_element!(f64, DiagMatrix);
diag_element!(f32, FloatDiagMatrix);
diag_element!(Complex64, ComplexDiagMatrix);
diag_element!(Complex32, FloatComplexDiagMatrix);

/// Element type with a sparse matrix variant
pub trait SparseElement: KernelElement {
    const SPARSE_TAG: TypeTag;
    fn sparse(v: &Value) -> Option<&SparseArray<Self>>;
    fn sparse_value(s: SparseArray<Self>) -> Value;
}

macro_rules! sparse_element {
    ($t:ty, $variant:ident) => {
        impl SparseElement for $t {
            const SPARSE_TAG: TypeTag = TypeTag::$variant;

            fn sparse(v: &Value) -> Option<&SparseArray<Self>> {
                match v {
                    Value::$variant(s) => Some(s),
                    _ => None,
                }
            }

            fn sparse_value(s: SparseArray<Self>) -> Value {
                Value::$variant(s)
            }
        }
    };
}

sparse_element!(f64, SparseMatrix);
sparse_element!(Complex64, SparseComplexMatrix);

// =============================================================================
// Diagonal
// =============================================================================

fn diag_of<T: DiagElement>(v: &Value) -> VmResult<&DiagArray2<T>> {
    T::diag(v).ok_or_else(|| mismatch(T::DIAG_TAG.name(), &[v]))
}

fn full_of<T: DiagElement>(d: &DiagArray2<T>) -> Value {
    T::matrix_value(d.to_full())
}

/// Scalar operand of a structured-by-scalar kernel
fn scalar_of<T: KernelElement>(v: &Value) -> VmResult<T> {
    operand::<T>(v)?
        .single()
        .ok_or_else(|| mismatch("scalar", &[v]))
}

fn diag_add<T: DiagElement>(l: &Value, r: &Value) -> VmResult<Value> {
    Ok(T::diag_value(diag_of::<T>(l)?.add(diag_of::<T>(r)?)?))
}

fn diag_sub<T: DiagElement>(l: &Value, r: &Value) -> VmResult<Value> {
    Ok(T::diag_value(diag_of::<T>(l)?.sub(diag_of::<T>(r)?)?))
}

fn diag_mul<T: DiagElement>(l: &Value, r: &Value) -> VmResult<Value> {
    Ok(T::diag_value(diag_of::<T>(l)?.mul(diag_of::<T>(r)?)?))
}

/// `D + A`, `A + D`, `D - A`, `A - D` with a full `A` of the same size;
/// other sizes go through the dense kernels for broadcasting.
fn diag_full_addsub<T: DiagElement>(l: &Value, r: &Value, subtract: bool) -> VmResult<Value> {
    let (d, full, diag_left) = match (T::diag(l), T::diag(r)) {
        (Some(d), None) => (d, operand::<T>(r)?, true),
        (None, Some(d)) => (d, operand::<T>(l)?, false),
        _ => return Err(mismatch(T::DIAG_TAG.name(), &[l, r])),
    };
    let full = match full {
        Operand::Matrix(a) if *a.dims() == d.dims() => a,
        _ => {
            let dense = full_of(d);
            let (a, b) = if diag_left { (&dense, r) } else { (l, &dense) };
            return if subtract {
                arith::sub::<T>(a, b)
            } else {
                arith::add::<T>(a, b)
            };
        }
    };
    let out = match (subtract, diag_left) {
        (false, _) => d.add_full(full)?,
        (true, true) => d.add_full(&marray::negate(full))?,
        (true, false) => d.negate().add_full(full)?,
    };
    Ok(T::matrix_value(out))
}

fn diag_full_add<T: DiagElement>(l: &Value, r: &Value) -> VmResult<Value> {
    diag_full_addsub::<T>(l, r, false)
}

fn diag_full_sub<T: DiagElement>(l: &Value, r: &Value) -> VmResult<Value> {
    diag_full_addsub::<T>(l, r, true)
}

fn diag_full_mul<T: DiagElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let out = match (T::diag(l), T::diag(r)) {
        (Some(d), None) => d.mul_full(&operand::<T>(r)?.to_array())?,
        (None, Some(d)) => DiagArray2::full_mul(&operand::<T>(l)?.to_array(), d)?,
        _ => return Err(mismatch(T::DIAG_TAG.name(), &[l, r])),
    };
    Ok(T::matrix_value(out))
}

fn diag_scale<T: DiagElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (d, s) = match T::diag(l) {
        Some(d) => (d, scalar_of::<T>(r)?),
        None => (diag_of::<T>(r)?, scalar_of::<T>(l)?),
    };
    Ok(T::diag_value(d.scale(s)))
}

/// `D / s`; a zero divisor fills the off-diagonal with NaN, so the result
/// is dense
fn diag_div<T: DiagElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (d, s) = (diag_of::<T>(l)?, scalar_of::<T>(r)?);
    if s.is_zero() {
        return arith::el_div::<T>(&full_of(d), r);
    }
    Ok(T::diag_value(d.map(|x| x.divide(s))))
}

fn diag_uplus<T: DiagElement>(v: &Value) -> VmResult<Value> {
    diag_of::<T>(v)?;
    Ok(v.clone())
}

fn diag_uminus<T: DiagElement>(v: &Value) -> VmResult<Value> {
    Ok(T::diag_value(diag_of::<T>(v)?.negate()))
}

fn diag_transpose<T: DiagElement>(v: &Value) -> VmResult<Value> {
    Ok(T::diag_value(diag_of::<T>(v)?.transpose()))
}

fn diag_hermitian<T: DiagElement>(v: &Value) -> VmResult<Value> {
    Ok(T::diag_value(diag_of::<T>(v)?.conjugate().transpose()))
}

pub fn install_diag<T: DiagElement>(b: &mut RegistryBuilder) -> VmResult<()> {
    let (d, s, m) = (T::DIAG_TAG, T::scalar_tag(), T::matrix_tag());
    b.register_binary(BinaryOp::Add, d, d, diag_add::<T>)?;
    b.register_binary(BinaryOp::Sub, d, d, diag_sub::<T>)?;
    b.register_binary(BinaryOp::Mul, d, d, diag_mul::<T>)?;
    for (l, r) in [(d, m), (m, d)] {
        b.register_binary(BinaryOp::Add, l, r, diag_full_add::<T>)?;
        b.register_binary(BinaryOp::Sub, l, r, diag_full_sub::<T>)?;
        b.register_binary(BinaryOp::Mul, l, r, diag_full_mul::<T>)?;
    }
    for (l, r) in [(d, s), (s, d)] {
        b.register_binary(BinaryOp::Mul, l, r, diag_scale::<T>)?;
        b.register_binary(BinaryOp::ElMul, l, r, diag_scale::<T>)?;
    }
    b.register_binary(BinaryOp::Div, d, s, diag_div::<T>)?;
    b.register_binary(BinaryOp::ElDiv, d, s, diag_div::<T>)?;
    b.register_unary(UnaryOp::UPlus, d, diag_uplus::<T>)?;
    b.register_unary(UnaryOp::UMinus, d, diag_uminus::<T>)?;
    b.register_unary(UnaryOp::Transpose, d, diag_transpose::<T>)?;
    b.register_unary(UnaryOp::Hermitian, d, diag_hermitian::<T>)?;
    Ok(())
}

// =============================================================================
// Sparse
// =============================================================================

fn sparse_of<T: SparseElement>(v: &Value) -> VmResult<&SparseArray<T>> {
    T::sparse(v).ok_or_else(|| mismatch(T::SPARSE_TAG.name(), &[v]))
}

fn sparse_add<T: SparseElement>(l: &Value, r: &Value) -> VmResult<Value> {
    Ok(T::sparse_value(sparse_of::<T>(l)?.add(sparse_of::<T>(r)?)?))
}

fn sparse_sub<T: SparseElement>(l: &Value, r: &Value) -> VmResult<Value> {
    Ok(T::sparse_value(sparse_of::<T>(l)?.sub(sparse_of::<T>(r)?)?))
}

fn sparse_el_mul<T: SparseElement>(l: &Value, r: &Value) -> VmResult<Value> {
    Ok(T::sparse_value(sparse_of::<T>(l)?.el_mul(sparse_of::<T>(r)?)?))
}

fn sparse_scale<T: SparseElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (sp, s) = match T::sparse(l) {
        Some(sp) => (sp, scalar_of::<T>(r)?),
        None => (sparse_of::<T>(r)?, scalar_of::<T>(l)?),
    };
    Ok(T::sparse_value(sp.scale(s)))
}

fn sparse_div<T: SparseElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (sp, s) = (sparse_of::<T>(l)?, scalar_of::<T>(r)?);
    if s.is_zero() {
        warning::warn_divide_by_zero();
        return Ok(T::matrix_value(sp.to_dense().map(|x| x.divide(s))));
    }
    Ok(T::sparse_value(sp.map_nonzero(|x| x.divide(s))))
}

fn sparse_uplus<T: SparseElement>(v: &Value) -> VmResult<Value> {
    sparse_of::<T>(v)?;
    Ok(v.clone())
}

fn sparse_uminus<T: SparseElement>(v: &Value) -> VmResult<Value> {
    Ok(T::sparse_value(sparse_of::<T>(v)?.negate()))
}

fn sparse_transpose<T: SparseElement>(v: &Value) -> VmResult<Value> {
    Ok(T::sparse_value(sparse_of::<T>(v)?.transpose()))
}

fn sparse_hermitian<T: SparseElement>(v: &Value) -> VmResult<Value> {
    Ok(T::sparse_value(sparse_of::<T>(v)?.conjugate().transpose()))
}

pub fn install_sparse<T: SparseElement>(b: &mut RegistryBuilder) -> VmResult<()> {
    let (sp, s) = (T::SPARSE_TAG, T::scalar_tag());
    b.register_binary(BinaryOp::Add, sp, sp, sparse_add::<T>)?;
    b.register_binary(BinaryOp::Sub, sp, sp, sparse_sub::<T>)?;
    b.register_binary(BinaryOp::ElMul, sp, sp, sparse_el_mul::<T>)?;
    for (l, r) in [(sp, s), (s, sp)] {
        b.register_binary(BinaryOp::Mul, l, r, sparse_scale::<T>)?;
        b.register_binary(BinaryOp::ElMul, l, r, sparse_scale::<T>)?;
    }
    b.register_binary(BinaryOp::Div, sp, s, sparse_div::<T>)?;
    b.register_binary(BinaryOp::ElDiv, sp, s, sparse_div::<T>)?;
    b.register_unary(UnaryOp::UPlus, sp, sparse_uplus::<T>)?;
    b.register_unary(UnaryOp::UMinus, sp, sparse_uminus::<T>)?;
    b.register_unary(UnaryOp::Transpose, sp, sparse_transpose::<T>)?;
    b.register_unary(UnaryOp::Hermitian, sp, sparse_hermitian::<T>)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warning::{WarningCollector, WarningId};
    use pretty_assertions::assert_eq;

    fn diag(values: Vec<f64>) -> Value {
        Value::DiagMatrix(DiagArray2::from_diagonal(values))
    }

    #[test]
    fn test_diag_results_stay_diagonal() {
        let a = diag(vec![1.0, 2.0]);
        assert_eq!(diag_add::<f64>(&a, &a).unwrap(), diag(vec![2.0, 4.0]));
        assert_eq!(diag_mul::<f64>(&a, &a).unwrap(), diag(vec![1.0, 4.0]));
        assert_eq!(diag_scale::<f64>(&Value::Scalar(3.0), &a).unwrap(), diag(vec![3.0, 6.0]));
        assert_eq!(diag_uminus::<f64>(&a).unwrap(), diag(vec![-1.0, -2.0]));
    }

    #[test]
    fn test_diag_with_full() {
        let d = diag(vec![2.0, 3.0]);
        let m = Value::matrix(2, 2, vec![1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(
            diag_full_add::<f64>(&d, &m).unwrap(),
            Value::matrix(2, 2, vec![3.0, 1.0, 1.0, 4.0]).unwrap()
        );
        assert_eq!(
            diag_full_sub::<f64>(&m, &d).unwrap(),
            Value::matrix(2, 2, vec![-1.0, 1.0, 1.0, -2.0]).unwrap()
        );
        assert_eq!(
            diag_full_sub::<f64>(&d, &m).unwrap(),
            Value::matrix(2, 2, vec![1.0, -1.0, -1.0, 2.0]).unwrap()
        );
        // rows scaled by D, then columns
        assert_eq!(
            diag_full_mul::<f64>(&d, &m).unwrap(),
            Value::matrix(2, 2, vec![2.0, 3.0, 2.0, 3.0]).unwrap()
        );
        assert_eq!(
            diag_full_mul::<f64>(&m, &d).unwrap(),
            Value::matrix(2, 2, vec![2.0, 2.0, 3.0, 3.0]).unwrap()
        );
    }

    #[test]
    fn test_diag_divide_by_zero_densifies() {
        WarningCollector::clear();
        let out = diag_div::<f64>(&diag(vec![1.0, 2.0]), &Value::Scalar(0.0)).unwrap();
        assert_eq!(out.tag(), TypeTag::Matrix);
        assert!(WarningCollector::contains(WarningId::DivideByZero));
    }

    #[test]
    fn test_sparse_kernels() {
        let s = SparseArray::from_triplets(2, 2, vec![(0, 0, 1.0), (1, 1, 2.0)]).unwrap();
        let v = Value::SparseMatrix(s);
        let doubled = sparse_add::<f64>(&v, &v).unwrap();
        let scaled = sparse_scale::<f64>(&v, &Value::Scalar(2.0)).unwrap();
        assert_eq!(doubled, scaled);
        let t = sparse_transpose::<f64>(&v).unwrap();
        assert_eq!(t, v);
        match sparse_div::<f64>(&v, &Value::Scalar(2.0)).unwrap() {
            Value::SparseMatrix(s) => assert_eq!(s.nnz(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
