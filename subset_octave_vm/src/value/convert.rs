//! Conversions between value representations.
//!
//! Every numeric value is first flattened to a dense payload, moved to the
//! target rank on the promotion ladder, then shaped into the target storage
//! (scalar, full, diagonal or sparse).
//!
//! Narrowing rules:
//! - complex to real fails with `DomainError` when any imaginary part is
//!   non-zero (`Narrowing::Strict`), or drops it with an `Octave:imag-to-real`
//!   warning (`Narrowing::Force`)
//! - real to integer rounds to nearest and saturates; NaN becomes 0
//! - anything to logical fails on NaN

use num_traits::Float;
use subset_octave_array::{
    Array, Complex, Complex32, Complex64, DiagArray2, Element, SparseArray,
};

use super::int::IntMatrix;
use super::Value;
use crate::error::{VmError, VmResult};
use crate::types::{NumericRank, TypeTag};
use crate::warning::{self, WarningId};

/// How to treat a non-zero imaginary part when converting to real
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narrowing {
    /// Fail with `DomainError`
    Strict,
    /// Drop it and warn
    Force,
}

/// Dense payload at one rank
#[derive(Debug, Clone)]
pub(crate) enum Dense {
    Bool(Array<bool>),
    Int(IntMatrix),
    Single(Array<f32>),
    Double(Array<f64>),
    FloatComplex(Array<Complex32>),
    Complex(Array<Complex64>),
}

/// Emit the NaN-to-logical diagnostic and build the matching error
pub(crate) fn nan_to_logical() -> VmError {
    let msg = "logical: NaN can't be converted to logical value";
    warning::warn(WarningId::NanToLogical, msg);
    VmError::domain_error(msg)
}

fn float_truth<T: Float + Element>(a: &Array<T>) -> VmResult<Array<bool>> {
    a.try_map(|x| {
        if x.is_nan() {
            Err(nan_to_logical())
        } else {
            Ok(!x.is_zero())
        }
    })
}

fn complex_truth<T: Float + Element>(a: &Array<Complex<T>>) -> VmResult<Array<bool>>
where
    Complex<T>: Element,
{
    a.try_map(|z| {
        if z.re.is_nan() || z.im.is_nan() {
            Err(nan_to_logical())
        } else {
            Ok(!(z.re.is_zero() && z.im.is_zero()))
        }
    })
}

fn drop_imag<T: Float + Element>(a: &Array<Complex<T>>, mode: Narrowing) -> VmResult<Array<T>>
where
    Complex<T>: Element,
{
    if a.iter().any(|z| !z.im.is_zero()) {
        match mode {
            Narrowing::Strict => {
                return Err(VmError::domain_error(
                    "complex value with non-zero imaginary part cannot be converted to real",
                ))
            }
            Narrowing::Force => warning::warn_imag_to_real(),
        }
    }
    Ok(a.map(|z| z.re))
}

fn bool_to_f64(a: &Array<bool>) -> Array<f64> {
    a.map(|&b| if b { 1.0 } else { 0.0 })
}

impl Dense {
    fn truth(&self) -> VmResult<Array<bool>> {
        match self {
            Dense::Bool(a) => Ok(a.clone()),
            Dense::Int(m) => Ok(m.truth()),
            Dense::Single(a) => float_truth(a),
            Dense::Double(a) => float_truth(a),
            Dense::FloatComplex(a) => complex_truth(a),
            Dense::Complex(a) => complex_truth(a),
        }
    }

    fn real_f64(&self, mode: Narrowing) -> VmResult<Array<f64>> {
        Ok(match self {
            Dense::Bool(a) => bool_to_f64(a),
            Dense::Int(m) => m.to_f64(),
            Dense::Single(a) => a.map(|&x| x as f64),
            Dense::Double(a) => a.clone(),
            Dense::FloatComplex(a) => drop_imag(a, mode)?.map(|&x| x as f64),
            Dense::Complex(a) => drop_imag(a, mode)?,
        })
    }

    fn real_f32(&self, mode: Narrowing) -> VmResult<Array<f32>> {
        Ok(match self {
            Dense::Single(a) => a.clone(),
            Dense::FloatComplex(a) => drop_imag(a, mode)?,
            other => other.real_f64(mode)?.map(|&x| x as f32),
        })
    }

    fn complex64(&self) -> VmResult<Array<Complex64>> {
        Ok(match self {
            Dense::Complex(a) => a.clone(),
            Dense::FloatComplex(a) => a.map(|z| Complex64::new(z.re as f64, z.im as f64)),
            other => other
                .real_f64(Narrowing::Strict)?
                .map(|&x| Complex64::new(x, 0.0)),
        })
    }

    fn complex32(&self) -> VmResult<Array<Complex32>> {
        Ok(match self {
            Dense::FloatComplex(a) => a.clone(),
            Dense::Complex(a) => a.map(|z| Complex32::new(z.re as f32, z.im as f32)),
            other => other
                .real_f32(Narrowing::Strict)?
                .map(|&x| Complex32::new(x, 0.0)),
        })
    }

    /// Move to `rank`, narrowing per `mode`
    pub(crate) fn to_rank(&self, rank: NumericRank, mode: Narrowing) -> VmResult<Dense> {
        Ok(match rank {
            NumericRank::Bool => Dense::Bool(self.truth()?),
            NumericRank::Integer(class) => Dense::Int(match self {
                Dense::Int(m) => m.to_class(class),
                other => IntMatrix::from_f64(class, &other.real_f64(mode)?),
            }),
            NumericRank::Single => Dense::Single(self.real_f32(mode)?),
            NumericRank::Double => Dense::Double(self.real_f64(mode)?),
            NumericRank::FloatComplex => Dense::FloatComplex(self.complex32()?),
            NumericRank::Complex => Dense::Complex(self.complex64()?),
        })
    }

    fn numel(&self) -> usize {
        match self {
            Dense::Bool(a) => a.numel(),
            Dense::Int(m) => m.numel(),
            Dense::Single(a) => a.numel(),
            Dense::Double(a) => a.numel(),
            Dense::FloatComplex(a) => a.numel(),
            Dense::Complex(a) => a.numel(),
        }
    }

    /// Shape the payload into the storage `target` describes
    fn into_value(self, target: TypeTag) -> VmResult<Value> {
        if target.is_scalar() && self.numel() != 1 {
            return Err(VmError::domain_error(format!(
                "conversion to {} requires a 1x1 value, got {} elements",
                target,
                self.numel()
            )));
        }
        let not_diagonal = || VmError::domain_error(format!("matrix is not diagonal; cannot convert to {}", target));
        let unexpected = |d: &Dense| VmError::internal(format!("cannot shape {:?} payload as {}", rank_of(d), target));
        Ok(match (target, self) {
            (TypeTag::Bool, Dense::Bool(a)) => Value::Bool(a.as_slice()[0]),
            (TypeTag::BoolMatrix, Dense::Bool(a)) => Value::BoolMatrix(a),
            (TypeTag::SparseBoolMatrix, Dense::Bool(a)) => {
                Value::SparseBoolMatrix(SparseArray::from_dense(&a)?)
            }
            (TypeTag::IntScalar(_), Dense::Int(m)) => {
                Value::IntScalar(m.element(0).ok_or_else(|| unexpected(&Dense::Int(m.clone())))?)
            }
            (TypeTag::IntMatrix(_), Dense::Int(m)) => Value::IntMatrix(m),
            (TypeTag::FloatScalar, Dense::Single(a)) => Value::FloatScalar(a.as_slice()[0]),
            (TypeTag::FloatMatrix, Dense::Single(a)) => Value::FloatMatrix(a),
            (TypeTag::FloatDiagMatrix, Dense::Single(a)) => {
                Value::FloatDiagMatrix(DiagArray2::from_full(&a).ok_or_else(not_diagonal)?)
            }
            (TypeTag::Scalar, Dense::Double(a)) => Value::Scalar(a.as_slice()[0]),
            (TypeTag::Matrix, Dense::Double(a)) => Value::Matrix(a),
            (TypeTag::DiagMatrix, Dense::Double(a)) => {
                Value::DiagMatrix(DiagArray2::from_full(&a).ok_or_else(not_diagonal)?)
            }
            (TypeTag::SparseMatrix, Dense::Double(a)) => {
                Value::SparseMatrix(SparseArray::from_dense(&a)?)
            }
            (TypeTag::FloatComplexScalar, Dense::FloatComplex(a)) => {
                Value::FloatComplex(a.as_slice()[0])
            }
            (TypeTag::FloatComplexMatrix, Dense::FloatComplex(a)) => Value::FloatComplexMatrix(a),
            (TypeTag::FloatComplexDiagMatrix, Dense::FloatComplex(a)) => {
                Value::FloatComplexDiagMatrix(DiagArray2::from_full(&a).ok_or_else(not_diagonal)?)
            }
            (TypeTag::ComplexScalar, Dense::Complex(a)) => Value::Complex(a.as_slice()[0]),
            (TypeTag::ComplexMatrix, Dense::Complex(a)) => Value::ComplexMatrix(a),
            (TypeTag::ComplexDiagMatrix, Dense::Complex(a)) => {
                Value::ComplexDiagMatrix(DiagArray2::from_full(&a).ok_or_else(not_diagonal)?)
            }
            (TypeTag::SparseComplexMatrix, Dense::Complex(a)) => {
                Value::SparseComplexMatrix(SparseArray::from_dense(&a)?)
            }
            (_, other) => return Err(unexpected(&other)),
        })
    }
}

fn rank_of(d: &Dense) -> NumericRank {
    match d {
        Dense::Bool(_) => NumericRank::Bool,
        Dense::Int(m) => NumericRank::Integer(m.class()),
        Dense::Single(_) => NumericRank::Single,
        Dense::Double(_) => NumericRank::Double,
        Dense::FloatComplex(_) => NumericRank::FloatComplex,
        Dense::Complex(_) => NumericRank::Complex,
    }
}

fn chars_to_f64(a: &Array<char>) -> Array<f64> {
    a.map(|&c| c as u32 as f64)
}

impl Value {
    /// Dense numeric payload, or `None` for cells and structs
    pub(crate) fn to_dense(&self) -> Option<Dense> {
        Some(match self {
            Value::Bool(b) => Dense::Bool(Array::scalar(*b)),
            Value::BoolMatrix(a) => Dense::Bool(a.clone()),
            Value::IntScalar(v) => Dense::Int(v.to_matrix()),
            Value::IntMatrix(m) => Dense::Int(m.clone()),
            Value::Scalar(x) => Dense::Double(Array::scalar(*x)),
            Value::Matrix(a) => Dense::Double(a.clone()),
            Value::FloatScalar(x) => Dense::Single(Array::scalar(*x)),
            Value::FloatMatrix(a) => Dense::Single(a.clone()),
            Value::Complex(z) => Dense::Complex(Array::scalar(*z)),
            Value::ComplexMatrix(a) => Dense::Complex(a.clone()),
            Value::FloatComplex(z) => Dense::FloatComplex(Array::scalar(*z)),
            Value::FloatComplexMatrix(a) => Dense::FloatComplex(a.clone()),
            Value::DiagMatrix(d) => Dense::Double(d.to_full()),
            Value::ComplexDiagMatrix(d) => Dense::Complex(d.to_full()),
            Value::FloatDiagMatrix(d) => Dense::Single(d.to_full()),
            Value::FloatComplexDiagMatrix(d) => Dense::FloatComplex(d.to_full()),
            Value::SparseMatrix(s) => Dense::Double(s.to_dense()),
            Value::SparseComplexMatrix(s) => Dense::Complex(s.to_dense()),
            Value::SparseBoolMatrix(s) => Dense::Bool(s.to_dense()),
            Value::String(a) | Value::SqString(a) => Dense::Double(chars_to_f64(a)),
            Value::NullMatrix | Value::NullString | Value::NullSqString => {
                Dense::Double(Array::empty())
            }
            Value::Struct(_) | Value::Cell(_) => return None,
        })
    }

    /// Convert to `target`, failing on a lossy complex-to-real narrowing
    pub fn convert_to(&self, target: TypeTag) -> VmResult<Value> {
        self.convert_with(target, Narrowing::Strict)
    }

    /// Convert to `target`, dropping imaginary parts with a warning
    pub fn force_convert_to(&self, target: TypeTag) -> VmResult<Value> {
        self.convert_with(target, Narrowing::Force)
    }

    pub fn convert_with(&self, target: TypeTag, mode: Narrowing) -> VmResult<Value> {
        let source = self.tag();
        if source == target {
            return Ok(self.clone());
        }
        let unsupported = || VmError::UnsupportedConversion {
            from: source,
            to: target,
        };
        match target {
            TypeTag::String | TypeTag::SqString => return self.to_char(target, mode),
            TypeTag::Struct
            | TypeTag::Cell
            | TypeTag::NullMatrix
            | TypeTag::NullString
            | TypeTag::NullSqString => return Err(unsupported()),
            _ => {}
        }
        let rank = target.rank().ok_or_else(unsupported)?;
        let dense = self.to_dense().ok_or_else(unsupported)?;
        dense.to_rank(rank, mode)?.into_value(target)
    }

    fn to_char(&self, target: TypeTag, mode: Narrowing) -> VmResult<Value> {
        let chars = match self {
            Value::String(a) | Value::SqString(a) => a.clone(),
            Value::NullMatrix | Value::NullString | Value::NullSqString => {
                return Ok(if target == TypeTag::String {
                    Value::NullString
                } else {
                    Value::NullSqString
                });
            }
            other => {
                let dense = other.to_dense().ok_or(VmError::UnsupportedConversion {
                    from: other.tag(),
                    to: target,
                })?;
                dense.real_f64(mode)?.try_map(|&x| {
                    let code = x.round();
                    if x.is_nan() || code < 0.0 || code > u32::MAX as f64 {
                        return Err(VmError::domain_error(format!(
                            "char: wrong type argument '{}'",
                            x
                        )));
                    }
                    char::from_u32(code as u32).ok_or_else(|| {
                        VmError::domain_error(format!("char: invalid character code {}", code))
                    })
                })?
            }
        };
        Ok(if target == TypeTag::String {
            Value::String(chars)
        } else {
            Value::SqString(chars)
        })
    }

    /// Narrow to the simplest equivalent representation: complex values with
    /// all-zero imaginary parts become real, 1x1 matrices become scalars.
    pub fn maybe_mutate(&self) -> Value {
        fn all_real<T: Float>(zs: &[Complex<T>]) -> bool {
            zs.iter().all(|z| z.im.is_zero())
        }
        let narrowed = match self {
            Value::Complex(z) if z.im == 0.0 => Value::Scalar(z.re),
            Value::FloatComplex(z) if z.im == 0.0 => Value::FloatScalar(z.re),
            Value::ComplexMatrix(a) if all_real(a.as_slice()) => Value::Matrix(a.map(|z| z.re)),
            Value::FloatComplexMatrix(a) if all_real(a.as_slice()) => {
                Value::FloatMatrix(a.map(|z| z.re))
            }
            Value::ComplexDiagMatrix(d) if all_real(d.diagonal()) => {
                Value::DiagMatrix(d.map(|z| z.re))
            }
            Value::FloatComplexDiagMatrix(d) if all_real(d.diagonal()) => {
                Value::FloatDiagMatrix(d.map(|z| z.re))
            }
            Value::SparseComplexMatrix(s) if s.iter().all(|(_, _, z)| z.im == 0.0) => {
                Value::SparseMatrix(s.map_nonzero(|z| z.re))
            }
            other => other.clone(),
        };
        let single = narrowed.numel() == 1;
        match narrowed {
            Value::BoolMatrix(a) if single => Value::Bool(a.as_slice()[0]),
            Value::Matrix(a) if single => Value::Scalar(a.as_slice()[0]),
            Value::FloatMatrix(a) if single => Value::FloatScalar(a.as_slice()[0]),
            Value::ComplexMatrix(a) if single => Value::Complex(a.as_slice()[0]),
            Value::FloatComplexMatrix(a) if single => Value::FloatComplex(a.as_slice()[0]),
            Value::IntMatrix(m) if single => match m.element(0) {
                Some(v) => Value::IntScalar(v),
                None => Value::IntMatrix(m),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntClass;
    use crate::value::IntScalar;
    use crate::warning::WarningCollector;
    use subset_octave_array::Dims;

    #[test]
    fn test_widening_ladder() {
        let b = Value::Bool(true);
        let i = b.convert_to(TypeTag::IntScalar(IntClass::Int16)).unwrap();
        assert_eq!(i, Value::IntScalar(IntScalar::Int16(1)));
        let s = i.convert_to(TypeTag::FloatScalar).unwrap();
        assert_eq!(s, Value::FloatScalar(1.0));
        let d = s.convert_to(TypeTag::Scalar).unwrap();
        let z = d.convert_to(TypeTag::ComplexScalar).unwrap();
        assert_eq!(z, Value::complex(1.0, 0.0));
        // and back down without loss
        assert_eq!(z.convert_to(TypeTag::Bool).unwrap(), b);
    }

    #[test]
    fn test_strict_narrowing_rejects_imaginary() {
        let z = Value::complex(1.0, 2.0);
        let err = z.convert_to(TypeTag::Scalar).unwrap_err();
        assert!(matches!(err, VmError::DomainError(_)));
        assert_eq!(Value::complex(3.0, 0.0).convert_to(TypeTag::Scalar).unwrap(), Value::Scalar(3.0));
    }

    #[test]
    fn test_force_narrowing_warns() {
        WarningCollector::clear();
        let z = Value::complex(1.0, 2.0);
        assert_eq!(z.force_convert_to(TypeTag::Scalar).unwrap(), Value::Scalar(1.0));
        assert!(WarningCollector::contains(WarningId::ImagToReal));
    }

    #[test]
    fn test_nan_to_logical() {
        WarningCollector::clear();
        let err = Value::Scalar(f64::NAN).convert_to(TypeTag::Bool).unwrap_err();
        assert!(matches!(err, VmError::DomainError(_)));
        assert!(WarningCollector::contains(WarningId::NanToLogical));
    }

    #[test]
    fn test_int_rounding_and_saturation() {
        let m = Value::matrix(1, 3, vec![2.5, -300.0, f64::NAN]).unwrap();
        let i = m.convert_to(TypeTag::IntMatrix(IntClass::Int8)).unwrap();
        assert_eq!(
            i,
            Value::IntMatrix(IntMatrix::Int8(Array::row_vector(vec![3, -128, 0])))
        );
    }

    #[test]
    fn test_structured_conversions() {
        let d = Value::DiagMatrix(DiagArray2::from_diagonal(vec![1.0, 2.0]));
        let full = d.convert_to(TypeTag::Matrix).unwrap();
        assert_eq!(full, Value::matrix(2, 2, vec![1.0, 0.0, 0.0, 2.0]).unwrap());
        assert_eq!(full.convert_to(TypeTag::DiagMatrix).unwrap(), d);
        let dense = Value::matrix(2, 2, vec![1.0; 4]).unwrap();
        assert!(matches!(
            dense.convert_to(TypeTag::DiagMatrix),
            Err(VmError::DomainError(_))
        ));
        let sparse = dense.convert_to(TypeTag::SparseMatrix).unwrap();
        assert_eq!(sparse.dims(), Dims::matrix(2, 2));
        assert_eq!(Value::string("A").convert_to(TypeTag::Scalar).unwrap(), Value::Scalar(65.0));
        assert_eq!(
            Value::Scalar(66.0).convert_to(TypeTag::SqString).unwrap(),
            Value::sq_string("B")
        );
    }

    #[test]
    fn test_non_numeric_conversions_unsupported() {
        let cell = Value::Cell(Array::empty());
        assert!(matches!(
            cell.convert_to(TypeTag::Matrix),
            Err(VmError::UnsupportedConversion { .. })
        ));
        assert!(matches!(
            Value::Scalar(1.0).convert_to(TypeTag::Cell),
            Err(VmError::UnsupportedConversion { .. })
        ));
        assert!(Value::matrix(1, 2, vec![1.0, 2.0])
            .unwrap()
            .convert_to(TypeTag::Scalar)
            .is_err());
    }

    #[test]
    fn test_maybe_mutate() {
        let z = Value::ComplexMatrix(Array::row_vector(vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(2.0, 0.0),
        ]));
        assert_eq!(z.maybe_mutate(), Value::matrix(1, 2, vec![1.0, 2.0]).unwrap());
        let one = Value::ComplexMatrix(Array::scalar(Complex64::new(4.0, 0.0)));
        assert_eq!(one.maybe_mutate(), Value::Scalar(4.0));
        let kept = Value::complex(0.0, 1.0);
        assert_eq!(kept.maybe_mutate(), kept);
    }
}
