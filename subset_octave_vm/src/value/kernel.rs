//! Typed access to value payloads for operator kernels.

use num_traits::Float;
use subset_octave_array::{broadcast, Arith, Array, Complex, Complex32, Complex64, Element};

use super::convert::nan_to_logical;
use super::int::IntPayload;
use super::Value;
use crate::error::VmResult;
use crate::types::{NumericRank, TypeTag};

/// Borrowed operand: a bare scalar or a dense array
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a, T> {
    Scalar(T),
    Matrix(&'a Array<T>),
}

/// Owned kernel result, shaped like its inputs
#[derive(Debug, Clone)]
pub enum Shaped<T> {
    Scalar(T),
    Matrix(Array<T>),
}

impl<T: Element + Copy> Operand<'_, T> {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Operand::Scalar(_))
    }

    /// Dense array view; scalars become 1x1
    pub fn to_array(&self) -> Array<T> {
        match self {
            Operand::Scalar(x) => Array::scalar(*x),
            Operand::Matrix(a) => (*a).clone(),
        }
    }

    /// Apply `f` elementwise, keeping the operand's shape
    pub fn map<U: Element, F: FnMut(T) -> U>(&self, mut f: F) -> Shaped<U> {
        match self {
            Operand::Scalar(x) => Shaped::Scalar(f(*x)),
            Operand::Matrix(a) => Shaped::Matrix(a.map(|&x| f(x))),
        }
    }

    /// Fallible elementwise map
    pub fn try_map<U, E, F>(&self, mut f: F) -> Result<Shaped<U>, E>
    where
        U: Element,
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(match self {
            Operand::Scalar(x) => Shaped::Scalar(f(*x)?),
            Operand::Matrix(a) => Shaped::Matrix(a.try_map(|&x| f(x))?),
        })
    }

    pub fn any<F: FnMut(T) -> bool>(&self, mut f: F) -> bool {
        match self {
            Operand::Scalar(x) => f(*x),
            Operand::Matrix(a) => a.iter().any(|&x| f(x)),
        }
    }

    /// The single element of a scalar or 1x1 operand
    pub fn single(&self) -> Option<T> {
        match self {
            Operand::Scalar(x) => Some(*x),
            Operand::Matrix(a) if a.numel() == 1 => Some(a.as_slice()[0]),
            Operand::Matrix(_) => None,
        }
    }
}

impl<T> Shaped<T> {
    pub fn as_operand(&self) -> Operand<'_, T>
    where
        T: Copy,
    {
        match self {
            Shaped::Scalar(x) => Operand::Scalar(*x),
            Shaped::Matrix(a) => Operand::Matrix(a),
        }
    }
}

/// Combine two operands elementwise with broadcasting. Two scalars give a
/// scalar; anything else gives a matrix.
pub fn zip<A, B, R, F>(
    op: &str,
    a: Operand<'_, A>,
    b: Operand<'_, B>,
    mut f: F,
) -> VmResult<Shaped<R>>
where
    A: Element + Copy,
    B: Element + Copy,
    R: Element,
    F: FnMut(A, B) -> R,
{
    Ok(match (a, b) {
        (Operand::Scalar(x), Operand::Scalar(y)) => Shaped::Scalar(f(x, y)),
        (Operand::Scalar(x), Operand::Matrix(m)) => Shaped::Matrix(m.map(|&y| f(x, y))),
        (Operand::Matrix(m), Operand::Scalar(y)) => Shaped::Matrix(m.map(|&x| f(x, y))),
        (Operand::Matrix(l), Operand::Matrix(r)) => {
            Shaped::Matrix(broadcast::zip_with(l, r, op, |&x, &y| f(x, y))?)
        }
    })
}

/// Numeric element type with a scalar and a matrix `Value` variant
pub trait KernelElement: Arith {
    const RANK: NumericRank;

    fn operand(v: &Value) -> Option<Operand<'_, Self>>;
    fn scalar_value(x: Self) -> Value;
    fn matrix_value(a: Array<Self>) -> Value;

    /// Logical value; NaN is a domain error
    fn truth(self) -> VmResult<bool>;

    fn scalar_tag() -> TypeTag {
        Self::RANK.scalar_tag()
    }

    fn matrix_tag() -> TypeTag {
        Self::RANK.matrix_tag()
    }

    fn wrap(s: Shaped<Self>) -> Value {
        match s {
            Shaped::Scalar(x) => Self::scalar_value(x),
            Shaped::Matrix(a) => Self::matrix_value(a),
        }
    }
}

fn real_truth<T: Float>(x: T) -> VmResult<bool> {
    if x.is_nan() {
        Err(nan_to_logical())
    } else {
        Ok(!x.is_zero())
    }
}

fn complex_truth<T: Float>(z: Complex<T>) -> VmResult<bool> {
    if z.re.is_nan() || z.im.is_nan() {
        Err(nan_to_logical())
    } else {
        Ok(!(z.re.is_zero() && z.im.is_zero()))
    }
}

macro_rules! float_kernel_element {
    ($t:ty, $rank:ident, $scalar:ident, $matrix:ident, $truth:ident) => {
        impl KernelElement for $t {
            const RANK: NumericRank = NumericRank::$rank;

            fn operand(v: &Value) -> Option<Operand<'_, Self>> {
                match v {
                    Value::$scalar(x) => Some(Operand::Scalar(*x)),
                    Value::$matrix(a) => Some(Operand::Matrix(a)),
                    _ => None,
                }
            }

            fn scalar_value(x: Self) -> Value {
                Value::$scalar(x)
            }

            fn matrix_value(a: Array<Self>) -> Value {
                Value::$matrix(a)
            }

            fn truth(self) -> VmResult<bool> {
                $truth(self)
            }
        }
    };
}

float_kernel_element!(f64, Double, Scalar, Matrix, real_truth);
float_kernel_element!(f32, Single, FloatScalar, FloatMatrix, real_truth);
float_kernel_element!(Complex64, Complex, Complex, ComplexMatrix, complex_truth);
float_kernel_element!(Complex32, FloatComplex, FloatComplex, FloatComplexMatrix, complex_truth);

macro_rules! int_kernel_element {
    ($($t:ty => $class:ident),* $(,)?) => {
        $(
            impl KernelElement for $t {
                const RANK: NumericRank = NumericRank::Integer(crate::types::IntClass::$class);

                fn operand(v: &Value) -> Option<Operand<'_, Self>> {
                    match v {
                        Value::IntScalar(s) => <$t>::scalar_payload(s).map(Operand::Scalar),
                        Value::IntMatrix(m) => <$t>::matrix_payload(m).map(Operand::Matrix),
                        _ => None,
                    }
                }

                fn scalar_value(x: Self) -> Value {
                    Value::IntScalar(<$t>::wrap_scalar(x))
                }

                fn matrix_value(a: Array<Self>) -> Value {
                    Value::IntMatrix(<$t>::wrap_matrix(a))
                }

                fn truth(self) -> VmResult<bool> {
                    Ok(self != 0)
                }
            }
        )*
    };
}

int_kernel_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
);

/// Logical operand of a `bool` or `bool matrix` value
pub fn bool_operand(v: &Value) -> Option<Operand<'_, bool>> {
    match v {
        Value::Bool(b) => Some(Operand::Scalar(*b)),
        Value::BoolMatrix(a) => Some(Operand::Matrix(a)),
        _ => None,
    }
}

pub fn wrap_bool(s: Shaped<bool>) -> Value {
    match s {
        Shaped::Scalar(b) => Value::Bool(b),
        Shaped::Matrix(a) => Value::BoolMatrix(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::IntScalar;

    #[test]
    fn test_operand_extraction() {
        let v = Value::Scalar(2.0);
        assert!(matches!(f64::operand(&v), Some(Operand::Scalar(x)) if x == 2.0));
        assert!(f32::operand(&v).is_none());
        let i = Value::IntScalar(IntScalar::UInt8(9));
        assert!(matches!(u8::operand(&i), Some(Operand::Scalar(9))));
        assert!(i8::operand(&i).is_none());
        assert_eq!(u8::scalar_tag(), i.tag());
    }

    #[test]
    fn test_zip_shapes() {
        let m = Array::row_vector(vec![1.0, 2.0, 3.0]);
        let out = zip("operator +", Operand::Matrix(&m), Operand::Scalar(1.0), |a: f64, b| a + b)
            .unwrap();
        assert_eq!(f64::wrap(out), Value::Matrix(Array::row_vector(vec![2.0, 3.0, 4.0])));
        let col = Array::column_vector(vec![1.0, 2.0]);
        let grid = zip("operator +", Operand::Matrix(&m), Operand::Matrix(&col), |a: f64, b| a + b)
            .unwrap();
        assert!(matches!(grid, Shaped::Matrix(ref a) if a.rows() == 2 && a.cols() == 3));
        let bad = Array::row_vector(vec![1.0, 2.0]);
        assert!(zip("operator +", Operand::Matrix(&m), Operand::Matrix(&bad), |a: f64, b| a + b).is_err());
    }

    #[test]
    fn test_truth() {
        assert_eq!(0.5f64.truth().unwrap(), true);
        assert!(f64::NAN.truth().is_err());
        assert_eq!(Complex64::new(0.0, 1.0).truth().unwrap(), true);
        assert_eq!(0u16.truth().unwrap(), false);
    }
}
