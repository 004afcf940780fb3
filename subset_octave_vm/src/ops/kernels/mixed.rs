//! Integer by floating-point kernels.
//!
//! Octave computes these in double precision and converts the result back
//! to the integer class, so `int8(100) + 0.6` is `int8(101)` and
//! `int32(7) / 2` is `int32(4)`. Sums, differences and products with an
//! integral double are done in `i128` instead, so 64-bit classes keep every
//! bit: `int64(2^53 + 1) + 0` stays `2^53 + 1`.

use subset_octave_array::{Arith, IntegerElement, RealElement};

use super::mismatch;
use crate::error::{VmError, VmResult};
use crate::ops::registry::RegistryBuilder;
use crate::ops::BinaryOp;
use crate::value::{nan_to_logical, wrap_bool, zip, KernelElement, Operand, Shaped, Value};
use crate::warning;

fn as_f64<I, F>(v: &Value) -> Option<Shaped<f64>>
where
    I: KernelElement + RealElement,
    F: KernelElement + RealElement,
{
    match I::operand(v) {
        Some(o) => Some(o.map(|x| x.to_f64())),
        None => F::operand(v).map(|o| o.map(|x| x.to_f64())),
    }
}

fn to_int<I: KernelElement + RealElement>(s: Shaped<f64>) -> Value {
    I::wrap(match s {
        Shaped::Scalar(x) => Shaped::Scalar(I::from_f64(x)),
        Shaped::Matrix(a) => Shaped::Matrix(a.map(|&x| I::from_f64(x))),
    })
}

/// Integral doubles below this magnitude take the exact path
const EXACT_LIMIT: f64 = 1e30;

fn saturated(negative: bool) -> i128 {
    if negative {
        i128::MIN
    } else {
        i128::MAX
    }
}

/// `int op float` (or `float op int` when `!int_first`) for `+`, `-`, `.*`
fn exact<I: IntegerElement>(op: BinaryOp, int: I, float: f64, int_first: bool) -> I {
    if float.fract() != 0.0 || float.abs() > EXACT_LIMIT {
        let x = int.to_f64();
        return I::from_f64(match op {
            BinaryOp::Add => x + float,
            BinaryOp::Sub if int_first => x - float,
            BinaryOp::Sub => float - x,
            _ => x * float,
        });
    }
    let (x, y) = if int_first {
        (int.to_i128(), float as i128)
    } else {
        (float as i128, int.to_i128())
    };
    let wide = match op {
        BinaryOp::Add => x.checked_add(y).unwrap_or_else(|| saturated(x < 0)),
        BinaryOp::Sub => x.checked_sub(y).unwrap_or_else(|| saturated(x < 0)),
        _ => x.checked_mul(y).unwrap_or_else(|| saturated((x < 0) != (y < 0))),
    };
    I::from_i128_saturating(wide)
}

fn exact_arith<I, F>(op: BinaryOp, name: &str, l: &Value, r: &Value) -> Option<VmResult<Value>>
where
    I: KernelElement + IntegerElement,
    F: KernelElement + RealElement,
{
    let shaped = match (I::operand(l), F::operand(r)) {
        (Some(a), Some(b)) => zip(name, a, b, |x: I, y: F| exact(op, x, y.to_f64(), true)),
        _ => {
            let (a, b) = (F::operand(l)?, I::operand(r)?);
            zip(name, a, b, |y: F, x: I| exact(op, x, y.to_f64(), false))
        }
    };
    Some(shaped.map(I::wrap))
}

fn truth(x: f64) -> VmResult<bool> {
    if x.is_nan() {
        Err(nan_to_logical())
    } else {
        Ok(x != 0.0)
    }
}

fn mixed<I, F>(op: BinaryOp, l: &Value, r: &Value) -> VmResult<Value>
where
    I: KernelElement + IntegerElement,
    F: KernelElement + RealElement,
{
    let exact_op = match op {
        BinaryOp::Add => Some("operator +"),
        BinaryOp::Sub => Some("operator -"),
        BinaryOp::ElMul => Some("product"),
        BinaryOp::Mul if l.numel() == 1 || r.numel() == 1 => Some("product"),
        _ => None,
    };
    if let Some(result) = exact_op.and_then(|name| exact_arith::<I, F>(op, name, l, r)) {
        return result;
    }
    let (sa, sb) = match (as_f64::<I, F>(l), as_f64::<I, F>(r)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(mismatch("integer by float", &[l, r])),
    };
    let (a, b) = (sa.as_operand(), sb.as_operand());
    let both_matrices = a.single().is_none() && b.single().is_none();
    let divides_by_zero = |d: &Operand<'_, f64>| {
        if d.any(|x| x == 0.0) {
            warning::warn_divide_by_zero();
        }
    };
    Ok(match op {
        BinaryOp::Add => to_int::<I>(zip("operator +", a, b, |x, y| x + y)?),
        BinaryOp::Sub => to_int::<I>(zip("operator -", a, b, |x, y| x - y)?),
        BinaryOp::ElMul => to_int::<I>(zip("product", a, b, |x, y| x * y)?),
        BinaryOp::Mul if !both_matrices => to_int::<I>(zip("product", a, b, |x, y| x * y)?),
        BinaryOp::ElDiv => {
            divides_by_zero(&b);
            to_int::<I>(zip("quotient", a, b, |x, y| x / y)?)
        }
        BinaryOp::Div if b.single().is_some() => {
            divides_by_zero(&b);
            to_int::<I>(zip("quotient", a, b, |x, y| x / y)?)
        }
        BinaryOp::ElLDiv => {
            divides_by_zero(&a);
            to_int::<I>(zip("quotient", a, b, |x, y| y / x)?)
        }
        BinaryOp::LDiv if a.single().is_some() => {
            divides_by_zero(&a);
            to_int::<I>(zip("quotient", a, b, |x, y| y / x)?)
        }
        BinaryOp::ElPow => to_int::<I>(zip("operator .^", a, b, f64::power)?),
        BinaryOp::Pow if a.single().is_some() && b.single().is_some() => {
            to_int::<I>(zip("operator ^", a, b, f64::power)?)
        }
        BinaryOp::Lt => wrap_bool(zip("mx_el_lt", a, b, |x, y| x < y)?),
        BinaryOp::Le => wrap_bool(zip("mx_el_le", a, b, |x, y| x <= y)?),
        BinaryOp::Gt => wrap_bool(zip("mx_el_gt", a, b, |x, y| x > y)?),
        BinaryOp::Ge => wrap_bool(zip("mx_el_ge", a, b, |x, y| x >= y)?),
        BinaryOp::Eq => wrap_bool(zip("mx_el_eq", a, b, |x, y| x == y)?),
        BinaryOp::Ne => wrap_bool(zip("mx_el_ne", a, b, |x, y| x != y)?),
        BinaryOp::ElAnd | BinaryOp::ElOr => {
            let (ta, tb) = (a.try_map(truth)?, b.try_map(truth)?);
            let (name, f): (&str, fn(bool, bool) -> bool) = if op == BinaryOp::ElAnd {
                ("mx_el_and", |x, y| x && y)
            } else {
                ("mx_el_or", |x, y| x || y)
            };
            wrap_bool(zip(name, ta.as_operand(), tb.as_operand(), f)?)
        }
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::LDiv | BinaryOp::Pow => {
            return Err(VmError::unsupported_binary(op, l.tag(), r.tag()))
        }
    })
}

/// Register `I` by `F` and `F` by `I` for every operator
pub fn install<I, F>(b: &mut RegistryBuilder) -> VmResult<()>
where
    I: KernelElement + IntegerElement,
    F: KernelElement + RealElement,
{
    let ints = [I::scalar_tag(), I::matrix_tag()];
    let floats = [F::scalar_tag(), F::matrix_tag()];
    for op in BinaryOp::ALL {
        let kernel = move |l: &Value, r: &Value| mixed::<I, F>(op, l, r);
        for i in ints {
            for f in floats {
                b.register_binary(op, i, f, kernel)?;
                b.register_binary(op, f, i, kernel)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{IntMatrix, IntScalar};
    use subset_octave_array::Array;

    #[test]
    fn test_result_keeps_integer_class() {
        let i = Value::IntScalar(IntScalar::Int8(100));
        let out = mixed::<i8, f64>(BinaryOp::Add, &i, &Value::Scalar(0.6)).unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::Int8(101)));
        let out = mixed::<i32, f64>(
            BinaryOp::Div,
            &Value::IntScalar(IntScalar::Int32(7)),
            &Value::Scalar(2.0),
        )
        .unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::Int32(4)));
    }

    #[test]
    fn test_reverse_order_and_matrices() {
        let m = Value::IntMatrix(IntMatrix::UInt8(Array::row_vector(vec![1, 2, 250])));
        let out = mixed::<u8, f32>(BinaryOp::Add, &Value::FloatScalar(10.0), &m).unwrap();
        assert_eq!(
            out,
            Value::IntMatrix(IntMatrix::UInt8(Array::row_vector(vec![11, 12, 255])))
        );
        let cmp = mixed::<u8, f32>(BinaryOp::Gt, &m, &Value::FloatScalar(1.5)).unwrap();
        assert_eq!(cmp, Value::BoolMatrix(Array::row_vector(vec![false, true, true])));
    }

    #[test]
    fn test_int64_double_exact() {
        let big = (1i64 << 53) + 1;
        let i = Value::IntScalar(IntScalar::Int64(big));
        let out = mixed::<i64, f64>(BinaryOp::Add, &i, &Value::Scalar(0.0)).unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::Int64(big)));
        let out = mixed::<i64, f64>(BinaryOp::Sub, &Value::Scalar(0.0), &i).unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::Int64(-big)));
        let out = mixed::<i64, f64>(BinaryOp::Mul, &i, &Value::Scalar(-1.0)).unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::Int64(-big)));

        let top = Value::IntScalar(IntScalar::UInt64(u64::MAX));
        let out = mixed::<u64, f64>(BinaryOp::Sub, &top, &Value::Scalar(1.0)).unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::UInt64(u64::MAX - 1)));
        let out = mixed::<u64, f64>(BinaryOp::ElMul, &top, &Value::Scalar(1e20)).unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::UInt64(u64::MAX)));
    }

    #[test]
    fn test_fractional_and_nan_doubles_round() {
        let i = Value::IntScalar(IntScalar::Int64(10));
        let out = mixed::<i64, f64>(BinaryOp::Mul, &i, &Value::Scalar(0.25)).unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::Int64(3)));
        let out = mixed::<i64, f64>(BinaryOp::Add, &i, &Value::Scalar(f64::NAN)).unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::Int64(0)));
        let out = mixed::<i64, f64>(BinaryOp::Add, &i, &Value::Scalar(f64::NEG_INFINITY)).unwrap();
        assert_eq!(out, Value::IntScalar(IntScalar::Int64(i64::MIN)));
    }

    #[test]
    fn test_matrix_product_unsupported() {
        let m = Value::IntMatrix(IntMatrix::Int16(Array::row_vector(vec![1, 2])));
        let d = Value::matrix(2, 1, vec![1.0, 1.0]).unwrap();
        let err = mixed::<i16, f64>(BinaryOp::Mul, &m, &d).unwrap_err();
        assert_eq!(
            err.to_string(),
            "binary operator '*' not implemented for 'int16 matrix' by 'matrix' operations"
        );
    }
}
