//! Same-type numeric kernels: arithmetic, comparison, logical and unary
//! operators for every dense element type.
//!
//! Scalar and matrix operands share one kernel per operator; `zip` handles
//! broadcasting and the scalar cases.

use std::cmp::Ordering;

use subset_octave_array::{marray, Arith};

use super::{check_divisor, mismatch, operand, operands};
use crate::error::VmResult;
use crate::ops::registry::RegistryBuilder;
use crate::ops::{BinaryOp, UnaryOp};
use crate::value::{wrap_bool, zip, KernelElement, Operand, Value};

fn elementwise<T: KernelElement>(
    l: &Value,
    r: &Value,
    name: &str,
    f: fn(T, T) -> T,
) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    Ok(T::wrap(zip(name, a, b, f)?))
}

pub(crate) fn add<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    elementwise::<T>(l, r, "operator +", T::plus)
}

pub(crate) fn sub<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    elementwise::<T>(l, r, "operator -", T::minus)
}

pub(crate) fn el_mul<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    elementwise::<T>(l, r, "product", T::times)
}

pub(crate) fn el_div<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    check_divisor(&b);
    Ok(T::wrap(zip("quotient", a, b, T::divide)?))
}

pub(crate) fn el_ldiv<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    check_divisor(&a);
    Ok(T::wrap(zip("quotient", a, b, |x: T, y: T| y.divide(x))?))
}

pub(crate) fn el_pow<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    elementwise::<T>(l, r, "operator .^", T::power)
}

/// `*`: elementwise when either side is 1x1, matrix product otherwise
pub(crate) fn mul<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    match (a, b) {
        (Operand::Matrix(x), Operand::Matrix(y)) if x.numel() != 1 && y.numel() != 1 => {
            Ok(T::matrix_value(marray::matmul(x, y)?))
        }
        (a, b) => Ok(T::wrap(zip("product", a, b, T::times)?)),
    }
}

/// `/` with a 1x1 divisor
pub(crate) fn div<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (_, b) = operands::<T>(l, r)?;
    if b.single().is_none() {
        return Err(mismatch("scalar division", &[l, r]));
    }
    el_div::<T>(l, r)
}

/// `\` with a 1x1 left operand
pub(crate) fn ldiv<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (a, _) = operands::<T>(l, r)?;
    if a.single().is_none() {
        return Err(mismatch("scalar left division", &[l, r]));
    }
    el_ldiv::<T>(l, r)
}

fn compare<T: KernelElement>(
    l: &Value,
    r: &Value,
    name: &str,
    pred: fn(Option<Ordering>) -> bool,
) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    Ok(wrap_bool(zip(name, a, b, |x: T, y: T| pred(x.octave_cmp(&y)))?))
}

pub(crate) fn lt<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    compare::<T>(l, r, "mx_el_lt", |o| o == Some(Ordering::Less))
}

pub(crate) fn le<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    compare::<T>(l, r, "mx_el_le", |o| matches!(o, Some(Ordering::Less | Ordering::Equal)))
}

pub(crate) fn gt<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    compare::<T>(l, r, "mx_el_gt", |o| o == Some(Ordering::Greater))
}

pub(crate) fn ge<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    compare::<T>(l, r, "mx_el_ge", |o| {
        matches!(o, Some(Ordering::Greater | Ordering::Equal))
    })
}

pub(crate) fn eq<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    Ok(wrap_bool(zip("mx_el_eq", a, b, |x: T, y: T| x == y)?))
}

pub(crate) fn ne<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    Ok(wrap_bool(zip("mx_el_ne", a, b, |x: T, y: T| x != y)?))
}

fn logical<T: KernelElement>(
    l: &Value,
    r: &Value,
    name: &str,
    f: fn(bool, bool) -> bool,
) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    let (ta, tb) = (a.try_map(T::truth)?, b.try_map(T::truth)?);
    Ok(wrap_bool(zip(name, ta.as_operand(), tb.as_operand(), f)?))
}

pub(crate) fn el_and<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    logical::<T>(l, r, "mx_el_and", |x, y| x && y)
}

pub(crate) fn el_or<T: KernelElement>(l: &Value, r: &Value) -> VmResult<Value> {
    logical::<T>(l, r, "mx_el_or", |x, y| x || y)
}

fn not<T: KernelElement>(v: &Value) -> VmResult<Value> {
    let o = operand::<T>(v)?;
    Ok(wrap_bool(o.try_map(|x| x.truth().map(|b| !b))?))
}

fn uplus<T: KernelElement>(v: &Value) -> VmResult<Value> {
    operand::<T>(v)?;
    Ok(v.clone())
}

fn uminus<T: KernelElement>(v: &Value) -> VmResult<Value> {
    Ok(T::wrap(operand::<T>(v)?.map(T::negate)))
}

fn transpose<T: KernelElement>(v: &Value) -> VmResult<Value> {
    Ok(match operand::<T>(v)? {
        Operand::Scalar(x) => T::scalar_value(x),
        Operand::Matrix(a) => T::matrix_value(a.transpose()?),
    })
}

fn hermitian<T: KernelElement>(v: &Value) -> VmResult<Value> {
    Ok(match operand::<T>(v)? {
        Operand::Scalar(x) => T::scalar_value(x.conjugate()),
        Operand::Matrix(a) => T::matrix_value(marray::hermitian(a)?),
    })
}

fn incr<T: KernelElement>(v: &Value) -> VmResult<Value> {
    Ok(T::wrap(operand::<T>(v)?.map(|x| x.plus(T::one()))))
}

fn decr<T: KernelElement>(v: &Value) -> VmResult<Value> {
    Ok(T::wrap(operand::<T>(v)?.map(|x| x.minus(T::one()))))
}

/// Register the same-type kernels of `T` for every scalar/matrix pairing
pub fn install<T: KernelElement>(b: &mut RegistryBuilder) -> VmResult<()> {
    let (s, m) = (T::scalar_tag(), T::matrix_tag());
    for l in [s, m] {
        for r in [s, m] {
            b.register_binary(BinaryOp::Add, l, r, add::<T>)?;
            b.register_binary(BinaryOp::Sub, l, r, sub::<T>)?;
            b.register_binary(BinaryOp::Mul, l, r, mul::<T>)?;
            b.register_binary(BinaryOp::ElMul, l, r, el_mul::<T>)?;
            b.register_binary(BinaryOp::ElDiv, l, r, el_div::<T>)?;
            b.register_binary(BinaryOp::ElLDiv, l, r, el_ldiv::<T>)?;
            b.register_binary(BinaryOp::ElPow, l, r, el_pow::<T>)?;
            b.register_binary(BinaryOp::Lt, l, r, lt::<T>)?;
            b.register_binary(BinaryOp::Le, l, r, le::<T>)?;
            b.register_binary(BinaryOp::Gt, l, r, gt::<T>)?;
            b.register_binary(BinaryOp::Ge, l, r, ge::<T>)?;
            b.register_binary(BinaryOp::Eq, l, r, eq::<T>)?;
            b.register_binary(BinaryOp::Ne, l, r, ne::<T>)?;
            b.register_binary(BinaryOp::ElAnd, l, r, el_and::<T>)?;
            b.register_binary(BinaryOp::ElOr, l, r, el_or::<T>)?;
        }
        b.register_binary(BinaryOp::Div, l, s, div::<T>)?;
        b.register_binary(BinaryOp::LDiv, s, l, ldiv::<T>)?;
    }
    b.register_binary(BinaryOp::Pow, s, s, el_pow::<T>)?;

    for t in [s, m] {
        b.register_unary(UnaryOp::Not, t, not::<T>)?;
        b.register_unary(UnaryOp::UPlus, t, uplus::<T>)?;
        b.register_unary(UnaryOp::UMinus, t, uminus::<T>)?;
        b.register_unary(UnaryOp::Transpose, t, transpose::<T>)?;
        b.register_unary(UnaryOp::Hermitian, t, hermitian::<T>)?;
        b.register_unary(UnaryOp::Incr, t, incr::<T>)?;
        b.register_unary(UnaryOp::Decr, t, decr::<T>)?;
    }
    Ok(())
}
