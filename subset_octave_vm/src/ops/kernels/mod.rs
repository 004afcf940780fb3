//! Operator kernels, grouped by operand family.
//!
//! Every module exposes an `install` function that registers its kernels.
//! Kernels receive operands whose tags match the registration key and do
//! their own shape and domain checks.

pub mod arith;
pub mod concat;
pub mod linalg;
pub mod logical;
pub mod mixed;
pub mod structured;

use crate::error::{VmError, VmResult};
use crate::value::{KernelElement, Operand, Value};
use crate::warning;

/// Error for a kernel reached with operands it was not registered for
pub(crate) fn mismatch(kernel: &str, values: &[&Value]) -> VmError {
    let tags: Vec<String> = values.iter().map(|v| v.tag().to_string()).collect();
    VmError::internal(format!("{} kernel called with ({})", kernel, tags.join(", ")))
}

pub(crate) fn operand<T: KernelElement>(v: &Value) -> VmResult<Operand<'_, T>> {
    T::operand(v).ok_or_else(|| mismatch(T::matrix_tag().name(), &[v]))
}

pub(crate) fn operands<'a, T: KernelElement>(
    l: &'a Value,
    r: &'a Value,
) -> VmResult<(Operand<'a, T>, Operand<'a, T>)> {
    match (T::operand(l), T::operand(r)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(T::matrix_tag().name(), &[l, r])),
    }
}

/// Warn once per operation when any divisor is an exact zero
pub(crate) fn check_divisor<T: KernelElement>(divisor: &Operand<'_, T>) {
    if divisor.any(|x| x.is_zero()) {
        warning::warn_divide_by_zero();
    }
}
