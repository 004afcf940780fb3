//! Operator dispatch.
//!
//! Exact lookup on the operand tags first. On a miss the operands take one
//! step up the promotion ladder and the lookup is retried, until a kernel
//! matches or the ladder runs out. Errors always name the original tags.

use std::borrow::Cow;

use super::promote::{promotion_step, unary_promotion};
use super::registry::{global, OperatorRegistry};
use super::{BinaryOp, UnaryOp};
use crate::error::{VmError, VmResult};
use crate::types::{TypeTag, LADDER_LEN};
use crate::value::Value;

/// Upper bound on promotion steps: one densify plus two per rung
const MAX_STEPS: usize = 2 * LADDER_LEN;

fn promote<'a>(v: Cow<'a, Value>, target: TypeTag) -> VmResult<Cow<'a, Value>> {
    if v.tag() == target {
        Ok(v)
    } else {
        Ok(Cow::Owned(v.convert_to(target)?))
    }
}

impl OperatorRegistry {
    pub fn binary_op(&self, op: BinaryOp, left: &Value, right: &Value) -> VmResult<Value> {
        let (mut l, mut r) = (Cow::Borrowed(left), Cow::Borrowed(right));
        for _ in 0..=MAX_STEPS {
            let (lt, rt) = (l.tag(), r.tag());
            if let Some(kernel) = self.lookup_binary(op, lt, rt) {
                return (kernel.func())(&*l, &*r);
            }
            let Some((nl, nr)) = promotion_step(lt, rt) else {
                break;
            };
            tracing::trace!(%op, from = ?(lt, rt), to = ?(nl, nr), "promote operands");
            l = promote(l, nl)?;
            r = promote(r, nr)?;
        }
        Err(VmError::unsupported_binary(op, left.tag(), right.tag()))
    }

    pub fn unary_op(&self, op: UnaryOp, operand: &Value) -> VmResult<Value> {
        let mut v = Cow::Borrowed(operand);
        for _ in 0..=MAX_STEPS {
            let tag = v.tag();
            if let Some(kernel) = self.lookup_unary(op, tag) {
                return (kernel.func())(&*v);
            }
            let Some(next) = unary_promotion(tag) else {
                break;
            };
            tracing::trace!(%op, from = %tag, to = %next, "promote operand");
            v = promote(v, next)?;
        }
        Err(VmError::unsupported_unary(op, operand.tag()))
    }

    /// Join two values along 0-based `dim`; `[]` operands disappear
    pub fn concat(&self, left: &Value, right: &Value, dim: usize) -> VmResult<Value> {
        if right.tag().is_null() {
            return Ok(left.clone());
        }
        if left.tag().is_null() {
            return Ok(right.clone());
        }
        let (mut l, mut r) = (Cow::Borrowed(left), Cow::Borrowed(right));
        for _ in 0..=MAX_STEPS {
            let (lt, rt) = (l.tag(), r.tag());
            if let Some(kernel) = self.lookup_concat(lt, rt) {
                return (kernel.func())(&*l, &*r, dim);
            }
            let Some((nl, nr)) = promotion_step(lt, rt) else {
                break;
            };
            tracing::trace!(from = ?(lt, rt), to = ?(nl, nr), "promote concatenation operands");
            l = promote(l, nl)?;
            r = promote(r, nr)?;
        }
        Err(VmError::unsupported_concat(left.tag(), right.tag()))
    }

    /// Left fold of `concat`; no values gives `[]`
    pub fn concat_all(&self, values: &[Value], dim: usize) -> VmResult<Value> {
        let Some((first, rest)) = values.split_first() else {
            return Ok(Value::NullMatrix);
        };
        rest.iter()
            .try_fold(first.clone(), |acc, v| self.concat(&acc, v, dim))
    }

    /// `[a, b; c, d]`: each row joined horizontally, then the rows vertically
    pub fn matrix_literal(&self, rows: &[Vec<Value>]) -> VmResult<Value> {
        let joined = rows
            .iter()
            .map(|row| self.concat_all(row, 1))
            .collect::<VmResult<Vec<_>>>()?;
        self.concat_all(&joined, 0)
    }
}

/// Apply a binary operator using the process-wide registry
pub fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> VmResult<Value> {
    global()?.binary_op(op, left, right)
}

/// Apply a unary operator using the process-wide registry
pub fn unary_op(op: UnaryOp, operand: &Value) -> VmResult<Value> {
    global()?.unary_op(op, operand)
}

pub fn concat(left: &Value, right: &Value, dim: usize) -> VmResult<Value> {
    global()?.concat(left, right, dim)
}

pub fn concat_all(values: &[Value], dim: usize) -> VmResult<Value> {
    global()?.concat_all(values, dim)
}

pub fn matrix_literal(rows: &[Vec<Value>]) -> VmResult<Value> {
    global()?.matrix_literal(rows)
}
