//! Kernels for logical values, plus the few unary operators defined on
//! char arrays and cells.
//!
//! Arithmetic on logical values has no kernel here; the dispatcher widens
//! it to double.

use super::mismatch;
use crate::error::VmResult;
use crate::ops::registry::RegistryBuilder;
use crate::ops::{BinaryOp, UnaryOp};
use crate::types::TypeTag;
use crate::value::{bool_operand, wrap_bool, zip, Operand, Value};

const BOOL_TAGS: [TypeTag; 2] = [TypeTag::Bool, TypeTag::BoolMatrix];

fn bool_binary(l: &Value, r: &Value, name: &str, f: fn(bool, bool) -> bool) -> VmResult<Value> {
    match (bool_operand(l), bool_operand(r)) {
        (Some(a), Some(b)) => Ok(wrap_bool(zip(name, a, b, f)?)),
        _ => Err(mismatch("bool", &[l, r])),
    }
}

fn and(l: &Value, r: &Value) -> VmResult<Value> {
    bool_binary(l, r, "mx_el_and", |x, y| x && y)
}

fn or(l: &Value, r: &Value) -> VmResult<Value> {
    bool_binary(l, r, "mx_el_or", |x, y| x || y)
}

fn eq(l: &Value, r: &Value) -> VmResult<Value> {
    bool_binary(l, r, "mx_el_eq", |x, y| x == y)
}

fn ne(l: &Value, r: &Value) -> VmResult<Value> {
    bool_binary(l, r, "mx_el_ne", |x, y| x != y)
}

fn not(v: &Value) -> VmResult<Value> {
    let o = bool_operand(v).ok_or_else(|| mismatch("bool", &[v]))?;
    Ok(wrap_bool(o.map(|b| !b)))
}

fn bool_transpose(v: &Value) -> VmResult<Value> {
    match bool_operand(v) {
        Some(Operand::Scalar(b)) => Ok(Value::Bool(b)),
        Some(Operand::Matrix(a)) => Ok(Value::BoolMatrix(a.transpose()?)),
        None => Err(mismatch("bool", &[v])),
    }
}

fn char_transpose(v: &Value) -> VmResult<Value> {
    match v {
        Value::String(a) => Ok(Value::String(a.transpose()?)),
        Value::SqString(a) => Ok(Value::SqString(a.transpose()?)),
        _ => Err(mismatch("char", &[v])),
    }
}

fn cell_transpose(v: &Value) -> VmResult<Value> {
    match v {
        Value::Cell(a) => Ok(Value::Cell(a.transpose()?)),
        _ => Err(mismatch("cell", &[v])),
    }
}

/// Dense result: most entries of the negation are true
fn sparse_bool_not(v: &Value) -> VmResult<Value> {
    match v {
        Value::SparseBoolMatrix(s) => Ok(Value::BoolMatrix(s.to_dense().map(|b| !b))),
        _ => Err(mismatch("sparse bool", &[v])),
    }
}

fn sparse_bool_transpose(v: &Value) -> VmResult<Value> {
    match v {
        Value::SparseBoolMatrix(s) => Ok(Value::SparseBoolMatrix(s.transpose())),
        _ => Err(mismatch("sparse bool", &[v])),
    }
}

pub fn install(b: &mut RegistryBuilder) -> VmResult<()> {
    for l in BOOL_TAGS {
        for r in BOOL_TAGS {
            b.register_binary(BinaryOp::ElAnd, l, r, and)?;
            b.register_binary(BinaryOp::ElOr, l, r, or)?;
            b.register_binary(BinaryOp::Eq, l, r, eq)?;
            b.register_binary(BinaryOp::Ne, l, r, ne)?;
        }
        b.register_unary(UnaryOp::Not, l, not)?;
        b.register_unary(UnaryOp::Transpose, l, bool_transpose)?;
        b.register_unary(UnaryOp::Hermitian, l, bool_transpose)?;
    }
    b.register_unary(UnaryOp::Not, TypeTag::SparseBoolMatrix, sparse_bool_not)?;
    b.register_unary(UnaryOp::Transpose, TypeTag::SparseBoolMatrix, sparse_bool_transpose)?;
    b.register_unary(UnaryOp::Hermitian, TypeTag::SparseBoolMatrix, sparse_bool_transpose)?;
    for t in [TypeTag::String, TypeTag::SqString] {
        b.register_unary(UnaryOp::Transpose, t, char_transpose)?;
        b.register_unary(UnaryOp::Hermitian, t, char_transpose)?;
    }
    b.register_unary(UnaryOp::Transpose, TypeTag::Cell, cell_transpose)?;
    b.register_unary(UnaryOp::Hermitian, TypeTag::Cell, cell_transpose)?;
    Ok(())
}
