//! Concatenation kernels for `[a, b]` and `[a; b]`.
//!
//! `dim` is 0-based: 0 stacks rows, 1 appends columns. Operands of different
//! numeric classes meet on the promotion ladder before reaching a same-type
//! kernel here, except for integers, which absorb floating-point and logical
//! operands the way Octave does (`[int8(1), 2.7]` is `int8([1 3])`).

use subset_octave_array::Array;

use super::{mismatch, operands};
use crate::error::VmResult;
use crate::ops::registry::RegistryBuilder;
use crate::types::TypeTag;
use crate::value::{bool_operand, IntPayload, KernelElement, Value};

const CHAR_TAGS: [TypeTag; 2] = [TypeTag::String, TypeTag::SqString];

fn cat<T: KernelElement>(l: &Value, r: &Value, dim: usize) -> VmResult<Value> {
    let (a, b) = operands::<T>(l, r)?;
    Ok(T::matrix_value(a.to_array().concat(&b.to_array(), dim)?))
}

fn cat_bool(l: &Value, r: &Value, dim: usize) -> VmResult<Value> {
    match (bool_operand(l), bool_operand(r)) {
        (Some(a), Some(b)) => Ok(Value::BoolMatrix(a.to_array().concat(&b.to_array(), dim)?)),
        _ => Err(mismatch("bool concatenation", &[l, r])),
    }
}

fn chars(v: &Value) -> Option<(&Array<char>, bool)> {
    match v {
        Value::String(a) => Some((a, true)),
        Value::SqString(a) => Some((a, false)),
        _ => None,
    }
}

/// Double-quoted wins when the operands disagree
fn cat_char(l: &Value, r: &Value, dim: usize) -> VmResult<Value> {
    let ((a, dq_a), (b, dq_b)) = match (chars(l), chars(r)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(mismatch("char concatenation", &[l, r])),
    };
    let joined = a.concat(b, dim)?;
    Ok(if dq_a || dq_b {
        Value::String(joined)
    } else {
        Value::SqString(joined)
    })
}

/// `['a', 66]` is `'aB'`: the number becomes a character code
fn cat_char_number(l: &Value, r: &Value, dim: usize) -> VmResult<Value> {
    let char_tag = match (l.tag(), r.tag()) {
        (t, _) if t.is_char() => t,
        (_, t) if t.is_char() => t,
        _ => return Err(mismatch("char concatenation", &[l, r])),
    };
    cat_char(&l.convert_to(char_tag)?, &r.convert_to(char_tag)?, dim)
}

fn cat_cell(l: &Value, r: &Value, dim: usize) -> VmResult<Value> {
    match (l, r) {
        (Value::Cell(a), Value::Cell(b)) => Ok(Value::Cell(a.concat(b, dim)?)),
        _ => Err(mismatch("cell concatenation", &[l, r])),
    }
}

fn cat_int<I: KernelElement + IntPayload>(l: &Value, r: &Value, dim: usize) -> VmResult<Value> {
    let target = I::matrix_tag();
    cat::<I>(&l.convert_to(target)?, &r.convert_to(target)?, dim)
}

/// Same-type concatenation for one element type
pub fn install<T: KernelElement>(b: &mut RegistryBuilder) -> VmResult<()> {
    let tags = [T::scalar_tag(), T::matrix_tag()];
    for l in tags {
        for r in tags {
            b.register_concat(l, r, cat::<T>)?;
        }
    }
    Ok(())
}

/// Integer class `I` absorbing double, single and logical operands
pub fn install_int<I: KernelElement + IntPayload>(b: &mut RegistryBuilder) -> VmResult<()> {
    let ints = [I::scalar_tag(), I::matrix_tag()];
    let others = [
        TypeTag::Scalar,
        TypeTag::Matrix,
        TypeTag::FloatScalar,
        TypeTag::FloatMatrix,
        TypeTag::Bool,
        TypeTag::BoolMatrix,
    ];
    for i in ints {
        for o in others {
            b.register_concat(i, o, cat_int::<I>)?;
            b.register_concat(o, i, cat_int::<I>)?;
        }
    }
    Ok(())
}

/// Logical, char and cell concatenation
pub fn install_non_numeric(b: &mut RegistryBuilder) -> VmResult<()> {
    for l in [TypeTag::Bool, TypeTag::BoolMatrix] {
        for r in [TypeTag::Bool, TypeTag::BoolMatrix] {
            b.register_concat(l, r, cat_bool)?;
        }
    }
    for l in CHAR_TAGS {
        for r in CHAR_TAGS {
            b.register_concat(l, r, cat_char)?;
        }
        for n in [TypeTag::Scalar, TypeTag::Matrix] {
            b.register_concat(l, n, cat_char_number)?;
            b.register_concat(n, l, cat_char_number)?;
        }
    }
    b.register_concat(TypeTag::Cell, TypeTag::Cell, cat_cell)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::IntMatrix;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_type_rows_and_columns() {
        let a = Value::matrix(1, 2, vec![1.0, 2.0]).unwrap();
        let h = cat::<f64>(&a, &Value::Scalar(3.0), 1).unwrap();
        assert_eq!(h, Value::matrix(1, 3, vec![1.0, 2.0, 3.0]).unwrap());
        let v = cat::<f64>(&a, &a, 0).unwrap();
        assert_eq!(v, Value::matrix(2, 2, vec![1.0, 1.0, 2.0, 2.0]).unwrap());
        assert!(cat::<f64>(&a, &Value::matrix(1, 3, vec![0.0; 3]).unwrap(), 0).is_err());
    }

    #[test]
    fn test_char_quote_kind() {
        let out = cat_char(&Value::sq_string("ab"), &Value::string("c"), 1).unwrap();
        assert_eq!(out, Value::string("abc"));
        let out = cat_char(&Value::sq_string("ab"), &Value::sq_string("c"), 1).unwrap();
        assert_eq!(out, Value::sq_string("abc"));
    }

    #[test]
    fn test_char_absorbs_numbers() {
        let out = cat_char_number(&Value::sq_string("a"), &Value::Scalar(66.0), 1).unwrap();
        assert_eq!(out.string_value().as_deref(), Some("aB"));
        assert_eq!(out.tag(), TypeTag::SqString);
    }

    #[test]
    fn test_int_absorbs_double() {
        let i = Value::IntMatrix(IntMatrix::Int8(Array::row_vector(vec![1, 2])));
        let out = cat_int::<i8>(&i, &Value::Scalar(2.7), 1).unwrap();
        assert_eq!(
            out,
            Value::IntMatrix(IntMatrix::Int8(Array::row_vector(vec![1, 2, 3])))
        );
    }

    #[test]
    fn test_bool_and_cell() {
        let out = cat_bool(&Value::Bool(true), &Value::Bool(false), 1).unwrap();
        assert_eq!(out, Value::BoolMatrix(Array::row_vector(vec![true, false])));
        let c = Value::Cell(Array::scalar(Value::Scalar(1.0)));
        assert_eq!(cat_cell(&c, &c, 0).unwrap().dims().as_slice(), &[2, 1]);
    }
}
