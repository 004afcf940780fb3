//! Indexed element assignment, `A(i) = v`.
//!
//! The element is stored directly when the container's storage type can hold
//! it. Otherwise the assignment-conversion table names the type the
//! container must become; the container is converted, the value is brought
//! to the same class, and the store is retried. Assigning `[]` deletes.

use subset_octave_array::{Array, Dims, Element, SparseArray};

use super::registry::{global, OperatorRegistry};
use crate::error::{VmError, VmResult};
use crate::types::TypeTag;
use crate::value::{int_dispatch, IntMatrix, IntPayload, KernelElement, Operand, Value};

const RESIZE_ERROR: &str =
    "resize: Invalid resizing operation or ambiguous assignment to an out-of-bounds array element";

type StoreFn = fn(&Value, usize, &Value) -> Option<VmResult<Value>>;

const DENSE_STORES: [StoreFn; 12] = [
    store_dense::<f64>,
    store_dense::<f32>,
    store_dense::<subset_octave_array::Complex64>,
    store_dense::<subset_octave_array::Complex32>,
    store_dense::<i8>,
    store_dense::<i16>,
    store_dense::<i32>,
    store_dense::<i64>,
    store_dense::<u8>,
    store_dense::<u16>,
    store_dense::<u32>,
    store_dense::<u64>,
];

/// Shape after storing at linear `index`: vectors and empties grow along
/// their long axis, anything else must already contain the index.
fn grown_dims(dims: &Dims, index: usize) -> VmResult<Option<(usize, usize)>> {
    if index < dims.numel() {
        return Ok(None);
    }
    if dims.ndims() > 2 {
        return Err(VmError::IndexOutOfBounds(RESIZE_ERROR.to_string()));
    }
    let (rows, cols) = (dims.rows(), dims.cols());
    let len = index + 1;
    match (rows, cols) {
        (0, 0) | (1, _) => Ok(Some((1, len))),
        (_, 1) => Ok(Some((len, 1))),
        _ => Err(VmError::IndexOutOfBounds(RESIZE_ERROR.to_string())),
    }
}

fn store<T: Element>(a: &Array<T>, index: usize, x: T) -> VmResult<Array<T>> {
    let mut out = match grown_dims(a.dims(), index)? {
        Some((rows, cols)) => a.resize(&[rows, cols], T::zero()),
        None => a.clone(),
    };
    out.set_linear(index, x)?;
    Ok(out)
}

fn store_dense<T: KernelElement>(c: &Value, index: usize, v: &Value) -> Option<VmResult<Value>> {
    let a = match T::operand(c)? {
        Operand::Matrix(a) => a,
        Operand::Scalar(_) => return None,
    };
    let x = T::operand(v)?.single()?;
    Some(store(a, index, x).map(T::matrix_value))
}

fn store_other(c: &Value, index: usize, v: &Value) -> Option<VmResult<Value>> {
    Some(match (c, v) {
        (Value::BoolMatrix(a), Value::Bool(x)) => store(a, index, *x).map(Value::BoolMatrix),
        (Value::String(a), Value::String(x) | Value::SqString(x))
        | (Value::SqString(a), Value::String(x) | Value::SqString(x))
            if x.numel() == 1 =>
        {
            let ch = *x.linear(0).ok()?;
            store(a, index, ch).map(|out| match c {
                Value::String(_) => Value::String(out),
                _ => Value::SqString(out),
            })
        }
        (Value::Cell(a), Value::Cell(x)) if x.numel() == 1 => {
            let item = x.linear(0).ok()?.clone();
            store(a, index, item).map(Value::Cell)
        }
        (Value::SparseMatrix(s), Value::Scalar(x)) => {
            store_sparse(s, index, *x).map(Value::SparseMatrix)
        }
        (Value::SparseComplexMatrix(s), Value::Complex(z)) => {
            store_sparse(s, index, *z).map(Value::SparseComplexMatrix)
        }
        (Value::SparseBoolMatrix(s), Value::Bool(b)) => {
            store_sparse(s, index, *b).map(Value::SparseBoolMatrix)
        }
        _ => return None,
    })
}

fn store_sparse<T: Element + PartialEq>(
    s: &SparseArray<T>,
    index: usize,
    x: T,
) -> VmResult<SparseArray<T>> {
    let mut out = match grown_dims(&s.dims(), index)? {
        Some((rows, cols)) => s.resize(rows, cols),
        None => s.clone(),
    };
    let rows = out.rows();
    out.set_element(index % rows, index / rows, x)?;
    Ok(out)
}

fn try_store(c: &Value, index: usize, v: &Value) -> Option<VmResult<Value>> {
    DENSE_STORES
        .iter()
        .find_map(|f| f(c, index, v))
        .or_else(|| store_other(c, index, v))
}

/// Empty container of the given type, for assignments into `[]`
fn empty_of(tag: TypeTag) -> VmResult<Value> {
    Ok(match tag {
        TypeTag::String => Value::String(Array::empty()),
        TypeTag::SqString => Value::SqString(Array::empty()),
        TypeTag::Cell => Value::Cell(Array::empty()),
        other => Value::NullMatrix.convert_to(other)?,
    })
}

fn without<T: Element>(a: &Array<T>, index: usize) -> VmResult<Array<T>> {
    if index >= a.numel() {
        return Err(VmError::IndexOutOfBounds(format!(
            "index ({}): out of bound; value {} out of bound {}",
            index + 1,
            index + 1,
            a.numel()
        )));
    }
    let data: Vec<T> = a
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, x)| x.clone())
        .collect();
    let column = a.dims().is_two_dimensional() && a.cols() == 1 && a.rows() > 1;
    Ok(if column {
        Array::column_vector(data)
    } else {
        Array::row_vector(data)
    })
}

fn without_int<T: IntPayload>(a: &Array<T>, index: usize) -> VmResult<IntMatrix> {
    Ok(T::wrap_matrix(without(a, index)?))
}

fn delete_element(container: &Value, index: usize) -> VmResult<Value> {
    Ok(match container {
        Value::BoolMatrix(a) => Value::BoolMatrix(without(a, index)?),
        Value::IntMatrix(m) => Value::IntMatrix(int_dispatch!(IntMatrix, m, a => {
            without_int(a, index)?
        })),
        Value::Matrix(a) => Value::Matrix(without(a, index)?),
        Value::FloatMatrix(a) => Value::FloatMatrix(without(a, index)?),
        Value::ComplexMatrix(a) => Value::ComplexMatrix(without(a, index)?),
        Value::FloatComplexMatrix(a) => Value::FloatComplexMatrix(without(a, index)?),
        Value::String(a) => Value::String(without(a, index)?),
        Value::SqString(a) => Value::SqString(without(a, index)?),
        Value::Cell(a) => Value::Cell(without(a, index)?),
        other => match other.tag().dense() {
            Some(dense) if !other.tag().is_null() => {
                return delete_element(&other.convert_to(dense)?, index)
            }
            _ => {
                return Err(VmError::NullAssignment(format!(
                    "a null assignment can only delete elements of an array, not a {}",
                    other.tag()
                )))
            }
        },
    })
}

/// Matrix form of a scalar container; anything else is returned as is
fn as_container(container: &Value) -> VmResult<Value> {
    let tag = container.tag();
    match tag.rank() {
        Some(rank) if tag.is_scalar() => container.convert_to(rank.matrix_tag()),
        _ => Ok(container.clone()),
    }
}

impl OperatorRegistry {
    /// `container(index + 1) = value` with a 0-based linear `index`
    pub fn assign_element(&self, container: &Value, index: usize, value: &Value) -> VmResult<Value> {
        let container = as_container(container)?;
        if value.tag().is_null() {
            return Ok(delete_element(&container, index)?.maybe_mutate());
        }
        if value.numel() != 1 {
            return Err(VmError::Nonconformant(format!(
                "=: nonconformant arguments (op1 is 1x1, op2 is {})",
                value.dims()
            )));
        }
        let value = value.maybe_mutate();
        let unsupported = || VmError::unsupported_assign(container.tag(), value.tag());

        let container = if container.tag().is_null() {
            let target = self
                .lookup_assign_conversion(container.tag(), value.tag())
                .ok_or_else(unsupported)?;
            empty_of(target)?
        } else {
            container.clone()
        };
        if let Some(stored) = try_store(&container, index, &value) {
            return Ok(stored?.maybe_mutate());
        }

        let target = self
            .lookup_assign_conversion(container.tag(), value.tag())
            .ok_or_else(unsupported)?;
        tracing::trace!(
            container = %container.tag(),
            value = %value.tag(),
            result = %target,
            "assignment conversion"
        );
        let converted = container.convert_to(target)?;
        let element = match target.rank() {
            Some(rank) => value.convert_to(rank.scalar_tag())?,
            None => value.clone(),
        };
        match try_store(&converted, index, &element) {
            Some(stored) => Ok(stored?.maybe_mutate()),
            None => Err(unsupported()),
        }
    }
}

/// `container(index + 1) = value` using the process-wide registry
pub fn assign_element(container: &Value, index: usize, value: &Value) -> VmResult<Value> {
    global()?.assign_element(container, index, value)
}
