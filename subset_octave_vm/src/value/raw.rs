//! Read-only element buffers.

use std::slice;

use subset_octave_array::{Complex32, Complex64};

use super::int::{IntMatrix, IntScalar};
use super::Value;

/// Borrowed column-major elements of a dense value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawData<'a> {
    Bool(&'a [bool]),
    Int8(&'a [i8]),
    Int16(&'a [i16]),
    Int32(&'a [i32]),
    Int64(&'a [i64]),
    UInt8(&'a [u8]),
    UInt16(&'a [u16]),
    UInt32(&'a [u32]),
    UInt64(&'a [u64]),
    Single(&'a [f32]),
    Double(&'a [f64]),
    FloatComplex(&'a [Complex32]),
    Complex(&'a [Complex64]),
    Char(&'a [char]),
}

impl RawData<'_> {
    pub fn len(&self) -> usize {
        match self {
            RawData::Bool(s) => s.len(),
            RawData::Int8(s) => s.len(),
            RawData::Int16(s) => s.len(),
            RawData::Int32(s) => s.len(),
            RawData::Int64(s) => s.len(),
            RawData::UInt8(s) => s.len(),
            RawData::UInt16(s) => s.len(),
            RawData::UInt32(s) => s.len(),
            RawData::UInt64(s) => s.len(),
            RawData::Single(s) => s.len(),
            RawData::Double(s) => s.len(),
            RawData::FloatComplex(s) => s.len(),
            RawData::Complex(s) => s.len(),
            RawData::Char(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Value {
    /// Element buffer of a dense value without copying. Diagonal, sparse,
    /// cell, struct and null values have none.
    pub fn raw_data(&self) -> Option<RawData<'_>> {
        Some(match self {
            Value::Bool(b) => RawData::Bool(slice::from_ref(b)),
            Value::BoolMatrix(a) => RawData::Bool(a.as_slice()),
            Value::IntScalar(v) => match v {
                IntScalar::Int8(x) => RawData::Int8(slice::from_ref(x)),
                IntScalar::Int16(x) => RawData::Int16(slice::from_ref(x)),
                IntScalar::Int32(x) => RawData::Int32(slice::from_ref(x)),
                IntScalar::Int64(x) => RawData::Int64(slice::from_ref(x)),
                IntScalar::UInt8(x) => RawData::UInt8(slice::from_ref(x)),
                IntScalar::UInt16(x) => RawData::UInt16(slice::from_ref(x)),
                IntScalar::UInt32(x) => RawData::UInt32(slice::from_ref(x)),
                IntScalar::UInt64(x) => RawData::UInt64(slice::from_ref(x)),
            },
            Value::IntMatrix(m) => match m {
                IntMatrix::Int8(a) => RawData::Int8(a.as_slice()),
                IntMatrix::Int16(a) => RawData::Int16(a.as_slice()),
                IntMatrix::Int32(a) => RawData::Int32(a.as_slice()),
                IntMatrix::Int64(a) => RawData::Int64(a.as_slice()),
                IntMatrix::UInt8(a) => RawData::UInt8(a.as_slice()),
                IntMatrix::UInt16(a) => RawData::UInt16(a.as_slice()),
                IntMatrix::UInt32(a) => RawData::UInt32(a.as_slice()),
                IntMatrix::UInt64(a) => RawData::UInt64(a.as_slice()),
            },
            Value::Scalar(x) => RawData::Double(slice::from_ref(x)),
            Value::Matrix(a) => RawData::Double(a.as_slice()),
            Value::FloatScalar(x) => RawData::Single(slice::from_ref(x)),
            Value::FloatMatrix(a) => RawData::Single(a.as_slice()),
            Value::Complex(z) => RawData::Complex(slice::from_ref(z)),
            Value::ComplexMatrix(a) => RawData::Complex(a.as_slice()),
            Value::FloatComplex(z) => RawData::FloatComplex(slice::from_ref(z)),
            Value::FloatComplexMatrix(a) => RawData::FloatComplex(a.as_slice()),
            Value::String(a) | Value::SqString(a) => RawData::Char(a.as_slice()),
            _ => return None,
        })
    }
}
