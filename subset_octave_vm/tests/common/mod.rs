//! Shared helpers for integration tests
// Consumed selectively by the integration test files.
#![allow(dead_code)]

use subset_octave_array::{Array, Complex32, Complex64, Dims};
use subset_octave_vm::types::IntClass;
use subset_octave_vm::value::{IntMatrix, IntScalar};
use subset_octave_vm::Value;

/// Double row vector
pub fn row(data: Vec<f64>) -> Value {
    Value::Matrix(Array::row_vector(data))
}

/// Double matrix from column-major data
pub fn mat(rows: usize, cols: usize, data: Vec<f64>) -> Value {
    Value::matrix(rows, cols, data).unwrap()
}

fn square<T: subset_octave_array::Element>(data: [T; 4]) -> Array<T> {
    Array::from_vec(Dims::matrix(2, 2), data.to_vec()).unwrap()
}

/// One scalar and one non-singular 2x2 matrix for every dense numeric type.
/// Scalars are integral so `matrix ^ scalar` stays defined.
pub fn dense_samples() -> Vec<Value> {
    let mut values = vec![
        Value::Bool(true),
        Value::BoolMatrix(square([true, false, true, true])),
        Value::Scalar(2.0),
        Value::Matrix(square([1.0, 3.0, 2.0, 4.0])),
        Value::FloatScalar(2.0),
        Value::FloatMatrix(square([1.0, 3.0, 2.0, 4.0])),
        Value::Complex(Complex64::new(2.0, 0.0)),
        Value::ComplexMatrix(square([
            Complex64::new(1.0, 1.0),
            Complex64::new(3.0, 0.0),
            Complex64::new(2.0, 0.0),
            Complex64::new(4.0, -1.0),
        ])),
        Value::FloatComplex(Complex32::new(2.0, 0.0)),
        Value::FloatComplexMatrix(square([
            Complex32::new(1.0, 1.0),
            Complex32::new(3.0, 0.0),
            Complex32::new(2.0, 0.0),
            Complex32::new(4.0, -1.0),
        ])),
    ];
    for class in IntClass::ALL {
        values.push(Value::IntScalar(IntScalar::from_f64(class, 2.0)));
        let m = IntMatrix::from_f64(class, &square([1.0, 3.0, 2.0, 4.0]));
        values.push(Value::IntMatrix(m));
    }
    values
}
