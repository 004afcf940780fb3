//! Runtime values.
//!
//! `Value` is a closed tagged union over every runtime representation. Each
//! variant owns one storage object (or a bare scalar), and `tag()` reports
//! the `TypeTag` the operator registry is keyed by. Values are immutable:
//! conversions and operators always produce a new `Value`, while storage
//! buffers are shared until a kernel writes to them.

mod convert;
mod int;
mod kernel;
mod raw;

pub(crate) use convert::nan_to_logical;
pub use convert::Narrowing;
pub(crate) use int::{int_build, int_dispatch};
pub use int::{IntMatrix, IntPayload, IntScalar};
pub use kernel::{bool_operand, wrap_bool, zip, KernelElement, Operand, Shaped};
pub use raw::RawData;

use subset_octave_array::{
    Array, Complex32, Complex64, DiagArray2, Dims, Element, SparseArray,
};

use crate::error::{VmError, VmResult};
use crate::types::TypeTag;

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    BoolMatrix(Array<bool>),
    IntScalar(IntScalar),
    IntMatrix(IntMatrix),
    Scalar(f64),
    Matrix(Array<f64>),
    FloatScalar(f32),
    FloatMatrix(Array<f32>),
    Complex(Complex64),
    ComplexMatrix(Array<Complex64>),
    FloatComplex(Complex32),
    FloatComplexMatrix(Array<Complex32>),
    DiagMatrix(DiagArray2<f64>),
    ComplexDiagMatrix(DiagArray2<Complex64>),
    FloatDiagMatrix(DiagArray2<f32>),
    FloatComplexDiagMatrix(DiagArray2<Complex32>),
    SparseMatrix(SparseArray<f64>),
    SparseComplexMatrix(SparseArray<Complex64>),
    SparseBoolMatrix(SparseArray<bool>),
    /// Double-quoted character array
    String(Array<char>),
    /// Single-quoted character array
    SqString(Array<char>),
    Struct(StructValue),
    Cell(Array<Value>),
    /// `[]`
    NullMatrix,
    /// `""`
    NullString,
    /// `''`
    NullSqString,
}

/// Cells grow with empty matrices
impl Element for Value {
    fn zero() -> Self {
        Value::Matrix(Array::empty())
    }
}

/// Scalar struct with ordered fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Set a field, appending it if new
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Value {
    /// Registry key of this value
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::BoolMatrix(_) => TypeTag::BoolMatrix,
            Value::IntScalar(v) => TypeTag::IntScalar(v.class()),
            Value::IntMatrix(m) => TypeTag::IntMatrix(m.class()),
            Value::Scalar(_) => TypeTag::Scalar,
            Value::Matrix(_) => TypeTag::Matrix,
            Value::FloatScalar(_) => TypeTag::FloatScalar,
            Value::FloatMatrix(_) => TypeTag::FloatMatrix,
            Value::Complex(_) => TypeTag::ComplexScalar,
            Value::ComplexMatrix(_) => TypeTag::ComplexMatrix,
            Value::FloatComplex(_) => TypeTag::FloatComplexScalar,
            Value::FloatComplexMatrix(_) => TypeTag::FloatComplexMatrix,
            Value::DiagMatrix(_) => TypeTag::DiagMatrix,
            Value::ComplexDiagMatrix(_) => TypeTag::ComplexDiagMatrix,
            Value::FloatDiagMatrix(_) => TypeTag::FloatDiagMatrix,
            Value::FloatComplexDiagMatrix(_) => TypeTag::FloatComplexDiagMatrix,
            Value::SparseMatrix(_) => TypeTag::SparseMatrix,
            Value::SparseComplexMatrix(_) => TypeTag::SparseComplexMatrix,
            Value::SparseBoolMatrix(_) => TypeTag::SparseBoolMatrix,
            Value::String(_) => TypeTag::String,
            Value::SqString(_) => TypeTag::SqString,
            Value::Struct(_) => TypeTag::Struct,
            Value::Cell(_) => TypeTag::Cell,
            Value::NullMatrix => TypeTag::NullMatrix,
            Value::NullString => TypeTag::NullString,
            Value::NullSqString => TypeTag::NullSqString,
        }
    }

    pub fn dims(&self) -> Dims {
        match self {
            Value::Bool(_)
            | Value::IntScalar(_)
            | Value::Scalar(_)
            | Value::FloatScalar(_)
            | Value::Complex(_)
            | Value::FloatComplex(_)
            | Value::Struct(_) => Dims::scalar(),
            Value::BoolMatrix(a) => a.dims().clone(),
            Value::IntMatrix(m) => m.dims(),
            Value::Matrix(a) => a.dims().clone(),
            Value::FloatMatrix(a) => a.dims().clone(),
            Value::ComplexMatrix(a) => a.dims().clone(),
            Value::FloatComplexMatrix(a) => a.dims().clone(),
            Value::DiagMatrix(d) => d.dims(),
            Value::ComplexDiagMatrix(d) => d.dims(),
            Value::FloatDiagMatrix(d) => d.dims(),
            Value::FloatComplexDiagMatrix(d) => d.dims(),
            Value::SparseMatrix(s) => s.dims(),
            Value::SparseComplexMatrix(s) => s.dims(),
            Value::SparseBoolMatrix(s) => s.dims(),
            Value::String(a) | Value::SqString(a) => a.dims().clone(),
            Value::Cell(a) => a.dims().clone(),
            Value::NullMatrix | Value::NullString | Value::NullSqString => Dims::empty(),
        }
    }

    pub fn numel(&self) -> usize {
        self.dims().numel()
    }

    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Octave class name (`double`, `single`, `logical`, `int8`, `char`, ...)
    pub fn class_name(&self) -> &'static str {
        self.tag().class_name()
    }

    pub fn is_complex(&self) -> bool {
        self.tag().rank().is_some_and(|r| r.is_complex())
    }

    /// Numeric (including logical) and not complex
    pub fn is_real(&self) -> bool {
        self.tag().rank().is_some_and(|r| !r.is_complex())
    }

    pub fn empty_matrix() -> Self {
        Value::Matrix(Array::empty())
    }

    /// Double matrix from column-major data
    pub fn matrix(rows: usize, cols: usize, data: Vec<f64>) -> VmResult<Self> {
        Ok(Value::Matrix(Array::from_vec(Dims::matrix(rows, cols), data)?))
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex(Complex64::new(re, im))
    }

    /// Double-quoted string as a 1xN char row
    pub fn string(s: &str) -> Self {
        if s.is_empty() {
            return Value::NullString;
        }
        Value::String(Array::row_vector(s.chars().collect()))
    }

    /// Single-quoted string as a 1xN char row
    pub fn sq_string(s: &str) -> Self {
        if s.is_empty() {
            return Value::NullSqString;
        }
        Value::SqString(Array::row_vector(s.chars().collect()))
    }

    /// Text of a char row; `None` for other values
    pub fn string_value(&self) -> Option<String> {
        match self {
            Value::String(a) | Value::SqString(a) => Some(a.iter().collect()),
            Value::NullString | Value::NullSqString => Some(String::new()),
            _ => None,
        }
    }

    /// Real scalar as `f64`; fails for non-numeric, complex or non-1x1 values
    pub fn double_value(&self) -> VmResult<f64> {
        match self.convert_to(TypeTag::Scalar)? {
            Value::Scalar(x) => Ok(x),
            other => Err(VmError::internal(format!(
                "conversion to scalar produced {}",
                other.tag()
            ))),
        }
    }

    /// Scalar as complex double
    pub fn complex_value(&self) -> VmResult<Complex64> {
        match self.convert_to(TypeTag::ComplexScalar)? {
            Value::Complex(z) => Ok(z),
            other => Err(VmError::internal(format!(
                "conversion to complex scalar produced {}",
                other.tag()
            ))),
        }
    }

    /// Scalar truth value; NaN is a domain error
    pub fn bool_value(&self) -> VmResult<bool> {
        match self.convert_to(TypeTag::Bool)? {
            Value::Bool(b) => Ok(b),
            other => Err(VmError::internal(format!(
                "conversion to bool produced {}",
                other.tag()
            ))),
        }
    }

    /// Real double array of any numeric or char value
    pub fn matrix_value(&self) -> VmResult<Array<f64>> {
        match self.convert_to(TypeTag::Matrix)? {
            Value::Matrix(a) => Ok(a),
            other => Err(VmError::internal(format!(
                "conversion to matrix produced {}",
                other.tag()
            ))),
        }
    }

    pub fn complex_matrix_value(&self) -> VmResult<Array<Complex64>> {
        match self.convert_to(TypeTag::ComplexMatrix)? {
            Value::ComplexMatrix(a) => Ok(a),
            other => Err(VmError::internal(format!(
                "conversion to complex matrix produced {}",
                other.tag()
            ))),
        }
    }

    /// True for the scalar storage variants (not 1x1 matrices)
    pub fn is_scalar_type(&self) -> bool {
        self.tag().is_scalar()
    }

    /// Cell array from column-major elements
    pub fn cell(rows: usize, cols: usize, items: Vec<Value>) -> VmResult<Self> {
        Ok(Value::Cell(Array::from_vec(Dims::matrix(rows, cols), items)?))
    }

    /// Element `i` (0-based, column-major) as a scalar value
    pub fn element_value(&self, i: usize) -> VmResult<Value> {
        let oob = || {
            VmError::IndexOutOfBounds(format!(
                "index ({}): out of bound {} (dimensions are {})",
                i + 1,
                self.numel(),
                self.dims()
            ))
        };
        if i >= self.numel() {
            return Err(oob());
        }
        Ok(match self {
            Value::Bool(_)
            | Value::IntScalar(_)
            | Value::Scalar(_)
            | Value::FloatScalar(_)
            | Value::Complex(_)
            | Value::FloatComplex(_)
            | Value::Struct(_) => self.clone(),
            Value::BoolMatrix(a) => Value::Bool(*a.linear(i)?),
            Value::IntMatrix(m) => Value::IntScalar(m.element(i).ok_or_else(oob)?),
            Value::Matrix(a) => Value::Scalar(*a.linear(i)?),
            Value::FloatMatrix(a) => Value::FloatScalar(*a.linear(i)?),
            Value::ComplexMatrix(a) => Value::Complex(*a.linear(i)?),
            Value::FloatComplexMatrix(a) => Value::FloatComplex(*a.linear(i)?),
            Value::String(a) => Value::String(Array::scalar(*a.linear(i)?)),
            Value::SqString(a) => Value::SqString(Array::scalar(*a.linear(i)?)),
            Value::Cell(a) => Value::Cell(Array::scalar(a.linear(i)?.clone())),
            _ => {
                let dense = self.tag().dense().ok_or_else(oob)?;
                return self.convert_to(dense)?.element_value(i);
            }
        })
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Complex64> for Value {
    fn from(z: Complex64) -> Self {
        Value::Complex(z)
    }
}

impl From<IntScalar> for Value {
    fn from(v: IntScalar) -> Self {
        Value::IntScalar(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntClass;

    #[test]
    fn test_tags_and_dims() {
        let m = Value::matrix(2, 3, vec![0.0; 6]).unwrap();
        assert_eq!(m.tag(), TypeTag::Matrix);
        assert_eq!(m.dims(), Dims::matrix(2, 3));
        assert_eq!(Value::string("abc").dims(), Dims::matrix(1, 3));
        assert_eq!(Value::string("").tag(), TypeTag::NullString);
        assert_eq!(
            Value::IntScalar(IntScalar::UInt8(3)).tag(),
            TypeTag::IntScalar(IntClass::UInt8)
        );
        assert_eq!(Value::NullMatrix.numel(), 0);
    }

    #[test]
    fn test_class_names() {
        assert_eq!(Value::complex(1.0, 2.0).class_name(), "double");
        assert_eq!(Value::FloatScalar(1.0).class_name(), "single");
        assert_eq!(Value::Bool(true).class_name(), "logical");
        assert_eq!(Value::Cell(Array::empty()).class_name(), "cell");
    }

    #[test]
    fn test_element_value() {
        let d = Value::DiagMatrix(DiagArray2::from_diagonal(vec![4.0, 5.0]));
        assert_eq!(d.element_value(3).unwrap(), Value::Scalar(5.0));
        assert_eq!(d.element_value(1).unwrap(), Value::Scalar(0.0));
        assert!(d.element_value(4).is_err());
        let s = Value::sq_string("hi");
        assert_eq!(s.element_value(1).unwrap().string_value().as_deref(), Some("i"));
    }

    #[test]
    fn test_matrix_accessors() {
        let d = Value::DiagMatrix(DiagArray2::from_diagonal(vec![1.0, 2.0]));
        assert_eq!(d.matrix_value().unwrap().to_vec(), vec![1.0, 0.0, 0.0, 2.0]);
        let z = Value::complex(0.0, 1.0).complex_matrix_value().unwrap();
        assert_eq!(z.numel(), 1);
        assert!(Value::complex(1.0, 1.0).matrix_value().is_err());
        assert!(Value::Scalar(1.0).is_scalar_type());
        assert!(!Value::matrix(1, 1, vec![1.0]).unwrap().is_scalar_type());
        let c = Value::cell(1, 2, vec![Value::Scalar(1.0), Value::string("a")]).unwrap();
        assert_eq!(c.dims(), Dims::matrix(1, 2));
    }

    #[test]
    fn test_struct_fields_keep_order() {
        let mut s = StructValue::new();
        s.set("b", Value::Scalar(1.0));
        s.set("a", Value::Scalar(2.0));
        s.set("b", Value::Scalar(3.0));
        assert_eq!(s.field_names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(s.get("b"), Some(&Value::Scalar(3.0)));
    }
}
