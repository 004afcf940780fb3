// Library code reports through `tracing` and the warning collector.
// The typeinfo binary (bin/) may use eprintln!() for user-facing errors.
#![deny(clippy::print_stderr)]

// Core modules
pub mod config;
pub mod error;
pub mod types;
pub mod value;
pub mod warning;

// Operator registry, kernels and dispatch
pub mod ops;

pub use error::{VmError, VmResult};
pub use ops::{assign_element, binary_op, concat, concat_all, matrix_literal, unary_op};
pub use ops::{BinaryOp, UnaryOp};
pub use types::TypeTag;
pub use value::Value;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use subset_octave_vm::prelude::*;
///
/// let sum = binary_op(BinaryOp::Add, &Value::Scalar(1.0), &Value::Bool(true)).unwrap();
/// assert_eq!(sum, Value::Scalar(2.0));
/// ```
pub mod prelude {
    pub use crate::config::VmConfig;
    pub use crate::error::{VmError, VmResult};
    pub use crate::ops::{
        assign_element, binary_op, concat, concat_all, matrix_literal, unary_op, BinaryOp,
        OperatorRegistry, RegistryBuilder, UnaryOp,
    };
    pub use crate::types::{IntClass, NumericRank, TypeTag};
    pub use crate::value::{IntMatrix, IntScalar, Narrowing, RawData, StructValue, Value};
    pub use crate::warning::{Warning, WarningCollector, WarningId};
}
