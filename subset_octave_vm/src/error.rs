//! Interpreter core error types
//!
//! Every fallible operation of the value layer, the registry and the
//! dispatcher returns `VmResult`. Messages follow Octave's wording so the
//! evaluator can show them as-is.

use std::fmt;

use subset_octave_array::ArrayError;
use thiserror::Error;

use crate::types::TypeTag;

/// Which operator family failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Unary,
    Binary,
    Concat,
    Assign,
}

/// Error raised by the value layer, registry or dispatcher
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    /// Negative or otherwise unusable dimension
    #[error("{0}")]
    InvalidDimension(String),

    /// Subscript past the end of an array
    #[error("{0}")]
    IndexOutOfBounds(String),

    /// Operand shapes disagree
    #[error("{0}")]
    Nonconformant(String),

    /// Narrowing conversion or NaN-to-logical conversion
    #[error("{0}")]
    DomainError(String),

    /// No kernel for the operand types, even after promotion
    #[error("{}", render_unsupported(.kind, .op, .left, .right))]
    UnsupportedOperator {
        kind: OperatorKind,
        op: String,
        left: TypeTag,
        right: Option<TypeTag>,
    },

    /// No conversion path between two representations
    #[error("invalid conversion from {from} to {to}")]
    UnsupportedConversion { from: TypeTag, to: TypeTag },

    /// Deleting elements that cannot be deleted
    #[error("{0}")]
    NullAssignment(String),

    /// Two different kernels registered under one key; fatal at startup
    #[error("operator registry conflict for {key}: '{existing}' already registered, refusing '{replacement}'")]
    StartupRegistrationConflict {
        key: String,
        existing: &'static str,
        replacement: &'static str,
    },

    /// Invalid configuration file or environment
    #[error("config error: {0}")]
    Config(String),

    /// Kernel invoked with operands it was not registered for
    #[error("internal error: {0}")]
    Internal(String),
}

fn render_unsupported(
    kind: &OperatorKind,
    op: &str,
    left: &TypeTag,
    right: &Option<TypeTag>,
) -> String {
    match (kind, right) {
        (OperatorKind::Unary, _) | (_, None) => format!(
            "unary operator '{}' not implemented for '{}' operations",
            op, left
        ),
        (OperatorKind::Binary, Some(r)) => format!(
            "binary operator '{}' not implemented for '{}' by '{}' operations",
            op, left, r
        ),
        (OperatorKind::Concat, Some(r)) => format!(
            "concatenation operator not implemented for '{}' by '{}' operations",
            left, r
        ),
        (OperatorKind::Assign, Some(r)) => format!(
            "operator {} undefined for '{}' by '{}' operations",
            op, left, r
        ),
    }
}

impl VmError {
    /// Create a domain error
    pub fn domain_error<S: Into<String>>(msg: S) -> Self {
        VmError::DomainError(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        VmError::Internal(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        VmError::Config(msg.into())
    }

    pub fn unsupported_unary(op: impl fmt::Display, operand: TypeTag) -> Self {
        VmError::UnsupportedOperator {
            kind: OperatorKind::Unary,
            op: op.to_string(),
            left: operand,
            right: None,
        }
    }

    pub fn unsupported_binary(op: impl fmt::Display, left: TypeTag, right: TypeTag) -> Self {
        VmError::UnsupportedOperator {
            kind: OperatorKind::Binary,
            op: op.to_string(),
            left,
            right: Some(right),
        }
    }

    pub fn unsupported_concat(left: TypeTag, right: TypeTag) -> Self {
        VmError::UnsupportedOperator {
            kind: OperatorKind::Concat,
            op: "[]".to_string(),
            left,
            right: Some(right),
        }
    }

    pub fn unsupported_assign(container: TypeTag, value: TypeTag) -> Self {
        VmError::UnsupportedOperator {
            kind: OperatorKind::Assign,
            op: "=".to_string(),
            left: container,
            right: Some(value),
        }
    }

    /// True for the one error that must stop the process before evaluation
    pub fn is_fatal(&self) -> bool {
        matches!(self, VmError::StartupRegistrationConflict { .. })
    }
}

impl From<ArrayError> for VmError {
    fn from(err: ArrayError) -> Self {
        match err {
            ArrayError::IndexOutOfBounds { .. } => VmError::IndexOutOfBounds(err.to_string()),
            ArrayError::NonconformantArguments { .. } | ArrayError::ConcatDimensionMismatch { .. } => {
                VmError::Nonconformant(err.to_string())
            }
            ArrayError::InvalidDimension(msg) => VmError::InvalidDimension(msg),
            ArrayError::NotTwoDimensional(_) | ArrayError::ElementCountMismatch { .. } => {
                VmError::InvalidDimension(err.to_string())
            }
        }
    }
}

/// Result type alias for interpreter core operations
pub type VmResult<T> = Result<T, VmError>;
