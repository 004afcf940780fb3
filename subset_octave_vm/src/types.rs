//! Operand type tags and the numeric promotion ladder.
//!
//! `TypeTag` is the registry key: one tag per concrete runtime representation,
//! named the way Octave's `typeinfo` names them.

use std::fmt;

/// Integer widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntClass {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
}

impl IntClass {
    pub const ALL: [IntClass; 8] = [
        IntClass::Int8,
        IntClass::Int16,
        IntClass::Int32,
        IntClass::Int64,
        IntClass::UInt8,
        IntClass::UInt16,
        IntClass::UInt32,
        IntClass::UInt64,
    ];

    /// Octave class name (`int8`, `uint16`, ...)
    pub fn name(self) -> &'static str {
        match self {
            IntClass::Int8 => "int8",
            IntClass::Int16 => "int16",
            IntClass::Int32 => "int32",
            IntClass::Int64 => "int64",
            IntClass::UInt8 => "uint8",
            IntClass::UInt16 => "uint16",
            IntClass::UInt32 => "uint32",
            IntClass::UInt64 => "uint64",
        }
    }

    fn scalar_name(self) -> &'static str {
        match self {
            IntClass::Int8 => "int8 scalar",
            IntClass::Int16 => "int16 scalar",
            IntClass::Int32 => "int32 scalar",
            IntClass::Int64 => "int64 scalar",
            IntClass::UInt8 => "uint8 scalar",
            IntClass::UInt16 => "uint16 scalar",
            IntClass::UInt32 => "uint32 scalar",
            IntClass::UInt64 => "uint64 scalar",
        }
    }

    fn matrix_name(self) -> &'static str {
        match self {
            IntClass::Int8 => "int8 matrix",
            IntClass::Int16 => "int16 matrix",
            IntClass::Int32 => "int32 matrix",
            IntClass::Int64 => "int64 matrix",
            IntClass::UInt8 => "uint8 matrix",
            IntClass::UInt16 => "uint16 matrix",
            IntClass::UInt32 => "uint32 matrix",
            IntClass::UInt64 => "uint64 matrix",
        }
    }
}

/// Rung on the promotion ladder:
/// bool < integer < single < double < single complex < double complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericRank {
    Bool,
    Integer(IntClass),
    Single,
    Double,
    FloatComplex,
    Complex,
}

/// Number of rungs on the ladder
pub const LADDER_LEN: usize = 6;

impl NumericRank {
    pub fn rung(self) -> usize {
        match self {
            NumericRank::Bool => 0,
            NumericRank::Integer(_) => 1,
            NumericRank::Single => 2,
            NumericRank::Double => 3,
            NumericRank::FloatComplex => 4,
            NumericRank::Complex => 5,
        }
    }

    /// Where two operands of this same rank go when no kernel accepts them.
    ///
    /// Logical and integer values widen to double: the integer rung has no
    /// canonical width to pick, and Octave computes logical arithmetic in
    /// double anyway.
    pub fn next_default(self) -> Option<NumericRank> {
        match self {
            NumericRank::Bool | NumericRank::Integer(_) => Some(NumericRank::Double),
            NumericRank::Single => Some(NumericRank::FloatComplex),
            NumericRank::Double | NumericRank::FloatComplex => Some(NumericRank::Complex),
            NumericRank::Complex => None,
        }
    }

    pub fn is_complex(self) -> bool {
        matches!(self, NumericRank::FloatComplex | NumericRank::Complex)
    }

    pub fn scalar_tag(self) -> TypeTag {
        match self {
            NumericRank::Bool => TypeTag::Bool,
            NumericRank::Integer(c) => TypeTag::IntScalar(c),
            NumericRank::Single => TypeTag::FloatScalar,
            NumericRank::Double => TypeTag::Scalar,
            NumericRank::FloatComplex => TypeTag::FloatComplexScalar,
            NumericRank::Complex => TypeTag::ComplexScalar,
        }
    }

    pub fn matrix_tag(self) -> TypeTag {
        match self {
            NumericRank::Bool => TypeTag::BoolMatrix,
            NumericRank::Integer(c) => TypeTag::IntMatrix(c),
            NumericRank::Single => TypeTag::FloatMatrix,
            NumericRank::Double => TypeTag::Matrix,
            NumericRank::FloatComplex => TypeTag::FloatComplexMatrix,
            NumericRank::Complex => TypeTag::ComplexMatrix,
        }
    }
}

/// Concrete runtime representation of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Bool,
    BoolMatrix,
    IntScalar(IntClass),
    IntMatrix(IntClass),
    Scalar,
    Matrix,
    FloatScalar,
    FloatMatrix,
    ComplexScalar,
    ComplexMatrix,
    FloatComplexScalar,
    FloatComplexMatrix,
    DiagMatrix,
    ComplexDiagMatrix,
    FloatDiagMatrix,
    FloatComplexDiagMatrix,
    SparseMatrix,
    SparseComplexMatrix,
    SparseBoolMatrix,
    String,
    SqString,
    Struct,
    Cell,
    NullMatrix,
    NullString,
    NullSqString,
}

impl TypeTag {
    /// Every tag, in registry dump order
    pub const ALL: [TypeTag; 40] = [
        TypeTag::Bool,
        TypeTag::BoolMatrix,
        TypeTag::IntScalar(IntClass::Int8),
        TypeTag::IntScalar(IntClass::Int16),
        TypeTag::IntScalar(IntClass::Int32),
        TypeTag::IntScalar(IntClass::Int64),
        TypeTag::IntScalar(IntClass::UInt8),
        TypeTag::IntScalar(IntClass::UInt16),
        TypeTag::IntScalar(IntClass::UInt32),
        TypeTag::IntScalar(IntClass::UInt64),
        TypeTag::IntMatrix(IntClass::Int8),
        TypeTag::IntMatrix(IntClass::Int16),
        TypeTag::IntMatrix(IntClass::Int32),
        TypeTag::IntMatrix(IntClass::Int64),
        TypeTag::IntMatrix(IntClass::UInt8),
        TypeTag::IntMatrix(IntClass::UInt16),
        TypeTag::IntMatrix(IntClass::UInt32),
        TypeTag::IntMatrix(IntClass::UInt64),
        TypeTag::Scalar,
        TypeTag::Matrix,
        TypeTag::FloatScalar,
        TypeTag::FloatMatrix,
        TypeTag::ComplexScalar,
        TypeTag::ComplexMatrix,
        TypeTag::FloatComplexScalar,
        TypeTag::FloatComplexMatrix,
        TypeTag::DiagMatrix,
        TypeTag::ComplexDiagMatrix,
        TypeTag::FloatDiagMatrix,
        TypeTag::FloatComplexDiagMatrix,
        TypeTag::SparseMatrix,
        TypeTag::SparseComplexMatrix,
        TypeTag::SparseBoolMatrix,
        TypeTag::String,
        TypeTag::SqString,
        TypeTag::Struct,
        TypeTag::Cell,
        TypeTag::NullMatrix,
        TypeTag::NullString,
        TypeTag::NullSqString,
    ];

    /// Octave `typeinfo` name
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::BoolMatrix => "bool matrix",
            TypeTag::IntScalar(c) => c.scalar_name(),
            TypeTag::IntMatrix(c) => c.matrix_name(),
            TypeTag::Scalar => "scalar",
            TypeTag::Matrix => "matrix",
            TypeTag::FloatScalar => "float scalar",
            TypeTag::FloatMatrix => "float matrix",
            TypeTag::ComplexScalar => "complex scalar",
            TypeTag::ComplexMatrix => "complex matrix",
            TypeTag::FloatComplexScalar => "float complex scalar",
            TypeTag::FloatComplexMatrix => "float complex matrix",
            TypeTag::DiagMatrix => "diagonal matrix",
            TypeTag::ComplexDiagMatrix => "complex diagonal matrix",
            TypeTag::FloatDiagMatrix => "float diagonal matrix",
            TypeTag::FloatComplexDiagMatrix => "float complex diagonal matrix",
            TypeTag::SparseMatrix => "sparse matrix",
            TypeTag::SparseComplexMatrix => "sparse complex matrix",
            TypeTag::SparseBoolMatrix => "sparse bool matrix",
            TypeTag::String => "string",
            TypeTag::SqString => "sq_string",
            TypeTag::Struct => "scalar struct",
            TypeTag::Cell => "cell",
            TypeTag::NullMatrix => "null_matrix",
            TypeTag::NullString => "null_string",
            TypeTag::NullSqString => "null_sq_string",
        }
    }

    /// Look a tag up by its `typeinfo` name
    pub fn from_name(name: &str) -> Option<TypeTag> {
        TypeTag::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Octave class of values with this tag
    pub fn class_name(self) -> &'static str {
        match self {
            TypeTag::Bool | TypeTag::BoolMatrix | TypeTag::SparseBoolMatrix => "logical",
            TypeTag::IntScalar(c) | TypeTag::IntMatrix(c) => c.name(),
            TypeTag::FloatScalar
            | TypeTag::FloatMatrix
            | TypeTag::FloatComplexScalar
            | TypeTag::FloatComplexMatrix
            | TypeTag::FloatDiagMatrix
            | TypeTag::FloatComplexDiagMatrix => "single",
            TypeTag::String | TypeTag::SqString | TypeTag::NullString | TypeTag::NullSqString => {
                "char"
            }
            TypeTag::Struct => "struct",
            TypeTag::Cell => "cell",
            TypeTag::Scalar
            | TypeTag::Matrix
            | TypeTag::ComplexScalar
            | TypeTag::ComplexMatrix
            | TypeTag::DiagMatrix
            | TypeTag::ComplexDiagMatrix
            | TypeTag::SparseMatrix
            | TypeTag::SparseComplexMatrix
            | TypeTag::NullMatrix => "double",
        }
    }

    /// Ladder rank of numeric tags, structured ones included
    pub fn rank(self) -> Option<NumericRank> {
        match self {
            TypeTag::Bool | TypeTag::BoolMatrix | TypeTag::SparseBoolMatrix => {
                Some(NumericRank::Bool)
            }
            TypeTag::IntScalar(c) | TypeTag::IntMatrix(c) => Some(NumericRank::Integer(c)),
            TypeTag::FloatScalar | TypeTag::FloatMatrix | TypeTag::FloatDiagMatrix => {
                Some(NumericRank::Single)
            }
            TypeTag::Scalar | TypeTag::Matrix | TypeTag::DiagMatrix | TypeTag::SparseMatrix => {
                Some(NumericRank::Double)
            }
            TypeTag::FloatComplexScalar
            | TypeTag::FloatComplexMatrix
            | TypeTag::FloatComplexDiagMatrix => Some(NumericRank::FloatComplex),
            TypeTag::ComplexScalar
            | TypeTag::ComplexMatrix
            | TypeTag::ComplexDiagMatrix
            | TypeTag::SparseComplexMatrix => Some(NumericRank::Complex),
            _ => None,
        }
    }

    /// Dense equivalent of a structured tag (diagonal, sparse, char, null).
    /// `None` for tags that are already dense or have no numeric form.
    pub fn dense(self) -> Option<TypeTag> {
        match self {
            TypeTag::DiagMatrix | TypeTag::SparseMatrix => Some(TypeTag::Matrix),
            TypeTag::ComplexDiagMatrix | TypeTag::SparseComplexMatrix => {
                Some(TypeTag::ComplexMatrix)
            }
            TypeTag::FloatDiagMatrix => Some(TypeTag::FloatMatrix),
            TypeTag::FloatComplexDiagMatrix => Some(TypeTag::FloatComplexMatrix),
            TypeTag::SparseBoolMatrix => Some(TypeTag::BoolMatrix),
            TypeTag::String
            | TypeTag::SqString
            | TypeTag::NullMatrix
            | TypeTag::NullString
            | TypeTag::NullSqString => Some(TypeTag::Matrix),
            _ => None,
        }
    }

    /// Dense numeric tag (scalar or full matrix)
    pub fn is_dense_numeric(self) -> bool {
        self.rank().is_some() && self.dense().is_none()
    }

    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            TypeTag::Bool
                | TypeTag::IntScalar(_)
                | TypeTag::Scalar
                | TypeTag::FloatScalar
                | TypeTag::ComplexScalar
                | TypeTag::FloatComplexScalar
        )
    }

    pub fn is_null(self) -> bool {
        matches!(
            self,
            TypeTag::NullMatrix | TypeTag::NullString | TypeTag::NullSqString
        )
    }

    pub fn is_diag(self) -> bool {
        matches!(
            self,
            TypeTag::DiagMatrix
                | TypeTag::ComplexDiagMatrix
                | TypeTag::FloatDiagMatrix
                | TypeTag::FloatComplexDiagMatrix
        )
    }

    pub fn is_sparse(self) -> bool {
        matches!(
            self,
            TypeTag::SparseMatrix | TypeTag::SparseComplexMatrix | TypeTag::SparseBoolMatrix
        )
    }

    pub fn is_char(self) -> bool {
        matches!(self, TypeTag::String | TypeTag::SqString)
    }

    /// The same rank in dense form at the requested shape
    pub fn with_rank(self, rank: NumericRank) -> TypeTag {
        if self.is_scalar() {
            rank.scalar_tag()
        } else {
            rank.matrix_tag()
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
