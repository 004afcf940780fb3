//! Integer payloads of every width.
//!
//! `IntScalar` and `IntMatrix` carry one variant per `IntClass`. The macros
//! below expand a body once per width so generic code can run on the
//! concrete element type.

use subset_octave_array::{Array, Dims, IntegerElement, RealElement};

use crate::types::IntClass;

/// Integer scalar of any width
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntScalar {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
}

/// Integer array of any width
#[derive(Debug, Clone, PartialEq)]
pub enum IntMatrix {
    Int8(Array<i8>),
    Int16(Array<i16>),
    Int32(Array<i32>),
    Int64(Array<i64>),
    UInt8(Array<u8>),
    UInt16(Array<u16>),
    UInt32(Array<u32>),
    UInt64(Array<u64>),
}

/// Run `$body` with `$v` bound to the payload of any `IntScalar`/`IntMatrix`
/// variant.
macro_rules! int_dispatch {
    ($ty:ident, $value:expr, $v:ident => $body:expr) => {
        match $value {
            $ty::Int8($v) => $body,
            $ty::Int16($v) => $body,
            $ty::Int32($v) => $body,
            $ty::Int64($v) => $body,
            $ty::UInt8($v) => $body,
            $ty::UInt16($v) => $body,
            $ty::UInt32($v) => $body,
            $ty::UInt64($v) => $body,
        }
    };
}

/// Build an `IntScalar`/`IntMatrix` of `$class`, with `$t` aliased to the
/// element type inside `$body`.
macro_rules! int_build {
    ($ty:ident, $class:expr, $t:ident => $body:expr) => {
        match $class {
            $crate::types::IntClass::Int8 => {
                type $t = i8;
                $ty::Int8($body)
            }
            $crate::types::IntClass::Int16 => {
                type $t = i16;
                $ty::Int16($body)
            }
            $crate::types::IntClass::Int32 => {
                type $t = i32;
                $ty::Int32($body)
            }
            $crate::types::IntClass::Int64 => {
                type $t = i64;
                $ty::Int64($body)
            }
            $crate::types::IntClass::UInt8 => {
                type $t = u8;
                $ty::UInt8($body)
            }
            $crate::types::IntClass::UInt16 => {
                type $t = u16;
                $ty::UInt16($body)
            }
            $crate::types::IntClass::UInt32 => {
                type $t = u32;
                $ty::UInt32($body)
            }
            $crate::types::IntClass::UInt64 => {
                type $t = u64;
                $ty::UInt64($body)
            }
        }
    };
}

pub(crate) use int_build;
pub(crate) use int_dispatch;

impl IntScalar {
    pub fn class(&self) -> IntClass {
        match self {
            IntScalar::Int8(_) => IntClass::Int8,
            IntScalar::Int16(_) => IntClass::Int16,
            IntScalar::Int32(_) => IntClass::Int32,
            IntScalar::Int64(_) => IntClass::Int64,
            IntScalar::UInt8(_) => IntClass::UInt8,
            IntScalar::UInt16(_) => IntClass::UInt16,
            IntScalar::UInt32(_) => IntClass::UInt32,
            IntScalar::UInt64(_) => IntClass::UInt64,
        }
    }

    pub fn to_f64(self) -> f64 {
        int_dispatch!(IntScalar, self, v => v.to_f64())
    }

    pub fn to_i128(self) -> i128 {
        int_dispatch!(IntScalar, self, v => v.to_i128())
    }

    /// Round to nearest and saturate; NaN becomes zero
    pub fn from_f64(class: IntClass, x: f64) -> Self {
        int_build!(IntScalar, class, T => T::from_f64(x))
    }

    /// Saturating conversion between widths
    pub fn from_i128(class: IntClass, x: i128) -> Self {
        int_build!(IntScalar, class, T => T::from_i128_saturating(x))
    }

    pub fn to_matrix(self) -> IntMatrix {
        int_dispatch!(IntScalar, self, v => IntMatrix::from_scalar_payload(v))
    }
}

impl IntMatrix {
    fn from_scalar_payload<T: IntPayload>(v: T) -> IntMatrix {
        T::wrap_matrix(Array::scalar(v))
    }

    pub fn class(&self) -> IntClass {
        match self {
            IntMatrix::Int8(_) => IntClass::Int8,
            IntMatrix::Int16(_) => IntClass::Int16,
            IntMatrix::Int32(_) => IntClass::Int32,
            IntMatrix::Int64(_) => IntClass::Int64,
            IntMatrix::UInt8(_) => IntClass::UInt8,
            IntMatrix::UInt16(_) => IntClass::UInt16,
            IntMatrix::UInt32(_) => IntClass::UInt32,
            IntMatrix::UInt64(_) => IntClass::UInt64,
        }
    }

    pub fn dims(&self) -> Dims {
        int_dispatch!(IntMatrix, self, a => a.dims().clone())
    }

    pub fn numel(&self) -> usize {
        int_dispatch!(IntMatrix, self, a => a.numel())
    }

    pub fn to_f64(&self) -> Array<f64> {
        int_dispatch!(IntMatrix, self, a => a.map(|x| x.to_f64()))
    }

    pub fn from_f64(class: IntClass, a: &Array<f64>) -> Self {
        int_build!(IntMatrix, class, T => a.map(|&x| T::from_f64(x)))
    }

    /// Saturating conversion to another width
    pub fn to_class(&self, class: IntClass) -> Self {
        if self.class() == class {
            return self.clone();
        }
        int_dispatch!(IntMatrix, self, a => {
            int_build!(IntMatrix, class, T => a.map(|x| T::from_i128_saturating(x.to_i128())))
        })
    }

    /// Element `i` as a scalar
    pub fn element(&self, i: usize) -> Option<IntScalar> {
        int_dispatch!(IntMatrix, self, a => a.as_slice().get(i).map(|&x| IntPayload::wrap_scalar(x)))
    }

    pub fn truth(&self) -> Array<bool> {
        int_dispatch!(IntMatrix, self, a => a.map(|&x| x.to_i128() != 0))
    }

    pub fn transpose(&self) -> subset_octave_array::ArrayResult<Self> {
        Ok(int_dispatch!(IntMatrix, self, a => IntPayload::wrap_matrix(a.transpose()?)))
    }
}

/// Ties each integer element type to its `IntScalar`/`IntMatrix` variant
pub trait IntPayload: IntegerElement {
    const CLASS: IntClass;
    fn wrap_scalar(x: Self) -> IntScalar;
    fn wrap_matrix(a: Array<Self>) -> IntMatrix;
    fn scalar_payload(v: &IntScalar) -> Option<Self>;
    fn matrix_payload(m: &IntMatrix) -> Option<&Array<Self>>;
}

macro_rules! int_payload {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl IntPayload for $t {
                const CLASS: IntClass = IntClass::$variant;

                fn wrap_scalar(x: Self) -> IntScalar {
                    IntScalar::$variant(x)
                }

                fn wrap_matrix(a: Array<Self>) -> IntMatrix {
                    IntMatrix::$variant(a)
                }

                fn scalar_payload(v: &IntScalar) -> Option<Self> {
                    match v {
                        IntScalar::$variant(x) => Some(*x),
                        _ => None,
                    }
                }

                fn matrix_payload(m: &IntMatrix) -> Option<&Array<Self>> {
                    match m {
                        IntMatrix::$variant(a) => Some(a),
                        _ => None,
                    }
                }
            }
        )*
    };
}

int_payload!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
);
