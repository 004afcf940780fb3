//! Default operator table.
//!
//! `install_default` is the only place that knows which kernels exist.
//! Each installer loops over the element types it supports; the same
//! generic function instantiated for one type always has the same
//! identity, so installing twice is harmless.

use subset_octave_array::{Complex32, Complex64};

use super::kernels::{arith, concat, linalg, logical, mixed, structured};
use super::registry::RegistryBuilder;
use crate::error::VmResult;
use crate::types::{IntClass, NumericRank, TypeTag};
use crate::value::KernelElement;

/// Install every default kernel and the assignment-conversion table
pub fn install_default(b: &mut RegistryBuilder) -> VmResult<()> {
    install_numeric::<f64>(b)?;
    install_numeric::<f32>(b)?;
    install_numeric::<Complex64>(b)?;
    install_numeric::<Complex32>(b)?;
    linalg::install::<f64>(b)?;
    linalg::install::<f32>(b)?;
    linalg::install::<Complex64>(b)?;
    linalg::install::<Complex32>(b)?;

    install_integer::<i8>(b)?;
    install_integer::<i16>(b)?;
    install_integer::<i32>(b)?;
    install_integer::<i64>(b)?;
    install_integer::<u8>(b)?;
    install_integer::<u16>(b)?;
    install_integer::<u32>(b)?;
    install_integer::<u64>(b)?;

    logical::install(b)?;
    concat::install_non_numeric(b)?;

    structured::install_diag::<f64>(b)?;
    structured::install_diag::<f32>(b)?;
    structured::install_diag::<Complex64>(b)?;
    structured::install_diag::<Complex32>(b)?;
    structured::install_sparse::<f64>(b)?;
    structured::install_sparse::<Complex64>(b)?;

    install_assign_conversions(b)?;
    tracing::debug!("installed default operator table");
    Ok(())
}

fn install_numeric<T: KernelElement>(b: &mut RegistryBuilder) -> VmResult<()> {
    arith::install::<T>(b)?;
    concat::install::<T>(b)
}

fn install_integer<I>(b: &mut RegistryBuilder) -> VmResult<()>
where
    I: KernelElement + subset_octave_array::RealElement + crate::value::IntPayload,
{
    install_numeric::<I>(b)?;
    mixed::install::<I, f64>(b)?;
    mixed::install::<I, f32>(b)?;
    concat::install_int::<I>(b)
}

// =============================================================================
// Assignment conversions
// =============================================================================

/// Scalar value tags of every numeric class, integers included
fn numeric_values() -> Vec<TypeTag> {
    let mut tags = vec![
        TypeTag::Bool,
        TypeTag::Scalar,
        TypeTag::FloatScalar,
        TypeTag::ComplexScalar,
        TypeTag::FloatComplexScalar,
    ];
    tags.extend(IntClass::ALL.iter().map(|&c| TypeTag::IntScalar(c)));
    tags
}

/// Result of storing a `value` element into a full real or complex
/// floating-point container of `rank`, or `None` when Octave rejects it.
///
/// Integer elements turn a real container into that integer class, but a
/// complex container refuses them.
fn float_container_result(rank: NumericRank, value: TypeTag) -> Option<TypeTag> {
    let v = value.rank()?;
    let result = match (rank, v) {
        (_, NumericRank::Integer(_)) if rank.is_complex() => return None,
        (_, NumericRank::Integer(c)) => TypeTag::IntMatrix(c),
        (NumericRank::Double, NumericRank::Bool | NumericRank::Double) => TypeTag::Matrix,
        (NumericRank::Double, NumericRank::Single) => TypeTag::FloatMatrix,
        (NumericRank::Double, NumericRank::Complex) => TypeTag::ComplexMatrix,
        (NumericRank::Single, NumericRank::Bool | NumericRank::Single | NumericRank::Double) => {
            TypeTag::FloatMatrix
        }
        (NumericRank::Single, NumericRank::Complex) => TypeTag::FloatComplexMatrix,
        (NumericRank::Complex, NumericRank::Bool | NumericRank::Double | NumericRank::Complex) => {
            TypeTag::ComplexMatrix
        }
        (NumericRank::Complex, NumericRank::Single) => TypeTag::FloatComplexMatrix,
        (NumericRank::FloatComplex, _) => TypeTag::FloatComplexMatrix,
        (_, NumericRank::FloatComplex) => TypeTag::FloatComplexMatrix,
        _ => return None,
    };
    Some(result)
}

fn install_assign_conversions(b: &mut RegistryBuilder) -> VmResult<()> {
    let values = numeric_values();

    for rank in [
        NumericRank::Double,
        NumericRank::Single,
        NumericRank::Complex,
        NumericRank::FloatComplex,
    ] {
        for &v in &values {
            if let Some(result) = float_container_result(rank, v) {
                if result != rank.matrix_tag() || v != rank.scalar_tag() {
                    b.register_assign_conversion(rank.matrix_tag(), v, result)?;
                }
            }
        }
    }
    // char codes stored as numbers
    for t in [TypeTag::String, TypeTag::SqString] {
        b.register_assign_conversion(TypeTag::Matrix, t, TypeTag::Matrix)?;
        b.register_assign_conversion(TypeTag::FloatMatrix, t, TypeTag::FloatMatrix)?;
        for n in [TypeTag::Scalar, TypeTag::Bool] {
            b.register_assign_conversion(t, n, TypeTag::Matrix)?;
        }
    }

    // integer containers keep their class for any real element
    for c in IntClass::ALL {
        let container = TypeTag::IntMatrix(c);
        for &v in &values {
            let real = v.rank().is_some_and(|r| !r.is_complex());
            if real && v != TypeTag::IntScalar(c) {
                b.register_assign_conversion(container, v, container)?;
            }
        }
    }

    // logical containers become the element's class
    for &v in &values {
        if v != TypeTag::Bool {
            if let Some(rank) = v.rank() {
                b.register_assign_conversion(TypeTag::BoolMatrix, v, rank.matrix_tag())?;
            }
        }
    }

    // `x = []; x(3) = v` takes the class of v
    for null in [TypeTag::NullMatrix, TypeTag::NullString, TypeTag::NullSqString] {
        for &v in &values {
            if let Some(rank) = v.rank() {
                b.register_assign_conversion(null, v, rank.matrix_tag())?;
            }
        }
        for t in [TypeTag::String, TypeTag::SqString, TypeTag::Cell] {
            b.register_assign_conversion(null, t, t)?;
        }
    }

    let sparse = [
        (TypeTag::SparseMatrix, TypeTag::Bool, TypeTag::SparseMatrix),
        (TypeTag::SparseMatrix, TypeTag::ComplexScalar, TypeTag::SparseComplexMatrix),
        (TypeTag::SparseComplexMatrix, TypeTag::Scalar, TypeTag::SparseComplexMatrix),
        (TypeTag::SparseComplexMatrix, TypeTag::Bool, TypeTag::SparseComplexMatrix),
        (TypeTag::SparseBoolMatrix, TypeTag::Scalar, TypeTag::SparseMatrix),
        (TypeTag::SparseBoolMatrix, TypeTag::ComplexScalar, TypeTag::SparseComplexMatrix),
    ];
    for (container, v, result) in sparse {
        b.register_assign_conversion(container, v, result)?;
    }

    // storing into a diagonal matrix makes it full
    for diag in [
        TypeTag::DiagMatrix,
        TypeTag::FloatDiagMatrix,
        TypeTag::ComplexDiagMatrix,
        TypeTag::FloatComplexDiagMatrix,
    ] {
        let Some(rank) = diag.rank() else { continue };
        for &v in &values {
            if let Some(result) = float_container_result(rank, v) {
                b.register_assign_conversion(diag, v, result)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::registry::RegistryBuilder;

    fn table() -> crate::ops::OperatorRegistry {
        let mut b = RegistryBuilder::new();
        install_default(&mut b).unwrap();
        b.build()
    }

    #[test]
    fn test_install_twice_is_harmless() {
        let mut b = RegistryBuilder::new();
        install_default(&mut b).unwrap();
        install_default(&mut b).unwrap();
    }

    #[test]
    fn test_assign_table_is_asymmetric() {
        let reg = table();
        let int8 = IntClass::Int8;
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::Matrix, TypeTag::IntScalar(int8)),
            Some(TypeTag::IntMatrix(int8))
        );
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::IntMatrix(int8), TypeTag::Scalar),
            Some(TypeTag::IntMatrix(int8))
        );
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::ComplexMatrix, TypeTag::IntScalar(int8)),
            None
        );
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::Matrix, TypeTag::ComplexScalar),
            Some(TypeTag::ComplexMatrix)
        );
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::ComplexMatrix, TypeTag::Scalar),
            Some(TypeTag::ComplexMatrix)
        );
    }

    #[test]
    fn test_single_wins_over_double() {
        let reg = table();
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::Matrix, TypeTag::FloatScalar),
            Some(TypeTag::FloatMatrix)
        );
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::FloatMatrix, TypeTag::Scalar),
            Some(TypeTag::FloatMatrix)
        );
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::ComplexMatrix, TypeTag::FloatScalar),
            Some(TypeTag::FloatComplexMatrix)
        );
    }

    #[test]
    fn test_structured_containers() {
        let reg = table();
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::DiagMatrix, TypeTag::Scalar),
            Some(TypeTag::Matrix)
        );
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::SparseBoolMatrix, TypeTag::Scalar),
            Some(TypeTag::SparseMatrix)
        );
        assert_eq!(
            reg.lookup_assign_conversion(TypeTag::NullMatrix, TypeTag::SqString),
            Some(TypeTag::SqString)
        );
    }
}
