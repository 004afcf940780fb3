//! Default operator table contents and the messages users see when a
//! lookup fails.

mod common;

use std::collections::HashSet;

use common::row;
use subset_octave_vm::ops::{self, BinaryOp, OperatorRegistry, UnaryOp};
use subset_octave_vm::types::TypeTag;
use subset_octave_vm::value::StructValue;
use subset_octave_vm::Value;

#[test]
fn test_type_names_are_unique_and_resolvable() {
    let registry = ops::global().unwrap();
    let names = registry.type_names();
    assert_eq!(names.len(), 40);
    let unique: HashSet<_> = names.iter().collect();
    assert_eq!(unique.len(), names.len());
    for name in names {
        let tag = TypeTag::from_name(name).unwrap();
        assert_eq!(tag.name(), name);
    }
}

#[test]
fn test_dump_serializes_sorted_table() {
    let registry = OperatorRegistry::with_defaults().unwrap();
    let json = serde_json::to_value(registry.dump()).unwrap();

    assert_eq!(json["types"].as_array().unwrap().len(), 40);
    assert_eq!(json["types"][0], "bool");

    let binary = json["binary"].as_array().unwrap();
    assert!(binary
        .iter()
        .any(|e| e["op"] == "+" && e["left"] == "matrix" && e["right"] == "matrix"));
    let keys: Vec<(String, String, String)> = binary
        .iter()
        .map(|e| {
            (
                e["op"].as_str().unwrap().to_string(),
                e["left"].as_str().unwrap().to_string(),
                e["right"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);

    let assign = json["assign_conversions"].as_array().unwrap();
    assert!(assign.iter().any(|e| e["container"] == "matrix"
        && e["value"] == "complex scalar"
        && e["result"] == "complex matrix"));
    assert!(!assign
        .iter()
        .any(|e| e["container"] == "complex matrix" && e["value"] == "int8 scalar"));
}

#[test]
fn test_every_dense_tag_has_unary_minus() {
    let registry = ops::global().unwrap();
    for tag in TypeTag::ALL.iter().copied().filter(|t| t.is_dense_numeric()) {
        let direct = registry.lookup_unary(UnaryOp::UMinus, tag).is_some();
        let bool_like = matches!(tag, TypeTag::Bool | TypeTag::BoolMatrix);
        assert!(direct || bool_like, "no unary '-' for {}", tag);
    }
}

#[test]
fn test_two_default_registries_agree() {
    let a = OperatorRegistry::with_defaults().unwrap();
    let b = OperatorRegistry::with_defaults().unwrap();
    let a = serde_json::to_string(&a.dump()).unwrap();
    let b = serde_json::to_string(&b.dump()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_global_is_already_initialized() {
    ops::global().unwrap();
    let err = ops::initialize_with(|_| Ok(())).unwrap_err();
    assert!(err.to_string().contains("already initialized"));
}

// ==================== User-visible messages ====================

#[test]
fn test_unsupported_binary_message() {
    let s = Value::Struct(StructValue::new());
    let err = ops::binary_op(BinaryOp::Add, &s, &s).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"binary operator '+' not implemented for 'scalar struct' by 'scalar struct' operations"
    );
}

#[test]
fn test_unsupported_unary_message() {
    let c = Value::cell(1, 1, vec![Value::Scalar(1.0)]).unwrap();
    let err = ops::unary_op(UnaryOp::UMinus, &c).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"unary operator '-' not implemented for 'cell' operations"
    );
}

#[test]
fn test_nonconformant_message() {
    let err = ops::binary_op(BinaryOp::Add, &row(vec![1.0, 2.0]), &row(vec![1.0, 2.0, 3.0]))
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"operator +: nonconformant arguments (op1 is 1x2, op2 is 1x3)"
    );
}

#[test]
fn test_nan_to_logical_message() {
    let err = ops::unary_op(UnaryOp::Not, &Value::Scalar(f64::NAN)).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"logical: NaN can't be converted to logical value"
    );
}

#[test]
fn test_vertical_concat_message() {
    let err = ops::concat(&row(vec![1.0, 2.0]), &Value::Scalar(3.0), 0).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"vertical concatenation operator not implemented for '1x2' by '1x1' dimensions"
    );
}
