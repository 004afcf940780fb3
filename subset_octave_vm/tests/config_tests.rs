//! Loading and applying startup configuration.
//!
//! Warning switches are process-wide, so everything that flips them runs in
//! a single test.

use std::io::Write;

use subset_octave_vm::config::VmConfig;
use subset_octave_vm::ops::{self, BinaryOp};
use subset_octave_vm::warning::{self, WarningCollector, WarningId};
use subset_octave_vm::{Value, VmError};

fn write_config(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn divide_by_zero() {
    ops::binary_op(BinaryOp::Div, &Value::Scalar(1.0), &Value::Scalar(0.0)).unwrap();
}

#[test]
fn test_config_file_switches_warnings() {
    let file = write_config(
        r#"
[warnings]
disabled = ["Octave:divide-by-zero"]
"#,
    );
    let config = VmConfig::from_file(file.path()).unwrap();
    config.apply().unwrap();
    assert!(!warning::is_enabled(WarningId::DivideByZero));
    assert!(warning::is_enabled(WarningId::SingularMatrix));

    WarningCollector::clear();
    divide_by_zero();
    assert_eq!(WarningCollector::count(), 0);

    let all = VmConfig::from_toml_str("[warnings]\ndisabled = [\"all\"]\n").unwrap();
    all.apply().unwrap();
    for id in WarningId::ALL {
        assert!(!warning::is_enabled(id), "{} still enabled", id.as_str());
    }

    VmConfig::default().apply().unwrap();
    divide_by_zero();
    assert!(WarningCollector::contains(WarningId::DivideByZero));
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = VmConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, VmError::Config(_)));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("[warnings]\necho = \"loud\"\n");
    let err = VmConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, VmError::Config(_)));
}

#[test]
fn test_empty_file_gives_defaults() {
    let file = write_config("");
    assert_eq!(VmConfig::from_file(file.path()).unwrap(), VmConfig::default());
}
