//! Startup configuration.
//!
//! Only warnings are configurable. A config comes from a TOML file:
//!
//! ```toml
//! [warnings]
//! disabled = ["Octave:divide-by-zero"]
//! echo = true
//! ```
//!
//! or from the environment (`SUBSETOCTAVE_WARNINGS_OFF` is a comma-separated
//! id list, `SUBSETOCTAVE_WARNINGS_ECHO` is `1`/`true`). Nothing takes effect
//! until `apply()`.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{VmError, VmResult};
use crate::warning::{self, WarningId};

/// Disables every warning when listed
pub const ALL_WARNINGS: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarningConfig {
    /// Warning ids to silence, or `"all"`
    pub disabled: Vec<String>,
    /// Mirror warnings onto stderr
    pub echo: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VmConfig {
    pub warnings: WarningConfig,
}

impl VmConfig {
    pub fn from_toml_str(text: &str) -> VmResult<Self> {
        toml::from_str(text).map_err(|e| VmError::config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> VmResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| VmError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn from_env() -> Self {
        Self {
            warnings: WarningConfig {
                disabled: disabled_from_env(),
                echo: echo_from_env(),
            },
        }
    }

    /// Check every warning id, then switch warnings process-wide
    pub fn apply(&self) -> VmResult<()> {
        let mut off = Vec::new();
        for id in &self.warnings.disabled {
            if id == ALL_WARNINGS {
                off.extend(WarningId::ALL);
                continue;
            }
            let known = WarningId::from_id(id)
                .ok_or_else(|| VmError::config(format!("unknown warning id '{}'", id)))?;
            off.push(known);
        }
        for id in WarningId::ALL {
            warning::set_enabled(id, !off.contains(&id));
        }
        warning::set_echo(self.warnings.echo);
        tracing::debug!(disabled = ?off, echo = self.warnings.echo, "applied vm config");
        Ok(())
    }
}

fn disabled_from_env() -> Vec<String> {
    env::var("SUBSETOCTAVE_WARNINGS_OFF")
        .map(|val| parse_id_list(&val))
        .unwrap_or_default()
}

fn echo_from_env() -> bool {
    env::var("SUBSETOCTAVE_WARNINGS_ECHO")
        .map(|val| matches!(val.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let config = VmConfig::from_toml_str(
            r#"
            [warnings]
            disabled = ["Octave:singular-matrix"]
            echo = true
            "#,
        )
        .unwrap();
        assert_eq!(config.warnings.disabled, vec!["Octave:singular-matrix"]);
        assert!(config.warnings.echo);
        assert_eq!(VmConfig::from_toml_str("").unwrap(), VmConfig::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = VmConfig::from_toml_str("[warnings]\nmuted = []\n").unwrap_err();
        assert!(matches!(err, VmError::Config(_)));
    }

    #[test]
    fn test_unknown_id_rejected_by_apply() {
        let config = VmConfig {
            warnings: WarningConfig {
                disabled: vec!["Octave:no-such-warning".to_string()],
                echo: false,
            },
        };
        let err = config.apply().unwrap_err();
        assert_eq!(
            err.to_string(),
            "config error: unknown warning id 'Octave:no-such-warning'"
        );
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(
            parse_id_list(" Octave:divide-by-zero, ,all"),
            vec!["Octave:divide-by-zero", "all"]
        );
    }
}
