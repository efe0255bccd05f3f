//! Configuration for the qubit reuse pipeline.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML, or JSON when the file ends in `.json`)
//! 2. Environment variables (with `QREUSE_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};
use crate::passes::ReuseMode;
use crate::property::CouplingMap;

/// Settings for one reuse compilation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReuseConfig {
    /// Rewrite strategy.
    pub mode: ReuseMode,
    /// Run [`ReuseVerification`](crate::passes::ReuseVerification) after the rewrite.
    pub verify: bool,
    /// Target device, e.g. `linear:5`.
    pub target: Option<String>,
}

impl ReuseConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(source: &str) -> CompileResult<Self> {
        let config: Self =
            serde_yaml_ng::from_str(source).map_err(|e| CompileError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(source: &str) -> CompileResult<Self> {
        let config: Self =
            serde_json::from_str(source).map_err(|e| CompileError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> CompileResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CompileError::Config(format!("{}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Load the file if given, then apply environment overrides.
    pub fn load(config_file: Option<&Path>) -> CompileResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QREUSE_MODE`, `QREUSE_VERIFY` and `QREUSE_TARGET` when set.
    fn merge_env(mut self) -> CompileResult<Self> {
        if let Ok(v) = std::env::var("QREUSE_MODE") {
            self.mode = v.parse()?;
        }
        if let Ok(v) = std::env::var("QREUSE_VERIFY") {
            self.verify = matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("QREUSE_TARGET") {
            self.target = Some(v);
        }
        Ok(self)
    }

    /// Reject settings that cannot be honored.
    pub fn validate(&self) -> CompileResult<()> {
        self.coupling_map().map(|_| ())
    }

    /// The target coupling map, if a target is configured.
    pub fn coupling_map(&self) -> CompileResult<Option<CouplingMap>> {
        self.target.as_deref().map(str::parse::<CouplingMap>).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ReuseConfig::default();
        assert_eq!(config.mode, ReuseMode::Default);
        assert!(!config.verify);
        assert!(config.coupling_map().unwrap().is_none());
    }

    #[test]
    fn test_yaml() {
        let yaml = "mode: dual\nverify: true\ntarget: \"star:4\"\n";
        let config = ReuseConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.mode, ReuseMode::Dual);
        assert!(config.verify);
        assert_eq!(config.coupling_map().unwrap().unwrap().num_qubits(), 4);
    }

    #[test]
    fn test_partial_json() {
        let config = ReuseConfig::from_json_str(r#"{ "mode": "normal" }"#).unwrap();
        assert_eq!(config.mode, ReuseMode::Normal);
        assert!(!config.verify);
    }

    #[test]
    fn test_rejects_unknown_keys_and_targets() {
        assert!(matches!(
            ReuseConfig::from_yaml_str("strategy: dual\n"),
            Err(CompileError::Config(_))
        ));
        assert!(matches!(
            ReuseConfig::from_yaml_str("target: \"ring:3\"\n"),
            Err(CompileError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_file_by_extension() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{ "mode": "dual" }}"#).unwrap();
        assert_eq!(ReuseConfig::from_file(json.path()).unwrap().mode, ReuseMode::Dual);

        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(yaml, "verify: true").unwrap();
        assert!(ReuseConfig::from_file(yaml.path()).unwrap().verify);

        assert!(ReuseConfig::from_file("/nonexistent/reuse.yaml").is_err());
    }
}
