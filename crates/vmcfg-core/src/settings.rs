//! Resolver settings
//!
//! Settings name the keys the resolver reads from the resolved tree to find
//! target definitions. They are normally left at their defaults and can be
//! overridden from a TOML file:
//!
//! ```toml
//! [targets]
//! namespace = "vm"
//! defined_keys = "__defined_vm_keys"
//! definitions = "__defined_vms"
//! default_name = "default"
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_namespace() -> String {
    "vm".to_string()
}

fn default_defined_keys() -> String {
    "__defined_vm_keys".to_string()
}

fn default_definitions() -> String {
    "__defined_vms".to_string()
}

fn default_name() -> String {
    "default".to_string()
}

/// Where target definitions live in the resolved configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSettings {
    /// Namespace holding target definitions
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Key listing the defined target names, as symbols
    #[serde(default = "default_defined_keys")]
    pub defined_keys: String,

    /// Key mapping target names to their raw definitions
    #[serde(default = "default_definitions")]
    pub definitions: String,

    /// Target name used when none are defined
    #[serde(default = "default_name")]
    pub default_name: String,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            defined_keys: default_defined_keys(),
            definitions: default_definitions(),
            default_name: default_name(),
        }
    }
}

/// Settings for a [`ConfigResolver`](crate::ConfigResolver)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    #[serde(default)]
    pub targets: TargetSettings,
}

impl ResolverSettings {
    /// Parse settings from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use vmcfg_core::ResolverSettings;
    ///
    /// let settings = ResolverSettings::parse(r#"
    /// [targets]
    /// default_name = "primary"
    /// "#).unwrap();
    ///
    /// assert_eq!(settings.targets.default_name, "primary");
    /// assert_eq!(settings.targets.namespace, "vm");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let settings: ResolverSettings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Load settings from a TOML file, using defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            tracing::debug!(?path, "No resolver settings found, using defaults");
            return Ok(Self::default());
        }
        tracing::debug!(?path, "Loading resolver settings");
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_content_uses_defaults() {
        let settings = ResolverSettings::parse("").unwrap();
        assert_eq!(settings, ResolverSettings::default());
        assert_eq!(settings.targets.definitions, "__defined_vms");
    }

    #[test]
    fn test_partial_override() {
        let settings = ResolverSettings::parse(
            r#"
[targets]
namespace = "machines"
"#,
        )
        .unwrap();
        assert_eq!(settings.targets.namespace, "machines");
        assert_eq!(settings.targets.defined_keys, "__defined_vm_keys");
    }

    #[test]
    fn test_invalid_toml_errors() {
        let err = ResolverSettings::parse("[targets\n").unwrap_err();
        assert!(matches!(err, crate::Error::TomlDe(_)));
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = ResolverSettings::load(&temp.path().join("missing.toml")).unwrap();
        assert_eq!(settings, ResolverSettings::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("resolver.toml");
        std::fs::write(&path, "[targets]\ndefault_name = \"main\"\n").unwrap();

        let settings = ResolverSettings::load(&path).unwrap();
        assert_eq!(settings.targets.default_name, "main");
    }
}
