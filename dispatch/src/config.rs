//! Dispatcher configuration.
//!
//! Defines the YAML-serializable settings that tell the dispatcher where
//! plugin units live, how to discover them, and how to classify arguments.
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! commands_dir: commands
//! frozen: false
//! plugin_extension: rs
//! package_marker: mod
//! sigil_flips_scope: false
//! context_prefixes: ["/", "?#", "?@", "??"]
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use rcli_core::{ClassifierOptions, DEFAULT_CONTEXT_PREFIXES};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loader::package_name;

/// Settings for a [`Dispatcher`](crate::Dispatcher).
///
/// # Examples
///
/// ```
/// use rcli_dispatch::DispatcherConfig;
///
/// let config: DispatcherConfig = serde_yaml::from_str("frozen: true").unwrap();
/// assert!(config.frozen);
/// assert_eq!(config.commands_dir, "commands");
/// assert_eq!(config.package_name(), "commands");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Directory (filesystem mode) or package path (packaged mode) to load.
    pub commands_dir: String,
    /// Host runs as a packaged executable; selects packaged discovery.
    pub frozen: bool,
    /// Extension of plugin source files, without the dot.
    pub plugin_extension: String,
    /// File stem of package entry points that are not plugins.
    pub package_marker: String,
    /// Whether sigil commands (`@x`, `:x`, `#x`) flip scope to local.
    pub sigil_flips_scope: bool,
    /// Prefixes that mark context tokens.
    pub context_prefixes: Vec<String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            commands_dir: "commands".to_string(),
            frozen: false,
            plugin_extension: "rs".to_string(),
            package_marker: "mod".to_string(),
            sigil_flips_scope: false,
            context_prefixes: DEFAULT_CONTEXT_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl DispatcherConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DispatchError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DispatchError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DispatchError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DispatchError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Dotted package name used in packaged mode.
    pub fn package_name(&self) -> String {
        package_name(&self.commands_dir)
    }

    /// Classifier options derived from this configuration.
    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            context_prefixes: self.context_prefixes.clone(),
            sigil_flips_scope: self.sigil_flips_scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
commands_dir: app/commands
frozen: true
plugin_extension: plugin
package_marker: index
sigil_flips_scope: true
context_prefixes:
  - "/"
  - "+"
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: DispatcherConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.commands_dir, "app/commands");
        assert!(config.frozen);
        assert_eq!(config.plugin_extension, "plugin");
        assert_eq!(config.package_marker, "index");
        assert!(config.sigil_flips_scope);
        assert_eq!(config.context_prefixes, vec!["/", "+"]);
        assert_eq!(config.package_name(), "app.commands");
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: DispatcherConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, DispatcherConfig::default());
        assert!(!config.frozen);
        assert_eq!(config.context_prefixes, vec!["/", "?#", "?@", "??"]);
    }

    #[test]
    fn test_classifier_options() {
        let config: DispatcherConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        let opts = config.classifier_options();
        assert!(opts.sigil_flips_scope);
        assert_eq!(opts.context_prefixes, vec!["/", "+"]);
        assert_eq!(DispatcherConfig::default().classifier_options(), ClassifierOptions::default());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rcli.yml");

        let original: DispatcherConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = DispatcherConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = DispatcherConfig::load("/nonexistent/rcli.yml").unwrap_err();
        assert!(matches!(err, crate::DispatchError::IoError(_)));
    }
}
