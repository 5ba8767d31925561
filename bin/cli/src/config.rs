//! CLI configuration.
//!
//! Loaded via the `config` crate from an optional `agent-flow.toml` file and
//! `AGENT_FLOW__*` environment variables (e.g.
//! `AGENT_FLOW__EDITOR__GRID__ENABLED=false`). Environment variables win.

use agent_flow_editor::EditorSettings;
use agent_flow_editor::definition::DEFAULT_FLOW_NAME;
use serde::Deserialize;
use std::path::Path;

/// File consulted when no `--config` path is given.
pub const DEFAULT_CONFIG_FILE: &str = "agent-flow.toml";

/// Configuration for the `agent-flow` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Editor settings used when loading and writing flows.
    #[serde(default)]
    pub editor: EditorSettings,

    /// Name given to flows created by `init` without `--name`.
    #[serde(default = "default_flow_name")]
    pub default_flow_name: String,
}

fn default_flow_name() -> String {
    DEFAULT_FLOW_NAME.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            editor: EditorSettings::default(),
            default_flow_name: default_flow_name(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from `path` (or the default file, if present)
    /// and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if any
    /// source has invalid values.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("AGENT_FLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_config_has_correct_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.default_flow_name, "Untitled Flow");
        assert!(config.editor.grid.enabled);
        assert!(config.editor.connections.allow_cycles);
    }

    #[test]
    fn loads_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent-flow.toml");
        std::fs::write(
            &path,
            "default_flow_name = \"Inbox triage\"\n\n[editor.grid]\nenabled = false\n\n[editor.connections]\nallow_parallel = false\n",
        )
        .expect("write config");

        let config = CliConfig::load(Some(&path)).expect("load");
        assert_eq!(config.default_flow_name, "Inbox triage");
        assert!(!config.editor.grid.enabled);
        assert_eq!(config.editor.grid.step, 15.0);
        assert!(!config.editor.connections.allow_parallel);
        assert!(config.editor.connections.allow_cycles);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(CliConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
