use crate::domain::{default_gates, Gate};
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory.
pub const CONFIG_FILE: &str = "release.toml";

/// Represents the complete configuration for a release run.
///
/// Every key is optional; an empty file is equivalent to the defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_release_branch")]
    pub release_branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub messages: MessagesConfig,

    #[serde(default = "default_gates")]
    pub gates: Vec<Gate>,

    #[serde(default)]
    pub publish: PublishConfig,
}

fn default_release_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("Cargo.toml")
}

fn default_required_tools() -> Vec<String> {
    vec!["cargo".to_string()]
}

fn default_commit_message() -> String {
    "chore: release v{version}".to_string()
}

fn default_tag_message() -> String {
    "Release v{version}".to_string()
}

/// Programs that must be on PATH before anything runs.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolsConfig {
    #[serde(default = "default_required_tools")]
    pub required: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            required: default_required_tools(),
        }
    }
}

/// Commit and tag message templates. `{version}` is replaced with the new version.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MessagesConfig {
    #[serde(default = "default_commit_message")]
    pub commit: String,

    #[serde(default = "default_tag_message")]
    pub tag: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        MessagesConfig {
            commit: default_commit_message(),
            tag: default_tag_message(),
        }
    }
}

/// Registry selection. `None` means the default registry (crates.io).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PublishConfig {
    #[serde(default)]
    pub registry: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            release_branch: default_release_branch(),
            remote: default_remote(),
            manifest_path: default_manifest_path(),
            tools: ToolsConfig::default(),
            messages: MessagesConfig::default(),
            gates: default_gates(),
            publish: PublishConfig::default(),
        }
    }
}

impl Config {
    /// Parse a configuration document and validate it.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ReleaseError::config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.release_branch.trim().is_empty() {
            return Err(ReleaseError::config("release_branch must not be empty"));
        }
        if self.remote.trim().is_empty() {
            return Err(ReleaseError::config("remote must not be empty"));
        }

        if self.gates.is_empty() {
            return Err(ReleaseError::config("at least one quality gate must be configured"));
        }

        let mut seen = HashSet::new();
        for gate in &self.gates {
            if gate.name.trim().is_empty() {
                return Err(ReleaseError::config("gate name must not be empty"));
            }
            if gate.command.is_empty() {
                return Err(ReleaseError::config(format!(
                    "gate '{}' has an empty command",
                    gate.name
                )));
            }
            if !seen.insert(gate.name.as_str()) {
                return Err(ReleaseError::config(format!(
                    "gate '{}' is defined more than once",
                    gate.name
                )));
            }
        }

        Ok(())
    }

    /// Resolve `manifest_path` against the repository working directory.
    pub fn resolve_manifest(&mut self, workdir: &Path) {
        if self.manifest_path.is_relative() {
            self.manifest_path = workdir.join(&self.manifest_path);
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in current directory
/// 3. `.release.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| ReleaseError::config(format!("cannot read {}: {}", path, e)))?
    } else if Path::new(CONFIG_FILE).exists() {
        fs::read_to_string(CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    Config::from_toml(&config_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = Config::from_toml("release_branch = \"trunk\"\n").unwrap();
        assert_eq!(config.release_branch, "trunk");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.gates.len(), 4);
        assert_eq!(config.messages.tag, "Release v{version}");
    }

    #[test]
    fn test_custom_gates_replace_defaults() {
        let config = Config::from_toml(
            r#"
[[gates]]
name = "test"
command = ["cargo", "nextest", "run"]
"#,
        )
        .unwrap();
        assert_eq!(config.gates.len(), 1);
        assert_eq!(config.gates[0].command_line(), "cargo nextest run");
    }

    #[test]
    fn test_empty_gate_list_rejected() {
        let err = Config::from_toml("gates = []\n").unwrap_err();
        assert_eq!(err.category(), "ConfigError");
        assert!(err.to_string().contains("at least one quality gate"));
    }

    #[test]
    fn test_empty_gate_command_rejected() {
        let err = Config::from_toml(
            r#"
[[gates]]
name = "lint"
command = []
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty command"));
    }

    #[test]
    fn test_duplicate_gate_rejected() {
        let err = Config::from_toml(
            r#"
[[gates]]
name = "test"
command = ["cargo", "test"]

[[gates]]
name = "test"
command = ["cargo", "test", "--release"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml("release_branch = ").unwrap_err();
        assert_eq!(err.category(), "ConfigError");
    }

    #[test]
    fn test_resolve_manifest() {
        let mut config = Config::default();
        config.resolve_manifest(Path::new("/repo"));
        assert_eq!(config.manifest_path, PathBuf::from("/repo/Cargo.toml"));

        config.manifest_path = PathBuf::from("/elsewhere/Cargo.toml");
        config.resolve_manifest(Path::new("/repo"));
        assert_eq!(config.manifest_path, PathBuf::from("/elsewhere/Cargo.toml"));
    }
}
