// crates/jira-core/src/config.rs - Configuration System
//
// Loads the settings that commands need from `.jira.d` directories.
//
// CONFIGURATION HIERARCHY (highest to lowest priority):
// 1. Command-line arguments (--endpoint, --editor, etc.)
// 2. `<operation>.yml` in each `.jira.d`, closest directory first
// 3. `config.yml` in each `.jira.d`, closest directory first
// 4. Environment variables (JIRA_ENDPOINT, JIRA_USER)
// 5. Built-in defaults
//
// `.jira.d` directories are searched from the working directory up to the
// filesystem root, followed by `~/.jira.d`. A value set by a higher priority
// source is never overwritten by a lower one.
//
// EXAMPLE `~/.jira.d/config.yml`:
// ```yaml
// endpoint: https://jira.example.com
// user: alice
// editor: hx
// ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Name of the per-directory configuration folder
pub const CONFIG_DIR: &str = ".jira.d";

/// Errors that can occur during configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid YAML syntax in {file}: {error}")]
    ParseError { file: String, error: String },

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("I/O error reading config: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Every setting a command may read
///
/// All fields are optional so that partially populated files can be layered;
/// accessors supply the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JiraConfig {
    /// Base URL of the Jira service
    pub endpoint: Option<String>,

    /// Disable TLS certificate verification
    pub insecure: Option<bool>,

    /// Suppress normal status output
    pub quiet: Option<bool>,

    /// Path of a unix-socket proxy to route connections through
    pub unixproxy: Option<String>,

    /// Login name used for authentication
    pub user: Option<String>,

    /// Where the password comes from; only `env` and `prompt` are understood
    pub password_source: Option<String>,

    /// Editor command for interactive commands
    pub editor: Option<String>,

    /// Submit rendered documents without opening an editor
    pub noedit: Option<bool>,

    /// Template overriding the command's default
    pub template: Option<String>,

    /// Default project for `create`
    pub project: Option<String>,

    /// Default issue type for `create`
    pub issuetype: Option<String>,
}

impl JiraConfig {
    /// Fill every unset field from `other`, keeping values already present
    pub fn merge_missing(&mut self, other: JiraConfig) {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }

        fill(&mut self.endpoint, other.endpoint);
        fill(&mut self.insecure, other.insecure);
        fill(&mut self.quiet, other.quiet);
        fill(&mut self.unixproxy, other.unixproxy);
        fill(&mut self.user, other.user);
        fill(&mut self.password_source, other.password_source);
        fill(&mut self.editor, other.editor);
        fill(&mut self.noedit, other.noedit);
        fill(&mut self.template, other.template);
        fill(&mut self.project, other.project);
        fill(&mut self.issuetype, other.issuetype);
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet.unwrap_or(false)
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure.unwrap_or(false)
    }

    pub fn skip_editing(&self) -> bool {
        self.noedit.unwrap_or(false)
    }

    /// Template name, falling back to the command's own
    pub fn template_or(&self, default: &str) -> String {
        self.template.clone().unwrap_or_else(|| default.to_string())
    }

    /// The endpoint with any trailing slash removed
    ///
    /// Network commands cannot run without one, so its absence is a
    /// validation error rather than a default.
    pub fn endpoint(&self) -> ConfigResult<String> {
        let endpoint = self.endpoint.as_deref().map(str::trim).unwrap_or_default();
        if endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "No endpoint configured. Use --endpoint or set `endpoint:` in ~/.jira.d/config.yml"
                    .to_string(),
            ));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid endpoint '{endpoint}'. Must start with http:// or https://"
            )));
        }
        Ok(endpoint.trim_end_matches('/').to_string())
    }

    /// Login name; defaults to the local user name
    pub fn user(&self) -> Option<String> {
        self.user.clone().or_else(|| env::var("USER").ok())
    }
}

/// Configuration discovery and loading
pub struct ConfigManager;

impl ConfigManager {
    /// Load the configuration for `operation` from `dirs`, closest first
    ///
    /// `dirs` normally comes from `config_dirs`. `operation` is the command
    /// name, e.g. `edit`.
    ///
    /// ERROR HANDLING:
    /// - Missing files and directories are not errors
    /// - Invalid YAML is an error naming the file
    pub fn load_from_dirs(operation: &str, dirs: &[PathBuf]) -> ConfigResult<JiraConfig> {
        let mut config = JiraConfig::default();
        let op_file = format!("{operation}.yml");

        for name in [op_file.as_str(), "config.yml"] {
            for dir in dirs {
                if let Some(found) = Self::try_load_file(&dir.join(name))? {
                    config.merge_missing(found);
                }
            }
        }

        Self::apply_env_defaults(&mut config);
        Ok(config)
    }

    /// All `.jira.d` directories that apply to `start_dir`, closest first
    pub fn config_dirs(start_dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = start_dir
            .ancestors()
            .map(|dir| dir.join(CONFIG_DIR))
            .filter(|dir| dir.is_dir())
            .collect();

        if let Some(home) = dirs::home_dir() {
            let global = home.join(CONFIG_DIR);
            if global.is_dir() && !found.contains(&global) {
                found.push(global);
            }
        }

        found
    }

    /// Parse one file; `None` when it does not exist
    fn try_load_file(path: &Path) -> ConfigResult<Option<JiraConfig>> {
        if !path.is_file() {
            return Ok(None);
        }

        debug!(path = %path.display(), "loading config");
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Some(JiraConfig::default()));
        }

        let config: JiraConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                file: path.display().to_string(),
                error: e.to_string(),
            })?;

        Ok(Some(config))
    }

    /// Environment variables fill whatever the files left unset
    fn apply_env_defaults(config: &mut JiraConfig) {
        let from_env = JiraConfig {
            endpoint: env::var("JIRA_ENDPOINT").ok(),
            user: env::var("JIRA_USER").ok(),
            ..JiraConfig::default()
        };
        config.merge_missing(from_env);
    }
}
