// crates/jira-cli/src/context.rs - Per-invocation application context
//
// Configuration precedence, highest first:
//   1. command-line flags
//   2. `<operation>.yml` then `config.yml` in each `.jira.d`, closest first
//   3. JIRA_ENDPOINT / JIRA_USER

use std::env;
use std::fmt::Display;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use jira_core::{
    ClientOptions, ConfigManager, EditOptions, JiraClient, JiraConfig, QuietFlag, TemplateService,
};
use tracing::debug;

use crate::cli::{Commands, GlobalArgs};
use crate::services::PasswordLogin;

/// Everything a command handler needs
pub struct Context {
    pub config: JiraConfig,
    pub client: JiraClient,
    pub templates: TemplateService,
    quiet: QuietFlag,
}

impl Context {
    pub fn new(global: &GlobalArgs, command: &Commands) -> Result<Self> {
        let cwd = env::current_dir().context("Cannot determine the current directory")?;
        let config_dirs = ConfigManager::config_dirs(&cwd);

        let mut config = command.to_config();
        config.merge_missing(global.to_config());
        config.merge_missing(ConfigManager::load_from_dirs(command.operation(), &config_dirs)?);
        debug!(?config, "effective configuration");

        let quiet = QuietFlag::new(config.is_quiet());
        let templates = TemplateService::with_overrides(&config_dirs)?;

        let options = ClientOptions {
            endpoint: config.endpoint()?,
            insecure: config.is_insecure(),
            unixproxy: config.unixproxy.as_ref().map(PathBuf::from),
        };
        let login = PasswordLogin::new(config.user(), config.password_source.clone(), quiet.clone())?;
        let client = JiraClient::new(&options, quiet.clone(), Box::new(login))?;

        Ok(Self {
            config,
            client,
            templates,
            quiet,
        })
    }

    /// Editing options with `default_template` unless one was configured
    pub fn edit_options(&self, default_template: &str) -> EditOptions {
        EditOptions {
            skip_editing: self.config.skip_editing(),
            editor: self.config.editor.clone(),
            template: self.config.template_or(default_template),
        }
    }

    /// Browse URL of an issue
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.client.endpoint())
    }

    /// Print a status line unless output is quiet
    pub fn status(&self, message: impl Display) {
        if !self.quiet.is_quiet() {
            println!("{message}");
        }
    }
}
