// crates/jira-cli/src/cli.rs - Command-line definitions
//
// Pure data: what the user can type. Flags map onto `JiraConfig` fields so
// they can be layered over the `.jira.d` files.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jira_core::JiraConfig;

/// Main CLI structure
#[derive(Parser, Debug)]
#[command(name = "jira")]
#[command(about = "A command-line client for the Jira REST API")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Base URI to use for Jira
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Disable TLS certificate verification
    #[arg(short = 'k', long, global = true)]
    pub insecure: bool,

    /// Suppress output to console
    #[arg(short = 'Q', long, global = true)]
    pub quiet: bool,

    /// Path for a unix-socket proxy
    #[arg(long, global = true)]
    pub unixproxy: Option<PathBuf>,

    /// Login name used for authentication with Jira service
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Print debug logging to stderr (JIRA_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Flags as a config layer; switches left off stay unset
    pub fn to_config(&self) -> JiraConfig {
        JiraConfig {
            endpoint: self.endpoint.clone(),
            insecure: self.insecure.then_some(true),
            quiet: self.quiet.then_some(true),
            unixproxy: self
                .unixproxy
                .as_ref()
                .map(|p| p.display().to_string()),
            user: self.user.clone(),
            ..JiraConfig::default()
        }
    }
}

/// Options of commands that open an editor
#[derive(Args, Debug, Default, Clone)]
pub struct EditArgs {
    /// Editor to use
    #[arg(long)]
    pub editor: Option<String>,

    /// Disable opening the editor
    #[arg(long)]
    pub noedit: bool,

    /// Template to use for the document
    #[arg(short, long)]
    pub template: Option<String>,
}

impl EditArgs {
    pub fn to_config(&self) -> JiraConfig {
        JiraConfig {
            editor: self.editor.clone(),
            noedit: self.noedit.then_some(true),
            template: self.template.clone(),
            ..JiraConfig::default()
        }
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate and start a session
    Login,

    /// End the current session
    Logout,

    /// Print an issue
    View {
        /// Issue key, e.g. PROJ-12
        issue: String,

        /// Template to use for output
        #[arg(short, long)]
        template: Option<String>,
    },

    /// Edit an issue in your editor and submit the changes
    Edit {
        /// Issue key, e.g. PROJ-12
        issue: String,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Create an issue
    Create {
        /// Project key to create the issue in
        #[arg(short, long)]
        project: Option<String>,

        /// Issue type, e.g. Bug or Task
        #[arg(short = 'i', long)]
        issuetype: Option<String>,

        /// Pre-fill a template field: -o summary="Crash on save"
        #[arg(short = 'o', long = "override", value_parser = parse_override)]
        overrides: Vec<(String, String)>,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Add a comment to an issue
    Comment {
        /// Issue key, e.g. PROJ-12
        issue: String,

        /// Comment text to pre-fill
        #[arg(short = 'm', long)]
        comment: Option<String>,

        #[command(flatten)]
        edit: EditArgs,
    },
}

impl Commands {
    /// Name used to find `<operation>.yml` config files
    pub fn operation(&self) -> &'static str {
        match self {
            Commands::Login => "login",
            Commands::Logout => "logout",
            Commands::View { .. } => "view",
            Commands::Edit { .. } => "edit",
            Commands::Create { .. } => "create",
            Commands::Comment { .. } => "comment",
        }
    }

    /// Command-specific flags as a config layer
    pub fn to_config(&self) -> JiraConfig {
        match self {
            Commands::Login | Commands::Logout => JiraConfig::default(),
            Commands::View { template, .. } => JiraConfig {
                template: template.clone(),
                ..JiraConfig::default()
            },
            Commands::Edit { edit, .. } | Commands::Comment { edit, .. } => edit.to_config(),
            Commands::Create {
                project,
                issuetype,
                edit,
                ..
            } => JiraConfig {
                project: project.clone(),
                issuetype: issuetype.clone(),
                ..edit.to_config()
            },
        }
    }
}

fn parse_override(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))
}
