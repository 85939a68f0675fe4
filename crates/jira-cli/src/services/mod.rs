// crates/jira-cli/src/services/mod.rs - Terminal-facing services
pub mod auth;
pub mod prompt;

pub use auth::PasswordLogin;
pub use prompt::TerminalPrompter;
