// crates/jira-cli/src/services/auth.rs - Interactive session login
//
// Used both by `jira login` and by the client when a response shows the
// session has expired. The password comes from JIRA_API_TOKEN when set,
// otherwise from a hidden terminal prompt.

use std::env;

use anyhow::{Context as _, Result, bail};
use console::{Term, style};
use dialoguer::Password;
use jira_core::{Authenticator, JiraClient, QuietFlag};
use tracing::debug;

const TOKEN_VAR: &str = "JIRA_API_TOKEN";

/// Where the password is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PasswordSource {
    /// JIRA_API_TOKEN if set, otherwise ask
    Prompt,
    /// JIRA_API_TOKEN only
    Env,
}

impl PasswordSource {
    fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("prompt") => Ok(Self::Prompt),
            Some("env") => Ok(Self::Env),
            Some(other) => bail!("Unsupported password-source '{other}' (expected 'prompt' or 'env')"),
        }
    }
}

/// Logs in with user name and password through `POST /rest/auth/1/session`
pub struct PasswordLogin {
    user: Option<String>,
    source: PasswordSource,
    quiet: QuietFlag,
}

impl PasswordLogin {
    pub fn new(user: Option<String>, source: Option<String>, quiet: QuietFlag) -> Result<Self> {
        Ok(Self {
            user,
            source: PasswordSource::parse(source.as_deref())?,
            quiet,
        })
    }

    fn password(&self, user: &str) -> Result<String> {
        if let Some(token) = env::var(TOKEN_VAR).ok().filter(|t| !t.is_empty()) {
            debug!("using password from {TOKEN_VAR}");
            return Ok(token);
        }
        if self.source == PasswordSource::Env {
            bail!("{TOKEN_VAR} is not set");
        }
        if !Term::stderr().is_term() {
            bail!("No terminal to read the password from; set {TOKEN_VAR}");
        }
        Password::new()
            .with_prompt(format!("Jira password [{user}]"))
            .interact()
            .context("Failed to read password")
    }
}

impl Authenticator for PasswordLogin {
    fn login(&self, client: &JiraClient) -> Result<()> {
        let user = self
            .user
            .as_deref()
            .context("No user configured. Use --user or set `user:` in ~/.jira.d/config.yml")?;
        let password = self.password(user)?;

        client
            .create_session(user, &password)
            .with_context(|| format!("Login failed for {user}"))?;

        if !self.quiet.is_quiet() {
            println!("{} logged in as {user}", style("OK").green());
        }
        Ok(())
    }
}
