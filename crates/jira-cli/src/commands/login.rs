// crates/jira-cli/src/commands/login.rs - Session commands

use anyhow::Result;
use console::style;
use jira_core::Flow;

use crate::context::Context;

/// Start a session; the authenticator prints its own status line
pub fn handle_login(ctx: &Context) -> Result<Flow> {
    ctx.client.login()?;
    Ok(Flow::Done)
}

pub fn handle_logout(ctx: &Context) -> Result<Flow> {
    ctx.client.delete_session()?;
    ctx.status(format!("{} logged out", style("OK").green()));
    Ok(Flow::Done)
}
