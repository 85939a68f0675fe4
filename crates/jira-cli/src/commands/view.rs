// crates/jira-cli/src/commands/view.rs - Print an issue

use anyhow::{Context as _, Result};
use jira_core::Flow;

use crate::context::Context;

pub fn handle(ctx: &Context, key: &str) -> Result<Flow> {
    let issue = ctx
        .client
        .get_issue(key)
        .with_context(|| format!("Failed to fetch {key}"))?;
    let template = ctx.config.template_or("view");
    print!("{}", ctx.templates.render(&template, &issue)?);
    Ok(Flow::Done)
}
