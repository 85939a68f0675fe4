// crates/jira-cli/src/commands/edit.rs - Edit an existing issue
//
// The issue is fetched, rendered with the `edit` template and handed to the
// edit loop. Whatever survives sanitizing is sent as `PUT /issue/{key}`.

use anyhow::{Context as _, Result};
use console::style;
use jira_core::{EditLoop, EditableFile, Flow, IssueEdit, ProcessLauncher};

use crate::context::Context;
use crate::services::TerminalPrompter;

pub fn handle(ctx: &Context, key: &str) -> Result<Flow> {
    let issue = ctx
        .client
        .get_issue(key)
        .with_context(|| format!("Failed to fetch {key}"))?;

    let options = ctx.edit_options("edit");
    let file = EditableFile::render(&ctx.templates, &options.template, &issue)?;

    let mut edit = IssueEdit::default();
    let flow = EditLoop::new(options, TerminalPrompter, ProcessLauncher).run(
        &file,
        &mut edit,
        |document| {
            ctx.client.edit_issue(key, document)?;
            Ok(())
        },
    )?;

    if flow.is_done() {
        ctx.status(format!("{} {key} {}", style("OK").green(), ctx.browse_url(key)));
    }
    Ok(flow)
}
