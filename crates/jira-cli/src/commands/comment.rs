// crates/jira-cli/src/commands/comment.rs - Comment on an issue

use anyhow::Result;
use console::style;
use jira_core::{CommentDraft, EditLoop, EditableFile, Flow, ProcessLauncher};
use serde::Serialize;

use crate::context::Context;
use crate::services::TerminalPrompter;

/// Data handed to the `comment` template
#[derive(Debug, Serialize)]
struct CommentInput<'a> {
    key: &'a str,
    body: String,
}

pub fn handle(ctx: &Context, key: &str, comment: Option<String>) -> Result<Flow> {
    let input = CommentInput {
        key,
        body: comment.unwrap_or_default(),
    };

    let options = ctx.edit_options("comment");
    let file = EditableFile::render(&ctx.templates, &options.template, &input)?;

    let mut draft = CommentDraft::default();
    let flow = EditLoop::new(options, TerminalPrompter, ProcessLauncher).run(
        &file,
        &mut draft,
        |document| {
            ctx.client.add_comment(key, document)?;
            Ok(())
        },
    )?;

    if flow.is_done() {
        ctx.status(format!("{} {key} {}", style("OK").green(), ctx.browse_url(key)));
    }
    Ok(flow)
}
