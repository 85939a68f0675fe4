// crates/jira-cli/src/commands/create.rs - Create an issue
//
// The `create` template receives the project, the issue type and every
// `-o key=value` override. Project and issue type are also preset on the
// document so a template that omits them still produces a valid request.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use console::style;
use jira_core::{EditLoop, EditableFile, Flow, IssueCreate, IssueRef, ProcessLauncher};
use serde::Serialize;

use crate::context::Context;
use crate::services::TerminalPrompter;

const DEFAULT_ISSUE_TYPE: &str = "Bug";

/// Data handed to the `create` template
#[derive(Debug, Serialize)]
struct CreateInput {
    project: String,
    issuetype: String,
    overrides: BTreeMap<String, String>,
}

pub fn handle(ctx: &Context, overrides: Vec<(String, String)>) -> Result<Flow> {
    let Some(project) = ctx.config.project.clone() else {
        bail!("No project given. Use --project or set `project:` in .jira.d/create.yml");
    };
    let input = CreateInput {
        project,
        issuetype: ctx
            .config
            .issuetype
            .clone()
            .unwrap_or_else(|| DEFAULT_ISSUE_TYPE.to_string()),
        overrides: overrides.into_iter().collect(),
    };

    let options = ctx.edit_options("create");
    let file = EditableFile::render(&ctx.templates, &options.template, &input)?;

    let mut issue = IssueCreate::for_project(&input.project, &input.issuetype);
    let mut created: Option<IssueRef> = None;
    let flow = EditLoop::new(options, TerminalPrompter, ProcessLauncher).run(
        &file,
        &mut issue,
        |document| {
            created = Some(ctx.client.create_issue(document)?);
            Ok(())
        },
    )?;

    if let Some(created) = created.filter(|_| flow.is_done()) {
        ctx.status(format!(
            "{} {} {}",
            style("OK").green(),
            created.key,
            ctx.browse_url(&created.key)
        ));
    }
    Ok(flow)
}
