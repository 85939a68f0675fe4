// crates/jira-core/src/editor.rs - Editor Integration
//
// Resolves which editor to run and launches it on the editable document.
//
// EDITOR SELECTION HIERARCHY:
// 1. --editor option (or `editor:` in a config file)
// 2. JIRA_EDITOR environment variable
// 3. EDITOR environment variable
// 4. vim
//
// Empty values are skipped, so `JIRA_EDITOR=` falls through to `EDITOR`.
// The command is split with shell quoting rules, which allows values like
// `code --wait` or `"/opt/My Editor/bin/edit" -n`.

use std::env;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::edit::{EditError, EditResult};

/// Editor used when nothing else is configured
pub const DEFAULT_EDITOR: &str = "vim";

/// Resolve the editor command from the option and the process environment
pub fn resolve_editor(option: Option<&str>) -> String {
    resolve_editor_with(option, |name| env::var(name).ok())
}

/// Resolve the editor command using `lookup` for environment variables
pub fn resolve_editor_with<F>(option: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    option
        .map(str::to_string)
        .into_iter()
        .chain(lookup("JIRA_EDITOR"))
        .chain(lookup("EDITOR"))
        .find(|candidate| !candidate.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

/// Runs an editor on a file and waits for it to exit
///
/// The edit loop only talks to this trait, so tests can stand in for a
/// person typing into a terminal.
pub trait EditorLauncher {
    fn launch(&self, command: &str, path: &Path) -> EditResult<()>;
}

/// Launches the editor as a foreground child process
///
/// The child inherits stdin, stdout and stderr so terminal editors work
/// normally; the call blocks until the editor exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl EditorLauncher for ProcessLauncher {
    fn launch(&self, command: &str, path: &Path) -> EditResult<()> {
        let argv = shell_words::split(command).map_err(|e| EditError::EditorCommand {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
        let (program, args) = argv.split_first().ok_or_else(|| EditError::EditorCommand {
            command: command.to_string(),
            reason: "command is empty".to_string(),
        })?;

        debug!(editor = %command, file = %path.display(), "running editor");

        let status = Command::new(program)
            .args(args)
            .arg(path)
            .status()
            .map_err(|source| EditError::EditorLaunch {
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(EditError::EditorStatus {
                command: command.to_string(),
                status,
            });
        }

        Ok(())
    }
}

/// Any closure over the file path can act as an editor
impl<F> EditorLauncher for F
where
    F: Fn(&Path) -> EditResult<()>,
{
    fn launch(&self, _command: &str, path: &Path) -> EditResult<()> {
        self(path)
    }
}
