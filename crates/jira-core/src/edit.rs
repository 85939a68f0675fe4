// crates/jira-core/src/edit.rs - Edit / submit / retry loop
//
// Lets the user fix a document in their editor until Jira accepts it.
//
// STATE MACHINE:
//
//   RENDER ─▶ EDIT ─▶ DIFF ─▶ PARSE ─▶ SANITIZE ─▶ RESTORE+POPULATE ─▶ SUBMIT ─▶ DONE
//               ▲                │          │                │             │
//               └────────────────┴──────────┴────────────────┴─────────────┘
//                             "edit again?"  yes: back to EDIT
//                                            no:  Flow::Exit(1)
//
// RENDER happens in `EditableFile::render`, before the loop starts. A retry
// re-opens the file exactly as the user left it; it is never re-rendered.
//
// The typed document handed to `submit` is always either the value the loop
// was started with or that value overlaid with a fully parsed and sanitized
// edit. It is reset from a snapshot before every attempt so fields from a
// rejected attempt never leak into the next one.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tempfile::TempPath;
use thiserror::Error;
use tracing::{debug, error};

use crate::diff;
use crate::editor::{EditorLauncher, resolve_editor};
use crate::flow::Flow;
use crate::sanitize::sanitize_document;
use crate::template::{TemplateError, TemplateService};

pub const EDITOR_FAILED: &str = "Editor reported an error, edit again?";
pub const NO_CHANGES: &str = "No changes detected, submit anyway?";
pub const INVALID_SYNTAX: &str = "Invalid YAML syntax, edit again?";
pub const SUBMIT_FAILED: &str = "Jira reported an error, edit again?";

/// Errors raised while editing and submitting a document
///
/// Editor, syntax and submit failures are offered to the user for another
/// round of editing; template and I/O failures end the command.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Invalid editor command '{command}': {reason}")]
    EditorCommand { command: String, reason: String },

    #[error("Failed to launch editor '{command}': {source}")]
    EditorLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Editor '{command}' exited with {status}")]
    EditorStatus { command: String, status: ExitStatus },

    #[error("Cannot compare edited file {path}: {source}")]
    Edited {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML syntax: {0}")]
    Syntax(#[source] serde_yaml::Error),

    #[error("Document does not match the expected fields: {0}")]
    Populate(#[source] serde_yaml::Error),

    #[error("{0:#}")]
    Submit(anyhow::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EditError {
    /// Whether the user may fix this by editing the document again
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EditError::Template(_) | EditError::Io { .. })
    }

    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> EditError + '_ {
        move |source| EditError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for edit operations
pub type EditResult<T> = Result<T, EditError>;

/// Asks the user a yes/no question; no explicit answer means yes
pub trait Prompter {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Per-command editing options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOptions {
    /// Submit the rendered document without opening an editor
    pub skip_editing: bool,
    /// Editor command from the command line or config
    pub editor: Option<String>,
    /// Template used to render the document
    pub template: String,
}

/// Temporary file holding the document while the user edits it
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct EditableFile {
    path: TempPath,
}

impl EditableFile {
    /// Render `input` with `template` into a fresh temporary file
    pub fn render<I: Serialize>(
        templates: &TemplateService,
        template: &str,
        input: &I,
    ) -> EditResult<Self> {
        let text = templates.render(template, input)?;
        Self::with_contents(&text)
    }

    /// Create the temporary file with the given contents
    pub fn with_contents(text: &str) -> EditResult<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("jira-")
            .suffix(".yml")
            .tempfile()
            .map_err(EditError::io(&std::env::temp_dir()))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(EditError::io(file.path()))?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> EditResult<String> {
        fs::read_to_string(&self.path).map_err(EditError::io(&self.path))
    }
}

/// Copy of the document taken before the editor runs, removed on drop
struct Backup {
    path: PathBuf,
}

impl Backup {
    fn create(file: &Path) -> EditResult<Self> {
        let mut name = OsString::from(file.as_os_str());
        name.push(".orig");
        let path = PathBuf::from(name);
        fs::copy(file, &path).map_err(EditError::io(&path))?;
        Ok(Self { path })
    }
}

impl Drop for Backup {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), "could not remove backup: {e}");
        }
    }
}

/// Drives one document through edit → submit until accepted or abandoned
pub struct EditLoop<P, L> {
    options: EditOptions,
    prompter: P,
    launcher: L,
}

impl<P: Prompter, L: EditorLauncher> EditLoop<P, L> {
    pub fn new(options: EditOptions, prompter: P, launcher: L) -> Self {
        Self {
            options,
            prompter,
            launcher,
        }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Run the loop on `file`, populating `output` and calling `submit`
    ///
    /// Returns `Flow::Done` once `submit` succeeds, `Flow::Exit` when the user
    /// declines to continue, and `Err` only for failures editing cannot fix.
    pub fn run<T, F>(&mut self, file: &EditableFile, output: &mut T, mut submit: F) -> EditResult<Flow>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnMut(&T) -> anyhow::Result<()>,
    {
        let pristine = output.clone();

        loop {
            if !self.options.skip_editing {
                match self.edit(file.path()) {
                    Ok(true) => {}
                    Ok(false) => {
                        if !self.prompter.confirm(NO_CHANGES) {
                            return Ok(Flow::aborted());
                        }
                    }
                    Err(err) if err.is_recoverable() => {
                        if self.retry(&err, EDITOR_FAILED) {
                            continue;
                        }
                        return Ok(Flow::aborted());
                    }
                    Err(err) => return Err(err),
                }
            }

            let text = file.read()?;

            *output = pristine.clone();
            match sanitize_document(&text)
                .map_err(EditError::Syntax)
                .and_then(|fixed| {
                    debug!("sanitized document:\n{fixed}");
                    populate(&pristine, &fixed)
                }) {
                Ok(document) => *output = document,
                Err(err) => {
                    if self.retry(&err, INVALID_SYNTAX) {
                        continue;
                    }
                    return Ok(Flow::aborted());
                }
            }

            if let Err(source) = submit(&*output) {
                if self.retry(&EditError::Submit(source), SUBMIT_FAILED) {
                    continue;
                }
                return Ok(Flow::aborted());
            }

            return Ok(Flow::Done);
        }
    }

    /// Back up, launch the editor, and report whether the file changed
    fn edit(&self, path: &Path) -> EditResult<bool> {
        let editor = resolve_editor(self.options.editor.as_deref());
        let backup = Backup::create(path)?;
        self.launcher.launch(&editor, path)?;
        diff::files_differ(&backup.path, path).map_err(|source| EditError::Edited {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Report `err` and ask whether to try again
    ///
    /// With `skip_editing` a yes re-reads the same file and submits it again.
    fn retry(&mut self, err: &EditError, question: &str) -> bool {
        error!("{err}");
        self.prompter.confirm(question)
    }
}

/// Overlay sanitized YAML onto the pristine document and deserialize it
pub fn populate<T>(pristine: &T, sanitized: &str) -> EditResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let patch: Value = serde_yaml::from_str(sanitized).map_err(EditError::Syntax)?;
    let mut merged = serde_yaml::to_value(pristine).map_err(EditError::Populate)?;
    overlay(&mut merged, patch, MERGE_DEPTH);
    serde_yaml::from_value(merged).map_err(EditError::Populate)
}

/// Mapping levels merged key by key: the document, then each map it holds
const MERGE_DEPTH: usize = 2;

/// Merge `patch` into `base` for `depth` mapping levels; below that values replace
fn overlay(base: &mut Value, patch: Value, depth: usize) {
    match (base, patch) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(patch)) if depth > 0 => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => overlay(existing, value, depth - 1),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CommentDraft, IssueCreate, IssueEdit};
    use crate::flow::Exit;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Answers questions from a script, then says yes
    #[derive(Default)]
    struct Script {
        answers: VecDeque<bool>,
        asked: Vec<String>,
    }

    impl Script {
        fn answering(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompter for Script {
        fn confirm(&mut self, question: &str) -> bool {
            self.asked.push(question.to_string());
            self.answers.pop_front().unwrap_or(true)
        }
    }

    fn options() -> EditOptions {
        EditOptions {
            skip_editing: false,
            editor: Some("test-editor".into()),
            template: "edit".into(),
        }
    }

    fn write(path: &Path, text: &str) -> EditResult<()> {
        fs::write(path, text).map_err(EditError::io(path))
    }

    fn orig_of(path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(".orig");
        PathBuf::from(name)
    }

    #[test]
    fn test_unchanged_file_declined_exits_without_submitting() {
        let file = EditableFile::with_contents("body: |-\n  hello\n").unwrap();
        let noop = |_: &Path| -> EditResult<()> { Ok(()) };
        let mut edit = EditLoop::new(options(), Script::answering(&[false]), noop);
        let mut doc = CommentDraft::default();
        let mut submits = 0;

        let flow = edit
            .run(&file, &mut doc, |_| {
                submits += 1;
                Ok(())
            })
            .unwrap();

        assert_eq!(flow, Flow::Exit(Exit { code: 1 }));
        assert_eq!(submits, 0);
        assert_eq!(edit.prompter().asked, vec![NO_CHANGES]);
        assert!(!orig_of(file.path()).exists());
    }

    #[test]
    fn test_unchanged_file_submitted_when_confirmed() {
        let file = EditableFile::with_contents("body: hello\n").unwrap();
        let noop = |_: &Path| -> EditResult<()> { Ok(()) };
        let mut edit = EditLoop::new(options(), Script::default(), noop);
        let mut doc = CommentDraft::default();

        let flow = edit.run(&file, &mut doc, |_| Ok(())).unwrap();

        assert_eq!(flow, Flow::Done);
        assert_eq!(doc.body, "hello");
    }

    #[test]
    fn test_same_length_change_is_detected() {
        let file = EditableFile::with_contents("body: hallo world\n").unwrap();
        let typo_fix = |p: &Path| write(p, "body: hello world\n");
        let mut edit = EditLoop::new(options(), Script::default(), typo_fix);
        let mut doc = CommentDraft::default();

        let flow = edit.run(&file, &mut doc, |_| Ok(())).unwrap();

        assert_eq!(flow, Flow::Done);
        assert!(edit.prompter().asked.is_empty());
        assert_eq!(doc.body, "hello world");
    }

    #[test]
    fn test_invalid_yaml_retry_reuses_the_edited_file() {
        let file = EditableFile::with_contents("body: rendered\n").unwrap();
        let rounds = Cell::new(0);
        let seen = RefCell::new(Vec::new());
        let editor = |p: &Path| {
            seen.borrow_mut().push(fs::read_to_string(p).unwrap());
            rounds.set(rounds.get() + 1);
            match rounds.get() {
                1 => write(p, "body: [unclosed\n"),
                _ => write(p, "body: fixed\n"),
            }
        };
        let mut edit = EditLoop::new(options(), Script::answering(&[true]), editor);
        let mut doc = CommentDraft::default();

        let flow = edit.run(&file, &mut doc, |_| Ok(())).unwrap();

        assert_eq!(flow, Flow::Done);
        assert_eq!(rounds.get(), 2);
        assert_eq!(seen.borrow()[1], "body: [unclosed\n");
        assert_eq!(edit.prompter().asked, vec![INVALID_SYNTAX]);
        assert_eq!(doc.body, "fixed");
    }

    #[test]
    fn test_invalid_yaml_declined_aborts() {
        let file = EditableFile::with_contents("body: x\n").unwrap();
        let editor = |p: &Path| write(p, "body: : :\n  - [\n");
        let mut edit = EditLoop::new(options(), Script::answering(&[false]), editor);
        let mut doc = CommentDraft::default();

        let flow = edit.run(&file, &mut doc, |_| panic!("must not submit")).unwrap();

        assert_eq!(flow, Flow::aborted());
        assert_eq!(doc, CommentDraft::default());
    }

    #[test]
    fn test_submit_fails_twice_then_succeeds() {
        let file = EditableFile::with_contents("fields:\n  summary: draft\n").unwrap();
        let round = Cell::new(0);
        let editor = |p: &Path| {
            round.set(round.get() + 1);
            write(p, &format!("fields:\n  summary: attempt {}\n", round.get()))
        };
        let mut edit = EditLoop::new(options(), Script::answering(&[true, true]), editor);
        let mut doc = IssueEdit::default();
        let mut submitted = Vec::new();

        let flow = edit
            .run(&file, &mut doc, |d| {
                submitted.push(d.fields["summary"].clone());
                if submitted.len() < 3 {
                    anyhow::bail!("summary: Field 'summary' cannot be set")
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(flow, Flow::Done);
        assert_eq!(submitted, vec![json!("attempt 1"), json!("attempt 2"), json!("attempt 3")]);
        assert_eq!(doc.fields["summary"], json!("attempt 3"));
        assert_eq!(edit.prompter().asked, vec![SUBMIT_FAILED, SUBMIT_FAILED]);
    }

    #[test]
    fn test_rejected_fields_do_not_leak_into_next_attempt() {
        let file = EditableFile::with_contents("fields:\n  summary: s\n").unwrap();
        let round = Cell::new(0);
        let editor = |p: &Path| {
            round.set(round.get() + 1);
            if round.get() == 1 {
                write(p, "fields:\n  summary: s\n  labels: [bogus]\n")
            } else {
                write(p, "fields:\n  summary: t\n")
            }
        };
        let mut edit = EditLoop::new(options(), Script::default(), editor);
        let mut doc = IssueCreate::for_project("PROJ", "Bug");
        let pristine = doc.clone();

        let flow = edit
            .run(&file, &mut doc, |d| {
                if d.fields.contains_key("labels") {
                    anyhow::bail!("labels: unknown label")
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(flow, Flow::Done);
        let mut expected = pristine;
        expected.fields.insert("summary".into(), json!("t"));
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_unknown_field_is_a_syntax_error() {
        let file = EditableFile::with_contents("body: x\n").unwrap();
        let editor = |p: &Path| write(p, "bdy: typo\n");
        let mut edit = EditLoop::new(options(), Script::answering(&[false]), editor);
        let mut doc = CommentDraft::default();

        let flow = edit.run(&file, &mut doc, |_| Ok(())).unwrap();

        assert_eq!(flow, Flow::aborted());
        assert_eq!(edit.prompter().asked, vec![INVALID_SYNTAX]);
    }

    #[test]
    fn test_editor_failure_then_abort_removes_backup() {
        let file = EditableFile::with_contents("body: x\n").unwrap();
        let crash = |p: &Path| -> EditResult<()> {
            assert!(orig_of(p).exists());
            Err(EditError::EditorCommand {
                command: "crash".into(),
                reason: "boom".into(),
            })
        };
        let mut edit = EditLoop::new(options(), Script::answering(&[true, false]), crash);
        let mut doc = CommentDraft::default();

        let flow = edit.run(&file, &mut doc, |_| Ok(())).unwrap();

        assert_eq!(flow, Flow::aborted());
        assert_eq!(edit.prompter().asked, vec![EDITOR_FAILED, EDITOR_FAILED]);
        assert!(!orig_of(file.path()).exists());
    }

    #[test]
    fn test_blank_values_are_dropped_before_populating() {
        let file = EditableFile::with_contents("x").unwrap();
        let editor = |p: &Path| {
            write(
                p,
                "update:\n  comment:\n    - add:\n        body: ''\nfields:\n  summary: ok\n  labels: []\n  assignee:\n    name:\n",
            )
        };
        let mut edit = EditLoop::new(options(), Script::default(), editor);
        let mut doc = IssueEdit::default();

        edit.run(&file, &mut doc, |_| Ok(())).unwrap();

        assert!(doc.update.is_empty());
        assert_eq!(doc.fields.len(), 1);
        assert_eq!(doc.fields["summary"], json!("ok"));
    }

    #[test]
    fn test_skip_editing_submits_rendered_file() {
        let templates = TemplateService::builtin().unwrap();
        let file = EditableFile::render(
            &templates,
            "comment",
            &json!({"key": "PROJ-1", "body": "from the command line"}),
        )
        .unwrap();
        let never = |_: &Path| -> EditResult<()> { panic!("editor must not run") };
        let opts = EditOptions {
            skip_editing: true,
            ..options()
        };
        let mut edit = EditLoop::new(opts, Script::default(), never);
        let mut doc = CommentDraft::default();

        let flow = edit.run(&file, &mut doc, |_| Ok(())).unwrap();

        assert_eq!(flow, Flow::Done);
        assert_eq!(doc.body, "from the command line");
        assert!(edit.prompter().asked.is_empty());
    }

    #[test]
    fn test_skip_editing_failure_resubmits_on_yes() {
        let file = EditableFile::with_contents("body: x\n").unwrap();
        let never = |_: &Path| -> EditResult<()> { panic!("editor must not run") };
        let opts = EditOptions {
            skip_editing: true,
            ..options()
        };
        let mut edit = EditLoop::new(opts, Script::answering(&[true]), never);
        let mut doc = CommentDraft::default();
        let mut calls = 0;

        let flow = edit
            .run(&file, &mut doc, |_| {
                calls += 1;
                if calls == 1 {
                    anyhow::bail!("connection reset");
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(flow, Flow::Done);
        assert_eq!(calls, 2);
        assert_eq!(edit.prompter().asked, vec![SUBMIT_FAILED]);
        assert_eq!(doc.body, "x");
    }

    #[test]
    fn test_skip_editing_failure_aborts_on_no() {
        let file = EditableFile::with_contents("body: x\n").unwrap();
        let never = |_: &Path| -> EditResult<()> { panic!("editor must not run") };
        let opts = EditOptions {
            skip_editing: true,
            ..options()
        };
        let mut edit = EditLoop::new(opts, Script::answering(&[false]), never);
        let mut doc = CommentDraft::default();
        let mut calls = 0;

        let flow = edit
            .run(&file, &mut doc, |_| {
                calls += 1;
                anyhow::bail!("rejected")
            })
            .unwrap();

        assert_eq!(flow, Flow::aborted());
        assert_eq!(calls, 1);
        assert_eq!(edit.prompter().asked, vec![SUBMIT_FAILED]);
    }

    #[test]
    fn test_editor_removing_file_is_an_editor_failure() {
        let file = EditableFile::with_contents("body: x\n").unwrap();
        let remove = |p: &Path| -> EditResult<()> {
            fs::remove_file(p).unwrap();
            Ok(())
        };
        let mut edit = EditLoop::new(options(), Script::answering(&[false]), remove);
        let mut doc = CommentDraft::default();

        let flow = edit.run(&file, &mut doc, |_| panic!("must not submit")).unwrap();

        assert_eq!(flow, Flow::aborted());
        assert_eq!(edit.prompter().asked, vec![EDITOR_FAILED]);
        assert!(!orig_of(file.path()).exists());
    }

    #[test]
    fn test_render_with_unknown_template_is_fatal() {
        let templates = TemplateService::builtin().unwrap();
        let err = EditableFile::render(&templates, "missing", &json!({})).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_overlay_merges_nested_mappings() {
        let mut base: Value = serde_yaml::from_str("a:\n  b: 1\n  c: 2\nd: [1]\n").unwrap();
        let patch: Value = serde_yaml::from_str("a:\n  c: 3\nd: [2]\n").unwrap();
        overlay(&mut base, patch, MERGE_DEPTH);
        let expected: Value = serde_yaml::from_str("a:\n  b: 1\n  c: 3\nd: [2]\n").unwrap();
        assert_eq!(base, expected);
    }

    #[test]
    fn test_field_values_are_replaced_whole() {
        let pristine = IssueCreate::for_project("PROJ", "Task");
        let doc = populate(&pristine, "fields:\n  project:\n    id: 10001\n").unwrap();

        assert_eq!(doc.fields["project"], json!({"id": 10001}));
        assert_eq!(doc.fields["issuetype"], json!({"name": "Task"}));
    }

    #[test]
    fn test_empty_document_keeps_pristine_values() {
        let pristine = IssueCreate::for_project("PROJ", "Task");
        let doc = populate(&pristine, "{}\n").unwrap();
        assert_eq!(doc, pristine);
        let doc = populate(&pristine, "null\n").unwrap();
        assert_eq!(doc, pristine);
    }
}
