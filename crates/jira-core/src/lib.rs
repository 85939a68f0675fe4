// crates/jira-core/src/lib.rs - Core library for the jira CLI
//
// Everything that is not argument parsing or terminal I/O lives here:
//
// - edit:      the render → edit → diff → parse → sanitize → populate → submit loop
// - diff:      chunked file comparison used to detect "no changes"
// - sanitize:  removal of blank values from a parsed YAML tree
// - editor:    editor command resolution and subprocess launch
// - template:  handlebars rendering of the editable documents
// - config:    layered `.jira.d` configuration loading
// - quiet:     the process-wide "quiet output" flag with scoped overrides
// - client:    HTTP client wrapper with transparent re-authentication
// - api:       the handful of REST calls the commands need
// - document:  typed documents edited by the user
// - flow:      the explicit "finished" / "exit with status" result

pub mod api;
pub mod client;
pub mod config;
pub mod diff;
pub mod document;
pub mod edit;
pub mod editor;
pub mod flow;
pub mod quiet;
pub mod sanitize;
pub mod template;

pub use client::{Authenticator, ClientOptions, HttpError, HttpResult, JiraClient, SessionIdentity};
pub use config::{ConfigError, ConfigManager, ConfigResult, JiraConfig};
pub use document::{CommentDraft, IssueCreate, IssueEdit, IssueRef};
pub use edit::{EditError, EditLoop, EditOptions, EditResult, EditableFile, Prompter};
pub use editor::{EditorLauncher, ProcessLauncher};
pub use flow::{Exit, Flow};
pub use quiet::{QuietFlag, QuietGuard};
pub use template::{TemplateError, TemplateResult, TemplateService};
