// crates/jira-core/src/template.rs - Template System
//
// Renders the documents the user edits (and the `view` output) with
// handlebars. Built-in templates cover every command; a file named
// `templates/<name>` inside any `.jira.d` directory replaces the built-in of
// the same name, the closest directory winning.
//
// HELPERS:
// - {{json value}}         value as compact JSON, which is also valid YAML
// - {{indent 4 text}}      every line of `text` indented by 4 spaces
//
// EXAMPLE TEMPLATE:
// ```yaml
// fields:
//   summary: {{json fields.summary}}
//   description: |-
// {{indent 4 fields.description}}
// ```

use std::fs;
use std::path::{Path, PathBuf};

use handlebars::{Handlebars, handlebars_helper, no_escape};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during template operations
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("No template named '{0}'")]
    NotFound(String),

    #[error("Invalid template '{name}': {error}")]
    Register { name: String, error: String },

    #[error("Failed to render template '{name}': {error}")]
    Render { name: String, error: String },

    #[error("Template data could not be serialized: {0}")]
    Data(#[from] serde_json::Error),

    #[error("I/O error reading template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Document used by `jira edit`
pub const EDIT_TEMPLATE: &str = r#"# issue: {{key}}
update:
  comment:
    - add:
        body: |-

fields:
  summary: {{json fields.summary}}
  components:{{#each fields.components}}
    - name: {{json name}}{{/each}}
  assignee:
    name: {{json fields.assignee.name}}
  reporter:
    name: {{json fields.reporter.name}}
  labels: {{json fields.labels}}
  priority:
    name: {{json fields.priority.name}}
  description: |-
{{indent 4 fields.description}}
"#;

/// Document used by `jira create`
pub const CREATE_TEMPLATE: &str = r#"fields:
  project:
    key: {{json project}}
  issuetype:
    name: {{json issuetype}}
  summary: {{json overrides.summary}}
  priority:
    name: {{json overrides.priority}}
  components:
    - name: {{json overrides.component}}
  assignee:
    name: {{json overrides.assignee}}
  reporter:
    name: {{json overrides.reporter}}
  labels: []
  description: |-
{{indent 4 overrides.description}}
"#;

/// Document used by `jira comment`
pub const COMMENT_TEMPLATE: &str = r#"# comment on {{key}}
body: |-
{{indent 2 body}}
"#;

/// Human-readable issue summary used by `jira view`
pub const VIEW_TEMPLATE: &str = r#"issue: {{key}}
summary: {{fields.summary}}
status: {{fields.status.name}}
type: {{fields.issuetype.name}}
priority: {{fields.priority.name}}
assignee: {{fields.assignee.name}}
reporter: {{fields.reporter.name}}
labels: {{#each fields.labels}}{{this}} {{/each}}
description: |
{{indent 2 fields.description}}
"#;

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("edit", EDIT_TEMPLATE),
    ("create", CREATE_TEMPLATE),
    ("comment", COMMENT_TEMPLATE),
    ("view", VIEW_TEMPLATE),
];

handlebars_helper!(json: |value: Json| serde_json::to_string(value).unwrap_or_default());

handlebars_helper!(indent: |width: u64, text: Json| {
    let pad = " ".repeat(width as usize);
    text.as_str()
        .unwrap_or_default()
        .lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
});

/// Renders named templates
///
/// Templates are registered once at construction; rendering never touches
/// the filesystem.
pub struct TemplateService {
    registry: Handlebars<'static>,
}

impl TemplateService {
    /// Built-in templates only
    pub fn builtin() -> TemplateResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        registry.register_helper("json", Box::new(json));
        registry.register_helper("indent", Box::new(indent));

        for (name, source) in BUILTIN_TEMPLATES {
            Self::register(&mut registry, name, source)?;
        }

        Ok(Self { registry })
    }

    /// Built-ins overridden by `templates/*` files found in `config_dirs`
    ///
    /// `config_dirs` is ordered closest first, as returned by
    /// `ConfigManager::config_dirs`.
    pub fn with_overrides(config_dirs: &[PathBuf]) -> TemplateResult<Self> {
        let mut service = Self::builtin()?;

        for dir in config_dirs.iter().rev() {
            let templates = dir.join("templates");
            if !templates.is_dir() {
                continue;
            }
            let entries = fs::read_dir(&templates).map_err(|source| TemplateError::Io {
                path: templates.clone(),
                source,
            })?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    service.load_file(&path)?;
                }
            }
        }

        Ok(service)
    }

    /// Register a template from a file, named after the file
    pub fn load_file(&mut self, path: &Path) -> TemplateResult<()> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(());
        };
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(template = name, path = %path.display(), "loaded template override");
        Self::register(&mut self.registry, name, &source)
    }

    /// Register a template from a string
    pub fn register_template(&mut self, name: &str, source: &str) -> TemplateResult<()> {
        Self::register(&mut self.registry, name, source)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// Render template `name` with `data`
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> TemplateResult<String> {
        if !self.registry.has_template(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        let data = serde_json::to_value(data)?;
        self.registry
            .render(name, &data)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                error: e.to_string(),
            })
    }

    fn register(registry: &mut Handlebars<'static>, name: &str, source: &str) -> TemplateResult<()> {
        registry
            .register_template_string(name, source)
            .map_err(|e| TemplateError::Register {
                name: name.to_string(),
                error: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_yaml::Value;
    use tempfile::TempDir;

    #[test]
    fn test_edit_template_renders_valid_yaml() {
        let templates = TemplateService::builtin().unwrap();
        let issue = json!({
            "key": "PROJ-7",
            "fields": {
                "summary": "Crash: on startup",
                "labels": ["a", "b"],
                "assignee": {"name": "alice"},
                "description": "line one\nline two"
            }
        });
        let text = templates.render("edit", &issue).unwrap();
        let doc: Value = serde_yaml::from_str(&text).unwrap();

        assert_eq!(doc["fields"]["summary"], Value::from("Crash: on startup"));
        assert_eq!(doc["fields"]["assignee"]["name"], Value::from("alice"));
        assert_eq!(doc["fields"]["description"], Value::from("line one\nline two"));
        assert_eq!(doc["fields"]["priority"]["name"], Value::Null);
    }

    #[test]
    fn test_create_template_with_missing_overrides() {
        let templates = TemplateService::builtin().unwrap();
        let input = json!({"project": "PROJ", "issuetype": "Bug", "overrides": {}});
        let text = templates.render("create", &input).unwrap();
        let doc: Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(doc["fields"]["project"]["key"], Value::from("PROJ"));
        assert_eq!(doc["fields"]["issuetype"]["name"], Value::from("Bug"));
    }

    #[test]
    fn test_unknown_template() {
        let templates = TemplateService::builtin().unwrap();
        let err = templates.render("nope", &json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(name) if name == "nope"));
    }

    #[test]
    fn test_invalid_template_source() {
        let mut templates = TemplateService::builtin().unwrap();
        assert!(templates.register_template("broken", "{{#each}").is_err());
    }

    #[test]
    fn test_closest_override_wins() {
        let near = TempDir::new().unwrap();
        let far = TempDir::new().unwrap();
        for (dir, text) in [(&near, "near {{key}}"), (&far, "far {{key}}")] {
            fs::create_dir_all(dir.path().join("templates")).unwrap();
            fs::write(dir.path().join("templates/comment"), text).unwrap();
        }

        let dirs = vec![near.path().to_path_buf(), far.path().to_path_buf()];
        let templates = TemplateService::with_overrides(&dirs).unwrap();
        let out = templates.render("comment", &json!({"key": "X-1"})).unwrap();
        assert_eq!(out, "near X-1");
        assert!(templates.has_template("edit"));
    }

    #[test]
    fn test_no_html_escaping() {
        let mut templates = TemplateService::builtin().unwrap();
        templates.register_template("raw", "{{text}}").unwrap();
        let out = templates.render("raw", &json!({"text": "a < b && c"})).unwrap();
        assert_eq!(out, "a < b && c");
    }
}
