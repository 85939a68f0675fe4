// crates/jira-core/src/document.rs - Documents edited and submitted by commands
//
// Field values are kept as JSON values: the set of fields an issue may carry
// is defined by each Jira instance, and the client only forwards them. The
// top-level shape is fixed, and unknown top-level keys are rejected so a
// misspelt `feilds:` is reported back to the user instead of being dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Field name → value, as sent to Jira
pub type FieldMap = BTreeMap<String, JsonValue>;

/// Body of `PUT /rest/api/2/issue/{key}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueEdit {
    /// Operations such as `comment: [{add: {body: ...}}]`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub update: FieldMap,

    /// Field values to set
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: FieldMap,
}

/// Body of `POST /rest/api/2/issue`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueCreate {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub update: FieldMap,

    #[serde(default)]
    pub fields: FieldMap,
}

impl IssueCreate {
    /// A create request preset with project and issue type
    pub fn for_project(project: &str, issuetype: &str) -> Self {
        let mut fields = FieldMap::new();
        fields.insert("project".into(), serde_json::json!({ "key": project }));
        fields.insert("issuetype".into(), serde_json::json!({ "name": issuetype }));
        Self {
            update: FieldMap::new(),
            fields,
        }
    }
}

/// Body of `POST /rest/api/2/issue/{key}/comment`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentDraft {
    #[serde(default)]
    pub body: String,
}

/// Identifies an issue returned by a create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default)]
    pub url: String,
}
