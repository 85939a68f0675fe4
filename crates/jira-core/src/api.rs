// crates/jira-core/src/api.rs - REST calls used by the commands
//
// Thin wrappers: build the request, send it through the intercepting client,
// turn non-2xx responses into `HttpError::Status` with Jira's own messages.

use std::collections::BTreeMap;

use reqwest::Method;
use reqwest::blocking::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use crate::client::{HttpError, HttpResult, JiraClient};
use crate::document::{CommentDraft, IssueCreate, IssueEdit, IssueRef};

/// Error body returned by most Jira endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

impl ErrorBody {
    fn summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .error_messages
            .iter()
            .cloned()
            .chain(self.errors.iter().map(|(field, msg)| format!("{field}: {msg}")))
            .collect();
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

/// Human-readable message for a failed response body
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.summary())
        .unwrap_or_else(|| body.trim().to_string())
}

impl JiraClient {
    /// Send and require a successful status
    pub fn send(&self, method: Method, path: &str, body: Option<&JsonValue>) -> HttpResult<Response> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        check_status(self.execute(request)?)
    }

    /// `GET /rest/api/2/issue/{key}`
    pub fn get_issue(&self, key: &str) -> HttpResult<JsonValue> {
        let response = self.send(Method::GET, &format!("/rest/api/2/issue/{key}"), None)?;
        decode(response)
    }

    /// `PUT /rest/api/2/issue/{key}`
    pub fn edit_issue(&self, key: &str, edit: &IssueEdit) -> HttpResult<()> {
        let body = encode(edit)?;
        self.send(Method::PUT, &format!("/rest/api/2/issue/{key}"), Some(&body))?;
        Ok(())
    }

    /// `POST /rest/api/2/issue`
    pub fn create_issue(&self, create: &IssueCreate) -> HttpResult<IssueRef> {
        let body = encode(create)?;
        let response = self.send(Method::POST, "/rest/api/2/issue", Some(&body))?;
        decode(response)
    }

    /// `POST /rest/api/2/issue/{key}/comment`
    pub fn add_comment(&self, key: &str, comment: &CommentDraft) -> HttpResult<JsonValue> {
        let body = encode(comment)?;
        let response = self.send(
            Method::POST,
            &format!("/rest/api/2/issue/{key}/comment"),
            Some(&body),
        )?;
        decode(response)
    }

    /// `POST /rest/auth/1/session`; the session cookie is kept by the client
    pub fn create_session(&self, user: &str, password: &str) -> HttpResult<()> {
        let body = json!({ "username": user, "password": password });
        self.send(Method::POST, "/rest/auth/1/session", Some(&body))?;
        Ok(())
    }

    /// `DELETE /rest/auth/1/session`
    pub fn delete_session(&self) -> HttpResult<()> {
        self.send(Method::DELETE, "/rest/auth/1/session", None)?;
        Ok(())
    }
}

fn check_status(response: Response) -> HttpResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().unwrap_or_default();
    Err(HttpError::Status {
        url,
        status,
        message: error_message(&body),
    })
}

fn encode<T: Serialize>(body: &T) -> HttpResult<JsonValue> {
    serde_json::to_value(body).map_err(HttpError::Encode)
}

fn decode<T: DeserializeOwned>(response: Response) -> HttpResult<T> {
    Ok(response.json()?)
}
