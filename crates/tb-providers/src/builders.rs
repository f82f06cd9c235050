//! Pure request-body construction for both backends.
//!
//! Nothing here performs I/O. Each function turns validated command
//! parameters into an immutable, serializable body; the strategies decide
//! which endpoint it goes to.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{optional_str, string_array};

/// `{"key": ...}` reference used for projects, parent issues and spaces.
#[derive(Debug, Serialize)]
pub struct KeyRef {
    pub key: String,
}

/// `{"name": ...}` reference used for issue types and assignees.
#[derive(Debug, Serialize)]
pub struct NameRef {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct VersionRef {
    pub number: u64,
}

/// Issue fields accepted by the tracker's create and update endpoints.
/// Absent fields are omitted from the body entirely.
#[derive(Debug, Default, Serialize)]
pub struct IssueFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<KeyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<KeyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuetype: Option<NameRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<NameRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Epic link custom field as provisioned on standard cloud instances.
    #[serde(rename = "customfield_10014", skip_serializing_if = "Option::is_none")]
    pub epic_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IssuePayload {
    pub fields: IssueFields,
}

#[derive(Debug, Serialize)]
pub struct IssueSearchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jql: Option<String>,
    #[serde(rename = "maxResults")]
    pub max_results: u32,
}

/// Wrap plain text in the minimal rich-text document the tracker's v3 API
/// requires for description fields.
pub fn adf_document(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}

/// Optional fields shared by issue creation and update.
fn issue_fields(params: &Map<String, Value>) -> IssueFields {
    IssueFields {
        summary: optional_str(params, "summary").map(str::to_string),
        description: optional_str(params, "description").map(adf_document),
        issuetype: optional_str(params, "issuetype").map(|name| NameRef { name: name.into() }),
        assignee: optional_str(params, "assignee").map(|name| NameRef { name: name.into() }),
        labels: string_array(params, "labels"),
        ..IssueFields::default()
    }
}

/// Body for issue creation. `parent` switches the body into subtask form;
/// `project` is passed separately because subtasks inherit it from the parent
/// issue rather than from the request.
pub fn issue_create_body(
    project: &str,
    parent: Option<&str>,
    params: &Map<String, Value>,
) -> IssuePayload {
    let mut fields = issue_fields(params);
    fields.project = Some(KeyRef {
        key: project.to_string(),
    });
    fields.parent = parent.map(|key| KeyRef {
        key: key.to_string(),
    });
    fields.epic_link = optional_str(params, "epic").map(str::to_string);
    IssuePayload { fields }
}

/// Body for issue update: only the provided fields, nothing inherited.
pub fn issue_update_body(params: &Map<String, Value>) -> IssuePayload {
    IssuePayload {
        fields: issue_fields(params),
    }
}

/// JQL search body from the optional filters, AND-joined in a fixed order.
pub fn issue_search_body(params: &Map<String, Value>, max_results: u32) -> IssueSearchBody {
    let mut clauses = Vec::new();
    if let Some(project) = optional_str(params, "project") {
        clauses.push(format!("project = {}", jql_quote(project)));
    }
    if let Some(epic) = optional_str(params, "epic") {
        clauses.push(format!("\"Epic Link\" = {}", jql_quote(epic)));
    }
    if let Some(assignee) = optional_str(params, "assignee") {
        clauses.push(format!("assignee = {}", jql_quote(assignee)));
    }
    if let Some(status) = optional_str(params, "status") {
        clauses.push(format!("status = {}", jql_quote(status)));
    }
    if let Some(issuetype) = optional_str(params, "issuetype") {
        clauses.push(format!("issuetype = {}", jql_quote(issuetype)));
    }

    IssueSearchBody {
        jql: if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" AND "))
        },
        max_results,
    }
}

/// Quote a JQL string literal, escaping embedded quotes and backslashes.
fn jql_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Page body for the wiki's content endpoints.
#[derive(Debug, Serialize)]
pub struct PagePayload {
    #[serde(rename = "type")]
    pub content_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<KeyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<PageBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ancestors: Option<Vec<IdRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionRef>,
}

#[derive(Debug, Serialize)]
pub struct PageBody {
    pub storage: StorageBody,
}

#[derive(Debug, Serialize)]
pub struct StorageBody {
    pub value: String,
    pub representation: &'static str,
}

fn storage_body(content: &str) -> PageBody {
    PageBody {
        storage: StorageBody {
            value: content.to_string(),
            representation: "storage",
        },
    }
}

/// Body for page creation; `parent` becomes the sole ancestor entry.
pub fn page_create_body(
    space: &str,
    title: &str,
    content: &str,
    parent: Option<&str>,
) -> PagePayload {
    PagePayload {
        content_type: "page",
        title: Some(title.to_string()),
        space: Some(KeyRef {
            key: space.to_string(),
        }),
        body: Some(storage_body(content)),
        ancestors: parent.map(|id| vec![IdRef { id: id.to_string() }]),
        version: None,
    }
}

/// Body for page update. Title and space must already be resolved against the
/// current page (the backend requires both on every update); content is only
/// replaced when the request provides it.
pub fn page_update_body(
    title: String,
    space: String,
    content: Option<&str>,
    next_version: u64,
) -> PagePayload {
    PagePayload {
        content_type: "page",
        title: Some(title),
        space: Some(KeyRef { key: space }),
        body: content.map(storage_body),
        ancestors: None,
        version: Some(VersionRef {
            number: next_version,
        }),
    }
}
