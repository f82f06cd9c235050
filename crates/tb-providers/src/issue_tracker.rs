//! Issue tracker strategy.
//!
//! Speaks the tracker's v3 REST API. All bodies come from [`crate::builders`];
//! this module owns endpoint selection, the subtask project-inheritance flow,
//! and shaping backend responses into command payloads.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tb_config::{AppConfig, ProviderCredentials};
use tb_types::{BridgeError, BridgeResult, ProviderKey, ProviderOperation};

use crate::http::ApiClient;
use crate::{builders, limit_param, optional_str, require_str, ProviderStrategy};

const API_BASE: &str = "/rest/api/3";

pub struct IssueTrackerProvider {
    client: ApiClient,
    max_results_cap: u32,
}

impl IssueTrackerProvider {
    pub fn new(credentials: ProviderCredentials, config: &AppConfig) -> BridgeResult<Self> {
        Ok(Self {
            client: ApiClient::new(credentials, &config.http)?,
            max_results_cap: config.search.max_results_cap,
        })
    }

    async fn create(&self, params: &Map<String, Value>) -> BridgeResult<Value> {
        let parent = optional_str(params, "parentKey");
        let project = match optional_str(params, "project") {
            Some(project) => project.to_string(),
            None => {
                let parent_key = parent.ok_or_else(|| {
                    BridgeError::validation("project", "required when parentKey is absent")
                })?;
                self.parent_project(parent_key).await?
            }
        };

        let body = builders::issue_create_body(&project, parent, params);
        let created = self
            .client
            .post(&format!("{}/issue", API_BASE), &body)
            .await?;

        let key = created
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = created
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(match parent {
            Some(parent_key) => json!({
                "key": key,
                "id": id,
                "parentKey": parent_key,
                "message": format!("Subtask {} created for {}", key, parent_key),
            }),
            None => json!({
                "key": key,
                "id": id,
                "message": format!("Issue {} created successfully", key),
            }),
        })
    }

    /// Subtasks inherit the parent's project, resolved with one extra GET.
    async fn parent_project(&self, parent_key: &str) -> BridgeResult<String> {
        let parent = self
            .client
            .get(&format!("{}/issue/{}", API_BASE, parent_key), &[])
            .await?;
        parent
            .pointer("/fields/project/key")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                BridgeError::ProviderInternal(format!(
                    "parent issue {} carries no project key",
                    parent_key
                ))
            })
    }

    async fn update(&self, params: &Map<String, Value>) -> BridgeResult<Value> {
        let key = require_str(params, "key")?;
        let body = builders::issue_update_body(params);
        // 204 No Content on success; the payload is synthesized here.
        self.client
            .put(&format!("{}/issue/{}", API_BASE, key), &body)
            .await?;
        Ok(json!({
            "key": key,
            "message": format!("Issue {} updated successfully", key),
        }))
    }

    async fn delete(&self, params: &Map<String, Value>) -> BridgeResult<Value> {
        let key = require_str(params, "key")?;
        self.client
            .delete(&format!("{}/issue/{}", API_BASE, key))
            .await?;
        Ok(json!({
            "key": key,
            "message": format!("Issue {} deleted successfully", key),
        }))
    }

    async fn search(&self, params: &Map<String, Value>) -> BridgeResult<Value> {
        let max_results = limit_param(params, "maxResults", 50, self.max_results_cap);
        let body = builders::issue_search_body(params, max_results);
        let found = self
            .client
            .post(&format!("{}/search", API_BASE), &body)
            .await?;

        let issues = found
            .get("issues")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let count = issues.as_array().map_or(0, Vec::len);
        Ok(json!({
            "issues": issues,
            "count": count,
            "message": format!("Found {} issues", count),
        }))
    }

    /// Connectivity snapshot. Sections are fetched independently so one
    /// failing endpoint still leaves the rest usable; the failure is reported
    /// inline under a `...Error` key.
    async fn debug_info(&self) -> BridgeResult<Value> {
        let mut info = Map::new();

        match self.client.get(&format!("{}/project", API_BASE), &[]).await {
            Ok(projects) => {
                let summary: Vec<Value> = projects
                    .as_array()
                    .map(|list| {
                        list.iter()
                            .map(|project| {
                                json!({
                                    "key": project.get("key").cloned().unwrap_or(Value::Null),
                                    "name": project.get("name").cloned().unwrap_or(Value::Null),
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                info.insert("projects".into(), Value::Array(summary));
            }
            Err(err) => {
                info.insert("projectsError".into(), Value::String(err.to_string()));
            }
        }

        match self
            .client
            .get(&format!("{}/issuetype", API_BASE), &[])
            .await
        {
            Ok(issuetypes) => {
                let summary: Vec<Value> = issuetypes
                    .as_array()
                    .map(|list| {
                        list.iter()
                            .map(|issuetype| {
                                json!({
                                    "name": issuetype.get("name").cloned().unwrap_or(Value::Null),
                                    "description": issuetype
                                        .get("description")
                                        .cloned()
                                        .unwrap_or_else(|| Value::String(String::new())),
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                info.insert("issuetypes".into(), Value::Array(summary));
            }
            Err(err) => {
                info.insert("issuetypesError".into(), Value::String(err.to_string()));
            }
        }

        match self.client.get(&format!("{}/myself", API_BASE), &[]).await {
            Ok(user) => {
                info.insert("currentUser".into(), user);
            }
            Err(err) => {
                info.insert("currentUserError".into(), Value::String(err.to_string()));
            }
        }

        Ok(Value::Object(info))
    }
}

#[async_trait]
impl ProviderStrategy for IssueTrackerProvider {
    fn key(&self) -> ProviderKey {
        ProviderKey::IssueTracker
    }

    async fn execute(
        &self,
        operation: ProviderOperation,
        params: &Map<String, Value>,
    ) -> BridgeResult<Value> {
        match operation {
            ProviderOperation::Create => self.create(params).await,
            ProviderOperation::Update => self.update(params).await,
            ProviderOperation::Delete => self.delete(params).await,
            ProviderOperation::Search => self.search(params).await,
            ProviderOperation::Debug => self.debug_info().await,
            ProviderOperation::SearchByParent => Err(BridgeError::ProviderInternal(format!(
                "issue tracker does not support {}",
                operation
            ))),
        }
    }
}
