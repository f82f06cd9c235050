//! Wiki strategy.
//!
//! Speaks the wiki's content REST API. The update path is a read-modify-write:
//! the backend requires title, space and a bumped version number on every PUT,
//! so the current page is fetched first and fields the request omits are
//! carried over unchanged.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tb_config::{AppConfig, ProviderCredentials};
use tb_types::{BridgeError, BridgeResult, ProviderKey, ProviderOperation};

use crate::http::ApiClient;
use crate::{builders, limit_param, optional_str, require_str, ProviderStrategy};

const API_BASE: &str = "/rest/api";

pub struct WikiProvider {
    client: ApiClient,
    max_results_cap: u32,
}

impl WikiProvider {
    pub fn new(credentials: ProviderCredentials, config: &AppConfig) -> BridgeResult<Self> {
        Ok(Self {
            client: ApiClient::new(credentials, &config.http)?,
            max_results_cap: config.search.max_results_cap,
        })
    }

    async fn create(&self, params: &Map<String, Value>) -> BridgeResult<Value> {
        let space = require_str(params, "space")?;
        let title = require_str(params, "title")?;
        let content = require_str(params, "content")?;
        let parent = optional_str(params, "parent");

        let body = builders::page_create_body(space, title, content, parent);
        let created = self
            .client
            .post(&format!("{}/content", API_BASE), &body)
            .await?;

        let created_title = created
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(title);
        Ok(json!({
            "id": created.get("id").cloned().unwrap_or(Value::Null),
            "title": created_title,
            "message": format!("Page '{}' created successfully", created_title),
        }))
    }

    async fn get_page(&self, page_id: &str) -> BridgeResult<Value> {
        self.client
            .get(
                &format!("{}/content/{}", API_BASE, page_id),
                &[("expand", "body.storage,space,ancestors,version".to_string())],
            )
            .await
    }

    async fn update(&self, params: &Map<String, Value>) -> BridgeResult<Value> {
        let page_id = require_str(params, "pageId")?;

        let current = self.get_page(page_id).await?;
        let current_version = current
            .pointer("/version/number")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                BridgeError::ProviderInternal(format!("page {} carries no version number", page_id))
            })?;
        let title = match optional_str(params, "title") {
            Some(title) => title.to_string(),
            None => current
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    BridgeError::ProviderInternal(format!("page {} carries no title", page_id))
                })?,
        };
        let space = match optional_str(params, "space") {
            Some(space) => space.to_string(),
            None => current
                .pointer("/space/key")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    BridgeError::ProviderInternal(format!("page {} carries no space key", page_id))
                })?,
        };

        let body = builders::page_update_body(
            title,
            space,
            optional_str(params, "content"),
            current_version + 1,
        );
        let updated = self
            .client
            .put(&format!("{}/content/{}", API_BASE, page_id), &body)
            .await?;

        Ok(json!({
            "id": updated.get("id").cloned().unwrap_or_else(|| Value::String(page_id.to_string())),
            "title": updated.get("title").cloned().unwrap_or(Value::Null),
            "message": format!("Page {} updated successfully", page_id),
        }))
    }

    async fn delete(&self, params: &Map<String, Value>) -> BridgeResult<Value> {
        let page_id = require_str(params, "pageId")?;
        self.client
            .delete(&format!("{}/content/{}", API_BASE, page_id))
            .await?;
        Ok(json!({
            "id": page_id,
            "message": format!("Page {} deleted successfully", page_id),
        }))
    }

    async fn search(&self, params: &Map<String, Value>) -> BridgeResult<Value> {
        let space = require_str(params, "space")?;
        let limit = limit_param(params, "limit", 50, self.max_results_cap);

        let mut query = vec![("spaceKey", space.to_string())];
        if let Some(title) = optional_str(params, "title") {
            query.push(("title", title.to_string()));
        }
        query.push(("type", "page".to_string()));
        query.push(("expand", "space,ancestors".to_string()));
        query.push(("limit", limit.to_string()));

        let found = self
            .client
            .get(&format!("{}/content", API_BASE), &query)
            .await?;
        Ok(page_list(&found, "pages"))
    }

    async fn search_by_parent(&self, params: &Map<String, Value>) -> BridgeResult<Value> {
        let parent_id = require_str(params, "parentId")?;
        let limit = limit_param(params, "limit", 50, self.max_results_cap);

        let query = [
            ("type", "page".to_string()),
            ("expand", "space,ancestors".to_string()),
            ("limit", limit.to_string()),
        ];
        let found = self
            .client
            .get(
                &format!("{}/content/{}/child/page", API_BASE, parent_id),
                &query,
            )
            .await?;
        Ok(page_list(&found, "child pages"))
    }

    /// Connectivity snapshot, per-section failure capture as in the issue
    /// tracker's debug operation.
    async fn debug_info(&self) -> BridgeResult<Value> {
        let mut info = Map::new();

        match self
            .client
            .get(&format!("{}/space", API_BASE), &[("limit", "100".to_string())])
            .await
        {
            Ok(spaces) => {
                let summary: Vec<Value> = spaces
                    .get("results")
                    .and_then(Value::as_array)
                    .map(|list| {
                        list.iter()
                            .map(|space| {
                                json!({
                                    "key": space.get("key").cloned().unwrap_or(Value::Null),
                                    "name": space.get("name").cloned().unwrap_or(Value::Null),
                                    "type": space.get("type").cloned().unwrap_or(Value::Null),
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                info.insert("spaces".into(), Value::Array(summary));
            }
            Err(err) => {
                info.insert("spacesError".into(), Value::String(err.to_string()));
            }
        }

        match self
            .client
            .get(&format!("{}/user/current", API_BASE), &[])
            .await
        {
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

/// Shape a content listing into the `{pages, count, message}` payload.
fn page_list(found: &Value, noun: &str) -> Value {
    let pages = found
        .get("results")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    let count = pages.as_array().map_or(0, Vec::len);
    json!({
        "pages": pages,
        "count": count,
        "message": format!("Found {} {}", count, noun),
    })
}

#[async_trait]
impl ProviderStrategy for WikiProvider {
    fn key(&self) -> ProviderKey {
        ProviderKey::Wiki
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
            ProviderOperation::SearchByParent => self.search_by_parent(params).await,
            ProviderOperation::Debug => self.debug_info().await,
        }
    }
}
