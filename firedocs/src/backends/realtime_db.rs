//! Realtime Database REST client

use super::http::check_response;
use super::ordering::{order_children, OrderBy};
use super::{service, DatabasePath, QueryOptions, TreeStorePort};
use crate::auth::AccessTokenProvider;
use crate::error::{FiredocsError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

/// Tree-store port backed by the Realtime Database REST API
pub struct RealtimeDatabase {
    base_url: Url,
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl RealtimeDatabase {
    /// Create a client for the database at `database_url`
    pub fn new(
        database_url: &str,
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let base_url = Url::parse(database_url).map_err(|e| {
            FiredocsError::Config(format!("invalid database URL '{database_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FiredocsError::Config(format!(
                "database URL '{database_url}' cannot be used as a base URL"
            )));
        }
        Ok(Self {
            base_url,
            http,
            tokens,
        })
    }

    /// Default database URL for a project
    pub fn default_url(project_id: &str) -> String {
        format!("https://{project_id}-default-rtdb.firebaseio.com")
    }

    /// `{base}/{segments...}.json`
    fn location(&self, path: &DatabasePath) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            match path.segments().split_last() {
                Some((last, parents)) => {
                    segments.extend(parents);
                    segments.push(&format!("{last}.json"));
                }
                None => {
                    segments.push(".json");
                }
            }
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        path: &DatabasePath,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let token = self.tokens.access_token().await?;
        let mut request = self
            .http
            .request(method.clone(), self.location(path))
            .bearer_auth(token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!("{} {}", method, path);
        let response = request.send().await?;
        check_response(service::DATABASE, response).await
    }
}

#[async_trait]
impl TreeStorePort for RealtimeDatabase {
    async fn set(&self, path: &DatabasePath, data: &Value) -> Result<()> {
        self.send(Method::PUT, path, &[("print", "silent".into())], Some(data))
            .await?;
        Ok(())
    }

    async fn get(&self, path: &DatabasePath) -> Result<Value> {
        let response = self.send(Method::GET, path, &[], None).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, path: &DatabasePath, data: &Map<String, Value>) -> Result<()> {
        let body = Value::Object(data.clone());
        self.send(Method::PATCH, path, &[("print", "silent".into())], Some(&body))
            .await?;
        Ok(())
    }

    async fn delete(&self, path: &DatabasePath) -> Result<()> {
        self.send(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    async fn query(&self, path: &DatabasePath, options: &QueryOptions) -> Result<Value> {
        let mut query = Vec::new();
        // A server-side limit needs an ordering; plain key order is the default
        if let Some(limit) = options.limit {
            let order_by = options.order_by.clone().unwrap_or(OrderBy::Key);
            query.push(("orderBy", order_by.to_query_param()));
            query.push(("limitToFirst", limit.to_string()));
        }

        let response = self.send(Method::GET, path, &query, None).await?;
        let value: Value = response.json().await?;

        // The REST API returns matches unsorted
        Ok(order_children(value, options.order_by.as_ref(), options.limit))
    }
}
