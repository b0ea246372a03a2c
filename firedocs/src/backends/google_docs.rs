//! Google Docs and Drive REST client

use super::http::check_response;
use super::{service, DocsDocument, DocsPort};
use crate::auth::AccessTokenProvider;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const DOCS_BASE_URL: &str = "https://docs.googleapis.com/v1";
const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentResponse {
    document_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Value,
    #[serde(default)]
    revision_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// Docs port backed by the Docs v1 and Drive v3 REST APIs
pub struct GoogleDocs {
    docs_url: String,
    drive_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GoogleDocs {
    /// Create a client authorized by `tokens`
    pub fn new(http: reqwest::Client, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self::with_base_urls(DOCS_BASE_URL, DRIVE_BASE_URL, http, tokens)
    }

    /// Create a client against different API roots
    pub fn with_base_urls(
        docs_url: &str,
        drive_url: &str,
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            docs_url: docs_url.trim_end_matches('/').to_string(),
            drive_url: drive_url.trim_end_matches('/').to_string(),
            http,
            tokens,
        }
    }

    fn document_url(&self, document_id: &str) -> String {
        let encoded: String =
            url::form_urlencoded::byte_serialize(document_id.as_bytes()).collect();
        format!("{}/documents/{}", self.docs_url, encoded)
    }
}

#[async_trait]
impl DocsPort for GoogleDocs {
    async fn get_document(&self, document_id: &str) -> Result<DocsDocument> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(self.document_url(document_id))
            .bearer_auth(token)
            .send()
            .await?;
        let document: DocumentResponse = check_response(service::DOCS, response)
            .await?
            .json()
            .await?;
        Ok(DocsDocument {
            document_id: document.document_id,
            title: document.title,
            body: document.body,
            revision_id: document.revision_id,
        })
    }

    async fn create_file(&self, title: &str) -> Result<String> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(format!("{}/files", self.drive_url))
            .bearer_auth(token)
            .json(&json!({ "name": title, "mimeType": DOCUMENT_MIME_TYPE }))
            .send()
            .await?;
        let file: DriveFile = check_response(service::DOCS, response)
            .await?
            .json()
            .await?;
        tracing::info!("Created document file {}", file.id);
        Ok(file.id)
    }

    async fn insert_text(&self, document_id: &str, text: &str) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let body = json!({
            "requests": [
                { "insertText": { "location": { "index": 1 }, "text": text } }
            ]
        });
        let response = self
            .http
            .post(format!("{}:batchUpdate", self.document_url(document_id)))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        check_response(service::DOCS, response).await?;
        Ok(())
    }
}
