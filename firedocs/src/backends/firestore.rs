//! Cloud Firestore REST client

use super::firestore_value::{field_path, from_fields, to_fields};
use super::http::check_response;
use super::path::validate_document_id;
use super::{service, CollectionPath, DocumentSnapshot, DocumentStorePort};
use crate::auth::AccessTokenProvider;
use crate::error::{FiredocsError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl Document {
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    fn into_snapshot(self) -> Result<DocumentSnapshot> {
        Ok(DocumentSnapshot {
            id: self.id().to_string(),
            data: from_fields(&self.fields)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCollectionIdsResponse {
    #[serde(default)]
    collection_ids: Vec<String>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Document-store port backed by the Firestore v1 REST API
pub struct Firestore {
    documents_url: Url,
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl Firestore {
    /// Create a client for the default database of `project_id`
    pub fn new(
        project_id: &str,
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, project_id, http, tokens)
    }

    /// Create a client against a different API root, such as the emulator
    pub fn with_base_url(
        base_url: &str,
        project_id: &str,
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let raw = format!(
            "{}/projects/{}/databases/(default)/documents",
            base_url.trim_end_matches('/'),
            project_id
        );
        let documents_url = Url::parse(&raw)
            .map_err(|e| FiredocsError::Config(format!("invalid Firestore URL '{raw}': {e}")))?;
        Ok(Self {
            documents_url,
            http,
            tokens,
        })
    }

    fn url(&self, collection: &CollectionPath, document_id: Option<&str>) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(collection.segments());
            if let Some(id) = document_id {
                segments.push(id);
            }
        }
        url
    }

    async fn request(&self, method: reqwest::Method, url: Url) -> Result<reqwest::RequestBuilder> {
        let token = self.tokens.access_token().await?;
        tracing::debug!("firestore {} {}", method, url.path());
        Ok(self.http.request(method, url).bearer_auth(token))
    }
}

#[async_trait]
impl DocumentStorePort for Firestore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let url = Url::parse(&format!("{}:listCollectionIds", self.documents_url))
            .map_err(|e| FiredocsError::Config(e.to_string()))?;
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut body = json!({ "pageSize": PAGE_SIZE });
            if let Some(page) = &page_token {
                body["pageToken"] = Value::from(page.as_str());
            }
            let response = self
                .request(reqwest::Method::POST, url.clone())
                .await?
                .json(&body)
                .send()
                .await?;
            let page: ListCollectionIdsResponse = check_response(service::FIRESTORE, response)
                .await?
                .json()
                .await?;
            ids.extend(page.collection_ids);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(ids)
    }

    async fn list_documents(&self, collection: &CollectionPath) -> Result<Vec<DocumentSnapshot>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(page) = &page_token {
                query.push(("pageToken", page.clone()));
            }
            let response = self
                .request(reqwest::Method::GET, self.url(collection, None))
                .await?
                .query(&query)
                .send()
                .await?;
            let page: ListDocumentsResponse = check_response(service::FIRESTORE, response)
                .await?
                .json()
                .await?;
            for document in page.documents {
                documents.push(document.into_snapshot()?);
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(documents)
    }

    async fn get_document(
        &self,
        collection: &CollectionPath,
        document_id: &str,
    ) -> Result<Option<Map<String, Value>>> {
        validate_document_id(document_id)?;
        let response = self
            .request(reqwest::Method::GET, self.url(collection, Some(document_id)))
            .await?
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document: Document = check_response(service::FIRESTORE, response)
            .await?
            .json()
            .await?;
        Ok(Some(from_fields(&document.fields)?))
    }

    async fn create_document(
        &self,
        collection: &CollectionPath,
        document_id: Option<&str>,
        data: &Map<String, Value>,
    ) -> Result<String> {
        let fields = to_fields(data)?;
        let mut request = self
            .request(reqwest::Method::POST, self.url(collection, None))
            .await?;
        if let Some(id) = document_id {
            validate_document_id(id)?;
            request = request.query(&[("documentId", id)]);
        }
        let response = request
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let document: Document = check_response(service::FIRESTORE, response)
            .await?
            .json()
            .await?;
        tracing::info!("Created document {}/{}", collection, document.id());
        Ok(document.id().to_string())
    }

    async fn update_document(
        &self,
        collection: &CollectionPath,
        document_id: &str,
        data: &Map<String, Value>,
    ) -> Result<()> {
        validate_document_id(document_id)?;
        // A patch without a mask would clear every field
        if data.is_empty() {
            return match self.get_document(collection, document_id).await? {
                Some(_) => Ok(()),
                None => Err(FiredocsError::not_found(
                    service::FIRESTORE,
                    format!("no document {collection}/{document_id}"),
                )),
            };
        }
        let fields = to_fields(data)?;
        let mut query: Vec<(&str, String)> = data
            .keys()
            .map(|key| ("updateMask.fieldPaths", field_path(key)))
            .collect();
        query.push(("currentDocument.exists", "true".to_string()));

        let response = self
            .request(reqwest::Method::PATCH, self.url(collection, Some(document_id)))
            .await?
            .query(&query)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        check_response(service::FIRESTORE, response).await?;
        Ok(())
    }

    async fn delete_document(&self, collection: &CollectionPath, document_id: &str) -> Result<()> {
        validate_document_id(document_id)?;
        let response = self
            .request(reqwest::Method::DELETE, self.url(collection, Some(document_id)))
            .await?
            .send()
            .await?;
        check_response(service::FIRESTORE, response).await?;
        tracing::info!("Deleted document {}/{}", collection, document_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOCS_PATH: &str = "/projects/demo/databases/(default)/documents";

    fn client(server: &MockServer) -> Firestore {
        Firestore::with_base_url(
            &server.uri(),
            "demo",
            reqwest::Client::new(),
            Arc::new(StaticToken("t".to_string())),
        )
        .unwrap()
    }

    fn users() -> CollectionPath {
        CollectionPath::parse("users").unwrap()
    }

    #[tokio::test]
    async fn test_missing_document_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOCS_PATH}/users/ghost")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "Document not found", "status": "NOT_FOUND"}
            })))
            .mount(&server)
            .await;

        let document = client(&server).get_document(&users(), "ghost").await.unwrap();
        assert!(document.is_none());
    }

    #[tokio::test]
    async fn test_get_decodes_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOCS_PATH}/users/u1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/demo/databases/(default)/documents/users/u1",
                "fields": {"name": {"stringValue": "Ana"}, "age": {"integerValue": "31"}}
            })))
            .mount(&server)
            .await;

        let data = client(&server)
            .get_document(&users(), "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(Value::Object(data), json!({"name": "Ana", "age": 31}));
    }

    #[tokio::test]
    async fn test_create_with_id_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{DOCS_PATH}/users")))
            .and(query_param("documentId", "u9"))
            .and(body_json(json!({"fields": {"name": {"stringValue": "Bo"}}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/demo/databases/(default)/documents/users/u9",
                "fields": {"name": {"stringValue": "Bo"}}
            })))
            .mount(&server)
            .await;

        let data = json!({"name": "Bo"});
        let id = client(&server)
            .create_document(&users(), Some("u9"), data.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(id, "u9");
    }

    #[tokio::test]
    async fn test_update_masks_supplied_fields_and_requires_existence() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{DOCS_PATH}/users/u1")))
            .and(query_param("updateMask.fieldPaths", "age"))
            .and(query_param("currentDocument.exists", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/demo/databases/(default)/documents/users/u1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data = json!({"age": 32});
        client(&server)
            .update_document(&users(), "u1", data.as_object().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_collections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{DOCS_PATH}:listCollectionIds")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"collectionIds": ["orders", "users"]})),
            )
            .mount(&server)
            .await;

        let ids = client(&server).list_collections().await.unwrap();
        assert_eq!(ids, ["orders", "users"]);
    }

    #[tokio::test]
    async fn test_permission_denied_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let err = client(&server).list_documents(&users()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "firestore permission denied: Missing or insufficient permissions."
        );
    }
}
