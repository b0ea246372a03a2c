//! Tool handlers for MCP operations
//!
//! One method per tool. Each validates its request, makes the backend call and
//! shapes the success payload; failures propagate as [`FiredocsError`] and are
//! turned into envelopes by the registry.

use super::types::*;
use crate::backends::{
    Backends, CollectionPath, DatabasePath, NewUser, OrderBy, QueryOptions, UserUpdate,
};
use crate::error::{FiredocsError, Result};
use serde_json::{json, Map, Value};

/// Tool handlers for MCP server operations
pub struct ToolHandlers {
    backends: Backends,
}

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FiredocsError::invalid_arguments(format!(
            "'{field}' must not be empty"
        )));
    }
    Ok(())
}

impl ToolHandlers {
    /// Create new tool handlers over the given backends
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    /// The backends the handlers call
    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    /// Handle the create_user tool operation
    pub async fn handle_create_user(
        &self,
        request: CreateUserRequest,
    ) -> Result<Map<String, Value>> {
        require_non_empty("email", &request.email)?;
        require_non_empty("password", &request.password)?;

        let user = self
            .backends
            .identity
            .create_user(&NewUser {
                email: request.email,
                password: request.password,
                display_name: request.display_name,
            })
            .await?;
        tracing::info!("Created user {}", user.uid);
        Ok(payload(json!({ "uid": user.uid, "email": user.email })))
    }

    /// Handle the get_user tool operation
    pub async fn handle_get_user(&self, request: UserIdRequest) -> Result<Map<String, Value>> {
        require_non_empty("uid", &request.uid)?;
        let user = self.backends.identity.get_user(&request.uid).await?;
        Ok(payload(json!({
            "uid": user.uid,
            "email": user.email,
            "display_name": user.display_name,
            "photo_url": user.photo_url,
            "email_verified": user.email_verified,
            "disabled": user.disabled,
        })))
    }

    /// Handle the update_user tool operation
    pub async fn handle_update_user(
        &self,
        request: UpdateUserRequest,
    ) -> Result<Map<String, Value>> {
        require_non_empty("uid", &request.uid)?;
        let update = UserUpdate {
            email: request.email,
            display_name: request.display_name,
            password: request.password,
        };
        let user = self
            .backends
            .identity
            .update_user(&request.uid, &update)
            .await?;
        Ok(payload(json!({
            "uid": user.uid,
            "email": user.email,
            "display_name": user.display_name,
        })))
    }

    /// Handle the delete_user tool operation
    pub async fn handle_delete_user(&self, request: UserIdRequest) -> Result<Map<String, Value>> {
        require_non_empty("uid", &request.uid)?;
        self.backends.identity.delete_user(&request.uid).await?;
        tracing::info!("Deleted user {}", request.uid);
        Ok(payload(json!({
            "message": format!("User {} deleted", request.uid),
            "uid": request.uid,
        })))
    }

    /// Handle the list_users tool operation
    pub async fn handle_list_users(&self, _request: EmptyRequest) -> Result<Map<String, Value>> {
        let users = self.backends.identity.list_users().await?;
        let uids: Vec<String> = users.into_iter().map(|user| user.uid).collect();
        Ok(payload(json!({ "count": uids.len(), "uids": uids })))
    }

    /// Handle the generate_email_verification_link tool operation
    pub async fn handle_email_verification_link(
        &self,
        request: EmailVerificationLinkRequest,
    ) -> Result<Map<String, Value>> {
        require_non_empty("uid", &request.uid)?;
        let link = self
            .backends
            .identity
            .email_verification_link(&request.uid, request.action_url.as_deref())
            .await?;
        Ok(payload(json!({ "link": link })))
    }

    /// Handle the generate_password_reset_link tool operation
    pub async fn handle_password_reset_link(
        &self,
        request: PasswordResetLinkRequest,
    ) -> Result<Map<String, Value>> {
        require_non_empty("email", &request.email)?;
        let link = self
            .backends
            .identity
            .password_reset_link(&request.email, request.action_url.as_deref())
            .await?;
        Ok(payload(json!({ "link": link })))
    }

    /// Handle the set_data tool operation
    pub async fn handle_set_data(&self, request: SetDataRequest) -> Result<Map<String, Value>> {
        let path = DatabasePath::parse(&request.path)?;
        self.backends.tree_store.set(&path, &request.data).await?;
        Ok(payload(json!({ "path": path.to_string() })))
    }

    /// Handle the get_data tool operation
    pub async fn handle_get_data(&self, request: PathRequest) -> Result<Map<String, Value>> {
        let path = DatabasePath::parse(&request.path)?;
        let data = self.backends.tree_store.get(&path).await?;
        Ok(payload(json!({ "data": data })))
    }

    /// Handle the update_data tool operation
    pub async fn handle_update_data(
        &self,
        request: UpdateDataRequest,
    ) -> Result<Map<String, Value>> {
        let path = DatabasePath::parse(&request.path)?;
        self.backends.tree_store.update(&path, &request.data).await?;
        Ok(payload(json!({ "path": path.to_string() })))
    }

    /// Handle the delete_data tool operation
    pub async fn handle_delete_data(&self, request: PathRequest) -> Result<Map<String, Value>> {
        let path = DatabasePath::parse(&request.path)?;
        self.backends.tree_store.delete(&path).await?;
        Ok(payload(json!({ "path": path.to_string() })))
    }

    /// Handle the query_data tool operation
    ///
    /// An empty `order_by` or a zero `limit` counts as absent.
    pub async fn handle_query_data(&self, request: QueryDataRequest) -> Result<Map<String, Value>> {
        let path = DatabasePath::parse(&request.path)?;
        let order_by = request
            .order_by
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(OrderBy::parse)
            .transpose()?;
        let limit = request
            .limit
            .filter(|limit| *limit > 0)
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX));

        let results = self
            .backends
            .tree_store
            .query(&path, &QueryOptions { order_by, limit })
            .await?;
        Ok(payload(json!({ "results": results })))
    }

    /// Handle the firestore_list_collections tool operation
    pub async fn handle_firestore_list_collections(
        &self,
        _request: EmptyRequest,
    ) -> Result<Map<String, Value>> {
        let collections = self.backends.document_store.list_collections().await?;
        Ok(payload(json!({
            "collections": collections,
            "count": collections.len(),
        })))
    }

    /// Handle the firestore_list_documents tool operation
    pub async fn handle_firestore_list_documents(
        &self,
        request: CollectionRequest,
    ) -> Result<Map<String, Value>> {
        let collection = CollectionPath::parse(&request.collection)?;
        let documents = self
            .backends
            .document_store
            .list_documents(&collection)
            .await?;
        Ok(payload(json!({
            "count": documents.len(),
            "documents": documents,
        })))
    }

    /// Handle the firestore_get_document tool operation
    pub async fn handle_firestore_get_document(
        &self,
        request: FirestoreDocumentRequest,
    ) -> Result<Map<String, Value>> {
        let collection = CollectionPath::parse(&request.collection)?;
        let data = self
            .backends
            .document_store
            .get_document(&collection, &request.document_id)
            .await?;
        Ok(payload(json!({
            "id": request.document_id,
            "data": data,
        })))
    }

    /// Handle the firestore_create_document tool operation
    pub async fn handle_firestore_create_document(
        &self,
        request: FirestoreCreateDocumentRequest,
    ) -> Result<Map<String, Value>> {
        let collection = CollectionPath::parse(&request.collection)?;
        let id = self
            .backends
            .document_store
            .create_document(&collection, request.document_id.as_deref(), &request.data)
            .await?;
        Ok(payload(json!({ "id": id })))
    }

    /// Handle the firestore_update_document tool operation
    pub async fn handle_firestore_update_document(
        &self,
        request: FirestoreUpdateDocumentRequest,
    ) -> Result<Map<String, Value>> {
        let collection = CollectionPath::parse(&request.collection)?;
        self.backends
            .document_store
            .update_document(&collection, &request.document_id, &request.data)
            .await?;
        Ok(payload(json!({ "id": request.document_id })))
    }

    /// Handle the firestore_delete_document tool operation
    pub async fn handle_firestore_delete_document(
        &self,
        request: FirestoreDocumentRequest,
    ) -> Result<Map<String, Value>> {
        let collection = CollectionPath::parse(&request.collection)?;
        self.backends
            .document_store
            .delete_document(&collection, &request.document_id)
            .await?;
        Ok(payload(json!({
            "id": request.document_id,
            "message": format!("Document {}/{} deleted", collection, request.document_id),
        })))
    }

    /// Handle the get_document tool operation
    pub async fn handle_get_document(
        &self,
        request: DocumentIdRequest,
    ) -> Result<Map<String, Value>> {
        require_non_empty("document_id", &request.document_id)?;
        let document = self.backends.docs.get_document(&request.document_id).await?;
        Ok(payload(json!({
            "document_id": document.document_id,
            "title": document.title,
            "body": document.body,
            "revision_id": document.revision_id,
        })))
    }

    /// Handle the create_document tool operation
    ///
    /// The file is created first, then the content is inserted. When the
    /// insert fails the created document is left in place and its id is part
    /// of the error.
    pub async fn handle_create_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<Map<String, Value>> {
        require_non_empty("title", &request.title)?;
        let content = request.content.unwrap_or_default();
        let document_id = self.backends.docs.create_file(&request.title).await?;

        if !content.is_empty() {
            if let Err(source) = self.backends.docs.insert_text(&document_id, &content).await
            {
                tracing::error!(
                    "Document {} created but content insert failed: {}",
                    document_id,
                    source
                );
                return Err(FiredocsError::PartialCreate {
                    document_id,
                    source: Box::new(source),
                });
            }
        }

        Ok(payload(json!({
            "message": format!("Document '{}' created", request.title),
            "document_id": document_id,
            "title": request.title,
        })))
    }
}
