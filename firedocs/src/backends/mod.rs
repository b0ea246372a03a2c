//! Backend ports for the remote services the tools operate on
//!
//! Each port is a narrow async trait with one method per backend operation.
//! The REST implementations talk to the Google APIs; [`memory`] provides
//! in-process implementations for tests and offline runs. Every operation
//! returns [`Result`] so the tool layer can turn failures into envelopes.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub mod connect;
pub mod firestore;
pub mod firestore_value;
pub mod google_docs;
pub mod http;
pub mod identity_toolkit;
pub mod memory;
pub mod ordering;
pub mod path;
pub mod realtime_db;

pub use connect::{credential_manager, RemoteBackends};
pub use ordering::OrderBy;
pub use path::{CollectionPath, DatabasePath};

/// Service names used in backend error messages
pub mod service {
    /// Firebase Authentication
    pub const IDENTITY: &str = "identity";
    /// Realtime Database
    pub const DATABASE: &str = "database";
    /// Cloud Firestore
    pub const FIRESTORE: &str = "firestore";
    /// Google Docs and Drive
    pub const DOCS: &str = "docs";
}

/// A user account in the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique user id
    pub uid: String,
    /// Primary email address
    pub email: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Profile photo URL
    pub photo_url: Option<String>,
    /// Whether the email address was verified
    pub email_verified: bool,
    /// Whether the account is disabled
    pub disabled: bool,
}

/// Fields for a new user account
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address
    pub email: String,
    /// Initial password
    pub password: String,
    /// Optional display name
    pub display_name: Option<String>,
}

/// A partial update of a user account; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    /// New email address
    pub email: Option<String>,
    /// New display name
    pub display_name: Option<String>,
    /// New password
    pub password: Option<String>,
}

impl UserUpdate {
    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.display_name.is_none() && self.password.is_none()
    }
}

/// User identity operations
#[async_trait]
pub trait IdentityPort: Send + Sync {
    /// Create a user account
    async fn create_user(&self, user: &NewUser) -> Result<UserRecord>;
    /// Look up a user by uid; an unknown uid is a not-found failure
    async fn get_user(&self, uid: &str) -> Result<UserRecord>;
    /// Apply the set fields of `update` and return the updated account
    async fn update_user(&self, uid: &str, update: &UserUpdate) -> Result<UserRecord>;
    /// Delete a user account
    async fn delete_user(&self, uid: &str) -> Result<()>;
    /// Every user account
    async fn list_users(&self) -> Result<Vec<UserRecord>>;
    /// Email verification link for the user's address
    async fn email_verification_link(&self, uid: &str, action_url: Option<&str>) -> Result<String>;
    /// Password reset link for an email address
    async fn password_reset_link(&self, email: &str, action_url: Option<&str>) -> Result<String>;
}

/// Ordering and limit for a tree-store query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// How children are ordered
    pub order_by: Option<OrderBy>,
    /// Keep only the first `limit` children after ordering
    pub limit: Option<usize>,
}

/// Hierarchical key-path store operations
#[async_trait]
pub trait TreeStorePort: Send + Sync {
    /// Replace the value at `path`
    async fn set(&self, path: &DatabasePath, data: &Value) -> Result<()>;
    /// Value at `path`, or `Value::Null` if nothing is stored there
    async fn get(&self, path: &DatabasePath) -> Result<Value>;
    /// Merge `data` into the children of `path`
    async fn update(&self, path: &DatabasePath, data: &Map<String, Value>) -> Result<()>;
    /// Remove the value at `path`
    async fn delete(&self, path: &DatabasePath) -> Result<()>;
    /// Children of `path`, ordered and then limited
    async fn query(&self, path: &DatabasePath, options: &QueryOptions) -> Result<Value>;
}

/// A document with its id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSnapshot {
    /// Document id within its collection
    pub id: String,
    /// Document fields as plain JSON
    pub data: Map<String, Value>,
}

/// Collection/document store operations
#[async_trait]
pub trait DocumentStorePort: Send + Sync {
    /// Ids of the root collections
    async fn list_collections(&self) -> Result<Vec<String>>;
    /// Every document in a collection
    async fn list_documents(&self, collection: &CollectionPath) -> Result<Vec<DocumentSnapshot>>;
    /// A document's fields, or `None` if it does not exist
    async fn get_document(
        &self,
        collection: &CollectionPath,
        document_id: &str,
    ) -> Result<Option<Map<String, Value>>>;
    /// Create a document, generating an id when none is given; returns the id
    async fn create_document(
        &self,
        collection: &CollectionPath,
        document_id: Option<&str>,
        data: &Map<String, Value>,
    ) -> Result<String>;
    /// Overwrite the given top-level fields of an existing document
    async fn update_document(
        &self,
        collection: &CollectionPath,
        document_id: &str,
        data: &Map<String, Value>,
    ) -> Result<()>;
    /// Delete a document
    async fn delete_document(&self, collection: &CollectionPath, document_id: &str) -> Result<()>;
}

/// A word-processing document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocsDocument {
    /// Document id
    pub document_id: String,
    /// Title
    pub title: String,
    /// Structured body content
    pub body: Value,
    /// Revision the content was read at
    pub revision_id: Option<String>,
}

/// Word-processing document operations
#[async_trait]
pub trait DocsPort: Send + Sync {
    /// Fetch a document
    async fn get_document(&self, document_id: &str) -> Result<DocsDocument>;
    /// Create an empty document file; returns its id
    async fn create_file(&self, title: &str) -> Result<String>;
    /// Insert text at the start of the document body
    async fn insert_text(&self, document_id: &str, text: &str) -> Result<()>;
}

/// The set of backend ports the tools run against
#[derive(Clone)]
pub struct Backends {
    /// Firebase Authentication
    pub identity: Arc<dyn IdentityPort>,
    /// Realtime Database
    pub tree_store: Arc<dyn TreeStorePort>,
    /// Cloud Firestore
    pub document_store: Arc<dyn DocumentStorePort>,
    /// Google Docs and Drive
    pub docs: Arc<dyn DocsPort>,
}

impl Backends {
    /// In-memory backends with no failures injected
    pub fn in_memory() -> Self {
        memory::MemoryBackends::new().backends()
    }
}
