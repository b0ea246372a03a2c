//! Request types for the MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request to create a user account
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CreateUserRequest {
    /// Email address of the new user
    pub email: String,
    /// Initial password
    pub password: String,
    /// Optional display name
    pub display_name: Option<String>,
}

/// Request naming one user account
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct UserIdRequest {
    /// The user's uid
    pub uid: String,
}

/// Request to change a user account; only supplied fields change
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct UpdateUserRequest {
    /// The user's uid
    pub uid: String,
    /// New email address
    pub email: Option<String>,
    /// New display name
    pub display_name: Option<String>,
    /// New password
    pub password: Option<String>,
}

/// Request with no arguments
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct EmptyRequest {}

/// Request for an email verification link
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct EmailVerificationLinkRequest {
    /// The user's uid
    pub uid: String,
    /// Continue URL after the action completes
    pub action_url: Option<String>,
}

/// Request for a password reset link
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct PasswordResetLinkRequest {
    /// Email address of the account
    pub email: String,
    /// Continue URL after the action completes
    pub action_url: Option<String>,
}

/// Request to replace the value at a database path
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SetDataRequest {
    /// Slash-delimited database path
    pub path: String,
    /// Value to store
    pub data: Value,
}

/// Request naming a database path
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct PathRequest {
    /// Slash-delimited database path
    pub path: String,
}

/// Request to merge children into a database path
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct UpdateDataRequest {
    /// Slash-delimited database path
    pub path: String,
    /// Children to write, keyed by relative path
    pub data: Map<String, Value>,
}

/// Request to read ordered children of a database path
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct QueryDataRequest {
    /// Slash-delimited database path
    pub path: String,
    /// `$key`, `$value` or a child path
    pub order_by: Option<String>,
    /// Keep only the first children after ordering
    pub limit: Option<u64>,
}

/// Request naming a Firestore collection
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CollectionRequest {
    /// Collection path
    pub collection: String,
}

/// Request naming a Firestore document
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FirestoreDocumentRequest {
    /// Collection path
    pub collection: String,
    /// Document id within the collection
    pub document_id: String,
}

/// Request to create a Firestore document
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FirestoreCreateDocumentRequest {
    /// Collection path
    pub collection: String,
    /// Document fields
    pub data: Map<String, Value>,
    /// Id to use; generated when absent
    pub document_id: Option<String>,
}

/// Request to update fields of a Firestore document
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FirestoreUpdateDocumentRequest {
    /// Collection path
    pub collection: String,
    /// Document id within the collection
    pub document_id: String,
    /// Fields to overwrite
    pub data: Map<String, Value>,
}

/// Request naming a Google Docs document
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct DocumentIdRequest {
    /// Document id
    pub document_id: String,
}

/// Request to create a Google Docs document
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CreateDocumentRequest {
    /// Document title
    pub title: String,
    /// Initial body text; absent or null means an empty document
    #[serde(default)]
    pub content: Option<String>,
}
