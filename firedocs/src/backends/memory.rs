//! In-process backend ports
//!
//! These hold all state in memory and follow the same rules as the remote
//! services closely enough for the tool layer to be exercised end to end:
//! identity enforces unique emails and minimum password length, the tree store
//! prunes empty branches, and Firestore updates require the document to exist.
//! [`MemoryFailures`] injects backend failures per service or per operation.

use super::firestore_value::to_fields;
use super::ordering::order_children;
use super::path::validate_document_id;
use super::{
    service, Backends, CollectionPath, DatabasePath, DocsDocument, DocsPort, DocumentSnapshot,
    DocumentStorePort, IdentityPort, NewUser, QueryOptions, TreeStorePort, UserRecord, UserUpdate,
};
use crate::error::{BackendErrorKind, FiredocsError, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::RwLock;
use ulid::Ulid;
use url::Url;

const ACTION_URL: &str = "https://firedocs.local/__/auth/action";
const MIN_PASSWORD_LEN: usize = 6;

/// Failures to inject into the in-memory ports
///
/// A key is either a service name (`"docs"`) which fails every operation of
/// that service, or `"service.operation"` (`"docs.insert_text"`) which fails
/// only that operation.
#[derive(Debug, Clone, Default)]
pub struct MemoryFailures {
    injected: Arc<Mutex<HashMap<String, (BackendErrorKind, String)>>>,
}

impl MemoryFailures {
    fn injected(&self) -> MutexGuard<'_, HashMap<String, (BackendErrorKind, String)>> {
        self.injected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every matching operation fail with `kind` and `message`
    pub fn fail(&self, key: &str, kind: BackendErrorKind, message: &str) {
        self.injected()
            .insert(key.to_string(), (kind, message.to_string()));
    }

    /// Remove an injected failure
    pub fn clear(&self, key: &str) {
        self.injected().remove(key);
    }

    /// Remove all injected failures
    pub fn clear_all(&self) {
        self.injected().clear();
    }

    fn check(&self, service: &'static str, operation: &str) -> Result<()> {
        let injected = self.injected();
        let hit = injected
            .get(&format!("{service}.{operation}"))
            .or_else(|| injected.get(service));
        match hit {
            Some((kind, message)) => Err(FiredocsError::backend(service, *kind, message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    record: UserRecord,
    password: String,
}

/// In-memory identity port
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    users: RwLock<BTreeMap<String, StoredUser>>,
    failures: MemoryFailures,
}

impl MemoryIdentity {
    /// Create an empty user directory
    pub fn new(failures: MemoryFailures) -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            failures,
        }
    }

    /// Stored password for a uid, for checking update semantics
    pub async fn password_of(&self, uid: &str) -> Option<String> {
        self.users.read().await.get(uid).map(|u| u.password.clone())
    }

    fn rejected(kind: BackendErrorKind, message: &str) -> FiredocsError {
        FiredocsError::backend(service::IDENTITY, kind, message)
    }

    fn validate_email(email: &str) -> Result<()> {
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(Self::rejected(BackendErrorKind::InvalidArgument, "INVALID_EMAIL")),
        }
    }

    fn validate_password(password: &str) -> Result<()> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Self::rejected(
                BackendErrorKind::InvalidArgument,
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ));
        }
        Ok(())
    }

    fn email_taken(
        users: &BTreeMap<String, StoredUser>,
        email: &str,
        except_uid: Option<&str>,
    ) -> bool {
        users.values().any(|u| {
            Some(u.record.uid.as_str()) != except_uid
                && u.record
                    .email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
        })
    }

    fn not_found(uid: &str) -> FiredocsError {
        FiredocsError::not_found(
            service::IDENTITY,
            format!("no user record found for uid '{uid}'"),
        )
    }

    fn action_link(mode: &str, action_url: Option<&str>) -> Result<String> {
        let code = Ulid::new().to_string();
        let mut params = vec![("mode", mode), ("oobCode", code.as_str())];
        if let Some(url) = action_url {
            params.push(("continueUrl", url));
        }
        Url::parse_with_params(ACTION_URL, &params)
            .map(String::from)
            .map_err(|e| FiredocsError::Other(e.to_string()))
    }
}

#[async_trait]
impl IdentityPort for MemoryIdentity {
    async fn create_user(&self, user: &NewUser) -> Result<UserRecord> {
        self.failures.check(service::IDENTITY, "create_user")?;
        Self::validate_email(&user.email)?;
        Self::validate_password(&user.password)?;

        let mut users = self.users.write().await;
        if Self::email_taken(&users, &user.email, None) {
            return Err(Self::rejected(BackendErrorKind::AlreadyExists, "EMAIL_EXISTS"));
        }

        let record = UserRecord {
            uid: Ulid::new().to_string(),
            email: Some(user.email.clone()),
            display_name: user.display_name.clone(),
            photo_url: None,
            email_verified: false,
            disabled: false,
        };
        users.insert(
            record.uid.clone(),
            StoredUser {
                record: record.clone(),
                password: user.password.clone(),
            },
        );
        Ok(record)
    }

    async fn get_user(&self, uid: &str) -> Result<UserRecord> {
        self.failures.check(service::IDENTITY, "get_user")?;
        self.users
            .read()
            .await
            .get(uid)
            .map(|u| u.record.clone())
            .ok_or_else(|| Self::not_found(uid))
    }

    async fn update_user(&self, uid: &str, update: &UserUpdate) -> Result<UserRecord> {
        self.failures.check(service::IDENTITY, "update_user")?;
        if let Some(email) = &update.email {
            Self::validate_email(email)?;
        }
        if let Some(password) = &update.password {
            Self::validate_password(password)?;
        }

        let mut users = self.users.write().await;
        if let Some(email) = &update.email {
            if Self::email_taken(&users, email, Some(uid)) {
                return Err(Self::rejected(BackendErrorKind::AlreadyExists, "EMAIL_EXISTS"));
            }
        }
        let stored = users.get_mut(uid).ok_or_else(|| Self::not_found(uid))?;
        if let Some(email) = &update.email {
            stored.record.email = Some(email.clone());
            stored.record.email_verified = false;
        }
        if let Some(name) = &update.display_name {
            stored.record.display_name = Some(name.clone());
        }
        if let Some(password) = &update.password {
            stored.password = password.clone();
        }
        Ok(stored.record.clone())
    }

    async fn delete_user(&self, uid: &str) -> Result<()> {
        self.failures.check(service::IDENTITY, "delete_user")?;
        self.users
            .write()
            .await
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(uid))
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.failures.check(service::IDENTITY, "list_users")?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .map(|u| u.record.clone())
            .collect())
    }

    async fn email_verification_link(&self, uid: &str, action_url: Option<&str>) -> Result<String> {
        self.failures
            .check(service::IDENTITY, "email_verification_link")?;
        let user = self.get_user(uid).await?;
        if user.email.is_none() {
            return Err(Self::rejected(
                BackendErrorKind::InvalidArgument,
                "user has no email address",
            ));
        }
        Self::action_link("verifyEmail", action_url)
    }

    async fn password_reset_link(&self, email: &str, action_url: Option<&str>) -> Result<String> {
        self.failures.check(service::IDENTITY, "password_reset_link")?;
        Self::validate_email(email)?;
        if !Self::email_taken(&*self.users.read().await, email, None) {
            return Err(Self::rejected(BackendErrorKind::NotFound, "EMAIL_NOT_FOUND"));
        }
        Self::action_link("resetPassword", action_url)
    }
}

/// In-memory tree store
#[derive(Debug, Default)]
pub struct MemoryTreeStore {
    root: RwLock<Value>,
    failures: MemoryFailures,
}

/// Drop null children and empty containers, which the tree store never holds
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if map.is_empty() {
                Value::Null
            } else {
                Value::Object(map)
            }
        }
        Value::Array(items) if items.is_empty() => Value::Null,
        other => other,
    }
}

fn read_at<'a>(node: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments.iter().try_fold(node, |node, key| match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at `segments` below `node`, pruning branches left empty
fn write_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if let Value::Array(items) = node {
        // Arrays are stored as index-keyed objects once written into
        let map: Map<String, Value> = std::mem::take(items)
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect();
        *node = Value::Object(map);
    }
    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    if let Value::Object(map) = node {
        let child = map.entry(first.clone()).or_insert(Value::Null);
        write_at(child, rest, value);
        if child.is_null() {
            map.remove(first);
        }
        if map.is_empty() {
            *node = Value::Null;
        }
    }
}

impl MemoryTreeStore {
    /// Create an empty tree
    pub fn new(failures: MemoryFailures) -> Self {
        Self {
            root: RwLock::new(Value::Null),
            failures,
        }
    }
}

#[async_trait]
impl TreeStorePort for MemoryTreeStore {
    async fn set(&self, path: &DatabasePath, data: &Value) -> Result<()> {
        self.failures.check(service::DATABASE, "set")?;
        let mut root = self.root.write().await;
        write_at(&mut root, path.segments(), normalize(data.clone()));
        Ok(())
    }

    async fn get(&self, path: &DatabasePath) -> Result<Value> {
        self.failures.check(service::DATABASE, "get")?;
        let root = self.root.read().await;
        Ok(read_at(&root, path.segments()).cloned().unwrap_or(Value::Null))
    }

    async fn update(&self, path: &DatabasePath, data: &Map<String, Value>) -> Result<()> {
        self.failures.check(service::DATABASE, "update")?;
        // Keys are relative paths; validate them all before touching the tree
        let writes = data
            .iter()
            .map(|(key, value)| {
                let relative = DatabasePath::parse(key)?;
                if relative.is_root() {
                    return Err(FiredocsError::invalid_arguments(format!(
                        "update key '{key}' is not a valid child path"
                    )));
                }
                Ok((path.join(&relative), normalize(value.clone())))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut root = self.root.write().await;
        for (target, value) in writes {
            write_at(&mut root, target.segments(), value);
        }
        Ok(())
    }

    async fn delete(&self, path: &DatabasePath) -> Result<()> {
        self.failures.check(service::DATABASE, "delete")?;
        let mut root = self.root.write().await;
        write_at(&mut root, path.segments(), Value::Null);
        Ok(())
    }

    async fn query(&self, path: &DatabasePath, options: &QueryOptions) -> Result<Value> {
        self.failures.check(service::DATABASE, "query")?;
        let value = {
            let root = self.root.read().await;
            read_at(&root, path.segments()).cloned().unwrap_or(Value::Null)
        };
        Ok(order_children(value, options.order_by.as_ref(), options.limit))
    }
}

/// In-memory document store
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<BTreeMap<String, BTreeMap<String, Map<String, Value>>>>,
    failures: MemoryFailures,
}

impl MemoryDocumentStore {
    /// Create an empty database
    pub fn new(failures: MemoryFailures) -> Self {
        Self {
            collections: RwLock::new(BTreeMap::new()),
            failures,
        }
    }

    fn missing(collection: &CollectionPath, document_id: &str) -> FiredocsError {
        FiredocsError::not_found(
            service::FIRESTORE,
            format!("no document {collection}/{document_id}"),
        )
    }
}

#[async_trait]
impl DocumentStorePort for MemoryDocumentStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        self.failures.check(service::FIRESTORE, "list_collections")?;
        Ok(self
            .collections
            .read()
            .await
            .iter()
            .filter(|(path, documents)| !path.contains('/') && !documents.is_empty())
            .map(|(path, _)| path.clone())
            .collect())
    }

    async fn list_documents(&self, collection: &CollectionPath) -> Result<Vec<DocumentSnapshot>> {
        self.failures.check(service::FIRESTORE, "list_documents")?;
        Ok(self
            .collections
            .read()
            .await
            .get(&collection.to_string())
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, data)| DocumentSnapshot {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_document(
        &self,
        collection: &CollectionPath,
        document_id: &str,
    ) -> Result<Option<Map<String, Value>>> {
        self.failures.check(service::FIRESTORE, "get_document")?;
        validate_document_id(document_id)?;
        Ok(self
            .collections
            .read()
            .await
            .get(&collection.to_string())
            .and_then(|documents| documents.get(document_id))
            .cloned())
    }

    async fn create_document(
        &self,
        collection: &CollectionPath,
        document_id: Option<&str>,
        data: &Map<String, Value>,
    ) -> Result<String> {
        self.failures.check(service::FIRESTORE, "create_document")?;
        to_fields(data)?;
        let id = match document_id {
            Some(id) => {
                validate_document_id(id)?;
                id.to_string()
            }
            None => Ulid::new().to_string(),
        };

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.contains_key(&id) {
            return Err(FiredocsError::backend(
                service::FIRESTORE,
                BackendErrorKind::AlreadyExists,
                format!("document {collection}/{id} already exists"),
            ));
        }
        documents.insert(id.clone(), data.clone());
        Ok(id)
    }

    async fn update_document(
        &self,
        collection: &CollectionPath,
        document_id: &str,
        data: &Map<String, Value>,
    ) -> Result<()> {
        self.failures.check(service::FIRESTORE, "update_document")?;
        validate_document_id(document_id)?;
        to_fields(data)?;
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&collection.to_string())
            .and_then(|documents| documents.get_mut(document_id))
            .ok_or_else(|| Self::missing(collection, document_id))?;
        for (key, value) in data {
            document.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn delete_document(&self, collection: &CollectionPath, document_id: &str) -> Result<()> {
        self.failures.check(service::FIRESTORE, "delete_document")?;
        validate_document_id(document_id)?;
        let mut collections = self.collections.write().await;
        if let Some(documents) = collections.get_mut(&collection.to_string()) {
            documents.remove(document_id);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredDoc {
    title: String,
    text: String,
    revision: String,
}

/// In-memory word-processing documents
#[derive(Debug, Default)]
pub struct MemoryDocs {
    documents: RwLock<BTreeMap<String, StoredDoc>>,
    failures: MemoryFailures,
}

impl MemoryDocs {
    /// Create an empty document store
    pub fn new(failures: MemoryFailures) -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            failures,
        }
    }

    /// Whether a document with this id exists
    pub async fn contains(&self, document_id: &str) -> bool {
        self.documents.read().await.contains_key(document_id)
    }

    fn body(text: &str) -> Value {
        let content = format!("{text}\n");
        let end_index = content.encode_utf16().count() + 1;
        json!({
            "content": [
                { "endIndex": 1, "sectionBreak": {} },
                {
                    "startIndex": 1,
                    "endIndex": end_index,
                    "paragraph": {
                        "elements": [
                            { "startIndex": 1, "endIndex": end_index, "textRun": { "content": content } }
                        ]
                    }
                }
            ]
        })
    }

    fn missing(document_id: &str) -> FiredocsError {
        FiredocsError::not_found(
            service::DOCS,
            format!("Requested entity was not found: document '{document_id}'"),
        )
    }
}

#[async_trait]
impl DocsPort for MemoryDocs {
    async fn get_document(&self, document_id: &str) -> Result<DocsDocument> {
        self.failures.check(service::DOCS, "get_document")?;
        let documents = self.documents.read().await;
        let stored = documents
            .get(document_id)
            .ok_or_else(|| Self::missing(document_id))?;
        Ok(DocsDocument {
            document_id: document_id.to_string(),
            title: stored.title.clone(),
            body: Self::body(&stored.text),
            revision_id: Some(stored.revision.clone()),
        })
    }

    async fn create_file(&self, title: &str) -> Result<String> {
        self.failures.check(service::DOCS, "create_file")?;
        let id = Ulid::new().to_string();
        self.documents.write().await.insert(
            id.clone(),
            StoredDoc {
                title: title.to_string(),
                text: String::new(),
                revision: Ulid::new().to_string(),
            },
        );
        Ok(id)
    }

    async fn insert_text(&self, document_id: &str, text: &str) -> Result<()> {
        self.failures.check(service::DOCS, "insert_text")?;
        let mut documents = self.documents.write().await;
        let stored = documents
            .get_mut(document_id)
            .ok_or_else(|| Self::missing(document_id))?;
        stored.text.insert_str(0, text);
        stored.revision = Ulid::new().to_string();
        Ok(())
    }
}

/// A full set of in-memory ports sharing one failure injector
#[derive(Clone)]
pub struct MemoryBackends {
    /// Identity port
    pub identity: Arc<MemoryIdentity>,
    /// Tree-store port
    pub tree_store: Arc<MemoryTreeStore>,
    /// Document-store port
    pub document_store: Arc<MemoryDocumentStore>,
    /// Docs port
    pub docs: Arc<MemoryDocs>,
    /// Failure injection shared by all four ports
    pub failures: MemoryFailures,
}

impl MemoryBackends {
    /// Empty ports with no failures injected
    pub fn new() -> Self {
        let failures = MemoryFailures::default();
        Self {
            identity: Arc::new(MemoryIdentity::new(failures.clone())),
            tree_store: Arc::new(MemoryTreeStore::new(failures.clone())),
            document_store: Arc::new(MemoryDocumentStore::new(failures.clone())),
            docs: Arc::new(MemoryDocs::new(failures.clone())),
            failures,
        }
    }

    /// The ports as trait objects
    pub fn backends(&self) -> Backends {
        Backends {
            identity: self.identity.clone(),
            tree_store: self.tree_store.clone(),
            document_store: self.document_store.clone(),
            docs: self.docs.clone(),
        }
    }
}

impl Default for MemoryBackends {
    fn default() -> Self {
        Self::new()
    }
}
