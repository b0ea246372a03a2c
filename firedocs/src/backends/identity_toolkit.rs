//! Firebase Authentication through the Identity Toolkit admin API

use super::http::check_response;
use super::{service, IdentityPort, NewUser, UserRecord, UserUpdate};
use crate::auth::AccessTokenProvider;
use crate::error::{BackendErrorKind, FiredocsError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Accounts fetched per page when listing users
const LIST_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    disabled: bool,
}

impl From<AccountInfo> for UserRecord {
    fn from(info: AccountInfo) -> Self {
        Self {
            uid: info.local_id,
            email: info.email,
            display_name: info.display_name,
            photo_url: info.photo_url,
            email_verified: info.email_verified,
            disabled: info.disabled,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OobResponse {
    oob_link: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    local_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

/// Identity port backed by the Identity Toolkit v1 REST API
pub struct IdentityToolkit {
    project_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl IdentityToolkit {
    /// Create a client for `project_id`
    pub fn new(
        project_id: &str,
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, project_id, http, tokens)
    }

    /// Create a client against a different API root, such as the Auth emulator
    pub fn with_base_url(
        base_url: &str,
        project_id: &str,
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            project_url: format!("{}/projects/{}", base_url.trim_end_matches('/'), project_id),
            http,
            tokens,
        }
    }

    async fn post<T: DeserializeOwned>(&self, operation: &str, body: &impl Serialize) -> Result<T> {
        let token = self.tokens.access_token().await?;
        tracing::debug!("identity {}", operation);
        let response = self
            .http
            .post(format!("{}/{}", self.project_url, operation))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Ok(check_response(service::IDENTITY, response).await?.json().await?)
    }

    async fn oob_link(
        &self,
        request_type: &str,
        email: &str,
        action_url: Option<&str>,
    ) -> Result<String> {
        let mut body = json!({
            "requestType": request_type,
            "email": email,
            "returnOobLink": true,
        });
        if let Some(url) = action_url {
            body["continueUrl"] = Value::from(url);
        }
        let response: OobResponse = self.post("accounts:sendOobCode", &body).await?;
        response.oob_link.ok_or_else(|| {
            FiredocsError::backend(
                service::IDENTITY,
                BackendErrorKind::Internal,
                "response did not include a link",
            )
        })
    }
}

#[async_trait]
impl IdentityPort for IdentityToolkit {
    async fn create_user(&self, user: &NewUser) -> Result<UserRecord> {
        let mut body = json!({
            "email": user.email,
            "password": user.password,
        });
        if let Some(name) = &user.display_name {
            body["displayName"] = Value::from(name.as_str());
        }
        let created: SignUpResponse = self.post("accounts", &body).await?;
        tracing::info!("Created user {}", created.local_id);
        Ok(UserRecord {
            uid: created.local_id,
            email: Some(user.email.clone()),
            display_name: user.display_name.clone(),
            photo_url: None,
            email_verified: false,
            disabled: false,
        })
    }

    async fn get_user(&self, uid: &str) -> Result<UserRecord> {
        let response: LookupResponse = self
            .post("accounts:lookup", &json!({ "localId": [uid] }))
            .await?;
        response
            .users
            .into_iter()
            .next()
            .map(UserRecord::from)
            .ok_or_else(|| {
                FiredocsError::not_found(
                    service::IDENTITY,
                    format!("no user record found for uid '{uid}'"),
                )
            })
    }

    async fn update_user(&self, uid: &str, update: &UserUpdate) -> Result<UserRecord> {
        if !update.is_empty() {
            let request = UpdateRequest {
                local_id: uid,
                email: update.email.as_deref(),
                display_name: update.display_name.as_deref(),
                password: update.password.as_deref(),
            };
            let _: Value = self.post("accounts:update", &request).await?;
        }
        self.get_user(uid).await
    }

    async fn delete_user(&self, uid: &str) -> Result<()> {
        let _: Value = self
            .post("accounts:delete", &json!({ "localId": uid }))
            .await?;
        tracing::info!("Deleted user {}", uid);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let mut users = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let token = self.tokens.access_token().await?;
            let mut query = vec![("maxResults", LIST_PAGE_SIZE.to_string())];
            if let Some(page) = &page_token {
                query.push(("nextPageToken", page.clone()));
            }
            let response = self
                .http
                .get(format!("{}/accounts:batchGet", self.project_url))
                .bearer_auth(token)
                .query(&query)
                .send()
                .await?;
            let page: BatchGetResponse = check_response(service::IDENTITY, response)
                .await?
                .json()
                .await?;

            users.extend(page.users.into_iter().map(UserRecord::from));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(users)
    }

    async fn email_verification_link(&self, uid: &str, action_url: Option<&str>) -> Result<String> {
        let user = self.get_user(uid).await?;
        let email = user.email.ok_or_else(|| {
            FiredocsError::backend(
                service::IDENTITY,
                BackendErrorKind::InvalidArgument,
                format!("user '{uid}' has no email address"),
            )
        })?;
        self.oob_link("VERIFY_EMAIL", &email, action_url).await
    }

    async fn password_reset_link(&self, email: &str, action_url: Option<&str>) -> Result<String> {
        self.oob_link("PASSWORD_RESET", email, action_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> IdentityToolkit {
        IdentityToolkit::with_base_url(
            &server.uri(),
            "demo",
            reqwest::Client::new(),
            Arc::new(StaticToken("t".to_string())),
        )
    }

    #[tokio::test]
    async fn test_update_sends_only_supplied_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/demo/accounts:update"))
            .and(body_json(json!({"localId": "u1", "displayName": "Ana"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"localId": "u1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/projects/demo/accounts:lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{"localId": "u1", "email": "a@example.com", "displayName": "Ana"}]
            })))
            .mount(&server)
            .await;

        let update = UserUpdate {
            display_name: Some("Ana".to_string()),
            ..UserUpdate::default()
        };
        let user = client(&server).update_user("u1", &update).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
        assert_eq!(user.display_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_unknown_uid_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/demo/accounts:lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "lookup"})))
            .mount(&server)
            .await;

        let err = client(&server).get_user("nobody").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("nobody"));
    }

    #[tokio::test]
    async fn test_create_duplicate_email_is_already_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/demo/accounts"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "EMAIL_EXISTS"}
            })))
            .mount(&server)
            .await;

        let user = NewUser {
            email: "a@example.com".to_string(),
            password: "pw12345".to_string(),
            display_name: None,
        };
        let err = client(&server).create_user(&user).await.unwrap_err();
        assert_eq!(err.backend_kind(), Some(BackendErrorKind::AlreadyExists));
    }

    #[tokio::test]
    async fn test_list_users_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/demo/accounts:batchGet"))
            .and(query_param("nextPageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{"localId": "u3"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/demo/accounts:batchGet"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{"localId": "u1"}, {"localId": "u2"}],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;

        let uids: Vec<String> = client(&server)
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.uid)
            .collect();
        assert_eq!(uids, ["u1", "u2", "u3"]);
    }

    #[tokio::test]
    async fn test_password_reset_link_requests_returned_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/demo/accounts:sendOobCode"))
            .and(body_partial_json(json!({
                "requestType": "PASSWORD_RESET",
                "email": "a@example.com",
                "returnOobLink": true,
                "continueUrl": "https://app.example.com/done"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "email": "a@example.com",
                "oobLink": "https://demo.firebaseapp.com/__/auth/action?mode=resetPassword&oobCode=x"
            })))
            .mount(&server)
            .await;

        let link = client(&server)
            .password_reset_link("a@example.com", Some("https://app.example.com/done"))
            .await
            .unwrap();
        assert!(link.contains("mode=resetPassword"));
    }
}
