//! Interactive OAuth2 consent using the installed-app loopback redirect

use super::credentials::{ClientSecrets, TokenResponse};
use super::token_endpoint::TokenEndpoint;
use crate::error::{FiredocsError, Result};
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio::time::timeout;
use url::Url;

/// Largest redirect request head we are willing to buffer
const MAX_REQUEST_HEAD: usize = 16 * 1024;

/// How long a loopback connection may take to send its request head
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(10);

const SUCCESS_PAGE: &str = "<html><body><h3>firedocs is authorized.</h3><p>You may close this window.</p></body></html>";
const FAILURE_PAGE: &str =
    "<html><body><h3>firedocs authorization failed.</h3><p>Return to your terminal.</p></body></html>";

/// Runs an interactive authorization and returns the granted tokens
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Obtain a grant for `scopes`; blocks until the user completes consent
    async fn authorize(&self, scopes: &[String]) -> Result<TokenResponse>;
}

/// What a request to the loopback listener carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The provider returned an authorization code
    Code(String),
    /// The user or provider refused the grant
    Denied(String),
    /// The `state` parameter did not match the one we sent
    StateMismatch,
    /// Not an OAuth redirect (e.g. a favicon request)
    Ignored,
}

/// Build the consent page URL
pub fn authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> Result<Url> {
    let scope = scopes.join(" ");
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| FiredocsError::Config(format!("invalid auth_uri '{}': {e}", secrets.auth_uri)))
}

/// Interpret the request line of a redirect hitting the loopback listener
pub fn parse_redirect(request_head: &str, expected_state: &str) -> RedirectOutcome {
    let target = request_head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    let Ok(url) = Url::parse("http://localhost").and_then(|base| base.join(target)) else {
        return RedirectOutcome::Ignored;
    };

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if code.is_none() && error.is_none() {
        return RedirectOutcome::Ignored;
    }
    if state.as_deref() != Some(expected_state) {
        return RedirectOutcome::StateMismatch;
    }
    match (code, error) {
        (_, Some(error)) => RedirectOutcome::Denied(error),
        (Some(code), None) => RedirectOutcome::Code(code),
        (None, None) => RedirectOutcome::Ignored,
    }
}

/// Loopback-redirect consent flow for installed applications
pub struct LoopbackAuthorizer {
    secrets: ClientSecrets,
    endpoint: Arc<dyn TokenEndpoint>,
    redirect_host: String,
}

impl LoopbackAuthorizer {
    /// Create a flow for the given OAuth client
    pub fn new(
        secrets: ClientSecrets,
        endpoint: Arc<dyn TokenEndpoint>,
        redirect_host: impl Into<String>,
    ) -> Self {
        Self {
            secrets,
            endpoint,
            redirect_host: redirect_host.into(),
        }
    }

    fn new_state() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }

    async fn read_request_head(stream: &mut TcpStream) -> Result<String> {
        let mut buffer = Vec::with_capacity(1024);
        let mut chunk = [0u8; 1024];
        loop {
            let read = stream.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);
            if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_REQUEST_HEAD {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    async fn respond(stream: &mut TcpStream, status: &str, body: &str) -> Result<()> {
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await?;
        Ok(())
    }

    /// Read one request and answer it; `None` when it was not the redirect
    async fn handle_connection(
        mut stream: TcpStream,
        peer: SocketAddr,
        state: String,
    ) -> Option<Result<String>> {
        let read = timeout(REQUEST_READ_TIMEOUT, Self::read_request_head(&mut stream));
        let head = match read.await {
            Ok(Ok(head)) => head,
            Ok(Err(e)) => {
                tracing::debug!("Dropping loopback connection from {}: {}", peer, e);
                return None;
            }
            Err(_) => {
                tracing::debug!("Dropping idle loopback connection from {}", peer);
                return None;
            }
        };

        let (status, page, outcome) = match parse_redirect(&head, &state) {
            RedirectOutcome::Code(code) => ("200 OK", SUCCESS_PAGE, Some(Ok(code))),
            RedirectOutcome::Denied(error) => (
                "200 OK",
                FAILURE_PAGE,
                Some(Err(FiredocsError::Credential(format!(
                    "authorization was denied: {error}"
                )))),
            ),
            RedirectOutcome::StateMismatch => (
                "400 Bad Request",
                FAILURE_PAGE,
                Some(Err(FiredocsError::Credential(
                    "authorization redirect carried an unexpected state parameter".to_string(),
                ))),
            ),
            RedirectOutcome::Ignored => ("404 Not Found", "", None),
        };

        if let Err(e) = Self::respond(&mut stream, status, page).await {
            tracing::debug!("Failed to answer loopback request from {}: {}", peer, e);
        }
        outcome
    }

    /// Accept connections until one carries the OAuth redirect
    ///
    /// Each connection is read in its own task, so a browser preconnect that
    /// never sends a request cannot hold up the redirect.
    async fn wait_for_code(listener: &TcpListener, state: &str) -> Result<String> {
        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    connections.spawn(Self::handle_connection(stream, peer, state.to_string()));
                }
                Some(joined) = connections.join_next() => match joined {
                    Ok(Some(outcome)) => return outcome,
                    Ok(None) => {}
                    Err(e) => tracing::debug!("Loopback connection task failed: {}", e),
                },
            }
        }
    }
}

#[async_trait]
impl Authorizer for LoopbackAuthorizer {
    async fn authorize(&self, scopes: &[String]) -> Result<TokenResponse> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://{}:{}/", self.redirect_host, port);
        let state = Self::new_state();
        let url = authorization_url(&self.secrets, &redirect_uri, scopes, &state)?;

        tracing::warn!("Google Docs authorization required, waiting for consent at {}", url);
        // stdout carries MCP traffic, so the consent link goes to stderr
        eprintln!("Please visit this URL to authorize firedocs:\n\n{url}\n");

        let code = Self::wait_for_code(&listener, &state).await?;
        tracing::info!("Received authorization code, exchanging for tokens");
        self.endpoint.exchange_code(&code, &redirect_uri).await
    }
}
