pub mod advocacy;
pub mod engagement;
pub mod posts;
pub mod sync;
pub mod types;
pub mod users;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Method, Response, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::session::SessionStore;
use types::ErrorBody;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },
    #[error("deserialization error: {0}")]
    Deserialize(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiClientError {
    /// HTTP status for backend-reported failures; `None` for transport errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiClientError::Status { status, .. } => Some(*status),
            ApiClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The backend's `{"error": "..."}` reason, when it sent one.
    pub fn reason(&self) -> Option<String> {
        let ApiClientError::Status { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|e| !e.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Encode everything except unreserved characters.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single path segment or query value.
pub(crate) fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT_ENCODE_SET).to_string()
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

/// The single configured HTTP client every component goes through.
///
/// Holds the base endpoint and a handle to the session; the credential is
/// read afresh for every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: Url, session: SessionStore) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Build a full URL from an API path (e.g. "/api/posts").
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiClientError> {
        Ok(self.base_url.join(path)?)
    }

    /// Issue a request and decode the JSON response.
    ///
    /// The current credential, if any, is attached as a bearer token. Any
    /// non-2xx status comes back as [`ApiClientError::Status`]; nothing is
    /// retried here.
    pub async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiClientError> {
        let url = self.url(path)?;
        let mut req = self.http_client.request(method.clone(), url);

        if let Some(credential) = self.session.current_credential() {
            req = req.header(
                header::AUTHORIZATION,
                format!("Bearer {}", credential.as_str()),
            );
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        tracing::debug!(%method, path, "api request");
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiClientError> {
        self.request(Method::POST, path, body).await
    }

    /// Check status and deserialize the response body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<T, ApiClientError> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        // Writes may answer with an empty body; decode it as an empty object.
        let body = if body.trim().is_empty() {
            "{}".to_string()
        } else {
            body
        };
        serde_json::from_str::<T>(&body)
            .map_err(|e| ApiClientError::Deserialize(format!("{e}: {body}")))
    }
}
