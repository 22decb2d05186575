//! # API Client
//!
//! The single entry point to the invoicing backend.
//!
//! ## Response Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     How a Response Is Read                              │
//! │                                                                         │
//! │  send(method, path, body?)                                             │
//! │       │                                                                 │
//! │       ├── transport failure ─────────────► HttpError::Transport        │
//! │       │                                                                 │
//! │       ├── non-2xx ──► body text                                        │
//! │       │                 ├── {"error":{"message":m}} ──► Status(m)       │
//! │       │                 ├── non-empty text ─────────► Status(text)      │
//! │       │                 └── empty ──► Status("Response status: N")      │
//! │       │                                                                 │
//! │       ├── 204 or empty body ─────────────► None (never parsed)         │
//! │       │                                                                 │
//! │       └── body ──► strict serde decode ──► Some(T) / HttpError::Decode │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There are no retries and no timeouts beyond reqwest's defaults. Every
//! failure is handed back to the caller.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{HttpError, HttpResult};
use crate::handlers::{ClientsApi, ProductsApi};
use quill_core::validation::validate_id;

/// Default backend address for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP client bound to one backend base URL.
///
/// Cloning is cheap: the underlying `reqwest::Client` shares its
/// connection pool.
///
/// ## Usage
/// ```rust,ignore
/// let api = ApiClient::new("http://localhost:8080");
///
/// let clients = api.clients().list().await?;
/// let products = api.products().list(clients[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for `base_url`. A trailing `/` is dropped so paths
    /// can always start with one.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client that reuses an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client endpoints (`/api/clients`).
    pub fn clients(&self) -> ClientsApi {
        ClientsApi::new(self.clone())
    }

    /// Product endpoints (`/api/clients/{id}/products`).
    pub fn products(&self) -> ProductsApi {
        ProductsApi::new(self.clone())
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    /// Sends a request and returns the raw success body, or `None` for a
    /// 204 / empty response.
    pub(crate) async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> HttpResult<Option<String>>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            // .json() also sets Content-Type: application/json
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(%method, %url, error = %e, "Backend request failed");
            HttpError::Transport(e)
        })?;

        let status = response.status();

        if !status.is_success() {
            let err = status_error(status, response.text().await);
            warn!(%method, path, status = status.as_u16(), error = %err, "Backend rejected request");
            return Err(err);
        }

        let text = response.text().await?;
        debug!(%method, path, status = status.as_u16(), bytes = text.len(), "Backend response");

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(text))
    }

    /// Sends a request and strictly decodes the body, if there is one.
    pub(crate) async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> HttpResult<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        match self.send(method, path, body).await? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| HttpError::Decode {
                    path: path.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Like [`request`](Self::request) but an absent body is an error.
    pub(crate) async fn request_entity<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> HttpResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(method, path, body)
            .await?
            .ok_or_else(|| HttpError::MissingBody {
                path: path.to_string(),
            })
    }

    /// GETs a list endpoint.
    ///
    /// `null`, an empty body or any non-array JSON becomes an empty list;
    /// an array with a malformed element is a decode error.
    pub(crate) async fn get_list<T>(&self, path: &str) -> HttpResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let value: Option<serde_json::Value> =
            self.request::<_, ()>(Method::GET, path, None).await?;

        match value {
            Some(value @ serde_json::Value::Array(_)) => {
                serde_json::from_value(value).map_err(|source| HttpError::Decode {
                    path: path.to_string(),
                    source,
                })
            }
            other => {
                warn!(path, body = ?other, "List endpoint returned no array, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// DELETEs a resource, ignoring any body.
    pub(crate) async fn delete(&self, path: &str) -> HttpResult<()> {
        self.send::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }
}

/// Rejects non-positive ids before any request is built.
pub(crate) fn check_id(entity: &str, id: i64) -> HttpResult<i64> {
    validate_id(entity, id).map_err(|_| HttpError::InvalidId {
        entity: entity.to_string(),
        id,
    })
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Builds the error for a non-2xx response. An unreadable body counts as
/// an empty one.
fn status_error(status: StatusCode, body: reqwest::Result<String>) -> HttpError {
    let body = body.unwrap_or_else(|e| {
        debug!(status = status.as_u16(), error = %e, "Could not read error body");
        String::new()
    });
    HttpError::Status {
        status: status.as_u16(),
        message: error_message(status, &body),
    }
}

/// Picks the most useful message out of a failed response body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(message) = envelope.error.message.filter(|m| !m.is_empty()) {
            return message;
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    format!("Response status: {}", status.as_u16())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::types::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_error_message_prefers_backend_message() {
        let body = r#"{"error":{"code":"VALIDATION","message":"name is required"}}"#;
        assert_eq!(error_message(StatusCode::BAD_REQUEST, body), "name is required");
    }

    #[test]
    fn test_error_message_falls_back_to_text_then_status() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down\n"),
            "upstream down"
        );
        // valid JSON without a message still shows the raw body
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error":{}}"#),
            r#"{"error":{}}"#
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Response status: 500"
        );
    }

    #[tokio::test]
    async fn test_unreadable_error_body_falls_back_to_status() {
        let read_failure = reqwest::get("http://127.0.0.1:9").await.unwrap_err();
        let err = status_error(StatusCode::BAD_GATEWAY, Err(read_failure));
        assert!(matches!(err, HttpError::Status { status: 502, .. }));
        assert_eq!(err.to_string(), "Response status: 502");

        let err = status_error(StatusCode::NOT_FOUND, Ok("no such client".to_string()));
        assert_eq!(err.to_string(), "no such client");
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let api = ApiClient::new("http://localhost:8080/");
        assert_eq!(api.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_check_id() {
        assert_eq!(check_id("client", 3).unwrap(), 3);
        assert!(matches!(
            check_id("client", 0),
            Err(HttpError::InvalidId { id: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_no_content_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let result: Option<Client> = api.request::<_, ()>(Method::GET, "/api/ping", None).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_empty_success_body_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let result: Option<Client> = api.request::<_, ()>(Method::GET, "/api/ping", None).await.unwrap();
        assert!(result.is_none());

        let err = api
            .request_entity::<Client, ()>(Method::GET, "/api/ping", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::MissingBody { .. }));
    }

    #[tokio::test]
    async fn test_non_array_list_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/null"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/object"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        assert!(api.get_list::<Client>("/api/null").await.unwrap().is_empty());
        assert!(api.get_list::<Client>("/api/object").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_list_element_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "seven" }])))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let err = api.get_list::<Client>("/api/clients").await.unwrap_err();
        assert!(matches!(err, HttpError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        // nothing listens on the discard port
        let api = ApiClient::new("http://127.0.0.1:9");
        let err = api.get_list::<Client>("/api/clients").await.unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)));
    }
}
