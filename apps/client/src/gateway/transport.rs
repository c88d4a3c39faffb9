//! HTTP seam of the gateway.
//!
//! `Transport` is the only place that talks to the network. The gateway builds
//! [`ApiRequest`]s and interprets [`ApiResponse`]s; timeouts and connection
//! handling belong to the transport.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::errors::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Single-file multipart upload.
    File {
        field: &'static str,
        file_name: String,
        content_type: String,
        bytes: Bytes,
    },
}

/// A request relative to the service base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: String,
    pub body: RequestBody,
}

/// Raw status and body; interpretation is left to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

// ────────────────────────────────────────────────────────────────────────────
// reqwest implementation
// ────────────────────────────────────────────────────────────────────────────

/// `reqwest`-backed transport for the remote recruitment service.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(&request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        }
        .bearer_auth(&request.bearer);

        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::File {
                field,
                file_name,
                content_type,
                bytes,
            } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                builder.multipart(Form::new().part(field, part))
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(
            "{} {} -> {} ({} bytes)",
            request.method.as_str(),
            request.path,
            status,
            body.len()
        );

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get};
    use axum::{Json, Router};
    use serde_json::json;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request(method: Method, path: &str, body: RequestBody) -> ApiRequest {
        ApiRequest {
            method,
            path: path.to_string(),
            bearer: "tok-abc".to_string(),
            body,
        }
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let transport =
            HttpTransport::new("http://localhost:9/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            transport.url("/jobs/my-jobs"),
            "http://localhost:9/api/jobs/my-jobs"
        );
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let router = Router::new().route(
            "/resumes/my-resumes",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({ "success": true, "auth": auth }))
            }),
        );
        let base = spawn_stub(router).await;
        let transport = HttpTransport::new(base, Duration::from_secs(5)).unwrap();

        let response = transport
            .send(request(Method::Get, "resumes/my-resumes", RequestBody::Empty))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["auth"], "Bearer tok-abc");
    }

    #[tokio::test]
    async fn test_passes_through_error_status() {
        let router = Router::new().route(
            "/jobs/:id",
            delete(|| async { (StatusCode::FORBIDDEN, Json(json!({ "error": "not yours" }))) }),
        );
        let base = spawn_stub(router).await;
        let transport = HttpTransport::new(base, Duration::from_secs(5)).unwrap();

        let response = transport
            .send(request(Method::Delete, "jobs/j-1", RequestBody::Empty))
            .await
            .unwrap();

        assert_eq!(response.status, 403);
        assert!(!response.is_success());
        assert!(response.body.contains("not yours"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let transport =
            HttpTransport::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let err = transport
            .send(request(Method::Get, "jobs/my-jobs", RequestBody::Empty))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }
}
