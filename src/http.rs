//! Outbound HTTP abstraction.
//!
//! Every network-facing strategy goes through [`HttpFetcher`] so the
//! extraction logic can be exercised against canned responses.

use crate::config::HttpSettings;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP method subset used by the strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
    /// Largest response body accepted, in bytes. Reading stops with
    /// `FileTooLarge` as soon as the body grows past it.
    pub max_body_bytes: Option<u64>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            json: None,
            max_body_bytes: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            json: Some(body),
            max_body_bytes: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn max_body(mut self, limit: u64) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }
}

/// Response body accumulated chunk by chunk under an optional size cap.
#[derive(Debug, Default)]
pub struct BodyBuffer {
    bytes: Vec<u8>,
    limit: Option<u64>,
}

impl BodyBuffer {
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
        }
    }

    /// Reject a body whose declared length is already over the cap.
    pub fn check_declared(&self, content_length: Option<u64>) -> Result<()> {
        match (content_length, self.limit) {
            (Some(size), Some(limit)) if size > limit => Err(RecapError::FileTooLarge { size, limit }),
            _ => Ok(()),
        }
    }

    /// Append a chunk, failing once the total passes the cap.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        let size = (self.bytes.len() + chunk.len()) as u64;
        if let Some(limit) = self.limit.filter(|limit| size > *limit) {
            return Err(RecapError::FileTooLarge { size, limit });
        }
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Response with the body fully buffered.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Convert a non-2xx response into an upstream error carrying a body excerpt.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            let detail: String = self.text().chars().take(500).collect();
            Err(RecapError::upstream(self.status, detail))
        }
    }
}

/// Trait for issuing HTTP requests.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Send a request. Non-2xx statuses are returned as responses, not errors;
    /// only transport failures produce `Err`.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// reqwest-backed fetcher.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher from HTTP settings.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(settings)?,
        })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Build a reqwest client honouring the configured timeout.
pub fn build_client(settings: &HttpSettings) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = settings.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| RecapError::Config(format!("Failed to create HTTP client: {}", e)))
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let mut response = builder
            .send()
            .await
            .map_err(|e| RecapError::transport(format!("Request to {} failed: {}", request.url, e)))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(|s| s.to_string());

        let mut body = BodyBuffer::new(request.max_body_bytes);
        body.check_declared(response.content_length())?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RecapError::transport(format!("Failed to read response body: {}", e)))?
        {
            body.push(&chunk)?;
        }
        let body = body.into_bytes();

        debug!(status, bytes = body.len(), "Received response");

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        let ok = HttpResponse {
            status: 204,
            content_type: None,
            body: Vec::new(),
        };
        assert!(ok.error_for_status().is_ok());

        let err = HttpResponse {
            status: 503,
            content_type: None,
            body: b"maintenance".to_vec(),
        }
        .error_for_status()
        .unwrap_err();
        assert!(matches!(
            err,
            RecapError::UpstreamService { status: Some(503), ref detail } if detail == "maintenance"
        ));
    }

    #[test]
    fn test_body_limit_stops_reading() {
        let mut body = BodyBuffer::new(Some(10));
        body.push(b"0123").unwrap();
        body.push(b"4567").unwrap();

        let err = body.push(b"89ab").unwrap_err();
        assert!(matches!(err, RecapError::FileTooLarge { size: 12, limit: 10 }));
        // The chunk that crossed the limit was not kept.
        assert_eq!(body.len(), 8);

        assert!(matches!(
            body.check_declared(Some(4 * 1024 * 1024 * 1024)),
            Err(RecapError::FileTooLarge { limit: 10, .. })
        ));
        assert!(body.check_declared(None).is_ok());

        let mut unbounded = BodyBuffer::new(None);
        unbounded.push(&[0u8; 64]).unwrap();
        assert!(unbounded.check_declared(Some(u64::MAX)).is_ok());
        assert_eq!(unbounded.into_bytes().len(), 64);
    }

    #[test]
    fn test_request_builder() {
        let req = HttpRequest::get("https://example.com").header("Accept-Language", "en-US");
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.headers, vec![("Accept-Language".to_string(), "en-US".to_string())]);
        assert!(req.json.is_none());
        assert_eq!(req.max_body_bytes, None);
        assert_eq!(HttpRequest::get("https://example.com").max_body(5).max_body_bytes, Some(5));
    }
}
