//! Stateless request builder and response parser for the backend API.
//!
//! # Design
//! `ApiClient` holds only the backend origin. `build` produces an
//! `HttpRequest` with the JSON content type and, when a token is supplied,
//! the bearer authorization header. `parse` consumes an `HttpResponse` and
//! maps non-2xx statuses to `ApiError`. Executing the request is the
//! transport's job, so the client stays deterministic.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Request builder bound to one backend origin.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for `endpoint` (which starts with `/`).
    pub fn build<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;

        let headers = request_headers(token);

        Ok(HttpRequest {
            method,
            url: format!("{}{endpoint}", self.base_url),
            headers,
            body,
        })
    }

    /// Build a request without a body.
    pub fn build_empty(&self, method: HttpMethod, endpoint: &str, token: Option<&str>) -> HttpRequest {
        let headers = request_headers(token);
        HttpRequest {
            method,
            url: format!("{}{endpoint}", self.base_url),
            headers,
            body: None,
        }
    }

    /// Deserialize a 2xx response body into `T`.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        parse_json(response)
    }
}

fn request_headers(token: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.push(("authorization".to_string(), format!("Bearer {token}")));
    }
    headers
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound {
            body: response.body.clone(),
        });
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

pub(crate) fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Err(ApiError::EmptyResponse);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
