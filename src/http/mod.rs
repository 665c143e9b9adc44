//! HTTP plumbing: request/response values, the transport seam, the cookie
//! jar, and the client wrapper that renews expired sessions.

pub mod client;
pub mod cookies;
pub mod transport;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

pub use client::ApiClient;
pub use cookies::SessionJar;
pub use transport::ReqwestTransport;

#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text(String),
    File(FilePart),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Multipart(Vec<(String, FormField)>),
}

/// One logical API call. Kept as plain data so it can be replayed after a
/// session renewal.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, params: Vec<(String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Body::Json(serde_json::to_value(body).map_err(ApiError::decode)?);
        Ok(self)
    }

    pub fn multipart(mut self, fields: Vec<(String, FormField)>) -> Self {
        self.body = Body::Multipart(fields);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn into_error(self) -> ApiError {
        ApiError::from_status(self.status.as_u16(), &self.body)
    }
}

/// How many times a request has been replayed after a renewal. Capped at
/// one, so the refresh flow cannot loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt(u8);

impl Attempt {
    pub const FIRST: Attempt = Attempt(0);
    pub const MAX_REPLAYS: u8 = 1;

    /// The replay attempt, or `None` once the cap is reached.
    pub fn next(self) -> Option<Attempt> {
        if self.0 < Self::MAX_REPLAYS {
            Some(Attempt(self.0 + 1))
        } else {
            None
        }
    }

    pub fn is_replay(self) -> bool {
        self.0 > 0
    }
}

/// Sends one request on the wire. Any HTTP status is `Ok`; `Err` means no
/// response was obtained at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;

    /// Drop whatever credentials the transport carries. Used on logout so a
    /// failed server call still leaves nothing behind.
    fn clear_credentials(&self) {}
}
