use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::{ApiRequest, ApiResponse, Body, FormField, SessionJar, Transport};
use crate::error::ApiError;

/// reqwest-backed transport. Every request carries the jar's cookies.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base: Url,
    jar: Arc<SessionJar>,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, jar: Arc<SessionJar>, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::transport(format!("invalid API URL '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::transport(format!("invalid API URL '{}'", base_url)));
        }

        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base, jar })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn jar(&self) -> &Arc<SessionJar> {
        &self.jar
    }

    /// Append an API path to the base URL, keeping the base's own prefix
    /// (`http://host/api` + `/orders` -> `http://host/api/orders`).
    fn url_for(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        url.set_path(&format!("{}/{}", prefix, path));
        url.set_query(None);
        url
    }

    fn build_form(fields: &[(String, FormField)]) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, field) in fields {
            form = match field {
                FormField::Text(value) => form.text(name.clone(), value.clone()),
                FormField::File(file) => {
                    let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                    if let Some(mime) = &file.mime {
                        part = part.mime_str(mime)?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path);
        tracing::debug!(method = %request.method, %url, "sending request");

        let mut builder = self.client.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(fields) => builder.multipart(Self::build_form(fields)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        tracing::debug!(status = status.as_u16(), "received response");
        Ok(ApiResponse::new(status, body))
    }

    fn clear_credentials(&self) {
        self.jar.clear();
    }
}
