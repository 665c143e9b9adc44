//! Generic REST accessor: list/create/update/delete against one collection.
//! Filtering happens on the server; the client only forwards parameters.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::capability::ResourceKind;
use crate::error::ApiError;
use crate::http::{ApiClient, ApiRequest, FormField};
use crate::types::RecordId;

/// Server-side filters. Unset or blank values are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub role: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(value.into());
        self
    }

    pub fn status(mut self, value: impl Into<String>) -> Self {
        self.status = Some(value.into());
        self
    }

    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = Some(value.into());
        self
    }

    pub fn role(mut self, value: impl Into<String>) -> Self {
        self.role = Some(value.into());
        self
    }

    pub fn params(&self) -> Vec<(String, String)> {
        [
            ("search", &self.search),
            ("status", &self.status),
            ("category", &self.category),
            ("role", &self.role),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key.to_string(), v.to_string()))
        })
        .collect()
    }
}

pub struct Resource<T> {
    api: Arc<ApiClient>,
    kind: ResourceKind,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            kind: self.kind,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn new(api: Arc<ApiClient>, kind: ResourceKind) -> Self {
        Self {
            api,
            kind,
            _record: PhantomData,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn item_path(&self, id: RecordId) -> String {
        format!("{}/{}", self.kind.path(), id)
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<T>, ApiError> {
        let request = ApiRequest::get(self.kind.path()).query(query.params());
        self.api.send_json(request).await
    }

    pub async fn create<B: Serialize>(&self, body: &B) -> Result<Value, ApiError> {
        let request = ApiRequest::post(self.kind.path()).json(body)?;
        Ok(self.api.send(request).await?.body)
    }

    pub async fn create_multipart(&self, fields: Vec<(String, FormField)>) -> Result<Value, ApiError> {
        let request = ApiRequest::post(self.kind.path()).multipart(fields);
        Ok(self.api.send(request).await?.body)
    }

    pub async fn update<B: Serialize>(&self, id: RecordId, body: &B) -> Result<Value, ApiError> {
        let request = ApiRequest::put(self.item_path(id)).json(body)?;
        Ok(self.api.send(request).await?.body)
    }

    pub async fn update_multipart(
        &self,
        id: RecordId,
        fields: Vec<(String, FormField)>,
    ) -> Result<Value, ApiError> {
        let request = ApiRequest::put(self.item_path(id)).multipart(fields);
        Ok(self.api.send(request).await?.body)
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), ApiError> {
        self.api.send(ApiRequest::delete(self.item_path(id))).await?;
        Ok(())
    }
}
