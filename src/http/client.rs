//! Client wrapper with silent session renewal.
//!
//! Per request:
//!
//! 1. issue the request;
//! 2. success -> done;
//! 3. "access token expired" and not yet replayed -> `POST /auth/refresh`;
//!    on success replay once, on failure clear the session and return the
//!    original failure;
//! 4. anything else -> done, failure returned as-is.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{ApiRequest, ApiResponse, Attempt, Transport};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

pub const REFRESH_PATH: &str = "/auth/refresh";

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    expired_status: StatusCode,
    coalesce_refresh: bool,
    /// Bumped after every successful renewal.
    renewals: AtomicU64,
    renewal_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore, config: &ClientConfig) -> Self {
        let expired_status =
            StatusCode::from_u16(config.expired_status).unwrap_or(StatusCode::FORBIDDEN);
        Self {
            transport,
            session,
            expired_status,
            coalesce_refresh: config.coalesce_refresh,
            renewals: AtomicU64::new(0),
            renewal_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Number of successful renewals so far.
    pub fn renewal_count(&self) -> u64 {
        self.renewals.load(Ordering::Acquire)
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut attempt = Attempt::FIRST;
        loop {
            let observed = self.renewals.load(Ordering::Acquire);
            let response = self.transport.execute(&request).await?;
            if response.is_success() {
                return Ok(response);
            }

            if response.status == self.expired_status {
                if let Some(replay) = attempt.next() {
                    tracing::debug!(path = %request.path, "access token expired, renewing session");
                    match self.renew(observed).await {
                        Ok(()) => {
                            attempt = replay;
                            continue;
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "session renewal failed, signing out");
                            self.session.expire();
                            return Err(response.into_error());
                        }
                    }
                }
            }

            if attempt.is_replay() {
                tracing::debug!(path = %request.path, status = response.status.as_u16(), "replayed request failed");
            }
            return Err(response.into_error());
        }
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        serde_json::from_value(response.body).map_err(ApiError::decode)
    }

    /// Explicit renewal, outside any request.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.issue_renewal().await
    }

    pub(crate) fn clear_credentials(&self) {
        self.transport.clear_credentials();
    }

    async fn renew(&self, observed: u64) -> Result<(), ApiError> {
        if !self.coalesce_refresh {
            return self.issue_renewal().await;
        }

        let _guard = self.renewal_lock.lock().await;
        if self.renewals.load(Ordering::Acquire) != observed {
            tracing::debug!("session already renewed by a concurrent request");
            return Ok(());
        }
        self.issue_renewal().await
    }

    // Goes straight to the transport; a failed renewal is never itself renewed.
    async fn issue_renewal(&self) -> Result<(), ApiError> {
        let request = ApiRequest::post(REFRESH_PATH).json(&serde_json::json!({}))?;
        let response = self.transport.execute(&request).await?;
        if response.is_success() {
            self.renewals.fetch_add(1, Ordering::AcqRel);
            Ok(())
        } else {
            Err(response.into_error())
        }
    }
}
