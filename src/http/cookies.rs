//! Cookie jar for the session credentials.
//!
//! A thin layer over `cookie_store`, which applies RFC 6265 domain, path,
//! `Secure` and expiry rules. The jar adds clearing on sign-out and JSON
//! persistence so the CLI keeps its session between runs.

use cookie_store::CookieStore as Cookies;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest::Url;
use reqwest_cookie_store::CookieStoreMutex;
use std::io::{BufRead, Write};
use std::sync::{MutexGuard, PoisonError};

use crate::error::ApiError;

#[derive(Default)]
pub struct SessionJar {
    store: CookieStoreMutex,
}

impl SessionJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(cookies: Cookies) -> Self {
        Self {
            store: CookieStoreMutex::new(cookies),
        }
    }

    pub fn snapshot(&self) -> Cookies {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lock().iter_unexpired().next().is_none()
    }

    /// Restore a jar written by [`SessionJar::save_json`]. Expired entries
    /// are dropped on the way in.
    pub fn load_json<R: BufRead>(reader: R) -> Result<Self, ApiError> {
        let cookies = cookie_store::serde::json::load(reader).map_err(ApiError::decode)?;
        Ok(Self::from_snapshot(cookies))
    }

    /// Session cookies carry no expiry, so non-persistent entries are
    /// written too.
    pub fn save_json<W: Write>(&self, writer: &mut W) -> Result<(), ApiError> {
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&self.lock(), writer)
            .map_err(ApiError::decode)
    }

    fn lock(&self) -> MutexGuard<'_, Cookies> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.store.set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.store.cookies(url)
    }
}
