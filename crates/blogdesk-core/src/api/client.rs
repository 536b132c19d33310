//! API client for communicating with the blog REST API.
//!
//! This module provides the `ApiClient` struct for authenticating against
//! the blog backend and making requests that carry the session's bearer
//! credential.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::models::Category;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix of every versioned API endpoint, relative to the base URL.
const API_PREFIX: &str = "api/v1/";

/// HTTP request timeout in seconds.
/// Bounds how long a login can hang on an unreachable server.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Successful response of `POST /api/v1/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds as reported by the server.
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<i64>,
}

/// A token is usable when it can travel in an `Authorization` header.
pub fn is_usable_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_graphic())
}

/// API client for the blog backend.
///
/// Clone is cheap and clones share both the connection pool and the
/// outbound credential: setting or clearing the credential on one handle
/// affects every request issued through any clone.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    credential: Arc<RwLock<Option<String>>>,
    backoff_ms: u64,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("blogdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            credential: Arc::new(RwLock::new(None)),
            backoff_ms: INITIAL_BACKOFF_MS,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Set the bearer token sent on every subsequent request
    pub fn set_credential(&self, token: &str) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        debug!("API credential set");
    }

    /// Stop sending a bearer token
    pub fn clear_credential(&self) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        debug!("API credential cleared");
    }

    /// Current bearer token, if any
    pub fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_credential(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The `Authorization` header value requests currently carry
    pub fn authorization_header(&self) -> Option<String> {
        self.credential().map(|token| format!("Bearer {}", token))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(API_PREFIX)?.join(path)?)
    }

    // ===== Authentication =====

    /// Exchange email and password for a bearer token.
    ///
    /// Does not touch the stored credential; callers decide what to do
    /// with the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("auth/login")?;
        debug!(%url, "Sending login request");

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_login_status(status, &body));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))?;

        if !is_usable_token(&login.token) {
            return Err(ApiError::InvalidResponse(
                "Login response carried an empty or malformed token".to_string(),
            ));
        }

        Ok(login)
    }

    /// Drop the outbound credential. The backend keeps no server-side
    /// session, so there is no network call to make.
    pub fn logout(&self) {
        self.clear_credential();
    }

    // ===== Request helpers =====

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(value) = self.authorization_header() {
            let mut value = header::HeaderValue::from_str(&value).map_err(|_| {
                ApiError::InvalidResponse("Stored credential is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let mut retries = 0;
        let mut backoff_ms = self.backoff_ms;

        loop {
            let response = self
                .client
                .get(url.clone())
                .headers(self.auth_headers()?)
                .send()
                .await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response.json().await.map_err(|e| {
                        ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
                    });
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(%url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    // ===== Data Fetching Methods =====

    /// Fetch all categories with their post counts
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("categories").await
    }
}
