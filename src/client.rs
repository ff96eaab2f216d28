//! Consumer-side auth cache.
//!
//! One explicitly-owned `AuthClient` instance holds the cached "who am I"
//! view for a UI process. The cache is refreshed on demand and mutated in
//! place on login/register/logout; derived entitlement is recomputed from
//! the cached record on every read, never stored as a boolean.

use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::models::user::PublicUser;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success response other than the expected 401 on refresh.
    #[error("API error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Registration form as the API expects it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Serialize)]
struct LoginForm<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    current: Option<PublicUser>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            current: None,
        })
    }

    /// Re-fetch the current user. A 401 is the ordinary signed-out state and
    /// resolves the cache to "no user"; any other non-success response is a
    /// fault carrying the status and reason.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let response = self
            .http
            .get(format!("{}/api/auth/user", self.base_url))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.current = None;
            return Ok(());
        }

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        self.current = Some(response.json::<PublicUser>().await?);
        Ok(())
    }

    pub async fn register(&mut self, registration: &Registration) -> Result<&PublicUser, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/auth/register", self.base_url))
            .json(registration)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let user = response.json::<PublicUser>().await?;
        Ok(self.current.insert(user))
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&PublicUser, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&LoginForm { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let user = response.json::<PublicUser>().await?;
        Ok(self.current.insert(user))
    }

    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/api/auth/logout", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        self.current = None;
        Ok(())
    }

    pub fn current_user(&self) -> Option<&PublicUser> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Derived on every read from the cached record and the clock, so an
    /// expiring trial flips to unsubscribed without a refetch.
    pub fn has_active_subscription(&self) -> bool {
        self.current
            .as_ref()
            .map(|user| user.has_active_subscription(Utc::now()))
            .unwrap_or(false)
    }

    pub fn trial_days_remaining(&self) -> Option<i64> {
        self.current
            .as_ref()
            .and_then(|user| user.trial_days_remaining(Utc::now()))
    }

    async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        ClientError::Api { status, message }
    }
}
