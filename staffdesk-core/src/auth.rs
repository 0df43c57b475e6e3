//! Session lifecycle: login, logout, token refresh and profile fetch
//!
//! Externally there are two states, authenticated and unauthenticated.
//! Calls in flight are only visible through the busy flags.
//!
//! Failure policy:
//! - login failures are classified and shown through the error dialog
//! - the server half of logout is best effort; the local session is always
//!   cleared
//! - any refresh failure is treated as an expired session and forces a
//!   silent logout

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::client::{ApiClient, ApiError};
use crate::error_dialog::{ErrorDialog, ErrorInput};
use crate::session::{SessionStore, UserProfile};

const CONFLICT_MESSAGE: &str = "User is already logged in on another device.";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";
const LOGIN_ERROR_MESSAGE: &str = "An error occurred during login.";
const NETWORK_MESSAGE: &str = "Network error. Please try again.";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Why a login attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFailure {
    /// 409: session already active elsewhere
    Conflict { message: Option<String> },
    /// 401
    InvalidCredentials,
    /// Any other status, or an unreadable success body
    Server {
        status: Option<StatusCode>,
        message: Option<String>,
    },
    /// No response at all
    Network,
}

impl From<&ApiError> for LoginFailure {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => match *status {
                StatusCode::CONFLICT => Self::Conflict {
                    message: message.clone(),
                },
                StatusCode::UNAUTHORIZED => Self::InvalidCredentials,
                status => Self::Server {
                    status: Some(status),
                    message: message.clone(),
                },
            },
            ApiError::Network(_) => Self::Network,
            ApiError::Decode(_) | ApiError::MultipartUnsupported(_) | ApiError::Builder(_) => {
                Self::Server {
                    status: None,
                    message: None,
                }
            }
        }
    }
}

impl LoginFailure {
    /// User-facing dialog content for this failure
    pub fn to_error_input(&self) -> ErrorInput {
        match self {
            Self::Conflict { message } => ErrorInput::structured(
                "Login Conflict",
                message.as_deref().unwrap_or(CONFLICT_MESSAGE),
                "Try Again",
            ),
            Self::InvalidCredentials => {
                ErrorInput::structured("Login Failed", INVALID_CREDENTIALS_MESSAGE, "Try Again")
            }
            Self::Server { message, .. } => ErrorInput::structured(
                "Login Error",
                message.as_deref().unwrap_or(LOGIN_ERROR_MESSAGE),
                "Close",
            ),
            Self::Network => ErrorInput::Plain(NETWORK_MESSAGE.to_string()),
        }
    }
}

/// Holds a busy flag raised until dropped
struct BusyGuard<'a>(&'a watch::Sender<bool>);

impl<'a> BusyGuard<'a> {
    fn raise(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// Orchestrates the session lifecycle against the API and session store
pub struct AuthService {
    api: ApiClient,
    session: Arc<SessionStore>,
    errors: Arc<ErrorDialog>,
    loading: watch::Sender<bool>,
    profile_loading: watch::Sender<bool>,
}

impl AuthService {
    pub fn new(api: ApiClient, errors: Arc<ErrorDialog>) -> Self {
        let session = Arc::clone(api.session());
        Self {
            api,
            session,
            errors,
            loading: watch::Sender::new(false),
            profile_loading: watch::Sender::new(false),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// True while a login is in flight
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// True while a profile fetch is in flight
    pub fn is_profile_loading(&self) -> bool {
        *self.profile_loading.borrow()
    }

    /// Log in and commit the returned session. Failures are reported
    /// through the error dialog and leave the session untouched.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let _busy = BusyGuard::raise(&self.loading);

        let req = self
            .api
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });

        match self.api.execute::<LoginResponse>(req).await {
            Ok(resp) => {
                tracing::info!("Logged in as {}", resp.user.email);
                if let Err(e) = self.session.set_session(resp.access_token, resp.user) {
                    tracing::warn!("Session not persisted: {}", e);
                }
                true
            }
            Err(e) => {
                let failure = LoginFailure::from(&e);
                tracing::info!("Login failed: {}", e);
                self.errors.show(failure.to_error_input());
                false
            }
        }
    }

    /// Notify the server (best effort) and clear the local session
    pub async fn logout(&self, all_devices: bool) {
        let path = if all_devices {
            "/auth/logout-all-devices"
        } else {
            "/auth/logout"
        };

        if let Err(e) = self
            .api
            .execute_empty(self.api.request(Method::POST, path))
            .await
        {
            tracing::debug!("Ignoring logout failure: {}", e);
        }

        self.clear_local();
        tracing::info!(all_devices, "Logged out");
    }

    /// Swap the access token for a fresh one. Any failure logs out.
    ///
    /// If the session changed while the call was in flight (a login or
    /// logout raced it) the outcome is discarded.
    pub async fn refresh(&self) {
        let seen = self.session.generation();
        let req = self.api.request(Method::POST, "/auth/refresh");

        match self.api.execute::<RefreshResponse>(req).await {
            Ok(resp) => match self.session.set_token_if(seen, resp.access_token) {
                Ok(true) => tracing::debug!("Access token refreshed"),
                Ok(false) => tracing::debug!("Session changed during refresh, token dropped"),
                Err(e) => tracing::warn!("Refreshed token not persisted: {}", e),
            },
            Err(e) => {
                tracing::info!("Refresh failed, logging out: {}", e);
                if let Err(e) = self
                    .api
                    .execute_empty(self.api.request(Method::POST, "/auth/logout"))
                    .await
                {
                    tracing::debug!("Ignoring logout failure: {}", e);
                }
                match self.session.clear_session_if(seen) {
                    Ok(true) => {}
                    Ok(false) => tracing::debug!("Session changed during refresh, keeping it"),
                    Err(e) => tracing::warn!("Failed to clear persisted session: {}", e),
                }
            }
        }
    }

    /// Reload the profile from `/auth/me`. On failure the stored profile is
    /// dropped; the token is kept.
    pub async fn fetch_me(&self) -> Option<UserProfile> {
        let _busy = BusyGuard::raise(&self.profile_loading);

        let user = match self.api.get::<UserProfile>("/auth/me").await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("Profile fetch failed: {}", e);
                None
            }
        };

        if let Err(e) = self.session.set_user(user.clone()) {
            tracing::warn!("Profile not persisted: {}", e);
        }
        user
    }

    fn clear_local(&self) {
        if let Err(e) = self.session.clear_session() {
            tracing::warn!("Failed to clear persisted session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        let status = |code: u16, message: Option<&str>| ApiError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            message: message.map(String::from),
        };

        assert_eq!(
            LoginFailure::from(&status(409, None)),
            LoginFailure::Conflict { message: None }
        );
        assert_eq!(
            LoginFailure::from(&status(401, Some("nope"))),
            LoginFailure::InvalidCredentials
        );
        assert_eq!(
            LoginFailure::from(&status(422, Some("Email is required"))),
            LoginFailure::Server {
                status: Some(StatusCode::UNPROCESSABLE_ENTITY),
                message: Some("Email is required".to_string()),
            }
        );

        let decode = serde_json::from_str::<LoginResponse>("{}").unwrap_err();
        assert!(matches!(
            LoginFailure::from(&ApiError::Decode(decode)),
            LoginFailure::Server { status: None, .. }
        ));
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            LoginFailure::Conflict { message: None }.to_error_input(),
            ErrorInput::structured("Login Conflict", CONFLICT_MESSAGE, "Try Again")
        );
        assert_eq!(
            LoginFailure::Conflict {
                message: Some("Active on phone".to_string())
            }
            .to_error_input(),
            ErrorInput::structured("Login Conflict", "Active on phone", "Try Again")
        );
        assert_eq!(
            LoginFailure::Server {
                status: Some(StatusCode::INTERNAL_SERVER_ERROR),
                message: None
            }
            .to_error_input(),
            ErrorInput::structured("Login Error", LOGIN_ERROR_MESSAGE, "Close")
        );
        assert_eq!(
            LoginFailure::Network.to_error_input(),
            ErrorInput::Plain(NETWORK_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let flag = watch::Sender::new(false);
        {
            let _busy = BusyGuard::raise(&flag);
            assert!(*flag.borrow());
        }
        assert!(!*flag.borrow());
    }
}
