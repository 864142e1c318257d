// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Typed rejection produced by the auth core.
///
/// The core only returns these variants and never inspects transport
/// details; [`IntoResponse`] below is the HTTP layer's mapping.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,
    /// Invalid authorization header format
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Identifier/secret pair did not verify
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// No identity matches the identifier
    #[error("User not found")]
    UserNotFound,
    /// Identity exists but is not active
    #[error("Account is disabled")]
    AccountDisabled,
    /// Directory authenticator could not be reached
    #[error("Directory service unavailable: {0}")]
    DirectoryUnavailable(String),
    /// Token failed structural parsing or signature verification
    #[error("Token is malformed or its signature is invalid")]
    TokenMalformed,
    /// Token expiry has passed
    #[error("Token has expired")]
    TokenExpired,
    /// Token is no longer the current token of the session
    #[error("Token has been superseded or invalidated")]
    TokenSuperseded,
    /// No (matching) session for the user
    #[error("No active session")]
    NoSession,
    /// Refresh window lapsed without remember-me
    #[error("Refresh token expired, please log in again")]
    RefreshExpired,
    /// Session could not be read
    #[error("Session store read failed: {0}")]
    StoreReadFailed(String),
    /// Session could not be written
    #[error("Session store write failed: {0}")]
    StoreWriteFailed(String),
    /// Signing key, cipher or randomness failure
    #[error("Token issuance failed: {0}")]
    IssuanceFailed(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::UserNotFound => "user_not_found",
            AuthError::AccountDisabled => "account_disabled",
            AuthError::DirectoryUnavailable(_) => "directory_unavailable",
            AuthError::TokenMalformed => "token_malformed",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenSuperseded => "token_superseded",
            AuthError::NoSession => "no_session",
            AuthError::RefreshExpired => "refresh_expired",
            AuthError::StoreReadFailed(_) => "store_read_failed",
            AuthError::StoreWriteFailed(_) => "store_write_failed",
            AuthError::IssuanceFailed(_) => "issuance_failed",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidCredentials
            | AuthError::UserNotFound
            | AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::TokenSuperseded
            | AuthError::NoSession
            | AuthError::RefreshExpired => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled => StatusCode::FORBIDDEN,
            AuthError::DirectoryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::StoreReadFailed(_)
            | AuthError::StoreWriteFailed(_)
            | AuthError::IssuanceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the logs.
        let message = match &self {
            AuthError::StoreReadFailed(_)
            | AuthError::StoreWriteFailed(_)
            | AuthError::IssuanceFailed(_) => {
                tracing::error!(error = %self, "Authentication failed internally");
                "Internal authentication error".to_string()
            }
            _ => self.to_string(),
        };
        let body = Json(AuthErrorBody {
            error: message,
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn superseded_token_returns_401_with_code() {
        let response = AuthError::TokenSuperseded.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "token_superseded");
    }

    #[tokio::test]
    async fn store_failures_hide_details() {
        let response = AuthError::StoreWriteFailed("disk full at /data".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "store_write_failed");
        assert!(!body["error"].as_str().unwrap().contains("/data"));
    }

    #[test]
    fn directory_outage_is_distinct_from_bad_credentials() {
        assert_eq!(
            AuthError::DirectoryUnavailable("timeout".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AccountDisabled.status_code(), StatusCode::FORBIDDEN);
    }
}
