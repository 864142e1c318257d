// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authentication service consumed by the HTTP layer.
//!
//! Ties the verifier, issuer, validator and refresh coordinator to one
//! session store. Every collaborator is injected, so tests run against the
//! in-memory fakes.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::credentials::CredentialVerifier;
use super::directory::DirectoryAuthenticator;
use super::identity::IdentityRepository;
use super::refresh::RefreshCoordinator;
use super::session::{SessionFilter, SessionRepository, SessionUpdate};
use super::tokens::TokenIssuer;
use super::validator::TokenValidator;
use super::{AuthError, AuthenticatedUser};
use crate::config::AppConfig;

/// Where a login came from.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: String,
    pub group: u32,
    pub access_token: String,
    pub access_expires_at: i64,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Outcome of a refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub access_token: String,
    pub access_expires_at: i64,
    pub refresh_expires_at: DateTime<Utc>,
}

pub struct AuthService {
    verifier: CredentialVerifier,
    issuer: Arc<TokenIssuer>,
    validator: TokenValidator,
    refresher: RefreshCoordinator,
    sessions: Arc<dyn SessionRepository>,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        issuer: Arc<TokenIssuer>,
        signing_key: &[u8],
        refresh_ttl: Duration,
        identities: Arc<dyn IdentityRepository>,
        sessions: Arc<dyn SessionRepository>,
        directory: Option<Arc<dyn DirectoryAuthenticator>>,
    ) -> Self {
        Self {
            verifier: CredentialVerifier::new(identities, directory),
            validator: TokenValidator::new(signing_key, issuer.issuer(), sessions.clone()),
            refresher: RefreshCoordinator::new(issuer.clone(), sessions.clone(), refresh_ttl),
            issuer,
            sessions,
            refresh_ttl,
        }
    }

    /// Build the service from configuration.
    ///
    /// Fails only when the configured keys are unusable.
    pub fn from_config(
        config: &AppConfig,
        identities: Arc<dyn IdentityRepository>,
        sessions: Arc<dyn SessionRepository>,
        directory: Option<Arc<dyn DirectoryAuthenticator>>,
    ) -> Result<Self, AuthError> {
        let issuer = TokenIssuer::new(
            &config.signing_key,
            &config.encryption_key,
            config.issuer.clone(),
            config.access_ttl,
        )?;
        Ok(Self::new(
            Arc::new(issuer),
            &config.signing_key,
            config.refresh_ttl,
            identities,
            sessions,
            directory,
        ))
    }

    /// Verify credentials and open a fresh session, replacing any prior one.
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        remember_me: bool,
        client: ClientInfo,
    ) -> Result<LoginOutcome, AuthError> {
        let identity = match self.verifier.verify(identifier, secret).await {
            Ok(identity) => identity,
            Err(e) => {
                info!(identifier, code = e.error_code(), "Login rejected");
                return Err(e);
            }
        };
        if !identity.is_active {
            info!(user_id = %identity.username, "Login rejected for disabled account");
            return Err(AuthError::AccountDisabled);
        }

        let access = self.issuer.issue_access_token(&identity.username)?;
        let refresh_token = self.issuer.issue_refresh_token()?;
        let now = Utc::now();
        let refresh_expires_at = now + self.refresh_ttl;

        self.sessions
            .upsert(
                &identity.username,
                SessionUpdate {
                    access_token: Some(access.token.clone()),
                    refresh_token: Some(refresh_token.clone()),
                    refresh_expires_at: Some(refresh_expires_at),
                    remember_me: Some(remember_me),
                    is_valid: Some(true),
                    last_login_at: Some(now),
                    last_ip: client.ip,
                    last_user_agent: client.user_agent,
                },
            )
            .map_err(|e| AuthError::StoreWriteFailed(e.to_string()))?;

        info!(user_id = %identity.username, remember_me, "User logged in");
        Ok(LoginOutcome {
            user_id: identity.username,
            group: identity.group,
            access_token: access.token,
            access_expires_at: access.claims.exp,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// End the user's session. Logging out twice is not an error.
    pub fn logout(&self, user_id: &str) -> Result<(), AuthError> {
        self.sessions
            .delete(user_id)
            .map_err(|e| AuthError::StoreWriteFailed(e.to_string()))?;
        info!(user_id, "User logged out");
        Ok(())
    }

    /// Mint a new access token from the user's refresh token.
    pub fn refresh_access(
        &self,
        user_id: &str,
        refresh_token: &str,
    ) -> Result<RefreshOutcome, AuthError> {
        let refreshed = self.refresher.refresh(user_id, refresh_token).inspect_err(|e| {
            info!(user_id, code = e.error_code(), "Refresh rejected");
        })?;
        if refreshed.extended {
            info!(user_id, until = %refreshed.refresh_expires_at, "Refresh window extended");
        }

        Ok(RefreshOutcome {
            access_token: refreshed.access.token,
            access_expires_at: refreshed.access.claims.exp,
            refresh_expires_at: refreshed.refresh_expires_at,
        })
    }

    /// Gate for protected requests.
    pub fn authenticate(&self, bearer_token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.validator
            .validate(bearer_token)
            .map(AuthenticatedUser::from_claims)
    }

    /// Invalidate the user's session without removing it.
    ///
    /// A user without a session is left alone.
    pub fn revoke(&self, user_id: &str) -> Result<(), AuthError> {
        let revoked = self
            .sessions
            .update_matching(
                &SessionFilter::user(user_id),
                SessionUpdate {
                    is_valid: Some(false),
                    ..Default::default()
                },
            )
            .map_err(|e| AuthError::StoreWriteFailed(e.to_string()))?;
        if revoked.is_some() {
            info!(user_id, "Session revoked");
        }
        Ok(())
    }
}
