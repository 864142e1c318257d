// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Refresh coordinator.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::session::{SessionFilter, SessionRepository, SessionUpdate};
use super::tokens::{SignedToken, TokenIssuer};
use super::AuthError;

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedAccess {
    pub access: SignedToken,
    /// End of the refresh window after this refresh
    pub refresh_expires_at: DateTime<Utc>,
    /// Whether the window was slid forward by remember-me
    pub extended: bool,
}

/// Mints new access tokens from refresh tokens.
///
/// The refresh token itself is never rotated here; only login replaces it.
pub struct RefreshCoordinator {
    issuer: Arc<TokenIssuer>,
    sessions: Arc<dyn SessionRepository>,
    refresh_ttl: Duration,
}

impl RefreshCoordinator {
    pub fn new(
        issuer: Arc<TokenIssuer>,
        sessions: Arc<dyn SessionRepository>,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            issuer,
            sessions,
            refresh_ttl,
        }
    }

    /// The new access token is written only if the session still holds
    /// `refresh_token` when the write commits; a login that replaced it in
    /// the meantime turns this refresh into [`AuthError::NoSession`].
    pub fn refresh(&self, user_id: &str, refresh_token: &str) -> Result<RefreshedAccess, AuthError> {
        let filter = SessionFilter::live_refresh(user_id, refresh_token);
        let session = self
            .sessions
            .find(&filter)
            .map_err(|e| AuthError::StoreReadFailed(e.to_string()))?
            .ok_or(AuthError::NoSession)?;

        let now = Utc::now();
        let mut refresh_expires_at = session.refresh_expires_at;
        let mut extended = false;
        if now > session.refresh_expires_at {
            if !session.remember_me {
                info!(user_id, "Refresh window lapsed");
                return Err(AuthError::RefreshExpired);
            }
            refresh_expires_at = now + self.refresh_ttl;
            extended = true;
        }

        let access = self.issuer.issue_access_token(user_id)?;
        self.sessions
            .update_matching(
                &filter,
                SessionUpdate {
                    access_token: Some(access.token.clone()),
                    refresh_expires_at: extended.then_some(refresh_expires_at),
                    ..Default::default()
                },
            )
            .map_err(|e| AuthError::StoreWriteFailed(e.to_string()))?
            .ok_or(AuthError::NoSession)?;

        Ok(RefreshedAccess {
            access,
            refresh_expires_at,
            extended,
        })
    }
}
