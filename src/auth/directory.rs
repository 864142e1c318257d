// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External directory authenticator.
//!
//! The directory is an opaque collaborator: a simple bind with the
//! presented identifier and secret either succeeds or it does not.
//! Failing to reach the directory is reported separately from a rejected
//! bind so callers can tell an outage from bad credentials.

use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings};

use crate::config::DirectoryConfig;

/// Outcome of a failed bind.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The directory could not be dialed or answered with a transport error
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// The directory refused the credentials
    #[error("directory rejected the credentials")]
    Rejected,
}

/// Anything that can confirm an identifier/secret pair by binding.
#[async_trait]
pub trait DirectoryAuthenticator: Send + Sync {
    async fn bind(&self, identifier: &str, secret: &str) -> Result<(), DirectoryError>;
}

/// LDAP simple-bind authenticator.
pub struct LdapDirectory {
    config: DirectoryConfig,
}

impl LdapDirectory {
    pub fn new(config: DirectoryConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DirectoryAuthenticator for LdapDirectory {
    async fn bind(&self, identifier: &str, secret: &str) -> Result<(), DirectoryError> {
        // An empty password would be an unauthenticated bind, which most
        // servers accept.
        if secret.is_empty() {
            return Err(DirectoryError::Rejected);
        }

        let settings = LdapConnSettings::new().set_conn_timeout(self.config.timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.config.url())
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "Directory connection closed with error");
            }
        });

        let result = ldap
            .simple_bind(identifier, secret)
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        let _ = ldap.unbind().await;

        result.success().map(|_| ()).map_err(|_| DirectoryError::Rejected)
    }
}
