// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential verification.
//!
//! When a directory is configured it is tried first:
//!
//! | Directory bind | Result                                              |
//! |----------------|-----------------------------------------------------|
//! | succeeds       | identity loaded from the local store, no hash check |
//! | rejected       | local bcrypt comparison                             |
//! | unreachable    | local bcrypt comparison, `DirectoryUnavailable` on mismatch |
//!
//! Without a directory only the local comparison runs.

use std::sync::Arc;

use tracing::{debug, warn};

use super::directory::{DirectoryAuthenticator, DirectoryError};
use super::identity::{Identity, IdentityRepository};
use super::password::verify_password;
use super::AuthError;

pub struct CredentialVerifier {
    identities: Arc<dyn IdentityRepository>,
    directory: Option<Arc<dyn DirectoryAuthenticator>>,
}

impl CredentialVerifier {
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        directory: Option<Arc<dyn DirectoryAuthenticator>>,
    ) -> Self {
        Self {
            identities,
            directory,
        }
    }

    /// Confirm `identifier`/`secret` and return the matching identity.
    ///
    /// Read-only. The active flag is not checked here.
    pub async fn verify(&self, identifier: &str, secret: &str) -> Result<Identity, AuthError> {
        let mut directory_down = None;

        if let Some(directory) = &self.directory {
            match directory.bind(identifier, secret).await {
                Ok(()) => {
                    debug!(identifier, "Directory bind accepted");
                    return self.load(identifier)?.ok_or(AuthError::UserNotFound);
                }
                Err(DirectoryError::Rejected) => {
                    debug!(identifier, "Directory bind rejected, trying local credentials");
                }
                Err(DirectoryError::Unavailable(reason)) => {
                    warn!(error = %reason, "Directory unreachable, trying local credentials");
                    directory_down = Some(reason);
                }
            }
        }

        let identity = self.load(identifier)?.ok_or(AuthError::UserNotFound)?;
        let matches = match identity.password_hash.as_deref() {
            Some(hash) => verify_password(secret, hash).await,
            None => false,
        };

        match (matches, directory_down) {
            (true, _) => Ok(identity),
            (false, Some(reason)) => Err(AuthError::DirectoryUnavailable(reason)),
            (false, None) => Err(AuthError::InvalidCredentials),
        }
    }

    fn load(&self, identifier: &str) -> Result<Option<Identity>, AuthError> {
        self.identities
            .find_identity(identifier)
            .map_err(|e| AuthError::StoreReadFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::storage::MemoryIdentities;
    use async_trait::async_trait;

    /// Directory that answers every bind the same way.
    struct ScriptedDirectory(fn() -> Result<(), DirectoryError>);

    #[async_trait]
    impl DirectoryAuthenticator for ScriptedDirectory {
        async fn bind(&self, _identifier: &str, _secret: &str) -> Result<(), DirectoryError> {
            (self.0)()
        }
    }

    async fn identities_with(username: &str, password: Option<&str>) -> Arc<MemoryIdentities> {
        let password_hash = match password {
            Some(p) => Some(hash_password(p, 4).await.unwrap()),
            None => None,
        };
        let identities = Arc::new(MemoryIdentities::default());
        identities.insert(Identity {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            group: 1,
            is_active: true,
            password_hash,
        });
        identities
    }

    fn with_directory(
        identities: Arc<MemoryIdentities>,
        script: fn() -> Result<(), DirectoryError>,
    ) -> CredentialVerifier {
        CredentialVerifier::new(identities, Some(Arc::new(ScriptedDirectory(script))))
    }

    #[tokio::test]
    async fn local_password_is_compared() {
        let verifier = CredentialVerifier::new(identities_with("alice", Some("hunter22")).await, None);

        assert_eq!(verifier.verify("alice", "hunter22").await.unwrap().username, "alice");
        assert!(matches!(
            verifier.verify("alice", "wrong-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn email_resolves_to_the_same_identity() {
        let verifier = CredentialVerifier::new(identities_with("alice", Some("hunter22")).await, None);
        let identity = verifier.verify("ALICE@example.com", "hunter22").await.unwrap();
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let verifier = CredentialVerifier::new(identities_with("alice", Some("hunter22")).await, None);
        assert!(matches!(
            verifier.verify("bob", "hunter22").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn account_without_hash_never_verifies_locally() {
        let verifier = CredentialVerifier::new(identities_with("alice", None).await, None);
        assert!(matches!(
            verifier.verify("alice", "").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn directory_bind_confirms_without_hash() {
        let verifier = with_directory(identities_with("alice", None).await, || Ok(()));
        assert_eq!(verifier.verify("alice", "ldap-secret").await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn directory_bind_for_unknown_local_user_is_not_found() {
        let verifier = with_directory(identities_with("alice", None).await, || Ok(()));
        assert!(matches!(
            verifier.verify("bob", "ldap-secret").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn rejected_bind_falls_back_to_local() {
        let verifier = with_directory(identities_with("alice", Some("hunter22")).await, || {
            Err(DirectoryError::Rejected)
        });

        assert!(verifier.verify("alice", "hunter22").await.is_ok());
        assert!(matches!(
            verifier.verify("alice", "nope-nope").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn unreachable_directory_is_reported_when_local_fails() {
        let verifier = with_directory(identities_with("alice", Some("hunter22")).await, || {
            Err(DirectoryError::Unavailable("connection refused".into()))
        });

        assert!(verifier.verify("alice", "hunter22").await.is_ok());
        assert!(matches!(
            verifier.verify("alice", "nope-nope").await,
            Err(AuthError::DirectoryUnavailable(_))
        ));
    }
}
