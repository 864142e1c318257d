// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity records as seen by the auth core.

use serde::{Deserialize, Serialize};

use crate::storage::StorageResult;

/// A user identity, owned by the persistence layer.
///
/// The auth core only reads identities; it never creates or mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique username, also the session key
    pub username: String,
    /// Unique email
    pub email: String,
    /// Group (tier) the user belongs to
    pub group: u32,
    /// Whether the account may log in
    pub is_active: bool,
    /// bcrypt hash, absent for directory-only accounts
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
}

/// Keyed identity lookup.
pub trait IdentityRepository: Send + Sync {
    /// Resolve an identifier to an identity.
    ///
    /// The identifier is tried as a username first, then as an email
    /// (case-insensitive). `Ok(None)` means no such user.
    fn find_identity(&self, identifier: &str) -> StorageResult<Option<Identity>>;
}
