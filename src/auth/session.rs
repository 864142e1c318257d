// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session records and the session store interface.
//!
//! There is at most one session per user. Every login and refresh
//! overwrites the user's row, so a token is current only while it equals
//! the row's `access_token`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StorageResult;

/// The single session row of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Owning user (row key)
    pub user_id: String,
    /// Current signed access token
    pub access_token: Option<String>,
    /// Current opaque refresh token
    pub refresh_token: String,
    /// End of the refresh window
    pub refresh_expires_at: DateTime<Utc>,
    /// Whether the refresh window slides instead of expiring
    pub remember_me: bool,
    /// Explicit invalidation flag
    pub is_valid: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_ip: Option<String>,
    pub last_user_agent: Option<String>,
}

impl Session {
    /// Empty row used when an upsert creates a session.
    ///
    /// A row created from a partial update stays invalid until an update
    /// explicitly marks it valid.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: None,
            refresh_token: String::new(),
            refresh_expires_at: DateTime::<Utc>::UNIX_EPOCH,
            remember_me: false,
            is_valid: false,
            last_login_at: None,
            last_ip: None,
            last_user_agent: None,
        }
    }

    /// Merge the fields present in `update` into this row.
    pub fn apply(&mut self, update: SessionUpdate) {
        if let Some(token) = update.access_token {
            self.access_token = Some(token);
        }
        if let Some(token) = update.refresh_token {
            self.refresh_token = token;
        }
        if let Some(at) = update.refresh_expires_at {
            self.refresh_expires_at = at;
        }
        if let Some(flag) = update.remember_me {
            self.remember_me = flag;
        }
        if let Some(flag) = update.is_valid {
            self.is_valid = flag;
        }
        if let Some(at) = update.last_login_at {
            self.last_login_at = Some(at);
        }
        if let Some(ip) = update.last_ip {
            self.last_ip = Some(ip);
        }
        if let Some(agent) = update.last_user_agent {
            self.last_user_agent = Some(agent);
        }
    }
}

/// Fields to merge into a session row. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub refresh_expires_at: Option<DateTime<Utc>>,
    pub remember_me: Option<bool>,
    pub is_valid: Option<bool>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_ip: Option<String>,
    pub last_user_agent: Option<String>,
}

/// Compound lookup predicate. Every field that is set must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFilter {
    pub user_id: String,
    pub refresh_token: Option<String>,
    pub is_valid: Option<bool>,
}

impl SessionFilter {
    /// Filter on the user id alone.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            refresh_token: None,
            is_valid: None,
        }
    }

    /// Filter used by the refresh flow: user, refresh token and validity.
    pub fn live_refresh(user_id: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            refresh_token: Some(refresh_token.into()),
            is_valid: Some(true),
        }
    }

    pub fn matches(&self, session: &Session) -> bool {
        session.user_id == self.user_id
            && self
                .refresh_token
                .as_ref()
                .map_or(true, |token| &session.refresh_token == token)
            && self.is_valid.map_or(true, |flag| session.is_valid == flag)
    }
}

/// Session persistence.
///
/// `upsert` must be atomic per user: concurrent upserts for the same user
/// serialize and the last one to commit wins.
pub trait SessionRepository: Send + Sync {
    /// Merge `update` into the user's row, creating the row if absent.
    fn upsert(&self, user_id: &str, update: SessionUpdate) -> StorageResult<Session>;

    /// Remove the user's row. Removing a missing row is not an error.
    fn delete(&self, user_id: &str) -> StorageResult<()>;

    /// Find the row matching every field of `filter`.
    fn find(&self, filter: &SessionFilter) -> StorageResult<Option<Session>>;

    /// Merge `update` into the row only if it still matches `filter`.
    ///
    /// The check and the write are one atomic step. Returns `Ok(None)` and
    /// writes nothing when no row matches.
    fn update_matching(
        &self,
        filter: &SessionFilter,
        update: SessionUpdate,
    ) -> StorageResult<Option<Session>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_session() -> Session {
        let mut session = Session::empty("alice");
        session.apply(SessionUpdate {
            access_token: Some("access-1".into()),
            refresh_token: Some("refresh-1".into()),
            is_valid: Some(true),
            ..Default::default()
        });
        session
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut session = live_session();
        session.apply(SessionUpdate {
            access_token: Some("access-2".into()),
            ..Default::default()
        });

        assert_eq!(session.access_token.as_deref(), Some("access-2"));
        assert_eq!(session.refresh_token, "refresh-1");
        assert!(session.is_valid);
    }

    #[test]
    fn empty_session_is_not_valid() {
        let session = Session::empty("bob");
        assert!(!session.is_valid);
        assert!(session.access_token.is_none());
    }

    #[test]
    fn live_refresh_filter_requires_all_fields() {
        let session = live_session();

        assert!(SessionFilter::live_refresh("alice", "refresh-1").matches(&session));
        assert!(!SessionFilter::live_refresh("alice", "refresh-0").matches(&session));
        assert!(!SessionFilter::live_refresh("bob", "refresh-1").matches(&session));

        let mut invalidated = session.clone();
        invalidated.is_valid = false;
        assert!(!SessionFilter::live_refresh("alice", "refresh-1").matches(&invalidated));
        assert!(SessionFilter::user("alice").matches(&invalidated));
    }
}
