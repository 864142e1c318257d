// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory implementations of the auth capability interfaces.
//!
//! Used by unit tests of the auth core; they share nothing with redb.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use super::{StorageError, StorageResult};
use crate::auth::{Identity, IdentityRepository, Session, SessionFilter, SessionRepository, SessionUpdate};

fn poisoned<E>(_: E) -> StorageError {
    StorageError::Unavailable("lock poisoned".to_string())
}

/// Identities keyed by username.
#[derive(Default)]
pub struct MemoryIdentities {
    identities: RwLock<HashMap<String, Identity>>,
}

impl MemoryIdentities {
    pub fn insert(&self, identity: Identity) {
        let mut map = self.identities.write().unwrap_or_else(|e| e.into_inner());
        map.insert(identity.username.clone(), identity);
    }

    pub fn set_active(&self, username: &str, active: bool) {
        let mut map = self.identities.write().unwrap_or_else(|e| e.into_inner());
        if let Some(identity) = map.get_mut(username) {
            identity.is_active = active;
        }
    }
}

impl IdentityRepository for MemoryIdentities {
    fn find_identity(&self, identifier: &str) -> StorageResult<Option<Identity>> {
        let map = self.identities.read().map_err(poisoned)?;
        if let Some(identity) = map.get(identifier) {
            return Ok(Some(identity.clone()));
        }
        Ok(map
            .values()
            .find(|i| i.email.eq_ignore_ascii_case(identifier))
            .cloned())
    }
}

/// Session rows behind a single mutex; each call is one atomic step.
#[derive(Default)]
pub struct MemorySessions {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRepository for MemorySessions {
    fn upsert(&self, user_id: &str, update: SessionUpdate) -> StorageResult<Session> {
        let mut map = self.sessions.lock().map_err(poisoned)?;
        let session = map
            .entry(user_id.to_string())
            .or_insert_with(|| Session::empty(user_id));
        session.apply(update);
        Ok(session.clone())
    }

    fn delete(&self, user_id: &str) -> StorageResult<()> {
        self.sessions.lock().map_err(poisoned)?.remove(user_id);
        Ok(())
    }

    fn find(&self, filter: &SessionFilter) -> StorageResult<Option<Session>> {
        let map = self.sessions.lock().map_err(poisoned)?;
        Ok(map.get(&filter.user_id).filter(|s| filter.matches(s)).cloned())
    }

    fn update_matching(
        &self,
        filter: &SessionFilter,
        update: SessionUpdate,
    ) -> StorageResult<Option<Session>> {
        let mut map = self.sessions.lock().map_err(poisoned)?;
        match map.get_mut(&filter.user_id) {
            Some(session) if filter.matches(session) => {
                session.apply(update);
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }
}
