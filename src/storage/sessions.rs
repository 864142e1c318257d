// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session rows in redb.
//!
//! redb admits one write transaction at a time, so the read-merge-write in
//! [`SessionStore::upsert`] is atomic and concurrent upserts for a user
//! resolve to whichever commits last.

use std::sync::Arc;

use redb::{ReadableDatabase, ReadableTable};

use super::database::{AppDatabase, SESSIONS};
use super::StorageResult;
use crate::auth::{Session, SessionFilter, SessionRepository, SessionUpdate};

#[derive(Clone)]
pub struct SessionStore {
    db: Arc<AppDatabase>,
}

impl SessionStore {
    pub fn new(db: Arc<AppDatabase>) -> Self {
        Self { db }
    }
}

impl SessionRepository for SessionStore {
    fn upsert(&self, user_id: &str, update: SessionUpdate) -> StorageResult<Session> {
        let write_txn = self.db.inner().begin_write()?;
        let session = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let mut session = match table.get(user_id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => Session::empty(user_id),
            };
            session.apply(update);

            let json = serde_json::to_vec(&session)?;
            table.insert(user_id, json.as_slice())?;
            session
        };
        write_txn.commit()?;
        Ok(session)
    }

    fn delete(&self, user_id: &str) -> StorageResult<()> {
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            table.remove(user_id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn find(&self, filter: &SessionFilter) -> StorageResult<Option<Session>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;
        let session: Session = match table.get(filter.user_id.as_str())? {
            Some(value) => serde_json::from_slice(value.value())?,
            None => return Ok(None),
        };
        Ok(filter.matches(&session).then_some(session))
    }

    fn update_matching(
        &self,
        filter: &SessionFilter,
        update: SessionUpdate,
    ) -> StorageResult<Option<Session>> {
        let write_txn = self.db.inner().begin_write()?;
        let session = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let mut session: Session = match table.get(filter.user_id.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Ok(None),
            };
            if !filter.matches(&session) {
                return Ok(None);
            }
            session.apply(update);

            let json = serde_json::to_vec(&session)?;
            table.insert(filter.user_id.as_str(), json.as_slice())?;
            session
        };
        write_txn.commit()?;
        Ok(Some(session))
    }
}
