// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: username → serialized StoredUser
//! - `users_by_email`: lowercase email → username
//! - `sessions`: user_id → serialized Session
//! - `outlets`: outlet id → serialized StoredOutlet
//! - `activity`: time-ordered key (see [`activity`](super::activity)) → serialized ActivityEvent
//! - `sequences`: sequence name → last issued id

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

use super::StorageResult;

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

pub(crate) const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");

pub(crate) const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

pub(crate) const OUTLETS: TableDefinition<u64, &[u8]> = TableDefinition::new("outlets");

/// Key format: `timestamp_micros_be | event_id` for chronological scans.
pub(crate) const ACTIVITY: TableDefinition<&[u8], &[u8]> = TableDefinition::new("activity");

pub(crate) const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Shared handle to the application database.
pub struct AppDatabase {
    db: Database,
}

impl AppDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(SESSIONS)?;
            let _ = write_txn.open_table(OUTLETS)?;
            let _ = write_txn.open_table(ACTIVITY)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn inner(&self) -> &Database {
        &self.db
    }

    /// Cheap liveness probe: a read transaction on the sequences table.
    pub fn check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(SEQUENCES)?;
        Ok(())
    }
}

/// Advance a named sequence inside an open write transaction.
///
/// The first id of every sequence is 1.
pub(crate) fn next_id(txn: &WriteTransaction, sequence: &str) -> StorageResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let current = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = current + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_file_and_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("db.redb");

        let db = AppDatabase::open(&path).unwrap();
        db.check().unwrap();
        drop(db);

        assert!(path.exists());
        AppDatabase::open(&path).unwrap().check().unwrap();
    }

    #[test]
    fn sequences_start_at_one_and_increase() {
        let dir = TempDir::new().unwrap();
        let db = AppDatabase::open(&dir.path().join("db.redb")).unwrap();

        let txn = db.inner().begin_write().unwrap();
        assert_eq!(next_id(&txn, "outlets").unwrap(), 1);
        assert_eq!(next_id(&txn, "outlets").unwrap(), 2);
        assert_eq!(next_id(&txn, "other").unwrap(), 1);
        txn.commit().unwrap();
    }
}
