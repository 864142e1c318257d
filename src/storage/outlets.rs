// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outlet repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::database::{next_id, AppDatabase, OUTLETS};
use super::{StorageError, StorageResult};

const OUTLET_SEQUENCE: &str = "outlets";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutletStatus {
    Active,
    Inactive,
}

/// Outlet stored in the `outlets` table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredOutlet {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub manager: String,
    pub status: OutletStatus,
    /// Free-form opening hours, e.g. "Mon-Fri 08:00-17:00"
    pub open_hours: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outlet fields supplied by the caller; id and timestamps are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOutlet {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub manager: String,
    pub status: OutletStatus,
    pub open_hours: String,
}

/// Outlet counts by status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct OutletStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

impl StoredOutlet {
    /// Case-insensitive match on name, address or manager.
    fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.address, &self.manager]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Clone)]
pub struct OutletStore {
    db: Arc<AppDatabase>,
}

impl OutletStore {
    pub fn new(db: Arc<AppDatabase>) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewOutlet) -> StorageResult<StoredOutlet> {
        let write_txn = self.db.inner().begin_write()?;
        let outlet = {
            let id = next_id(&write_txn, OUTLET_SEQUENCE)?;
            let now = Utc::now();
            let outlet = StoredOutlet {
                id,
                name: new.name,
                address: new.address,
                phone: new.phone,
                manager: new.manager,
                status: new.status,
                open_hours: new.open_hours,
                created_at: now,
                updated_at: now,
            };
            let json = serde_json::to_vec(&outlet)?;
            let mut table = write_txn.open_table(OUTLETS)?;
            table.insert(id, json.as_slice())?;
            outlet
        };
        write_txn.commit()?;
        Ok(outlet)
    }

    pub fn get(&self, id: u64) -> StorageResult<StoredOutlet> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(OUTLETS)?;
        match table.get(id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::NotFound(format!("Outlet {id}"))),
        }
    }

    /// Outlets in id order, optionally filtered by a search term.
    pub fn list(&self, search: Option<&str>) -> StorageResult<Vec<StoredOutlet>> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(OUTLETS)?;
        let mut outlets = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let outlet: StoredOutlet = serde_json::from_slice(value.value())?;
            if needle.as_deref().is_none_or(|n| outlet.matches(n)) {
                outlets.push(outlet);
            }
        }
        Ok(outlets)
    }

    /// Counts over every outlet, taken from one read transaction.
    pub fn stats(&self) -> StorageResult<OutletStats> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(OUTLETS)?;

        let mut stats = OutletStats::default();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let outlet: StoredOutlet = serde_json::from_slice(value.value())?;
            stats.total += 1;
            match outlet.status {
                OutletStatus::Active => stats.active += 1,
                OutletStatus::Inactive => stats.inactive += 1,
            }
        }
        Ok(stats)
    }

    /// Replace an existing outlet. `updated_at` is set here.
    pub fn update(&self, outlet: &StoredOutlet) -> StorageResult<StoredOutlet> {
        let write_txn = self.db.inner().begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(OUTLETS)?;
            let created_at = match table.get(outlet.id)? {
                Some(value) => serde_json::from_slice::<StoredOutlet>(value.value())?.created_at,
                None => return Err(StorageError::NotFound(format!("Outlet {}", outlet.id))),
            };
            let updated = StoredOutlet {
                created_at,
                updated_at: Utc::now(),
                ..outlet.clone()
            };
            let json = serde_json::to_vec(&updated)?;
            table.insert(outlet.id, json.as_slice())?;
            updated
        };
        write_txn.commit()?;
        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> StorageResult<()> {
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(OUTLETS)?;
            if table.remove(id)?.is_none() {
                return Err(StorageError::NotFound(format!("Outlet {id}")));
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}
