// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Activity log for API requests.
//!
//! Every `/v1` request is recorded after its handler runs. Request bodies
//! are never stored since they may carry passwords and tokens.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::database::{AppDatabase, ACTIVITY};
use super::StorageResult;

/// One recorded request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ActivityEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the request completed.
    pub timestamp: DateTime<Utc>,
    /// Authenticated user, if any.
    pub user_id: Option<String>,
    pub method: String,
    /// Request path.
    pub endpoint: String,
    /// Raw query string.
    pub query: Option<String>,
    /// Response status code.
    pub status: u16,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ActivityEvent {
    /// Create a new activity event.
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>, status: u16) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user_id: None,
            method: method.into(),
            endpoint: endpoint.into(),
            query: None,
            status,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// `timestamp_micros_be | event_id`; sorts chronologically.
    fn key(&self) -> Vec<u8> {
        let micros = self.timestamp.timestamp_micros() as u64;
        let mut key = Vec::with_capacity(8 + self.event_id.len());
        key.extend_from_slice(&micros.to_be_bytes());
        key.extend_from_slice(self.event_id.as_bytes());
        key
    }
}

#[derive(Clone)]
pub struct ActivityStore {
    db: Arc<AppDatabase>,
}

impl ActivityStore {
    pub fn new(db: Arc<AppDatabase>) -> Self {
        Self { db }
    }

    pub fn record(&self, event: &ActivityEvent) -> StorageResult<()> {
        let json = serde_json::to_vec(event)?;
        let key = event.key();

        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(ACTIVITY)?;
            table.insert(key.as_slice(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Most recent events first, optionally for one user.
    pub fn recent(&self, limit: usize, user_id: Option<&str>) -> StorageResult<Vec<ActivityEvent>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(ACTIVITY)?;

        let mut events = Vec::new();
        for entry in table.iter()?.rev() {
            if events.len() >= limit {
                break;
            }
            let (_, value) = entry?;
            let event: ActivityEvent = serde_json::from_slice(value.value())?;
            if user_id.is_none_or(|u| event.user_id.as_deref() == Some(u)) {
                events.push(event);
            }
        }
        Ok(events)
    }
}
