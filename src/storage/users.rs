// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User records.
//!
//! Users are keyed by username; a secondary `users_by_email` table keeps
//! emails unique. Uniqueness is checked and written inside one write
//! transaction, so concurrent registrations cannot both succeed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::database::{AppDatabase, USERS, USERS_BY_EMAIL};
use super::{StorageError, StorageResult};
use crate::auth::{Identity, IdentityRepository};

/// Account status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// User stored in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    /// bcrypt hash; `None` for directory-only accounts
    pub password_hash: Option<String>,
    pub group: u32,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn to_identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            email: self.email.clone(),
            group: self.group,
            is_active: self.is_active(),
            password_hash: self.password_hash.clone(),
        }
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for user records.
#[derive(Clone)]
pub struct UserStore {
    db: Arc<AppDatabase>,
}

impl UserStore {
    pub fn new(db: Arc<AppDatabase>) -> Self {
        Self { db }
    }

    /// Insert a new user. Fails with `AlreadyExists` if the username or
    /// email is taken.
    ///
    /// Usernames and emails share one login namespace, so a username equal
    /// to any stored email (and an email equal to any stored username) is
    /// taken as well.
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        let json = serde_json::to_vec(user)?;
        let email = email_key(&user.email);

        let write_txn = self.db.inner().begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
            if users.get(user.username.as_str())?.is_some()
                || by_email.get(email_key(&user.username).as_str())?.is_some()
            {
                return Err(StorageError::AlreadyExists(format!("User {}", user.username)));
            }
            if by_email.get(email.as_str())?.is_some() || users.get(email.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Email {}", user.email)));
            }

            users.insert(user.username.as_str(), json.as_slice())?;
            by_email.insert(email.as_str(), user.username.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a user by username.
    pub fn get(&self, username: &str) -> StorageResult<Option<StoredUser>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(username)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email (case-insensitive).
    pub fn get_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let username = {
            let read_txn = self.db.inner().begin_read()?;
            let table = read_txn.open_table(USERS_BY_EMAIL)?;
            match table.get(email_key(email).as_str())? {
                Some(value) => value.value().to_string(),
                None => return Ok(None),
            }
        };
        self.get(&username)
    }

    /// All users, ordered by username.
    pub fn list(&self) -> StorageResult<Vec<StoredUser>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(USERS)?;

        let mut users = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            users.push(serde_json::from_slice(value.value())?);
        }
        Ok(users)
    }

    pub fn list_by_group(&self, group: u32) -> StorageResult<Vec<StoredUser>> {
        Ok(self.list()?.into_iter().filter(|u| u.group == group).collect())
    }

    /// Replace an existing user, keeping the email index in step.
    pub fn update(&self, user: &StoredUser) -> StorageResult<()> {
        let json = serde_json::to_vec(user)?;
        let new_email = email_key(&user.email);

        let write_txn = self.db.inner().begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let previous: StoredUser = match users.get(user.username.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(StorageError::NotFound(format!("User {}", user.username))),
            };

            let old_email = email_key(&previous.email);
            if old_email != new_email {
                let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
                let shadows_username = new_email != user.username
                    && users.get(new_email.as_str())?.is_some();
                if by_email.get(new_email.as_str())?.is_some() || shadows_username {
                    return Err(StorageError::AlreadyExists(format!("Email {}", user.email)));
                }
                by_email.remove(old_email.as_str())?;
                by_email.insert(new_email.as_str(), user.username.as_str())?;
            }

            users.insert(user.username.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Delete a user and its email index entry.
    pub fn delete(&self, username: &str) -> StorageResult<StoredUser> {
        let write_txn = self.db.inner().begin_write()?;
        let removed: StoredUser = {
            let mut users = write_txn.open_table(USERS)?;
            let removed: StoredUser = match users.remove(username)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(StorageError::NotFound(format!("User {username}"))),
            };
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
            by_email.remove(email_key(&removed.email).as_str())?;
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Creation timestamps of every user, for the registration report.
    pub fn created_at_all(&self) -> StorageResult<Vec<DateTime<Utc>>> {
        Ok(self.list()?.into_iter().map(|u| u.created_at).collect())
    }
}

impl IdentityRepository for UserStore {
    fn find_identity(&self, identifier: &str) -> StorageResult<Option<Identity>> {
        if let Some(user) = self.get(identifier)? {
            return Ok(Some(user.to_identity()));
        }
        Ok(self.get_by_email(identifier)?.map(|u| u.to_identity()))
    }
}
