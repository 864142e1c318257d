// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage in a single embedded redb file under `DATA_DIR`.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   outlet-admin.redb
//!     users            username → user JSON
//!     users_by_email   email → username
//!     sessions         user_id → session JSON
//!     outlets          id → outlet JSON
//!     activity         time-ordered key → event JSON
//!     sequences        name → last id
//! ```
//!
//! Each store is a cheap clone over a shared [`AppDatabase`]. The auth core
//! sees users and sessions only through the
//! [`IdentityRepository`](crate::auth::IdentityRepository) and
//! [`SessionRepository`](crate::auth::SessionRepository) traits; the
//! [`memory`] fakes implement the same traits for tests.

pub mod activity;
pub mod database;
pub mod error;
pub mod memory;
pub mod outlets;
pub mod sessions;
pub mod users;

pub use activity::{ActivityEvent, ActivityStore};
pub use database::AppDatabase;
pub use error::{StorageError, StorageResult};
pub use memory::{MemoryIdentities, MemorySessions};
pub use outlets::{NewOutlet, OutletStats, OutletStatus, OutletStore, StoredOutlet};
pub use sessions::SessionStore;
pub use users::{StoredUser, UserStatus, UserStore};
