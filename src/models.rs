// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! Request types carry a `validate` method; handlers turn its message into
//! a 400 response before touching storage.
//!
//! ## Model Categories
//!
//! - **Auth**: registration, login, refresh
//! - **Users**: administrator-managed user records
//! - **Outlets**: outlet records and search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::storage::{
    ActivityEvent, NewOutlet, OutletStatus, StoredOutlet, StoredUser, UserStatus,
};

/// Group assigned when none is given.
pub const DEFAULT_GROUP: u32 = 1;

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

fn check_username(username: &str) -> Result<(), String> {
    if char_len(username) < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if username.contains('@') {
        return Err("Username must not contain '@'".to_string());
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), String> {
    if !email.contains('@') {
        return Err("Email address is invalid".to_string());
    }
    Ok(())
}

fn check_phone(phone: &str) -> Result<(), String> {
    if char_len(phone) < 10 {
        return Err("Phone number must be at least 10 characters".to_string());
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    Ok(())
}

// =============================================================================
// Auth Models
// =============================================================================

/// Self-service registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    /// Must be `true`.
    #[serde(default)]
    pub agree_terms: bool,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_username(&self.username)?;
        check_email(&self.email)?;
        check_phone(&self.phone)?;
        check_password(&self.password)?;
        if self.password != self.confirm_password {
            return Err("Passwords do not match".to_string());
        }
        if !self.agree_terms {
            return Err("Terms must be accepted".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email.
    pub identifier: String,
    pub password: String,
    /// Let the refresh window slide instead of expiring.
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always "Bearer".
    pub token_type: String,
    /// Access token expiry (Unix timestamp).
    pub expires_at: i64,
    pub refresh_expires_at: DateTime<Utc>,
    pub user_id: String,
    pub group: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub user_id: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: i64,
    pub refresh_expires_at: DateTime<Utc>,
}

// =============================================================================
// User Models
// =============================================================================

/// A user as returned by the API. The password hash is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub group: u32,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            username: user.username,
            email: user.email,
            phone: user.phone,
            group: user.group,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    /// Defaults to 1.
    pub group: Option<u32>,
    /// Defaults to active.
    pub status: Option<UserStatus>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_username(&self.username)?;
        check_email(&self.email)?;
        check_phone(&self.phone)?;
        check_password(&self.password)
    }
}

/// Partial user update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub group: Option<u32>,
    pub status: Option<UserStatus>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(phone) = &self.phone {
            check_phone(phone)?;
        }
        if let Some(password) = &self.password {
            check_password(password)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct GroupQuery {
    /// Restrict to (or, on delete, require) this group.
    pub group: Option<u32>,
}

// =============================================================================
// Outlet Models
// =============================================================================

/// Outlet fields for create and full replace.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutletRequest {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub manager: String,
    /// "active" or "inactive".
    pub status: String,
    pub open_hours: String,
}

impl OutletRequest {
    /// Check every field and return the storage form.
    pub fn validate(self) -> Result<NewOutlet, String> {
        let name_len = char_len(&self.name);
        if !(3..=255).contains(&name_len) {
            return Err("Name must be between 3 and 255 characters".to_string());
        }
        if char_len(&self.address) < 10 {
            return Err("Address must be at least 10 characters".to_string());
        }
        let phone_len = char_len(&self.phone);
        if !(10..=20).contains(&phone_len) {
            return Err("Phone number must be between 10 and 20 characters".to_string());
        }
        let manager_len = char_len(&self.manager);
        if !(3..=255).contains(&manager_len) {
            return Err("Manager must be between 3 and 255 characters".to_string());
        }
        let status = match self.status.trim() {
            "active" => OutletStatus::Active,
            "inactive" => OutletStatus::Inactive,
            _ => return Err("Status must be 'active' or 'inactive'".to_string()),
        };
        if self.open_hours.trim().is_empty() {
            return Err("Open hours are required".to_string());
        }

        Ok(NewOutlet {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            manager: self.manager.trim().to_string(),
            status,
            open_hours: self.open_hours.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct OutletSearchQuery {
    /// Case-insensitive match on name, address or manager.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutletListResponse {
    pub outlets: Vec<StoredOutlet>,
    pub total: usize,
}

// =============================================================================
// Activity Models
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ActivityQuery {
    pub user_id: Option<String>,
    /// Defaults to 100, capped at 1000.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityListResponse {
    pub events: Vec<ActivityEvent>,
}
