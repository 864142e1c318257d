// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outlet Admin - user and outlet administration service
//!
//! REST backend with session-backed JWT authentication, user and outlet
//! administration, request activity logging and a registration report.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credential verification, token issuance and session validation
//! - `storage` - Embedded redb database
//! - `analytics` - Monthly registration report

pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
