// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Local session-backed authentication for the admin API.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to `/v1/auth/login`
//! 2. [`CredentialVerifier`](credentials::CredentialVerifier) confirms them
//!    against the directory (if configured) or the stored bcrypt hash
//! 3. [`TokenIssuer`](tokens::TokenIssuer) mints:
//!    - a short-lived HS256 access token
//!    - an opaque AES-256-GCM refresh token
//! 4. The user's single session row is overwritten with both tokens
//! 5. Every protected request sends `Authorization: Bearer <access token>`,
//!    checked by [`TokenValidator`](validator::TokenValidator)
//!
//! ## Security
//!
//! - All non-health, non-auth endpoints require authentication
//! - A token is valid only while it is the session's current token: a new
//!   login or refresh supersedes it, logout removes it
//! - Zero clock skew tolerance
//! - Refresh tokens carry no identity; the session row binds them to a user

pub mod claims;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod refresh;
pub mod service;
pub mod session;
pub mod tokens;
pub mod validator;

pub use claims::{AccessClaims, AuthenticatedUser};
pub use directory::{DirectoryAuthenticator, DirectoryError, LdapDirectory};
pub use error::AuthError;
pub use extractor::Auth;
pub use identity::{Identity, IdentityRepository};
pub use service::{AuthService, ClientInfo, LoginOutcome, RefreshOutcome};
pub use session::{Session, SessionFilter, SessionRepository, SessionUpdate};
