// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token validation.
//!
//! A token is accepted only when all four checks pass:
//!
//! 1. HS256 signature and structure
//! 2. embedded expiry (no leeway)
//! 3. a session row exists for the subject
//! 4. the token is the row's current access token and the row is valid
//!
//! Steps 3 and 4 make the session store the source of truth: a correctly
//! signed, unexpired token stops working as soon as a later login or
//! refresh replaces it.

use std::sync::Arc;

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use tracing::debug;

use super::session::{SessionFilter, SessionRepository};
use super::{AccessClaims, AuthError};

pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    sessions: Arc<dyn SessionRepository>,
}

impl TokenValidator {
    pub fn new(signing_key: &[u8], issuer: &str, sessions: Arc<dyn SessionRepository>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
            sessions,
        }
    }

    /// Signature and expiry checks only.
    pub fn decode_claims(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    debug!(error = %e, "Access token rejected");
                    AuthError::TokenMalformed
                }
            })
    }

    /// Full validation against the session store.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let claims = self.decode_claims(token)?;

        let session = self
            .sessions
            .find(&SessionFilter::user(&claims.sub))
            .map_err(|e| AuthError::StoreReadFailed(e.to_string()))?
            .ok_or(AuthError::NoSession)?;

        if !session.is_valid || session.access_token.as_deref() != Some(token) {
            return Err(AuthError::TokenSuperseded);
        }

        Ok(claims)
    }
}
