// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims embedded in a signed access token.
///
/// Never persisted on their own: they are reconstructed by verifying the
/// token signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (username)
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Unique token id
    pub jti: String,
}

/// Authenticated user information extracted from a current access token.
///
/// This is the primary type used throughout the application to represent
/// the user making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID (username, the `sub` claim)
    pub user_id: String,

    /// Token id of the access token that authenticated the request
    pub token_id: String,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    pub fn from_claims(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            token_id: claims.jti,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_claims_extracts_subject_and_expiry() {
        let claims = AccessClaims {
            sub: "alice".to_string(),
            iat: 1700000000,
            exp: 1700000900,
            iss: "outlet-admin".to_string(),
            jti: "jti-1".to_string(),
        };

        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.token_id, "jti-1");
        assert_eq!(user.expires_at, 1700000900);
    }
}
