// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access and refresh token issuance.
//!
//! - Access tokens are HS256 JWTs carrying [`AccessClaims`].
//! - Refresh tokens are 32 random bytes, base64-encoded, sealed with
//!   AES-256-GCM under a fresh nonce; the token is
//!   `base64(nonce || ciphertext || tag)`. They carry no identity: the
//!   session row is the only binding to a user.

use base64ct::{Base64, Encoding};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

use super::{AccessClaims, AuthError};

/// Random bytes behind every refresh token.
pub const REFRESH_SECRET_LEN: usize = 32;

/// A freshly signed access token and its claims.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub claims: AccessClaims,
}

/// Mints access and refresh tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    cipher: LessSafeKey,
    rng: SystemRandom,
    issuer: String,
    access_ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer from the process-wide keys.
    ///
    /// Fails with [`AuthError::IssuanceFailed`] when a key is unusable; the
    /// caller treats that as fatal at startup.
    pub fn new(
        signing_key: &[u8],
        encryption_key: &[u8],
        issuer: impl Into<String>,
        access_ttl: Duration,
    ) -> Result<Self, AuthError> {
        if signing_key.is_empty() {
            return Err(AuthError::IssuanceFailed("signing key is empty".to_string()));
        }
        let unbound = UnboundKey::new(&AES_256_GCM, encryption_key).map_err(|_| {
            AuthError::IssuanceFailed("refresh token key must be 32 bytes".to_string())
        })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            cipher: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
            issuer: issuer.into(),
            access_ttl,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign a new access token for `subject`.
    pub fn issue_access_token(&self, subject: &str) -> Result<SignedToken, AuthError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            iss: self.issuer.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::IssuanceFailed(format!("signing failed: {e}")))?;

        Ok(SignedToken { token, claims })
    }

    /// Generate a new opaque refresh token.
    pub fn issue_refresh_token(&self) -> Result<String, AuthError> {
        let mut secret = [0u8; REFRESH_SECRET_LEN];
        self.rng
            .fill(&mut secret)
            .map_err(|_| AuthError::IssuanceFailed("random source failed".to_string()))?;
        let plaintext = Base64::encode_string(&secret);

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| AuthError::IssuanceFailed("random source failed".to_string()))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut sealed = plaintext.into_bytes();
        self.cipher
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut sealed)
            .map_err(|_| AuthError::IssuanceFailed("refresh token encryption failed".to_string()))?;

        let mut token = Vec::with_capacity(NONCE_LEN + sealed.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&sealed);
        Ok(Base64::encode_string(&token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decrypt a refresh token and return its inner secret.
    fn open_refresh_token(issuer: &TokenIssuer, token: &str) -> Option<String> {
        let raw = Base64::decode_vec(token).ok()?;
        if raw.len() <= NONCE_LEN {
            return None;
        }
        let (nonce_bytes, sealed) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).ok()?;
        let mut in_out = sealed.to_vec();
        let plaintext = issuer.cipher.open_in_place(nonce, Aad::empty(), &mut in_out).ok()?;
        String::from_utf8(plaintext.to_vec()).ok()
    }

    const SIGNING_KEY: &[u8] = b"test-signing-key-0123456789abcdef";
    const ENCRYPTION_KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SIGNING_KEY, ENCRYPTION_KEY, "test", Duration::minutes(15)).unwrap()
    }

    #[test]
    fn access_token_carries_subject_and_expiry() {
        let signed = issuer().issue_access_token("alice").unwrap();

        assert_eq!(signed.claims.sub, "alice");
        assert_eq!(signed.claims.iss, "test");
        assert_eq!(signed.claims.exp - signed.claims.iat, 15 * 60);
        assert_eq!(signed.token.split('.').count(), 3);
    }

    #[test]
    fn consecutive_access_tokens_differ() {
        let issuer = issuer();
        let first = issuer.issue_access_token("alice").unwrap();
        let second = issuer.issue_access_token("alice").unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn refresh_tokens_are_unique_and_open_to_a_32_byte_secret() {
        let issuer = issuer();
        let first = issuer.issue_refresh_token().unwrap();
        let second = issuer.issue_refresh_token().unwrap();
        assert_ne!(first, second);

        let secret = open_refresh_token(&issuer, &first).unwrap();
        assert_eq!(Base64::decode_vec(&secret).unwrap().len(), REFRESH_SECRET_LEN);
    }

    #[test]
    fn refresh_token_does_not_open_under_another_key() {
        let token = issuer().issue_refresh_token().unwrap();
        let other = TokenIssuer::new(
            SIGNING_KEY,
            b"ffffffffffffffffffffffffffffffff",
            "test",
            Duration::minutes(15),
        )
        .unwrap();

        assert!(open_refresh_token(&other, &token).is_none());
        assert!(open_refresh_token(&other, "garbage").is_none());
    }

    #[test]
    fn unusable_keys_fail_construction() {
        assert!(matches!(
            TokenIssuer::new(b"", ENCRYPTION_KEY, "test", Duration::minutes(15)),
            Err(AuthError::IssuanceFailed(_))
        ));
        assert!(matches!(
            TokenIssuer::new(SIGNING_KEY, b"short", "test", Duration::minutes(15)),
            Err(AuthError::IssuanceFailed(_))
        ));
    }
}
