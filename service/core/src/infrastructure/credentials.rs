// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Credentials
//!
//! Password hashing and access-token issuance for operator accounts.
//!
//! Password hashes are PBKDF2-HMAC-SHA256 (`pbkdf2` crate) with a random
//! 16-byte salt, stored as `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`.
//! Access tokens are HS256 JWTs carrying `sub` (username), `iat` and `exp`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const HASH_SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Token encoding failed: {0}")]
    Encoding(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PBKDF2_ITERATIONS)
    }
}

impl PasswordHasher {
    /// `iterations` applies to new hashes; verification reads the count from the hash
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let key = pbkdf2_sha256(password.as_bytes(), &salt, self.iterations);
        format!(
            "{}${}${}${}",
            HASH_SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(key)
        )
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Malformed hashes never verify.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let Some((iterations, salt, expected)) = parse_encoded(encoded) else {
            tracing::warn!("Stored password hash has an unrecognized format");
            return false;
        };

        let derived = pbkdf2_sha256(password.as_bytes(), &salt, iterations);
        derived.as_slice().ct_eq(expected.as_slice()).into()
    }
}

fn parse_encoded(encoded: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = encoded.split('$');
    if parts.next()? != HASH_SCHEME {
        return None;
    }
    let iterations: u32 = parts.next()?.parse().ok()?;
    let salt = hex::decode(parts.next()?).ok()?;
    let hash = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() || iterations == 0 || hash.len() != KEY_LEN {
        return None;
    }
    Some((iterations, salt, hash))
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    key
}

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes: i64::try_from(ttl_minutes).unwrap_or(i64::MAX / 60),
        }
    }

    pub fn issue(&self, subject: &str) -> Result<String, CredentialError> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_minutes.saturating_mul(60)),
        };
        self.encode(&claims)
    }

    fn encode(&self, claims: &AccessClaims) -> Result<String, CredentialError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CredentialError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<AccessClaims, CredentialError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| CredentialError::InvalidToken(e.to_string()))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbkdf2_matches_rfc7914_vector() {
        // RFC 7914 section 11, PBKDF2-HMAC-SHA256 with c = 1 (first 32 bytes)
        let key = pbkdf2_sha256(b"passwd", b"salt", 1);
        assert_eq!(
            hex::encode(key),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn test_pbkdf2_many_iterations() {
        let key = pbkdf2_sha256(b"password", b"salt", 4096);
        assert_eq!(
            hex::encode(key),
            "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"
        );
    }

    #[test]
    fn test_verify_reads_iterations_from_hash() {
        let stored = PasswordHasher::new(50).hash("admin");
        assert!(PasswordHasher::new(2_000).verify("admin", &stored));
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(1_000);
        let hash = hasher.hash("admin");
        assert!(hash.starts_with("pbkdf2-sha256$1000$"));
        assert!(hasher.verify("admin", &hash));
        assert!(!hasher.verify("Admin", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new(10);
        assert_ne!(hasher.hash("same"), hasher.hash("same"));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let hasher = PasswordHasher::new(10);
        assert!(!hasher.verify("admin", "admin"));
        assert!(!hasher.verify("admin", "bcrypt$10$abcd$ef01"));
        assert!(!hasher.verify("admin", "pbkdf2-sha256$0$00$00"));
    }

    #[test]
    fn test_token_roundtrip() {
        let issuer = TokenIssuer::new("test-secret", 60);
        let token = issuer.issue("admin").unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let token = TokenIssuer::new("one", 60).issue("admin").unwrap();
        assert!(TokenIssuer::new("two", 60).verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new("test-secret", 60);
        let now = Utc::now().timestamp();
        let token = issuer
            .encode(&AccessClaims {
                sub: "admin".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(matches!(
            issuer.verify(&token),
            Err(CredentialError::InvalidToken(_))
        ));
    }
}
