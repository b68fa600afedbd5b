//! Bearer credential verification.
//!
//! The HTTP layer only needs to turn a bearer token into a user id; how the
//! token was issued is not its concern. [`JwtVerifier`] is the production
//! implementation (HS256, `exp` enforced).

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The contents of a bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the user the token was issued for.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token creation error")]
    TokenCreation,
}

/// Turns a bearer token into the id of the user it was issued for.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// HS256 JSON Web Tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Signs a token for `user_id` valid for `ttl`.
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenCreation)
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<String, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.user_id)
            .map_err(|_| AuthError::InvalidToken)
    }
}
