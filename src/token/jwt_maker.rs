//! HS256 JSON Web Token maker

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use std::time::Duration;

use super::{Maker, Payload, TokenError};

/// Minimum length of the signing secret, in bytes.
pub const MIN_SECRET_KEY_SIZE: usize = 32;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs tokens with a shared secret using HMAC-SHA256.
#[derive(Clone)]
pub struct JwtMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtMaker {
    /// Create a maker from a symmetric secret.
    ///
    /// # Errors
    /// - `TokenError::InvalidKeySize` if the secret is shorter than
    ///   [`MIN_SECRET_KEY_SIZE`] bytes
    pub fn new(secret_key: &str) -> Result<Self, TokenError> {
        if secret_key.len() < MIN_SECRET_KEY_SIZE {
            return Err(TokenError::InvalidKeySize {
                min: MIN_SECRET_KEY_SIZE,
            });
        }

        // Expiry is checked against the caller's clock in verify_token_at,
        // without leeway.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret_key.as_bytes()),
            validation,
        })
    }
}

impl fmt::Debug for JwtMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtMaker")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl Maker for JwtMaker {
    fn create_token_at(
        &self,
        username: &str,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::issued_at(username, duration, now)?;
        let token = jsonwebtoken::encode(&Header::new(ALGORITHM), &payload, &self.encoding_key)
            .map_err(TokenError::Creation)?;

        Ok((token, payload))
    }

    fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Payload, TokenError> {
        // Header algorithm must be in `validation.algorithms` (HS256 only).
        let data = jsonwebtoken::decode::<Payload>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                TokenError::Invalid
            })?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
