use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims encoded within an issued token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: i32,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Default token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Issues and verifies signed, time-bounded identity tokens.
///
/// The signing key is loaded once at startup and shared read-only across
/// requests; rotating it invalidates every outstanding token. There is no
/// revocation list: a token stays valid until its expiry, full stop.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Produces a signed token for the given user, expiring `ttl_secs` from
    /// now.
    pub fn issue(&self, subject_id: i32) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: subject_id,
            iat: now,
            exp: now + self.ttl_secs,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verifies signature and expiry, returning the claims.
    ///
    /// No clock-skew leeway is granted: a token is accepted up to and
    /// including the instant `iat + ttl` and rejected from the first instant
    /// after. Any failure (bad signature, malformed structure, expiry) is
    /// reported as `TokenExpiredOrInvalid`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
