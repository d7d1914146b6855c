//! Bearer access tokens.
//!
//! Tokens are HS256 JWTs carrying [`Claims`]. They are stateless: the
//! server keeps no session table, so logging out is the client's job.

use backoffice_core::types::DbId;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TokenResult<T> = Result<T, jsonwebtoken::errors::Error>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Account id.
    pub sub: DbId,
    /// Account e-mail at the time of login.
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// A signed token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// `JWT_SECRET` (required, non-empty) and `JWT_ACCESS_EXPIRY_MINS`
    /// (default `60`).
    ///
    /// # Panics
    ///
    /// On a missing or empty secret, or an expiry that is not a positive
    /// integer. Startup should fail loudly on either.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set and non-empty");

        let access_token_expiry_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|mins| *mins > 0)
                .unwrap_or_else(|| {
                    panic!("JWT_ACCESS_EXPIRY_MINS must be a positive integer, got '{raw}'")
                }),
            Err(_) => DEFAULT_ACCESS_EXPIRY_MINS,
        };

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    /// Sign a fresh token for an account.
    pub fn issue(&self, account_id: DbId, email: &str) -> TokenResult<AccessToken> {
        let iat = Utc::now().timestamp();
        let expires_in = self.expires_in_secs();
        let claims = Claims {
            sub: account_id,
            email: email.to_string(),
            exp: iat + expires_in,
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(AccessToken { token, expires_in })
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> TokenResult<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }
}
