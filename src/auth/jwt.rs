use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::config::JwtConfig;

/// JWT payload carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user email
    pub iat: i64,    // issued at (unix timestamp)
    pub exp: i64,    // expires at (unix timestamp)
    pub iss: String, // issuer
}

/// The only outcome a failed verification reports.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid token")]
pub struct InvalidToken;

/// Signing and verification keys, built once from [`JwtConfig`].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    access_ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            issuer: cfg.issuer.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn sign_access(&self, subject: &str) -> anyhow::Result<String> {
        self.sign_with_ttl(subject, self.access_ttl)
    }

    pub fn sign_with_ttl(&self, subject: &str, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Checks signature, algorithm, expiry and issuer. The reason for a
    /// rejection is only ever logged.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                debug!(reason = ?e.kind(), "jwt rejected");
                Err(InvalidToken)
            }
        }
    }
}
