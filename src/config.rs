use std::{net::SocketAddr, str::FromStr};

use anyhow::Context;
use jsonwebtoken::Algorithm;

const DEFAULT_DATABASE_URL: &str = "sqlite://complaints.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_TTL_MINUTES: i64 = 30;
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so callers other than
    /// `from_env` never have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("APP_PORT") {
            Some(p) => p
                .parse::<u16>()
                .with_context(|| format!("APP_PORT must be a port number, got {p}"))?,
            None => DEFAULT_PORT,
        };
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(name) => Algorithm::from_str(&name)
                .with_context(|| format!("unknown JWT_ALGORITHM {name}"))?,
            None => Algorithm::HS256,
        };
        anyhow::ensure!(
            matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512),
            "JWT_ALGORITHM must be an HMAC algorithm, got {algorithm:?}"
        );

        let jwt = JwtConfig {
            secret,
            algorithm,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "complaint-book".into()),
            ttl_minutes: lookup("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|m| *m > 0)
                .unwrap_or(DEFAULT_TTL_MINUTES),
        };

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            jwt,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
