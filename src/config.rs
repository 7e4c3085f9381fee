use serde::Deserialize;

use crate::error::ConfigError;

/// Minimum HMAC-SHA256 key length in bytes (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime: one week.
pub const MAX_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.secret.as_bytes().len();
        if len < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakSecret {
                actual: len,
                required: MIN_SECRET_BYTES,
            });
        }
        if !(1..=MAX_TTL_MINUTES).contains(&self.ttl_minutes) {
            return Err(ConfigError::Invalid {
                key: "JWT_TTL_MINUTES",
                reason: format!("must be between 1 and {MAX_TTL_MINUTES} minutes"),
            });
        }
        if self.issuer.trim().is_empty() || self.audience.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "JWT_ISSUER/JWT_AUDIENCE",
                reason: "must not be blank".into(),
            });
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds and validates the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let database_url = required("DATABASE_URL")?;
        let ttl_minutes = match lookup("JWT_TTL_MINUTES") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                key: "JWT_TTL_MINUTES",
                reason: e.to_string(),
            })?,
            None => 60,
        };
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "habitoria".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "habitoria-users".into()),
            ttl_minutes,
        };
        jwt.validate()?;

        Ok(Self { database_url, jwt })
    }
}
