use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::{claims::Claims, repo_types::User};
use crate::{config::JwtConfig, error::ConfigError, error::TokenError};

/// Tolerated clock drift between the issuing and the verifying process.
pub const CLOCK_SKEW_SECS: u64 = 60;

/// Signs and verifies session tokens.
///
/// Tokens are stateless: there is no server-side session or revocation list,
/// so logging out means the client discards its token and a leaked token stays
/// valid until `exp`. The short default lifetime bounds that window.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    /// Builds the keys once at startup. Fails if the config would produce
    /// brute-forceable tokens.
    pub fn from_config(cfg: &JwtConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let ttl_secs = u64::try_from(cfg.ttl_minutes)
            .ok()
            .and_then(|m| m.checked_mul(60))
            .ok_or_else(|| ConfigError::Invalid {
                key: "JWT_TTL_MINUTES",
                reason: "lifetime out of range".into(),
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(std::slice::from_ref(&cfg.audience));
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = CLOCK_SKEW_SECS;

        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(ttl_secs),
        })
    }

    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        self.sign_at(user, OffsetDateTime::now_utc())
    }

    pub(crate) fn sign_at(&self, user: &User, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(TimeDuration::seconds(secs)))
            .ok_or_else(|| anyhow::anyhow!("token expiry out of range"))?;
        let claims = Claims {
            sub: user.id,
            name: user.email.clone(),
            email: user.email.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    /// Checks signature, issuer, audience and expiry. Every failure other
    /// than expiry is reported as `Invalid`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    pub fn subject(&self, token: &str) -> Result<(Uuid, String), TokenError> {
        let claims = self.verify(token)?;
        Ok((claims.sub, claims.email))
    }
}
