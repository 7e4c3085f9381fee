use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::auth::{
    password::{hash_password, verify_password},
    repo::UserRepo,
    repo_types::User,
};
use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    // Verified against when the email is unknown so both login failures cost the same.
    static ref DUMMY_HASH: OnceCell<String> = OnceCell::new();
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn require_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.is_empty() {
        return Err(AppError::invalid("Email is required."));
    }
    if password.trim().is_empty() {
        return Err(AppError::invalid("Password is required."));
    }
    Ok(())
}

async fn hash_blocking(password: &str) -> Result<String, AppError> {
    let plain = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("hash task panicked")??;
    Ok(hash)
}

async fn verify_blocking(password: &str, hash: String) -> Result<bool, AppError> {
    let plain = password.to_owned();
    let ok = tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .context("verify task panicked")??;
    Ok(ok)
}

/// Hashed on the blocking pool the first time it is needed; concurrent
/// callers wait on the same initialization.
async fn dummy_hash() -> Result<&'static str, AppError> {
    let hash = DUMMY_HASH
        .get_or_try_init(|| hash_blocking("habitoria-timing-equalizer"))
        .await?;
    Ok(hash.as_str())
}

/// Creates an account. The store's uniqueness check decides races between
/// concurrent registrations of the same normalized email.
pub async fn register(users: &dyn UserRepo, email: &str, password: &str) -> Result<User, AppError> {
    let email = normalize_email(email);
    require_credentials(&email, password)?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::invalid("Invalid email"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::invalid("Password too short"));
    }

    let hash = hash_blocking(password).await?;
    let user = users.insert(&email, &hash).await.map_err(|e| {
        warn!(email = %email, error = %e, "registration rejected by store");
        AppError::from(e)
    })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Checks a login. Unknown email and wrong password produce the same
/// `InvalidCredentials`.
pub async fn verify_credentials(
    users: &dyn UserRepo,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = normalize_email(email);
    require_credentials(&email, password)?;

    let Some(user) = users.find_by_email(&email).await? else {
        if let Ok(dummy) = dummy_hash().await {
            let _ = verify_blocking(password, dummy.to_owned()).await;
        }
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_blocking(password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}
