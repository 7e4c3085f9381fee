use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, CredentialsRequest, PublicUser},
        extractors::AuthUser,
        repo_types::User,
        services::{register as register_user, verify_credentials},
    },
    error::AppError,
    extract::ApiJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

fn issue(state: &AppState, user: User) -> Result<Json<AuthResponse>, AppError> {
    let token = state.jwt.sign(&user).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AppError::Internal(e)
    })?;
    Ok(Json(AuthResponse {
        token,
        email: user.email,
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = register_user(state.users.as_ref(), &payload.email, &payload.password).await?;
    issue(&state, user)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = verify_credentials(state.users.as_ref(), &payload.email, &payload.password).await?;
    issue(&state, user)
}

/// Tokens are not tracked server-side; logging out is the client dropping
/// its token. Kept so clients have a uniform endpoint to call.
#[instrument]
pub async fn logout() -> StatusCode {
    info!("logout requested");
    StatusCode::OK
}

#[instrument(skip(state, user), fields(user_id = %user.id, email = %user.email))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let Some(found) = state.users.find_by_id(user.id).await? else {
        warn!(user_id = %user.id, "token subject no longer exists");
        return Err(AppError::Unauthenticated);
    };

    Ok(Json(PublicUser {
        id: found.id,
        email: found.email,
    }))
}
