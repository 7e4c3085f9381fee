use axum::{
    extract::{Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::{dto::HabitRequest, repo_types::Habit, services};
use crate::{auth::extractors::AuthUser, error::AppError, extract::ApiJson, state::AppState};

// `AuthUser` is the first extractor of every handler, so an unauthenticated
// request is rejected before the path or body is even looked at.

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/habits", get(list_habits))
        .route("/habits/:id", get(get_habit))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/habits", post(create_habit))
        .route("/habits/:id", put(update_habit).delete(delete_habit))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_habits(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Habit>>, AppError> {
    let habits = services::list(state.habits.as_ref(), user.id).await?;
    Ok(Json(habits))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_habit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Habit>, AppError> {
    let habit = services::get(state.habits.as_ref(), user.id, id).await?;
    Ok(Json(habit))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_habit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<HabitRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Habit>), AppError> {
    let habit = services::create(state.habits.as_ref(), user.id, body).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/habits/{}", habit.id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(habit)))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_habit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<HabitRequest>,
) -> Result<StatusCode, AppError> {
    services::update(state.habits.as_ref(), user.id, id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_habit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::delete(state.habits.as_ref(), user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
