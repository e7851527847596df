use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppResult,
    extract::{ValidJson, ValidPath},
    state::AppState,
    users::{
        dto::{CreateUserBody, PatchUserBody},
        repo_types::User,
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateUserBody>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = services::create_user(&state, body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(services::list_users(&state).await?))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<User>> {
    Ok(Json(services::get_user(&state, id).await?))
}

#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(body): ValidJson<PatchUserBody>,
) -> AppResult<Json<User>> {
    Ok(Json(services::update_user(&state, id, body).await?))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<StatusCode> {
    services::delete_user(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
