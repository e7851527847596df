use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::SharerId,
    comments::dto::{CommentBody, CommentDto},
    error::AppResult,
    extract::{ValidJson, ValidPath, ValidQuery},
    items::{
        dto::{CreateItemBody, ItemDto, PatchItemBody, SearchQuery},
        services,
    },
    state::AppState,
};

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/search", get(search))
        .route("/items/:id", get(get_item).patch(update_item))
        .route("/items/:id/comment", post(add_comment))
}

#[instrument(skip(state, body))]
pub async fn create_item(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidJson(body): ValidJson<CreateItemBody>,
) -> AppResult<(StatusCode, Json<ItemDto>)> {
    let item = services::create_item(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidPath(id): ValidPath<i64>,
    ValidJson(body): ValidJson<PatchItemBody>,
) -> AppResult<Json<ItemDto>> {
    Ok(Json(services::update_item(&state, user_id, id, body).await?))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<ItemDto>> {
    Ok(Json(services::get_item(&state, user_id, id).await?))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
) -> AppResult<Json<Vec<ItemDto>>> {
    Ok(Json(services::list_owner_items(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ValidQuery(q): ValidQuery<SearchQuery>,
) -> AppResult<Json<Vec<ItemDto>>> {
    let text = q.text.unwrap_or_default();
    Ok(Json(services::search(&state, &text).await?))
}

#[instrument(skip(state, body))]
pub async fn add_comment(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidPath(id): ValidPath<i64>,
    ValidJson(body): ValidJson<CommentBody>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let comment = services::add_comment(&state, user_id, id, body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
