use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::SharerId,
    error::AppResult,
    extract::{ValidJson, ValidPath, ValidQuery},
    requests::{
        dto::{CreateRequestBody, Pagination, RequestDto, RequestWithItems},
        services,
    },
    state::AppState,
};

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(own_requests).post(create_request))
        .route("/requests/all", get(all_requests))
        .route("/requests/:id", get(get_request))
}

#[instrument(skip(state, body))]
pub async fn create_request(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidJson(body): ValidJson<CreateRequestBody>,
) -> AppResult<(StatusCode, Json<RequestDto>)> {
    let request = services::create_request(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[instrument(skip(state))]
pub async fn own_requests(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
) -> AppResult<Json<Vec<RequestWithItems>>> {
    Ok(Json(services::own_requests(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn all_requests(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidQuery(page): ValidQuery<Pagination>,
) -> AppResult<Json<Vec<RequestWithItems>>> {
    Ok(Json(services::all_requests(&state, user_id, page).await?))
}

#[instrument(skip(state))]
pub async fn get_request(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<RequestWithItems>> {
    Ok(Json(services::get_request(&state, user_id, id).await?))
}
