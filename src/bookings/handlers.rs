use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::SharerId,
    bookings::{
        dto::{CreateBookingBody, DecisionQuery, StateQuery},
        repo_types::Booking,
        services,
    },
    error::{AppError, AppResult},
    extract::{ValidJson, ValidPath, ValidQuery},
    state::AppState,
};

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_own).post(create_booking))
        .route("/bookings/owner", get(list_for_owner))
        .route("/bookings/:id", get(get_booking).patch(decide))
}

#[instrument(skip(state, body))]
pub async fn create_booking(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidJson(body): ValidJson<CreateBookingBody>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = services::create_booking(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[instrument(skip(state))]
pub async fn decide(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidPath(id): ValidPath<i64>,
    ValidQuery(q): ValidQuery<DecisionQuery>,
) -> AppResult<Json<Booking>> {
    let approved = q
        .approved
        .ok_or_else(|| AppError::Validation("approved parameter is required".into()))?;
    Ok(Json(services::decide(&state, user_id, id, approved).await?))
}

#[instrument(skip(state))]
pub async fn get_booking(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Booking>> {
    Ok(Json(services::get_for_participant(&state, id, user_id).await?))
}

/// Without `state` this is the plain booker history, which is 404 when empty.
#[instrument(skip(state))]
pub async fn list_own(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidQuery(q): ValidQuery<StateQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = match q.state.as_deref() {
        Some(s) => services::list_by_booker_filtered(&state, user_id, s).await?,
        None => services::list_by_booker(&state, user_id).await?,
    };
    Ok(Json(bookings))
}

#[instrument(skip(state))]
pub async fn list_for_owner(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    ValidQuery(q): ValidQuery<StateQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let s = q.state.as_deref().unwrap_or("ALL");
    Ok(Json(services::list_by_owner_filtered(&state, user_id, s).await?))
}
