use tracing::info;

use crate::error::{AppError, AppResult};
use crate::items::services::for_request;
use crate::requests::dto::{CreateRequestBody, Pagination, RequestDto, RequestWithItems};
use crate::requests::repo_types::{ItemRequest, NewItemRequest};
use crate::state::AppState;
use crate::users::services::ensure_exists;

async fn with_items(st: &AppState, request: ItemRequest) -> AppResult<RequestWithItems> {
    let items = for_request(st, request.id).await?;
    Ok(RequestWithItems {
        request: request.into(),
        items,
    })
}

async fn with_items_all(
    st: &AppState,
    requests: Vec<ItemRequest>,
) -> AppResult<Vec<RequestWithItems>> {
    let mut out = Vec::with_capacity(requests.len());
    for request in requests {
        out.push(with_items(st, request).await?);
    }
    Ok(out)
}

pub async fn create_request(
    st: &AppState,
    user_id: i64,
    body: CreateRequestBody,
) -> AppResult<RequestDto> {
    let description = body.validate()?;
    ensure_exists(st, user_id).await?;

    let request = st
        .requests
        .create(NewItemRequest {
            description,
            requester_id: user_id,
            created: st.clock.now(),
        })
        .await?;
    info!(request_id = request.id, user_id, "request created");
    Ok(request.into())
}

pub async fn own_requests(st: &AppState, user_id: i64) -> AppResult<Vec<RequestWithItems>> {
    ensure_exists(st, user_id).await?;
    let requests = st.requests.list_by_requester(user_id).await?;
    with_items_all(st, requests).await
}

/// Discovery feed: everyone else's requests.
pub async fn all_requests(
    st: &AppState,
    user_id: i64,
    page: Pagination,
) -> AppResult<Vec<RequestWithItems>> {
    page.validate()?;
    ensure_exists(st, user_id).await?;
    let requests = st
        .requests
        .list_by_others(user_id, page.from, page.size)
        .await?;
    with_items_all(st, requests).await
}

pub async fn get_request(
    st: &AppState,
    user_id: i64,
    request_id: i64,
) -> AppResult<RequestWithItems> {
    ensure_exists(st, user_id).await?;
    let request = st
        .requests
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {request_id} not found")))?;
    with_items(st, request).await
}
