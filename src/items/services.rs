use tracing::{info, warn};

use crate::bookings::services as ledger;
use crate::comments::dto::{CommentBody, CommentDto};
use crate::comments::repo_types::NewComment;
use crate::comments::services as comment_log;
use crate::error::{AppError, AppResult};
use crate::items::dto::{CreateItemBody, ItemDto, PatchItemBody};
use crate::items::repo_types::{Item, NewItem};
use crate::policy::{self, Guarded};
use crate::state::AppState;
use crate::users::services::{ensure_exists, get_user};

async fn load_item(st: &AppState, item_id: i64) -> AppResult<Item> {
    st.items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {item_id} not found")))
}

/// Adds comments, and the last/next approved bookings when `with_bookings`.
async fn enrich(st: &AppState, item: Item, with_bookings: bool) -> AppResult<ItemDto> {
    let item_id = item.id;
    let mut dto = ItemDto::from(item);
    if with_bookings {
        let (last, next) = ledger::neighbours(st, item_id).await?;
        dto = dto.with_bookings(last, next);
    }
    Ok(dto.with_comments(comment_log::for_item(st, item_id).await?))
}

pub async fn create_item(st: &AppState, owner_id: i64, body: CreateItemBody) -> AppResult<ItemDto> {
    let draft = body.validate()?;
    ensure_exists(st, owner_id).await?;
    if let Some(request_id) = draft.request_id {
        if st.requests.find_by_id(request_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Request with id {request_id} not found"
            )));
        }
    }

    let item = st
        .items
        .create(NewItem {
            name: draft.name,
            description: draft.description,
            available: draft.available,
            owner_id,
            request_id: draft.request_id,
        })
        .await?;
    info!(item_id = item.id, owner_id, "item created");
    Ok(ItemDto::from(item))
}

pub async fn update_item(
    st: &AppState,
    owner_id: i64,
    item_id: i64,
    body: PatchItemBody,
) -> AppResult<ItemDto> {
    body.validate()?;
    let mut item = load_item(st, item_id).await?;
    if item.owner_id != owner_id {
        warn!(item_id, owner_id, "item update by non-owner");
        return Err(policy::deny(
            Guarded::ItemUpdate,
            format!("Item with id {item_id} not found"),
        ));
    }

    body.apply(&mut item);
    let item = st.items.update(&item).await?;
    info!(item_id, "item updated");
    enrich(st, item, true).await
}

/// Bookings are only shown to the owner.
pub async fn get_item(st: &AppState, requester_id: i64, item_id: i64) -> AppResult<ItemDto> {
    let item = load_item(st, item_id).await?;
    let is_owner = item.owner_id == requester_id;
    enrich(st, item, is_owner).await
}

pub async fn list_owner_items(st: &AppState, owner_id: i64) -> AppResult<Vec<ItemDto>> {
    let items = st.items.list_by_owner(owner_id).await?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(enrich(st, item, true).await?);
    }
    Ok(out)
}

/// Blank text finds nothing.
pub async fn search(st: &AppState, text: &str) -> AppResult<Vec<ItemDto>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let items = st.items.search(text).await?;
    Ok(items.into_iter().map(ItemDto::from).collect())
}

pub async fn add_comment(
    st: &AppState,
    user_id: i64,
    item_id: i64,
    body: CommentBody,
) -> AppResult<CommentDto> {
    let text = body.validate()?;
    let item = load_item(st, item_id).await?;
    let author = get_user(st, user_id).await?;

    if !ledger::has_completed(st, author.id, item.id).await? {
        warn!(item_id, user_id, "comment without a completed booking");
        return Err(AppError::Validation(
            "A comment can only be left after the booking is completed".into(),
        ));
    }

    let comment = st
        .comments
        .create(NewComment {
            text,
            item_id: item.id,
            author_id: author.id,
            created: st.clock.now(),
        })
        .await?;
    info!(comment_id = comment.id, item_id, user_id, "comment added");
    Ok(CommentDto::new(comment, Some(author.name)))
}

/// Items offered in answer to a request.
pub async fn for_request(st: &AppState, request_id: i64) -> AppResult<Vec<ItemDto>> {
    let items = st.items.list_by_request(request_id).await?;
    Ok(items.into_iter().map(ItemDto::from).collect())
}
