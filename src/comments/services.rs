use tracing::warn;

use crate::comments::dto::CommentDto;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::users::services::get_user;

/// Display name of a comment's author.
pub async fn author_name(st: &AppState, comment_id: i64) -> AppResult<String> {
    let comment = st
        .comments
        .find_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment with id {comment_id} not found")))?;
    Ok(get_user(st, comment.author_id).await?.name)
}

/// Comments on an item with author names resolved.
pub async fn for_item(st: &AppState, item_id: i64) -> AppResult<Vec<CommentDto>> {
    let comments = st.comments.list_by_item(item_id).await?;
    let mut out = Vec::with_capacity(comments.len());
    for comment in comments {
        let name = match author_name(st, comment.id).await {
            Ok(name) => Some(name),
            Err(AppError::NotFound(reason)) => {
                warn!(comment_id = comment.id, %reason, "comment author unresolved");
                None
            }
            Err(e) => return Err(e),
        };
        out.push(CommentDto::new(comment, name));
    }
    Ok(out)
}
