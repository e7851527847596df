use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::comments::repo_types::Comment;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentBody {
    pub text: Option<String>,
}

impl CommentBody {
    pub fn validate(&self) -> AppResult<String> {
        match self.text.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => Ok(t.to_string()),
            _ => Err(AppError::Validation("Comment text must not be blank".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub text: String,
    /// `None` when the author has since been deleted.
    pub author_name: Option<String>,
    #[serde(with = "crate::datetime")]
    pub created: PrimitiveDateTime,
}

impl CommentDto {
    pub fn new(comment: Comment, author_name: Option<String>) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author_name,
            created: comment.created,
        }
    }
}
