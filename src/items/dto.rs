use serde::{Deserialize, Serialize};

use crate::bookings::repo_types::Booking;
use crate::comments::dto::CommentDto;
use crate::error::{AppError, AppResult};
use crate::items::repo_types::Item;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

/// Partial update: absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchItemBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub text: Option<String>,
}

fn non_blank(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

impl CreateItemBody {
    pub fn validate(&self) -> AppResult<ItemDraft> {
        let name = non_blank(self.name.as_deref().unwrap_or_default(), "name")?;
        let description =
            non_blank(self.description.as_deref().unwrap_or_default(), "description")?;
        let available = self
            .available
            .ok_or_else(|| AppError::Validation("available must be set".into()))?;
        if let Some(id) = self.request_id.filter(|id| *id <= 0) {
            return Err(AppError::Validation(format!(
                "requestId must be positive, got {id}"
            )));
        }
        Ok(ItemDraft {
            name,
            description,
            available,
            request_id: self.request_id,
        })
    }
}

impl PatchItemBody {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            non_blank(name, "name")?;
        }
        if let Some(description) = &self.description {
            non_blank(description, "description")?;
        }
        Ok(())
    }

    pub fn apply(self, item: &mut Item) {
        if let Some(name) = self.name {
            item.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            item.description = description.trim().to_string();
        }
        if let Some(available) = self.available {
            item.available = available;
        }
    }
}

/// Item as served to clients. Bookings are only filled in for the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub last_booking: Option<Booking>,
    pub next_booking: Option<Booking>,
    pub comments: Vec<CommentDto>,
    pub request_id: Option<i64>,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            last_booking: None,
            next_booking: None,
            comments: Vec::new(),
            request_id: item.request_id,
        }
    }
}

impl ItemDto {
    pub fn with_bookings(mut self, last: Option<Booking>, next: Option<Booking>) -> Self {
        self.last_booking = last;
        self.next_booking = next;
        self
    }

    pub fn with_comments(mut self, comments: Vec<CommentDto>) -> Self {
        self.comments = comments;
        self
    }
}
