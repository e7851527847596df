use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::error::{AppError, AppResult};
use crate::items::dto::ItemDto;
use crate::requests::repo_types::ItemRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRequestBody {
    pub description: Option<String>,
}

impl CreateRequestBody {
    pub fn validate(&self) -> AppResult<String> {
        match self.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => Ok(d.to_string()),
            _ => Err(AppError::Validation(
                "Request description must not be blank".into(),
            )),
        }
    }
}

/// `from` is an element offset, not a page number.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub from: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_size() -> i64 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            from: 0,
            size: default_size(),
        }
    }
}

impl Pagination {
    pub fn validate(&self) -> AppResult<()> {
        if self.from < 0 {
            return Err(AppError::Validation(format!(
                "from must not be negative, got {}",
                self.from
            )));
        }
        if self.size < 1 {
            return Err(AppError::Validation(format!(
                "size must be positive, got {}",
                self.size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDto {
    pub id: i64,
    pub description: String,
    #[serde(with = "crate::datetime")]
    pub created: PrimitiveDateTime,
}

impl From<ItemRequest> for RequestDto {
    fn from(request: ItemRequest) -> Self {
        Self {
            id: request.id,
            description: request.description,
            created: request.created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestWithItems {
    #[serde(flatten)]
    pub request: RequestDto,
    pub items: Vec<ItemDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn pagination_defaults_and_bounds() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!((page.from, page.size), (0, 10));
        page.validate().unwrap();

        assert!(Pagination { from: -1, size: 10 }.validate().is_err());
        assert!(Pagination { from: 0, size: 0 }.validate().is_err());
    }

    #[test]
    fn request_with_items_is_flat() {
        let dto = RequestWithItems {
            request: RequestDto {
                id: 3,
                description: "Need a ladder".into(),
                created: datetime!(2024-01-01 09:00),
            },
            items: vec![],
        };
        assert_eq!(
            serde_json::to_string(&dto).unwrap(),
            r#"{"id":3,"description":"Need a ladder","created":"2024-01-01T09:00:00","items":[]}"#
        );
    }

    #[test]
    fn blank_description_is_rejected() {
        assert!(CreateRequestBody { description: Some(" ".into()) }.validate().is_err());
        assert!(CreateRequestBody::default().validate().is_err());
        assert_eq!(
            CreateRequestBody { description: Some(" ladder ".into()) }.validate().unwrap(),
            "ladder"
        );
    }
}
