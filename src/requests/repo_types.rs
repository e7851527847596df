use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

/// "I need an item like X". Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewItemRequest {
    pub description: String,
    pub requester_id: i64,
    pub created: PrimitiveDateTime,
}
