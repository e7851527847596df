use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::error::AppError;

/// Persisted booking status. `Waiting` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(Self::Waiting),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unknown booking status '{other}' in store"
            ))),
        }
    }
}

/// Booking as served over the wire: `{id, start, end, itemId, bookerId, status}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    #[serde(with = "crate::datetime")]
    pub start: PrimitiveDateTime,
    #[serde(with = "crate::datetime")]
    pub end: PrimitiveDateTime,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub item_id: i64,
    pub booker_id: i64,
}

#[derive(Debug, FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub start_date: PrimitiveDateTime,
    pub end_date: PrimitiveDateTime,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(r: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            start: r.start_date,
            end: r.end_date,
            item_id: r.item_id,
            booker_id: r.booker_id,
            status: r.status.parse()?,
        })
    }
}
