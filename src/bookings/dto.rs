use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::bookings::repo_types::{Booking, BookingStatus};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    #[serde(default, with = "crate::datetime::option")]
    pub start: Option<PrimitiveDateTime>,
    #[serde(default, with = "crate::datetime::option")]
    pub end: Option<PrimitiveDateTime>,
    pub item_id: Option<i64>,
}

/// Shape-checked booking request.
#[derive(Debug, Clone, Copy)]
pub struct BookingDraft {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub item_id: i64,
}

impl CreateBookingBody {
    pub fn validate(&self) -> AppResult<BookingDraft> {
        let start = self
            .start
            .ok_or_else(|| AppError::Validation("start must not be empty".into()))?;
        let end = self
            .end
            .ok_or_else(|| AppError::Validation("end must not be empty".into()))?;
        let item_id = match self.item_id {
            Some(id) if id > 0 => id,
            Some(id) => {
                return Err(AppError::Validation(format!(
                    "itemId must be positive, got {id}"
                )))
            }
            None => return Err(AppError::Validation("itemId must not be empty".into())),
        };
        Ok(BookingDraft {
            start,
            end,
            item_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionQuery {
    pub approved: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateQuery {
    pub state: Option<String>,
}

/// View filter over bookings, evaluated against the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    All,
    Current,
    Future,
    Past,
    Waiting,
    Rejected,
}

impl FromStr for BookingState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "CURRENT" => Ok(Self::Current),
            "FUTURE" => Ok(Self::Future),
            "PAST" => Ok(Self::Past),
            "WAITING" => Ok(Self::Waiting),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!("Unknown state: {s}"))),
        }
    }
}

impl BookingState {
    pub fn matches(self, booking: &Booking, now: PrimitiveDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Current => booking.start <= now && now < booking.end,
            Self::Future => booking.start > now,
            Self::Past => booking.end < now,
            Self::Waiting => booking.status == BookingStatus::Waiting,
            Self::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}
