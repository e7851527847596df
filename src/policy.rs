//! What a caller learns when they touch something they are not entitled to.
//!
//! Every ownership/participation check goes through [`deny`], so the
//! reported error is decided here and nowhere else.

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guarded {
    /// `PATCH /items/{id}` by someone other than the owner.
    ItemUpdate,
    /// `PATCH /bookings/{id}` by someone other than the item owner.
    BookingDecide,
    /// `GET /bookings/{id}` by neither the booker nor the item owner.
    BookingView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotFound,
    Forbidden,
    Validation,
}

pub const fn denial_for(op: Guarded) -> Denial {
    match op {
        // hides whether the item exists
        Guarded::ItemUpdate => Denial::NotFound,
        Guarded::BookingDecide => Denial::Validation,
        Guarded::BookingView => Denial::NotFound,
    }
}

pub fn deny(op: Guarded, message: impl Into<String>) -> AppError {
    let message = message.into();
    match denial_for(op) {
        Denial::NotFound => AppError::NotFound(message),
        Denial::Forbidden => AppError::Forbidden(message),
        Denial::Validation => AppError::Validation(message),
    }
}
