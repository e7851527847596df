use tracing::{info, warn};

use crate::bookings::dto::{BookingState, CreateBookingBody};
use crate::bookings::repo_types::{Booking, BookingStatus, NewBooking};
use crate::error::{AppError, AppResult};
use crate::items::repo_types::Item;
use crate::policy::{self, Guarded};
use crate::state::AppState;
use crate::users::services::ensure_exists;

async fn load_item(st: &AppState, item_id: i64) -> AppResult<Item> {
    st.items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {item_id} not found")))
}

async fn load_booking(st: &AppState, booking_id: i64) -> AppResult<Booking> {
    st.bookings
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking with id {booking_id} not found")))
}

/// Checks run in order: booker, item, availability, start, end.
pub async fn create_booking(
    st: &AppState,
    booker_id: i64,
    body: CreateBookingBody,
) -> AppResult<Booking> {
    let draft = body.validate()?;
    ensure_exists(st, booker_id).await?;
    let item = load_item(st, draft.item_id).await?;

    if !item.available {
        warn!(item_id = item.id, booker_id, "booking of unavailable item");
        return Err(AppError::Validation(format!(
            "Item with id {} is not available for booking",
            item.id
        )));
    }
    let now = st.clock.now();
    if draft.start < now {
        return Err(AppError::Validation(
            "Booking start must not be in the past".into(),
        ));
    }
    if draft.end <= draft.start {
        return Err(AppError::Validation(
            "Booking end must be after its start".into(),
        ));
    }
    if st.config.booking.reject_overlaps
        && st
            .bookings
            .has_approved_overlap(item.id, draft.start, draft.end)
            .await?
    {
        warn!(item_id = item.id, booker_id, "booking overlaps an approved one");
        return Err(AppError::Validation(format!(
            "Item with id {} is already booked for that period",
            item.id
        )));
    }

    let booking = st
        .bookings
        .create(NewBooking {
            start: draft.start,
            end: draft.end,
            item_id: item.id,
            booker_id,
        })
        .await?;
    info!(booking_id = booking.id, item_id = item.id, booker_id, "booking created");
    Ok(booking)
}

/// Owner's single WAITING -> APPROVED/REJECTED decision.
pub async fn decide(
    st: &AppState,
    owner_id: i64,
    booking_id: i64,
    approved: bool,
) -> AppResult<Booking> {
    let booking = load_booking(st, booking_id).await?;
    let item = load_item(st, booking.item_id).await?;

    if item.owner_id != owner_id {
        warn!(booking_id, owner_id, "decision by non-owner");
        return Err(policy::deny(
            Guarded::BookingDecide,
            format!("User {owner_id} is not the owner of item {}", item.id),
        ));
    }
    let already_decided = || {
        AppError::Validation(format!("Booking with id {booking_id} has already been decided"))
    };
    if booking.status.is_terminal() {
        warn!(booking_id, status = %booking.status, "booking already decided");
        return Err(already_decided());
    }

    let target = if approved {
        BookingStatus::Approved
    } else {
        BookingStatus::Rejected
    };
    let booking = st
        .bookings
        .transition(booking_id, BookingStatus::Waiting, target)
        .await?
        .ok_or_else(already_decided)?;
    info!(booking_id, status = %booking.status, "booking decided");
    Ok(booking)
}

/// Visible to the booker and to the item owner only.
pub async fn get_for_participant(
    st: &AppState,
    booking_id: i64,
    user_id: i64,
) -> AppResult<Booking> {
    let booking = load_booking(st, booking_id).await?;
    if booking.booker_id == user_id {
        return Ok(booking);
    }
    let item = load_item(st, booking.item_id).await?;
    if item.owner_id == user_id {
        return Ok(booking);
    }
    Err(policy::deny(
        Guarded::BookingView,
        format!("Booking with id {booking_id} not found"),
    ))
}

pub async fn list_by_booker(st: &AppState, booker_id: i64) -> AppResult<Vec<Booking>> {
    let bookings = st.bookings.list_by_booker(booker_id).await?;
    if bookings.is_empty() {
        return Err(AppError::NotFound(format!(
            "No bookings found for user {booker_id}"
        )));
    }
    Ok(bookings)
}

pub async fn list_by_booker_filtered(
    st: &AppState,
    booker_id: i64,
    state: &str,
) -> AppResult<Vec<Booking>> {
    let state: BookingState = state.parse()?;
    let now = st.clock.now();
    let bookings = st.bookings.list_by_booker(booker_id).await?;
    Ok(bookings
        .into_iter()
        .filter(|b| state.matches(b, now))
        .collect())
}

/// `NotFound` when the owner has no bookings at all, before the state is parsed.
pub async fn list_by_owner_filtered(
    st: &AppState,
    owner_id: i64,
    state: &str,
) -> AppResult<Vec<Booking>> {
    let bookings = st.bookings.list_by_owner(owner_id).await?;
    if bookings.is_empty() {
        return Err(AppError::NotFound(format!(
            "No bookings found for items of user {owner_id}"
        )));
    }
    let state: BookingState = state.parse()?;
    let now = st.clock.now();
    Ok(bookings
        .into_iter()
        .filter(|b| state.matches(b, now))
        .collect())
}

/// `(last, next)` approved bookings of an item relative to now.
pub async fn neighbours(
    st: &AppState,
    item_id: i64,
) -> AppResult<(Option<Booking>, Option<Booking>)> {
    let now = st.clock.now();
    let last = st.bookings.last_approved(item_id, now).await?;
    let next = st.bookings.next_approved(item_id, now).await?;
    Ok((last, next))
}

pub async fn has_completed(st: &AppState, user_id: i64, item_id: i64) -> AppResult<bool> {
    st.bookings
        .has_completed(user_id, item_id, st.clock.now())
        .await
}
