//! Fixtures shared by the unit tests.

use std::sync::Arc;

use time::{macros::datetime, PrimitiveDateTime};

use crate::bookings::repo_types::{Booking, BookingStatus, NewBooking};
use crate::clock::{Clock, FixedClock};
use crate::config::{AppConfig, BookingConfig};
use crate::items::repo_types::{Item, NewItem};
use crate::state::AppState;
use crate::users::dto::CreateUserBody;
use crate::users::repo_types::{NewUser, User};

/// Memory-backed state with the clock pinned to 2024-01-01T09:00.
pub fn fixed_state() -> (AppState, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(datetime!(2024-01-01 09:00)));
    let st = AppState::in_memory(AppConfig::memory(), clock.clone() as Arc<dyn Clock>);
    (st, clock)
}

pub fn body(name: &str, email: &str) -> CreateUserBody {
    CreateUserBody {
        name: Some(name.into()),
        email: Some(email.into()),
    }
}

pub async fn seed_user(st: &AppState, name: &str, email: &str) -> User {
    st.users
        .create(NewUser {
            name: name.into(),
            email: email.into(),
        })
        .await
        .unwrap()
}

pub async fn seed_item(st: &AppState, owner_id: i64, name: &str, available: bool) -> Item {
    st.items
        .create(NewItem {
            name: name.into(),
            description: format!("{name} for rent"),
            available,
            owner_id,
            request_id: None,
        })
        .await
        .unwrap()
}

/// Stores a booking directly, bypassing the creation rules.
pub async fn seed_booking(
    st: &AppState,
    booker_id: i64,
    item_id: i64,
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
    status: BookingStatus,
) -> Booking {
    let booking = st
        .bookings
        .create(NewBooking {
            start,
            end,
            item_id,
            booker_id,
        })
        .await
        .unwrap();
    if status == BookingStatus::Waiting {
        return booking;
    }
    st.bookings
        .transition(booking.id, BookingStatus::Waiting, status)
        .await
        .unwrap()
        .unwrap()
}

impl AppState {
    /// Same stores and clock, with overlapping approved bookings refused.
    pub fn with_overlap_rejection(&self) -> Self {
        let mut config = (*self.config).clone();
        config.booking = BookingConfig {
            reject_overlaps: true,
        };
        Self {
            config: Arc::new(config),
            ..self.clone()
        }
    }
}
