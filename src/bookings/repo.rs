use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::bookings::repo_types::{Booking, BookingRow, BookingStatus, NewBooking};
use crate::error::AppResult;

#[async_trait]
pub trait BookingRepo: Send + Sync {
    /// Persists a new booking in `WAITING`.
    async fn create(&self, new: NewBooking) -> AppResult<Booking>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>>;
    /// Atomically moves a booking from `from` to `to`; `None` when the
    /// booking is no longer in `from`.
    async fn transition(
        &self,
        id: i64,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>>;
    /// All bookings made by `booker_id`, newest start first.
    async fn list_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>>;
    /// All bookings on items owned by `owner_id`, newest start first.
    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>>;
    /// Latest approved booking that started before `now`; ties go to the higher id.
    async fn last_approved(&self, item_id: i64, now: PrimitiveDateTime)
        -> AppResult<Option<Booking>>;
    /// Earliest approved booking starting after `now`; ties go to the lower id.
    async fn next_approved(&self, item_id: i64, now: PrimitiveDateTime)
        -> AppResult<Option<Booking>>;
    /// Whether `booker_id` has an approved booking of `item_id` that ended before `now`.
    async fn has_completed(
        &self,
        booker_id: i64,
        item_id: i64,
        now: PrimitiveDateTime,
    ) -> AppResult<bool>;
    /// Whether an approved booking of `item_id` intersects `[start, end)`.
    async fn has_approved_overlap(
        &self,
        item_id: i64,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgBookingRepo {
    db: PgPool,
}

impl PgBookingRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> AppResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[async_trait]
impl BookingRepo for PgBookingRepo {
    async fn create(&self, new: NewBooking) -> AppResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, start_date, end_date, item_id, booker_id, status
            "#,
        )
        .bind(new.start)
        .bind(new.end)
        .bind(new.item_id)
        .bind(new.booker_id)
        .bind(BookingStatus::Waiting.as_str())
        .fetch_one(&self.db)
        .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
              FROM bookings
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn transition(
        &self,
        id: i64,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            UPDATE bookings
               SET status = $3
             WHERE id = $1 AND status = $2
            RETURNING id, start_date, end_date, item_id, booker_id, status
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.db)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn list_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
              FROM bookings
             WHERE booker_id = $1
             ORDER BY start_date DESC, id DESC
            "#,
        )
        .bind(booker_id)
        .fetch_all(&self.db)
        .await?;
        into_bookings(rows)
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.item_id, b.booker_id, b.status
              FROM bookings b
              JOIN items i ON i.id = b.item_id
             WHERE i.owner_id = $1
             ORDER BY b.start_date DESC, b.id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        into_bookings(rows)
    }

    async fn last_approved(
        &self,
        item_id: i64,
        now: PrimitiveDateTime,
    ) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
              FROM bookings
             WHERE item_id = $1 AND status = $2 AND start_date < $3
             ORDER BY start_date DESC, id DESC
             LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(BookingStatus::Approved.as_str())
        .bind(now)
        .fetch_optional(&self.db)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn next_approved(
        &self,
        item_id: i64,
        now: PrimitiveDateTime,
    ) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
              FROM bookings
             WHERE item_id = $1 AND status = $2 AND start_date > $3
             ORDER BY start_date ASC, id ASC
             LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(BookingStatus::Approved.as_str())
        .bind(now)
        .fetch_optional(&self.db)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn has_completed(
        &self,
        booker_id: i64,
        item_id: i64,
        now: PrimitiveDateTime,
    ) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                  FROM bookings
                 WHERE booker_id = $1 AND item_id = $2 AND status = $3 AND end_date < $4
            )
            "#,
        )
        .bind(booker_id)
        .bind(item_id)
        .bind(BookingStatus::Approved.as_str())
        .bind(now)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn has_approved_overlap(
        &self,
        item_id: i64,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                  FROM bookings
                 WHERE item_id = $1 AND status = $2 AND start_date < $4 AND end_date > $3
            )
            "#,
        )
        .bind(item_id)
        .bind(BookingStatus::Approved.as_str())
        .bind(start)
        .bind(end)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }
}
