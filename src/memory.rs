//! In-memory implementation of every store trait.
//!
//! Backs the test suite and `STORE=memory`. Orderings mirror the SQL in the
//! Postgres repos so services behave the same on both.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::PrimitiveDateTime;
use tokio::sync::RwLock;

use crate::bookings::repo::BookingRepo;
use crate::bookings::repo_types::{Booking, BookingStatus, NewBooking};
use crate::comments::repo::CommentRepo;
use crate::comments::repo_types::{Comment, NewComment};
use crate::error::{AppError, AppResult};
use crate::items::repo::ItemRepo;
use crate::items::repo_types::{Item, NewItem};
use crate::requests::repo::RequestRepo;
use crate::requests::repo_types::{ItemRequest, NewItemRequest};
use crate::users::repo::UserRepo;
use crate::users::repo_types::{NewUser, User};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert(&mut self, build: impl FnOnce(i64) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn filter(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|r| keep(r)).cloned().collect()
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    items: Table<Item>,
    requests: Table<ItemRequest>,
    bookings: Table<Booking>,
    comments: Table<Comment>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_start_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.start.cmp(&a.start).then(b.id.cmp(&a.id)));
}

fn newest_first(requests: &mut [ItemRequest]) {
    requests.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
}

fn email_taken(email: &str) -> AppError {
    AppError::Conflict(format!("Email {email} is already registered"))
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        let mut t = self.tables.write().await;
        if t.users.rows.values().any(|u| u.email == new.email) {
            return Err(email_taken(&new.email));
        }
        Ok(t.users.insert(|id| User {
            id,
            name: new.name,
            email: new.email,
        }))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut t = self.tables.write().await;
        if t
            .users
            .rows
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(email_taken(&user.email));
        }
        let row = t
            .users
            .rows
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user.id)))?;
        *row = user.clone();
        Ok(row.clone())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.read().await.users.filter(|_| true))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.tables.write().await.users.rows.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ItemRepo for MemoryStore {
    async fn create(&self, new: NewItem) -> AppResult<Item> {
        let mut t = self.tables.write().await;
        Ok(t.items.insert(|id| Item {
            id,
            name: new.name,
            description: new.description,
            available: new.available,
            owner_id: new.owner_id,
            request_id: new.request_id,
        }))
    }

    async fn update(&self, item: &Item) -> AppResult<Item> {
        let mut t = self.tables.write().await;
        let row = t
            .items
            .rows
            .get_mut(&item.id)
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", item.id)))?;
        row.name = item.name.clone();
        row.description = item.description.clone();
        row.available = item.available;
        Ok(row.clone())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>> {
        Ok(self.tables.read().await.items.get(id))
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        Ok(self
            .tables
            .read()
            .await
            .items
            .filter(|i| i.owner_id == owner_id))
    }

    async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        let needle = text.to_lowercase();
        Ok(self.tables.read().await.items.filter(|i| {
            i.available
                && (i.name.to_lowercase().contains(&needle)
                    || i.description.to_lowercase().contains(&needle))
        }))
    }

    async fn list_by_request(&self, request_id: i64) -> AppResult<Vec<Item>> {
        Ok(self
            .tables
            .read()
            .await
            .items
            .filter(|i| i.request_id == Some(request_id)))
    }
}

#[async_trait]
impl RequestRepo for MemoryStore {
    async fn create(&self, new: NewItemRequest) -> AppResult<ItemRequest> {
        let mut t = self.tables.write().await;
        Ok(t.requests.insert(|id| ItemRequest {
            id,
            description: new.description,
            requester_id: new.requester_id,
            created: new.created,
        }))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<ItemRequest>> {
        Ok(self.tables.read().await.requests.get(id))
    }

    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let mut requests = self
            .tables
            .read()
            .await
            .requests
            .filter(|r| r.requester_id == requester_id);
        newest_first(&mut requests);
        Ok(requests)
    }

    async fn list_by_others(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<ItemRequest>> {
        let mut requests = self
            .tables
            .read()
            .await
            .requests
            .filter(|r| r.requester_id != user_id);
        newest_first(&mut requests);
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(requests.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait]
impl BookingRepo for MemoryStore {
    async fn create(&self, new: NewBooking) -> AppResult<Booking> {
        let mut t = self.tables.write().await;
        Ok(t.bookings.insert(|id| Booking {
            id,
            start: new.start,
            end: new.end,
            item_id: new.item_id,
            booker_id: new.booker_id,
            status: BookingStatus::Waiting,
        }))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>> {
        Ok(self.tables.read().await.bookings.get(id))
    }

    async fn transition(
        &self,
        id: i64,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let mut t = self.tables.write().await;
        Ok(match t.bookings.rows.get_mut(&id) {
            Some(b) if b.status == from => {
                b.status = to;
                Some(b.clone())
            }
            _ => None,
        })
    }

    async fn list_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>> {
        let mut bookings = self
            .tables
            .read()
            .await
            .bookings
            .filter(|b| b.booker_id == booker_id);
        newest_start_first(&mut bookings);
        Ok(bookings)
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>> {
        let t = self.tables.read().await;
        let mut bookings = t.bookings.filter(|b| {
            t.items
                .rows
                .get(&b.item_id)
                .is_some_and(|i| i.owner_id == owner_id)
        });
        newest_start_first(&mut bookings);
        Ok(bookings)
    }

    async fn last_approved(
        &self,
        item_id: i64,
        now: PrimitiveDateTime,
    ) -> AppResult<Option<Booking>> {
        let t = self.tables.read().await;
        Ok(t.bookings
            .rows
            .values()
            .filter(|b| b.item_id == item_id && b.status == BookingStatus::Approved && b.start < now)
            .max_by_key(|b| (b.start, b.id))
            .cloned())
    }

    async fn next_approved(
        &self,
        item_id: i64,
        now: PrimitiveDateTime,
    ) -> AppResult<Option<Booking>> {
        let t = self.tables.read().await;
        Ok(t.bookings
            .rows
            .values()
            .filter(|b| b.item_id == item_id && b.status == BookingStatus::Approved && b.start > now)
            .min_by_key(|b| (b.start, b.id))
            .cloned())
    }

    async fn has_completed(
        &self,
        booker_id: i64,
        item_id: i64,
        now: PrimitiveDateTime,
    ) -> AppResult<bool> {
        let t = self.tables.read().await;
        Ok(t.bookings.rows.values().any(|b| {
            b.booker_id == booker_id
                && b.item_id == item_id
                && b.status == BookingStatus::Approved
                && b.end < now
        }))
    }

    async fn has_approved_overlap(
        &self,
        item_id: i64,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> AppResult<bool> {
        let t = self.tables.read().await;
        Ok(t.bookings.rows.values().any(|b| {
            b.item_id == item_id
                && b.status == BookingStatus::Approved
                && b.start < end
                && b.end > start
        }))
    }
}

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn create(&self, new: NewComment) -> AppResult<Comment> {
        let mut t = self.tables.write().await;
        Ok(t.comments.insert(|id| Comment {
            id,
            text: new.text,
            item_id: new.item_id,
            author_id: new.author_id,
            created: new.created,
        }))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(id))
    }

    async fn list_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>> {
        let mut comments = self
            .tables
            .read()
            .await
            .comments
            .filter(|c| c.item_id == item_id);
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn users_keep_emails_unique() {
        let store = MemoryStore::new();
        let a = UserRepo::create(&store, user("A", "a@example.com")).await.unwrap();
        let b = UserRepo::create(&store, user("B", "b@example.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let dup = UserRepo::create(&store, user("C", "a@example.com")).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        let mut steal = b.clone();
        steal.email = "a@example.com".into();
        assert!(matches!(UserRepo::update(&store, &steal).await, Err(AppError::Conflict(_))));

        store.delete(a.id).await.unwrap();
        store.delete(a.id).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn transition_only_fires_from_the_expected_state() {
        let store = MemoryStore::new();
        let booking = BookingRepo::create(
            &store,
            NewBooking {
                start: datetime!(2024-01-01 10:00),
                end: datetime!(2024-01-02 10:00),
                item_id: 1,
                booker_id: 2,
            },
        )
        .await
        .unwrap();

        let approved = store
            .transition(booking.id, BookingStatus::Waiting, BookingStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.map(|b| b.status), Some(BookingStatus::Approved));
        let again = store
            .transition(booking.id, BookingStatus::Waiting, BookingStatus::Rejected)
            .await
            .unwrap();
        assert!(again.is_none());
        assert!(store
            .transition(99, BookingStatus::Waiting, BookingStatus::Approved)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn neighbours_break_start_ties_by_id() {
        let store = MemoryStore::new();
        for _ in 0..2 {
            for (start, end) in [
                (datetime!(2023-12-20 10:00), datetime!(2023-12-21 10:00)),
                (datetime!(2024-01-05 10:00), datetime!(2024-01-06 10:00)),
            ] {
                let b = BookingRepo::create(
                    &store,
                    NewBooking {
                        start,
                        end,
                        item_id: 1,
                        booker_id: 2,
                    },
                )
                .await
                .unwrap();
                store
                    .transition(b.id, BookingStatus::Waiting, BookingStatus::Approved)
                    .await
                    .unwrap();
            }
        }
        // ids 1 and 3 ended before now, 2 and 4 start after it
        let now = datetime!(2024-01-01 09:00);
        assert_eq!(store.last_approved(1, now).await.unwrap().map(|b| b.id), Some(3));
        assert_eq!(store.next_approved(1, now).await.unwrap().map(|b| b.id), Some(2));
    }

    #[tokio::test]
    async fn overlap_is_half_open() {
        let store = MemoryStore::new();
        let booking = BookingRepo::create(
            &store,
            NewBooking {
                start: datetime!(2024-01-05 10:00),
                end: datetime!(2024-01-07 10:00),
                item_id: 1,
                booker_id: 2,
            },
        )
        .await
        .unwrap();
        // waiting bookings never block
        assert!(!store
            .has_approved_overlap(1, datetime!(2024-01-06 10:00), datetime!(2024-01-08 10:00))
            .await
            .unwrap());

        store
            .transition(booking.id, BookingStatus::Waiting, BookingStatus::Approved)
            .await
            .unwrap();
        assert!(store
            .has_approved_overlap(1, datetime!(2024-01-06 10:00), datetime!(2024-01-08 10:00))
            .await
            .unwrap());
        assert!(!store
            .has_approved_overlap(1, datetime!(2024-01-07 10:00), datetime!(2024-01-08 10:00))
            .await
            .unwrap());
        assert!(!store
            .has_approved_overlap(2, datetime!(2024-01-06 10:00), datetime!(2024-01-08 10:00))
            .await
            .unwrap());
    }
}
