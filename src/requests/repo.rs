use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::requests::repo_types::{ItemRequest, NewItemRequest};

#[async_trait]
pub trait RequestRepo: Send + Sync {
    async fn create(&self, new: NewItemRequest) -> AppResult<ItemRequest>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ItemRequest>>;
    /// Requests made by `requester_id`, newest first.
    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>>;
    /// A page of requests made by anyone but `user_id`, newest first.
    async fn list_by_others(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<ItemRequest>>;
}

#[derive(Clone)]
pub struct PgRequestRepo {
    db: PgPool,
}

impl PgRequestRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RequestRepo for PgRequestRepo {
    async fn create(&self, new: NewItemRequest) -> AppResult<ItemRequest> {
        let request = sqlx::query_as::<_, ItemRequest>(
            r#"
            INSERT INTO requests (description, requester_id, created)
            VALUES ($1, $2, $3)
            RETURNING id, description, requester_id, created
            "#,
        )
        .bind(&new.description)
        .bind(new.requester_id)
        .bind(new.created)
        .fetch_one(&self.db)
        .await?;

        Ok(request)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<ItemRequest>> {
        let request = sqlx::query_as::<_, ItemRequest>(
            "SELECT id, description, requester_id, created FROM requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(request)
    }

    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, description, requester_id, created
            FROM requests
            WHERE requester_id = $1
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(requester_id)
        .fetch_all(&self.db)
        .await?;

        Ok(requests)
    }

    async fn list_by_others(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, description, requester_id, created
            FROM requests
            WHERE requester_id <> $1
            ORDER BY created DESC, id DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(requests)
    }
}

#[cfg(all(test, feature = "postgres-tests"))]
mod pg_tests {
    use super::*;
    use time::macros::datetime;

    fn ids(requests: &[ItemRequest]) -> Vec<i64> {
        requests.iter().map(|r| r.id).collect()
    }

    #[sqlx::test(
        migrations = "./migrations",
        fixtures(path = "../../fixtures", scripts("marketplace"))
    )]
    async fn lists_are_newest_first(pool: PgPool) -> anyhow::Result<()> {
        let repo = PgRequestRepo::new(pool);

        assert_eq!(ids(&repo.list_by_requester(1).await?), vec![2, 1]);
        assert_eq!(ids(&repo.list_by_others(2, 0, 10).await?), vec![2, 1]);
        assert_eq!(ids(&repo.list_by_others(3, 0, 10).await?), vec![3, 2, 1]);
        Ok(())
    }

    #[sqlx::test(
        migrations = "./migrations",
        fixtures(path = "../../fixtures", scripts("marketplace"))
    )]
    async fn feed_applies_offset_then_limit(pool: PgPool) -> anyhow::Result<()> {
        let repo = PgRequestRepo::new(pool);

        assert_eq!(ids(&repo.list_by_others(3, 1, 1).await?), vec![2]);
        assert_eq!(ids(&repo.list_by_others(3, 2, 5).await?), vec![1]);
        assert!(repo.list_by_others(3, 3, 5).await?.is_empty());
        Ok(())
    }

    #[sqlx::test(
        migrations = "./migrations",
        fixtures(path = "../../fixtures", scripts("marketplace"))
    )]
    async fn create_round_trips_timestamp(pool: PgPool) -> anyhow::Result<()> {
        let repo = PgRequestRepo::new(pool);

        let created = repo
            .create(NewItemRequest {
                description: "Need a kayak".into(),
                requester_id: 3,
                created: datetime!(2024-02-01 08:30),
            })
            .await?;
        assert_eq!(created.id, 4);
        assert_eq!(repo.find_by_id(4).await?, Some(created));
        assert_eq!(ids(&repo.list_by_others(1, 0, 1).await?), vec![4]);
        Ok(())
    }
}
