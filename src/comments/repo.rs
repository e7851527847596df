use async_trait::async_trait;
use sqlx::PgPool;

use crate::comments::repo_types::{Comment, NewComment};
use crate::error::AppResult;

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn create(&self, new: NewComment) -> AppResult<Comment>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Comment>>;
    /// Comments on an item, oldest first.
    async fn list_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>>;
}

#[derive(Clone)]
pub struct PgCommentRepo {
    db: PgPool,
}

impl PgCommentRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepo for PgCommentRepo {
    async fn create(&self, new: NewComment) -> AppResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (text, item_id, author_id, created)
            VALUES ($1, $2, $3, $4)
            RETURNING id, text, item_id, author_id, created
            "#,
        )
        .bind(&new.text)
        .bind(new.item_id)
        .bind(new.author_id)
        .bind(new.created)
        .fetch_one(&self.db)
        .await?;
        Ok(comment)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"SELECT id, text, item_id, author_id, created FROM comments WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(comment)
    }

    async fn list_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, text, item_id, author_id, created
              FROM comments
             WHERE item_id = $1
             ORDER BY created ASC, id ASC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;
        Ok(comments)
    }
}

#[cfg(all(test, feature = "postgres-tests"))]
mod pg_tests {
    use super::*;
    use time::macros::datetime;

    #[sqlx::test(
        migrations = "./migrations",
        fixtures(path = "../../fixtures", scripts("marketplace"))
    )]
    async fn comments_list_oldest_first(pool: PgPool) -> anyhow::Result<()> {
        let repo = PgCommentRepo::new(pool);

        let later = repo
            .create(NewComment {
                text: "Still works".into(),
                item_id: 1,
                author_id: 2,
                created: datetime!(2024-01-05 10:00),
            })
            .await?;
        let earlier = repo
            .create(NewComment {
                text: "Works great".into(),
                item_id: 1,
                author_id: 2,
                created: datetime!(2024-01-02 10:00),
            })
            .await?;

        assert_eq!(repo.list_by_item(1).await?, vec![earlier.clone(), later]);
        assert!(repo.list_by_item(3).await?.is_empty());
        assert_eq!(repo.find_by_id(earlier.id).await?, Some(earlier));
        assert!(repo.find_by_id(99).await?.is_none());
        Ok(())
    }
}
