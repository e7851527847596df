use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::items::repo_types::{Item, NewItem};

#[async_trait]
pub trait ItemRepo: Send + Sync {
    async fn create(&self, new: NewItem) -> AppResult<Item>;
    /// Overwrites name, description and availability.
    async fn update(&self, item: &Item) -> AppResult<Item>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>>;
    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>>;
    /// Available items whose name or description contains `text`, ignoring case.
    async fn search(&self, text: &str) -> AppResult<Vec<Item>>;
    async fn list_by_request(&self, request_id: i64) -> AppResult<Vec<Item>>;
}

#[derive(Clone)]
pub struct PgItemRepo {
    db: PgPool,
}

impl PgItemRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Escapes LIKE wildcards so the needle matches literally.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ItemRepo for PgItemRepo {
    async fn create(&self, new: NewItem) -> AppResult<Item> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description, available, owner_id, request_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, available, owner_id, request_id
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.available)
        .bind(new.owner_id)
        .bind(new.request_id)
        .fetch_one(&self.db)
        .await?;
        Ok(item)
    }

    async fn update(&self, item: &Item) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
               SET name = $2, description = $3, available = $4
             WHERE id = $1
            RETURNING id, name, description, available, owner_id, request_id
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", item.id)))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, available, owner_id, request_id
              FROM items
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(item)
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, available, owner_id, request_id
              FROM items
             WHERE owner_id = $1
             ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }

    async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, available, owner_id, request_id
              FROM items
             WHERE available
               AND (name ILIKE $1 OR description ILIKE $1)
             ORDER BY id
            "#,
        )
        .bind(like_pattern(text))
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }

    async fn list_by_request(&self, request_id: i64) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, available, owner_id, request_id
              FROM items
             WHERE request_id = $1
             ORDER BY id
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("drill"), "%drill%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}

#[cfg(all(test, feature = "postgres-tests"))]
mod pg_tests {
    use super::*;

    fn ids(items: &[Item]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[sqlx::test(
        migrations = "./migrations",
        fixtures(path = "../../fixtures", scripts("marketplace"))
    )]
    async fn search_is_case_insensitive_and_skips_unavailable(pool: PgPool) -> anyhow::Result<()> {
        let repo = PgItemRepo::new(pool);

        assert_eq!(ids(&repo.search("DRILL").await?), vec![1]);
        assert_eq!(ids(&repo.search("waterPROOF").await?), vec![3]);
        assert!(repo.search("heavy").await?.is_empty());
        Ok(())
    }

    #[sqlx::test(
        migrations = "./migrations",
        fixtures(path = "../../fixtures", scripts("marketplace"))
    )]
    async fn search_treats_wildcards_literally(pool: PgPool) -> anyhow::Result<()> {
        let repo = PgItemRepo::new(pool);

        assert_eq!(ids(&repo.search("%").await?), vec![3]);
        assert_eq!(ids(&repo.search("_").await?), vec![4]);
        assert!(repo.search("\\").await?.is_empty());
        Ok(())
    }

    #[sqlx::test(
        migrations = "./migrations",
        fixtures(path = "../../fixtures", scripts("marketplace"))
    )]
    async fn owner_request_listings_and_update(pool: PgPool) -> anyhow::Result<()> {
        let repo = PgItemRepo::new(pool);

        assert_eq!(ids(&repo.list_by_owner(1).await?), vec![1, 2]);
        assert!(repo.list_by_owner(3).await?.is_empty());
        assert_eq!(ids(&repo.list_by_request(1).await?), vec![4]);

        let mut hammer = repo.find_by_id(2).await?.unwrap();
        hammer.available = true;
        hammer.description = "Heavy duty, 800W".into();
        let updated = repo.update(&hammer).await?;
        assert_eq!(updated, hammer);
        assert_eq!(ids(&repo.search("hammer").await?), vec![2]);

        let created = repo
            .create(NewItem {
                name: "Saw".into(),
                description: "Hand saw".into(),
                available: true,
                owner_id: 1,
                request_id: Some(3),
            })
            .await?;
        assert_eq!(created.id, 5);
        assert_eq!(ids(&repo.list_by_request(3).await?), vec![5]);
        Ok(())
    }
}
