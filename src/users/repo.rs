use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::users::repo_types::{NewUser, User};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, new: NewUser) -> AppResult<User>;
    /// Overwrites name and email of an existing record.
    async fn update(&self, user: &User) -> AppResult<User>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list(&self) -> AppResult<Vec<User>>;
    /// Deleting an unknown id is not an error.
    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn email_conflict(email: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Email {email} is already registered"))
        }
        _ => AppError::from(e),
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .fetch_one(&self.db)
        .await
        .map_err(email_conflict(&new.email))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = $2, email = $3
             WHERE id = $1
            RETURNING id, name, email
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .fetch_optional(&self.db)
        .await
        .map_err(email_conflict(&user.email))?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user.id)))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT id, name, email FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(r#"SELECT id, name, email FROM users WHERE email = $1"#)
                .bind(email)
                .fetch_optional(&self.db)
                .await?;
        Ok(user)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(r#"SELECT id, name, email FROM users ORDER BY id"#)
            .fetch_all(&self.db)
            .await?;
        Ok(users)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

#[cfg(all(test, feature = "postgres-tests"))]
mod pg_tests {
    use super::*;

    fn user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
        }
    }

    #[sqlx::test(
        migrations = "./migrations",
        fixtures(path = "../../fixtures", scripts("marketplace"))
    )]
    async fn duplicate_email_maps_to_conflict(pool: PgPool) -> anyhow::Result<()> {
        let repo = PgUserRepo::new(pool);

        let err = repo.create(user("Z", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(m) if m.contains("a@example.com")));

        let mut b = repo.find_by_id(2).await?.unwrap();
        b.email = "a@example.com".into();
        assert!(matches!(repo.update(&b).await, Err(AppError::Conflict(_))));
        assert_eq!(repo.find_by_id(2).await?.unwrap().email, "b@example.com");

        let fresh = repo.create(user("D", "d@example.com")).await?;
        assert!(fresh.id > 3);
        Ok(())
    }

    #[sqlx::test(
        migrations = "./migrations",
        fixtures(path = "../../fixtures", scripts("marketplace"))
    )]
    async fn update_list_and_idempotent_delete(pool: PgPool) -> anyhow::Result<()> {
        let repo = PgUserRepo::new(pool);

        let mut a = repo.find_by_email("a@example.com").await?.unwrap();
        a.name = "Alice".into();
        assert_eq!(repo.update(&a).await?.name, "Alice");

        let ghost = User {
            id: 99,
            name: "X".into(),
            email: "x@example.com".into(),
        };
        assert!(matches!(repo.update(&ghost).await, Err(AppError::NotFound(_))));

        repo.delete(3).await?;
        repo.delete(3).await?;
        let ids: Vec<i64> = repo.list().await?.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2]);
        Ok(())
    }
}
