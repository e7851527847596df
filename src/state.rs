use std::sync::Arc;

use sqlx::PgPool;

use crate::bookings::repo::{BookingRepo, PgBookingRepo};
use crate::clock::{Clock, SystemClock};
use crate::comments::repo::{CommentRepo, PgCommentRepo};
use crate::config::{AppConfig, StoreKind};
use crate::db;
use crate::items::repo::{ItemRepo, PgItemRepo};
use crate::memory::MemoryStore;
use crate::requests::repo::{PgRequestRepo, RequestRepo};
use crate::users::repo::{PgUserRepo, UserRepo};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub items: Arc<dyn ItemRepo>,
    pub requests: Arc<dyn RequestRepo>,
    pub bookings: Arc<dyn BookingRepo>,
    pub comments: Arc<dyn CommentRepo>,
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let clock = Arc::new(SystemClock) as Arc<dyn Clock>;
        match config.store {
            StoreKind::Postgres => {
                let db = db::connect(&config).await?;
                Self::migrated(db, config, clock).await
            }
            StoreKind::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Ok(Self::in_memory(config, clock))
            }
        }
    }

    /// Applies pending migrations before serving; a failed migration aborts startup.
    pub async fn migrated(
        db: PgPool,
        config: AppConfig,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        db::migrate(&db).await?;
        tracing::info!("migrations applied");
        Ok(Self::postgres(db, config, clock))
    }

    pub fn postgres(db: PgPool, config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            items: Arc::new(PgItemRepo::new(db.clone())),
            requests: Arc::new(PgRequestRepo::new(db.clone())),
            bookings: Arc::new(PgBookingRepo::new(db.clone())),
            comments: Arc::new(PgCommentRepo::new(db)),
            config: Arc::new(config),
            clock,
        }
    }

    pub fn in_memory(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            items: Arc::new(store.clone()),
            requests: Arc::new(store.clone()),
            bookings: Arc::new(store.clone()),
            comments: Arc::new(store),
            config: Arc::new(config),
            clock,
        }
    }
}

#[cfg(all(test, feature = "postgres-tests"))]
mod pg_tests {
    use super::*;
    use crate::clock::FixedClock;
    use time::macros::datetime;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(datetime!(2024-01-01 09:00)))
    }

    #[sqlx::test(migrations = false)]
    async fn fresh_database_is_migrated(pool: PgPool) -> anyhow::Result<()> {
        let st = AppState::migrated(pool, AppConfig::memory(), clock()).await?;
        assert!(st.users.list().await?.is_empty());
        Ok(())
    }

    #[sqlx::test(migrations = false)]
    async fn broken_schema_aborts_startup(pool: PgPool) -> anyhow::Result<()> {
        sqlx::query("CREATE TABLE bookings (id BIGINT PRIMARY KEY)")
            .execute(&pool)
            .await?;
        assert!(AppState::migrated(pool, AppConfig::memory(), clock())
            .await
            .is_err());
        Ok(())
    }
}
