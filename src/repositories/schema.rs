use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::models::RepositoryResult;
use crate::observability::DatabaseTracingMiddleware;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Schema lifecycle and connectivity checks for the relational store
#[async_trait]
pub trait SchemaManager: Send + Sync {
    /// Apply pending migrations; already applied ones are skipped
    async fn ensure_schema(&self) -> RepositoryResult<()>;

    /// Round-trip a trivial query to verify the store is reachable
    async fn ping(&self) -> RepositoryResult<()>;
}

pub struct PgSchemaManager {
    pool: PgPool,
    db: DatabaseTracingMiddleware,
}

impl PgSchemaManager {
    pub fn new(pool: PgPool, db: DatabaseTracingMiddleware) -> Self {
        Self { pool, db }
    }
}

#[async_trait]
impl SchemaManager for PgSchemaManager {
    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> RepositoryResult<()> {
        info!(
            migrations = MIGRATOR.iter().count(),
            "Applying database migrations"
        );

        self.db
            .trace_operation("MIGRATE", "_sqlx_migrations", MIGRATOR.run(&self.pool))
            .await?;

        info!("Database schema is up to date");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> RepositoryResult<()> {
        let fetch = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool);
        self.db.trace_operation("PING", "none", fetch).await?;
        Ok(())
    }
}
