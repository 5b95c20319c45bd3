use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::models::{NewService, RepositoryResult, Service};
use crate::observability::DatabaseTracingMiddleware;

const TABLE: &str = "services";

const SERVICE_COLUMNS: &str =
    "id, name, description, category, price, duration_minutes, is_active, created_at, updated_at";

/// Trait defining the interface for service catalogue data access
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Find a service by exact name
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Service>>;

    /// First service ordered by `is_active DESC, id ASC`
    async fn find_first_available(&self) -> RepositoryResult<Option<Service>>;

    /// Find a service by its ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Service>>;

    /// Active services ordered by name
    async fn list_active(&self) -> RepositoryResult<Vec<Service>>;

    /// Create a new service
    async fn create(&self, service: NewService) -> RepositoryResult<Service>;

    /// Overwrite every editable field of a service; `None` when the id does not exist
    async fn update(&self, id: i64, service: NewService) -> RepositoryResult<Option<Service>>;

    /// Delete a service; `false` when the id does not exist
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;

    /// Count all services
    async fn count(&self) -> RepositoryResult<i64>;
}

/// PostgreSQL implementation of the ServiceRepository trait
pub struct PgServiceRepository {
    pool: PgPool,
    db: DatabaseTracingMiddleware,
}

impl PgServiceRepository {
    pub fn new(pool: PgPool, db: DatabaseTracingMiddleware) -> Self {
        Self { pool, db }
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    #[instrument(skip(self), fields(name = %name))]
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Service>> {
        let sql = format!(
            "SELECT {} FROM services WHERE name = $1 ORDER BY id ASC LIMIT 1",
            SERVICE_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Service>(&sql)
            .bind(name)
            .fetch_optional(&self.pool);
        let service = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(service)
    }

    #[instrument(skip(self))]
    async fn find_first_available(&self) -> RepositoryResult<Option<Service>> {
        let sql = format!(
            "SELECT {} FROM services ORDER BY is_active DESC, id ASC LIMIT 1",
            SERVICE_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Service>(&sql).fetch_optional(&self.pool);
        let service = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(service)
    }

    #[instrument(skip(self), fields(id = id))]
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Service>> {
        let sql = format!("SELECT {} FROM services WHERE id = $1", SERVICE_COLUMNS);

        let fetch = sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .fetch_optional(&self.pool);
        let service = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(service)
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> RepositoryResult<Vec<Service>> {
        let sql = format!(
            "SELECT {} FROM services WHERE is_active ORDER BY name ASC, id ASC",
            SERVICE_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Service>(&sql).fetch_all(&self.pool);
        let services = self.db.trace_operation("SELECT", TABLE, fetch).await?;

        info!("Found {} active services", services.len());
        Ok(services)
    }

    #[instrument(skip(self, service), fields(name = %service.name))]
    async fn create(&self, service: NewService) -> RepositoryResult<Service> {
        let sql = format!(
            "INSERT INTO services \
                (name, description, category, price, duration_minutes, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            SERVICE_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Service>(&sql)
            .bind(&service.name)
            .bind(service.description.as_deref())
            .bind(&service.category)
            .bind(service.price)
            .bind(service.duration_minutes)
            .bind(service.is_active)
            .fetch_one(&self.pool);
        let created = self.db.trace_operation("INSERT", TABLE, fetch).await?;

        info!(service_id = created.id, "Service created");
        Ok(created)
    }

    #[instrument(skip(self, service), fields(id = id, name = %service.name))]
    async fn update(&self, id: i64, service: NewService) -> RepositoryResult<Option<Service>> {
        let sql = format!(
            "UPDATE services \
             SET name = $2, description = $3, category = $4, price = $5, \
                 duration_minutes = $6, is_active = $7, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            SERVICE_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .bind(&service.name)
            .bind(service.description.as_deref())
            .bind(&service.category)
            .bind(service.price)
            .bind(service.duration_minutes)
            .bind(service.is_active)
            .fetch_optional(&self.pool);
        let updated = self.db.trace_operation("UPDATE", TABLE, fetch).await?;

        if updated.is_some() {
            info!(service_id = id, "Service updated");
        }
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = id))]
    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let execute = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool);
        let result = self.db.trace_operation("DELETE", TABLE, execute).await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(service_id = id, "Service deleted");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepositoryResult<i64> {
        let fetch =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services").fetch_one(&self.pool);
        let count = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(count)
    }
}
