use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};

use super::contains_pattern;
use crate::models::{
    ClientQuery, ClientSummary, ContactLookup, Customer, NewCustomer, RepositoryResult,
    UpsertedCustomer,
};
use crate::observability::DatabaseTracingMiddleware;

const TABLE: &str = "customers";

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, phone, address, city, \
     postal_code, created_at, updated_at";

/// Trait defining the interface for customer data access operations
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Find the first customer (lowest id) whose email OR phone matches the non-empty lookup fields
    async fn find_by_contact(&self, lookup: &ContactLookup) -> RepositoryResult<Option<Customer>>;

    /// Find a customer by exact email
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Customer>>;

    /// Insert a customer, or return the existing row when the email is already taken
    async fn create_or_get(&self, customer: NewCustomer) -> RepositoryResult<UpsertedCustomer>;

    /// Count all customers
    async fn count(&self) -> RepositoryResult<i64>;

    /// Count customers created at or after the given instant
    async fn count_created_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64>;

    /// One page of customers, newest first, with their appointment counts and the total match count
    async fn list_clients(
        &self,
        query: &ClientQuery,
    ) -> RepositoryResult<(Vec<ClientSummary>, i64)>;
}

/// PostgreSQL implementation of the CustomerRepository trait
pub struct PgCustomerRepository {
    pool: PgPool,
    db: DatabaseTracingMiddleware,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool, db: DatabaseTracingMiddleware) -> Self {
        Self { pool, db }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    #[instrument(skip(self, lookup))]
    async fn find_by_contact(&self, lookup: &ContactLookup) -> RepositoryResult<Option<Customer>> {
        if lookup.is_empty() {
            return Ok(None);
        }

        info!(
            by_email = lookup.email.is_some(),
            by_phone = lookup.phone.is_some(),
            "Finding customer by contact"
        );

        let sql = format!(
            "SELECT {} FROM customers \
             WHERE ($1::text IS NOT NULL AND email = $1) \
                OR ($2::text IS NOT NULL AND phone = $2) \
             ORDER BY id ASC LIMIT 1",
            CUSTOMER_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Customer>(&sql)
            .bind(lookup.email.as_deref())
            .bind(lookup.phone.as_deref())
            .fetch_optional(&self.pool);
        let customer = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(customer)
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Customer>> {
        let sql = format!(
            "SELECT {} FROM customers WHERE email = $1 ORDER BY id ASC LIMIT 1",
            CUSTOMER_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Customer>(&sql)
            .bind(email)
            .fetch_optional(&self.pool);
        let customer = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(customer)
    }

    #[instrument(skip(self, customer))]
    async fn create_or_get(&self, customer: NewCustomer) -> RepositoryResult<UpsertedCustomer> {
        // The no-op update makes RETURNING yield the row that won a concurrent insert;
        // xmax is zero only on a row this statement inserted
        let sql = format!(
            "INSERT INTO customers \
                (first_name, last_name, email, phone, address, city, postal_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (email) DO UPDATE SET email = customers.email \
             RETURNING {}, (xmax = 0) AS inserted",
            CUSTOMER_COLUMNS
        );

        let fetch = sqlx::query_as::<_, UpsertedCustomer>(&sql)
            .bind(&customer.first_name)
            .bind(&customer.last_name)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(customer.address.as_deref())
            .bind(customer.city.as_deref())
            .bind(customer.postal_code.as_deref())
            .fetch_one(&self.pool);
        let stored = self.db.trace_operation("INSERT", TABLE, fetch).await?;

        info!(
            customer_id = stored.customer.id,
            inserted = stored.inserted,
            "Customer stored"
        );
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepositoryResult<i64> {
        let fetch =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers").fetch_one(&self.pool);
        let count = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn count_created_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64> {
        let fetch =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE created_at >= $1")
                .bind(since)
                .fetch_one(&self.pool);
        let count = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(count)
    }

    #[instrument(skip(self), fields(page = query.page, per_page = query.per_page))]
    async fn list_clients(
        &self,
        query: &ClientQuery,
    ) -> RepositoryResult<(Vec<ClientSummary>, i64)> {
        let pattern = query.search.as_deref().map(contains_pattern);
        let filter = "($1::text IS NULL \
             OR c.first_name ILIKE $1 OR c.last_name ILIKE $1 \
             OR c.email ILIKE $1 OR c.phone ILIKE $1)";

        let count_sql = format!("SELECT COUNT(*) FROM customers c WHERE {}", filter);
        let fetch = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(pattern.as_deref())
            .fetch_one(&self.pool);
        let total = self.db.trace_operation("SELECT", TABLE, fetch).await?;

        let sql = format!(
            "SELECT c.id, c.first_name, c.last_name, c.email, c.phone, c.address, c.city, \
                    c.postal_code, c.created_at, c.updated_at, \
                    COUNT(a.id) AS appointment_count \
             FROM customers c \
             LEFT JOIN appointments a ON a.customer_id = c.id \
             WHERE {} \
             GROUP BY c.id \
             ORDER BY c.created_at DESC, c.id DESC \
             LIMIT $2 OFFSET $3",
            filter
        );

        let fetch = sqlx::query_as::<_, ClientSummary>(&sql)
            .bind(pattern.as_deref())
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool);
        let clients = self.db.trace_operation("SELECT", TABLE, fetch).await?;

        info!("Found {} of {} clients", clients.len(), total);
        Ok((clients, total))
    }
}
