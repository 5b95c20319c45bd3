use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::models::{Message, MessageUpdate, NewMessage, RepositoryResult};
use crate::observability::DatabaseTracingMiddleware;

const TABLE: &str = "messages";

const MESSAGE_COLUMNS: &str = "id, name, email, phone, subject, message, message_type, is_read, \
     replied, priority, notes, created_at, read_at";

/// Trait defining the interface for the contact message inbox
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a new, unread message
    async fn create(&self, message: NewMessage) -> RepositoryResult<Message>;

    /// Messages newest first, optionally only read or only unread ones
    async fn list(&self, is_read: Option<bool>) -> RepositoryResult<Vec<Message>>;

    /// Mark a message read (keeping the first read time) and return it
    async fn mark_read(&self, id: i64) -> RepositoryResult<Option<Message>>;

    /// Apply an admin update; `None` when the id does not exist
    async fn update(&self, id: i64, update: MessageUpdate) -> RepositoryResult<Option<Message>>;

    /// Delete a message; `false` when the id does not exist
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;

    /// Count unread messages
    async fn count_unread(&self) -> RepositoryResult<i64>;
}

/// PostgreSQL implementation of the MessageRepository trait
pub struct PgMessageRepository {
    pool: PgPool,
    db: DatabaseTracingMiddleware,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool, db: DatabaseTracingMiddleware) -> Self {
        Self { pool, db }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(message_type = ?message.message_type))]
    async fn create(&self, message: NewMessage) -> RepositoryResult<Message> {
        let sql = format!(
            "INSERT INTO messages \
                (name, email, phone, subject, message, message_type, priority) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            MESSAGE_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Message>(&sql)
            .bind(&message.name)
            .bind(&message.email)
            .bind(message.phone.as_deref())
            .bind(message.subject.as_deref())
            .bind(&message.message)
            .bind(message.message_type)
            .bind(message.priority)
            .fetch_one(&self.pool);
        let created = self.db.trace_operation("INSERT", TABLE, fetch).await?;

        info!(message_id = created.id, "Message stored");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn list(&self, is_read: Option<bool>) -> RepositoryResult<Vec<Message>> {
        let sql = format!(
            "SELECT {} FROM messages \
             WHERE ($1::boolean IS NULL OR is_read = $1) \
             ORDER BY created_at DESC, id DESC",
            MESSAGE_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Message>(&sql)
            .bind(is_read)
            .fetch_all(&self.pool);
        let messages = self.db.trace_operation("SELECT", TABLE, fetch).await?;

        info!("Found {} messages", messages.len());
        Ok(messages)
    }

    #[instrument(skip(self), fields(id = id))]
    async fn mark_read(&self, id: i64) -> RepositoryResult<Option<Message>> {
        let sql = format!(
            "UPDATE messages \
             SET is_read = TRUE, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 \
             RETURNING {}",
            MESSAGE_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Message>(&sql)
            .bind(id)
            .fetch_optional(&self.pool);
        let message = self.db.trace_operation("UPDATE", TABLE, fetch).await?;
        Ok(message)
    }

    #[instrument(skip(self, update), fields(id = id))]
    async fn update(&self, id: i64, update: MessageUpdate) -> RepositoryResult<Option<Message>> {
        // Unread clears read_at; a first read stamps it
        let sql = format!(
            "UPDATE messages \
             SET is_read = COALESCE($2, is_read), \
                 read_at = CASE \
                     WHEN $2 IS NULL THEN read_at \
                     WHEN $2 THEN COALESCE(read_at, NOW()) \
                     ELSE NULL END, \
                 replied = COALESCE($3, replied), \
                 priority = COALESCE($4, priority), \
                 notes = COALESCE($5, notes) \
             WHERE id = $1 \
             RETURNING {}",
            MESSAGE_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Message>(&sql)
            .bind(id)
            .bind(update.is_read)
            .bind(update.replied)
            .bind(update.priority)
            .bind(update.notes.as_deref())
            .fetch_optional(&self.pool);
        let message = self.db.trace_operation("UPDATE", TABLE, fetch).await?;

        if message.is_some() {
            info!(message_id = id, "Message updated");
        }
        Ok(message)
    }

    #[instrument(skip(self), fields(id = id))]
    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let execute = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool);
        let result = self.db.trace_operation("DELETE", TABLE, execute).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_unread(&self) -> RepositoryResult<i64> {
        let fetch = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE NOT is_read")
            .fetch_one(&self.pool);
        let count = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(count)
    }
}
