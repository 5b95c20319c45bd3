use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::{info, instrument};

use crate::models::{
    Appointment, AppointmentDetails, AppointmentStatus, Customer, NewAppointment,
    RepositoryResult, Service,
};
use crate::observability::DatabaseTracingMiddleware;

const TABLE: &str = "appointments";

const APPOINTMENT_COLUMNS: &str = "id, customer_id, service_id, scheduled_date, scheduled_time, \
     status, notes, created_at, updated_at";

/// Trait defining the interface for appointment data access operations
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Create a new appointment
    async fn create(&self, appointment: NewAppointment) -> RepositoryResult<Appointment>;

    /// All appointments with their customer and service, latest scheduled date first
    async fn list_with_details(&self) -> RepositoryResult<Vec<AppointmentDetails>>;

    /// Count all appointments
    async fn count(&self) -> RepositoryResult<i64>;

    /// Count appointments in the given status
    async fn count_by_status(&self, status: AppointmentStatus) -> RepositoryResult<i64>;

    /// Count appointments booked for one service
    async fn count_for_service(&self, service_id: i64) -> RepositoryResult<i64>;
}

/// PostgreSQL implementation of the AppointmentRepository trait
pub struct PgAppointmentRepository {
    pool: PgPool,
    db: DatabaseTracingMiddleware,
}

impl PgAppointmentRepository {
    pub fn new(pool: PgPool, db: DatabaseTracingMiddleware) -> Self {
        Self { pool, db }
    }
}

// The join selects customer and service columns under `c_` and `s_` prefixes,
// which the derived row mappings cannot address.

fn joined_customer(row: &PgRow) -> Result<Customer, sqlx::Error> {
    Ok(Customer {
        id: row.try_get("c_id")?,
        first_name: row.try_get("c_first_name")?,
        last_name: row.try_get("c_last_name")?,
        email: row.try_get("c_email")?,
        phone: row.try_get("c_phone")?,
        address: row.try_get("c_address")?,
        city: row.try_get("c_city")?,
        postal_code: row.try_get("c_postal_code")?,
        created_at: row.try_get("c_created_at")?,
        updated_at: row.try_get("c_updated_at")?,
    })
}

fn joined_service(row: &PgRow) -> Result<Service, sqlx::Error> {
    Ok(Service {
        id: row.try_get("s_id")?,
        name: row.try_get("s_name")?,
        description: row.try_get("s_description")?,
        category: row.try_get("s_category")?,
        price: row.try_get("s_price")?,
        duration_minutes: row.try_get("s_duration_minutes")?,
        is_active: row.try_get("s_is_active")?,
        created_at: row.try_get("s_created_at")?,
        updated_at: row.try_get("s_updated_at")?,
    })
}

fn joined_details(row: &PgRow) -> Result<AppointmentDetails, sqlx::Error> {
    Ok(AppointmentDetails {
        appointment: Appointment::from_row(row)?,
        customer: joined_customer(row)?,
        service: joined_service(row)?,
    })
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    #[instrument(
        skip(self, appointment),
        fields(customer_id = appointment.customer_id, service_id = appointment.service_id)
    )]
    async fn create(&self, appointment: NewAppointment) -> RepositoryResult<Appointment> {
        let sql = format!(
            "INSERT INTO appointments \
                (customer_id, service_id, scheduled_date, scheduled_time, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            APPOINTMENT_COLUMNS
        );

        let fetch = sqlx::query_as::<_, Appointment>(&sql)
            .bind(appointment.customer_id)
            .bind(appointment.service_id)
            .bind(appointment.schedule.date)
            .bind(appointment.schedule.at)
            .bind(appointment.status)
            .bind(appointment.notes.as_deref())
            .fetch_one(&self.pool);
        let created = self.db.trace_operation("INSERT", TABLE, fetch).await?;

        info!(appointment_id = created.id, "Appointment created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn list_with_details(&self) -> RepositoryResult<Vec<AppointmentDetails>> {
        let sql = "SELECT a.id, a.customer_id, a.service_id, a.scheduled_date, a.scheduled_time, \
                    a.status, a.notes, a.created_at, a.updated_at, \
                    c.id AS c_id, c.first_name AS c_first_name, c.last_name AS c_last_name, \
                    c.email AS c_email, c.phone AS c_phone, c.address AS c_address, \
                    c.city AS c_city, c.postal_code AS c_postal_code, \
                    c.created_at AS c_created_at, c.updated_at AS c_updated_at, \
                    s.id AS s_id, s.name AS s_name, s.description AS s_description, \
                    s.category AS s_category, s.price AS s_price, \
                    s.duration_minutes AS s_duration_minutes, s.is_active AS s_is_active, \
                    s.created_at AS s_created_at, s.updated_at AS s_updated_at \
             FROM appointments a \
             JOIN customers c ON c.id = a.customer_id \
             JOIN services s ON s.id = a.service_id \
             ORDER BY a.scheduled_date DESC, a.id DESC";

        let fetch = sqlx::query(sql)
            .try_map(|row: PgRow| joined_details(&row))
            .fetch_all(&self.pool);
        let appointments = self.db.trace_operation("SELECT", TABLE, fetch).await?;

        info!("Found {} appointments", appointments.len());
        Ok(appointments)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepositoryResult<i64> {
        let fetch =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments").fetch_one(&self.pool);
        let count = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(count)
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn count_by_status(&self, status: AppointmentStatus) -> RepositoryResult<i64> {
        let fetch =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool);
        let count = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(count)
    }

    #[instrument(skip(self), fields(service_id = service_id))]
    async fn count_for_service(&self, service_id: i64) -> RepositoryResult<i64> {
        let fetch =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE service_id = $1")
                .bind(service_id)
                .fetch_one(&self.pool);
        let count = self.db.trace_operation("SELECT", TABLE, fetch).await?;
        Ok(count)
    }
}
