use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::instrument;

use crate::models::{AdminStats, AppointmentStatus, ClientPage, ClientQuery, ServiceResult};
use crate::repositories::{
    AppointmentRepository, CustomerRepository, SchemaManager, ServiceRepository,
};

/// Days counted as "recent" on the dashboard
pub const RECENT_CLIENT_DAYS: i64 = 7;

/// Admin panel reporting and schema maintenance
pub struct AdminService {
    customers: Arc<dyn CustomerRepository>,
    services: Arc<dyn ServiceRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    schema: Arc<dyn SchemaManager>,
}

impl AdminService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        services: Arc<dyn ServiceRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        schema: Arc<dyn SchemaManager>,
    ) -> Self {
        Self {
            customers,
            services,
            appointments,
            schema,
        }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> ServiceResult<AdminStats> {
        let since = recent_clients_since(Utc::now());

        let (
            total_clients,
            total_services,
            total_appointments,
            pending_appointments,
            confirmed_appointments,
            recent_clients,
        ) = tokio::try_join!(
            self.customers.count(),
            self.services.count(),
            self.appointments.count(),
            self.appointments.count_by_status(AppointmentStatus::Pending),
            self.appointments.count_by_status(AppointmentStatus::Confirmed),
            self.customers.count_created_since(since),
        )?;

        crate::info_with_trace!(total_clients, total_appointments, "Collected admin stats");

        Ok(AdminStats {
            total_clients,
            total_services,
            total_appointments,
            pending_appointments,
            confirmed_appointments,
            recent_clients,
        })
    }

    #[instrument(skip(self), fields(page = query.page, per_page = query.per_page))]
    pub async fn list_clients(&self, query: ClientQuery) -> ServiceResult<ClientPage> {
        let (clients, total) = self.customers.list_clients(&query).await?;
        crate::info_with_trace!(total, "Listed clients");
        Ok(ClientPage::new(clients, total, &query))
    }

    /// Apply pending migrations
    #[instrument(skip(self))]
    pub async fn setup_tables(&self) -> ServiceResult<()> {
        self.schema.ensure_schema().await?;
        Ok(())
    }

    /// Whether the store answers a trivial query
    pub async fn store_reachable(&self) -> bool {
        match self.schema.ping().await {
            Ok(()) => true,
            Err(e) => {
                crate::warn_with_trace!(error = %e, "Database ping failed");
                false
            }
        }
    }
}

/// Midnight UTC, `RECENT_CLIENT_DAYS` days before `now`
pub fn recent_clients_since(now: DateTime<Utc>) -> DateTime<Utc> {
    let day = now.date_naive() - Duration::days(RECENT_CLIENT_DAYS);
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}
