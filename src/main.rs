use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use plumbing_booking::{
    create_app, init_observability,
    observability::{
        BusinessTracingMiddleware, DatabaseTracingMiddleware, Metrics, ObservabilitySettings,
    },
    repositories::{
        PgAppointmentRepository, PgCustomerRepository, PgMessageRepository, PgSchemaManager,
        PgServiceRepository, SchemaManager,
    },
    services::{AdminService, AppointmentService, BookingService, CatalogService, MessageService},
    shutdown_observability, AppState, Config, HttpLimits,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real deployments set the environment directly
    dotenv::dotenv().ok();

    let config = Config::from_environment()?;

    init_observability(&ObservabilitySettings {
        service_name: &config.observability.service_name,
        service_version: &config.observability.service_version,
        otlp_endpoint: config.observability.otlp_endpoint.as_deref(),
        log_level: &config.observability.log_level,
        enable_json_logging: config.observability.enable_json_logging,
    })?;

    info!(
        "Starting {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!(
        default_service = %config.booking.default_service_name,
        service_fallback = config.booking.service_fallback,
        admin_enabled = config.admin.token().is_some(),
        "Booking configuration"
    );

    let metrics = Arc::new(Metrics::new()?);
    let db = DatabaseTracingMiddleware::new(metrics.clone());

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.connect_timeout())
        .connect(&config.database.database_url)
        .await?;
    info!("Database pool initialized");

    let schema = Arc::new(PgSchemaManager::new(pool.clone(), db.clone()));
    if config.database.run_migrations {
        schema.ensure_schema().await?;
    }

    let customers = Arc::new(PgCustomerRepository::new(pool.clone(), db.clone()));
    let services = Arc::new(PgServiceRepository::new(pool.clone(), db.clone()));
    let appointments = Arc::new(PgAppointmentRepository::new(pool.clone(), db.clone()));
    let messages = Arc::new(PgMessageRepository::new(pool.clone(), db));

    let state = AppState {
        booking_service: Arc::new(BookingService::new(
            customers.clone(),
            services.clone(),
            appointments.clone(),
            config.booking.clone(),
        )),
        catalog_service: Arc::new(CatalogService::new(
            services.clone(),
            appointments.clone(),
            config.booking.default_service_name.clone(),
        )),
        appointment_service: Arc::new(AppointmentService::new(
            customers.clone(),
            services.clone(),
            appointments.clone(),
        )),
        message_service: Arc::new(MessageService::new(messages, customers.clone())),
        admin_service: Arc::new(AdminService::new(customers, services, appointments, schema)),
        business: BusinessTracingMiddleware::new(metrics.clone()),
        metrics,
        admin_token: config.admin.token().map(Arc::from),
    };

    let app = create_app(
        state,
        HttpLimits {
            request_timeout: config.server.request_timeout(),
            max_request_size: config.server.max_request_size,
        },
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    pool.close().await;
    shutdown_observability().await;

    info!("Server shutdown complete");
    Ok(())
}
