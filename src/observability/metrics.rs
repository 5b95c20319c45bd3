use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("Failed to encode metrics: {0}")]
    Encoding(String),
}

/// Prometheus metrics for the booking service
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    // HTTP metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub http_requests_in_flight: GaugeVec,

    // Database metrics
    pub database_operations_total: CounterVec,
    pub database_operation_duration_seconds: HistogramVec,

    // Business logic metrics
    pub booking_operations_total: CounterVec,
    pub service_resolutions_total: CounterVec,
}

impl Metrics {
    /// Create a new metrics instance with all required metrics registered
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        info!("Initializing Prometheus metrics");

        let http_requests_total = CounterVec::new(
            Opts::new(
                "http_requests_total",
                "Total number of HTTP requests processed",
            ),
            &["method", "endpoint", "status_code"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "endpoint"],
        )?;

        let http_requests_in_flight = GaugeVec::new(
            Opts::new(
                "http_requests_in_flight",
                "Number of HTTP requests currently being processed",
            ),
            &["method", "endpoint"],
        )?;

        let database_operations_total = CounterVec::new(
            Opts::new(
                "database_operations_total",
                "Total number of database operations",
            ),
            &["operation", "table", "status"],
        )?;

        let database_operation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "database_operation_duration_seconds",
                "Database operation duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
            &["operation", "table"],
        )?;

        let booking_operations_total = CounterVec::new(
            Opts::new(
                "booking_operations_total",
                "Total number of booking, catalogue and admin operations",
            ),
            &["operation", "status"],
        )?;

        let service_resolutions_total = CounterVec::new(
            Opts::new(
                "service_resolutions_total",
                "How booked service names were resolved (exact or fallback)",
            ),
            &["outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(database_operations_total.clone()))?;
        registry.register(Box::new(database_operation_duration_seconds.clone()))?;
        registry.register(Box::new(booking_operations_total.clone()))?;
        registry.register(Box::new(service_resolutions_total.clone()))?;

        info!("Prometheus metrics initialized successfully");

        Ok(Metrics {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            database_operations_total,
            database_operation_duration_seconds,
            booking_operations_total,
            service_resolutions_total,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode all metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    pub fn record_http_request(
        &self,
        method: &str,
        endpoint: &str,
        status_code: u16,
        duration_seconds: f64,
    ) {
        let status_str = status_code.to_string();

        self.http_requests_total
            .with_label_values(&[method, endpoint, &status_str])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, endpoint])
            .observe(duration_seconds);
    }

    pub fn record_database_operation(
        &self,
        operation: &str,
        table: &str,
        success: bool,
        duration_seconds: f64,
    ) {
        let status = if success { "success" } else { "error" };

        self.database_operations_total
            .with_label_values(&[operation, table, status])
            .inc();

        self.database_operation_duration_seconds
            .with_label_values(&[operation, table])
            .observe(duration_seconds);
    }

    /// Record a business operation outcome; `status` is `success`, `rejected` or `error`
    pub fn record_booking_operation(&self, operation: &str, status: &str) {
        self.booking_operations_total
            .with_label_values(&[operation, status])
            .inc();
    }

    pub fn record_service_resolution(&self, fallback: bool) {
        let outcome = if fallback { "fallback" } else { "exact" };
        self.service_resolutions_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn increment_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .inc();
    }

    pub fn decrement_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        assert!(Metrics::new().is_ok());
    }

    #[test]
    fn test_http_request_recording() {
        let metrics = Metrics::new().unwrap();

        metrics.record_http_request("POST", "/api/book", 201, 0.042);
        metrics.record_http_request("GET", "/api/services", 200, 0.008);

        let metrics_text = metrics.encode().unwrap();
        assert!(metrics_text.contains("http_requests_total"));
        assert!(metrics_text.contains("http_request_duration_seconds"));
        assert!(metrics_text.contains("endpoint=\"/api/book\""));
    }

    #[test]
    fn test_database_operation_recording() {
        let metrics = Metrics::new().unwrap();

        metrics.record_database_operation("SELECT", "customers", true, 0.003);
        metrics.record_database_operation("INSERT", "appointments", false, 0.010);

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains("database_operations_total"));
        assert!(encoded.contains("table=\"appointments\""));
    }

    #[test]
    fn test_business_metrics_recording() {
        let metrics = Metrics::new().unwrap();

        metrics.record_booking_operation("book", "success");
        metrics.record_booking_operation("book", "rejected");
        metrics.record_service_resolution(true);

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains("booking_operations_total"));
        assert!(encoded.contains("status=\"rejected\""));
        assert!(encoded.contains("outcome=\"fallback\""));
    }

    #[test]
    fn test_in_flight_requests() {
        let metrics = Metrics::new().unwrap();

        metrics.increment_in_flight("POST", "/api/book");
        metrics.increment_in_flight("POST", "/api/book");
        metrics.decrement_in_flight("POST", "/api/book");

        let value = metrics
            .http_requests_in_flight
            .with_label_values(&["POST", "/api/book"])
            .get();
        assert_eq!(value, 1.0);
    }
}
