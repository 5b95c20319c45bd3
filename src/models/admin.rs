use serde::{Deserialize, Serialize};

/// Dashboard counters for the admin panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_clients: i64,
    pub total_services: i64,
    pub total_appointments: i64,
    pub pending_appointments: i64,
    pub confirmed_appointments: i64,
    /// Customers created since midnight UTC seven days ago
    pub recent_clients: i64,
}
