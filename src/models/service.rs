use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A service offered by the business (drain cleaning, installations, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_SERVICE_CATEGORY: &str = "general";
pub const DEFAULT_SERVICE_DURATION_MINUTES: i32 = 60;

/// Request model for creating a service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Insert payload for a service with all defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub is_active: bool,
}

impl From<CreateServiceRequest> for NewService {
    fn from(request: CreateServiceRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            description: request.description,
            category: request
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_CATEGORY.to_string()),
            price: request.price.unwrap_or(Decimal::ZERO),
            duration_minutes: request
                .duration_minutes
                .unwrap_or(DEFAULT_SERVICE_DURATION_MINUTES),
            is_active: request.is_active.unwrap_or(true),
        }
    }
}

/// Admin edit of a service; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UpdateServiceRequest {
    /// Merge the edit onto the stored service
    pub fn apply_to(self, current: &Service) -> NewService {
        NewService {
            name: self
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| current.name.clone()),
            description: self.description.or_else(|| current.description.clone()),
            category: self
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| current.category.clone()),
            price: self.price.unwrap_or(current.price),
            duration_minutes: self.duration_minutes.unwrap_or(current.duration_minutes),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}

/// The catalogue installed by the admin seed endpoint
pub fn default_catalog(default_service_name: &str) -> Vec<NewService> {
    let entry = |name: &str, description: &str, category: &str, price: Decimal, minutes: i32| {
        NewService {
            name: name.to_string(),
            description: Some(description.to_string()),
            category: category.to_string(),
            price,
            duration_minutes: minutes,
            is_active: true,
        }
    };

    vec![
        entry(
            default_service_name,
            "Kompleksowe instalacje wodno-kanalizacyjne",
            "installation",
            dec!(150.00),
            120,
        ),
        entry(
            "Emergency Leak Repair",
            "24/7 emergency leak detection and repair",
            "emergency",
            dec!(150.00),
            120,
        ),
        entry(
            "Drain Cleaning",
            "Professional drain cleaning and unclogging",
            "plumbing",
            dec!(95.00),
            90,
        ),
        entry(
            "Toilet Installation",
            "Complete toilet installation and setup",
            "installation",
            dec!(200.00),
            180,
        ),
        entry(
            "Water Heater Repair",
            "Water heater diagnostics and repair",
            "repair",
            dec!(120.00),
            120,
        ),
        entry(
            "Sink Installation",
            "Kitchen and bathroom sink installation",
            "installation",
            dec!(180.00),
            150,
        ),
        entry(
            "Pipe Replacement",
            "Replacement of old or damaged pipes",
            "plumbing",
            dec!(250.00),
            240,
        ),
        entry(
            "Bathroom Renovation",
            "Full bathroom sanitary renovation",
            "sanitary",
            dec!(500.00),
            480,
        ),
        entry(
            "Faucet Repair",
            "Faucet repair and replacement",
            "repair",
            dec!(75.00),
            60,
        ),
        entry(
            "Preventive Maintenance",
            "Regular inspection of the plumbing system",
            "maintenance",
            dec!(100.00),
            90,
        ),
        entry(
            "Sewer Line Inspection",
            "Camera inspection of sewer lines",
            "inspection",
            dec!(175.00),
            120,
        ),
    ]
}
