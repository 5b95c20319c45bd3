use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{AppointmentStatus, Customer, Service, ValidationError, ValidationResult};

/// A scheduled visit for one customer and one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: i64,
    pub customer_id: i64,
    pub service_id: i64,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for an appointment
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub customer_id: i64,
    pub service_id: i64,
    pub schedule: Schedule,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl NewAppointment {
    /// A freshly booked appointment, always `pending`
    pub fn pending(
        customer_id: i64,
        service_id: i64,
        schedule: Schedule,
        notes: Option<String>,
    ) -> Self {
        Self {
            customer_id,
            service_id,
            schedule,
            status: AppointmentStatus::Pending,
            notes,
        }
    }
}

/// Appointment joined with its customer and service for the admin listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub customer: Customer,
    pub service: Service,
}

/// The scheduled moment of a visit: the bare day plus the combined timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub date: NaiveDate,
    pub at: NaiveDateTime,
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

impl Schedule {
    /// Combine a `YYYY-MM-DD` date and an `HH:MM[:SS]` time into one schedule
    pub fn parse(
        date: &str,
        time: &str,
        date_field: &str,
        time_field: &str,
    ) -> ValidationResult<Self> {
        let date = parse_date(date, date_field)?;
        let time = parse_time(time, time_field)?;
        Ok(Self {
            date,
            at: date.and_time(time),
        })
    }
}

pub fn parse_date(value: &str, field: &str) -> ValidationResult<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        expected: "YYYY-MM-DD".to_string(),
    })
}

pub fn parse_time(value: &str, field: &str) -> ValidationResult<NaiveTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: field.to_string(),
            expected: "HH:MM or HH:MM:SS".to_string(),
        })
}

/// Request model for the secondary appointment creation route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(deserialize_with = "deserialize_id")]
    pub service_id: i64,
    pub scheduled_date: String,
    pub scheduled_time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Accept ids sent either as JSON numbers or as numeric strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {}", text))),
    }
}
