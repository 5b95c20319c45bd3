use serde::{Deserialize, Serialize};

use super::Appointment;

/// Shown to the visitor after a successful booking
pub const BOOKING_CREATED_MESSAGE: &str = "Rezerwacja została pomyślnie utworzona";
/// Shown to the visitor when the booking failed on our side
pub const BOOKING_FAILED_MESSAGE: &str = "Wystąpił błąd podczas tworzenia rezerwacji";

/// Booking form submission from the public site
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    pub appointment: Appointment,
    pub message: String,
}

impl BookingResponse {
    pub fn created(appointment: Appointment) -> Self {
        Self {
            success: true,
            appointment,
            message: BOOKING_CREATED_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FullName {
    pub first_name: String,
    pub last_name: String,
}

/// First whitespace-separated token is the first name, the rest is the last name
pub fn split_full_name(name: &str) -> FullName {
    let mut parts = name.split_whitespace();
    let first_name = parts.next().unwrap_or_default().to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");
    FullName {
        first_name,
        last_name,
    }
}
