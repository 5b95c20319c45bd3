// Services module - business logic layer

pub mod admin_service;
pub mod appointment_service;
pub mod booking_service;
pub mod catalog_service;
pub mod message_service;

#[cfg(test)]
pub(crate) mod mocks;

pub use admin_service::AdminService;
pub use appointment_service::AppointmentService;
pub use booking_service::{BookingOutcome, BookingService};
pub use catalog_service::CatalogService;
pub use message_service::MessageService;
