// Repositories module - data access layer

pub mod appointment_repository;
pub mod customer_repository;
pub mod message_repository;
pub mod schema;
pub mod service_repository;


pub use appointment_repository::{AppointmentRepository, PgAppointmentRepository};
pub use customer_repository::{CustomerRepository, PgCustomerRepository};
pub use message_repository::{MessageRepository, PgMessageRepository};
pub use schema::{PgSchemaManager, SchemaManager};
pub use service_repository::{PgServiceRepository, ServiceRepository};

/// Escape `%`, `_` and `\` so user input matches literally inside an ILIKE pattern
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
