// Re-export all model types
pub use self::admin::*;
pub use self::appointment::*;
pub use self::booking::*;
pub use self::customer::*;
pub use self::enums::*;
pub use self::errors::*;
pub use self::message::*;
pub use self::service::*;
pub use self::validation::*;

mod admin;
mod appointment;
mod booking;
mod customer;
mod enums;
mod errors;
mod message;
mod service;
mod validation;
