use rust_decimal::Decimal;

use super::{
    BookingRequest, ContactRequest, CreateAppointmentRequest, CreateServiceRequest, Schedule,
    UpdateServiceRequest, ValidationError, ValidationResult,
};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

/// Validation constants
pub const MAX_SERVICE_NAME_LENGTH: usize = 200;
pub const MAX_CATEGORY_LENGTH: usize = 100;
pub const MAX_PERSON_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 120;
pub const MAX_PHONE_LENGTH: usize = 20;
pub const MAX_ADDRESS_LENGTH: usize = 200;
pub const MAX_POSTAL_CODE_LENGTH: usize = 20;
pub const MAX_SUBJECT_LENGTH: usize = 200;
pub const MAX_PRICE: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 2); // 9999999.99
pub const MIN_DURATION_MINUTES: i32 = 1;
pub const MAX_DURATION_MINUTES: i32 = 7 * 24 * 60;

impl Validate for BookingRequest {
    fn validate(&self) -> ValidationResult<()> {
        Schedule::parse(&self.date, &self.time, "date", "time")?;
        Ok(())
    }
}

impl Validate for CreateServiceRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_service_name(&self.name)?;
        validate_optional_length("category", self.category.as_deref(), MAX_CATEGORY_LENGTH)?;
        if let Some(price) = &self.price {
            validate_service_price(price)?;
        }
        if let Some(minutes) = self.duration_minutes {
            validate_duration_minutes(minutes)?;
        }
        Ok(())
    }
}

impl Validate for UpdateServiceRequest {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_service_name(name)?;
        }
        validate_optional_length("category", self.category.as_deref(), MAX_CATEGORY_LENGTH)?;
        if let Some(price) = &self.price {
            validate_service_price(price)?;
        }
        if let Some(minutes) = self.duration_minutes {
            validate_duration_minutes(minutes)?;
        }
        Ok(())
    }
}

/// Format and length checks; presence of the required fields is checked separately
impl Validate for ContactRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_optional_length("name", self.name.as_deref(), MAX_SERVICE_NAME_LENGTH)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        validate_optional_length("phone", self.phone.as_deref(), MAX_PHONE_LENGTH)?;
        validate_optional_length("subject", self.subject.as_deref(), MAX_SUBJECT_LENGTH)?;
        validate_optional_length("address", self.address.as_deref(), MAX_ADDRESS_LENGTH)?;
        validate_optional_length("city", self.city.as_deref(), MAX_PERSON_NAME_LENGTH)?;
        validate_optional_length(
            "postal_code",
            self.postal_code.as_deref(),
            MAX_POSTAL_CODE_LENGTH,
        )?;
        Ok(())
    }
}

impl Validate for CreateAppointmentRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_person_name("first_name", &self.first_name)?;
        validate_person_name("last_name", &self.last_name)?;
        validate_email(&self.email)?;
        validate_optional_length("phone", Some(self.phone.as_str()), MAX_PHONE_LENGTH)?;
        validate_optional_length("address", self.address.as_deref(), MAX_ADDRESS_LENGTH)?;
        validate_optional_length("city", self.city.as_deref(), MAX_PERSON_NAME_LENGTH)?;
        validate_optional_length(
            "postal_code",
            self.postal_code.as_deref(),
            MAX_POSTAL_CODE_LENGTH,
        )?;
        if self.service_id <= 0 {
            return Err(ValidationError::InvalidValue {
                field: "service_id".to_string(),
                value: self.service_id.to_string(),
                reason: "Service id must be positive".to_string(),
            });
        }
        Schedule::parse(
            &self.scheduled_date,
            &self.scheduled_time,
            "scheduled_date",
            "scheduled_time",
        )?;
        Ok(())
    }
}

/// Validate service name
pub fn validate_service_name(name: &str) -> ValidationResult<()> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "name".to_string(),
        });
    }

    if trimmed.chars().count() > MAX_SERVICE_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max_length: MAX_SERVICE_NAME_LENGTH,
            actual_length: trimmed.chars().count(),
        });
    }

    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: name.to_string(),
            reason: "Contains invalid control characters".to_string(),
        });
    }

    Ok(())
}

/// Validate service price
pub fn validate_service_price(price: &Decimal) -> ValidationResult<()> {
    if (price.is_sign_negative() && !price.is_zero()) || *price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: "0".to_string(),
            max: MAX_PRICE.to_string(),
            value: price.to_string(),
        });
    }

    if price.normalize().scale() > 2 {
        return Err(ValidationError::InvalidValue {
            field: "price".to_string(),
            value: price.to_string(),
            reason: "Price cannot have more than 2 decimal places".to_string(),
        });
    }

    Ok(())
}

/// Validate estimated service duration
pub fn validate_duration_minutes(minutes: i32) -> ValidationResult<()> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(ValidationError::OutOfRange {
            field: "duration_minutes".to_string(),
            min: MIN_DURATION_MINUTES.to_string(),
            max: MAX_DURATION_MINUTES.to_string(),
            value: minutes.to_string(),
        });
    }

    Ok(())
}

/// Validate a required first or last name
pub fn validate_person_name(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    validate_optional_length(field, Some(value), MAX_PERSON_NAME_LENGTH)
}

/// Basic email sanity check, not a full RFC 5322 parser
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "email".to_string(),
        });
    }

    validate_optional_length("email", Some(trimmed), MAX_EMAIL_LENGTH)?;

    match trimmed.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !trimmed.contains(char::is_whitespace) =>
        {
            Ok(())
        }
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            expected: "local@domain".to_string(),
        }),
    }
}

/// Validate an optional free-text field against a maximum length
pub fn validate_optional_length(
    field: &str,
    value: Option<&str>,
    max_length: usize,
) -> ValidationResult<()> {
    if let Some(value) = value {
        let length = value.trim().chars().count();
        if length > max_length {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max_length,
                actual_length: length,
            });
        }
    }

    Ok(())
}
