use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

use crate::config::BookingConfig;
use crate::models::{
    split_full_name, Appointment, BookingRequest, ContactLookup, Customer, NewAppointment,
    NewCustomer, Schedule, Service, ServiceError, ServiceResult,
};
use crate::repositories::{AppointmentRepository, CustomerRepository, ServiceRepository};

/// What a successful booking produced
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub appointment: Appointment,
    /// A new customer row was inserted for this booking (false when a concurrent
    /// booking inserted the same email first)
    pub customer_created: bool,
    /// The requested service did not exist and another one was booked instead
    pub service_fallback: bool,
}

/// Where the booked customer comes from
enum CustomerResolution {
    Existing(Customer),
    New(NewCustomer),
}

/// Public booking intake: resolve customer and service, then create a pending appointment
pub struct BookingService {
    customers: Arc<dyn CustomerRepository>,
    services: Arc<dyn ServiceRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    config: BookingConfig,
}

impl BookingService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        services: Arc<dyn ServiceRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        config: BookingConfig,
    ) -> Self {
        Self {
            customers,
            services,
            appointments,
            config,
        }
    }

    /// Book an appointment from a form submission.
    ///
    /// Every rejection (bad schedule, no contact method, no services) happens before the
    /// first write. A store failure after the customer insert leaves that customer in place.
    #[instrument(skip(self, request), fields(service = ?request.service))]
    pub async fn book(&self, request: BookingRequest) -> ServiceResult<BookingOutcome> {
        crate::info_with_trace!("Processing booking request");

        let schedule = Schedule::parse(&request.date, &request.time, "date", "time")?;
        let lookup = ContactLookup::new(request.email.as_deref(), request.phone.as_deref());

        let resolution = self.resolve_customer(&request.name, &lookup).await?;
        let (service, service_fallback) = self.resolve_service(request.service.as_deref()).await?;

        let (customer, customer_created) = match resolution {
            CustomerResolution::Existing(customer) => (customer, false),
            CustomerResolution::New(new_customer) => {
                let stored = self.customers.create_or_get(new_customer).await?;
                if stored.inserted {
                    crate::info_with_trace!(customer_id = stored.customer.id, "Created customer");
                } else {
                    crate::info_with_trace!(
                        customer_id = stored.customer.id,
                        "Customer with this email was created concurrently, reusing it"
                    );
                }
                (stored.customer, stored.inserted)
            }
        };

        let appointment = self
            .appointments
            .create(NewAppointment::pending(
                customer.id,
                service.id,
                schedule,
                request.description,
            ))
            .await?;

        crate::info_with_trace!(
            appointment_id = appointment.id,
            customer_id = customer.id,
            service_id = service.id,
            customer_created,
            service_fallback,
            "Booking created"
        );

        Ok(BookingOutcome {
            appointment,
            customer_created,
            service_fallback,
        })
    }

    /// Reuse a customer matching email OR phone; otherwise prepare (but do not insert) a new one
    async fn resolve_customer(
        &self,
        name: &str,
        lookup: &ContactLookup,
    ) -> ServiceResult<CustomerResolution> {
        // An empty lookup can never match, so there is nothing to query
        if lookup.is_empty() {
            crate::warn_with_trace!("Booking rejected: no contact method");
            return Err(ServiceError::Validation {
                message: "At least one contact method (email or phone) is required".to_string(),
            });
        }

        if let Some(existing) = self.customers.find_by_contact(lookup).await? {
            crate::info_with_trace!(customer_id = existing.id, "Reusing existing customer");
            return Ok(CustomerResolution::Existing(existing));
        }

        let full_name = split_full_name(name);
        let email = match &lookup.email {
            Some(email) => email.clone(),
            None => NewCustomer::placeholder_email(
                &self.config.placeholder_email_domain,
                Utc::now(),
            ),
        };

        Ok(CustomerResolution::New(NewCustomer {
            first_name: full_name.first_name,
            last_name: full_name.last_name,
            email,
            phone: lookup.phone.clone().unwrap_or_default(),
            ..NewCustomer::default()
        }))
    }

    /// Exact name match, else the first available service when fallback is enabled
    async fn resolve_service(&self, requested: Option<&str>) -> ServiceResult<(Service, bool)> {
        let name = requested
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.config.default_service_name.as_str());

        if let Some(service) = self.services.find_by_name(name).await? {
            return Ok((service, false));
        }

        if !self.config.service_fallback {
            crate::warn_with_trace!(service = %name, "Booking rejected: unknown service");
            return Err(ServiceError::Validation {
                message: format!("Unknown service: {}", name),
            });
        }

        match self.services.find_first_available().await? {
            Some(service) => {
                crate::warn_with_trace!(
                    requested = %name,
                    booked = %service.name,
                    "Requested service not found, booking first available service"
                );
                Ok((service, true))
            }
            None => {
                crate::error_with_trace!("Booking rejected: no services configured");
                Err(ServiceError::Configuration {
                    message: "No services available".to_string(),
                })
            }
        }
    }
}
