use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    Appointment, AppointmentDetails, CreateAppointmentRequest, NewAppointment, NewCustomer,
    Schedule, ServiceError, ServiceResult, Validate,
};
use crate::repositories::{AppointmentRepository, CustomerRepository, ServiceRepository};

/// Appointment listing and the structured create endpoint used by the admin panel
pub struct AppointmentService {
    customers: Arc<dyn CustomerRepository>,
    services: Arc<dyn ServiceRepository>,
    appointments: Arc<dyn AppointmentRepository>,
}

impl AppointmentService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        services: Arc<dyn ServiceRepository>,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self {
            customers,
            services,
            appointments,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_with_details(&self) -> ServiceResult<Vec<AppointmentDetails>> {
        let appointments = self.appointments.list_with_details().await?;
        crate::info_with_trace!("Found {} appointments", appointments.len());
        Ok(appointments)
    }

    /// Create an appointment for an explicit service id. The customer is matched on
    /// email only and created when missing.
    #[instrument(skip(self, request), fields(service_id = request.service_id))]
    pub async fn create(&self, request: CreateAppointmentRequest) -> ServiceResult<Appointment> {
        crate::info_with_trace!("Creating appointment");

        request.validate()?;
        let schedule = Schedule::parse(
            &request.scheduled_date,
            &request.scheduled_time,
            "scheduled_date",
            "scheduled_time",
        )?;

        let service = match self.services.find_by_id(request.service_id).await? {
            Some(service) => service,
            None => {
                crate::warn_with_trace!("Appointment rejected: service not found");
                return Err(ServiceError::ServiceNotFound {
                    id: request.service_id,
                });
            }
        };

        let email = request.email.trim();
        let customer = match self.customers.find_by_email(email).await? {
            Some(customer) => customer,
            None => {
                self.customers
                    .create_or_get(NewCustomer {
                        first_name: request.first_name.trim().to_string(),
                        last_name: request.last_name.trim().to_string(),
                        email: email.to_string(),
                        phone: request.phone.trim().to_string(),
                        address: request.address,
                        city: request.city,
                        postal_code: request.postal_code,
                    })
                    .await?
                    .customer
            }
        };

        let appointment = self
            .appointments
            .create(NewAppointment::pending(
                customer.id,
                service.id,
                schedule,
                request.notes,
            ))
            .await?;

        crate::info_with_trace!(
            appointment_id = appointment.id,
            customer_id = customer.id,
            "Appointment created successfully"
        );
        Ok(appointment)
    }
}
