use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    default_catalog, CreateServiceRequest, NewService, Service, ServiceError, ServiceResult,
    UpdateServiceRequest, Validate,
};
use crate::repositories::{AppointmentRepository, ServiceRepository};

/// Service catalogue: listing, creating, editing and seeding bookable services
pub struct CatalogService {
    repository: Arc<dyn ServiceRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    default_service_name: String,
}

impl CatalogService {
    pub fn new(
        repository: Arc<dyn ServiceRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        default_service_name: String,
    ) -> Self {
        Self {
            repository,
            appointments,
            default_service_name,
        }
    }

    /// Active services ordered by name
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> ServiceResult<Vec<Service>> {
        let services = self.repository.list_active().await?;
        crate::info_with_trace!("Found {} active services", services.len());
        Ok(services)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: i64) -> ServiceResult<Service> {
        match self.repository.find_by_id(id).await? {
            Some(service) => Ok(service),
            None => {
                crate::warn_with_trace!("Service not found");
                Err(ServiceError::ServiceNotFound { id })
            }
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateServiceRequest) -> ServiceResult<Service> {
        crate::info_with_trace!("Creating new service");

        request.validate()?;

        let service = self.repository.create(NewService::from(request)).await?;

        crate::info_with_trace!(service_id = service.id, "Service created successfully");
        Ok(service)
    }

    /// Apply a partial edit. Renaming onto another service's name is rejected.
    #[instrument(skip(self, request), fields(id = %id))]
    pub async fn update(&self, id: i64, request: UpdateServiceRequest) -> ServiceResult<Service> {
        request.validate()?;

        let current = self.get(id).await?;
        let changes = request.apply_to(&current);

        if changes.name != current.name {
            if let Some(existing) = self.repository.find_by_name(&changes.name).await? {
                if existing.id != id {
                    crate::warn_with_trace!(name = %changes.name, "Service name already taken");
                    return Err(ServiceError::Validation {
                        message: "Service with this name already exists".to_string(),
                    });
                }
            }
        }

        let updated = self
            .repository
            .update(id, changes)
            .await?
            .ok_or(ServiceError::ServiceNotFound { id })?;

        crate::info_with_trace!(service_id = id, "Service updated successfully");
        Ok(updated)
    }

    /// Delete a service that no appointment refers to
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.get(id).await?;

        let booked = self.appointments.count_for_service(id).await?;
        if booked > 0 {
            crate::warn_with_trace!(appointments = booked, "Service still has appointments");
            return Err(ServiceError::Validation {
                message: format!(
                    "Cannot delete service with existing appointments ({})",
                    booked
                ),
            });
        }

        if !self.repository.delete(id).await? {
            return Err(ServiceError::ServiceNotFound { id });
        }

        crate::info_with_trace!(service_id = id, "Service deleted successfully");
        Ok(())
    }

    /// Insert the default catalogue, skipping names that already exist.
    /// Returns how many services were created.
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self) -> ServiceResult<usize> {
        let mut created = 0;

        for service in default_catalog(&self.default_service_name) {
            if self.repository.find_by_name(&service.name).await?.is_some() {
                continue;
            }
            self.repository.create(service).await?;
            created += 1;
        }

        crate::info_with_trace!(created, "Seeded default services");
        Ok(created)
    }
}
