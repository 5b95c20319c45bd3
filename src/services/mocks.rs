// Shared repository mocks and fixtures for service tests

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::mock;
use rust_decimal_macros::dec;

use crate::models::{
    Appointment, AppointmentDetails, AppointmentStatus, ClientQuery, ClientSummary,
    ContactLookup, Customer, Message, MessagePriority, MessageType, MessageUpdate,
    NewAppointment, NewCustomer, NewMessage, NewService, RepositoryResult, Service,
    UpsertedCustomer,
};
use crate::repositories::{
    AppointmentRepository, CustomerRepository, MessageRepository, SchemaManager,
    ServiceRepository,
};

mock! {
    pub CustomerStore {}

    #[async_trait]
    impl CustomerRepository for CustomerStore {
        async fn find_by_contact(&self, lookup: &ContactLookup) -> RepositoryResult<Option<Customer>>;
        async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Customer>>;
        async fn create_or_get(&self, customer: NewCustomer) -> RepositoryResult<UpsertedCustomer>;
        async fn count(&self) -> RepositoryResult<i64>;
        async fn count_created_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64>;
        async fn list_clients(
            &self,
            query: &ClientQuery,
        ) -> RepositoryResult<(Vec<ClientSummary>, i64)>;
    }
}

mock! {
    pub ServiceStore {}

    #[async_trait]
    impl ServiceRepository for ServiceStore {
        async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Service>>;
        async fn find_first_available(&self) -> RepositoryResult<Option<Service>>;
        async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Service>>;
        async fn list_active(&self) -> RepositoryResult<Vec<Service>>;
        async fn create(&self, service: NewService) -> RepositoryResult<Service>;
        async fn update(&self, id: i64, service: NewService) -> RepositoryResult<Option<Service>>;
        async fn delete(&self, id: i64) -> RepositoryResult<bool>;
        async fn count(&self) -> RepositoryResult<i64>;
    }
}

mock! {
    pub AppointmentStore {}

    #[async_trait]
    impl AppointmentRepository for AppointmentStore {
        async fn create(&self, appointment: NewAppointment) -> RepositoryResult<Appointment>;
        async fn list_with_details(&self) -> RepositoryResult<Vec<AppointmentDetails>>;
        async fn count(&self) -> RepositoryResult<i64>;
        async fn count_by_status(&self, status: AppointmentStatus) -> RepositoryResult<i64>;
        async fn count_for_service(&self, service_id: i64) -> RepositoryResult<i64>;
    }
}

mock! {
    pub MessageStore {}

    #[async_trait]
    impl MessageRepository for MessageStore {
        async fn create(&self, message: NewMessage) -> RepositoryResult<Message>;
        async fn list(&self, is_read: Option<bool>) -> RepositoryResult<Vec<Message>>;
        async fn mark_read(&self, id: i64) -> RepositoryResult<Option<Message>>;
        async fn update(&self, id: i64, update: MessageUpdate) -> RepositoryResult<Option<Message>>;
        async fn delete(&self, id: i64) -> RepositoryResult<bool>;
        async fn count_unread(&self) -> RepositoryResult<i64>;
    }
}

mock! {
    pub Schema {}

    #[async_trait]
    impl SchemaManager for Schema {
        async fn ensure_schema(&self) -> RepositoryResult<()>;
        async fn ping(&self) -> RepositoryResult<()>;
    }
}

pub fn customer(id: i64, email: &str, phone: &str) -> Customer {
    let now = Utc::now();
    Customer {
        id,
        first_name: "Jan".to_string(),
        last_name: "Kowalski".to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        address: None,
        city: None,
        postal_code: None,
        created_at: now,
        updated_at: now,
    }
}

/// Echo a `NewCustomer` back as a stored row
pub fn stored_customer(id: i64, new: NewCustomer) -> Customer {
    let now = Utc::now();
    Customer {
        id,
        first_name: new.first_name,
        last_name: new.last_name,
        email: new.email,
        phone: new.phone,
        address: new.address,
        city: new.city,
        postal_code: new.postal_code,
        created_at: now,
        updated_at: now,
    }
}

/// Upsert result for a row this call inserted
pub fn inserted_customer(id: i64, new: NewCustomer) -> UpsertedCustomer {
    UpsertedCustomer {
        customer: stored_customer(id, new),
        inserted: true,
    }
}

pub fn service(id: i64, name: &str) -> Service {
    let now = Utc::now();
    Service {
        id,
        name: name.to_string(),
        description: None,
        category: "hydraulika".to_string(),
        price: dec!(150.00),
        duration_minutes: 60,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Echo a `NewService` back as a stored row
pub fn stored_service(id: i64, new: NewService) -> Service {
    let now = Utc::now();
    Service {
        id,
        name: new.name,
        description: new.description,
        category: new.category,
        price: new.price,
        duration_minutes: new.duration_minutes,
        is_active: new.is_active,
        created_at: now,
        updated_at: now,
    }
}

/// Echo a `NewAppointment` back as a stored row
pub fn stored_appointment(id: i64, new: NewAppointment) -> Appointment {
    let now = Utc::now();
    Appointment {
        id,
        customer_id: new.customer_id,
        service_id: new.service_id,
        scheduled_date: new.schedule.date,
        scheduled_time: new.schedule.at,
        status: new.status,
        notes: new.notes,
        created_at: now,
        updated_at: now,
    }
}

pub fn appointment(id: i64, customer_id: i64, service_id: i64) -> Appointment {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let now = Utc::now();
    Appointment {
        id,
        customer_id,
        service_id,
        scheduled_date: date,
        scheduled_time: date.and_hms_opt(10, 0, 0).unwrap(),
        status: AppointmentStatus::Pending,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

/// Echo a `NewMessage` back as a stored, unread row
pub fn stored_message(id: i64, new: NewMessage) -> Message {
    Message {
        id,
        name: new.name,
        email: new.email,
        phone: new.phone,
        subject: new.subject,
        message: new.message,
        message_type: new.message_type,
        is_read: false,
        replied: false,
        priority: new.priority,
        notes: None,
        created_at: Utc::now(),
        read_at: None,
    }
}

pub fn message(id: i64, is_read: bool) -> Message {
    let now = Utc::now();
    Message {
        id,
        name: "Jan Kowalski".to_string(),
        email: "jan@x.pl".to_string(),
        phone: Some("500100200".to_string()),
        subject: None,
        message: "Cieknie kran".to_string(),
        message_type: MessageType::Contact,
        is_read,
        replied: false,
        priority: MessagePriority::Normal,
        notes: None,
        created_at: now,
        read_at: is_read.then_some(now),
    }
}
