#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::net::TcpListener;

use plumbing_booking::{
    config::BookingConfig,
    create_app,
    models::{
        Appointment, AppointmentDetails, AppointmentStatus, ClientQuery, ClientSummary,
        ContactLookup, Customer, Message, MessageUpdate, NewAppointment, NewCustomer,
        NewMessage, NewService, RepositoryResult, Service, UpsertedCustomer,
    },
    observability::{BusinessTracingMiddleware, Metrics},
    repositories::{
        AppointmentRepository, CustomerRepository, MessageRepository, SchemaManager,
        ServiceRepository,
    },
    services::{AdminService, AppointmentService, BookingService, CatalogService, MessageService},
    AppState, HttpLimits,
};

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub const MAX_REQUEST_SIZE: usize = 64 * 1024;

#[derive(Default)]
struct StoreState {
    customers: Vec<Customer>,
    services: Vec<Service>,
    appointments: Vec<Appointment>,
    messages: Vec<Message>,
    next_service_id: i64,
    next_message_id: i64,
}

impl StoreState {
    fn service_id(&mut self) -> i64 {
        self.next_service_id += 1;
        self.next_service_id
    }
}

/// Process-local stand-in for the Postgres repositories, ids assigned in insertion order
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn customers(&self) -> Vec<Customer> {
        self.state.lock().unwrap().customers.clone()
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.state.lock().unwrap().appointments.clone()
    }

    pub fn services(&self) -> Vec<Service> {
        self.state.lock().unwrap().services.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn insert_service(&self, name: &str, is_active: bool) -> Service {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let service = Service {
            id: state.service_id(),
            name: name.to_string(),
            description: None,
            category: "general".to_string(),
            price: rust_decimal::Decimal::new(15000, 2),
            duration_minutes: 60,
            is_active,
            created_at: now,
            updated_at: now,
        };
        state.services.push(service.clone());
        service
    }
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn find_by_contact(&self, lookup: &ContactLookup) -> RepositoryResult<Option<Customer>> {
        let state = self.state.lock().unwrap();
        Ok(state.customers.iter().find(|c| lookup.matches(c)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Customer>> {
        let state = self.state.lock().unwrap();
        Ok(state.customers.iter().find(|c| c.email == email).cloned())
    }

    async fn create_or_get(&self, customer: NewCustomer) -> RepositoryResult<UpsertedCustomer> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.customers.iter().find(|c| c.email == customer.email) {
            return Ok(UpsertedCustomer {
                customer: existing.clone(),
                inserted: false,
            });
        }

        let now = Utc::now();
        let created = Customer {
            id: state.customers.len() as i64 + 1,
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            city: customer.city,
            postal_code: customer.postal_code,
            created_at: now,
            updated_at: now,
        };
        state.customers.push(created.clone());
        Ok(UpsertedCustomer {
            customer: created,
            inserted: true,
        })
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.state.lock().unwrap().customers.len() as i64)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state.customers.iter().filter(|c| c.created_at >= since).count() as i64)
    }

    async fn list_clients(
        &self,
        query: &ClientQuery,
    ) -> RepositoryResult<(Vec<ClientSummary>, i64)> {
        let state = self.state.lock().unwrap();
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut matching: Vec<&Customer> = state
            .customers
            .iter()
            .filter(|c| match &needle {
                Some(needle) => [&c.first_name, &c.last_name, &c.email, &c.phone]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .map(|c| ClientSummary {
                customer: c.clone(),
                appointment_count: state
                    .appointments
                    .iter()
                    .filter(|a| a.customer_id == c.id)
                    .count() as i64,
            })
            .collect();

        Ok((page, total))
    }
}

#[async_trait]
impl ServiceRepository for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Service>> {
        let state = self.state.lock().unwrap();
        Ok(state.services.iter().find(|s| s.name == name).cloned())
    }

    async fn find_first_available(&self) -> RepositoryResult<Option<Service>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .services
            .iter()
            .min_by_key(|s| (!s.is_active, s.id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Service>> {
        let state = self.state.lock().unwrap();
        Ok(state.services.iter().find(|s| s.id == id).cloned())
    }

    async fn list_active(&self) -> RepositoryResult<Vec<Service>> {
        let state = self.state.lock().unwrap();
        let mut active: Vec<Service> = state.services.iter().filter(|s| s.is_active).cloned().collect();
        active.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(active)
    }

    async fn create(&self, service: NewService) -> RepositoryResult<Service> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let created = Service {
            id: state.service_id(),
            name: service.name,
            description: service.description,
            category: service.category,
            price: service.price,
            duration_minutes: service.duration_minutes,
            is_active: service.is_active,
            created_at: now,
            updated_at: now,
        };
        state.services.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, service: NewService) -> RepositoryResult<Option<Service>> {
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state.services.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        stored.name = service.name;
        stored.description = service.description;
        stored.category = service.category;
        stored.price = service.price;
        stored.duration_minutes = service.duration_minutes;
        stored.is_active = service.is_active;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.services.len();
        state.services.retain(|s| s.id != id);
        Ok(state.services.len() < before)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.state.lock().unwrap().services.len() as i64)
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryStore {
    async fn create(&self, appointment: NewAppointment) -> RepositoryResult<Appointment> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let created = Appointment {
            id: state.appointments.len() as i64 + 1,
            customer_id: appointment.customer_id,
            service_id: appointment.service_id,
            scheduled_date: appointment.schedule.date,
            scheduled_time: appointment.schedule.at,
            status: appointment.status,
            notes: appointment.notes,
            created_at: now,
            updated_at: now,
        };
        state.appointments.push(created.clone());
        Ok(created)
    }

    async fn list_with_details(&self) -> RepositoryResult<Vec<AppointmentDetails>> {
        let state = self.state.lock().unwrap();
        let mut details: Vec<AppointmentDetails> = state
            .appointments
            .iter()
            .filter_map(|a| {
                let customer = state.customers.iter().find(|c| c.id == a.customer_id)?;
                let service = state.services.iter().find(|s| s.id == a.service_id)?;
                Some(AppointmentDetails {
                    appointment: a.clone(),
                    customer: customer.clone(),
                    service: service.clone(),
                })
            })
            .collect();
        details.sort_by(|a, b| {
            b.appointment
                .scheduled_date
                .cmp(&a.appointment.scheduled_date)
                .then(b.appointment.id.cmp(&a.appointment.id))
        });
        Ok(details)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.state.lock().unwrap().appointments.len() as i64)
    }

    async fn count_by_status(&self, status: AppointmentStatus) -> RepositoryResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state.appointments.iter().filter(|a| a.status == status).count() as i64)
    }

    async fn count_for_service(&self, service_id: i64) -> RepositoryResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .appointments
            .iter()
            .filter(|a| a.service_id == service_id)
            .count() as i64)
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn create(&self, message: NewMessage) -> RepositoryResult<Message> {
        let mut state = self.state.lock().unwrap();
        state.next_message_id += 1;
        let created = Message {
            id: state.next_message_id,
            name: message.name,
            email: message.email,
            phone: message.phone,
            subject: message.subject,
            message: message.message,
            message_type: message.message_type,
            is_read: false,
            replied: false,
            priority: message.priority,
            notes: None,
            created_at: Utc::now(),
            read_at: None,
        };
        state.messages.push(created.clone());
        Ok(created)
    }

    async fn list(&self, is_read: Option<bool>) -> RepositoryResult<Vec<Message>> {
        let state = self.state.lock().unwrap();
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| is_read.map_or(true, |wanted| m.is_read == wanted))
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(messages)
    }

    async fn mark_read(&self, id: i64) -> RepositoryResult<Option<Message>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.messages.iter_mut().find(|m| m.id == id).map(|m| {
            m.is_read = true;
            m.read_at.get_or_insert_with(Utc::now);
            m.clone()
        }))
    }

    async fn update(&self, id: i64, update: MessageUpdate) -> RepositoryResult<Option<Message>> {
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state.messages.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };

        match update.is_read {
            Some(true) => {
                stored.is_read = true;
                stored.read_at.get_or_insert_with(Utc::now);
            }
            Some(false) => {
                stored.is_read = false;
                stored.read_at = None;
            }
            None => {}
        }
        if let Some(replied) = update.replied {
            stored.replied = replied;
        }
        if let Some(priority) = update.priority {
            stored.priority = priority;
        }
        if update.notes.is_some() {
            stored.notes = update.notes;
        }
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.messages.len();
        state.messages.retain(|m| m.id != id);
        Ok(state.messages.len() < before)
    }

    async fn count_unread(&self) -> RepositoryResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state.messages.iter().filter(|m| !m.is_read).count() as i64)
    }
}

#[async_trait]
impl SchemaManager for InMemoryStore {
    async fn ensure_schema(&self) -> RepositoryResult<()> {
        Ok(())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub addr: SocketAddr,
    pub store: Arc<InMemoryStore>,
    pub metrics: Arc<Metrics>,
}

impl TestEnvironment {
    /// Server over an empty store with fallback enabled and the admin token set
    pub async fn new() -> Self {
        Self::with_config(BookingConfig::default(), Some(ADMIN_TOKEN)).await
    }

    pub async fn with_config(booking: BookingConfig, admin_token: Option<&str>) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));

        let state = AppState {
            booking_service: Arc::new(BookingService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                booking.clone(),
            )),
            catalog_service: Arc::new(CatalogService::new(
                store.clone(),
                store.clone(),
                booking.default_service_name.clone(),
            )),
            appointment_service: Arc::new(AppointmentService::new(
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            message_service: Arc::new(MessageService::new(store.clone(), store.clone())),
            admin_service: Arc::new(AdminService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            business: BusinessTracingMiddleware::new(metrics.clone()),
            metrics: metrics.clone(),
            admin_token: admin_token.map(Arc::from),
        };

        let app = create_app(
            state,
            HttpLimits {
                request_timeout: Duration::from_secs(5),
                max_request_size: MAX_REQUEST_SIZE,
            },
        );

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to serve app");
        });

        Self {
            client: Client::new(),
            base_url,
            addr,
            store,
            metrics,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn seed_services(&self) {
        let response = self
            .client
            .post(self.url("/api/admin/seed"))
            .bearer_auth(ADMIN_TOKEN)
            .send()
            .await
            .expect("Failed to seed services");

        assert_eq!(response.status().as_u16(), 200);
    }
}
