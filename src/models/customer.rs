use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer of the plumbing business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of the email upsert: the stored row and whether this call inserted it
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UpsertedCustomer {
    #[sqlx(flatten)]
    pub customer: Customer,
    pub inserted: bool,
}

/// Insert payload for a customer that does not exist yet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

impl NewCustomer {
    /// Synthesize a unique stand-in address for customers who only left a phone number.
    ///
    /// The `email` column is non-null and uniquely indexed, so the address combines the
    /// creation time with a random suffix.
    pub fn placeholder_email(domain: &str, now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "temp-{}-{}@{}",
            now.timestamp_millis(),
            suffix.get(0..8).unwrap_or("00000000"),
            domain
        )
    }
}

/// Contact details used to find an existing customer.
///
/// Empty values are dropped so they never take part in the match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactLookup {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactLookup {
    pub fn new(email: Option<&str>, phone: Option<&str>) -> Self {
        Self {
            email: normalize_contact(email),
            phone: normalize_contact(phone),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }

    /// Whether a stored customer satisfies the OR match on email/phone
    pub fn matches(&self, customer: &Customer) -> bool {
        let email_match = self
            .email
            .as_deref()
            .is_some_and(|email| customer.email == email);
        let phone_match = self
            .phone
            .as_deref()
            .is_some_and(|phone| customer.phone == phone);
        email_match || phone_match
    }
}

/// Trim a contact field, mapping blank input to `None`
pub fn normalize_contact(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Customer entry in the admin client list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClientSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub customer: Customer,
    pub appointment_count: i64,
}

/// Query for the admin client list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientQuery {
    pub search: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

pub const DEFAULT_CLIENTS_PER_PAGE: u32 = 20;
pub const MAX_CLIENTS_PER_PAGE: u32 = 100;

impl ClientQuery {
    pub fn new(search: Option<String>, page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            search: search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_CLIENTS_PER_PAGE)
                .clamp(1, MAX_CLIENTS_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// One page of the admin client list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPage {
    pub clients: Vec<ClientSummary>,
    pub total: i64,
    pub pages: i64,
    pub current_page: u32,
    pub per_page: u32,
}

impl ClientPage {
    pub fn new(clients: Vec<ClientSummary>, total: i64, query: &ClientQuery) -> Self {
        let per_page = i64::from(query.per_page);
        Self {
            clients,
            total,
            pages: (total + per_page - 1) / per_page,
            current_page: query.page,
            per_page: query.per_page,
        }
    }
}
