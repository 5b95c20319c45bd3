use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{normalize_contact, MessagePriority, MessageType};

pub const DEFAULT_CONTACT_SUBJECT: &str = "Wiadomość z formularza kontaktowego";

pub const CONTACT_RECEIVED_MESSAGE: &str =
    "Dziękujemy za wiadomość! Odpowiemy najszybciej jak to możliwe.";

/// A contact form submission waiting in the admin inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub message_type: MessageType,
    pub is_read: bool,
    pub replied: bool,
    pub priority: MessagePriority,
    /// Admin notes, never set by the sender
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Public contact form body.
///
/// The four required fields are optional here so that every missing one can be
/// reported at once instead of failing on the first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message_type: Option<MessageType>,
    #[serde(default)]
    pub priority: Option<MessagePriority>,
    /// Also register the sender as a customer when the email is new
    #[serde(default)]
    pub create_customer: bool,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl ContactRequest {
    /// Names of required fields that are absent or blank, in form order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| normalize_contact(value.as_deref()).is_none())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Reply to a stored contact form submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub message_id: i64,
}

impl ContactResponse {
    pub fn received(message: &Message) -> Self {
        Self {
            success: true,
            message: CONTACT_RECEIVED_MESSAGE.to_string(),
            message_id: message.id,
        }
    }
}

/// Insert payload for a message
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub message_type: MessageType,
    pub priority: MessagePriority,
}

/// Admin-side changes to a message; absent fields stay as they are
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageUpdate {
    #[serde(default)]
    pub is_read: Option<bool>,
    #[serde(default)]
    pub replied: Option<bool>,
    #[serde(default)]
    pub priority: Option<MessagePriority>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MessageUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_read.is_none()
            && self.replied.is_none()
            && self.priority.is_none()
            && self.notes.is_none()
    }
}

/// Admin inbox listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageInbox {
    pub messages: Vec<Message>,
    pub total: usize,
    /// Unread messages in the whole inbox, regardless of the filter
    pub unread: i64,
}
