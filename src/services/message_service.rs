use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    split_full_name, ContactRequest, Message, MessageInbox, MessageUpdate, NewCustomer,
    NewMessage, ServiceError, ServiceResult, Validate, DEFAULT_CONTACT_SUBJECT,
};
use crate::repositories::{CustomerRepository, MessageRepository};

/// Contact form intake and the admin message inbox
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    customers: Arc<dyn CustomerRepository>,
}

impl MessageService {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        customers: Arc<dyn CustomerRepository>,
    ) -> Self {
        Self {
            messages,
            customers,
        }
    }

    /// Store a contact form submission.
    ///
    /// With `create_customer` set, the sender is also registered as a customer unless
    /// the email is already known. That happens after the message is stored.
    #[instrument(skip(self, request), fields(create_customer = request.create_customer))]
    pub async fn submit_contact(&self, request: ContactRequest) -> ServiceResult<Message> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            crate::warn_with_trace!(missing = ?missing, "Contact form rejected");
            return Err(ServiceError::Validation {
                message: format!("Missing required fields: {}", missing.join(", ")),
            });
        }
        request.validate()?;

        let field = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();
        let name = field(&request.name);
        let email = field(&request.email);
        let phone = field(&request.phone);

        let message = self
            .messages
            .create(NewMessage {
                name: name.clone(),
                email: email.clone(),
                phone: Some(phone.clone()),
                subject: Some(
                    request
                        .subject
                        .as_deref()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .unwrap_or(DEFAULT_CONTACT_SUBJECT)
                        .to_string(),
                ),
                message: field(&request.message),
                message_type: request.message_type.unwrap_or_default(),
                priority: request.priority.unwrap_or_default(),
            })
            .await?;

        crate::info_with_trace!(message_id = message.id, "Contact message received");

        if request.create_customer && self.customers.find_by_email(&email).await?.is_none() {
            let full_name = split_full_name(&name);
            let stored = self
                .customers
                .create_or_get(NewCustomer {
                    first_name: full_name.first_name,
                    last_name: full_name.last_name,
                    email,
                    phone,
                    address: request.address,
                    city: request.city,
                    postal_code: request.postal_code,
                })
                .await?;
            crate::info_with_trace!(
                customer_id = stored.customer.id,
                inserted = stored.inserted,
                "Registered customer from contact form"
            );
        }

        Ok(message)
    }

    /// Messages newest first, optionally filtered by read state
    #[instrument(skip(self))]
    pub async fn inbox(&self, is_read: Option<bool>) -> ServiceResult<MessageInbox> {
        let (messages, unread) =
            tokio::try_join!(self.messages.list(is_read), self.messages.count_unread())?;

        Ok(MessageInbox {
            total: messages.len(),
            messages,
            unread,
        })
    }

    /// Fetch a message for reading; opening it marks it read
    #[instrument(skip(self), fields(id = %id))]
    pub async fn open(&self, id: i64) -> ServiceResult<Message> {
        self.messages
            .mark_read(id)
            .await?
            .ok_or(ServiceError::MessageNotFound { id })
    }

    #[instrument(skip(self, update), fields(id = %id))]
    pub async fn update(&self, id: i64, update: MessageUpdate) -> ServiceResult<Message> {
        if update.is_empty() {
            return Err(ServiceError::Validation {
                message: "No changes supplied".to_string(),
            });
        }

        let message = self
            .messages
            .update(id, update)
            .await?
            .ok_or(ServiceError::MessageNotFound { id })?;

        crate::info_with_trace!(message_id = id, replied = message.replied, "Message updated");
        Ok(message)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.messages.delete(id).await? {
            return Err(ServiceError::MessageNotFound { id });
        }

        crate::info_with_trace!(message_id = id, "Message deleted");
        Ok(())
    }
}
