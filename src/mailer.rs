//! Outgoing customer email.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::{format_rupees, Order, OrderStatus};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MailError {
    #[error("Missing recipient")]
    MissingRecipient,
    #[error("Mail transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn order_confirmation(to: &str, name: &str, order: &Order) -> Self {
        let lines: Vec<String> = order
            .items
            .iter()
            .map(|item| format!("{} x {} = ₹{}", item.quantity, item.name, format_rupees(item.line_total())))
            .collect();
        Self {
            to: to.to_string(),
            subject: format!("Order confirmed: {}", order.order_number),
            body: format!(
                "Hi {},\n\nThanks for your order {}.\n\n{}\n\nTotal: ₹{}",
                name,
                order.order_number,
                lines.join("\n"),
                format_rupees(order.total)
            ),
        }
    }

    pub fn status_update(to: &str, name: &str, order: &Order) -> Self {
        let message = order
            .tracking_history
            .last()
            .map(|entry| entry.message.as_str())
            .unwrap_or_else(|| order.status.tracking_message());
        let subject = match order.status {
            OrderStatus::Cancelled => format!("Order cancelled: {}", order.order_number),
            _ => format!("Order update: {}", order.order_number),
        };
        Self {
            to: to.to_string(),
            subject,
            body: format!("Hi {},\n\n{}.", name, message.trim_end_matches('.')),
        }
    }
}

/// Delivers email. SMTP lives behind this seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

pub type SharedMailer = Arc<dyn Mailer>;

/// Writes each message to the log instead of sending it.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    #[instrument(skip(self, email), fields(to = %email.to))]
    async fn send(&self, email: Email) -> Result<(), MailError> {
        if email.to.trim().is_empty() {
            return Err(MailError::MissingRecipient);
        }
        info!(subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Sends in a background task. Failures are logged, never retried.
pub fn send_in_background(mailer: &SharedMailer, email: Email) {
    let mailer = Arc::clone(mailer);
    tokio::spawn(async move {
        let to = email.to.clone();
        if let Err(e) = mailer.send(email).await {
            warn!(%to, error = %e, "Failed to send email");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::tests::order;

    #[test]
    fn confirmation_lists_order_number_and_total() {
        let o = order(OrderStatus::OrderPlaced);
        let email = Email::order_confirmation("asha@example.com", "Asha", &o);
        assert_eq!(email.subject, "Order confirmed: ORD-1");
        assert!(email.body.contains("Total: ₹500"));
    }

    #[tokio::test]
    async fn log_mailer_requires_recipient() {
        let email = Email::status_update("", "Asha", &order(OrderStatus::Received));
        assert_eq!(LogMailer.send(email).await, Err(MailError::MissingRecipient));
    }
}
