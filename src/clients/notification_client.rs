use chrono::{DateTime, Duration, Utc};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, instrument};

use crate::actors::NotificationError;
use crate::domain::{Notification, NotificationDraft};
use crate::messages::NotificationRequest;

/// Client for the NotificationService with macro-generated methods.
#[derive(Clone)]
pub struct NotificationClient {
    sender: mpsc::Sender<NotificationRequest>,
}

impl NotificationClient {
    pub fn new(sender: mpsc::Sender<NotificationRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), NotificationError> {
        info!("Sending shutdown");
        self.sender
            .send(NotificationRequest::Shutdown)
            .await
            .map_err(|_| NotificationError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(NotificationClient => fn publish(draft: NotificationDraft) -> Notification as NotificationRequest::Publish, Error = NotificationError);
client_method!(NotificationClient => fn recent(window: Duration, now: DateTime<Utc>) -> Vec<Notification> as NotificationRequest::Recent, Error = NotificationError);
client_method!(NotificationClient => fn mark_read(id: u64) -> Notification as NotificationRequest::MarkRead, Error = NotificationError);
client_method!(NotificationClient => fn mark_all_read() -> usize as NotificationRequest::MarkAllRead, Error = NotificationError);
client_method!(NotificationClient => fn unread_count() -> usize as NotificationRequest::UnreadCount, Error = NotificationError);
client_method!(NotificationClient => fn subscribe() -> broadcast::Receiver<Notification> as NotificationRequest::Subscribe, Error = NotificationError);

// Test-only method for internal state inspection
#[cfg(test)]
client_method!(NotificationClient => fn get_queue_len() -> usize as NotificationRequest::GetQueueLen, Error = NotificationError);
