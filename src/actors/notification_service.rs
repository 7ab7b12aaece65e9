use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, warn};

use crate::clients::NotificationClient;
use crate::domain::{Notification, NotificationDraft};
use crate::messages::{NotificationRequest, ServiceResponse};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(u64),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

// =============================================================================
// NOTIFICATION SERVICE
// =============================================================================

/// Owns the admin notification backlog: a bounded FIFO queue where the oldest
/// entry is evicted once `capacity` is reached, plus a broadcast channel for
/// live subscribers.
pub struct NotificationService {
    receiver: mpsc::Receiver<NotificationRequest>,
    queue: VecDeque<Notification>,
    capacity: usize,
    next_id: u64,
    broadcaster: broadcast::Sender<Notification>,
}

impl NotificationService {
    pub fn new(buffer_size: usize, capacity: usize) -> (Self, NotificationClient) {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (broadcaster, _) = broadcast::channel(capacity);
        let service = Self {
            receiver,
            queue: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
            broadcaster,
        };
        let client = NotificationClient::new(sender);
        (service, client)
    }

    #[instrument(name = "notification_service", skip(self), fields(capacity = self.capacity))]
    pub async fn run(mut self) {
        info!("NotificationService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                NotificationRequest::Publish { draft, respond_to } => {
                    self.handle_publish(draft, respond_to);
                }
                NotificationRequest::Recent { window, now, respond_to } => {
                    self.handle_recent(window, now, respond_to);
                }
                NotificationRequest::MarkRead { id, respond_to } => {
                    self.handle_mark_read(id, respond_to);
                }
                NotificationRequest::MarkAllRead { respond_to } => {
                    let mut changed = 0;
                    for notification in self.queue.iter_mut().filter(|n| !n.read) {
                        notification.read = true;
                        changed += 1;
                    }
                    let _ = respond_to.send(Ok(changed));
                }
                NotificationRequest::UnreadCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.queue.iter().filter(|n| !n.read).count()));
                }
                NotificationRequest::Subscribe { respond_to } => {
                    let _ = respond_to.send(Ok(self.broadcaster.subscribe()));
                }
                NotificationRequest::Shutdown => {
                    info!("NotificationService shutting down");
                    break;
                }
                #[cfg(test)]
                NotificationRequest::GetQueueLen { respond_to } => {
                    let _ = respond_to.send(Ok(self.queue.len()));
                }
            }
        }
        info!("NotificationService stopped");
    }

    #[instrument(fields(kind = ?draft.kind), skip(self, draft, respond_to))]
    fn handle_publish(&mut self, draft: NotificationDraft, respond_to: ServiceResponse<Notification, NotificationError>) {
        let notification = Notification {
            id: self.next_id,
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            order_id: draft.order_id,
            read: false,
            created_at: Utc::now(),
        };
        self.next_id += 1;

        if self.queue.len() == self.capacity {
            if let Some(evicted) = self.queue.pop_front() {
                debug!(evicted_id = evicted.id, "Queue full, evicting oldest notification");
            }
        }
        self.queue.push_back(notification.clone());

        // No subscribers is not an error.
        if self.broadcaster.send(notification.clone()).is_err() {
            debug!("No live subscribers");
        }
        info!(notification_id = notification.id, "Notification published");
        let _ = respond_to.send(Ok(notification));
    }

    fn handle_recent(
        &self,
        window: Duration,
        now: DateTime<Utc>,
        respond_to: ServiceResponse<Vec<Notification>, NotificationError>,
    ) {
        // A window reaching past the calendar covers the whole queue.
        let cutoff = now.checked_sub_signed(window);
        let recent = self
            .queue
            .iter()
            .rev()
            .filter(|n| cutoff.map_or(true, |cutoff| n.created_at >= cutoff))
            .cloned()
            .collect();
        let _ = respond_to.send(Ok(recent));
    }

    fn handle_mark_read(&mut self, id: u64, respond_to: ServiceResponse<Notification, NotificationError>) {
        let result = match self.queue.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(notification.clone())
            }
            None => {
                warn!(notification_id = id, "Notification not in queue");
                Err(NotificationError::NotFound(id))
            }
        };
        let _ = respond_to.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationKind;

    fn draft(title: &str) -> NotificationDraft {
        NotificationDraft::new(NotificationKind::NewOrder, title, "details")
    }

    #[tokio::test]
    async fn queue_is_bounded_and_evicts_oldest() {
        let (service, client) = NotificationService::new(10, 3);
        let handle = tokio::spawn(service.run());

        for i in 1..=5 {
            client.publish(draft(&format!("order {i}"))).await.unwrap();
        }
        assert_eq!(client.get_queue_len().await.unwrap(), 3);

        let recent = client.recent(Duration::hours(1), Utc::now()).await.unwrap();
        let ids: Vec<u64> = recent.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);

        client.shutdown().await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn window_filters_old_notifications() {
        let (service, client) = NotificationService::new(10, 10);
        tokio::spawn(service.run());
        client.publish(draft("first")).await.unwrap();

        let future = Utc::now() + Duration::hours(2);
        assert!(client.recent(Duration::hours(1), future).await.unwrap().is_empty());
        assert_eq!(client.recent(Duration::hours(3), future).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn window_past_the_calendar_returns_everything() {
        let (service, client) = NotificationService::new(10, 10);
        tokio::spawn(service.run());
        client.publish(draft("first")).await.unwrap();

        let recent = client.recent(Duration::days(1_000_000_000), Utc::now()).await.unwrap();
        assert_eq!(recent.len(), 1);
        // The service is still serving.
        assert_eq!(client.unread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn read_tracking() {
        let (service, client) = NotificationService::new(10, 10);
        tokio::spawn(service.run());
        let first = client.publish(draft("a")).await.unwrap();
        client.publish(draft("b")).await.unwrap();
        client.publish(draft("c")).await.unwrap();

        assert_eq!(client.unread_count().await.unwrap(), 3);
        assert!(client.mark_read(first.id).await.unwrap().read);
        assert_eq!(client.unread_count().await.unwrap(), 2);
        assert_eq!(client.mark_all_read().await.unwrap(), 2);
        assert_eq!(client.unread_count().await.unwrap(), 0);
        assert_eq!(client.mark_read(99).await, Err(NotificationError::NotFound(99)));
    }

    #[tokio::test]
    async fn subscribers_see_later_notifications() {
        let (service, client) = NotificationService::new(10, 10);
        tokio::spawn(service.run());
        let mut rx = client.subscribe().await.unwrap();

        client
            .publish(NotificationDraft::new(NotificationKind::LowStock, "Low stock", "2 left").for_order("order_1"))
            .await
            .unwrap();
        let seen = rx.recv().await.unwrap();
        assert_eq!(seen.kind, NotificationKind::LowStock);
        assert_eq!(seen.order_id.as_deref(), Some("order_1"));
    }
}
