use chrono::{DateTime, Duration, Utc};
use tokio::sync::{broadcast, oneshot};

use crate::domain::{Notification, NotificationDraft};
use crate::actors::NotificationError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enum for the notification service. Each variant includes
/// parameters and a oneshot channel for responses.
#[derive(Debug)]
pub enum NotificationRequest {
    Publish {
        draft: NotificationDraft,
        respond_to: ServiceResponse<Notification, NotificationError>,
    },
    Recent {
        window: Duration,
        now: DateTime<Utc>,
        respond_to: ServiceResponse<Vec<Notification>, NotificationError>,
    },
    MarkRead {
        id: u64,
        respond_to: ServiceResponse<Notification, NotificationError>,
    },
    MarkAllRead {
        respond_to: ServiceResponse<usize, NotificationError>,
    },
    UnreadCount {
        respond_to: ServiceResponse<usize, NotificationError>,
    },
    Subscribe {
        respond_to: ServiceResponse<broadcast::Receiver<Notification>, NotificationError>,
    },
    Shutdown,
    #[cfg(test)]
    GetQueueLen {
        respond_to: ServiceResponse<usize, NotificationError>,
    },
}
