use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::{Config, SystemError};
use crate::actor_framework::{Entity, ResourceActor};
use crate::actors::NotificationService;
use crate::clients::{
    CartClient, NotificationClient, OrderClient, ProductClient, PromoClient, ReviewClient, UserClient, VendorClient,
};
use crate::domain::{Cart, Order, Product, PromoCode, Review, Role, User, UserCreate, Vendor};
use crate::mailer::SharedMailer;

/// Id generator producing `<prefix>_1`, `<prefix>_2`, ...
fn id_sequence(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
}

fn spawn_store<T: Entity<Id = String>>(
    buffer: usize,
    prefix: &'static str,
    handles: &mut Vec<JoinHandle<()>>,
) -> crate::actor_framework::ResourceClient<T> {
    let (actor, client) = ResourceActor::<T>::new(buffer, id_sequence(prefix));
    handles.push(tokio::spawn(actor.run()));
    client
}

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct StoreSystem {
    pub user_client: UserClient,
    pub product_client: ProductClient,
    pub promo_client: PromoClient,
    pub review_client: ReviewClient,
    pub vendor_client: VendorClient,
    pub cart_client: CartClient,
    pub order_client: OrderClient,
    pub notification_client: NotificationClient,
    handles: Vec<JoinHandle<()>>,
}

impl StoreSystem {
    /// Starts every actor. Must be called inside a tokio runtime.
    pub fn new(config: &Config, mailer: SharedMailer) -> Self {
        let buffer = config.actor_buffer;
        let mut handles = Vec::new();

        let (notifications, notification_client) = NotificationService::new(buffer, config.notification_capacity);
        handles.push(tokio::spawn(notifications.run()));

        let user_client = UserClient::new(spawn_store::<User>(buffer, "user", &mut handles));
        let product_client = ProductClient::new(spawn_store::<Product>(buffer, "product", &mut handles));
        let promo_client = PromoClient::new(spawn_store::<PromoCode>(buffer, "promo", &mut handles));
        let vendor_client = VendorClient::new(spawn_store::<Vendor>(buffer, "vendor", &mut handles));
        let review_client = ReviewClient::new(
            spawn_store::<Review>(buffer, "review", &mut handles),
            product_client.clone(),
            notification_client.clone(),
        );
        let cart_client = CartClient::new(spawn_store::<Cart>(buffer, "cart", &mut handles), product_client.clone());
        let order_client = OrderClient::new(
            spawn_store::<Order>(buffer, "order", &mut handles),
            user_client.clone(),
            product_client.clone(),
            promo_client.clone(),
            cart_client.clone(),
            notification_client.clone(),
            mailer,
            config.pricing,
        );

        info!(actors = handles.len(), "Store system started");
        Self {
            user_client,
            product_client,
            promo_client,
            review_client,
            vendor_client,
            cart_client,
            order_client,
            notification_client,
            handles,
        }
    }

    /// Creates the configured admin account unless that email is taken.
    pub async fn bootstrap_admin(&self, config: &Config) -> Result<Option<User>, SystemError> {
        let Some(seed) = &config.admin else {
            return Ok(None);
        };
        if let Some(existing) = self.user_client.find_by_email(seed.email.clone()).await? {
            if !existing.is_admin() {
                warn!(email = %existing.email, "Admin email belongs to a customer account");
            }
            return Ok(None);
        }
        let admin = self
            .user_client
            .register(UserCreate {
                name: "Administrator".to_string(),
                email: seed.email.clone(),
                password: seed.password.clone(),
                phone: None,
                role: Role::Admin,
            })
            .await?;
        info!(user_id = %admin.id, "Admin account created");
        Ok(Some(admin))
    }

    /// Stops the notification service, closes every store channel and waits
    /// for the actor tasks to finish.
    pub async fn shutdown(self, timeout: Duration) -> Result<(), SystemError> {
        info!("Shutting down system...");
        if let Err(e) = self.notification_client.shutdown().await {
            warn!(error = %e, "Notification service already stopped");
        }

        // Stores stop once every sender is gone.
        let handles = self.handles;
        drop(self.order_client);
        drop(self.cart_client);
        drop(self.review_client);
        drop(self.vendor_client);
        drop(self.promo_client);
        drop(self.product_client);
        drop(self.user_client);
        drop(self.notification_client);

        let joined = tokio::time::timeout(timeout, async move {
            for handle in handles {
                if let Err(e) = handle.await {
                    error!("Actor task failed: {:?}", e);
                    return Err(SystemError::ActorTask(e.to_string()));
                }
            }
            Ok(())
        })
        .await;

        match joined {
            Ok(result) => {
                result?;
                info!("System shutdown complete.");
                Ok(())
            }
            Err(_) => {
                error!("Actors did not stop in time");
                Err(SystemError::ShutdownTimeout)
            }
        }
    }
}
