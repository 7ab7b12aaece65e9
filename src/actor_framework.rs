use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any stored record must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    /// Short name used in logs and error messages ("product", "order", ...)
    const KIND: &'static str;

    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    fn id(&self) -> &Self::Id;

    /// Construct the full entity from the store-assigned ID and the creation params
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, String>;

    /// Key that must be unique across the store. Checked on create, update and action.
    fn unique_key(&self) -> Option<String> {
        None
    }

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;
    fn on_delete(&self) -> Result<(), String> {
        Ok(())
    }

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;
}

/// Errors surfaced by the store itself, independent of the entity kind.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    Duplicate(String),
    #[error("{0}")]
    Rejected(String),
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Predicate evaluated inside the actor against every stored item.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: Option<Filter<T>>,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<T>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns every record of one entity kind. Requests are handled one at a time,
/// so each hook sees a consistent store and check-then-mutate is atomic.
///
/// Hooks run against a copy of the record; the stored value is only replaced
/// when the hook succeeds.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self), fields(kind = T::KIND))]
    pub async fn run(mut self) {
        info!("Store starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items = self
                        .store
                        .values()
                        .filter(|item| filter.as_ref().map_or(true, |f| f(item)))
                        .cloned()
                        .collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
            }
        }
        info!(remaining = self.store.len(), "Store stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Rejected)?;
        item.on_create().map_err(FrameworkError::Rejected)?;
        self.ensure_unique(&item)?;
        debug!(id = %id, "Created");
        self.store.insert(id.clone(), item);
        Ok(id)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let mut item = self.lookup(&id)?.clone();
        item.on_update(patch).map_err(FrameworkError::Rejected)?;
        self.ensure_unique(&item)?;
        self.store.insert(id, item.clone());
        Ok(item)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<T, FrameworkError> {
        self.lookup(&id)?.on_delete().map_err(FrameworkError::Rejected)?;
        self.store
            .remove(&id)
            .ok_or_else(|| FrameworkError::NotFound(format!("{} {}", T::KIND, id)))
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        let mut item = self.lookup(&id)?.clone();
        let result = item.handle_action(action).map_err(|e| {
            debug!(id = %id, reason = %e, "Action rejected");
            FrameworkError::Rejected(e)
        })?;
        self.ensure_unique(&item)?;
        self.store.insert(id, item);
        Ok(result)
    }

    fn lookup(&self, id: &T::Id) -> Result<&T, FrameworkError> {
        self.store
            .get(id)
            .ok_or_else(|| FrameworkError::NotFound(format!("{} {}", T::KIND, id)))
    }

    fn ensure_unique(&self, item: &T) -> Result<(), FrameworkError> {
        let Some(key) = item.unique_key() else {
            return Ok(());
        };
        let clash = self
            .store
            .values()
            .any(|other| other.id() != item.id() && other.unique_key().as_deref() == Some(key.as_str()));
        if clash {
            warn!(key = %key, "Unique key clash");
            return Err(FrameworkError::Duplicate(format!("{} {}", T::KIND, key)));
        }
        Ok(())
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

// Manual impl: derive would require `T: Clone` on the handle itself.
impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::List { filter: None, respond_to }).await
    }

    pub async fn find(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<T>, FrameworkError> {
        let filter: Filter<T> = Box::new(filter);
        self.call(|respond_to| ResourceRequest::List { filter: Some(filter), respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    struct Bouquet {
        id: String,
        name: String,
        stems: u32,
    }

    #[derive(Debug)]
    struct BouquetCreate {
        name: String,
        stems: u32,
    }

    #[derive(Debug)]
    struct BouquetPatch {
        name: Option<String>,
    }

    #[derive(Debug)]
    enum BouquetAction {
        Pluck(u32),
    }

    impl Entity for Bouquet {
        const KIND: &'static str = "bouquet";
        type Id = String;
        type CreateParams = BouquetCreate;
        type Patch = BouquetPatch;
        type Action = BouquetAction;
        type ActionResult = u32;

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create_params(id: String, params: BouquetCreate) -> Result<Self, String> {
            if params.name.is_empty() {
                return Err("name required".to_string());
            }
            Ok(Self { id, name: params.name, stems: params.stems })
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.name.to_lowercase())
        }

        fn on_update(&mut self, patch: BouquetPatch) -> Result<(), String> {
            if let Some(name) = patch.name {
                self.name = name;
            }
            Ok(())
        }

        fn handle_action(&mut self, action: BouquetAction) -> Result<u32, String> {
            match action {
                BouquetAction::Pluck(n) => {
                    // Mutate first so a rejection proves the copy was discarded.
                    self.name.push('!');
                    if n > self.stems {
                        return Err(format!("only {} stems", self.stems));
                    }
                    self.stems -= n;
                    Ok(self.stems)
                }
            }
        }
    }

    fn spawn_store() -> ResourceClient<Bouquet> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("bouquet_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = spawn_store();

        let id = client
            .create(BouquetCreate { name: "Roses".into(), stems: 12 })
            .await
            .unwrap();
        assert_eq!(id, "bouquet_1");

        let left = client.perform_action(id.clone(), BouquetAction::Pluck(5)).await.unwrap();
        assert_eq!(left, 7);

        let bouquet = client.get(id.clone()).await.unwrap().unwrap();
        assert_eq!(bouquet.stems, 7);
    }

    #[tokio::test]
    async fn test_rejected_action_leaves_item_unchanged() {
        let client = spawn_store();
        let id = client
            .create(BouquetCreate { name: "Lilies".into(), stems: 3 })
            .await
            .unwrap();

        let err = client.perform_action(id.clone(), BouquetAction::Pluck(4)).await.unwrap_err();
        assert_eq!(err, FrameworkError::Rejected("only 3 stems".into()));

        let bouquet = client.get(id).await.unwrap().unwrap();
        assert_eq!(bouquet.name, "Lilies");
        assert_eq!(bouquet.stems, 3);
    }

    #[tokio::test]
    async fn test_unique_key_enforced_on_create_and_update() {
        let client = spawn_store();
        client.create(BouquetCreate { name: "Tulips".into(), stems: 1 }).await.unwrap();
        let other = client.create(BouquetCreate { name: "Orchids".into(), stems: 1 }).await.unwrap();

        let dup = client.create(BouquetCreate { name: "TULIPS".into(), stems: 2 }).await;
        assert!(matches!(dup, Err(FrameworkError::Duplicate(_))));

        let renamed = client
            .update(other.clone(), BouquetPatch { name: Some("tulips".into()) })
            .await;
        assert!(matches!(renamed, Err(FrameworkError::Duplicate(_))));
        assert_eq!(client.get(other).await.unwrap().unwrap().name, "Orchids");
    }

    #[tokio::test]
    async fn test_find_delete_and_missing_items() {
        let client = spawn_store();
        client.create(BouquetCreate { name: "Daisies".into(), stems: 20 }).await.unwrap();
        let small = client.create(BouquetCreate { name: "Peonies".into(), stems: 2 }).await.unwrap();

        let big = client.find(|b: &Bouquet| b.stems > 10).await.unwrap();
        assert_eq!(big.len(), 1);
        assert_eq!(big[0].name, "Daisies");

        let removed = client.delete(small.clone()).await.unwrap();
        assert_eq!(removed.name, "Peonies");
        assert_eq!(client.list().await.unwrap().len(), 1);

        let missing = client.delete(small).await;
        assert_eq!(missing, Err(FrameworkError::NotFound("bouquet bouquet_2".into())));

        let invalid = client.create(BouquetCreate { name: String::new(), stems: 1 }).await;
        assert_eq!(invalid, Err(FrameworkError::Rejected("name required".into())));
    }
}
