use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Vendor, VendorCreate, VendorPatch};
use crate::vendor_actor::{VendorAction, VendorActionResult, VendorError};

/// Client for interacting with the Vendor actor.
#[derive(Clone)]
pub struct VendorClient {
    inner: ResourceClient<Vendor>,
}

impl_basic_client!(VendorClient, Vendor, VendorError, vendor);

impl VendorClient {
    #[instrument(skip(self, params), fields(email = %params.email))]
    pub async fn create_vendor(&self, params: VendorCreate) -> Result<Vendor, VendorError> {
        debug!("Sending request");
        let id = self.inner.create(params).await.map_err(VendorError::from)?;
        self.get_vendor(id.clone()).await?.ok_or(VendorError::NotFound(id))
    }

    #[instrument(skip(self, patch))]
    pub async fn update_vendor(&self, id: String, patch: VendorPatch) -> Result<Vendor, VendorError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(VendorError::from)
    }

    #[instrument(skip(self))]
    pub async fn toggle_active(&self, id: String) -> Result<bool, VendorError> {
        match self.inner.perform_action(id, VendorAction::ToggleActive).await {
            Ok(VendorActionResult::ToggleActive(active)) => Ok(active),
            Err(e) => Err(e.into()),
        }
    }
}
