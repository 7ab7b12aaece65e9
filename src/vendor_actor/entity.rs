use chrono::Utc;

use super::actions::{VendorAction, VendorActionResult};
use crate::actor_framework::Entity;
use crate::domain::{Vendor, VendorCreate, VendorPatch};

impl Entity for Vendor {
    const KIND: &'static str = "vendor";

    type Id = String;
    type CreateParams = VendorCreate;
    type Patch = VendorPatch;
    type Action = VendorAction;
    type ActionResult = VendorActionResult;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: VendorCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            email: params.email.trim().to_lowercase(),
            phone: params.phone,
            address: params.address,
            specialties: params.specialties,
            is_active: true,
            commission_rate: params.commission_rate,
            created_at: Utc::now(),
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn on_create(&mut self) -> Result<(), String> {
        self.check_invariants()
    }

    fn on_update(&mut self, patch: VendorPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = email.trim().to_lowercase();
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(specialties) = patch.specialties {
            self.specialties = specialties;
        }
        if let Some(rate) = patch.commission_rate {
            self.commission_rate = rate;
        }
        self.check_invariants()
    }

    fn handle_action(&mut self, action: VendorAction) -> Result<VendorActionResult, String> {
        match action {
            VendorAction::ToggleActive => {
                self.is_active = !self.is_active;
                Ok(VendorActionResult::ToggleActive(self.is_active))
            }
        }
    }
}
