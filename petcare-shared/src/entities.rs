use serde::{Deserialize, Serialize};

use crate::{device::Device, pet::Pet};

/// Snapshot of everything visible to the account, as returned by `/me/start`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub pets: Vec<Pet>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub devices: Vec<Device>,
}

impl Entities {
    pub fn pet(&self, id: u64) -> Option<&Pet> {
        self.pets.iter().find(|p| p.id == id)
    }

    pub fn device(&self, id: u64) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }
}
