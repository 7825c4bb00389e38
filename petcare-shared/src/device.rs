use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hardware family, derived from the service's `product_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum DeviceType {
    Hub,
    Repeater,
    PetFlap,
    Feeder,
    Programmer,
    CatFlap,
    FeederLite,
    Felaqua,
    Unknown(u32),
}

impl From<u32> for DeviceType {
    fn from(value: u32) -> Self {
        match value {
            1 => DeviceType::Hub,
            2 => DeviceType::Repeater,
            3 => DeviceType::PetFlap,
            4 => DeviceType::Feeder,
            5 => DeviceType::Programmer,
            6 => DeviceType::CatFlap,
            7 => DeviceType::FeederLite,
            8 => DeviceType::Felaqua,
            other => DeviceType::Unknown(other),
        }
    }
}

impl From<DeviceType> for u32 {
    fn from(value: DeviceType) -> Self {
        match value {
            DeviceType::Hub => 1,
            DeviceType::Repeater => 2,
            DeviceType::PetFlap => 3,
            DeviceType::Feeder => 4,
            DeviceType::Programmer => 5,
            DeviceType::CatFlap => 6,
            DeviceType::FeederLite => 7,
            DeviceType::Felaqua => 8,
            DeviceType::Unknown(other) => other,
        }
    }
}

/// A device listed without a `product_id`.
impl Default for DeviceType {
    fn default() -> Self {
        DeviceType::Unknown(0)
    }
}

impl DeviceType {
    /// Only flaps expose a locking mode.
    pub fn is_lockable(&self) -> bool {
        matches!(self, DeviceType::PetFlap | DeviceType::CatFlap)
    }
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceType::Hub => write!(f, "Hub"),
            DeviceType::Repeater => write!(f, "Repeater"),
            DeviceType::PetFlap => write!(f, "Pet Flap"),
            DeviceType::Feeder => write!(f, "Feeder"),
            DeviceType::Programmer => write!(f, "Programmer"),
            DeviceType::CatFlap => write!(f, "Cat Flap"),
            DeviceType::FeederLite => write!(f, "Feeder Lite"),
            DeviceType::Felaqua => write!(f, "Felaqua"),
            DeviceType::Unknown(id) => write!(f, "Unknown ({})", id),
        }
    }
}

/// Locking modes a flap can be put in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    Locked,
    LockedIn,
    LockedOut,
    Unlocked,
}

impl LockMode {
    /// Value of the `locking` field on the device control endpoint.
    pub fn wire_value(self) -> i64 {
        match self {
            LockMode::Unlocked => 0,
            LockMode::LockedIn => 1,
            LockMode::LockedOut => 2,
            LockMode::Locked => 3,
        }
    }

    /// Curfew modes (4 and above) have no counterpart here.
    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(LockMode::Unlocked),
            1 => Some(LockMode::LockedIn),
            2 => Some(LockMode::LockedOut),
            3 => Some(LockMode::Locked),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LockMode::Locked => "locked",
            LockMode::LockedIn => "locked in",
            LockMode::LockedOut => "locked out",
            LockMode::Unlocked => "unlocked",
        }
    }
}

impl Display for LockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Locking {
    #[serde(default)]
    pub mode: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locking: Option<Locking>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    pub id: u64,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub household_id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub product_id: DeviceType,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub status: DeviceStatus,
    /// Fields this client does not interpret, kept for raw output.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn device_type(&self) -> DeviceType {
        self.product_id
    }

    /// Name shown to the user; unnamed devices fall back to their type.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.product_id.to_string(),
        }
    }

    /// Current lock mode, `None` for non-flaps or modes outside [`LockMode`].
    pub fn lock_mode(&self) -> Option<LockMode> {
        if !self.product_id.is_lockable() {
            return None;
        }
        self.status
            .locking
            .as_ref()
            .and_then(|l| LockMode::from_wire(l.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flap(mode: i64) -> Device {
        serde_json::from_value(json!({
            "id": 5,
            "household_id": 7,
            "name": "Back door",
            "serial_number": "H010-0123456",
            "product_id": 6,
            "status": {"locking": {"mode": mode}, "online": true}
        }))
        .unwrap()
    }

    #[test]
    fn test_flap_lock_mode() {
        assert_eq!(flap(2).lock_mode(), Some(LockMode::LockedOut));
        assert_eq!(flap(3).lock_mode(), Some(LockMode::Locked));
        // curfew
        assert_eq!(flap(4).lock_mode(), None);
    }

    #[test]
    fn test_hub_is_not_lockable() {
        let hub: Device = serde_json::from_value(json!({
            "id": 1,
            "household_id": 7,
            "product_id": 1,
            "status": {"locking": {"mode": 1}}
        }))
        .unwrap();
        assert!(!hub.device_type().is_lockable());
        assert_eq!(hub.lock_mode(), None);
        assert_eq!(hub.display_name(), "Hub");
    }

    #[test]
    fn test_unknown_product_round_trips() {
        let t = DeviceType::from(42);
        assert_eq!(t, DeviceType::Unknown(42));
        assert_eq!(u32::from(t), 42);
        assert_eq!(t.to_string(), "Unknown (42)");
    }

    #[test]
    fn test_lock_mode_wire_values() {
        for mode in [
            LockMode::Locked,
            LockMode::LockedIn,
            LockMode::LockedOut,
            LockMode::Unlocked,
        ] {
            assert_eq!(LockMode::from_wire(mode.wire_value()), Some(mode));
        }
    }

    #[test]
    fn test_sparse_device_still_parses() {
        let device: Device = serde_json::from_value(json!({
            "id": 9,
            "household_id": null,
            "status": null
        }))
        .unwrap();
        assert_eq!(device.household_id, 0);
        assert_eq!(device.device_type(), DeviceType::Unknown(0));
        assert_eq!(device.display_name(), "Unknown (0)");
        assert_eq!(device.lock_mode(), None);
    }

    #[test]
    fn test_extra_fields_are_kept() {
        let device = flap(0);
        let value = serde_json::to_value(&device).unwrap();
        assert_eq!(value["status"]["online"], json!(true));
        assert_eq!(value["product_id"], json!(6));
    }
}
