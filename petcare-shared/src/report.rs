use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Aggregate report for a household, one entry per pet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportPayload {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub data: Vec<PetReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetReport {
    pub pet_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<Movement>,
    /// feeding, drinking and whatever else the service aggregates
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Movement {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub datapoints: Vec<RawDatapoint>,
}

/// A trip through a flap as the service reports it.
///
/// Open trips carry `active: true` and usually no `to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDatapoint {
    pub from: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<FixedOffset>>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_device_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_device_id: Option<u64>,
}
