use std::fmt::Display;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a pet was last seen, as reported by the flap it used.
/// The service encodes this as an integer: 1 = inside, 2 = outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Location {
    Inside,
    Outside,
    #[default]
    Unknown,
}

impl From<i64> for Location {
    fn from(value: i64) -> Self {
        match value {
            1 => Location::Inside,
            2 => Location::Outside,
            _ => Location::Unknown,
        }
    }
}

impl From<Location> for i64 {
    fn from(value: Location) -> Self {
        match value {
            Location::Inside => 1,
            Location::Outside => 2,
            Location::Unknown => -1,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Location::Inside => "INSIDE",
            Location::Outside => "OUTSIDE",
            Location::Unknown => "UNKNOWN",
        };
        write!(f, "{}", label)
    }
}

/// Location a pet can be moved to. Unlike [`Location`] there is no unknown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetLocation {
    Inside,
    Outside,
}

impl From<PetLocation> for Location {
    fn from(value: PetLocation) -> Self {
        match value {
            PetLocation::Inside => Location::Inside,
            PetLocation::Outside => Location::Outside,
        }
    }
}

impl PetLocation {
    /// Integer understood by the position endpoint.
    pub fn wire_value(self) -> i64 {
        Location::from(self).into()
    }

    pub fn label(self) -> &'static str {
        match self {
            PetLocation::Inside => "INSIDE",
            PetLocation::Outside => "OUTSIDE",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PetPosition {
    #[serde(rename = "where", default)]
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

/// Latest bowl reading. `change` holds the weight delta of both bowls in grams.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Feeding {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub change: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<FixedOffset>>,
}

impl Feeding {
    /// Deltas of bowl A and bowl B. Missing bowls read as zero.
    pub fn deltas(&self) -> (f64, f64) {
        let a = self.change.first().copied().unwrap_or_default();
        let b = self.change.get(1).copied().unwrap_or_default();
        (a, b)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PetStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<PetPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeding: Option<Feeding>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub id: u64,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub household_id: u64,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub status: PetStatus,
    /// Fields this client does not interpret, kept for raw output.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Pet {
    pub fn location(&self) -> Location {
        self.status
            .activity
            .as_ref()
            .map(|a| a.location)
            .unwrap_or_default()
    }

    pub fn feeding(&self) -> Option<&Feeding> {
        self.status.feeding.as_ref()
    }
}
