//! In-memory [`PetcareApi`] used by the unit tests.

use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use petcare_shared::device::Locking;
use serde_json::{Value, json};

use crate::server::{Entities, LockMode, PetLocation, PetcareApi};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetToken,
    FetchEntities,
    FetchReport(u64, Option<u64>),
    FetchNotifications,
    SetLock(u64, LockMode),
    SetPosition(u64, PetLocation),
    Close,
}

#[derive(Default)]
pub struct MockApi {
    pub entities: Mutex<Entities>,
    pub token: Option<String>,
    pub report: Value,
    pub notifications: Option<Value>,
    /// Service answers the lock request without echoing the mode.
    pub lock_nack: bool,
    /// Service acknowledges the lock but the flap keeps its old mode.
    pub lock_ignored: bool,
    pub lock_error: bool,
    pub position_nack: bool,
    /// Every entity fetch after the first one fails.
    pub refetch_error: bool,
    pub fail_close: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub fn with_entities(entities: Value) -> Self {
        Self {
            entities: Mutex::new(serde_json::from_value(entities).unwrap()),
            ..Default::default()
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn close_calls(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Close).count()
    }

    pub fn mutating_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::SetLock(..) | Call::SetPosition(..)))
            .count()
    }
}

#[async_trait]
impl PetcareApi for MockApi {
    async fn get_token(&self, _email: &str, _password: &str) -> Result<String> {
        self.record(Call::GetToken);
        self.token.clone().ok_or_else(|| anyhow!("invalid email or password"))
    }

    async fn fetch_entities(&self) -> Result<Entities> {
        let earlier = self
            .calls()
            .iter()
            .any(|c| *c == Call::FetchEntities);
        self.record(Call::FetchEntities);
        if self.refetch_error && earlier {
            return Err(anyhow!("connection reset"));
        }
        Ok(self.entities.lock().unwrap().clone())
    }

    async fn fetch_report(&self, household_id: u64, pet_id: Option<u64>) -> Result<Value> {
        self.record(Call::FetchReport(household_id, pet_id));
        Ok(self.report.clone())
    }

    async fn fetch_notifications(&self) -> Result<Option<Value>> {
        self.record(Call::FetchNotifications);
        Ok(self.notifications.clone())
    }

    async fn set_lock_mode(&self, device_id: u64, mode: LockMode) -> Result<bool> {
        self.record(Call::SetLock(device_id, mode));
        if self.lock_error {
            return Err(anyhow!("503 Service Unavailable"));
        }
        if !self.lock_ignored {
            let mut entities = self.entities.lock().unwrap();
            if let Some(device) = entities.devices.iter_mut().find(|d| d.id == device_id) {
                device.status.locking = Some(Locking {
                    mode: mode.wire_value(),
                    ..Default::default()
                });
            }
        }
        Ok(!self.lock_nack)
    }

    async fn set_pet_position(&self, pet_id: u64, location: PetLocation) -> Result<bool> {
        self.record(Call::SetPosition(pet_id, location));
        Ok(!self.position_nack)
    }

    async fn close_session(&self) -> Result<()> {
        self.record(Call::Close);
        if self.fail_close {
            return Err(anyhow!("already closed"));
        }
        Ok(())
    }
}

/// One flap (id 5, "Back door"), one hub (id 1), two pets (ids 10 and 11).
pub fn household() -> Value {
    json!({
        "devices": [
            {"id": 1, "household_id": 7, "name": "Hub", "product_id": 1},
            {
                "id": 5, "household_id": 7, "name": "Back door",
                "serial_number": "H010-0123456", "product_id": 6,
                "status": {"locking": {"mode": 0}}
            }
        ],
        "pets": [
            {"id": 10, "household_id": 7, "name": "Mittens",
             "status": {"activity": {"where": 1}}},
            {"id": 11, "household_id": 7, "name": "Rex",
             "status": {"feeding": {"change": [-4.5, 2.0], "at": "2024-03-01T08:15:00+00:00"}}}
        ]
    })
}
