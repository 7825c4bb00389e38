use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One notification. The service does not fix the field set, so entries are kept as maps.
pub type NotificationEntry = Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub data: Vec<NotificationEntry>,
}

impl NotificationPayload {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
