use anyhow::{Context, Result};
use petcare_shared::notification::{NotificationEntry, NotificationPayload};
use serde_json::Value;

/// Notifications flattened into a table. Every row has one cell per column;
/// `None` marks a field the entry did not have.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl NotificationTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn parse_notifications(value: Option<Value>) -> Result<NotificationPayload> {
    match value {
        None | Some(Value::Null) => Ok(NotificationPayload::default()),
        Some(value) => serde_json::from_value(value).context("Unexpected notification payload"),
    }
}

/// Union of field names over all entries, in first-seen order.
pub fn discover_columns(entries: &[NotificationEntry]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for key in entries.iter().flat_map(|entry| entry.keys()) {
        if !columns.iter().any(|c| c == key) {
            columns.push(key.clone());
        }
    }
    columns
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn build_notifications(payload: &NotificationPayload) -> NotificationTable {
    let columns = discover_columns(&payload.data);

    let rows: Vec<Vec<Option<String>>> = payload
        .data
        .iter()
        .map(|entry| {
            columns
                .iter()
                .map(|column| entry.get(column).map(render_value))
                .collect::<Vec<_>>()
        })
        .collect();

    NotificationTable { columns, rows }
}
