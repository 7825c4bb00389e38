use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use petcare_shared::entities::Entities;
use petcare_shared::report::{RawDatapoint, ReportPayload};
use serde_json::Value;

use crate::util::format::natural_time;

/// Rows kept per pet, newest first.
pub const MAX_ROWS_PER_PET: usize = 25;

pub const PLACEHOLDER: &str = "-";

const TIME_FORMAT: &str = "%d/%m %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatapointEnd {
    Closed(DateTime<FixedOffset>),
    /// The pet has not come back through a flap yet.
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementDatapoint {
    pub start: DateTime<FixedOffset>,
    pub end: DatapointEnd,
    pub duration: TimeDelta,
    pub entry_device_id: Option<u64>,
    pub exit_device_id: Option<u64>,
}

impl MovementDatapoint {
    /// Open trips are measured up to `now`, taken in the trip's own offset.
    pub fn from_raw(raw: &RawDatapoint, now: DateTime<Utc>) -> Self {
        let end = match raw.to {
            Some(to) if !raw.active => DatapointEnd::Closed(to),
            _ => DatapointEnd::Open,
        };

        let duration = match end {
            DatapointEnd::Open => now.with_timezone(raw.from.offset()) - raw.from,
            // a reported duration chrono cannot hold is ignored
            DatapointEnd::Closed(to) => raw
                .duration
                .filter(|secs| secs.is_finite())
                .and_then(|secs| TimeDelta::try_seconds(secs.round() as i64))
                .unwrap_or_else(|| to - raw.from),
        };

        Self {
            start: raw.from,
            end,
            duration,
            entry_device_id: raw.entry_device_id,
            exit_device_id: raw.exit_device_id,
        }
    }

    pub fn is_active(&self) -> bool {
        self.end == DatapointEnd::Open
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub pet: String,
    pub from: DateTime<FixedOffset>,
    /// `None` while the trip is still active.
    pub to: Option<DateTime<FixedOffset>>,
    pub duration: TimeDelta,
    pub entry_device: Option<String>,
    pub exit_device: Option<String>,
}

impl ReportRow {
    pub const COLUMNS: [&'static str; 6] =
        ["pet", "from", "to", "duration", "entry_device", "exit_device"];

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.pet.clone(),
            self.from.format(TIME_FORMAT).to_string(),
            self.to
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            natural_time(self.duration.num_seconds()),
            self.entry_device
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            self.exit_device
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ]
    }
}

/// Reads the payload returned by the report endpoint. A missing `data` key means no pets.
pub fn parse_report(value: Value) -> Result<ReportPayload> {
    if value.is_null() {
        return Ok(ReportPayload::default());
    }
    serde_json::from_value(value).context("Unexpected report payload")
}

/// Turns a report into table rows: per pet, newest trips first, at most
/// [`MAX_ROWS_PER_PET`] each. `entities` and `now` are shared by every row.
pub fn build_report(payload: &ReportPayload, entities: &Entities, now: DateTime<Utc>) -> Vec<ReportRow> {
    let device_name = |id: Option<u64>| {
        id.and_then(|id| entities.device(id))
            .map(|d| d.display_name())
    };

    let mut rows = Vec::new();
    for pet_report in &payload.data {
        let Some(movement) = &pet_report.movement else {
            continue;
        };
        if movement.datapoints.is_empty() {
            continue;
        }

        let pet_name = entities
            .pet(pet_report.pet_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{}", pet_report.pet_id));

        let mut points: Vec<&RawDatapoint> = movement.datapoints.iter().collect();
        // stable, so equal starts keep the order they arrived in
        points.sort_by(|a, b| b.from.cmp(&a.from));
        points.truncate(MAX_ROWS_PER_PET);

        for raw in points {
            let point = MovementDatapoint::from_raw(raw, now);
            rows.push(ReportRow {
                pet: pet_name.clone(),
                from: point.start,
                to: match point.end {
                    DatapointEnd::Closed(to) => Some(to),
                    DatapointEnd::Open => None,
                },
                duration: point.duration,
                entry_device: device_name(point.entry_device_id),
                exit_device: device_name(point.exit_device_id),
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::household;
    use chrono::TimeZone;
    use serde_json::json;

    fn entities() -> Entities {
        serde_json::from_value(household()).unwrap()
    }

    fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    /// Trips starting 1h, 2h, ... `count`h before the reference time, oldest first.
    /// The newest one is still open.
    fn hourly_trips(count: i64) -> Vec<Value> {
        let t = reference_time();
        (1..=count)
            .rev()
            .map(|h| {
                let from = (t - TimeDelta::hours(h)).to_rfc3339();
                if h == 1 {
                    json!({"from": from, "active": true, "exit_device_id": 5})
                } else {
                    let to = (t - TimeDelta::hours(h) + TimeDelta::minutes(30)).to_rfc3339();
                    json!({"from": from, "to": to, "duration": 1800, "entry_device_id": 5, "exit_device_id": 5})
                }
            })
            .collect()
    }

    fn payload(data: Value) -> ReportPayload {
        parse_report(json!({ "data": data })).unwrap()
    }

    #[test]
    fn test_thirty_trips_are_capped_newest_first() {
        let report = payload(json!([{"pet_id": 10, "movement": {"datapoints": hourly_trips(30)}}]));

        let rows = build_report(&report, &entities(), reference_time());

        assert_eq!(rows.len(), 25);
        for pair in rows.windows(2) {
            assert!(pair[0].from > pair[1].from);
        }
        let first = &rows[0];
        assert_eq!(first.from, reference_time() - TimeDelta::hours(1));
        assert_eq!(first.to, None);
        assert_eq!(first.duration, TimeDelta::hours(1));
        assert_eq!(rows[24].from, reference_time() - TimeDelta::hours(25));
    }

    #[test]
    fn test_cap_is_per_pet() {
        let report = payload(json!([
            {"pet_id": 10, "movement": {"datapoints": hourly_trips(30)}},
            {"pet_id": 11, "movement": {"datapoints": hourly_trips(3)}}
        ]));

        let rows = build_report(&report, &entities(), reference_time());

        assert_eq!(rows.iter().filter(|r| r.pet == "Mittens").count(), 25);
        assert_eq!(rows.iter().filter(|r| r.pet == "Rex").count(), 3);
    }

    #[test]
    fn test_empty_or_missing_movement_yields_no_rows() {
        let report = payload(json!([
            {"pet_id": 10, "movement": {"datapoints": []}},
            {"pet_id": 11},
            {"pet_id": 12, "movement": {}}
        ]));

        assert!(build_report(&report, &entities(), reference_time()).is_empty());
        assert!(parse_report(Value::Null).unwrap().data.is_empty());
    }

    #[test]
    fn test_open_trip_duration_uses_trip_offset() {
        let report = payload(json!([{"pet_id": 10, "movement": {"datapoints": [
            {"from": "2024-03-10T13:30:00+02:00", "active": true}
        ]}}]));

        let rows = build_report(&report, &entities(), reference_time());

        // 13:30+02:00 is 11:30Z, half an hour before the reference time
        assert_eq!(rows[0].duration, TimeDelta::minutes(30));
        assert_eq!(rows[0].cells()[1], "10/03 13:30");
        assert_eq!(rows[0].cells()[2], PLACEHOLDER);
        assert_eq!(rows[0].cells()[3], "30min");
    }

    #[test]
    fn test_active_marker_wins_over_end_time() {
        let raw: RawDatapoint = serde_json::from_value(json!({
            "from": "2024-03-10T11:00:00+00:00",
            "to": "2024-03-10T11:10:00+00:00",
            "active": true
        }))
        .unwrap();

        let point = MovementDatapoint::from_raw(&raw, reference_time());
        assert!(point.is_active());
        assert_eq!(point.duration, TimeDelta::hours(1));
    }

    #[test]
    fn test_closed_trip_without_duration_is_derived() {
        let raw: RawDatapoint = serde_json::from_value(json!({
            "from": "2024-03-10T08:00:00+00:00",
            "to": "2024-03-10T09:45:00+00:00"
        }))
        .unwrap();

        let point = MovementDatapoint::from_raw(&raw, reference_time());
        assert_eq!(point.end, DatapointEnd::Closed(raw.to.unwrap()));
        assert_eq!(point.duration, TimeDelta::minutes(105));
    }

    #[test]
    fn test_out_of_range_duration_falls_back_to_end_time() {
        let raw: RawDatapoint = serde_json::from_value(json!({
            "from": "2024-03-10T08:00:00+00:00",
            "to": "2024-03-10T08:10:00+00:00",
            "duration": 1e17
        }))
        .unwrap();

        let point = MovementDatapoint::from_raw(&raw, reference_time());
        assert_eq!(point.duration, TimeDelta::minutes(10));
    }

    #[test]
    fn test_null_datapoints_do_not_hide_other_pets() {
        let report = parse_report(json!({"data": [
            {"pet_id": 10, "movement": {"datapoints": null}},
            {"pet_id": 11, "movement": {"datapoints": [
                {"from": "2024-03-10T08:00:00+00:00", "to": "2024-03-10T08:30:00+00:00", "duration": 1800}
            ]}}
        ]}))
        .unwrap();

        let rows = build_report(&report, &entities(), reference_time());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pet, "Rex");
        assert!(parse_report(json!({"data": null})).unwrap().data.is_empty());
    }

    #[test]
    fn test_devices_and_pets_resolve_with_placeholders() {
        let report = payload(json!([{"pet_id": 99, "movement": {"datapoints": [
            {"from": "2024-03-10T08:00:00+00:00", "to": "2024-03-10T09:00:00+00:00",
             "duration": 3600, "entry_device_id": 5, "exit_device_id": 404}
        ]}}]));

        let rows = build_report(&report, &entities(), reference_time());

        assert_eq!(
            rows[0].cells(),
            vec!["#99", "10/03 08:00", "10/03 09:00", "1h", "Back door", "-"]
        );
    }

    #[test]
    fn test_equal_starts_keep_received_order() {
        let report = payload(json!([{"pet_id": 10, "movement": {"datapoints": [
            {"from": "2024-03-10T08:00:00+00:00", "to": "2024-03-10T08:01:00+00:00", "entry_device_id": 1},
            {"from": "2024-03-10T08:00:00+00:00", "to": "2024-03-10T08:02:00+00:00", "entry_device_id": 5},
            {"from": "2024-03-10T09:00:00+00:00", "to": "2024-03-10T09:01:00+00:00"}
        ]}}]));

        let rows = build_report(&report, &entities(), reference_time());

        assert_eq!(rows[0].from.format("%H").to_string(), "09");
        assert_eq!(rows[1].entry_device.as_deref(), Some("Hub"));
        assert_eq!(rows[2].entry_device.as_deref(), Some("Back door"));
    }
}
