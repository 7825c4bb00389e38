use petcare_shared::device::Device;

use super::table::{Column, render_table};

pub fn devices_table(devices: &[Device], max_width: Option<usize>) -> String {
    if devices.is_empty() {
        return "No devices found\n".to_string();
    }

    let columns = [
        Column::right("ID"),
        Column::right("Household"),
        Column::left("Name"),
        Column::left("Type"),
        Column::left("Serial"),
    ];

    let rows: Vec<Vec<String>> = devices
        .iter()
        .map(|dev| {
            vec![
                dev.id.to_string(),
                dev.household_id.to_string(),
                dev.display_name(),
                dev.device_type().to_string(),
                dev.serial_number
                    .clone()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    render_table(&columns, &rows, max_width)
}
