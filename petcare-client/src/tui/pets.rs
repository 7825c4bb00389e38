use petcare_shared::pet::Pet;

use super::table::{Column, render_table};
use crate::util::format::grams;

pub fn pets_table(pets: &[Pet], max_width: Option<usize>) -> String {
    if pets.is_empty() {
        return "No pets found\n".to_string();
    }

    let columns = [
        Column::left("Name"),
        Column::right("Where"),
        Column::right("Change A"),
        Column::right("Change B"),
        Column::right("Lunched"),
        Column::right("ID"),
        Column::right("Household"),
    ];

    let rows: Vec<Vec<String>> = pets
        .iter()
        .map(|pet| {
            let (change_a, change_b, lunched) = match pet.feeding() {
                Some(feeding) => {
                    let (a, b) = feeding.deltas();
                    let at = feeding
                        .at
                        .map(|at| at.format("%d/%m %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    (grams(a), grams(b), at)
                }
                None => ("-".to_string(), "-".to_string(), "-".to_string()),
            };
            vec![
                pet.name.clone(),
                pet.location().to_string(),
                change_a,
                change_b,
                lunched,
                pet.id.to_string(),
                pet.household_id.to_string(),
            ]
        })
        .collect();

    render_table(&columns, &rows, max_width)
}
