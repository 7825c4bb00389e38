use tracing::info;

use super::ControlOutcome;
use crate::error::PetcareError;
use crate::server::{PetLocation, PetcareApi};

/// Tells the service where a pet is. A falsy answer may still have been applied.
pub async fn set_position<A: PetcareApi + ?Sized>(
    api: &A,
    pet_id: u64,
    location: PetLocation,
) -> Result<ControlOutcome, PetcareError> {
    let pet = api
        .fetch_pet(pet_id)
        .await
        .map_err(PetcareError::remote)?
        .ok_or(PetcareError::PetNotFound(pet_id))?;

    info!("Setting {} ({}) to {}", pet.name, pet_id, location.label());
    let acknowledged = api
        .set_pet_position(pet_id, location)
        .await
        .map_err(PetcareError::remote)?;

    let state = location.label().to_string();
    if acknowledged {
        Ok(ControlOutcome::Confirmed {
            name: pet.name,
            state,
        })
    } else {
        Ok(ControlOutcome::Ambiguous {
            name: pet.name,
            state,
            reason: "the service did not acknowledge the new position".to_string(),
        })
    }
}
