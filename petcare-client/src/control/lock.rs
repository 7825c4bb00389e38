use tracing::{info, warn};

use super::ControlOutcome;
use crate::error::PetcareError;
use crate::server::{LockMode, PetcareApi};

/// Puts a flap into `mode` and re-reads it to confirm.
///
/// Nothing is sent when `device_id` is unknown or not a flap.
pub async fn set_mode<A: PetcareApi + ?Sized>(
    api: &A,
    device_id: u64,
    mode: LockMode,
) -> Result<ControlOutcome, PetcareError> {
    let device = api
        .fetch_device(device_id)
        .await
        .map_err(PetcareError::remote)?
        .filter(|d| d.device_type().is_lockable())
        .ok_or(PetcareError::DeviceNotFound(device_id))?;

    info!("Setting {} ({}) to '{}'", device.display_name(), device_id, mode);
    let acknowledged = api
        .set_lock_mode(device_id, mode)
        .await
        .map_err(PetcareError::remote)?;

    let state = mode.label().to_string();
    if !acknowledged {
        return Ok(ControlOutcome::Ambiguous {
            name: device.display_name(),
            state,
            reason: "the service did not acknowledge the new mode".to_string(),
        });
    }

    let outcome = match api.fetch_device(device_id).await {
        Ok(Some(current)) if current.lock_mode() == Some(mode) => ControlOutcome::Confirmed {
            name: current.display_name(),
            state,
        },
        Ok(Some(current)) => {
            let seen = current.lock_mode().map_or("unknown", LockMode::label);
            ControlOutcome::Ambiguous {
                name: current.display_name(),
                state,
                reason: format!("the flap still reports '{}'", seen),
            }
        }
        Ok(None) => ControlOutcome::Ambiguous {
            name: device.display_name(),
            state,
            reason: "the flap was missing when re-read".to_string(),
        },
        Err(e) => {
            warn!("Re-reading device {} failed: {:#}", device_id, e);
            ControlOutcome::Ambiguous {
                name: device.display_name(),
                state,
                reason: format!("re-reading the flap failed ({:#})", e),
            }
        }
    };
    Ok(outcome)
}
