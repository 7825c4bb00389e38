use std::path::PathBuf;

use thiserror::Error;

use crate::auth::TOKEN_ENV_VAR;

/// Failures a command reports to the operator.
///
/// An unconfirmed mutation is not in here: control operations return
/// [`crate::control::ControlOutcome::Ambiguous`] for that.
#[derive(Debug, Error)]
pub enum PetcareError {
    #[error(
        "no token found!\n  checked in:\n    · --token\n    · {} env var\n    · {}\n\n  run `petcare token -u <email> -p <password>` to get one",
        TOKEN_ENV_VAR,
        .token_file.display()
    )]
    NoCredential { token_file: PathBuf },

    #[error("device {0} not found or not a lockable flap")]
    DeviceNotFound(u64),

    #[error("pet {0} not found")]
    PetNotFound(u64),

    #[error("remote call failed: {0:#}")]
    RemoteCallFailed(anyhow::Error),
}

impl PetcareError {
    pub fn remote(err: anyhow::Error) -> Self {
        PetcareError::RemoteCallFailed(err)
    }
}
