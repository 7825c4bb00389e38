use std::fmt;

use tracing::{debug, warn};

mod token_store;

pub use token_store::{TokenRotation, TokenStore};

use crate::error::PetcareError;

pub const TOKEN_ENV_VAR: &str = "PETCARE_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Flag,
    Env,
    File,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Flag => write!(f, "--token"),
            CredentialSource::Env => write!(f, "{} env var", TOKEN_ENV_VAR),
            CredentialSource::File => write!(f, "token file"),
        }
    }
}

/// The bearer token used for this invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
}

impl Credential {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct CredentialResolver {
    store: TokenStore,
}

impl CredentialResolver {
    pub fn new(store: TokenStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Flag, then [`TOKEN_ENV_VAR`], then the token file. First non-empty value wins.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<Credential, PetcareError> {
        let env = std::env::var(TOKEN_ENV_VAR).ok();
        self.resolve_with_env(explicit, env.as_deref())
    }

    pub fn resolve_with_env(
        &self,
        explicit: Option<&str>,
        env: Option<&str>,
    ) -> Result<Credential, PetcareError> {
        let candidates = [
            (CredentialSource::Flag, non_empty(explicit)),
            (CredentialSource::Env, non_empty(env)),
        ];
        if let Some((source, Some(token))) = candidates.into_iter().find(|(_, t)| t.is_some()) {
            debug!("Using token from {}", source);
            return Ok(Credential { token, source });
        }

        match self.store.read() {
            Ok(Some(token)) => {
                debug!("Using token from {:?}", self.store.primary());
                return Ok(Credential {
                    token,
                    source: CredentialSource::File,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable token file: {:#}", e),
        }

        Err(PetcareError::NoCredential {
            token_file: self.store.primary().to_path_buf(),
        })
    }

    /// Stores a freshly issued token, rotating the old one into the backup.
    pub fn persist(&self, token: &str) -> anyhow::Result<TokenRotation> {
        self.store.persist(token)
    }
}
