use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// What [`TokenStore::persist`] did to the files on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRotation {
    /// No primary file existed; it was written, no backup made.
    Created,
    /// The primary file already held this token; nothing was written.
    Unchanged,
    /// The previous token was copied to the backup, then replaced.
    Rotated,
}

/// Primary token file plus the backup holding the token it replaced.
#[derive(Debug, Clone)]
pub struct TokenStore {
    primary: PathBuf,
    backup: PathBuf,
}

impl TokenStore {
    /// `~/.petcare.token` gets the backup `~/.petcare.old_token`.
    pub fn new(primary: PathBuf) -> Self {
        let backup = primary.with_extension("old_token");
        Self { primary, backup }
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn backup(&self) -> &Path {
        &self.backup
    }

    /// Token in the primary file, `None` when missing or blank.
    pub fn read(&self) -> Result<Option<String>> {
        if !self.primary.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.primary)
            .with_context(|| format!("Failed to read token file {:?}", self.primary))?;
        let token = contents.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }

    pub fn persist(&self, token: &str) -> Result<TokenRotation> {
        if !self.primary.exists() {
            write_atomic(&self.primary, token)?;
            info!("Token written to {:?}", self.primary);
            return Ok(TokenRotation::Created);
        }

        let existing = fs::read_to_string(&self.primary)
            .with_context(|| format!("Failed to read token file {:?}", self.primary))?;
        if existing.trim() == token {
            debug!("Token unchanged, leaving {:?} as is", self.primary);
            return Ok(TokenRotation::Unchanged);
        }

        fs::copy(&self.primary, &self.backup)
            .with_context(|| format!("Failed to back up token to {:?}", self.backup))?;
        write_atomic(&self.primary, token)?;
        info!(
            "Token rotated, previous token kept in {:?}",
            self.backup
        );
        Ok(TokenRotation::Rotated)
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).context("Failed to create token directory")?;

    let mut tmp = NamedTempFile::new_in(dir).context("Failed to create temp token file")?;
    tmp.write_all(contents.as_bytes())?;

    #[cfg(unix)]
    {
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    tmp.persist(path)
        .with_context(|| format!("Failed to write token file {:?}", path))?;
    Ok(())
}
