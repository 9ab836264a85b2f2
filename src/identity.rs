//! Local Identity
//!
//! The display name used when posting to the community feed. It is kept in
//! a single-line file under the user's local data directory, read once at
//! startup and passed explicitly to whatever needs it.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name used when nothing has been saved
pub const ANONYMOUS: &str = "anon";

/// File name holding the saved username
const USERNAME_FILE: &str = "username";

/// Username persisted on this machine
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    path: PathBuf,
}

impl LocalIdentity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_local_dir>/gameverse/username`, or `./.gameverse/username`
    pub fn default_location() -> Self {
        let dir = dirs::data_local_dir()
            .map(|p| p.join("gameverse"))
            .unwrap_or_else(|| PathBuf::from(".gameverse"));
        Self::new(dir.join(USERNAME_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved name, or `"anon"` if the file is missing or blank
    pub fn load(&self) -> String {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let name = content.trim();
                if name.is_empty() {
                    ANONYMOUS.to_string()
                } else {
                    name.to_string()
                }
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = ?self.path, error = %e, "Could not read username");
                }
                ANONYMOUS.to_string()
            }
        }
    }

    pub fn save(&self, name: &str) -> Result<(), IdentityError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IdentityError::Empty);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IdentityError::Io {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }

        std::fs::write(&self.path, format!("{}\n", name)).map_err(|e| IdentityError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        tracing::info!(username = %name, "Username saved");
        Ok(())
    }
}

/// Resolve the username once: explicit override first, then the saved file
pub fn resolve_username(override_name: Option<&str>, identity: &LocalIdentity) -> String {
    match override_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => identity.load(),
    }
}

/// Identity persistence errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Username cannot be empty")]
    Empty,

    #[error("Failed to write {path:?}: {error}")]
    Io { path: PathBuf, error: String },
}
