//! Durable storage for the session token.
//!
//! Every backend stores a single value under the key `"token"`. An absent
//! key means the client is anonymous.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::StorageError;

/// Key the credential is stored under, in every backend
pub const TOKEN_KEY: &str = "token";

/// Session file name in the data directory
pub const SESSION_FILE: &str = "session.json";

/// Keyring service name
const SERVICE_NAME: &str = "blogdesk";

/// Durable key-value storage holding the raw token string.
pub trait TokenStorage: Send + Sync {
    /// Read the persisted token, `Ok(None)` when nothing is stored
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persist `token`, replacing any previous value
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the persisted token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

// ============================================================================
// File
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    token: Option<String>,
}

/// Token persisted as `{"token": "..."}` in a JSON file
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `<dir>/session.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let file: SessionFile = serde_json::from_str(&contents)?;
        Ok(file.token)
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&SessionFile {
            token: Some(token.to_string()),
        })?;
        write_private(&self.path, contents.as_bytes())?;
        debug!(path = %self.path.display(), "Session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            debug!(path = %self.path.display(), "Session file removed");
        }
        Ok(())
    }
}

/// Write a file readable by the owner only
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

// ============================================================================
// Keyring
// ============================================================================

/// Token persisted in the OS keychain
pub struct KeyringTokenStorage {
    service: String,
}

impl KeyringTokenStorage {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, TOKEN_KEY)?)
    }
}

impl Default for KeyringTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for KeyringTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        self.entry()?.set_password(token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Process-local storage, lost on exit
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
