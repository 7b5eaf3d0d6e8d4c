use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use common::elevation::{PersistedToken, SessionStorage, SessionStorageError};

/// Session storage in a small JSON file next to the config.
///
/// The CLI runs one process per command, so the "session" is the state
///  directory.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<PersistedToken>, SessionStorageError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| SessionStorageError::Malformed(e.to_string()))
    }

    fn save(&self, token: &PersistedToken) -> Result<(), SessionStorageError> {
        let data = serde_json::to_string_pretty(token)
            .map_err(|e| SessionStorageError::Malformed(e.to_string()))?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
