//! Cart storage adapters.
//!
//! The persisted record is `{"state": <cart>, "version": 0}` under the fixed
//! key `cart-storage`. On disk that is `<dir>/cart-storage.json`, replaced
//! atomically on every save.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::application::repos::{CartStorage, StorageError};
use crate::cache::lock::mutex_lock;
use crate::domain::cart::CartState;

pub const CART_STORAGE_KEY: &str = "cart-storage";
pub const CART_STORAGE_VERSION: u32 = 0;

const SOURCE: &str = "infra::storage";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCart {
    state: CartState,
    version: u32,
}

fn encode(state: &CartState) -> Result<String, StorageError> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        state: &'a CartState,
        version: u32,
    }

    serde_json::to_string(&Borrowed {
        state,
        version: CART_STORAGE_VERSION,
    })
    .map_err(StorageError::Serialize)
}

fn decode(raw: &str) -> Result<Option<CartState>, StorageError> {
    let record: PersistedCart = serde_json::from_str(raw).map_err(StorageError::Corrupt)?;
    if record.version != CART_STORAGE_VERSION {
        warn!(
            version = record.version,
            expected = CART_STORAGE_VERSION,
            "Ignoring persisted cart with unknown version"
        );
        return Ok(None);
    }
    Ok(Some(record.state))
}

/// Cart record kept as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `<dir>/cart-storage.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{CART_STORAGE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(&self, contents: &str) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|err| StorageError::io(&dir, err))?;

        let mut file = NamedTempFile::new_in(&dir).map_err(|err| StorageError::io(&dir, err))?;
        if let Err(err) = file.write_all(contents.as_bytes()) {
            return Err(StorageError::io(file.path(), err));
        }
        file.persist(&self.path)
            .map_err(|err| StorageError::io(&self.path, err.error))?;
        Ok(())
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<CartState>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };
        decode(&raw)
    }

    fn save(&self, state: &CartState) -> Result<(), StorageError> {
        let contents = encode(state)?;
        self.write_atomically(&contents)?;
        debug!(path = %self.path.display(), "Persisted cart");
        Ok(())
    }
}

/// Cart record kept in process memory as the serialized string.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    raw: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a raw record, which need not be valid.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        mutex_lock(&self.raw, SOURCE, "raw").clone()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<CartState>, StorageError> {
        match mutex_lock(&self.raw, SOURCE, "load").as_deref() {
            Some(raw) => decode(raw),
            None => Ok(None),
        }
    }

    fn save(&self, state: &CartState) -> Result<(), StorageError> {
        let contents = encode(state)?;
        *mutex_lock(&self.raw, SOURCE, "save") = Some(contents);
        Ok(())
    }
}
