//! Persisted deployed-token address
//!
//! A single string slot under [`MEMECOIN_ADDRESS_KEY`] behind a small
//! key-value port, so tests run against [`MemoryStore`] and the CLI against
//! [`JsonFileStore`].

use crate::error::StoreError;
use alloy_primitives::Address;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Key the deployed address is stored under
pub const MEMECOIN_ADDRESS_KEY: &str = "memecoin_address";

/// Minimal string key-value store
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// JSON document on disk, rewritten atomically on every change
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) a store at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, entries)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// Typed view of the deployed-address slot
#[derive(Debug, Clone)]
pub struct MemecoinAddressStore {
    inner: Arc<dyn KeyValueStore>,
}

impl MemecoinAddressStore {
    /// Wrap a key-value store
    #[inline]
    #[must_use]
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Raw stored string
    pub fn raw(&self) -> Result<Option<String>, StoreError> {
        self.inner.get(MEMECOIN_ADDRESS_KEY)
    }

    /// Stored address, `None` if nothing has been deployed
    ///
    /// # Errors
    /// `StoreError::InvalidAddress` if the slot holds something else
    pub fn get(&self) -> Result<Option<Address>, StoreError> {
        self.raw()?
            .map(|value| {
                Address::from_str(value.trim()).map_err(|_| StoreError::InvalidAddress {
                    key: MEMECOIN_ADDRESS_KEY.to_string(),
                    value,
                })
            })
            .transpose()
    }

    /// Store an address (checksummed), overwriting the previous one
    pub fn save(&self, address: Address) -> Result<(), StoreError> {
        self.inner
            .set(MEMECOIN_ADDRESS_KEY, &address.to_checksum(None))
    }

    /// Forget the stored address
    pub fn clear(&self) -> Result<(), StoreError> {
        self.inner.remove(MEMECOIN_ADDRESS_KEY)
    }
}
