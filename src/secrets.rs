//! Credential storage contract.
//!
//! The vault on disk belongs to the platform backend; this crate only needs
//! key/value access to strings, plus an in-memory store for wiring and tests.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret store unavailable: {0}")]
    Unavailable(String),
    #[error("secret store lock poisoned")]
    Poisoned,
}

pub trait SecretStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;
    fn insert(&self, key: &str, value: &str) -> Result<(), SecretError>;
    fn remove(&self, key: &str) -> Result<(), SecretError>;
}

#[derive(Debug, Default)]
pub struct MemorySecretStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        let records = self.records.lock().map_err(|_| SecretError::Poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn insert(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut records = self.records.lock().map_err(|_| SecretError::Poisoned)?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SecretError> {
        let mut records = self.records.lock().map_err(|_| SecretError::Poisoned)?;
        records.remove(key);
        Ok(())
    }
}
