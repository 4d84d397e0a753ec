//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] by storing the staircase config as a postcard
//! blob under a namespaced key.  This is the in-memory backend a host
//! mirrors onto its flash store; it keeps the same namespace/key layout.

use std::cell::RefCell;
use std::collections::HashMap;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::StaircaseConfig;

const CONFIG_NAMESPACE: &str = "staircase";
const CONFIG_KEY: &str = "stcfg";

/// Upper bound for a stored blob; anything larger is treated as corrupt.
const MAX_BLOB_SIZE: usize = 256;

#[derive(Default)]
pub struct NvsAdapter {
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    pub fn new() -> Self {
        info!("NvsAdapter: in-memory backend");
        Self::default()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Drop the stored config record (factory reset).
    pub fn erase(&self) {
        let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
        self.store.borrow_mut().remove(&key);
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<StaircaseConfig, ConfigError> {
        let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
        let store = self.store.borrow();
        let Some(bytes) = store.get(&key) else {
            info!("NvsAdapter: no stored config");
            return Err(ConfigError::NotFound);
        };
        if bytes.len() > MAX_BLOB_SIZE {
            warn!("NvsAdapter: oversized config blob ({} bytes)", bytes.len());
            return Err(ConfigError::Corrupted);
        }
        let cfg: StaircaseConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&self, config: &StaircaseConfig) -> Result<(), ConfigError> {
        let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        self.store.borrow_mut().insert(key, bytes);
        Ok(())
    }
}
