//! `localStorage` behind the core's storage trait

use arcade_core::error::{CatalogError, Result};
use arcade_core::favorites::ClientStorage;

/// Stateless handle; every call goes to the window's `localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

impl ClientStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let storage = local_storage()
            .ok_or_else(|| CatalogError::Storage("localStorage is unavailable".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|e| CatalogError::Storage(format!("failed to write {}: {:?}", key, e)))
    }
}
