//! File-backed client storage: one JSON object of string values

use arcade_core::error::{CatalogError, Result};
use arcade_core::favorites::ClientStorage;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct JsonFileStorage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStorage {
    /// Open (or lazily create) the store at `path`. An unreadable file starts
    /// empty rather than failing the session.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt storage file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CatalogError::Storage(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw).map_err(|e| {
            CatalogError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl ClientStorage for JsonFileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::favorites::{FavoritesService, FAVORITES_KEY};

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut storage = JsonFileStorage::open(&path);
        storage.set("language", "en").unwrap();

        let reopened = JsonFileStorage::open(&path);
        assert_eq!(reopened.get("language").as_deref(), Some("en"));
    }

    #[test]
    fn test_favorites_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut storage = JsonFileStorage::open(&path);
        let mut favorites = FavoritesService::load_local(&storage);
        favorites.toggle_local(11, &mut storage).unwrap();

        let reopened = JsonFileStorage::open(&path);
        assert_eq!(reopened.get(FAVORITES_KEY).as_deref(), Some("[11]"));
        assert!(FavoritesService::load_local(&reopened).contains(11));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();
        assert!(JsonFileStorage::open(&path).get("language").is_none());
    }
}
