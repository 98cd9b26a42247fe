//! Favorite games: the id set, client storage and optimistic toggling
//!
//! Anonymous visitors keep favorites in client storage; signed-in users keep
//! them in the remote table. A given scope uses exactly one of the two.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};

/// Storage key for the anonymous favorites list (flat JSON array of ids)
pub const FAVORITES_KEY: &str = "favoriteGames";
/// Storage key for the two-letter UI language code
pub const LANGUAGE_KEY: &str = "language";

/// Non-networked key/value client storage
pub trait ClientStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory storage, for tests and for sessions without persistence
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Set of favorited catalog ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: BTreeSet<u32>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the persisted flat list. Corrupt data yields an empty set.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<Vec<u32>>(raw) {
            Ok(ids) => Self {
                ids: ids.into_iter().collect(),
            },
            Err(e) => {
                warn!("Could not parse stored favorites: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        let ids: Vec<u32> = self.ids.iter().copied().collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Flip membership; returns whether `id` is now a favorite
    pub fn toggle(&mut self, id: u32) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn set(&mut self, id: u32, favorite: bool) {
        if favorite {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &BTreeSet<u32> {
        &self.ids
    }
}

impl FromIterator<u32> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Remote favorites table for authenticated users
#[async_trait(?Send)]
pub trait RemoteFavorites {
    async fn add(&self, user_id: &str, game_id: u32) -> Result<()>;
    async fn remove(&self, user_id: &str, game_id: u32) -> Result<()>;
    async fn list(&self, user_id: &str) -> Result<Vec<u32>>;
}

/// Where a favorites set lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesScope {
    /// Anonymous visitor, client storage
    Local,
    /// Signed-in user, remote table
    User(String),
}

/// A toggle applied in memory but not yet confirmed by persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PendingToggle {
    pub id: u32,
    pub was_favorite: bool,
    pub now_favorite: bool,
}

/// Favorites for the current scope, local or remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesService {
    set: FavoriteSet,
    scope: FavoritesScope,
}

impl Default for FavoritesService {
    fn default() -> Self {
        Self {
            set: FavoriteSet::new(),
            scope: FavoritesScope::Local,
        }
    }
}

impl FavoritesService {
    /// Anonymous favorites from client storage
    pub fn load_local<S: ClientStorage + ?Sized>(storage: &S) -> Self {
        let set = storage
            .get(FAVORITES_KEY)
            .map(|raw| FavoriteSet::from_json(&raw))
            .unwrap_or_default();
        debug!("Loaded {} local favorites", set.len());
        Self {
            set,
            scope: FavoritesScope::Local,
        }
    }

    /// Favorites of a signed-in user, fetched from the remote table
    pub async fn load_remote<R: RemoteFavorites + ?Sized>(remote: &R, user_id: &str) -> Result<Self> {
        let ids = remote.list(user_id).await?;
        debug!("Loaded {} remote favorites for {}", ids.len(), user_id);
        Ok(Self {
            set: ids.into_iter().collect(),
            scope: FavoritesScope::User(user_id.to_string()),
        })
    }

    pub fn scope(&self) -> &FavoritesScope {
        &self.scope
    }

    pub fn set(&self) -> &FavoriteSet {
        &self.set
    }

    pub fn contains(&self, id: u32) -> bool {
        self.set.contains(id)
    }

    /// Apply a toggle in memory right away. Persist it, then call `rollback`
    /// if persistence fails.
    pub fn begin_toggle(&mut self, id: u32) -> PendingToggle {
        let was_favorite = self.set.contains(id);
        let now_favorite = self.set.toggle(id);
        PendingToggle {
            id,
            was_favorite,
            now_favorite,
        }
    }

    /// Restore the pre-toggle membership
    pub fn rollback(&mut self, pending: PendingToggle) {
        warn!("Rolling back favorite toggle for game {}", pending.id);
        self.set.set(pending.id, pending.was_favorite);
    }

    /// Write the set to client storage. A no-op for user scopes, which are
    /// never mirrored locally.
    pub fn persist_local<S: ClientStorage + ?Sized>(&self, storage: &mut S) -> Result<()> {
        match self.scope {
            FavoritesScope::Local => storage.set(FAVORITES_KEY, &self.set.to_json()),
            FavoritesScope::User(_) => Ok(()),
        }
    }

    /// Toggle and persist to client storage, rolling back on failure
    pub fn toggle_local<S: ClientStorage + ?Sized>(&mut self, id: u32, storage: &mut S) -> Result<bool> {
        let pending = self.begin_toggle(id);
        if let Err(e) = self.persist_local(storage) {
            self.rollback(pending);
            return Err(e);
        }
        Ok(pending.now_favorite)
    }

    /// Push a pending toggle to the remote table
    pub async fn confirm_remote<R: RemoteFavorites + ?Sized>(
        &self,
        pending: PendingToggle,
        remote: &R,
    ) -> Result<()> {
        let FavoritesScope::User(user_id) = &self.scope else {
            return Err(CatalogError::Configuration(
                "remote favorites require a signed-in user".to_string(),
            ));
        };
        if pending.now_favorite {
            remote.add(user_id, pending.id).await
        } else {
            remote.remove(user_id, pending.id).await
        }
    }

    /// Toggle against the remote table: in memory first, then the remote
    /// call, rolled back once on failure. There is no retry.
    pub async fn toggle_remote<R: RemoteFavorites + ?Sized>(&mut self, id: u32, remote: &R) -> Result<bool> {
        let pending = self.begin_toggle(id);
        if let Err(e) = self.confirm_remote(pending, remote).await {
            self.rollback(pending);
            return Err(e);
        }
        Ok(pending.now_favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeRemote {
        rows: RefCell<BTreeSet<(String, u32)>>,
        fail_writes: bool,
    }

    #[async_trait(?Send)]
    impl RemoteFavorites for FakeRemote {
        async fn add(&self, user_id: &str, game_id: u32) -> Result<()> {
            if self.fail_writes {
                return Err(CatalogError::network("offline"));
            }
            self.rows.borrow_mut().insert((user_id.to_string(), game_id));
            Ok(())
        }

        async fn remove(&self, user_id: &str, game_id: u32) -> Result<()> {
            if self.fail_writes {
                return Err(CatalogError::network("offline"));
            }
            self.rows.borrow_mut().remove(&(user_id.to_string(), game_id));
            Ok(())
        }

        async fn list(&self, user_id: &str) -> Result<Vec<u32>> {
            Ok(self
                .rows
                .borrow()
                .iter()
                .filter(|(u, _)| u == user_id)
                .map(|(_, id)| *id)
                .collect())
        }
    }

    struct BrokenStorage;

    impl ClientStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(CatalogError::Storage("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let mut set: FavoriteSet = [3, 9].into_iter().collect();
        let original = set.clone();
        assert!(set.toggle(5));
        assert!(!set.toggle(5));
        assert_eq!(set, original);
        assert!(!set.toggle(3));
        assert!(set.toggle(3));
        assert_eq!(set, original);
    }

    #[test]
    fn test_persisted_format_is_flat_id_list() {
        let mut storage = MemoryStorage::new();
        let mut favorites = FavoritesService::load_local(&storage);
        favorites.toggle_local(12, &mut storage).unwrap();
        favorites.toggle_local(4, &mut storage).unwrap();
        assert_eq!(storage.get(FAVORITES_KEY).as_deref(), Some("[4,12]"));

        let reloaded = FavoritesService::load_local(&storage);
        assert!(reloaded.contains(4) && reloaded.contains(12));
    }

    #[test]
    fn test_corrupt_storage_is_empty() {
        assert!(FavoriteSet::from_json("{not json").is_empty());
    }

    #[test]
    fn test_local_failure_rolls_back() {
        let mut favorites = FavoritesService::default();
        let err = favorites.toggle_local(1, &mut BrokenStorage).unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
        assert!(!favorites.contains(1));
    }

    #[tokio::test]
    async fn test_remote_toggle_round_trip() {
        let remote = FakeRemote::default();
        let mut favorites = FavoritesService::load_remote(&remote, "user-1").await.unwrap();
        assert!(favorites.toggle_remote(7, &remote).await.unwrap());
        assert_eq!(remote.list("user-1").await.unwrap(), vec![7]);
        assert!(!favorites.toggle_remote(7, &remote).await.unwrap());
        assert!(remote.list("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_rolls_back() {
        let remote = FakeRemote {
            fail_writes: true,
            ..Default::default()
        };
        let mut favorites = FavoritesService::load_remote(&remote, "user-1").await.unwrap();
        let before = favorites.clone();
        assert!(favorites.toggle_remote(7, &remote).await.is_err());
        assert_eq!(favorites, before);
    }

    #[tokio::test]
    async fn test_user_scope_never_writes_local_storage() {
        let remote = FakeRemote::default();
        let mut storage = MemoryStorage::new();
        let mut favorites = FavoritesService::load_remote(&remote, "user-2").await.unwrap();
        favorites.toggle_remote(3, &remote).await.unwrap();
        favorites.persist_local(&mut storage).unwrap();
        assert!(storage.get(FAVORITES_KEY).is_none());
    }

    #[tokio::test]
    async fn test_confirm_remote_requires_user_scope() {
        let remote = FakeRemote::default();
        let mut favorites = FavoritesService::default();
        let pending = favorites.begin_toggle(1);
        let err = favorites.confirm_remote(pending, &remote).await.unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
    }
}
