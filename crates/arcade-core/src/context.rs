//! Per-session site state handed to every page
//!
//! Owns the client storage and everything persisted in it, so pages never
//! reach for globals.

use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::error::{CatalogError, Result};
use crate::favorites::{ClientStorage, FavoritesScope, FavoritesService, RemoteFavorites, LANGUAGE_KEY};
use crate::model::{AuthSession, Language};
use crate::preload::PreloadQueue;

pub struct SiteContext<S: ClientStorage> {
    storage: S,
    config: SiteConfig,
    language: Language,
    favorites: FavoritesService,
    preload: PreloadQueue,
    session: Option<AuthSession>,
}

impl<S: ClientStorage> SiteContext<S> {
    /// Restore language and anonymous favorites from `storage`
    pub fn init(storage: S, config: SiteConfig) -> Self {
        let language = storage
            .get(LANGUAGE_KEY)
            .and_then(|code| Language::from_code(&code))
            .unwrap_or_default();
        let favorites = FavoritesService::load_local(&storage);
        let preload = PreloadQueue::new(config.preload_cap);
        debug!("Site context ready (language {})", language.code());
        Self {
            storage,
            config,
            language,
            favorites,
            preload,
            session: None,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switch language and persist it right away
    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.language = language;
        self.storage.set(LANGUAGE_KEY, language.code())
    }

    pub fn toggle_language(&mut self) -> Result<Language> {
        let next = self.language.toggled();
        self.set_language(next)?;
        Ok(next)
    }

    pub fn favorites(&self) -> &FavoritesService {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesService {
        &mut self.favorites
    }

    pub fn preload(&self) -> &PreloadQueue {
        &self.preload
    }

    pub fn preload_mut(&mut self) -> &mut PreloadQueue {
        &mut self.preload
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// Switch favorites to the signed-in user's remote set. On failure the
    /// anonymous set stays active.
    pub async fn sign_in<R: RemoteFavorites + ?Sized>(&mut self, session: AuthSession, remote: &R) -> Result<()> {
        let favorites = FavoritesService::load_remote(remote, &session.user_id).await?;
        info!("Signed in as {}", session.user_id);
        self.favorites = favorites;
        self.session = Some(session);
        Ok(())
    }

    /// Back to anonymous favorites from client storage
    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Signed out {}", session.user_id);
        }
        self.favorites = FavoritesService::load_local(&self.storage);
    }

    /// Toggle an anonymous favorite and persist it. Fails while signed in.
    pub fn toggle_local_favorite(&mut self, id: u32) -> Result<bool> {
        if *self.favorites.scope() != FavoritesScope::Local {
            return Err(CatalogError::Configuration(
                "signed-in favorites need the remote backend".to_string(),
            ));
        }
        self.favorites.toggle_local(id, &mut self.storage)
    }

    /// Toggle a favorite in whichever scope is active
    pub async fn toggle_favorite<R: RemoteFavorites + ?Sized>(&mut self, id: u32, remote: Option<&R>) -> Result<bool> {
        if *self.favorites.scope() == FavoritesScope::Local {
            return self.toggle_local_favorite(id);
        }
        let remote = remote
            .ok_or_else(|| CatalogError::Configuration("no remote favorites backend".to_string()))?;
        self.favorites.toggle_remote(id, remote).await
    }

    /// Write everything persisted back to storage (end of session)
    pub fn flush(&mut self) -> Result<()> {
        self.storage.set(LANGUAGE_KEY, self.language.code())?;
        self.favorites.persist_local(&mut self.storage)
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
