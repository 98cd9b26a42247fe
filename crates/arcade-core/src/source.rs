//! Fetch layer: primary remote source with a bundled snapshot fallback
//!
//! The loader never retries on its own. A failed or unconfigured primary drops
//! straight to the fallback; a failed fallback is surfaced to the caller, who
//! decides whether to offer a retry.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::catalog::{self, decode_articles, decode_games};
use crate::error::{CatalogError, Result};
use crate::model::{Article, CatalogEntry};

const SNAPSHOT_GAMES: &str = include_str!("../data/games.json");
const SNAPSHOT_POSTS: &str = include_str!("../data/posts.json");

/// Anything that can produce the raw game and article sets
#[async_trait(?Send)]
pub trait CatalogSource {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn fetch_games(&self) -> Result<Vec<CatalogEntry>>;

    async fn fetch_articles(&self) -> Result<Vec<Article>>;
}

/// Snapshot compiled into the binary
#[derive(Debug, Clone)]
pub struct StaticSnapshot {
    games: &'static str,
    posts: &'static str,
}

impl StaticSnapshot {
    pub fn bundled() -> Self {
        Self {
            games: SNAPSHOT_GAMES,
            posts: SNAPSHOT_POSTS,
        }
    }

    /// Snapshot over caller-supplied bodies (tests, alternate bundles)
    pub fn from_bodies(games: &'static str, posts: &'static str) -> Self {
        Self { games, posts }
    }
}

impl Default for StaticSnapshot {
    fn default() -> Self {
        Self::bundled()
    }
}

#[async_trait(?Send)]
impl CatalogSource for StaticSnapshot {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn fetch_games(&self) -> Result<Vec<CatalogEntry>> {
        decode_games(self.games)
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        decode_articles(self.posts)
    }
}

/// Primary-then-fallback loader
pub struct CatalogLoader {
    primary: Option<Box<dyn CatalogSource>>,
    fallback: Box<dyn CatalogSource>,
}

impl CatalogLoader {
    /// Loader with no primary configured: everything comes from `fallback`
    pub fn new(fallback: impl CatalogSource + 'static) -> Self {
        Self {
            primary: None,
            fallback: Box::new(fallback),
        }
    }

    pub fn with_primary(mut self, primary: impl CatalogSource + 'static) -> Self {
        self.primary = Some(Box::new(primary));
        self
    }

    /// Set or clear the primary source
    pub fn with_optional_primary(mut self, primary: Option<Box<dyn CatalogSource>>) -> Self {
        self.primary = primary;
        self
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Load every game, ordered by play count (desc) then id
    pub async fn load_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let mut games = match self.primary_games().await {
            Some(games) => games,
            None => {
                let games = self.fallback.fetch_games().await?;
                debug!("Loaded {} games from {}", games.len(), self.fallback.name());
                games
            }
        };
        if games.is_empty() {
            return Err(CatalogError::EmptyResult("games"));
        }
        catalog::sort_catalog(&mut games);
        Ok(games)
    }

    /// Load every article, newest first
    pub async fn load_articles(&self) -> Result<Vec<Article>> {
        let mut articles = match self.primary_articles().await {
            Some(articles) => articles,
            None => {
                let articles = self.fallback.fetch_articles().await?;
                debug!("Loaded {} articles from {}", articles.len(), self.fallback.name());
                articles
            }
        };
        if articles.is_empty() {
            return Err(CatalogError::EmptyResult("articles"));
        }
        catalog::sort_articles(&mut articles);
        Ok(articles)
    }

    async fn primary_games(&self) -> Option<Vec<CatalogEntry>> {
        let Some(primary) = &self.primary else {
            warn!(
                "{}; falling back to {}",
                CatalogError::Configuration("no remote catalog configured".to_string()),
                self.fallback.name()
            );
            return None;
        };
        match primary.fetch_games().await {
            Ok(games) if !games.is_empty() => {
                debug!("Loaded {} games from {}", games.len(), primary.name());
                Some(games)
            }
            Ok(_) => {
                warn!("{} returned no games; falling back to {}", primary.name(), self.fallback.name());
                None
            }
            Err(e) => {
                warn!("{} failed: {}; falling back to {}", primary.name(), e, self.fallback.name());
                None
            }
        }
    }

    async fn primary_articles(&self) -> Option<Vec<Article>> {
        let primary = self.primary.as_ref()?;
        match primary.fetch_articles().await {
            Ok(articles) if !articles.is_empty() => Some(articles),
            Ok(_) => {
                warn!("{} returned no articles; falling back to {}", primary.name(), self.fallback.name());
                None
            }
            Err(e) => {
                warn!("{} failed: {}; falling back to {}", primary.name(), e, self.fallback.name());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{article, game};
    use std::cell::Cell;

    struct FakeSource {
        games: Result<Vec<CatalogEntry>>,
        articles: Result<Vec<Article>>,
        calls: Cell<u32>,
    }

    impl FakeSource {
        fn ok(games: Vec<CatalogEntry>) -> Self {
            Self {
                games: Ok(games),
                articles: Ok(vec![article("fake", "2024-01-01")]),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                games: Err(CatalogError::network("connection refused")),
                articles: Err(CatalogError::network("connection refused")),
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl CatalogSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_games(&self) -> Result<Vec<CatalogEntry>> {
            self.calls.set(self.calls.get() + 1);
            self.games.clone()
        }

        async fn fetch_articles(&self) -> Result<Vec<Article>> {
            self.articles.clone()
        }
    }

    #[tokio::test]
    async fn test_bundled_snapshot_decodes() {
        let snapshot = StaticSnapshot::bundled();
        let games = snapshot.fetch_games().await.unwrap();
        let posts = snapshot.fetch_articles().await.unwrap();
        assert!(!games.is_empty());
        assert!(!posts.is_empty());
    }

    #[tokio::test]
    async fn test_primary_used_and_sorted() {
        let loader = CatalogLoader::new(FakeSource::failing())
            .with_primary(FakeSource::ok(vec![game(1, 500), game(2, 900), game(3, 100)]));
        let ids: Vec<u32> = loader.load_catalog().await.unwrap().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn test_failed_primary_falls_back() {
        let loader = CatalogLoader::new(FakeSource::ok(vec![game(5, 1)]))
            .with_primary(FakeSource::failing());
        let games = loader.load_catalog().await.unwrap();
        assert_eq!(games[0].id, 5);
    }

    #[tokio::test]
    async fn test_missing_primary_uses_fallback() {
        let loader = CatalogLoader::new(FakeSource::ok(vec![game(8, 1)]));
        assert!(!loader.has_primary());
        assert_eq!(loader.load_catalog().await.unwrap().len(), 1);
        assert_eq!(loader.load_articles().await.unwrap()[0].slug, "fake");
    }

    #[tokio::test]
    async fn test_fallback_error_surfaces_without_retry() {
        let fallback = FakeSource::failing();
        let loader = CatalogLoader::new(fallback);
        let err = loader.load_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Network { .. }));
    }

    #[tokio::test]
    async fn test_empty_everywhere_is_empty_result() {
        let loader = CatalogLoader::new(FakeSource::ok(Vec::new()))
            .with_primary(FakeSource::ok(Vec::new()));
        assert_eq!(
            loader.load_catalog().await.unwrap_err(),
            CatalogError::EmptyResult("games")
        );
    }

    #[tokio::test]
    async fn test_repeated_loads_are_identical() {
        let loader = CatalogLoader::new(FakeSource::ok(vec![game(3, 7), game(1, 7), game(2, 9)]));
        let first = loader.load_catalog().await.unwrap();
        let second = loader.load_catalog().await.unwrap();
        assert_eq!(first, second);
    }
}
