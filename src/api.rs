//! Browser-side catalog sources and the reachability probe
//!
//! Mirrors the native clients in `arcade_core::remote` on top of `gloo-net`,
//! since reqwest's wasm build cannot do `no-cors` probes.

use std::future::Future;
use std::time::Duration;

use arcade_core::catalog::{decode_articles, decode_games};
use arcade_core::config::{SiteConfig, ENV_REMOTE_KEY, ENV_REMOTE_URL};
use arcade_core::error::{CatalogError, Result};
use arcade_core::health::{Probe, ProbeVerdict};
use arcade_core::leaderboard::{decode_scores, scores_query, ScoreEntry, ScoreSource};
use arcade_core::model::{Article, CatalogEntry};
use arcade_core::source::{CatalogLoader, CatalogSource, StaticSnapshot};
use async_trait::async_trait;
use futures::future::{select, Either};
use gloo_net::http::{Method, Request, RequestBuilder};
use gloo_timers::future::TimeoutFuture;
use web_sys::{console, RequestMode};

/// Snapshot files deployed next to the site
const SNAPSHOT_BASE: &str = "/api";

/// Site configuration; remote credentials are baked in at build time
pub fn site_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.apply_env(|key| {
        let value = match key {
            ENV_REMOTE_URL => option_env!("SUPABASE_URL"),
            ENV_REMOTE_KEY => option_env!("SUPABASE_ANON_KEY"),
            _ => None,
        };
        value.map(str::to_string)
    });
    config
}

/// REST backend when configured, else the hosted snapshot; the bundled
/// snapshot backs both
pub fn catalog_loader(config: &SiteConfig) -> CatalogLoader {
    let timeout = config.fetch_timeout();
    let loader = CatalogLoader::new(StaticSnapshot::bundled());
    if config.remote.is_configured() {
        loader.with_primary(RestTables::new(config))
    } else {
        let base = config.snapshot_base_url.as_deref().unwrap_or(SNAPSHOT_BASE);
        loader.with_primary(HostedSnapshot {
            base_url: base.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

pub(crate) fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// `None` if `timeout` elapses first
async fn with_timeout<F: Future>(future: F, timeout: Duration) -> Option<F::Output> {
    let timer = TimeoutFuture::new(millis(timeout));
    match select(Box::pin(future), Box::pin(timer)).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(_) => None,
    }
}

async fn fetch_text(request: RequestBuilder, what: &str, timeout: Duration) -> Result<String> {
    let response = with_timeout(request.send(), timeout)
        .await
        .ok_or_else(|| CatalogError::timeout(format!("{} request timed out", what)))?
        .map_err(|e| CatalogError::network(e.to_string()))?;
    if !response.ok() {
        return Err(CatalogError::network(format!(
            "{} request failed: {} {}",
            what,
            response.status(),
            response.status_text()
        )));
    }
    response
        .text()
        .await
        .map_err(|e| CatalogError::network(e.to_string()))
}

struct RestTables {
    base_url: String,
    anon_key: String,
    timeout: Duration,
}

impl RestTables {
    fn new(config: &SiteConfig) -> Self {
        Self {
            base_url: config.remote.url.trim_end_matches('/').to_string(),
            anon_key: config.remote.anon_key.clone(),
            timeout: config.fetch_timeout(),
        }
    }

    async fn query(&self, table: &str, query: &str) -> Result<String> {
        let url = format!("{}/rest/v1/{}?{}", self.base_url, table, query);
        let request = Request::get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", &format!("Bearer {}", self.anon_key));
        fetch_text(request, table, self.timeout).await
    }

    async fn get_table(&self, table: &str) -> Result<String> {
        self.query(table, "select=*").await
    }
}

/// The backend's `scores` table; there is no leaderboard without a backend
pub fn score_source(config: &SiteConfig) -> Option<impl ScoreSource + use<>> {
    config.remote.is_configured().then(|| RestTables::new(config))
}

#[async_trait(?Send)]
impl ScoreSource for RestTables {
    async fn top_scores(&self, game_id: u32) -> Result<Vec<ScoreEntry>> {
        decode_scores(&self.query("scores", &scores_query(game_id)).await?)
    }
}

#[async_trait(?Send)]
impl CatalogSource for RestTables {
    fn name(&self) -> &str {
        "rest"
    }

    async fn fetch_games(&self) -> Result<Vec<CatalogEntry>> {
        decode_games(&self.get_table("games").await?)
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        decode_articles(&self.get_table("posts").await?)
    }
}

struct HostedSnapshot {
    base_url: String,
    timeout: Duration,
}

impl HostedSnapshot {
    async fn get_file(&self, file: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, file);
        fetch_text(Request::get(&url), file, self.timeout).await
    }
}

#[async_trait(?Send)]
impl CatalogSource for HostedSnapshot {
    fn name(&self) -> &str {
        "hosted snapshot"
    }

    async fn fetch_games(&self) -> Result<Vec<CatalogEntry>> {
        decode_games(&self.get_file("games.json").await?)
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        decode_articles(&self.get_file("posts.json").await?)
    }
}

/// `HEAD` in `no-cors` mode. Cross-origin answers come back opaque (status
/// 0), so only a rejected fetch counts as a failure.
pub struct BrowserProber {
    timeout: Duration,
}

impl BrowserProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait(?Send)]
impl Probe for BrowserProber {
    async fn probe(&self, url: &str) -> ProbeVerdict {
        let request = RequestBuilder::new(url)
            .method(Method::HEAD)
            .mode(RequestMode::NoCors);
        match with_timeout(request.send(), self.timeout).await {
            None => ProbeVerdict::Inconclusive,
            Some(Ok(response)) if response.ok() => ProbeVerdict::Confirmed,
            Some(Ok(_)) => ProbeVerdict::Inconclusive,
            Some(Err(e)) => {
                console::warn_1(&format!("Health check failed for {}: {}", url, e).into());
                ProbeVerdict::Failed
            }
        }
    }
}
