//! reqwest-backed clients: REST catalog, favorites and scores, hosted
//! snapshot, reachability probe and preloader

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

use crate::catalog::{decode_articles, decode_games};
use crate::config::RemoteConfig;
use crate::error::{CatalogError, Result};
use crate::favorites::RemoteFavorites;
use crate::health::{Probe, ProbeVerdict};
use crate::leaderboard::{decode_scores, scores_query, ScoreEntry, ScoreSource};
use crate::model::{Article, CatalogEntry};
use crate::preload::PreloadLoader;
use crate::source::CatalogSource;

const USER_AGENT: &str = concat!("Arcade/", env!("CARGO_PKG_VERSION"));

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| CatalogError::Configuration(format!("failed to create HTTP client: {}", e)))
}

fn classify(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::timeout(e.to_string())
    } else if e.is_decode() {
        CatalogError::Validation(e.to_string())
    } else {
        CatalogError::network(e.to_string())
    }
}

async fn read_body(response: reqwest::Response, what: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::network(format!("{} request failed: {} - {}", what, status, body)));
    }
    response.text().await.map_err(classify)
}

/// PostgREST endpoint for a table
fn table_url(base: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base.trim_end_matches('/'), table)
}

/// Catalog and articles from the REST backend's `games` and `posts` tables
pub struct RestSource {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestSource {
    pub fn new(remote: &RemoteConfig, timeout: Duration) -> Result<Self> {
        let remote = remote.require()?;
        Ok(Self {
            client: build_client(timeout)?,
            base_url: remote.url.clone(),
            anon_key: remote.anon_key.clone(),
        })
    }

    async fn get_table(&self, table: &str) -> Result<String> {
        let url = format!("{}?select=*", table_url(&self.base_url, table));
        trace!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .send()
            .await
            .map_err(classify)?;
        read_body(response, table).await
    }
}

#[async_trait(?Send)]
impl CatalogSource for RestSource {
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

/// The static snapshot files served next to the site
pub struct HttpSnapshot {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSnapshot {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_file(&self, file: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, file);
        trace!("GET {}", url);
        let response = self.client.get(&url).send().await.map_err(classify)?;
        read_body(response, file).await
    }
}

#[async_trait(?Send)]
impl CatalogSource for HttpSnapshot {
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

/// Verdict for a probe that got an HTTP answer
pub fn verdict_for_status(status: StatusCode) -> ProbeVerdict {
    if status.is_success() || status.is_redirection() {
        ProbeVerdict::Confirmed
    } else {
        ProbeVerdict::Inconclusive
    }
}

/// `HEAD` probe against a play URL
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

#[async_trait(?Send)]
impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeVerdict {
        match self.client.head(url).send().await {
            Ok(response) => verdict_for_status(response.status()),
            Err(e) => {
                debug!("Probe of {} failed: {}", url, e);
                ProbeVerdict::Failed
            }
        }
    }
}

/// Preloads by fetching the page body once
pub struct HttpPreloader {
    client: reqwest::Client,
}

impl HttpPreloader {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

#[async_trait(?Send)]
impl PreloadLoader for HttpPreloader {
    async fn load(&self, url: &str) -> std::result::Result<(), String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        trace!("Preloaded {} ({} bytes)", url, bytes.len());
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FavoriteRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    game_id: u32,
}

/// The `favorites` table, one row per (user, game)
pub struct RestFavorites {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestFavorites {
    pub fn new(remote: &RemoteConfig, timeout: Duration) -> Result<Self> {
        let remote = remote.require()?;
        Ok(Self {
            client: build_client(timeout)?,
            base_url: remote.url.clone(),
            anon_key: remote.anon_key.clone(),
            access_token: None,
        })
    }

    /// Act on behalf of a signed-in user instead of the anonymous role
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    fn request(&self, method: reqwest::Method, query: &str) -> reqwest::RequestBuilder {
        let url = format!("{}?{}", table_url(&self.base_url, "favorites"), query);
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }
}

fn row_filter(user_id: &str, game_id: Option<u32>) -> String {
    let mut query = format!("user_id=eq.{}", urlencoding::encode(user_id));
    if let Some(id) = game_id {
        query.push_str(&format!("&game_id=eq.{}", id));
    }
    query
}

#[async_trait(?Send)]
impl RemoteFavorites for RestFavorites {
    async fn add(&self, user_id: &str, game_id: u32) -> Result<()> {
        let row = FavoriteRow {
            user_id: Some(user_id.to_string()),
            game_id,
        };
        let response = self
            .request(reqwest::Method::POST, "")
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(classify)?;
        read_body(response, "favorites").await.map(|_| ())
    }

    async fn remove(&self, user_id: &str, game_id: u32) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, &row_filter(user_id, Some(game_id)))
            .send()
            .await
            .map_err(classify)?;
        read_body(response, "favorites").await.map(|_| ())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<u32>> {
        let query = format!("select=game_id&{}", row_filter(user_id, None));
        let response = self
            .request(reqwest::Method::GET, &query)
            .send()
            .await
            .map_err(classify)?;
        let body = read_body(response, "favorites").await?;
        let rows: Vec<FavoriteRow> = serde_json::from_str(&body)?;
        Ok(rows.into_iter().map(|r| r.game_id).collect())
    }
}

/// Top scores from the `scores` table, read with the anonymous role
pub struct RestScores {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestScores {
    pub fn new(remote: &RemoteConfig, timeout: Duration) -> Result<Self> {
        let remote = remote.require()?;
        Ok(Self {
            client: build_client(timeout)?,
            base_url: remote.url.clone(),
            anon_key: remote.anon_key.clone(),
        })
    }
}

#[async_trait(?Send)]
impl ScoreSource for RestScores {
    async fn top_scores(&self, game_id: u32) -> Result<Vec<ScoreEntry>> {
        let url = format!("{}?{}", table_url(&self.base_url, "scores"), scores_query(game_id));
        trace!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .send()
            .await
            .map_err(classify)?;
        decode_scores(&read_body(response, "scores").await?)
    }
}
