//! Bounded-concurrency admission queue for background game preloads
//!
//! A URL moves `Unrequested -> Queued -> Loading -> Completed` and never
//! skips a step. At most `cap` URLs are loading at once; the rest wait in
//! strict FIFO order. `Completed` is terminal whether the load succeeded or
//! not, so a broken URL cannot cause a retry storm.

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace};

/// Default number of simultaneous preloads
pub const DEFAULT_PRELOAD_CAP: usize = 3;

/// Per-URL preload state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreloadState {
    #[default]
    Unrequested,
    Queued,
    Loading,
    Completed,
}

/// Counters for status displays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadStats {
    pub queued: usize,
    pub loading: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadQueue {
    cap: usize,
    states: HashMap<String, PreloadState>,
    pending: VecDeque<String>,
    /// Loading URLs in admission order
    loading: Vec<String>,
}

impl Default for PreloadQueue {
    fn default() -> Self {
        Self::new(DEFAULT_PRELOAD_CAP)
    }
}

impl PreloadQueue {
    /// Create a queue admitting at most `cap` loads (minimum 1)
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            states: HashMap::new(),
            pending: VecDeque::new(),
            loading: Vec::new(),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn state(&self, url: &str) -> PreloadState {
        self.states.get(url).copied().unwrap_or_default()
    }

    pub fn is_preloaded(&self, url: &str) -> bool {
        self.state(url) == PreloadState::Completed
    }

    /// Whether `request(url)` would change the queue
    pub fn accepts(&self, url: &str) -> bool {
        !url.is_empty() && self.state(url) == PreloadState::Unrequested
    }

    /// Whether `complete(url)` would change the queue
    pub fn is_loading(&self, url: &str) -> bool {
        self.state(url) == PreloadState::Loading
    }

    /// Ask for `url` to be preloaded.
    ///
    /// Ignored if the URL is already queued, loading or completed. Returns the
    /// URLs admitted to `Loading` by this call, which the caller must start.
    pub fn request(&mut self, url: &str) -> Vec<String> {
        if !self.accepts(url) {
            return Vec::new();
        }
        trace!("Preload queued: {}", url);
        self.states.insert(url.to_string(), PreloadState::Queued);
        self.pending.push_back(url.to_string());
        self.admit()
    }

    /// Mark a loading URL as finished (success and failure alike) and backfill
    /// the freed slot. Returns newly admitted URLs.
    pub fn complete(&mut self, url: &str) -> Vec<String> {
        if !self.is_loading(url) {
            debug!("Ignoring completion for {} (not loading)", url);
            return Vec::new();
        }
        self.loading.retain(|u| u != url);
        self.states.insert(url.to_string(), PreloadState::Completed);
        trace!("Preload completed: {}", url);
        self.admit()
    }

    fn admit(&mut self) -> Vec<String> {
        let mut admitted = Vec::new();
        while self.loading.len() < self.cap {
            let Some(next) = self.pending.pop_front() else {
                break;
            };
            self.states.insert(next.clone(), PreloadState::Loading);
            self.loading.push(next.clone());
            admitted.push(next);
        }
        admitted
    }

    /// URLs currently loading, oldest admission first
    pub fn loading(&self) -> &[String] {
        &self.loading
    }

    /// URLs waiting for a slot, next to be admitted first
    pub fn pending(&self) -> impl Iterator<Item = &String> + '_ {
        self.pending.iter()
    }

    pub fn stats(&self) -> PreloadStats {
        PreloadStats {
            queued: self.pending.len(),
            loading: self.loading.len(),
            completed: self
                .states
                .values()
                .filter(|s| **s == PreloadState::Completed)
                .count(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.loading.is_empty()
    }
}

/// Performs the actual background load for an admitted URL
#[async_trait(?Send)]
pub trait PreloadLoader {
    /// Load `url`; the error string is only logged
    async fn load(&self, url: &str) -> Result<(), String>;
}

/// Outcome of a `warm` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmReport {
    /// URLs in the order they were admitted to loading
    pub admitted: Vec<String>,
    pub failed: Vec<String>,
}

async fn load_one<L>(loader: &L, url: String) -> (String, Result<(), String>)
where
    L: PreloadLoader + ?Sized,
{
    let result = loader.load(&url).await;
    (url, result)
}

/// Request every URL, run admitted loads concurrently and complete them as
/// they finish, until the queue drains
pub async fn warm<L>(queue: &mut PreloadQueue, loader: &L, urls: &[String]) -> WarmReport
where
    L: PreloadLoader + ?Sized,
{
    let mut report = WarmReport::default();
    let mut in_flight = FuturesUnordered::new();

    for url in urls {
        for admitted in queue.request(url) {
            report.admitted.push(admitted.clone());
            in_flight.push(load_one(loader, admitted));
        }
    }

    while let Some((url, result)) = in_flight.next().await {
        if let Err(e) = result {
            debug!("Preload of {} failed: {}", url, e);
            report.failed.push(url.clone());
        }
        for admitted in queue.complete(&url) {
            report.admitted.push(admitted.clone());
            in_flight.push(load_one(loader, admitted));
        }
    }

    report
}
