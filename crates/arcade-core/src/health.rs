//! Best-effort reachability checks for embedded games
//!
//! Cross-origin responses are often opaque, so a probe can only really tell a
//! hard network failure apart from "something answered". Anything short of a
//! failure counts as reachable (fail-open); the verdict keeps the confidence
//! level around for callers that want to show it.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::model::{CatalogEntry, Engine};

/// Default number of probes allowed in flight at once
pub const DEFAULT_PROBE_CONCURRENCY: usize = 8;

/// Health of a single catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Reachable,
    Unreachable,
}

/// Outcome of one probe, with its confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    /// The server answered with a success or redirect status
    Confirmed,
    /// Something answered but the status is unreadable or unexpected
    Inconclusive,
    /// Network or DNS failure
    Failed,
}

impl ProbeVerdict {
    pub fn status(&self) -> HealthStatus {
        match self {
            ProbeVerdict::Confirmed | ProbeVerdict::Inconclusive => HealthStatus::Reachable,
            ProbeVerdict::Failed => HealthStatus::Unreachable,
        }
    }
}

/// Relative URLs ship with the site itself and are never probed
pub fn is_bundled_url(url: &str) -> bool {
    !url.starts_with("http")
}

/// An existence check against a play URL
#[async_trait(?Send)]
pub trait Probe {
    async fn probe(&self, url: &str) -> ProbeVerdict;
}

/// Per-entry health, keyed by catalog id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthRegistry {
    statuses: HashMap<u32, HealthStatus>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, id: u32) -> HealthStatus {
        self.statuses.get(&id).copied().unwrap_or_default()
    }

    pub fn is_unreachable(&self, id: u32) -> bool {
        self.status(id) == HealthStatus::Unreachable
    }

    /// Record a verdict. Only the first verdict for an id counts, since probes
    /// are not retried within a session. Returns the new status if it changed.
    pub fn record(&mut self, id: u32, verdict: ProbeVerdict) -> Option<HealthStatus> {
        let current = self.statuses.entry(id).or_default();
        if *current != HealthStatus::Unknown {
            return None;
        }
        *current = verdict.status();
        Some(*current)
    }

    pub fn unreachable_count(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| **s == HealthStatus::Unreachable)
            .count()
    }

    /// Forget everything (full refetch)
    pub fn reset(&mut self) {
        self.statuses.clear();
    }
}

/// Summary of one health pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthReport {
    pub probed: usize,
    pub confirmed: usize,
    pub inconclusive: usize,
    pub failed: usize,
    /// Standard-embed entries with bundled URLs, accepted without a request
    pub skipped: usize,
}

impl HealthReport {
    fn count(&mut self, verdict: ProbeVerdict) {
        match verdict {
            ProbeVerdict::Confirmed => self.confirmed += 1,
            ProbeVerdict::Inconclusive => self.inconclusive += 1,
            ProbeVerdict::Failed => self.failed += 1,
        }
    }
}

/// Probe every standard-embed entry and report each verdict as it arrives.
///
/// `on_verdict` is invoked in completion order, not issue order. Emulated
/// entries are skipped entirely.
pub async fn check_catalog<P, F>(
    entries: &[CatalogEntry],
    prober: &P,
    concurrency: usize,
    mut on_verdict: F,
) -> HealthReport
where
    P: Probe + ?Sized,
    F: FnMut(u32, ProbeVerdict),
{
    let mut report = HealthReport::default();
    let mut candidates = Vec::new();

    for entry in entries.iter().filter(|e| e.engine == Engine::StandardEmbed) {
        if is_bundled_url(&entry.play_url) {
            report.skipped += 1;
            on_verdict(entry.id, ProbeVerdict::Confirmed);
        } else {
            candidates.push((entry.id, entry.play_url.clone()));
        }
    }

    debug!("Probing {} game URLs", candidates.len());

    let mut verdicts = stream::iter(candidates)
        .map(|(id, url)| async move {
            let verdict = prober.probe(&url).await;
            if verdict == ProbeVerdict::Failed {
                warn!("Health check failed for {}", url);
            }
            (id, verdict)
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((id, verdict)) = verdicts.next().await {
        report.probed += 1;
        report.count(verdict);
        on_verdict(id, verdict);
    }

    report
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::fixtures::game;
    use std::collections::HashSet;

    /// Fails every URL in `dead`, confirms the rest
    pub struct FakeProber {
        pub dead: HashSet<String>,
    }

    #[async_trait(?Send)]
    impl Probe for FakeProber {
        async fn probe(&self, url: &str) -> ProbeVerdict {
            if self.dead.contains(url) {
                ProbeVerdict::Failed
            } else {
                ProbeVerdict::Confirmed
            }
        }
    }

    #[test]
    fn test_fail_open_mapping() {
        assert_eq!(ProbeVerdict::Inconclusive.status(), HealthStatus::Reachable);
        assert_eq!(ProbeVerdict::Failed.status(), HealthStatus::Unreachable);
    }

    #[test]
    fn test_registry_first_verdict_wins() {
        let mut registry = HealthRegistry::new();
        assert_eq!(registry.status(4), HealthStatus::Unknown);
        assert_eq!(registry.record(4, ProbeVerdict::Failed), Some(HealthStatus::Unreachable));
        assert_eq!(registry.record(4, ProbeVerdict::Confirmed), None);
        assert!(registry.is_unreachable(4));
        registry.reset();
        assert_eq!(registry.status(4), HealthStatus::Unknown);
    }

    #[tokio::test]
    async fn test_check_catalog_skips_emulated_and_bundled() {
        let mut emulated = game(2, 0);
        emulated.engine = Engine::LegacyEmulated;
        let mut bundled = game(3, 0);
        bundled.play_url = "/games/local/index.html".to_string();
        let dead = game(4, 0);
        let prober = FakeProber {
            dead: [dead.play_url.clone()].into_iter().collect(),
        };
        let entries = vec![game(1, 0), emulated, bundled, dead];

        let mut seen = Vec::new();
        let report = check_catalog(&entries, &prober, 2, |id, verdict| seen.push((id, verdict))).await;

        assert_eq!(report.probed, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert!(seen.contains(&(4, ProbeVerdict::Failed)));
        assert!(!seen.iter().any(|(id, _)| *id == 2));
    }
}
