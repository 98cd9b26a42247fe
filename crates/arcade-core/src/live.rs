//! The materialized catalog, pruned in place as health verdicts arrive

use crate::health::{HealthRegistry, HealthStatus, ProbeVerdict};
use crate::model::CatalogEntry;

/// Catalog as currently delivered to views.
///
/// Unlike a one-shot snapshot this changes after delivery: an entry that fails
/// its probe disappears from `visible()` and `revision` moves forward, which is
/// what views key their page reset on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveCatalog {
    entries: Vec<CatalogEntry>,
    health: HealthRegistry,
    revision: u64,
}

impl LiveCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            health: HealthRegistry::new(),
            revision: 1,
        }
    }

    /// Swap in a freshly fetched catalog; health starts over
    pub fn replace(&mut self, entries: Vec<CatalogEntry>) {
        self.entries = entries;
        self.health.reset();
        self.revision += 1;
    }

    /// Apply one probe result. Returns true if the entry left the visible set.
    pub fn apply_verdict(&mut self, id: u32, verdict: ProbeVerdict) -> bool {
        let known = self.entries.iter().any(|e| e.id == id);
        if !known {
            return false;
        }
        match self.health.record(id, verdict) {
            Some(HealthStatus::Unreachable) => {
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn health(&self) -> &HealthRegistry {
        &self.health
    }

    pub fn is_loaded(&self) -> bool {
        self.revision > 0
    }

    /// Entries not marked unreachable, in delivery order
    pub fn visible(&self) -> impl Iterator<Item = &CatalogEntry> + '_ {
        self.entries.iter().filter(|e| !self.health.is_unreachable(e.id))
    }

    pub fn visible_entries(&self) -> Vec<CatalogEntry> {
        self.visible().cloned().collect()
    }

    /// Every fetched entry, including unreachable ones
    pub fn all(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn visible_len(&self) -> usize {
        self.visible().count()
    }

    pub fn find_visible(&self, slug: &str) -> Option<&CatalogEntry> {
        self.visible().find(|e| e.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::game;

    #[test]
    fn test_unreachable_entry_leaves_view_without_refetch() {
        let mut live = LiveCatalog::new(vec![game(1, 10), game(2, 20), game(3, 30)]);
        let before = live.revision();

        assert!(live.apply_verdict(2, ProbeVerdict::Failed));
        let ids: Vec<u32> = live.visible().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(live.revision() > before);
        assert!(live.find_visible("game-2").is_none());
        assert_eq!(live.all().len(), 3);
    }

    #[test]
    fn test_reachable_verdict_keeps_revision() {
        let mut live = LiveCatalog::new(vec![game(1, 10)]);
        let before = live.revision();
        assert!(!live.apply_verdict(1, ProbeVerdict::Inconclusive));
        assert_eq!(live.revision(), before);
        assert_eq!(live.visible_len(), 1);
    }

    #[test]
    fn test_replace_resets_health() {
        let mut live = LiveCatalog::new(vec![game(1, 10), game(2, 5)]);
        live.apply_verdict(1, ProbeVerdict::Failed);
        assert_eq!(live.visible_len(), 1);

        live.replace(vec![game(1, 10), game(2, 5)]);
        assert_eq!(live.visible_len(), 2);
        assert_eq!(live.health().unreachable_count(), 0);
    }

    #[test]
    fn test_unknown_id_ignored() {
        let mut live = LiveCatalog::new(vec![game(1, 10)]);
        assert!(!live.apply_verdict(99, ProbeVerdict::Failed));
        assert_eq!(live.health().unreachable_count(), 0);
    }
}
