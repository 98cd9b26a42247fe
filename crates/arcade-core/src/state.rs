//! Async page state and stale-response suppression

use crate::error::CatalogError;

/// Lifecycle of an async page load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Failed(CatalogError),
    Ready(T),
}

impl<T> LoadState<T> {
    /// Fold a fetch result in. A failure replaces any data shown before.
    pub fn from_result(result: Result<T, CatalogError>) -> Self {
        match result {
            Ok(value) => LoadState::Ready(value),
            Err(e) => LoadState::Failed(e),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CatalogError> {
        match self {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the UI should offer a retry button
    pub fn can_retry(&self) -> bool {
        self.error().is_some_and(CatalogError::is_retryable)
    }

    /// Borrowing `map`; only an error is cloned
    pub fn map_ref<U>(&self, f: impl FnOnce(&T) -> U) -> LoadState<U> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Failed(e) => LoadState::Failed(e.clone()),
            LoadState::Ready(value) => LoadState::Ready(f(value)),
        }
    }

    /// `map_ref` for lookups that can fail; a failed lookup fails the state
    pub fn try_map_ref<U>(&self, f: impl FnOnce(&T) -> Result<U, CatalogError>) -> LoadState<U> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Failed(e) => LoadState::Failed(e.clone()),
            LoadState::Ready(value) => LoadState::from_result(f(value)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Failed(e) => LoadState::Failed(e),
            LoadState::Ready(value) => LoadState::Ready(f(value)),
        }
    }
}

/// Handle for one in-flight request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub key: K,
    seq: u64,
}

/// Last-writer-wins request identity.
///
/// Every navigation calls `begin` with its key (a slug, a search query); a
/// response is applied only if its ticket is still the latest one.
#[derive(Debug, Clone)]
pub struct RequestTracker<K> {
    seq: u64,
    latest: Option<Ticket<K>>,
}

impl<K> Default for RequestTracker<K> {
    fn default() -> Self {
        Self { seq: 0, latest: None }
    }
}

impl<K: Clone + PartialEq> RequestTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, key: K) -> Ticket<K> {
        self.seq += 1;
        let ticket = Ticket { key, seq: self.seq };
        self.latest = Some(ticket.clone());
        ticket
    }

    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.latest.as_ref() == Some(ticket)
    }

    pub fn current_key(&self) -> Option<&K> {
        self.latest.as_ref().map(|t| &t.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_discards_cached_data() {
        let mut state = LoadState::Ready(vec![1, 2, 3]);
        assert_eq!(state.ready().map(Vec::len), Some(3));
        state = LoadState::from_result(Err(CatalogError::network("reset")));
        assert!(state.ready().is_none());
        assert!(state.can_retry());
    }

    #[test]
    fn test_malformed_response_offers_retry() {
        let state = LoadState::from_result(crate::catalog::decode_games(r#"{"items":[]}"#));
        assert!(matches!(state.error(), Some(CatalogError::Validation(_))));
        assert!(state.can_retry());
    }

    #[test]
    fn test_not_found_is_not_retryable() {
        let state: LoadState<()> = LoadState::Failed(CatalogError::game_not_found("x"));
        assert!(!state.can_retry());
        assert!(LoadState::<()>::default().is_loading());
    }

    #[test]
    fn test_map_ref_keeps_the_source() {
        let state = LoadState::Ready(vec![4, 5]);
        assert_eq!(state.map_ref(|v| v.len()), LoadState::Ready(2));
        assert_eq!(state.ready().map(Vec::len), Some(2));

        let failed: LoadState<Vec<u32>> = LoadState::Failed(CatalogError::network("reset"));
        assert!(failed.map_ref(|v| v.len()).can_retry());
    }

    #[test]
    fn test_failed_lookup_fails_the_state() {
        let state = LoadState::Ready(vec!["a".to_string()]);
        let missing = state.try_map_ref(|v| {
            v.iter()
                .find(|s| s.as_str() == "b")
                .cloned()
                .ok_or_else(|| CatalogError::game_not_found("b"))
        });
        assert!(matches!(missing.error(), Some(CatalogError::NotFound { .. })));
        assert!(!missing.can_retry());
        assert_eq!(state.try_map_ref(|v| Ok(v.len())), LoadState::Ready(1));
    }

    #[test]
    fn test_last_writer_wins() {
        let mut tracker = RequestTracker::new();
        let first = tracker.begin("moto-x3m".to_string());
        let second = tracker.begin("tiny-racer".to_string());
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));

        // Same key again: the older ticket is still stale
        let third = tracker.begin("tiny-racer".to_string());
        assert!(!tracker.is_current(&second));
        assert!(tracker.is_current(&third));
        assert_eq!(tracker.current_key().map(String::as_str), Some("tiny-racer"));
    }
}
