//! Lookups and the small recommendation lists shown around the site

use std::collections::BTreeSet;

use crate::catalog::{by_popularity, sort_articles};
use crate::error::{CatalogError, Result};
use crate::favorites::FavoriteSet;
use crate::model::{Article, CatalogEntry, Category};

/// Shown to visitors with no favorites yet
pub const FOR_YOU_COLD_START: usize = 12;
pub const FOR_YOU_LIMIT: usize = 24;
pub const RELATED_GAMES_LIMIT: usize = 10;
pub const RELATED_ARTICLES_LIMIT: usize = 3;

fn popular<'a>(entries: impl IntoIterator<Item = &'a CatalogEntry>) -> Vec<&'a CatalogEntry> {
    let mut sorted: Vec<&CatalogEntry> = entries.into_iter().collect();
    sorted.sort_by(|a, b| by_popularity(a, b));
    sorted
}

/// The most played entry (lowest id on ties)
pub fn featured<'a>(entries: impl IntoIterator<Item = &'a CatalogEntry>) -> Option<&'a CatalogEntry> {
    entries.into_iter().min_by(|a, b| by_popularity(a, b))
}

/// Personalized list: popular picks for a cold start, otherwise unplayed
/// entries from the categories the visitor already favors
pub fn for_you<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    favorites: &FavoriteSet,
) -> Vec<&'a CatalogEntry> {
    let all = popular(entries);
    if favorites.is_empty() {
        return all.into_iter().take(FOR_YOU_COLD_START).collect();
    }

    let liked: BTreeSet<Category> = all
        .iter()
        .filter(|e| favorites.contains(e.id))
        .map(|e| e.category)
        .collect();

    all.into_iter()
        .filter(|e| liked.contains(&e.category) && !favorites.contains(e.id))
        .take(FOR_YOU_LIMIT)
        .collect()
}

/// Other entries in the same category, most popular first
pub fn related_games<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    current: &CatalogEntry,
) -> Vec<&'a CatalogEntry> {
    popular(
        entries
            .into_iter()
            .filter(|e| e.category == current.category && e.id != current.id),
    )
    .into_iter()
    .take(RELATED_GAMES_LIMIT)
    .collect()
}

/// The newest other articles
pub fn related_articles(articles: &[Article], current_slug: &str) -> Vec<Article> {
    let mut others: Vec<Article> = articles
        .iter()
        .filter(|a| a.slug != current_slug)
        .cloned()
        .collect();
    sort_articles(&mut others);
    others.truncate(RELATED_ARTICLES_LIMIT);
    others
}

/// Distinct tags, case preserved from first sighting, sorted case-insensitively
pub fn tag_cloud<'a, I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut seen = BTreeSet::new();
    let mut cloud = Vec::new();
    for tag in tags.into_iter().flatten() {
        if seen.insert(tag.to_lowercase()) {
            cloud.push(tag.clone());
        }
    }
    cloud.sort_by_key(|t| t.to_lowercase());
    cloud
}

pub fn find_game<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    slug: &str,
) -> Result<&'a CatalogEntry> {
    entries
        .into_iter()
        .find(|e| e.slug == slug)
        .ok_or_else(|| CatalogError::game_not_found(slug))
}

pub fn find_article<'a>(articles: &'a [Article], slug: &str) -> Result<&'a Article> {
    articles
        .iter()
        .find(|a| a.slug == slug)
        .ok_or_else(|| CatalogError::article_not_found(slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{article, game, game_in};

    fn ids(entries: &[&CatalogEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_featured_is_most_played() {
        let entries = vec![game(1, 5), game(2, 50), game(3, 50)];
        assert_eq!(featured(&entries).map(|e| e.id), Some(2));
        assert!(featured(&Vec::<CatalogEntry>::new()).is_none());
    }

    #[test]
    fn test_for_you_cold_start() {
        let entries: Vec<CatalogEntry> = (1..=20).map(|i| game(i, i as u64)).collect();
        let picks = for_you(&entries, &FavoriteSet::new());
        assert_eq!(picks.len(), FOR_YOU_COLD_START);
        assert_eq!(picks[0].id, 20);
    }

    #[test]
    fn test_for_you_follows_favorite_categories() {
        let entries = vec![
            game_in(1, 10, Category::Puzzle),
            game_in(2, 30, Category::Puzzle),
            game_in(3, 20, Category::Puzzle),
            game_in(4, 99, Category::Racing),
        ];
        let favorites: FavoriteSet = [1].into_iter().collect();
        assert_eq!(ids(&for_you(&entries, &favorites)), vec![2, 3]);
    }

    #[test]
    fn test_related_games_excludes_current() {
        let current = game_in(1, 0, Category::Sports);
        let mut entries = vec![current.clone(), game_in(2, 3, Category::Racing)];
        entries.extend((10..25).map(|i| game_in(i, i as u64, Category::Sports)));
        let related = related_games(&entries, &current);
        assert_eq!(related.len(), RELATED_GAMES_LIMIT);
        assert!(related.iter().all(|e| e.category == Category::Sports && e.id != 1));
        assert_eq!(related[0].id, 24);
    }

    #[test]
    fn test_related_articles_newest_first() {
        let articles = vec![
            article("a", "2024-01-01"),
            article("b", "2024-03-01"),
            article("c", "2024-02-01"),
            article("d", "2024-04-01"),
            article("e", "2023-12-01"),
        ];
        let related: Vec<String> = related_articles(&articles, "d")
            .into_iter()
            .map(|a| a.slug)
            .collect();
        assert_eq!(related, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_tag_cloud_dedupes_case_insensitively() {
        let mut a = game(1, 0);
        a.tags = vec!["Cars".to_string(), "arcade".to_string()];
        let mut b = game(2, 0);
        b.tags = vec!["cars".to_string(), "Puzzle".to_string()];
        let entries = [a, b];
        let cloud = tag_cloud(entries.iter().map(|e| e.tags.as_slice()));
        assert_eq!(cloud, vec!["arcade", "Cars", "Puzzle"]);
    }

    #[test]
    fn test_lookups_report_not_found() {
        let entries = vec![game(1, 0)];
        assert_eq!(find_game(&entries, "game-1").map(|e| e.id), Ok(1));
        assert_eq!(
            find_game(&entries, "missing").unwrap_err(),
            CatalogError::game_not_found("missing")
        );
        let articles = vec![article("hello", "2024-01-01")];
        assert!(matches!(
            find_article(&articles, "nope"),
            Err(CatalogError::NotFound { kind: "article", .. })
        ));
    }
}
