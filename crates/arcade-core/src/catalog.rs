//! Payload decoding, validation and the default orderings

use serde::de::DeserializeOwned;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{CatalogError, Result};
use crate::model::{Article, CatalogEntry};

/// Feed bodies come either as a bare array (REST table) or wrapped in an
/// envelope (`{"games": [...]}` / `{"posts": [...]}` static files)
fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<Vec<T>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let items = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => match map.remove("games").or_else(|| map.remove("posts")) {
            Some(inner @ serde_json::Value::Array(_)) => inner,
            _ => {
                return Err(CatalogError::Validation(format!(
                    "{} payload is missing its record array",
                    what
                )));
            }
        },
        _ => {
            return Err(CatalogError::Validation(format!(
                "{} payload is not an array or envelope",
                what
            )));
        }
    };
    Ok(serde_json::from_value(items)?)
}

/// Decode and validate a game feed body
pub fn decode_games(body: &str) -> Result<Vec<CatalogEntry>> {
    let games: Vec<CatalogEntry> = decode(body, "games")?;
    validate_games(&games)?;
    Ok(games)
}

/// Decode and validate an article feed body
pub fn decode_articles(body: &str) -> Result<Vec<Article>> {
    let articles: Vec<Article> = decode(body, "posts")?;
    validate_articles(&articles)?;
    Ok(articles)
}

/// `id` and `slug` must both be unique across the catalog
pub fn validate_games(games: &[CatalogEntry]) -> Result<()> {
    let mut ids = HashSet::with_capacity(games.len());
    let mut slugs = HashSet::with_capacity(games.len());
    for game in games {
        if !ids.insert(game.id) {
            return Err(CatalogError::Validation(format!("duplicate game id {}", game.id)));
        }
        if !slugs.insert(game.slug.as_str()) {
            return Err(CatalogError::Validation(format!("duplicate game slug '{}'", game.slug)));
        }
    }
    Ok(())
}

pub fn validate_articles(articles: &[Article]) -> Result<()> {
    let mut slugs = HashSet::with_capacity(articles.len());
    for article in articles {
        if !slugs.insert(article.slug.as_str()) {
            return Err(CatalogError::Validation(format!(
                "duplicate article slug '{}'",
                article.slug
            )));
        }
    }
    Ok(())
}

/// Most played first, ties by ascending id
pub fn by_popularity(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    b.play_count.cmp(&a.play_count).then(a.id.cmp(&b.id))
}

/// Newest first (higher id means added later)
pub fn by_newest(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    b.id.cmp(&a.id)
}

/// Default catalog ordering applied by the fetch layer
pub fn sort_catalog(games: &mut [CatalogEntry]) {
    games.sort_by(by_popularity);
}

/// Default article ordering: newest publication first, ties by slug
pub fn sort_articles(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{article, game};

    #[test]
    fn test_default_ordering_scenario() {
        let mut games = vec![game(1, 500), game(2, 900), game(3, 100)];
        sort_catalog(&mut games);
        let ids: Vec<u32> = games.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        games.sort_by(by_newest);
        let ids: Vec<u32> = games.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let mut games = vec![game(9, 10), game(4, 10), game(6, 10)];
        sort_catalog(&mut games);
        let ids: Vec<u32> = games.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![4, 6, 9]);
    }

    #[test]
    fn test_article_ordering() {
        let mut posts = vec![
            article("b", "2024-01-01"),
            article("c", "2024-06-01"),
            article("a", "2024-01-01"),
        ];
        sort_articles(&mut posts);
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_decode_both_shapes() {
        let record = r#"{"id":1,"slug":"a","name_en":"A","name_ar":"A","category":"Action","thumbnailUrl":"","gameUrl":""}"#;
        let bare = format!("[{}]", record);
        let wrapped = format!(r#"{{"games":[{}]}}"#, record);
        assert_eq!(decode_games(&bare).unwrap().len(), 1);
        assert_eq!(decode_games(&wrapped).unwrap().len(), 1);
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        assert!(matches!(decode_games(r#"{"items":[]}"#), Err(CatalogError::Validation(_))));
        assert!(matches!(decode_games("42"), Err(CatalogError::Validation(_))));
        assert!(matches!(decode_games("not json"), Err(CatalogError::Validation(_))));
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let mut second = game(2, 0);
        second.slug = "game-1".to_string();
        let err = validate_games(&[game(1, 0), second]).unwrap_err();
        assert!(err.to_string().contains("duplicate game slug"));
    }
}
