//! Catalog records: games, articles and the enums they carry
//!
//! The wire shapes (`GameRecord`, `ArticleRecord`) follow the JSON feed, with
//! camelCase URL fields and per-language text columns. The public types fold
//! those columns into `Localized` pairs and validate on the way in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ar,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "ar" => Some(Language::Ar),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Language::Ar => Language::En,
            Language::En => Language::Ar,
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Ar)
    }
}

/// An English/Arabic text pair
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Localized {
    pub en: String,
    pub ar: String,
}

impl Localized {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Ar => &self.ar,
        }
    }

    /// Case-insensitive substring match against either language.
    /// `needle` must already be lowercased.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        self.en.to_lowercase().contains(needle) || self.ar.to_lowercase().contains(needle)
    }
}

/// Fixed game category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Action,
    Adventure,
    Puzzle,
    Sports,
    Racing,
    Girls,
    Strategy,
    Classic,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Action,
        Category::Adventure,
        Category::Puzzle,
        Category::Sports,
        Category::Racing,
        Category::Girls,
        Category::Strategy,
        Category::Classic,
    ];

    /// Categories collected on the `/boys-games` page
    pub const BOYS: [Category; 3] = [Category::Action, Category::Adventure, Category::Racing];

    /// URL slug used by `/category/<slug>` and the bare `/<slug>` form
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Action => "action-games",
            Category::Adventure => "adventure-games",
            Category::Puzzle => "puzzle-games",
            Category::Sports => "sports-games",
            Category::Racing => "car-games",
            Category::Girls => "girls-games",
            Category::Strategy => "strategy-games",
            Category::Classic => "classic-games",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.slug() == slug)
    }

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (Category::Action, Language::En) => "Action",
            (Category::Action, Language::Ar) => "أكشن",
            (Category::Adventure, Language::En) => "Adventure",
            (Category::Adventure, Language::Ar) => "مغامرات",
            (Category::Puzzle, Language::En) => "Puzzle",
            (Category::Puzzle, Language::Ar) => "ذكاء",
            (Category::Sports, Language::En) => "Sports",
            (Category::Sports, Language::Ar) => "رياضة",
            (Category::Racing, Language::En) => "Racing",
            (Category::Racing, Language::Ar) => "سيارات",
            (Category::Girls, Language::En) => "Girls",
            (Category::Girls, Language::Ar) => "بنات",
            (Category::Strategy, Language::En) => "Strategy",
            (Category::Strategy, Language::Ar) => "استراتيجية",
            (Category::Classic, Language::En) => "Classic",
            (Category::Classic, Language::Ar) => "كلاسيك",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label(Language::En))
    }
}

/// How a game is embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Engine {
    /// Plain iframe embed
    #[default]
    #[serde(rename = "html5")]
    StandardEmbed,
    /// Runs inside the in-page DOS emulator
    #[serde(rename = "dos")]
    LegacyEmulated,
}

pub const MAX_RATING: u8 = 3;

/// A single playable game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameRecord", into = "GameRecord")]
pub struct CatalogEntry {
    pub id: u32,
    pub slug: String,
    pub name: Localized,
    pub description: Option<Localized>,
    pub category: Category,
    pub tags: Vec<String>,
    pub thumbnail_url: String,
    pub play_url: String,
    pub play_count: u64,
    pub engine: Engine,
    pub rating: Option<u8>,
}

impl CatalogEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[derive(Serialize, Deserialize)]
struct GameRecord {
    id: u32,
    slug: String,
    name_en: String,
    name_ar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description_ar: Option<String>,
    category: Category,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(rename = "thumbnailUrl")]
    thumbnail_url: String,
    #[serde(rename = "gameUrl", alias = "playUrl")]
    play_url: String,
    #[serde(rename = "playCount", default)]
    play_count: u64,
    #[serde(default)]
    engine: Engine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating: Option<u8>,
}

impl TryFrom<GameRecord> for CatalogEntry {
    type Error = String;

    fn try_from(r: GameRecord) -> Result<Self, Self::Error> {
        if r.slug.trim().is_empty() {
            return Err(format!("game {} has an empty slug", r.id));
        }
        if let Some(rating) = r.rating.filter(|rating| *rating > MAX_RATING) {
            return Err(format!("game {} has rating {} above {}", r.id, rating, MAX_RATING));
        }
        let description = match (r.description_en, r.description_ar) {
            (None, None) => None,
            (en, ar) => Some(Localized::new(en.unwrap_or_default(), ar.unwrap_or_default())),
        };
        Ok(Self {
            id: r.id,
            slug: r.slug,
            name: Localized::new(r.name_en, r.name_ar),
            description,
            category: r.category,
            tags: r.tags,
            thumbnail_url: r.thumbnail_url,
            play_url: r.play_url,
            play_count: r.play_count,
            engine: r.engine,
            rating: r.rating,
        })
    }
}

impl From<CatalogEntry> for GameRecord {
    fn from(e: CatalogEntry) -> Self {
        let (description_en, description_ar) = match e.description {
            Some(d) => (Some(d.en), Some(d.ar)),
            None => (None, None),
        };
        Self {
            id: e.id,
            slug: e.slug,
            name_en: e.name.en,
            name_ar: e.name.ar,
            description_en,
            description_ar,
            category: e.category,
            tags: e.tags,
            thumbnail_url: e.thumbnail_url,
            play_url: e.play_url,
            play_count: e.play_count,
            engine: e.engine,
            rating: e.rating,
        }
    }
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ArticleRecord", into = "ArticleRecord")]
pub struct Article {
    pub slug: String,
    pub title: Localized,
    pub excerpt: Localized,
    pub content: Localized,
    pub image_url: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
    pub tags: Vec<String>,
    /// Minutes, always positive
    pub reading_time: u32,
}

#[derive(Serialize, Deserialize)]
struct ArticleRecord {
    slug: String,
    title_en: String,
    title_ar: String,
    #[serde(default)]
    excerpt_en: String,
    #[serde(default)]
    excerpt_ar: String,
    #[serde(default)]
    content_en: String,
    #[serde(default)]
    content_ar: String,
    #[serde(rename = "imageUrl")]
    image_url: String,
    #[serde(rename = "publishedAt")]
    published_at: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(rename = "readingTime")]
    reading_time: u32,
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates
fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl TryFrom<ArticleRecord> for Article {
    type Error = String;

    fn try_from(r: ArticleRecord) -> Result<Self, Self::Error> {
        if r.slug.trim().is_empty() {
            return Err("article has an empty slug".to_string());
        }
        if r.reading_time == 0 {
            return Err(format!("article {} has a zero reading time", r.slug));
        }
        let published_at = parse_published_at(&r.published_at)
            .ok_or_else(|| format!("article {} has invalid publishedAt '{}'", r.slug, r.published_at))?;
        Ok(Self {
            slug: r.slug,
            title: Localized::new(r.title_en, r.title_ar),
            excerpt: Localized::new(r.excerpt_en, r.excerpt_ar),
            content: Localized::new(r.content_en, r.content_ar),
            image_url: r.image_url,
            published_at,
            author: r.author,
            tags: r.tags,
            reading_time: r.reading_time,
        })
    }
}

impl From<Article> for ArticleRecord {
    fn from(a: Article) -> Self {
        Self {
            slug: a.slug,
            title_en: a.title.en,
            title_ar: a.title.ar,
            excerpt_en: a.excerpt.en,
            excerpt_ar: a.excerpt.ar,
            content_en: a.content.en,
            content_ar: a.content.ar,
            image_url: a.image_url,
            published_at: a.published_at.to_rfc3339(),
            author: a.author,
            tags: a.tags,
            reading_time: a.reading_time,
        }
    }
}

/// Signed-in user, if any. Sign-in itself happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn game(id: u32, play_count: u64) -> CatalogEntry {
        CatalogEntry {
            id,
            slug: format!("game-{}", id),
            name: Localized::new(format!("Game {}", id), format!("لعبة {}", id)),
            description: None,
            category: Category::Action,
            tags: Vec::new(),
            thumbnail_url: format!("https://cdn.example.com/{}.png", id),
            play_url: format!("https://play.example.com/{}/", id),
            play_count,
            engine: Engine::StandardEmbed,
            rating: None,
        }
    }

    pub fn game_in(id: u32, play_count: u64, category: Category) -> CatalogEntry {
        CatalogEntry {
            category,
            ..game(id, play_count)
        }
    }

    pub fn article(slug: &str, published: &str) -> Article {
        Article {
            slug: slug.to_string(),
            title: Localized::new(slug, slug),
            excerpt: Localized::default(),
            content: Localized::default(),
            image_url: String::new(),
            published_at: parse_published_at(published).unwrap(),
            author: "staff".to_string(),
            tags: Vec::new(),
            reading_time: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_slug_table() {
        for category in Category::ALL {
            assert_eq!(Category::from_slug(category.slug()), Some(category));
        }
        assert_eq!(Category::from_slug("car-games"), Some(Category::Racing));
        assert_eq!(Category::from_slug("racing-games"), None);
    }

    #[test]
    fn test_game_record_parsing() {
        let json = r#"{
            "id": 7, "slug": "tiny-racer", "name_en": "Tiny Racer", "name_ar": "المتسابق",
            "category": "Racing", "tags": ["cars"], "thumbnailUrl": "/t.png",
            "gameUrl": "https://games.example.com/tiny", "playCount": 42, "engine": "dos"
        }"#;
        let game: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(game.id, 7);
        assert_eq!(game.engine, Engine::LegacyEmulated);
        assert_eq!(game.name.get(Language::Ar), "المتسابق");
        assert!(game.description.is_none());
        assert!(game.has_tag("CARS"));
    }

    #[test]
    fn test_rating_above_bound_rejected() {
        let json = r#"{
            "id": 1, "slug": "x", "name_en": "X", "name_ar": "X", "category": "Puzzle",
            "thumbnailUrl": "", "gameUrl": "", "rating": 5
        }"#;
        assert!(serde_json::from_str::<CatalogEntry>(json).is_err());
    }

    #[test]
    fn test_article_date_forms() {
        assert!(parse_published_at("2024-03-01T12:00:00Z").is_some());
        assert!(parse_published_at("2024-03-01").is_some());
        assert!(parse_published_at("March 1st").is_none());
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::default(), Language::Ar);
        assert_eq!(Language::Ar.toggled(), Language::En);
    }
}
