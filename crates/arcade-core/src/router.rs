//! URL fragment routing
//!
//! Resolution order: parameterized prefixes (`/blog/<slug>`, `/search`,
//! `/game/<slug>`), then the static table, then legacy `/games/<slug>`, then
//! category slugs, then home.
//! Nothing ever resolves to an error.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::Category;

/// Parsed form of a URL fragment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteState {
    /// Path with a leading `/`, no trailing slash (except the root itself)
    pub path: String,
    pub segments: Vec<String>,
    pub query: BTreeMap<String, String>,
}

impl RouteState {
    /// Parse `#/path?query`, `/path?query` or `path`
    pub fn parse(fragment: &str) -> Self {
        let raw = fragment.trim().trim_start_matches('#');
        let (path_part, query_part) = match raw.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (raw, None),
        };

        let segments: Vec<String> = path_part
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        let path = format!("/{}", segments.join("/"));

        let query = query_part.map(parse_query).unwrap_or_default();

        Self {
            path,
            segments,
            query,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// Decode an `application/x-www-form-urlencoded` style query string.
/// The first occurrence of a key wins.
fn parse_query(query: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        params.entry(key).or_insert_with(|| decode_component(value));
    }
    params
}

/// Query values treat `+` as a space
fn decode_component(raw: &str) -> String {
    decode_segment(&raw.replace('+', " "))
}

/// Path segments keep `+` literal
fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Which page a fragment designates
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteIntent {
    Home,
    NewGames,
    PopularGames,
    MonthlyGames,
    /// Action, adventure and racing together
    BoysGames,
    Category(Category),
    Game { slug: String },
    Search { query: String },
    Blog,
    Article { slug: String },
    Favorites,
    ForYou,
    About,
    Contact,
}

const ARTICLE_PREFIX: &str = "/blog/";
const SEARCH_PREFIX: &str = "/search";
const GAME_PREFIX: &str = "/game/";

/// Exact-match table, including the legacy paths still linked from old posts
fn static_route(path: &str) -> Option<RouteIntent> {
    let intent = match path {
        "/" => RouteIntent::Home,
        "/games/new" | "/new-games" => RouteIntent::NewGames,
        "/games/popular" | "/popular" => RouteIntent::PopularGames,
        "/games/monthly" | "/monthly-games" => RouteIntent::MonthlyGames,
        "/boys-games" => RouteIntent::BoysGames,
        "/blog" => RouteIntent::Blog,
        "/favorites" => RouteIntent::Favorites,
        "/for-you" => RouteIntent::ForYou,
        "/about" => RouteIntent::About,
        "/contact" => RouteIntent::Contact,
        _ => return None,
    };
    Some(intent)
}

/// Resolve a fragment to a page intent
pub fn resolve(fragment: &str) -> RouteIntent {
    resolve_state(&RouteState::parse(fragment))
}

pub fn resolve_state(route: &RouteState) -> RouteIntent {
    let path = route.path.as_str();

    if let Some(slug) = path.strip_prefix(ARTICLE_PREFIX) {
        if !slug.is_empty() {
            return RouteIntent::Article {
                slug: decode_segment(slug),
            };
        }
    }

    if path == SEARCH_PREFIX || path.starts_with("/search/") {
        let query = route.param("q").unwrap_or_default().trim().to_string();
        return RouteIntent::Search { query };
    }

    if let Some(slug) = path.strip_prefix(GAME_PREFIX) {
        if !slug.is_empty() {
            return RouteIntent::Game {
                slug: decode_segment(slug),
            };
        }
    }

    if let Some(intent) = static_route(path) {
        return intent;
    }

    // Old DOS player links used `/games/<slug>`
    if let [first, slug] = route.segments.as_slice() {
        if first == "games" {
            return RouteIntent::Game {
                slug: decode_segment(slug),
            };
        }
    }

    // `/category/<slug>` and the bare `/<slug>` form
    let category_slug = match route.segments.as_slice() {
        [first, slug] if first == "category" => Some(slug.as_str()),
        [slug] => Some(slug.as_str()),
        _ => None,
    };
    if let Some(category) = category_slug.and_then(Category::from_slug) {
        return RouteIntent::Category(category);
    }

    RouteIntent::Home
}

impl RouteIntent {
    /// Canonical fragment path for this intent (without the `#`)
    pub fn path(&self) -> String {
        match self {
            RouteIntent::Home => "/".to_string(),
            RouteIntent::NewGames => "/games/new".to_string(),
            RouteIntent::PopularGames => "/games/popular".to_string(),
            RouteIntent::MonthlyGames => "/games/monthly".to_string(),
            RouteIntent::BoysGames => "/boys-games".to_string(),
            RouteIntent::Category(category) => format!("/category/{}", category.slug()),
            RouteIntent::Game { slug } => format!("{}{}", GAME_PREFIX, urlencoding::encode(slug)),
            RouteIntent::Search { query } => format!("/search?q={}", urlencoding::encode(query)),
            RouteIntent::Blog => "/blog".to_string(),
            RouteIntent::Article { slug } => format!("{}{}", ARTICLE_PREFIX, urlencoding::encode(slug)),
            RouteIntent::Favorites => "/favorites".to_string(),
            RouteIntent::ForYou => "/for-you".to_string(),
            RouteIntent::About => "/about".to_string(),
            RouteIntent::Contact => "/contact".to_string(),
        }
    }

    /// `#`-prefixed link target
    pub fn href(&self) -> String {
        format!("#{}", self.path())
    }
}

impl fmt::Display for RouteIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Tracks the active intent so navigation side effects (scroll reset, page
/// title) run only when the intent actually changes
#[derive(Debug, Clone, Default)]
pub struct RouteChange {
    current: Option<RouteIntent>,
}

impl RouteChange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `fragment`; returns the intent and whether it differs from the
    /// previous one
    pub fn navigate(&mut self, fragment: &str) -> (RouteIntent, bool) {
        let intent = resolve(fragment);
        let changed = self.current.as_ref() != Some(&intent);
        self.current = Some(intent.clone());
        (intent, changed)
    }

    pub fn current(&self) -> Option<&RouteIntent> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_route() {
        assert_eq!(
            resolve("/search?q=mario"),
            RouteIntent::Search {
                query: "mario".to_string()
            }
        );
        assert_eq!(
            resolve("#/search?q=super+mario%20bros"),
            RouteIntent::Search {
                query: "super mario bros".to_string()
            }
        );
        assert_eq!(
            resolve("/search"),
            RouteIntent::Search {
                query: String::new()
            }
        );
    }

    #[test]
    fn test_unknown_path_falls_back_home() {
        assert_eq!(resolve("/unknown-path-xyz"), RouteIntent::Home);
        assert_eq!(resolve(""), RouteIntent::Home);
        assert_eq!(resolve("#"), RouteIntent::Home);
        assert_eq!(resolve("/game/"), RouteIntent::Home);
        assert_eq!(resolve("/category/racing-games"), RouteIntent::Home);
    }

    #[test]
    fn test_static_table() {
        assert_eq!(resolve("/games/new"), RouteIntent::NewGames);
        assert_eq!(resolve("#/games/popular"), RouteIntent::PopularGames);
        assert_eq!(resolve("/games/monthly/"), RouteIntent::MonthlyGames);
        assert_eq!(resolve("/new-games"), RouteIntent::NewGames);
        assert_eq!(resolve("/boys-games"), RouteIntent::BoysGames);
        assert_eq!(resolve("/girls-games"), RouteIntent::Category(Category::Girls));
        assert_eq!(resolve("/blog"), RouteIntent::Blog);
        assert_eq!(resolve("/favorites"), RouteIntent::Favorites);
        assert_eq!(resolve("/for-you"), RouteIntent::ForYou);
        assert_eq!(resolve("/about"), RouteIntent::About);
        assert_eq!(resolve("/contact"), RouteIntent::Contact);
    }

    #[test]
    fn test_parameterized_routes() {
        assert_eq!(
            resolve("#/game/moto-x3m"),
            RouteIntent::Game {
                slug: "moto-x3m".to_string()
            }
        );
        assert_eq!(
            resolve("/games/prince-of-persia"),
            RouteIntent::Game {
                slug: "prince-of-persia".to_string()
            }
        );
        assert_eq!(
            resolve("/blog/safe-games-for-kids"),
            RouteIntent::Article {
                slug: "safe-games-for-kids".to_string()
            }
        );
    }

    #[test]
    fn test_plus_in_slug_is_literal() {
        assert_eq!(
            resolve("/game/c++"),
            RouteIntent::Game {
                slug: "c++".to_string()
            }
        );
        assert_eq!(
            resolve("/blog/a+b%20c"),
            RouteIntent::Article {
                slug: "a+b c".to_string()
            }
        );
        let intent = RouteIntent::Game {
            slug: "c++".to_string(),
        };
        assert_eq!(resolve(&intent.href()), intent);
    }

    #[test]
    fn test_category_routes() {
        assert_eq!(resolve("/category/car-games"), RouteIntent::Category(Category::Racing));
        assert_eq!(resolve("/puzzle-games"), RouteIntent::Category(Category::Puzzle));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        for fragment in ["/search?q=mario", "/game/x", "/nope", "/category/action-games"] {
            assert_eq!(resolve(fragment), resolve(fragment));
        }
    }

    #[test]
    fn test_path_round_trips_through_resolve() {
        let intents = [
            RouteIntent::Home,
            RouteIntent::MonthlyGames,
            RouteIntent::BoysGames,
            RouteIntent::Category(Category::Girls),
            RouteIntent::Search {
                query: "tower defense".to_string(),
            },
            RouteIntent::Article {
                slug: "history-of-dos-games".to_string(),
            },
        ];
        for intent in intents {
            assert_eq!(resolve(&intent.href()), intent);
        }
    }

    #[test]
    fn test_query_parsing() {
        let route = RouteState::parse("#/search?q=a%26b&q=ignored&page=2&flag");
        assert_eq!(route.param("q"), Some("a&b"));
        assert_eq!(route.param("page"), Some("2"));
        assert_eq!(route.param("flag"), Some(""));
        assert_eq!(route.segments, vec!["search".to_string()]);
    }

    #[test]
    fn test_route_change_detection() {
        let mut change = RouteChange::new();
        assert!(change.navigate("/blog").1);
        assert!(!change.navigate("#/blog/").1);
        assert!(change.navigate("/about").1);
        assert_eq!(change.current(), Some(&RouteIntent::About));
    }
}
