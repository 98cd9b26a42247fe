//! Arcade Core - catalog loading, health filtering, preloading, views, routing, favorites
//! and leaderboards

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod favorites;
pub mod health;
pub mod leaderboard;
pub mod live;
pub mod model;
pub mod preload;
pub mod recommend;
#[cfg(feature = "net")]
pub mod remote;
pub mod router;
pub mod source;
pub mod state;
pub mod view;

pub use config::SiteConfig;
pub use error::{CatalogError, Result};
pub use live::LiveCatalog;
pub use model::{Article, CatalogEntry, Category, Engine, Language};
pub use router::{resolve, RouteIntent};
pub use source::{CatalogLoader, CatalogSource, StaticSnapshot};
