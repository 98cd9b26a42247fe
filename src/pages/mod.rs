mod blog;
mod game;
mod games;
mod home;
mod info;

pub use blog::{ArticlePage, BlogPage};
pub use game::GamePage;
pub use games::{
    BoysGamesPage, CategoryPage, FavoritesPage, ForYouPage, ListingKind, ListingPage, SearchPage,
};
pub use home::HomePage;
pub use info::{AboutPage, ContactPage};
