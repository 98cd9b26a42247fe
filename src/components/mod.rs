mod game_grid;
mod layout;
mod leaderboard;
mod player;
mod preloader;
mod status;

pub use game_grid::{format_play_count, CategoryFilter, GameCard, GameGrid};
pub use layout::{Footer, Header};
pub use leaderboard::Leaderboard;
pub use player::GamePlayer;
pub use preloader::Preloader;
pub use status::render_load;
