//! Arcade CLI - browse the game catalog, check game health and manage favorites

mod logging;
mod storage;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use arcade_core::context::SiteContext;
use arcade_core::favorites::FavoritesScope;
use arcade_core::health::{check_catalog, DEFAULT_PROBE_CONCURRENCY};
use arcade_core::leaderboard::ScoreSource;
use arcade_core::model::AuthSession;
use arcade_core::preload::{warm, PreloadQueue};
use arcade_core::recommend;
use arcade_core::remote::{
    HttpPreloader, HttpProber, HttpSnapshot, RestFavorites, RestScores, RestSource,
};
use arcade_core::router::{self, RouteIntent, RouteState};
use arcade_core::view::{CatalogFilter, SortOrder, ViewState};
use arcade_core::{
    Article, CatalogEntry, CatalogLoader, CatalogSource, Category, Engine, Language, LiveCatalog,
    SiteConfig, StaticSnapshot,
};

use storage::JsonFileStorage;

#[derive(Parser)]
#[command(name = "arcade-cli")]
#[command(author, version, about = "Arcade browser-game catalog CLI", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Client storage file for language and anonymous favorites
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Use the bundled snapshot only, never the network catalog
    #[arg(long, global = true)]
    offline: bool,

    /// Signed-in user id; favorites then live in the remote table
    #[arg(long, global = true, env = "ARCADE_USER_ID")]
    user: Option<String>,

    /// Access token for the signed-in user
    #[arg(long, global = true, env = "ARCADE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Show debug logs on the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Popular,
    Newest,
    Name,
}

#[derive(Subcommand)]
enum Commands {
    /// List games, filtered, sorted and paginated
    Games {
        /// Category slug or English name (e.g. "car-games", "puzzle"); repeat
        /// to match any of several
        #[arg(short, long, value_parser = parse_category)]
        category: Vec<Category>,

        #[arg(short, long)]
        tag: Option<String>,

        /// Substring of the English or Arabic name
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, value_enum, default_value = "popular")]
        sort: SortArg,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Overrides the configured page size; 0 lists everything
        #[arg(long)]
        page_size: Option<usize>,

        /// Only favorited games
        #[arg(long)]
        favorites: bool,

        /// Probe play URLs first and hide unreachable games
        #[arg(long)]
        check_health: bool,
    },

    /// Show one game and related games
    Game { slug: String },

    /// Show a game's leaderboard (needs the REST backend)
    Scores {
        /// Game id or slug
        game: String,
    },

    /// Show the most played game
    Featured,

    /// Recommendations based on favorites
    ForYou,

    /// List articles, newest first
    Articles {
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show one article
    Article { slug: String },

    /// List every tag in use
    Tags,

    /// Resolve a URL fragment to the page it designates
    Route { fragment: String },

    /// Probe every game's play URL
    Health {
        #[arg(long, default_value_t = DEFAULT_PROBE_CONCURRENCY)]
        concurrency: usize,
    },

    /// Warm play URLs through the bounded preload queue
    Preload {
        /// URLs to preload; defaults to the most popular games
        urls: Vec<String>,

        /// Number of popular games to preload when no URLs are given
        #[arg(long, default_value_t = 6)]
        top: usize,

        /// Simultaneous loads (defaults to the configured cap)
        #[arg(long)]
        cap: Option<usize>,
    },

    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Show or set the UI language
    Language {
        #[arg(value_parser = parse_language)]
        code: Option<Language>,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorited games
    List,
    /// Add or remove a game (by id or slug)
    Toggle { game: String },
}

fn parse_category(raw: &str) -> std::result::Result<Category, String> {
    Category::from_slug(raw)
        .or_else(|| {
            Category::ALL
                .into_iter()
                .find(|c| c.label(Language::En).eq_ignore_ascii_case(raw))
        })
        .ok_or_else(|| format!("unknown category '{}'", raw))
}

fn parse_language(raw: &str) -> std::result::Result<Language, String> {
    Language::from_code(raw).ok_or_else(|| format!("unknown language '{}' (use ar or en)", raw))
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "arcade")
}

fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

fn default_storage_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("storage.json"))
        .unwrap_or_else(|| PathBuf::from("storage.json"))
}

fn load_config(path: Option<&Path>) -> Result<SiteConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let config = if path.exists() {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        SiteConfig::from_toml_str(&raw).with_context(|| format!("Invalid config {}", path.display()))?
    } else {
        debug!("No config at {}, using defaults", path.display());
        SiteConfig::default()
    };
    Ok(config.with_process_env())
}

/// Remote REST catalog if configured, else the hosted snapshot if configured;
/// the bundled snapshot is always the fallback
fn build_loader(config: &SiteConfig, offline: bool) -> Result<CatalogLoader> {
    let primary: Option<Box<dyn CatalogSource>> = if offline {
        None
    } else if config.remote.is_configured() {
        Some(Box::new(RestSource::new(&config.remote, config.fetch_timeout())?))
    } else if let Some(base) = &config.snapshot_base_url {
        Some(Box::new(HttpSnapshot::new(base, config.fetch_timeout())?))
    } else {
        None
    };
    Ok(CatalogLoader::new(StaticSnapshot::bundled()).with_optional_primary(primary))
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Probe the catalog, pruning unreachable games as verdicts arrive
async fn run_health(live: &mut LiveCatalog, config: &SiteConfig, concurrency: usize) -> Result<()> {
    let prober = HttpProber::new(config.probe_timeout())?;
    let entries = live.all().to_vec();
    let probed = entries
        .iter()
        .filter(|e| e.engine == Engine::StandardEmbed)
        .count();
    let pb = progress_bar(probed as u64);
    pb.set_message("probing");

    let report = check_catalog(&entries, &prober, concurrency, |id, verdict| {
        pb.inc(1);
        if live.apply_verdict(id, verdict) {
            pb.set_message(format!("{} unreachable", live.health().unreachable_count()));
        }
    })
    .await;
    pb.finish_and_clear();

    info!(
        "Health: {} probed, {} confirmed, {} inconclusive, {} failed, {} bundled",
        report.probed, report.confirmed, report.inconclusive, report.failed, report.skipped
    );
    Ok(())
}

struct Session {
    config: SiteConfig,
    loader: CatalogLoader,
    ctx: SiteContext<JsonFileStorage>,
    remote: Option<RestFavorites>,
}

impl Session {
    async fn open(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref())?;
        let loader = build_loader(&config, cli.offline)?;
        let storage_path = cli.storage.clone().unwrap_or_else(default_storage_path);
        let mut ctx = SiteContext::init(JsonFileStorage::open(storage_path), config.clone());

        let mut remote = None;
        if let Some(user_id) = &cli.user {
            let favorites = RestFavorites::new(&config.remote, config.fetch_timeout())
                .context("Remote favorites need SUPABASE_URL and SUPABASE_ANON_KEY")?
                .with_access_token(cli.access_token.clone());
            let session = AuthSession {
                user_id: user_id.clone(),
                email: None,
                access_token: cli.access_token.clone(),
            };
            ctx.sign_in(session, &favorites)
                .await
                .context("Failed to load remote favorites")?;
            remote = Some(favorites);
        }

        Ok(Self {
            config,
            loader,
            ctx,
            remote,
        })
    }

    fn language(&self) -> Language {
        self.ctx.language()
    }

    async fn live_catalog(&self) -> Result<LiveCatalog> {
        let games = self.loader.load_catalog().await.context("Failed to load games")?;
        Ok(LiveCatalog::new(games))
    }

    async fn articles(&self) -> Result<Vec<Article>> {
        self.loader.load_articles().await.context("Failed to load articles")
    }
}

fn print_games(entries: &[&CatalogEntry], session: &Session) {
    let lang = session.language();
    for entry in entries {
        let star = if session.ctx.favorites().contains(entry.id) { "*" } else { " " };
        println!(
            "{}{:>4}  {:<32} {:<12} {:>8}  {}",
            star,
            entry.id,
            entry.name.get(lang),
            entry.category.label(lang),
            entry.play_count,
            entry.slug
        );
    }
}

fn print_article_line(article: &Article, lang: Language) {
    println!(
        "{}  {:<40} {} min  {}",
        article.published_at.format("%Y-%m-%d"),
        article.title.get(lang),
        article.reading_time,
        article.slug
    );
}

fn resolve_game<'a>(live: &'a LiveCatalog, game: &str) -> Result<&'a CatalogEntry> {
    if let Ok(id) = game.parse::<u32>() {
        if let Some(entry) = live.all().iter().find(|e| e.id == id) {
            return Ok(entry);
        }
    }
    Ok(recommend::find_game(live.all(), game)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.verbose);

    match &cli.command {
        Commands::Route { fragment } => cmd_route(fragment),
        Commands::Config => cmd_config(&load_config(cli.config.as_deref())?)?,
        command => {
            let mut session = Session::open(&cli).await?;
            run_command(&mut session, command).await?;
            session.ctx.flush().context("Failed to save client storage")?;
        }
    }
    Ok(())
}

/// Commands that read the catalog or client storage
async fn run_command(session: &mut Session, command: &Commands) -> Result<()> {
    match command {
        Commands::Games {
            category,
            tag,
            search,
            sort,
            page,
            page_size,
            favorites,
            check_health,
        } => {
            let mut filter = match category.as_slice() {
                [] => CatalogFilter::new(),
                [one] => CatalogFilter::new().category(*one),
                many => CatalogFilter::new().categories(many.iter().copied()),
            };
            filter.tag = tag.clone();
            filter.search = search.clone();
            if *favorites {
                filter = filter.ids(session.ctx.favorites().set().ids().iter().copied());
            }
            let sort = match sort {
                SortArg::Popular => SortOrder::Popular,
                SortArg::Newest => SortOrder::Newest,
                SortArg::Name => SortOrder::Name(session.language()),
            };
            let page_size = page_size.unwrap_or(session.config.page_size);
            cmd_games(session, filter, sort, page_size, *page, *check_health).await?;
        }
        Commands::Game { slug } => cmd_game(session, slug).await?,
        Commands::Scores { game } => cmd_scores(session, game).await?,
        Commands::Featured => {
            let live = session.live_catalog().await?;
            match recommend::featured(live.visible()) {
                Some(entry) => print_games(&[entry], session),
                None => println!("No games available"),
            }
        }
        Commands::ForYou => {
            let live = session.live_catalog().await?;
            let picks = recommend::for_you(live.visible(), session.ctx.favorites().set());
            if picks.is_empty() {
                println!("Nothing new in your favorite categories yet");
            }
            print_games(&picks, session);
        }
        Commands::Articles { tag } => {
            let lang = session.language();
            let articles = session.articles().await?;
            let mut shown = 0;
            for article in articles
                .iter()
                .filter(|a| tag.as_ref().is_none_or(|t| a.tags.iter().any(|x| x.eq_ignore_ascii_case(t))))
            {
                print_article_line(article, lang);
                shown += 1;
            }
            if shown == 0 {
                println!("No articles found");
            }
        }
        Commands::Article { slug } => cmd_article(session, slug).await?,
        Commands::Tags => {
            let live = session.live_catalog().await?;
            let articles = session.articles().await?;
            let game_tags = recommend::tag_cloud(live.visible().map(|e| e.tags.as_slice()));
            let article_tags = recommend::tag_cloud(articles.iter().map(|a| a.tags.as_slice()));
            println!("Games:    {}", game_tags.join(", "));
            println!("Articles: {}", article_tags.join(", "));
        }
        Commands::Health { concurrency } => {
            let mut live = session.live_catalog().await?;
            run_health(&mut live, &session.config, *concurrency).await?;
            let unreachable: Vec<&CatalogEntry> = live
                .all()
                .iter()
                .filter(|e| live.health().is_unreachable(e.id))
                .collect();
            println!(
                "{} of {} games reachable",
                live.visible_len(),
                live.all().len()
            );
            if !unreachable.is_empty() {
                println!("\nUnreachable:");
                print_games(&unreachable, session);
            }
        }
        Commands::Preload { urls, top, cap } => {
            let urls: Vec<String> = if urls.is_empty() {
                let live = session.live_catalog().await?;
                let popular: Vec<String> = live
                    .visible()
                    .filter(|e| e.engine == Engine::StandardEmbed)
                    .take(*top)
                    .map(|e| e.play_url.clone())
                    .collect();
                popular
            } else {
                urls.clone()
            };
            if let Some(cap) = cap {
                *session.ctx.preload_mut() = PreloadQueue::new(*cap);
            }
            cmd_preload(&session.config, &urls, session.ctx.preload_mut()).await?;
        }
        Commands::Favorites { action } => match action {
            FavoritesAction::List => {
                let live = session.live_catalog().await?;
                let favorites = session.ctx.favorites().set();
                let entries: Vec<&CatalogEntry> =
                    live.all().iter().filter(|e| favorites.contains(e.id)).collect();
                if entries.is_empty() {
                    println!("No favorites yet");
                }
                print_games(&entries, session);
            }
            FavoritesAction::Toggle { game } => {
                let live = session.live_catalog().await?;
                let entry = resolve_game(&live, game)?;
                let (id, name) = (entry.id, entry.name.get(session.language()).to_string());
                let now = session
                    .ctx
                    .toggle_favorite(id, session.remote.as_ref())
                    .await
                    .context("Failed to update favorites")?;
                let scope = match session.ctx.favorites().scope() {
                    FavoritesScope::Local => "local",
                    FavoritesScope::User(_) => "account",
                };
                if now {
                    println!("Added {} to {} favorites", name, scope);
                } else {
                    println!("Removed {} from {} favorites", name, scope);
                }
            }
        },
        Commands::Language { code } => match code {
            Some(language) => {
                session.ctx.set_language(*language).context("Failed to save language")?;
                println!("Language set to {}", language.code());
            }
            None => println!("{}", session.language().code()),
        },
        Commands::Route { .. } | Commands::Config => bail!("this command does not open a session"),
    }

    Ok(())
}

async fn cmd_games(
    session: &Session,
    filter: CatalogFilter,
    sort: SortOrder,
    page_size: usize,
    page: usize,
    check_health: bool,
) -> Result<()> {
    let mut live = session.live_catalog().await?;
    if check_health {
        run_health(&mut live, &session.config, DEFAULT_PROBE_CONCURRENCY).await?;
    }

    let mut view = ViewState::new(page_size).with_filter(filter).with_sort(sort);
    view.observe(&live);
    view.go_to(page);
    let result = view.page(&live);

    if result.is_empty() {
        println!("No games found");
        return Ok(());
    }
    let refs: Vec<&CatalogEntry> = result.entries.iter().collect();
    print_games(&refs, session);
    println!(
        "\nPage {}/{} ({} games){}{}",
        result.page_index,
        result.total_pages,
        result.total_matches,
        if result.has_prev() { "  [--page prev]" } else { "" },
        if result.has_next() { "  [--page next]" } else { "" },
    );
    if page != result.page_index {
        debug!("Requested page {} clamped to {}", page, result.page_index);
    }
    Ok(())
}

async fn cmd_game(session: &Session, slug: &str) -> Result<()> {
    let lang = session.language();
    let live = session.live_catalog().await?;
    let game = recommend::find_game(live.visible(), slug)?;

    println!("{} ({})", game.name.get(lang), game.name.get(lang.toggled()));
    println!("  Category:  {}", game.category.label(lang));
    println!("  Plays:     {}", game.play_count);
    if let Some(rating) = game.rating {
        println!("  Rating:    {}/{}", rating, arcade_core::model::MAX_RATING);
    }
    if !game.tags.is_empty() {
        println!("  Tags:      {}", game.tags.join(", "));
    }
    let engine = match game.engine {
        Engine::StandardEmbed => "embed",
        Engine::LegacyEmulated => "DOS emulator",
    };
    println!("  Runs in:   {}", engine);
    println!("  Play:      {}", game.play_url);
    if let Some(description) = &game.description {
        println!("\n{}", description.get(lang));
    }

    let related = recommend::related_games(live.visible(), game);
    if !related.is_empty() {
        println!("\nRelated:");
        print_games(&related, session);
    }
    Ok(())
}

async fn cmd_scores(session: &Session, game: &str) -> Result<()> {
    let lang = session.language();
    let live = session.live_catalog().await?;
    let entry = resolve_game(&live, game)?;
    let scores = RestScores::new(&session.config.remote, session.config.fetch_timeout())?
        .top_scores(entry.id)
        .await
        .with_context(|| format!("Failed to load scores for {}", entry.slug))?;

    println!("Leaderboard: {}", entry.name.get(lang));
    if scores.is_empty() {
        println!("No scores yet");
    }
    for row in &scores {
        println!(
            "{:>3}. {:<24} {:>10}",
            row.rank,
            row.player.as_deref().unwrap_or("Anonymous"),
            row.score
        );
    }
    Ok(())
}

async fn cmd_article(session: &Session, slug: &str) -> Result<()> {
    let lang = session.language();
    let articles = session.articles().await?;
    let article = recommend::find_article(&articles, slug)?;

    println!("{}", article.title.get(lang));
    println!(
        "{} · {} · {} min read",
        article.author,
        article.published_at.format("%Y-%m-%d"),
        article.reading_time
    );
    println!("\n{}", article.content.get(lang));

    let related = recommend::related_articles(&articles, slug);
    if !related.is_empty() {
        println!("\nMore articles:");
        for other in &related {
            print_article_line(other, lang);
        }
    }
    Ok(())
}

fn cmd_route(fragment: &str) {
    let state = RouteState::parse(fragment);
    let intent = router::resolve_state(&state);
    println!("path:   {}", state.path);
    if !state.query.is_empty() {
        for (key, value) in &state.query {
            println!("query:  {} = {}", key, value);
        }
    }
    println!("intent: {:?}", intent);
    println!("link:   {}", intent.href());
    if intent == RouteIntent::Home && state.path != "/" {
        warn!("'{}' does not match any page; showing home", fragment);
    }
}

fn cmd_config(config: &SiteConfig) -> Result<()> {
    let mut shown = config.clone();
    if !shown.remote.anon_key.is_empty() {
        shown.remote.anon_key = "********".to_string();
    }
    print!("{}", shown.to_toml_string()?);
    println!("# config file: {}", default_config_path().display());
    Ok(())
}

async fn cmd_preload(config: &SiteConfig, urls: &[String], queue: &mut PreloadQueue) -> Result<()> {
    if urls.is_empty() {
        bail!("Nothing to preload");
    }
    let loader = HttpPreloader::new(config.fetch_timeout())?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Preloading {} URLs, {} at a time", urls.len(), queue.cap()));
    spinner.enable_steady_tick(Duration::from_millis(120));
    let report = warm(queue, &loader, urls).await;
    spinner.finish_and_clear();

    let stats = queue.stats();
    println!("Preloaded {} URLs ({} failed)", stats.completed, report.failed.len());
    for url in &report.failed {
        println!("  failed: {}", url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_accepts_slug_and_name() {
        assert_eq!(parse_category("car-games"), Ok(Category::Racing));
        assert_eq!(parse_category("puzzle"), Ok(Category::Puzzle));
        assert!(parse_category("racing-games").is_err());
    }

    #[test]
    fn test_offline_loader_has_no_primary() {
        let mut config = SiteConfig::default();
        config.remote.url = "https://abc.supabase.co".to_string();
        config.remote.anon_key = "key".to_string();
        assert!(!build_loader(&config, true).unwrap().has_primary());
        assert!(build_loader(&config, false).unwrap().has_primary());
        assert!(!build_loader(&SiteConfig::default(), false).unwrap().has_primary());
    }

    #[tokio::test]
    async fn test_bundled_catalog_pages() {
        let loader = build_loader(&SiteConfig::default(), true).unwrap();
        let live = LiveCatalog::new(loader.load_catalog().await.unwrap());
        let mut view = ViewState::new(5);
        view.observe(&live);
        let first = view.page(&live);
        assert_eq!(first.entries.len(), 5);
        assert_eq!(first.total_matches, live.visible_len());
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 12\npreload_cap = 2\n").unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.preload_cap, 2);
    }

    #[test]
    fn test_category_flag_repeats() {
        let cli = Cli::try_parse_from(["arcade-cli", "games", "-c", "action-games", "-c", "car-games"]).unwrap();
        match cli.command {
            Commands::Games { category, .. } => assert_eq!(category, vec![Category::Action, Category::Racing]),
            _ => panic!("expected the games command"),
        }
        let cli = Cli::try_parse_from(["arcade-cli", "scores", "moto-x3m"]).unwrap();
        assert!(matches!(cli.command, Commands::Scores { game } if game == "moto-x3m"));
    }

    #[tokio::test]
    async fn test_sessionless_command_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("storage.json").display().to_string();
        let config = dir.path().join("config.toml").display().to_string();
        let cli = Cli::try_parse_from([
            "arcade-cli",
            "--offline",
            "--storage",
            storage.as_str(),
            "--config",
            config.as_str(),
            "route",
            "/boys-games",
        ])
        .unwrap();
        let mut session = Session::open(&cli).await.unwrap();
        assert!(run_command(&mut session, &cli.command).await.is_err());
    }
}
