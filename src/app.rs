use arcade_core::context::SiteContext;
use arcade_core::favorites::FavoriteSet;
use arcade_core::health::{check_catalog, DEFAULT_PROBE_CONCURRENCY};
use arcade_core::router::RouteChange;
use arcade_core::state::{LoadState, RequestTracker, Ticket};
use arcade_core::{Article, CatalogEntry, Language, LiveCatalog, RouteIntent, SiteConfig};
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::console;

use crate::api::{self, BrowserProber};
use crate::components::{Footer, Header, Preloader};
use crate::pages::{
    AboutPage, ArticlePage, BlogPage, BoysGamesPage, CategoryPage, ContactPage, FavoritesPage,
    ForYouPage, GamePage, HomePage, ListingKind, ListingPage, SearchPage,
};
use crate::storage::BrowserStorage;

pub const SITE_NAME: &str = "Arcade";

pub type Context = SiteContext<BrowserStorage>;

/// Pick the string for the active language
pub fn tr(language: Language, en: &'static str, ar: &'static str) -> &'static str {
    match language {
        Language::En => en,
        Language::Ar => ar,
    }
}

/// Shared site state, provided once at the root
#[derive(Clone, Copy)]
pub struct SiteState {
    pub ctx: RwSignal<Context>,
    pub language: Memo<Language>,
    /// Favorites by value; preload traffic on `ctx` does not reach readers
    pub favorites: Memo<FavoriteSet>,
    pub catalog: RwSignal<LoadState<LiveCatalog>>,
    pub articles: RwSignal<LoadState<Vec<Article>>>,
    pub route: ReadSignal<RouteIntent>,
    catalog_requests: StoredValue<RequestTracker<()>>,
    article_requests: StoredValue<RequestTracker<()>>,
}

impl SiteState {
    pub fn config(&self) -> SiteConfig {
        self.ctx.with_untracked(|c| c.config().clone())
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.favorites.with(|f| f.contains(id))
    }

    pub fn toggle_favorite(&self, id: u32) {
        if let Some(Err(e)) = self.ctx.try_update(|c| c.toggle_local_favorite(id)) {
            console::error_1(&format!("Failed to save favorite {}: {}", id, e).into());
        }
    }

    pub fn toggle_language(&self) {
        if let Some(Err(e)) = self.ctx.try_update(|c| c.toggle_language()) {
            console::error_1(&format!("Failed to save language: {}", e).into());
        }
    }

    /// Visible entries once the catalog is ready
    pub fn visible_games(&self) -> Option<Vec<CatalogEntry>> {
        self.catalog.with(|c| c.ready().map(LiveCatalog::visible_entries))
    }

    /// Fetch the catalog, then probe it. A newer reload makes both the fetch
    /// result and any late verdicts of this one stale.
    pub fn reload_catalog(&self) {
        let Some(ticket) = self.catalog_requests.try_update_value(|t| t.begin(())) else {
            return;
        };
        let state = *self;
        let config = self.config();
        self.catalog.set(LoadState::Loading);

        spawn_local(async move {
            let result = api::catalog_loader(&config).load_catalog().await;
            if !state.catalog_requests.with_value(|t| t.is_current(&ticket)) {
                return;
            }
            match result {
                Ok(entries) => {
                    state.catalog.set(LoadState::Ready(LiveCatalog::new(entries.clone())));
                    state.check_health(&entries, &ticket, &config).await;
                }
                Err(e) => {
                    console::error_1(&format!("Failed to load games: {}", e).into());
                    state.catalog.set(LoadState::Failed(e));
                }
            }
        });
    }

    async fn check_health(&self, entries: &[CatalogEntry], ticket: &Ticket<()>, config: &SiteConfig) {
        let prober = BrowserProber::new(config.probe_timeout());
        let catalog = self.catalog;
        let requests = self.catalog_requests;
        let report = check_catalog(entries, &prober, DEFAULT_PROBE_CONCURRENCY, |id, verdict| {
            if !requests.with_value(|t| t.is_current(ticket)) {
                return;
            }
            catalog.maybe_update(|state| match state {
                LoadState::Ready(live) => live.apply_verdict(id, verdict),
                _ => false,
            });
        })
        .await;
        console::log_1(
            &format!(
                "Health check: {} probed, {} unreachable, {} bundled",
                report.probed, report.failed, report.skipped
            )
            .into(),
        );
    }

    pub fn reload_articles(&self) {
        let Some(ticket) = self.article_requests.try_update_value(|t| t.begin(())) else {
            return;
        };
        let state = *self;
        let config = self.config();
        self.articles.set(LoadState::Loading);

        spawn_local(async move {
            let result = api::catalog_loader(&config).load_articles().await;
            if !state.article_requests.with_value(|t| t.is_current(&ticket)) {
                return;
            }
            if let Err(e) = &result {
                console::error_1(&format!("Failed to load articles: {}", e).into());
            }
            state.articles.set(LoadState::from_result(result));
        });
    }
}

fn current_fragment() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

fn page_title(intent: &RouteIntent, language: Language) -> String {
    let section = match intent {
        RouteIntent::Home => return SITE_NAME.to_string(),
        RouteIntent::NewGames => tr(language, "New Games", "الألعاب الجديدة"),
        RouteIntent::PopularGames => tr(language, "Popular", "الأكثر لعبًا"),
        RouteIntent::MonthlyGames => tr(language, "Games of the Month", "ألعاب الشهر"),
        RouteIntent::BoysGames => tr(language, "Boys Games", "ألعاب أولاد"),
        RouteIntent::Category(category) => category.label(language),
        RouteIntent::Game { .. } => tr(language, "Play", "العب"),
        RouteIntent::Search { .. } => tr(language, "Search", "بحث"),
        RouteIntent::Blog | RouteIntent::Article { .. } => tr(language, "Blog", "المدونة"),
        RouteIntent::Favorites => tr(language, "My Favorites", "مفضلتي"),
        RouteIntent::ForYou => tr(language, "For You", "لأجلك"),
        RouteIntent::About => tr(language, "About", "من نحن"),
        RouteIntent::Contact => tr(language, "Contact", "اتصل بنا"),
    };
    format!("{} | {}", section, SITE_NAME)
}

#[component]
pub fn App() -> impl IntoView {
    let ctx = RwSignal::new(SiteContext::init(BrowserStorage, api::site_config()));
    let language = Memo::new(move |_| ctx.with(|c| c.language()));
    let favorites = Memo::new(move |_| ctx.with(|c| c.favorites().set().clone()));

    let route_change = StoredValue::new(RouteChange::new());
    let initial = route_change
        .try_update_value(|r| r.navigate(&current_fragment()).0)
        .unwrap_or(RouteIntent::Home);
    let (route, set_route) = signal(initial);

    let state = SiteState {
        ctx,
        language,
        favorites,
        catalog: RwSignal::new(LoadState::Loading),
        articles: RwSignal::new(LoadState::Loading),
        route,
        catalog_requests: StoredValue::new(RequestTracker::new()),
        article_requests: StoredValue::new(RequestTracker::new()),
    };
    provide_context(state);

    // Scroll reset only on an actual intent change
    let _ = window_event_listener(leptos::ev::hashchange, move |_| {
        let Some((intent, changed)) = route_change.try_update_value(|r| r.navigate(&current_fragment()))
        else {
            return;
        };
        if changed {
            if let Some(window) = web_sys::window() {
                window.scroll_to_with_x_and_y(0.0, 0.0);
            }
            set_route.set(intent);
        }
    });

    Effect::new(move |_| {
        let language = language.get();
        let title = page_title(&route.get(), language);
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        document.set_title(&title);
        if let Some(root) = document.document_element() {
            let _ = root.set_attribute("lang", language.code());
            let _ = root.set_attribute("dir", if language.is_rtl() { "rtl" } else { "ltr" });
        }
    });

    state.reload_catalog();
    state.reload_articles();

    view! {
        <div class="app-container">
            <Header/>
            <main class="main-content">
                {move || match route.get() {
                    RouteIntent::Home => view! { <HomePage/> }.into_any(),
                    RouteIntent::NewGames => view! { <ListingPage kind=ListingKind::New/> }.into_any(),
                    RouteIntent::PopularGames => view! { <ListingPage kind=ListingKind::Popular/> }.into_any(),
                    RouteIntent::MonthlyGames => view! { <ListingPage kind=ListingKind::Monthly/> }.into_any(),
                    RouteIntent::BoysGames => view! { <BoysGamesPage/> }.into_any(),
                    RouteIntent::Category(category) => view! { <CategoryPage category=category/> }.into_any(),
                    RouteIntent::Game { slug } => view! { <GamePage slug=slug/> }.into_any(),
                    RouteIntent::Search { query } => view! { <SearchPage query=query/> }.into_any(),
                    RouteIntent::Blog => view! { <BlogPage/> }.into_any(),
                    RouteIntent::Article { slug } => view! { <ArticlePage slug=slug/> }.into_any(),
                    RouteIntent::Favorites => view! { <FavoritesPage/> }.into_any(),
                    RouteIntent::ForYou => view! { <ForYouPage/> }.into_any(),
                    RouteIntent::About => view! { <AboutPage/> }.into_any(),
                    RouteIntent::Contact => view! { <ContactPage/> }.into_any(),
                }}
            </main>
            <Footer/>
            <Preloader/>
        </div>
    }
}
