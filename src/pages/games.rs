//! Catalog listings: curated lists, categories, search, favorites, For You

use arcade_core::recommend::{for_you, FOR_YOU_COLD_START};
use arcade_core::view::{CatalogFilter, SortOrder};
use arcade_core::{Category, Language, RouteIntent};
use leptos::prelude::*;

use crate::app::{tr, SiteState};
use crate::components::{render_load, CategoryFilter, GameCard, GameGrid};

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_AR: [&str; 12] = [
    "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو", "يوليو", "أغسطس", "سبتمبر", "أكتوبر",
    "نوفمبر", "ديسمبر",
];

/// "<Month> <year>" in the visitor's clock
fn current_month(language: Language) -> String {
    let now = js_sys::Date::new_0();
    let month = (now.get_month() as usize).min(11);
    let name = match language {
        Language::En => MONTHS_EN[month],
        Language::Ar => MONTHS_AR[month],
    };
    format!("{} {}", name, now.get_full_year())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    New,
    Popular,
    Monthly,
}

impl ListingKind {
    fn sort(self) -> SortOrder {
        match self {
            ListingKind::New => SortOrder::Newest,
            ListingKind::Popular | ListingKind::Monthly => SortOrder::Popular,
        }
    }

    fn title(self, language: Language) -> String {
        match self {
            ListingKind::New => tr(language, "New Games", "الألعاب الجديدة").to_string(),
            ListingKind::Popular => tr(language, "Most Popular Games", "الألعاب الأكثر شعبية").to_string(),
            ListingKind::Monthly => format!(
                "{} {}",
                tr(language, "Top Games of", "أفضل ألعاب شهر"),
                current_month(language)
            ),
        }
    }
}

#[component]
pub fn ListingPage(kind: ListingKind) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let selected = RwSignal::new(None::<Category>);
    let filter = Signal::derive(move || match selected.get() {
        Some(category) => CatalogFilter::new().category(category),
        None => CatalogFilter::new(),
    });

    view! {
        <div class="page listing-page">
            <h1>{move || kind.title(state.language.get())}</h1>
            <Show when=move || kind == ListingKind::Monthly>
                <CategoryFilter selected=selected/>
            </Show>
            <GameGrid filter=filter sort=kind.sort()/>
        </div>
    }
}

#[component]
pub fn CategoryPage(category: Category) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let filter = Signal::derive(move || CatalogFilter::new().category(category));
    view! {
        <div class="page category-page">
            <h1>{move || category.label(state.language.get())}</h1>
            <GameGrid filter=filter/>
        </div>
    }
}

/// Several categories under one heading
#[component]
pub fn BoysGamesPage() -> impl IntoView {
    let state = expect_context::<SiteState>();
    let selected = RwSignal::new(None::<Category>);
    let filter = Signal::derive(move || {
        let filter = CatalogFilter::new().categories(Category::BOYS);
        match selected.get() {
            Some(category) => filter.category(category),
            None => filter,
        }
    });

    view! {
        <div class="page category-page">
            <h1>{move || tr(state.language.get(), "Boys Games", "ألعاب أولاد")}</h1>
            <div class="category-filter">
                <button class:active=move || selected.get().is_none() on:click=move |_| selected.set(None)>
                    {move || tr(state.language.get(), "All", "الكل")}
                </button>
                {Category::BOYS
                    .into_iter()
                    .map(|category| view! {
                        <button
                            class:active=move || selected.get() == Some(category)
                            on:click=move |_| selected.set(Some(category))
                        >
                            {move || category.label(state.language.get())}
                        </button>
                    })
                    .collect_view()}
            </div>
            <GameGrid filter=filter/>
        </div>
    }
}

#[component]
pub fn SearchPage(query: String) -> impl IntoView {
    let state = expect_context::<SiteState>();
    if query.is_empty() {
        return view! {
            <div class="page search-page">
                <p class="empty-state">
                    {move || tr(state.language.get(), "Type a game name to search.", "اكتب اسم لعبة للبحث.")}
                </p>
            </div>
        }
        .into_any();
    }

    let heading = query.clone();
    let filter = Signal::derive(move || CatalogFilter::new().search(query.clone()));
    view! {
        <div class="page search-page">
            <h1>
                {move || tr(state.language.get(), "Search results for", "نتائج البحث عن")}
                " \""
                {heading}
                "\""
            </h1>
            <GameGrid filter=filter/>
        </div>
    }
    .into_any()
}

#[component]
pub fn FavoritesPage() -> impl IntoView {
    let state = expect_context::<SiteState>();
    let ids = Memo::new(move |_| state.favorites.with(|f| f.ids().clone()));
    let filter = Signal::derive(move || CatalogFilter::new().ids(ids.get()));

    view! {
        <div class="page favorites-page">
            <h1>{move || tr(state.language.get(), "My Favorites", "مفضلتي")}</h1>
            <Show
                when=move || !ids.with(|ids| ids.is_empty())
                fallback=move || view! {
                    <div class="empty-state">
                        <p>
                            {move || tr(
                                state.language.get(),
                                "You have not added any favorites yet. Tap the heart on a game to keep it here.",
                                "لم تقم بإضافة أي ألعاب إلى المفضلة بعد. اضغط على القلب في أي لعبة لحفظها هنا.",
                            )}
                        </p>
                        <a href=RouteIntent::Home.href()>
                            {move || tr(state.language.get(), "Browse games", "تصفح الألعاب")}
                        </a>
                    </div>
                }
            >
                <GameGrid filter=filter/>
            </Show>
        </div>
    }
}

#[component]
pub fn ForYouPage() -> impl IntoView {
    let state = expect_context::<SiteState>();
    let on_retry = Callback::new(move |_| state.reload_catalog());
    let picks = move || {
        let favorites = state.favorites.get();
        let cold_start = favorites.is_empty();
        let picks = state.catalog.with(|load| {
            load.map_ref(|live| for_you(live.visible(), &favorites).into_iter().cloned().collect::<Vec<_>>())
        });
        (cold_start, picks)
    };

    view! {
        <div class="page for-you-page">
            <h1>{move || tr(state.language.get(), "Picked For You", "مختارة لأجلك")}</h1>
            {move || {
                let (cold_start, picks) = picks();
                let language = state.language.get();
                let intro = match (cold_start, language) {
                    (true, Language::En) => format!(
                        "Favorite a few games to personalize this list. Until then, here are the {} most played.",
                        FOR_YOU_COLD_START
                    ),
                    (true, Language::Ar) => format!(
                        "أضف بعض الألعاب إلى المفضلة لتخصيص هذه القائمة. إلى ذلك الحين، إليك أكثر {} لعبة لعبًا.",
                        FOR_YOU_COLD_START
                    ),
                    (false, _) => tr(language, "More from the categories you love.", "المزيد من الفئات التي تحبها.").to_string(),
                };
                view! {
                    <p class="page-intro">{intro}</p>
                    {render_load(&picks, on_retry, |games| {
                        view! {
                            <div class="game-grid">
                                {games.iter().cloned().map(|game| view! { <GameCard game=game/> }).collect_view()}
                            </div>
                        }
                    })}
                }
            }}
        </div>
    }
}
