//! Site header (navigation, search, language toggle) and footer

use arcade_core::model::Category;
use arcade_core::RouteIntent;
use leptos::prelude::*;

use crate::app::{tr, SiteState, SITE_NAME};

struct NavLink {
    intent: RouteIntent,
    en: &'static str,
    ar: &'static str,
}

fn nav_links() -> Vec<NavLink> {
    vec![
        NavLink { intent: RouteIntent::Home, en: "Home", ar: "الرئيسية" },
        NavLink { intent: RouteIntent::NewGames, en: "New Games", ar: "الألعاب الجديدة" },
        NavLink { intent: RouteIntent::PopularGames, en: "Popular", ar: "الأكثر لعبًا" },
        NavLink { intent: RouteIntent::Favorites, en: "My Favorites", ar: "مفضلتي" },
        NavLink { intent: RouteIntent::ForYou, en: "For You", ar: "لأجلك" },
        NavLink { intent: RouteIntent::Blog, en: "Blog", ar: "المدونة" },
    ]
}

fn navigate(intent: &RouteIntent) {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_hash(&intent.path());
    }
}

#[component]
pub fn Header() -> impl IntoView {
    let state = expect_context::<SiteState>();
    let (query, set_query) = signal(String::new());

    let on_search = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let term = query.get_untracked().trim().to_string();
        if !term.is_empty() {
            navigate(&RouteIntent::Search { query: term });
            set_query.set(String::new());
        }
    };

    view! {
        <header class="site-header">
            <a class="logo" href=RouteIntent::Home.href()>{SITE_NAME}</a>
            <nav class="site-nav">
                {nav_links()
                    .into_iter()
                    .map(|link| {
                        let href = link.intent.href();
                        let active = {
                            let intent = link.intent.clone();
                            move || state.route.get() == intent
                        };
                        view! {
                            <a href=href class:active=active>
                                {move || tr(state.language.get(), link.en, link.ar)}
                            </a>
                        }
                    })
                    .collect_view()}
            </nav>
            <form class="search-form" on:submit=on_search>
                <input
                    type="search"
                    placeholder=move || tr(state.language.get(), "Search for a game...", "ابحث عن لعبة...")
                    prop:value=query
                    on:input=move |ev| set_query.set(event_target_value(&ev))
                />
            </form>
            <button class="language-toggle" on:click=move |_| state.toggle_language()>
                {move || tr(state.language.get(), "عربي", "EN")}
            </button>
        </header>
    }
}

#[component]
pub fn Footer() -> impl IntoView {
    let state = expect_context::<SiteState>();
    view! {
        <footer class="site-footer">
            <nav class="footer-categories">
                {Category::ALL
                    .iter()
                    .map(|category| {
                        let category = *category;
                        view! {
                            <a href=RouteIntent::Category(category).href()>
                                {move || category.label(state.language.get())}
                            </a>
                        }
                    })
                    .collect_view()}
            </nav>
            <nav class="footer-links">
                <a href=RouteIntent::BoysGames.href()>
                    {move || tr(state.language.get(), "Boys Games", "ألعاب أولاد")}
                </a>
                <a href=RouteIntent::MonthlyGames.href()>
                    {move || tr(state.language.get(), "Games of the Month", "ألعاب الشهر")}
                </a>
                <a href=RouteIntent::About.href()>{move || tr(state.language.get(), "About", "من نحن")}</a>
                <a href=RouteIntent::Contact.href()>{move || tr(state.language.get(), "Contact", "اتصل بنا")}</a>
            </nav>
            <p class="copyright">{SITE_NAME}</p>
        </footer>
    }
}
