use arcade_core::recommend::featured;
use arcade_core::view::{CatalogFilter, SortOrder};
use arcade_core::{CatalogEntry, Category, RouteIntent};
use leptos::prelude::*;

use crate::app::{tr, SiteState};
use crate::components::{format_play_count, CategoryFilter, GameGrid};

#[component]
fn FeaturedGame(game: CatalogEntry) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let href = RouteIntent::Game {
        slug: game.slug.clone(),
    }
    .href();
    let name = game.name;
    let description = game.description;
    let play_count = game.play_count;

    view! {
        <section class="featured-game">
            <img src=game.thumbnail_url alt="" class="featured-backdrop"/>
            <div class="featured-info">
                <span class="featured-badge">
                    {move || tr(state.language.get(), "Featured Game", "اللعبة المميزة")}
                </span>
                <h1>{move || name.get(state.language.get()).to_string()}</h1>
                <p>
                    {move || {
                        description
                            .as_ref()
                            .map(|d| d.get(state.language.get()).to_string())
                            .unwrap_or_default()
                    }}
                </p>
                <span class="featured-plays">
                    {move || {
                        let language = state.language.get();
                        format!("{} {}", format_play_count(play_count, language), tr(language, "plays", "لعبة"))
                    }}
                </span>
                <a class="play-btn" href=href>{move || tr(state.language.get(), "Play Now", "العب الآن")}</a>
            </div>
        </section>
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let state = expect_context::<SiteState>();
    let selected = RwSignal::new(None::<Category>);
    let filter = Signal::derive(move || match selected.get() {
        Some(category) => CatalogFilter::new().category(category),
        None => CatalogFilter::new(),
    });
    let top = move || {
        state
            .catalog
            .with(|load| load.ready().and_then(|live| featured(live.visible()).cloned()))
    };

    view! {
        <div class="page home-page">
            {move || top().map(|game| view! { <FeaturedGame game=game/> })}
            <h2 class="section-title">{move || tr(state.language.get(), "Most Played", "الأكثر لعبًا")}</h2>
            <CategoryFilter selected=selected/>
            <GameGrid filter=filter sort=SortOrder::Popular/>
        </div>
    }
}
