use arcade_core::recommend::{find_game, related_games};
use arcade_core::{CatalogEntry, RouteIntent};
use leptos::prelude::*;

use crate::app::{tr, SiteState};
use crate::components::{format_play_count, render_load, GameCard, GamePlayer, Leaderboard};

#[component]
fn GameDetail(game: CatalogEntry) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let id = game.id;
    let name = game.name.clone();
    let description = game.description.clone();
    let category = game.category;
    let play_count = game.play_count;
    let tags = game.tags.clone();

    // Recomputed as entries drop out; the player above stays mounted
    let current = game.clone();
    let related = Memo::new(move |_| {
        state.catalog.with(|load| {
            load.ready()
                .map(|live| {
                    related_games(live.visible(), &current)
                        .into_iter()
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    });

    view! {
        <article class="game-detail">
            <GamePlayer game=game/>
            <header class="game-header">
                <h1>{move || name.get(state.language.get()).to_string()}</h1>
                <button
                    class="favorite-btn"
                    class:active=move || state.is_favorite(id)
                    on:click=move |_| state.toggle_favorite(id)
                >
                    {move || {
                        let language = state.language.get();
                        if state.is_favorite(id) {
                            tr(language, "♥ In favorites", "♥ في المفضلة")
                        } else {
                            tr(language, "♡ Add to favorites", "♡ أضف إلى المفضلة")
                        }
                    }}
                </button>
            </header>
            <div class="game-meta">
                <a href=RouteIntent::Category(category).href()>
                    {move || category.label(state.language.get())}
                </a>
                <span>
                    {move || {
                        let language = state.language.get();
                        format!("{} {}", format_play_count(play_count, language), tr(language, "plays", "لعبة"))
                    }}
                </span>
            </div>
            <p class="game-description">
                {move || {
                    description
                        .as_ref()
                        .map(|d| d.get(state.language.get()).to_string())
                        .unwrap_or_default()
                }}
            </p>
            <ul class="tag-list">
                {tags
                    .into_iter()
                    .map(|tag| {
                        let href = RouteIntent::Search { query: tag.clone() }.href();
                        view! { <li><a href=href>{tag}</a></li> }
                    })
                    .collect_view()}
            </ul>
            <Leaderboard game_id=id/>
            <Show when=move || !related.with(Vec::is_empty)>
                <section class="related-games">
                    <h2>{move || tr(state.language.get(), "Related Games", "ألعاب مشابهة")}</h2>
                    <div class="game-grid">
                        <For
                            each=move || related.get()
                            key=|game| game.id
                            children=|game| view! { <GameCard game=game/> }
                        />
                    </div>
                </section>
            </Show>
        </article>
    }
}

#[component]
pub fn GamePage(slug: String) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let on_retry = Callback::new(move |_| state.reload_catalog());
    // Only a change to this entry (or its removal) re-renders the player
    let game = Memo::new(move |_| {
        state
            .catalog
            .with(|load| load.try_map_ref(|live| find_game(live.visible(), &slug).cloned()))
    });

    view! {
        <div class="page game-page">
            {move || {
                game.with(|load| render_load(load, on_retry, |game| view! { <GameDetail game=game.clone()/> }))
            }}
        </div>
    }
}
