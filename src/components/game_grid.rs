//! Paginated game grid, cards and the category filter bar

use arcade_core::model::{Engine, MAX_RATING};
use arcade_core::view::{CatalogFilter, Page, SortOrder, ViewState};
use arcade_core::{CatalogEntry, Category, Language, RouteIntent};
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{console, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use super::preloader::request_preload;
use super::status::render_load;
use crate::app::{tr, SiteState};

/// Share of the card that must be on screen before it counts as seen
const VISIBLE_THRESHOLD: f64 = 0.1;

/// Compact play count, e.g. `1.2M` / `35K`
pub fn format_play_count(count: u64, language: Language) -> String {
    if count >= 1_000_000 {
        let millions = format!("{:.1}", count as f64 / 1_000_000.0);
        match language {
            Language::En => format!("{}M", millions),
            Language::Ar => format!("{} مليون", millions),
        }
    } else if count >= 1_000 {
        let thousands = (count as f64 / 1_000.0).round() as u64;
        match language {
            Language::En => format!("{}K", thousands),
            Language::Ar => format!("{} ألف", thousands),
        }
    } else {
        count.to_string()
    }
}

fn stars(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(MAX_RATING as usize - filled))
}

fn placeholder_thumbnail(name: &str) -> String {
    format!(
        "https://placehold.co/400x400/0D1117/8B949E?text={}",
        urlencoding::encode(name)
    )
}

type VisibilityCallback = Closure<dyn Fn(js_sys::Array, IntersectionObserver)>;

trait Disconnect {
    fn disconnect(&self);
}

impl Disconnect for IntersectionObserver {
    fn disconnect(&self) {
        IntersectionObserver::disconnect(self);
    }
}

/// An armed observer and the callback it calls into. Dropping it disconnects
/// the observer before the callback is freed.
struct Watch<O: Disconnect, C> {
    observer: O,
    _callback: C,
}

impl<O: Disconnect, C> Drop for Watch<O, C> {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

type VisibilityWatch = Watch<IntersectionObserver, VisibilityCallback>;

/// Call `on_visible` once, the first time `target` scrolls into view
fn observe_once(target: &web_sys::Element, on_visible: impl Fn() + 'static) -> Option<VisibilityWatch> {
    let callback = VisibilityCallback::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
        let visible = entries
            .iter()
            .any(|entry| entry.unchecked_into::<IntersectionObserverEntry>().is_intersecting());
        if visible {
            observer.disconnect();
            on_visible();
        }
    });

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(VISIBLE_THRESHOLD));
    match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
        Ok(observer) => {
            observer.observe(target);
            Some(Watch {
                observer,
                _callback: callback,
            })
        }
        Err(e) => {
            console::warn_1(&e);
            None
        }
    }
}

#[component]
pub fn GameCard(game: CatalogEntry) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let card_ref = NodeRef::<html::A>::new();
    let id = game.id;

    // Emulated bundles are archives, not pages; only embeds get warmed up
    if game.engine == Engine::StandardEmbed {
        let play_url = game.play_url.clone();
        let watch = StoredValue::new_local(None::<VisibilityWatch>);
        Effect::new(move |_| {
            if let Some(card) = card_ref.get() {
                let url = play_url.clone();
                watch.set_value(observe_once(&card, move || request_preload(state, &url)));
            }
        });
        on_cleanup(move || {
            watch.try_update_value(Option::take);
        });
    }

    let href = RouteIntent::Game {
        slug: game.slug.clone(),
    }
    .href();
    let fallback = placeholder_thumbnail(&game.name.en);
    let alt_name = game.name.clone();
    let title_name = game.name;
    let category = game.category;
    let play_count = game.play_count;

    let on_favorite = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        state.toggle_favorite(id);
    };

    view! {
        <a href=href class="game-card" node_ref=card_ref data-testid=format!("game-card-{}", id)>
            <img
                src=game.thumbnail_url
                alt=move || alt_name.get(state.language.get()).to_string()
                loading="lazy"
                on:error=move |ev| {
                    let img = event_target::<web_sys::HtmlImageElement>(&ev);
                    if img.src() != fallback {
                        img.set_src(&fallback);
                    }
                }
            />
            <button
                class="favorite-btn"
                class:active=move || state.is_favorite(id)
                on:click=on_favorite
            >
                {move || if state.is_favorite(id) { "♥" } else { "♡" }}
            </button>
            <div class="card-info">
                <h3>{move || title_name.get(state.language.get()).to_string()}</h3>
                <div class="card-meta">
                    <span>{move || category.label(state.language.get())}</span>
                    <span>
                        {move || {
                            let language = state.language.get();
                            format!(
                                "{} {}",
                                format_play_count(play_count, language),
                                tr(language, "plays", "لعبة"),
                            )
                        }}
                    </span>
                    {game.rating.map(|rating| view! { <span class="rating">{stars(rating)}</span> })}
                </div>
            </div>
        </a>
    }
}

fn page_view(page: Page, view_state: RwSignal<ViewState>, language: Memo<Language>) -> AnyView {
    if page.is_empty() {
        return view! {
            <p class="empty-state">
                {move || tr(language.get(), "No games found.", "لم يتم العثور على ألعاب.")}
            </p>
        }
        .into_any();
    }

    let has_prev = page.has_prev();
    let has_next = page.has_next();
    let page_index = page.page_index;
    let total_pages = page.total_pages;

    view! {
        <div class="game-grid">
            {page.entries.into_iter().map(|game| view! { <GameCard game=game/> }).collect_view()}
        </div>
        <Show when=move || { total_pages > 1 }>
            <nav class="pagination">
                <button disabled=!has_prev on:click=move |_| view_state.update(|v| v.prev_page())>
                    {move || tr(language.get(), "Previous", "السابق")}
                </button>
                <span class="page-indicator">{format!("{} / {}", page_index, total_pages)}</span>
                <button disabled=!has_next on:click=move |_| view_state.update(|v| v.next_page())>
                    {move || tr(language.get(), "Next", "التالي")}
                </button>
            </nav>
        </Show>
    }
    .into_any()
}

/// The live catalog through `filter` and `sort`, one page at a time. Goes
/// back to page 1 when the filter changes or an entry drops out.
#[component]
pub fn GameGrid(
    #[prop(into)] filter: Signal<CatalogFilter>,
    #[prop(optional)] sort: SortOrder,
) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let page_size = state.config().page_size;
    let view_state = RwSignal::new(
        ViewState::new(page_size)
            .with_sort(sort)
            .with_filter(filter.get_untracked()),
    );

    Effect::new(move |_| {
        let next = filter.get();
        view_state.maybe_update(|v| {
            let changed = *v.filter() != next;
            v.set_filter(next);
            changed
        });
    });

    Effect::new(move |_| {
        state.catalog.with(|load| {
            if let Some(live) = load.ready() {
                view_state.maybe_update(|v| v.observe(live));
            }
        });
    });

    let on_retry = Callback::new(move |_| state.reload_catalog());

    move || {
        let page = state
            .catalog
            .with(|load| load.map_ref(|live| view_state.with(|v| v.page(live))));
        render_load(&page, on_retry, |page| page_view(page.clone(), view_state, state.language))
    }
}

/// "All" plus one button per category
#[component]
pub fn CategoryFilter(selected: RwSignal<Option<Category>>) -> impl IntoView {
    let state = expect_context::<SiteState>();
    view! {
        <div class="category-filter">
            <button
                class:active=move || selected.get().is_none()
                on:click=move |_| selected.set(None)
            >
                {move || tr(state.language.get(), "All", "الكل")}
            </button>
            {Category::ALL
                .iter()
                .map(|category| {
                    let category = *category;
                    view! {
                        <button
                            class:active=move || selected.get() == Some(category)
                            on:click=move |_| selected.set(Some(category))
                        >
                            {move || category.label(state.language.get())}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingObserver(Rc<Cell<u32>>);

    impl Disconnect for CountingObserver {
        fn disconnect(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_dropping_a_watch_disconnects_once() {
        let disconnects = Rc::new(Cell::new(0));
        let mut slot = Some(Watch {
            observer: CountingObserver(disconnects.clone()),
            _callback: (),
        });
        assert_eq!(disconnects.get(), 0);

        // Card cleanup takes the watch out of its slot
        drop(slot.take());
        assert_eq!(disconnects.get(), 1);
        drop(slot.take());
        assert_eq!(disconnects.get(), 1);

        // Re-arming replaces (and disconnects) the previous watch
        slot = Some(Watch {
            observer: CountingObserver(disconnects.clone()),
            _callback: (),
        });
        drop(slot.replace(Watch {
            observer: CountingObserver(disconnects.clone()),
            _callback: (),
        }));
        assert_eq!(disconnects.get(), 2);
    }

    #[test]
    fn test_play_count_formatting() {
        assert_eq!(format_play_count(950, Language::En), "950");
        assert_eq!(format_play_count(35_400, Language::En), "35K");
        assert_eq!(format_play_count(1_240_000, Language::En), "1.2M");
        assert_eq!(format_play_count(2_000, Language::Ar), "2 ألف");
    }

    #[test]
    fn test_stars_are_capped() {
        assert_eq!(stars(2), "★★☆");
        assert_eq!(stars(9), "★★★");
    }
}
