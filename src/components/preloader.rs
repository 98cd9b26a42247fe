//! Hidden iframes for the URLs the preload queue has admitted
//!
//! At most `preload_cap` frames exist at once; each frees its slot on `load`
//! or `error`, or when the fetch timeout runs out.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::millis;
use crate::app::SiteState;

/// Queue `url` for preloading (a card scrolled into view).
///
/// Subscribers are only notified when the queue actually changed, so repeat
/// requests from re-rendered cards are free.
pub fn request_preload(state: SiteState, url: &str) {
    let mut admitted = Vec::new();
    state.ctx.maybe_update(|c| {
        if !c.preload().accepts(url) {
            return false;
        }
        admitted = c.preload_mut().request(url);
        true
    });
    start(state, admitted);
}

fn finish(state: SiteState, url: &str) {
    let mut admitted = Vec::new();
    state.ctx.maybe_update(|c| {
        if !c.preload().is_loading(url) {
            return false;
        }
        admitted = c.preload_mut().complete(url);
        true
    });
    start(state, admitted);
}

// Frames that never report back still give up their slot. Completing a URL
// twice is ignored by the queue.
fn start(state: SiteState, admitted: Vec<String>) {
    let timeout = millis(state.config().fetch_timeout());
    for url in admitted {
        spawn_local(async move {
            TimeoutFuture::new(timeout).await;
            finish(state, &url);
        });
    }
}

#[component]
pub fn Preloader() -> impl IntoView {
    let state = expect_context::<SiteState>();
    let loading = Memo::new(move |_| state.ctx.with(|c| c.preload().loading().to_vec()));

    view! {
        <div
            class="preloader"
            aria-hidden="true"
            style="visibility:hidden;position:absolute;width:0;height:0;overflow:hidden"
        >
            <For
                each=move || loading.get()
                key=|url| url.clone()
                children=move |url| {
                    let loaded = url.clone();
                    let failed = url.clone();
                    view! {
                        <iframe
                            src=url.clone()
                            title=format!("preloader-{}", url)
                            tabindex="-1"
                            on:load=move |_| finish(state, &loaded)
                            on:error=move |_| finish(state, &failed)
                        ></iframe>
                    }
                }
            />
        </div>
    }
}
