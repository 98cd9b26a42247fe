//! Loading and error placeholders shared by every async page

use arcade_core::state::LoadState;
use leptos::prelude::*;

use crate::app::{tr, SiteState};

#[component]
pub fn Spinner() -> impl IntoView {
    let state = expect_context::<SiteState>();
    view! {
        <div class="spinner" role="status">
            {move || tr(state.language.get(), "Loading...", "جار التحميل...")}
        </div>
    }
}

#[component]
pub fn ErrorPanel(message: String, can_retry: bool, on_retry: Callback<()>) -> impl IntoView {
    let state = expect_context::<SiteState>();
    view! {
        <div class="error-panel">
            <p class="error-title">
                {move || tr(state.language.get(), "Something went wrong", "حدث خطأ ما")}
            </p>
            <p class="error-message">{message}</p>
            <Show when=move || can_retry>
                <button class="retry-btn" on:click=move |_| on_retry.run(())>
                    {move || tr(state.language.get(), "Try again", "حاول مرة أخرى")}
                </button>
            </Show>
        </div>
    }
}

/// Spinner, error with retry, or `ready` over the loaded value
pub fn render_load<T, V>(
    load: &LoadState<T>,
    on_retry: Callback<()>,
    ready: impl FnOnce(&T) -> V,
) -> AnyView
where
    V: IntoView + 'static,
{
    match load {
        LoadState::Loading => view! { <Spinner/> }.into_any(),
        LoadState::Failed(e) => view! {
            <ErrorPanel message=e.to_string() can_retry=load.can_retry() on_retry=on_retry/>
        }
        .into_any(),
        LoadState::Ready(value) => ready(value).into_any(),
    }
}
