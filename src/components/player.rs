//! Game player: a sandboxed iframe for embeds, the js-dos runtime for
//! emulated titles

use arcade_core::model::Engine;
use arcade_core::CatalogEntry;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::console;

use crate::app::{tr, SiteState};

#[wasm_bindgen]
extern "C" {
    /// `Dos(element, options)` from the js-dos script on the page
    #[wasm_bindgen(js_name = Dos, catch)]
    fn create_dos(element: &web_sys::Element, options: &JsValue) -> Result<JsValue, JsValue>;
}

fn describe(e: &JsValue) -> String {
    e.dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| e.as_string())
        .unwrap_or_else(|| format!("{:?}", e))
}

fn call_method(target: &JsValue, name: &str, arg: Option<&JsValue>) -> Result<JsValue, JsValue> {
    let method: js_sys::Function = js_sys::Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    match arg {
        Some(arg) => method.call1(target, arg),
        None => method.call0(target),
    }
}

fn request_fullscreen(target: Option<web_sys::HtmlDivElement>) {
    if let Some(el) = target {
        if let Err(e) = el.request_fullscreen() {
            console::warn_1(&e);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EmulatorStatus {
    Starting,
    Running,
    Failed(String),
}

#[component]
fn EmulatorPlayer(bundle_url: String) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let container = NodeRef::<html::Div>::new();
    let instance = StoredValue::new_local(None::<JsValue>);
    let (status, set_status) = signal(EmulatorStatus::Starting);

    Effect::new(move |_| {
        let Some(el) = container.get() else {
            return;
        };
        let dos = match create_dos(&el, &JsValue::UNDEFINED) {
            Ok(dos) => dos,
            Err(e) => {
                console::error_1(&format!("DOS runtime unavailable: {}", describe(&e)).into());
                set_status.set(EmulatorStatus::Failed(describe(&e)));
                return;
            }
        };
        let started = call_method(&dos, "run", Some(&JsValue::from_str(&bundle_url)));
        instance.set_value(Some(dos));
        match started {
            Ok(promise) => spawn_local(async move {
                match JsFuture::from(promise.unchecked_into::<js_sys::Promise>()).await {
                    Ok(_) => set_status.set(EmulatorStatus::Running),
                    Err(e) => set_status.set(EmulatorStatus::Failed(describe(&e))),
                }
            }),
            Err(e) => set_status.set(EmulatorStatus::Failed(describe(&e))),
        }
    });

    on_cleanup(move || {
        instance.try_with_value(|dos| {
            if let Some(dos) = dos {
                let _ = call_method(dos, "stop", None);
            }
        });
    });

    view! {
        <div class="player emulator">
            <div class="emulator-screen" node_ref=container></div>
            {move || match status.get() {
                EmulatorStatus::Starting => view! {
                    <p class="player-status">
                        {move || tr(state.language.get(), "Starting emulator...", "جار تشغيل المحاكي...")}
                    </p>
                }
                .into_any(),
                EmulatorStatus::Running => ().into_any(),
                EmulatorStatus::Failed(message) => view! {
                    <p class="player-status error">
                        {move || tr(state.language.get(), "This game could not start.", "تعذر تشغيل هذه اللعبة.")}
                        " "
                        {message}
                    </p>
                }
                .into_any(),
            }}
            <button class="fullscreen-btn" on:click=move |_| request_fullscreen(container.get())>
                {move || tr(state.language.get(), "Full screen", "ملء الشاشة")}
            </button>
        </div>
    }
}

#[component]
fn EmbedPlayer(url: String, title: String) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let frame = NodeRef::<html::Div>::new();
    view! {
        <div class="player embed" node_ref=frame>
            <iframe
                src=url
                title=title
                sandbox="allow-scripts allow-same-origin allow-pointer-lock"
                allow="fullscreen; gamepad; autoplay"
                allowfullscreen=true
            ></iframe>
            <button class="fullscreen-btn" on:click=move |_| request_fullscreen(frame.get())>
                {move || tr(state.language.get(), "Full screen", "ملء الشاشة")}
            </button>
        </div>
    }
}

#[component]
pub fn GamePlayer(game: CatalogEntry) -> impl IntoView {
    let state = expect_context::<SiteState>();
    match game.engine {
        Engine::StandardEmbed => {
            let title = game.name.get(state.language.get_untracked()).to_string();
            view! { <EmbedPlayer url=game.play_url title=title/> }.into_any()
        }
        Engine::LegacyEmulated => view! { <EmulatorPlayer bundle_url=game.play_url/> }.into_any(),
    }
}
