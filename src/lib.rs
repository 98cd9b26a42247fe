mod api;
mod app;
mod components;
mod pages;
mod storage;

use wasm_bindgen::prelude::*;

const FATAL_ERROR_HTML: &str = r#"<div class="fatal-error">
<p>Something went wrong. حدث خطأ ما.</p>
<button onclick="location.reload()">Reload / إعادة التحميل</button>
</div>"#;

/// Last resort: log the panic, then swap the whole page for a reload prompt
fn install_panic_boundary() {
    std::panic::set_hook(Box::new(|info| {
        console_error_panic_hook::hook(info);
        if let Some(body) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
        {
            body.set_inner_html(FATAL_ERROR_HTML);
        }
    }));
}

#[wasm_bindgen(start)]
pub fn main() {
    install_panic_boundary();
    leptos::mount::mount_to_body(app::App);
}
