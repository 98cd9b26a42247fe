//! Static pages

use leptos::prelude::*;

use crate::app::{tr, SiteState, SITE_NAME};

const SUPPORT_EMAIL: &str = "support@arcade.example";

#[component]
pub fn AboutPage() -> impl IntoView {
    let state = expect_context::<SiteState>();
    view! {
        <div class="page info-page">
            <h1>{move || tr(state.language.get(), "About Us", "من نحن")}</h1>
            <p>
                {move || tr(
                    state.language.get(),
                    "A free collection of browser games, from quick puzzles to classic DOS titles. Every game runs in the page with nothing to install.",
                    "مجموعة مجانية من ألعاب المتصفح، من الألغاز السريعة إلى ألعاب DOS الكلاسيكية. كل لعبة تعمل داخل الصفحة دون أي تثبيت.",
                )}
            </p>
            <p>{SITE_NAME}</p>
        </div>
    }
}

#[component]
pub fn ContactPage() -> impl IntoView {
    let state = expect_context::<SiteState>();
    view! {
        <div class="page info-page">
            <h1>{move || tr(state.language.get(), "Get in Touch", "تواصل معنا")}</h1>
            <p>
                {move || tr(
                    state.language.get(),
                    "Questions about a game or ideas for the site are always welcome.",
                    "نرحب دائمًا بأسئلتكم حول الألعاب أو اقتراحاتكم للموقع.",
                )}
            </p>
            <p>
                {move || tr(state.language.get(), "Support email:", "البريد الإلكتروني للدعم:")}
                " "
                <a href=format!("mailto:{}", SUPPORT_EMAIL)>{SUPPORT_EMAIL}</a>
            </p>
        </div>
    }
}
