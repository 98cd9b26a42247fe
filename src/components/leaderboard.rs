//! Top scores for one game

use arcade_core::leaderboard::{ScoreEntry, ScoreSource};
use arcade_core::state::LoadState;
use arcade_core::Language;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::console;

use super::status::render_load;
use crate::api;
use crate::app::{tr, SiteState};

/// `1234567` -> `1,234,567`
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn score_table(rows: &[ScoreEntry], language: Memo<Language>) -> AnyView {
    if rows.is_empty() {
        return view! {
            <p class="empty-state">
                {move || tr(language.get(), "No scores yet. Be the first!", "لا توجد نقاط مسجلة بعد. كن أول من يسجل!")}
            </p>
        }
        .into_any();
    }

    view! {
        <ol class="score-list">
            {rows
                .iter()
                .cloned()
                .map(|row| {
                    let player = row.player;
                    view! {
                        <li>
                            <span class="score-rank">{row.rank}</span>
                            <span class="score-player">
                                {move || match &player {
                                    Some(name) => name.clone(),
                                    None => tr(language.get(), "Anonymous", "لاعب مجهول").to_string(),
                                }}
                            </span>
                            <span class="score-value">{format_score(row.score)}</span>
                        </li>
                    }
                })
                .collect_view()}
        </ol>
    }
    .into_any()
}

#[component]
pub fn Leaderboard(game_id: u32) -> impl IntoView {
    let state = expect_context::<SiteState>();
    if !state.config().remote.is_configured() {
        return ().into_any();
    }

    let scores = RwSignal::new(LoadState::<Vec<ScoreEntry>>::Loading);
    let load = move || {
        let Some(source) = api::score_source(&state.config()) else {
            return;
        };
        scores.set(LoadState::Loading);
        spawn_local(async move {
            let result = source.top_scores(game_id).await;
            if let Err(e) = &result {
                console::error_1(&format!("Failed to load scores for game {}: {}", game_id, e).into());
            }
            // The page may be gone by now
            let _ = scores.try_set(LoadState::from_result(result));
        });
    };
    load();
    let on_retry = Callback::new(move |_| load());

    view! {
        <section class="leaderboard">
            <h2>{move || tr(state.language.get(), "Leaderboard", "لوحة الصدارة")}</h2>
            {move || scores.with(|current| render_load(current, on_retry, |rows| score_table(rows, state.language)))}
        </section>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_grouping() {
        assert_eq!(format_score(0), "0");
        assert_eq!(format_score(999), "999");
        assert_eq!(format_score(1_000), "1,000");
        assert_eq!(format_score(1_234_567), "1,234,567");
    }
}
