//! Read-only per-game high scores from the backend's `scores` table

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// Rows shown per game
pub const LEADERBOARD_SIZE: usize = 10;

/// One ranked row, best first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    /// 1-based
    pub rank: usize,
    /// `None` when the score has no profile or a blank username
    pub player: Option<String>,
    pub score: u64,
}

#[derive(Deserialize)]
struct RawScore {
    id: u64,
    score: u64,
    #[serde(default)]
    profiles: Option<RawProfile>,
}

#[derive(Deserialize)]
struct RawProfile {
    #[serde(default)]
    username: Option<String>,
}

/// Query string selecting the top scores of `game_id` with player names
pub fn scores_query(game_id: u32) -> String {
    format!(
        "select=id,score,profiles(username)&game_id=eq.{}&order=score.desc&limit={}",
        game_id, LEADERBOARD_SIZE
    )
}

/// Decode a `scores` response. The backend already orders and limits; the
/// table is re-ranked here anyway so ties are stable (older row first).
pub fn decode_scores(body: &str) -> Result<Vec<ScoreEntry>> {
    let mut rows: Vec<RawScore> = serde_json::from_str(body)?;
    rows.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    rows.truncate(LEADERBOARD_SIZE);
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| ScoreEntry {
            rank: i + 1,
            player: row
                .profiles
                .and_then(|p| p.username)
                .filter(|name| !name.trim().is_empty()),
            score: row.score,
        })
        .collect())
}

/// Where top scores come from
#[async_trait(?Send)]
pub trait ScoreSource {
    async fn top_scores(&self, game_id: u32) -> Result<Vec<ScoreEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    #[test]
    fn test_scores_ranked_best_first() {
        let body = r#"[
            {"id": 7, "score": 150, "profiles": {"username": "nour"}},
            {"id": 3, "score": 900, "profiles": null},
            {"id": 5, "score": 150, "profiles": {"username": "  "}},
            {"id": 9, "score": 40}
        ]"#;
        let scores = decode_scores(body).unwrap();
        let rows: Vec<(usize, Option<&str>, u64)> = scores
            .iter()
            .map(|s| (s.rank, s.player.as_deref(), s.score))
            .collect();
        assert_eq!(
            rows,
            vec![
                (1, None, 900),
                (2, None, 150),
                (3, Some("nour"), 150),
                (4, None, 40),
            ]
        );
    }

    #[test]
    fn test_table_is_capped() {
        let rows: Vec<String> = (0..15)
            .map(|i| format!(r#"{{"id": {}, "score": {}}}"#, i, i * 10))
            .collect();
        let scores = decode_scores(&format!("[{}]", rows.join(","))).unwrap();
        assert_eq!(scores.len(), LEADERBOARD_SIZE);
        assert_eq!(scores[0].score, 140);
    }

    #[test]
    fn test_empty_and_malformed_bodies() {
        assert!(decode_scores("[]").unwrap().is_empty());
        assert!(matches!(decode_scores(r#"{"scores": []}"#), Err(CatalogError::Validation(_))));
        assert_eq!(
            scores_query(12),
            "select=id,score,profiles(username)&game_id=eq.12&order=score.desc&limit=10"
        );
    }
}
