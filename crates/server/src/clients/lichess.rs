use std::time::Duration;

use futures::future::BoxFuture;
use puzzle_core::{pgn, PuzzleRecord};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::PuzzleApi;
use crate::config::LichessConfig;
use crate::sources::SourceError;

pub struct LichessClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    activity_timeout: Duration,
    daily_timeout: Duration,
    probe_timeout: Duration,
}

impl LichessClient {
    pub fn new(config: &LichessConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.activity_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            activity_timeout: config.activity_timeout,
            daily_timeout: config.daily_timeout,
            probe_timeout: config.probe_timeout,
        })
    }

    /// Fetch recently played puzzles.
    /// The feed may be newline-delimited JSON or a single JSON array.
    pub async fn fetch_activity(&self, max: usize) -> Result<Vec<PuzzleRecord>, SourceError> {
        let url = format!("{}/api/puzzle/activity", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("max", max.to_string())])
            .header("Accept", "application/x-ndjson")
            .timeout(self.activity_timeout);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(SourceError::from_request)?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status()));
        }

        let text = resp.text().await.map_err(SourceError::from_request)?;
        parse_activity(&text)
    }

    pub async fn fetch_daily(&self) -> Result<PuzzleRecord, SourceError> {
        let url = format!("{}/api/puzzle/daily", self.base_url);
        let value = self
            .get_json(&url, self.daily_timeout)
            .await?
            .ok_or(SourceError::Status(StatusCode::NOT_FOUND))?;
        parse_puzzle(value)
    }

    pub async fn fetch_puzzle(&self, id: &str) -> Result<Option<PuzzleRecord>, SourceError> {
        let url = format!("{}/api/puzzle/{}", self.base_url, id);
        match self.get_json(&url, self.probe_timeout).await? {
            Some(value) => parse_puzzle(value).map(Some),
            None => Ok(None),
        }
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Option<Value>, SourceError> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(SourceError::from_request)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status()));
        }

        let value = resp.json::<Value>().await.map_err(SourceError::from_request)?;
        Ok(Some(value))
    }
}

impl PuzzleApi for LichessClient {
    fn activity(&self, max: usize) -> BoxFuture<'_, Result<Vec<PuzzleRecord>, SourceError>> {
        Box::pin(self.fetch_activity(max))
    }

    fn daily(&self) -> BoxFuture<'_, Result<PuzzleRecord, SourceError>> {
        Box::pin(self.fetch_daily())
    }

    fn puzzle<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<PuzzleRecord>, SourceError>> {
        Box::pin(self.fetch_puzzle(id))
    }
}

#[derive(Deserialize)]
struct Envelope {
    puzzle: ApiPuzzle,
    #[serde(default)]
    game: Option<ApiGame>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPuzzle {
    id: String,
    #[serde(default)]
    fen: Option<String>,
    #[serde(default)]
    rating: i64,
    #[serde(default)]
    themes: Vec<String>,
    #[serde(default)]
    solution: Vec<String>,
    #[serde(default)]
    initial_ply: Option<usize>,
}

#[derive(Deserialize)]
struct ApiGame {
    #[serde(default)]
    pgn: Option<String>,
}

/// Parse an activity feed body. Entries that do not describe a usable puzzle
/// are skipped.
pub fn parse_activity(text: &str) -> Result<Vec<PuzzleRecord>, SourceError> {
    let trimmed = text.trim();
    let entries: Vec<Value> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| SourceError::Malformed(format!("activity array: {e}")))?
    } else {
        trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| match serde_json::from_str::<Value>(line) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("Failed to parse activity line: {e}");
                    None
                }
            })
            .collect()
    };

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        match parse_puzzle(entry) {
            Ok(record) => records.push(record),
            Err(e) => tracing::debug!("Skipping activity entry: {e}"),
        }
    }
    Ok(records)
}

/// Convert one `{puzzle, game?}` object into a record.
///
/// Without a `fen`, the position is rebuilt from `game.pgn` up to
/// `puzzle.initialPly` and the move at that ply becomes the setup move.
pub fn parse_puzzle(value: Value) -> Result<PuzzleRecord, SourceError> {
    let envelope: Envelope =
        serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))?;
    let puzzle = envelope.puzzle;

    let (fen, moves) = match puzzle.fen {
        Some(fen) => (fen, puzzle.solution),
        None => {
            let pgn = envelope
                .game
                .and_then(|g| g.pgn)
                .ok_or_else(|| SourceError::Malformed(format!("puzzle {} has no position", puzzle.id)))?;
            let ply = puzzle
                .initial_ply
                .ok_or_else(|| SourceError::Malformed(format!("puzzle {} has no initialPly", puzzle.id)))?;
            let (fen, setup) = pgn::position_before_ply(&pgn, ply).ok_or_else(|| {
                SourceError::Malformed(format!("puzzle {}: game does not reach ply {}", puzzle.id, ply))
            })?;

            let mut moves = Vec::with_capacity(puzzle.solution.len() + 1);
            moves.push(setup);
            moves.extend(puzzle.solution);
            (fen, moves)
        }
    };

    PuzzleRecord::new(puzzle.id, fen, moves, puzzle.rating, puzzle.themes)
        .map_err(|e| SourceError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str, rating: i64) -> Value {
        json!({
            "date": 1700000000000u64,
            "win": true,
            "puzzle": {
                "id": id,
                "fen": "5rk1/1p3ppp/pq3b2/8/8/1P1Q1N2/P4PPP/3R2K1 w - - 2 27",
                "rating": rating,
                "plays": 100,
                "solution": ["d3d6", "f8d8", "d6d8", "f6d8"],
                "themes": ["advantage", "endgame", "short"]
            }
        })
    }

    #[test]
    fn test_parse_activity_ndjson() {
        let body = format!("{}\n\n{}\nnot json\n", entry("0000D", 1485), entry("0000E", 1600));
        let records = parse_activity(&body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "0000D");
        assert_eq!(records[0].solution_moves.len(), 4);
        assert_eq!(records[1].rating, 1600);
    }

    #[test]
    fn test_parse_activity_array() {
        let body = json!([entry("a", 1000), {"puzzle": {"id": "bad"}}]).to_string();
        let records = parse_activity(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
    }

    #[test]
    fn test_parse_activity_broken_array_is_an_error() {
        assert!(matches!(parse_activity("[{\"puzzle\":"), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn test_parse_puzzle_rebuilds_position_from_game() {
        let value = json!({
            "game": {"id": "abc", "pgn": "e4 e5 Nf3 Nc6 Bc4 Nf6"},
            "puzzle": {
                "id": "pgn01",
                "rating": 1200,
                "initialPly": 5,
                "solution": ["f3g5"],
                "themes": ["kingsideAttack"]
            }
        });
        let record = parse_puzzle(value).unwrap();
        assert_eq!(
            record.initial_position,
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3"
        );
        assert_eq!(record.solution_moves, vec!["g8f6", "f3g5"]);

        let derived = record.derive().unwrap();
        assert_eq!(derived.remaining_moves, vec!["f3g5"]);
    }

    #[test]
    fn test_parse_puzzle_without_position_or_game_is_malformed() {
        let value = json!({"puzzle": {"id": "x", "rating": 1000, "solution": ["e2e4"]}});
        assert!(matches!(parse_puzzle(value), Err(SourceError::Malformed(_))));
    }
}
