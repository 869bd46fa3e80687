use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

use crate::classify::{PriorityTable, is_priority_game};
use crate::config::LeagueSpec;
use crate::error::RecordError;
use crate::feed::Fetcher;
use crate::game::{GameRecord, GameState, truncate_abbrev};
use crate::http_cache::fetch_text_cached;
use crate::http_client::http_client;

const MISSING_ABBREV: &str = "TBD";
const MISSING_SCORE: &str = "0";

#[derive(Debug, Clone)]
pub struct EspnFetcher {
    base_url: String,
}

impl EspnFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn scoreboard_url(&self, sport: &str, league: &str) -> String {
        format!("{}/{sport}/{league}/scoreboard", self.base_url)
    }
}

impl Fetcher for EspnFetcher {
    fn fetch(&self, sport: &str, league: &str) -> Result<String> {
        let client = http_client()?;
        fetch_text_cached(client, &self.scoreboard_url(sport, league))
    }
}

#[derive(Debug, Default)]
pub struct ParsedScoreboard {
    pub games: Vec<GameRecord>,
    pub finished: usize,
    pub skipped: Vec<RecordError>,
}

#[derive(Debug, Deserialize)]
struct Scoreboard {
    #[serde(default)]
    events: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct EspnEvent {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    status: Option<EspnStatus>,
    #[serde(default)]
    competitions: Vec<EspnCompetition>,
}

#[derive(Debug, Deserialize)]
struct EspnCompetition {
    #[serde(default)]
    competitors: Vec<EspnCompetitor>,
    #[serde(default)]
    status: Option<EspnStatus>,
}

#[derive(Debug, Deserialize)]
struct EspnCompetitor {
    #[serde(rename = "homeAway", default)]
    home_away: Option<String>,
    #[serde(default)]
    team: Option<EspnTeam>,
    #[serde(default)]
    score: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EspnTeam {
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EspnStatus {
    #[serde(rename = "type", default)]
    status_type: Option<EspnStatusType>,
}

#[derive(Debug, Deserialize)]
struct EspnStatusType {
    #[serde(default)]
    state: Option<String>,
    #[serde(rename = "shortDetail", default)]
    short_detail: Option<String>,
}

/// Only a body that is not JSON at all is an error; bad events land in `skipped`.
pub fn parse_scoreboard_json(
    raw: &str,
    spec: &LeagueSpec,
    table: &PriorityTable,
) -> Result<ParsedScoreboard, serde_json::Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(ParsedScoreboard::default());
    }
    let board: Scoreboard = serde_json::from_str(trimmed)?;

    let mut out = ParsedScoreboard::default();
    for event in board.events {
        match parse_event(event, spec) {
            Ok(game) if game.is_final() => out.finished += 1,
            Ok(mut game) => {
                game.is_priority = is_priority_game(&game, table);
                out.games.push(game);
            }
            Err(err) => out.skipped.push(err),
        }
    }
    Ok(out)
}

fn parse_event(raw: Value, spec: &LeagueSpec) -> Result<GameRecord, RecordError> {
    let event: EspnEvent = serde_json::from_value(raw)?;
    let id = event
        .id
        .as_ref()
        .and_then(value_text)
        .filter(|id| !id.is_empty())
        .ok_or(RecordError::MissingField("id"))?;

    let competition = event
        .competitions
        .into_iter()
        .next()
        .ok_or(RecordError::MissingField("competitions"))?;
    let status = event
        .status
        .or(competition.status)
        .and_then(|s| s.status_type);
    let state = GameState::from_feed(status.as_ref().and_then(|s| s.state.as_deref()));
    let status_text = status
        .and_then(|s| s.short_detail)
        .unwrap_or_default();

    let (away, home) = split_sides(competition.competitors)?;
    let (away_abbrev, away_full_name) = team_names(&away);
    let (home_abbrev, home_full_name) = team_names(&home);

    Ok(GameRecord {
        id,
        league_name: spec.label.clone(),
        league_key: spec.league.clone(),
        away_abbrev,
        home_abbrev,
        away_score: score_text(&away),
        home_score: score_text(&home),
        status_text,
        state,
        is_priority: false,
        away_full_name,
        home_full_name,
    })
}

fn split_sides(
    mut competitors: Vec<EspnCompetitor>,
) -> Result<(EspnCompetitor, EspnCompetitor), RecordError> {
    if competitors.len() < 2 {
        return Err(RecordError::Competitors(competitors.len()));
    }
    let side = |c: &EspnCompetitor| c.home_away.as_deref().map(str::to_ascii_lowercase);
    let away_idx = competitors
        .iter()
        .position(|c| side(c).as_deref() == Some("away"));
    let home_idx = competitors
        .iter()
        .position(|c| side(c).as_deref() == Some("home"));

    let (away_idx, home_idx) = match (away_idx, home_idx) {
        (Some(a), Some(h)) if a != h => (a, h),
        _ => (0, 1),
    };
    // Take the higher index first so the lower one stays valid.
    if away_idx > home_idx {
        let away = competitors.swap_remove(away_idx);
        let home = competitors.swap_remove(home_idx);
        Ok((away, home))
    } else {
        let home = competitors.swap_remove(home_idx);
        let away = competitors.swap_remove(away_idx);
        Ok((away, home))
    }
}

fn team_names(competitor: &EspnCompetitor) -> (String, String) {
    let team = competitor.team.as_ref();
    let abbrev = team
        .and_then(|t| t.abbreviation.as_deref())
        .map(truncate_abbrev)
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| MISSING_ABBREV.to_string());
    let full_name = team
        .and_then(|t| t.display_name.clone())
        .unwrap_or_default();
    (abbrev, full_name)
}

fn score_text(competitor: &EspnCompetitor) -> String {
    competitor
        .score
        .as_ref()
        .and_then(value_text)
        .unwrap_or_else(|| MISSING_SCORE.to_string())
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoreboard_url_layout() {
        let fetcher = EspnFetcher::new("http://example.test/sports");
        assert_eq!(
            fetcher.scoreboard_url("baseball", "mlb"),
            "http://example.test/sports/baseball/mlb/scoreboard"
        );
    }

    #[test]
    fn split_sides_prefers_home_away_tags() {
        let raw = serde_json::json!([
            {"homeAway": "home", "team": {"abbreviation": "SEA"}},
            {"homeAway": "away", "team": {"abbreviation": "HOU"}}
        ]);
        let competitors: Vec<EspnCompetitor> = serde_json::from_value(raw).expect("competitors");
        let (away, home) = split_sides(competitors).expect("two sides");
        assert_eq!(team_names(&away).0, "HOU");
        assert_eq!(team_names(&home).0, "SEA");
    }

    #[test]
    fn split_sides_falls_back_to_position() {
        let raw = serde_json::json!([
            {"team": {"abbreviation": "AWY"}},
            {"team": {"abbreviation": "HOM"}},
            {"team": {"abbreviation": "XTR"}}
        ]);
        let competitors: Vec<EspnCompetitor> = serde_json::from_value(raw).expect("competitors");
        let (away, home) = split_sides(competitors).expect("two sides");
        assert_eq!(team_names(&away).0, "AWY");
        assert_eq!(team_names(&home).0, "HOM");
    }

    #[test]
    fn numeric_ids_and_scores_are_accepted() {
        assert_eq!(value_text(&serde_json::json!(401)).as_deref(), Some("401"));
        assert_eq!(value_text(&serde_json::json!(" 7 ")).as_deref(), Some("7"));
        assert_eq!(value_text(&Value::Null), None);
    }
}
