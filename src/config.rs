use std::env;
use std::time::Duration;

use tracing::warn;

use crate::classify::PriorityTable;
use crate::rotator::DwellTimes;

pub const DEFAULT_ESPN_BASE_URL: &str = "http://site.api.espn.com/apis/site/v2/sports";

const DEFAULT_LEAGUES: &str = "MLB:baseball:mlb,\
NFL:football:nfl,\
NBA:basketball:nba,\
NCAAF:football:college-football,\
NCAAB:basketball:mens-college-basketball,\
NCAABB:baseball:college-baseball";

const DEFAULT_PRIORITY_TEAMS: &str = "mlb=Houston Astros|Astros|HOU;\
college-football=Arkansas Razorbacks|Razorbacks|Arkansas|ARK;\
mens-college-basketball=Arkansas Razorbacks|Razorbacks|Arkansas|ARK;\
college-baseball=Arkansas Razorbacks|Razorbacks|Arkansas|ARK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueSpec {
    pub label: String,
    pub sport: String,
    pub league: String,
}

#[derive(Debug, Clone)]
pub struct TickerConfig {
    pub leagues: Vec<LeagueSpec>,
    pub priority_teams: PriorityTable,
    pub full_refresh_every: u64,
    pub priority_refresh_every: u64,
    pub dwell: DwellTimes,
    pub status_max_chars: usize,
    pub prune_score_history: bool,
    pub fetch_parallelism: usize,
    pub espn_base_url: String,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl TickerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let leagues = match lookup("TICKER_LEAGUES") {
            Some(raw) if !raw.trim().is_empty() => {
                let parsed = parse_leagues(&raw);
                if parsed.is_empty() {
                    warn!("TICKER_LEAGUES has no usable entries, using defaults");
                    parse_leagues(DEFAULT_LEAGUES)
                } else {
                    parsed
                }
            }
            _ => parse_leagues(DEFAULT_LEAGUES),
        };
        let priority_teams = match lookup("TICKER_PRIORITY_TEAMS") {
            Some(raw) => parse_priority_teams(&raw),
            None => parse_priority_teams(DEFAULT_PRIORITY_TEAMS),
        };

        let secs = |key: &str, default: u64| Duration::from_secs(number(&lookup, key, default));

        Self {
            leagues,
            priority_teams,
            full_refresh_every: number(&lookup, "FULL_REFRESH_EVERY", 60).max(1),
            priority_refresh_every: number(&lookup, "PRIORITY_REFRESH_EVERY", 5).max(1),
            dwell: DwellTimes {
                priority: secs("PRIORITY_DWELL_SECS", 8),
                normal: secs("NORMAL_DWELL_SECS", 3),
                no_games: secs("NO_GAMES_DWELL_SECS", 5),
            },
            status_max_chars: number(&lookup, "STATUS_MAX_CHARS", 20).clamp(4, 80) as usize,
            prune_score_history: flag(&lookup, "PRUNE_SCORE_HISTORY"),
            fetch_parallelism: number(&lookup, "FETCH_PARALLELISM", 4).clamp(1, 16) as usize,
            espn_base_url: lookup("ESPN_BASE_URL")
                .map(|raw| raw.trim().trim_end_matches('/').to_string())
                .filter(|raw| !raw.is_empty())
                .unwrap_or_else(|| DEFAULT_ESPN_BASE_URL.to_string()),
        }
    }

    pub fn priority_leagues(&self) -> Vec<LeagueSpec> {
        self.leagues
            .iter()
            .filter(|spec| self.priority_teams.has_league(&spec.league))
            .cloned()
            .collect()
    }
}

fn number(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(val) => val,
        Err(_) => {
            warn!(key, value = %raw, "not a number, using default {default}");
            default
        }
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> bool {
    lookup(key)
        .map(|raw| matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// `Label:sport:league` entries separated by commas. A two-part entry
/// `sport:league` uses the uppercased league key as its label.
pub fn parse_leagues(raw: &str) -> Vec<LeagueSpec> {
    raw.split(',')
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let spec = match parts.as_slice() {
                [label, sport, league] => LeagueSpec {
                    label: label.to_string(),
                    sport: sport.to_string(),
                    league: league.to_string(),
                },
                [sport, league] => LeagueSpec {
                    label: league.to_uppercase(),
                    sport: sport.to_string(),
                    league: league.to_string(),
                },
                _ => {
                    if !entry.trim().is_empty() {
                        warn!(entry, "ignoring malformed league entry");
                    }
                    return None;
                }
            };
            if spec.sport.is_empty() || spec.league.is_empty() {
                warn!(entry, "ignoring league entry with empty sport or league");
                return None;
            }
            Some(spec)
        })
        .collect()
}

/// `league=Name|Name;league=Name` entries.
pub fn parse_priority_teams(raw: &str) -> PriorityTable {
    let entries = raw.split(';').filter_map(|entry| {
        let (league, names) = entry.split_once('=')?;
        let league = league.trim();
        if league.is_empty() {
            return None;
        }
        let names: Vec<String> = names.split('|').map(|n| n.trim().to_string()).collect();
        Some((league.to_string(), names))
    });
    PriorityTable::new(entries)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::classify::classify;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_stock_display() {
        let config = TickerConfig::default();
        assert_eq!(config.leagues.len(), 6);
        assert_eq!(config.leagues[0].label, "MLB");
        assert_eq!(config.leagues[3].league, "college-football");
        assert_eq!(config.full_refresh_every, 60);
        assert_eq!(config.priority_refresh_every, 5);
        assert_eq!(config.dwell.priority, Duration::from_secs(8));
        assert_eq!(config.dwell.normal, Duration::from_secs(3));
        assert_eq!(config.dwell.no_games, Duration::from_secs(5));
        assert!(classify("Houston Astros", "mlb", &config.priority_teams));
        assert!(classify("Arkansas Razorbacks", "college-baseball", &config.priority_teams));
        assert_eq!(config.priority_leagues().len(), 4);
    }

    #[test]
    fn overrides_and_clamps() {
        let config = TickerConfig::from_lookup(lookup_from(&[
            ("TICKER_LEAGUES", "NHL:hockey:nhl, soccer:usa.1"),
            ("TICKER_PRIORITY_TEAMS", "nhl=Stars|DAL"),
            ("FULL_REFRESH_EVERY", "0"),
            ("PRIORITY_REFRESH_EVERY", "abc"),
            ("FETCH_PARALLELISM", "99"),
            ("PRUNE_SCORE_HISTORY", "yes"),
            ("ESPN_BASE_URL", "http://localhost:9000/sports/"),
        ]));
        assert_eq!(
            config.leagues,
            vec![
                LeagueSpec {
                    label: "NHL".to_string(),
                    sport: "hockey".to_string(),
                    league: "nhl".to_string(),
                },
                LeagueSpec {
                    label: "USA.1".to_string(),
                    sport: "soccer".to_string(),
                    league: "usa.1".to_string(),
                },
            ]
        );
        assert_eq!(config.full_refresh_every, 1);
        assert_eq!(config.priority_refresh_every, 5);
        assert_eq!(config.fetch_parallelism, 16);
        assert!(config.prune_score_history);
        assert_eq!(config.espn_base_url, "http://localhost:9000/sports");
        assert!(classify("Dallas Stars", "nhl", &config.priority_teams));
        assert_eq!(config.priority_leagues().len(), 1);
    }

    #[test]
    fn empty_priority_teams_disables_priority() {
        let config = TickerConfig::from_lookup(lookup_from(&[("TICKER_PRIORITY_TEAMS", "")]));
        assert!(config.priority_teams.is_empty());
        assert!(config.priority_leagues().is_empty());
    }

    #[test]
    fn malformed_league_entries_are_skipped() {
        let leagues = parse_leagues("bad,MLB:baseball:mlb,,X::");
        assert_eq!(leagues.len(), 1);
        assert_eq!(leagues[0].league, "mlb");
    }
}
