use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

use crate::feed::Fetcher;

const TEAMS_MLB: &[(&str, &str)] = &[
    ("HOU", "Houston Astros"),
    ("SEA", "Seattle Mariners"),
    ("TEX", "Texas Rangers"),
    ("NYY", "New York Yankees"),
    ("LAD", "Los Angeles Dodgers"),
    ("ATL", "Atlanta Braves"),
];
const TEAMS_COLLEGE: &[(&str, &str)] = &[
    ("ARK", "Arkansas Razorbacks"),
    ("LSU", "LSU Tigers"),
    ("ALA", "Alabama Crimson Tide"),
    ("UGA", "Georgia Bulldogs"),
];
const TEAMS_GENERIC: &[(&str, &str)] = &[
    ("NORT", "Northside Comets"),
    ("SOUT", "Southside Owls"),
    ("EAST", "Eastport Pilots"),
    ("WEST", "Westfield Miners"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pre,
    Live(u32),
    Post,
}

#[derive(Debug, Clone)]
struct DemoGame {
    id: String,
    away: (&'static str, &'static str),
    home: (&'static str, &'static str),
    away_score: u32,
    home_score: u32,
    phase: Phase,
}

pub struct DemoFetcher {
    state: Mutex<DemoState>,
    failure_rate: f64,
}

struct DemoState {
    rng: StdRng,
    leagues: HashMap<String, Vec<DemoGame>>,
}

impl DemoFetcher {
    pub fn new(seed: u64, failure_rate: f64) -> Self {
        Self {
            state: Mutex::new(DemoState {
                rng: StdRng::seed_from_u64(seed),
                leagues: HashMap::new(),
            }),
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }
}

impl Fetcher for DemoFetcher {
    fn fetch(&self, sport: &str, league: &str) -> Result<String> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| anyhow!("demo feed state poisoned"))?;
        let DemoState { rng, leagues } = &mut *guard;

        if rng.gen_bool(self.failure_rate) {
            return Err(anyhow!("simulated timeout for {league}"));
        }

        let games = leagues
            .entry(league.to_string())
            .or_insert_with(|| seed_games(league, rng));
        for game in games.iter_mut() {
            step_game(game, rng);
        }
        let events: Vec<Value> = games.iter().map(|g| render_event(g, sport)).collect();
        Ok(json!({ "events": events }).to_string())
    }
}

fn seed_games(league: &str, rng: &mut StdRng) -> Vec<DemoGame> {
    let teams = match league {
        "mlb" => TEAMS_MLB,
        "college-football" | "mens-college-basketball" | "college-baseball" => TEAMS_COLLEGE,
        _ => TEAMS_GENERIC,
    };
    teams
        .chunks_exact(2)
        .enumerate()
        .map(|(idx, pair)| {
            let phase = match rng.gen_range(0..3) {
                0 => Phase::Pre,
                1 => Phase::Live(rng.gen_range(1..5)),
                _ => Phase::Live(rng.gen_range(5..9)),
            };
            let started = phase != Phase::Pre;
            DemoGame {
                id: format!("{league}-{}", 1000 + idx),
                away: pair[0],
                home: pair[1],
                away_score: if started { rng.gen_range(0..5) } else { 0 },
                home_score: if started { rng.gen_range(0..5) } else { 0 },
                phase,
            }
        })
        .collect()
}

fn step_game(game: &mut DemoGame, rng: &mut StdRng) {
    game.phase = match game.phase {
        Phase::Pre if rng.gen_bool(0.2) => Phase::Live(1),
        Phase::Live(period) => {
            if rng.gen_bool(0.25) {
                if rng.gen_bool(0.5) {
                    game.away_score += 1;
                } else {
                    game.home_score += 1;
                }
            }
            if period >= 9 && rng.gen_bool(0.05) {
                Phase::Post
            } else if rng.gen_bool(0.3) {
                Phase::Live(period + 1)
            } else {
                Phase::Live(period)
            }
        }
        other => other,
    };
}

fn render_event(game: &DemoGame, sport: &str) -> Value {
    let (state, detail) = match game.phase {
        Phase::Pre => ("pre", "7:05 PM".to_string()),
        Phase::Live(period) => ("in", period_label(sport, period)),
        Phase::Post => ("post", "Final".to_string()),
    };
    let started = game.phase != Phase::Pre;
    let competitor = |side: &str, team: (&str, &str), score: u32| {
        let mut c = json!({
            "homeAway": side,
            "team": { "abbreviation": team.0, "displayName": team.1 },
        });
        if started {
            c["score"] = json!(score.to_string());
        }
        c
    };
    json!({
        "id": game.id,
        "status": { "type": { "state": state, "shortDetail": detail } },
        "competitions": [{
            "competitors": [
                competitor("home", game.home, game.home_score),
                competitor("away", game.away, game.away_score),
            ]
        }]
    })
}

fn period_label(sport: &str, period: u32) -> String {
    match sport {
        "baseball" => {
            let inning = period.div_ceil(2).max(1);
            let half = if period % 2 == 1 { "Top" } else { "Bot" };
            format!("{half} {}", ordinal(inning))
        }
        _ => format!("Q{}", period.clamp(1, 4)),
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
