use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::classify::PriorityTable;
use crate::config::LeagueSpec;
use crate::error::FeedError;
use crate::espn_fetch::{ParsedScoreboard, parse_scoreboard_json};
use crate::game::GameRecord;

/// Implementations own timeouts; the caller never retries.
pub trait Fetcher: Sync {
    fn fetch(&self, sport: &str, league: &str) -> Result<String>;
}

#[derive(Debug)]
pub struct LeagueBatch {
    pub spec: LeagueSpec,
    pub outcome: Result<ParsedScoreboard, FeedError>,
}

impl LeagueBatch {
    pub fn into_games(self) -> Vec<GameRecord> {
        match self.outcome {
            Ok(parsed) => parsed.games,
            Err(_) => Vec::new(),
        }
    }
}

pub fn fetch_league(fetcher: &dyn Fetcher, spec: &LeagueSpec, table: &PriorityTable) -> LeagueBatch {
    let outcome = fetcher
        .fetch(&spec.sport, &spec.league)
        .map_err(|err| FeedError::Fetch {
            league: spec.league.clone(),
            reason: format!("{err:#}"),
        })
        .and_then(|body| {
            parse_scoreboard_json(&body, spec, table).map_err(|source| FeedError::InvalidJson {
                league: spec.league.clone(),
                source,
            })
        });

    match &outcome {
        Ok(parsed) => {
            for err in &parsed.skipped {
                warn!(league = %spec.league, "skipping event: {err}");
            }
            debug!(
                league = %spec.league,
                games = parsed.games.len(),
                finished = parsed.finished,
                "scoreboard parsed"
            );
        }
        Err(err) => warn!("{err}"),
    }

    LeagueBatch {
        spec: spec.clone(),
        outcome,
    }
}

pub fn fetch_leagues(
    fetcher: &dyn Fetcher,
    leagues: &[LeagueSpec],
    table: &PriorityTable,
    pool: Option<&rayon::ThreadPool>,
) -> Vec<LeagueBatch> {
    match pool {
        Some(pool) => pool.install(|| {
            leagues
                .par_iter()
                .map(|spec| fetch_league(fetcher, spec, table))
                .collect()
        }),
        None => leagues
            .iter()
            .map(|spec| fetch_league(fetcher, spec, table))
            .collect(),
    }
}

pub fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|idx| format!("feed-fetch-{idx}"))
        .build()
        .map_err(|err| warn!("fetch pool unavailable, fetching serially: {err}"))
        .ok()
}
