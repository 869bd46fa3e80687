use std::time::Duration;

use anyhow::Result;

use crate::catalog::Catalog;
use crate::game::GameRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Game(&'a GameRecord),
    NoGames,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellTimes {
    pub priority: Duration,
    pub normal: Duration,
    pub no_games: Duration,
}

#[derive(Debug, Clone)]
pub struct Rotator {
    dwell: DwellTimes,
}

impl Rotator {
    pub fn new(dwell: DwellTimes) -> Self {
        Self { dwell }
    }

    pub fn dwell_times(&self) -> DwellTimes {
        self.dwell
    }

    pub fn dwell_for(&self, slot: Slot<'_>) -> Duration {
        match slot {
            Slot::Game(game) if game.is_priority => self.dwell.priority,
            Slot::Game(_) => self.dwell.normal,
            Slot::NoGames => self.dwell.no_games,
        }
    }

    pub fn rotate<F>(&self, catalog: &mut Catalog, present: F) -> Result<Duration>
    where
        F: FnOnce(Slot<'_>, Duration) -> Result<()>,
    {
        let slot = match catalog.current() {
            Some(game) => Slot::Game(game),
            None => Slot::NoGames,
        };
        let dwell = self.dwell_for(slot);
        present(slot, dwell)?;
        catalog.advance();
        Ok(dwell)
    }
}
