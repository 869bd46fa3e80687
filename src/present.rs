use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::engine::RefreshReport;
use crate::game::{GameRecord, Side};
use crate::rotator::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

#[derive(Debug, Clone, Copy)]
pub struct Presentation<'a> {
    pub slot: Slot<'a>,
    pub dwell: Duration,
    // 1-based position in the catalog, or 0 when there are no games.
    pub position: usize,
    pub total: usize,
    pub report: Option<&'a RefreshReport>,
    pub status_max_chars: usize,
    pub logs: &'a [String],
}

pub trait Presenter {
    fn present(&mut self, view: &Presentation<'_>) -> Result<()>;

    fn dwell(&mut self, duration: Duration) -> Result<Flow> {
        thread::sleep(duration);
        Ok(Flow::Continue)
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }
}

pub struct PlainPresenter<W: Write> {
    out: W,
}

impl<W: Write> PlainPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for PlainPresenter<W> {
    fn present(&mut self, view: &Presentation<'_>) -> Result<()> {
        let line = match view.slot {
            Slot::Game(game) => format!(
                "[{}/{}] {}",
                view.position,
                view.total,
                game_line(game, view.status_max_chars)
            ),
            Slot::NoGames => "NO LIVE GAMES".to_string(),
        };
        writeln!(self.out, "{line}").context("write game line")?;
        self.out.flush().context("flush output")
    }
}

/// `MLB * HOU 3 @ SEA 2 | Top 7th`, leading score marked with `^`.
pub fn game_line(game: &GameRecord, status_max_chars: usize) -> String {
    let leader = game.score_line().leader();
    let mark = |side: Side| if leader == Some(side) { "^" } else { "" };
    let star = if game.is_priority { " *" } else { "" };
    format!(
        "{}{star} {} {}{} @ {} {}{} | {}",
        game.league_name,
        game.away_abbrev,
        game.away_score,
        mark(Side::Away),
        game.home_abbrev,
        game.home_score,
        mark(Side::Home),
        game.status_display(status_max_chars)
    )
}
