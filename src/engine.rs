use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::change_detect::{ChangeDetector, ScoreChange};
use crate::config::{LeagueSpec, TickerConfig};
use crate::feed::{Fetcher, LeagueBatch, build_fetch_pool, fetch_leagues};
use crate::game::GameRecord;
use crate::present::{Flow, Presentation, Presenter};
use crate::rotator::{Rotator, Slot};
use crate::scheduler::{RefreshAction, Scheduler};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub action: RefreshAction,
    pub at: DateTime<Local>,
    pub leagues_ok: usize,
    pub leagues_failed: Vec<String>,
    pub priority_games: usize,
    pub other_games: usize,
    pub patched: usize,
    pub changes: Vec<ScoreChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationOutcome {
    pub action: RefreshAction,
    pub dwell: Duration,
    pub presented: Option<String>,
}

pub struct Engine {
    config: TickerConfig,
    fetcher: Box<dyn Fetcher>,
    pool: Option<rayon::ThreadPool>,
    scheduler: Scheduler,
    catalog: Catalog,
    detector: ChangeDetector,
    rotator: Rotator,
    last_report: Option<RefreshReport>,
    logs: Vec<String>,
}

impl Engine {
    pub fn new(config: TickerConfig, fetcher: Box<dyn Fetcher>) -> Self {
        let pool = if config.fetch_parallelism > 1 {
            build_fetch_pool(config.fetch_parallelism)
        } else {
            None
        };
        Self {
            scheduler: Scheduler::new(config.full_refresh_every, config.priority_refresh_every),
            rotator: Rotator::new(config.dwell),
            catalog: Catalog::new(),
            detector: ChangeDetector::new(),
            last_report: None,
            logs: Vec::with_capacity(MAX_LOGS),
            config,
            fetcher,
            pool,
        }
    }

    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn last_report(&self) -> Option<&RefreshReport> {
        self.last_report.as_ref()
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn run_iteration(&mut self, presenter: &mut dyn Presenter) -> Result<IterationOutcome> {
        let action = self.scheduler.decide(self.catalog.has_priority());
        match action {
            RefreshAction::FullRefresh => self.full_refresh(),
            RefreshAction::PriorityRefresh => self.priority_refresh(),
            RefreshAction::NoOp => {}
        }

        let total = self.catalog.len();
        let position = if total == 0 { 0 } else { self.catalog.cursor() + 1 };
        let mut presented = None;
        let report = self.last_report.as_ref();
        let logs = self.logs.as_slice();
        let status_max_chars = self.config.status_max_chars;
        let dwell = self.rotator.rotate(&mut self.catalog, |slot, dwell| {
            if let Slot::Game(game) = slot {
                presented = Some(game.id.clone());
            }
            presenter.present(&Presentation {
                slot,
                dwell,
                position,
                total,
                report,
                status_max_chars,
                logs,
            })
        })?;

        self.scheduler.advance();
        Ok(IterationOutcome {
            action,
            dwell,
            presented,
        })
    }

    pub fn full_refresh(&mut self) {
        let batches = self.fetch(&self.config.leagues);
        let mut report = self.new_report(RefreshAction::FullRefresh, &batches);

        let mut priority = Vec::new();
        let mut others = Vec::new();
        for game in batches.into_iter().flat_map(LeagueBatch::into_games) {
            if game.is_priority {
                priority.push(game);
            } else {
                others.push(game);
            }
        }
        self.catalog.replace(priority, others);

        // Seeds the baseline; the cursor is already back at the top.
        report.changes = self.detector.observe_changes(self.catalog.priority_games());
        if self.config.prune_score_history {
            let keep: HashSet<&str> = self
                .catalog
                .priority_games()
                .iter()
                .map(|g| g.id.as_str())
                .collect();
            let evicted = self.detector.retain_only(&keep);
            if evicted > 0 {
                info!(evicted, "pruned score history");
            }
        }

        report.priority_games = self.catalog.priority_count();
        report.other_games = self.catalog.len() - report.priority_games;
        self.log_info(format!(
            "Full refresh: {} priority, {} other games",
            report.priority_games, report.other_games
        ));
        self.log_changes(&report.changes);
        self.log_failures(&report);
        self.last_report = Some(report);
    }

    pub fn priority_refresh(&mut self) {
        let leagues = self.config.priority_leagues();
        let batches = self.fetch(&leagues);
        let mut report = self.new_report(RefreshAction::PriorityRefresh, &batches);

        let fresh: Vec<GameRecord> = batches
            .into_iter()
            .flat_map(LeagueBatch::into_games)
            .filter(|g| g.is_priority)
            .collect();
        report.patched = self.catalog.patch(fresh);
        report.changes = self.detector.observe_changes(self.catalog.priority_games());
        report.priority_games = self.catalog.priority_count();
        report.other_games = self.catalog.len() - report.priority_games;

        if !report.changes.is_empty() {
            self.catalog.reset_cursor();
            self.log_changes(&report.changes);
        }
        self.log_failures(&report);
        self.last_report = Some(report);
    }

    fn fetch(&self, leagues: &[LeagueSpec]) -> Vec<LeagueBatch> {
        fetch_leagues(
            self.fetcher.as_ref(),
            leagues,
            &self.config.priority_teams,
            self.pool.as_ref(),
        )
    }

    fn new_report(&self, action: RefreshAction, batches: &[LeagueBatch]) -> RefreshReport {
        let leagues_failed: Vec<String> = batches
            .iter()
            .filter(|b| b.outcome.is_err())
            .map(|b| b.spec.label.clone())
            .collect();
        RefreshReport {
            action,
            at: Local::now(),
            leagues_ok: batches.len() - leagues_failed.len(),
            leagues_failed,
            priority_games: 0,
            other_games: 0,
            patched: 0,
            changes: Vec::new(),
        }
    }

    fn log_failures(&mut self, report: &RefreshReport) {
        if report.leagues_failed.is_empty() {
            return;
        }
        let msg = format!(
            "{} refresh: no data from {}",
            report.action.label(),
            report.leagues_failed.join(", ")
        );
        warn!("{msg}");
        self.push_log(format!("[WARN] {msg}"));
    }

    fn log_changes(&mut self, changes: &[ScoreChange]) {
        for change in changes {
            self.log_info(format!(
                "Score changed for {}: {} -> {}",
                change.matchup, change.previous, change.current
            ));
        }
    }

    fn log_info(&mut self, msg: String) {
        info!("{msg}");
        self.push_log(format!("[INFO] {msg}"));
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push(msg.into());
        if self.logs.len() > MAX_LOGS {
            let excess = self.logs.len() - MAX_LOGS;
            self.logs.drain(..excess);
        }
    }
}

/// Runs until the presenter asks to stop; the presenter is always cleared.
pub fn run(
    engine: &mut Engine,
    presenter: &mut dyn Presenter,
    max_iterations: Option<u64>,
) -> Result<u64> {
    let result = run_loop(engine, presenter, max_iterations);
    let cleared = presenter.clear();
    let iterations = result?;
    cleared?;
    Ok(iterations)
}

fn run_loop(
    engine: &mut Engine,
    presenter: &mut dyn Presenter,
    max_iterations: Option<u64>,
) -> Result<u64> {
    let mut iterations = 0u64;
    while max_iterations.is_none_or(|max| iterations < max) {
        let outcome = engine.run_iteration(presenter)?;
        iterations += 1;
        if presenter.dwell(outcome.dwell)? == Flow::Shutdown {
            info!(iterations, "shutdown requested");
            break;
        }
    }
    Ok(iterations)
}
