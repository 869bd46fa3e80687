use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Frame, Terminal};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::info;

use score_ticker::config::TickerConfig;
use score_ticker::demo_feed::DemoFetcher;
use score_ticker::engine::{Engine, RefreshReport, run};
use score_ticker::espn_fetch::EspnFetcher;
use score_ticker::feed::Fetcher;
use score_ticker::game::{GameRecord, Side};
use score_ticker::logging::init_logging;
use score_ticker::present::{Flow, PlainPresenter, Presentation, Presenter};
use score_ticker::rotator::Slot;

const PRIORITY_COLOR: Color = Color::Magenta;
const LEAGUE_COLOR: Color = Color::Rgb(0, 150, 255);
const LEAD_COLOR: Color = Color::Green;
const STATUS_COLOR: Color = Color::Yellow;
const DEMO_FAILURE_RATE: f64 = 0.05;
const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct CliArgs {
    plain: bool,
    demo: bool,
    iterations: Option<u64>,
    help: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        print_usage();
        return Ok(());
    }

    let log_dir = std::env::var("TICKER_LOG_DIR").ok();
    let _log_guard = init_logging(log_dir.as_deref(), args.plain);

    let config = TickerConfig::from_env();
    info!(
        leagues = config.leagues.len(),
        priority_leagues = config.priority_teams.league_count(),
        full_every = config.full_refresh_every,
        priority_every = config.priority_refresh_every,
        demo = args.demo,
        "starting score ticker"
    );

    let fetcher: Box<dyn Fetcher> = if args.demo {
        Box::new(DemoFetcher::new(rand::random(), DEMO_FAILURE_RATE))
    } else {
        Box::new(EspnFetcher::new(config.espn_base_url.clone()))
    };
    let mut engine = Engine::new(config, fetcher);

    let iterations = if args.plain {
        let mut presenter = PlainPresenter::new(io::stdout().lock());
        run(&mut engine, &mut presenter, args.iterations)?
    } else {
        let mut presenter = TerminalPresenter::enter()?;
        run(&mut engine, &mut presenter, args.iterations)?
    };
    info!(iterations, "score ticker stopped");
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let mut out = CliArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--plain" => out.plain = true,
            "--demo" => out.demo = true,
            "-h" | "--help" => out.help = true,
            "--iterations" => {
                let Some(raw) = args.next() else {
                    bail!("--iterations needs a value");
                };
                out.iterations = Some(parse_iterations(&raw)?);
            }
            other => {
                if let Some(raw) = other.strip_prefix("--iterations=") {
                    out.iterations = Some(parse_iterations(raw)?);
                } else {
                    bail!("unknown argument: {other} (try --help)");
                }
            }
        }
    }
    Ok(out)
}

fn parse_iterations(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("invalid iteration count: {raw}"))
}

fn print_usage() {
    println!("score_ticker [--plain] [--demo] [--iterations N]");
    println!();
    println!("  --plain           print one line per item instead of the full-screen view");
    println!("  --demo            use the built-in synthetic feed instead of ESPN");
    println!("  --iterations N    stop after N displayed items");
    println!();
    println!("Keys (full-screen view): q / Esc / Ctrl-C quit");
}

struct TerminalPresenter {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TerminalPresenter {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        or_undo(execute!(stdout, EnterAlternateScreen), leave_raw_mode)
            .context("enter alternate screen")?;
        let terminal = or_undo(Terminal::new(CrosstermBackend::new(stdout)), leave_screen)
            .context("open terminal")?;
        // From here on Drop restores the terminal.
        let mut presenter = Self {
            terminal,
            active: true,
        };
        presenter.terminal.hide_cursor().context("hide cursor")?;
        Ok(presenter)
    }

    fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode().context("disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .context("leave alternate screen")?;
        self.terminal.show_cursor().context("show cursor")?;
        Ok(())
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, view: &Presentation<'_>) -> Result<()> {
        self.terminal
            .draw(|frame| render(frame, view))
            .context("draw frame")?;
        Ok(())
    }

    fn dwell(&mut self, duration: Duration) -> Result<Flow> {
        let deadline = Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Flow::Continue);
            }
            if event::poll(remaining.min(INPUT_POLL)).context("poll input")?
                && let Event::Key(key) = event::read().context("read input")?
                && key.kind == KeyEventKind::Press
                && is_quit_key(&key)
            {
                return Ok(Flow::Shutdown);
            }
        }
    }

    fn clear(&mut self) -> Result<()> {
        if self.active {
            self.terminal.clear().context("clear terminal")?;
        }
        self.restore()
    }
}

fn or_undo<T, E>(result: Result<T, E>, undo: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        undo();
    }
    result
}

fn leave_raw_mode() {
    let _ = disable_raw_mode();
}

fn leave_screen() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    leave_raw_mode();
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn render(frame: &mut Frame, view: &Presentation<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    frame.render_widget(Paragraph::new(header_text(view)), chunks[0]);

    let board = Block::default().borders(Borders::ALL);
    let inner = board.inner(chunks[1]);
    frame.render_widget(board, chunks[1]);
    let body = match view.slot {
        Slot::Game(game) => game_lines(game, view.status_max_chars),
        Slot::NoGames => no_games_lines(),
    };
    let top = inner.height.saturating_sub(body.len() as u16) / 2;
    let area = Rect {
        y: inner.y + top,
        height: inner.height - top,
        ..inner
    };
    frame.render_widget(Paragraph::new(body).alignment(Alignment::Center), area);

    frame.render_widget(
        Paragraph::new(console_lines(view)).block(Block::default().borders(Borders::TOP)),
        chunks[2],
    );
    frame.render_widget(
        Paragraph::new("q Quit").style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
}

fn header_text(view: &Presentation<'_>) -> String {
    match view.slot {
        Slot::Game(_) => format!(
            "SCORE TICKER | {}/{} | {}s",
            view.position,
            view.total,
            view.dwell.as_secs()
        ),
        Slot::NoGames => "SCORE TICKER".to_string(),
    }
}

fn game_lines(game: &GameRecord, status_max_chars: usize) -> Vec<Line<'static>> {
    let leader = game.score_line().leader();
    let score_style = |side: Side| {
        let base = Style::default().add_modifier(Modifier::BOLD);
        if leader == Some(side) {
            base.fg(LEAD_COLOR)
        } else {
            base.fg(Color::White)
        }
    };
    let team_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let mut header = vec![Span::styled(
        game.league_name.clone(),
        Style::default().fg(if game.is_priority {
            PRIORITY_COLOR
        } else {
            LEAGUE_COLOR
        }),
    )];
    if game.is_priority {
        header.push(Span::styled(" ★", Style::default().fg(Color::Yellow)));
    }

    vec![
        Line::from(header),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{:<4}", game.away_abbrev), team_style),
            Span::raw("  "),
            Span::styled(format!("{:>3}", game.away_score), score_style(Side::Away)),
        ]),
        Line::from(Span::raw("@")),
        Line::from(vec![
            Span::styled(format!("{:<4}", game.home_abbrev), team_style),
            Span::raw("  "),
            Span::styled(format!("{:>3}", game.home_score), score_style(Side::Home)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            game.status_display(status_max_chars),
            Style::default().fg(STATUS_COLOR),
        )),
    ]
}

fn no_games_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "NO LIVE GAMES",
            Style::default().fg(LEAGUE_COLOR).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Local::now().format("%H:%M").to_string()),
    ]
}

fn console_lines(view: &Presentation<'_>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        report_summary(view.report),
        Style::default().fg(Color::Gray),
    ))];
    for msg in view.logs.iter().rev().take(3).rev() {
        let style = if msg.starts_with("[WARN]") {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(Span::styled(msg.clone(), style)));
    }
    lines
}

fn report_summary(report: Option<&RefreshReport>) -> String {
    let Some(report) = report else {
        return "Waiting for first refresh".to_string();
    };
    let mut out = format!(
        "Last {} refresh {} | {} priority, {} other",
        report.action.label(),
        report.at.format("%H:%M:%S"),
        report.priority_games,
        report.other_games
    );
    if !report.leagues_failed.is_empty() {
        out.push_str(&format!(" | failed: {}", report.leagues_failed.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Result<CliArgs> {
        parse_args(raw.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_flags() {
        let parsed = args(&["--plain", "--demo", "--iterations", "12"]).expect("valid args");
        assert!(parsed.plain);
        assert!(parsed.demo);
        assert_eq!(parsed.iterations, Some(12));

        let parsed = args(&["--iterations=3"]).expect("valid args");
        assert_eq!(parsed.iterations, Some(3));
        assert!(!parsed.plain);
    }

    #[test]
    fn rejects_bad_args() {
        assert!(args(&["--iterations"]).is_err());
        assert!(args(&["--iterations", "many"]).is_err());
        assert!(args(&["--loud"]).is_err());
    }

    #[test]
    fn failed_setup_step_is_rolled_back() {
        let mut undone = 0;
        let failed: Result<(), &str> = or_undo(Err("no tty"), || undone += 1);
        assert!(failed.is_err());
        assert_eq!(undone, 1);

        let ok: Result<u8, &str> = or_undo(Ok(3), || undone += 1);
        assert_eq!(ok, Ok(3));
        assert_eq!(undone, 1);
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
