//! Terminal front-end for the water fight server.
//!
//! Usage:
//!   cargo run --bin waterfight -- --url http://localhost:8080 play
//!   cargo run --bin waterfight -- self-test

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use waterfight_client::{
    Check, Client, Harness, Notifier, Outcome, Session, SoundCue, Transport,
};
use waterfight_types::{BoardSnapshot, CellState, GameSummary, Location};

const DEFAULT_URL: &str = "http://localhost:8080";
const URL_ENV: &str = "WATERFIGHT_URL";
const HELP: &str = "about | new | game | board | cheat | move <row> <col> \
                    | test [game|board|cheat|move|all] | quit";

#[derive(Parser, Debug)]
#[command(author, version, about = "Play water fight against a game server")]
struct Args {
    /// Server base URL (falls back to WATERFIGHT_URL, then localhost:8080).
    #[arg(short, long)]
    url: Option<String>,

    /// Do not ring the terminal bell on alerts or sound cues.
    #[arg(long, default_value_t = false)]
    mute: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Interactive session.
    Play,
    /// Create a game and run every failure check once.
    SelfTest,
}

fn resolve_url(arg: Option<String>) -> String {
    arg.or_else(|| std::env::var(URL_ENV).ok().filter(|url| !url.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_URL.to_string())
}

/// Prints alerts to stderr and rings the bell unless muted.
struct TerminalNotifier {
    mute: bool,
}

impl TerminalNotifier {
    fn bell(&self) {
        if !self.mute {
            eprint!("\x07");
        }
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
        self.bell();
    }

    fn play_sound(&self, cue: SoundCue) {
        eprintln!("*{cue}*");
        self.bell();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TestGroup {
    Game,
    Board,
    Cheat,
    Move,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    About,
    New,
    Game,
    Board,
    Cheat,
    Move(Location),
    Test(TestGroup),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        bail!("empty command");
    };
    let command = match head {
        "about" => Command::About,
        "new" => Command::New,
        "game" => Command::Game,
        "board" => Command::Board,
        "cheat" => Command::Cheat,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "move" => {
            let mut coordinate = |name: &str| -> Result<i64> {
                let raw = words.next().ok_or_else(|| anyhow!("missing {name}"))?;
                raw.parse().with_context(|| format!("invalid {name}: {raw}"))
            };
            let row = coordinate("row")?;
            let col = coordinate("col")?;
            Command::Move(Location::new(row, col))
        }
        "test" => Command::Test(match words.next().unwrap_or("all") {
            "game" => TestGroup::Game,
            "board" => TestGroup::Board,
            "cheat" => TestGroup::Cheat,
            "move" => TestGroup::Move,
            "all" => TestGroup::All,
            other => bail!("unknown test group: {other}"),
        }),
        other => bail!("unknown command: {other}"),
    };
    if let Some(extra) = words.next() {
        bail!("unexpected argument: {extra}");
    }
    Ok(command)
}

fn render_board(board: &BoardSnapshot) -> String {
    let mut out = String::from("   ");
    for col in 0..board.board_width {
        out.push_str(&format!("{:>2}", col % 100));
    }
    out.push('\n');
    for (row, states) in board.cell_states.iter().enumerate() {
        out.push_str(&format!("{row:>2} "));
        for state in states {
            let glyph = match state {
                CellState::Fog => '~',
                CellState::Hit => 'X',
                CellState::Miss => 'o',
                CellState::Fort => '#',
                CellState::Field => '.',
                CellState::Unknown => '?',
            };
            out.push(' ');
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

fn render_game(game: &GameSummary) -> String {
    let status = if game.is_game_won {
        "won"
    } else if game.is_game_lost {
        "lost"
    } else {
        "in progress"
    };
    format!(
        "game {} ({status}): opponents have {} points, {} forts standing, last volley {:?}",
        game.game_number,
        game.opponent_points,
        game.num_active_opponent_forts,
        game.last_opponent_points
    )
}

fn print_checks(checks: &[Check]) {
    for check in checks {
        println!("  {check}");
    }
    let passed = checks.iter().filter(|check| check.verdict.is_passed()).count();
    println!("{passed}/{} checks passed", checks.len());
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Updated | Outcome::Stale => {}
        Outcome::Skipped(reason) => println!("skipped: {reason:?}"),
        Outcome::Failed(failure) => println!("failed: {failure}"),
    }
}

fn print_state<T: Transport, N: Notifier>(session: &Session<T, N>) {
    let state = session.state();
    if let Some(game) = state.game() {
        println!("{}", render_game(&game));
    }
    if let Some(board) = state.board() {
        print!("{}", render_board(&board));
    }
}

async fn run_test<T: Transport, N: Notifier>(
    session: &Session<T, N>,
    group: TestGroup,
) -> Vec<Check> {
    let harness = Harness::new(session);
    match group {
        TestGroup::Game => harness.check_bad_game().await,
        TestGroup::Board => harness.check_bad_board().await,
        TestGroup::Cheat => harness.check_bad_cheat().await,
        TestGroup::Move => harness.check_bad_move().await,
        TestGroup::All => harness.run_all().await,
    }
}

async fn play<T: Transport, N: Notifier>(session: &Session<T, N>) -> Result<()> {
    if session.load_about().await.is_updated() {
        if let Some(author) = session.state().author() {
            println!("Water fight by {author}");
        }
    }
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let outcome = match command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Test(group) => {
                print_checks(&run_test(session, group).await);
                continue;
            }
            Command::About => {
                let outcome = session.load_about().await;
                if let Some(author) = session.state().author() {
                    println!("{author}");
                }
                print_outcome(&outcome);
                continue;
            }
            Command::New => session.new_game().await,
            Command::Game => session.load_game().await,
            Command::Board => session.load_board().await,
            Command::Cheat => session.reveal_all().await,
            Command::Move(location) => session.submit_move(location).await,
        };
        print_outcome(&outcome);
        print_state(session);
    }
    Ok(())
}

async fn self_test<T: Transport, N: Notifier>(session: &Session<T, N>) -> Result<()> {
    if let Outcome::Failed(failure) = session.new_game().await {
        bail!("failed to create game: {failure}");
    }
    let checks = Harness::new(session).run_all().await;
    print_checks(&checks);
    let failed = checks.iter().filter(|check| !check.verdict.is_passed()).count();
    if failed > 0 {
        bail!("{failed} checks failed");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let url = resolve_url(args.url.clone());
    let client = Client::new(&url).with_context(|| format!("invalid server URL: {url}"))?;
    info!(%url, mode = ?args.command, "connecting");
    let session = Session::new(client, TerminalNotifier { mute: args.mute });

    match args.command {
        Mode::Play => play(&session).await,
        Mode::SelfTest => self_test(&session).await,
    }
}
