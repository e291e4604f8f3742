use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use crate::preferences::Preferences;
use crate::progress::Progress;
use crate::session::{Event, Session};

pub mod error;
pub mod preferences;
pub mod progress;
pub mod puzzle;
pub mod render;
pub mod session;
pub mod util;

/// Simulated frame length when driving a session from the command line.
const FRAME: Duration = Duration::from_millis(16);

/// Plays moves on a 3x3x3 cube
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Log every dispatched and committed twist
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Record solves in this progress file
    #[arg(long, global = true)]
    progress: Option<PathBuf>,
    #[arg(long, global = true, default_value = preferences::PREFS_PATH)]
    preferences: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Play moves on a solved cube, e.g. `play "R U R' U'"`
    Play { moves: Vec<String> },
    /// Shuffle the cube, then play any moves given
    Shuffle {
        #[arg(long)]
        seed: Option<u64>,
        /// Overrides the shuffle length from the preferences
        #[arg(long)]
        length: Option<usize>,
        moves: Vec<String>,
    },
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let mut prefs = Preferences::load_from(&cli.preferences)?;
    let mut progress = match &cli.progress {
        Some(path) => Some(Progress::load(path)?),
        None => None,
    };

    let mut session = match cli.command {
        Command::Play { moves } => {
            let mut session = Session::new(&prefs);
            submit_all(&mut session, &moves)?;
            session
        }
        Command::Shuffle {
            seed,
            length,
            moves,
        } => {
            if let Some(length) = length {
                prefs.shuffle.length = length;
            }
            let mut session = Session::new(&prefs);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            session.shuffle(&mut rng)?;
            submit_all(&mut session, &moves)?;
            session
        }
    };

    loop {
        session.tick(FRAME)?;
        for event in session.drain_events() {
            match event {
                Event::MoveCommitted { mv, source, .. } => {
                    tracing::debug!(%mv, ?source, "committed");
                }
                Event::MoveDropped { token, error } => eprintln!("skipped {token:?}: {error}"),
                Event::ShuffleFinished => {
                    println!("scramble: {}", itertools::join(&session.to_log().scramble, " "));
                }
                Event::Solved {
                    move_count,
                    elapsed_ms,
                } => {
                    println!("solved in {move_count} moves ({elapsed_ms} ms)");
                    if let Some(progress) = progress.as_mut() {
                        let reward = progress.record_solve(&prefs.rewards, move_count, elapsed_ms);
                        println!("+{} coins, now level {}", reward.coins, progress.level);
                    }
                }
            }
        }
        if session.is_idle() {
            break;
        }
    }

    if let (Some(path), Some(progress)) = (&cli.progress, &progress) {
        progress.save(path)?;
    }
    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}

fn submit_all(session: &mut Session, args: &[String]) -> eyre::Result<()> {
    for token in args.iter().flat_map(|arg| arg.split_whitespace()) {
        session.submit(token)?;
    }
    Ok(())
}
