//! Nardi-Rules: rules engine for long Nardi.
//!
//! ## Usage
//!
//! - `nardi-rules` - Show a demo
//! - `nardi-rules shell` - Start the text protocol on stdin/stdout
//! - `nardi-rules demo --turns 40` - Random self-play through the engine

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{Level, LevelFilter, Log, Metadata, Record};

use nardi_rules::game::Game;
use nardi_rules::shell::Shell;
use nardi_rules::status::Outcome;

/// Nardi-Rules: legality and move enumeration for long Nardi
#[derive(Parser)]
#[command(name = "nardi-rules")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print engine debug records to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol for use with a front end
    Shell {
        /// Seed for the dice
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play random legal turns and print the board after each
    Demo {
        /// Seed for the dice and the choice of completion
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Number of turns to play before stopping
        #[arg(long, default_value_t = 20)]
        turns: usize,
    },
}

/// Writes every enabled record to stderr.
struct StderrLogger {
    level: Level,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::Debug } else { Level::Warn };
    log::set_boxed_logger(Box::new(StderrLogger { level }))
        .context("installing the logger")?;
    log::set_max_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn });
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Some(Commands::Shell { seed }) => {
            let game = seed.map_or_else(Game::new, Game::with_seed);
            Shell::with_game(game).run().context("protocol loop failed")?;
        }
        Some(Commands::Demo { seed, turns }) => run_demo(seed, turns)?,
        None => run_demo(1, 20)?,
    }
    Ok(())
}

fn run_demo(seed: u64, turns: usize) -> Result<()> {
    println!("Nardi-Rules: random self-play (seed {seed})\n");

    let mut game = Game::with_seed(seed);
    let mut pick = fastrand::Rng::with_seed(seed ^ 0x5eed);

    for _ in 0..turns {
        let player = game.player();
        let outcome = game.roll()?;
        let dice = game.dice().values();

        if outcome == Outcome::Success {
            let keys: Vec<_> = game.completions().keys().copied().collect();
            let key = keys[pick.usize(..keys.len())];
            let outcome = game.autoplay(&key)?;
            if outcome != Outcome::NoLegalMovesLeft {
                bail!("{player} still has moves after a full completion");
            }
            println!("{player} rolls {}-{}: {} ways to play", dice[0], dice[1], keys.len());
        } else {
            println!("{player} rolls {}-{}: no legal moves", dice[0], dice[1]);
        }
        println!("{}\n", game.board());

        if let Some(winner) = game.winner() {
            let mars = if game.is_mars() { " with mars" } else { "" };
            println!("{winner} wins{mars}");
            return Ok(());
        }
        game.switch_player();
    }
    Ok(())
}
