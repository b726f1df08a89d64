//! Line-oriented text protocol over a [`Game`].
//!
//! Requests and responses follow the GTP conventions: an optional numeric id,
//! a command and its arguments; the answer is `=id message` on success and
//! `?id message` on failure, followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `new [seed]` - Start over from the opening layout
//! - `roll` - Roll for the side to move
//! - `dice <a> <b>` - Start the turn with fixed dice
//! - `select <row> <col>` - Pick the piece to move
//! - `to <row> <col>` - Move the selected piece to a point
//! - `bydie <1|2>` - Move the selected piece by one die, bearing off if it can
//! - `autoplay <key>` - Play a whole completion, named by its resulting board
//! - `completions` - List the completions of the current roll
//! - `undo` - Take back the previous turn
//! - `showboard`, `status`
//!
//! A roll or move that leaves nothing to play answers `NO_LEGAL_MOVES_LEFT`
//! and hands the turn to the other player.
//!
//! ## Example
//!
//! ```ignore
//! use nardi_rules::shell::Shell;
//! let mut shell = Shell::new();
//! shell.run()?;
//! ```

use std::io::{self, BufRead, Write};

use crate::board::{BoardKey, Coord};
use crate::dice::Die;
use crate::game::Game;
use crate::status::{EngineError, Outcome};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "autoplay",
    "bydie",
    "completions",
    "dice",
    "known_command",
    "list_commands",
    "name",
    "new",
    "protocol_version",
    "quit",
    "roll",
    "select",
    "showboard",
    "status",
    "to",
    "undo",
    "version",
];

/// Protocol state around one game.
pub struct Shell {
    game: Game,
    /// Piece picked with `select`, cleared by every finish attempt
    selected: Option<Coord>,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    pub fn new() -> Self {
        Self::with_game(Game::new())
    }

    pub fn with_game(game: Game) -> Self {
        Self {
            game,
            selected: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    fn parse_coord(args: &[&str]) -> Option<Coord> {
        match args {
            [row, col, ..] => Some(Coord::new(row.parse().ok()?, col.parse().ok()?)),
            _ => None,
        }
    }

    /// Turn an engine answer into a response, switching turns when nothing is left.
    fn report(&mut self, result: Result<Outcome, EngineError>) -> (bool, String) {
        match result {
            Ok(Outcome::NoLegalMovesLeft) => {
                if !self.game.is_over() {
                    self.game.switch_player();
                }
                (true, Outcome::NoLegalMovesLeft.code().to_string())
            }
            Ok(outcome) => (true, outcome.code().to_string()),
            Err(err) => {
                if err.is_fatal() {
                    log::error!("{err}");
                }
                match err.rejection() {
                    Some(r) => (false, format!("{} {r}", r.code())),
                    None => (false, err.to_string()),
                }
            }
        }
    }

    fn roll_reply(&mut self, result: Result<Outcome, EngineError>) -> (bool, String) {
        let [a, b] = self.game.dice().values();
        let (success, message) = self.report(result);
        if success {
            (true, format!("{a} {b} {message}"))
        } else {
            (false, message)
        }
    }

    /// Refusal shared by every command that plays, or `None` if playing is allowed.
    fn play_gate(&self, needs_roll: bool) -> Option<(bool, String)> {
        if self.game.is_over() {
            Some((true, Outcome::NoLegalMovesLeft.code().to_string()))
        } else if needs_roll && !self.game.rolled() {
            Some((false, "roll first".to_string()))
        } else if !needs_roll && self.game.rolled() {
            Some((false, "already rolled this turn".to_string()))
        } else {
            None
        }
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "new" => {
                self.game = match args.first() {
                    Some(seed) => match seed.parse::<u64>() {
                        Ok(seed) => Game::with_seed(seed),
                        Err(_) => return (false, "invalid seed".to_string()),
                    },
                    None => Game::new(),
                };
                self.selected = None;
                (true, String::new())
            }

            "roll" => {
                if let Some(refusal) = self.play_gate(false) {
                    return refusal;
                }
                let result = self.game.roll();
                self.roll_reply(result)
            }

            "dice" => {
                if let Some(refusal) = self.play_gate(false) {
                    return refusal;
                }
                let values: Option<Vec<u8>> = args.iter().map(|a| a.parse().ok()).collect();
                match values.as_deref() {
                    Some(&[a, b]) => {
                        let result = self.game.set_dice(a, b);
                        self.roll_reply(result)
                    }
                    _ => (false, "expected two die values".to_string()),
                }
            }

            "select" => {
                if let Some(refusal) = self.play_gate(true) {
                    return refusal;
                }
                let Some(start) = Self::parse_coord(args) else {
                    return (false, "expected row and column".to_string());
                };
                match self.game.try_start(start) {
                    Ok(()) => {
                        self.selected = Some(start);
                        (true, format!("selected {start}"))
                    }
                    Err(r) => (false, format!("{} {r}", r.code())),
                }
            }

            "to" => {
                if let Some(refusal) = self.play_gate(true) {
                    return refusal;
                }
                let Some(end) = Self::parse_coord(args) else {
                    return (false, "expected row and column".to_string());
                };
                let Some(start) = self.selected.take() else {
                    return (false, "nothing selected".to_string());
                };
                let result = self.game.try_finish_move(start, end);
                self.report(result)
            }

            "bydie" => {
                if let Some(refusal) = self.play_gate(true) {
                    return refusal;
                }
                let die = match args.first().copied() {
                    Some("1") => Die::First,
                    Some("2") => Die::Second,
                    _ => return (false, "expected 1 or 2".to_string()),
                };
                let Some(start) = self.selected.take() else {
                    return (false, "nothing selected".to_string());
                };
                let result = self.game.try_finish_by_die(start, die);
                self.report(result)
            }

            "autoplay" => {
                if let Some(refusal) = self.play_gate(true) {
                    return refusal;
                }
                let key = match args.first().map(|k| k.parse::<BoardKey>()) {
                    Some(Ok(key)) => key,
                    Some(Err(err)) => return (false, err.to_string()),
                    None => return (false, "missing argument".to_string()),
                };
                self.selected = None;
                let result = self.game.autoplay(&key);
                self.report(result)
            }

            "completions" => {
                let lines: Vec<String> = self
                    .game
                    .completions()
                    .iter()
                    .map(|(key, seq)| {
                        let steps: Vec<String> = seq.iter().map(|s| s.to_string()).collect();
                        format!("{key} : {}", steps.join(", "))
                    })
                    .collect();
                (true, lines.join("\n"))
            }

            "undo" => {
                self.selected = None;
                let result = self.game.undo_turn();
                self.roll_reply(result)
            }

            "showboard" => (true, format!("\n{}", self.game.board())),

            "status" => {
                let g = &self.game;
                let mut status = format!("to move: {}", g.player());
                if g.rolled() {
                    status.push_str(&format!("\ndice: {}", g.dice()));
                    status.push_str(&format!("\ncompletions: {}", g.completions().len()));
                }
                if let Some(winner) = g.winner() {
                    let mars = if g.is_mars() { " (mars)" } else { "" };
                    status.push_str(&format!("\nwinner: {winner}{mars}"));
                }
                (true, status)
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
