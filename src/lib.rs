//! Nardi-Rules: rules and move legality for long Nardi.
//!
//! The crate answers one question for any position and roll: which moves are
//! legal, and which ways of finishing the turn exist. On top of that sits a
//! small game session and a text protocol for driving it.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, piece counts and rule thresholds
//! - [`board`] - Players, coordinates and the board with its aggregates
//! - [`dice`] - The two dice and their shared usage pool
//! - [`turn`] - Turn context and reversible edits
//! - [`arbiter`] - Legality of single steps and compound moves
//! - [`blockade`] - The six-point blockade rule
//! - [`prevention`] - The rule against stranding the other die
//! - [`first_move`] - Opening double 4 and double 6
//! - [`search`] - Enumeration of every legal completion of a roll
//! - [`game`] - Game session: roll, move, autoplay, switch and undo
//! - [`shell`] - Line-oriented text protocol
//! - [`status`] - Rejections, outcomes and engine errors
//!
//! ## Example
//!
//! ```
//! use nardi_rules::board::Coord;
//! use nardi_rules::game::Game;
//! use nardi_rules::status::Outcome;
//!
//! let mut game = Game::with_seed(7);
//! game.set_dice(6, 5).unwrap();
//!
//! // the opening 6-5 can only be played one way
//! assert_eq!(game.completions().len(), 1);
//! let outcome = game.try_finish_move(Coord::new(0, 0), Coord::new(0, 11)).unwrap();
//! assert_eq!(outcome, Outcome::NoLegalMovesLeft);
//! ```

pub mod arbiter;
pub mod blockade;
pub mod board;
pub mod constants;
pub mod dice;
pub mod first_move;
pub mod game;
pub mod prevention;
pub mod search;
pub mod shell;
pub mod status;
pub mod turn;
