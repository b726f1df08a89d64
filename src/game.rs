//! A game session: rolling, committing moves, autoplay, turn switching and undo.
//!
//! The session owns the shared [`Turn`] and re-runs the completion search after
//! every committed step, so [`Game::completions`] always describes what is
//! left to play. Moves are committed as single-die [`Edit`]s; the edits of each
//! finished turn are kept in the history so a turn can be reverted exactly.

use crate::arbiter;
use crate::board::{Board, BoardKey, Coord, Player};
use crate::constants::PIECES_PER_PLAYER;
use crate::dice::{Dice, Die};
use crate::search::{self, Completions, MoveSequence};
use crate::status::{EngineError, Legality, Outcome, Rejection};
use crate::turn::{Edit, Turn};

/// What a finished turn did, enough to take it back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnRecord {
    pub player: Player,
    pub dice: Dice,
    pub edits: Vec<Edit>,
}

/// Game session state.
pub struct Game {
    turn: Turn,
    rng: fastrand::Rng,
    /// Completions of the current roll from the latest search
    completions: Completions,
    /// Steps committed since the roll
    played: Vec<Edit>,
    history: Vec<TurnRecord>,
    /// Whether the side to move has rolled this turn
    rolled: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A new game from the starting layout, White to move.
    pub fn new() -> Self {
        Self::with_rng(Board::new(), fastrand::Rng::new())
    }

    /// Like [`Game::new`] with reproducible dice.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Board::new(), fastrand::Rng::with_seed(seed))
    }

    /// Continue from an arbitrary position. Both players count as past their
    /// first roll, so the opening rule is off.
    pub fn from_board(board: Board) -> Self {
        let mut game = Self::with_rng(board, fastrand::Rng::new());
        game.turn.turn_number = [1, 1];
        game
    }

    fn with_rng(board: Board, rng: fastrand::Rng) -> Self {
        Self {
            turn: Turn::new(board),
            rng,
            completions: Completions::new(),
            played: Vec::new(),
            history: Vec::new(),
            rolled: false,
        }
    }

    /// Override the roll counters, e.g. to replay an opening on a loaded board.
    pub fn set_turn_numbers(&mut self, numbers: [u32; 2]) {
        self.turn.turn_number = numbers;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn turn(&self) -> &Turn {
        &self.turn
    }

    pub fn board(&self) -> &Board {
        &self.turn.board
    }

    pub fn dice(&self) -> &Dice {
        &self.turn.dice
    }

    pub fn player(&self) -> Player {
        self.turn.player()
    }

    pub fn turn_number(&self, p: Player) -> u32 {
        self.turn.turn_number[p.index()]
    }

    pub fn rolled(&self) -> bool {
        self.rolled
    }

    pub fn completions(&self) -> &Completions {
        &self.completions
    }

    /// The only way to finish the roll, if there is exactly one.
    pub fn forced_completion(&self) -> Option<(&BoardKey, &MoveSequence)> {
        if self.completions.len() == 1 {
            self.completions.iter().next()
        } else {
            None
        }
    }

    /// Length of the longest completion of the current roll.
    pub fn max_len(&self) -> usize {
        self.turn.max_len
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    pub fn turn_in_progress(&self) -> bool {
        self.turn.dice.in_progress()
    }

    pub fn is_over(&self) -> bool {
        self.winner().is_some()
    }

    pub fn winner(&self) -> Option<Player> {
        Player::BOTH
            .into_iter()
            .find(|&p| self.turn.board.pieces_left(p) == 0)
    }

    /// The game ended before the loser bore off a single piece.
    pub fn is_mars(&self) -> bool {
        self.winner()
            .is_some_and(|w| self.turn.board.pieces_left(w.other()) == PIECES_PER_PLAYER)
    }

    // =========================================================================
    // Rolling
    // =========================================================================

    /// Roll both dice for the side to move.
    pub fn roll(&mut self) -> Result<Outcome, EngineError> {
        let [a, b] = Dice::roll(&mut self.rng);
        self.set_dice(a, b)
    }

    /// Start the turn with fixed dice.
    pub fn set_dice(&mut self, a: u8, b: u8) -> Result<Outcome, EngineError> {
        if self.turn_in_progress() {
            return Err(EngineError::TurnInProgress);
        }
        self.turn.dice.set(a, b)?;
        self.turn.dice.reset_usage();
        self.on_roll()
    }

    fn on_roll(&mut self) -> Result<Outcome, EngineError> {
        let mover = self.player().index();
        self.turn.turn_number[mover] += 1;
        self.turn.first_move_exception = false;
        self.turn.max_dice_exception = false;
        self.rolled = true;
        self.refresh()
    }

    /// Recompute the completions for whatever is left of the roll.
    fn refresh(&mut self) -> Result<Outcome, EngineError> {
        self.completions = search::legal_sequences(&mut self.turn)?;
        Ok(if self.completions.is_empty() {
            Outcome::NoLegalMovesLeft
        } else {
            Outcome::Success
        })
    }

    // =========================================================================
    // Moving
    // =========================================================================

    /// Whether a piece may be picked up from `start`.
    pub fn try_start(&self, start: Coord) -> Legality {
        arbiter::can_start_from(&self.turn, start)
    }

    /// Move the piece on `start` to `end` with whichever dice cover the
    /// distance. Removals go through [`Game::try_finish_by_die`].
    pub fn try_finish_move(&mut self, start: Coord, end: Coord) -> Result<Outcome, EngineError> {
        arbiter::can_start_from(&self.turn, start)?;
        let uses = arbiter::legal_move(&mut self.turn, start, end)?;

        let mut steps = Vec::with_capacity(4);
        if self.turn.dice.doubles() {
            let mut from = start;
            for _ in 0..uses[0] + uses[1] {
                steps.push((from, Die::First));
                from = self.turn.dest(from, Die::First);
            }
        } else {
            match uses {
                [1, 0] => steps.push((start, Die::First)),
                [0, 1] => steps.push((start, Die::Second)),
                _ => {
                    let first = if self
                        .turn
                        .board
                        .well_defined_end(start, self.turn.dest(start, Die::First))
                        .is_ok()
                    {
                        Die::First
                    } else {
                        Die::Second
                    };
                    steps.push((start, first));
                    steps.push((self.turn.dest(start, first), first.other()));
                }
            }
        }
        self.commit(&steps)
    }

    /// Play `die` from `start`, removing the piece if that is what the die does.
    pub fn try_move_by_die(&mut self, start: Coord, die: Die) -> Result<Outcome, EngineError> {
        arbiter::can_move_by_die(&mut self.turn, start, die)?;
        self.make_move(start, die)
    }

    /// Play `die` from `start` once the piece has been picked up, e.g. to bear
    /// it off when the end point is off the board.
    pub fn try_finish_by_die(&mut self, start: Coord, die: Die) -> Result<Outcome, EngineError> {
        arbiter::can_start_from(&self.turn, start)?;
        arbiter::can_finish_by_die(&mut self.turn, start, die)?;
        self.make_move(start, die)
    }

    /// Commit `steps` in order. If one of them cannot be applied, the steps
    /// already played by this call are taken back.
    fn commit(&mut self, steps: &[(Coord, Die)]) -> Result<Outcome, EngineError> {
        let mark = self.played.len();
        let mut outcome = Outcome::Success;
        for &(from, die) in steps {
            match self.make_move(from, die) {
                Ok(o) => outcome = o,
                Err(e) => {
                    for edit in self.played.drain(mark..).rev() {
                        self.turn.undo(edit);
                    }
                    self.refresh()?;
                    return Err(e);
                }
            }
        }
        Ok(outcome)
    }

    fn make_move(&mut self, start: Coord, die: Die) -> Result<Outcome, EngineError> {
        let edit = self
            .turn
            .mock_step(start, die)
            .ok_or(EngineError::Rejected(Rejection::NoPath))?;
        log::debug!("{} plays {} by the {} die", self.player(), start, die);
        self.played.push(edit);
        self.refresh()
    }

    /// Play a whole completion of the current roll.
    ///
    /// Each recorded step is checked again as it is replayed; a step the
    /// arbiter refuses means the search and the rules disagree, and that is
    /// reported as fatal.
    pub fn autoplay(&mut self, key: &BoardKey) -> Result<Outcome, EngineError> {
        let seq = self
            .completions
            .get(key)
            .cloned()
            .ok_or(EngineError::UnknownCompletion(*key))?;

        for step in seq {
            let diverged = |reason| EngineError::AutoplayDiverged {
                from: step.from,
                die: step.die,
                reason,
            };
            arbiter::can_move_by_die(&mut self.turn, step.from, step.die).map_err(diverged)?;
            let edit = self
                .turn
                .mock_step(step.from, step.die)
                .ok_or_else(|| diverged(Rejection::NoPath))?;
            self.played.push(edit);
        }
        log::debug!("{} autoplayed to {}", self.player(), key);
        self.refresh()
    }

    // =========================================================================
    // Turn control
    // =========================================================================

    /// Hand the board to the other player and file the finished turn.
    pub fn switch_player(&mut self) {
        self.history.push(TurnRecord {
            player: self.player(),
            dice: self.turn.dice,
            edits: std::mem::take(&mut self.played),
        });
        self.turn.dice.reset_usage();
        self.turn.board.switch_player();
        self.turn.first_move_exception = false;
        self.turn.max_dice_exception = false;
        self.turn.max_len = 0;
        self.completions.clear();
        self.rolled = false;
    }

    /// Take back the previous player's whole turn and give them the same roll again.
    ///
    /// Only possible before anything has been played on the current roll.
    pub fn undo_turn(&mut self) -> Result<Outcome, EngineError> {
        if self.turn_in_progress() {
            return Err(EngineError::TurnInProgress);
        }
        let record = self.history.pop().ok_or(EngineError::NothingToUndo)?;

        if self.rolled {
            let current = self.player().index();
            self.turn.turn_number[current] = self.turn.turn_number[current].saturating_sub(1);
        }

        self.turn.dice = record.dice;
        self.turn.board.switch_player();
        for edit in record.edits.into_iter().rev() {
            self.turn.undo(edit);
        }
        self.turn.dice.reset_usage();
        self.played.clear();

        let previous = self.player().index();
        self.turn.turn_number[previous] = self.turn.turn_number[previous].saturating_sub(1);
        log::debug!("undid the last turn of {}", record.player);
        self.on_roll()
    }
}
