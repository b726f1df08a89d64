//! The turn context shared by the arbiter, the monitors and the search.
//!
//! Every exploratory mutation goes through [`Turn::mock_step`] or
//! [`Turn::mock_span`], which return an [`Edit`] describing exactly what changed.
//! Handing that edit back to [`Turn::undo`] restores the board and the dice
//! pool, so no caller has to re-derive how a move was applied.

use crate::board::{Board, Coord, Player};
use crate::constants::COLS;
use crate::dice::{Dice, Die};

/// One reversible change to the turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// A single die moved a piece.
    Moved {
        from: Coord,
        to: Coord,
        die: Die,
        head_was_used: bool,
    },
    /// A single die bore a piece off.
    Removed { from: Coord, die: Die },
    /// A compound move consumed `uses` of each die at once.
    Span {
        from: Coord,
        to: Coord,
        uses: [u8; 2],
        head_was_used: bool,
    },
}

impl Edit {
    /// Start point and die of a single-die edit.
    pub fn step(&self) -> Option<(Coord, Die)> {
        match *self {
            Edit::Moved { from, die, .. } | Edit::Removed { from, die } => Some((from, die)),
            Edit::Span { .. } => None,
        }
    }
}

/// Board, dice and rule-exception state for the side to move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub board: Board,
    pub dice: Dice,
    /// Rolls each player has made, the current one included.
    pub turn_number: [u32; 2],
    /// Opening double 4 or 6: only the prescribed steps are legal.
    pub first_move_exception: bool,
    /// Only the larger die may be played this turn.
    pub max_dice_exception: bool,
    /// Length of the longest completion found by the latest search.
    pub max_len: usize,
}

impl Turn {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            dice: Dice::default(),
            turn_number: [0; 2],
            first_move_exception: false,
            max_dice_exception: false,
            max_len: 0,
        }
    }

    pub fn player(&self) -> Player {
        self.board.player()
    }

    /// Current turn number of the side to move.
    pub fn mover_turn_number(&self) -> u32 {
        self.turn_number[self.player().index()]
    }

    /// Destination of a single-die step from `start`.
    pub fn dest(&self, start: Coord, die: Die) -> Coord {
        self.board.coord_after(start, self.dice.steps(die))
    }

    /// Whether `die` bears off the piece on `start`.
    ///
    /// Only in the endgame, and only when the die matches the distance to the
    /// end exactly or overshoots it while `start` is the farthest occupied point.
    pub fn removes_from(&self, start: Coord, die: Die) -> bool {
        if !self.board.in_endgame() {
            return false;
        }
        let to_end = COLS as i32 - start.col;
        let d = self.dice.steps(die);
        to_end == d || (to_end >= self.board.max_num_occ() && d > to_end)
    }

    /// Apply a single-die step without any rule checks beyond a well-formed
    /// destination. Returns `None`, leaving everything untouched, if the step
    /// can neither remove nor land.
    pub fn mock_step(&mut self, start: Coord, die: Die) -> Option<Edit> {
        let dest = self.dest(start, die);
        let edit = if self.removes_from(start, die) {
            self.board.remove(start);
            Edit::Removed { from: start, die }
        } else if self.board.well_defined_end(start, dest).is_ok() {
            let head_was_used = self.board.head_used();
            self.board.move_piece(start, dest);
            Edit::Moved {
                from: start,
                to: dest,
                die,
                head_was_used,
            }
        } else {
            return None;
        };
        self.dice.consume(die, 1);
        Some(edit)
    }

    /// Dice uses a forward displacement of `d` would consume, if any plan fits.
    pub fn uses_for_distance(&self, d: i32) -> Option<[u8; 2]> {
        let v0 = self.dice.steps(Die::First);
        let v1 = self.dice.steps(Die::Second);
        if d <= 0 {
            None
        } else if d == v0 {
            Some([1, 0])
        } else if d == v1 {
            Some([0, 1])
        } else if d == v0 + v1 {
            Some([1, 1])
        } else if self.dice.doubles() && d % v0 == 0 {
            let k = u8::try_from(d / v0).ok()?;
            self.dice.can_use_n(Die::First, k).then_some([k, 0])
        } else {
            None
        }
    }

    /// Apply a compound `start -> end` move in one piece, charging the dice it
    /// implies. Used to test where a compound move would leave the board.
    pub fn mock_span(&mut self, start: Coord, end: Coord) -> Option<Edit> {
        if start.out_of_bounds() || end.out_of_bounds() {
            return None;
        }
        let uses = self.uses_for_distance(self.board.distance(start, end))?;
        let head_was_used = self.board.head_used();
        self.board.move_piece(start, end);
        self.dice.consume(Die::First, uses[0]);
        self.dice.consume(Die::Second, uses[1]);
        Some(Edit::Span {
            from: start,
            to: end,
            uses,
            head_was_used,
        })
    }

    /// Revert an edit produced by this turn's mock functions.
    pub fn undo(&mut self, edit: Edit) {
        match edit {
            Edit::Moved {
                from,
                to,
                die,
                head_was_used,
            } => {
                self.board.undo_move(from, to);
                self.board.set_head_used(head_was_used);
                self.dice.release(die, 1);
            }
            Edit::Removed { from, die } => {
                self.board.undo_remove(from);
                self.dice.release(die, 1);
            }
            Edit::Span {
                from,
                to,
                uses,
                head_was_used,
            } => {
                self.board.undo_move(from, to);
                self.board.set_head_used(head_was_used);
                self.dice.release(Die::First, uses[0]);
                self.dice.release(Die::Second, uses[1]);
            }
        }
    }
}
