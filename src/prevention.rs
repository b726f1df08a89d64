//! The rule that a move may not strand the other die.
//!
//! When both dice of a non-double roll are still unused and the turn can be
//! played in full, the first step must leave at least one legal step for the
//! remaining die.

use crate::arbiter;
use crate::board::Coord;
use crate::dice::Die;
use crate::turn::Turn;

/// Whether the uses still open this turn fit within the longest completion.
fn turn_completable(turn: &Turn) -> bool {
    let usable = Die::BOTH.iter().filter(|&&d| turn.dice.can_use(d)).count();
    let per_die = if turn.dice.doubles() { 2 } else { 1 };
    usable * per_die <= turn.max_len
}

fn check_needed(turn: &Turn) -> bool {
    !turn.dice.doubles()
        && turn.dice.can_use(Die::First)
        && turn.dice.can_use(Die::Second)
        && turn_completable(turn)
}

/// Whether playing `die` from `start` leaves no legal step for the other die.
pub fn illegal(turn: &mut Turn, start: Coord, die: Die) -> bool {
    if !check_needed(turn) {
        return false;
    }
    let Some(edit) = turn.mock_step(start, die) else {
        return false;
    };

    let other = die.other();
    let stranded = !turn
        .player()
        .path()
        .any(|c| arbiter::board_and_block_legal(turn, c, other).is_ok());

    turn.undo(edit);
    stranded
}
