//! Opening doubles.
//!
//! On a player's first roll, double 6 and double 4 cannot be played under the
//! normal head rule. Double 6 moves two pieces from the head to column 6.
//! Double 4 moves two pieces from the head to column 4 and on to column 8,
//! unless column 8 is held by the opponent.

use crate::board::Coord;
use crate::constants::{OPENING_HEAD_FLOOR, OPENING_PIVOT_COL, OPENING_STACK, OPENING_TARGET_COL};
use crate::dice::Die;
use crate::search::{Completions, MoveSequence, Step};
use crate::status::EngineError;
use crate::turn::Turn;

fn applies(turn: &Turn) -> bool {
    let value = turn.dice.value(Die::First);
    turn.mover_turn_number() == 1 && turn.dice.doubles() && (value == 4 || value == 6)
}

/// The single completion of an opening double, or `None` when the roll is not one.
///
/// Sets the first-move exception on the turn when it applies. Whatever part of
/// the opening has already been played is taken into account, so the result
/// lists only the remaining steps; it is empty once the opening is done.
pub fn forced_opening(turn: &mut Turn) -> Result<Option<Completions>, EngineError> {
    if !applies(turn) {
        return Ok(None);
    }

    let me = turn.player();
    let head = me.head();
    let pivot = Coord::new(me.row(), OPENING_PIVOT_COL);
    let target = Coord::new(me.row(), OPENING_TARGET_COL);
    let value = turn.dice.value(Die::First);

    let mut edits = Vec::new();
    let mut seq = MoveSequence::new();
    let mut play = |turn: &mut Turn, from: Coord| match turn.mock_step(from, Die::First) {
        Some(edit) => {
            edits.push(edit);
            seq.push(Step { from, die: Die::First });
            true
        }
        None => false,
    };

    while turn.board.at(head).unsigned_abs() > OPENING_HEAD_FLOOR {
        if !play(turn, head) {
            break;
        }
    }
    if value == 4 && turn.board.well_defined_end(pivot, target).is_ok() {
        while turn.board.at(target).unsigned_abs() < OPENING_STACK {
            if !play(turn, pivot) {
                break;
            }
        }
    }

    let mut found = Completions::new();
    let shape = if seq.is_empty() {
        Ok(())
    } else {
        found.insert(turn.board.key(), seq);
        check_shape(turn, value)
    };

    for edit in edits.into_iter().rev() {
        turn.undo(edit);
    }
    shape?;

    turn.first_move_exception = true;
    turn.max_len = found.values().map(Vec::len).max().unwrap_or(0);
    log::debug!("{} opens with double {}", me, value);
    Ok(Some(found))
}

fn check_shape(turn: &Turn, value: u8) -> Result<(), EngineError> {
    let row = turn.player().row();
    let (point, ok) = if value == 6 {
        let point = Coord::new(row, i32::from(value));
        (point, turn.board.at(point).unsigned_abs() == OPENING_STACK)
    } else {
        let point = Coord::new(row, OPENING_TARGET_COL);
        let found = turn.board.at(point);
        (point, found.unsigned_abs() == OPENING_STACK || found * turn.board.sign() == -1)
    };
    if ok {
        Ok(())
    } else {
        Err(EngineError::OpeningShape {
            value,
            point,
            found: turn.board.at(point),
        })
    }
}
