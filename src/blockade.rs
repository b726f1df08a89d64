//! The six-point blockade rule.
//!
//! A player may not leave six or more consecutive points in front of every
//! opposing piece, unless the opponent already has a piece in its home or the
//! dice still to be played this turn can break the wall. Candidate moves are
//! mocked on the turn, judged, and undone.

use crate::board::{Board, Coord};
use crate::constants::{BLOCKADE_LEN, COLS, DOUBLES_USES};
use crate::dice::Die;
use crate::turn::{Edit, Turn};

/// A run of the mover's points, listed from its rearmost point along the
/// opponent's path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Blockade {
    pub start: Coord,
    pub length: i32,
}

/// The mover's blockade that every opposing piece would have to pass, if any.
///
/// Scans the opponent's path backwards from the end of the mover's head row.
/// An opposing piece met before six points are found means that piece is
/// already past any wall, so there is nothing to report.
pub fn blocking_all(board: &Board) -> Option<Blockade> {
    let me = board.player();
    let them = me.other();
    if board.reached_enemy_home(them) > 0 {
        return None;
    }

    let sign = board.sign();
    let mut coord = Coord::new(me.row(), COLS as i32 - 1);
    let mut streak = 0;
    while coord.in_bounds() {
        let n = board.at(coord) * sign;
        if n > 0 {
            streak += 1;
            if streak == BLOCKADE_LEN {
                let mut block = Blockade {
                    start: coord,
                    length: streak,
                };
                let mut next = coord.advance(-1, them);
                while next.in_bounds() && board.at(next) * sign > 0 {
                    block.start = next;
                    block.length += 1;
                    next = next.advance(-1, them);
                }
                return Some(block);
            }
        } else if n < 0 {
            return None;
        } else {
            streak = 0;
        }
        coord = coord.advance(-1, them);
    }
    None
}

/// Whether the dice left this turn can break `block`.
///
/// Only the die still available is tried, lifting every piece off one of the
/// block's rear points. The block geometry is the one measured on entry.
pub fn is_fixable(turn: &mut Turn, block: Blockade) -> bool {
    let available = if turn.dice.can_use(Die::Second) {
        Die::Second
    } else {
        Die::First
    };
    if !turn.dice.can_use(available) {
        return false;
    }
    let moves_left = if turn.dice.doubles() {
        DOUBLES_USES.saturating_sub(turn.dice.total_used())
    } else {
        1u8.saturating_sub(turn.dice.used(available))
    };

    let them = turn.player().other();
    (block.length - BLOCKADE_LEN..BLOCKADE_LEN).any(|d| {
        let from = block.start.advance(d, them);
        breaks_from(turn, from, available, moves_left)
    })
}

/// Lift every piece off `from` with `die` and see whether the wall is gone.
fn breaks_from(turn: &mut Turn, from: Coord, die: Die, moves_left: u8) -> bool {
    let n = turn.board.at(from).unsigned_abs();
    if n > moves_left {
        return false;
    }

    let dest = turn.dest(from, die);
    let mut edits = Vec::with_capacity(usize::from(n));
    for _ in 0..n {
        if turn.board.valid_start(from).is_err() || turn.board.well_defined_end(from, dest).is_err()
        {
            break;
        }
        match turn.mock_step(from, die) {
            Some(edit) => edits.push(edit),
            None => break,
        }
    }

    let fixed = blocking_all(&turn.board).is_none();
    for edit in edits.into_iter().rev() {
        turn.undo(edit);
    }
    fixed
}

fn leaves_unfixable(turn: &mut Turn, edit: Option<Edit>) -> bool {
    let Some(edit) = edit else {
        return true;
    };
    let illegal = match blocking_all(&turn.board) {
        Some(block) => {
            log::trace!("blockade at {} spanning {} points", block.start, block.length);
            !is_fixable(turn, block)
        }
        None => false,
    };
    turn.undo(edit);
    illegal
}

/// Whether playing `die` from `start` leaves a blockade that cannot be broken.
/// A step that cannot even be applied counts as illegal.
pub fn illegal_step(turn: &mut Turn, start: Coord, die: Die) -> bool {
    let edit = turn.mock_step(start, die);
    leaves_unfixable(turn, edit)
}

/// Like [`illegal_step`] for a compound `start -> end` move.
pub fn illegal_span(turn: &mut Turn, start: Coord, end: Coord) -> bool {
    let edit = turn.mock_span(start, end);
    leaves_unfixable(turn, edit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cells, Player};
    use crate::dice::Dice;

    fn board(rows: Cells, player: Player) -> Board {
        Board::from_rows(rows, player).unwrap()
    }

    #[test]
    fn test_six_in_a_row() {
        let rows = [
            [2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0],
            [-15, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        let block = blocking_all(&board(rows, Player::White)).unwrap();
        assert_eq!(block.start, Coord::new(0, 0));
        assert_eq!(block.length, 6);
    }

    #[test]
    fn test_longer_block_reports_its_rear() {
        let rows = [
            [3, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0],
            [-15, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        let block = blocking_all(&board(rows, Player::White)).unwrap();
        assert_eq!(block.start, Coord::new(0, 0));
        assert_eq!(block.length, 7);
    }

    #[test]
    fn test_five_is_not_a_block() {
        let rows = [
            [5, 2, 2, 2, 2, 0, 2, 0, 0, 0, 0, 0],
            [-15, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        assert_eq!(blocking_all(&board(rows, Player::White)), None);
    }

    #[test]
    fn test_block_across_the_row_boundary() {
        let rows = [
            [10, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [-15, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1],
        ];
        let block = blocking_all(&board(rows, Player::White)).unwrap();
        assert_eq!(block.start, Coord::new(1, 9));
        assert_eq!(block.length, 6);
    }

    #[test]
    fn test_enemy_ahead_of_block() {
        let rows = [
            [10, 1, 1, 0, -1, 0, 0, 0, 0, 0, 0, 0],
            [-14, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1],
        ];
        assert_eq!(blocking_all(&board(rows, Player::White)), None);
    }

    #[test]
    fn test_enemy_in_home_disables_rule() {
        let rows = [
            [2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, -1],
            [-14, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        assert_eq!(blocking_all(&board(rows, Player::White)), None);
    }

    #[test]
    fn test_black_block() {
        let rows = [
            [15, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [-3, -2, -2, -2, -2, -2, -2, 0, 0, 0, 0, 0],
        ];
        let block = blocking_all(&board(rows, Player::Black)).unwrap();
        assert_eq!(block.start, Coord::new(1, 0));
        assert_eq!(block.length, 7);
    }

    #[test]
    fn test_step_legality() {
        let rows = [
            [3, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, -1, -1],
        ];
        let mut t = Turn::new(board(rows, Player::White));
        t.dice = Dice::new(5, 1).unwrap();
        let before = t.clone();

        // closing the sixth point with the 5 leaves the 1 free to reopen it
        assert!(!illegal_step(&mut t, Coord::new(0, 0), Die::First));
        // closing it with the 1 leaves the 5, which can lift the single piece on (0,4)
        assert!(!illegal_step(&mut t, Coord::new(0, 4), Die::Second));
        assert_eq!(t, before);

        // last die of the turn closes the wall
        let rows = [
            [3, 2, 2, 1, 3, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, -1, -1],
        ];
        let mut t = Turn::new(board(rows, Player::White));
        t.dice = Dice::new(5, 1).unwrap();
        t.dice.consume(Die::Second, 1);
        assert!(illegal_step(&mut t, Coord::new(0, 0), Die::First));
        assert!(!illegal_step(&mut t, Coord::new(0, 1), Die::First));
    }

    #[test]
    fn test_unplayable_step_counts_as_illegal() {
        let rows = [
            [15, 0, 0, 0, 0, 0, -1, 0, 0, 0, 0, 0],
            [-14, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        let mut t = Turn::new(board(rows, Player::White));
        t.dice = Dice::new(6, 6).unwrap();
        assert!(illegal_step(&mut t, Coord::new(0, 0), Die::First));
    }
}
