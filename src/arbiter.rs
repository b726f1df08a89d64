//! Move legality: board primitives combined with the rule monitors.
//!
//! Single-die questions go through [`board_and_block_legal_end`], which layers
//! dice availability, the active rule exceptions, destination checks, bear-off
//! and the blockade rule. [`can_finish_by_die`] adds the turn-completion rule on
//! top. Compound `start -> end` requests are classified by [`legal_move`] into
//! the number of uses each die would spend.
//!
//! All functions take the shared [`Turn`] mutably because the monitors mock
//! moves on it; every mock is undone before they return.

use crate::blockade;
use crate::board::Coord;
use crate::constants::{OPENING_HEAD_FLOOR, OPENING_PIVOT_COL, OPENING_TARGET_COL};
use crate::dice::Die;
use crate::prevention;
use crate::status::{Legality, Rejection};
use crate::turn::Turn;

/// Head may be played again while the opening double exception is active.
fn opening_head(turn: &Turn, start: Coord) -> bool {
    turn.board.is_head(start) && turn.board.at(start).unsigned_abs() > OPENING_HEAD_FLOOR
}

/// The opening double 4 also moves pieces on from column 4.
fn opening_pivot(turn: &Turn, start: Coord) -> bool {
    turn.dice.value(Die::First) == 4
        && start == Coord::new(turn.player().row(), OPENING_PIVOT_COL)
        && turn.board.at(start) * turn.board.sign() > 0
}

/// Whether the mover may pick a piece up from `start`.
pub fn can_start_from(turn: &Turn, start: Coord) -> Legality {
    if turn.first_move_exception && opening_head(turn, start) {
        return Ok(());
    }
    turn.board.valid_start(start)
}

/// Full check for playing `die` from `start`; returns the destination.
pub fn can_move_by_die(turn: &mut Turn, start: Coord, die: Die) -> Result<Coord, Rejection> {
    can_start_from(turn, start)?;
    can_finish_by_die(turn, start, die)
}

/// Start and end legality without the completion rule. The search uses this.
pub fn board_and_block_legal(turn: &mut Turn, start: Coord, die: Die) -> Legality {
    turn.board.valid_start(start)?;
    board_and_block_legal_end(turn, start, die)
}

/// Legality of playing `die` from an already accepted `start`.
pub fn board_and_block_legal_end(turn: &mut Turn, start: Coord, die: Die) -> Legality {
    if !turn.dice.can_use(die) {
        return Err(Rejection::DiceUsedAlready);
    }
    if turn.max_dice_exception && turn.dice.value(die) < turn.dice.value(die.other()) {
        return Err(Rejection::MiscFailure);
    }
    if turn.first_move_exception {
        return if opening_head(turn, start) || opening_pivot(turn, start) {
            Ok(())
        } else {
            Err(Rejection::MiscFailure)
        };
    }

    let dest = turn.dest(start, die);
    if let Err(reason) = turn.board.well_defined_end(start, dest) {
        // an impossible landing can still be a legal bear-off
        if !turn.removes_from(start, die) {
            return Err(reason);
        }
    }

    if blockade::illegal_step(turn, start, die) {
        Err(Rejection::BadBlock)
    } else {
        Ok(())
    }
}

/// [`board_and_block_legal_end`] plus the rule against stranding the other die.
pub fn can_finish_by_die(turn: &mut Turn, start: Coord, die: Die) -> Result<Coord, Rejection> {
    board_and_block_legal_end(turn, start, die)?;
    if prevention::illegal(turn, start, die) {
        return Err(Rejection::PreventsCompletion);
    }
    Ok(turn.dest(start, die))
}

/// Classify `start -> end` and check it, returning how many times each die
/// would be used: `[1, 0]`, `[0, 1]`, `[1, 1]`, or `[k, 0]` for `k` steps of a
/// doubles roll.
pub fn legal_move(turn: &mut Turn, start: Coord, end: Coord) -> Result<[u8; 2], Rejection> {
    if end.out_of_bounds() {
        return Err(Rejection::OutOfBounds);
    }

    let d = turn.board.distance(start, end);
    let v0 = turn.dice.steps(Die::First);
    let v1 = turn.dice.steps(Die::Second);

    if d == v0 {
        can_finish_by_die(turn, start, Die::First)?;
        Ok([1, 0])
    } else if d == v1 {
        can_finish_by_die(turn, start, Die::Second)?;
        Ok([0, 1])
    } else if d == v0 + v1 {
        legal_two_step(turn, start)?;
        Ok([1, 1])
    } else if turn.dice.doubles() && d > 0 && d % v0 == 0 {
        let k = u8::try_from(d / v0).map_err(|_| Rejection::NoPath)?;
        if !turn.dice.can_use_n(Die::First, k) {
            return Err(Rejection::DiceUsedAlready);
        }
        if !(3..=4).contains(&k) {
            return Err(Rejection::NoPath);
        }
        let mid = legal_two_step(turn, start).map_err(|_| Rejection::NoPath)?;

        // the rest of the move is judged with the first two steps on the board
        let edit = turn.mock_span(start, mid).ok_or(Rejection::NoPath)?;
        let rest = if k == 3 {
            can_finish_by_die(turn, mid, Die::First).map(drop)
        } else {
            legal_two_step(turn, mid).map(drop)
        };
        turn.undo(edit);
        rest?;
        Ok([k, 0])
    } else {
        Err(Rejection::NoPath)
    }
}

/// Legality of moving one piece by the sum of both dice; returns the landing point.
///
/// The landing point must be well defined and blockade-safe, and at least one
/// order of the dice must have a legal intermediate point.
pub fn legal_two_step(turn: &mut Turn, start: Coord) -> Result<Coord, Rejection> {
    if turn.dice.total_used() + 2 > turn.dice.total_uses() {
        return Err(Rejection::DiceUsedAlready);
    }
    if turn.max_dice_exception {
        return Err(Rejection::MiscFailure);
    }
    if turn.first_move_exception {
        return if turn.dice.value(Die::First) == 4 && opening_head(turn, start) {
            Ok(Coord::new(turn.player().row(), OPENING_TARGET_COL))
        } else {
            Err(Rejection::MiscFailure)
        };
    }

    let end = turn
        .board
        .coord_after(start, turn.dice.steps(Die::First) + turn.dice.steps(Die::Second));
    turn.board.well_defined_end(start, end)?;
    if blockade::illegal_span(turn, start, end) {
        return Err(Rejection::BadBlock);
    }

    let via = |die: Die| turn.board.well_defined_end(start, turn.dest(start, die)).is_ok();
    if via(Die::First) || (!turn.dice.doubles() && via(Die::Second)) {
        Ok(end)
    } else {
        Err(Rejection::NoPath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Cells, Player};
    use crate::dice::Dice;

    fn turn(rows: Cells, player: Player, a: u8, b: u8) -> Turn {
        let mut t = Turn::new(Board::from_rows(rows, player).unwrap());
        t.dice = Dice::new(a, b).unwrap();
        t
    }

    fn safe_board() -> Cells {
        let mut b = [[0; 12]; 2];
        b[1][0] = -1;
        b[1][1] = 1;
        b[1][2] = 1;
        b
    }

    #[test]
    fn test_landing_on_enemy() {
        let mut rows = safe_board();
        rows[0][0] = 1;
        rows[0][4] = -1;
        let mut t = turn(rows, Player::White, 4, 5);
        assert_eq!(
            board_and_block_legal(&mut t, Coord::new(0, 0), Die::First),
            Err(Rejection::DestEnemy)
        );
        assert_eq!(board_and_block_legal(&mut t, Coord::new(0, 0), Die::Second), Ok(()));
    }

    #[test]
    fn test_running_off_the_end_before_endgame() {
        let mut rows = safe_board();
        rows[1][10] = 1;
        rows[0][5] = 1;
        let mut t = turn(rows, Player::White, 3, 5);
        assert_eq!(
            can_move_by_die(&mut t, Coord::new(1, 10), Die::First),
            Err(Rejection::OutOfBounds)
        );
    }

    #[test]
    fn test_bear_off_through_arbiter() {
        let rows = [
            [0; 12],
            [-15, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 0],
        ];
        let mut t = turn(rows, Player::White, 6, 2);
        assert_eq!(board_and_block_legal(&mut t, Coord::new(1, 7), Die::First), Ok(()));
        assert_eq!(
            board_and_block_legal(&mut t, Coord::new(1, 10), Die::First),
            Err(Rejection::OutOfBounds)
        );
        assert_eq!(board_and_block_legal(&mut t, Coord::new(1, 10), Die::Second), Ok(()));
    }

    #[test]
    fn test_used_die_and_max_die_exception() {
        let mut t = Turn::new(Board::new());
        t.dice = Dice::new(3, 5).unwrap();
        t.dice.consume(Die::First, 1);
        assert_eq!(
            board_and_block_legal_end(&mut t, Coord::new(0, 0), Die::First),
            Err(Rejection::DiceUsedAlready)
        );

        let mut t = Turn::new(Board::new());
        t.dice = Dice::new(3, 5).unwrap();
        t.max_dice_exception = true;
        assert_eq!(
            board_and_block_legal_end(&mut t, Coord::new(0, 0), Die::First),
            Err(Rejection::MiscFailure)
        );
        assert_eq!(board_and_block_legal_end(&mut t, Coord::new(0, 0), Die::Second), Ok(()));
        assert_eq!(legal_two_step(&mut t, Coord::new(0, 0)), Err(Rejection::MiscFailure));
    }

    #[test]
    fn test_legal_move_classification() {
        let mut t = Turn::new(Board::new());
        t.dice = Dice::new(3, 5).unwrap();
        let head = Coord::new(0, 0);

        assert_eq!(legal_move(&mut t, head, Coord::new(0, 3)), Ok([1, 0]));
        assert_eq!(legal_move(&mut t, head, Coord::new(0, 5)), Ok([0, 1]));
        assert_eq!(legal_move(&mut t, head, Coord::new(0, 8)), Ok([1, 1]));
        assert_eq!(legal_move(&mut t, head, Coord::new(0, 4)), Err(Rejection::NoPath));
        assert_eq!(legal_move(&mut t, head, head), Err(Rejection::NoPath));
        assert_eq!(legal_move(&mut t, head, Coord::new(0, 12)), Err(Rejection::OutOfBounds));
        // classification never mutates the turn
        assert_eq!(t, {
            let mut fresh = Turn::new(Board::new());
            fresh.dice = Dice::new(3, 5).unwrap();
            fresh
        });
    }

    #[test]
    fn test_doubles_multiples() {
        let mut t = Turn::new(Board::new());
        t.dice = Dice::new(2, 2).unwrap();
        let head = Coord::new(0, 0);

        assert_eq!(legal_move(&mut t, head, Coord::new(0, 4)), Ok([1, 1]));
        assert_eq!(legal_move(&mut t, head, Coord::new(0, 6)), Ok([3, 0]));
        assert_eq!(legal_move(&mut t, head, Coord::new(0, 8)), Ok([4, 0]));
        assert_eq!(
            legal_move(&mut t, head, Coord::new(0, 10)),
            Err(Rejection::DiceUsedAlready)
        );
    }

    #[test]
    fn test_doubles_later_steps_see_earlier_ones() {
        // four 2s from the head close 3..8; three only reach 6
        let rows = [
            [10, 0, 0, 1, 1, 1, 1, 1, 0, 0, 0, 0],
            [-15, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        let mut t = turn(rows, Player::White, 2, 2);
        let before = t.clone();
        let head = Coord::new(0, 0);

        assert_eq!(legal_move(&mut t, head, Coord::new(0, 8)), Err(Rejection::BadBlock));
        assert_eq!(legal_move(&mut t, head, Coord::new(0, 6)), Ok([3, 0]));
        assert_eq!(t, before);
    }

    #[test]
    fn test_two_step_needs_a_midpoint() {
        // both single-die landings are held by Black, the sum is free
        let rows = [
            [14, 0, 0, -2, 0, -2, 0, 0, 0, 0, 0, 0],
            [-11, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        ];
        let mut t = turn(rows, Player::White, 3, 5);
        assert_eq!(legal_two_step(&mut t, Coord::new(0, 0)), Err(Rejection::NoPath));

        // only the first-die midpoint is blocked: the other order works
        let rows = [
            [14, 0, 0, -2, 0, 0, 0, 0, 0, 0, 0, 0],
            [-13, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        ];
        let mut t = turn(rows, Player::White, 3, 5);
        assert_eq!(legal_two_step(&mut t, Coord::new(0, 0)), Ok(Coord::new(0, 8)));
    }

    #[test]
    fn test_two_step_onto_enemy() {
        let rows = [
            [14, 0, 0, 0, 0, 0, 0, 0, -1, 0, 0, 0],
            [-14, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        ];
        let mut t = turn(rows, Player::White, 3, 5);
        assert_eq!(legal_two_step(&mut t, Coord::new(0, 0)), Err(Rejection::DestEnemy));
        assert_eq!(
            legal_move(&mut t, Coord::new(0, 0), Coord::new(0, 8)),
            Err(Rejection::DestEnemy)
        );
    }

    #[test]
    fn test_opening_exception_short_circuits() {
        let mut t = Turn::new(Board::new());
        t.dice = Dice::new(4, 4).unwrap();
        t.first_move_exception = true;
        let head = Coord::new(0, 0);

        assert_eq!(can_start_from(&t, head), Ok(()));
        assert_eq!(legal_two_step(&mut t, head), Ok(Coord::new(0, 8)));
        assert_eq!(
            board_and_block_legal_end(&mut t, Coord::new(0, 4), Die::First),
            Err(Rejection::MiscFailure)
        );
        assert_eq!(board_and_block_legal_end(&mut t, head, Die::First), Ok(()));
    }

    #[test]
    fn test_prevention_through_arbiter() {
        let rows = [
            [13, 0, 0, -1, 0, 0, 1, -1, 0, 0, 0, 1],
            [-13, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        let mut t = turn(rows, Player::White, 1, 2);
        t.max_len = 2;
        let head = Coord::new(0, 0);

        assert_eq!(
            can_finish_by_die(&mut t, head, Die::Second),
            Err(Rejection::PreventsCompletion)
        );
        assert_eq!(
            legal_move(&mut t, head, Coord::new(0, 2)),
            Err(Rejection::PreventsCompletion)
        );
        assert_eq!(can_finish_by_die(&mut t, head, Die::First), Ok(Coord::new(0, 1)));
    }
}
