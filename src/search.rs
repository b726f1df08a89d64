//! Enumeration of every legal way to finish the current roll.
//!
//! A depth-first search mocks each single-die step the arbiter accepts and
//! records the boards reached by the longest sequences. A player must use as
//! many dice as possible, so shorter sequences never count as completions.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::arbiter;
use crate::board::{BoardKey, Coord};
use crate::dice::Die;
use crate::first_move;
use crate::status::EngineError;
use crate::turn::Turn;

/// One die played from one point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    pub from: Coord,
    pub die: Die,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.from, self.die)
    }
}

pub type MoveSequence = Vec<Step>;

/// Resulting board of each legal completion, with one sequence that reaches it.
pub type Completions = BTreeMap<BoardKey, MoveSequence>;

struct Search<'a> {
    turn: &'a mut Turn,
    order: [Die; 2],
    visited: HashSet<(BoardKey, [u8; 2])>,
    seq: MoveSequence,
    found: Completions,
}

impl Search<'_> {
    fn dfs(&mut self) {
        let player = self.turn.player();
        let mut extended = false;

        for die in self.order {
            for from in player.path() {
                if arbiter::board_and_block_legal(self.turn, from, die).is_err() {
                    continue;
                }
                let Some(edit) = self.turn.mock_step(from, die) else {
                    continue;
                };
                extended = true;
                self.seq.push(Step { from, die });

                let node = (self.turn.board.key(), self.turn.dice.used_counts());
                if self.visited.insert(node) {
                    self.dfs();
                }

                self.seq.pop();
                self.turn.undo(edit);
            }
        }

        if !extended && !self.seq.is_empty() && self.seq.len() >= self.turn.max_len {
            if self.seq.len() > self.turn.max_len {
                self.turn.max_len = self.seq.len();
                self.found.clear();
            }
            let seq = self.seq.clone();
            self.found.entry(self.turn.board.key()).or_insert(seq);
        }
    }
}

/// All completions of the current roll, keyed by the board each one leaves.
///
/// Updates `turn.max_len`, sets the first-move exception when the opening
/// double applies, and sets the max-dice exception when only the larger die
/// may be played. The turn is otherwise left as it was found.
pub fn legal_sequences(turn: &mut Turn) -> Result<Completions, EngineError> {
    turn.max_len = 0;
    if let Some(forced) = first_move::forced_opening(turn)? {
        return Ok(forced);
    }

    let larger = turn.dice.larger();
    let mut search = Search {
        turn,
        order: [larger, larger.other()],
        visited: HashSet::new(),
        seq: MoveSequence::new(),
        found: Completions::new(),
    };
    search.dfs();
    let Search {
        turn, mut found, ..
    } = search;

    // when only one die can be played, it has to be the larger one if possible
    if turn.max_len == 1
        && !turn.dice.doubles()
        && turn.dice.can_use(Die::First)
        && turn.dice.can_use(Die::Second)
        && found.values().any(|seq| seq[0].die == larger)
    {
        let before = found.len();
        found.retain(|_, seq| seq[0].die == larger);
        turn.max_dice_exception = found.len() < before;
    }

    log::debug!(
        "{} with {}: {} completions of length {}",
        turn.player(),
        turn.dice,
        found.len(),
        turn.max_len
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Cells, Player};
    use crate::dice::Dice;

    fn turn(rows: Cells, player: Player, a: u8, b: u8) -> Turn {
        let mut t = Turn::new(Board::from_rows(rows, player).unwrap());
        t.dice = Dice::new(a, b).unwrap();
        t.turn_number = [2, 2];
        t
    }

    #[test]
    fn test_opening_roll_has_one_shape() {
        let mut t = Turn::new(Board::new());
        t.dice = Dice::new(6, 5).unwrap();
        t.turn_number = [1, 0];
        let before = t.board.clone();

        let found = legal_sequences(&mut t).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(t.max_len, 2);
        let key = found.keys().next().unwrap();
        assert_eq!(key.cells()[0][0], 14);
        assert_eq!(key.cells()[0][11], 1);
        assert_eq!(t.board, before);
        assert_eq!(t.dice.used_counts(), [0, 0]);
    }

    #[test]
    fn test_larger_die_forced_when_only_one_plays() {
        let rows = [
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, -1],
            [0; 12],
        ];
        let mut t = turn(rows, Player::White, 5, 6);
        let found = legal_sequences(&mut t).unwrap();
        assert_eq!(t.max_len, 1);
        assert_eq!(found.len(), 1);
        let seq = found.values().next().unwrap();
        assert_eq!(seq[0], Step { from: Coord::new(0, 0), die: Die::Second });
        assert!(t.max_dice_exception);
    }

    #[test]
    fn test_no_moves() {
        let rows = [
            [15, -1, -1, -1, -1, -1, -1, 0, 0, 0, 0, 0],
            [-9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        let mut t = turn(rows, Player::White, 3, 5);
        assert!(legal_sequences(&mut t).unwrap().is_empty());
        assert_eq!(t.max_len, 0);
    }

    #[test]
    fn test_doubles_use_four_steps() {
        let rows = [
            [14, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [-15, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        let mut t = turn(rows, Player::White, 2, 2);
        let found = legal_sequences(&mut t).unwrap();
        assert_eq!(t.max_len, 4);
        assert!(!found.is_empty());
        for (key, seq) in &found {
            assert_eq!(seq.len(), 4);
            // the head gives up at most one piece
            assert!(key.cells()[0][0] >= 13);
        }
    }

    #[test]
    fn test_bear_off_completions() {
        let rows = [
            [0; 12],
            [-15, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 0],
        ];
        let mut t = turn(rows, Player::White, 6, 2);
        let found = legal_sequences(&mut t).unwrap();
        assert_eq!(t.max_len, 2);
        assert_eq!(found.len(), 2);
        assert!(found.contains_key(&BoardKey::from([
            [0; 12],
            [-15, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ])));
    }
}
