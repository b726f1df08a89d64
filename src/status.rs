//! Rule verdicts and engine errors.
//!
//! Every legality check answers with a [`Legality`]: `Ok(())` when the move is
//! allowed, or the [`Rejection`] naming the first rule it broke. Rejections are
//! ordinary answers to player input and never abort anything.
//!
//! [`EngineError`] is what the session layer returns. It carries rejections
//! through unchanged and adds the few conditions that mean the engine itself
//! reached an inconsistent state; those are reported by [`EngineError::is_fatal`].

use thiserror::Error;

use crate::board::{BoardKey, Coord, Player};
use crate::dice::Die;

/// Why a move, start or compound move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Rejection {
    /// Off the board, or a row change the player may not make.
    #[error("point is off the board for this player")]
    OutOfBounds,
    /// Nothing of the mover's on the start point.
    #[error("start point is empty or held by the opponent")]
    StartEmptyOrEnemy,
    /// Destination is held by the opponent.
    #[error("destination is held by the opponent")]
    DestEnemy,
    /// Destination is not ahead of the start (includes reselecting the start).
    #[error("move does not go forward")]
    BackwardsMove,
    /// No combination of the dice covers the distance.
    #[error("no combination of the dice reaches that point")]
    NoPath,
    /// The die has no uses left.
    #[error("die already used")]
    DiceUsedAlready,
    /// The head already gave up a piece this turn.
    #[error("head already played this turn")]
    HeadPlayedAlready,
    /// The move leaves a six-point blockade the remaining dice cannot break.
    #[error("move leaves an unbreakable six-point blockade")]
    BadBlock,
    /// The move is fine on its own but strands the other die.
    #[error("move would leave the other die unplayable")]
    PreventsCompletion,
    /// Refused by an active rule exception.
    #[error("move not allowed in the current situation")]
    MiscFailure,
}

impl Rejection {
    /// Stable upper-case name used by the text protocol.
    pub const fn code(self) -> &'static str {
        match self {
            Rejection::OutOfBounds => "OUT_OF_BOUNDS",
            Rejection::StartEmptyOrEnemy => "START_EMPTY_OR_ENEMY",
            Rejection::DestEnemy => "DEST_ENEMY",
            Rejection::BackwardsMove => "BACKWARDS_MOVE",
            Rejection::NoPath => "NO_PATH",
            Rejection::DiceUsedAlready => "DICE_USED_ALREADY",
            Rejection::HeadPlayedAlready => "HEAD_PLAYED_ALREADY",
            Rejection::BadBlock => "BAD_BLOCK",
            Rejection::PreventsCompletion => "PREVENTS_COMPLETION",
            Rejection::MiscFailure => "MISC_FAILURE",
        }
    }
}

/// Result of a legality check.
pub type Legality = Result<(), Rejection>;

/// State of the turn after a roll or a committed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// More moves are still available.
    Success,
    /// The turn has nothing left to play.
    NoLegalMovesLeft,
}

impl Outcome {
    pub const fn code(self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::NoLegalMovesLeft => "NO_LEGAL_MOVES_LEFT",
        }
    }
}

/// Errors returned by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("die value {0} is outside 1..=6")]
    DieOutOfRange(u8),

    #[error("{player} has {count} pieces, at most {max} allowed")]
    TooManyPieces { player: Player, count: u32, max: u8 },

    #[error("no legal completion ends on board {0}")]
    UnknownCompletion(BoardKey),

    #[error("cannot parse board key: {0}")]
    BadKey(String),

    #[error("no finished turn to undo")]
    NothingToUndo,

    #[error("cannot undo while the current turn is in progress")]
    TurnInProgress,

    /// A recorded completion no longer replays. The search and the arbiter disagree.
    #[error("autoplay step {from} by the {die} die was rejected: {reason}")]
    AutoplayDiverged {
        from: Coord,
        die: Die,
        reason: Rejection,
    },

    /// The opening double did not end in the shape the rule prescribes.
    #[error("opening double {value} left {found} pieces on {point}, expected 2")]
    OpeningShape { value: u8, point: Coord, found: i8 },
}

impl EngineError {
    /// True for internal contract violations, false for ordinary refusals.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::AutoplayDiverged { .. } | EngineError::OpeningShape { .. }
        )
    }

    /// The rule rejection, if this error is one.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            EngineError::Rejected(r) => Some(*r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_converts_into_engine_error() {
        let err: EngineError = Rejection::BadBlock.into();
        assert_eq!(err.rejection(), Some(Rejection::BadBlock));
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), Rejection::BadBlock.to_string());
    }

    #[test]
    fn test_fatal_errors() {
        let diverged = EngineError::AutoplayDiverged {
            from: Coord::new(0, 0),
            die: Die::First,
            reason: Rejection::DestEnemy,
        };
        assert!(diverged.is_fatal());
        assert_eq!(diverged.rejection(), None);

        let shape = EngineError::OpeningShape {
            value: 6,
            point: Coord::new(0, 6),
            found: 1,
        };
        assert!(shape.is_fatal());
        assert!(!EngineError::NothingToUndo.is_fatal());
    }

    #[test]
    fn test_codes() {
        assert_eq!(Rejection::PreventsCompletion.code(), "PREVENTS_COMPLETION");
        assert_eq!(Outcome::NoLegalMovesLeft.code(), "NO_LEGAL_MOVES_LEFT");
    }
}
