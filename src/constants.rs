//! Board geometry, piece counts and rule thresholds for Nardi.
//!
//! Every point on the board is addressed as `(row, col)`. Both players walk the
//! columns in increasing order; White starts on row 0 and finishes on row 1,
//! Black the other way round.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of rows on the board.
pub const ROWS: usize = 2;

/// Number of points in each row.
pub const COLS: usize = 12;

/// Total number of points a piece can visit.
pub const POINTS: usize = ROWS * COLS;

/// First column of a row's home stretch (the last six points).
pub const HOME_START: i32 = 6;

/// Number of points in a home stretch.
pub const HOME_LEN: i32 = 6;

// =============================================================================
// Pieces
// =============================================================================

/// Pieces each player starts with, all stacked on the head.
pub const PIECES_PER_PLAYER: u8 = 15;

// =============================================================================
// Dice
// =============================================================================

/// Highest face of a die.
pub const DIE_FACES: u8 = 6;

/// Die uses granted by a doubles roll, shared between both dice.
pub const DOUBLES_USES: u8 = 4;

// =============================================================================
// Special Rules
// =============================================================================

/// Consecutive friendly points that form a blockade.
pub const BLOCKADE_LEN: i32 = 6;

/// On the opening double the head may be played while it holds more than this.
pub const OPENING_HEAD_FLOOR: u8 = PIECES_PER_PLAYER - 2;

/// Column the opening double 4 passes through on its way to [`OPENING_TARGET_COL`].
pub const OPENING_PIVOT_COL: i32 = 4;

/// Column the opening double 4 stacks its two pieces on.
pub const OPENING_TARGET_COL: i32 = 8;

/// Pieces the opening double must leave on its target point.
pub const OPENING_STACK: u8 = 2;
