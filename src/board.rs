//! Board state and the coordinate arithmetic every legality check relies on.
//!
//! The board is a 2x12 grid of signed counts: positive for White, negative for
//! Black. Both players walk the columns in increasing order. White's head is
//! `(0, 0)` and it crosses into row 1; Black's head is `(1, 0)` and it crosses
//! into row 0. A player's home is the last six columns of the opponent's row.

use std::fmt;
use std::str::FromStr;

use crate::constants::{COLS, HOME_LEN, HOME_START, PIECES_PER_PLAYER, POINTS, ROWS};
use crate::status::{EngineError, Legality, Rejection};

const WIDTH: i32 = COLS as i32;

/// One of the two sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::White, Player::Black];

    pub const fn index(self) -> usize {
        match self {
            Player::White => 0,
            Player::Black => 1,
        }
    }

    /// Row holding this player's head.
    pub const fn row(self) -> i32 {
        self.index() as i32
    }

    /// Sign of this player's counts on the board.
    pub const fn sign(self) -> i8 {
        match self {
            Player::White => 1,
            Player::Black => -1,
        }
    }

    pub const fn other(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    pub const fn head(self) -> Coord {
        Coord::new(self.row(), 0)
    }

    /// A player may only ever cross into the row that is not its head row.
    pub const fn may_enter_row(self, row: i32) -> bool {
        row != self.row()
    }

    /// Every point in the order this player travels them, head first.
    pub fn path(self) -> impl Iterator<Item = Coord> {
        let head = self.head();
        (0..POINTS as i32).map(move |d| head.advance(d, self))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => write!(f, "white"),
            Player::Black => write!(f, "black"),
        }
    }
}

/// A point on the board. Arithmetic may produce coordinates outside the board,
/// so callers check [`Coord::in_bounds`] before reading through one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub const fn in_bounds(self) -> bool {
        self.row >= 0 && self.row < ROWS as i32 && self.col >= 0 && self.col < WIDTH
    }

    pub const fn out_of_bounds(self) -> bool {
        !self.in_bounds()
    }

    /// The point `d` steps along `player`'s path (negative `d` walks back).
    ///
    /// Leaving the row is only possible in the player's crossing direction;
    /// any other overflow returns the raw out-of-bounds column on the same row.
    pub fn advance(self, d: i32, player: Player) -> Coord {
        let col = self.col + d;
        if (0..WIDTH).contains(&col) {
            return Coord::new(self.row, col);
        }

        let other_row = 1 - self.row;
        let may_cross = if d > 0 {
            player.may_enter_row(other_row)
        } else {
            player.may_enter_row(self.row)
        };
        if !may_cross {
            return Coord::new(self.row, col);
        }

        let col = if col < 0 { col + WIDTH } else { col - WIDTH };
        Coord::new(other_row, col)
    }

    /// Signed number of steps from `self` to `end` along `player`'s path.
    /// Assumes any row change between the two is a crossing the player can make.
    pub fn distance_to(self, end: Coord, player: Player) -> i32 {
        if self.row == end.row {
            end.col - self.col
        } else if end.row != player.row() {
            WIDTH - self.col + end.col
        } else {
            -(WIDTH - end.col + self.col)
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Raw grid of signed counts.
pub type Cells = [[i8; COLS]; ROWS];

/// The playing surface plus the aggregates the rules read on every query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: Cells,
    player: Player,
    head_used: bool,
    pieces_left: [u8; 2],
    reached_enemy_home: [u8; 2],
    /// Pieces each side had when the position was set up; gates the endgame.
    pieces_per_player: [u8; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Starting layout: fifteen pieces on each head, White to move.
    pub fn new() -> Self {
        let mut cells = [[0; COLS]; ROWS];
        cells[0][0] = PIECES_PER_PLAYER as i8;
        cells[1][0] = -(PIECES_PER_PLAYER as i8);
        Self {
            cells,
            player: Player::White,
            head_used: false,
            pieces_left: [PIECES_PER_PLAYER; 2],
            reached_enemy_home: [0; 2],
            pieces_per_player: [PIECES_PER_PLAYER; 2],
        }
    }

    /// Load an arbitrary position with `player` to move.
    ///
    /// Piece totals, home entries and the endgame threshold are recomputed
    /// from the grid. A side with more than fifteen pieces is rejected.
    pub fn from_rows(cells: Cells, player: Player) -> Result<Self, EngineError> {
        let mut count = [0u32; 2];
        for row in &cells {
            for &n in row {
                let owner = if n < 0 { Player::Black } else { Player::White };
                count[owner.index()] += u32::from(n.unsigned_abs());
            }
        }
        for p in Player::BOTH {
            if count[p.index()] > u32::from(PIECES_PER_PLAYER) {
                return Err(EngineError::TooManyPieces {
                    player: p,
                    count: count[p.index()],
                    max: PIECES_PER_PLAYER,
                });
            }
        }

        let mut board = Self {
            cells,
            player,
            head_used: false,
            pieces_left: [0; 2],
            reached_enemy_home: [0; 2],
            pieces_per_player: [0; 2],
        };
        board.recount();
        board.pieces_per_player = board.pieces_left;
        Ok(board)
    }

    fn recount(&mut self) {
        self.pieces_left = [0; 2];
        self.reached_enemy_home = [0; 2];
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, &n) in cells.iter().enumerate() {
                if n == 0 {
                    continue;
                }
                let owner = if n < 0 { Player::Black } else { Player::White };
                let n = n.unsigned_abs();
                self.pieces_left[owner.index()] += n;
                if row as i32 != owner.row() && col as i32 >= HOME_START {
                    self.reached_enemy_home[owner.index()] += n;
                }
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    /// Signed count at `c`; off-board points read as empty.
    pub fn at(&self, c: Coord) -> i8 {
        if c.in_bounds() {
            self.cells[c.row as usize][c.col as usize]
        } else {
            0
        }
    }

    fn cell_mut(&mut self, c: Coord) -> &mut i8 {
        debug_assert!(c.in_bounds(), "mutating off-board point {c}");
        &mut self.cells[c.row as usize][c.col as usize]
    }

    /// Side to move.
    pub fn player(&self) -> Player {
        self.player
    }

    pub fn sign(&self) -> i8 {
        self.player.sign()
    }

    pub fn head(&self) -> Coord {
        self.player.head()
    }

    pub fn is_head(&self, c: Coord) -> bool {
        c == self.player.head()
    }

    pub fn head_used(&self) -> bool {
        self.head_used
    }

    pub(crate) fn set_head_used(&mut self, used: bool) {
        self.head_used = used;
    }

    pub fn pieces_left(&self, p: Player) -> u8 {
        self.pieces_left[p.index()]
    }

    pub fn reached_enemy_home(&self, p: Player) -> u8 {
        self.reached_enemy_home[p.index()]
    }

    pub fn pieces_per_player(&self, p: Player) -> u8 {
        self.pieces_per_player[p.index()]
    }

    /// Mover's pieces still on the board, summed over every point it owns.
    pub fn pieces_on_board(&self, p: Player) -> u32 {
        self.cells
            .iter()
            .flatten()
            .filter(|&&n| n * p.sign() > 0)
            .map(|&n| u32::from(n.unsigned_abs()))
            .sum()
    }

    /// Whether the side to move may bear off.
    pub fn in_endgame(&self) -> bool {
        self.reached_enemy_home[self.player.index()] >= self.pieces_per_player[self.player.index()]
    }

    /// Canonical key for this arrangement of pieces.
    pub fn key(&self) -> BoardKey {
        BoardKey(self.cells)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    pub fn switch_player(&mut self) {
        self.player = self.player.other();
        self.head_used = false;
    }

    /// Move one of the mover's pieces. Callers check legality first.
    pub fn move_piece(&mut self, start: Coord, end: Coord) {
        let sign = self.sign();
        *self.cell_mut(start) -= sign;
        *self.cell_mut(end) += sign;

        if self.enters_enemy_home(start, end) {
            self.reached_enemy_home[self.player.index()] += 1;
        }
        if self.is_head(start) {
            self.head_used = true;
        }
    }

    /// Exact inverse of [`Board::move_piece`] when the head was unused before it.
    pub fn undo_move(&mut self, start: Coord, end: Coord) {
        let sign = self.sign();
        *self.cell_mut(start) += sign;
        *self.cell_mut(end) -= sign;

        if self.enters_enemy_home(start, end) {
            self.reached_enemy_home[self.player.index()] -= 1;
        }
        if self.is_head(start) {
            self.head_used = false;
        }
    }

    /// Bear one of the mover's pieces off.
    pub fn remove(&mut self, at: Coord) {
        *self.cell_mut(at) -= self.sign();
        self.pieces_left[self.player.index()] -= 1;
    }

    pub fn undo_remove(&mut self, at: Coord) {
        *self.cell_mut(at) += self.sign();
        self.pieces_left[self.player.index()] += 1;
    }

    fn enters_enemy_home(&self, start: Coord, end: Coord) -> bool {
        end.row != self.player.row()
            && end.col >= HOME_START
            && (start.col < HOME_START || start.row != end.row)
    }

    // =========================================================================
    // Legality primitives
    // =========================================================================

    /// Whether the mover may pick up a piece from `start`.
    pub fn valid_start(&self, start: Coord) -> Legality {
        if start.out_of_bounds() {
            Err(Rejection::OutOfBounds)
        } else if self.sign() * self.at(start) <= 0 {
            Err(Rejection::StartEmptyOrEnemy)
        } else if self.is_head(start) && self.head_used {
            Err(Rejection::HeadPlayedAlready)
        } else {
            Ok(())
        }
    }

    pub fn well_defined_end(&self, start: Coord, end: Coord) -> Legality {
        self.well_defined_end_for(start, end, self.player)
    }

    /// Whether `start -> end` is a forward move onto a point `player` may land on.
    ///
    /// Same-row moves skip the row-crossing check: no boundary is crossed.
    pub fn well_defined_end_for(&self, start: Coord, end: Coord, player: Player) -> Legality {
        if end.out_of_bounds() {
            Err(Rejection::OutOfBounds)
        } else if player.sign() * self.at(end) < 0 {
            Err(Rejection::DestEnemy)
        } else if start.row == end.row {
            if start.col >= end.col {
                Err(Rejection::BackwardsMove)
            } else {
                Ok(())
            }
        } else if !player.may_enter_row(end.row) {
            Err(Rejection::OutOfBounds)
        } else {
            Ok(())
        }
    }

    pub fn coord_after(&self, start: Coord, d: i32) -> Coord {
        start.advance(d, self.player)
    }

    pub fn distance(&self, start: Coord, end: Coord) -> i32 {
        start.distance_to(end, self.player)
    }

    /// Pieces the mover could lift from `c` this turn; the head only ever gives one.
    pub fn movable_pieces(&self, c: Coord) -> u8 {
        let n = self.at(c);
        if n * self.sign() <= 0 {
            0
        } else if self.is_head(c) {
            1
        } else {
            n.unsigned_abs()
        }
    }

    /// Steps-from-the-end of the mover's farthest occupied home point, 0 if none.
    ///
    /// The bear-off overage rule compares against this: a die larger than every
    /// remaining distance may remove from the farthest point.
    pub fn max_num_occ(&self) -> i32 {
        let home_row = self.player.other().row();
        let mut n = HOME_LEN;
        while n > 0 && self.sign() * self.at(Coord::new(home_row, WIDTH - n)) <= 0 {
            n -= 1;
        }
        n
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..COLS {
            write!(f, "{col:>4}")?;
        }
        writeln!(f)?;
        for (row, cells) in self.cells.iter().enumerate() {
            write!(f, "{row:>2} ")?;
            for &n in cells {
                if n == 0 {
                    write!(f, "{:>4}", '.')?;
                } else {
                    write!(f, "{n:>4}")?;
                }
            }
            writeln!(f)?;
        }
        write!(
            f,
            "to move: {}  off: {}/{}",
            self.player,
            self.pieces_per_player[0] - self.pieces_left[0],
            self.pieces_per_player[1] - self.pieces_left[1],
        )
    }
}

/// A resulting board, used to deduplicate search branches and to name a
/// completion for autoplay.
///
/// Written as twelve comma-separated counts per row, rows joined by `/`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardKey(Cells);

impl BoardKey {
    pub fn cells(&self) -> &Cells {
        &self.0
    }
}

impl From<Cells> for BoardKey {
    fn from(cells: Cells) -> Self {
        BoardKey(cells)
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.0.iter().enumerate() {
            if r > 0 {
                write!(f, "/")?;
            }
            for (c, n) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{n}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for BoardKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.trim().split('/').collect();
        if rows.len() != ROWS {
            return Err(EngineError::BadKey(format!(
                "expected {ROWS} rows, found {}",
                rows.len()
            )));
        }

        let mut cells = [[0i8; COLS]; ROWS];
        for (r, row) in rows.iter().enumerate() {
            let values: Vec<&str> = row.split(',').map(str::trim).collect();
            if values.len() != COLS {
                return Err(EngineError::BadKey(format!(
                    "row {r} has {} points, expected {COLS}",
                    values.len()
                )));
            }
            for (c, v) in values.iter().enumerate() {
                cells[r][c] = v
                    .parse()
                    .map_err(|_| EngineError::BadKey(format!("bad count {v:?} at ({r}, {c})")))?;
            }
        }
        Ok(BoardKey(cells))
    }
}
