//! The two dice and the pool of uses they share.
//!
//! A normal roll gives each die one use. Doubles give four uses in total, drawn
//! by either die index, so `used[i] <= 1 + doubles * (3 - used[other])`.

use std::fmt;

use crate::constants::{DIE_FACES, DOUBLES_USES};
use crate::status::EngineError;

/// Which of the two dice a step consumes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Die {
    First,
    Second,
}

impl Die {
    pub const BOTH: [Die; 2] = [Die::First, Die::Second];

    pub const fn index(self) -> usize {
        match self {
            Die::First => 0,
            Die::Second => 1,
        }
    }

    pub const fn other(self) -> Die {
        match self {
            Die::First => Die::Second,
            Die::Second => Die::First,
        }
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Die::First => write!(f, "first"),
            Die::Second => write!(f, "second"),
        }
    }
}

/// Values rolled this turn and how often each has been used.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dice {
    values: [u8; 2],
    used: [u8; 2],
}

impl Dice {
    /// Dice showing `a` and `b`, nothing used yet.
    pub fn new(a: u8, b: u8) -> Result<Self, EngineError> {
        let mut dice = Dice::default();
        dice.set(a, b)?;
        Ok(dice)
    }

    /// Replace the face values, keeping the usage counters.
    pub fn set(&mut self, a: u8, b: u8) -> Result<(), EngineError> {
        for v in [a, b] {
            if !(1..=DIE_FACES).contains(&v) {
                return Err(EngineError::DieOutOfRange(v));
            }
        }
        self.values = [a, b];
        Ok(())
    }

    /// Draw two fresh faces.
    pub fn roll(rng: &mut fastrand::Rng) -> [u8; 2] {
        [rng.u8(1..=DIE_FACES), rng.u8(1..=DIE_FACES)]
    }

    pub fn value(&self, die: Die) -> u8 {
        self.values[die.index()]
    }

    /// Face value as a signed step count.
    pub fn steps(&self, die: Die) -> i32 {
        i32::from(self.values[die.index()])
    }

    pub fn values(&self) -> [u8; 2] {
        self.values
    }

    pub fn used(&self, die: Die) -> u8 {
        self.used[die.index()]
    }

    pub fn used_counts(&self) -> [u8; 2] {
        self.used
    }

    pub fn total_used(&self) -> u8 {
        self.used[0] + self.used[1]
    }

    pub fn doubles(&self) -> bool {
        self.values[0] == self.values[1]
    }

    /// Uses a full turn grants: four on doubles, two otherwise.
    pub fn total_uses(&self) -> u8 {
        if self.doubles() { DOUBLES_USES } else { 2 }
    }

    /// The die tried first by the search; ties go to the first die.
    pub fn larger(&self) -> Die {
        if self.values[1] > self.values[0] {
            Die::Second
        } else {
            Die::First
        }
    }

    pub fn can_use(&self, die: Die) -> bool {
        self.can_use_n(die, 1)
    }

    /// Whether `die` still has `n` uses in the shared pool.
    pub fn can_use_n(&self, die: Die, n: u8) -> bool {
        let used = i32::from(self.used[die.index()]) + i32::from(n);
        let other = i32::from(self.used[die.other().index()]);
        let bonus = if self.doubles() {
            i32::from(DOUBLES_USES) - 1 - other
        } else {
            0
        };
        used <= 1 + bonus
    }

    pub(crate) fn consume(&mut self, die: Die, n: u8) {
        self.used[die.index()] += n;
    }

    pub(crate) fn release(&mut self, die: Die, n: u8) {
        self.used[die.index()] -= n;
    }

    pub(crate) fn reset_usage(&mut self) {
        self.used = [0; 2];
    }

    /// Whether anything has been played on this roll.
    pub fn in_progress(&self) -> bool {
        self.total_used() > 0
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} (used {}/{})",
            self.values[0], self.values[1], self.used[0], self.used[1]
        )
    }
}
