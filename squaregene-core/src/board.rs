//! Board geometry: sides and squares of the 8x8 board

use serde::{Deserialize, Serialize};
use std::fmt;

/// Files and ranks per side of the board
pub const BOARD_SIZE: u8 = 8;

/// Number of squares on the board
pub const NUM_SQUARES: usize = 64;

/// Player side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("white"),
            Side::Black => f.write_str("black"),
        }
    }
}

/// A board square.
///
/// `file` is 0-based (a = 0 .. h = 7), `rank` is 1-based (1 ..= 8), so the
/// gene index `file * 8 + rank - 1` spans 0..64.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Build a square, `None` when off the board
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < BOARD_SIZE && rank >= 1 && rank <= BOARD_SIZE {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    pub const fn file(self) -> u8 {
        self.file
    }

    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// Gene index of this square
    pub const fn index(self) -> usize {
        self.file as usize * BOARD_SIZE as usize + self.rank as usize - 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index >= NUM_SQUARES {
            return None;
        }
        Self::new((index / 8) as u8, (index % 8) as u8 + 1)
    }

    /// All squares in gene-index order
    pub fn all() -> impl Iterator<Item = Square> {
        (0..NUM_SQUARES).filter_map(Square::from_index)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank)
    }
}
