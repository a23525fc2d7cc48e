//! Table seats and their tie-break priority.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the four wind seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    East,
    South,
    West,
    North,
}

/// Seat order used only when raw scores are equal: East wins ties over
/// South, South over West, West over North.
///
/// Declared independently of [`Seat::code`], which follows the storage
/// numbering and is not a priority.
pub const TIEBREAK_ORDER: [Seat; 4] = [Seat::East, Seat::South, Seat::West, Seat::North];

/// Stored seat code outside `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid seat code {0}")]
pub struct InvalidSeatCode(pub i64);

impl Seat {
    pub const ALL: [Seat; 4] = TIEBREAK_ORDER;

    /// Numeric code persisted in `match_detail.seat`.
    pub fn code(self) -> i64 {
        match self {
            Seat::East => 0,
            Seat::West => 1,
            Seat::South => 2,
            Seat::North => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, InvalidSeatCode> {
        match code {
            0 => Ok(Seat::East),
            1 => Ok(Seat::West),
            2 => Ok(Seat::South),
            3 => Ok(Seat::North),
            other => Err(InvalidSeatCode(other)),
        }
    }

    /// Position in [`TIEBREAK_ORDER`]; lower wins a tie.
    pub fn tiebreak_priority(self) -> usize {
        TIEBREAK_ORDER
            .iter()
            .position(|&s| s == self)
            .unwrap_or(TIEBREAK_ORDER.len())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Seat::East => "east",
            Seat::South => "south",
            Seat::West => "west",
            Seat::North => "north",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Seat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "east" | "e" => Ok(Seat::East),
            "south" | "s" => Ok(Seat::South),
            "west" | "w" => Ok(Seat::West),
            "north" | "n" => Ok(Seat::North),
            _ => Err(s.to_string()),
        }
    }
}
