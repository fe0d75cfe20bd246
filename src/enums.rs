use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::EngineError;

pub const NUM_SEATS: usize = 4;
pub const NUM_PIPS: usize = 7;
pub const MAX_PIP: u8 = 6;
pub const NUM_TILES: usize = 28;
pub const HAND_SIZE: usize = 7;

/// One of the four fixed positions around the table, numbered 1..=4.
/// Partners sit two positions apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Seat(u8);

pub const SEATS: [Seat; 4] = [Seat(1), Seat(2), Seat(3), Seat(4)];

impl Seat {
    pub fn new(value: u8) -> Option<Seat> {
        if (1..=NUM_SEATS as u8).contains(&value) {
            Some(Seat(value))
        } else {
            None
        }
    }

    /// Zero-based index, for per-seat arrays.
    #[inline]
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Seat {
        Seat((index % NUM_SEATS) as u8 + 1)
    }

    #[inline]
    pub fn number(self) -> u8 {
        self.0
    }

    /// The seat `n` positions ahead in turn order.
    #[inline]
    pub fn add(self, n: usize) -> Seat {
        Seat::from_index(self.index() + n)
    }

    #[inline]
    pub fn next(self) -> Seat {
        self.add(1)
    }

    #[inline]
    pub fn partner(self) -> Seat {
        self.add(2)
    }

    pub fn is_partner_of(self, other: Seat) -> bool {
        self == other || self.partner() == other
    }

    /// The two seats of the opposing partnership.
    pub fn opponents(self) -> [Seat; 2] {
        [self.add(1), self.add(3)]
    }
}

impl TryFrom<u8> for Seat {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Seat::new(value).ok_or(EngineError::InvalidSeat { value })
    }
}

impl From<Seat> for u8 {
    fn from(seat: Seat) -> u8 {
        seat.0
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Open end of the line of played tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
}

pub const EDGES: [Edge; 2] = [Edge::Left, Edge::Right];

impl Edge {
    pub fn opposite(self) -> Edge {
        match self {
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_rotation_wraps() {
        let four = Seat::new(4).unwrap();
        assert_eq!(four.next(), Seat::new(1).unwrap());
        assert_eq!(four.partner(), Seat::new(2).unwrap());
        assert_eq!(Seat::new(1).unwrap().add(7), four);
    }

    #[test]
    fn test_seat_bounds() {
        assert!(Seat::new(0).is_none());
        assert!(Seat::new(5).is_none());
        assert_eq!(
            Seat::try_from(9),
            Err(EngineError::InvalidSeat { value: 9 })
        );
    }

    #[test]
    fn test_opponents_exclude_partnership() {
        let two = Seat::new(2).unwrap();
        for opponent in two.opponents() {
            assert!(!two.is_partner_of(opponent));
        }
        assert!(two.is_partner_of(two.partner()));
    }
}
