use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::Seat;
use crate::errors::EngineResult;
use crate::table::Table;
use crate::tile::{PlacedTile, Tile, TileSet};

/// One placement event in the global play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub placed: PlacedTile,
}

impl Play {
    pub fn new(seat: Seat, placed: PlacedTile) -> Self {
        Play { seat, placed }
    }

    /// Same seat, tile and edge, whichever way round the tile was written.
    pub fn same_as(&self, other: &Play) -> bool {
        self.seat == other.seat
            && self.placed.tile() == other.placed.tile()
            && self.placed.edge == other.placed.edge
    }
}

/// The decision returned for a seat: a placement, or a pass when `placed` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub seat: Seat,
    pub placed: Option<PlacedTile>,
}

impl Move {
    pub fn place(seat: Seat, placed: PlacedTile) -> Self {
        Move {
            seat,
            placed: Some(placed),
        }
    }

    pub fn pass(seat: Seat) -> Self {
        Move { seat, placed: None }
    }

    #[inline]
    pub fn is_pass(&self) -> bool {
        self.placed.is_none()
    }

    pub fn tile(&self) -> Option<Tile> {
        self.placed.map(|p| p.tile())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.placed {
            Some(placed) => write!(f, "seat {} plays {}", self.seat, placed),
            None => write!(f, "seat {} passes", self.seat),
        }
    }
}

/// Everything the engine is told for one decision. Built fresh per call and
/// never mutated; hypothetical continuations are new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub seat: Seat,
    pub hand: Vec<Tile>,
    pub table: Table,
    pub plays: Vec<Play>,
}

impl GameSnapshot {
    pub fn new(seat: Seat, hand: Vec<Tile>, table: Table, plays: Vec<Play>) -> Self {
        GameSnapshot {
            seat,
            hand,
            table,
            plays,
        }
    }

    /// Builds the table by replaying the play history.
    pub fn from_plays(seat: Seat, hand: Vec<Tile>, plays: Vec<Play>) -> EngineResult<Self> {
        let table = Table::from_plays(&plays)?;
        Ok(GameSnapshot::new(seat, hand, table, plays))
    }

    pub fn hand_set(&self) -> TileSet {
        TileSet::from_tiles(&self.hand)
    }

    pub fn plays_by(&self, seat: Seat) -> usize {
        self.plays.iter().filter(|p| p.seat == seat).count()
    }

    /// The state right after `mv`, seen from the seat that made it.
    pub fn with_move(&self, mv: &Move) -> GameSnapshot {
        let mut next = self.clone();
        next.seat = mv.seat;
        if let Some(placed) = mv.placed {
            let tile = placed.tile();
            next.hand.retain(|t| *t != tile);
            next.table.place(placed);
            next.plays.push(Play::new(mv.seat, placed));
        }
        next
    }
}
