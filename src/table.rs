use std::collections::VecDeque;

use crate::enums::{Edge, NUM_PIPS};
use crate::errors::{EngineError, EngineResult};
use crate::state::Play;
use crate::tile::{PlacedTile, Tile, TileSet};

/// Symmetric pip-pair index of the tiles on the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipMatrix {
    cells: [[bool; NUM_PIPS]; NUM_PIPS],
}

impl PipMatrix {
    pub fn add(&mut self, tile: Tile) {
        let (a, b) = tile.pips();
        self.cells[a as usize][b as usize] = true;
        self.cells[b as usize][a as usize] = true;
    }

    #[inline]
    pub fn contains(&self, a: u8, b: u8) -> bool {
        self.cells[a as usize][b as usize]
    }

    /// Number of played tiles carrying `pip`; the double counts once.
    pub fn count_containing(&self, pip: u8) -> usize {
        self.cells[pip as usize].iter().filter(|present| **present).count()
    }
}

/// The line of played tiles, left edge to right edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    line: VecDeque<PlacedTile>,
    adjacency: PipMatrix,
    played: TileSet,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the line by replaying `plays` in order. A play that does not
    /// glue on its edge is malformed history.
    pub fn from_plays(plays: &[Play]) -> EngineResult<Table> {
        let mut table = Table::new();
        for play in plays {
            let tile = play.placed.tile();
            let placed = if table.is_empty() {
                play.placed
            } else {
                table
                    .glue(play.placed.edge, tile)
                    .ok_or_else(|| EngineError::illegal_play(play.seat, tile, play.placed.edge))?
            };
            table.place(placed);
        }
        Ok(table)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.line.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &PlacedTile> {
        self.line.iter()
    }

    #[inline]
    pub fn adjacency(&self) -> &PipMatrix {
        &self.adjacency
    }

    #[inline]
    pub fn played(&self) -> TileSet {
        self.played
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.played.contains(tile)
    }

    pub fn count_containing(&self, pip: u8) -> usize {
        self.adjacency.count_containing(pip)
    }

    /// The outermost tile on `edge`, read as bound to that edge.
    pub fn end(&self, edge: Edge) -> Option<PlacedTile> {
        let tile = match edge {
            Edge::Left => self.line.front(),
            Edge::Right => self.line.back(),
        };
        tile.map(|t| t.facing(edge))
    }

    /// The pip currently facing outward on `edge`.
    pub fn exposed(&self, edge: Edge) -> Option<u8> {
        self.end(edge).map(PlacedTile::exposed)
    }

    /// Legality check for placing `tile` on `edge`. Any tile opens an empty table.
    pub fn glue(&self, edge: Edge, tile: Tile) -> Option<PlacedTile> {
        match self.end(edge) {
            Some(end) => end.glue(tile),
            None => Some(PlacedTile::opening(tile, edge)),
        }
    }

    /// Appends an already-oriented tile on its edge and updates the index.
    pub fn place(&mut self, placed: PlacedTile) {
        match placed.edge {
            Edge::Left => self.line.push_front(placed),
            Edge::Right => self.line.push_back(placed),
        }
        self.adjacency.add(placed.tile());
        self.played.insert(placed.tile());
    }

    /// The table as it would be after `placed`.
    pub fn with_placed(&self, placed: PlacedTile) -> Table {
        let mut next = self.clone();
        next.place(placed);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Seat, MAX_PIP};

    fn play(seat: u8, a: u8, b: u8, edge: Edge) -> Play {
        Play::new(
            Seat::new(seat).unwrap(),
            PlacedTile::opening(Tile::new(a, b), edge),
        )
    }

    #[test]
    fn test_replay_builds_oriented_line() {
        let plays = vec![
            play(1, 6, 6, Edge::Left),
            play(2, 1, 6, Edge::Left),
            play(3, 0, 1, Edge::Left),
            play(4, 6, 2, Edge::Right),
        ];
        let table = Table::from_plays(&plays).unwrap();
        let line: Vec<(u8, u8)> = table.tiles().map(|t| (t.left, t.right)).collect();
        assert_eq!(line, vec![(0, 1), (1, 6), (6, 6), (6, 2)]);
        assert_eq!(table.exposed(Edge::Left), Some(0));
        assert_eq!(table.exposed(Edge::Right), Some(2));
    }

    #[test]
    fn test_replay_rejects_detached_tile() {
        let plays = vec![play(1, 6, 6, Edge::Left), play(2, 1, 2, Edge::Right)];
        assert_eq!(
            Table::from_plays(&plays),
            Err(EngineError::illegal_play(
                Seat::new(2).unwrap(),
                Tile::new(1, 2),
                Edge::Right
            ))
        );
    }

    #[test]
    fn test_adjacency_is_symmetric_closure() {
        let plays = vec![
            play(1, 5, 5, Edge::Left),
            play(2, 5, 3, Edge::Right),
            play(3, 3, 3, Edge::Right),
            play(4, 2, 5, Edge::Left),
            play(1, 3, 0, Edge::Right),
        ];
        let table = Table::from_plays(&plays).unwrap();
        let placed: Vec<Tile> = table.tiles().map(|t| t.tile()).collect();
        for a in 0..=MAX_PIP {
            for b in 0..=MAX_PIP {
                let adjacency = table.adjacency();
                assert_eq!(adjacency.contains(a, b), adjacency.contains(b, a));
                assert_eq!(adjacency.contains(a, b), placed.contains(&Tile::new(a, b)));
            }
        }
        assert_eq!(table.count_containing(5), 3);
        assert_eq!(table.count_containing(3), 3);
        assert_eq!(table.count_containing(4), 0);
    }

    #[test]
    fn test_empty_table_accepts_anything() {
        let table = Table::new();
        let placed = table.glue(Edge::Right, Tile::new(4, 2)).unwrap();
        assert_eq!((placed.left, placed.right), (4, 2));
        assert_eq!(table.exposed(Edge::Left), None);
    }
}
