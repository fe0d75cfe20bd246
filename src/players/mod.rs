// Players module - everything that can sit at a seat
//
// The engine session and the baseline players share one trait so the
// simulator can seat any mix of them.

use crate::enums::Edge;
use crate::errors::EngineResult;
use crate::state::{GameSnapshot, Move};
use crate::tile::PlacedTile;

pub mod greedy;
pub mod random;

pub use self::greedy::GreedyPlayer;
pub use self::random::RandomPlayer;

pub trait DominoPlayer: Send {
    /// Short label for logs and reports
    fn name(&self) -> &str;

    /// Chooses the move for `snapshot.seat`
    fn decide(&mut self, snapshot: &GameSnapshot) -> EngineResult<Move>;
}

/// Every legal placement for the acting hand. On an empty table each tile
/// opens once, on the left.
pub fn legal_placements(snapshot: &GameSnapshot) -> Vec<PlacedTile> {
    if snapshot.table.is_empty() {
        return snapshot
            .hand
            .iter()
            .map(|tile| PlacedTile::opening(*tile, Edge::Left))
            .collect();
    }
    let mut placements = Vec::new();
    for edge in [Edge::Left, Edge::Right] {
        for tile in &snapshot.hand {
            if let Some(placed) = snapshot.table.glue(edge, *tile) {
                placements.push(placed);
            }
        }
    }
    placements
}
