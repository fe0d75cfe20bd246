use super::{legal_placements, DominoPlayer};
use crate::errors::EngineResult;
use crate::state::{GameSnapshot, Move};
use crate::tile::PlacedTile;

/// Always sheds the heaviest legal tile, no memory between turns.
#[derive(Debug, Default, Clone)]
pub struct GreedyPlayer;

impl GreedyPlayer {
    pub fn new() -> Self {
        GreedyPlayer
    }
}

impl DominoPlayer for GreedyPlayer {
    fn name(&self) -> &str {
        "greedy"
    }

    fn decide(&mut self, snapshot: &GameSnapshot) -> EngineResult<Move> {
        let best = legal_placements(snapshot)
            .into_iter()
            .fold(None::<PlacedTile>, |best, placed| match best {
                Some(b) if b.sum() >= placed.sum() => Some(b),
                _ => Some(placed),
            });
        Ok(match best {
            Some(placed) => Move::place(snapshot.seat, placed),
            None => Move::pass(snapshot.seat),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Edge, Seat};
    use crate::state::Play;
    use crate::tile::Tile;

    #[test]
    fn test_greedy_opens_heaviest_and_passes_when_stuck() {
        let seat = Seat::new(1).unwrap();
        let hand = vec![Tile::new(1, 2), Tile::new(6, 4), Tile::new(0, 0)];
        let snapshot = GameSnapshot::from_plays(seat, hand, Vec::new()).unwrap();
        let mv = GreedyPlayer::new().decide(&snapshot).unwrap();
        assert_eq!(mv.tile(), Some(Tile::new(6, 4)));

        let mut after = snapshot.with_move(&mv);
        after.hand = vec![Tile::new(1, 2)];
        assert!(GreedyPlayer::new().decide(&after).unwrap().is_pass());
        assert_eq!(after.table.exposed(Edge::Right), Some(4));
    }

    #[test]
    fn test_greedy_keeps_first_of_equal_weights() {
        let seat = Seat::new(2).unwrap();
        let plays = vec![Play::new(Seat::new(1).unwrap(), PlacedTile::opening(Tile::new(3, 3), Edge::Left))];
        let snapshot = GameSnapshot::from_plays(seat, vec![Tile::new(3, 1), Tile::new(2, 3)], plays).unwrap();
        // 2-3 fits both edges at the same weight; the left one comes first.
        let mv = GreedyPlayer::new().decide(&snapshot).unwrap();
        assert_eq!(mv.tile(), Some(Tile::new(3, 2)));
        assert_eq!(mv.placed.map(|p| p.edge), Some(Edge::Left));
    }
}
