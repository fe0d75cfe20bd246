// Hand simulation
//
// Deals the 28 tiles, seats four players and runs one hand to the end,
// checking every move against the rules. Used by the `simulate` binary and
// the integration tests.

use rand::prelude::*;
use rand_xorshift::XorShiftRng;

use crate::enums::{Seat, HAND_SIZE, NUM_SEATS, SEATS};
use crate::errors::{EngineError, EngineResult};
use crate::players::{legal_placements, DominoPlayer};
use crate::state::{GameSnapshot, Move, Play};
use crate::table::Table;
use crate::tile::{Tile, TileSet};

/// The double that opens a fresh deal.
pub const OPENING_DOUBLE: Tile = Tile::new(6, 6);

/// How a finished hand ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandResult {
    /// A seat of the winning partnership; the seat that went out when not blocked.
    pub winner: Seat,
    pub blocked: bool,
    pub plays: Vec<Play>,
    pub turns: usize,
}

impl HandResult {
    pub fn team_won(&self, seat: Seat) -> bool {
        self.winner.is_partner_of(seat)
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    hands: [Vec<Tile>; NUM_SEATS],
    table: Table,
    plays: Vec<Play>,
    turn: Seat,
    turns: usize,
    passes_in_row: usize,
    last_placer: Option<Seat>,
}

impl Game {
    /// Shuffles with `seed`; whoever holds 6-6 acts first.
    pub fn deal(seed: u64) -> Game {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let mut tiles: Vec<Tile> = Tile::all().collect();
        tiles.shuffle(&mut rng);

        let mut hands: [Vec<Tile>; NUM_SEATS] = Default::default();
        for (index, chunk) in tiles.chunks(HAND_SIZE).enumerate() {
            hands[index] = chunk.to_vec();
        }
        let first = SEATS
            .into_iter()
            .find(|seat| hands[seat.index()].contains(&OPENING_DOUBLE))
            .unwrap_or(SEATS[0]);
        Game::with_hands(hands, first)
    }

    pub fn with_hands(hands: [Vec<Tile>; NUM_SEATS], first: Seat) -> Game {
        Game {
            hands,
            table: Table::new(),
            plays: Vec::new(),
            turn: first,
            turns: 0,
            passes_in_row: 0,
            last_placer: None,
        }
    }

    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn hand(&self, seat: Seat) -> &[Tile] {
        &self.hands[seat.index()]
    }

    /// What the seat to act is told.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(
            self.turn,
            self.hands[self.turn.index()].clone(),
            self.table.clone(),
            self.plays.clone(),
        )
    }

    /// Applies `mv` after checking it is the mover's turn and a legal move.
    pub fn apply(&mut self, mv: Move) -> EngineResult<()> {
        if mv.seat != self.turn {
            return Err(EngineError::not_your_turn(self.turn, mv.seat));
        }
        let hand = &mut self.hands[mv.seat.index()];

        match mv.placed {
            Some(placed) => {
                let tile = placed.tile();
                let position = hand
                    .iter()
                    .position(|t| *t == tile)
                    .ok_or(EngineError::TileNotInHand { seat: mv.seat, tile })?;
                if self.table.glue(placed.edge, tile) != Some(placed) && !self.table.is_empty() {
                    return Err(EngineError::illegal_play(mv.seat, tile, placed.edge));
                }
                hand.remove(position);
                self.table.place(placed);
                self.plays.push(Play::new(mv.seat, placed));
                self.passes_in_row = 0;
                self.last_placer = Some(mv.seat);
            }
            None => {
                let snapshot = self.snapshot();
                if !legal_placements(&snapshot).is_empty() {
                    return Err(EngineError::IllegalPass { seat: mv.seat });
                }
                self.passes_in_row += 1;
            }
        }

        self.turns += 1;
        self.turn = self.turn.next();
        Ok(())
    }

    /// `Some` once a hand is empty or every seat passed in a row.
    pub fn result(&self) -> Option<HandResult> {
        if let Some(seat) = SEATS
            .into_iter()
            .find(|seat| self.hands[seat.index()].is_empty())
        {
            return Some(self.finish(seat, false));
        }
        if self.passes_in_row < NUM_SEATS {
            return None;
        }

        let weight = |seat: Seat| {
            TileSet::from_tiles(&self.hands[seat.index()]).pip_sum()
                + TileSet::from_tiles(&self.hands[seat.partner().index()]).pip_sum()
        };
        let (odd, even) = (weight(SEATS[0]), weight(SEATS[1]));
        let winner = if odd != even {
            if odd < even {
                SEATS[0]
            } else {
                SEATS[1]
            }
        } else {
            // A tie goes against whoever placed last.
            self.last_placer.map_or(SEATS[0], Seat::next)
        };
        Some(self.finish(winner, true))
    }

    fn finish(&self, winner: Seat, blocked: bool) -> HandResult {
        HandResult {
            winner,
            blocked,
            plays: self.plays.clone(),
            turns: self.turns,
        }
    }

    /// Runs the hand to its end, asking `players[i]` for seat `i + 1`.
    /// Terminates: every turn either places one of the 28 tiles or adds to a
    /// run of passes that ends the hand at four.
    pub fn play_out(&mut self, players: &mut [Box<dyn DominoPlayer>]) -> EngineResult<HandResult> {
        loop {
            if let Some(result) = self.result() {
                log::debug!(
                    "Hand over after {} turns: seat {} partnership wins{}",
                    result.turns,
                    result.winner,
                    if result.blocked { " (blocked)" } else { "" }
                );
                return Ok(result);
            }
            let player = &mut players[self.turn.index()];
            let mv = player.decide(&self.snapshot())?;
            log::trace!("{}: {}", player.name(), mv);
            self.apply(mv)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Edge;
    use crate::players::GreedyPlayer;
    use crate::tile::PlacedTile;

    fn seat(n: u8) -> Seat {
        Seat::new(n).unwrap()
    }

    #[test]
    fn test_deal_splits_the_set() {
        let game = Game::deal(42);
        let mut all = TileSet::EMPTY;
        for s in SEATS {
            assert_eq!(game.hand(s).len(), HAND_SIZE);
            all = all.union(TileSet::from_tiles(game.hand(s)));
        }
        assert_eq!(all, TileSet::FULL);
        assert!(game.hand(game.turn()).contains(&OPENING_DOUBLE));
    }

    #[test]
    fn test_apply_rejects_illegal_moves() {
        let hands = [
            vec![Tile::new(6, 6), Tile::new(1, 2)],
            vec![Tile::new(6, 3)],
            vec![Tile::new(0, 0)],
            vec![Tile::new(5, 5)],
        ];
        let mut game = Game::with_hands(hands, seat(1));
        let wrong = Move::place(seat(2), PlacedTile::opening(Tile::new(6, 3), Edge::Left));
        assert!(matches!(game.apply(wrong), Err(EngineError::NotYourTurn { .. })));

        let missing = Move::place(seat(1), PlacedTile::opening(Tile::new(4, 4), Edge::Left));
        assert!(matches!(game.apply(missing), Err(EngineError::TileNotInHand { .. })));

        game.apply(Move::place(seat(1), PlacedTile::opening(Tile::new(6, 6), Edge::Left)))
            .unwrap();
        assert!(matches!(
            game.apply(Move::pass(seat(2))),
            Err(EngineError::IllegalPass { .. })
        ));
        let misoriented = PlacedTile { left: 6, right: 3, edge: Edge::Left };
        assert!(matches!(
            game.apply(Move::place(seat(2), misoriented)),
            Err(EngineError::IllegalPlay { .. })
        ));
    }

    #[test]
    fn test_going_out_ends_the_hand() {
        let hands = [
            vec![Tile::new(6, 6)],
            vec![Tile::new(6, 3), Tile::new(1, 1)],
            vec![Tile::new(0, 0)],
            vec![Tile::new(5, 5)],
        ];
        let mut game = Game::with_hands(hands, seat(1));
        let mut players: Vec<Box<dyn DominoPlayer>> =
            (0..4).map(|_| Box::new(GreedyPlayer::new()) as Box<dyn DominoPlayer>).collect();
        let result = game.play_out(&mut players).unwrap();
        assert_eq!(result.winner, seat(1));
        assert!(!result.blocked);
        assert!(result.team_won(seat(3)));
        assert_eq!(result.turns, 1);
    }

    #[test]
    fn test_blocked_hand_goes_to_lighter_partnership() {
        let hands = [
            vec![Tile::new(6, 6), Tile::new(0, 0)],
            vec![Tile::new(5, 5)],
            vec![Tile::new(1, 1)],
            vec![Tile::new(4, 4)],
        ];
        let mut game = Game::with_hands(hands, seat(1));
        let mut players: Vec<Box<dyn DominoPlayer>> =
            (0..4).map(|_| Box::new(GreedyPlayer::new()) as Box<dyn DominoPlayer>).collect();
        let result = game.play_out(&mut players).unwrap();
        assert!(result.blocked);
        // Seats 1 and 3 hold 0 + 2 against 10 + 8.
        assert!(result.team_won(seat(1)));
        assert_eq!(result.turns, 5);
    }
}
