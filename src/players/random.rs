use rand::prelude::*;
use rand_xorshift::XorShiftRng;

use super::{legal_placements, DominoPlayer};
use crate::errors::EngineResult;
use crate::state::{GameSnapshot, Move};

/// Plays a uniformly random legal placement. Seeded, so simulations replay.
pub struct RandomPlayer {
    rng: XorShiftRng,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        RandomPlayer {
            rng: XorShiftRng::seed_from_u64(seed),
        }
    }
}

impl DominoPlayer for RandomPlayer {
    fn name(&self) -> &str {
        "random"
    }

    fn decide(&mut self, snapshot: &GameSnapshot) -> EngineResult<Move> {
        let placements = legal_placements(snapshot);
        Ok(match placements.choose(&mut self.rng) {
            Some(placed) => Move::place(snapshot.seat, *placed),
            None => Move::pass(snapshot.seat),
        })
    }
}
