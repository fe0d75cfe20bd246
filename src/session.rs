use std::thread;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::endgame::{EndgameSolver, NodeMove};
use crate::enums::{Edge, Seat};
use crate::errors::{EngineError, EngineResult};
use crate::heuristics::{self, Candidates, Tactic};
use crate::knowledge::UnavailableBones;
use crate::players::DominoPlayer;
use crate::state::{GameSnapshot, Move};
use crate::table::Table;
use crate::tile::PlacedTile;
use crate::tracker::{Observation, TurnHistoryTracker};

/// Decision engine state for one seat across the calls of a hand (and the
/// hands after it). Owned by the caller; nothing is shared between sessions.
pub struct EngineSession {
    config: EngineConfig,
    pinned: Option<Seat>,
    tracker: TurnHistoryTracker,
    knowledge: UnavailableBones,
    solver: EndgameSolver,
}

impl Default for EngineSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineSession {
    /// Follows whichever seat it is asked about; a new seat starts a new hand.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Only ever decides for `seat`.
    pub fn for_seat(seat: Seat) -> Self {
        let mut session = Self::new();
        session.pinned = Some(seat);
        session
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let knowledge = UnavailableBones::new();
        EngineSession {
            solver: EndgameSolver::new(config.clone()),
            tracker: TurnHistoryTracker::new(knowledge.clone()),
            knowledge,
            pinned: None,
            config,
        }
    }

    pub fn pinned(mut self, seat: Seat) -> Self {
        self.pinned = Some(seat);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &UnavailableBones {
        &self.knowledge
    }

    pub fn solver(&self) -> &EndgameSolver {
        &self.solver
    }

    /// Chooses the move for `snapshot.seat`.
    pub fn decide(&mut self, snapshot: &GameSnapshot) -> EngineResult<Move> {
        self.decide_with_tactic(snapshot).map(|(mv, _)| mv)
    }

    /// `decide`, also reporting which rule produced the move.
    pub fn decide_with_tactic(&mut self, snapshot: &GameSnapshot) -> EngineResult<(Move, Tactic)> {
        if let Some(expected) = self.pinned {
            if expected != snapshot.seat {
                return Err(EngineError::not_your_turn(expected, snapshot.seat));
            }
        }

        let start = Instant::now();
        if self.tracker.observe(snapshot) == Observation::Reset {
            self.solver.reset();
        }

        let Self {
            tracker,
            knowledge,
            solver,
            config,
            ..
        } = self;
        let seat = snapshot.seat;

        let (mv, tactic) = thread::scope(|s| {
            let inference = s.spawn(move || tracker.infer_passes());
            let candidates = heuristics::legal_candidates(&snapshot.table, &snapshot.hand);
            if let Some(early) = early_decision(snapshot, &candidates) {
                return early;
            }
            if inference.join().is_err() {
                log::warn!("Pass inference panicked; deciding with the knowledge at hand");
            }
            contested_decision(snapshot, &candidates, knowledge, solver, config)
        });

        if tactic == Tactic::Pass {
            knowledge.mark_all(seat, exposed_pips(&snapshot.table));
        }

        let after = snapshot.with_move(&mv);
        let via = match mv.placed {
            Some(placed) => NodeMove::Play(placed),
            None => NodeMove::Pass,
        };
        solver.advance(&after, via, knowledge.snapshot());

        log::debug!("{} ({:?}) in {:?}", mv, tactic, start.elapsed());
        Ok((mv, tactic))
    }
}

impl DominoPlayer for EngineSession {
    fn name(&self) -> &str {
        "engine"
    }

    fn decide(&mut self, snapshot: &GameSnapshot) -> EngineResult<Move> {
        EngineSession::decide(self, snapshot)
    }
}

fn exposed_pips(table: &Table) -> impl Iterator<Item = u8> + '_ {
    [Edge::Left, Edge::Right]
        .into_iter()
        .filter_map(|edge| table.exposed(edge))
}

/// The decisions that need no opponent knowledge.
fn early_decision(snapshot: &GameSnapshot, candidates: &Candidates) -> Option<(Move, Tactic)> {
    let seat = snapshot.seat;
    if snapshot.table.is_empty() {
        return Some(match heuristics::opening_play(&snapshot.hand) {
            Some(placed) => (Move::place(seat, placed), Tactic::Opening),
            None => (Move::pass(seat), Tactic::Pass),
        });
    }

    if candidates.is_empty() {
        return Some((Move::pass(seat), Tactic::Pass));
    }

    if let Some(edge) = candidates.one_sided() {
        let placed = candidates.heaviest_on(edge)?;
        return Some((Move::place(seat, placed), Tactic::OneSided));
    }

    let closing = heuristics::closing_edge(&snapshot.table, &snapshot.hand)?;
    let placed = candidates.heaviest_on(closing.opposite())?;
    Some((Move::place(seat, placed), Tactic::Closing(closing)))
}

/// Both edges open and neither closing: partner-aware and starvation plays
/// are evaluated side by side, then reconciled.
fn contested_decision(
    snapshot: &GameSnapshot,
    candidates: &Candidates,
    knowledge: &UnavailableBones,
    solver: &mut EndgameSolver,
    config: &EngineConfig,
) -> (Move, Tactic) {
    let seat = snapshot.seat;
    let table = &snapshot.table;
    let known = knowledge.snapshot();

    let (partner_aware, starvation) = rayon::join(
        || heuristics::partner_aware_play(seat, table, candidates, &known),
        || heuristics::starvation_play(seat, candidates, &known),
    );

    let (placed, tactic): (PlacedTile, Tactic) = match (partner_aware, starvation) {
        (Some(duo), Some(starve)) if duo == starve => (duo, Tactic::PartnerAware),
        (Some(duo), Some(starve)) => match solver.verdict(snapshot, &[duo, starve]) {
            Some(placed) => (placed, Tactic::EndgameVerdict),
            None => heuristics::reconcile(seat, table, duo, starve, &known, config),
        },
        (Some(duo), None) => (duo, Tactic::PartnerAware),
        (None, Some(starve)) => (starve, Tactic::Starvation),
        (None, None) => {
            log::warn!(
                "No heuristic produced a move for seat {} with {} tiles in hand; passing",
                seat,
                snapshot.hand.len()
            );
            return (Move::pass(seat), Tactic::Fallback);
        }
    };
    (Move::place(seat, placed), tactic)
}
