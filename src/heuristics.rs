// Heuristic move selection
//
// Pure functions over a snapshot and a copy of the opponent-knowledge table.
// The session decides which of them run and in what order.

use crate::config::EngineConfig;
use crate::enums::{Edge, Seat, NUM_PIPS};
use crate::knowledge::PipTable;
use crate::table::Table;
use crate::tile::{PlacedTile, Tile};

/// Legal placements of the hand, per edge, heaviest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    pub left: Vec<PlacedTile>,
    pub right: Vec<PlacedTile>,
}

impl Candidates {
    pub fn on(&self, edge: Edge) -> &[PlacedTile] {
        match edge {
            Edge::Left => &self.left,
            Edge::Right => &self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// The single edge with candidates, when only one has any.
    pub fn one_sided(&self) -> Option<Edge> {
        match (self.left.is_empty(), self.right.is_empty()) {
            (false, true) => Some(Edge::Left),
            (true, false) => Some(Edge::Right),
            _ => None,
        }
    }

    pub fn heaviest_on(&self, edge: Edge) -> Option<PlacedTile> {
        self.on(edge).first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedTile> {
        self.left.iter().chain(self.right.iter())
    }
}

/// Which tactic produced a decision, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tactic {
    Opening,
    Pass,
    OneSided,
    Closing(Edge),
    PartnerAware,
    Starvation,
    EndgameVerdict,
    Fallback,
}

/// Hand ordered by pip sum, heaviest first; equal sums keep hand order.
pub fn by_weight(hand: &[Tile]) -> Vec<Tile> {
    let mut sorted = hand.to_vec();
    sorted.sort_by(|a, b| b.sum().cmp(&a.sum()));
    sorted
}

pub fn legal_candidates(table: &Table, hand: &[Tile]) -> Candidates {
    let mut candidates = Candidates::default();
    if table.is_empty() {
        return candidates;
    }
    for tile in by_weight(hand) {
        if let Some(placed) = table.glue(Edge::Left, tile) {
            candidates.left.push(placed);
        }
        if let Some(placed) = table.glue(Edge::Right, tile) {
            candidates.right.push(placed);
        }
    }
    candidates
}

/// First move of the hand: the heaviest tile, on the left.
pub fn opening_play(hand: &[Tile]) -> Option<PlacedTile> {
    by_weight(hand)
        .first()
        .map(|tile| PlacedTile::opening(*tile, Edge::Left))
}

/// An edge whose exposed pip can only ever be answered from this hand: every
/// tile carrying it is either on the table or held here.
pub fn closing_edge(table: &Table, hand: &[Tile]) -> Option<Edge> {
    [Edge::Left, Edge::Right].into_iter().find(|edge| {
        table.exposed(*edge).is_some_and(|pip| {
            let held = hand.iter().filter(|t| t.contains(pip)).count();
            table.count_containing(pip) + held == NUM_PIPS
        })
    })
}

/// Opponents of `seat` known to hold nothing with `pip`.
pub fn blocked_opponents(seat: Seat, pip: u8, knowledge: &PipTable) -> usize {
    seat.opponents()
        .iter()
        .filter(|opponent| knowledge[opponent.index()].contains(pip))
        .count()
}

fn partner_answers(seat: Seat, pip: u8, knowledge: &PipTable) -> bool {
    !knowledge[seat.partner().index()].contains(pip)
}

fn heaviest(tiles: impl IntoIterator<Item = PlacedTile>) -> Option<PlacedTile> {
    tiles.into_iter().fold(None, |best, tile| match best {
        Some(b) if b.sum() >= tile.sum() => Some(b),
        _ => Some(tile),
    })
}

/// Keeps the partner in play: only placements exposing a pip the partner may
/// hold survive, and the edge the partner can already answer is left alone.
pub fn partner_aware_play(
    seat: Seat,
    table: &Table,
    candidates: &Candidates,
    knowledge: &PipTable,
) -> Option<PlacedTile> {
    let answerable = |placed: &&PlacedTile| partner_answers(seat, placed.exposed(), knowledge);
    let left: Vec<PlacedTile> = candidates.left.iter().filter(answerable).copied().collect();
    let right: Vec<PlacedTile> = candidates.right.iter().filter(answerable).copied().collect();

    let mut options = Vec::with_capacity(2);
    match (left.first(), right.first()) {
        (Some(&l), Some(&r)) => {
            let edge_open =
                |edge| table.exposed(edge).is_some_and(|pip| partner_answers(seat, pip, knowledge));
            if edge_open(Edge::Left) {
                options.push(r);
            }
            if edge_open(Edge::Right) {
                options.push(l);
            }
            if options.is_empty() {
                options.extend([l, r]);
            }
        }
        (Some(&l), None) => options.push(l),
        (None, Some(&r)) => options.push(r),
        // The partner passes whatever we do: shed weight.
        (None, None) => options.extend(candidates.iter().copied()),
    }

    heaviest(options)
}

/// Prefers exposing a pip the opponents are known to lack, heavier first on ties.
pub fn starvation_play(seat: Seat, candidates: &Candidates, knowledge: &PipTable) -> Option<PlacedTile> {
    let key = |placed: &PlacedTile| (blocked_opponents(seat, placed.exposed(), knowledge), placed.sum());
    candidates.iter().fold(None, |best, placed| match best {
        Some(b) if key(&b) >= key(placed) => Some(b),
        _ => Some(*placed),
    })
}

/// Tie-break between the partner-aware and starvation moves when no guess
/// tree has a verdict.
pub fn reconcile(
    seat: Seat,
    table: &Table,
    partner_aware: PlacedTile,
    starvation: PlacedTile,
    knowledge: &PipTable,
    config: &EngineConfig,
) -> (PlacedTile, Tactic) {
    let blocked = blocked_opponents(seat, partner_aware.exposed(), knowledge);
    let partner_has_other_edge = table
        .exposed(partner_aware.edge.opposite())
        .is_some_and(|pip| partner_answers(seat, pip, knowledge));

    if blocked > config.starvation_blocked_threshold || partner_has_other_edge {
        (starvation, Tactic::Starvation)
    } else {
        (partner_aware, Tactic::PartnerAware)
    }
}
