// Probabilistic endgame solver
//
// Once few tiles are unseen, every hand assignment consistent with what is
// known is enumerated into a guess tree. The tree is built off the decision
// path and consulted by later decisions of the same seat.

pub mod build;
pub mod tree;
pub mod verdict;

use std::thread::{self, JoinHandle};

use crate::config::EngineConfig;
use crate::knowledge::PipTable;
use crate::state::GameSnapshot;
use crate::tile::{PlacedTile, TileSet};

pub use self::tree::{GuessTree, NodeMove, Outcome};

/// Tiles whose holder is still open: not on the table, not in the acting
/// hand, and not excluded from the next seat's hand by a known absence.
pub fn unseen_count(snapshot: &GameSnapshot, knowledge: &PipTable) -> usize {
    let outside = TileSet::FULL
        .difference(snapshot.table.played())
        .difference(snapshot.hand_set());
    let next = snapshot.seat.next();
    let absent = outside.touching(knowledge[next.index()]);
    outside.len() - absent.len()
}

/// A build running on its own thread, with the unseen count it started from.
struct PendingBuild {
    handle: JoinHandle<Option<GuessTree>>,
    unseen: usize,
}

pub struct EndgameSolver {
    config: EngineConfig,
    tree: Option<GuessTree>,
    pending: Option<PendingBuild>,
    /// Unseen count of the last build that came back empty. Seeding waits
    /// until the count drops below it.
    abandoned_at: Option<usize>,
}

impl EndgameSolver {
    pub fn new(config: EngineConfig) -> Self {
        EndgameSolver {
            config,
            tree: None,
            pending: None,
            abandoned_at: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.use_endgame_solver
    }

    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    pub fn is_building(&self) -> bool {
        self.pending.is_some()
    }

    pub fn tree(&self) -> Option<&GuessTree> {
        self.tree.as_ref()
    }

    pub fn abandoned_at(&self) -> Option<usize> {
        self.abandoned_at
    }

    /// Drops the tree. A build still running finishes on its own and its
    /// result is discarded.
    pub fn reset(&mut self) {
        if self.tree.is_some() || self.pending.is_some() {
            log::info!("Discarding guess tree");
        }
        self.tree = None;
        self.pending = None;
        self.abandoned_at = None;
    }

    /// Waits for a pending build.
    pub fn settle(&mut self) {
        let Some(PendingBuild { handle, unseen }) = self.pending.take() else {
            return;
        };
        match handle.join() {
            Ok(Some(tree)) => self.tree = Some(tree),
            Ok(None) => {
                log::info!("No guess tree at {} unseen tiles; waiting for fewer", unseen);
                self.abandoned_at = Some(unseen);
            }
            Err(_) => {
                log::warn!("Guess tree build panicked");
                self.abandoned_at = Some(unseen);
            }
        }
    }

    fn settle_if_finished(&mut self) {
        if self.pending.as_ref().is_some_and(|p| p.handle.is_finished()) {
            self.settle();
        }
    }

    /// Called with the state right after each decision, pass or play.
    /// Follows the real game through a loaded tree, or starts a build once
    /// the position is small enough.
    pub fn advance(&mut self, after: &GameSnapshot, via: NodeMove, knowledge: PipTable) {
        if !self.is_enabled() {
            return;
        }
        self.settle_if_finished();

        if let Some(tree) = self.tree.as_mut() {
            let key = tree.key_after(after);
            if !tree.reposition(&key) {
                log::warn!(
                    "Missing play on guess tree for seat {} with {} tiles down; keeping cursor",
                    after.seat,
                    after.table.len()
                );
            }
            return;
        }
        if self.pending.is_some() {
            return;
        }

        let unseen = unseen_count(after, &knowledge);
        if unseen >= self.config.tree_unseen_threshold {
            return;
        }
        if self.abandoned_at.is_some_and(|at| unseen >= at) {
            return;
        }

        log::debug!("Seeding guess tree for seat {} with {} unseen tiles", after.seat, unseen);
        let root = after.clone();
        let max_nodes = self.config.max_tree_nodes;
        let spawned = thread::Builder::new()
            .name(format!("guess-tree-{}", after.seat))
            .spawn(move || build::build(&root, via, knowledge, max_nodes));
        match spawned {
            Ok(handle) => self.pending = Some(PendingBuild { handle, unseen }),
            Err(e) => log::warn!("Could not start guess tree build: {}", e),
        }
    }

    /// The option that leads to a strictly better finish than the others, if
    /// the tree can tell. `snapshot` is the position before the move.
    pub fn verdict(&mut self, snapshot: &GameSnapshot, options: &[PlacedTile]) -> Option<PlacedTile> {
        if !self.is_enabled() {
            return None;
        }
        self.settle();

        let tree = self.tree.as_ref()?;
        if tree.acting() != snapshot.seat {
            return None;
        }
        let positions = tree.locate(&tree.key_before(snapshot));
        if positions.is_empty() {
            log::debug!("Current position is not on the guess tree");
            return None;
        }

        let moves: Vec<NodeMove> = options.iter().map(|placed| NodeMove::Play(*placed)).collect();
        let chosen = verdict::pick(tree, &positions, &moves).map(|index| options[index]);
        if let Some(placed) = chosen {
            log::debug!(
                "Guess tree prefers {} across {} positions",
                placed,
                positions.len()
            );
        }
        chosen
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::enums::{Edge, Seat};
    use crate::state::{GameSnapshot, Play};
    use crate::tile::{PlacedTile, Tile};

    pub fn plays(lines: &[(u8, u8, u8, Edge)]) -> Vec<Play> {
        lines
            .iter()
            .map(|(s, a, b, e)| {
                Play::new(
                    Seat::new(*s).unwrap(),
                    PlacedTile::opening(Tile::new(*a, *b), *e),
                )
            })
            .collect()
    }

    pub const LATE_LINE: [(u8, u8, u8, Edge); 21] = [
        (1, 6, 6, Edge::Left),
        (2, 6, 5, Edge::Left),
        (3, 5, 5, Edge::Left),
        (4, 6, 4, Edge::Right),
        (1, 4, 4, Edge::Right),
        (2, 5, 4, Edge::Left),
        (3, 4, 3, Edge::Left),
        (4, 4, 2, Edge::Right),
        (1, 3, 3, Edge::Left),
        (2, 2, 2, Edge::Right),
        (3, 3, 6, Edge::Left),
        (4, 2, 6, Edge::Right),
        (1, 6, 1, Edge::Left),
        (2, 6, 0, Edge::Right),
        (3, 1, 1, Edge::Left),
        (4, 0, 0, Edge::Right),
        (1, 1, 5, Edge::Left),
        (2, 0, 5, Edge::Right),
        (3, 5, 3, Edge::Left),
        (4, 5, 2, Edge::Right),
        (1, 3, 2, Edge::Left),
    ];

    /// Seat 1 has just placed its sixth tile and holds 0-1. Seats 2, 3 and 4
    /// hold two tiles each out of 2-0 2-1 3-0 3-1 4-0 4-1. Both edges show 2.
    pub fn late_position() -> GameSnapshot {
        GameSnapshot::from_plays(Seat::new(1).unwrap(), vec![Tile::new(0, 1)], plays(&LATE_LINE))
            .unwrap()
    }
}
