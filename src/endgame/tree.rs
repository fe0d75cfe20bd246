use std::collections::VecDeque;

use crate::enums::{Edge, Seat, HAND_SIZE, NUM_SEATS, SEATS};
use crate::knowledge::PipTable;
use crate::state::GameSnapshot;
use crate::table::Table;
use crate::tile::{PlacedTile, Tile, TileSet};

/// Consecutive passes that leave the line blocked.
pub const BLOCKING_PASSES: u8 = NUM_SEATS as u8;

/// The action that produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMove {
    Play(PlacedTile),
    Pass,
}

/// Result of a finished line, from the acting partnership's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub draw: bool,
    pub winner: bool,
}

/// Both ends of the line plus the tiles on it. Two layouts are equal when
/// the same tiles are down and the same pips face outward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Layout {
    left: Option<PlacedTile>,
    right: Option<PlacedTile>,
    played: TileSet,
}

impl Layout {
    pub fn from_table(table: &Table) -> Layout {
        Layout {
            left: table.end(Edge::Left),
            right: table.end(Edge::Right),
            played: table.played(),
        }
    }

    pub fn played(&self) -> TileSet {
        self.played
    }

    fn end(&self, edge: Edge) -> Option<PlacedTile> {
        match edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn exposed(&self, edge: Edge) -> Option<u8> {
        self.end(edge).map(PlacedTile::exposed)
    }

    pub fn glue(&self, edge: Edge, tile: Tile) -> Option<PlacedTile> {
        match self.end(edge) {
            Some(end) => end.glue(tile),
            None => Some(PlacedTile::opening(tile, edge)),
        }
    }

    pub fn place(&mut self, placed: PlacedTile) {
        if self.played.is_empty() {
            self.left = Some(placed.facing(Edge::Left));
            self.right = Some(placed.facing(Edge::Right));
        } else {
            match placed.edge {
                Edge::Left => self.left = Some(placed),
                Edge::Right => self.right = Some(placed),
            }
        }
        self.played.insert(placed.tile());
    }

    /// Every legal placement of `hand`, left edge first.
    pub fn placements(&self, hand: TileSet) -> Vec<PlacedTile> {
        let mut out = Vec::new();
        for edge in [Edge::Left, Edge::Right] {
            for tile in hand.iter() {
                if let Some(placed) = self.glue(edge, tile) {
                    out.push(placed);
                }
            }
        }
        out
    }
}

/// What identifies a real position inside the tree: who acted last, the
/// acting seat's hand and the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKey {
    pub seat: Seat,
    pub hand: TileSet,
    pub layout: Layout,
}

/// State right after `seat` acted.
#[derive(Debug, Clone)]
pub struct Node {
    pub seat: Seat,
    pub via: NodeMove,
    /// Known or hypothesised hands; `None` until the seat's turn comes up.
    pub hands: [Option<TileSet>; NUM_SEATS],
    pub layout: Layout,
    pub unavailable: PipTable,
    pub played_count: [u8; NUM_SEATS],
    pub passes_in_row: u8,
    pub last_placer: Option<Seat>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: u16,
    pub outcome: Option<Outcome>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.outcome.is_some()
    }

    /// The child state after `seat` places `placed` from `hand`.
    pub fn after_play(&self, acting: Seat, seat: Seat, hand: TileSet, placed: PlacedTile) -> Node {
        let mut next = self.successor(seat, NodeMove::Play(placed));
        let rest = hand.without(placed.tile());
        next.hands[seat.index()] = Some(rest);
        next.layout.place(placed);
        next.played_count[seat.index()] += 1;
        next.passes_in_row = 0;
        next.last_placer = Some(seat);
        if rest.is_empty() {
            next.outcome = Some(Outcome {
                draw: false,
                winner: seat.is_partner_of(acting),
            });
        }
        next
    }

    /// The child state after `seat`, holding `hand`, fails to glue.
    pub fn after_pass(&self, acting: Seat, seat: Seat, hand: TileSet) -> Node {
        let mut next = self.successor(seat, NodeMove::Pass);
        next.hands[seat.index()] = Some(hand);
        for edge in [Edge::Left, Edge::Right] {
            if let Some(pip) = self.layout.exposed(edge) {
                next.unavailable[seat.index()].insert(pip);
            }
        }
        next.passes_in_row = self.passes_in_row + 1;
        if next.passes_in_row >= BLOCKING_PASSES {
            next.outcome = Some(next.blocked_outcome(acting));
        }
        next
    }

    fn successor(&self, seat: Seat, via: NodeMove) -> Node {
        Node {
            seat,
            via,
            hands: self.hands,
            layout: self.layout,
            unavailable: self.unavailable,
            played_count: self.played_count,
            passes_in_row: self.passes_in_row,
            last_placer: self.last_placer,
            parent: None,
            children: Vec::new(),
            depth: self.depth + 1,
            outcome: None,
        }
    }

    /// Tiles nobody at this node holds for certain.
    pub fn pool(&self) -> TileSet {
        self.hands
            .iter()
            .flatten()
            .fold(TileSet::FULL.difference(self.layout.played), |pool, hand| {
                pool.difference(*hand)
            })
    }

    pub fn tiles_needed(&self, seat: Seat) -> usize {
        HAND_SIZE.saturating_sub(self.played_count[seat.index()] as usize)
    }

    /// Lower partnership pip total wins a blocked line; a tie goes against
    /// whoever placed last. Hands never hypothesised count their expected
    /// share of the pool.
    pub fn blocked_outcome(&self, acting: Seat) -> Outcome {
        let pool = self.pool();
        let open_need: u32 = SEATS
            .iter()
            .filter(|s| self.hands[s.index()].is_none())
            .map(|s| self.tiles_needed(*s) as u32)
            .sum();
        let scale = open_need.max(1);

        let weight = |seat: Seat| match self.hands[seat.index()] {
            Some(hand) => hand.pip_sum() * scale,
            None => pool.pip_sum() * self.tiles_needed(seat) as u32,
        };
        let ours = weight(acting) + weight(acting.partner());
        let theirs: u32 = acting.opponents().iter().map(|s| weight(*s)).sum();

        let last_was_opponent = self
            .last_placer
            .is_some_and(|placer| !placer.is_partner_of(acting));
        Outcome {
            draw: true,
            winner: ours < theirs || (ours == theirs && last_was_opponent),
        }
    }
}

/// Arena of hypothetical continuations, rooted at a real state of the
/// acting seat.
#[derive(Debug, Clone)]
pub struct GuessTree {
    acting: Seat,
    nodes: Vec<Node>,
    cursor: usize,
}

impl GuessTree {
    /// A single-node tree for the state `after` reached by `via`.
    pub fn rooted(after: &GameSnapshot, via: NodeMove, knowledge: PipTable) -> GuessTree {
        let acting = after.seat;
        let mut hands = [None; NUM_SEATS];
        hands[acting.index()] = Some(after.hand_set());

        let mut played_count = [0u8; NUM_SEATS];
        for play in &after.plays {
            played_count[play.seat.index()] += 1;
        }

        let last_placer = after.plays.last().map(|play| play.seat);
        let passes_in_row = match (via, last_placer) {
            // Everyone after the last placer up to and including us passed;
            // the placer itself passing makes it a full round.
            (NodeMove::Pass, Some(placer)) => {
                ((acting.index() + 2 * NUM_SEATS - 1 - placer.index()) % NUM_SEATS + 1) as u8
            }
            (NodeMove::Pass, None) => 1,
            (NodeMove::Play(_), _) => 0,
        };

        let mut root = Node {
            seat: acting,
            via,
            hands,
            layout: Layout::from_table(&after.table),
            unavailable: knowledge,
            played_count,
            passes_in_row,
            last_placer,
            parent: None,
            children: Vec::new(),
            depth: 0,
            outcome: None,
        };
        if let NodeMove::Pass = via {
            for edge in [Edge::Left, Edge::Right] {
                if let Some(pip) = root.layout.exposed(edge) {
                    root.unavailable[acting.index()].insert(pip);
                }
            }
        }
        root.outcome = if after.hand.is_empty() && !after.plays.is_empty() {
            Some(Outcome {
                draw: false,
                winner: true,
            })
        } else if passes_in_row >= BLOCKING_PASSES {
            Some(root.blocked_outcome(acting))
        } else {
            None
        };

        GuessTree {
            acting,
            nodes: vec![root],
            cursor: 0,
        }
    }

    pub fn acting(&self) -> Seat {
        self.acting
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn push_child(&mut self, parent: usize, mut child: Node) -> usize {
        let index = self.nodes.len();
        child.parent = Some(parent);
        self.nodes.push(child);
        self.nodes[parent].children.push(index);
        index
    }

    pub fn matches(&self, index: usize, key: &NodeKey) -> bool {
        let node = &self.nodes[index];
        node.seat == key.seat
            && node.layout == key.layout
            && node.hands[self.acting.index()] == Some(key.hand)
    }

    /// Key of the real position `snapshot` describes, just before the acting
    /// seat moves: the previous seat has acted.
    pub fn key_before(&self, snapshot: &GameSnapshot) -> NodeKey {
        NodeKey {
            seat: snapshot.seat.add(NUM_SEATS - 1),
            hand: snapshot.hand_set(),
            layout: Layout::from_table(&snapshot.table),
        }
    }

    /// Key of the real position right after the acting seat moved.
    pub fn key_after(&self, after: &GameSnapshot) -> NodeKey {
        NodeKey {
            seat: after.seat,
            hand: after.hand_set(),
            layout: Layout::from_table(&after.table),
        }
    }

    /// Every node matching `key` in the smallest subtree around the cursor
    /// that holds any: the cursor's own subtree first, then each ancestor's.
    pub fn locate(&self, key: &NodeKey) -> Vec<usize> {
        let mut searched = None;
        let mut origin = Some(self.cursor);
        while let Some(start) = origin {
            let found = self.search_subtree(start, searched, key);
            if !found.is_empty() {
                return found;
            }
            searched = Some(start);
            origin = self.nodes[start].parent;
        }
        Vec::new()
    }

    fn search_subtree(&self, start: usize, skip: Option<usize>, key: &NodeKey) -> Vec<usize> {
        let mut found = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(index) = queue.pop_front() {
            if self.matches(index, key) {
                found.push(index);
                continue;
            }
            queue.extend(
                self.nodes[index]
                    .children
                    .iter()
                    .copied()
                    .filter(|child| Some(*child) != skip),
            );
        }
        found
    }

    /// Moves the cursor to the common ancestor of every node matching `key`.
    /// On a miss the cursor stays where it was.
    pub fn reposition(&mut self, key: &NodeKey) -> bool {
        let found = self.locate(key);
        match self.common_ancestor(&found) {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    fn common_ancestor(&self, indices: &[usize]) -> Option<usize> {
        let (&first, rest) = indices.split_first()?;
        let mut ancestor = first;
        for &other in rest {
            let mut a = ancestor;
            let mut b = other;
            while a != b {
                if self.nodes[a].depth >= self.nodes[b].depth {
                    a = self.nodes[a].parent?;
                } else {
                    b = self.nodes[b].parent?;
                }
            }
            ancestor = a;
        }
        Some(ancestor)
    }

    /// The child of `index` reached by `via`, if that move was expanded.
    pub fn child_via(&self, index: usize, via: NodeMove) -> Option<usize> {
        self.nodes[index]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[*child].via == via)
    }

    /// Finished lines below `index`, itself included.
    pub fn leaves_below(&self, index: usize) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            if node.is_leaf() {
                leaves.push(current);
            } else {
                stack.extend(node.children.iter().copied());
            }
        }
        leaves
    }
}
