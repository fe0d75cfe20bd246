use itertools::Itertools;
use std::time::Instant;

use crate::enums::SEATS;
use crate::knowledge::PipTable;
use crate::state::GameSnapshot;
use crate::tile::TileSet;

use super::tree::{GuessTree, Node, NodeMove};

/// Hands `seat` may hold at `node`, given what the tree has assigned so far
/// and the pips it is known to lack.
pub fn hypothesised_hands(node: &Node, next_index: usize) -> Vec<TileSet> {
    let seat = SEATS[next_index];
    if let Some(hand) = node.hands[next_index] {
        return vec![hand];
    }

    let pool = node.pool();
    let need = node.tiles_needed(seat);
    let open = pool.difference(pool.touching(node.unavailable[next_index]));
    let others_open = SEATS
        .iter()
        .any(|s| *s != seat && node.hands[s.index()].is_none());

    if !others_open {
        // The last unknown hand is whatever remains.
        return if open == pool && pool.len() == need {
            vec![pool]
        } else {
            Vec::new()
        };
    }

    open.iter()
        .combinations(need)
        .map(|combo| TileSet::from_tiles(&combo))
        .collect()
}

/// Expands every non-terminal node below the root until each line finishes.
/// Returns `None` once the tree outgrows `max_nodes`.
pub fn build(
    after: &GameSnapshot,
    via: NodeMove,
    knowledge: PipTable,
    max_nodes: usize,
) -> Option<GuessTree> {
    let start = Instant::now();
    let mut tree = GuessTree::rooted(after, via, knowledge);
    let acting = tree.acting();
    let mut stack = vec![0usize];

    while let Some(index) = stack.pop() {
        let node = tree.node(index).clone();
        if node.is_leaf() {
            continue;
        }

        let seat = node.seat.next();
        for hand in hypothesised_hands(&node, seat.index()) {
            let placements = node.layout.placements(hand);
            let children: Vec<Node> = if placements.is_empty() {
                vec![node.after_pass(acting, seat, hand)]
            } else {
                placements
                    .into_iter()
                    .map(|placed| node.after_play(acting, seat, hand, placed))
                    .collect()
            };
            for child in children {
                stack.push(tree.push_child(index, child));
            }
        }

        if tree.len() > max_nodes {
            log::warn!(
                "Abandoning guess tree for seat {} after {} nodes ({:?})",
                acting,
                tree.len(),
                start.elapsed()
            );
            return None;
        }
    }

    log::info!(
        "Built guess tree for seat {} with {} nodes in {:?}",
        acting,
        tree.len(),
        start.elapsed()
    );
    Some(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endgame::fixtures::late_position;
    use crate::enums::Edge;

    #[test]
    fn test_late_position_is_legal() {
        let after = late_position();
        assert_eq!(after.table.len(), 21);
        assert_eq!(after.table.exposed(Edge::Left), Some(2));
        assert_eq!(after.table.exposed(Edge::Right), Some(2));
    }

    #[test]
    fn test_last_unknown_hand_takes_the_remainder() {
        let after = late_position();
        let via = NodeMove::Play(after.plays[20].placed);
        let tree = GuessTree::rooted(&after, via, PipTable::default());
        let mut node = tree.node(0).clone();
        let pool = node.pool();
        assert_eq!(pool.len(), 6);

        let first = hypothesised_hands(&node, 1);
        assert_eq!(first.len(), 15);

        node.hands[1] = Some(first[0]);
        node.hands[2] = Some(pool.difference(first[0]).iter().take(2).fold(TileSet::EMPTY, |s, t| s.with(t)));
        let last = hypothesised_hands(&node, 3);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].len(), 2);
    }

    #[test]
    fn test_known_absences_prune_hands() {
        let after = late_position();
        let mut knowledge = PipTable::default();
        knowledge[1].insert(2);
        let via = NodeMove::Play(after.plays[20].placed);
        let tree = GuessTree::rooted(&after, via, knowledge);
        let hands = hypothesised_hands(tree.node(0), 1);
        assert!(!hands.is_empty());
        assert!(hands
            .iter()
            .all(|hand| hand.iter().all(|tile| !tile.contains(2))));
    }

    #[test]
    fn test_full_build_finishes_every_line() {
        let after = late_position();
        let via = NodeMove::Play(after.plays[20].placed);
        let tree = build(&after, via, PipTable::default(), 1_000_000).unwrap();
        assert!(tree.len() > 1);
        for index in 0..tree.len() {
            let node = tree.node(index);
            if node.children.is_empty() && !node.is_leaf() {
                // Dead ends only come from inconsistent hypotheses.
                assert!(node.hands.iter().any(|h| h.is_none()));
            }
        }
        assert!(!tree.leaves_below(0).is_empty());
    }

    #[test]
    fn test_budget_abandons_build() {
        let after = late_position();
        let via = NodeMove::Play(after.plays[20].placed);
        assert!(build(&after, via, PipTable::default(), 3).is_none());
    }
}
