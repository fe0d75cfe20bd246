use rayon::prelude::*;
use std::cmp::Ordering;

use super::tree::{GuessTree, NodeMove};

/// Depths, counted from the position before the move, of every finished line
/// below one candidate move. Both lists are sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafDepths {
    pub wins: Vec<u16>,
    pub favorable_draws: Vec<u16>,
}

impl LeafDepths {
    pub fn is_empty(&self) -> bool {
        self.wins.is_empty() && self.favorable_draws.is_empty()
    }

    pub fn wins_immediately(&self) -> bool {
        self.wins.first() == Some(&1)
    }
}

/// Leaves below the child reached by `via` from each of `positions`.
pub fn collect(tree: &GuessTree, positions: &[usize], via: NodeMove) -> LeafDepths {
    let mut depths = LeafDepths::default();
    for &position in positions {
        let base = tree.node(position).depth;
        let Some(child) = tree.child_via(position, via) else {
            continue;
        };
        for leaf in tree.leaves_below(child) {
            let node = tree.node(leaf);
            let Some(outcome) = node.outcome else {
                continue;
            };
            let delta = node.depth - base;
            match (outcome.winner, outcome.draw) {
                (true, false) => depths.wins.push(delta),
                (true, true) => depths.favorable_draws.push(delta),
                _ => {}
            }
        }
    }
    depths.wins.sort_unstable();
    depths.favorable_draws.sort_unstable();
    depths
}

/// Shallowest depth and how many leaves sit there. `None` for an empty list.
fn shallow_profile(depths: &[u16]) -> Option<(u16, usize)> {
    let first = *depths.first()?;
    Some((first, depths.iter().take_while(|d| **d == first).count()))
}

/// `Greater` when the first list makes the better line: any leaf beats
/// none, then a shallower first leaf, then fewer leaves at that depth.
fn compare_lists(a: &[u16], b: &[u16]) -> Ordering {
    match (shallow_profile(a), shallow_profile(b)) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (Some((da, na)), Some((db, nb))) => db.cmp(&da).then(nb.cmp(&na)),
    }
}

/// `Greater` when `a` is the better move.
pub fn compare(a: &LeafDepths, b: &LeafDepths) -> Ordering {
    match (a.wins_immediately(), b.wins_immediately()) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    if !a.wins.is_empty() || !b.wins.is_empty() {
        return compare_lists(&a.wins, &b.wins);
    }
    compare_lists(&a.favorable_draws, &b.favorable_draws)
}

/// Index of the move strictly better than every other one, if any.
pub fn pick(tree: &GuessTree, positions: &[usize], moves: &[NodeMove]) -> Option<usize> {
    let depths: Vec<LeafDepths> = moves
        .par_iter()
        .map(|via| collect(tree, positions, *via))
        .collect();

    for (index, candidate) in depths.iter().enumerate() {
        log::debug!(
            "Move {:?}: {} winning leaves, {} favourable draws",
            moves[index],
            candidate.wins.len(),
            candidate.favorable_draws.len()
        );
    }

    let (best, best_depths) = depths
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| compare(a, b))?;
    if best_depths.is_empty() {
        return None;
    }
    let strictly_best = depths
        .iter()
        .enumerate()
        .all(|(index, other)| index == best || compare(best_depths, other) == Ordering::Greater);
    strictly_best.then_some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depths(wins: &[u16], draws: &[u16]) -> LeafDepths {
        LeafDepths {
            wins: wins.to_vec(),
            favorable_draws: draws.to_vec(),
        }
    }

    #[test]
    fn test_immediate_win_dominates() {
        let quick = depths(&[1, 9], &[]);
        let many = depths(&[2, 2, 2, 3], &[4]);
        assert_eq!(compare(&quick, &many), Ordering::Greater);
        assert_eq!(compare(&many, &quick), Ordering::Less);
    }

    #[test]
    fn test_wins_beat_draws() {
        let win = depths(&[7], &[]);
        let draw = depths(&[], &[3, 3]);
        assert_eq!(compare(&win, &draw), Ordering::Greater);
    }

    #[test]
    fn test_shallower_then_fewer_at_that_depth() {
        assert_eq!(compare(&depths(&[3, 5], &[]), &depths(&[4], &[])), Ordering::Greater);
        assert_eq!(compare(&depths(&[3, 5], &[]), &depths(&[3, 3], &[])), Ordering::Greater);
        assert_eq!(compare(&depths(&[3], &[]), &depths(&[3, 8], &[])), Ordering::Equal);
    }

    #[test]
    fn test_draws_compared_when_nobody_wins() {
        assert_eq!(compare(&depths(&[], &[2]), &depths(&[], &[])), Ordering::Greater);
        assert_eq!(compare(&depths(&[], &[]), &depths(&[], &[])), Ordering::Equal);
    }
}
