use std::collections::VecDeque;

use crate::enums::{Edge, Seat, NUM_SEATS};
use crate::knowledge::UnavailableBones;
use crate::state::{GameSnapshot, Play};
use crate::table::Table;

/// What `observe` did with a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// New hand (or new seat): history, knowledge and any guess tree are stale.
    Reset,
    Appended,
}

/// Rolling window of the snapshots seen at this seat's turns, used to infer
/// which seats passed in between.
#[derive(Debug, Default)]
pub struct TurnHistoryTracker {
    seat: Option<Seat>,
    window: VecDeque<GameSnapshot>,
    knowledge: UnavailableBones,
}

impl TurnHistoryTracker {
    pub fn new(knowledge: UnavailableBones) -> Self {
        Self {
            seat: None,
            window: VecDeque::with_capacity(NUM_SEATS),
            knowledge,
        }
    }

    pub fn tracked_seat(&self) -> Option<Seat> {
        self.seat
    }

    pub fn knowledge(&self) -> &UnavailableBones {
        &self.knowledge
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn last_play_count(&self) -> Option<usize> {
        self.window.back().map(|s| s.plays.len())
    }

    /// Pushes `snapshot`, resetting first when it belongs to another seat or
    /// its history no longer extends the last one seen.
    pub fn observe(&mut self, snapshot: &GameSnapshot) -> Observation {
        let new_hand = match (self.seat, self.window.back()) {
            (Some(seat), Some(last)) => {
                seat != snapshot.seat || !extends(&snapshot.plays, &last.plays)
            }
            _ => true,
        };

        if new_hand {
            log::info!(
                "Resetting turn history for seat {} ({} plays on record)",
                snapshot.seat,
                snapshot.plays.len()
            );
            self.seat = Some(snapshot.seat);
            self.window.clear();
            self.knowledge.clear();
            // Empty baseline so passes already encoded in the history get inferred.
            self.window.push_back(GameSnapshot::new(
                snapshot.seat,
                Vec::new(),
                Table::new(),
                Vec::new(),
            ));
        }

        self.window.push_back(snapshot.clone());
        while self.window.len() > NUM_SEATS {
            self.window.pop_front();
        }

        if new_hand {
            Observation::Reset
        } else {
            Observation::Appended
        }
    }

    /// Diffs each adjacent pair in the window, records the passes found, then
    /// collapses the window to the newest snapshot. Returns the number of new entries.
    pub fn infer_passes(&mut self) -> usize {
        let marked: usize = self
            .window
            .iter()
            .zip(self.window.iter().skip(1))
            .map(|(older, newer)| infer_between(older, newer, &self.knowledge))
            .sum();

        while self.window.len() > 1 {
            self.window.pop_front();
        }

        if marked > 0 {
            log::debug!("Pass inference recorded {} unavailable pips", marked);
        }
        marked
    }
}

/// True when `plays` begins with every play of `earlier`.
fn extends(plays: &[Play], earlier: &[Play]) -> bool {
    plays.len() >= earlier.len() && earlier.iter().zip(plays).all(|(a, b)| a.same_as(b))
}

/// Walks the plays `newer` adds on top of `older` in seat rotation. Every seat
/// skipped between two consecutive plays, or between the last play and the
/// acting seat, passed while facing the table of that moment.
fn infer_between(older: &GameSnapshot, newer: &GameSnapshot, knowledge: &UnavailableBones) -> usize {
    let shared = older
        .plays
        .iter()
        .zip(newer.plays.iter())
        .take_while(|(a, b)| a.same_as(b))
        .count();

    let mut expected = match shared.checked_sub(1) {
        Some(last) => newer.plays[last].seat.next(),
        None => match newer.plays.first() {
            Some(first) => first.seat,
            None => return 0,
        },
    };

    let mut table = match Table::from_plays(&newer.plays[..shared]) {
        Ok(table) => table,
        Err(e) => {
            log::warn!("Skipping pass inference over malformed history: {}", e);
            return 0;
        }
    };

    let mut marked = 0;
    for play in &newer.plays[shared..] {
        for _ in 0..NUM_SEATS {
            if expected == play.seat {
                break;
            }
            marked += mark_passed(knowledge, expected, &table);
            expected = expected.next();
        }

        let placed = if table.is_empty() {
            Some(play.placed)
        } else {
            table.glue(play.placed.edge, play.placed.tile())
        };
        match placed {
            Some(placed) => table.place(placed),
            None => {
                log::warn!("Play {} does not glue during pass inference", play.placed);
                table.place(play.placed);
            }
        }
        expected = play.seat.next();
    }

    for _ in 0..NUM_SEATS {
        if expected == newer.seat {
            break;
        }
        marked += mark_passed(knowledge, expected, &table);
        expected = expected.next();
    }

    marked
}

fn mark_passed(knowledge: &UnavailableBones, seat: Seat, table: &Table) -> usize {
    let pips = [Edge::Left, Edge::Right]
        .into_iter()
        .filter_map(|edge| table.exposed(edge));
    knowledge.mark_all(seat, pips)
}
