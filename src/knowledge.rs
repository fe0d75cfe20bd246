use std::sync::{Arc, Mutex, MutexGuard};

use crate::enums::{Seat, NUM_SEATS};
use crate::tile::PipSet;

pub type PipTable = [PipSet; NUM_SEATS];

/// Seat -> pip values that seat is known not to hold.
///
/// Clones share the same table. Within a hand entries are only ever added;
/// `clear` is reserved for the start of a new hand.
#[derive(Debug, Clone, Default)]
pub struct UnavailableBones {
    inner: Arc<Mutex<PipTable>>,
}

impl UnavailableBones {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, PipTable> {
        // Entries are plain bitsets, a panicked writer cannot leave them torn.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records that `seat` holds no tile with `pip`. Returns false when it was already known.
    pub fn mark(&self, seat: Seat, pip: u8) -> bool {
        self.table()[seat.index()].insert(pip)
    }

    pub fn mark_all(&self, seat: Seat, pips: impl IntoIterator<Item = u8>) -> usize {
        let mut table = self.table();
        pips.into_iter()
            .filter(|pip| table[seat.index()].insert(*pip))
            .count()
    }

    pub fn is_unavailable(&self, seat: Seat, pip: u8) -> bool {
        self.table()[seat.index()].contains(pip)
    }

    pub fn for_seat(&self, seat: Seat) -> PipSet {
        self.table()[seat.index()]
    }

    /// Consistent copy of every seat's entry, taken under one lock.
    pub fn snapshot(&self) -> PipTable {
        *self.table()
    }

    pub fn clear(&self) {
        *self.table() = PipTable::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_are_shared_between_clones() {
        let bones = UnavailableBones::new();
        let reader = bones.clone();
        let seat = Seat::new(2).unwrap();

        assert!(bones.mark(seat, 4));
        assert!(!bones.mark(seat, 4));
        assert!(reader.is_unavailable(seat, 4));
        assert!(!reader.is_unavailable(seat.next(), 4));
    }

    #[test]
    fn test_marks_only_grow_until_cleared() {
        let bones = UnavailableBones::new();
        let seat = Seat::new(1).unwrap();
        assert_eq!(bones.mark_all(seat, [0, 3, 3]), 2);
        assert_eq!(bones.mark_all(seat, [3, 6]), 1);
        assert_eq!(bones.for_seat(seat).iter().collect::<Vec<_>>(), vec![0, 3, 6]);

        bones.clear();
        assert!(bones.snapshot().iter().all(|pips| pips.is_empty()));
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_marks() {
        let bones = UnavailableBones::new();
        std::thread::scope(|s| {
            for seat_index in 0..4 {
                let bones = bones.clone();
                s.spawn(move || {
                    for pip in 0..=6 {
                        bones.mark(Seat::from_index(seat_index), pip);
                    }
                });
            }
        });
        assert!(bones.snapshot().iter().all(|pips| pips.len() == 7));
    }
}
