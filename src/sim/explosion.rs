//! Delayed detonation queue
//!
//! Pending explosions are keyed by the absolute frame they mature on and
//! drained once per frame after the physics scan.

use serde::{Deserialize, Serialize};

use super::cell::ExplosionKind;

/// A scheduled detonation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PendingExplosion {
    /// Value of `frames_executed` during which it detonates
    pub frame: u64,
    pub x: i32,
    pub y: i32,
    /// Half-width of the square blast (0 hits only the centre)
    pub radius: i32,
    pub kind: ExplosionKind,
}

/// Explosions waiting to mature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplosionQueue {
    pending: Vec<PendingExplosion>,
}

impl ExplosionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, explosion: PendingExplosion) {
        self.pending.push(explosion);
    }

    /// Remove the first entry equal to `explosion`; false if none matched
    pub fn remove_first(&mut self, explosion: &PendingExplosion) -> bool {
        match self.pending.iter().position(|e| e == explosion) {
            Some(i) => {
                self.pending.remove(i);
                true
            }
            None => false,
        }
    }

    /// Extract every entry maturing on `frame`, keeping the rest in order
    pub fn take_due(&mut self, frame: u64) -> Vec<PendingExplosion> {
        let (due, rest) = self.pending.drain(..).partition(|e| e.frame == frame);
        self.pending = rest;
        due
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingExplosion> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Entries in canonical order, for comparing queues regardless of history
    pub fn sorted(&self) -> Vec<PendingExplosion> {
        let mut entries = self.pending.clone();
        entries.sort();
        entries
    }
}

impl FromIterator<PendingExplosion> for ExplosionQueue {
    fn from_iter<I: IntoIterator<Item = PendingExplosion>>(iter: I) -> Self {
        Self { pending: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(frame: u64, x: i32) -> PendingExplosion {
        PendingExplosion { frame, x, y: 1, radius: 1, kind: ExplosionKind::Normal }
    }

    #[test]
    fn test_take_due_keeps_remaining_order() {
        let mut queue: ExplosionQueue = [at(3, 1), at(5, 2), at(3, 3), at(7, 4)].into_iter().collect();
        let due = queue.take_due(3);
        assert_eq!(due, vec![at(3, 1), at(3, 3)]);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![at(5, 2), at(7, 4)]);
        assert!(queue.take_due(4).is_empty());
    }

    #[test]
    fn test_remove_first_only_removes_one_duplicate() {
        let mut queue: ExplosionQueue = [at(2, 1), at(2, 1), at(4, 1)].into_iter().collect();
        assert!(queue.remove_first(&at(2, 1)));
        assert_eq!(queue.len(), 2);
        assert!(queue.remove_first(&at(2, 1)));
        assert!(!queue.remove_first(&at(2, 1)));
        assert_eq!(queue.len(), 1);
    }
}
