//! Per-level completion tracking
//!
//! Keeps the best result achieved on every level. Persisted through
//! [`crate::persistence::completion`].

use serde::{Deserialize, Serialize};

use crate::sim::{CellType, LevelState};

/// How far the player has got with a level. Values are stored in files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum CompletionState {
    #[default]
    NotAttempted = 0,
    Attempted = 1,
    Completed = 2,
}

impl CompletionState {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(CompletionState::NotAttempted),
            1 => Some(CompletionState::Attempted),
            2 => Some(CompletionState::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionState::NotAttempted => "not attempted",
            CompletionState::Attempted => "attempted",
            CompletionState::Completed => "completed",
        }
    }
}

/// Best results on one level. Minimised stats use `u64::MAX` for "no record".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCompletion {
    pub state: CompletionState,
    /// Fewest frames to finish
    pub frames: u64,
    /// Most items collected beyond what the exit needed
    pub extra_items: u64,
    /// Most red bombs left over
    pub extra_bombs: u64,
    /// Most empty cells left behind
    pub cleared_space: u64,
    /// Fewest empty cells left attenuated
    pub attenuated_space: u64,
    /// Least disorder left behind (see [`LevelState::compute_entropy`])
    pub entropy: u64,
    /// Fewest rewinds used
    pub rewind_count: u64,
}

impl Default for LevelCompletion {
    fn default() -> Self {
        Self {
            state: CompletionState::NotAttempted,
            frames: u64::MAX,
            extra_items: 0,
            extra_bombs: 0,
            cleared_space: 0,
            attenuated_space: u64::MAX,
            entropy: u64::MAX,
            rewind_count: u64::MAX,
        }
    }
}

impl LevelCompletion {
    pub fn is_completed(&self) -> bool {
        self.state == CompletionState::Completed
    }

    /// Fold a won level into the bests
    pub fn merge_win(&mut self, level: &LevelState) {
        self.state = CompletionState::Completed;
        self.frames = self.frames.min(level.frames_executed);
        let extra_items = u64::try_from(-i64::from(level.items_remaining)).unwrap_or(0);
        self.extra_items = self.extra_items.max(extra_items);
        let extra_bombs = u64::try_from(level.red_bombs).unwrap_or(0);
        self.extra_bombs = self.extra_bombs.max(extra_bombs);
        let cleared = level.count_cells_of_type(CellType::Empty) as u64;
        self.cleared_space = self.cleared_space.max(cleared);
        self.attenuated_space = self.attenuated_space.min(level.count_attenuated_space() as u64);
        self.entropy = self.entropy.min(level.compute_entropy() as u64);
        self.rewind_count = self.rewind_count.min(level.rewind_count);
    }
}

/// Completion records for a level pack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub levels: Vec<LevelCompletion>,
}

impl Progress {
    pub fn new(num_levels: usize) -> Self {
        Self { levels: vec![LevelCompletion::default(); num_levels] }
    }

    /// Match the number of levels in the pack, dropping or adding records
    pub fn resize(&mut self, num_levels: usize) {
        self.levels.resize(num_levels, LevelCompletion::default());
    }

    pub fn get(&self, index: usize) -> Option<&LevelCompletion> {
        self.levels.get(index)
    }

    /// Record a win on `index`; returns false if there is no such level
    pub fn record_win(&mut self, index: usize, level: &LevelState) -> bool {
        match self.levels.get_mut(index) {
            Some(record) => {
                record.merge_win(level);
                log::info!(
                    "Level {} completed ({}/{})",
                    index,
                    self.num_completed(),
                    self.levels.len()
                );
                true
            }
            None => false,
        }
    }

    /// Note that a level was started. Returns true if anything changed.
    pub fn mark_attempted(&mut self, index: usize) -> bool {
        match self.levels.get_mut(index) {
            Some(record) if record.state == CompletionState::NotAttempted => {
                record.state = CompletionState::Attempted;
                true
            }
            _ => false,
        }
    }

    pub fn first_incomplete(&self) -> Option<usize> {
        self.levels.iter().position(|l| !l.is_completed())
    }

    pub fn num_completed(&self) -> usize {
        self.levels.iter().filter(|l| l.is_completed()).count()
    }

    pub fn all_completed(&self) -> bool {
        self.levels.iter().all(LevelCompletion::is_completed)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::CellKind;

    fn won_level(frames: u64, items_remaining: i32, red_bombs: i32) -> LevelState {
        let mut level = LevelState::new(5, 5, 1, 1);
        level.frames_executed = frames;
        level.items_remaining = items_remaining;
        level.red_bombs = red_bombs;
        level.player_did_win = true;
        level
    }

    #[test]
    fn test_new_progress_is_blank() {
        let progress = Progress::new(3);
        assert_eq!(progress.first_incomplete(), Some(0));
        assert_eq!(progress.num_completed(), 0);
        assert!(!progress.all_completed());
        assert_eq!(progress.levels[0].frames, u64::MAX);
    }

    #[test]
    fn test_record_win_merges_bests() {
        let mut progress = Progress::new(2);
        assert!(progress.record_win(0, &won_level(100, -2, 1)));
        assert!(progress.record_win(0, &won_level(80, 0, 3)));
        assert!(progress.record_win(0, &won_level(120, -5, -1)));

        let record = progress.levels[0];
        assert_eq!(record.state, CompletionState::Completed);
        assert_eq!(record.frames, 80);
        assert_eq!(record.extra_items, 5);
        assert_eq!(record.extra_bombs, 3);
        assert_eq!(record.rewind_count, 0);
        assert_eq!(progress.first_incomplete(), Some(1));
        assert!(!progress.record_win(5, &won_level(1, 0, 0)));
    }

    #[test]
    fn test_space_stats() {
        let mut level = won_level(10, 0, 0);
        // Interior is 3x3: player plus 8 untouched cells; make two fresh
        level.at_mut(2, 2).kind = CellKind::EMPTY;
        level.at_mut(3, 3).kind = CellKind::EMPTY;

        let mut record = LevelCompletion::default();
        record.merge_win(&level);
        assert_eq!(record.cleared_space, 8);
        assert_eq!(record.attenuated_space, 6);
        assert_eq!(record.entropy, level.compute_entropy() as u64);
    }

    #[test]
    fn test_mark_attempted_never_downgrades() {
        let mut progress = Progress::new(2);
        assert!(progress.mark_attempted(1));
        assert!(!progress.mark_attempted(1));
        progress.record_win(0, &won_level(5, 0, 0));
        assert!(!progress.mark_attempted(0));
        assert_eq!(progress.levels[0].state, CompletionState::Completed);
        assert_eq!(progress.levels[1].state, CompletionState::Attempted);
    }

    #[test]
    fn test_all_completed_and_resize() {
        let mut progress = Progress::new(1);
        progress.record_win(0, &won_level(5, 0, 0));
        assert!(progress.all_completed());
        assert_eq!(progress.first_incomplete(), None);

        progress.resize(3);
        assert_eq!(progress.levels.len(), 3);
        assert_eq!(progress.first_incomplete(), Some(1));
        assert_eq!(progress.num_completed(), 1);
    }
}
