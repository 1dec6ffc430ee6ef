//! Level state: the grid and everything the engine owns alongside it
//!
//! The grid is addressed as a torus. Gameplay borders are walled with blocks,
//! but any coordinate wraps, so rules never need bounds checks.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellKind, CellType};
use super::explosion::{ExplosionQueue, PendingExplosion};
use super::undo::{UndoEntry, UndoLog};
use crate::consts::*;

/// Complete state of one level (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelState {
    pub width: u32,
    pub height: u32,
    pub player_x: i32,
    pub player_y: i32,
    /// Items still needed to open the exit; negative means surplus
    pub items_remaining: i32,
    /// Red bombs carried; negative means debt
    pub red_bombs: i32,
    /// Frames run so far (monotonic except through rewind)
    pub frames_executed: u64,
    /// Tick rate the host is running at; scales the losing fade
    pub updates_per_second: f32,
    /// Seconds the losing fade lasts
    pub lose_buffer_secs: f64,
    /// Armed by input, consumed by the next player move
    pub player_will_drop_bomb: bool,
    pub player_did_win: bool,
    /// Rewinds performed on this attempt
    pub rewind_count: u64,
    /// Frame on which the player was first found dead
    #[serde(default)]
    pub(crate) lose_frame: Option<u64>,
    /// Row-major cells
    pub cells: Vec<Cell>,
    pub explosions: ExplosionQueue,
    pub undo_log: UndoLog,
}

impl Default for LevelState {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, 1, 1)
    }
}

impl LevelState {
    /// Create an empty walled level. A player is placed when both
    /// coordinates are non-negative.
    ///
    /// Panics if either dimension is zero.
    pub fn new(width: u32, height: u32, player_x: i32, player_y: i32) -> Self {
        assert!(width > 0 && height > 0, "level dimensions must be non-zero");

        let cells = vec![Cell::default(); width as usize * height as usize];
        let mut state = Self::from_cells(width, height, cells);

        let (w, h) = (width as i32, height as i32);
        for x in 0..w {
            state.at_mut(x, 0).kind = CellKind::Block;
            state.at_mut(x, h - 1).kind = CellKind::Block;
        }
        for y in 0..h {
            state.at_mut(0, y).kind = CellKind::Block;
            state.at_mut(w - 1, y).kind = CellKind::Block;
        }
        if player_x >= 0 && player_y >= 0 {
            state.at_mut(player_x, player_y).kind = CellKind::Player;
        }
        state.player_x = player_x;
        state.player_y = player_y;
        state
    }

    /// Wrap an existing row-major grid. Counters start at zero and the
    /// player coordinates point at the first player cell, if any.
    ///
    /// Panics if the grid is empty or `cells` does not hold `width * height`
    /// entries.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Cell>) -> Self {
        assert!(width > 0 && height > 0, "level dimensions must be non-zero");
        assert_eq!(cells.len(), width as usize * height as usize, "grid size mismatch");

        let mut state = Self {
            width,
            height,
            player_x: -1,
            player_y: -1,
            items_remaining: 0,
            red_bombs: 0,
            frames_executed: 0,
            updates_per_second: NORMAL_UPDATES_PER_SECOND,
            lose_buffer_secs: LOSE_BUFFER_SECS,
            player_will_drop_bomb: false,
            player_did_win: false,
            rewind_count: 0,
            lose_frame: None,
            cells,
            explosions: ExplosionQueue::new(),
            undo_log: UndoLog::new(),
        };
        state.compute_player_coordinates();
        state.reset_history();
        state
    }

    /// Forget all history: the undo log restarts at the current frame and
    /// the losing fade is cleared. Used after loading or hand-editing.
    pub fn reset_history(&mut self) {
        self.undo_log = UndoLog::starting_at(self.frames_executed);
        self.lose_frame = None;
        for cell in &mut self.cells {
            cell.moved = false;
        }
    }

    /// Wrap a coordinate pair onto the grid
    #[inline]
    pub fn wrap(&self, x: i32, y: i32) -> (i32, i32) {
        (x.rem_euclid(self.width as i32), y.rem_euclid(self.height as i32))
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        let (x, y) = self.wrap(x, y);
        y as usize * self.width as usize + x as usize
    }

    /// Cell at a wrapped coordinate
    #[inline]
    pub fn at(&self, x: i32, y: i32) -> &Cell {
        &self.cells[self.index(x, y)]
    }

    /// Mutable cell at a wrapped coordinate. Writes through here bypass the
    /// undo log; call [`LevelState::compute_player_coordinates`] after
    /// hand-placing a player.
    #[inline]
    pub fn at_mut(&mut self, x: i32, y: i32) -> &mut Cell {
        let i = self.index(x, y);
        &mut self.cells[i]
    }

    #[inline]
    pub fn kind_at(&self, x: i32, y: i32) -> CellKind {
        self.at(x, y).kind
    }

    /// Record the current contents of a cell before overwriting it
    pub(crate) fn log_cell(&mut self, x: i32, y: i32) {
        let (x, y) = self.wrap(x, y);
        let prior = self.kind_at(x, y);
        self.undo_log.push(UndoEntry::Cell { x, y, prior });
    }

    /// Overwrite a cell's contents, leaving it unmarked
    pub(crate) fn set(&mut self, x: i32, y: i32, kind: CellKind) {
        *self.at_mut(x, y) = Cell::new(kind);
    }

    /// Overwrite a cell with an object that moved there this frame
    pub(crate) fn place_moved(&mut self, x: i32, y: i32, kind: CellKind) {
        *self.at_mut(x, y) = Cell { kind, moved: true };
    }

    /// Schedule a detonation and record it for undo
    pub(crate) fn schedule_explosion(&mut self, explosion: PendingExplosion) {
        log::debug!(
            "frame {}: explosion scheduled at ({}, {}) for frame {}",
            self.frames_executed,
            explosion.x,
            explosion.y,
            explosion.frame
        );
        self.explosions.push(explosion);
        self.undo_log.push(UndoEntry::CreateExplosion(explosion));
    }

    pub fn player_is_alive(&self) -> bool {
        self.kind_at(self.player_x, self.player_y) == CellKind::Player
    }

    /// Progress of the losing fade in `0.0..=1.0`; 0 while the player lives
    pub fn player_is_losing(&self) -> f64 {
        if self.player_is_alive() {
            return 0.0;
        }
        let Some(lose_frame) = self.lose_frame else {
            return 0.0;
        };
        if lose_frame > self.frames_executed {
            return 0.0;
        }

        let buffer = self.lose_buffer_secs * f64::from(self.updates_per_second);
        let lose_end = (lose_frame as f64 + buffer) as u64;
        if self.frames_executed >= lose_end {
            return 1.0;
        }
        (self.frames_executed - lose_frame) as f64 / (lose_end - lose_frame) as f64
    }

    /// A level is playable only if it contains a player
    pub fn validate(&self) -> bool {
        self.cells.iter().any(|c| c.cell_type() == CellType::Player)
    }

    /// Items obtainable in the level, counting item blasts at their full yield
    pub fn count_items(&self) -> usize {
        self.cells
            .iter()
            .map(|c| match c.cell_type() {
                CellType::Item => 1,
                CellType::ItemDude | CellType::BlueBomb => ITEMS_PER_ITEM_BLAST,
                _ => 0,
            })
            .sum()
    }

    pub fn count_cells_of_type(&self, ty: CellType) -> usize {
        self.cells.iter().filter(|c| c.cell_type() == ty).count()
    }

    /// Empty cells whose attenuation counter has started
    pub fn count_attenuated_space(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c.kind, CellKind::Empty { attenuation } if attenuation > 0))
            .count()
    }

    /// Number of horizontally or vertically adjacent pairs of different
    /// type, including pairs that wrap around the edges
    pub fn compute_entropy(&self) -> usize {
        let (w, h) = (self.width as i32, self.height as i32);
        let mut entropy = 0;
        for y in 0..h {
            for x in 0..w {
                let ty = self.at(x, y).cell_type();
                entropy += usize::from(ty != self.at(x + 1, y).cell_type());
                entropy += usize::from(ty != self.at(x, y + 1).cell_type());
            }
        }
        entropy
    }

    /// Point `player_x/y` at the first player cell in reading order.
    /// Returns false (leaving the coordinates alone) if there is none.
    pub fn compute_player_coordinates(&mut self) -> bool {
        match self.cells.iter().position(|c| c.cell_type() == CellType::Player) {
            Some(i) => {
                self.player_x = (i % self.width as usize) as i32;
                self.player_y = (i / self.width as usize) as i32;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for LevelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            let line: String = row.iter().map(|c| c.cell_type().glyph()).collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cell::{Dude, FallState, Impulse};

    #[test]
    fn test_new_level_is_walled() {
        let state = LevelState::new(5, 4, 2, 1);
        for x in 0..5 {
            assert_eq!(state.kind_at(x, 0), CellKind::Block);
            assert_eq!(state.kind_at(x, 3), CellKind::Block);
        }
        assert_eq!(state.kind_at(0, 2), CellKind::Block);
        assert_eq!(state.kind_at(4, 2), CellKind::Block);
        assert_eq!(state.kind_at(2, 1), CellKind::Player);
        assert_eq!(state.kind_at(1, 2), CellKind::Empty { attenuation: 1 });
        assert!(state.player_is_alive());
        assert!(state.validate());
        assert_eq!(state.undo_log.len(), 1);
    }

    #[test]
    fn test_no_player_when_negative() {
        let state = LevelState::new(5, 5, -1, -1);
        assert!(!state.validate());
        assert_eq!(state.count_cells_of_type(CellType::Player), 0);
    }

    #[test]
    #[should_panic]
    fn test_zero_size_panics() {
        let _ = LevelState::new(0, 5, 1, 1);
    }

    #[test]
    fn test_wraparound_addressing() {
        let mut state = LevelState::new(6, 4, 1, 1);
        state.at_mut(-1, -1).kind = CellKind::Exit;
        assert_eq!(state.kind_at(5, 3), CellKind::Exit);
        assert_eq!(state.kind_at(11, 7), CellKind::Exit);
        assert_eq!(state.wrap(-7, 9), (5, 1));
    }

    #[test]
    fn test_counting_queries() {
        let mut state = LevelState::new(8, 5, 1, 1);
        state.at_mut(2, 2).kind = CellKind::Item(FallState::Resting);
        state.at_mut(3, 2).kind = CellKind::BlueBomb(FallState::Resting);
        state.at_mut(4, 2).kind = CellKind::ItemDude(Dude::facing(Impulse::Left));
        state.at_mut(5, 2).kind = CellKind::EMPTY;
        assert_eq!(state.count_items(), 19);
        assert_eq!(state.count_cells_of_type(CellType::Block), 22);
        // 18 interior cells minus player, three objects and one fresh cell
        assert_eq!(state.count_attenuated_space(), 13);
    }

    #[test]
    fn test_entropy_counts_wrapping_pairs() {
        let mut state = LevelState::new(3, 3, -1, -1);
        // Ring of blocks around one untouched space
        assert_eq!(state.compute_entropy(), 4);
        state.at_mut(1, 1).kind = CellKind::Block;
        assert_eq!(state.compute_entropy(), 0);
    }

    #[test]
    fn test_compute_player_coordinates() {
        let mut state = LevelState::new(6, 6, -1, -1);
        assert!(!state.compute_player_coordinates());
        state.at_mut(3, 4).kind = CellKind::Player;
        assert!(state.compute_player_coordinates());
        assert_eq!((state.player_x, state.player_y), (3, 4));
    }

    #[test]
    fn test_losing_fade() {
        let mut state = LevelState::new(5, 5, 2, 2);
        assert_eq!(state.player_is_losing(), 0.0);

        state.at_mut(2, 2).kind = CellKind::EMPTY;
        assert_eq!(state.player_is_losing(), 0.0);

        state.lose_frame = Some(10);
        state.frames_executed = 15;
        assert!((state.player_is_losing() - 0.25).abs() < 1e-9);
        state.frames_executed = 30;
        assert_eq!(state.player_is_losing(), 1.0);
        state.frames_executed = 9;
        assert_eq!(state.player_is_losing(), 0.0);
    }

    #[test]
    fn test_display_renders_glyphs() {
        let mut state = LevelState::new(4, 3, 1, 1);
        state.at_mut(2, 1).kind = CellKind::Exit;
        assert_eq!(state.to_string(), "####\n#@E#\n####\n");
    }
}
