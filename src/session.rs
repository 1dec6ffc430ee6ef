//! Game session: one level pack being played
//!
//! Owns everything a host needs between frames. Nothing here is global, so
//! any number of sessions may run side by side.

use crate::progress::Progress;
use crate::settings::{Settings, SpeedMode};
use crate::sim::{Events, LevelState, TickInput, exec_frame};

/// What happened on a call to [`Session::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The frame ran; these events fired
    Continue(Events),
    /// The level was won and the session moved on to another level
    Won,
    /// The losing fade finished and the level was restarted
    Lost,
    /// The level has no player and cannot be played
    Corrupt,
}

pub struct Session {
    levels: Vec<LevelState>,
    index: usize,
    level: LevelState,
    /// Whether the level had a player when it was started
    valid: bool,
    progress: Progress,
    speed: SpeedMode,
    lose_buffer_secs: f64,
}

impl Session {
    /// Start on the first level not yet completed. An empty pack is given a
    /// single blank level.
    pub fn new(mut levels: Vec<LevelState>, mut progress: Progress, settings: &Settings) -> Self {
        if levels.is_empty() {
            log::warn!("Level pack is empty, using a blank level");
            levels.push(LevelState::default());
        }
        progress.resize(levels.len());

        let index = progress.first_incomplete().unwrap_or(0);
        let mut session = Self {
            level: levels[index].clone(),
            valid: false,
            levels,
            index,
            progress,
            speed: settings.start_speed,
            lose_buffer_secs: settings.lose_buffer_secs,
        };
        session.start_level();
        session
    }

    /// Advance the live level by one frame
    pub fn step(&mut self, input: TickInput) -> StepOutcome {
        if !self.valid {
            return StepOutcome::Corrupt;
        }
        if self.level.player_is_losing() >= 1.0 {
            self.restart();
            return StepOutcome::Lost;
        }

        let events = exec_frame(&mut self.level, &input);

        if self.level.player_did_win {
            self.progress.record_win(self.index, &self.level);
            let next = self.next_level();
            self.change_level(next);
            return StepOutcome::Won;
        }
        if !self.level.player_is_alive() {
            // The engine drops back to normal speed once the player dies
            self.speed = SpeedMode::Normal;
        }
        if self.level.player_is_losing() >= 1.0 {
            log::info!("Level {} lost, restarting", self.index);
            self.restart();
            return StepOutcome::Lost;
        }
        StepOutcome::Continue(events)
    }

    /// Throw away the current attempt and start the level afresh
    pub fn restart(&mut self) {
        self.start_level();
    }

    /// Switch to another level; returns false if there is no such level
    pub fn change_level(&mut self, index: usize) -> bool {
        if index >= self.levels.len() {
            return false;
        }
        self.index = index;
        self.start_level();
        log::info!("Playing level {} of {}", index, self.levels.len());
        true
    }

    pub fn rewind(&mut self, frames: u64) {
        self.level.rewind_frames(frames);
    }

    pub fn set_speed(&mut self, speed: SpeedMode) {
        self.speed = speed;
        self.level.updates_per_second = speed.updates_per_second();
    }

    pub fn level(&self) -> &LevelState {
        &self.level
    }

    /// Live level, for editing in place
    pub fn level_mut(&mut self) -> &mut LevelState {
        &mut self.level
    }

    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// False if the level had no player when it was started
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn speed(&self) -> SpeedMode {
        self.speed
    }

    fn start_level(&mut self) {
        self.level = self.levels[self.index].clone();
        self.valid = self.level.validate();
        if !self.valid {
            log::warn!("Level {} has no player", self.index);
        }
        self.level.updates_per_second = self.speed.updates_per_second();
        self.level.lose_buffer_secs = self.lose_buffer_secs;
        self.progress.mark_attempted(self.index);
    }

    /// The following level, or the first incomplete one after the last
    fn next_level(&self) -> usize {
        if self.index + 1 < self.levels.len() {
            self.index + 1
        } else {
            self.progress.first_incomplete().unwrap_or(0)
        }
    }
}
