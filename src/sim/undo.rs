//! Undo log and rewind
//!
//! Every reversible mutation made by a frame is appended here before it
//! happens, and each frame is closed by a `FrameMarker`. Rewinding pops
//! entries from the tail and applies their inverses, so no frame is ever
//! simulated forward again.
//!
//! Two mutations are not logged: the `moved` flag, which never survives a
//! frame, and attenuation of empty space, which stays put across rewinds.

use serde::{Deserialize, Serialize};

use super::cell::CellKind;
use super::explosion::PendingExplosion;
use super::state::LevelState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndoEntry {
    /// Closes frame `n`; the state here is the state after `n` frames
    FrameMarker(u64),
    /// A cell is about to be overwritten; `prior` is what it held
    Cell { x: i32, y: i32, prior: CellKind },
    CreateExplosion(PendingExplosion),
    ExecuteExplosion(PendingExplosion),
    GetItem,
    GetRedBomb,
    DropRedBomb,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose history begins at `frame`
    pub fn starting_at(frame: u64) -> Self {
        Self { entries: vec![UndoEntry::FrameMarker(frame)] }
    }

    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub fn last(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }

    fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UndoEntry> {
        self.entries.iter()
    }

    /// Number of frame markers; one per frame plus the starting marker
    pub fn frame_markers(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, UndoEntry::FrameMarker(_)))
            .count()
    }
}

impl LevelState {
    /// Rewind `count` frames, stopping at the oldest recorded frame
    pub fn rewind_frames(&mut self, count: u64) {
        self.rewind_frames_until(self.frames_executed.saturating_sub(count));
    }

    /// Rewind to the end of `target_frame`, or to the oldest recorded frame
    /// if the log does not reach back that far
    pub fn rewind_frames_until(&mut self, target_frame: u64) {
        let start_frame = self.frames_executed;

        loop {
            match self.undo_log.last() {
                None => break,
                Some(UndoEntry::FrameMarker(f)) if *f <= target_frame => break,
                Some(UndoEntry::FrameMarker(_)) if self.undo_log.len() == 1 => break,
                Some(_) => {}
            }
            let Some(entry) = self.undo_log.pop() else {
                break;
            };
            self.undo_entry(entry);
        }

        if let Some(UndoEntry::FrameMarker(f)) = self.undo_log.last() {
            self.frames_executed = *f;
        }
        if self.frames_executed < start_frame {
            self.rewind_count += 1;
            log::debug!("rewound from frame {} to {}", start_frame, self.frames_executed);
        }
    }

    fn undo_entry(&mut self, entry: UndoEntry) {
        match entry {
            UndoEntry::FrameMarker(_) => {}
            UndoEntry::Cell { x, y, prior } => {
                self.set(x, y, prior);
                if prior == CellKind::Player {
                    self.player_x = x;
                    self.player_y = y;
                    self.lose_frame = None;
                }
            }
            UndoEntry::CreateExplosion(explosion) => {
                self.explosions.remove_first(&explosion);
            }
            UndoEntry::ExecuteExplosion(explosion) => self.explosions.push(explosion),
            UndoEntry::GetItem => self.items_remaining = self.items_remaining.wrapping_add(1),
            UndoEntry::GetRedBomb => self.red_bombs = self.red_bombs.wrapping_sub(1),
            UndoEntry::DropRedBomb => self.red_bombs = self.red_bombs.wrapping_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cell::{Dude, ExplosionKind, FallState, Impulse};
    use crate::sim::events::Events;
    use crate::sim::tick::{TickInput, exec_frame};
    use proptest::prelude::*;

    fn go(impulse: Impulse) -> TickInput {
        TickInput { impulse, ..Default::default() }
    }

    /// Everything rewind promises to restore, with attenuation masked out
    #[derive(Debug, PartialEq)]
    struct Snapshot {
        cells: Vec<CellKind>,
        player: (i32, i32),
        items_remaining: i32,
        red_bombs: i32,
        frames_executed: u64,
        explosions: Vec<PendingExplosion>,
    }

    fn snapshot(state: &LevelState) -> Snapshot {
        Snapshot {
            cells: state
                .cells
                .iter()
                .map(|c| match c.kind {
                    CellKind::Empty { .. } => CellKind::EMPTY,
                    other => other,
                })
                .collect(),
            player: (state.player_x, state.player_y),
            items_remaining: state.items_remaining,
            red_bombs: state.red_bombs,
            frames_executed: state.frames_executed,
            explosions: state.explosions.sorted(),
        }
    }

    /// A busy level with something of every rule to do and no exit
    fn busy_level() -> LevelState {
        let mut state = LevelState::new(14, 10, 6, 6);
        let objects = [
            (2, 1, CellKind::Rock(FallState::Resting)),
            (3, 1, CellKind::GreenBomb(FallState::Resting)),
            (4, 2, CellKind::Item(FallState::Resting)),
            (4, 4, CellKind::RoundBlock),
            (2, 7, CellKind::BombDude(Dude::facing(Impulse::Left))),
            (10, 3, CellKind::ItemDude(Dude::facing(Impulse::Up))),
            (7, 6, CellKind::Rock(FallState::Resting)),
            (5, 6, CellKind::RedBomb { fuse: 0 }),
            (6, 5, CellKind::Circuit),
            (8, 5, CellKind::YellowBombTrigger),
            (11, 7, CellKind::YellowBomb),
            (9, 8, CellKind::PullStone),
            (12, 1, CellKind::RockGenerator { charge: 0 }),
            (1, 8, CellKind::GrayBomb(FallState::Resting)),
            (6, 8, CellKind::Portal(crate::sim::cell::Portal {
                span: crate::sim::cell::PortalSpan::Vertical,
                jump: false,
            })),
            (3, 5, CellKind::RedBomb { fuse: 32 }),
        ];
        for (x, y, kind) in objects {
            state.at_mut(x, y).kind = kind;
        }
        state.items_remaining = 3;
        state.reset_history();
        state
    }

    fn impulse_strategy() -> impl Strategy<Value = TickInput> {
        (0u8..5, any::<bool>()).prop_map(|(code, drop_bomb)| TickInput {
            impulse: Impulse::from_code(code).unwrap_or_default(),
            drop_bomb,
        })
    }

    #[test]
    fn test_marker_per_frame() {
        let mut state = LevelState::new(8, 8, 3, 3);
        for _ in 0..5 {
            exec_frame(&mut state, &TickInput::default());
        }
        assert_eq!(state.frames_executed, 5);
        assert_eq!(state.undo_log.frame_markers(), 6);
        assert_eq!(state.undo_log.last(), Some(&UndoEntry::FrameMarker(5)));

        state.rewind_frames_until(0);
        assert_eq!(state.frames_executed, 0);
        assert_eq!(state.undo_log.frame_markers(), 1);
    }

    #[test]
    fn test_rewind_restores_walk_and_collection() {
        let mut state = LevelState::new(8, 5, 1, 2);
        // The item sits on a block so it is still there when collected
        state.at_mut(2, 2).kind = CellKind::Item(FallState::Resting);
        state.at_mut(2, 3).kind = CellKind::Block;
        state.at_mut(3, 2).kind = CellKind::RedBomb { fuse: 0 };
        state.items_remaining = 1;
        state.reset_history();
        let before = snapshot(&state);

        let events = exec_frame(&mut state, &go(Impulse::Right));
        assert!(events.contains(Events::ITEM_COLLECTED));
        assert!(state.undo_log.iter().any(|e| *e == UndoEntry::GetItem));
        exec_frame(&mut state, &go(Impulse::Right));
        assert_eq!((state.player_x, state.player_y), (3, 2));
        assert_eq!(state.items_remaining, 0);
        assert_eq!(state.red_bombs, 1);

        state.rewind_frames(1);
        assert_eq!(state.frames_executed, 1);
        assert_eq!(state.red_bombs, 0);
        assert_eq!((state.player_x, state.player_y), (2, 2));

        state.rewind_frames(10);
        assert_eq!(snapshot(&state), before);
        assert_eq!(state.rewind_count, 2);
    }

    #[test]
    fn test_rewind_undoes_pending_and_matured_explosions() {
        let mut state = LevelState::new(9, 9, 1, 1);
        state.at_mut(4, 2).kind = CellKind::GreenBomb(FallState::Resting);
        state.reset_history();
        let before = snapshot(&state);

        // Falls to the floor, lands, detonates two frames after landing
        for _ in 0..12 {
            exec_frame(&mut state, &TickInput::default());
        }
        assert!(state.explosions.is_empty());
        assert_ne!(snapshot(&state), before);

        state.rewind_frames_until(0);
        assert_eq!(snapshot(&state), before);
    }

    #[test]
    fn test_rewind_past_oldest_frame_stops_there() {
        let mut state = LevelState::new(6, 6, 2, 2);
        state.frames_executed = 40;
        state.reset_history();
        exec_frame(&mut state, &go(Impulse::Down));
        exec_frame(&mut state, &go(Impulse::Down));

        state.rewind_frames_until(3);
        assert_eq!(state.frames_executed, 40);
        assert_eq!((state.player_x, state.player_y), (2, 2));
        assert_eq!(state.undo_log.len(), 1);
    }

    #[test]
    fn test_rewind_does_not_count_noop() {
        let mut state = LevelState::new(6, 6, 2, 2);
        state.rewind_frames(3);
        assert_eq!(state.rewind_count, 0);
    }

    #[test]
    fn test_rewind_revives_player() {
        let mut state = LevelState::new(7, 7, 3, 4);
        state.at_mut(3, 2).kind = CellKind::Rock(FallState::Resting);
        state.reset_history();

        // Rock falls onto the player and crushes it
        for _ in 0..4 {
            exec_frame(&mut state, &TickInput::default());
        }
        assert!(!state.player_is_alive());
        assert!(state.lose_frame.is_some());

        state.rewind_frames_until(0);
        assert!(state.player_is_alive());
        assert_eq!(state.lose_frame, None);
        assert_eq!(state.player_is_losing(), 0.0);
    }

    #[test]
    fn test_first_matching_explosion_removed() {
        let mut state = LevelState::new(6, 6, 2, 2);
        let e = PendingExplosion { frame: 9, x: 1, y: 1, radius: 1, kind: ExplosionKind::Normal };
        state.explosions.push(e);
        state.schedule_explosion(e);
        state.undo_log.push(UndoEntry::FrameMarker(1));
        state.frames_executed = 1;

        state.rewind_frames_until(0);
        assert_eq!(state.explosions.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_rewind_is_inverse_of_exec(
            prefix in prop::collection::vec(impulse_strategy(), 0..20),
            inputs in prop::collection::vec(impulse_strategy(), 1..40),
        ) {
            let mut state = busy_level();
            for input in &prefix {
                exec_frame(&mut state, input);
            }
            let before = snapshot(&state);

            for input in &inputs {
                exec_frame(&mut state, input);
            }
            state.rewind_frames(inputs.len() as u64);

            prop_assert_eq!(snapshot(&state), before);
            prop_assert_eq!(
                state.undo_log.frame_markers() as u64,
                prefix.len() as u64 + 1
            );
        }
    }
}
