//! One frame of simulation
//!
//! The grid is scanned rows bottom-to-top, columns left-to-right, and each
//! visited cell goes through the rules in a fixed order. A rule re-reads the
//! cell, so it sees whatever the previous rule left behind. The scan order is
//! what makes a falling object land in the same pass it falls; changing it
//! changes the physics.

use super::cell::{CellKind, Dude, ExplosionKind, FallState, Impulse};
use super::events::Events;
use super::explosion::PendingExplosion;
use super::player;
use super::state::LevelState;
use super::undo::UndoEntry;
use crate::consts::*;

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Direction the player tries to move this frame
    pub impulse: Impulse,
    /// Arm a red bomb drop; it happens on the next successful move
    pub drop_bomb: bool,
}

/// Advance the level by exactly one frame and report what happened
pub fn exec_frame(state: &mut LevelState, input: &TickInput) -> Events {
    let mut events = Events::empty();

    if input.drop_bomb {
        state.player_will_drop_bomb = true;
    }

    let (w, h) = (state.width as i32, state.height as i32);
    for y in (0..h).rev() {
        for x in 0..w {
            decay_explosion(state, x, y);
            destroy_from_below(state, x, y);
            burn_fuse(state, x, y);
            attenuate_space(state, x, y);
            fall(state, x, y, &mut events);
            roll(state, x, y);
            walk_dude(state, x, y);
            generate_rock(state, x, y);
        }
    }

    detonate_due(state, &mut events);

    if state.player_is_alive() {
        player::act(state, input.impulse, &mut events);
    } else if state.lose_frame.is_none() {
        log::debug!("frame {}: player lost", state.frames_executed);
        state.lose_frame = Some(state.frames_executed);
        state.updates_per_second = NORMAL_UPDATES_PER_SECOND;
    }

    for cell in &mut state.cells {
        cell.moved = false;
    }
    state.frames_executed += 1;
    state
        .undo_log
        .push(UndoEntry::FrameMarker(state.frames_executed));

    if !events.is_empty() {
        log::trace!("frame {}: {:?}", state.frames_executed, events);
    }
    events
}

fn decay_explosion(state: &mut LevelState, x: i32, y: i32) {
    if let CellKind::Explosion { brightness } = state.kind_at(x, y) {
        state.log_cell(x, y);
        let brightness = brightness.saturating_sub(EXPLOSION_DECAY);
        let next = if brightness <= 0 {
            CellKind::EMPTY
        } else {
            CellKind::Explosion { brightness }
        };
        state.at_mut(x, y).kind = next;
    }
}

/// Destroyers blow up whatever sits on them; deleters silently erase it
fn destroy_from_below(state: &mut LevelState, x: i32, y: i32) {
    let here = state.kind_at(x, y);
    if !matches!(here, CellKind::Destroyer | CellKind::Deleter) {
        return;
    }
    let above = state.kind_at(x, y - 1);
    if above.is_empty() || matches!(above, CellKind::Explosion { .. }) {
        return;
    }

    if here == CellKind::Destroyer {
        state.schedule_explosion(PendingExplosion {
            frame: state.frames_executed,
            x,
            y: y - 1,
            radius: 0,
            kind: ExplosionKind::Normal,
        });
    } else {
        state.log_cell(x, y - 1);
        state.set(x, y - 1, CellKind::EMPTY);
    }
}

fn burn_fuse(state: &mut LevelState, x: i32, y: i32) {
    let CellKind::RedBomb { fuse } = state.kind_at(x, y) else {
        return;
    };
    if fuse == 0 {
        return;
    }

    state.log_cell(x, y);
    let fuse = fuse.saturating_add(FUSE_STEP);
    state.at_mut(x, y).kind = CellKind::RedBomb { fuse };
    if fuse >= DETONATION_THRESHOLD {
        state.schedule_explosion(PendingExplosion {
            frame: state.frames_executed,
            x,
            y,
            radius: 1,
            kind: ExplosionKind::Normal,
        });
    }
}

/// Empty space darkens once it has started, and spreads the darkening to
/// fresh neighbours. Not logged, so rewinding never undoes it.
fn attenuate_space(state: &mut LevelState, x: i32, y: i32) {
    let CellKind::Empty { attenuation } = state.kind_at(x, y) else {
        return;
    };

    let ramping = attenuation != 0 && attenuation < ATTENUATION_SATURATION;
    let spreading = Impulse::DIRECTIONS.iter().any(|dir| {
        let (dx, dy) = dir.offset();
        matches!(state.kind_at(x + dx, y + dy), CellKind::Empty { attenuation } if attenuation != 0)
    });
    if ramping || spreading {
        state.at_mut(x, y).kind = CellKind::Empty {
            attenuation: attenuation.saturating_add(1),
        };
    }
}

fn fall(state: &mut LevelState, x: i32, y: i32, events: &mut Events) {
    let cell = *state.at(x, y);
    if !cell.kind.should_fall() || cell.moved {
        return;
    }
    let below = state.kind_at(x, y + 1);
    let falling = cell.kind.is_falling();

    if below.is_empty() {
        *events |= Events::OBJECT_FALLING;
        state.log_cell(x, y + 1);
        state.log_cell(x, y);
        state.place_moved(x, y + 1, cell.kind.with_fall(FallState::Falling));
        state.set(x, y, CellKind::EMPTY);
    } else if below.is_volatile() && falling {
        state.schedule_explosion(PendingExplosion {
            frame: state.frames_executed,
            x,
            y: y + 1,
            radius: 1,
            kind: cell.kind.explosion_kind(),
        });
    } else if cell.kind.is_bomb() && falling {
        state.schedule_explosion(PendingExplosion {
            frame: state.frames_executed.saturating_add(BOMB_LANDING_DELAY),
            x,
            y,
            radius: 1,
            kind: cell.kind.explosion_kind(),
        });
        *events |= Events::OBJECT_LANDED;
        state.log_cell(x, y);
        state.at_mut(x, y).kind = cell.kind.with_fall(FallState::Resting);
    } else if falling {
        state.log_cell(x, y);
        *events |= Events::OBJECT_LANDED;
        state.at_mut(x, y).kind = cell.kind.with_fall(FallState::Resting);
    }
}

/// Round fallers slide off round things when both the side and the space
/// below the side are open, trying left before right
fn roll(state: &mut LevelState, x: i32, y: i32) {
    let cell = *state.at(x, y);
    if !cell.kind.should_fall()
        || !cell.kind.is_round()
        || !state.kind_at(x, y + 1).is_round()
        || cell.moved
    {
        return;
    }

    for dx in [-1, 1] {
        if state.kind_at(x + dx, y).is_empty() && state.kind_at(x + dx, y + 1).is_empty() {
            state.log_cell(x + dx, y);
            state.log_cell(x, y);
            state.place_moved(x + dx, y, cell.kind.with_fall(FallState::Resting));
            state.set(x, y, CellKind::EMPTY);
            return;
        }
    }
}

/// Dudes follow the wall on their left
fn walk_dude(state: &mut LevelState, x: i32, y: i32) {
    let cell = *state.at(x, y);
    let Some(dude) = cell.kind.dude() else {
        return;
    };
    if cell.moved {
        return;
    }

    state.log_cell(x, y);

    let left = dude.facing.left_turn();
    let (lx, ly) = left.offset();
    let (fx, fy) = dude.facing.offset();

    if dude.checks_left() && state.kind_at(x + lx, y + ly).is_empty() {
        let turned = Dude { facing: left, just_turned: true };
        state.at_mut(x, y).kind = cell.kind.with_dude(turned);
    } else if state.kind_at(x + fx, y + fy).is_empty() {
        state.log_cell(x + fx, y + fy);
        let walked = Dude { facing: dude.facing, just_turned: false };
        state.place_moved(x + fx, y + fy, cell.kind.with_dude(walked));
        state.set(x, y, CellKind::EMPTY);
    } else {
        let turned = Dude { facing: dude.facing.right_turn(), just_turned: false };
        state.at_mut(x, y).kind = cell.kind.with_dude(turned);
    }
}

fn generate_rock(state: &mut LevelState, x: i32, y: i32) {
    let CellKind::RockGenerator { charge } = state.kind_at(x, y) else {
        return;
    };

    if !state.kind_at(x, y + 1).is_empty() {
        if charge != 0 {
            state.log_cell(x, y);
            state.at_mut(x, y).kind = CellKind::RockGenerator { charge: 0 };
        }
        return;
    }

    state.log_cell(x, y);
    if charge >= ROCK_GENERATOR_PERIOD {
        state.log_cell(x, y + 1);
        state.set(x, y + 1, CellKind::Rock(FallState::Resting));
        state.at_mut(x, y).kind = CellKind::RockGenerator { charge: 0 };
    } else {
        state.at_mut(x, y).kind = CellKind::RockGenerator { charge: charge + 1 };
    }
}

/// Detonate every explosion maturing this frame, in queue order
fn detonate_due(state: &mut LevelState, events: &mut Events) {
    let now = state.frames_executed;
    for explosion in state.explosions.take_due(now) {
        *events |= if explosion.kind == ExplosionKind::Item {
            Events::ITEM_EXPLODED
        } else {
            Events::EXPLODED
        };

        // Past the grid extent a blast only revisits cells it already covered
        let r = explosion.radius.min(state.width.max(state.height) as i32);
        let (ex, ey) = state.wrap(explosion.x, explosion.y);
        for dy in -r..=r {
            for dx in -r..=r {
                let (cx, cy) = (ex + dx, ey + dy);
                let victim = state.kind_at(cx, cy);
                if !victim.destroyable() {
                    continue;
                }
                if (dx != 0 || dy != 0) && victim.is_volatile() {
                    let kind = match explosion.kind {
                        ExplosionKind::Normal => victim.explosion_kind(),
                        inherited => inherited,
                    };
                    state.schedule_explosion(PendingExplosion {
                        frame: now.saturating_add(CHAIN_DELAY),
                        x: cx,
                        y: cy,
                        radius: 1,
                        kind,
                    });
                }
                state.log_cell(cx, cy);
                state.set(cx, cy, explosion.kind.product());
            }
        }

        state.undo_log.push(UndoEntry::ExecuteExplosion(explosion));
    }
}
