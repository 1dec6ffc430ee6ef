//! Player action resolution
//!
//! Runs once per frame after explosions mature, and only while the player
//! is alive. Cells are addressed by coordinate at every step, so the target,
//! the push destination and the portal landing may overlap safely.

use super::cell::{CellKind, ExplosionKind, Impulse};
use super::events::Events;
use super::explosion::PendingExplosion;
use super::state::LevelState;
use super::undo::UndoEntry;
use crate::consts::TRIGGER_DELAY;

pub(super) fn act(state: &mut LevelState, impulse: Impulse, events: &mut Events) {
    if impulse == Impulse::None {
        return;
    }

    let (dx, dy) = impulse.offset();
    let (px, py) = state.wrap(state.player_x, state.player_y);
    let (tx, ty) = (px + dx, py + dy);
    let target = state.kind_at(tx, ty);

    match target {
        CellKind::Item(_) => {
            *events |= Events::ITEM_COLLECTED;
            state.items_remaining = state.items_remaining.wrapping_sub(1);
            state.undo_log.push(UndoEntry::GetItem);
        }
        CellKind::RedBomb { .. } => {
            *events |= Events::RED_BOMB_COLLECTED;
            state.red_bombs = state.red_bombs.wrapping_add(1);
            state.undo_log.push(UndoEntry::GetRedBomb);
        }
        CellKind::Exit if state.red_bombs >= 0 && state.items_remaining <= 0 => {
            *events |= Events::PLAYER_WON;
            state.player_did_win = true;
            log::info!("level won on frame {}", state.frames_executed);
        }
        _ => {}
    }

    if target.is_portal(impulse) {
        if let Some((lx, ly)) = portal_landing(state, impulse, target.is_jump_portal()) {
            if state.kind_at(lx, ly).is_empty() {
                state.log_cell(lx, ly);
                state.log_cell(px, py);
                state.set(lx, ly, CellKind::Player);
                leave_cell(state, px, py, events);
                move_player(state, lx, ly);
                return;
            }
        }
    }

    if target.is_pushable(impulse) {
        let (bx, by) = (px + 2 * dx, py + 2 * dy);
        if state.kind_at(bx, by).is_empty() {
            *events |= Events::OBJECT_PUSHED;
            state.log_cell(bx, by);
            state.log_cell(tx, ty);
            state.set(bx, by, target);
            state.set(tx, ty, CellKind::EMPTY);
        }
    }

    // Pushing may have emptied the target
    let target = state.kind_at(tx, ty);
    if target.is_pullable() {
        *events |= Events::OBJECT_PUSHED;
        state.log_cell(tx, ty);
        state.log_cell(px, py);
        state.set(tx, ty, CellKind::Player);
        state.set(px, py, target);
        move_player(state, tx, ty);
    } else if target.is_edible() {
        match target {
            CellKind::YellowBombTrigger => trigger_yellow_bombs(state),
            CellKind::Circuit => *events |= Events::CIRCUIT_EATEN,
            _ => {}
        }
        state.log_cell(tx, ty);
        state.log_cell(px, py);
        state.set(tx, ty, CellKind::Player);
        leave_cell(state, px, py, events);
        move_player(state, tx, ty);
    }
}

/// Where a portal in front of the player puts them, if anywhere.
///
/// A plain portal exits on its far side. A jump portal scans onward along
/// the movement axis for the nearest portal accepting the opposite
/// direction and exits just past it.
fn portal_landing(state: &LevelState, impulse: Impulse, jump: bool) -> Option<(i32, i32)> {
    let (dx, dy) = impulse.offset();
    let (px, py) = state.wrap(state.player_x, state.player_y);

    if !jump {
        return Some((px + 2 * dx, py + 2 * dy));
    }

    let back = impulse.opposite();
    let max_dist = (if impulse.is_horizontal() { state.width } else { state.height }) as i32;
    (2..max_dist)
        .find(|z| state.kind_at(px + z * dx, py + z * dy).is_portal(back))
        .map(|z| (px + (z + 1) * dx, py + (z + 1) * dy))
}

/// Fill the cell the player just left, dropping an armed red bomb there
fn leave_cell(state: &mut LevelState, x: i32, y: i32, events: &mut Events) {
    if state.player_will_drop_bomb {
        state.player_will_drop_bomb = false;
        state.red_bombs = state.red_bombs.wrapping_sub(1);
        state.undo_log.push(UndoEntry::DropRedBomb);
        state.set(x, y, CellKind::RedBomb { fuse: 1 });
        *events |= Events::RED_BOMB_DROPPED;
    } else {
        state.set(x, y, CellKind::EMPTY);
    }
}

fn move_player(state: &mut LevelState, x: i32, y: i32) {
    let (x, y) = state.wrap(x, y);
    state.player_x = x;
    state.player_y = y;
}

fn trigger_yellow_bombs(state: &mut LevelState) {
    let (w, h) = (state.width as i32, state.height as i32);
    for y in 0..h {
        for x in 0..w {
            if state.kind_at(x, y) == CellKind::YellowBomb {
                state.schedule_explosion(PendingExplosion {
                    frame: state.frames_executed.saturating_add(TRIGGER_DELAY),
                    x,
                    y,
                    radius: 1,
                    kind: ExplosionKind::Normal,
                });
            }
        }
    }
}
