//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One frame per call, no wall-clock time
//! - Fixed scan order (rows bottom-to-top, columns left-to-right)
//! - Every reversible mutation goes through the undo log
//! - No rendering, audio or file I/O

pub mod cell;
pub mod events;
pub mod explosion;
mod player;
pub mod state;
pub mod tick;
pub mod undo;

pub use cell::{Cell, CellKind, CellType, Dude, ExplosionKind, FallState, Impulse, Portal, PortalSpan};
pub use events::Events;
pub use explosion::{ExplosionQueue, PendingExplosion};
pub use state::LevelState;
pub use tick::{TickInput, exec_frame};
pub use undo::{UndoEntry, UndoLog};
