//! Move Blocks and Eat Stuff - a tile puzzle with exact rewind
//!
//! Core modules:
//! - `sim`: Deterministic level simulation (cells, physics rules, explosions, undo log)
//! - `persistence`: Binary level files, completion records and input recordings
//! - `progress`: Per-level completion tracking
//! - `settings`: Host preferences and speed modes
//! - `session`: An owned game session driving levels one frame at a time

pub mod persistence;
pub mod progress;
pub mod session;
pub mod settings;
pub mod sim;

pub use progress::{CompletionState, LevelCompletion, Progress};
pub use session::{Session, StepOutcome};
pub use settings::{Settings, SpeedMode};

/// Game configuration constants
pub mod consts {
    /// Fuse added to an armed red bomb each frame
    pub const FUSE_STEP: i32 = 16;
    /// Fuse value at which a red bomb detonates
    pub const DETONATION_THRESHOLD: i32 = 256;

    /// Brightness of a freshly exploded cell
    pub const EXPLOSION_BRIGHTNESS: i32 = 255;
    /// Brightness lost by an explosion cell each frame
    pub const EXPLOSION_DECAY: i32 = 16;

    /// Empty space at or above this counter is fully attenuated ("dark")
    pub const ATTENUATION_SATURATION: i32 = 256;
    /// Counter of space laid out by the editor; it darkens on its own
    pub const UNTOUCHED_ATTENUATION: i32 = 1;

    /// A falling bomb detonates this many frames after it lands
    pub const BOMB_LANDING_DELAY: u64 = 2;
    /// Volatile cells caught in a blast detonate this many frames later
    pub const CHAIN_DELAY: u64 = 6;
    /// Yellow bombs detonate on the frame after the trigger is eaten
    pub const TRIGGER_DELAY: u64 = 1;

    /// Open frames a rock generator charges before dropping a rock
    pub const ROCK_GENERATOR_PERIOD: i32 = 16;

    /// Items produced by an item blast (3x3)
    pub const ITEMS_PER_ITEM_BLAST: usize = 9;

    /// Default level dimensions
    pub const DEFAULT_WIDTH: u32 = 60;
    pub const DEFAULT_HEIGHT: u32 = 24;

    /// Tick rates for the host's speed modes
    pub const NORMAL_UPDATES_PER_SECOND: f32 = 20.0;
    pub const SLOW_UPDATES_PER_SECOND: f32 = 2.0;
    pub const FAST_UPDATES_PER_SECOND: f32 = 200.0;

    /// Seconds the losing fade lasts before the level restarts
    pub const LOSE_BUFFER_SECS: f64 = 1.0;
}
