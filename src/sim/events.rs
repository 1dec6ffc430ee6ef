//! Per-frame event mask consumed by the host for sound cues

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Things that happened during one frame; hosts map them to sounds
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Events: u32 {
        const OBJECT_FALLING = 0x001;
        const OBJECT_LANDED = 0x002;
        const ITEM_COLLECTED = 0x004;
        const CIRCUIT_EATEN = 0x008;
        const RED_BOMB_COLLECTED = 0x010;
        const RED_BOMB_DROPPED = 0x020;
        const OBJECT_PUSHED = 0x040;
        const EXPLODED = 0x080;
        const ITEM_EXPLODED = 0x100;
        const PLAYER_WON = 0x200;
    }
}

impl Events {
    /// Short lowercase names of the set bits, in bit order
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names()
            .map(|(name, _)| match name {
                "OBJECT_FALLING" => "falling",
                "OBJECT_LANDED" => "landed",
                "ITEM_COLLECTED" => "item",
                "CIRCUIT_EATEN" => "circuit",
                "RED_BOMB_COLLECTED" => "red_bomb",
                "RED_BOMB_DROPPED" => "drop",
                "OBJECT_PUSHED" => "push",
                "EXPLODED" => "explode",
                "ITEM_EXPLODED" => "item_explode",
                "PLAYER_WON" => "win",
                _ => "unknown",
            })
            .collect()
    }
}
