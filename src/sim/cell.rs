//! Cell data model
//!
//! A cell is a kind with a per-kind payload plus a transient `moved` flag.
//! Every predicate depends only on the kind's [`CellType`]; the rest of the
//! engine queries them and never mutates through them.
//!
//! On disk a cell is a `(type, param)` pair of `i32`s where `param` means
//! something different for each type. [`CellKind::to_raw`] and
//! [`CellKind::from_raw`] are the only places that know those meanings.

use serde::{Deserialize, Serialize};

use crate::consts::UNTOUCHED_ATTENUATION;

/// Player movement impulse for one frame; also the facing of a dude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Impulse {
    #[default]
    None = 0,
    Up = 1,
    Down = 2,
    Left = 3,
    Right = 4,
}

impl Impulse {
    pub const DIRECTIONS: [Impulse; 4] = [Impulse::Up, Impulse::Down, Impulse::Left, Impulse::Right];

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Impulse::None),
            1 => Some(Impulse::Up),
            2 => Some(Impulse::Down),
            3 => Some(Impulse::Left),
            4 => Some(Impulse::Right),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// One step in this direction (y grows downward)
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Impulse::None => (0, 0),
            Impulse::Up => (0, -1),
            Impulse::Down => (0, 1),
            Impulse::Left => (-1, 0),
            Impulse::Right => (1, 0),
        }
    }

    /// Heading after turning counter-clockwise
    pub fn left_turn(self) -> Self {
        match self {
            Impulse::None => Impulse::None,
            Impulse::Up => Impulse::Left,
            Impulse::Down => Impulse::Right,
            Impulse::Left => Impulse::Down,
            Impulse::Right => Impulse::Up,
        }
    }

    /// Heading after turning clockwise
    pub fn right_turn(self) -> Self {
        match self {
            Impulse::None => Impulse::None,
            Impulse::Up => Impulse::Right,
            Impulse::Down => Impulse::Left,
            Impulse::Left => Impulse::Up,
            Impulse::Right => Impulse::Down,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Impulse::None => Impulse::None,
            Impulse::Up => Impulse::Down,
            Impulse::Down => Impulse::Up,
            Impulse::Left => Impulse::Right,
            Impulse::Right => Impulse::Left,
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Impulse::Left | Impulse::Right)
    }
}

/// Fall state of rocks, items and falling bombs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FallState {
    #[default]
    Resting,
    Falling,
}

impl FallState {
    fn from_param(param: i32) -> Self {
        if param == 1 { FallState::Falling } else { FallState::Resting }
    }

    fn param(self) -> i32 {
        match self {
            FallState::Resting => 0,
            FallState::Falling => 1,
        }
    }
}

/// Wall-following state of a dude
///
/// A dude that has just turned left moves forward before it looks left
/// again; otherwise it checks its left side first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dude {
    pub facing: Impulse,
    pub just_turned: bool,
}

impl Dude {
    pub fn facing(facing: Impulse) -> Self {
        Self { facing, just_turned: false }
    }

    /// Whether the next step should look for an opening on the left
    #[inline]
    pub fn checks_left(&self) -> bool {
        self.param() > 0
    }

    fn from_param(param: i32) -> Self {
        let facing = u8::try_from(param.unsigned_abs())
            .ok()
            .and_then(Impulse::from_code)
            .unwrap_or_default();
        Self { facing, just_turned: param < 0 }
    }

    fn param(&self) -> i32 {
        let code = i32::from(self.facing.code());
        if self.just_turned { -code } else { code }
    }
}

/// Which movement directions a portal lets the player through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalSpan {
    Left,
    Right,
    Up,
    Down,
    Horizontal,
    Vertical,
    Omni,
}

impl PortalSpan {
    pub fn accepts(self, dir: Impulse) -> bool {
        match self {
            PortalSpan::Omni => true,
            PortalSpan::Left => dir == Impulse::Left,
            PortalSpan::Right => dir == Impulse::Right,
            PortalSpan::Up => dir == Impulse::Up,
            PortalSpan::Down => dir == Impulse::Down,
            PortalSpan::Horizontal => matches!(dir, Impulse::Left | Impulse::Right),
            PortalSpan::Vertical => matches!(dir, Impulse::Up | Impulse::Down),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Portal {
    pub span: PortalSpan,
    /// Jump portals exit past the nearest opposing portal instead of one cell over
    pub jump: bool,
}

impl Portal {
    fn cell_type(self) -> CellType {
        match (self.span, self.jump) {
            (PortalSpan::Left, false) => CellType::LeftPortal,
            (PortalSpan::Right, false) => CellType::RightPortal,
            (PortalSpan::Up, false) => CellType::UpPortal,
            (PortalSpan::Down, false) => CellType::DownPortal,
            (PortalSpan::Horizontal, false) => CellType::HorizontalPortal,
            (PortalSpan::Vertical, false) => CellType::VerticalPortal,
            (PortalSpan::Omni, false) => CellType::Portal,
            (PortalSpan::Left, true) => CellType::LeftJumpPortal,
            (PortalSpan::Right, true) => CellType::RightJumpPortal,
            (PortalSpan::Up, true) => CellType::UpJumpPortal,
            (PortalSpan::Down, true) => CellType::DownJumpPortal,
            (PortalSpan::Horizontal, true) => CellType::HorizontalJumpPortal,
            (PortalSpan::Vertical, true) => CellType::VerticalJumpPortal,
            (PortalSpan::Omni, true) => CellType::JumpPortal,
        }
    }
}

/// What a detonation turns the cells in its blast into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExplosionKind {
    #[default]
    Normal = 0,
    Item = 1,
    Rock = 2,
    Block = 3,
}

impl ExplosionKind {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ExplosionKind::Normal),
            1 => Some(ExplosionKind::Item),
            2 => Some(ExplosionKind::Rock),
            3 => Some(ExplosionKind::Block),
            _ => None,
        }
    }

    /// Cell left behind in every destroyable cell of the blast
    pub fn product(self) -> CellKind {
        match self {
            ExplosionKind::Normal => CellKind::Explosion {
                brightness: crate::consts::EXPLOSION_BRIGHTNESS,
            },
            ExplosionKind::Item => CellKind::Item(FallState::Resting),
            ExplosionKind::Rock => CellKind::Rock(FallState::Resting),
            ExplosionKind::Block => CellKind::Block,
        }
    }
}

/// Cell type tag. Discriminants are the codes stored in level files, so
/// existing values must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum CellType {
    Empty = 0,
    Circuit = 1,
    Rock = 2,
    Exit = 3,
    Player = 4,
    Item = 5,
    Block = 6,
    RoundBlock = 7,
    BlueBomb = 8,
    GreenBomb = 9,
    YellowBomb = 10,
    YellowBombTrigger = 11,
    RedBomb = 12,
    Explosion = 13,
    ItemDude = 14,
    BombDude = 15,
    LeftPortal = 16,
    RightPortal = 17,
    UpPortal = 18,
    DownPortal = 19,
    HorizontalPortal = 20,
    VerticalPortal = 21,
    Portal = 22,
    GrayBomb = 23,
    RockGenerator = 24,
    Destroyer = 25,
    Deleter = 26,
    LeftJumpPortal = 27,
    RightJumpPortal = 28,
    UpJumpPortal = 29,
    DownJumpPortal = 30,
    HorizontalJumpPortal = 31,
    VerticalJumpPortal = 32,
    JumpPortal = 33,
    PullStone = 34,
    WhiteBomb = 35,
}

impl CellType {
    pub fn from_code(code: i32) -> Option<Self> {
        use CellType::*;
        let ty = match code {
            0 => Empty,
            1 => Circuit,
            2 => Rock,
            3 => Exit,
            4 => Player,
            5 => Item,
            6 => Block,
            7 => RoundBlock,
            8 => BlueBomb,
            9 => GreenBomb,
            10 => YellowBomb,
            11 => YellowBombTrigger,
            12 => RedBomb,
            13 => Explosion,
            14 => ItemDude,
            15 => BombDude,
            16 => LeftPortal,
            17 => RightPortal,
            18 => UpPortal,
            19 => DownPortal,
            20 => HorizontalPortal,
            21 => VerticalPortal,
            22 => Portal,
            23 => GrayBomb,
            24 => RockGenerator,
            25 => Destroyer,
            26 => Deleter,
            27 => LeftJumpPortal,
            28 => RightJumpPortal,
            29 => UpJumpPortal,
            30 => DownJumpPortal,
            31 => HorizontalJumpPortal,
            32 => VerticalJumpPortal,
            33 => JumpPortal,
            34 => PullStone,
            35 => WhiteBomb,
            _ => return None,
        };
        Some(ty)
    }

    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Objects roll off round things, and round fallers roll
    pub fn is_round(self) -> bool {
        matches!(self, CellType::Rock | CellType::Item | CellType::RoundBlock)
    }

    pub fn should_fall(self) -> bool {
        matches!(
            self,
            CellType::Rock
                | CellType::Item
                | CellType::GreenBomb
                | CellType::BlueBomb
                | CellType::GrayBomb
                | CellType::WhiteBomb
        )
    }

    pub fn destroyable(self) -> bool {
        !matches!(self, CellType::Block | CellType::Destroyer | CellType::Deleter)
    }

    pub fn is_bomb(self) -> bool {
        matches!(
            self,
            CellType::GreenBomb
                | CellType::RedBomb
                | CellType::YellowBomb
                | CellType::BlueBomb
                | CellType::GrayBomb
                | CellType::WhiteBomb
                | CellType::ItemDude
                | CellType::BombDude
                | CellType::RockGenerator
        )
    }

    /// Detonates when something falls on it or a blast reaches it
    pub fn is_volatile(self) -> bool {
        self == CellType::Player || self.is_dude() || self.is_bomb()
    }

    /// The player may walk into it
    pub fn is_edible(self) -> bool {
        matches!(
            self,
            CellType::Empty
                | CellType::Circuit
                | CellType::Item
                | CellType::RedBomb
                | CellType::YellowBombTrigger
        )
    }

    pub fn is_pushable(self, dir: Impulse) -> bool {
        match dir {
            Impulse::Left | Impulse::Right => matches!(
                self,
                CellType::Rock
                    | CellType::GreenBomb
                    | CellType::BlueBomb
                    | CellType::YellowBomb
                    | CellType::GrayBomb
                    | CellType::WhiteBomb
            ),
            Impulse::Up | Impulse::Down => self == CellType::YellowBomb,
            Impulse::None => false,
        }
    }

    pub fn is_pullable(self) -> bool {
        self == CellType::PullStone
    }

    pub fn is_dude(self) -> bool {
        matches!(self, CellType::ItemDude | CellType::BombDude)
    }

    pub fn explosion_kind(self) -> ExplosionKind {
        match self {
            CellType::ItemDude | CellType::BlueBomb => ExplosionKind::Item,
            CellType::GrayBomb => ExplosionKind::Rock,
            CellType::WhiteBomb => ExplosionKind::Block,
            _ => ExplosionKind::Normal,
        }
    }

    pub fn portal(self) -> Option<Portal> {
        let (span, jump) = match self {
            CellType::LeftPortal => (PortalSpan::Left, false),
            CellType::RightPortal => (PortalSpan::Right, false),
            CellType::UpPortal => (PortalSpan::Up, false),
            CellType::DownPortal => (PortalSpan::Down, false),
            CellType::HorizontalPortal => (PortalSpan::Horizontal, false),
            CellType::VerticalPortal => (PortalSpan::Vertical, false),
            CellType::Portal => (PortalSpan::Omni, false),
            CellType::LeftJumpPortal => (PortalSpan::Left, true),
            CellType::RightJumpPortal => (PortalSpan::Right, true),
            CellType::UpJumpPortal => (PortalSpan::Up, true),
            CellType::DownJumpPortal => (PortalSpan::Down, true),
            CellType::HorizontalJumpPortal => (PortalSpan::Horizontal, true),
            CellType::VerticalJumpPortal => (PortalSpan::Vertical, true),
            CellType::JumpPortal => (PortalSpan::Omni, true),
            _ => return None,
        };
        Some(Portal { span, jump })
    }

    /// Whether the player can pass through this cell moving in `dir`
    pub fn is_portal(self, dir: Impulse) -> bool {
        self.portal().is_some_and(|p| p.span.accepts(dir))
    }

    pub fn is_jump_portal(self) -> bool {
        self.portal().is_some_and(|p| p.jump)
    }

    /// ASCII glyph for headless dumps
    pub fn glyph(self) -> char {
        match self {
            CellType::Empty => ' ',
            CellType::Circuit => '.',
            CellType::Rock => 'o',
            CellType::Exit => 'E',
            CellType::Player => '@',
            CellType::Item => '*',
            CellType::Block => '#',
            CellType::RoundBlock => 'O',
            CellType::BlueBomb => 'b',
            CellType::GreenBomb => 'g',
            CellType::YellowBomb => 'y',
            CellType::YellowBombTrigger => 'Y',
            CellType::RedBomb => 'r',
            CellType::Explosion => '%',
            CellType::ItemDude => 'I',
            CellType::BombDude => 'D',
            CellType::LeftPortal => '<',
            CellType::RightPortal => '>',
            CellType::UpPortal => '^',
            CellType::DownPortal => 'v',
            CellType::HorizontalPortal => '-',
            CellType::VerticalPortal => '|',
            CellType::Portal => '+',
            CellType::GrayBomb => 'a',
            CellType::RockGenerator => 'G',
            CellType::Destroyer => 'X',
            CellType::Deleter => 'x',
            CellType::LeftJumpPortal => '{',
            CellType::RightJumpPortal => '}',
            CellType::UpJumpPortal => 'A',
            CellType::DownJumpPortal => 'V',
            CellType::HorizontalJumpPortal => '=',
            CellType::VerticalJumpPortal => '!',
            CellType::JumpPortal => '&',
            CellType::PullStone => 'P',
            CellType::WhiteBomb => 'w',
        }
    }
}

/// Cell contents with the state each kind carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// `attenuation` 0 is fresh space, 1..256 is darkening, 256+ is dark
    Empty { attenuation: i32 },
    Circuit,
    Rock(FallState),
    Exit,
    Player,
    Item(FallState),
    Block,
    RoundBlock,
    BlueBomb(FallState),
    GreenBomb(FallState),
    YellowBomb,
    YellowBombTrigger,
    /// `fuse` 0 is inert; anything else burns toward detonation
    RedBomb { fuse: i32 },
    Explosion { brightness: i32 },
    ItemDude(Dude),
    BombDude(Dude),
    Portal(Portal),
    GrayBomb(FallState),
    RockGenerator { charge: i32 },
    Destroyer,
    Deleter,
    PullStone,
    WhiteBomb(FallState),
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Empty { attenuation: UNTOUCHED_ATTENUATION }
    }
}

impl From<CellType> for CellKind {
    fn from(ty: CellType) -> Self {
        CellKind::with_param(ty, 0)
    }
}

impl CellKind {
    /// Space vacated during play
    pub const EMPTY: CellKind = CellKind::Empty { attenuation: 0 };

    /// Decode a `(type, param)` pair as stored in level files
    pub fn from_raw(code: i32, param: i32) -> Option<Self> {
        CellType::from_code(code).map(|ty| CellKind::with_param(ty, param))
    }

    /// Encode as a `(type, param)` pair
    pub fn to_raw(&self) -> (i32, i32) {
        let param = match *self {
            CellKind::Empty { attenuation } => attenuation,
            CellKind::RedBomb { fuse } => fuse,
            CellKind::Explosion { brightness } => brightness,
            CellKind::RockGenerator { charge } => charge,
            CellKind::ItemDude(dude) | CellKind::BombDude(dude) => dude.param(),
            _ => self.fall_state().map_or(0, FallState::param),
        };
        (self.cell_type().code(), param)
    }

    fn with_param(ty: CellType, param: i32) -> Self {
        let fall = FallState::from_param(param);
        match ty {
            CellType::Empty => CellKind::Empty { attenuation: param },
            CellType::Circuit => CellKind::Circuit,
            CellType::Rock => CellKind::Rock(fall),
            CellType::Exit => CellKind::Exit,
            CellType::Player => CellKind::Player,
            CellType::Item => CellKind::Item(fall),
            CellType::Block => CellKind::Block,
            CellType::RoundBlock => CellKind::RoundBlock,
            CellType::BlueBomb => CellKind::BlueBomb(fall),
            CellType::GreenBomb => CellKind::GreenBomb(fall),
            CellType::YellowBomb => CellKind::YellowBomb,
            CellType::YellowBombTrigger => CellKind::YellowBombTrigger,
            CellType::RedBomb => CellKind::RedBomb { fuse: param },
            CellType::Explosion => CellKind::Explosion { brightness: param },
            CellType::ItemDude => CellKind::ItemDude(Dude::from_param(param)),
            CellType::BombDude => CellKind::BombDude(Dude::from_param(param)),
            CellType::GrayBomb => CellKind::GrayBomb(fall),
            CellType::RockGenerator => CellKind::RockGenerator { charge: param },
            CellType::Destroyer => CellKind::Destroyer,
            CellType::Deleter => CellKind::Deleter,
            CellType::PullStone => CellKind::PullStone,
            CellType::WhiteBomb => CellKind::WhiteBomb(fall),
            portal => match portal.portal() {
                Some(p) => CellKind::Portal(p),
                None => unreachable!("{portal:?} is not a portal type"),
            },
        }
    }

    pub fn cell_type(&self) -> CellType {
        match self {
            CellKind::Empty { .. } => CellType::Empty,
            CellKind::Circuit => CellType::Circuit,
            CellKind::Rock(_) => CellType::Rock,
            CellKind::Exit => CellType::Exit,
            CellKind::Player => CellType::Player,
            CellKind::Item(_) => CellType::Item,
            CellKind::Block => CellType::Block,
            CellKind::RoundBlock => CellType::RoundBlock,
            CellKind::BlueBomb(_) => CellType::BlueBomb,
            CellKind::GreenBomb(_) => CellType::GreenBomb,
            CellKind::YellowBomb => CellType::YellowBomb,
            CellKind::YellowBombTrigger => CellType::YellowBombTrigger,
            CellKind::RedBomb { .. } => CellType::RedBomb,
            CellKind::Explosion { .. } => CellType::Explosion,
            CellKind::ItemDude(_) => CellType::ItemDude,
            CellKind::BombDude(_) => CellType::BombDude,
            CellKind::Portal(p) => p.cell_type(),
            CellKind::GrayBomb(_) => CellType::GrayBomb,
            CellKind::RockGenerator { .. } => CellType::RockGenerator,
            CellKind::Destroyer => CellType::Destroyer,
            CellKind::Deleter => CellType::Deleter,
            CellKind::PullStone => CellType::PullStone,
            CellKind::WhiteBomb(_) => CellType::WhiteBomb,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellKind::Empty { .. })
    }

    pub fn fall_state(&self) -> Option<FallState> {
        match *self {
            CellKind::Rock(f)
            | CellKind::Item(f)
            | CellKind::BlueBomb(f)
            | CellKind::GreenBomb(f)
            | CellKind::GrayBomb(f)
            | CellKind::WhiteBomb(f) => Some(f),
            _ => None,
        }
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        self.fall_state() == Some(FallState::Falling)
    }

    /// Same kind with a new fall state; kinds that never fall are returned as-is
    pub fn with_fall(self, fall: FallState) -> Self {
        match self {
            CellKind::Rock(_) => CellKind::Rock(fall),
            CellKind::Item(_) => CellKind::Item(fall),
            CellKind::BlueBomb(_) => CellKind::BlueBomb(fall),
            CellKind::GreenBomb(_) => CellKind::GreenBomb(fall),
            CellKind::GrayBomb(_) => CellKind::GrayBomb(fall),
            CellKind::WhiteBomb(_) => CellKind::WhiteBomb(fall),
            other => other,
        }
    }

    pub fn dude(&self) -> Option<Dude> {
        match *self {
            CellKind::ItemDude(d) | CellKind::BombDude(d) => Some(d),
            _ => None,
        }
    }

    /// Same dude kind with a new walking state; other kinds are returned as-is
    pub fn with_dude(self, dude: Dude) -> Self {
        match self {
            CellKind::ItemDude(_) => CellKind::ItemDude(dude),
            CellKind::BombDude(_) => CellKind::BombDude(dude),
            other => other,
        }
    }

    pub fn is_round(&self) -> bool {
        self.cell_type().is_round()
    }

    pub fn should_fall(&self) -> bool {
        self.cell_type().should_fall()
    }

    pub fn destroyable(&self) -> bool {
        self.cell_type().destroyable()
    }

    pub fn is_bomb(&self) -> bool {
        self.cell_type().is_bomb()
    }

    pub fn is_volatile(&self) -> bool {
        self.cell_type().is_volatile()
    }

    pub fn is_edible(&self) -> bool {
        self.cell_type().is_edible()
    }

    pub fn is_pushable(&self, dir: Impulse) -> bool {
        self.cell_type().is_pushable(dir)
    }

    pub fn is_pullable(&self) -> bool {
        self.cell_type().is_pullable()
    }

    pub fn is_dude(&self) -> bool {
        self.cell_type().is_dude()
    }

    pub fn explosion_kind(&self) -> ExplosionKind {
        self.cell_type().explosion_kind()
    }

    pub fn is_portal(&self, dir: Impulse) -> bool {
        self.cell_type().is_portal(dir)
    }

    pub fn is_jump_portal(&self) -> bool {
        self.cell_type().is_jump_portal()
    }
}

/// One grid tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    /// Set when the cell was relocated this frame; cleared at frame end
    #[serde(skip)]
    pub moved: bool,
}

impl Cell {
    pub fn new(kind: CellKind) -> Self {
        Self { kind, moved: false }
    }

    #[inline]
    pub fn cell_type(&self) -> CellType {
        self.kind.cell_type()
    }
}

impl From<CellKind> for Cell {
    fn from(kind: CellKind) -> Self {
        Cell::new(kind)
    }
}

impl From<CellType> for Cell {
    fn from(ty: CellType) -> Self {
        Cell::new(ty.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_tables() {
        assert_eq!(Impulse::Up.left_turn(), Impulse::Left);
        assert_eq!(Impulse::Down.left_turn(), Impulse::Right);
        assert_eq!(Impulse::Left.left_turn(), Impulse::Down);
        assert_eq!(Impulse::Right.left_turn(), Impulse::Up);
        for dir in Impulse::DIRECTIONS {
            assert_eq!(dir.left_turn().right_turn(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert_eq!(Impulse::None.left_turn(), Impulse::None);
    }

    #[test]
    fn test_volatile_and_edible() {
        assert!(CellType::Player.is_volatile());
        assert!(CellType::RockGenerator.is_volatile());
        assert!(CellType::ItemDude.is_volatile());
        assert!(!CellType::Rock.is_volatile());
        assert!(CellType::RedBomb.is_edible());
        assert!(!CellType::Exit.is_edible());
        assert!(!CellType::LeftPortal.is_edible());
    }

    #[test]
    fn test_pushable_by_direction() {
        assert!(CellType::Rock.is_pushable(Impulse::Right));
        assert!(!CellType::Rock.is_pushable(Impulse::Up));
        assert!(CellType::YellowBomb.is_pushable(Impulse::Down));
        assert!(!CellType::RedBomb.is_pushable(Impulse::Left));
        assert!(!CellType::Rock.is_pushable(Impulse::None));
    }

    #[test]
    fn test_explosion_kinds() {
        assert_eq!(CellType::ItemDude.explosion_kind(), ExplosionKind::Item);
        assert_eq!(CellType::BlueBomb.explosion_kind(), ExplosionKind::Item);
        assert_eq!(CellType::GrayBomb.explosion_kind(), ExplosionKind::Rock);
        assert_eq!(CellType::WhiteBomb.explosion_kind(), ExplosionKind::Block);
        assert_eq!(CellType::BombDude.explosion_kind(), ExplosionKind::Normal);
    }

    #[test]
    fn test_portal_directions() {
        assert!(CellType::LeftPortal.is_portal(Impulse::Left));
        assert!(!CellType::LeftPortal.is_portal(Impulse::Right));
        assert!(CellType::VerticalJumpPortal.is_portal(Impulse::Down));
        assert!(!CellType::VerticalJumpPortal.is_portal(Impulse::Left));
        assert!(CellType::JumpPortal.is_portal(Impulse::Up));
        assert!(CellType::JumpPortal.is_jump_portal());
        assert!(!CellType::Portal.is_jump_portal());
        assert!(!CellType::Rock.is_portal(Impulse::Left));
    }

    #[test]
    fn test_every_code_decodes_to_its_type() {
        for code in 0..=35 {
            let kind = CellKind::from_raw(code, 0).unwrap();
            assert_eq!(kind.cell_type().code(), code);
        }
        assert!(CellKind::from_raw(36, 0).is_none());
        assert!(CellKind::from_raw(-1, 0).is_none());
    }

    #[test]
    fn test_param_meanings() {
        assert_eq!(CellKind::from_raw(2, 1), Some(CellKind::Rock(FallState::Falling)));
        assert_eq!(CellKind::from_raw(2, 7), Some(CellKind::Rock(FallState::Resting)));

        let turned = CellKind::from_raw(15, -3).unwrap();
        assert_eq!(
            turned,
            CellKind::BombDude(Dude { facing: Impulse::Left, just_turned: true })
        );
        assert_eq!(turned.to_raw(), (15, -3));
        assert!(!turned.dude().unwrap().checks_left());
        assert!(Dude::facing(Impulse::Up).checks_left());
        assert!(!Dude::facing(Impulse::None).checks_left());

        assert_eq!(CellKind::RedBomb { fuse: 17 }.to_raw(), (12, 17));
        assert_eq!(CellKind::Block.to_raw(), (6, 0));
    }

    #[test]
    fn test_default_space_is_untouched() {
        assert_eq!(Cell::default().kind, CellKind::Empty { attenuation: 1 });
        assert_eq!(CellKind::from(CellType::Empty), CellKind::EMPTY);
    }

    #[test]
    fn test_with_fall_keeps_kind() {
        let bomb = CellKind::GreenBomb(FallState::Resting).with_fall(FallState::Falling);
        assert_eq!(bomb, CellKind::GreenBomb(FallState::Falling));
        assert_eq!(CellKind::Block.with_fall(FallState::Falling), CellKind::Block);
    }
}
