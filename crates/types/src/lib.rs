//! Core types module - shared vocabulary and constants
//!
//! This crate defines the fundamental types used throughout the engine.
//! All types are plain data with no external dependencies, so they can be used
//! by the simulation core, a host event loop, or a network adapter alike.
//!
//! # Board Dimensions
//!
//! TetriNet playfield dimensions:
//!
//! - **Width**: 12 columns (indexed 0-11)
//! - **Height**: 22 rows (indexed 0-21, row 21 is the floor)
//! - **Spawn anchor**: column 5, row 0
//!
//! # Timing
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_TICK_MS` | 1000 | Gravity interval at level 0 |
//! | `TICK_STEP_MS` | 10 | Interval reduction per level |
//! | `MIN_TICK_MS` | 5 | Fastest gravity interval |
//! | `FRAME_MS` | 16 | Deferral for a coalesced redraw |
//!
//! # Examples
//!
//! ```
//! use tetrinet_types::{PieceKind, SpecialKind, SpecialCode, BOARD_WIDTH, BOARD_HEIGHT};
//!
//! assert_eq!(PieceKind::from_digit('2'), Some(PieceKind::O));
//! assert_eq!(SpecialKind::from_code('q'), Some(SpecialKind::QuakeField));
//! assert_eq!(SpecialCode::parse("cs4"), Some(SpecialCode::ClassicAdd(4)));
//!
//! assert_eq!(BOARD_WIDTH, 12);
//! assert_eq!(BOARD_HEIGHT, 22);
//! ```

/// Board width in cells (12 columns)
pub const BOARD_WIDTH: u8 = 12;

/// Board height in cells (22 rows)
pub const BOARD_HEIGHT: u8 = 22;

/// Column of the anchor of a freshly spawned piece
pub const SPAWN_X: i8 = 5;

/// Number of seats in a session
pub const MAX_SEATS: usize = 6;

/// Number of block colors; valid color ids are `1..=NUM_COLORS`
pub const NUM_COLORS: u8 = 5;

/// Gravity interval at level 0
pub const BASE_TICK_MS: u32 = 1000;

/// Gravity speed-up per level
pub const TICK_STEP_MS: u32 = 10;

/// Fastest gravity interval
pub const MIN_TICK_MS: u32 = 5;

/// Highest reachable level
pub const MAX_LEVEL: u32 = 100;

/// Hard cap on the special inventory, whatever the rules ask for
pub const MAX_SPECIAL_CAPACITY: usize = 18;

/// Slots in a piece or special frequency table
pub const FREQUENCY_SLOTS: usize = 100;

/// Random column probes before the empty-column special fallback gives up
pub const EMPTY_COLUMN_ATTEMPTS: u32 = 20;

/// Deferral before a requested redraw runs
pub const FRAME_MS: u32 = 16;

/// Gravity interval for a level: 1000ms at level 0, 10ms faster per level, never below 5ms.
///
/// ```
/// use tetrinet_types::tick_ms_for_level;
///
/// assert_eq!(tick_ms_for_level(0), 1000);
/// assert_eq!(tick_ms_for_level(1), 990);
/// assert_eq!(tick_ms_for_level(100), 5);
/// ```
pub fn tick_ms_for_level(level: u32) -> u32 {
    BASE_TICK_MS
        .saturating_sub(level.min(MAX_LEVEL) * TICK_STEP_MS)
        .max(MIN_TICK_MS)
}

/// A seat number, `1..=MAX_SEATS`
pub type Seat = u8;

/// Check that a seat number addresses one of the session's grids
pub fn is_valid_seat(seat: Seat) -> bool {
    (1..=MAX_SEATS as u8).contains(&seat)
}

/// The seven piece kinds, in TetriNet order
///
/// The order matters: TetriNet frequency strings refer to pieces by the
/// digits `1..=7` in exactly this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    J,
    L,
    Z,
    S,
    T,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::J,
        PieceKind::L,
        PieceKind::Z,
        PieceKind::S,
        PieceKind::T,
    ];

    /// Position in [`PieceKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a TetriNet frequency digit (`'1'` = I ... `'7'` = T)
    ///
    /// ```
    /// use tetrinet_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_digit('1'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_digit('7'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_digit('8'), None);
    /// ```
    pub fn from_digit(c: char) -> Option<Self> {
        let d = c.to_digit(10)? as usize;
        if d == 0 {
            return None;
        }
        Self::ALL.get(d - 1).copied()
    }

    /// TetriNet frequency digit for this kind
    pub fn digit(self) -> char {
        (b'1' + self as u8) as char
    }

    /// Lowercase single-letter name
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::Z => "z",
            PieceKind::S => "s",
            PieceKind::T => "t",
        }
    }
}

/// The closed set of special tiles
///
/// Each kind has a one-letter TetriNet code (used in field snapshots and on
/// the wire) and a frequency digit `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    AddLine,
    ClearLine,
    NukeField,
    RandomClear,
    SwitchField,
    ClearSpecials,
    Gravity,
    QuakeField,
    BlockBomb,
}

impl SpecialKind {
    pub const ALL: [SpecialKind; 9] = [
        SpecialKind::AddLine,
        SpecialKind::ClearLine,
        SpecialKind::NukeField,
        SpecialKind::RandomClear,
        SpecialKind::SwitchField,
        SpecialKind::ClearSpecials,
        SpecialKind::Gravity,
        SpecialKind::QuakeField,
        SpecialKind::BlockBomb,
    ];

    /// Position in [`SpecialKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-letter TetriNet code
    pub fn code(self) -> char {
        match self {
            SpecialKind::AddLine => 'a',
            SpecialKind::ClearLine => 'c',
            SpecialKind::NukeField => 'n',
            SpecialKind::RandomClear => 'r',
            SpecialKind::SwitchField => 's',
            SpecialKind::ClearSpecials => 'b',
            SpecialKind::Gravity => 'g',
            SpecialKind::QuakeField => 'q',
            SpecialKind::BlockBomb => 'o',
        }
    }

    /// Parse a one-letter TetriNet code
    pub fn from_code(c: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == c)
    }

    /// Parse a TetriNet frequency digit (`'1'` = AddLine ... `'9'` = BlockBomb)
    pub fn from_digit(c: char) -> Option<Self> {
        let d = c.to_digit(10)? as usize;
        if d == 0 {
            return None;
        }
        Self::ALL.get(d - 1).copied()
    }

    /// TetriNet frequency digit for this kind
    pub fn digit(self) -> char {
        (b'1' + self as u8) as char
    }
}

/// A settled cell: a color id and an optional special tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub color: u8,
    pub special: Option<SpecialKind>,
}

impl Cell {
    /// Plain colored block
    pub fn block(color: u8) -> Self {
        Self {
            color,
            special: None,
        }
    }

    /// Colored block carrying a special
    pub fn special(color: u8, special: SpecialKind) -> Self {
        Self {
            color,
            special: Some(special),
        }
    }

    /// Drop the special tag, keeping the color
    pub fn clear_special(&mut self) {
        self.special = None;
    }
}

/// Result of testing a shape against a grid
///
/// Wall violations are reported separately from block collisions because
/// rotation treats them differently (a wall hit triggers a kick).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intersection {
    /// Every cell is free
    None,
    /// Overlaps a settled cell or the floor
    Regular,
    /// Some cell is left or right of the board
    Wall,
}

impl Intersection {
    pub fn is_none(self) -> bool {
        self == Intersection::None
    }
}

/// Discrete player actions
///
/// Actions are no-ops while the session is paused or the local seat has topped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Advance to the next rotation state (with wall kicks)
    Rotate,
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move down one row, freezing if blocked; resets the gravity clock
    SoftDrop,
    /// Drop to rest and freeze; resets the gravity clock
    HardDrop,
    /// Spend the oldest special on a seat
    UseSpecial(Seat),
    /// Throw away the oldest special
    DiscardSpecial,
}

impl GameAction {
    /// Parse a host command name (`useSpecial` targets are passed separately)
    ///
    /// ```
    /// use tetrinet_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
    /// assert_eq!(GameAction::from_str("rotate"), Some(GameAction::Rotate));
    /// assert_eq!(GameAction::from_str("nope"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rotate" => Some(GameAction::Rotate),
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "discardspecial" => Some(GameAction::DiscardSpecial),
            _ => None,
        }
    }

    /// camelCase name
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Rotate => "rotate",
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::UseSpecial(_) => "useSpecial",
            GameAction::DiscardSpecial => "discardSpecial",
        }
    }
}

/// Where a special is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialTarget {
    /// Every seat except the sender
    All,
    Seat(Seat),
}

impl SpecialTarget {
    /// TetriNet target number: 0 means everyone
    pub fn number(self) -> u8 {
        match self {
            SpecialTarget::All => 0,
            SpecialTarget::Seat(s) => s,
        }
    }

    pub fn from_number(n: u8) -> Self {
        if n == 0 {
            SpecialTarget::All
        } else {
            SpecialTarget::Seat(n)
        }
    }

    /// Does this target address `seat`?
    pub fn includes(self, seat: Seat) -> bool {
        match self {
            SpecialTarget::All => true,
            SpecialTarget::Seat(s) => s == seat,
        }
    }
}

/// A special as it crosses the network seam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialCode {
    /// A redeemed special tile
    Effect(SpecialKind),
    /// Classic-mode combo: add this many lines to everyone else
    ClassicAdd(u8),
}

impl SpecialCode {
    /// Classic combo strength for a multi-line clear: 4 for four lines, otherwise `lines - 1`.
    ///
    /// Single-line clears produce no combo.
    ///
    /// ```
    /// use tetrinet_types::SpecialCode;
    ///
    /// assert_eq!(SpecialCode::combo_for_lines(1), None);
    /// assert_eq!(SpecialCode::combo_for_lines(2), Some(SpecialCode::ClassicAdd(1)));
    /// assert_eq!(SpecialCode::combo_for_lines(3), Some(SpecialCode::ClassicAdd(2)));
    /// assert_eq!(SpecialCode::combo_for_lines(4), Some(SpecialCode::ClassicAdd(4)));
    /// ```
    pub fn combo_for_lines(lines: u32) -> Option<Self> {
        match lines {
            0 | 1 => None,
            4 => Some(SpecialCode::ClassicAdd(4)),
            n => Some(SpecialCode::ClassicAdd(n.saturating_sub(1).min(u8::MAX as u32) as u8)),
        }
    }

    /// Parse `"a"`..`"o"` or `"cs1"`/`"cs2"`/`"cs4"`
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(n) = s.strip_prefix("cs") {
            return n.parse().ok().map(SpecialCode::ClassicAdd);
        }
        let mut chars = s.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        SpecialKind::from_code(c).map(SpecialCode::Effect)
    }

    /// Inverse of [`SpecialCode::parse`]
    pub fn as_code(&self) -> String {
        match self {
            SpecialCode::Effect(kind) => kind.code().to_string(),
            SpecialCode::ClassicAdd(n) => format!("cs{n}"),
        }
    }
}

/// Whether a seat is still in the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeatStatus {
    #[default]
    Playing,
    /// Topped out; the seat no longer spawns pieces
    Lost,
}
