//! TetriNet simulation core - pure, deterministic, and testable
//!
//! This crate holds the game rules for one multiplayer TetriNet seat: the
//! grids, the falling piece, row clears, special tiles and the session that
//! sequences them. It has **no I/O**: timers, transport and drawing reach it
//! only through the traits in [`host`], so the same session runs under a
//! tokio host, a headless soak runner, or a unit test.
//!
//! # Module Structure
//!
//! - [`pieces`]: the seven TetriNet shapes and their rotation states
//! - [`grid`]: 12x22 board with collision, wall kicks, freeze and row removal
//! - [`specials`]: clear/propagate cycle, special injection, the inventory
//! - [`effects`]: dispatch table from special kind to effect
//! - [`rng`]: injectable randomness and 100-slot frequency tables
//! - [`params`]: per-session rules, parsed from a TetriNet rules string
//! - [`snapshot`]: settled cells in TetriNet field bytes
//! - [`host`]: event loop, network and render seats the session calls out to
//! - [`session`]: the controller
//!
//! # Example
//!
//! ```
//! use tetrinet_core::{GameParams, ManualLoop, RecordingNetwork, Session, SimpleRng};
//! use tetrinet_core::types::GameAction;
//!
//! let mut session = Session::new(
//!     1,
//!     GameParams::default(),
//!     SimpleRng::new(12345),
//!     ManualLoop::new(),
//!     RecordingNetwork::new(),
//! )
//! .unwrap();
//! session.new_game();
//! session.start();
//!
//! session.handle_action(GameAction::MoveLeft);
//! session.handle_action(GameAction::HardDrop);
//!
//! // every lock publishes the field once
//! assert_eq!(session.network().field_updates(), 1);
//! assert!(session.local_grid().active().is_some());
//! ```

pub mod effects;
pub mod grid;
pub mod host;
pub mod params;
pub mod pieces;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod specials;

pub use tetrinet_types as types;

// Re-export commonly used types for convenience
pub use effects::{EffectContext, EffectFn, EffectTable};
pub use grid::{ActivePiece, ClearedLines, Grid};
pub use host::{
    EventLoop, ManualLoop, NetworkSink, NullNetwork, RecordingNetwork, RenderSink, SentMessage,
    TimerId,
};
pub use params::{GameParams, ParamsError};
pub use pieces::{get_shape, piece, Piece, Shape};
pub use rng::{FrequencyError, FrequencyTable, Randomness, ScriptedRng, SimpleRng};
pub use session::{Session, SessionError};
pub use snapshot::{FieldSnapshot, SnapshotError};
pub use specials::{add_specials, clear_and_propagate, ClearReport, Inventory};
