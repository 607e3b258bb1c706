//! Adapter - a tokio host for a TetriNet session
//!
//! The core session is pure; this crate supplies the pieces a real host needs
//! around it:
//!
//! - [`runtime::TokioLoop`]: gravity timers and frame requests as tokio sleep
//!   tasks, delivered back as [`runtime::HostEvent`]s on one channel
//! - [`network::ChannelNetwork`]: outbound [`protocol::PeerMessage`]s on an
//!   mpsc channel, optionally logged as JSON
//! - [`config::HostConfig`]: settings from `TETRINET_*` environment variables
//! - [`driver::run_session`]: the single-task loop that feeds events to the session
//!
//! # Event Flow
//!
//! ```text
//! input task ──Action──┐
//! sleep tasks ─Gravity/Frame─┤──> HostEvent channel ──> run_session ──> Session
//! peer reader ──Peer───┘                                             │
//!                                         PeerMessage channel <──────┘
//! ```
//!
//! Everything the session does happens on the driver task, one event at a
//! time; the spawned tasks only sleep and send.
//!
//! # Environment Variables
//!
//! - `TETRINET_SEAT`: local seat 1..=6 (default: 1)
//! - `TETRINET_SEED`: RNG seed (default: 1)
//! - `TETRINET_RULES`: TetriNet new-game rules string (default: classic rules)
//! - `TETRINET_MAX_PIECES`: pieces the soak runner drops (default: 500)
//! - `TETRINET_VERBOSE`: set to "1" or "true" to log outbound messages

pub mod config;
pub mod driver;
pub mod network;
pub mod protocol;
pub mod runtime;

pub use tetrinet_core as core;
pub use tetrinet_types as types;

pub use config::HostConfig;
pub use driver::{build_session, run_session, HeadlessRenderer, SessionSummary};
pub use network::ChannelNetwork;
pub use protocol::PeerMessage;
pub use runtime::{HostEvent, TokioLoop};
