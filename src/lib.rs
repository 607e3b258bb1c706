//! TetriNet (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so hosts and tests can use
//! `tetrinet::{core, adapter, types}` while the implementation lives under `crates/`.

pub use tetrinet_adapter as adapter;
pub use tetrinet_core as core;
pub use tetrinet_types as types;
