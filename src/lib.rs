//! Lava Dash: simulation core and game plumbing.
//!
//! `domain` holds the value types and actors, `sim` the level state machine,
//! plan parser, tick driver and multi-level session. The terminal front end
//! lives in the binary.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;
