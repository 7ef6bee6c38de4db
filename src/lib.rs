//! Warplan - Military Operations Engine
//!
//! Turns mission directives from an upstream strategy layer into concrete
//! per-turn army movements, splits and merges, siege decisions, and
//! tactical holds over a shared world registry.

pub mod core;
pub mod missions;
pub mod ops;
pub mod world;
