//! # Arena Common
//!
//! Common types, utilities, and shared abstractions for the arena combat core.
//!
//! This crate provides foundational types used across the arena crates:
//! - ID types (EntityId, GroupId)
//! - Playfield geometry (world bounds, direction helpers)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
    pub use glam::Vec2;
}

pub use prelude::*;
