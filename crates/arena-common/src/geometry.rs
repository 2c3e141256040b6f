//! Playfield geometry: world bounds and direction helpers.
//!
//! All simulation math happens in world space (pixels, `f32`). Screen space
//! only exists on the rendering side and never feeds back here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, ArenaResult};

/// Default playfield width in world pixels.
pub const DEFAULT_WORLD_WIDTH: f32 = 1600.0;

/// Default playfield height in world pixels.
pub const DEFAULT_WORLD_HEIGHT: f32 = 1200.0;

/// Rectangular playfield anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Width of the playfield
    pub width: f32,
    /// Height of the playfield
    pub height: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
        }
    }
}

/// Outcome of clamping a point into the bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    /// The clamped point
    pub point: Vec2,
    /// The X coordinate had to be clamped
    pub hit_x: bool,
    /// The Y coordinate had to be clamped
    pub hit_y: bool,
}

impl Clamped {
    /// Whether any wall was touched.
    #[must_use]
    pub fn touched_wall(&self) -> bool {
        self.hit_x || self.hit_y
    }
}

impl WorldBounds {
    /// Creates bounds, rejecting non-positive or non-finite sizes.
    pub fn try_new(width: f32, height: f32) -> ArenaResult<Self> {
        for (field, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ArenaError::InvalidConfig {
                    field,
                    reason: format!("must be a positive finite number, got {value}"),
                });
            }
        }
        Ok(Self { width, height })
    }

    /// Centre of the playfield.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Checks whether a point lies inside the bounds grown by `margin` on every side.
    #[must_use]
    pub fn contains_with_margin(&self, point: Vec2, margin: f32) -> bool {
        (-margin..=self.width + margin).contains(&point.x)
            && (-margin..=self.height + margin).contains(&point.y)
    }

    /// Clamps a point into the bounds shrunk by `inset` on every side.
    ///
    /// A negative inset grows the bounds instead.
    #[must_use]
    pub fn clamp_inset(&self, point: Vec2, inset: f32) -> Clamped {
        let min = Vec2::splat(inset);
        let max = Vec2::new(self.width - inset, self.height - inset).max(min);
        let clamped = point.clamp(min, max);
        Clamped {
            point: clamped,
            hit_x: clamped.x != point.x,
            hit_y: clamped.y != point.y,
        }
    }
}

/// Unit vector pointing from `from` to `to`.
///
/// Returns `None` when the two points coincide (or the result is not finite),
/// so callers skip the directional update instead of dividing by zero.
#[must_use]
pub fn heading(from: Vec2, to: Vec2) -> Option<Vec2> {
    (to - from).try_normalize()
}
