//! Integer rectangle geometry for bodies and tile queries
//!
//! All collision rectangles are axis-aligned, half-open pixel rects:
//! `min` is inclusive, `max` is exclusive. Two rects that merely share an
//! edge do not intersect, which is what makes flush contact representable.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned half-open pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner (inclusive)
    pub min: IVec2,
    /// Bottom-right corner (exclusive)
    pub max: IVec2,
}

impl Aabb {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        debug_assert!(min.x < max.x && min.y < max.y, "degenerate rect");
        Self { min, max }
    }

    /// Build from a top-left position and a size
    pub fn from_pos_size(pos: IVec2, size: IVec2) -> Self {
        Self::new(pos, pos + size)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    /// The same rect shifted by `delta`
    #[inline]
    pub fn translated(&self, delta: IVec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Strict overlap test (edge contact is not overlap)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Check if a pixel is inside the rect
    #[inline]
    pub fn contains_point(&self, p: IVec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }
}

/// A collision box in body-local space
///
/// The offset from the body origin is fixed when the box is attached (it
/// bakes in the sprite pivot); the world rect is re-derived from the body's
/// integer position every time it is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBox {
    /// Offset of the box's top-left corner from the body origin
    pub offset: IVec2,
    /// Box size in pixels
    pub size: IVec2,
}

impl LocalBox {
    pub fn new(offset: IVec2, size: IVec2) -> Self {
        debug_assert!(size.x > 0 && size.y > 0, "box size must be positive");
        Self { offset, size }
    }

    /// Box with its top-left at the body origin
    pub fn from_size(width: i32, height: i32) -> Self {
        Self::new(IVec2::ZERO, IVec2::new(width, height))
    }

    /// World-space rect for a body at `pos`
    #[inline]
    pub fn world(&self, pos: IVec2) -> Aabb {
        Aabb::from_pos_size(pos + self.offset, self.size)
    }
}
