//! Tile grid - fixed-size cell array with pixel-rect occupancy queries
//!
//! The grid stores tile identity plus a neighbor-derived shape code that only
//! renderers care about. Collision only asks two questions: does a pixel rect
//! overlap a solid cell, and does it overlap a jump-through cell. Queries
//! outside the grid bounds report open air so bodies never wedge against the
//! world edge.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::bounds::Aabb;
use crate::pixel_to_tile;

/// Tile identity; 0 is always empty
pub type TileId = u16;

/// The empty tile id
pub const TILE_EMPTY: TileId = 0;

/// Collision class of a tile id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    /// Blocks from every direction
    Solid,
    /// Blocks only when approached from above (platforms you can jump through)
    JumpThru,
}

/// Maps tile ids to their collision class
///
/// Ids beyond the registered range are treated as solid, so unregistered
/// content errs on the side of blocking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileSet {
    kinds: Vec<TileKind>,
}

impl TileSet {
    pub fn new() -> Self {
        Self {
            kinds: vec![TileKind::Empty],
        }
    }

    /// Register a tile id; returns the id for convenience
    pub fn register(&mut self, id: TileId, kind: TileKind) -> TileId {
        let idx = id as usize;
        if idx >= self.kinds.len() {
            self.kinds.resize(idx + 1, TileKind::Empty);
        }
        self.kinds[idx] = kind;
        id
    }

    #[inline]
    pub fn kind(&self, id: TileId) -> TileKind {
        if id == TILE_EMPTY {
            return TileKind::Empty;
        }
        self.kinds
            .get(id as usize)
            .copied()
            .unwrap_or(TileKind::Solid)
    }
}

/// One grid cell: identity plus the cached autotile shape code
///
/// The shape code is an 8-neighbor occupancy bitmask (N, NE, E, SE, S, SW, W,
/// NW from bit 0 up; off-grid neighbors count as occupied). It exists for
/// renderers picking sprite variants and has no collision meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileCell {
    pub id: TileId,
    pub shape: u8,
}

/// Fixed-size tile grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    cells: Vec<TileCell>,
    tileset: TileSet,
    /// Flattened solid-occupancy cache; dropped on placement, rebuilt on the
    /// next `refresh_cache` (queries fall back to per-cell lookups meanwhile)
    #[serde(skip)]
    solid_cache: Option<Vec<bool>>,
}

impl TileGrid {
    /// Create an empty grid of `width x height` tiles
    pub fn new(width: i32, height: i32, tileset: TileSet) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            cells: vec![TileCell::default(); (width * height) as usize],
            tileset,
            solid_cache: None,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, tx: i32, ty: i32) -> bool {
        tx >= 0 && tx < self.width && ty >= 0 && ty < self.height
    }

    #[inline]
    fn index(&self, tx: i32, ty: i32) -> usize {
        (ty * self.width + tx) as usize
    }

    /// Tile id at a grid cell; out of bounds reads as empty
    #[inline]
    pub fn tile_at(&self, tx: i32, ty: i32) -> TileId {
        if !self.in_bounds(tx, ty) {
            return TILE_EMPTY;
        }
        self.cells[self.index(tx, ty)].id
    }

    /// Autotile shape code at a grid cell
    #[inline]
    pub fn shape_at(&self, tx: i32, ty: i32) -> u8 {
        if !self.in_bounds(tx, ty) {
            return 0;
        }
        self.cells[self.index(tx, ty)].shape
    }

    #[inline]
    fn kind_at(&self, tx: i32, ty: i32) -> TileKind {
        self.tileset.kind(self.tile_at(tx, ty))
    }

    #[inline]
    fn solid_at(&self, tx: i32, ty: i32) -> bool {
        if !self.in_bounds(tx, ty) {
            return false;
        }
        match &self.solid_cache {
            Some(cache) => cache[self.index(tx, ty)],
            None => self.kind_at(tx, ty) == TileKind::Solid,
        }
    }

    /// Place a tile, updating the 3x3 neighborhood's shape codes and
    /// invalidating the occupancy cache
    pub fn set_tile(&mut self, tx: i32, ty: i32, id: TileId) {
        if !self.in_bounds(tx, ty) {
            log::warn!("tile placement out of bounds at ({tx}, {ty})");
            return;
        }
        let idx = self.index(tx, ty);
        self.cells[idx].id = id;
        self.solid_cache = None;

        for ny in (ty - 1)..=(ty + 1) {
            for nx in (tx - 1)..=(tx + 1) {
                if self.in_bounds(nx, ny) {
                    let shape = self.compute_shape(nx, ny);
                    let nidx = self.index(nx, ny);
                    self.cells[nidx].shape = shape;
                }
            }
        }
    }

    /// Rebuild the solid-occupancy cache if a placement dropped it
    pub fn refresh_cache(&mut self) {
        if self.solid_cache.is_some() {
            return;
        }
        let mut cache = Vec::with_capacity(self.cells.len());
        for ty in 0..self.height {
            for tx in 0..self.width {
                cache.push(self.kind_at(tx, ty) == TileKind::Solid);
            }
        }
        self.solid_cache = Some(cache);
    }

    /// 8-neighbor occupancy bitmask; off-grid neighbors count as occupied
    fn compute_shape(&self, tx: i32, ty: i32) -> u8 {
        const NEIGHBORS: [(i32, i32); 8] = [
            (0, -1),  // N
            (1, -1),  // NE
            (1, 0),   // E
            (1, 1),   // SE
            (0, 1),   // S
            (-1, 1),  // SW
            (-1, 0),  // W
            (-1, -1), // NW
        ];
        let mut shape = 0u8;
        for (bit, (dx, dy)) in NEIGHBORS.iter().enumerate() {
            let (nx, ny) = (tx + dx, ty + dy);
            let occupied = if self.in_bounds(nx, ny) {
                self.kind_at(nx, ny) != TileKind::Empty
            } else {
                true
            };
            if occupied {
                shape |= 1 << bit;
            }
        }
        shape
    }

    /// Tile span covered by a pixel rect, clipped to the grid
    fn tile_span(&self, rect: &Aabb) -> Option<(IVec2, IVec2)> {
        let t0 = IVec2::new(
            pixel_to_tile(rect.min.x).max(0),
            pixel_to_tile(rect.min.y).max(0),
        );
        let t1 = IVec2::new(
            pixel_to_tile(rect.max.x - 1).min(self.width - 1),
            pixel_to_tile(rect.max.y - 1).min(self.height - 1),
        );
        if t0.x > t1.x || t0.y > t1.y {
            return None;
        }
        Some((t0, t1))
    }

    /// Does the pixel rect overlap any solid cell?
    pub fn is_occupied(&self, rect: &Aabb) -> bool {
        let Some((t0, t1)) = self.tile_span(rect) else {
            return false;
        };
        for ty in t0.y..=t1.y {
            for tx in t0.x..=t1.x {
                if self.solid_at(tx, ty) {
                    return true;
                }
            }
        }
        false
    }

    /// Does the pixel rect overlap any jump-through cell?
    pub fn jump_thru_overlaps(&self, rect: &Aabb) -> bool {
        let Some((t0, t1)) = self.tile_span(rect) else {
            return false;
        };
        for ty in t0.y..=t1.y {
            for tx in t0.x..=t1.x {
                if self.kind_at(tx, ty) == TileKind::JumpThru {
                    return true;
                }
            }
        }
        false
    }
}
