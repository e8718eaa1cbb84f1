//! Collision queries against tiles and bodies
//!
//! Two layers answer "would this rect, placed here, hit something": the tile
//! grid (what the world is) and the body arena (who is standing there). A
//! query always excludes the body asking, and only sees bodies that are
//! currently collidable - a solid switches itself off while it resolves its
//! own move.

use glam::IVec2;

use super::body::{BodyArena, BodyHandle, CollisionMask};
use super::bounds::Aabb;
use super::grid::TileGrid;

/// One pixel straight down
pub const DOWN: IVec2 = IVec2::new(0, 1);

/// Is the rect blocked by a solid tile or another collidable body?
///
/// Jump-through tiles never block here; they only matter to descending
/// steps (see [`step_blocked`]).
pub fn rect_blocked(
    grid: &TileGrid,
    bodies: &BodyArena,
    rect: &Aabb,
    exclude: Option<BodyHandle>,
    mask: CollisionMask,
) -> bool {
    if grid.is_occupied(rect) {
        return true;
    }
    if mask == CollisionMask::Tiles {
        return false;
    }
    for (handle, body) in bodies.iter() {
        if Some(handle) == exclude || !body.collidable {
            continue;
        }
        if body.is_actor() && mask != CollisionMask::TilesAndBodies {
            continue;
        }
        if body.world_box().intersects(rect) {
            return true;
        }
    }
    false
}

/// Per-step blocking test for a move from `cur` to the adjacent `cand`
///
/// Adds the jump-through rule on top of [`rect_blocked`]: a downward step is
/// blocked by a jump-through surface only when the candidate overlaps one the
/// current rect does not - approached from above, not already inside it.
pub fn step_blocked(
    grid: &TileGrid,
    bodies: &BodyArena,
    cur: &Aabb,
    cand: &Aabb,
    exclude: Option<BodyHandle>,
    mask: CollisionMask,
    descending: bool,
) -> bool {
    if rect_blocked(grid, bodies, cand, exclude, mask) {
        return true;
    }
    descending && grid.jump_thru_overlaps(cand) && !grid.jump_thru_overlaps(cur)
}

/// Is the body standing on something one pixel below?
pub fn on_ground(grid: &TileGrid, bodies: &BodyArena, handle: BodyHandle) -> bool {
    let Some(body) = bodies.get(handle) else {
        return false;
    };
    let cur = body.world_box();
    let down = cur.translated(DOWN);
    step_blocked(grid, bodies, &cur, &down, Some(handle), body.mask, true)
}

/// Is `actor` sitting directly atop `solid`, eligible to be carried?
pub fn is_riding(bodies: &BodyArena, actor: BodyHandle, solid: BodyHandle) -> bool {
    if actor == solid {
        return false;
    }
    let (Some(a), Some(s)) = (bodies.get(actor), bodies.get(solid)) else {
        return false;
    };
    s.collidable && a.world_box().translated(DOWN).intersects(&s.world_box())
}
