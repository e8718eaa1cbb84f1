//! Per-axis unit-step movement
//!
//! All motion resolves through the same walk: take the integer step count for
//! one axis and advance one pixel at a time, testing each candidate rect
//! before committing it. A blocked step ends the walk and discards whatever
//! steps remained; the fractional remainder is untouched, so sub-pixel
//! progress is never lost to a wall.
//!
//! Horizontal walks may fold in a one-pixel vertical correction to climb or
//! hug single-pixel terrain steps. Both corrections are gated per body and
//! globally, and a corrected step is still one committed step, not a
//! collision.

use glam::IVec2;

use super::body::{BodyArena, BodyHandle};
use super::collide::{DOWN, on_ground, rect_blocked, step_blocked};
use super::grid::TileGrid;
use crate::config::SimConfig;

/// One pixel straight up
pub const UP: IVec2 = IVec2::new(0, -1);

/// Movement axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Unit step along the axis with the given sign
    #[inline]
    pub fn unit(self, sign: i32) -> IVec2 {
        match self {
            Axis::X => IVec2::new(sign, 0),
            Axis::Y => IVec2::new(0, sign),
        }
    }
}

/// Result of a per-axis move
///
/// Callers pattern-match instead of passing collision callbacks; the tick
/// loop zeroes the blocked velocity component, gameplay reacts as it likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Every requested step committed
    Moved,
    /// Walk stopped against an obstacle; holds the body position at the stop
    BlockedAt(IVec2),
    /// A forced push could not be fully resolved (the pushed body is trapped)
    Squished,
}

impl MoveOutcome {
    /// True for any outcome other than a clean move
    #[inline]
    pub fn blocked(&self) -> bool {
        !matches!(self, MoveOutcome::Moved)
    }
}

/// Integrate a fractional amount on the X axis and walk the resulting steps
pub fn move_body_x(
    grid: &TileGrid,
    bodies: &mut BodyArena,
    config: &SimConfig,
    handle: BodyHandle,
    amount: f32,
) -> MoveOutcome {
    // Zero-amount moves are silent no-ops regardless of carried fraction
    if amount == 0.0 {
        return MoveOutcome::Moved;
    }
    let Some(body) = bodies.get_mut(handle) else {
        log::warn!("move_body_x on a despawned body");
        return MoveOutcome::Moved;
    };
    let steps = body.rem_x.integrate(amount);
    let slopes = body.allow_slopes;
    walk_axis(grid, bodies, config, handle, Axis::X, steps, slopes)
}

/// Integrate a fractional amount on the Y axis and walk the resulting steps
pub fn move_body_y(
    grid: &TileGrid,
    bodies: &mut BodyArena,
    config: &SimConfig,
    handle: BodyHandle,
    amount: f32,
) -> MoveOutcome {
    if amount == 0.0 {
        return MoveOutcome::Moved;
    }
    let Some(body) = bodies.get_mut(handle) else {
        log::warn!("move_body_y on a despawned body");
        return MoveOutcome::Moved;
    };
    let steps = body.rem_y.integrate(amount);
    walk_axis(grid, bodies, config, handle, Axis::Y, steps, false)
}

/// Walk an exact integer step count along one axis
///
/// The slope corrections only apply when `allow_slopes` is set; forced pushes
/// pass `false` so a crushed body is never stepped around its crusher.
pub(crate) fn walk_axis(
    grid: &TileGrid,
    bodies: &mut BodyArena,
    config: &SimConfig,
    handle: BodyHandle,
    axis: Axis,
    steps: i32,
    allow_slopes: bool,
) -> MoveOutcome {
    if steps == 0 {
        return MoveOutcome::Moved;
    }
    let sign = steps.signum();
    let step_vec = axis.unit(sign);
    let descending = axis == Axis::Y && sign > 0;
    let mut n = steps;

    while n != 0 {
        let Some(body) = bodies.get(handle) else {
            return MoveOutcome::Moved;
        };
        let pos = body.pos;
        let mask = body.mask;
        let cur = body.world_box();
        let cand = cur.translated(step_vec);

        let committed = if !step_blocked(grid, bodies, &cur, &cand, Some(handle), mask, descending)
        {
            let mut delta = step_vec;
            // Descend: keep hugging ground that drops a single pixel
            if axis == Axis::X
                && allow_slopes
                && config.slope_descend
                && on_ground(grid, bodies, handle)
            {
                let down1 = cand.translated(DOWN);
                let down2 = down1.translated(DOWN);
                if !step_blocked(grid, bodies, &cand, &down1, Some(handle), mask, true)
                    && step_blocked(grid, bodies, &down1, &down2, Some(handle), mask, true)
                {
                    delta += DOWN;
                }
            }
            Some(delta)
        } else if axis == Axis::X && allow_slopes && config.slope_climb {
            // Climb: the same step one pixel up may be clear
            let raised = cand.translated(UP);
            if !rect_blocked(grid, bodies, &raised, Some(handle), mask) {
                Some(step_vec + UP)
            } else {
                None
            }
        } else {
            None
        };

        match committed {
            Some(delta) => {
                match bodies.get_mut(handle) {
                    Some(body) => body.pos = pos + delta,
                    None => return MoveOutcome::Moved,
                }
                n -= sign;
            }
            None => return MoveOutcome::BlockedAt(pos),
        }
    }
    MoveOutcome::Moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TILE_SIZE as TILE;
    use crate::sim::body::Body;
    use crate::sim::bounds::{Aabb, LocalBox};
    use crate::sim::grid::{TileKind, TileSet};

    fn test_grid() -> TileGrid {
        let mut tileset = TileSet::new();
        tileset.register(1, TileKind::Solid);
        TileGrid::new(16, 16, tileset)
    }

    fn setup() -> (TileGrid, BodyArena, SimConfig) {
        (test_grid(), BodyArena::new(), SimConfig::default())
    }

    fn actor_at(bodies: &mut BodyArena, x: i32, y: i32) -> BodyHandle {
        bodies.insert(Body::actor(IVec2::new(x, y), LocalBox::from_size(8, 8)))
    }

    #[test]
    fn test_walk_stops_flush_at_wall() {
        let (mut grid, mut bodies, config) = setup();
        // Wall column at x 24..32
        for ty in 0..16 {
            grid.set_tile(3, ty, 1);
        }
        let h = actor_at(&mut bodies, 13, 0);

        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::X, 10, false);
        let body = bodies.get(h).unwrap();
        // Right edge flush against the wall, remaining steps discarded
        assert_eq!(body.pos.x, 16);
        assert_eq!(outcome, MoveOutcome::BlockedAt(IVec2::new(16, 0)));
        assert!(!grid.is_occupied(&body.world_box()));
    }

    #[test]
    fn test_zero_amount_is_idempotent() {
        let (grid, mut bodies, config) = setup();
        let h = actor_at(&mut bodies, 5, 5);
        // Load the remainder near a whole step
        bodies.get_mut(h).unwrap().rem_x.integrate(0.49);

        let outcome = move_body_x(&grid, &mut bodies, &config, h, 0.0);
        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(bodies.get(h).unwrap().pos, IVec2::new(5, 5));
    }

    #[test]
    fn test_fractional_amounts_accumulate() {
        let (grid, mut bodies, config) = setup();
        let h = actor_at(&mut bodies, 0, 0);

        for _ in 0..10 {
            let outcome = move_body_x(&grid, &mut bodies, &config, h, 0.3);
            assert_eq!(outcome, MoveOutcome::Moved);
        }
        assert_eq!(bodies.get(h).unwrap().pos.x, 3);
    }

    #[test]
    fn test_slope_climb_single_pixel_step() {
        let (mut grid, mut bodies, config) = setup();
        // Ledge tile at x 8..16, y 16..24; actor bottom edge one pixel into it
        grid.set_tile(1, 2, 1);
        let h = actor_at(&mut bodies, 0, 9); // box y 9..17

        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::X, 1, true);
        // One step commits both +1 x and -1 y, and is not a collision
        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(bodies.get(h).unwrap().pos, IVec2::new(1, 8));
    }

    #[test]
    fn test_slope_climb_respects_flags() {
        let (mut grid, mut bodies, mut config) = setup();
        grid.set_tile(1, 2, 1);

        // Per-body flag off
        let h = actor_at(&mut bodies, 0, 9);
        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::X, 1, false);
        assert_eq!(outcome, MoveOutcome::BlockedAt(IVec2::new(0, 9)));

        // Global toggle off
        config.slope_climb = false;
        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::X, 1, true);
        assert!(outcome.blocked());
    }

    #[test]
    fn test_slope_climb_blocked_by_ceiling() {
        let (mut grid, mut bodies, config) = setup();
        grid.set_tile(1, 2, 1); // the step
        grid.set_tile(1, 1, 1); // blocked above it too - nowhere to climb
        let h = actor_at(&mut bodies, 0, 9);

        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::X, 1, true);
        assert_eq!(outcome, MoveOutcome::BlockedAt(IVec2::new(0, 9)));
    }

    #[test]
    fn test_slope_descend_hugs_dropping_ground() {
        let (grid, mut bodies, config) = setup();
        // Two solid floors, the right one a single pixel lower
        bodies.insert(Body::solid(IVec2::new(0, 16), LocalBox::from_size(8, 8)));
        bodies.insert(Body::solid(IVec2::new(8, 17), LocalBox::from_size(8, 8)));
        let h = actor_at(&mut bodies, 7, 8); // feet at y 16, about to clear the edge

        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::X, 1, true);
        assert_eq!(outcome, MoveOutcome::Moved);
        // Stepped ahead and one pixel down, flush on the lower floor
        assert_eq!(bodies.get(h).unwrap().pos, IVec2::new(8, 9));
        assert!(on_ground(&grid, &bodies, h));
    }

    #[test]
    fn test_slope_descend_requires_ground() {
        let (grid, mut bodies, config) = setup();
        bodies.insert(Body::solid(IVec2::new(8, 17), LocalBox::from_size(8, 8)));
        // Airborne actor: same geometry ahead, but no ground under it now
        let h = actor_at(&mut bodies, 7, 8);

        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::X, 1, true);
        assert_eq!(outcome, MoveOutcome::Moved);
        // No downward correction while airborne
        assert_eq!(bodies.get(h).unwrap().pos, IVec2::new(8, 8));
    }

    #[test]
    fn test_vertical_walk_lands_flush() {
        let (mut grid, mut bodies, config) = setup();
        grid.set_tile(0, 4, 1); // floor at y 32..40
        let h = actor_at(&mut bodies, 0, 10);

        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::Y, 50, true);
        let body = bodies.get(h).unwrap();
        assert_eq!(body.pos.y, 24); // feet at y 32
        assert!(matches!(outcome, MoveOutcome::BlockedAt(_)));
        assert!(!grid.is_occupied(&body.world_box()));
    }

    #[test]
    fn test_walk_blocked_by_other_actor() {
        let (grid, mut bodies, config) = setup();
        let h = actor_at(&mut bodies, 0, 0);
        actor_at(&mut bodies, 12, 0);

        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::X, 10, false);
        assert_eq!(bodies.get(h).unwrap().pos.x, 4);
        assert!(outcome.blocked());
    }

    #[test]
    fn test_projectile_ignores_actors_stops_at_tiles() {
        let (mut grid, mut bodies, config) = setup();
        for ty in 0..16 {
            grid.set_tile(8, ty, 1); // wall at x 64..72
        }
        actor_at(&mut bodies, 20, 0);
        let h = bodies.insert(Body::projectile(IVec2::new(0, 2), LocalBox::from_size(4, 4)));

        let outcome = walk_axis(&grid, &mut bodies, &config, h, Axis::X, 100, false);
        // Sails through the actor, stops flush at the wall
        assert_eq!(bodies.get(h).unwrap().pos.x, 60);
        assert!(outcome.blocked());
    }

    #[test]
    fn test_no_penetration_after_any_walk() {
        let (mut grid, mut bodies, config) = setup();
        for tx in 0..16 {
            grid.set_tile(tx, 8, 1);
        }
        grid.set_tile(6, 7, 1);
        let h = actor_at(&mut bodies, 0, TILE * 7);

        for steps in [3, 40, -2, 25] {
            walk_axis(&grid, &mut bodies, &config, h, Axis::X, steps, true);
            let rect: Aabb = bodies.get(h).unwrap().world_box();
            assert!(!grid.is_occupied(&rect));
        }
    }
}
