//! Solid displacement - pushing, carrying, and squishing actors
//!
//! Solids move through tiles to wherever they are driven; it is the actors
//! around them that get diverted. One solid move resolves the X axis in full
//! (raw advance, then every affected actor pushed or carried) before Y
//! begins, so a diagonal move decomposes into two flush resolutions and
//! nothing tunnels through a corner.
//!
//! While a solid resolves its own move it is not collidable: it must not
//! obstruct the very bodies it is displacing. The flag is flipped inside a
//! closure scope so every exit path restores it.

use super::body::{BodyArena, BodyHandle, SquishPolicy};
use super::collide::is_riding;
use super::grid::TileGrid;
use super::mover::{Axis, walk_axis};
use super::state::SimEvent;
use crate::config::SimConfig;

/// Displace a solid by a fractional delta, resolving every affected actor
///
/// The player (when registered) is resolved before all other actors so it is
/// always the first body pushed exactly flush. Squish is signaled at most
/// once per actor per event batch.
#[allow(clippy::too_many_arguments)]
pub fn move_solid(
    grid: &TileGrid,
    bodies: &mut BodyArena,
    config: &SimConfig,
    player: Option<BodyHandle>,
    solid: BodyHandle,
    dx: f32,
    dy: f32,
    events: &mut Vec<SimEvent>,
) {
    let Some(body) = bodies.get_mut(solid) else {
        log::warn!("move_solid on a despawned body");
        return;
    };
    debug_assert!(body.is_solid(), "move_solid on a non-solid body");

    // Zero deltas never disturb the carried fraction
    let mx = if dx != 0.0 { body.rem_x.integrate(dx) } else { 0 };
    let my = if dy != 0.0 { body.rem_y.integrate(dy) } else { 0 };
    if mx == 0 && my == 0 {
        return;
    }

    // Snapshot who is affected while the solid is still collidable: the
    // ordered actor list (player first) and the set riding this solid.
    let actors = actor_order(bodies, player, solid);
    let riding: Vec<BodyHandle> = actors
        .iter()
        .copied()
        .filter(|&a| is_riding(bodies, a, solid))
        .collect();

    with_collidable_off(bodies, solid, |bodies| {
        if mx != 0 {
            shift_axis(
                grid, bodies, config, solid, Axis::X, mx, &actors, &riding, events,
            );
        }
        if my != 0 {
            shift_axis(
                grid, bodies, config, solid, Axis::Y, my, &actors, &riding, events,
            );
        }
    });
}

/// Run `f` with the body's collidable flag off, restoring it afterwards
///
/// The restore sits on the single return path below the closure call, so an
/// early return inside `f` cannot leave the flag stuck off.
fn with_collidable_off<R>(
    bodies: &mut BodyArena,
    handle: BodyHandle,
    f: impl FnOnce(&mut BodyArena) -> R,
) -> R {
    let prev = bodies
        .get_mut(handle)
        .map(|body| std::mem::replace(&mut body.collidable, false));
    let out = f(bodies);
    if let (Some(prev), Some(body)) = (prev, bodies.get_mut(handle)) {
        body.collidable = prev;
    }
    out
}

/// All live actors, player handle first
fn actor_order(
    bodies: &BodyArena,
    player: Option<BodyHandle>,
    solid: BodyHandle,
) -> Vec<BodyHandle> {
    let mut order = Vec::new();
    if let Some(p) = player {
        if bodies.contains(p) {
            order.push(p);
        }
    }
    for (handle, body) in bodies.iter() {
        if handle == solid || Some(handle) == player || !body.is_actor() {
            continue;
        }
        order.push(handle);
    }
    order
}

/// Advance the solid by `delta` whole pixels on one axis and resolve actors
#[allow(clippy::too_many_arguments)]
fn shift_axis(
    grid: &TileGrid,
    bodies: &mut BodyArena,
    config: &SimConfig,
    solid: BodyHandle,
    axis: Axis,
    delta: i32,
    actors: &[BodyHandle],
    riding: &[BodyHandle],
    events: &mut Vec<SimEvent>,
) {
    let delta_vec = axis.unit(1) * delta;

    // Solids are keyframed: the advance itself is never collision-tested
    let solid_box = match bodies.get_mut(solid) {
        Some(body) => {
            body.pos += delta_vec;
            body.world_box()
        }
        None => return,
    };

    for &a in actors {
        // Re-read every iteration: an earlier push may have despawned it
        let Some(actor) = bodies.get(a) else {
            continue;
        };
        if !actor.collidable {
            continue;
        }
        let actor_box = actor.world_box();

        if actor_box.intersects(&solid_box) {
            // Push exactly flush with the leading edge in the travel direction
            let amount = match (axis, delta > 0) {
                (Axis::X, true) => solid_box.max.x - actor_box.min.x,
                (Axis::X, false) => solid_box.min.x - actor_box.max.x,
                (Axis::Y, true) => solid_box.max.y - actor_box.min.y,
                (Axis::Y, false) => solid_box.min.y - actor_box.max.y,
            };
            let outcome = walk_axis(grid, bodies, config, a, axis, amount, false);
            if outcome.blocked() {
                squish(bodies, a, events);
            }
        } else if riding.contains(&a) {
            // Carry: raw offset, a rider is assumed already clear of obstructions
            if let Some(actor) = bodies.get_mut(a) {
                actor.pos += delta_vec;
            }
        }
    }
}

/// Signal squish for an actor caught between a solid and something immovable
fn squish(bodies: &mut BodyArena, actor: BodyHandle, events: &mut Vec<SimEvent>) {
    let already = events.iter().any(|event| match event {
        SimEvent::Squished { body } | SimEvent::Crushed { body } => *body == actor,
    });
    if already {
        return;
    }
    let (policy, pos) = match bodies.get(actor) {
        Some(body) => (body.squish, body.pos),
        None => return,
    };
    match policy {
        SquishPolicy::Log => {
            log::debug!("actor {actor:?} squished at {pos:?}");
            events.push(SimEvent::Squished { body: actor });
        }
        SquishPolicy::Ignore => {
            events.push(SimEvent::Squished { body: actor });
        }
        SquishPolicy::Despawn => {
            bodies.remove(actor);
            events.push(SimEvent::Squished { body: actor });
            events.push(SimEvent::Crushed { body: actor });
        }
    }
}
