//! Fixed timestep simulation tick
//!
//! Advances the whole simulation deterministically. Resolution order within
//! one tick is a correctness requirement, not a scheduling choice:
//!
//!   1. Every solid moves (pushing and carrying any affected actors,
//!      the player first among them).
//!   2. Every self-integrating actor then moves by its residual velocity,
//!      X before Y, against the already-updated world.
//!
//! Solids-before-actors is what keeps a carried actor from being moved
//! twice, or moved against stale geometry.

use super::mover::MoveOutcome;
use super::state::{Sim, SimEvent};

/// Advance the simulation by one fixed timestep
///
/// Returns the events gathered during resolution (squishes, crushes).
/// Velocities are pixels per second; `dt` is the fixed step in seconds.
pub fn tick(sim: &mut Sim, dt: f32) -> Vec<SimEvent> {
    sim.clear_events();
    sim.grid.refresh_cache();
    sim.time_ticks += 1;

    let handles = sim.bodies.handles();

    // Solids first: each move resolves all its pushes and carries in full
    for &handle in &handles {
        let Some(body) = sim.bodies.get(handle) else {
            continue;
        };
        if !body.is_solid() || !body.integrate_velocity {
            continue;
        }
        let dx = body.vel.x * dt;
        let dy = body.vel.y * dt;
        if dx != 0.0 || dy != 0.0 {
            sim.move_solid(handle, dx, dy);
        }
    }

    // Then actors integrate their own velocity against current geometry
    for &handle in &handles {
        let Some(body) = sim.bodies.get(handle) else {
            continue; // crushed during the solid pass
        };
        if !body.is_actor() || !body.integrate_velocity {
            continue;
        }

        let amount_x = body.vel.x * dt;
        if let MoveOutcome::BlockedAt(_) = sim.move_x(handle, amount_x) {
            if let Some(body) = sim.bodies.get_mut(handle) {
                body.vel.x = 0.0;
            }
        }

        let amount_y = match sim.bodies.get(handle) {
            Some(body) => body.vel.y * dt,
            None => continue,
        };
        if let MoveOutcome::BlockedAt(_) = sim.move_y(handle, amount_y) {
            if let Some(body) = sim.bodies.get_mut(handle) {
                body.vel.y = 0.0;
            }
        }
    }

    sim.drain_events()
}
