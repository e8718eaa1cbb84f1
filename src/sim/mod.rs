//! Deterministic simulation module
//!
//! All movement and collision logic lives here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Integer pixel positions, fractional motion carried in remainders
//! - Stable iteration order (by body slot)
//! - No rendering or platform dependencies

pub mod body;
pub mod bounds;
pub mod collide;
pub mod grid;
pub mod mover;
pub mod remainder;
pub mod solid;
pub mod state;
pub mod tick;

pub use body::{Body, BodyArena, BodyHandle, BodyKind, CollisionMask, SquishPolicy};
pub use bounds::{Aabb, LocalBox};
pub use collide::{is_riding, on_ground, rect_blocked, step_blocked};
pub use grid::{TILE_EMPTY, TileCell, TileGrid, TileId, TileKind, TileSet};
pub use mover::{Axis, MoveOutcome};
pub use remainder::Remainder;
pub use solid::move_solid;
pub use state::{Sim, SimEvent};
pub use tick::tick;
