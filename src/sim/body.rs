//! Bodies and their arena storage
//!
//! Two kinds of body share one struct: actors (passively moved, diverted by
//! collision) and solids (actively displace actors, pass through tiles).
//! Bodies live in a generational arena; handles stay copyable and cheap, and
//! a handle to a despawned body simply resolves to nothing.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::bounds::{Aabb, LocalBox};
use super::remainder::Remainder;

/// Which obstacles a body tests against when it moves itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionMask {
    /// Tiles only (e.g. particles of debris)
    Tiles,
    /// Tiles and collidable solids (typical projectile)
    TilesAndSolids,
    /// Tiles, collidable solids, and other collidable actors
    #[default]
    TilesAndBodies,
}

/// Reaction when a body is pushed by a solid while blocked from escaping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SquishPolicy {
    /// Emit a diagnostic log and keep the body (default)
    #[default]
    Log,
    /// Do nothing
    Ignore,
    /// Remove the body from the simulation
    Despawn,
}

/// Actor or solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moves itself, gets diverted, pushed, carried, and squished
    Actor,
    /// Moves through tiles to its keyframed position, displacing actors
    Solid,
}

/// A moving body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub kind: BodyKind,
    /// Integer pixel position of the body origin
    pub pos: IVec2,
    /// Velocity in pixels per second
    pub vel: Vec2,
    /// Carried sub-pixel distance, per axis
    pub rem_x: Remainder,
    pub rem_y: Remainder,
    /// Collision box, offset fixed at attach time
    pub local_box: LocalBox,
    /// Off only transiently while a solid resolves its own move
    pub collidable: bool,
    /// Whether the tick loop integrates `vel` for this body
    pub integrate_velocity: bool,
    /// Whether horizontal steps may auto-correct up/down one-pixel ledges
    pub allow_slopes: bool,
    /// Obstacle set for self-moves
    pub mask: CollisionMask,
    /// Reaction to being crushed
    pub squish: SquishPolicy,
}

impl Body {
    /// An actor with gameplay defaults: self-integrating, slope-correcting
    pub fn actor(pos: IVec2, local_box: LocalBox) -> Self {
        Self {
            kind: BodyKind::Actor,
            pos,
            vel: Vec2::ZERO,
            rem_x: Remainder::default(),
            rem_y: Remainder::default(),
            local_box,
            collidable: true,
            integrate_velocity: true,
            allow_slopes: true,
            mask: CollisionMask::default(),
            squish: SquishPolicy::default(),
        }
    }

    /// A projectile-style actor: no slope correction, ignores other actors
    pub fn projectile(pos: IVec2, local_box: LocalBox) -> Self {
        Self {
            allow_slopes: false,
            mask: CollisionMask::TilesAndSolids,
            ..Self::actor(pos, local_box)
        }
    }

    /// A solid with platform defaults: keyframed externally unless given a velocity
    pub fn solid(pos: IVec2, local_box: LocalBox) -> Self {
        Self {
            kind: BodyKind::Solid,
            pos,
            vel: Vec2::ZERO,
            rem_x: Remainder::default(),
            rem_y: Remainder::default(),
            local_box,
            collidable: true,
            integrate_velocity: true,
            allow_slopes: false,
            mask: CollisionMask::Tiles,
            squish: SquishPolicy::Ignore,
        }
    }

    /// World-space collision rect at the current position
    #[inline]
    pub fn world_box(&self) -> Aabb {
        self.local_box.world(self.pos)
    }

    #[inline]
    pub fn is_actor(&self) -> bool {
        self.kind == BodyKind::Actor
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.kind == BodyKind::Solid
    }
}

/// Stable id for a body slot: slot index plus a generation that is bumped on
/// reuse, so handles to despawned bodies go stale instead of aliasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle {
    slot: u32,
    generation: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Generational arena of bodies
///
/// Iteration is in slot order, which equals spawn order while no slot has
/// been reused; either way the order is stable within a tick, which is what
/// determinism needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BodyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert(&mut self, body: Body) -> BodyHandle {
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.body = Some(body);
            BodyHandle {
                slot,
                generation: entry.generation,
            }
        } else {
            let slot = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                body: Some(body),
            });
            BodyHandle {
                slot,
                generation: 0,
            }
        }
    }

    /// Remove a body, freeing its slot for reuse
    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let entry = self.slots.get_mut(handle.slot as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        let body = entry.body.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(handle.slot);
        Some(body)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        let entry = self.slots.get(handle.slot as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.body.as_ref()
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let entry = self.slots.get_mut(handle.slot as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.body.as_mut()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Live bodies in slot order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.slots.iter().enumerate().filter_map(|(i, entry)| {
            entry.body.as_ref().map(|body| {
                (
                    BodyHandle {
                        slot: i as u32,
                        generation: entry.generation,
                    },
                    body,
                )
            })
        })
    }

    /// Live handles in slot order, collected so callers can mutate while walking
    pub fn handles(&self) -> Vec<BodyHandle> {
        self.iter().map(|(h, _)| h).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_body() -> Body {
        Body::actor(IVec2::new(0, 0), LocalBox::from_size(8, 8))
    }

    #[test]
    fn test_insert_get_remove() {
        let mut arena = BodyArena::new();
        let h = arena.insert(test_body());
        assert!(arena.contains(h));
        assert_eq!(arena.len(), 1);

        let body = arena.remove(h).unwrap();
        assert!(body.is_actor());
        assert!(!arena.contains(h));
        assert!(arena.is_empty());
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut arena = BodyArena::new();
        let h0 = arena.insert(test_body());
        arena.remove(h0);

        // The freed slot is reused under a new generation
        let h1 = arena.insert(test_body());
        assert!(arena.get(h0).is_none());
        assert!(arena.get(h1).is_some());
        assert!(arena.remove(h0).is_none());
    }

    #[test]
    fn test_iteration_is_slot_ordered() {
        let mut arena = BodyArena::new();
        let a = arena.insert(test_body());
        let b = arena.insert(test_body());
        let c = arena.insert(test_body());
        arena.remove(b);

        let order: Vec<BodyHandle> = arena.handles();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn test_mutation_through_handle() {
        let mut arena = BodyArena::new();
        let h = arena.insert(test_body());
        arena.get_mut(h).unwrap().pos = IVec2::new(5, -3);
        assert_eq!(arena.get(h).unwrap().pos, IVec2::new(5, -3));
    }
}
