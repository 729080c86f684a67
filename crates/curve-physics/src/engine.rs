//! A small Newtonian n-body engine behind a shared lock.
//!
//! The engine is cloned into the simulation thread while the render thread
//! reads body state through [`BodyHandle`]s. Every accessor takes the lock
//! once, so each call sees a consistent snapshot.

use glam::DVec3;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::body::{Block, Body, BodyDesc, BodyId, BodyKind};

/// Newtonian constant of gravitation in m³·kg⁻¹·s⁻².
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;

#[derive(Debug, Default)]
struct World {
    next_id: u64,
    /// Sorted by id; ids are handed out in increasing order.
    bodies: Vec<Body>,
}

impl World {
    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id).ok()
    }

    fn get(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(move |i| &mut self.bodies[i])
    }
}

fn read(world: &RwLock<World>) -> RwLockReadGuard<'_, World> {
    world.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(world: &RwLock<World>) -> RwLockWriteGuard<'_, World> {
    world.write().unwrap_or_else(PoisonError::into_inner)
}

/// The physics engine. Cloning yields another handle to the same world.
#[derive(Debug, Clone, Default)]
pub struct PhysicsEngine {
    world: Arc<RwLock<World>>,
}

impl PhysicsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new body and hand it to `on_placed` once, after placement.
    ///
    /// A parented description is resolved to absolute coordinates using the
    /// parent's current position and velocity.
    ///
    /// # Panics
    ///
    /// Panics if `desc.parent` names a body that does not exist.
    pub fn spawn(&self, desc: BodyDesc, on_placed: impl FnOnce(&BodyHandle)) -> BodyHandle {
        let id = {
            let mut world = write(&self.world);
            let (base_position, base_velocity) = match desc.parent {
                Some(parent) => {
                    let parent = world
                        .get(parent)
                        .unwrap_or_else(|| panic!("parent {parent} does not exist"));
                    (parent.position, parent.velocity)
                }
                None => (DVec3::ZERO, DVec3::ZERO),
            };
            let id = BodyId(world.next_id);
            world.next_id += 1;
            world.bodies.push(Body {
                id,
                kind: desc.kind,
                parent: desc.parent,
                position: base_position + desc.position,
                velocity: base_velocity + desc.velocity,
                blocks: Vec::new(),
            });
            id
        };
        debug!(%id, kind = ?desc.kind, parent = ?desc.parent, "spawned body");

        let handle = BodyHandle {
            id,
            world: Arc::clone(&self.world),
        };
        on_placed(&handle);
        handle
    }

    /// A handle to an existing body.
    pub fn handle(&self, id: BodyId) -> Option<BodyHandle> {
        read(&self.world).get(id).map(|_| BodyHandle {
            id,
            world: Arc::clone(&self.world),
        })
    }

    /// Remove a body. Handles to it become invalid.
    pub fn remove(&self, id: BodyId) -> bool {
        let mut world = write(&self.world);
        match world.index_of(id) {
            Some(index) => {
                world.bodies.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn body_count(&self) -> usize {
        read(&self.world).bodies.len()
    }

    /// Advance the world by `dt` seconds with semi-implicit Euler.
    ///
    /// Gravity pulls every body toward every massive body. Separations
    /// inside a source's radius are clamped to the radius.
    pub fn step(&self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let mut world = write(&self.world);

        let sources: Vec<(DVec3, f64, f64)> = world
            .bodies
            .iter()
            .map(|b| (b.position, b.mass(), b.radius()))
            .collect();

        for (i, body) in world.bodies.iter_mut().enumerate() {
            let mut acceleration = DVec3::ZERO;
            for (j, &(position, mass, radius)) in sources.iter().enumerate() {
                if i == j || mass <= 0.0 {
                    continue;
                }
                let delta = position - body.position;
                let dist2 = delta.length_squared().max(radius * radius);
                if dist2 == 0.0 {
                    continue;
                }
                acceleration += delta * (GRAVITATIONAL_CONSTANT * mass / (dist2 * dist2.sqrt()));
            }
            body.velocity += acceleration * dt;
            body.position += body.velocity * dt;
            for block in &mut body.blocks {
                block.tick(dt);
            }
        }
    }
}

/// A reference to one body in a [`PhysicsEngine`].
///
/// Accessors panic if the body has been removed from the engine; holding a
/// handle to a removed body is a caller bug.
#[derive(Clone)]
pub struct BodyHandle {
    id: BodyId,
    world: Arc<RwLock<World>>,
}

impl BodyHandle {
    pub fn id(&self) -> BodyId {
        self.id
    }

    fn with_body<R>(&self, f: impl FnOnce(&Body) -> R) -> R {
        let world = read(&self.world);
        match world.get(self.id) {
            Some(body) => f(body),
            None => panic!("{} no longer exists in the physics engine", self.id),
        }
    }

    fn with_body_mut<R>(&self, f: impl FnOnce(&mut Body) -> R) -> R {
        let mut world = write(&self.world);
        match world.get_mut(self.id) {
            Some(body) => f(body),
            None => panic!("{} no longer exists in the physics engine", self.id),
        }
    }

    /// Whether the body still exists.
    pub fn is_alive(&self) -> bool {
        read(&self.world).get(self.id).is_some()
    }

    pub fn kind(&self) -> BodyKind {
        self.with_body(|b| b.kind)
    }

    pub fn parent(&self) -> Option<BodyId> {
        self.with_body(|b| b.parent)
    }

    /// Absolute position in meters.
    pub fn position(&self) -> DVec3 {
        self.with_body(|b| b.position)
    }

    /// Absolute velocity in meters per second.
    pub fn velocity(&self) -> DVec3 {
        self.with_body(|b| b.velocity)
    }

    pub fn set_velocity(&self, velocity: DVec3) {
        self.with_body_mut(|b| b.velocity = velocity);
    }

    /// Add `delta` to the velocity under a single lock.
    pub fn add_velocity(&self, delta: DVec3) {
        self.with_body_mut(|b| b.velocity += delta);
    }

    /// Largest block radius in meters.
    pub fn radius(&self) -> f64 {
        self.with_body(Body::radius)
    }

    /// Sum of block masses in kilograms.
    pub fn mass(&self) -> f64 {
        self.with_body(Body::mass)
    }

    pub fn add_block(&self, block: impl Block + 'static) {
        self.with_body_mut(|b| b.blocks.push(Box::new(block)));
    }

    /// Re-parent the body, placing it at `position` with `velocity`
    /// relative to `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either body does not exist.
    pub fn attach_to(&self, parent: &BodyHandle, position: DVec3, velocity: DVec3) {
        let (base_position, base_velocity) = (parent.position(), parent.velocity());
        let parent_id = parent.id();
        self.with_body_mut(|b| {
            b.parent = Some(parent_id);
            b.position = base_position + position;
            b.velocity = base_velocity + velocity;
        });
    }
}

impl std::fmt::Debug for BodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyHandle").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::MassBlock;
    use std::cell::Cell;

    #[test]
    fn test_spawn_invokes_callback_once_after_placement() {
        let engine = PhysicsEngine::new();
        let calls = Cell::new(0);
        let handle = engine.spawn(
            BodyDesc::new(BodyKind::Natural, DVec3::new(1.0, 2.0, 3.0)),
            |body| {
                calls.set(calls.get() + 1);
                assert_eq!(body.position(), DVec3::new(1.0, 2.0, 3.0));
                body.add_block(MassBlock::new(10.0, 2.0));
            },
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(handle.mass(), 10.0);
        assert_eq!(handle.radius(), 2.0);
        assert_eq!(engine.body_count(), 1);
    }

    #[test]
    fn test_parented_spawn_is_absolute() {
        let engine = PhysicsEngine::new();
        let sun = engine.spawn(
            BodyDesc::new(BodyKind::Natural, DVec3::ZERO).with_velocity(DVec3::Y),
            |_| {},
        );
        let earth = engine.spawn(
            BodyDesc::new(BodyKind::Natural, DVec3::new(-1.496e11, 0.0, 0.0))
                .with_parent(sun.id())
                .with_velocity(DVec3::new(0.0, 0.0, 2.97222e4)),
            |_| {},
        );
        assert_eq!(earth.position(), DVec3::new(-1.496e11, 0.0, 0.0));
        assert_eq!(earth.velocity(), DVec3::new(0.0, 1.0, 2.97222e4));
        assert_eq!(earth.parent(), Some(sun.id()));
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn test_unknown_parent_panics() {
        let engine = PhysicsEngine::new();
        let other = PhysicsEngine::new();
        let stranger = other.spawn(BodyDesc::default(), |_| {});
        engine.spawn(BodyDesc::default().with_parent(stranger.id()), |_| {});
    }

    #[test]
    fn test_step_moves_by_velocity() {
        let engine = PhysicsEngine::new();
        let body = engine.spawn(
            BodyDesc::new(BodyKind::Living, DVec3::ZERO).with_velocity(DVec3::new(5.0, 0.0, 0.0)),
            |_| {},
        );
        engine.step(2.0);
        assert_eq!(body.position(), DVec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_gravity_pulls_toward_mass() {
        let engine = PhysicsEngine::new();
        let _earth = engine.spawn(BodyDesc::default(), |b| {
            b.add_block(MassBlock::new(5.972e24, 6.371e6))
        });
        let satellite = engine.spawn(
            BodyDesc::new(BodyKind::Living, DVec3::new(6.371e6, 0.0, 0.0)),
            |_| {},
        );
        engine.step(1.0);
        let v = satellite.velocity();
        // Surface gravity is about 9.8 m/s².
        assert!(v.x < 0.0);
        assert!((v.x + 9.82).abs() < 0.05, "unexpected surface gravity {}", v.x);
    }

    #[test]
    fn test_non_positive_dt_is_ignored() {
        let engine = PhysicsEngine::new();
        let body = engine.spawn(BodyDesc::default().with_velocity(DVec3::X), |_| {});
        engine.step(0.0);
        engine.step(f64::NAN);
        assert_eq!(body.position(), DVec3::ZERO);
    }

    #[test]
    fn test_add_velocity() {
        let engine = PhysicsEngine::new();
        let body = engine.spawn(BodyDesc::default().with_velocity(DVec3::X), |_| {});
        body.add_velocity(DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(body.velocity(), DVec3::new(2.0, 2.0, 0.0));
        body.set_velocity(DVec3::ZERO);
        assert_eq!(body.velocity(), DVec3::ZERO);
    }

    #[test]
    fn test_attach_to_reparents() {
        let engine = PhysicsEngine::new();
        let earth = engine.spawn(
            BodyDesc::new(BodyKind::Natural, DVec3::new(-1.0e11, 0.0, 0.0))
                .with_velocity(DVec3::new(0.0, 0.0, 3.0e4)),
            |_| {},
        );
        let player = engine.spawn(BodyDesc::new(BodyKind::Living, DVec3::ZERO), |_| {});
        player.attach_to(&earth, DVec3::new(0.0, 1.0e7, 0.0), DVec3::ZERO);
        assert_eq!(player.parent(), Some(earth.id()));
        assert_eq!(player.position(), DVec3::new(-1.0e11, 1.0e7, 0.0));
        assert_eq!(player.velocity(), DVec3::new(0.0, 0.0, 3.0e4));
    }

    #[test]
    #[should_panic(expected = "no longer exists")]
    fn test_removed_body_access_panics() {
        let engine = PhysicsEngine::new();
        let body = engine.spawn(BodyDesc::default(), |_| {});
        assert!(engine.remove(body.id()));
        assert!(!body.is_alive());
        body.position();
    }
}
