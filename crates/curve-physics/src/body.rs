//! Bodies, their descriptions and the blocks attached to them.

use glam::DVec3;
use std::fmt;

/// Stable identifier of a body within one [`PhysicsEngine`](crate::PhysicsEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// What a body represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// Stars, planets, moons.
    #[default]
    Natural,
    /// Something alive, such as the player.
    Living,
}

/// A component carried by a body. The body's mass is the sum of its
/// blocks' masses and its radius is the largest block radius.
pub trait Block: Send + Sync {
    /// Mass in kilograms.
    fn mass(&self) -> f64;

    /// Extent in meters.
    fn radius(&self) -> f64 {
        0.0
    }

    /// Called once per physics tick after the body has been integrated.
    fn tick(&mut self, _dt: f64) {}
}

/// A block that only contributes mass and extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassBlock {
    mass: f64,
    radius: f64,
}

impl MassBlock {
    pub fn new(mass: f64, radius: f64) -> Self {
        Self { mass, radius }
    }
}

impl Block for MassBlock {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

/// Parameters for spawning a body.
///
/// `position` and `velocity` are relative to `parent` when one is given.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub parent: Option<BodyId>,
    pub position: DVec3,
    pub velocity: DVec3,
}

impl BodyDesc {
    pub fn new(kind: BodyKind, position: DVec3) -> Self {
        Self {
            kind,
            position,
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: BodyId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Engine-side state of one body. Positions and velocities are absolute.
pub(crate) struct Body {
    pub(crate) id: BodyId,
    pub(crate) kind: BodyKind,
    pub(crate) parent: Option<BodyId>,
    pub(crate) position: DVec3,
    pub(crate) velocity: DVec3,
    pub(crate) blocks: Vec<Box<dyn Block>>,
}

impl Body {
    pub(crate) fn mass(&self) -> f64 {
        self.blocks.iter().map(|b| b.mass()).sum()
    }

    pub(crate) fn radius(&self) -> f64 {
        self.blocks.iter().map(|b| b.radius()).fold(0.0, f64::max)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("blocks", &self.blocks.len())
            .finish()
    }
}
