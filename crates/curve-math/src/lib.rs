//! Double-precision world vectors, single-precision render vectors, and the
//! fixed scale bridge between them.

mod scale;

pub use glam::{DVec3, Vec3};
pub use scale::{
    DEFAULT_POSITION_SCALE, MAX_SAFE_RENDER_COMPONENT, ScaleFactor, to_render_batch,
    to_render_checked, to_render_vector, to_world_vector,
};

/// A position or velocity in physics units (meters), f64 per axis.
pub type WorldVector = DVec3;

/// A position in render units, f32 per axis.
pub type RenderVector = Vec3;
