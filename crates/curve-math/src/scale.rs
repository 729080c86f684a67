use glam::{DVec3, Vec3};
use std::fmt;

/// Default world-to-render divisor: 2²³.
///
/// At this scale one render unit is ~8 389 km, so a 1 AU separation maps to
/// ~17 800 render units, comfortably inside f32's exact-integer range.
pub const DEFAULT_POSITION_SCALE: f64 = 8_388_608.0;

/// Largest render-space component magnitude that still renders without
/// visible jitter.
pub const MAX_SAFE_RENDER_COMPONENT: f32 = 1.0e5;

/// Divisor applied to every world vector before it is handed to the renderer.
///
/// Chosen once at startup and never mutated afterwards: mesh radii, the
/// camera far plane and the LOD hysteresis band are all derived from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Create a scale factor.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is not a positive finite number.
    pub fn new(factor: f64) -> Self {
        assert!(
            factor.is_finite() && factor > 0.0,
            "scale factor must be positive and finite, got {factor}"
        );
        Self(factor)
    }

    /// The raw divisor.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Divide in f64, then narrow to f32.
    pub fn to_render(self, world: DVec3) -> Vec3 {
        (world / self.0).as_vec3()
    }

    /// Widen to f64, then multiply.
    pub fn to_world(self, render: Vec3) -> DVec3 {
        render.as_dvec3() * self.0
    }

    /// Convert a world-space length to render units, staying in f64.
    pub fn to_render_distance(self, world_distance: f64) -> f64 {
        world_distance / self.0
    }

    /// Convert a render-space length to world units.
    pub fn to_world_distance(self, render_distance: f64) -> f64 {
        render_distance * self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(DEFAULT_POSITION_SCALE)
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1:{:e}", self.0)
    }
}

/// Convert a world vector to a render vector.
pub fn to_render_vector(world: DVec3, scale: ScaleFactor) -> Vec3 {
    scale.to_render(world)
}

/// Convert a render vector back to a world vector.
pub fn to_world_vector(render: Vec3, scale: ScaleFactor) -> DVec3 {
    scale.to_world(render)
}

/// Like [`to_render_vector`], but returns `Err` if any axis leaves the
/// jitter-free range. The converted value is carried in both variants.
pub fn to_render_checked(world: DVec3, scale: ScaleFactor) -> Result<Vec3, Vec3> {
    let render = scale.to_render(world);
    if render.abs().max_element() > MAX_SAFE_RENDER_COMPONENT || !render.is_finite() {
        Err(render)
    } else {
        Ok(render)
    }
}

/// Convert a slice of world vectors. Called once per frame for every body.
pub fn to_render_batch(positions: &[DVec3], scale: ScaleFactor, out: &mut Vec<Vec3>) {
    out.clear();
    out.reserve(positions.len());
    out.extend(positions.iter().map(|&p| scale.to_render(p)));
}
