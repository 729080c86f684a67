//! Tessellation level from apparent size, and the hysteresis band that
//! decides when to re-evaluate it.

use curve_math::ScaleFactor;
use std::f64::consts::TAU;

/// Chooses a sphere segment count from the body's apparent angular size.
///
/// `n = floor(sqrt(2πr) · r / d · k + 8.5)` with `k = near / tan(fov / 2)`,
/// clamped to `[default_segments, max_segments]`. A camera inside the body
/// always gets `max_segments`.
#[derive(Clone, Debug, PartialEq)]
pub struct TessellationPolicy {
    default_segments: u32,
    max_segments: u32,
    projection_constant: f64,
}

impl TessellationPolicy {
    /// Build a policy for a projection with the given near plane and
    /// vertical field of view in degrees.
    ///
    /// # Panics
    ///
    /// Panics if `default_segments` is zero or exceeds `max_segments`.
    pub fn from_projection(
        near: f64,
        fov_degrees: f64,
        default_segments: u32,
        max_segments: u32,
    ) -> Self {
        assert!(
            default_segments > 0 && default_segments <= max_segments,
            "segment bounds must satisfy 0 < default <= max"
        );
        Self {
            default_segments,
            max_segments,
            projection_constant: near / (fov_degrees.to_radians() / 2.0).tan(),
        }
    }

    pub fn default_segments(&self) -> u32 {
        self.default_segments
    }

    pub fn max_segments(&self) -> u32 {
        self.max_segments
    }

    /// `near / tan(fov / 2)`.
    pub fn projection_constant(&self) -> f64 {
        self.projection_constant
    }

    /// Segment count for a body of `radius` seen from `distance` (both in
    /// world units). Zero, negative and non-finite distances return
    /// `current` unchanged.
    pub fn segments_for(&self, distance: f64, radius: f64, current: u32) -> u32 {
        if !(distance.is_finite() && distance > 0.0) {
            return current;
        }
        if distance < radius {
            return self.max_segments;
        }
        let n = ((TAU * radius).sqrt() * radius / distance * self.projection_constant + 8.5).floor();
        if n.is_nan() {
            return current;
        }
        n.clamp(f64::from(self.default_segments), f64::from(self.max_segments)) as u32
    }
}

impl Default for TessellationPolicy {
    fn default() -> Self {
        Self::from_projection(0.01, 60.0, 16, 512)
    }
}

/// Asymmetric dead band on camera distance, measured in render units.
///
/// Approaching by more than `closer` or receding by more than `farther`
/// since the last evaluation triggers a new one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HysteresisBand {
    pub closer: f64,
    pub farther: f64,
}

impl HysteresisBand {
    pub fn new(closer: f64, farther: f64) -> Self {
        Self { closer, farther }
    }

    /// Whether a body last evaluated at `last` (world units, `None` if never)
    /// should be re-evaluated at `current`.
    pub fn should_rebuild(&self, last: Option<f64>, current: f64, scale: ScaleFactor) -> bool {
        let Some(last) = last else {
            return true;
        };
        let drift = scale.to_render_distance(current - last);
        drift < -self.closer || drift > self.farther
    }
}

impl Default for HysteresisBand {
    fn default() -> Self {
        Self::new(50.0, 100.0)
    }
}
