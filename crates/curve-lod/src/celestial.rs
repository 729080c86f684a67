//! Render adapter for one physics body: owns the sphere mesh, keeps its
//! render-space position current and rebuilds its geometry as the body's
//! apparent size changes.

use curve_math::{MAX_SAFE_RENDER_COMPONENT, ScaleFactor, to_render_checked};
use curve_physics::{BodyHandle, BodyId};
use curve_render::{Material, Mesh, SphereGeometry};
use glam::DVec3;
use tracing::{debug, warn};

use crate::policy::{HysteresisBand, TessellationPolicy};

/// Shared settings for every [`CelestialBody`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CelestialOptions {
    pub policy: TessellationPolicy,
    pub band: HysteresisBand,
    pub scale: ScaleFactor,
}

/// A physics body as seen by the renderer.
///
/// Reads the body through its handle and never writes to it. The mesh is
/// owned exclusively; level changes replace its geometry wholesale.
#[derive(Debug)]
pub struct CelestialBody {
    body: BodyHandle,
    mass: f64,
    radius: f64,
    options: CelestialOptions,
    last_distance: Option<f64>,
    segments: u32,
    rebuilds: u64,
    out_of_range: bool,
    mesh: Mesh,
}

impl CelestialBody {
    /// Build the adapter and its initial mesh for `body`, as seen from
    /// `camera_world_position`.
    ///
    /// # Panics
    ///
    /// Panics if the body no longer exists in the physics engine.
    pub fn attach(
        body: BodyHandle,
        material: Material,
        camera_world_position: DVec3,
        options: CelestialOptions,
    ) -> Self {
        let mass = body.mass();
        let radius = body.radius();
        let body_position = body.position();
        let distance = body_position.distance(camera_world_position);

        let segments = options.policy.segments_for(
            distance,
            radius,
            options.policy.default_segments(),
        );
        let geometry = sphere(radius, segments, options.scale);
        let mut mesh = Mesh::new(geometry, material);
        let out_of_range = match to_render_checked(body_position, options.scale) {
            Ok(position) => {
                mesh.set_position(position);
                false
            }
            Err(position) => {
                mesh.set_position(position);
                warn!(
                    body = %body.id(),
                    limit = MAX_SAFE_RENDER_COMPONENT,
                    "body attached outside the precise render range"
                );
                true
            }
        };

        debug!(
            body = %body.id(),
            segments,
            distance,
            "attached celestial body"
        );

        Self {
            body,
            mass,
            radius,
            last_distance: (distance.is_finite() && distance > 0.0).then_some(distance),
            segments,
            rebuilds: 0,
            out_of_range,
            mesh,
            options,
        }
    }

    /// Per-frame update.
    ///
    /// Re-evaluates the tessellation level when the camera distance has left
    /// the hysteresis band, then moves the mesh to the body's current render
    /// position. The position is updated on every frame, rebuild or not.
    ///
    /// # Panics
    ///
    /// Panics if the body no longer exists in the physics engine.
    pub fn refresh(&mut self, camera_world_position: DVec3, _frame_delta: f32) {
        let body_position = self.body.position();
        let distance = body_position.distance(camera_world_position);

        if distance.is_finite()
            && distance > 0.0
            && self
                .options
                .band
                .should_rebuild(self.last_distance, distance, self.options.scale)
        {
            self.update_level(distance);
            self.last_distance = Some(distance);
        }

        let position = match to_render_checked(body_position, self.options.scale) {
            Ok(position) => {
                if self.out_of_range {
                    debug!(body = %self.body.id(), "body back inside the precise render range");
                    self.out_of_range = false;
                }
                position
            }
            Err(position) => {
                if !self.out_of_range {
                    warn!(
                        body = %self.body.id(),
                        ?position,
                        limit = MAX_SAFE_RENDER_COMPONENT,
                        "body left the precise render range"
                    );
                    self.out_of_range = true;
                }
                position
            }
        };
        self.mesh.set_position(position);
    }

    fn update_level(&mut self, distance: f64) {
        let segments = self
            .options
            .policy
            .segments_for(distance, self.radius, self.segments);
        if segments == self.segments {
            return;
        }
        debug!(
            body = %self.body.id(),
            from = self.segments,
            to = segments,
            distance,
            "rebuilding body geometry"
        );
        self.segments = segments;
        self.mesh
            .replace_geometry(sphere(self.radius, segments, self.options.scale));
        self.rebuilds += 1;
    }

    /// Current segment count in each direction.
    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Camera distance at the last level evaluation, in world units.
    pub fn last_distance(&self) -> Option<f64> {
        self.last_distance
    }

    /// Geometry rebuilds since attachment.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn body_id(&self) -> BodyId {
        self.body.id()
    }

    /// Whether the last render position exceeded
    /// [`MAX_SAFE_RENDER_COMPONENT`] on some axis.
    pub fn is_out_of_range(&self) -> bool {
        self.out_of_range
    }

    /// Whether the physics body still exists. An adapter whose body is gone
    /// must be dropped before the next [`refresh`](Self::refresh).
    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }
}

fn sphere(radius: f64, segments: u32, scale: ScaleFactor) -> SphereGeometry {
    SphereGeometry::new(
        scale.to_render_distance(radius) as f32,
        segments,
        segments,
    )
}
