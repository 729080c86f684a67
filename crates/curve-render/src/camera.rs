//! Perspective camera in render space.

use glam::{Mat4, Quat, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// Camera handle shared between the follow controls, the player and the
/// frame loop. Single-threaded.
pub type SharedCamera = Rc<RefCell<Camera>>;

/// A perspective camera that generates view and projection matrices.
/// Operates entirely in render-space f32 units.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Position in render space.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Vertical field of view in degrees.
    fov: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// A camera at the origin looking down -Z.
    pub fn perspective(fov_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov: fov_degrees,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Wrap the camera in a [`SharedCamera`] handle.
    pub fn into_shared(self) -> SharedCamera {
        Rc::new(RefCell::new(self))
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Set the vertical field of view in degrees. Non-finite values are ignored.
    pub fn set_fov(&mut self, fov_degrees: f32) {
        if fov_degrees.is_finite() {
            self.fov = fov_degrees;
        }
    }

    /// The rotation in world space. The camera is not parented, so this is
    /// the local rotation.
    pub fn world_rotation(&self) -> Quat {
        self.rotation
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation);
        let translation_matrix = Mat4::from_translation(self.position);
        (translation_matrix * rotation_matrix).inverse()
    }

    /// Compute the projection matrix with reverse-Z.
    pub fn projection_matrix(&self) -> Mat4 {
        // Near maps to z=1 and far to z=0, so the planes are passed swapped.
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect_ratio,
            self.far,
            self.near,
        )
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// The right direction vector (+X in camera space).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Update the aspect ratio. Degenerate sizes are ignored.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(60.0, 1.0, 0.01, 1.0e4)
    }
}
