//! Scene meshes: geometry plus material plus a render-space position.

use glam::Vec3;

use crate::geometry::SphereGeometry;

/// Flat shading parameters for a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGB base color.
    pub color: [f32; 3],
}

impl Material {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { color: [r, g, b] }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// A renderable mesh.
///
/// Geometry is replaced wholesale, never edited in place; each replacement
/// bumps [`generation`](Self::generation) so a GPU backend knows to
/// re-upload.
#[derive(Debug, Clone)]
pub struct Mesh {
    geometry: SphereGeometry,
    material: Material,
    /// Position in render space.
    pub position: Vec3,
    generation: u64,
}

impl Mesh {
    pub fn new(geometry: SphereGeometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            position: Vec3::ZERO,
            generation: 0,
        }
    }

    pub fn geometry(&self) -> &SphereGeometry {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Swap in new geometry, dropping the old one.
    pub fn replace_geometry(&mut self, geometry: SphereGeometry) {
        self.geometry = geometry;
        self.generation += 1;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Number of geometry replacements since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_geometry_bumps_generation() {
        let mut mesh = Mesh::new(SphereGeometry::new(1.0, 16, 16), Material::default());
        assert_eq!(mesh.generation(), 0);

        mesh.replace_geometry(SphereGeometry::new(1.0, 64, 64));
        assert_eq!(mesh.generation(), 1);
        assert_eq!(mesh.geometry().width_segments(), 64);
    }

    #[test]
    fn test_position_independent_of_geometry() {
        let mut mesh = Mesh::new(SphereGeometry::new(1.0, 16, 16), Material::new(0.0, 0.0, 1.0));
        mesh.set_position(Vec3::new(1.0, 2.0, 3.0));
        mesh.replace_geometry(SphereGeometry::new(1.0, 32, 32));
        assert_eq!(mesh.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.material().color, [0.0, 0.0, 1.0]);
    }
}
