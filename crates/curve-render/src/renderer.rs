//! The renderer seam and a headless implementation.

use glam::Mat4;
use tracing::trace;

use crate::camera::Camera;
use crate::geometry::{SphereGeometry, SphereVertex};
use crate::mesh::Mesh;

/// Index format body meshes are uploaded with.
pub const INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;

/// Bytes a GPU upload of `geometry` occupies: vertices laid out per
/// [`SphereVertex::layout`] plus [`INDEX_FORMAT`] indices.
pub fn upload_size(geometry: &SphereGeometry) -> wgpu::BufferAddress {
    let stride = SphereVertex::layout().array_stride;
    let index_size = match INDEX_FORMAT {
        wgpu::IndexFormat::Uint16 => 2,
        wgpu::IndexFormat::Uint32 => 4,
    };
    stride * geometry.vertices().len() as wgpu::BufferAddress
        + index_size * geometry.indices().len() as wgpu::BufferAddress
}

/// Draws one frame of meshes from a camera.
pub trait Renderer {
    fn render(&mut self, camera: &Camera, meshes: &[&Mesh]);
}

/// Statistics from the most recent frame of a [`HeadlessRenderer`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frames rendered so far.
    pub frames: u64,
    /// Meshes submitted in the last frame.
    pub meshes: usize,
    /// Triangles submitted in the last frame.
    pub triangles: usize,
    /// Meshes whose geometry generation changed since the previous frame.
    pub uploads: usize,
    /// Buffer bytes those uploads would transfer.
    pub upload_bytes: wgpu::BufferAddress,
}

/// A renderer that draws nothing and records what it was given.
///
/// It still computes the view-projection matrix so the camera state is
/// exercised every frame.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    stats: FrameStats,
    last_view_projection: Option<Mat4>,
    generations: Vec<u64>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// View-projection matrix of the last frame.
    pub fn last_view_projection(&self) -> Option<Mat4> {
        self.last_view_projection
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, camera: &Camera, meshes: &[&Mesh]) {
        self.generations.resize(meshes.len(), u64::MAX);
        let mut uploads = 0;
        let mut upload_bytes = 0;
        for (seen, mesh) in self.generations.iter_mut().zip(meshes) {
            if *seen != mesh.generation() {
                *seen = mesh.generation();
                uploads += 1;
                upload_bytes += upload_size(mesh.geometry());
            }
        }

        self.last_view_projection = Some(camera.view_projection_matrix());
        self.stats = FrameStats {
            frames: self.stats.frames + 1,
            meshes: meshes.len(),
            triangles: meshes.iter().map(|m| m.geometry().triangle_count()).sum(),
            uploads,
            upload_bytes,
        };
        trace!(stats = ?self.stats, "headless frame");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SphereGeometry;
    use crate::mesh::Material;

    #[test]
    fn test_counts_frames_and_triangles() {
        let mut renderer = HeadlessRenderer::new();
        let camera = Camera::default();
        let a = Mesh::new(SphereGeometry::new(1.0, 16, 16), Material::default());
        let b = Mesh::new(SphereGeometry::new(1.0, 8, 8), Material::default());

        renderer.render(&camera, &[&a, &b]);
        renderer.render(&camera, &[&a, &b]);

        let stats = renderer.stats();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.meshes, 2);
        assert_eq!(
            stats.triangles,
            a.geometry().triangle_count() + b.geometry().triangle_count()
        );
        assert!(renderer.last_view_projection().is_some());
    }

    #[test]
    fn test_uploads_only_on_geometry_change() {
        let mut renderer = HeadlessRenderer::new();
        let camera = Camera::default();
        let mut mesh = Mesh::new(SphereGeometry::new(1.0, 16, 16), Material::default());

        renderer.render(&camera, &[&mesh]);
        assert_eq!(renderer.stats().uploads, 1);

        renderer.render(&camera, &[&mesh]);
        assert_eq!(renderer.stats().uploads, 0);

        mesh.replace_geometry(SphereGeometry::new(1.0, 32, 32));
        renderer.render(&camera, &[&mesh]);
        assert_eq!(renderer.stats().uploads, 1);
    }

    #[test]
    fn test_upload_bytes_follow_vertex_layout() {
        let mut renderer = HeadlessRenderer::new();
        let camera = Camera::default();
        let mesh = Mesh::new(SphereGeometry::new(1.0, 8, 4), Material::default());

        renderer.render(&camera, &[&mesh]);
        let geometry = mesh.geometry();
        let expected =
            (geometry.vertex_bytes().len() + geometry.indices().len() * 4) as wgpu::BufferAddress;
        assert_eq!(upload_size(geometry), expected);
        assert_eq!(renderer.stats().upload_bytes, expected);

        renderer.render(&camera, &[&mesh]);
        assert_eq!(renderer.stats().upload_bytes, 0);
    }
}
