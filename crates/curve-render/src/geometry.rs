//! UV-sphere geometry for body meshes.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Vertex format used by body meshes: position, normal and UV.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(SphereVertex, [u8; 32]);

impl SphereVertex {
    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: (std::mem::size_of::<[f32; 3]>() * 2) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// A latitude/longitude sphere centred on the origin.
///
/// `width_segments` slices run around the equator, `height_segments` stacks
/// run pole to pole. The seam column and the pole rows are duplicated so
/// every vertex carries a unique UV, giving
/// `(width_segments + 1) * (height_segments + 1)` vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereGeometry {
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    vertices: Vec<SphereVertex>,
    indices: Vec<u32>,
}

impl SphereGeometry {
    /// Minimum slices around the equator.
    pub const MIN_WIDTH_SEGMENTS: u32 = 3;
    /// Minimum stacks between the poles.
    pub const MIN_HEIGHT_SEGMENTS: u32 = 2;

    /// Build a sphere. Segment counts below the minimum are raised to it.
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(Self::MIN_WIDTH_SEGMENTS);
        let height_segments = height_segments.max(Self::MIN_HEIGHT_SEGMENTS);

        let mut vertices =
            Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for y in 0..=height_segments {
            let v = y as f32 / height_segments as f32;
            let theta = v * PI;
            for x in 0..=width_segments {
                let u = x as f32 / width_segments as f32;
                let phi = u * TAU;
                let normal = Vec3::new(
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                );
                vertices.push(SphereVertex {
                    position: (normal * radius).to_array(),
                    normal: normal.to_array(),
                    uv: [u, 1.0 - v],
                });
            }
        }

        let stride = width_segments + 1;
        let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
        for y in 0..height_segments {
            for x in 0..width_segments {
                let a = y * stride + x + 1;
                let b = y * stride + x;
                let c = (y + 1) * stride + x;
                let d = (y + 1) * stride + x + 1;
                // Pole rows collapse to a point, so only one triangle per quad.
                if y != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if y != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            radius,
            width_segments,
            height_segments,
            vertices,
            indices,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn width_segments(&self) -> u32 {
        self.width_segments
    }

    pub fn height_segments(&self) -> u32 {
        self.height_segments
    }

    pub fn vertices(&self) -> &[SphereVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex data as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
