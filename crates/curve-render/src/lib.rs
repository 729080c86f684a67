//! Render-side data for Curve: the camera, sphere geometry, meshes and the
//! [`Renderer`] seam the frame loop draws through.

pub mod camera;
pub mod geometry;
pub mod mesh;
pub mod renderer;

pub use camera::{Camera, SharedCamera};
pub use geometry::{SphereGeometry, SphereVertex};
pub use mesh::{Material, Mesh};
pub use renderer::{FrameStats, HeadlessRenderer, INDEX_FORMAT, Renderer, upload_size};
